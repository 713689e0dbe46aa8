use std::sync::Arc;

use proptest::prelude::*;
use sdoc_core::vocab::{rdf, sdoc};
use sdoc_core::{exec, Container, Graph, NodeDescription, Ontology, Operation, Page, Value, TO_END};
use sdoc_test_support::{assert_pod_consistency, page_json, page_triples, PAGE_ID};
use serde_json::{json, Map};

fn branch_with(n: usize) -> (Graph, String) {
    let mut graph = Graph::new(PAGE_ID, Arc::new(Ontology::default())).unwrap();
    graph.create_subject(PAGE_ID).unwrap();
    graph.set_value(PAGE_ID, rdf::TYPE, Value::Resource(sdoc::ROOT.into())).unwrap();
    let para = format!("{PAGE_ID}#p");
    let leaves = (0..n)
        .map(|i| NodeDescription::new(format!("{PAGE_ID}#t{i}"), sdoc::LEAF).with_property("text", format!("{i}")))
        .collect();
    let desc = NodeDescription::new(para.clone(), sdoc::PARAGRAPH).with_children(leaves);
    exec::insert_subtree(&mut graph, &desc, PAGE_ID, 0).unwrap();
    (graph, para)
}

fn child_ids(graph: &Graph, id: &str) -> Vec<String> {
    let node = sdoc_core::Node::load(graph, id).unwrap();
    node.as_container()
        .unwrap()
        .children(graph)
        .unwrap()
        .map(|c| c.unwrap().id().to_string())
        .collect()
}

/// Turn three random numbers into an operation against the fixture's shape.
/// Many of them will not apply to the current tree; that is part of the test.
fn operation(step: usize, kind: u8, a: usize, b: usize) -> Operation {
    let fresh = format!("{PAGE_ID}#n{step}");
    let (p, k) = (a % 4, b % 4);
    let bold = if a % 3 == 0 { json!(null) } else { json!(a % 2 == 0) };
    let raw = match kind % 8 {
        0 => json!({"type": "insert_node", "path": [p, k], "node": {
            "id": fresh, "type": sdoc::LEAF, "text": format!("new {step}")
        }}),
        1 if a % 2 == 0 => json!({"type": "remove_node", "path": [p]}),
        1 => json!({"type": "remove_node", "path": [p, k]}),
        2 => json!({"type": "move_node", "path": [p, k], "newPath": [b % 3, a % 3]}),
        3 if b % 2 == 0 => json!({"type": "split_node", "path": [p], "position": k, "properties": {"id": fresh}}),
        3 => json!({"type": "split_node", "path": [p, k], "position": a % 7, "properties": {"id": fresh}}),
        4 if b % 2 == 0 => json!({"type": "merge_node", "path": [p]}),
        4 => json!({"type": "merge_node", "path": [p, k]}),
        5 => json!({"type": "set_node", "path": [p, k], "newProperties": {
            "bold": bold,
            "italic": b % 2 == 1
        }}),
        6 => json!({"type": "insert_text", "path": [p, k], "offset": a % 8, "text": "xy"}),
        _ => json!({"type": "remove_text", "path": [p, k], "offset": a % 3, "text": "xt"}),
    };
    serde_json::from_value(raw).unwrap()
}

fn edits() -> impl Strategy<Value = Vec<(u8, usize, usize)>> {
    prop::collection::vec((any::<u8>(), 0usize..16, 0usize..16), 1..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn detach_then_attach_restores_the_chain(n in 1usize..8, offset in 0usize..8, length in 1usize..8) {
        let offset = offset % n;
        let (mut graph, para) = branch_with(n);
        let before = child_ids(&graph, &para);

        let node = sdoc_core::Node::load(&graph, &para).unwrap();
        let container = node.as_container().unwrap();
        let length = if length == 7 { TO_END } else { length };
        let run = container.detach_children(&mut graph, offset, length).unwrap();
        prop_assert!(run.is_some());
        prop_assert_eq!(container.children_num(&graph).unwrap(), n - (n - offset).min(length));

        container.attach_children(&mut graph, run.as_ref(), offset as isize).unwrap();
        prop_assert_eq!(child_ids(&graph, &para), before);
        prop_assert_eq!(container.children_num(&graph).unwrap(), n);
    }

    #[test]
    fn random_edits_keep_the_store_consistent(ops in edits()) {
        let stored = page_triples();
        let mut page = Page::from_triples(PAGE_ID, &stored).unwrap();

        for (step, (kind, a, b)) in ops.into_iter().enumerate() {
            let op = operation(step, kind, a, b);
            let projection = page.to_json().unwrap();
            let patch = page.sparql_for_update().unwrap();
            if page.apply(&op).is_err() {
                prop_assert_eq!(page.to_json().unwrap(), projection, "failed {:?} changed the tree", op);
                prop_assert_eq!(page.sparql_for_update().unwrap(), patch, "failed {:?} changed the patch", op);
            }
        }
        assert_pod_consistency(&stored, &page);
    }

    #[test]
    fn commit_persists_and_undo_restores(ops in edits(), split in 1usize..24) {
        let stored = page_triples();
        let mut page = Page::from_triples(PAGE_ID, &stored).unwrap();
        let split = split.min(ops.len());

        for (step, &(kind, a, b)) in ops[..split].iter().enumerate() {
            let _ = page.apply(&operation(step, kind, a, b));
        }
        let persisted = assert_pod_consistency(&stored, &page);
        page.commit().unwrap();
        prop_assert!(page.patch_for_update().unwrap().is_empty());
        prop_assert!(page.graph().subjects().all(|s| !s.is_inserted() && !s.is_deleted()));
        let committed = page.to_json().unwrap();

        for (step, &(kind, a, b)) in ops[split..].iter().enumerate() {
            let _ = page.apply(&operation(split + step, kind, a, b));
        }
        page.undo().unwrap();
        prop_assert_eq!(page.to_json().unwrap(), committed);
        prop_assert!(page.patch_for_update().unwrap().is_empty());
        assert_pod_consistency(&persisted, &page);
    }
}

#[test]
fn undo_without_commit_restores_the_loaded_document() {
    let mut page = Page::from_triples(PAGE_ID, &page_triples()).unwrap();
    for (step, kind) in (0u8..8).enumerate() {
        let _ = page.apply(&operation(step, kind, step, step + 1));
    }
    page.undo().unwrap();
    assert_eq!(page.to_json().unwrap(), page_json());
}

#[test]
fn set_node_without_changes_is_a_no_op() {
    let mut page = Page::from_triples(PAGE_ID, &page_triples()).unwrap();
    page.apply(&Operation::SetNode {
        path: vec![0, 0],
        properties: Map::new(),
        new_properties: Map::new(),
    })
    .unwrap();
    assert!(page.patch_for_update().unwrap().is_empty());
}
