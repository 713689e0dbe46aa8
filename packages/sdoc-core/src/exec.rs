//! Whole-subtree creation, removal and relocation on top of the node views.
//!
//! Every entry point checks everything that can fail before its first write,
//! so a failed call leaves the graph as it found it.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::node::{Container, Node};
use crate::ontology::NodeKind;
use crate::ops::NodeDescription;
use crate::value::Value;
use crate::vocab::{is_structural, rdf};

/// Check a whole description tree against the ontology and the registry.
pub fn validate(graph: &Graph, desc: &NodeDescription) -> Result<()> {
    let mut seen = HashSet::new();
    validate_tree(graph, desc, &mut seen)
}

fn validate_tree<'d>(
    graph: &Graph,
    desc: &'d NodeDescription,
    seen: &mut HashSet<&'d str>,
) -> Result<()> {
    if !seen.insert(desc.id.as_str()) {
        return Err(Error::DuplicateSubject(desc.id.clone()));
    }
    let kind = validate_node(graph, desc)?;
    let children = desc.children.as_deref().unwrap_or_default();
    if kind == NodeKind::Leaf && !children.is_empty() {
        return Err(Error::InvalidArgument(format!("leaf {} cannot have children", desc.id)));
    }
    for child in children {
        validate_tree(graph, child, seen)?;
    }
    Ok(())
}

fn validate_node(graph: &Graph, desc: &NodeDescription) -> Result<NodeKind> {
    if desc.id.is_empty() {
        return Err(Error::InvalidArgument("node id must not be empty".into()));
    }
    if graph.subject(&desc.id).is_ok_and(|s| !s.is_deleted()) {
        return Err(Error::DuplicateSubject(desc.id.clone()));
    }
    let kind = graph.ontology().node_kind(&desc.node_type)?;
    if kind == NodeKind::Root {
        return Err(Error::UnsupportedNodeType(format!(
            "{} can only type the document root",
            desc.node_type
        )));
    }
    for (label, json) in &desc.properties {
        property_value(graph, &desc.node_type, label, json)?;
    }
    Ok(kind)
}

/// Resolve a property label of a node payload to its predicate id and typed value.
pub(crate) fn property_value(
    graph: &Graph,
    node_type: &str,
    label: &str,
    json: &JsonValue,
) -> Result<(String, Value)> {
    let pred = graph.predicate_by_label(label)?;
    if is_structural(pred.id()) {
        return Err(Error::InvalidArgument(format!("{label} is maintained by the tree")));
    }
    if !graph.ontology().allows(node_type, label)? {
        return Err(Error::InvalidArgument(format!("{label} is not allowed on {node_type}")));
    }
    let value = Value::from_json(pred.kind(), json)?;
    Ok((pred.id().to_string(), value))
}

/// Register the subject for `desc` and write its type and properties.
///
/// A subject tombstoned earlier in the session is revived instead of
/// recreated, so it keeps its persisted identity and patches as a diff.
pub fn create_node(graph: &mut Graph, desc: &NodeDescription) -> Result<Node> {
    validate_node(graph, desc)?;

    match graph.subject_mut(&desc.id) {
        Ok(subject) => subject.revive(),
        Err(_) => graph.create_subject(&desc.id)?.mark_inserted(),
    }
    graph.set_value(&desc.id, rdf::TYPE, Value::Resource(desc.node_type.clone()))?;
    for (label, json) in &desc.properties {
        let (predicate, value) = property_value(graph, &desc.node_type, label, json)?;
        graph.set_value(&desc.id, &predicate, value)?;
    }
    Node::load(graph, &desc.id)
}

/// Build `desc` and its descendants and attach the result under `parent` at `offset`.
pub fn insert_subtree(
    graph: &mut Graph,
    desc: &NodeDescription,
    parent: &str,
    offset: isize,
) -> Result<Node> {
    let parent = load_parent(graph, parent)?;
    validate(graph, desc)?;
    build(graph, desc, container(&parent)?, offset)
}

fn build(
    graph: &mut Graph,
    desc: &NodeDescription,
    parent: &dyn Container,
    offset: isize,
) -> Result<Node> {
    let node = create_node(graph, desc)?;
    parent.attach_children(graph, Some(&node), offset)?;
    if let Some(container) = node.as_container() {
        for (i, child) in desc.children.iter().flatten().enumerate() {
            build(graph, child, container, i as isize)?;
        }
    }
    Ok(node)
}

/// Detach the child of `parent` at `offset` and tombstone it with all its descendants.
pub fn remove_subtree(graph: &mut Graph, parent: &str, offset: usize) -> Result<()> {
    let parent = load_parent(graph, parent)?;
    let node = container(&parent)?
        .detach_children(graph, offset, 1)?
        .ok_or_else(|| Error::InvalidArgument(format!("{} has no child {offset}", parent.id())))?;
    delete_detached(graph, &node)
}

// Descendants go first: the node's own links are needed to reach them.
fn delete_detached(graph: &mut Graph, node: &Node) -> Result<()> {
    if let Some(container) = node.as_container() {
        while let Some(child) = container.detach_children(graph, 0, 1)? {
            delete_detached(graph, &child)?;
        }
    }
    graph.subject_mut(node.id())?.mark_deleted()
}

/// Move `length` children of `parent` starting at `offset` to `new_offset` under `new_parent`.
///
/// `new_offset` counts children of `new_parent` after the run has been
/// detached. Moving a container under itself is the caller's to prevent.
pub fn move_run(
    graph: &mut Graph,
    parent: &str,
    offset: usize,
    length: usize,
    new_parent: &str,
    new_offset: isize,
) -> Result<()> {
    let source = load_parent(graph, parent)?;
    let target = load_parent(graph, new_parent)?;
    let (source, target) = (container(&source)?, container(&target)?);
    if length == 0 || offset >= source.children_num(graph)? {
        return Err(Error::InvalidArgument(format!(
            "{parent} has no run of {length} at {offset}"
        )));
    }
    let run = source.detach_children(graph, offset, length)?;
    target.attach_children(graph, run.as_ref(), new_offset)
}

fn load_parent(graph: &Graph, id: &str) -> Result<Node> {
    match graph.subject(id) {
        Ok(subject) if !subject.is_deleted() => Node::load(graph, id),
        _ => Err(Error::InvalidParent(format!("{id} is not in the document"))),
    }
}

fn container(node: &Node) -> Result<&dyn Container> {
    node.as_container()
        .ok_or_else(|| Error::InvalidParent(format!("{} cannot hold children", node.id())))
}
