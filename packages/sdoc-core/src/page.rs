use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::{Error, Result};
use crate::exec;
use crate::graph::Graph;
use crate::node::{Container, Node, Root, APPEND, TO_END};
use crate::ontology::{NodeKind, Ontology};
use crate::ops::{NodeDescription, Operation};
use crate::patch::Patch;
use crate::subject::Subject;
use crate::value::{Triple, Value};
use crate::vocab::{is_structural, rdf, sdoc};

/// One document: the graph registry plus the tree rooted at the graph id.
///
/// Edits go through [`Page::apply`]; the accumulated difference against the
/// loaded triples is read with [`Page::sparql_for_update`] and then either
/// committed or undone.
#[derive(Clone, Debug)]
pub struct Page {
    graph: Graph,
}

impl Page {
    /// Load a page from the triples of its named graph.
    ///
    /// A root that no triple types gets the ontology's root type in its
    /// working state, so the first patch persists it. The tree is walked
    /// once, so unknown node types and dangling child links fail here.
    pub fn load(id: impl Into<String>, triples: &[Triple], ontology: Arc<Ontology>) -> Result<Self> {
        let mut graph = Graph::load(id, ontology, triples)?;
        type_root(&mut graph)?;
        let page = Self { graph };
        page.to_json()?;
        Ok(page)
    }

    /// Empty page under the given vocabulary.
    pub fn new(id: impl Into<String>, ontology: Arc<Ontology>) -> Result<Self> {
        Self::load(id, &[], ontology)
    }

    /// [`Page::load`] with the built-in vocabulary.
    pub fn from_triples(id: impl Into<String>, triples: &[Triple]) -> Result<Self> {
        Self::load(id, triples, Arc::new(Ontology::default()))
    }

    pub fn id(&self) -> &str {
        self.graph.id()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn root(&self) -> Node {
        Node::Root(Root::new(self.graph.id()))
    }

    pub fn subject(&self, id: &str) -> Result<&Subject> {
        self.graph.subject(id)
    }

    pub fn value(&self, subject: &str, predicate: &str) -> Result<Value> {
        self.graph.value(subject, predicate)
    }

    /// Follow `path` from the root, one child offset per step.
    pub fn resolve_path(&self, path: &[usize]) -> Result<Node> {
        let mut node = self.root();
        for &offset in path {
            let child = match (node.as_container(), isize::try_from(offset).ok()) {
                (Some(container), Some(offset)) => container.indexed_child(&self.graph, offset)?,
                _ => None,
            };
            node = child.ok_or_else(|| Error::PathNotFound(format!("{path:?}")))?;
        }
        Ok(node)
    }

    pub fn apply(&mut self, op: &Operation) -> Result<()> {
        debug!(op = op.kind(), path = ?op.path(), "applying operation");
        match op {
            Operation::InsertNode { path, node } => self.insert_node(path, node),
            Operation::RemoveNode { path, .. } => self.remove_node(path),
            Operation::MoveNode { path, new_path } => self.move_node(path, new_path),
            Operation::SplitNode {
                path,
                position,
                properties,
                ..
            } => self.split_node(path, *position, properties),
            Operation::MergeNode { path, .. } => self.merge_node(path),
            Operation::SetNode { path, new_properties, .. } => self.set_node(path, new_properties),
            Operation::InsertText { path, offset, text } => self.insert_text(path, *offset, text),
            Operation::RemoveText { path, offset, text } => self.remove_text(path, *offset, text),
        }
    }

    fn insert_node(&mut self, path: &[usize], desc: &NodeDescription) -> Result<()> {
        let (parent_path, offset) = split_path(path)?;
        let parent = self.resolve_path(parent_path)?;
        if parent.as_container().is_none() {
            return Err(Error::InvalidParent(format!("{} cannot hold children", parent.id())));
        }
        exec::insert_subtree(&mut self.graph, desc, parent.id(), to_offset(offset))?;
        Ok(())
    }

    fn remove_node(&mut self, path: &[usize]) -> Result<()> {
        let (parent_path, offset) = split_path(path)?;
        self.resolve_path(path)?;
        let parent = self.resolve_path(parent_path)?;
        exec::remove_subtree(&mut self.graph, parent.id(), offset)
    }

    fn move_node(&mut self, path: &[usize], new_path: &[usize]) -> Result<()> {
        let (parent_path, offset) = split_path(path)?;
        let (new_parent_path, new_offset) = split_path(new_path)?;
        self.resolve_path(path)?;
        if path == new_path {
            return Ok(());
        }
        if new_path.starts_with(path) {
            return Err(Error::InvalidArgument(format!(
                "cannot move {path:?} into its own subtree at {new_path:?}"
            )));
        }
        let parent = self.resolve_path(parent_path)?;
        let new_parent = self.resolve_path(new_parent_path)?;
        if new_parent.as_container().is_none() {
            return Err(Error::InvalidParent(format!("{} cannot hold children", new_parent.id())));
        }
        exec::move_run(
            &mut self.graph,
            parent.id(),
            offset,
            1,
            new_parent.id(),
            to_offset(new_offset),
        )
    }

    /// Split the node at `path`: everything from `position` on moves into a
    /// new following sibling built from `properties`.
    fn split_node(&mut self, path: &[usize], position: i64, properties: &Map<String, JsonValue>) -> Result<()> {
        let (parent_path, index) = split_path(path)?;
        let node = self.resolve_path(path)?;
        let parent = self.resolve_path(parent_path)?;
        let position = usize::try_from(position)
            .map_err(|_| Error::InvalidArgument(format!("split position {position} is negative")))?;
        let length = match &node {
            Node::Leaf(leaf) => leaf.text_len(&self.graph)?,
            _ => container(&node)?.children_num(&self.graph)?,
        };
        if position > length {
            return Err(Error::InvalidArgument(format!(
                "split position {position} is past the end ({length}) of {}",
                node.id()
            )));
        }

        let mut desc = self.sibling_description(&node, properties)?;
        if let Node::Leaf(leaf) = &node {
            let tail: String = leaf.text(&self.graph)?.chars().skip(position).collect();
            let label = self.graph.predicate(sdoc::TEXT)?.label().to_string();
            desc.properties.insert(label, JsonValue::String(tail));
        }
        exec::validate(&self.graph, &desc)?;

        let offset = to_offset(index + 1);
        match &node {
            Node::Leaf(leaf) => {
                leaf.remove_text(&mut self.graph, position, usize::MAX)?;
                exec::insert_subtree(&mut self.graph, &desc, parent.id(), offset)?;
            }
            _ => {
                exec::insert_subtree(&mut self.graph, &desc, parent.id(), offset)?;
                if position < length {
                    exec::move_run(&mut self.graph, node.id(), position, TO_END, &desc.id, 0)?;
                }
            }
        }
        Ok(())
    }

    /// Description of the right-hand sibling a split creates: the node's own
    /// properties, overridden by the caller's, under the caller's id.
    fn sibling_description(&self, node: &Node, properties: &Map<String, JsonValue>) -> Result<NodeDescription> {
        let subject = self.graph.subject(node.id())?;
        let node_type = subject
            .node_type()
            .ok_or_else(|| Error::UnsupportedNodeType(format!("{} has no type", node.id())))?
            .to_string();
        let id = properties
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::InvalidArgument("split needs an id for the new node".into()))?;

        let mut desc = NodeDescription::new(id, node_type.as_str());
        if node.as_container().is_some() {
            desc.children = Some(Vec::new());
        }
        for (key, value) in subject.projection(self.graph.predicates())? {
            if key != "id" && key != "type" {
                desc.properties.insert(key, value);
            }
        }
        for (key, value) in properties {
            match key.as_str() {
                "id" => {}
                "type" if value.as_str() == Some(node_type.as_str()) => {}
                "type" | "children" => {
                    return Err(Error::InvalidArgument(format!(
                        "split cannot set {key} on the new node"
                    )))
                }
                _ => {
                    desc.properties.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(desc)
    }

    /// Append the node at `path` to its previous sibling and remove it.
    fn merge_node(&mut self, path: &[usize]) -> Result<()> {
        let (parent_path, index) = split_path(path)?;
        if index == 0 {
            return Err(Error::InvalidArgument(format!("{path:?} has no previous sibling")));
        }
        let node = self.resolve_path(path)?;
        let parent = self.resolve_path(parent_path)?;
        let prev = container(&parent)?
            .indexed_child(&self.graph, to_offset(index - 1))?
            .ok_or_else(|| Error::PathNotFound(format!("{path:?}")))?;

        match (&prev, &node) {
            (Node::Leaf(prev), Node::Leaf(leaf)) => {
                let text = leaf.text(&self.graph)?;
                let end = prev.text_len(&self.graph)?;
                prev.insert_text(&mut self.graph, end, &text)?;
            }
            (Node::Branch(_), Node::Branch(_)) => {
                if container(&node)?.children_num(&self.graph)? > 0 {
                    exec::move_run(&mut self.graph, node.id(), 0, TO_END, prev.id(), APPEND)?;
                }
            }
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "cannot merge {} into {}",
                    node.id(),
                    prev.id()
                )))
            }
        }
        exec::remove_subtree(&mut self.graph, parent.id(), index)
    }

    /// Write `properties` onto the node at `path`; `null` resets a property
    /// to its default.
    fn set_node(&mut self, path: &[usize], properties: &Map<String, JsonValue>) -> Result<()> {
        let node = self.resolve_path(path)?;
        let ontology = self.graph.ontology();
        let current = self
            .graph
            .subject(node.id())?
            .node_type()
            .ok_or_else(|| Error::UnsupportedNodeType(format!("{} has no type", node.id())))?
            .to_string();

        let node_type = match properties.get("type") {
            None => current,
            Some(JsonValue::String(ty)) => {
                if ontology.node_kind(ty)? != node.kind() {
                    return Err(Error::InvalidArgument(format!(
                        "cannot retype {} from {current} to {ty}",
                        node.id()
                    )));
                }
                ty.clone()
            }
            Some(other) => {
                return Err(Error::InvalidArgument(format!("{other} is not a node type")));
            }
        };

        let mut writes = vec![(rdf::TYPE.to_string(), Some(Value::Resource(node_type.clone())))];
        for (label, json) in properties {
            match label.as_str() {
                "type" => continue,
                "id" | "children" => {
                    return Err(Error::InvalidArgument(format!("{label} cannot be set")));
                }
                _ => {}
            }
            if json.is_null() {
                let pred = self.graph.predicate_by_label(label)?;
                if is_structural(pred.id()) {
                    return Err(Error::InvalidArgument(format!("{label} is maintained by the tree")));
                }
                writes.push((pred.id().to_string(), None));
            } else {
                let (pred, value) = exec::property_value(&self.graph, &node_type, label, json)?;
                writes.push((pred, Some(value)));
            }
        }

        for (pred, value) in writes {
            match value {
                Some(value) => self.graph.set_value(node.id(), &pred, value)?,
                None => self.graph.reset_value(node.id(), &pred)?,
            }
        }
        Ok(())
    }

    fn insert_text(&mut self, path: &[usize], offset: usize, text: &str) -> Result<()> {
        let node = self.resolve_path(path)?;
        let leaf = node
            .as_leaf()
            .ok_or_else(|| Error::InvalidArgument(format!("{} holds no text", node.id())))?;
        let len = leaf.text_len(&self.graph)?;
        if offset > len {
            return Err(Error::InvalidArgument(format!(
                "text offset {offset} is past the end ({len}) of {}",
                node.id()
            )));
        }
        leaf.insert_text(&mut self.graph, offset, text)
    }

    fn remove_text(&mut self, path: &[usize], offset: usize, text: &str) -> Result<()> {
        let node = self.resolve_path(path)?;
        let leaf = node
            .as_leaf()
            .ok_or_else(|| Error::InvalidArgument(format!("{} holds no text", node.id())))?;
        let current = leaf.text(&self.graph)?;
        let end = offset.saturating_add(text.chars().count());
        let found: String = current.chars().skip(offset).take(end - offset).collect();
        if end > current.chars().count() || found != text {
            return Err(Error::InvalidArgument(format!(
                "{} does not contain {text:?} at {offset}",
                node.id()
            )));
        }
        leaf.remove_text(&mut self.graph, offset, end)?;
        Ok(())
    }

    pub fn patch_for_update(&self) -> Result<Patch> {
        self.graph.patch_for_update()
    }

    pub fn sparql_for_update(&self) -> Result<String> {
        self.graph.sparql_for_update()
    }

    pub fn commit(&mut self) -> Result<()> {
        self.graph.commit()
    }

    /// Drop every uncommitted edit. An untyped stored root is typed again.
    pub fn undo(&mut self) -> Result<()> {
        self.graph.undo()?;
        type_root(&mut self.graph)
    }

    /// Projection of the whole document, children nested in order.
    pub fn to_json(&self) -> Result<JsonValue> {
        self.root().to_json(&self.graph)
    }
}

fn type_root(graph: &mut Graph) -> Result<()> {
    let root = graph.id().to_string();
    match graph.root()?.node_type().map(str::to_string) {
        None => {
            let ty = graph.ontology().root_type().to_string();
            graph.set_value(&root, rdf::TYPE, Value::Resource(ty))
        }
        Some(ty) if graph.ontology().node_kind(&ty)? != NodeKind::Root => {
            Err(Error::UnsupportedNodeType(format!("{ty} cannot type the root {root}")))
        }
        Some(_) => Ok(()),
    }
}

fn split_path(path: &[usize]) -> Result<(&[usize], usize)> {
    match path.split_last() {
        Some((&last, parent)) => Ok((parent, last)),
        None => Err(Error::InvalidArgument("the operation needs a non-root path".into())),
    }
}

fn to_offset(offset: usize) -> isize {
    isize::try_from(offset).unwrap_or(APPEND)
}

fn container(node: &Node) -> Result<&dyn Container> {
    node.as_container()
        .ok_or_else(|| Error::InvalidArgument(format!("{} has no children", node.id())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Term;
    use crate::vocab::{dct, xsd};

    const PAGE: &str = "http://example.org/alice";

    #[test]
    fn types_an_untyped_root() {
        let triples = vec![Triple::new(
            PAGE,
            dct::MODIFIED,
            Term::literal("1970-01-01T00:00:00.000Z", xsd::DATE_TIME),
        )];
        let page = Page::from_triples(PAGE, &triples).unwrap();
        assert_eq!(page.to_json().unwrap()["type"], sdoc::ROOT);
        assert_eq!(
            page.sparql_for_update().unwrap(),
            format!(
                "INSERT DATA {{ GRAPH <{PAGE}> {{ <{PAGE}> <{}> <{}>}} }};\n",
                rdf::TYPE,
                sdoc::ROOT
            )
        );
    }

    #[test]
    fn rejects_a_branch_typed_root() {
        let triples = vec![Triple::new(PAGE, rdf::TYPE, Term::iri(sdoc::PARAGRAPH))];
        assert!(matches!(
            Page::from_triples(PAGE, &triples),
            Err(Error::UnsupportedNodeType(_))
        ));
    }

    #[test]
    fn rejects_an_unknown_child_type() {
        let child = format!("{PAGE}#table");
        let triples = vec![
            Triple::new(PAGE, rdf::TYPE, Term::iri(sdoc::ROOT)),
            Triple::new(PAGE, sdoc::FIRST_CHILD, Term::iri(child.clone())),
            Triple::new(child, rdf::TYPE, Term::iri("http://example.org/vocab#Table")),
        ];
        assert!(matches!(
            Page::from_triples(PAGE, &triples),
            Err(Error::UnsupportedNodeType(_))
        ));
    }

    #[test]
    fn rejects_a_dangling_child_link() {
        let para = format!("{PAGE}#p0");
        let triples = vec![
            Triple::new(PAGE, rdf::TYPE, Term::iri(sdoc::ROOT)),
            Triple::new(PAGE, sdoc::FIRST_CHILD, Term::iri(para.clone())),
            Triple::new(para.clone(), rdf::TYPE, Term::iri(sdoc::PARAGRAPH)),
            Triple::new(para, sdoc::NEXT, Term::iri(format!("{PAGE}#gone"))),
        ];
        assert_eq!(
            Page::from_triples(PAGE, &triples).unwrap_err(),
            Error::SubjectNotFound(format!("{PAGE}#gone"))
        );
    }

    #[test]
    fn oversized_offset_is_not_found() {
        let page = Page::new(PAGE, Arc::new(Ontology::default())).unwrap();
        assert!(matches!(page.resolve_path(&[usize::MAX]), Err(Error::PathNotFound(_))));
    }

    #[test]
    fn empty_path_resolves_to_root() {
        let page = Page::new(PAGE, Arc::new(Ontology::default())).unwrap();
        assert_eq!(page.resolve_path(&[]).unwrap(), page.root());
        assert!(matches!(page.resolve_path(&[0]), Err(Error::PathNotFound(_))));
    }

    #[test]
    fn operations_on_the_root_path_fail() {
        let mut page = Page::new(PAGE, Arc::new(Ontology::default())).unwrap();
        let op = Operation::RemoveNode {
            path: vec![],
            node: None,
        };
        assert!(matches!(page.apply(&op), Err(Error::InvalidArgument(_))));
    }
}
