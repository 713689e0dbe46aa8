//! Root/Branch/Leaf views over the subjects of a [`Graph`].
//!
//! Children are not stored as a list: a container's `sdoc:firstChild` names
//! its first child and every non-last child's `sdoc:nextNode` names the
//! following one. Every offset-based operation walks that chain through id
//! lookups in the graph.

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::ontology::NodeKind;
use crate::value::Value;
use crate::vocab::sdoc;

/// Attach offset that always lands after the last child.
pub const APPEND: isize = isize::MAX;

/// Detach length that runs to the last child.
pub const TO_END: usize = usize::MAX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Root {
    id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branch {
    id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Root(Root),
    Branch(Branch),
    Leaf(Leaf),
}

impl Node {
    /// View of the subject `id`, with its variant chosen from its type.
    pub fn load(graph: &Graph, id: &str) -> Result<Node> {
        let subject = graph.subject(id)?;
        if subject.is_root() {
            return Ok(Node::Root(Root { id: id.to_string() }));
        }
        let ty = subject
            .node_type()
            .ok_or_else(|| Error::UnsupportedNodeType(format!("{id} has no type")))?;
        match graph.ontology().node_kind(ty)? {
            NodeKind::Branch => Ok(Node::Branch(Branch { id: id.to_string() })),
            NodeKind::Leaf => Ok(Node::Leaf(Leaf { id: id.to_string() })),
            NodeKind::Root => Err(Error::UnsupportedNodeType(format!(
                "{ty} is reserved for the document root, found on {id}"
            ))),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Root(Root { id }) | Node::Branch(Branch { id }) | Node::Leaf(Leaf { id }) => id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Branch(_) => NodeKind::Branch,
            Node::Leaf(_) => NodeKind::Leaf,
        }
    }

    pub fn as_container(&self) -> Option<&dyn Container> {
        match self {
            Node::Root(root) => Some(root),
            Node::Branch(branch) => Some(branch),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn next(&self, graph: &Graph) -> Result<Option<Node>> {
        graph
            .link(self.id(), sdoc::NEXT)?
            .map(|id| Node::load(graph, &id))
            .transpose()
    }

    /// Chain `next` directly after this node; `None` makes it the last of its run.
    pub fn set_next(&self, graph: &mut Graph, next: Option<&Node>) -> Result<()> {
        graph.set_link(self.id(), sdoc::NEXT, next.map(Node::id))
    }

    /// Projection of the node; containers add their children in chain order.
    pub fn to_json(&self, graph: &Graph) -> Result<JsonValue> {
        let mut out = graph.projection(self.id())?;
        if let Some(container) = self.as_container() {
            let children = container
                .children(graph)?
                .map(|child| child?.to_json(graph))
                .collect::<Result<Vec<_>>>()?;
            out.insert("children".into(), JsonValue::Array(children));
        }
        Ok(JsonValue::Object(out))
    }
}

/// Walks a sibling chain, yielding each node in order.
///
/// Fails with [`Error::InvalidState`] instead of looping when the chain is
/// longer than the registry, which only a cycle can cause.
pub struct Children<'g> {
    graph: &'g Graph,
    cursor: Option<String>,
    steps: usize,
}

impl<'g> Children<'g> {
    pub fn starting_at(graph: &'g Graph, head: Option<String>) -> Self {
        Self {
            graph,
            cursor: head,
            steps: 0,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor.take()?;
        self.steps += 1;
        if self.steps > self.graph.subject_count() {
            return Some(Err(Error::InvalidState(format!("cyclic sibling chain through {id}"))));
        }
        let node = match Node::load(self.graph, &id) {
            Ok(node) => node,
            Err(e) => return Some(Err(e)),
        };
        match self.graph.link(&id, sdoc::NEXT) {
            Ok(next) => self.cursor = next,
            Err(e) => return Some(Err(e)),
        }
        Some(Ok(node))
    }
}

/// Ordered-children operations shared by [`Root`] and [`Branch`].
pub trait Container {
    fn id(&self) -> &str;

    fn first_child(&self, graph: &Graph) -> Result<Option<Node>> {
        self.children(graph)?.next().transpose()
    }

    fn children<'g>(&self, graph: &'g Graph) -> Result<Children<'g>> {
        let head = graph.link(self.id(), sdoc::FIRST_CHILD)?;
        Ok(Children::starting_at(graph, head))
    }

    fn children_num(&self, graph: &Graph) -> Result<usize> {
        let mut count = 0;
        for child in self.children(graph)? {
            child?;
            count += 1;
        }
        Ok(count)
    }

    /// Child at `index`, `None` when negative or past the end.
    fn indexed_child(&self, graph: &Graph, index: isize) -> Result<Option<Node>> {
        if index < 0 {
            return Ok(None);
        }
        for (i, child) in self.children(graph)?.enumerate() {
            let child = child?;
            if i == index as usize {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    fn last_child(&self, graph: &Graph) -> Result<Option<Node>> {
        let mut last = None;
        for child in self.children(graph)? {
            last = Some(child?);
        }
        Ok(last)
    }

    /// Splice the run starting at `head` (already chained through `next`) in
    /// at `offset`, clamped: `<= 0` is the head, past the end (or [`APPEND`])
    /// is the tail.
    fn attach_children(&self, graph: &mut Graph, head: Option<&Node>, offset: isize) -> Result<()> {
        let head = head.ok_or_else(|| {
            Error::InvalidArgument(format!("no node to attach under {}", self.id()))
        })?;
        let mut tail = head.clone();
        for node in Children::starting_at(graph, Some(head.id().to_string())) {
            tail = node?;
        }

        let len = self.children_num(graph)?;
        if offset <= 0 || len == 0 {
            let first = graph.link(self.id(), sdoc::FIRST_CHILD)?;
            graph.set_link(tail.id(), sdoc::NEXT, first.as_deref())?;
            graph.set_link(self.id(), sdoc::FIRST_CHILD, Some(head.id()))?;
        } else if offset as usize >= len {
            let last = self
                .last_child(graph)?
                .ok_or_else(|| Error::InvalidState(format!("{} lost its children", self.id())))?;
            graph.set_link(last.id(), sdoc::NEXT, Some(head.id()))?;
        } else {
            let prev = self.indexed_child(graph, offset - 1)?.ok_or_else(|| {
                Error::InvalidState(format!("{} has no child {}", self.id(), offset - 1))
            })?;
            let after = graph.link(prev.id(), sdoc::NEXT)?;
            graph.set_link(tail.id(), sdoc::NEXT, after.as_deref())?;
            graph.set_link(prev.id(), sdoc::NEXT, Some(head.id()))?;
        }
        Ok(())
    }

    /// Unlink `length` children starting at `offset` ([`TO_END`] takes the
    /// rest) and return the head of the detached run, still chained.
    fn detach_children(&self, graph: &mut Graph, offset: usize, length: usize) -> Result<Option<Node>> {
        if length == 0 {
            return Err(Error::InvalidArgument(format!(
                "cannot detach zero children from {}",
                self.id()
            )));
        }
        let children = self.children(graph)?.collect::<Result<Vec<_>>>()?;
        if offset >= children.len() {
            return Ok(None);
        }
        let end = offset.saturating_add(length).min(children.len());
        let after = children.get(end).map(Node::id);
        if offset == 0 {
            graph.set_link(self.id(), sdoc::FIRST_CHILD, after)?;
        } else {
            graph.set_link(children[offset - 1].id(), sdoc::NEXT, after)?;
        }
        graph.set_link(children[end - 1].id(), sdoc::NEXT, None)?;
        Ok(Some(children[offset].clone()))
    }
}

impl Container for Root {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Container for Branch {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Root {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Leaf {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self, graph: &Graph) -> Result<String> {
        Ok(graph
            .value(&self.id, sdoc::TEXT)?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    /// Length in characters.
    pub fn text_len(&self, graph: &Graph) -> Result<usize> {
        Ok(self.text(graph)?.chars().count())
    }

    /// Insert `text` at character `offset`, clamped to the end.
    pub fn insert_text(&self, graph: &mut Graph, offset: usize, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mut current = self.text(graph)?;
        let at = byte_index(&current, offset);
        current.insert_str(at, text);
        graph.set_value(&self.id, sdoc::TEXT, Value::String(current))
    }

    /// Remove characters `start..end` (both clamped) and return them.
    pub fn remove_text(&self, graph: &mut Graph, start: usize, end: usize) -> Result<String> {
        let current = self.text(graph)?;
        let len = current.chars().count();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return Ok(String::new());
        }
        let (from, to) = (byte_index(&current, start), byte_index(&current, end));
        let removed = current[from..to].to_string();
        let remaining = format!("{}{}", &current[..from], &current[to..]);
        graph.set_value(&self.id, sdoc::TEXT, Value::String(remaining))?;
        Ok(removed)
    }
}

fn byte_index(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}
