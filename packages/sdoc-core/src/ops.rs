use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A node to insert, in the same shape [`crate::Page::to_json`] projects:
/// `id`, `type`, nested `children` for containers, and every other key a
/// property label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeDescription>>,
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

impl NodeDescription {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            children: None,
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, label: &str, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(label.to_string(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeDescription>) -> Self {
        self.children = Some(children);
        self
    }
}

/// Editor operation, as emitted by a Slate-style editor.
///
/// Paths are child offsets from the root. Fields the engine does not consult
/// (`node` of a removal, `target`, and merge `position`/`properties`) are
/// still accepted so editor payloads deserialize unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    InsertNode {
        path: Vec<usize>,
        node: NodeDescription,
    },
    RemoveNode {
        path: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<JsonValue>,
    },
    MoveNode {
        path: Vec<usize>,
        #[serde(rename = "newPath")]
        new_path: Vec<usize>,
    },
    SplitNode {
        path: Vec<usize>,
        position: i64,
        #[serde(default)]
        target: Option<JsonValue>,
        #[serde(default)]
        properties: Map<String, JsonValue>,
    },
    MergeNode {
        path: Vec<usize>,
        #[serde(default)]
        position: i64,
        #[serde(default)]
        target: Option<JsonValue>,
        #[serde(default)]
        properties: Map<String, JsonValue>,
    },
    SetNode {
        path: Vec<usize>,
        #[serde(default)]
        properties: Map<String, JsonValue>,
        #[serde(rename = "newProperties")]
        new_properties: Map<String, JsonValue>,
    },
    InsertText {
        path: Vec<usize>,
        offset: usize,
        text: String,
    },
    RemoveText {
        path: Vec<usize>,
        offset: usize,
        text: String,
    },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InsertNode { .. } => "insert_node",
            Operation::RemoveNode { .. } => "remove_node",
            Operation::MoveNode { .. } => "move_node",
            Operation::SplitNode { .. } => "split_node",
            Operation::MergeNode { .. } => "merge_node",
            Operation::SetNode { .. } => "set_node",
            Operation::InsertText { .. } => "insert_text",
            Operation::RemoveText { .. } => "remove_text",
        }
    }

    pub fn path(&self) -> &[usize] {
        match self {
            Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path, .. }
            | Operation::MoveNode { path, .. }
            | Operation::SplitNode { path, .. }
            | Operation::MergeNode { path, .. }
            | Operation::SetNode { path, .. }
            | Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. } => path,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
