//! Schema table: which predicates exist, their ranges and defaults, and which
//! node types may carry them.
//!
//! `Ontology::default()` is the built-in `sdoc` vocabulary. Hosts with a
//! different vocabulary describe it in JSON and load it with
//! [`Ontology::from_json`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::value::{Value, ValueKind};
use crate::vocab::{dct, rdf, sdoc, STRUCTURAL};

/// Capability of a node in the document tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Branch,
    Leaf,
}

impl NodeKind {
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Branch)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredicateSpec {
    pub id: String,
    /// Key used for this predicate in projections and operation payloads.
    pub label: String,
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

impl PredicateSpec {
    pub fn new(id: &str, label: &str, kind: ValueKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            default: None,
        }
    }

    pub fn default_value(&self) -> Result<Value> {
        match &self.default {
            None => Ok(self.kind.zero()),
            Some(json) => Value::from_json(self.kind, json)
                .map_err(|e| Error::Config(format!("default of {}: {e}", self.id))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTypeSpec {
    pub id: String,
    pub kind: NodeKind,
    /// Labels of the non-structural predicates legal on this type.
    #[serde(default)]
    pub predicates: Vec<String>,
}

impl NodeTypeSpec {
    fn new(id: &str, kind: NodeKind, predicates: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            kind,
            predicates: predicates.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "OntologyConfig", into = "OntologyConfig")]
pub struct Ontology {
    predicates: Vec<PredicateSpec>,
    node_types: Vec<NodeTypeSpec>,
    by_label: HashMap<String, usize>,
    by_type: HashMap<String, usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct OntologyConfig {
    predicates: Vec<PredicateSpec>,
    node_types: Vec<NodeTypeSpec>,
}

impl TryFrom<OntologyConfig> for Ontology {
    type Error = Error;

    fn try_from(config: OntologyConfig) -> Result<Self> {
        Ontology::new(config.predicates, config.node_types)
    }
}

impl From<Ontology> for OntologyConfig {
    fn from(ontology: Ontology) -> Self {
        OntologyConfig {
            predicates: ontology.predicates,
            node_types: ontology.node_types,
        }
    }
}

impl Ontology {
    pub fn new(predicates: Vec<PredicateSpec>, node_types: Vec<NodeTypeSpec>) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut by_label = HashMap::new();
        for (i, spec) in predicates.iter().enumerate() {
            if !ids.insert(spec.id.as_str()) {
                return Err(Error::DuplicatePredicate(spec.id.clone()));
            }
            if by_label.insert(spec.label.clone(), i).is_some() {
                return Err(Error::DuplicatePredicate(format!("label {}", spec.label)));
            }
            spec.default_value()?;
        }
        for required in STRUCTURAL {
            let Some(spec) = predicates.iter().find(|p| p.id == required) else {
                return Err(Error::Config(format!("missing structural predicate {required}")));
            };
            if spec.kind != ValueKind::Resource {
                return Err(Error::Config(format!("{required} must range over resources")));
            }
        }

        let mut by_type = HashMap::new();
        for (i, spec) in node_types.iter().enumerate() {
            if by_type.insert(spec.id.clone(), i).is_some() {
                return Err(Error::Config(format!("duplicated node type {}", spec.id)));
            }
            if let Some(unknown) = spec.predicates.iter().find(|l| !by_label.contains_key(*l)) {
                return Err(Error::Config(format!("{} lists unknown predicate {unknown}", spec.id)));
            }
        }
        if node_types.iter().any(|t| t.kind == NodeKind::Leaf)
            && !predicates
                .iter()
                .any(|p| p.id == sdoc::TEXT && p.kind == ValueKind::String)
        {
            return Err(Error::Config(format!("leaf types need a string {} predicate", sdoc::TEXT)));
        }
        let roots = node_types.iter().filter(|t| t.kind == NodeKind::Root).count();
        if roots != 1 {
            return Err(Error::Config(format!("expected exactly one root type, found {roots}")));
        }

        Ok(Self {
            predicates,
            node_types,
            by_label,
            by_type,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: OntologyConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        Ontology::try_from(config)
    }

    pub fn predicates(&self) -> &[PredicateSpec] {
        &self.predicates
    }

    pub fn node_types(&self) -> &[NodeTypeSpec] {
        &self.node_types
    }

    pub fn predicate_by_label(&self, label: &str) -> Result<&PredicateSpec> {
        self.by_label
            .get(label)
            .map(|&i| &self.predicates[i])
            .ok_or_else(|| Error::PredicateNotFound(label.to_string()))
    }

    pub fn node_type(&self, type_iri: &str) -> Result<&NodeTypeSpec> {
        self.by_type
            .get(type_iri)
            .map(|&i| &self.node_types[i])
            .ok_or_else(|| Error::UnsupportedNodeType(type_iri.to_string()))
    }

    pub fn node_kind(&self, type_iri: &str) -> Result<NodeKind> {
        self.node_type(type_iri).map(|t| t.kind)
    }

    pub fn root_type(&self) -> &str {
        self.node_types
            .iter()
            .find(|t| t.kind == NodeKind::Root)
            .map(|t| t.id.as_str())
            .unwrap_or(sdoc::ROOT)
    }

    /// Whether `label` may be set on nodes of `type_iri`.
    pub fn allows(&self, type_iri: &str, label: &str) -> Result<bool> {
        Ok(self.node_type(type_iri)?.predicates.iter().any(|l| l == label))
    }
}

impl Default for Ontology {
    fn default() -> Self {
        use ValueKind::*;

        let predicates = vec![
            PredicateSpec::new(rdf::TYPE, "type", Resource),
            PredicateSpec::new(sdoc::FIRST_CHILD, "firstChild", Resource),
            PredicateSpec::new(sdoc::NEXT, "next", Resource),
            PredicateSpec::new(dct::TITLE, "title", String),
            PredicateSpec::new(dct::DESCRIPTION, "description", String),
            PredicateSpec::new(dct::CREATED, "created", Timestamp),
            PredicateSpec::new(dct::MODIFIED, "modified", Timestamp),
            PredicateSpec::new(sdoc::TEXT, "text", String),
            PredicateSpec::new(sdoc::BOLD, "bold", Boolean),
            PredicateSpec::new(sdoc::ITALIC, "italic", Boolean),
            PredicateSpec::new(sdoc::UNDERLINE, "underline", Boolean),
            PredicateSpec::new(sdoc::STRIKETHROUGH, "strikethrough", Boolean),
            PredicateSpec::new(sdoc::LINK, "link", Resource),
            PredicateSpec::new(sdoc::INDENT, "indent", Integer),
        ];

        let block = ["indent"];
        let node_types = vec![
            NodeTypeSpec::new(
                sdoc::ROOT,
                NodeKind::Root,
                &["title", "description", "created", "modified"],
            ),
            NodeTypeSpec::new(sdoc::PARAGRAPH, NodeKind::Branch, &block),
            NodeTypeSpec::new(sdoc::HEADING, NodeKind::Branch, &block),
            NodeTypeSpec::new(sdoc::NUMBERED_LIST, NodeKind::Branch, &block),
            NodeTypeSpec::new(sdoc::BULLETED_LIST, NodeKind::Branch, &block),
            NodeTypeSpec::new(sdoc::LIST_ITEM, NodeKind::Branch, &block),
            NodeTypeSpec::new(
                sdoc::LEAF,
                NodeKind::Leaf,
                &["text", "bold", "italic", "underline", "strikethrough", "link"],
            ),
        ];

        let by_label = predicates
            .iter()
            .enumerate()
            .map(|(i, p)| (p.label.clone(), i))
            .collect();
        let by_type = node_types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Self {
            predicates,
            node_types,
            by_label,
            by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary_is_consistent() {
        let builtin = Ontology::default();
        let rebuilt =
            Ontology::new(builtin.predicates().to_vec(), builtin.node_types().to_vec()).unwrap();
        assert_eq!(rebuilt.root_type(), sdoc::ROOT);
        assert_eq!(rebuilt.node_kind(sdoc::LEAF).unwrap(), NodeKind::Leaf);
        assert!(rebuilt.allows(sdoc::LEAF, "bold").unwrap());
        assert!(!rebuilt.allows(sdoc::PARAGRAPH, "bold").unwrap());
    }

    #[test]
    fn loads_custom_vocabulary_from_json() {
        let json = r#"{
            "predicates": [
                {"id": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type", "label": "type", "kind": "resource"},
                {"id": "http://www.solidoc.net/ontologies#firstChild", "label": "firstChild", "kind": "resource"},
                {"id": "http://www.solidoc.net/ontologies#nextNode", "label": "next", "kind": "resource"},
                {"id": "http://example.org/level", "label": "level", "kind": "integer", "default": 1}
            ],
            "node_types": [
                {"id": "http://example.org/Doc", "kind": "root"},
                {"id": "http://example.org/Section", "kind": "branch", "predicates": ["level"]}
            ]
        }"#;
        let ontology = Ontology::from_json(json).unwrap();
        assert_eq!(ontology.root_type(), "http://example.org/Doc");
        let level = ontology.predicate_by_label("level").unwrap();
        assert_eq!(level.default_value().unwrap(), Value::Integer(1));
    }

    #[test]
    fn rejects_duplicated_predicates() {
        let mut predicates = Ontology::default().predicates().to_vec();
        predicates.push(PredicateSpec::new(sdoc::TEXT, "body", ValueKind::String));
        let err = Ontology::new(predicates, Ontology::default().node_types().to_vec()).unwrap_err();
        assert!(matches!(err, Error::DuplicatePredicate(_)));
    }

    #[test]
    fn requires_structural_predicates() {
        let predicates: Vec<_> = Ontology::default()
            .predicates()
            .iter()
            .filter(|p| p.id != sdoc::NEXT)
            .cloned()
            .collect();
        let err = Ontology::new(predicates, Ontology::default().node_types().to_vec()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_node_type_fails_fast() {
        let err = Ontology::default().node_kind("http://example.org/Table").unwrap_err();
        assert!(matches!(err, Error::UnsupportedNodeType(_)));
    }
}
