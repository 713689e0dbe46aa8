use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ontology::PredicateSpec;
use crate::patch::{Patch, UpdateClause};
use crate::value::{Term, Value, ValueKind};

/// Schema entry for one property, bound to the graph its patches target.
///
/// A predicate holds no per-document state and is shared by every subject
/// of its graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    id: String,
    label: String,
    graph: String,
    kind: ValueKind,
    default: Value,
}

impl Predicate {
    pub fn new(spec: &PredicateSpec, graph: impl Into<String>) -> Result<Self> {
        Ok(Self {
            id: spec.id.clone(),
            label: spec.label.clone(),
            graph: graph.into(),
            kind: spec.kind,
            default: spec.default_value()?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn graph(&self) -> &str {
        &self.graph
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Classify a triple object and check it against this predicate's range.
    pub fn value_from_term(&self, term: &Term) -> Result<Value> {
        let value = Value::from_term(term)?;
        self.check(&value)?;
        Ok(value)
    }

    pub(crate) fn check(&self, value: &Value) -> Result<()> {
        if value.kind() != self.kind {
            return Err(Error::UnsupportedDatatype(format!(
                "{:?} value for {} which ranges over {:?}",
                value.kind(),
                self.id,
                self.kind
            )));
        }
        Ok(())
    }

    /// Clauses turning `baseline` into `working` for `(subject, self)`.
    ///
    /// Nothing to delete when the baseline is the default, nothing to insert
    /// when the working value is.
    pub fn patch(&self, subject: &str, working: &Value, baseline: &Value) -> Patch {
        let mut patch = Patch::new();
        if working == baseline {
            return patch;
        }
        if *baseline != self.default {
            patch.push(UpdateClause::DeleteProperty {
                graph: self.graph.clone(),
                subject: subject.to_string(),
                predicate: self.id.clone(),
            });
        }
        if *working != self.default {
            patch.push(UpdateClause::InsertProperty {
                graph: self.graph.clone(),
                subject: subject.to_string(),
                predicate: self.id.clone(),
                object: working.clone(),
            });
        }
        patch
    }
}

/// Every predicate of one graph, keyed by id and by label.
#[derive(Clone, Debug, Default)]
pub struct PredicateTable {
    by_id: HashMap<String, Predicate>,
    labels: HashMap<String, String>,
}

impl PredicateTable {
    pub fn insert(&mut self, predicate: Predicate) -> Result<&Predicate> {
        if self.by_id.contains_key(predicate.id()) || self.labels.contains_key(predicate.label()) {
            return Err(Error::DuplicatePredicate(predicate.id().to_string()));
        }
        let id = predicate.id().to_string();
        self.labels.insert(predicate.label().to_string(), id.clone());
        Ok(self.by_id.entry(id).or_insert(predicate))
    }

    pub fn get(&self, id: &str) -> Result<&Predicate> {
        self.by_id
            .get(id)
            .ok_or_else(|| Error::PredicateNotFound(id.to_string()))
    }

    pub fn by_label(&self, label: &str) -> Result<&Predicate> {
        self.labels
            .get(label)
            .and_then(|id| self.by_id.get(id))
            .ok_or_else(|| Error::PredicateNotFound(label.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{rdf, sdoc};

    const PAGE: &str = "http://example.org/alice";
    const NODE: &str = "http://example.org/alice#t8";

    fn predicate(id: &str, label: &str, kind: ValueKind) -> Predicate {
        Predicate::new(&PredicateSpec::new(id, label, kind), PAGE).unwrap()
    }

    fn delete_clause(pred: &str) -> String {
        format!("DELETE WHERE {{ GRAPH <{PAGE}> {{ <{NODE}> <{pred}> ?o }} }};\n")
    }

    #[test]
    fn reference_predicate_patches() {
        let ty = predicate(rdf::TYPE, "type", ValueKind::Resource);
        let initial = Value::Resource(sdoc::LEAF.into());
        let updated = Value::Resource(sdoc::PARAGRAPH.into());
        let insert = format!(
            "INSERT DATA {{ GRAPH <{PAGE}> {{ <{NODE}> <{}> <{}>}} }};\n",
            rdf::TYPE,
            sdoc::PARAGRAPH
        );

        assert!(ty.patch(NODE, &initial, &initial).is_empty());
        assert_eq!(
            ty.patch(NODE, &updated, &initial).to_string(),
            delete_clause(rdf::TYPE) + &insert
        );
        assert_eq!(
            ty.patch(NODE, ty.default_value(), &initial).to_string(),
            delete_clause(rdf::TYPE)
        );
        assert_eq!(ty.patch(NODE, &updated, ty.default_value()).to_string(), insert);
    }

    #[test]
    fn text_predicate_patches() {
        let text = predicate(sdoc::TEXT, "text", ValueKind::String);
        let initial = Value::String("text 8".into());
        let updated = Value::String("Hello world!".into());
        let insert = format!(
            "INSERT DATA {{ GRAPH <{PAGE}> {{ <{NODE}> <{}> \"Hello world!\"}} }};\n",
            sdoc::TEXT
        );

        assert_eq!(text.patch(NODE, &initial, &initial).to_string(), "");
        assert_eq!(
            text.patch(NODE, &updated, &initial).to_string(),
            delete_clause(sdoc::TEXT) + &insert
        );
        assert_eq!(
            text.patch(NODE, text.default_value(), &initial).to_string(),
            delete_clause(sdoc::TEXT)
        );
        assert_eq!(text.patch(NODE, &updated, text.default_value()).to_string(), insert);
    }

    #[test]
    fn boolean_predicate_renders_bare() {
        let bold = predicate(sdoc::BOLD, "bold", ValueKind::Boolean);
        let patch = bold.patch(NODE, &Value::Boolean(true), bold.default_value());
        assert_eq!(
            patch.to_string(),
            format!(
                "INSERT DATA {{ GRAPH <{PAGE}> {{ <{NODE}> <{}> true}} }};\n",
                sdoc::BOLD
            )
        );
    }

    #[test]
    fn table_rejects_duplicates() {
        let mut table = PredicateTable::default();
        table.insert(predicate(sdoc::TEXT, "text", ValueKind::String)).unwrap();
        let err = table
            .insert(predicate(sdoc::TEXT, "text", ValueKind::String))
            .unwrap_err();
        assert_eq!(err, Error::DuplicatePredicate(sdoc::TEXT.into()));
        assert_eq!(table.by_label("text").unwrap().id(), sdoc::TEXT);
        assert!(matches!(table.get(sdoc::BOLD), Err(Error::PredicateNotFound(_))));
    }

    #[test]
    fn rejects_values_outside_range() {
        let bold = predicate(sdoc::BOLD, "bold", ValueKind::Boolean);
        let err = bold.value_from_term(&Term::string("yes")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDatatype(_)));
    }
}
