use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value as JsonValue};
use tracing::trace;

use crate::error::{Error, Result};
use crate::patch::{Patch, UpdateClause};
use crate::predicate::{Predicate, PredicateTable};
use crate::value::Value;
use crate::vocab::{is_structural, rdf};

/// Dual-state record for one resource: the persisted baseline and the
/// working copy edits are applied to.
#[derive(Clone, Debug, PartialEq)]
pub struct Subject {
    id: String,
    graph: String,
    baseline: BTreeMap<String, Value>,
    working: BTreeMap<String, Value>,
    deleted: bool,
    inserted: bool,
}

impl Subject {
    pub fn new(id: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            graph: graph.into(),
            baseline: BTreeMap::new(),
            working: BTreeMap::new(),
            deleted: false,
            inserted: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph(&self) -> &str {
        &self.graph
    }

    pub fn is_root(&self) -> bool {
        self.id == self.graph
    }

    /// Current `rdf:type`, if any.
    pub fn node_type(&self) -> Option<&str> {
        self.working.get(rdf::TYPE).and_then(Value::as_resource)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_inserted(&self) -> bool {
        self.inserted
    }

    /// Record a persisted value: it lands in both baseline and working state.
    pub fn load(&mut self, pred: &Predicate, value: Value) -> Result<()> {
        pred.check(&value)?;
        self.baseline.insert(pred.id().to_string(), value.clone());
        self.working.insert(pred.id().to_string(), value);
        Ok(())
    }

    pub fn property<'a>(&'a self, pred: &'a Predicate) -> &'a Value {
        self.working.get(pred.id()).unwrap_or(pred.default_value())
    }

    pub fn has_property(&self, pred: &Predicate) -> bool {
        self.working.contains_key(pred.id())
    }

    pub fn set_property(&mut self, pred: &Predicate, value: Value) -> Result<()> {
        pred.check(&value)?;
        self.working.insert(pred.id().to_string(), value);
        Ok(())
    }

    /// Drop the working value so the property reads as its default again.
    pub fn reset_property(&mut self, pred: &Predicate) {
        self.working.remove(pred.id());
    }

    /// Keyed record of the working state; structural predicates are left to the tree layer.
    pub fn projection(&self, predicates: &PredicateTable) -> Result<Map<String, JsonValue>> {
        let mut out = Map::new();
        out.insert("id".into(), JsonValue::String(self.id.clone()));
        if let Some(ty) = self.node_type() {
            out.insert("type".into(), JsonValue::String(ty.to_string()));
        }
        for (id, value) in &self.working {
            if is_structural(id) {
                continue;
            }
            let pred = predicates.get(id)?;
            out.insert(pred.label().to_string(), value.to_json());
        }
        Ok(out)
    }

    pub fn patch_for_update(&self, predicates: &PredicateTable) -> Result<Patch> {
        if self.deleted {
            if self.inserted {
                // never reached the store
                return Ok(Patch::new());
            }
            return Ok(Patch::from_iter([UpdateClause::DeleteSubject {
                graph: self.graph.clone(),
                subject: self.id.clone(),
            }]));
        }

        let mut patch = Patch::new();
        let ids: BTreeSet<&String> = self.baseline.keys().chain(self.working.keys()).collect();
        for id in ids {
            let pred = predicates.get(id)?;
            let working = self.working.get(id.as_str()).unwrap_or(pred.default_value());
            let baseline = self.baseline.get(id.as_str()).unwrap_or(pred.default_value());
            patch.append(pred.patch(&self.id, working, baseline));
        }
        trace!(subject = %self.id, clauses = patch.len(), "generated subject patch");
        Ok(patch)
    }

    pub fn commit(&mut self) -> Result<()> {
        if self.deleted {
            return Err(Error::InvalidState(format!(
                "a deleted subject should not be committed: {}",
                self.id
            )));
        }
        self.baseline = self.working.clone();
        self.inserted = false;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        if self.inserted {
            return Err(Error::InvalidState(format!(
                "a non-persisted subject should not be undone: {}",
                self.id
            )));
        }
        self.working = self.baseline.clone();
        self.deleted = false;
        Ok(())
    }

    pub fn mark_deleted(&mut self) -> Result<()> {
        if self.is_root() {
            return Err(Error::InvalidState(format!("the root is not removable: {}", self.id)));
        }
        self.deleted = true;
        Ok(())
    }

    pub fn mark_inserted(&mut self) {
        self.inserted = true;
    }

    /// Bring a tombstoned subject back with an empty working state.
    pub(crate) fn revive(&mut self) {
        self.working.clear();
        self.deleted = false;
    }
}
