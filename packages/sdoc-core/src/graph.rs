use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ontology::{Ontology, PredicateSpec};
use crate::patch::Patch;
use crate::predicate::{Predicate, PredicateTable};
use crate::subject::Subject;
use crate::value::{Triple, Value};
use crate::vocab::rdf;

/// Registry of every subject and predicate of one document graph.
///
/// The graph exclusively owns its subjects; tree nodes are views that look
/// subjects up by id.
#[derive(Clone, Debug)]
pub struct Graph {
    id: String,
    ontology: Arc<Ontology>,
    subjects: BTreeMap<String, Subject>,
    predicates: PredicateTable,
}

impl Graph {
    /// Graph with one predicate per ontology entry and no subjects yet.
    pub fn new(id: impl Into<String>, ontology: Arc<Ontology>) -> Result<Self> {
        let mut graph = Self {
            id: id.into(),
            ontology: ontology.clone(),
            subjects: BTreeMap::new(),
            predicates: PredicateTable::default(),
        };
        for spec in ontology.predicates() {
            graph.create_predicate(spec)?;
        }
        Ok(graph)
    }

    /// Build the registry from the triples of one named graph.
    ///
    /// Subjects are instantiated from `rdf:type` statements first; the root is
    /// created even when no statement names it. Every statement is then
    /// recorded as persisted state. A statement about a subject that was never
    /// typed fails with [`Error::SubjectNotFound`].
    pub fn load(id: impl Into<String>, ontology: Arc<Ontology>, triples: &[Triple]) -> Result<Self> {
        let mut graph = Self::new(id, ontology)?;

        for triple in triples.iter().filter(|t| t.predicate == rdf::TYPE) {
            if graph.subjects.contains_key(&triple.subject) {
                warn!(subject = %triple.subject, "subject typed more than once");
                continue;
            }
            graph.create_subject(&triple.subject)?;
        }
        if !graph.subjects.contains_key(&graph.id) {
            let root = graph.id.clone();
            graph.create_subject(&root)?;
        }

        for triple in triples {
            let pred = graph.predicates.get(&triple.predicate)?;
            let value = pred.value_from_term(&triple.object)?;
            let subject = graph
                .subjects
                .get_mut(&triple.subject)
                .ok_or_else(|| Error::SubjectNotFound(triple.subject.clone()))?;
            subject.load(pred, value)?;
        }

        debug!(graph = %graph.id, subjects = graph.subjects.len(), triples = triples.len(), "loaded graph");
        Ok(graph)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn predicates(&self) -> &PredicateTable {
        &self.predicates
    }

    pub fn create_predicate(&mut self, spec: &PredicateSpec) -> Result<&Predicate> {
        let predicate = Predicate::new(spec, self.id.clone())?;
        self.predicates.insert(predicate)
    }

    pub fn predicate(&self, id: &str) -> Result<&Predicate> {
        self.predicates.get(id)
    }

    pub fn predicate_by_label(&self, label: &str) -> Result<&Predicate> {
        self.predicates.by_label(label)
    }

    pub fn create_subject(&mut self, id: &str) -> Result<&mut Subject> {
        if self.subjects.contains_key(id) {
            return Err(Error::DuplicateSubject(id.to_string()));
        }
        Ok(self
            .subjects
            .entry(id.to_string())
            .or_insert_with(|| Subject::new(id, self.id.clone())))
    }

    pub fn contains_subject(&self, id: &str) -> bool {
        self.subjects.contains_key(id)
    }

    pub fn subject(&self, id: &str) -> Result<&Subject> {
        self.subjects
            .get(id)
            .ok_or_else(|| Error::SubjectNotFound(id.to_string()))
    }

    pub fn subject_mut(&mut self, id: &str) -> Result<&mut Subject> {
        self.subjects
            .get_mut(id)
            .ok_or_else(|| Error::SubjectNotFound(id.to_string()))
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn root(&self) -> Result<&Subject> {
        self.subject(&self.id)
    }

    /// Working value of `(subject, predicate)`, or the predicate default.
    pub fn value(&self, subject: &str, predicate: &str) -> Result<Value> {
        let pred = self.predicates.get(predicate)?;
        Ok(self.subject(subject)?.property(pred).clone())
    }

    /// Write a working value. Writing the predicate default clears the
    /// property instead, so the projection matches a reload of the patched store.
    pub fn set_value(&mut self, subject: &str, predicate: &str, value: Value) -> Result<()> {
        let pred = self.predicates.get(predicate)?;
        let subject = self
            .subjects
            .get_mut(subject)
            .ok_or_else(|| Error::SubjectNotFound(subject.to_string()))?;
        if value == *pred.default_value() {
            subject.reset_property(pred);
            return Ok(());
        }
        subject.set_property(pred, value)
    }

    pub fn reset_value(&mut self, subject: &str, predicate: &str) -> Result<()> {
        let pred = self.predicates.get(predicate)?;
        let subject = self
            .subjects
            .get_mut(subject)
            .ok_or_else(|| Error::SubjectNotFound(subject.to_string()))?;
        subject.reset_property(pred);
        Ok(())
    }

    /// Target of a reference property, `None` when unset.
    pub(crate) fn link(&self, subject: &str, predicate: &str) -> Result<Option<String>> {
        Ok(self.value(subject, predicate)?.as_resource().map(str::to_string))
    }

    pub(crate) fn set_link(&mut self, subject: &str, predicate: &str, target: Option<&str>) -> Result<()> {
        match target {
            Some(target) => self.set_value(subject, predicate, Value::Resource(target.to_string())),
            None => self.reset_value(subject, predicate),
        }
    }

    pub fn projection(&self, subject: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
        self.subject(subject)?.projection(&self.predicates)
    }

    pub fn patch_for_update(&self) -> Result<Patch> {
        let mut patch = Patch::new();
        for subject in self.subjects.values() {
            patch.append(subject.patch_for_update(&self.predicates)?);
        }
        Ok(patch)
    }

    pub fn sparql_for_update(&self) -> Result<String> {
        Ok(self.patch_for_update()?.to_string())
    }

    /// Persist the working state: tombstoned subjects leave the registry, the rest commit.
    pub fn commit(&mut self) -> Result<()> {
        let before = self.subjects.len();
        self.subjects.retain(|_, s| !s.is_deleted());
        for subject in self.subjects.values_mut() {
            subject.commit()?;
        }
        debug!(graph = %self.id, removed = before - self.subjects.len(), "committed");
        Ok(())
    }

    /// Discard the working state: unpersisted subjects leave the registry, the rest roll back.
    pub fn undo(&mut self) -> Result<()> {
        let before = self.subjects.len();
        self.subjects.retain(|_, s| !s.is_inserted());
        for subject in self.subjects.values_mut() {
            subject.undo()?;
        }
        debug!(graph = %self.id, removed = before - self.subjects.len(), "undone");
        Ok(())
    }
}
