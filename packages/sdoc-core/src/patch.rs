use std::fmt;

use crate::value::Value;

/// One clause of a SPARQL update document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateClause {
    /// Remove every triple of `subject` in `graph`.
    DeleteSubject { graph: String, subject: String },
    /// Remove the triple(s) for `(subject, predicate)`.
    DeleteProperty {
        graph: String,
        subject: String,
        predicate: String,
    },
    InsertProperty {
        graph: String,
        subject: String,
        predicate: String,
        object: Value,
    },
}

impl fmt::Display for UpdateClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateClause::DeleteSubject { graph, subject } => {
                writeln!(f, "DELETE WHERE {{ GRAPH <{graph}> {{ <{subject}> ?p ?o }} }};")
            }
            UpdateClause::DeleteProperty {
                graph,
                subject,
                predicate,
            } => writeln!(
                f,
                "DELETE WHERE {{ GRAPH <{graph}> {{ <{subject}> <{predicate}> ?o }} }};"
            ),
            UpdateClause::InsertProperty {
                graph,
                subject,
                predicate,
                object,
            } => writeln!(
                f,
                "INSERT DATA {{ GRAPH <{graph}> {{ <{subject}> <{predicate}> {object}}} }};"
            ),
        }
    }
}

/// An ordered list of update clauses; renders as one concatenated update document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patch(Vec<UpdateClause>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: UpdateClause) {
        self.0.push(clause);
    }

    pub fn append(&mut self, other: Patch) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clauses(&self) -> &[UpdateClause] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UpdateClause> {
        self.0.iter()
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for clause in &self.0 {
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a UpdateClause;
    type IntoIter = std::slice::Iter<'a, UpdateClause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<UpdateClause> for Patch {
    fn from_iter<I: IntoIterator<Item = UpdateClause>>(iter: I) -> Self {
        Patch(iter.into_iter().collect())
    }
}
