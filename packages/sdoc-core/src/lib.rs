#![forbid(unsafe_code)]
//! Editing engine for structured documents stored as RDF triples.
//! A page is loaded from the triples of one named graph, edited in memory through
//! editor operations, and persisted by sending the SPARQL update patch it generates.
//! Parsing triples and talking to the store are left to the host.

pub mod error;
pub mod exec;
pub mod graph;
pub mod node;
pub mod ontology;
pub mod ops;
pub mod page;
pub mod patch;
pub mod predicate;
pub mod subject;
pub mod value;
pub mod vocab;

pub use error::{Error, Result};
pub use graph::Graph;
pub use node::{Branch, Children, Container, Leaf, Node, Root, APPEND, TO_END};
pub use ontology::{NodeKind, NodeTypeSpec, Ontology, PredicateSpec};
pub use ops::{NodeDescription, Operation};
pub use page::Page;
pub use patch::{Patch, UpdateClause};
pub use predicate::{Predicate, PredicateTable};
pub use subject::Subject;
pub use value::{Term, Triple, Value, ValueKind};
