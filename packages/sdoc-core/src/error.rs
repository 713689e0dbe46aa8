use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("duplicated subject creation: {0}")]
    DuplicateSubject(String),
    #[error("duplicated predicate creation: {0}")]
    DuplicatePredicate(String),
    #[error("subject not found: {0}")]
    SubjectNotFound(String),
    #[error("predicate not found: {0}")]
    PredicateNotFound(String),
    #[error("invalid parent: {0}")]
    InvalidParent(String),
    #[error("cannot find a descendant at path {0}")]
    PathNotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("unsupported datatype: {0}")]
    UnsupportedDatatype(String),
    #[error("unsupported node type: {0}")]
    UnsupportedNodeType(String),
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
    #[error("invalid ontology configuration: {0}")]
    Config(String),
}
