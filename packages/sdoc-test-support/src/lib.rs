#![forbid(unsafe_code)]
//! Shared test support for sdoc suites: the three-paragraph fixture document
//! and an in-memory store that applies generated patches.

pub mod fixtures;
pub mod pod;

pub use fixtures::*;
pub use pod::{assert_pod_consistency, MemoryPod};
