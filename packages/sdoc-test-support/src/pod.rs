use std::sync::Arc;

use sdoc_core::{Page, Patch, Triple, UpdateClause};

/// In-memory stand-in for the remote store of one named graph.
#[derive(Clone, Debug, Default)]
pub struct MemoryPod {
    graph: String,
    triples: Vec<Triple>,
}

impl MemoryPod {
    pub fn new(graph: impl Into<String>, triples: &[Triple]) -> Self {
        Self {
            graph: graph.into(),
            triples: triples.to_vec(),
        }
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Execute the clauses in order; clauses addressed to other graphs are ignored.
    pub fn apply(&mut self, patch: &Patch) {
        for clause in patch {
            match clause {
                UpdateClause::DeleteSubject { graph, subject } if *graph == self.graph => {
                    self.triples.retain(|t| t.subject != *subject);
                }
                UpdateClause::DeleteProperty {
                    graph,
                    subject,
                    predicate,
                } if *graph == self.graph => {
                    self.triples
                        .retain(|t| !(t.subject == *subject && t.predicate == *predicate));
                }
                UpdateClause::InsertProperty {
                    graph,
                    subject,
                    predicate,
                    object,
                } if *graph == self.graph => {
                    let triple = Triple::new(subject.clone(), predicate.clone(), object.to_term());
                    if !self.triples.contains(&triple) {
                        self.triples.push(triple);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Send the page's pending patch to a pod holding `stored`, reload the page
/// from the result and check it projects exactly like the in-memory page.
///
/// Returns the pod contents after the patch.
pub fn assert_pod_consistency(stored: &[Triple], page: &Page) -> Vec<Triple> {
    let mut pod = MemoryPod::new(page.id(), stored);
    let patch = page.patch_for_update().expect("patch generation failed");
    pod.apply(&patch);

    let ontology = Arc::new(page.graph().ontology().clone());
    let reloaded = Page::load(page.id(), pod.triples(), ontology).unwrap_or_else(|e| {
        panic!("patched pod no longer loads: {e}\npatch:\n{patch}")
    });
    assert_eq!(
        reloaded.to_json().expect("projection of reloaded page"),
        page.to_json().expect("projection of edited page"),
        "patched pod diverges from the edited page; patch:\n{patch}"
    );
    pod.triples
}
