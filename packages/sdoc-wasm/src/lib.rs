#![forbid(unsafe_code)]
//! WASM-friendly bridge for sdoc pages.
//! Exposes a small wasm-bindgen surface that matches what a JS editor needs:
//! load from parsed triples, apply operations, read the patch, commit or undo.

use std::sync::Arc;

use sdoc_core::vocab::rdf;
use sdoc_core::{Ontology, Operation, Page, Term, Triple};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

/// Triple as JS RDF parsers hand them over: IRIs carry no datatype.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct JsTriple {
    subject: String,
    predicate: String,
    object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsSubjectState {
    id: String,
    is_inserted: bool,
    is_deleted: bool,
}

fn js_to_triple(js: JsTriple) -> Triple {
    let object = match (js.datatype, js.language) {
        (_, Some(_)) => Term::literal(js.object, rdf::LANG_STRING),
        (Some(datatype), None) => Term::literal(js.object, datatype),
        (None, None) => Term::iri(js.object),
    };
    Triple::new(js.subject, js.predicate, object)
}

fn parse_triples(json: &str) -> Result<Vec<Triple>, String> {
    let parsed: Vec<JsTriple> = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(parsed.into_iter().map(js_to_triple).collect())
}

fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmPage {
    inner: Page,
}

#[wasm_bindgen]
impl WasmPage {
    /// Load a page with the built-in vocabulary from a JSON array of triples.
    #[wasm_bindgen(constructor)]
    pub fn new(id: String, triples_json: String) -> Result<WasmPage, JsValue> {
        let triples = parse_triples(&triples_json).map_err(js_err)?;
        let inner = Page::from_triples(id, &triples).map_err(js_err)?;
        Ok(WasmPage { inner })
    }

    /// Load a page under a custom vocabulary given as ontology JSON.
    #[wasm_bindgen(js_name = withOntology)]
    pub fn with_ontology(
        id: String,
        triples_json: String,
        ontology_json: String,
    ) -> Result<WasmPage, JsValue> {
        let ontology = Ontology::from_json(&ontology_json).map_err(js_err)?;
        let triples = parse_triples(&triples_json).map_err(js_err)?;
        let inner = Page::load(id, &triples, Arc::new(ontology)).map_err(js_err)?;
        Ok(WasmPage { inner })
    }

    pub fn id(&self) -> String {
        self.inner.id().to_string()
    }

    pub fn apply(&mut self, op_json: String) -> Result<(), JsValue> {
        let op = Operation::from_json(&op_json).map_err(js_err)?;
        self.inner.apply(&op).map_err(js_err)
    }

    #[wasm_bindgen(js_name = sparqlForUpdate)]
    pub fn sparql_for_update(&self) -> Result<String, JsValue> {
        self.inner.sparql_for_update().map_err(js_err)
    }

    pub fn commit(&mut self) -> Result<(), JsValue> {
        self.inner.commit().map_err(js_err)
    }

    pub fn undo(&mut self) -> Result<(), JsValue> {
        self.inner.undo().map_err(js_err)
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        let json = self.inner.to_json().map_err(js_err)?;
        json.serialize(&Serializer::json_compatible()).map_err(js_err)
    }

    #[wasm_bindgen(js_name = subjectState)]
    pub fn subject_state(&self, id: String) -> Result<JsValue, JsValue> {
        let subject = self.inner.subject(&id).map_err(js_err)?;
        let state = JsSubjectState {
            id,
            is_inserted: subject.is_inserted(),
            is_deleted: subject.is_deleted(),
        };
        state.serialize(&Serializer::json_compatible()).map_err(js_err)
    }
}
