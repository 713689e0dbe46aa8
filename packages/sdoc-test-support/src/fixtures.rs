use sdoc_core::vocab::{dct, rdf, sdoc, xsd};
use sdoc_core::{NodeDescription, Term, Triple};
use serde_json::{json, Value as JsonValue};

pub const PAGE_ID: &str = "http://example.org/alice";
pub const TITLE: &str = "Homepage";

/// Paragraphs in the fixture document; each holds [`LEAVES_PER_PARAGRAPH`] leaves.
pub const PARAGRAPHS: usize = 3;
pub const LEAVES_PER_PARAGRAPH: usize = 3;

pub fn para_id(i: usize) -> String {
    format!("{PAGE_ID}#p{i}")
}

pub fn text_id(i: usize) -> String {
    format!("{PAGE_ID}#t{i}")
}

/// Leaf `i`: text `"text i"`, bold.
pub fn text(i: usize) -> NodeDescription {
    NodeDescription::new(text_id(i), sdoc::LEAF)
        .with_property("text", format!("text {i}"))
        .with_property("bold", true)
}

/// Paragraph `i` with its three leaves.
pub fn para(i: usize) -> NodeDescription {
    let first = i * LEAVES_PER_PARAGRAPH;
    NodeDescription::new(para_id(i), sdoc::PARAGRAPH)
        .with_children((first..first + LEAVES_PER_PARAGRAPH).map(text).collect())
}

/// Expected projection of the full fixture document.
pub fn page_json() -> JsonValue {
    let children: Vec<_> = (0..PARAGRAPHS)
        .map(|i| serde_json::to_value(para(i)).unwrap_or(JsonValue::Null))
        .collect();
    json!({
        "id": PAGE_ID,
        "type": sdoc::ROOT,
        "title": TITLE,
        "children": children,
    })
}

/// Only the typed, titled root.
pub fn root_triples() -> Vec<Triple> {
    vec![
        Triple::new(PAGE_ID, rdf::TYPE, Term::iri(sdoc::ROOT)),
        Triple::new(PAGE_ID, dct::TITLE, Term::string(TITLE)),
    ]
}

/// The full fixture document as stored.
pub fn page_triples() -> Vec<Triple> {
    let mut triples = root_triples();
    triples.push(Triple::new(PAGE_ID, sdoc::FIRST_CHILD, Term::iri(para_id(0))));

    for i in 0..PARAGRAPHS {
        let first = i * LEAVES_PER_PARAGRAPH;
        triples.push(Triple::new(para_id(i), rdf::TYPE, Term::iri(sdoc::PARAGRAPH)));
        triples.push(Triple::new(para_id(i), sdoc::FIRST_CHILD, Term::iri(text_id(first))));
        if i + 1 < PARAGRAPHS {
            triples.push(Triple::new(para_id(i), sdoc::NEXT, Term::iri(para_id(i + 1))));
        }

        for j in first..first + LEAVES_PER_PARAGRAPH {
            triples.push(Triple::new(text_id(j), rdf::TYPE, Term::iri(sdoc::LEAF)));
            triples.push(Triple::new(text_id(j), sdoc::TEXT, Term::string(format!("text {j}"))));
            triples.push(Triple::new(text_id(j), sdoc::BOLD, Term::literal("true", xsd::BOOLEAN)));
            if j + 1 < first + LEAVES_PER_PARAGRAPH {
                triples.push(Triple::new(text_id(j), sdoc::NEXT, Term::iri(text_id(j + 1))));
            }
        }
    }
    triples
}
