//! IRIs of the vocabularies a document graph is written in.

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

pub mod dct {
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
}

pub mod sdoc {
    // node types
    pub const ROOT: &str = "http://www.solidoc.net/ontologies#Root";
    pub const PARAGRAPH: &str = "http://www.solidoc.net/ontologies#Paragraph";
    pub const HEADING: &str = "http://www.solidoc.net/ontologies#Heading";
    pub const NUMBERED_LIST: &str = "http://www.solidoc.net/ontologies#NumberedList";
    pub const BULLETED_LIST: &str = "http://www.solidoc.net/ontologies#BulletedList";
    pub const LIST_ITEM: &str = "http://www.solidoc.net/ontologies#ListItem";
    pub const LEAF: &str = "http://www.solidoc.net/ontologies#Leaf";

    // structural predicates
    pub const FIRST_CHILD: &str = "http://www.solidoc.net/ontologies#firstChild";
    pub const NEXT: &str = "http://www.solidoc.net/ontologies#nextNode";

    // content predicates
    pub const TEXT: &str = "http://www.solidoc.net/ontologies#text";
    pub const BOLD: &str = "http://www.solidoc.net/ontologies#bold";
    pub const ITALIC: &str = "http://www.solidoc.net/ontologies#italic";
    pub const UNDERLINE: &str = "http://www.solidoc.net/ontologies#underline";
    pub const STRIKETHROUGH: &str = "http://www.solidoc.net/ontologies#strikethrough";
    pub const LINK: &str = "http://www.solidoc.net/ontologies#link";
    pub const INDENT: &str = "http://www.solidoc.net/ontologies#indent";
}

/// Predicates that thread the tree together; never projected as properties.
pub const STRUCTURAL: [&str; 3] = [rdf::TYPE, sdoc::FIRST_CHILD, sdoc::NEXT];

pub fn is_structural(predicate: &str) -> bool {
    STRUCTURAL.contains(&predicate)
}
