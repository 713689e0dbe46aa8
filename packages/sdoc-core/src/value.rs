use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::vocab::{rdf, xsd};

/// Object position of a parsed triple, as handed over by the RDF parser.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Iri(String),
    Literal { value: String, datatype: String },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: datatype.into(),
        }
    }

    /// Plain literal, typed `xsd:string`.
    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(value, xsd::STRING)
    }
}

/// One statement of the document graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Resource,
    String,
    Boolean,
    Integer,
    Timestamp,
}

impl ValueKind {
    /// The value a property holds when nothing was ever written to it.
    pub fn zero(self) -> Value {
        match self {
            ValueKind::Resource => Value::Resource(String::new()),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Boolean => Value::Boolean(false),
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Timestamp => Value::Timestamp(DateTime::<Utc>::default()),
        }
    }
}

/// Typed property value. Values are replaced, never mutated in place.
///
/// An empty `Resource` is the "no link" value of reference properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Resource(String),
    String(String),
    Boolean(bool),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Resource(_) => ValueKind::Resource,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    /// Classify a parsed triple object.
    pub fn from_term(term: &Term) -> Result<Self> {
        let (lexical, datatype) = match term {
            Term::Iri(iri) => return Ok(Value::Resource(iri.clone())),
            Term::Literal { value, datatype } => (value.as_str(), datatype.as_str()),
        };
        match datatype {
            xsd::STRING | rdf::LANG_STRING => Ok(Value::String(lexical.to_string())),
            xsd::BOOLEAN => match lexical {
                "true" | "1" => Ok(Value::Boolean(true)),
                "false" | "0" => Ok(Value::Boolean(false)),
                other => Err(Error::InvalidLiteral(format!("{other:?} is not an xsd:boolean"))),
            },
            xsd::INTEGER | xsd::INT | xsd::LONG => lexical
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| Error::InvalidLiteral(format!("{lexical:?}: {e}"))),
            xsd::DATE_TIME => parse_timestamp(lexical).map(Value::Timestamp),
            other => Err(Error::UnsupportedDatatype(other.to_string())),
        }
    }

    pub fn to_term(&self) -> Term {
        match self {
            Value::Resource(iri) => Term::iri(iri.clone()),
            Value::String(s) => Term::string(s.clone()),
            Value::Boolean(b) => Term::literal(b.to_string(), xsd::BOOLEAN),
            Value::Integer(i) => Term::literal(i.to_string(), xsd::INTEGER),
            Value::Timestamp(t) => Term::literal(format_timestamp(t), xsd::DATE_TIME),
        }
    }

    /// Convert a JSON property value (projection or operation payload) into `kind`.
    pub fn from_json(kind: ValueKind, json: &JsonValue) -> Result<Self> {
        let value = match (kind, json) {
            (ValueKind::Resource, JsonValue::String(s)) => Some(Value::Resource(s.clone())),
            (ValueKind::String, JsonValue::String(s)) => Some(Value::String(s.clone())),
            (ValueKind::Boolean, JsonValue::Bool(b)) => Some(Value::Boolean(*b)),
            (ValueKind::Integer, JsonValue::Number(n)) => n.as_i64().map(Value::Integer),
            (ValueKind::Timestamp, JsonValue::String(s)) => {
                Some(Value::Timestamp(parse_timestamp(s)?))
            }
            _ => None,
        };
        value.ok_or_else(|| Error::InvalidArgument(format!("{json} is not a {kind:?} value")))
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Resource(s) | Value::String(s) => JsonValue::String(s.clone()),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::from(*i),
            Value::Timestamp(t) => JsonValue::String(format_timestamp(t)),
        }
    }

    /// The referenced IRI, or `None` for literals and the empty reference.
    pub fn as_resource(&self) -> Option<&str> {
        match self {
            Value::Resource(iri) if !iri.is_empty() => Some(iri),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// SPARQL / N-Triples rendering of the value in object position.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Resource(iri) => write!(f, "<{iri}>"),
            Value::String(s) => write!(f, "\"{}\"", escape(s)),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Timestamp(t) => write!(f, "\"{}\"^^<{}>", format_timestamp(t), xsd::DATE_TIME),
        }
    }
}

fn parse_timestamp(lexical: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(lexical.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidLiteral(format!("{lexical:?}: {e}")))
}

fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_terms_by_datatype() {
        assert_eq!(
            Value::from_term(&Term::iri("http://example.org/a")).unwrap(),
            Value::Resource("http://example.org/a".into())
        );
        assert_eq!(
            Value::from_term(&Term::string("hi")).unwrap(),
            Value::String("hi".into())
        );
        assert_eq!(
            Value::from_term(&Term::literal("true", xsd::BOOLEAN)).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            Value::from_term(&Term::literal("-7", xsd::INTEGER)).unwrap(),
            Value::Integer(-7)
        );
        let epoch = Value::from_term(&Term::literal("1970-01-01T00:00:00Z", xsd::DATE_TIME)).unwrap();
        assert_eq!(epoch, ValueKind::Timestamp.zero());
    }

    #[test]
    fn rejects_unknown_datatype() {
        let err = Value::from_term(&Term::literal("1.5", "http://www.w3.org/2001/XMLSchema#double"))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDatatype(_)));
    }

    #[test]
    fn rejects_malformed_lexical_forms() {
        assert!(matches!(
            Value::from_term(&Term::literal("yes", xsd::BOOLEAN)),
            Err(Error::InvalidLiteral(_))
        ));
        assert!(matches!(
            Value::from_term(&Term::literal("yesterday", xsd::DATE_TIME)),
            Err(Error::InvalidLiteral(_))
        ));
    }

    #[test]
    fn renders_sparql_objects() {
        assert_eq!(Value::Resource("http://a".into()).to_string(), "<http://a>");
        assert_eq!(Value::String("say \"hi\"\n".into()).to_string(), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Integer(3).to_string(), "3");
        assert_eq!(
            ValueKind::Timestamp.zero().to_string(),
            "\"1970-01-01T00:00:00.000Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime>"
        );
    }

    #[test]
    fn json_conversion_checks_kind() {
        let json = serde_json::json!(true);
        assert_eq!(Value::from_json(ValueKind::Boolean, &json).unwrap(), Value::Boolean(true));
        assert!(matches!(
            Value::from_json(ValueKind::String, &json),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(Value::Integer(25).to_json(), serde_json::json!(25));
    }

    #[test]
    fn empty_reference_is_no_link() {
        assert_eq!(ValueKind::Resource.zero().as_resource(), None);
        assert_eq!(Value::Resource("x".into()).as_resource(), Some("x"));
    }
}
