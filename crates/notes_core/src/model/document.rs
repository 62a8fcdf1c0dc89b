//! Schema-flexible document representation.
//!
//! # Responsibility
//! - Hold one JSON object as stored in a collection.
//! - Provide typed field access used by model mappers.
//!
//! # Invariants
//! - A document is always a JSON object, never an array or scalar.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while decoding a document or mapping it to a model.
#[derive(Debug)]
pub enum DocumentError {
    /// Stored body is not valid JSON or not a JSON object.
    Malformed(serde_json::Error),
    /// A required key is absent.
    MissingField(&'static str),
    /// A key holds a value of an unexpected JSON type.
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
    },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed document: {err}"),
            Self::MissingField(field) => write!(f, "document is missing field `{field}`"),
            Self::UnexpectedType { field, expected } => {
                write!(f, "document field `{field}` is not a {expected}")
            }
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

/// One stored record: a JSON object with arbitrary keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Reads a required string field.
    pub fn require_str(&self, field: &'static str) -> Result<&str, DocumentError> {
        match self.0.get(field) {
            Some(Value::String(value)) => Ok(value.as_str()),
            Some(_) => Err(DocumentError::UnexpectedType {
                field,
                expected: "string",
            }),
            None => Err(DocumentError::MissingField(field)),
        }
    }

    /// Serializes the document into its stored JSON text.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Parses stored JSON text; anything but an object is rejected.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let map: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self(map))
    }
}
