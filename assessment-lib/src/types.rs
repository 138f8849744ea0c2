use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A decoded profile document.
///
/// The decoder does not look inside the record; callers that need a
/// concrete shape go through [`ProfileRecord::into_typed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord(Value);

impl ProfileRecord {
    pub fn new(value: Value) -> Self {
        ProfileRecord(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Validate the record against a caller-defined schema.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, PayloadError> {
        serde_json::from_value(self.0).map_err(PayloadError::Schema)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Success(ProfileRecord),
    Failure(DecodeFailure),
}

impl DecodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DecodeOutcome::Success(_))
    }

    pub fn record(&self) -> Option<&ProfileRecord> {
        match self {
            DecodeOutcome::Success(record) => Some(record),
            DecodeOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&DecodeFailure> {
        match self {
            DecodeOutcome::Success(_) => None,
            DecodeOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<ProfileRecord, DecodeFailure> {
        match self {
            DecodeOutcome::Success(record) => Ok(record),
            DecodeOutcome::Failure(failure) => Err(failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    #[error("no payload supplied")]
    Missing,

    #[error("payload could not be parsed: {0}")]
    ParseError(ParseErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("malformed percent-escape at byte {offset}")]
    MalformedEscape { offset: usize },

    #[error("decoded payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid JSON at line {line}, column {column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },
}

/// A template picked from the library. Only `id` is interpreted; every
/// other field is carried through the handoff untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateKey,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The `id` of a template as it appears in the JSON: a string or an
/// integer. It serializes back in its original form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateKey {
    Text(String),
    Integer(i64),
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Text(text) => f.write_str(text),
            TemplateKey::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl PartialEq<&str> for TemplateKey {
    fn eq(&self, other: &&str) -> bool {
        match self {
            TemplateKey::Text(text) => text == other,
            TemplateKey::Integer(n) => n.to_string() == *other,
        }
    }
}

impl Template {
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A template id that can be placed in a query string without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn parse(raw: &str) -> Result<Self, HandoffError> {
        let unreserved = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~');
        if raw.is_empty() || !raw.chars().all(unreserved) {
            return Err(HandoffError::UnsafeId(raw.to_string()));
        }
        Ok(TemplateId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A redirect target: an absolute path plus an optional raw query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub path: String,
    pub query: Option<String>,
}

impl Navigation {
    pub fn href(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record does not match the expected schema: {0}")]
    Schema(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("storage write rejected: {0}")]
    WriteRejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
#[error("navigation to {target} failed: {reason}")]
pub struct NavigationError {
    pub target: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("template id {0:?} is empty or contains characters that need escaping")]
    UnsafeId(String),

    #[error("feature {0:?} is disabled")]
    FeatureDisabled(String),

    #[error("template serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be an absolute path without query or fragment, got {value:?}")]
    InvalidPath { field: &'static str, value: String },

    #[error("storage_key must not be empty")]
    EmptyStorageKey,
}
