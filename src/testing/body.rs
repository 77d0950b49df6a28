//! Best-effort decoding of response bodies

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Maximum characters of a raw body kept for diagnostics
const DIAGNOSTIC_LIMIT: usize = 500;

/// What a response body turned out to be
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedBody {
    /// Valid JSON
    Json { value: Value },
    /// No body at all (or only whitespace)
    Empty,
    /// A body that is not JSON
    Undecodable { raw: String, error: String },
}

impl DecodedBody {
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return DecodedBody::Empty;
        }
        match serde_json::from_str(text) {
            Ok(value) => DecodedBody::Json { value },
            Err(e) => DecodedBody::Undecodable {
                raw: truncate(text),
                error: e.to_string(),
            },
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, DecodedBody::Json { .. })
    }

    /// The decoded value, or `{}` when there is none
    pub fn value(&self) -> Value {
        match self {
            DecodedBody::Json { value } => value.clone(),
            _ => json!({}),
        }
    }

    /// Decode into an endpoint's response shape
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            DecodedBody::Json { value } => T::deserialize(value).ok(),
            _ => None,
        }
    }

    /// Text shown next to a failed step
    pub fn diagnostic(&self) -> String {
        match self {
            DecodedBody::Json { value } => value.to_string(),
            DecodedBody::Empty => "<empty body>".to_string(),
            DecodedBody::Undecodable { raw, .. } => raw.clone(),
        }
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(DIAGNOSTIC_LIMIT) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
