//! Values stored in the cluster and their byte encoding.

use serde_json::Value;

/// A cached value.
///
/// Structured values travel as JSON text; strings and raw bytes are stored
/// as-is. On the way back, bytes that parse as a JSON object or array become
/// [`CacheValue::Json`] again, other UTF-8 becomes [`CacheValue::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Text(String),
    Json(Value),
    Bytes(Vec<u8>),
}

impl CacheValue {
    /// Encodes the value for a node write.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Bytes(bytes) => bytes.clone(),
        }
    }

    /// Decodes bytes read from a node.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value @ (Value::Object(_) | Value::Array(_))) => Self::Json(value),
                _ => Self::Text(text),
            },
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }

    /// Returns the text if this is a [`CacheValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the JSON value if this is a [`CacheValue::Json`].
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}
