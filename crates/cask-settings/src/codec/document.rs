//! Settings documents.
//!
//! A document is an ordered list of `(field name, value)` pairs. On disk it is
//! an indented UTF-8 JSON object. Reading is lenient about encodings: a UTF-8
//! BOM is skipped, UTF-16 with a BOM is decoded, and trailing NUL padding left
//! by older writers is ignored.

use serde_json::{Map, Value};

use crate::access::value_kind;
use crate::error::{Result, SettingsError};

/// Parsed settings document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse stored bytes. The root must be an object.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = decode_text(bytes)?;
        let text = text.trim_end_matches(['\0', ' ', '\t', '\r', '\n']);

        let root: Value =
            serde_json::from_str(text).map_err(|e| SettingsError::InvalidDocument {
                reason: e.to_string(),
            })?;

        match root {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(SettingsError::InvalidDocument {
                reason: format!("expected an object at the root, found {}", value_kind(&other)),
            }),
        }
    }

    /// Render as indented UTF-8 JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.fields)
            .map_err(|source| SettingsError::Serialization { source })
    }

    /// Render as an indented JSON string.
    pub fn to_pretty_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.fields)
            .map_err(|source| SettingsError::Serialization { source })
    }

    /// Fields in document order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Add or replace a field. A new field goes to the end.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Remove a field, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

fn decode_text(bytes: &[u8]) -> Result<String> {
    let invalid = |reason: &str| SettingsError::InvalidDocument {
        reason: reason.to_string(),
    };

    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            String::from_utf8(rest.to_vec()).map_err(|_| invalid("invalid UTF-8"))
        }
        [0xFF, 0xFE, rest @ ..] => {
            decode_utf16(rest, u16::from_le_bytes).ok_or_else(|| invalid("invalid UTF-16"))
        }
        [0xFE, 0xFF, rest @ ..] => {
            decode_utf16(rest, u16::from_be_bytes).ok_or_else(|| invalid("invalid UTF-16"))
        }
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| invalid("invalid UTF-8")),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if !bytes.len().is_multiple_of(2) {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_order_is_preserved() {
        let doc = Document::from_bytes(br#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let names: Vec<_> = doc.fields().map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_appends_and_remove_keeps_order() {
        let mut doc = Document::new();
        doc.insert("b", json!(1));
        doc.insert("a", json!(2));
        doc.insert("c", json!(3));
        doc.remove("a");

        let names: Vec<_> = doc.fields().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[test]
    fn test_root_must_be_object() {
        let err = Document::from_bytes(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidDocument { .. }));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_malformed_json_is_invalid() {
        let err = Document::from_bytes(b"{\"a\": ").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidDocument { .. }));
    }

    #[test]
    fn test_utf8_bom_and_nul_padding() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(br#"{"a": "x"}"#);
        bytes.extend_from_slice(&[0, 0, 0]);

        let doc = Document::from_bytes(&bytes).unwrap();
        assert_eq!(doc.get("a"), Some(&json!("x")));
    }

    #[test]
    fn test_utf16_le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in r#"{"name": "Grüße"}"#.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let doc = Document::from_bytes(&bytes).unwrap();
        assert_eq!(doc.get("name"), Some(&json!("Grüße")));
    }

    #[test]
    fn test_utf16_be() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in r#"{"n": 1}"#.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }

        let doc = Document::from_bytes(&bytes).unwrap();
        assert_eq!(doc.get("n"), Some(&json!(1)));
    }

    #[test]
    fn test_output_is_indented_utf8() {
        let mut doc = Document::new();
        doc.insert("a", json!(1));

        let text = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }
}
