//! Composite state identifiers
//!
//! Remote resources are frequently addressed by more than one path
//! parameter (`federation_settings_id` + `okta_idp_id`, `project_id` +
//! `request_id`, ...). The host only stores a single opaque string per
//! resource instance, so those parameters are packed into a [`StateId`].
//!
//! # Format
//!
//! ```text
//! base64(key) ":" base64(value) [ "-" base64(key) ":" base64(value) ]*
//! ```
//!
//! Keys are emitted in sorted order so the same mapping always produces the
//! same identifier. The standard base64 alphabet contains neither `-` nor
//! `:`, so arbitrary keys and values survive the round trip.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between encoded `key:value` entries
pub const ENTRY_SEPARATOR: char = '-';

/// Separator between an encoded key and its encoded value
pub const KEY_VALUE_SEPARATOR: char = ':';

/// Decoded contents of a [`StateId`]
pub type StateFields = BTreeMap<String, String>;

// Identifiers written before padding was enforced must still decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("state id needs at least one field")]
    NoFields,

    #[error("state id field name is empty")]
    EmptyKey,

    #[error("state id field `{0}` has an empty value")]
    EmptyValue(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodingError {
    #[error("state id is empty")]
    Empty,

    #[error("state id segment `{0}` is missing the `:` delimiter")]
    MissingDelimiter(String),

    #[error("state id segment `{0}` has more than one `:` delimiter")]
    ExtraDelimiter(String),

    #[error("state id segment `{segment}` is not valid base64: {reason}")]
    InvalidBase64 { segment: String, reason: String },

    #[error("state id segment `{0}` does not decode to UTF-8")]
    InvalidUtf8(String),

    #[error("state id contains field `{0}` more than once")]
    DuplicateField(String),

    #[error("state id has fields [{found}], expected [{expected}]")]
    FieldMismatch { expected: String, found: String },
}

/// Opaque identifier persisted by the host for one resource instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    /// Encode a mapping of named fields
    pub fn encode(fields: &StateFields) -> Result<Self, EncodingError> {
        if fields.is_empty() {
            return Err(EncodingError::NoFields);
        }

        let mut entries = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            if key.is_empty() {
                return Err(EncodingError::EmptyKey);
            }
            if value.is_empty() {
                return Err(EncodingError::EmptyValue(key.clone()));
            }
            entries.push(format!(
                "{}{}{}",
                STANDARD.encode(key),
                KEY_VALUE_SEPARATOR,
                STANDARD.encode(value)
            ));
        }

        Ok(Self(entries.join(&ENTRY_SEPARATOR.to_string())))
    }

    /// Encode from `(key, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, EncodingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: StateFields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::encode(&fields)
    }

    /// Wrap a raw token read back from host state without validating it.
    ///
    /// Validation happens on [`StateId::decode`], which is where a corrupt
    /// token has to be reported anyway.
    pub fn from_raw(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode all fields
    pub fn decode(&self) -> Result<StateFields, DecodingError> {
        if self.0.is_empty() {
            return Err(DecodingError::Empty);
        }

        let mut fields = StateFields::new();
        for segment in self.0.split(ENTRY_SEPARATOR) {
            let (key, value) = segment
                .split_once(KEY_VALUE_SEPARATOR)
                .ok_or_else(|| DecodingError::MissingDelimiter(segment.to_string()))?;
            if value.contains(KEY_VALUE_SEPARATOR) {
                return Err(DecodingError::ExtraDelimiter(segment.to_string()));
            }

            let key = decode_part(segment, key)?;
            let value = decode_part(segment, value)?;
            if fields.contains_key(&key) {
                return Err(DecodingError::DuplicateField(key));
            }
            fields.insert(key, value);
        }

        Ok(fields)
    }

    /// Decode and require exactly the given field names
    pub fn decode_expecting(&self, keys: &[&str]) -> Result<StateFields, DecodingError> {
        let fields = self.decode()?;

        let matches = fields.len() == keys.len() && keys.iter().all(|k| fields.contains_key(*k));
        if !matches {
            let mut expected: Vec<&str> = keys.to_vec();
            expected.sort_unstable();
            return Err(DecodingError::FieldMismatch {
                expected: expected.join(", "),
                found: fields.keys().cloned().collect::<Vec<_>>().join(", "),
            });
        }

        Ok(fields)
    }
}

fn decode_part(segment: &str, part: &str) -> Result<String, DecodingError> {
    let bytes = LENIENT
        .decode(part)
        .map_err(|e| DecodingError::InvalidBase64 {
            segment: segment.to_string(),
            reason: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|_| DecodingError::InvalidUtf8(segment.to_string()))
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StateId {
    type Err = DecodingError;

    /// Parse and validate a token
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::from_raw(s);
        id.decode()?;
        Ok(id)
    }
}

impl AsRef<str> for StateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> StateFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_identity_provider_roundtrip() {
        let input = fields(&[("federation_settings_id", "fs1"), ("okta_idp_id", "idp1")]);
        let id = StateId::encode(&input).unwrap();

        assert_eq!(id.decode().unwrap(), input);
    }

    #[test]
    fn test_known_encoding() {
        let id = StateId::from_pairs([("project_id", "p1"), ("request_id", "r1")]).unwrap();

        // base64("project_id"):base64("p1")-base64("request_id"):base64("r1")
        assert_eq!(id.as_str(), "cHJvamVjdF9pZA==:cDE=-cmVxdWVzdF9pZA==:cjE=");
    }

    #[test]
    fn test_encoding_is_order_independent() {
        let a = StateId::from_pairs([("b", "2"), ("a", "1")]).unwrap();
        let b = StateId::from_pairs([("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_delimiters_inside_values_survive() {
        let input = fields(&[("instance_name", "my-instance:1"), ("name", "a-b-c")]);
        let id = StateId::encode(&input).unwrap();
        assert_eq!(id.decode().unwrap(), input);
    }

    #[test]
    fn test_encode_rejects_empty_parts() {
        assert_eq!(
            StateId::encode(&StateFields::new()),
            Err(EncodingError::NoFields)
        );
        assert_eq!(
            StateId::encode(&fields(&[("", "x")])),
            Err(EncodingError::EmptyKey)
        );
        assert_eq!(
            StateId::encode(&fields(&[("project_id", "")])),
            Err(EncodingError::EmptyValue("project_id".to_string()))
        );
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(StateId::from_raw("").decode(), Err(DecodingError::Empty));
    }

    #[test]
    fn test_decode_missing_delimiter() {
        let err = StateId::from_raw("cDE=").decode().unwrap_err();
        assert!(matches!(err, DecodingError::MissingDelimiter(_)));
    }

    #[test]
    fn test_decode_extra_delimiter() {
        let err = StateId::from_raw("cDE=:cDE=:cDE=").decode().unwrap_err();
        assert!(matches!(err, DecodingError::ExtraDelimiter(_)));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = StateId::from_raw("not base64!:cDE=").decode().unwrap_err();
        assert!(matches!(err, DecodingError::InvalidBase64 { .. }));
    }

    #[test]
    fn test_decode_plain_import_id_fails() {
        // An import id that was never encoded must not decode silently.
        let err = StateId::from_raw("5f4d3c2b1a0f9e8d7c6b5a49-0oa1b2c3d4")
            .decode()
            .unwrap_err();
        assert!(matches!(err, DecodingError::MissingDelimiter(_)));
    }

    #[test]
    fn test_decode_accepts_unpadded() {
        let id = StateId::from_raw("cHJvamVjdF9pZA:cDE");
        assert_eq!(id.decode().unwrap(), fields(&[("project_id", "p1")]));
    }

    #[test]
    fn test_decode_duplicate_field() {
        let err = StateId::from_raw("YQ==:MQ==-YQ==:Mg==").decode().unwrap_err();
        assert_eq!(err, DecodingError::DuplicateField("a".to_string()));
    }

    #[test]
    fn test_decode_expecting_field_count() {
        let id = StateId::from_pairs([("project_id", "p1")]).unwrap();
        let err = id
            .decode_expecting(&["project_id", "request_id"])
            .unwrap_err();
        assert_eq!(
            err,
            DecodingError::FieldMismatch {
                expected: "project_id, request_id".to_string(),
                found: "project_id".to_string(),
            }
        );

        let id = StateId::from_pairs([("project_id", "p1"), ("request_id", "r1")]).unwrap();
        assert!(id.decode_expecting(&["request_id", "project_id"]).is_ok());
    }

    #[test]
    fn test_from_str_validates() {
        assert!("garbage".parse::<StateId>().is_err());
        let id = StateId::from_pairs([("a", "1")]).unwrap();
        assert_eq!(id.as_str().parse::<StateId>().unwrap(), id);
    }

    #[test]
    fn test_serde_transparent() {
        let id = StateId::from_pairs([("a", "1")]).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"YQ==:MQ==\"");
    }
}
