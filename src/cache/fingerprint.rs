//! Query fingerprints.
//!
//! A fingerprint is a fixed-width digest of a query descriptor. Descriptors are
//! serialized through serde into a JSON value tree and then written out in a
//! canonical form (object keys sorted at every depth, no whitespace) before
//! hashing, so the digest depends only on field names and values, never on
//! struct declaration order or on how `serde_json` happens to order its maps.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of digest bytes kept in a fingerprint (128 bits).
const FINGERPRINT_BYTES: usize = 16;

/// Length of the rendered hexadecimal fingerprint.
pub const FINGERPRINT_HEX_LEN: usize = FINGERPRINT_BYTES * 2;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("query could not be serialized for fingerprinting: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Lowercase hexadecimal digest of a canonically serialized query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint any serializable query descriptor.
    pub fn of<T>(query: &T) -> Result<Self, FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(query)?;
        Ok(Self::of_value(&value))
    }

    fn of_value(value: &Value) -> Self {
        let canonical = canonical_bytes(value);
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        let digest = hasher.finalize().to_vec();
        Self(hex::encode(&digest[..FINGERPRINT_BYTES]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical byte form of a JSON value: compact JSON with object keys sorted.
fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(128);
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|(left, _), (right, _)| left.cmp(right));

            out.push(b'{');
            for (index, (key, item)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push(b',');
                }
                write_scalar(&Value::String(key.clone()), out);
                out.push(b':');
                write_canonical(item, out);
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        scalar => write_scalar(scalar, out),
    }
}

// Scalars render through serde_json's own Display so escaping and number
// formatting stay identical between runs.
fn write_scalar(value: &Value, out: &mut Vec<u8>) {
    out.extend_from_slice(value.to_string().as_bytes());
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Forward {
        alpha: u32,
        beta: Option<String>,
    }

    #[derive(Serialize)]
    struct Reversed {
        beta: Option<String>,
        alpha: u32,
    }

    #[test]
    fn renders_fixed_width_lowercase_hex() {
        let fingerprint = Fingerprint::of(&json!({ "sortBy": "test" })).expect("fingerprint");
        assert_eq!(fingerprint.as_str().len(), FINGERPRINT_HEX_LEN);
        assert!(
            fingerprint
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn field_declaration_order_does_not_matter() {
        let forward = Forward {
            alpha: 7,
            beta: Some("x".to_string()),
        };
        let reversed = Reversed {
            beta: Some("x".to_string()),
            alpha: 7,
        };

        assert_eq!(
            Fingerprint::of(&forward).expect("forward"),
            Fingerprint::of(&reversed).expect("reversed")
        );
    }

    #[test]
    fn canonical_form_sorts_nested_keys() {
        let value = json!({ "b": { "z": 1, "a": [true, null] }, "a": "s" });
        assert_eq!(
            String::from_utf8(canonical_bytes(&value)).expect("utf8"),
            r#"{"a":"s","b":{"a":[true,null],"z":1}}"#
        );
    }

    #[test]
    fn null_and_empty_string_are_distinct() {
        let null = Fingerprint::of(&json!({ "sortBy": null })).expect("null");
        let empty = Fingerprint::of(&json!({ "sortBy": "" })).expect("empty");
        assert_ne!(null, empty);
    }

    #[test]
    fn number_and_numeric_string_are_distinct() {
        let number = Fingerprint::of(&json!({ "pageNumber": 1 })).expect("number");
        let text = Fingerprint::of(&json!({ "pageNumber": "1" })).expect("text");
        assert_ne!(number, text);
    }

    #[test]
    fn map_with_non_string_keys_is_an_error() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1u8);
        assert!(matches!(
            Fingerprint::of(&map),
            Err(FingerprintError::Serialize(_))
        ));
    }

    #[test]
    fn stable_across_calls() {
        let value = json!({ "isDescending": false, "pageNumber": 1, "pageSize": 20 });
        let first = Fingerprint::of(&value).expect("first");
        let second = Fingerprint::of(&value).expect("second");
        assert_eq!(first, second);
    }
}
