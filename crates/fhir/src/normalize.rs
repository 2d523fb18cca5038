//! Input normalisation.
//!
//! Intake forms send list-valued fields (`given`, `prefix`, `suffix`, `line`) either as a
//! bare string or as a list. Those fields are declared as [`OneOrMany`] in the input wire
//! structs, so the scalar/list choice is resolved once while decoding and every validator
//! downstream only ever sees a `Vec<String>`.
//!
//! [`decode`] also reports structural mismatches (wrong JSON type, root not an object) with a
//! best-effort path to the offending field.

use crate::FhirError;
use serde::de::{self, DeserializeOwned, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// A field value that arrived either as one string or as a sequence of strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Canonical list form. Always returns a fresh vector.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Normalise an optional scalar-or-list field: absent stays absent.
pub fn normalize_list(value: Option<OneOrMany>) -> Option<Vec<String>> {
    value.map(OneOrMany::into_vec)
}

impl<'de> Deserialize<'de> for OneOrMany {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OneOrManyVisitor;

        impl<'de> Visitor<'de> for OneOrManyVisitor {
            type Value = OneOrMany;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a sequence of strings")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(OneOrMany::One(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(OneOrMany::One(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(value) = seq.next_element::<String>()? {
                    values.push(value);
                }
                Ok(OneOrMany::Many(values))
            }
        }

        deserializer.deserialize_any(OneOrManyVisitor)
    }
}

/// Decode a raw JSON record into an input wire struct.
///
/// `record` names the record kind for the root-level error message.
pub(crate) fn decode<T: DeserializeOwned>(raw: &Value, record: &str) -> Result<T, FhirError> {
    if !raw.is_object() {
        return Err(FhirError::Normalization {
            path: "<root>".into(),
            reason: format!("expected a {record} record object, got {}", json_type(raw)),
        });
    }

    serde_path_to_error::deserialize::<_, T>(raw).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        FhirError::Normalization {
            path,
            reason: source.to_string(),
        }
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
