//! Schema validation for extracted JSON spans.
//!
//! Each record type implements [`Schema`] with a pure `from_value` function
//! that checks field presence, field types, and applies the coercions that
//! schema declares. Validation is all-or-nothing: a record either comes back
//! fully typed or not at all.

use serde_json::{Map, Value};
use thiserror::Error as ThisError;

/// A record type that can be validated from a JSON document.
pub trait Schema: Sized {
    /// Schema name used in errors, logs, and metrics.
    const NAME: &'static str;

    /// Builds the record from a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a required field is missing or a
    /// field does not match its declared type after coercion.
    fn from_value(value: &Value) -> Result<Self, ValidationError>;
}

/// Why a span failed validation against a schema.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    /// The span is not a parseable JSON document.
    #[error("{schema}: malformed JSON: {cause}")]
    Malformed {
        /// Target schema.
        schema: &'static str,
        /// Parser message.
        cause: String,
    },

    /// The document parsed but its top level is not an object.
    #[error("{schema}: expected a JSON object, found {found}")]
    NotAnObject {
        /// Target schema.
        schema: &'static str,
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// A required field is absent.
    #[error("{schema}: missing required field '{field}'")]
    MissingField {
        /// Target schema.
        schema: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A field is present but has the wrong type or an out-of-domain value.
    #[error("{schema}: field '{field}' {reason}")]
    InvalidField {
        /// Target schema.
        schema: &'static str,
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Parses `span` as JSON and validates it against schema `S`.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] if `span` is not JSON, otherwise
/// whatever `S::from_value` rejects.
#[tracing::instrument(level = "trace", skip_all, fields(schema = S::NAME, span_length = span.len()))]
pub fn validate<S: Schema>(span: &str) -> Result<S, ValidationError> {
    let value: Value = serde_json::from_str(span).map_err(|e| ValidationError::Malformed {
        schema: S::NAME,
        cause: e.to_string(),
    })?;
    S::from_value(&value)
}

/// Borrowed view over a JSON object's fields, scoped to one schema.
///
/// Accessors report errors against the schema name so callers can `?` their
/// way through a record.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    schema: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Views `value` as the top-level object of schema `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAnObject`] if `value` is not an object.
    pub fn of<S: Schema>(value: &'a Value) -> Result<Self, ValidationError> {
        value.as_object().map_or_else(
            || {
                Err(ValidationError::NotAnObject {
                    schema: S::NAME,
                    found: json_type_name(value),
                })
            },
            |map| {
                Ok(Self {
                    schema: S::NAME,
                    map,
                })
            },
        )
    }

    /// Returns the raw value of a required field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if the field is absent.
    pub fn required(&self, field: &'static str) -> Result<&'a Value, ValidationError> {
        self.map.get(field).ok_or(ValidationError::MissingField {
            schema: self.schema,
            field,
        })
    }

    /// Returns a required string field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or not a string.
    pub fn string(&self, field: &'static str) -> Result<String, ValidationError> {
        let value = self.required(field)?;
        value
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| self.type_mismatch(field, "a string", value))
    }

    /// Returns a required numeric field as `f64`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or not a number.
    pub fn number(&self, field: &'static str) -> Result<f64, ValidationError> {
        let value = self.required(field)?;
        value
            .as_f64()
            .ok_or_else(|| self.type_mismatch(field, "a number", value))
    }

    /// Returns a required object field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or not an object.
    pub fn object(&self, field: &'static str) -> Result<Map<String, Value>, ValidationError> {
        let value = self.required(field)?;
        value
            .as_object()
            .cloned()
            .ok_or_else(|| self.type_mismatch(field, "an object", value))
    }

    /// Builds an [`ValidationError::InvalidField`] for this schema.
    #[must_use]
    pub fn invalid(&self, field: &'static str, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidField {
            schema: self.schema,
            field,
            reason: reason.into(),
        }
    }

    fn type_mismatch(&self, field: &'static str, expected: &str, found: &Value) -> ValidationError {
        self.invalid(
            field,
            format!("must be {expected}, found {}", json_type_name(found)),
        )
    }
}

/// Returns the JSON type name of a value, for error messages.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
