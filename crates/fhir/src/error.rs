//! Error taxonomy for the conversion pipeline.
//!
//! Internal stages return [`FhirError`], a tagged union that keeps the failure kind. Only the
//! converter facade flattens failures into the externally visible [`ConversionFailure`], and
//! even then the structured causes stay reachable through [`ConversionFailure::causes`].

use std::fmt;

/// Why a date string was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("date must be in YYYY-MM-DD format")]
    Format,

    #[error("not a valid calendar date")]
    NotACalendarDate,

    #[error("year {year} must be between {min} and {max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
}

/// Why a single scalar field was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("required field is missing")]
    Missing,

    #[error("value cannot be empty")]
    Empty,

    #[error("invalid date: {reason}")]
    InvalidDate { reason: DateError },

    #[error("invalid phone number length: {digit_count} digits (expected 8 to 15)")]
    InvalidPhone { digit_count: usize },

    #[error("invalid email format: {value:?}")]
    InvalidEmail { value: String },

    #[error(
        "'{got}' is not a valid {field} (expected one of: {})",
        .allowed.join(", ")
    )]
    InvalidEnumValue {
        field: &'static str,
        got: String,
        allowed: &'static [&'static str],
    },
}

/// A cross-field or cross-object rule over a whole record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Invariant {
    #[error("at least one name is required")]
    NoNames,

    #[error("at least one name must have either a family name or a given name")]
    NoFamilyOrGiven,

    #[error("qualifications[{index}].code.coding must contain at least one coding")]
    EmptyQualificationCoding { index: usize },
}

/// Errors raised inside the conversion pipeline.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FhirError {
    /// The raw input could not be coerced into the canonical input shape.
    #[error("input schema mismatch at {path}: {reason}")]
    Normalization { path: String, reason: String },

    #[error("{field}: {reason}")]
    FieldValidation { field: String, reason: FieldError },

    #[error("{0}")]
    InvariantViolation(Invariant),
}

impl FhirError {
    /// The field reason, if this is a field-level failure.
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            FhirError::FieldValidation { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// The violated invariant, if this is a record-level failure.
    pub fn invariant(&self) -> Option<&Invariant> {
        match self {
            FhirError::InvariantViolation(rule) => Some(rule),
            _ => None,
        }
    }

    /// Short, value-free label used in log lines.
    pub(crate) fn kind_label(&self) -> &'static str {
        match self {
            FhirError::Normalization { .. } => "normalization",
            FhirError::FieldValidation { .. } => "field",
            FhirError::InvariantViolation(_) => "invariant",
        }
    }
}

impl From<Invariant> for FhirError {
    fn from(rule: Invariant) -> Self {
        FhirError::InvariantViolation(rule)
    }
}

/// The single error kind returned by the converter facade.
///
/// Conversion is all-or-nothing: when this is returned no resource was produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConversionFailure {
    message: String,
    causes: Vec<FhirError>,
}

impl ConversionFailure {
    pub(crate) fn from_causes(causes: Vec<FhirError>) -> Self {
        let detail = causes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            message: format!("Failed to convert to FHIR format: {detail}"),
            causes,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every failure collected for the record, in input order.
    pub fn causes(&self) -> &[FhirError] {
        &self.causes
    }

    pub fn first_cause(&self) -> Option<&FhirError> {
        self.causes.first()
    }
}

impl From<FhirError> for ConversionFailure {
    fn from(cause: FhirError) -> Self {
        ConversionFailure::from_causes(vec![cause])
    }
}

/// Dotted/indexed location of a field inside the input record, e.g. `names[1].use`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldPath(String);

impl FieldPath {
    pub(crate) fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    pub(crate) fn index(&self, i: usize) -> Self {
        Self(format!("{}[{i}]", self.0))
    }

    pub(crate) fn field(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    pub(crate) fn reject(&self, reason: FieldError) -> FhirError {
        FhirError::FieldValidation {
            field: self.0.clone(),
            reason,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
