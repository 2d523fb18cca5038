//! FHIR conversion core for clinical intake data.
//!
//! This crate turns loosely-structured intake records (JSON objects typed only at the JSON
//! level) into FHIR `Patient` and `Practitioner` resources, rejecting any record that breaks a
//! field-level or cross-field rule.
//!
//! The pipeline runs in a fixed order for both resource kinds:
//! - normalisation: decode the raw JSON into a canonical input shape (scalar-or-list fields
//!   become lists)
//! - composite validation: validate each structured sub-object (name, address, contact point,
//!   identifier, language, qualification, coding)
//! - aggregate validation: cardinality and cross-object invariants over the whole record
//! - assembly: mechanical mapping of the validated record onto the FHIR JSON shape
//!
//! This crate performs no network or file I/O. Callers supply the raw record and consume the
//! resource or the [`ConversionFailure`].

pub mod aggregate;
pub mod codes;
pub mod config;
pub mod converter;
pub mod datatypes;
pub mod error;
pub mod normalize;
pub mod patient;
pub mod practitioner;
pub mod validation;
pub mod wire;

// Re-export facades
pub use converter::{convert, Converter, Resource, ResourceKind, UnknownResourceKind};
pub use patient::{Patient, PatientRecord, PatientResource};
pub use practitioner::{Practitioner, PractitionerRecord, PractitionerResource};

// Re-export public domain-level types
pub use codes::{AddressType, AddressUse, ContactSystem, ContactUse, Gender, NameUse, WireEnum};
pub use config::{ConfigError, ConverterConfig};
pub use datatypes::{
    Address, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Language,
    Qualification,
};
pub use error::{ConversionFailure, DateError, FhirError, FieldError, Invariant};

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
