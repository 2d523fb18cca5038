//! Converter facade.
//!
//! Single entry point for callers: `convert(kind, raw) -> Result<Resource, ConversionFailure>`.
//! The facade runs decode/normalise, composite validation, record invariants and assembly in
//! that order, and wraps whatever failed into one [`ConversionFailure`].

use crate::config::ConverterConfig;
use crate::patient::{Patient, PatientResource};
use crate::practitioner::{Practitioner, PractitionerResource};
use crate::{ConversionFailure, FhirError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of resource to produce from an intake record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patient,
    Practitioner,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Patient, ResourceKind::Practitioner];

    /// FHIR `resourceType` literal.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Practitioner => "Practitioner",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported resource kind '{0}' (expected Patient or Practitioner)")]
pub struct UnknownResourceKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(ResourceKind::Patient),
            "practitioner" => Ok(ResourceKind::Practitioner),
            _ => Err(UnknownResourceKind(s.to_string())),
        }
    }
}

/// A converted FHIR resource.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Resource {
    Patient(PatientResource),
    Practitioner(PractitionerResource),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Patient(_) => ResourceKind::Patient,
            Resource::Practitioner(_) => ResourceKind::Practitioner,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Render as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialisation fails.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Intake-to-FHIR converter.
///
/// Holds only configuration; every call is independent and the converter can be shared
/// freely across threads.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Convert a raw intake record into a resource of the given kind.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] if any stage rejects the record. No partial resource
    /// is ever produced.
    pub fn convert(
        &self,
        kind: ResourceKind,
        raw: &serde_json::Value,
    ) -> Result<Resource, ConversionFailure> {
        match kind {
            ResourceKind::Patient => self.convert_patient(raw).map(Resource::Patient),
            ResourceKind::Practitioner => {
                self.convert_practitioner(raw).map(Resource::Practitioner)
            }
        }
    }

    pub fn convert_patient(
        &self,
        raw: &serde_json::Value,
    ) -> Result<PatientResource, ConversionFailure> {
        tracing::debug!(kind = "Patient", "validating intake record");
        let record = Patient::validate(raw, &self.config)
            .map_err(|causes| reject(ResourceKind::Patient, causes))?;
        tracing::debug!(kind = "Patient", names = record.names.len(), "assembling resource");
        Ok(Patient::assemble(record, self.next_id()))
    }

    pub fn convert_practitioner(
        &self,
        raw: &serde_json::Value,
    ) -> Result<PractitionerResource, ConversionFailure> {
        tracing::debug!(kind = "Practitioner", "validating intake record");
        let record = Practitioner::validate(raw, &self.config)
            .map_err(|causes| reject(ResourceKind::Practitioner, causes))?;
        tracing::debug!(
            kind = "Practitioner",
            names = record.names.len(),
            qualifications = record.qualifications.len(),
            "assembling resource"
        );
        Ok(Practitioner::assemble(record, self.next_id()))
    }

    fn next_id(&self) -> Option<String> {
        self.config
            .assign_resource_ids()
            .then(|| Uuid::new_v4().to_string())
    }
}

/// Convert with the default configuration.
///
/// # Errors
///
/// See [`Converter::convert`].
pub fn convert(
    kind: ResourceKind,
    raw: &serde_json::Value,
) -> Result<Resource, ConversionFailure> {
    Converter::default().convert(kind, raw)
}

/// Log the rejection without field values and flatten it into the external error.
fn reject(kind: ResourceKind, causes: Vec<FhirError>) -> ConversionFailure {
    for cause in &causes {
        let location = match cause {
            FhirError::FieldValidation { field, .. } => field.as_str(),
            FhirError::Normalization { path, .. } => path.as_str(),
            FhirError::InvariantViolation(_) => "<record>",
        };
        tracing::debug!(kind = kind.as_str(), failure = cause.kind_label(), location, "rejected");
    }
    tracing::warn!(
        kind = kind.as_str(),
        failures = causes.len(),
        "intake record rejected"
    );
    ConversionFailure::from_causes(causes)
}
