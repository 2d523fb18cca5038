//! Patient intake conversion.
//!
//! Responsibilities:
//! - Decode the intake record into the lenient input wire model
//! - Validate it into a [`PatientRecord`] (field rules, then record invariants)
//! - Assemble the record into a FHIR `Patient` resource
//!
//! Notes:
//! - `maritalStatusCode` is an opaque code; it is not checked against the v3 value set
//! - `maritalStatus` is accepted as an alias, as older intake forms send it; when both keys
//!   are present `maritalStatusCode` wins

use crate::aggregate::{check_names, Collector};
use crate::codes::Gender;
use crate::config::ConverterConfig;
use crate::datatypes::{
    Address, AddressInput, ContactPoint, ContactPointInput, HumanName, HumanNameInput,
    Identifier, IdentifierInput, Language, LanguageInput,
};
use crate::error::FieldPath;
use crate::normalize::decode;
use crate::validation::{parse_enum, validate_date};
use crate::wire::{
    wire_list, AddressWire, CodeableConceptWire, CommunicationWire, ContactPointWire,
    HumanNameWire, IdentifierWire, MARITAL_STATUS_SYSTEM,
};
use crate::{ConversionFailure, FhirError};
use chrono::NaiveDate;
use intake_types::NonEmptyText;
use serde::{Deserialize, Serialize};

const RESOURCE_TYPE: &str = "Patient";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Validated patient intake record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRecord {
    pub identifiers: Vec<Identifier>,
    /// Never empty, and at least one entry has a family or given name.
    pub names: Vec<HumanName>,
    pub contacts: Vec<ContactPoint>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub addresses: Vec<Address>,
    pub marital_status_code: Option<NonEmptyText>,
    pub languages: Vec<Language>,
}

/// FHIR `Patient` resource as emitted by the converter.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PatientResource {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub active: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<IdentifierWire>,

    pub name: Vec<HumanNameWire>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPointWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,

    #[serde(rename = "maritalStatus", skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<CodeableConceptWire>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub communication: Vec<CommunicationWire>,
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient conversion operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
/// All methods are associated functions.
pub struct Patient;

impl Patient {
    /// Validate a raw intake record into a [`PatientRecord`].
    ///
    /// # Errors
    ///
    /// Returns every collected [`FhirError`] if the record is rejected:
    /// - a structural mismatch (wrong JSON type for a field) stops at decoding,
    /// - otherwise one failure per invalid object or scalar field, in input order,
    /// - or, when all fields pass, the first violated record invariant.
    pub fn validate(
        raw: &serde_json::Value,
        config: &ConverterConfig,
    ) -> Result<PatientRecord, Vec<FhirError>> {
        let input: PatientInput = decode(raw, RESOURCE_TYPE).map_err(|e| vec![e])?;
        input.into_record(config)
    }

    /// Assemble a validated record into a FHIR `Patient` resource.
    pub fn assemble(record: PatientRecord, id: Option<String>) -> PatientResource {
        PatientResource {
            resource_type: RESOURCE_TYPE,
            id,
            active: true,
            identifier: wire_list(record.identifiers),
            name: wire_list(record.names),
            telecom: wire_list(record.contacts),
            gender: record.gender,
            birth_date: record.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            address: wire_list(record.addresses),
            marital_status: record
                .marital_status_code
                .map(|code| CodeableConceptWire::single(MARITAL_STATUS_SYSTEM, code, None)),
            communication: wire_list(record.languages),
        }
    }

    /// Validate and assemble in one step, with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] carrying every collected cause.
    pub fn convert(raw: &serde_json::Value) -> Result<PatientResource, ConversionFailure> {
        crate::Converter::default().convert_patient(raw)
    }
}

// ============================================================================
// Input wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct PatientInput {
    identifiers: Option<Vec<IdentifierInput>>,
    names: Option<Vec<HumanNameInput>>,
    contacts: Option<Vec<ContactPointInput>>,
    gender: Option<String>,
    #[serde(rename = "birthDate")]
    birth_date: Option<String>,
    addresses: Option<Vec<AddressInput>>,
    #[serde(rename = "maritalStatusCode")]
    marital_status_code: Option<String>,
    #[serde(rename = "maritalStatus")]
    marital_status: Option<String>,
    languages: Option<Vec<LanguageInput>>,
}

impl PatientInput {
    fn into_record(self, config: &ConverterConfig) -> Result<PatientRecord, Vec<FhirError>> {
        let mut collector = Collector::new();

        let identifiers = collector.each(self.identifiers, "identifiers");
        let names = collector.each(self.names, "names");
        let contacts = collector.each(self.contacts, "contacts");
        let gender = collector.check(parse_gender(self.gender)).flatten();
        let birth_date = collector
            .check(parse_birth_date(self.birth_date, config))
            .flatten();
        let addresses = collector.each(self.addresses, "addresses");
        let languages = collector.each(self.languages, "languages");

        collector.finish()?;

        check_names(&names).map_err(|rule| vec![FhirError::from(rule)])?;

        Ok(PatientRecord {
            identifiers,
            names,
            contacts,
            gender,
            birth_date,
            addresses,
            marital_status_code: NonEmptyText::optional(
                self.marital_status_code
                    .or(self.marital_status)
                    .as_deref(),
            ),
            languages,
        })
    }
}

fn parse_gender(value: Option<String>) -> Result<Option<Gender>, FhirError> {
    value
        .map(|raw| parse_enum::<Gender>(&raw).map_err(|e| FieldPath::root("gender").reject(e)))
        .transpose()
}

/// Blank birth dates are treated as absent.
fn parse_birth_date(
    value: Option<String>,
    config: &ConverterConfig,
) -> Result<Option<NaiveDate>, FhirError> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => validate_date(
            raw,
            config.min_birth_year(),
            config.effective_max_birth_year(),
        )
        .map(Some)
        .map_err(|e| FieldPath::root("birthDate").reject(e)),
    }
}
