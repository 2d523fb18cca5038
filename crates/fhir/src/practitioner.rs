//! Practitioner intake conversion.
//!
//! Shares every datatype validator with the patient pipeline and adds qualifications.
//! Intake forms may use either the plural field names (`names`, `identifiers`, ...) or the
//! FHIR element names (`name`, `identifier`, ...). When a record sends both, the plural name
//! wins. Practitioner identifiers carry only `system` and `value`.

use crate::aggregate::{check_names, check_qualifications, Collector};
use crate::config::ConverterConfig;
use crate::datatypes::{
    Address, AddressInput, HumanName, HumanNameInput, Identifier, PlainIdentifierInput,
    Qualification, QualificationInput,
};
use crate::normalize::decode;
use crate::wire::{
    wire_list, AddressWire, HumanNameWire, IdentifierWire, NarrativeWire, QualificationWire,
};
use crate::{ConversionFailure, FhirError};
use serde::{Deserialize, Serialize};

const RESOURCE_TYPE: &str = "Practitioner";

/// Generated narrative attached to every assembled practitioner.
const NARRATIVE_DIV: &str =
    r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>Practitioner Details</p></div>"#;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Validated practitioner intake record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PractitionerRecord {
    pub identifiers: Vec<Identifier>,
    pub active: Option<bool>,
    /// Never empty, and at least one entry has a family or given name.
    pub names: Vec<HumanName>,
    pub addresses: Vec<Address>,
    /// Each entry carries at least one coding.
    pub qualifications: Vec<Qualification>,
}

/// FHIR `Practitioner` resource as emitted by the converter.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PractitionerResource {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub active: bool,

    pub text: NarrativeWire,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<IdentifierWire>,

    pub name: Vec<HumanNameWire>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualification: Vec<QualificationWire>,
}

// ============================================================================
// Public Practitioner operations
// ============================================================================

/// Practitioner conversion operations.
///
/// This is a zero-sized type used for namespacing practitioner-related operations.
/// All methods are associated functions.
pub struct Practitioner;

impl Practitioner {
    /// Validate a raw intake record into a [`PractitionerRecord`].
    ///
    /// # Errors
    ///
    /// Returns every collected [`FhirError`] if the record is rejected; see
    /// [`crate::Patient::validate`] for the collection order.
    pub fn validate(
        raw: &serde_json::Value,
        _config: &ConverterConfig,
    ) -> Result<PractitionerRecord, Vec<FhirError>> {
        let input: PractitionerInput = decode(raw, RESOURCE_TYPE).map_err(|e| vec![e])?;
        input.into_record()
    }

    /// Assemble a validated record into a FHIR `Practitioner` resource.
    ///
    /// `active` defaults to `true` when the intake record does not say.
    pub fn assemble(record: PractitionerRecord, id: Option<String>) -> PractitionerResource {
        PractitionerResource {
            resource_type: RESOURCE_TYPE,
            id,
            active: record.active.unwrap_or(true),
            text: NarrativeWire {
                status: "generated".into(),
                div: NARRATIVE_DIV.into(),
            },
            identifier: wire_list(record.identifiers),
            name: wire_list(record.names),
            address: wire_list(record.addresses),
            qualification: wire_list(record.qualifications),
        }
    }

    /// Validate and assemble in one step, with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] carrying every collected cause.
    pub fn convert(raw: &serde_json::Value) -> Result<PractitionerResource, ConversionFailure> {
        crate::Converter::default().convert_practitioner(raw)
    }
}

// ============================================================================
// Input wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct PractitionerInput {
    identifiers: Option<Vec<PlainIdentifierInput>>,
    identifier: Option<Vec<PlainIdentifierInput>>,
    active: Option<bool>,
    names: Option<Vec<HumanNameInput>>,
    name: Option<Vec<HumanNameInput>>,
    addresses: Option<Vec<AddressInput>>,
    address: Option<Vec<AddressInput>>,
    qualifications: Option<Vec<QualificationInput>>,
    qualification: Option<Vec<QualificationInput>>,
}

impl PractitionerInput {
    fn into_record(self) -> Result<PractitionerRecord, Vec<FhirError>> {
        let mut collector = Collector::new();

        let identifiers = collector.each(self.identifiers.or(self.identifier), "identifiers");
        let names = collector.each(self.names.or(self.name), "names");
        let addresses = collector.each(self.addresses.or(self.address), "addresses");
        let qualifications = collector.each(
            self.qualifications.or(self.qualification),
            "qualifications",
        );

        collector.finish()?;

        check_names(&names)
            .and_then(|()| check_qualifications(&qualifications))
            .map_err(|rule| vec![FhirError::from(rule)])?;

        Ok(PractitionerRecord {
            identifiers,
            active: self.active,
            names,
            addresses,
            qualifications,
        })
    }
}
