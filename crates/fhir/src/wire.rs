//! Output wire types shared by the resource assemblers.
//!
//! Assembly is mechanical: every validated datatype maps onto exactly one wire struct.
//! Absent optional fields and empty lists are skipped on serialisation, never emitted as
//! `null` or `[]`.

use crate::codes::{AddressType, AddressUse, ContactSystem, ContactUse, NameUse};
use crate::datatypes::{
    Address, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Language,
    Qualification,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Code system for identifier types (HL7 v2 table 0203).
pub const IDENTIFIER_TYPE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v2-0203";

/// Code system for marital status.
pub const MARITAL_STATUS_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus";

/// Code system for language tags.
pub const LANGUAGE_SYSTEM: &str = "urn:ietf:bcp:47";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CodingWire {
    pub system: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CodeableConceptWire {
    pub coding: Vec<CodingWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConceptWire {
    /// A concept holding a single coding and no text.
    pub fn single(system: &str, code: impl Into<String>, display: Option<String>) -> Self {
        Self {
            coding: vec![CodingWire {
                system: system.to_string(),
                code: code.into(),
                display,
            }],
            text: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct IdentifierWire {
    pub system: String,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConceptWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct HumanNameWire {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<NameUse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ContactPointWire {
    pub system: ContactSystem,
    pub value: String,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<ContactUse>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AddressWire {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<AddressUse>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "postalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Patient `communication` entry.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CommunicationWire {
    pub language: CodeableConceptWire,
    pub preferred: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct QualificationWire {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<IdentifierWire>,
    pub code: CodeableConceptWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<BTreeMap<String, String>>,
}

/// Resource narrative.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NarrativeWire {
    pub status: String,
    pub div: String,
}

// ============================================================================
// Domain to wire
// ============================================================================

impl From<Coding> for CodingWire {
    fn from(coding: Coding) -> Self {
        Self {
            system: coding.system.into_string(),
            code: coding.code.into_string(),
            display: coding.display,
        }
    }
}

impl From<CodeableConcept> for CodeableConceptWire {
    fn from(concept: CodeableConcept) -> Self {
        Self {
            coding: concept.coding.into_iter().map(CodingWire::from).collect(),
            text: concept.text,
        }
    }
}

impl From<Identifier> for IdentifierWire {
    fn from(identifier: Identifier) -> Self {
        Self {
            system: identifier.system.into_string(),
            value: identifier.value.into_string(),
            type_: identifier
                .type_code
                .map(|code| CodeableConceptWire::single(IDENTIFIER_TYPE_SYSTEM, code, None)),
        }
    }
}

impl From<HumanName> for HumanNameWire {
    fn from(name: HumanName) -> Self {
        Self {
            use_type: name.use_type,
            family: name.family,
            given: name.given,
            prefix: name.prefix,
            suffix: name.suffix,
        }
    }
}

impl From<ContactPoint> for ContactPointWire {
    fn from(contact: ContactPoint) -> Self {
        Self {
            system: contact.system,
            value: contact.value,
            use_type: contact.use_type,
        }
    }
}

impl From<Address> for AddressWire {
    fn from(address: Address) -> Self {
        Self {
            use_type: address.use_type,
            address_type: address.address_type,
            line: address.line,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

impl From<Language> for CommunicationWire {
    fn from(language: Language) -> Self {
        Self {
            language: CodeableConceptWire::single(
                LANGUAGE_SYSTEM,
                language.code,
                Some(language.display),
            ),
            preferred: language.preferred,
        }
    }
}

impl From<Qualification> for QualificationWire {
    fn from(qualification: Qualification) -> Self {
        Self {
            identifier: wire_list(qualification.identifier),
            code: qualification.code.into(),
            period: qualification.period,
            issuer: qualification.issuer,
        }
    }
}

/// Map every element of a validated list onto its wire form.
pub(crate) fn wire_list<D, W: From<D>>(items: Vec<D>) -> Vec<W> {
    items.into_iter().map(W::from).collect()
}
