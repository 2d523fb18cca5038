//! Composite FHIR datatypes shared by every resource kind.
//!
//! Each datatype comes in two shapes:
//! - an input wire struct (`*Input`) decoded leniently from intake JSON, where every field is
//!   optional and code fields are plain strings
//! - a validated domain struct, built only through [`Validate::validate`]
//!
//! A composite validator stops at the first failing sub-field of its object, so each invalid
//! object contributes exactly one failure to the record.

use crate::codes::{AddressType, AddressUse, ContactSystem, ContactUse, NameUse, WireEnum};
use crate::error::FieldPath;
use crate::normalize::{normalize_list, OneOrMany};
use crate::validation::{parse_enum, validate_email, validate_phone};
use crate::{FhirResult, FieldError};
use intake_types::NonEmptyText;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Validation of one decoded input object into its domain type.
pub(crate) trait Validate {
    type Output;

    fn validate(self, at: &FieldPath) -> FhirResult<Self::Output>;
}

// ============================================================================
// Public domain-level types
// ============================================================================

/// Business identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub system: NonEmptyText,
    pub value: NonEmptyText,
    /// Code from the v2-0203 identifier type table, if given.
    pub type_code: Option<NonEmptyText>,
}

/// Human name. Whether it is "named" is judged over the whole record, not per instance.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct HumanName {
    pub use_type: Option<NameUse>,
    pub family: Option<String>,
    pub given: Vec<String>,
    pub prefix: Vec<String>,
    pub suffix: Vec<String>,
}

impl HumanName {
    /// True when the name carries a non-blank family name or at least one non-blank given name.
    pub fn has_family_or_given(&self) -> bool {
        let family = self.family.as_deref().is_some_and(|f| !f.trim().is_empty());
        family || self.given.iter().any(|g| !g.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactPoint {
    pub system: ContactSystem,
    /// Carried exactly as sent.
    pub value: String,
    pub use_type: Option<ContactUse>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Address {
    pub use_type: Option<AddressUse>,
    pub address_type: Option<AddressType>,
    pub line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Spoken language, emitted as a `communication` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Language {
    /// BCP-47 tag, not checked against the registry.
    pub code: NonEmptyText,
    pub display: String,
    pub preferred: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coding {
    pub system: NonEmptyText,
    pub code: NonEmptyText,
    pub display: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

/// Practitioner qualification. `period` and `issuer` are carried verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Qualification {
    pub identifier: Vec<Identifier>,
    pub code: CodeableConcept,
    pub period: Option<BTreeMap<String, String>>,
    pub issuer: Option<BTreeMap<String, String>>,
}

// ============================================================================
// Input wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct IdentifierInput {
    system: Option<String>,
    value: Option<String>,
    #[serde(rename = "type")]
    type_code: Option<String>,
}

/// Identifier without a type, as practitioners and qualifications carry them. A `type` key in
/// the input is ignored.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PlainIdentifierInput {
    system: Option<String>,
    value: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct HumanNameInput {
    #[serde(rename = "use")]
    use_type: Option<String>,
    family: Option<String>,
    given: Option<OneOrMany>,
    prefix: Option<OneOrMany>,
    suffix: Option<OneOrMany>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ContactPointInput {
    system: Option<String>,
    value: Option<String>,
    #[serde(rename = "use")]
    use_type: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct AddressInput {
    #[serde(rename = "use")]
    use_type: Option<String>,
    #[serde(rename = "type")]
    address_type: Option<String>,
    line: Option<OneOrMany>,
    city: Option<String>,
    state: Option<String>,
    #[serde(rename = "postalCode")]
    postal_code: Option<String>,
    country: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct LanguageInput {
    code: Option<String>,
    display: Option<String>,
    preferred: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CodingInput {
    system: Option<String>,
    code: Option<String>,
    display: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CodeableConceptInput {
    coding: Option<Vec<CodingInput>>,
    text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct QualificationInput {
    identifier: Option<Vec<PlainIdentifierInput>>,
    code: Option<CodeableConceptInput>,
    period: Option<BTreeMap<String, String>>,
    issuer: Option<BTreeMap<String, String>>,
}

// ============================================================================
// Field helpers (internal)
// ============================================================================

fn required<T>(value: Option<T>, at: &FieldPath) -> FhirResult<T> {
    value.ok_or_else(|| at.reject(FieldError::Missing))
}

fn required_text(value: Option<String>, at: &FieldPath) -> FhirResult<NonEmptyText> {
    let raw = required(value, at)?;
    NonEmptyText::new(raw).map_err(|_| at.reject(FieldError::Empty))
}

fn optional_enum<E: WireEnum>(value: Option<String>, at: &FieldPath) -> FhirResult<Option<E>> {
    value
        .map(|raw| parse_enum::<E>(&raw).map_err(|reason| at.reject(reason)))
        .transpose()
}

/// Validate every element of an optional list, stopping at the first failure.
fn each<V: Validate>(items: Option<Vec<V>>, at: &FieldPath) -> FhirResult<Vec<V::Output>> {
    items
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.validate(&at.index(i)))
        .collect()
}

// ============================================================================
// Composite validators
// ============================================================================

impl Validate for IdentifierInput {
    type Output = Identifier;

    fn validate(self, at: &FieldPath) -> FhirResult<Identifier> {
        Ok(Identifier {
            system: required_text(self.system, &at.field("system"))?,
            value: required_text(self.value, &at.field("value"))?,
            type_code: NonEmptyText::optional(self.type_code.as_deref()),
        })
    }
}

impl Validate for PlainIdentifierInput {
    type Output = Identifier;

    fn validate(self, at: &FieldPath) -> FhirResult<Identifier> {
        Ok(Identifier {
            system: required_text(self.system, &at.field("system"))?,
            value: required_text(self.value, &at.field("value"))?,
            type_code: None,
        })
    }
}

impl Validate for HumanNameInput {
    type Output = HumanName;

    fn validate(self, at: &FieldPath) -> FhirResult<HumanName> {
        Ok(HumanName {
            use_type: optional_enum(self.use_type, &at.field("use"))?,
            family: self.family,
            given: normalize_list(self.given).unwrap_or_default(),
            prefix: normalize_list(self.prefix).unwrap_or_default(),
            suffix: normalize_list(self.suffix).unwrap_or_default(),
        })
    }
}

impl Validate for ContactPointInput {
    type Output = ContactPoint;

    fn validate(self, at: &FieldPath) -> FhirResult<ContactPoint> {
        // The value rule depends on the system, so the system must resolve first.
        let system_at = at.field("system");
        let system: ContactSystem = optional_enum(self.system, &system_at)?
            .ok_or_else(|| system_at.reject(FieldError::Missing))?;

        let value_at = at.field("value");
        let value = required(self.value, &value_at)?;
        let rule = match system {
            ContactSystem::Email => validate_email(&value),
            ContactSystem::Phone => validate_phone(&value),
            _ => Ok(()),
        };
        rule.map_err(|reason| value_at.reject(reason))?;

        Ok(ContactPoint {
            system,
            value,
            use_type: optional_enum(self.use_type, &at.field("use"))?,
        })
    }
}

impl Validate for AddressInput {
    type Output = Address;

    fn validate(self, at: &FieldPath) -> FhirResult<Address> {
        Ok(Address {
            use_type: optional_enum(self.use_type, &at.field("use"))?,
            address_type: optional_enum(self.address_type, &at.field("type"))?,
            line: normalize_list(self.line).unwrap_or_default(),
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
        })
    }
}

impl Validate for LanguageInput {
    type Output = Language;

    fn validate(self, at: &FieldPath) -> FhirResult<Language> {
        Ok(Language {
            code: required_text(self.code, &at.field("code"))?,
            display: required(self.display, &at.field("display"))?,
            preferred: self.preferred.unwrap_or(false),
        })
    }
}

impl Validate for CodingInput {
    type Output = Coding;

    fn validate(self, at: &FieldPath) -> FhirResult<Coding> {
        Ok(Coding {
            system: required_text(self.system, &at.field("system"))?,
            code: required_text(self.code, &at.field("code"))?,
            display: self.display,
        })
    }
}

impl Validate for CodeableConceptInput {
    type Output = CodeableConcept;

    /// An empty `coding` list is accepted here; the record-level check rejects it.
    fn validate(self, at: &FieldPath) -> FhirResult<CodeableConcept> {
        Ok(CodeableConcept {
            coding: each(self.coding, &at.field("coding"))?,
            text: self.text,
        })
    }
}

impl Validate for QualificationInput {
    type Output = Qualification;

    fn validate(self, at: &FieldPath) -> FhirResult<Qualification> {
        let identifier = each(self.identifier, &at.field("identifier"))?;
        let code_at = at.field("code");
        let code = required(self.code, &code_at)?.validate(&code_at)?;

        Ok(Qualification {
            identifier,
            code,
            period: self.period,
            issuer: self.issuer,
        })
    }
}
