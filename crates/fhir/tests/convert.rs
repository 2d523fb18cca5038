//! End-to-end behaviour of the converter facade.

use chrono::{Datelike, Utc};
use fhir::{
    convert, ConversionFailure, Converter, ConverterConfig, DateError, FhirError, FieldError,
    Invariant, Patient, Practitioner, ResourceKind,
};
use serde_json::{json, Value};

fn patient(raw: Value) -> Result<Value, ConversionFailure> {
    convert(ResourceKind::Patient, &raw).map(|r| r.to_json().expect("serialize resource"))
}

fn patient_with_birth_date(date: &str) -> Result<Value, ConversionFailure> {
    patient(json!({"names": [{"family": "Smith"}], "birthDate": date}))
}

fn only_cause(failure: &ConversionFailure) -> &FhirError {
    assert_eq!(failure.causes().len(), 1, "causes: {:?}", failure.causes());
    &failure.causes()[0]
}

#[test]
fn end_to_end_patient_example() {
    let output = patient(json!({
        "names": [{"use": "official", "family": "Smith", "given": ["John", "Peter"]}],
        "gender": "male",
        "birthDate": "1990-01-01"
    }))
    .expect("valid patient");

    assert_eq!(
        output,
        json!({
            "resourceType": "Patient",
            "active": true,
            "name": [{"use": "official", "family": "Smith", "given": ["John", "Peter"]}],
            "gender": "male",
            "birthDate": "1990-01-01"
        })
    );
}

#[test]
fn full_patient_maps_every_section() {
    let output = patient(json!({
        "identifiers": [
            {"system": "http://hospital.example.org/mrn", "value": "MRN-1", "type": "MR"},
            {"system": "urn:oid:2.16.840.1.113883.2.1.4.1", "value": "9434765919"}
        ],
        "names": [{"use": "official", "family": "Smith", "given": "John", "prefix": "Mr"}],
        "contacts": [
            {"system": "phone", "value": "+44 7700 900123", "use": "mobile"},
            {"system": "email", "value": "john.smith@example.com"}
        ],
        "gender": "male",
        "birthDate": "1990-01-01",
        "addresses": [{
            "use": "home",
            "type": "physical",
            "line": "123 Main St",
            "city": "Boston",
            "state": "MA",
            "postalCode": "02115",
            "country": "USA"
        }],
        "maritalStatusCode": "M",
        "languages": [{"code": "en", "display": "English", "preferred": true}]
    }))
    .expect("valid patient");

    assert_eq!(
        output["identifier"],
        json!([
            {
                "system": "http://hospital.example.org/mrn",
                "value": "MRN-1",
                "type": {"coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/v2-0203",
                    "code": "MR"
                }]}
            },
            {"system": "urn:oid:2.16.840.1.113883.2.1.4.1", "value": "9434765919"}
        ])
    );
    assert_eq!(
        output["telecom"],
        json!([
            {"system": "phone", "value": "+44 7700 900123", "use": "mobile"},
            {"system": "email", "value": "john.smith@example.com"}
        ])
    );
    assert_eq!(
        output["address"],
        json!([{
            "use": "home",
            "type": "physical",
            "line": ["123 Main St"],
            "city": "Boston",
            "state": "MA",
            "postalCode": "02115",
            "country": "USA"
        }])
    );
    assert_eq!(
        output["maritalStatus"],
        json!({"coding": [{
            "system": "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus",
            "code": "M"
        }]})
    );
    assert_eq!(
        output["communication"],
        json!([{
            "language": {"coding": [{"system": "urn:ietf:bcp:47", "code": "en", "display": "English"}]},
            "preferred": true
        }])
    );
}

#[test]
fn conversion_is_idempotent() {
    let raw = json!({
        "names": [{"family": "Smith", "given": ["John"]}],
        "contacts": [{"system": "email", "value": "john@example.com", "use": "work"}],
        "languages": [{"code": "fr", "display": "French"}]
    });
    let first = convert(ResourceKind::Patient, &raw).expect("first");
    let second = convert(ResourceKind::Patient, &raw).expect("second");
    assert_eq!(first, second);
    assert_eq!(first.to_json().expect("json"), second.to_json().expect("json"));
}

#[test]
fn scalar_and_single_element_list_are_equivalent() {
    for field in ["given", "prefix", "suffix"] {
        let scalar = patient(json!({"names": [{"family": "Smith", field: "X"}]})).expect("scalar");
        let list = patient(json!({"names": [{"family": "Smith", field: ["X"]}]})).expect("list");
        assert_eq!(scalar, list, "field {field}");
        assert_eq!(scalar["name"][0][field], json!(["X"]));
    }

    let scalar = patient(json!({"names": [{"family": "Smith"}], "addresses": [{"line": "X"}]}))
        .expect("scalar line");
    let list = patient(json!({"names": [{"family": "Smith"}], "addresses": [{"line": ["X"]}]}))
        .expect("list line");
    assert_eq!(scalar, list);
}

#[test]
fn existential_name_rule() {
    assert!(patient(json!({"names": [{"family": null, "given": null}, {"family": "Smith"}]})).is_ok());

    let failure = patient(json!({"names": [{"family": null, "given": null}]}))
        .expect_err("no usable name");
    assert_eq!(only_cause(&failure).invariant(), Some(&Invariant::NoFamilyOrGiven));
    assert!(failure.message().contains("family name or a given name"));
}

#[test]
fn empty_names_fail_the_cardinality_rule() {
    let failure = patient(json!({"names": []})).expect_err("no names");
    assert_eq!(only_cause(&failure).invariant(), Some(&Invariant::NoNames));
}

#[test]
fn birth_date_bounds() {
    let current_year = Utc::now().year();

    assert!(patient_with_birth_date("1900-01-01").is_ok());
    assert!(patient_with_birth_date(&format!("{current_year}-01-01")).is_ok());

    let failure = patient_with_birth_date("1899-12-31").expect_err("before 1900");
    assert!(matches!(
        only_cause(&failure).field_error(),
        Some(FieldError::InvalidDate { reason: DateError::YearOutOfRange { year: 1899, .. } })
    ));

    let next_year = format!("{}-01-01", current_year + 1);
    let failure = patient_with_birth_date(&next_year).expect_err("future year");
    assert!(matches!(
        only_cause(&failure).field_error(),
        Some(FieldError::InvalidDate { reason: DateError::YearOutOfRange { .. } })
    ));

    let failure = patient_with_birth_date("1990/01/01").expect_err("bad format");
    assert_eq!(
        only_cause(&failure).field_error(),
        Some(&FieldError::InvalidDate { reason: DateError::Format })
    );
}

#[test]
fn configured_upper_bound_replaces_current_year() {
    let config = ConverterConfig::default()
        .with_max_birth_year(2000)
        .expect("valid range");
    let converter = Converter::new(config);

    let raw = json!({"names": [{"family": "Smith"}], "birthDate": "2001-06-15"});
    let failure = converter
        .convert(ResourceKind::Patient, &raw)
        .expect_err("after configured bound");
    assert_eq!(
        only_cause(&failure).field_error(),
        Some(&FieldError::InvalidDate {
            reason: DateError::YearOutOfRange { year: 2001, min: 1900, max: 2000 }
        })
    );
}

#[test]
fn phone_digit_count_boundary() {
    let phone = |value: &str| {
        patient(json!({"names": [{"family": "Smith"}], "contacts": [{"system": "phone", "value": value}]}))
    };

    let failure = phone("123-4567").expect_err("7 digits");
    assert_eq!(
        only_cause(&failure).field_error(),
        Some(&FieldError::InvalidPhone { digit_count: 7 })
    );
    assert!(phone("1234-5678").is_ok());
    assert!(phone("+123 456 789 012 345").is_ok());
    let failure = phone("1234567890123456").expect_err("16 digits");
    assert_eq!(
        only_cause(&failure).field_error(),
        Some(&FieldError::InvalidPhone { digit_count: 16 })
    );
}

#[test]
fn optional_fields_are_omitted() {
    let output = patient(json!({"names": [{"family": "Smith"}]})).expect("valid");
    assert_eq!(output["name"], json!([{"family": "Smith"}]));

    let mut keys: Vec<&str> = output
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["active", "name", "resourceType"]);
}

#[test]
fn unknown_contact_system_is_rejected() {
    let failure = patient(json!({
        "names": [{"use": "official", "family": "Smith", "given": ["John"]}],
        "contacts": [{"system": "whatsapp", "value": "+1234567890"}]
    }))
    .expect_err("whatsapp is not a ContactSystem");

    match only_cause(&failure) {
        FhirError::FieldValidation {
            field,
            reason: FieldError::InvalidEnumValue { field: enum_name, got, .. },
        } => {
            assert_eq!(field, "contacts[0].system");
            assert_eq!(*enum_name, "ContactSystem");
            assert_eq!(got, "whatsapp");
        }
        other => panic!("expected InvalidEnumValue, got {other:?}"),
    }
    assert!(failure.message().starts_with("Failed to convert to FHIR format: "));
    assert!(failure.message().contains("whatsapp"));
}

#[test]
fn invalid_records_from_intake_forms() {
    let cases = [
        json!({"names": [{"family": "Smith"}], "gender": "invalid_gender"}),
        json!({"names": [{"family": "Smith"}], "birthDate": "01/01/1990"}),
        json!({"names": [{"use": "nickname2", "family": "Smith"}]}),
        json!({"gender": "male", "birthDate": "1990-01-01"}),
        json!({"names": [{"family": "Smith"}], "addresses": [{"use": "invalid_use"}]}),
        json!({"names": [{"family": "Smith"}], "contacts": [{"system": "email", "value": "nobody"}]}),
        json!("Smith"),
    ];
    for raw in cases {
        assert!(patient(raw.clone()).is_err(), "should reject {raw}");
    }
}

#[test]
fn practitioner_end_to_end() {
    let raw = json!({
        "identifier": [{"system": "http://www.acme.org/practitioners", "value": "23"}],
        "name": [{"family": "Careful", "given": ["Adam"], "prefix": ["Dr"]}],
        "address": [{
            "use": "home",
            "line": ["534 Erewhon St"],
            "city": "PleasantVille",
            "state": "Vic",
            "postalCode": "3999"
        }],
        "qualification": [{
            "identifier": [{"system": "http://example.org/UniversityIdentifier", "value": "12345"}],
            "code": {
                "coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/v2-0360/2.7",
                    "code": "BS",
                    "display": "Bachelor of Science"
                }],
                "text": "Bachelor of Science"
            },
            "period": {"start": "1995"},
            "issuer": {"display": "Example University"}
        }]
    });

    let output = convert(ResourceKind::Practitioner, &raw)
        .expect("valid practitioner")
        .to_json()
        .expect("json");

    assert_eq!(
        output,
        json!({
            "resourceType": "Practitioner",
            "active": true,
            "text": {
                "status": "generated",
                "div": "<div xmlns=\"http://www.w3.org/1999/xhtml\"><p>Practitioner Details</p></div>"
            },
            "identifier": [{"system": "http://www.acme.org/practitioners", "value": "23"}],
            "name": [{"family": "Careful", "given": ["Adam"], "prefix": ["Dr"]}],
            "address": [{
                "use": "home",
                "line": ["534 Erewhon St"],
                "city": "PleasantVille",
                "state": "Vic",
                "postalCode": "3999"
            }],
            "qualification": [{
                "identifier": [{"system": "http://example.org/UniversityIdentifier", "value": "12345"}],
                "code": {
                    "coding": [{
                        "system": "http://terminology.hl7.org/CodeSystem/v2-0360/2.7",
                        "code": "BS",
                        "display": "Bachelor of Science"
                    }],
                    "text": "Bachelor of Science"
                },
                "period": {"start": "1995"},
                "issuer": {"display": "Example University"}
            }]
        })
    );
}

#[test]
fn practitioner_active_is_taken_from_input() {
    let resource = Practitioner::convert(&json!({"names": [{"family": "Careful"}], "active": false}))
        .expect("valid");
    assert!(!resource.active);
}

#[test]
fn patient_is_always_active() {
    let resource = Patient::convert(&json!({"names": [{"given": "Jo"}], "active": false}))
        .expect("valid");
    assert!(resource.active);
}

#[test]
fn contact_values_pass_through_unchanged() {
    let output = patient(json!({
        "names": [{"family": "Smith"}],
        "contacts": [
            {"system": "url", "value": ""},
            {"system": "email", "value": "  a@b.co  "}
        ]
    }))
    .expect("valid patient");
    assert_eq!(
        output["telecom"],
        json!([
            {"system": "url", "value": ""},
            {"system": "email", "value": "  a@b.co  "}
        ])
    );
}

#[test]
fn practitioner_identifiers_have_no_type() {
    let resource = Practitioner::convert(&json!({
        "names": [{"family": "S"}],
        "identifiers": [{"system": "urn:x", "value": "1", "type": "MR"}],
        "qualifications": [{
            "identifier": [{"system": "urn:y", "value": "2", "type": "MR"}],
            "code": {"coding": [{"system": "http://example.org", "code": "MD"}]}
        }]
    }))
    .expect("valid practitioner");
    let output = serde_json::to_value(resource).expect("serialize");
    assert_eq!(output["identifier"], json!([{"system": "urn:x", "value": "1"}]));
    assert_eq!(
        output["qualification"][0]["identifier"],
        json!([{"system": "urn:y", "value": "2"}])
    );
}
