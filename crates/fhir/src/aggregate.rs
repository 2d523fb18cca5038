//! Record-level validation.
//!
//! The [`Collector`] runs the composite validators over every field of a record and keeps one
//! failure per invalid object, so a caller sees all broken objects at once. Record invariants
//! run only once every field has passed; both are fatal.

use crate::datatypes::{HumanName, Qualification, Validate};
use crate::error::FieldPath;
use crate::{FhirError, Invariant};

/// Accumulates per-object failures across a whole record, in input order.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    failures: Vec<FhirError>,
}

impl Collector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Keep the value, or record the failure and yield `None`.
    pub(crate) fn check<T>(&mut self, result: Result<T, FhirError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(failure) => {
                self.failures.push(failure);
                None
            }
        }
    }

    /// Validate each element of an optional list field. Absent lists validate as empty.
    pub(crate) fn each<V: Validate>(&mut self, items: Option<Vec<V>>, field: &str) -> Vec<V::Output> {
        let at = FieldPath::root(field);
        items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| self.check(item.validate(&at.index(i))))
            .collect()
    }

    pub(crate) fn finish(self) -> Result<(), Vec<FhirError>> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self.failures)
        }
    }
}

/// Names must be non-empty, and at least one name must carry a family or given name.
///
/// The second rule is existential: `[{}, {}, {family: "Smith"}]` passes.
pub fn check_names(names: &[HumanName]) -> Result<(), Invariant> {
    if names.is_empty() {
        return Err(Invariant::NoNames);
    }
    if !names.iter().any(HumanName::has_family_or_given) {
        return Err(Invariant::NoFamilyOrGiven);
    }
    Ok(())
}

/// Every qualification present must carry at least one coding.
pub fn check_qualifications(qualifications: &[Qualification]) -> Result<(), Invariant> {
    match qualifications
        .iter()
        .position(|q| q.code.coding.is_empty())
    {
        Some(index) => Err(Invariant::EmptyQualificationCoding { index }),
        None => Ok(()),
    }
}
