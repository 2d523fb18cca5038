//! Closed FHIR value sets accepted by the converter.
//!
//! Each value set is a case-sensitive, fixed list of wire literals. Inputs carry them as plain
//! strings; composite validators parse them through [`WireEnum::from_wire`] so that an unknown
//! literal produces a `FieldError::InvalidEnumValue` naming the allowed members.
//!
//! Open-ended code systems (marital status, qualification codes) are not modelled
//! here; they stay opaque strings.

use serde::{Serialize, Serializer};
use std::fmt;

/// A closed set of FHIR code literals.
pub trait WireEnum: Sized + Copy {
    /// Name used in error messages.
    const FIELD: &'static str;

    /// Every accepted literal, in declaration order.
    const ALLOWED: &'static [&'static str];

    /// Parse from FHIR wire format string.
    fn from_wire(s: &str) -> Option<Self>;

    /// Convert to FHIR wire format string.
    fn to_wire(self) -> &'static str;
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl WireEnum for $name {
            const FIELD: &'static str = $field;
            const ALLOWED: &'static [&'static str] = &[$($wire),+];

            fn from_wire(s: &str) -> Option<Self> {
                match s {
                    $( $wire => Some($name::$variant), )+
                    _ => None,
                }
            }

            fn to_wire(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.to_wire())
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(self.to_wire())
            }
        }
    };
}

wire_enum! {
    /// Purpose of a human name.
    NameUse as "NameUse" {
        /// Usual/preferred name.
        Usual => "usual",
        /// Official name.
        Official => "official",
        /// Temporary name.
        Temp => "temp",
        /// Nickname or informal name.
        Nickname => "nickname",
        /// Anonymous name.
        Anonymous => "anonymous",
        /// Old name (no longer in use).
        Old => "old",
        /// Maiden name.
        Maiden => "maiden",
    }
}

wire_enum! {
    /// Telecommunications form of a contact point.
    ContactSystem as "ContactSystem" {
        Phone => "phone",
        Fax => "fax",
        Email => "email",
        Pager => "pager",
        Url => "url",
        Sms => "sms",
        Other => "other",
    }
}

wire_enum! {
    /// Purpose of a contact point.
    ContactUse as "ContactUse" {
        Home => "home",
        Work => "work",
        Temp => "temp",
        Old => "old",
        Mobile => "mobile",
    }
}

wire_enum! {
    /// Purpose of an address.
    AddressUse as "AddressUse" {
        Home => "home",
        Work => "work",
        Temp => "temp",
        Old => "old",
        Billing => "billing",
    }
}

wire_enum! {
    /// Postal, physical, or both.
    AddressType as "AddressType" {
        Postal => "postal",
        Physical => "physical",
        Both => "both",
    }
}

wire_enum! {
    /// Administrative gender.
    Gender as "Gender" {
        Male => "male",
        Female => "female",
        Other => "other",
        Unknown => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_allowed_literal() {
        for literal in ContactSystem::ALLOWED {
            let parsed = ContactSystem::from_wire(literal).expect("allowed literal parses");
            assert_eq!(parsed.to_wire(), *literal);
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(Gender::from_wire("male"), Some(Gender::Male));
        assert_eq!(Gender::from_wire("Male"), None);
        assert_eq!(NameUse::from_wire("OFFICIAL"), None);
    }

    #[test]
    fn member_sets_are_distinct_per_field() {
        assert!(ContactUse::from_wire("mobile").is_some());
        assert!(AddressUse::from_wire("mobile").is_none());
        assert!(AddressUse::from_wire("billing").is_some());
        assert!(ContactUse::from_wire("billing").is_none());
    }

    #[test]
    fn serializes_as_wire_literal() {
        let json = serde_json::to_string(&AddressType::Physical).expect("serialize");
        assert_eq!(json, "\"physical\"");
        assert_eq!(NameUse::Maiden.to_string(), "maiden");
    }
}
