//! Primitive validators.
//!
//! Pure checks on a single scalar value, independent of where the value sits in the record.
//! Callers attach the field location when turning a [`FieldError`] into a `FhirError`.

use crate::codes::WireEnum;
use crate::{DateError, FieldError};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Shortest accepted phone number, counted in digits.
pub const MIN_PHONE_DIGITS: usize = 8;
/// Longest accepted phone number, counted in digits.
pub const MAX_PHONE_DIGITS: usize = 15;

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("static date regex"));

/// Validate a `YYYY-MM-DD` date whose year lies in `min_year..=max_year`.
///
/// The shape is checked before the calendar, and the calendar before the range, so
/// `"1990/01/01"` fails on format without ever being range-checked.
///
/// # Errors
///
/// Returns `FieldError::InvalidDate` with the first failing [`DateError`].
pub fn validate_date(value: &str, min_year: i32, max_year: i32) -> Result<NaiveDate, FieldError> {
    let invalid = |reason| FieldError::InvalidDate { reason };

    if !DATE_SHAPE.is_match(value) {
        return Err(invalid(DateError::Format));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(DateError::NotACalendarDate))?;

    let year = date.year();
    if !(min_year..=max_year).contains(&year) {
        return Err(invalid(DateError::YearOutOfRange {
            year,
            min: min_year,
            max: max_year,
        }));
    }

    Ok(date)
}

/// Number of digits in a phone value, ignoring spaces, dashes, `+`, brackets, etc.
///
/// Any Unicode numeric character counts, so `"١٢٣٤٥٦٧٨"` has 8 digits.
pub fn phone_digit_count(value: &str) -> usize {
    value.chars().filter(|c| c.is_numeric()).count()
}

/// Accept a phone value whose digit-only form has 8 to 15 digits.
pub fn validate_phone(value: &str) -> Result<(), FieldError> {
    let digit_count = phone_digit_count(value);
    if (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digit_count) {
        Ok(())
    } else {
        Err(FieldError::InvalidPhone { digit_count })
    }
}

/// Accept an email value containing both `@` and `.`. No RFC-level checks.
pub fn validate_email(value: &str) -> Result<(), FieldError> {
    if value.contains('@') && value.contains('.') {
        Ok(())
    } else {
        Err(FieldError::InvalidEmail {
            value: value.to_string(),
        })
    }
}

/// Parse a closed value-set literal, case-sensitively.
pub fn parse_enum<E: WireEnum>(value: &str) -> Result<E, FieldError> {
    E::from_wire(value).ok_or_else(|| FieldError::InvalidEnumValue {
        field: E::FIELD,
        got: value.to_string(),
        allowed: E::ALLOWED,
    })
}
