//! Converter configuration.
//!
//! Configuration is resolved once at process startup and then passed into the [`Converter`].
//! The core never reads environment variables itself; shells read them and hand the raw
//! values to [`ConverterConfig::from_env_values`].
//!
//! [`Converter`]: crate::Converter

use chrono::{Datelike, Utc};

/// Lowest accepted birth year unless configured otherwise.
pub const DEFAULT_MIN_BIRTH_YEAR: i32 = 1900;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a calendar year, got {value:?}")]
    InvalidYear { name: &'static str, value: String },

    #[error("{name} must be one of true/false/1/0, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },

    #[error("minimum birth year {min} is greater than maximum birth year {max}")]
    InvertedYearRange { min: i32, max: i32 },
}

/// Settings that shape validation and assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterConfig {
    min_birth_year: i32,
    max_birth_year: Option<i32>,
    assign_resource_ids: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            min_birth_year: DEFAULT_MIN_BIRTH_YEAR,
            max_birth_year: None,
            assign_resource_ids: false,
        }
    }
}

impl ConverterConfig {
    /// Create a new `ConverterConfig`.
    ///
    /// `max_birth_year = None` keeps the upper bound pinned to the current UTC calendar year,
    /// read each time a date is validated.
    pub fn new(
        min_birth_year: i32,
        max_birth_year: Option<i32>,
        assign_resource_ids: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(max) = max_birth_year {
            if min_birth_year > max {
                return Err(ConfigError::InvertedYearRange {
                    min: min_birth_year,
                    max,
                });
            }
        }

        Ok(Self {
            min_birth_year,
            max_birth_year,
            assign_resource_ids,
        })
    }

    /// Build a config from the raw values of `INTAKE_MIN_BIRTH_YEAR`,
    /// `INTAKE_MAX_BIRTH_YEAR` and `INTAKE_ASSIGN_IDS`. Absent or blank values use defaults.
    pub fn from_env_values(
        min_birth_year: Option<String>,
        max_birth_year: Option<String>,
        assign_resource_ids: Option<String>,
    ) -> Result<Self, ConfigError> {
        let min = parse_year("INTAKE_MIN_BIRTH_YEAR", min_birth_year)?
            .unwrap_or(DEFAULT_MIN_BIRTH_YEAR);
        let max = parse_year("INTAKE_MAX_BIRTH_YEAR", max_birth_year)?;
        let assign = parse_flag("INTAKE_ASSIGN_IDS", assign_resource_ids)?.unwrap_or(false);
        Self::new(min, max, assign)
    }

    pub fn with_max_birth_year(self, max_birth_year: i32) -> Result<Self, ConfigError> {
        Self::new(
            self.min_birth_year,
            Some(max_birth_year),
            self.assign_resource_ids,
        )
    }

    pub fn with_resource_ids(mut self, assign: bool) -> Self {
        self.assign_resource_ids = assign;
        self
    }

    pub fn min_birth_year(&self) -> i32 {
        self.min_birth_year
    }

    pub fn max_birth_year(&self) -> Option<i32> {
        self.max_birth_year
    }

    /// Upper birth-year bound in force right now.
    pub fn effective_max_birth_year(&self) -> i32 {
        self.max_birth_year.unwrap_or_else(|| Utc::now().year())
    }

    pub fn assign_resource_ids(&self) -> bool {
        self.assign_resource_ids
    }
}

fn parse_year(name: &'static str, value: Option<String>) -> Result<Option<i32>, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidYear {
                name,
                value: raw.to_string(),
            }),
    }
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidFlag {
                name,
                value: raw.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tracks_current_year() {
        let cfg = ConverterConfig::default();
        assert_eq!(cfg.min_birth_year(), 1900);
        assert_eq!(cfg.max_birth_year(), None);
        assert_eq!(cfg.effective_max_birth_year(), Utc::now().year());
        assert!(!cfg.assign_resource_ids());
    }

    #[test]
    fn rejects_inverted_range() {
        let err = ConverterConfig::new(2000, Some(1999), false).expect_err("should reject");
        assert_eq!(err, ConfigError::InvertedYearRange { min: 2000, max: 1999 });
    }

    #[test]
    fn parses_env_values() {
        let cfg = ConverterConfig::from_env_values(
            Some("1910".into()),
            Some(" 2020 ".into()),
            Some("TRUE".into()),
        )
        .expect("valid env values");
        assert_eq!(cfg.min_birth_year(), 1910);
        assert_eq!(cfg.max_birth_year(), Some(2020));
        assert_eq!(cfg.effective_max_birth_year(), 2020);
        assert!(cfg.assign_resource_ids());
    }

    #[test]
    fn blank_env_values_fall_back_to_defaults() {
        let cfg = ConverterConfig::from_env_values(Some("".into()), None, Some("  ".into()))
            .expect("defaults");
        assert_eq!(cfg, ConverterConfig::default());
    }

    #[test]
    fn rejects_malformed_env_values() {
        let err = ConverterConfig::from_env_values(None, Some("next year".into()), None)
            .expect_err("bad year");
        assert!(matches!(err, ConfigError::InvalidYear { name: "INTAKE_MAX_BIRTH_YEAR", .. }));

        let err = ConverterConfig::from_env_values(None, None, Some("yes".into()))
            .expect_err("bad flag");
        assert!(matches!(err, ConfigError::InvalidFlag { name: "INTAKE_ASSIGN_IDS", .. }));
    }
}
