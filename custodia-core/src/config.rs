//! Configuration types

use crate::{ConfigError, CustodiaError, CustodiaResult};
use serde::{Deserialize, Serialize};

/// Configuration injected at construction; no process-wide mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodiaConfig {
    /// Prefix for auto-generated seizure numbers (`<PREFIX>-<year>-<6 digits>`).
    pub seizure_number_prefix: String,
}

impl Default for CustodiaConfig {
    fn default() -> Self {
        Self {
            seizure_number_prefix: "CMS".to_string(),
        }
    }
}

impl CustodiaConfig {
    /// Validate the configuration.
    ///
    /// The prefix must be 2-12 ASCII characters, uppercase alphanumeric,
    /// starting with a letter - the shape the seizure-number pattern accepts.
    pub fn validate(&self) -> CustodiaResult<()> {
        let prefix = &self.seizure_number_prefix;
        if prefix.is_empty() {
            return Err(CustodiaError::Config(ConfigError::MissingRequired {
                field: "seizure_number_prefix".to_string(),
            }));
        }
        let mut chars = prefix.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_uppercase());
        let rest_alnum = chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !starts_with_letter || !rest_alnum || prefix.len() < 2 || prefix.len() > 12 {
            return Err(CustodiaError::Config(ConfigError::InvalidValue {
                field: "seizure_number_prefix".to_string(),
                value: prefix.clone(),
                reason: "must be 2-12 uppercase ASCII alphanumerics starting with a letter"
                    .to_string(),
            }));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CustodiaConfig::default();
        assert_eq!(config.seizure_number_prefix, "CMS");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = CustodiaConfig {
            seizure_number_prefix: String::new(),
        };
        assert!(matches!(
            config.validate(),
            Err(CustodiaError::Config(ConfigError::MissingRequired { .. }))
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_prefixes() {
        for prefix in ["cms", "C", "2MS", "CMS!", "TOOLONGPREFIXX"] {
            let config = CustodiaConfig {
                seizure_number_prefix: prefix.to_string(),
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(CustodiaError::Config(ConfigError::InvalidValue { .. }))
                ),
                "prefix {:?} should be rejected",
                prefix
            );
        }
    }

    #[test]
    fn test_validate_accepts_alphanumeric_prefix() {
        let config = CustodiaConfig {
            seizure_number_prefix: "EV2".to_string(),
        };
        assert!(config.validate().is_ok());
    }
}
