// crates/plugin-config-parser/src/options.rs
// ============================================================================
// Module: Parse Options
// Description: Operator-tunable parser settings and resource limits.
// Purpose: Bound untrusted configuration input and name the root block.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! [`ParseOptions`] carries the root block name and the size and nesting caps
//! applied to untrusted configuration text. Options deserialize with defaults
//! for omitted keys and reject unknown keys, so a host can load them from its
//! own TOML configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum configuration size in bytes.
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 1024 * 1024;
/// Hard ceiling for the configurable size limit.
pub const MAX_SOURCE_BYTES_CEILING: usize = 64 * 1024 * 1024;
/// Default maximum expression and block nesting depth.
pub const DEFAULT_MAX_NESTING: usize = 32;
/// Hard ceiling for the configurable nesting limit.
pub const MAX_NESTING_CEILING: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or validating parse options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// TOML text could not be parsed into options.
    #[error("invalid parse options: {0}")]
    Parse(String),
    /// A field holds an out-of-range value.
    #[error("invalid parse option `{field}`: {reason}")]
    Invalid {
        /// Offending option name.
        field: &'static str,
        /// Explanation.
        reason: String,
    },
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Parser settings.
///
/// # Invariants
/// - `root_block` is a non-empty identifier.
/// - Limits are positive and below their ceilings once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Name of the block wrapping the plugin configuration (matched
    /// case-insensitively).
    pub root_block: String,
    /// Maximum accepted source size in bytes.
    pub max_source_bytes: usize,
    /// Maximum nesting depth for blocks and expressions.
    pub max_nesting: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            root_block: "config".to_string(),
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl ParseOptions {
    /// Loads and validates options from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError`] when the text is malformed or a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self =
            toml::from_str(text).map_err(|err| OptionsError::Parse(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Validates option ranges.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let valid_name = !self.root_block.is_empty()
            && self.root_block.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(OptionsError::Invalid {
                field: "root_block",
                reason: "must be a non-empty identifier".to_string(),
            });
        }
        if self.max_source_bytes == 0 || self.max_source_bytes > MAX_SOURCE_BYTES_CEILING {
            return Err(OptionsError::Invalid {
                field: "max_source_bytes",
                reason: format!("must be between 1 and {MAX_SOURCE_BYTES_CEILING}"),
            });
        }
        if self.max_nesting == 0 || self.max_nesting > MAX_NESTING_CEILING {
            return Err(OptionsError::Invalid {
                field: "max_nesting",
                reason: format!("must be between 1 and {MAX_NESTING_CEILING}"),
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn omitted_keys_use_defaults() {
        let options = ParseOptions::from_toml_str("root_block = \"driver\"").unwrap();
        assert_eq!(options.root_block, "driver");
        assert_eq!(options.max_nesting, DEFAULT_MAX_NESTING);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            ParseOptions::from_toml_str("max_depth = 3"),
            Err(OptionsError::Parse(_))
        ));
    }

    #[test]
    fn out_of_range_limits_are_rejected() {
        let err = ParseOptions::from_toml_str("max_nesting = 0").unwrap_err();
        let OptionsError::Invalid {
            field, ..
        } = err
        else {
            panic!("expected a range error");
        };
        assert_eq!(field, "max_nesting");
        assert!(ParseOptions::from_toml_str("root_block = \"\"").is_err());
    }
}
