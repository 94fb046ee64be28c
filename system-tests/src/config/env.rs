// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system-test runs.
// Purpose: Turn harness variables into run settings, failing closed.
// Dependencies: std, crate::error
// ============================================================================

//! ## Overview
//! Harness settings come from `PLUGIN_CONFIG_E2E_*` variables read through a
//! lookup function, so the process environment is only one possible source.
//! Invariants:
//! - Values are trimmed UTF-8; empty or non-UTF-8 values are errors.
//! - Unset flags are `false`; unset optional values are `None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Variables
// ============================================================================

/// Variables recognised by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Plugin host binary handed to provisioners.
    HostBinary,
    /// Test-name filter passed to the runner.
    RunFilter,
    /// Include slow suites.
    Slow,
    /// Print the summary for passing runs too.
    Verbose,
    /// Per-run timeout in whole seconds.
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Every recognised variable.
    pub const ALL: [Self; 5] =
        [Self::HostBinary, Self::RunFilter, Self::Slow, Self::Verbose, Self::TimeoutSeconds];

    /// Returns the variable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HostBinary => "PLUGIN_CONFIG_E2E_HOST_BINARY",
            Self::RunFilter => "PLUGIN_CONFIG_E2E_RUN",
            Self::Slow => "PLUGIN_CONFIG_E2E_SLOW",
            Self::Verbose => "PLUGIN_CONFIG_E2E_VERBOSE",
            Self::TimeoutSeconds => "PLUGIN_CONFIG_E2E_TIMEOUT_SECS",
        }
    }

    /// Reads the trimmed value, `None` when unset.
    fn read<F>(self, lookup: &F) -> Result<Option<String>, HarnessError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let Some(raw) = lookup(self.name()) else {
            return Ok(None);
        };
        let raw = raw.into_string().map_err(|_| self.invalid("is not valid UTF-8"))?;
        match raw.trim() {
            "" => Err(self.invalid("is empty")),
            value => Ok(Some(value.to_string())),
        }
    }

    /// Reads a `1`/`0`/`true`/`false` flag.
    fn flag<F>(self, lookup: &F) -> Result<bool, HarnessError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        match self.read(lookup)?.as_deref() {
            None => Ok(false),
            Some(value) if value == "1" || value.eq_ignore_ascii_case("true") => Ok(true),
            Some(value) if value == "0" || value.eq_ignore_ascii_case("false") => Ok(false),
            Some(_) => Err(self.invalid("must be 1, 0, true, or false")),
        }
    }

    /// Reads a positive number of seconds.
    fn seconds<F>(self, lookup: &F) -> Result<Option<Duration>, HarnessError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        self.read(lookup)?
            .map(|value| match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(self.invalid("must be a positive number of seconds")),
            })
            .transpose()
    }

    /// Builds a configuration error for this variable.
    fn invalid(self, reason: &str) -> HarnessError {
        HarnessError::Config {
            variable: self.name().to_string(),
            reason: reason.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Harness settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Plugin host binary provisioned into each environment.
    pub host_binary: Option<PathBuf>,
    /// Test-name filter.
    pub run_filter: Option<String>,
    /// Include slow suites.
    pub slow: bool,
    /// Print the summary for passing runs too.
    pub verbose: bool,
    /// Per-run timeout.
    pub timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] for the first invalid variable.
    pub fn load() -> Result<Self, HarnessError> {
        Self::from_lookup(process_var)
    }

    /// Loads settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] for the first invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarnessError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        Ok(Self {
            host_binary: SystemTestEnv::HostBinary.read(&lookup)?.map(PathBuf::from),
            run_filter: SystemTestEnv::RunFilter.read(&lookup)?,
            slow: SystemTestEnv::Slow.flag(&lookup)?,
            verbose: SystemTestEnv::Verbose.flag(&lookup)?,
            timeout: SystemTestEnv::TimeoutSeconds.seconds(&lookup)?,
        })
    }

    /// Returns the host binary required for environment runs.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when no binary is configured.
    pub fn host_binary(&self) -> Result<&Path, HarnessError> {
        self.host_binary.as_deref().ok_or_else(|| {
            SystemTestEnv::HostBinary.invalid("must be set to run against environments")
        })
    }
}

/// Reads a variable from the process environment.
fn process_var(name: &str) -> Option<OsString> {
    std::env::var_os(name)
}
