// system-tests/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Failures raised while provisioning or running system tests.
// Purpose: Distinguish infrastructure failures from failing tests.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`HarnessError`] means no trustworthy report exists. Failing tests are
//! not errors; they are counted in [`crate::TestReport`].

use thiserror::Error;

/// Errors raised by the system-test harness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Reading runner output or spawning a process failed.
    #[error("i/o failure: {0}")]
    Io(String),
    /// A runner event line could not be decoded.
    #[error("invalid test event on line {line}: {reason}")]
    Event {
        /// One-based line number.
        line: usize,
        /// Decoder message.
        reason: String,
    },
    /// A harness variable is missing or invalid.
    #[error("invalid {variable}: {reason}")]
    Config {
        /// Variable name.
        variable: String,
        /// Failure description.
        reason: String,
    },
    /// An environment target argument is malformed.
    #[error("invalid target `{0}`: expected <provider>/<environment>")]
    InvalidTarget(String),
    /// Provisioning an environment failed.
    #[error("failed to provision {target}: {reason}")]
    Provision {
        /// Target being provisioned.
        target: String,
        /// Failure description.
        reason: String,
    },
}
