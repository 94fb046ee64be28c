// system-tests/src/lib.rs
// ============================================================================
// Module: Plugin Config System Tests Library
// Description: Shared configuration and harness seams for system tests.
// Purpose: Provide run options, reports, and runner/provisioner interfaces.
// Dependencies: serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate hosts the harness used by the end-to-end suites in
//! `system-tests/tests`: environment configuration, runner and provisioner
//! interfaces, and the [`TestReport`] decoded from a runner's event stream.
//! Security posture: system-test inputs are untrusted and fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod report;
pub mod runner;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use error::HarnessError;
pub use report::TestReport;
pub use runner::Endpoints;
pub use runner::Provisioner;
pub use runner::RunOptions;
pub use runner::Target;
pub use runner::TestRunner;
