// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for plugin config system-tests.
// Purpose: Provide driver fixtures and in-memory harness stubs.
// Dependencies: system-tests, plugin-config-core, plugin-config-parser
// ============================================================================

//! ## Overview
//! Shared helpers for plugin config system-tests.
//! Invariants:
//! - System-test execution is deterministic and fail-closed.
//! - Inputs are treated as untrusted unless explicitly mocked.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod fixtures;
pub mod stubs;
