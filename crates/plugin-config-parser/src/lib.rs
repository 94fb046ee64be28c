// crates/plugin-config-parser/src/lib.rs
// ============================================================================
// Module: Plugin Config Parser Library
// Description: Schema-driven parsing of operator configuration documents.
// Purpose: Decode block-syntax or JSON text into dynamic values with diagnostics.
// Dependencies: plugin-config-core, serde_json, toml, tracing
// ============================================================================

//! ## Overview
//! A host receives a plugin's [`DecodePlan`] and operator-written text in one
//! of two [`Notation`]s. [`parse`] walks the plan over the parsed document,
//! resolves `${...}` references from the caller's [`VariableBinding`], and
//! returns the resulting [`DynamicValue`] together with every finding.
//! Invariants:
//! - Parsing never stops at the first problem; all findings are returned.
//! - Equal logical content yields equal values in both notations.
//! - Input size and nesting are bounded by [`ParseOptions`].

// ============================================================================
// SECTION: Modules
// ============================================================================

mod decoder;
pub mod diagnostics;
mod eval;
pub mod options;
mod source;
pub mod syntax;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use plugin_config_core::CompileError;
use plugin_config_core::DecodePlan;
use plugin_config_core::DynamicValue;
use plugin_config_core::Spec;
use plugin_config_core::VariableBinding;
use plugin_config_core::compile_cached;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use diagnostics::Diagnostic;
pub use diagnostics::DiagnosticKind;
pub use diagnostics::Diagnostics;
pub use diagnostics::Position;
pub use diagnostics::Severity;
pub use options::OptionsError;
pub use options::ParseOptions;

// ============================================================================
// SECTION: Notation
// ============================================================================

/// Surface notation of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    /// HCL-style blocks and attributes.
    BlockSyntax,
    /// JSON object notation.
    Json,
}

impl Notation {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlockSyntax => "block_syntax",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Parse Entry Points
// ============================================================================

/// Parses a configuration document with default options.
#[must_use]
pub fn parse(
    source: &str,
    notation: Notation,
    plan: &DecodePlan,
    vars: &VariableBinding,
) -> (DynamicValue, Diagnostics) {
    parse_with_options(source, notation, plan, vars, &ParseOptions::default())
}

/// Parses a configuration document.
///
/// The returned value is only meaningful when the diagnostics contain no
/// errors; warnings such as unresolved variables leave it usable.
#[must_use]
#[tracing::instrument(
    skip_all,
    fields(notation = notation.as_str(), source_len = source.len())
)]
pub fn parse_with_options(
    source: &str,
    notation: Notation,
    plan: &DecodePlan,
    vars: &VariableBinding,
    options: &ParseOptions,
) -> (DynamicValue, Diagnostics) {
    let (value, diagnostics) = match notation {
        Notation::BlockSyntax => decoder::decode_block_syntax(source, plan, vars, options),
        Notation::Json => decoder::decode_json(source, plan, vars, options),
    };
    tracing::debug!(
        diagnostics = diagnostics.len(),
        errors = diagnostics.errors().count(),
        "parsed plugin configuration"
    );
    (value, diagnostics)
}

// ============================================================================
// SECTION: Parser Handle
// ============================================================================

/// Reusable parser bound to one plugin's decode plan.
#[derive(Debug, Clone)]
pub struct ConfigParser {
    /// Shared compiled plan.
    plan: Arc<DecodePlan>,
    /// Parse settings.
    options: ParseOptions,
}

impl ConfigParser {
    /// Compiles (or fetches from the process-wide cache) the plan for `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the schema is malformed.
    pub fn new(spec: &Spec) -> Result<Self, CompileError> {
        Ok(Self::from_plan(compile_cached(spec)?))
    }

    /// Wraps an already compiled plan.
    #[must_use]
    pub fn from_plan(plan: Arc<DecodePlan>) -> Self {
        Self {
            plan,
            options: ParseOptions::default(),
        }
    }

    /// Replaces the parse options after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError`] when a limit is out of range.
    pub fn with_options(mut self, options: ParseOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Returns the decode plan.
    #[must_use]
    pub fn plan(&self) -> &DecodePlan {
        &self.plan
    }

    /// Returns the parse options.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses a document in the given notation.
    #[must_use]
    pub fn parse(
        &self,
        source: &str,
        notation: Notation,
        vars: &VariableBinding,
    ) -> (DynamicValue, Diagnostics) {
        parse_with_options(source, notation, &self.plan, vars, &self.options)
    }

    /// Parses block-syntax text.
    #[must_use]
    pub fn parse_block_syntax(
        &self,
        source: &str,
        vars: &VariableBinding,
    ) -> (DynamicValue, Diagnostics) {
        self.parse(source, Notation::BlockSyntax, vars)
    }

    /// Parses JSON text.
    #[must_use]
    pub fn parse_json(&self, source: &str, vars: &VariableBinding) -> (DynamicValue, Diagnostics) {
        self.parse(source, Notation::Json, vars)
    }
}
