// crates/plugin-config-parser/src/syntax/mod.rs
// ============================================================================
// Module: Block Syntax
// Description: Lexer, parser, and templates for block-structured text.
// Purpose: Turn operator-written configuration into a generic syntax tree.
// Dependencies: plugin-config-core, crate::diagnostics
// ============================================================================

//! ## Overview
//! The block syntax is a small HCL-style language: attributes `name = expr`,
//! blocks `name "label" { ... }`, comments, and `${...}` string templates.
//! [`parse_body`] returns the recovered tree together with every syntax
//! error so callers can still decode the well-formed parts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod ast;
mod lexer;
mod parser;
pub(crate) mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use ast::Body;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticKind;

/// Parses block-syntax text into a [`Body`].
///
/// Syntax errors are returned as [`DiagnosticKind::Syntax`] diagnostics
/// attributed to `path`; the returned body holds every item that parsed.
#[must_use]
pub fn parse_body(source: &str, path: &str, max_nesting: usize) -> (Body, Vec<Diagnostic>) {
    let (body, errors) = parser::parse_body(source, max_nesting);
    let diagnostics = errors
        .into_iter()
        .map(|error| {
            Diagnostic::new(DiagnosticKind::Syntax, path, error.message).at(Some(error.position))
        })
        .collect();
    (body, diagnostics)
}
