// crates/plugin-config-parser/src/diagnostics.rs
// ============================================================================
// Module: Parse Diagnostics
// Description: Per-field findings accumulated during one parse.
// Purpose: Give operators complete feedback with field paths and positions.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Parsing never stops at the first problem. Every finding becomes a
//! [`Diagnostic`] carrying a [`DiagnosticKind`], the dotted field path as the
//! operator wrote it (`config.devices[1].host_path`), a message, and the
//! source position when the notation has one.
//! Invariants:
//! - [`DiagnosticKind::UnresolvedVariable`] is a warning; every other kind is
//!   an error that makes the parsed value unusable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// SECTION: Positions
// ============================================================================

/// One-based line and column in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number in characters, starting at 1.
    pub column: usize,
}

impl Position {
    /// Position of the first character.
    pub const START: Self = Self {
        line: 1,
        column: 1,
    };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ============================================================================
// SECTION: Diagnostic Types
// ============================================================================

/// Category of a parse finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required attribute or block is absent or null.
    MissingRequiredField,
    /// An interpolated variable has no binding.
    UnresolvedVariable,
    /// A value cannot be converted to the declared type.
    TypeCoercionFailure,
    /// An argument or block is not declared by the schema.
    UnsupportedField,
    /// A block occurs more or fewer times than allowed.
    BlockCount,
    /// An expression cannot be evaluated.
    InvalidExpression,
    /// The source text is malformed or over limits.
    Syntax,
}

impl DiagnosticKind {
    /// Returns the severity associated with the kind.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnresolvedVariable => Severity::Warning,
            Self::MissingRequiredField
            | Self::TypeCoercionFailure
            | Self::UnsupportedField
            | Self::BlockCount
            | Self::InvalidExpression
            | Self::Syntax => Severity::Error,
        }
    }

    /// Returns the stable label used in rendered diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequiredField => "missing required field",
            Self::UnresolvedVariable => "unresolved variable",
            Self::TypeCoercionFailure => "type coercion failure",
            Self::UnsupportedField => "unsupported field",
            Self::BlockCount => "block count",
            Self::InvalidExpression => "invalid expression",
            Self::Syntax => "syntax error",
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; the parsed value remains usable.
    Warning,
    /// The parsed value must not be used.
    Error,
}

/// A single parse finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Finding category.
    pub kind: DiagnosticKind,
    /// Dotted field path in source terms.
    pub path: String,
    /// Human-readable explanation.
    pub message: String,
    /// Source position, when known.
    pub position: Option<Position>,
}

impl Diagnostic {
    /// Creates a diagnostic without a position.
    #[must_use]
    pub fn new(kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
            position: None,
        }
    }

    /// Attaches a source position.
    #[must_use]
    pub const fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    /// Returns the diagnostic severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(position) = self.position {
            write!(f, "{position}: ")?;
        }
        write!(f, "{}: {}: {}", self.kind.as_str(), self.path, self.message)
    }
}

// ============================================================================
// SECTION: Diagnostic Collection
// ============================================================================

/// Ordered collection of diagnostics from one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    /// Findings in discovery order.
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true when any error-severity diagnostic is present.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|entry| entry.severity() == Severity::Error)
    }

    /// Iterates over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|entry| entry.severity() == Severity::Error)
    }

    /// Iterates over diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    /// Iterates over all diagnostics.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no diagnostic was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the collection into a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
