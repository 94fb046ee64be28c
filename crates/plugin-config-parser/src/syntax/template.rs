// crates/plugin-config-parser/src/syntax/template.rs
// ============================================================================
// Module: String Templates
// Description: Splits string contents into literal and `${...}` parts.
// Purpose: Share interpolation handling between block syntax and JSON.
// Dependencies: crate::syntax::{ast, lexer, parser}
// ============================================================================

//! ## Overview
//! Every string in either notation is a template. `$${` produces a literal
//! `${`, and each `${expr}` is parsed with the standalone expression parser.
//! Quoted block-syntax strings additionally process backslash escapes; JSON
//! strings arrive already unescaped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::ast::Template;
use super::ast::TemplatePart;
use super::lexer::SyntaxError;
use super::lexer::skip_nested_string;
use super::parser::parse_expression;
use crate::diagnostics::Position;

// ============================================================================
// SECTION: Template Parsing
// ============================================================================

/// Escape handling for template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escapes {
    /// Block-syntax quoted string; `origin` is the opening quote.
    Quoted,
    /// Already-unescaped text such as a decoded JSON string.
    Raw,
}

/// Parses template text into literal and interpolated parts.
pub(crate) fn parse_template(
    raw: &str,
    escapes: Escapes,
    origin: Position,
    depth: usize,
    max_nesting: usize,
) -> Result<Template, SyntaxError> {
    let origin = match escapes {
        Escapes::Quoted => Position {
            line: origin.line,
            column: origin.column + 1,
        },
        Escapes::Raw => origin,
    };
    let bytes = raw.as_bytes();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut cursor = 0;

    while cursor < raw.len() {
        let rest = &raw[cursor ..];
        if rest.starts_with("$${") {
            literal.push_str("${");
            cursor += 3;
        } else if rest.starts_with("${") {
            let start = position_at(raw, cursor, origin);
            if depth >= max_nesting {
                return Err(SyntaxError {
                    message: format!("nesting exceeds the limit of {max_nesting}"),
                    position: start,
                });
            }
            let close = matching_brace(bytes, cursor + 2).ok_or_else(|| SyntaxError {
                message: "unterminated interpolation; expected `}`".to_string(),
                position: start,
            })?;
            let inner = &raw[cursor + 2 .. close];
            let inner_position = position_at(raw, cursor + 2, origin);
            let expr = parse_expression(inner, inner_position, depth + 1, max_nesting)?;
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(TemplatePart::Interpolation {
                expr,
                raw: raw[cursor ..= close].to_string(),
            });
            cursor = close + 1;
        } else if escapes == Escapes::Quoted && rest.starts_with('\\') {
            let (ch, len) = unescape(rest).map_err(|message| SyntaxError {
                message,
                position: position_at(raw, cursor, origin),
            })?;
            literal.push(ch);
            cursor += len;
        } else {
            let ch = rest.chars().next().unwrap_or('\u{fffd}');
            literal.push(ch);
            cursor += ch.len_utf8();
        }
    }

    if !literal.is_empty() || parts.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }
    Ok(Template {
        parts,
    })
}

/// Finds the `}` closing an interpolation whose body starts at `start`.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1_usize;
    let mut cursor = start;
    while let Some(&byte) = bytes.get(cursor) {
        match byte {
            b'"' => {
                cursor = skip_nested_string(bytes, cursor);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(cursor);
                }
            }
            _ => {}
        }
        cursor += 1;
    }
    None
}

/// Decodes one backslash escape, returning the character and bytes consumed.
fn unescape(rest: &str) -> Result<(char, usize), String> {
    let mut chars = rest.chars().skip(1);
    match chars.next() {
        Some('n') => Ok(('\n', 2)),
        Some('r') => Ok(('\r', 2)),
        Some('t') => Ok(('\t', 2)),
        Some('"') => Ok(('"', 2)),
        Some('\\') => Ok(('\\', 2)),
        Some('u') => {
            let digits = rest.get(2 .. 6).ok_or_else(|| "incomplete `\\u` escape".to_string())?;
            u32::from_str_radix(digits, 16)
                .ok()
                .and_then(char::from_u32)
                .map(|ch| (ch, 6))
                .ok_or_else(|| format!("invalid unicode escape `\\u{digits}`"))
        }
        Some(other) => Err(format!("invalid escape sequence `\\{other}`")),
        None => Err("incomplete escape sequence".to_string()),
    }
}

/// Computes the source position of a byte offset inside template text.
fn position_at(raw: &str, offset: usize, origin: Position) -> Position {
    let mut position = origin;
    for ch in raw[.. offset.min(raw.len())].chars() {
        if ch == '\n' {
            position.line += 1;
            position.column = 1;
        } else {
            position.column += 1;
        }
    }
    position
}

// ============================================================================
// SECTION: Tests
// ============================================================================
