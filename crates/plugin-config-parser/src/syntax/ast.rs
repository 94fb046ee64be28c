// crates/plugin-config-parser/src/syntax/ast.rs
// ============================================================================
// Module: Block Syntax Tree
// Description: Generic attribute/block tree produced by the block-syntax parser.
// Purpose: Intermediate form walked in lock-step with a decode plan.
// Dependencies: plugin-config-core, crate::diagnostics
// ============================================================================

//! ## Overview
//! The tree is schema-agnostic: a [`Body`] holds attributes and blocks in
//! source order, and attribute values stay unevaluated [`Expr`] trees until
//! the decoder evaluates them with the caller's variables.

use plugin_config_core::DynamicValue;

use crate::diagnostics::Position;

/// Sequence of attributes and blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    /// Items in source order.
    pub items: Vec<BodyItem>,
}

impl Body {
    /// Returns the first attribute with the given name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().find(|attribute| attribute.name == name)
    }

    /// Iterates over attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Attribute(attribute) => Some(attribute),
            BodyItem::Block(_) => None,
        })
    }

    /// Iterates over blocks.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Block(block) => Some(block),
            BodyItem::Attribute(_) => None,
        })
    }
}

/// One body item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyItem {
    /// `name = expr`.
    Attribute(Attribute),
    /// `name "label" { ... }`.
    Block(Block),
}

/// Attribute assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Unevaluated value.
    pub expr: Expr,
    /// Position of the name.
    pub position: Position,
}

/// Nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block type name.
    pub kind: String,
    /// Labels following the type name.
    pub labels: Vec<String>,
    /// Block contents.
    pub body: Body,
    /// Position of the type name.
    pub position: Position,
}

/// Unevaluated expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Constant value.
    Literal(DynamicValue),
    /// String template with at least one interpolation.
    Template(Template),
    /// Variable reference (dotted names joined with `.`).
    Variable(String),
    /// List constructor.
    List(Vec<Expr>),
    /// Object constructor.
    Object(Vec<(String, Expr)>),
    /// Unary minus.
    Negate(Box<Expr>),
    /// Arithmetic.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

/// Parsed string template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    /// Literal and interpolated parts in order.
    pub parts: Vec<TemplatePart>,
}

impl Template {
    /// Returns the interpolation when the template is exactly one `${...}`.
    #[must_use]
    pub fn sole_interpolation(&self) -> Option<(&Expr, &str)> {
        match self.parts.as_slice() {
            [
                TemplatePart::Interpolation {
                    expr,
                    raw,
                },
            ] => Some((expr, raw)),
            _ => None,
        }
    }

    /// Returns the text when the template contains no interpolation.
    #[must_use]
    pub fn as_literal(&self) -> Option<String> {
        self.parts
            .iter()
            .map(|part| match part {
                TemplatePart::Literal(text) => Some(text.as_str()),
                TemplatePart::Interpolation {
                    ..
                } => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(|pieces| pieces.concat())
    }
}

/// Template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal text, escapes already applied.
    Literal(String),
    /// `${expr}` interpolation.
    Interpolation {
        /// Interpolated expression.
        expr: Expr,
        /// Original `${...}` text, kept when the reference cannot be resolved.
        raw: String,
    },
}
