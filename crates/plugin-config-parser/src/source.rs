// crates/plugin-config-parser/src/source.rs
// ============================================================================
// Module: Notation-Neutral Bodies
// Description: Uniform view over block-syntax bodies and JSON objects.
// Purpose: Let one decoder walk either notation.
// Dependencies: plugin-config-core, serde_json, crate::syntax
// ============================================================================

//! ## Overview
//! A [`BodyRef`] answers the questions the decoder asks of a body: the value
//! of one attribute, the blocks of one type (with their labels), and which
//! names the schema did not declare. JSON has no block syntax, so a block is
//! an object or a list of objects, and each label adds one level of object
//! nesting keyed by the label value. Block syntax accepts the same shape
//! written as an attribute (`devices = [{ ... }, { ... }]`), which keeps
//! documents converted from JSON decoding identically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use plugin_config_core::BodyScope;
use plugin_config_core::DynamicValue;
use serde_json::Map;
use serde_json::Value;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Position;
use crate::syntax::ast::Body;
use crate::syntax::ast::Expr;

// ============================================================================
// SECTION: References
// ============================================================================

/// Borrowed body in either notation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BodyRef<'a> {
    /// Block-syntax body.
    Syntax(&'a Body),
    /// Block-syntax object expression used as a block body.
    Object(&'a [(String, Expr)], Position),
    /// JSON object.
    Json(&'a Map<String, Value>),
}

/// Borrowed, unevaluated attribute value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ExprRef<'a> {
    /// Block-syntax expression.
    Syntax(&'a Expr),
    /// JSON value.
    Json(&'a Value),
}

/// Attribute found in a body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AttrRef<'a> {
    /// Attribute name.
    pub(crate) name: &'a str,
    /// Unevaluated value.
    pub(crate) expr: ExprRef<'a>,
    /// Source position, when known.
    pub(crate) position: Option<Position>,
}

/// Block found in a body.
#[derive(Debug, Clone)]
pub(crate) struct BlockRef<'a> {
    /// Label values, outermost first.
    pub(crate) labels: Vec<String>,
    /// Block body.
    pub(crate) body: BodyRef<'a>,
    /// Source position, when known.
    pub(crate) position: Option<Position>,
}

/// Appends a name to a dotted field path.
pub(crate) fn join(path: &str, name: &str) -> String {
    if path.is_empty() { name.to_string() } else { format!("{path}.{name}") }
}

/// Returns true when an expression has the shape of one or more block bodies.
fn is_block_shaped(expr: &Expr) -> bool {
    match expr {
        Expr::Object(_) => true,
        Expr::List(items) => items.iter().all(|item| matches!(item, Expr::Object(_))),
        _ => false,
    }
}

// ============================================================================
// SECTION: Body Queries
// ============================================================================

impl<'a> BodyRef<'a> {
    /// Returns the named attribute.
    pub(crate) fn attribute(self, name: &str) -> Option<AttrRef<'a>> {
        self.attributes().into_iter().find(|attribute| attribute.name == name)
    }

    /// Returns every attribute in source order.
    pub(crate) fn attributes(self) -> Vec<AttrRef<'a>> {
        match self {
            Self::Syntax(body) => body
                .attributes()
                .map(|attribute| AttrRef {
                    name: &attribute.name,
                    expr: ExprRef::Syntax(&attribute.expr),
                    position: Some(attribute.position),
                })
                .collect(),
            Self::Object(entries, position) => entries
                .iter()
                .map(|(key, expr)| AttrRef {
                    name: key,
                    expr: ExprRef::Syntax(expr),
                    position: Some(position),
                })
                .collect(),
            Self::Json(map) => map
                .iter()
                .map(|(key, value)| AttrRef {
                    name: key,
                    expr: ExprRef::Json(value),
                    position: None,
                })
                .collect(),
        }
    }

    /// Returns the type names and positions of nested syntactic blocks.
    pub(crate) fn nested_blocks(self) -> Vec<(&'a str, Option<Position>)> {
        match self {
            Self::Syntax(body) => {
                body.blocks().map(|block| (block.kind.as_str(), Some(block.position))).collect()
            }
            Self::Object(..) | Self::Json(_) => Vec::new(),
        }
    }

    /// Returns the blocks of one type, each carrying `labels.len()` labels.
    ///
    /// Blocks with the wrong number of labels and values that cannot be
    /// blocks are reported and skipped.
    pub(crate) fn blocks(
        self,
        name: &str,
        labels: &[String],
        path: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<BlockRef<'a>> {
        let block_path = join(path, name);
        let mut found = Vec::new();
        match self {
            Self::Syntax(body) => {
                for block in body.blocks().filter(|block| block.kind == name) {
                    if block.labels.len() == labels.len() {
                        found.push(BlockRef {
                            labels: block.labels.clone(),
                            body: BodyRef::Syntax(&block.body),
                            position: Some(block.position),
                        });
                        continue;
                    }
                    let diagnostic = if labels.is_empty() {
                        Diagnostic::new(
                            DiagnosticKind::UnsupportedField,
                            &block_path,
                            format!("`{name}` blocks take no labels"),
                        )
                    } else {
                        Diagnostic::new(
                            DiagnosticKind::Syntax,
                            &block_path,
                            format!(
                                "`{name}` blocks require {} label(s) ({}), found {}",
                                labels.len(),
                                labels.join(", "),
                                block.labels.len()
                            ),
                        )
                    };
                    diagnostics.push(diagnostic.at(Some(block.position)));
                }
                let shaped =
                    body.attribute(name).filter(|attribute| is_block_shaped(&attribute.expr));
                if let Some(attribute) = shaped {
                    let mut expander = ExprBlocks {
                        position: attribute.position,
                        path: &block_path,
                        found: &mut found,
                        diagnostics,
                    };
                    expander.collect(&attribute.expr, labels.len(), &mut Vec::new());
                }
            }
            Self::Object(entries, position) => {
                if let Some((_, expr)) = entries.iter().find(|(key, _)| key.as_str() == name) {
                    let mut expander = ExprBlocks {
                        position,
                        path: &block_path,
                        found: &mut found,
                        diagnostics,
                    };
                    expander.collect(expr, labels.len(), &mut Vec::new());
                }
            }
            Self::Json(map) => {
                if let Some(value) = map.get(name) {
                    collect_json_blocks(
                        value,
                        labels.len(),
                        &mut Vec::new(),
                        &block_path,
                        &mut found,
                        diagnostics,
                    );
                }
            }
        }
        found
    }

    /// Reports attributes and blocks the scope does not declare.
    pub(crate) fn check_unsupported(
        self,
        scope: &BodyScope,
        path: &str,
        diagnostics: &mut Diagnostics,
    ) {
        match self {
            Self::Syntax(body) => {
                for attribute in body.attributes() {
                    if scope.has_attribute(&attribute.name)
                        || (scope.has_block(&attribute.name) && is_block_shaped(&attribute.expr))
                    {
                        continue;
                    }
                    let message = if scope.has_block(&attribute.name) {
                        format!(
                            "an argument named `{0}` is not expected here; \
                             did you mean to define a `{0}` block?",
                            attribute.name
                        )
                    } else {
                        format!("unsupported argument `{}`", attribute.name)
                    };
                    let field = join(path, &attribute.name);
                    diagnostics.push(
                        Diagnostic::new(DiagnosticKind::UnsupportedField, field, message)
                            .at(Some(attribute.position)),
                    );
                }
                for block in body.blocks() {
                    if scope.has_block(&block.kind) {
                        continue;
                    }
                    let message = if scope.has_attribute(&block.kind) {
                        format!(
                            "blocks of type `{0}` are not expected here; \
                             did you mean to define argument `{0}`?",
                            block.kind
                        )
                    } else {
                        format!("unsupported block type `{}`", block.kind)
                    };
                    let field = join(path, &block.kind);
                    diagnostics.push(
                        Diagnostic::new(DiagnosticKind::UnsupportedField, field, message)
                            .at(Some(block.position)),
                    );
                }
            }
            Self::Object(..) | Self::Json(_) => {
                for attribute in self.attributes() {
                    let key = attribute.name;
                    if !scope.has_attribute(key) && !scope.has_block(key) {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::UnsupportedField,
                                join(path, key),
                                format!("unsupported argument `{key}`"),
                            )
                            .at(attribute.position),
                        );
                    }
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Block Expansion
// ============================================================================

/// Expands block-shaped expressions into block references.
struct ExprBlocks<'a, 'b> {
    /// Position of the attribute holding the expression.
    position: Position,
    /// Path used in diagnostics.
    path: &'b str,
    /// Output list.
    found: &'b mut Vec<BlockRef<'a>>,
    /// Diagnostic sink.
    diagnostics: &'b mut Diagnostics,
}

impl<'a> ExprBlocks<'a, '_> {
    /// Collects block bodies, consuming one object level per remaining label.
    fn collect(&mut self, expr: &'a Expr, labels_left: usize, labels: &mut Vec<String>) {
        match expr {
            Expr::Literal(DynamicValue::Null) => {}
            Expr::List(items) => {
                for item in items {
                    self.collect(item, labels_left, labels);
                }
            }
            Expr::Object(entries) if labels_left == 0 => self.found.push(BlockRef {
                labels: labels.clone(),
                body: BodyRef::Object(entries, self.position),
                position: Some(self.position),
            }),
            Expr::Object(entries) => {
                for (label, inner) in entries {
                    labels.push(label.clone());
                    self.collect(inner, labels_left - 1, labels);
                    labels.pop();
                }
            }
            _ => self.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::TypeCoercionFailure,
                    self.path,
                    "a block must be an object or a list of objects",
                )
                .at(Some(self.position)),
            ),
        }
    }
}

/// Expands a JSON block value into block references.
fn collect_json_blocks<'a>(
    value: &'a Value,
    labels_left: usize,
    labels: &mut Vec<String>,
    path: &str,
    found: &mut Vec<BlockRef<'a>>,
    diagnostics: &mut Diagnostics,
) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                collect_json_blocks(item, labels_left, labels, path, found, diagnostics);
            }
        }
        Value::Object(map) if labels_left == 0 => found.push(BlockRef {
            labels: labels.clone(),
            body: BodyRef::Json(map),
            position: None,
        }),
        Value::Object(map) => {
            for (label, inner) in map {
                labels.push(label.clone());
                collect_json_blocks(inner, labels_left - 1, labels, path, found, diagnostics);
                labels.pop();
            }
        }
        other => {
            let kind = match other {
                Value::Bool(_) => "bool",
                Value::Number(_) => "number",
                _ => "string",
            };
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::TypeCoercionFailure,
                path,
                format!("a block must be an object or a list of objects, got {kind}"),
            ));
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
