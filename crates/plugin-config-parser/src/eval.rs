// crates/plugin-config-parser/src/eval.rs
// ============================================================================
// Module: Expression Evaluation
// Description: Evaluates attribute expressions against variable bindings.
// Purpose: Resolve `${...}` interpolation and arithmetic into dynamic values.
// Dependencies: bigdecimal, plugin-config-core, serde_json, crate::syntax
// ============================================================================

//! ## Overview
//! Evaluation never fails outright. Unresolved variables emit a warning and
//! leave the `${...}` text in place; invalid arithmetic or interpolating a
//! collection into a string emits an error and falls back to the raw text.
//! A template consisting of exactly one interpolation keeps the type of the
//! interpolated value, so `"${2 + 2}"` evaluates to the number 4.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use plugin_config_core::DynamicValue;
use plugin_config_core::ValueMap;
use plugin_config_core::VariableBinding;
use plugin_config_core::canonical_number;
use plugin_config_core::in_number_range;
use plugin_config_core::parse_decimal;
use serde_json::Value;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Position;
use crate::syntax::ast::BinaryOp;
use crate::syntax::ast::Expr;
use crate::syntax::ast::Template;
use crate::syntax::ast::TemplatePart;
use crate::syntax::template::Escapes;
use crate::syntax::template::parse_template;

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Location an expression is evaluated for, used in diagnostics.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site<'a> {
    /// Dotted field path.
    pub(crate) path: &'a str,
    /// Source position, when the notation has one.
    pub(crate) position: Option<Position>,
}

impl Site<'_> {
    /// Builds a diagnostic at this site.
    fn diagnostic(&self, kind: DiagnosticKind, message: String) -> Diagnostic {
        Diagnostic::new(kind, self.path, message).at(self.position)
    }
}

/// Expression evaluator bound to one variable set.
pub(crate) struct Evaluator<'a> {
    /// Variables visible to `${...}` references.
    vars: &'a VariableBinding,
    /// Nesting limit for templates found in JSON strings.
    max_nesting: usize,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator.
    pub(crate) const fn new(vars: &'a VariableBinding, max_nesting: usize) -> Self {
        Self {
            vars,
            max_nesting,
        }
    }

    /// Evaluates a block-syntax expression.
    pub(crate) fn eval_expr(
        &self,
        expr: &Expr,
        site: Site<'_>,
        diagnostics: &mut Diagnostics,
    ) -> DynamicValue {
        self.eval_value(expr, site, diagnostics)
    }

    /// Evaluates a JSON value, treating every string as a template.
    pub(crate) fn eval_json(
        &self,
        value: &Value,
        site: Site<'_>,
        diagnostics: &mut Diagnostics,
    ) -> DynamicValue {
        match value {
            Value::String(text) => {
                match parse_template(text, Escapes::Raw, Position::START, 0, self.max_nesting) {
                    Ok(template) => self.eval_template(&template, site, diagnostics),
                    Err(error) => {
                        diagnostics.push(site.diagnostic(
                            DiagnosticKind::Syntax,
                            format!("invalid template: {}", error.message),
                        ));
                        DynamicValue::String(text.clone())
                    }
                }
            }
            Value::Array(items) => DynamicValue::List(
                items.iter().map(|item| self.eval_json(item, site, diagnostics)).collect(),
            ),
            Value::Object(map) => DynamicValue::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.eval_json(item, site, diagnostics)))
                    .collect(),
            ),
            scalar => DynamicValue::from_json(scalar),
        }
    }

    /// Evaluates an expression, substituting a placeholder on failure.
    fn eval_value(
        &self,
        expr: &Expr,
        site: Site<'_>,
        diagnostics: &mut Diagnostics,
    ) -> DynamicValue {
        self.eval_inner(expr, site, diagnostics).unwrap_or_else(|| match expr {
            Expr::Variable(name) => DynamicValue::String(format!("${{{name}}}")),
            _ => DynamicValue::Null,
        })
    }

    /// Evaluates an expression; `None` means a diagnostic was already recorded.
    fn eval_inner(
        &self,
        expr: &Expr,
        site: Site<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Option<DynamicValue> {
        match expr {
            Expr::Literal(value) => Some(value.clone()),
            Expr::Template(template) => Some(self.eval_template(template, site, diagnostics)),
            Expr::Variable(name) => self.lookup(name, site, diagnostics),
            Expr::List(items) => Some(DynamicValue::List(
                items.iter().map(|item| self.eval_value(item, site, diagnostics)).collect(),
            )),
            Expr::Object(entries) => {
                let mut map = ValueMap::new();
                for (key, item) in entries {
                    map.insert(key.clone(), self.eval_value(item, site, diagnostics));
                }
                Some(DynamicValue::Object(map))
            }
            Expr::Negate(inner) => {
                let value = self.eval_inner(inner, site, diagnostics)?;
                let number = numeric(&value, site, diagnostics)?;
                Some(DynamicValue::Number(-number))
            }
            Expr::Binary {
                op,
                lhs,
                rhs,
            } => {
                let lhs = self.eval_inner(lhs, site, diagnostics)?;
                let rhs = self.eval_inner(rhs, site, diagnostics)?;
                let lhs = numeric(&lhs, site, diagnostics)?;
                let rhs = numeric(&rhs, site, diagnostics)?;
                arithmetic(*op, lhs, rhs, site, diagnostics).map(DynamicValue::Number)
            }
        }
    }

    /// Evaluates a template.
    fn eval_template(
        &self,
        template: &Template,
        site: Site<'_>,
        diagnostics: &mut Diagnostics,
    ) -> DynamicValue {
        if let Some(text) = template.as_literal() {
            return DynamicValue::String(text);
        }
        if let Some((expr, raw)) = template.sole_interpolation() {
            return self
                .eval_inner(expr, site, diagnostics)
                .unwrap_or_else(|| DynamicValue::String(raw.to_string()));
        }

        let mut out = String::new();
        for part in &template.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Interpolation {
                    expr,
                    raw,
                } => match self.eval_inner(expr, site, diagnostics) {
                    Some(DynamicValue::String(text)) => out.push_str(&text),
                    Some(DynamicValue::Number(number)) => out.push_str(&canonical_number(&number)),
                    Some(DynamicValue::Bool(flag)) => {
                        out.push_str(if flag { "true" } else { "false" });
                    }
                    Some(other) => {
                        diagnostics.push(site.diagnostic(
                            DiagnosticKind::InvalidExpression,
                            format!(
                                "cannot interpolate {} value `{raw}` into a string",
                                other.type_name()
                            ),
                        ));
                        out.push_str(raw);
                    }
                    None => out.push_str(raw),
                },
            }
        }
        DynamicValue::String(out)
    }

    /// Resolves a variable, falling back to walking dotted segments through objects.
    fn lookup(
        &self,
        name: &str,
        site: Site<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Option<DynamicValue> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        let mut segments = name.split('.');
        let nested = segments.next().and_then(|head| self.vars.get(head)).and_then(|root| {
            segments.try_fold(root, |value, segment| value.get(segment))
        });
        if let Some(value) = nested {
            return Some(value.clone());
        }
        tracing::trace!(variable = name, path = site.path, "unresolved variable");
        diagnostics.push(site.diagnostic(
            DiagnosticKind::UnresolvedVariable,
            format!("no variable named `{name}`; the reference is left in place"),
        ));
        None
    }
}

// ============================================================================
// SECTION: Arithmetic
// ============================================================================

/// Coerces an operand to a number.
fn numeric(
    value: &DynamicValue,
    site: Site<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<BigDecimal> {
    let number = match value {
        DynamicValue::Number(number) => Some(number.clone()),
        DynamicValue::String(text) => parse_decimal(text),
        _ => None,
    };
    if number.is_none() {
        let shown = match value {
            DynamicValue::String(text) => format!("string `{text}`"),
            other => other.type_name().to_string(),
        };
        diagnostics.push(site.diagnostic(
            DiagnosticKind::InvalidExpression,
            format!("arithmetic requires numbers, got {shown}"),
        ));
    }
    number
}

/// Applies an arithmetic operator.
fn arithmetic(
    op: BinaryOp,
    lhs: BigDecimal,
    rhs: BigDecimal,
    site: Site<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<BigDecimal> {
    let result = match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Subtract => lhs - rhs,
        BinaryOp::Multiply => lhs * rhs,
        BinaryOp::Divide => {
            if rhs == BigDecimal::from(0) {
                let message = "division by zero".to_string();
                diagnostics.push(site.diagnostic(DiagnosticKind::InvalidExpression, message));
                return None;
            }
            lhs / rhs
        }
    };
    if !in_number_range(&result) {
        diagnostics.push(site.diagnostic(
            DiagnosticKind::InvalidExpression,
            "arithmetic result is out of range".to_string(),
        ));
        return None;
    }
    Some(result)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
