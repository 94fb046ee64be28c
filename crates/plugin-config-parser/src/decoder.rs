// crates/plugin-config-parser/src/decoder.rs
// ============================================================================
// Module: Plan-Driven Decoder
// Description: Walks a decode plan and a parsed document in lock-step.
// Purpose: Produce the dynamic value a plugin's schema describes.
// Dependencies: plugin-config-core, serde_json, crate::{eval, source, syntax}
// ============================================================================

//! ## Overview
//! Decoding is total: every plan node yields a value, and every problem
//! becomes a diagnostic instead of an early return. Both notations are first
//! reduced to a [`BodyRef`], so block syntax and JSON share the exact same
//! plan walk and converge on identical values for equal logical content.
//! Invariants:
//! - A null attribute is treated exactly like an absent one.
//! - Block lists always decode to a list and block maps to an object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use plugin_config_core::BlockBody;
use plugin_config_core::BodyScope;
use plugin_config_core::DecodePlan;
use plugin_config_core::DynamicValue;
use plugin_config_core::PlanNode;
use plugin_config_core::ValueMap;
use plugin_config_core::ValueType;
use plugin_config_core::VariableBinding;
use serde_json::Value;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::DiagnosticKind;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Position;
use crate::eval::Evaluator;
use crate::eval::Site;
use crate::options::ParseOptions;
use crate::source::AttrRef;
use crate::source::BlockRef;
use crate::source::BodyRef;
use crate::source::ExprRef;
use crate::source::join;
use crate::syntax;
use crate::syntax::ast::BodyItem;

// ============================================================================
// SECTION: Document Entry Points
// ============================================================================

/// Decodes block-syntax text.
pub(crate) fn decode_block_syntax(
    source: &str,
    plan: &DecodePlan,
    vars: &VariableBinding,
    options: &ParseOptions,
) -> (DynamicValue, Diagnostics) {
    let mut decoder = Decoder::new(vars, options.max_nesting);
    if !decoder.within_size(source, options) {
        return decoder.finish(DynamicValue::Null);
    }

    let root_name = options.root_block.as_str();
    let (body, syntax_errors) = syntax::parse_body(source, root_name, options.max_nesting);
    for diagnostic in syntax_errors {
        decoder.diagnostics.push(diagnostic);
    }

    let mut roots = Vec::new();
    for item in &body.items {
        match item {
            BodyItem::Block(block) if block.kind.eq_ignore_ascii_case(root_name) => {
                if !block.labels.is_empty() {
                    decoder.report(
                        Diagnostic::new(
                            DiagnosticKind::UnsupportedField,
                            &block.kind,
                            format!("the `{root_name}` block takes no labels"),
                        )
                        .at(Some(block.position)),
                    );
                }
                roots.push(block);
            }
            BodyItem::Block(block) => decoder.report(
                Diagnostic::new(
                    DiagnosticKind::UnsupportedField,
                    &block.kind,
                    format!(
                        "unsupported block type `{}`; settings belong inside `{root_name}`",
                        block.kind
                    ),
                )
                .at(Some(block.position)),
            ),
            BodyItem::Attribute(attribute) => decoder.report(
                Diagnostic::new(
                    DiagnosticKind::UnsupportedField,
                    &attribute.name,
                    format!(
                        "unsupported argument `{}`; settings belong inside `{root_name}`",
                        attribute.name
                    ),
                )
                .at(Some(attribute.position)),
            ),
        }
    }

    let Some(root) = roots.first() else {
        decoder.report(Diagnostic::new(
            DiagnosticKind::MissingRequiredField,
            root_name,
            format!("a `{root_name}` block is required"),
        ));
        return decoder.finish(DynamicValue::Null);
    };
    if let Some(extra) = roots.get(1) {
        decoder.report(
            Diagnostic::new(
                DiagnosticKind::BlockCount,
                &extra.kind,
                format!("only one `{root_name}` block is allowed, found {}", roots.len()),
            )
            .at(Some(extra.position)),
        );
    }

    let body = BodyRef::Syntax(&root.body);
    let value = decoder.decode_body(plan.root(), plan.scope(), body, &root.kind);
    decoder.finish(value)
}

/// Decodes JSON text.
pub(crate) fn decode_json(
    source: &str,
    plan: &DecodePlan,
    vars: &VariableBinding,
    options: &ParseOptions,
) -> (DynamicValue, Diagnostics) {
    let mut decoder = Decoder::new(vars, options.max_nesting);
    if !decoder.within_size(source, options) {
        return decoder.finish(DynamicValue::Null);
    }

    let root_name = options.root_block.as_str();
    let document: Value = match serde_json::from_str(source) {
        Ok(document) => document,
        Err(err) => {
            let position = Position {
                line: err.line(),
                column: err.column(),
            };
            let diagnostic = Diagnostic::new(DiagnosticKind::Syntax, root_name, err.to_string());
            decoder.report(diagnostic.at(Some(position)));
            return decoder.finish(DynamicValue::Null);
        }
    };
    let Value::Object(top) = &document else {
        decoder.report(Diagnostic::new(
            DiagnosticKind::Syntax,
            root_name,
            "a JSON configuration must be an object",
        ));
        return decoder.finish(DynamicValue::Null);
    };

    let mut roots = Vec::new();
    for (key, value) in top {
        if key.eq_ignore_ascii_case(root_name) {
            roots.push((key, value));
        } else {
            decoder.report(Diagnostic::new(
                DiagnosticKind::UnsupportedField,
                key,
                format!("unsupported argument `{key}`; settings belong inside `{root_name}`"),
            ));
        }
    }
    if roots.len() > 1 {
        decoder.report(Diagnostic::new(
            DiagnosticKind::BlockCount,
            root_name,
            format!("only one `{root_name}` block is allowed, found {}", roots.len()),
        ));
    }

    let mut bodies = Vec::new();
    if let Some((key, value)) = roots.first() {
        if json_depth(value) > options.max_nesting {
            decoder.report(Diagnostic::new(
                DiagnosticKind::Syntax,
                key.as_str(),
                format!("nesting exceeds the limit of {}", options.max_nesting),
            ));
            return decoder.finish(DynamicValue::Null);
        }
        bodies = BodyRef::Json(top).blocks(key, &[], "", &mut decoder.diagnostics);
    }

    let Some(root) = bodies.first() else {
        decoder.report(Diagnostic::new(
            DiagnosticKind::MissingRequiredField,
            root_name,
            format!("a `{root_name}` block is required"),
        ));
        return decoder.finish(DynamicValue::Null);
    };
    if bodies.len() > 1 {
        decoder.report(Diagnostic::new(
            DiagnosticKind::BlockCount,
            root_name,
            format!("only one `{root_name}` block is allowed, found {}", bodies.len()),
        ));
    }

    let path = roots.first().map_or(root_name, |(key, _)| key.as_str());
    let value = decoder.decode_body(plan.root(), plan.scope(), root.body, path);
    decoder.finish(value)
}

/// Returns the container nesting depth of a JSON value.
fn json_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}

// ============================================================================
// SECTION: Decoder
// ============================================================================

/// Plan walker accumulating diagnostics.
struct Decoder<'a> {
    /// Expression evaluator.
    evaluator: Evaluator<'a>,
    /// Findings so far.
    diagnostics: Diagnostics,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder.
    const fn new(vars: &'a VariableBinding, max_nesting: usize) -> Self {
        Self {
            evaluator: Evaluator::new(vars, max_nesting),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Records a diagnostic.
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns the value with the collected diagnostics.
    fn finish(self, value: DynamicValue) -> (DynamicValue, Diagnostics) {
        (value, self.diagnostics)
    }

    /// Rejects oversized input.
    fn within_size(&mut self, source: &str, options: &ParseOptions) -> bool {
        if source.len() <= options.max_source_bytes {
            return true;
        }
        self.report(Diagnostic::new(
            DiagnosticKind::Syntax,
            options.root_block.as_str(),
            format!(
                "configuration is {} bytes, which exceeds the limit of {} bytes",
                source.len(),
                options.max_source_bytes
            ),
        ));
        false
    }

    /// Decodes one body after reporting names its scope does not declare.
    fn decode_body(
        &mut self,
        node: &PlanNode,
        scope: &BodyScope,
        body: BodyRef<'_>,
        path: &str,
    ) -> DynamicValue {
        body.check_unsupported(scope, path, &mut self.diagnostics);
        self.decode(node, body, path)
    }

    /// Decodes a block body.
    fn decode_block(&mut self, plan: &BlockBody, block: &BlockRef<'_>, path: &str) -> DynamicValue {
        self.decode_body(&plan.node, &plan.scope, block.body, path)
    }

    /// Decodes a node, applying absence rules when the source lacks it.
    fn decode(&mut self, node: &PlanNode, body: BodyRef<'_>, path: &str) -> DynamicValue {
        match self.decode_present(node, body, path) {
            Some(value) => value,
            None => self.absent(node, path),
        }
    }

    /// Decodes a node; `None` means the source does not define it.
    fn decode_present(
        &mut self,
        node: &PlanNode,
        body: BodyRef<'_>,
        path: &str,
    ) -> Option<DynamicValue> {
        match node {
            PlanNode::Attr {
                name,
                value_type,
                ..
            } => {
                let attribute = body.attribute(name)?;
                let attr_path = join(path, name);
                let value = self.evaluate(attribute, &attr_path);
                if value.is_null() {
                    return None;
                }
                Some(self.convert(value_type, value, &attr_path, attribute))
            }
            PlanNode::Block {
                name,
                body: plan,
                ..
            } => {
                let blocks = body.blocks(name, &[], path, &mut self.diagnostics);
                let first = blocks.first()?;
                self.check_single(name, &blocks, path);
                Some(self.decode_block(plan, first, &join(path, name)))
            }
            PlanNode::BlockList {
                name,
                body: plan,
                min_items,
                max_items,
                unique,
            } => {
                let blocks = body.blocks(name, &[], path, &mut self.diagnostics);
                if blocks.is_empty() {
                    return None;
                }
                let mut items = Vec::with_capacity(blocks.len());
                for (index, block) in blocks.iter().enumerate() {
                    let item_path = format!("{}[{index}]", join(path, name));
                    let item = self.decode_block(plan, block, &item_path);
                    if !*unique || !items.contains(&item) {
                        items.push(item);
                    }
                }
                self.check_bounds(name, items.len(), *min_items, *max_items, path);
                Some(DynamicValue::List(items))
            }
            PlanNode::BlockMap {
                name,
                labels,
                body: plan,
            } => {
                let blocks = body.blocks(name, labels, path, &mut self.diagnostics);
                if blocks.is_empty() {
                    return None;
                }
                let mut map = ValueMap::new();
                for block in &blocks {
                    let block_path =
                        block.labels.iter().fold(join(path, name), |acc, label| join(&acc, label));
                    let value = self.decode_block(plan, block, &block_path);
                    if !insert_labelled(&mut map, &block.labels, value) {
                        self.report(
                            Diagnostic::new(
                                DiagnosticKind::BlockCount,
                                block_path,
                                format!(
                                    "duplicate `{name}` block labelled `{}`",
                                    block.labels.join(".")
                                ),
                            )
                            .at(block.position),
                        );
                    }
                }
                Some(DynamicValue::Object(map))
            }
            PlanNode::BlockAttrs {
                name,
                value_type,
                ..
            } => {
                let blocks = body.blocks(name, &[], path, &mut self.diagnostics);
                let first = blocks.first()?;
                self.check_single(name, &blocks, path);
                Some(self.decode_block_attrs(value_type, first, &join(path, name)))
            }
            PlanNode::Object {
                fields,
            } => {
                let mut map = ValueMap::new();
                for (key, child) in fields {
                    let value = self.decode(child, body, path);
                    map.insert(key.clone(), value);
                }
                Some(DynamicValue::Object(map))
            }
            PlanNode::Array {
                values,
            } => {
                let items = values.iter().map(|child| self.decode(child, body, path)).collect();
                Some(DynamicValue::List(items))
            }
            PlanNode::Default {
                inner,
                fallback,
            } => Some(self.decode_present(inner, body, path).unwrap_or_else(|| fallback.clone())),
            PlanNode::Literal {
                value,
            } => Some(value.clone()),
        }
    }

    /// Returns the value of a node the source does not define.
    fn absent(&mut self, node: &PlanNode, path: &str) -> DynamicValue {
        match node {
            PlanNode::Attr {
                name,
                value_type,
                required,
            } => {
                if *required {
                    self.report(Diagnostic::new(
                        DiagnosticKind::MissingRequiredField,
                        join(path, name),
                        format!("the argument `{name}` is required"),
                    ));
                    return DynamicValue::Null;
                }
                value_type.zero_value()
            }
            PlanNode::Block {
                name,
                required,
                ..
            }
            | PlanNode::BlockAttrs {
                name,
                required,
                ..
            } => {
                if *required {
                    self.report(Diagnostic::new(
                        DiagnosticKind::MissingRequiredField,
                        join(path, name),
                        format!("a `{name}` block is required"),
                    ));
                }
                DynamicValue::Null
            }
            PlanNode::BlockList {
                name,
                min_items,
                max_items,
                ..
            } => {
                self.check_bounds(name, 0, *min_items, *max_items, path);
                DynamicValue::List(Vec::new())
            }
            PlanNode::BlockMap {
                ..
            } => DynamicValue::Object(ValueMap::new()),
            PlanNode::Default {
                fallback, ..
            } => fallback.clone(),
            PlanNode::Literal {
                value,
            } => value.clone(),
            PlanNode::Object {
                ..
            }
            | PlanNode::Array {
                ..
            } => DynamicValue::Null,
        }
    }

    /// Evaluates an attribute value in its notation.
    fn evaluate(&mut self, attribute: AttrRef<'_>, path: &str) -> DynamicValue {
        let site = Site {
            path,
            position: attribute.position,
        };
        match attribute.expr {
            ExprRef::Syntax(expr) => self.evaluator.eval_expr(expr, site, &mut self.diagnostics),
            ExprRef::Json(value) => self.evaluator.eval_json(value, site, &mut self.diagnostics),
        }
    }

    /// Converts an evaluated value, reporting failures as coercion errors.
    fn convert(
        &mut self,
        value_type: &ValueType,
        value: DynamicValue,
        path: &str,
        attribute: AttrRef<'_>,
    ) -> DynamicValue {
        match value_type.convert(value) {
            Ok(value) => value,
            Err(reason) => {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::TypeCoercionFailure,
                        path,
                        format!("invalid value for `{}`: {reason}", attribute.name),
                    )
                    .at(attribute.position),
                );
                DynamicValue::Null
            }
        }
    }

    /// Decodes every attribute of a block into a typed map.
    fn decode_block_attrs(
        &mut self,
        value_type: &ValueType,
        block: &BlockRef<'_>,
        path: &str,
    ) -> DynamicValue {
        for (kind, position) in block.body.nested_blocks() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UnsupportedField,
                    join(path, kind),
                    format!("blocks are not allowed inside `{path}`"),
                )
                .at(position),
            );
        }
        let mut map = ValueMap::new();
        for attribute in block.body.attributes() {
            let attr_path = join(path, attribute.name);
            let value = self.evaluate(attribute, &attr_path);
            let value = self.convert(value_type, value, &attr_path, attribute);
            map.insert(attribute.name.to_string(), value);
        }
        DynamicValue::Object(map)
    }

    /// Reports repeated single blocks; the first occurrence wins.
    fn check_single(&mut self, name: &str, blocks: &[BlockRef<'_>], path: &str) {
        if let Some(extra) = blocks.get(1) {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::BlockCount,
                    join(path, name),
                    format!("only one `{name}` block is allowed, found {}", blocks.len()),
                )
                .at(extra.position),
            );
        }
    }

    /// Reports block lists outside their item bounds.
    fn check_bounds(
        &mut self,
        name: &str,
        count: usize,
        min_items: u32,
        max_items: u32,
        path: &str,
    ) {
        let count_u64 = u64::try_from(count).unwrap_or(u64::MAX);
        if count_u64 < u64::from(min_items) {
            self.report(Diagnostic::new(
                DiagnosticKind::BlockCount,
                join(path, name),
                format!("at least {min_items} `{name}` block(s) are required, found {count}"),
            ));
        }
        if max_items != 0 && count_u64 > u64::from(max_items) {
            self.report(Diagnostic::new(
                DiagnosticKind::BlockCount,
                join(path, name),
                format!("at most {max_items} `{name}` block(s) are allowed, found {count}"),
            ));
        }
    }
}

/// Inserts a value under nested label keys; returns false when the path is taken.
fn insert_labelled(map: &mut ValueMap, labels: &[String], value: DynamicValue) -> bool {
    match labels {
        [] => false,
        [last] => {
            if map.contains_key(last) {
                return false;
            }
            map.insert(last.clone(), value);
            true
        }
        [first, rest @ ..] => {
            let entry =
                map.entry(first.clone()).or_insert_with(|| DynamicValue::Object(ValueMap::new()));
            match entry {
                DynamicValue::Object(inner) => insert_labelled(inner, rest, value),
                _ => false,
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
