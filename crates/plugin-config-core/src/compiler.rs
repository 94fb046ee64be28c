// crates/plugin-config-core/src/compiler.rs
// ============================================================================
// Module: Schema Compiler
// Description: Translates a schema into an executable decode plan.
// Purpose: Validate schemas once and precompute per-body name scopes.
// Dependencies: crate::spec, crate::types, crate::value, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`compile`] resolves every type expression, checks that names do not
//! collide inside one body, and records which attribute and block names each
//! body consumes. The resulting [`DecodePlan`] is immutable and can be shared
//! freely between threads.
//! Invariants:
//! - Compilation is deterministic and side-effect free.
//! - Every [`PlanNode::Default`] fallback already has the inner attribute type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::spec::Spec;
use crate::types::ValueType;
use crate::value::DynamicValue;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while compiling a schema.
///
/// # Invariants
/// - `path` is the dotted location of the offending node inside the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Type expression was not recognized.
    #[error("{path}: unknown value type `{raw}`")]
    UnknownType {
        /// Schema location.
        path: String,
        /// Offending type expression.
        raw: String,
    },
    /// Two nodes consume the same source name within one body.
    #[error("{path}: name `{name}` is declared more than once in the same body")]
    NameCollision {
        /// Schema location.
        path: String,
        /// Colliding source name.
        name: String,
    },
    /// Object declared without fields.
    #[error("{path}: object has no fields")]
    EmptyObject {
        /// Schema location.
        path: String,
    },
    /// Attribute or block declared with an empty name.
    #[error("{path}: name must not be empty")]
    EmptyName {
        /// Schema location.
        path: String,
    },
    /// Default fallback does not match the inner attribute type.
    #[error("{path}: default value is invalid: {reason}")]
    InvalidDefault {
        /// Schema location.
        path: String,
        /// Conversion failure.
        reason: String,
    },
    /// Block item bounds are inverted.
    #[error("{path}: min_items {min} exceeds max_items {max}")]
    InvalidItemBounds {
        /// Schema location.
        path: String,
        /// Declared minimum.
        min: u32,
        /// Declared maximum.
        max: u32,
    },
    /// Block map declared without labels.
    #[error("{path}: block map requires at least one label")]
    MissingLabels {
        /// Schema location.
        path: String,
    },
}

// ============================================================================
// SECTION: Plan Types
// ============================================================================

/// Attribute and block names consumed by one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyScope {
    /// Attribute names read from the body.
    attributes: BTreeSet<String>,
    /// Block type names read from the body.
    blocks: BTreeSet<String>,
}

impl BodyScope {
    /// Returns true when the body declares the attribute.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    /// Returns true when the body declares the block type.
    #[must_use]
    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.contains(name)
    }

    /// Iterates over declared attribute names.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// Iterates over declared block type names.
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(String::as_str)
    }

    /// Records a source name, rejecting duplicates across both namespaces.
    fn claim(&mut self, name: &str, is_block: bool, path: &str) -> Result<(), CompileError> {
        if self.attributes.contains(name) || self.blocks.contains(name) {
            return Err(CompileError::NameCollision {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
        if is_block {
            self.blocks.insert(name.to_string());
        } else {
            self.attributes.insert(name.to_string());
        }
        Ok(())
    }
}

/// Nested block body together with its scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBody {
    /// Plan applied to the block body.
    pub node: Box<PlanNode>,
    /// Names the body consumes.
    pub scope: BodyScope,
}

/// Executable plan node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanNode {
    /// Attribute lookup and conversion.
    Attr {
        /// Source attribute name.
        name: String,
        /// Target type.
        value_type: ValueType,
        /// Whether absence is an error.
        required: bool,
    },
    /// Single nested block.
    Block {
        /// Source block type name.
        name: String,
        /// Whether absence is an error.
        required: bool,
        /// Block body plan.
        body: BlockBody,
    },
    /// Repeated block.
    BlockList {
        /// Source block type name.
        name: String,
        /// Block body plan.
        body: BlockBody,
        /// Minimum number of items.
        min_items: u32,
        /// Maximum number of items; zero means unbounded.
        max_items: u32,
        /// Whether duplicate items collapse.
        unique: bool,
    },
    /// Labelled blocks keyed by label values.
    BlockMap {
        /// Source block type name.
        name: String,
        /// Label names, outermost first.
        labels: Vec<String>,
        /// Block body plan.
        body: BlockBody,
    },
    /// Block attributes as a typed map.
    BlockAttrs {
        /// Source block type name.
        name: String,
        /// Element type.
        value_type: ValueType,
        /// Whether absence is an error.
        required: bool,
    },
    /// Object of child plans.
    Object {
        /// Output field name and child plan, sorted by name.
        fields: Vec<(String, PlanNode)>,
    },
    /// List of child plans.
    Array {
        /// Child plans in output order.
        values: Vec<PlanNode>,
    },
    /// Fallback when the inner source is absent.
    Default {
        /// Inner plan.
        inner: Box<PlanNode>,
        /// Fallback value, already converted to the inner type.
        fallback: DynamicValue,
    },
    /// Constant value.
    Literal {
        /// Constant value.
        value: DynamicValue,
    },
}

/// Compiled, immutable form of a [`Spec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodePlan {
    /// Root plan node applied to the configuration block body.
    root: PlanNode,
    /// Names consumed by the configuration block body.
    scope: BodyScope,
}

impl DecodePlan {
    /// Returns the root plan node.
    #[must_use]
    pub const fn root(&self) -> &PlanNode {
        &self.root
    }

    /// Returns the names consumed by the root body.
    #[must_use]
    pub const fn scope(&self) -> &BodyScope {
        &self.scope
    }
}

// ============================================================================
// SECTION: Compilation
// ============================================================================

/// Compiles a schema into a decode plan.
///
/// # Errors
///
/// Returns [`CompileError`] when a type expression is unknown, names collide
/// within one body, or the schema is otherwise malformed.
#[tracing::instrument(skip_all)]
pub fn compile(spec: &Spec) -> Result<DecodePlan, CompileError> {
    let root = compile_node(spec, ROOT_PATH)?;
    let scope = scope_of(&root, ROOT_PATH)?;
    tracing::debug!(
        attributes = scope.attributes.len(),
        blocks = scope.blocks.len(),
        "compiled decode plan"
    );
    Ok(DecodePlan {
        root,
        scope,
    })
}

/// Path label used for the schema root.
const ROOT_PATH: &str = "(root)";

/// Appends a segment to a schema path.
fn child_path(path: &str, segment: &str) -> String {
    if path == ROOT_PATH { segment.to_string() } else { format!("{path}.{segment}") }
}

/// Compiles a single spec node.
fn compile_node(spec: &Spec, path: &str) -> Result<PlanNode, CompileError> {
    match spec {
        Spec::Attr {
            name,
            value_type,
            required,
        } => Ok(PlanNode::Attr {
            name: checked_name(name, path)?,
            value_type: resolve_type(value_type, path)?,
            required: *required,
        }),
        Spec::Block {
            name,
            required,
            body,
        } => Ok(PlanNode::Block {
            name: checked_name(name, path)?,
            required: *required,
            body: compile_body(body, &child_path(path, name))?,
        }),
        Spec::BlockList {
            name,
            body,
            min_items,
            max_items,
        }
        | Spec::BlockSet {
            name,
            body,
            min_items,
            max_items,
        } => {
            if *max_items != 0 && min_items > max_items {
                return Err(CompileError::InvalidItemBounds {
                    path: path.to_string(),
                    min: *min_items,
                    max: *max_items,
                });
            }
            Ok(PlanNode::BlockList {
                name: checked_name(name, path)?,
                body: compile_body(body, &child_path(path, name))?,
                min_items: *min_items,
                max_items: *max_items,
                unique: matches!(spec, Spec::BlockSet { .. }),
            })
        }
        Spec::BlockMap {
            name,
            labels,
            body,
        } => {
            if labels.is_empty() {
                return Err(CompileError::MissingLabels {
                    path: path.to_string(),
                });
            }
            Ok(PlanNode::BlockMap {
                name: checked_name(name, path)?,
                labels: labels.clone(),
                body: compile_body(body, &child_path(path, name))?,
            })
        }
        Spec::BlockAttrs {
            name,
            value_type,
            required,
        } => Ok(PlanNode::BlockAttrs {
            name: checked_name(name, path)?,
            value_type: resolve_type(value_type, path)?,
            required: *required,
        }),
        Spec::Object {
            fields,
        } => {
            if fields.is_empty() {
                return Err(CompileError::EmptyObject {
                    path: path.to_string(),
                });
            }
            let fields = fields
                .iter()
                .map(|(key, child)| Ok((key.clone(), compile_node(child, &child_path(path, key))?)))
                .collect::<Result<Vec<_>, CompileError>>()?;
            Ok(PlanNode::Object {
                fields,
            })
        }
        Spec::Array {
            values,
        } => {
            let values = values
                .iter()
                .enumerate()
                .map(|(index, child)| compile_node(child, &format!("{path}[{index}]")))
                .collect::<Result<Vec<_>, CompileError>>()?;
            Ok(PlanNode::Array {
                values,
            })
        }
        Spec::Default {
            inner,
            fallback,
        } => {
            let inner = compile_node(inner, path)?;
            let fallback = match &inner {
                PlanNode::Attr {
                    value_type, ..
                } => value_type.convert(fallback.clone()).map_err(|reason| {
                    CompileError::InvalidDefault {
                        path: path.to_string(),
                        reason,
                    }
                })?,
                _ => fallback.clone(),
            };
            Ok(PlanNode::Default {
                inner: Box::new(inner),
                fallback,
            })
        }
        Spec::Literal {
            value,
        } => Ok(PlanNode::Literal {
            value: value.clone(),
        }),
    }
}

/// Compiles a block body and computes its scope.
fn compile_body(body: &Spec, path: &str) -> Result<BlockBody, CompileError> {
    let node = compile_node(body, path)?;
    let scope = scope_of(&node, path)?;
    Ok(BlockBody {
        node: Box::new(node),
        scope,
    })
}

/// Computes the names a body-level node consumes.
fn scope_of(node: &PlanNode, path: &str) -> Result<BodyScope, CompileError> {
    let mut scope = BodyScope::default();
    claim_names(node, &mut scope, path)?;
    Ok(scope)
}

/// Claims every source name read by `node` without descending into nested blocks.
fn claim_names(node: &PlanNode, scope: &mut BodyScope, path: &str) -> Result<(), CompileError> {
    match node {
        PlanNode::Attr {
            name, ..
        } => scope.claim(name, false, path),
        PlanNode::Block {
            name, ..
        }
        | PlanNode::BlockList {
            name, ..
        }
        | PlanNode::BlockMap {
            name, ..
        }
        | PlanNode::BlockAttrs {
            name, ..
        } => scope.claim(name, true, path),
        PlanNode::Object {
            fields,
        } => {
            for (key, child) in fields {
                claim_names(child, scope, &child_path(path, key))?;
            }
            Ok(())
        }
        PlanNode::Array {
            values,
        } => {
            for (index, child) in values.iter().enumerate() {
                claim_names(child, scope, &format!("{path}[{index}]"))?;
            }
            Ok(())
        }
        PlanNode::Default {
            inner, ..
        } => claim_names(inner, scope, path),
        PlanNode::Literal {
            ..
        } => Ok(()),
    }
}

/// Rejects empty source names.
fn checked_name(name: &str, path: &str) -> Result<String, CompileError> {
    if name.trim().is_empty() {
        return Err(CompileError::EmptyName {
            path: path.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Resolves a type expression.
fn resolve_type(raw: &str, path: &str) -> Result<ValueType, CompileError> {
    ValueType::parse(raw).map_err(|err| CompileError::UnknownType {
        path: path.to_string(),
        raw: err.raw,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
