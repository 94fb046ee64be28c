// crates/plugin-config-core/src/spec.rs
// ============================================================================
// Module: Schema Model
// Description: Serializable description of a plugin's configuration shape.
// Purpose: Let plugins declare accepted configuration without sharing types.
// Dependencies: crate::value, serde
// ============================================================================

//! ## Overview
//! A [`Spec`] is plain data: plugins build one at start-up, ship it to the host
//! (it serializes to JSON with a `kind` discriminator), and the host compiles
//! it into a decode plan. Construction never fails; malformed combinations are
//! reported by [`crate::compile`].
//! Invariants:
//! - Trees are finite and acyclic (enforced by ownership).
//! - Object field names are unique (enforced by the map type).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::value::DynamicValue;

// ============================================================================
// SECTION: Spec
// ============================================================================

/// Declarative configuration schema node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Spec {
    /// Single attribute `name = value` of the given type expression.
    Attr {
        /// Attribute name in the source document.
        name: String,
        /// Type expression, such as `string` or `list(number)`.
        value_type: String,
        /// Whether omitting the attribute is an error.
        #[serde(default)]
        required: bool,
    },
    /// Single nested block decoded with `body`.
    Block {
        /// Block type name in the source document.
        name: String,
        /// Whether omitting the block is an error.
        #[serde(default)]
        required: bool,
        /// Schema of the block body.
        body: Box<Spec>,
    },
    /// Repeated block decoded into a list.
    BlockList {
        /// Block type name in the source document.
        name: String,
        /// Schema of each block body.
        body: Box<Spec>,
        /// Minimum number of blocks.
        #[serde(default)]
        min_items: u32,
        /// Maximum number of blocks; zero means unbounded.
        #[serde(default)]
        max_items: u32,
    },
    /// Repeated block decoded into a list without duplicates.
    BlockSet {
        /// Block type name in the source document.
        name: String,
        /// Schema of each block body.
        body: Box<Spec>,
        /// Minimum number of distinct blocks.
        #[serde(default)]
        min_items: u32,
        /// Maximum number of distinct blocks; zero means unbounded.
        #[serde(default)]
        max_items: u32,
    },
    /// Labelled blocks decoded into an object keyed by label values.
    BlockMap {
        /// Block type name in the source document.
        name: String,
        /// Label names, outermost first.
        labels: Vec<String>,
        /// Schema of each block body.
        body: Box<Spec>,
    },
    /// Block whose attributes form a map of a single element type.
    BlockAttrs {
        /// Block type name in the source document.
        name: String,
        /// Element type expression for every attribute.
        value_type: String,
        /// Whether omitting the block is an error.
        #[serde(default)]
        required: bool,
    },
    /// Object assembled from named child specs decoded against the same body.
    Object {
        /// Output field name to child spec.
        fields: BTreeMap<String, Spec>,
    },
    /// List assembled from child specs decoded against the same body.
    Array {
        /// Child specs in output order.
        values: Vec<Spec>,
    },
    /// Inner spec with a fallback used when the inner source is absent.
    Default {
        /// Spec providing the value when present.
        inner: Box<Spec>,
        /// Value used when the inner source is absent or null.
        fallback: DynamicValue,
    },
    /// Constant value independent of the source.
    Literal {
        /// Constant value.
        value: DynamicValue,
    },
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Spec {
    /// Declares an attribute.
    #[must_use]
    pub fn attr(name: impl Into<String>, value_type: impl Into<String>, required: bool) -> Self {
        Self::Attr {
            name: name.into(),
            value_type: value_type.into(),
            required,
        }
    }

    /// Declares a single nested block.
    #[must_use]
    pub fn block(name: impl Into<String>, required: bool, body: Self) -> Self {
        Self::Block {
            name: name.into(),
            required,
            body: Box::new(body),
        }
    }

    /// Declares a repeated block without item bounds.
    #[must_use]
    pub fn block_list(name: impl Into<String>, body: Self) -> Self {
        Self::BlockList {
            name: name.into(),
            body: Box::new(body),
            min_items: 0,
            max_items: 0,
        }
    }

    /// Declares a repeated block whose duplicates collapse.
    #[must_use]
    pub fn block_set(name: impl Into<String>, body: Self) -> Self {
        Self::BlockSet {
            name: name.into(),
            body: Box::new(body),
            min_items: 0,
            max_items: 0,
        }
    }

    /// Declares labelled blocks keyed by their labels.
    #[must_use]
    pub fn block_map<I, L>(name: impl Into<String>, labels: I, body: Self) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self::BlockMap {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            body: Box::new(body),
        }
    }

    /// Declares a block whose attributes become a map.
    #[must_use]
    pub fn block_attrs(
        name: impl Into<String>,
        value_type: impl Into<String>,
        required: bool,
    ) -> Self {
        Self::BlockAttrs {
            name: name.into(),
            value_type: value_type.into(),
            required,
        }
    }

    /// Declares an object from `(field, spec)` pairs.
    #[must_use]
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Object {
            fields: fields.into_iter().map(|(key, spec)| (key.into(), spec)).collect(),
        }
    }

    /// Declares a list of child specs.
    #[must_use]
    pub fn array(values: impl IntoIterator<Item = Self>) -> Self {
        Self::Array {
            values: values.into_iter().collect(),
        }
    }

    /// Wraps a spec with a fallback value.
    #[must_use]
    pub fn default_value(inner: Self, fallback: DynamicValue) -> Self {
        Self::Default {
            inner: Box::new(inner),
            fallback,
        }
    }

    /// Declares a constant value.
    #[must_use]
    pub const fn literal(value: DynamicValue) -> Self {
        Self::Literal {
            value,
        }
    }

    /// Sets item bounds on a block list or block set; other nodes are returned unchanged.
    #[must_use]
    pub fn with_items(self, min: u32, max: u32) -> Self {
        match self {
            Self::BlockList {
                name,
                body,
                ..
            } => Self::BlockList {
                name,
                body,
                min_items: min,
                max_items: max,
            },
            Self::BlockSet {
                name,
                body,
                ..
            } => Self::BlockSet {
                name,
                body,
                min_items: min,
                max_items: max,
            },
            other => other,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
