// crates/plugin-config-core/src/types.rs
// ============================================================================
// Module: Value Types
// Description: Attribute type expressions and value conversion rules.
// Purpose: Give schema attributes an executable type with zero values.
// Dependencies: crate::value, bigdecimal
// ============================================================================

//! ## Overview
//! Schemas name attribute types with short expressions such as `string`,
//! `list(string)` or `map(number)`. [`ValueType::parse`] turns those into a
//! [`ValueType`] which knows its zero value and how to convert a
//! [`DynamicValue`] into itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use bigdecimal::BigDecimal;

use crate::value::DynamicValue;
use crate::value::ValueMap;
use crate::value::canonical_number;
use crate::value::parse_decimal;

// ============================================================================
// SECTION: Value Type
// ============================================================================

/// Executable attribute type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// UTF-8 string.
    String,
    /// Decimal number.
    Number,
    /// Boolean.
    Bool,
    /// Any value, passed through unchanged.
    Any,
    /// Ordered list of the element type.
    List(Box<ValueType>),
    /// List of the element type with duplicates removed.
    Set(Box<ValueType>),
    /// String-keyed map of the element type.
    Map(Box<ValueType>),
}

/// Failure to parse a type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType {
    /// Offending type expression.
    pub raw: String,
}

impl ValueType {
    /// Parses a type expression such as `list(map(string))`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownType`] when the expression is not recognized.
    pub fn parse(raw: &str) -> Result<Self, UnknownType> {
        let trimmed = raw.trim();
        let unknown = || UnknownType {
            raw: raw.to_string(),
        };
        match trimmed {
            "string" => return Ok(Self::String),
            "number" => return Ok(Self::Number),
            "bool" => return Ok(Self::Bool),
            "any" => return Ok(Self::Any),
            _ => {}
        }
        let (head, rest) = trimmed.split_once('(').ok_or_else(unknown)?;
        let inner = rest.strip_suffix(')').ok_or_else(unknown)?;
        let element = Box::new(Self::parse(inner).map_err(|_| unknown())?);
        match head.trim_end() {
            "list" => Ok(Self::List(element)),
            "set" => Ok(Self::Set(element)),
            "map" => Ok(Self::Map(element)),
            _ => Err(unknown()),
        }
    }

    /// Returns the value an omitted optional attribute of this type decodes to.
    #[must_use]
    pub fn zero_value(&self) -> DynamicValue {
        match self {
            Self::String => DynamicValue::String(String::new()),
            Self::Number => DynamicValue::Number(BigDecimal::from(0)),
            Self::Bool => DynamicValue::Bool(false),
            Self::Any => DynamicValue::Null,
            Self::List(_) | Self::Set(_) => DynamicValue::List(Vec::new()),
            Self::Map(_) => DynamicValue::Object(ValueMap::new()),
        }
    }

    /// Converts a value into this type.
    ///
    /// Nulls nested inside collections are preserved; a top-level null is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the value cannot be converted.
    pub fn convert(&self, value: DynamicValue) -> Result<DynamicValue, String> {
        if value.is_null() {
            return Ok(value);
        }
        match (self, value) {
            (Self::Any, value) => Ok(value),
            (Self::String, DynamicValue::String(text)) => Ok(DynamicValue::String(text)),
            (Self::String, DynamicValue::Number(number)) => {
                Ok(DynamicValue::String(canonical_number(&number)))
            }
            (Self::String, DynamicValue::Bool(flag)) => Ok(DynamicValue::String(flag.to_string())),
            (Self::Number, DynamicValue::Number(number)) => Ok(DynamicValue::Number(number)),
            (Self::Number, DynamicValue::String(text)) => parse_decimal(&text)
                .map(DynamicValue::Number)
                .ok_or_else(|| format!("a number is required, got string `{text}`")),
            (Self::Bool, DynamicValue::Bool(flag)) => Ok(DynamicValue::Bool(flag)),
            (Self::Bool, DynamicValue::String(text)) => match text.as_str() {
                "true" => Ok(DynamicValue::Bool(true)),
                "false" => Ok(DynamicValue::Bool(false)),
                _ => Err(format!("a bool is required, got string `{text}`")),
            },
            (Self::List(element), DynamicValue::List(items)) => {
                convert_items(element, items).map(DynamicValue::List)
            }
            (Self::Set(element), DynamicValue::List(items)) => {
                let converted = convert_items(element, items)?;
                let mut unique: Vec<DynamicValue> = Vec::with_capacity(converted.len());
                for item in converted {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(DynamicValue::List(unique))
            }
            (Self::Map(element), DynamicValue::Object(map)) => {
                let mut converted = ValueMap::new();
                for (key, item) in map {
                    let item = element
                        .convert(item)
                        .map_err(|reason| format!("element `{key}`: {reason}"))?;
                    converted.insert(key, item);
                }
                Ok(DynamicValue::Object(converted))
            }
            (expected, other) => Err(format!("{expected} is required, got {}", other.type_name())),
        }
    }
}

/// Converts every list item into the element type.
fn convert_items(
    element: &ValueType,
    items: Vec<DynamicValue>,
) -> Result<Vec<DynamicValue>, String> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            element.convert(item).map_err(|reason| format!("element {index}: {reason}"))
        })
        .collect()
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Bool => write!(f, "bool"),
            Self::Any => write!(f, "any"),
            Self::List(element) => write!(f, "list({element})"),
            Self::Set(element) => write!(f, "set({element})"),
            Self::Map(element) => write!(f, "map({element})"),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
