// crates/plugin-config-core/src/value.rs
// ============================================================================
// Module: Dynamic Values
// Description: Type-tagged configuration values independent of plugin types.
// Purpose: Carry parsed configuration between host, envelope, and plugin.
// Dependencies: bigdecimal, serde, serde_json
// ============================================================================

//! ## Overview
//! [`DynamicValue`] is the schema-validated, type-tagged tree produced by the
//! document parser and consumed by the envelope codec. Numbers are arbitrary
//! precision decimals; objects are ordered maps so that equality ignores the
//! order in which fields were written.
//! Invariants:
//! - Number equality is numeric (`2 == 2.0`).
//! - Object keys are unique.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Dynamic Value
// ============================================================================

/// Ordered mapping used for object values.
pub type ValueMap = BTreeMap<String, DynamicValue>;

/// Caller-supplied interpolation variables, keyed by reference name.
pub type VariableBinding = BTreeMap<String, DynamicValue>;

/// Type-tagged configuration value.
///
/// # Invariants
/// - The variant at a schema position matches the converted schema type, or is
///   [`DynamicValue::Null`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DynamicValue {
    /// Explicit absence.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Arbitrary-precision decimal number.
    Number(BigDecimal),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence.
    List(Vec<DynamicValue>),
    /// Mapping from field name to value.
    Object(ValueMap),
}

impl DynamicValue {
    /// Returns the stable type label used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Returns true for [`DynamicValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric payload, if any.
    #[must_use]
    pub const fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Self::Number(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the object payload, if any.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up an object field; returns `None` for non-objects.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Builds an object value from `(key, value)` pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Object(entries.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }

    /// Converts a JSON value into a dynamic value.
    ///
    /// JSON numbers are parsed through their textual form so decimal digits are
    /// preserved exactly as `serde_json` renders them.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => decimal_from_number(number).map_or(Self::Null, Self::Number),
            Value::String(text) => Self::String(text.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Object(
                map.iter().map(|(key, value)| (key.clone(), Self::from_json(value))).collect(),
            ),
        }
    }

    /// Converts the value into JSON.
    ///
    /// Integral numbers become JSON integers when they fit in 64 bits; other
    /// numbers become JSON floats.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => number_to_json(number),
            Self::String(text) => Value::String(text.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => Value::Object(
                map.iter().map(|(key, value)| (key.clone(), value.to_json())).collect(),
            ),
        }
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        Self::Number(BigDecimal::from(value))
    }
}

impl From<u64> for DynamicValue {
    fn from(value: u64) -> Self {
        Self::Number(BigDecimal::from(value))
    }
}

impl From<BigDecimal> for DynamicValue {
    fn from(value: BigDecimal) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Self>> for DynamicValue {
    fn from(values: Vec<Self>) -> Self {
        Self::List(values)
    }
}

impl From<ValueMap> for DynamicValue {
    fn from(map: ValueMap) -> Self {
        Self::Object(map)
    }
}

impl Serialize for DynamicValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|value| Self::from_json(&value))
    }
}

// ============================================================================
// SECTION: Number Helpers
// ============================================================================

/// Largest decimal scale magnitude a number may carry.
///
/// `1e400000000` is a short literal whose plain form has four hundred million
/// digits; numbers outside this bound are rejected wherever they are read.
pub const MAX_NUMBER_SCALE: u64 = 4096;

/// Returns true when the decimal's scale is within [`MAX_NUMBER_SCALE`].
#[must_use]
pub fn in_number_range(value: &BigDecimal) -> bool {
    let (_, scale) = value.as_bigint_and_exponent();
    scale.unsigned_abs() <= MAX_NUMBER_SCALE
}

/// Returns true when the decimal has no fractional part.
///
/// Works on the digit string, so the cost follows the number of digits and
/// never the exponent.
#[must_use]
pub fn is_integral(value: &BigDecimal) -> bool {
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale <= 0 {
        return true;
    }
    let digits = digits.to_string();
    if digits == "0" {
        return true;
    }
    let trailing_zeros = digits.bytes().rev().take_while(|byte| *byte == b'0').count();
    u64::try_from(trailing_zeros).is_ok_and(|zeros| zeros >= scale.unsigned_abs())
}

/// Renders a decimal in its shortest plain form (`4`, `2.5`).
#[must_use]
pub fn canonical_number(value: &BigDecimal) -> String {
    if is_integral(value) {
        value.with_scale(0).to_string()
    } else {
        value.normalized().to_string()
    }
}

/// Parses a decimal from text.
///
/// Rejects surrounding whitespace, non-finite forms, and numbers outside
/// [`MAX_NUMBER_SCALE`].
#[must_use]
pub fn parse_decimal(text: &str) -> Option<BigDecimal> {
    if text.is_empty() || text.trim() != text {
        return None;
    }
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    BigDecimal::from_str(text).ok().filter(in_number_range)
}

/// Parses a JSON number into `BigDecimal` with a stable string representation.
fn decimal_from_number(number: &Number) -> Option<BigDecimal> {
    let rendered = number.to_string();
    BigDecimal::from_str(&rendered).ok()
}

/// Converts a decimal into JSON without losing digits.
///
/// Integers that fit 64 bits become JSON integers and numbers an `f64`
/// holds exactly become JSON floats; anything else becomes its canonical
/// decimal string.
fn number_to_json(value: &BigDecimal) -> Value {
    if is_integral(value) {
        if let Some(int) = value.to_i64() {
            return Value::Number(Number::from(int));
        }
        if let Some(uint) = value.to_u64() {
            return Value::Number(Number::from(uint));
        }
    }
    value
        .to_f64()
        .filter(|float| {
            float.is_finite()
                && decimal_from_float(*float).is_some_and(|exact| exact == *value)
        })
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(canonical_number(value)), Value::Number)
}

/// Reads back the shortest decimal that round-trips through `float`.
fn decimal_from_float(float: f64) -> Option<BigDecimal> {
    BigDecimal::from_str(&float.to_string()).ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
