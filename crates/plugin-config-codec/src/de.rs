// crates/plugin-config-codec/src/de.rs
// ============================================================================
// Module: Dynamic Value Deserializer
// Description: Serde deserializer that reads plugin types out of dynamic values.
// Purpose: Materialize envelope contents by serde field names with coercion.
// Dependencies: bigdecimal, plugin-config-core, serde
// ============================================================================

//! ## Overview
//! Targets are matched by their serde field names, so `#[serde(rename)]` is
//! the field-tag convention. Unknown fields are ignored by serde itself and
//! null object entries are skipped so they read as absent.
//! Invariants:
//! - Numeric strings coerce into integer and float fields.
//! - Numbers and booleans coerce into string fields.
//! - `"true"` and `"false"` coerce into boolean fields.
//! - Every error carries the path of the field that failed.

use std::collections::btree_map;
use std::fmt;

use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use plugin_config_core::DynamicValue;
use plugin_config_core::ValueMap;
use plugin_config_core::canonical_number;
use plugin_config_core::is_integral;
use plugin_config_core::parse_decimal;
use serde::Deserializer;
use serde::de;
use serde::de::DeserializeSeed;
use serde::de::Unexpected;
use serde::de::Visitor;
use serde::de::value::BorrowedStrDeserializer;

use crate::error::CodecError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Deserialization failure tagged with the field path where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldError {
    /// Path such as `devices[1].host_path`; empty for the root.
    path: String,
    /// Failure description.
    reason: String,
}

impl FieldError {
    /// Prefixes the path with an object key.
    fn within(mut self, key: &str) -> Self {
        self.path = if self.path.is_empty() {
            key.to_string()
        } else if self.path.starts_with('[') {
            format!("{key}{}", self.path)
        } else {
            format!("{key}.{}", self.path)
        };
        self
    }

    /// Prefixes the path with a list index.
    fn within_index(mut self, index: usize) -> Self {
        self.path = if self.path.is_empty() || self.path.starts_with('[') {
            format!("[{index}]{}", self.path)
        } else {
            format!("[{index}].{}", self.path)
        };
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

impl std::error::Error for FieldError {}

impl de::Error for FieldError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self {
            path: String::new(),
            reason: msg.to_string(),
        }
    }

    fn missing_field(field: &'static str) -> Self {
        Self {
            path: field.to_string(),
            reason: "missing required field".to_string(),
        }
    }
}

impl From<FieldError> for CodecError {
    fn from(err: FieldError) -> Self {
        Self::FieldTypeMismatch {
            field: err.path,
            reason: err.reason,
        }
    }
}

// ============================================================================
// SECTION: Deserializer
// ============================================================================

/// Serde deserializer borrowing a dynamic value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValueDeserializer<'de> {
    /// Value being read.
    value: &'de DynamicValue,
}

impl<'de> ValueDeserializer<'de> {
    /// Wraps a value.
    pub(crate) const fn new(value: &'de DynamicValue) -> Self {
        Self {
            value,
        }
    }

    /// Builds a type error describing the value found.
    fn invalid(self, expected: &dyn de::Expected) -> FieldError {
        de::Error::invalid_type(unexpected(self.value), expected)
    }

    /// Reads a number, accepting numeric strings.
    fn number<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::Number(number) => visit_decimal(number, visitor),
            DynamicValue::String(text) => match parse_decimal(text.trim()) {
                Some(number) => visit_decimal(&number, visitor),
                None => Err(de::Error::invalid_value(Unexpected::Str(text), &visitor)),
            },
            _ => Err(self.invalid(&visitor)),
        }
    }
}

/// Describes a value for serde type errors.
fn unexpected(value: &DynamicValue) -> Unexpected<'_> {
    match value {
        DynamicValue::Null => Unexpected::Unit,
        DynamicValue::Bool(flag) => Unexpected::Bool(*flag),
        DynamicValue::Number(number) => {
            number.to_f64().map_or(Unexpected::Other("number"), Unexpected::Float)
        }
        DynamicValue::String(text) => Unexpected::Str(text),
        DynamicValue::List(_) => Unexpected::Seq,
        DynamicValue::Object(_) => Unexpected::Map,
    }
}

/// Visits a decimal as the narrowest primitive that holds it.
fn visit_decimal<'de, V: Visitor<'de>>(
    number: &BigDecimal,
    visitor: V,
) -> Result<V::Value, FieldError> {
    if is_integral(number) {
        if let Some(unsigned) = number.to_u64() {
            return visitor.visit_u64(unsigned);
        }
        if let Some(signed) = number.to_i64() {
            return visitor.visit_i64(signed);
        }
    }
    match number.to_f64() {
        Some(float) if float.is_finite() => visitor.visit_f64(float),
        _ => Err(de::Error::custom(format!("number {} is out of range", canonical_number(number)))),
    }
}

/// Generates number methods that all share the coercing reader.
macro_rules! deserialize_numbers {
    ($($method:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
                self.number(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = FieldError;

    deserialize_numbers!(
        deserialize_i8,
        deserialize_i16,
        deserialize_i32,
        deserialize_i64,
        deserialize_u8,
        deserialize_u16,
        deserialize_u32,
        deserialize_u64,
        deserialize_f32,
        deserialize_f64,
    );

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::Null => visitor.visit_unit(),
            DynamicValue::Bool(flag) => visitor.visit_bool(*flag),
            DynamicValue::Number(number) => visit_decimal(number, visitor),
            DynamicValue::String(text) => visitor.visit_borrowed_str(text),
            DynamicValue::List(items) => visitor.visit_seq(ListAccess::new(items)),
            DynamicValue::Object(map) => visitor.visit_map(ObjectAccess::new(map)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::Bool(flag) => visitor.visit_bool(*flag),
            DynamicValue::String(text) if text == "true" => visitor.visit_bool(true),
            DynamicValue::String(text) if text == "false" => visitor.visit_bool(false),
            _ => Err(self.invalid(&visitor)),
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::String(text) => visitor.visit_borrowed_str(text),
            DynamicValue::Number(number) => visitor.visit_string(canonical_number(number)),
            DynamicValue::Bool(flag) => {
                visitor.visit_borrowed_str(if *flag { "true" } else { "false" })
            }
            _ => Err(self.invalid(&visitor)),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::String(text) => visitor.visit_borrowed_bytes(text.as_bytes()),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        if self.value.is_null() { visitor.visit_none() } else { visitor.visit_some(self) }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        if self.value.is_null() { visitor.visit_unit() } else { Err(self.invalid(&visitor)) }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::List(items) => visitor.visit_seq(ListAccess::new(items)),
            _ => Err(self.invalid(&visitor)),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::Object(map) => visitor.visit_map(ObjectAccess::new(map)),
            _ => Err(self.invalid(&visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        match self.value {
            DynamicValue::String(text) => visitor.visit_enum(BorrowedStrDeserializer::new(text)),
            DynamicValue::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((variant, value)) => visitor.visit_enum(TaggedVariant {
                    variant,
                    value,
                }),
                None => Err(self.invalid(&visitor)),
            },
            _ => Err(self.invalid(&visitor)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, FieldError> {
        visitor.visit_unit()
    }
}

// ============================================================================
// SECTION: Container Access
// ============================================================================

/// Sequence access over list items.
struct ListAccess<'de> {
    /// Remaining items with their indices.
    items: std::iter::Enumerate<std::slice::Iter<'de, DynamicValue>>,
}

impl<'de> ListAccess<'de> {
    /// Starts at the first item.
    fn new(items: &'de [DynamicValue]) -> Self {
        Self {
            items: items.iter().enumerate(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for ListAccess<'de> {
    type Error = FieldError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, FieldError> {
        match self.items.next() {
            Some((index, item)) => seed
                .deserialize(ValueDeserializer::new(item))
                .map(Some)
                .map_err(|err| err.within_index(index)),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Map access over object entries, skipping null values.
struct ObjectAccess<'de> {
    /// Remaining entries.
    entries: btree_map::Iter<'de, String, DynamicValue>,
    /// Entry whose key was yielded but whose value was not yet read.
    pending: Option<(&'de str, &'de DynamicValue)>,
}

impl<'de> ObjectAccess<'de> {
    /// Starts at the first entry.
    fn new(map: &'de ValueMap) -> Self {
        Self {
            entries: map.iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for ObjectAccess<'de> {
    type Error = FieldError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, FieldError> {
        for (key, value) in self.entries.by_ref() {
            if value.is_null() {
                continue;
            }
            self.pending = Some((key.as_str(), value));
            return seed.deserialize(BorrowedStrDeserializer::new(key)).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, FieldError> {
        let Some((key, value)) = self.pending.take() else {
            return Err(de::Error::custom("value requested before its key"));
        };
        seed.deserialize(ValueDeserializer::new(value)).map_err(|err| err.within(key))
    }
}

/// Enum access for externally tagged `{ "variant": value }` objects.
struct TaggedVariant<'de> {
    /// Variant name.
    variant: &'de str,
    /// Variant content.
    value: &'de DynamicValue,
}

impl<'de> de::EnumAccess<'de> for TaggedVariant<'de> {
    type Error = FieldError;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self), FieldError> {
        let variant = seed.deserialize(BorrowedStrDeserializer::<FieldError>::new(self.variant))?;
        Ok((variant, self))
    }
}

impl<'de> de::VariantAccess<'de> for TaggedVariant<'de> {
    type Error = FieldError;

    fn unit_variant(self) -> Result<(), FieldError> {
        if self.value.is_null() {
            Ok(())
        } else {
            Err(de::Error::invalid_type(unexpected(self.value), &"unit variant"))
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, FieldError> {
        seed.deserialize(ValueDeserializer::new(self.value)).map_err(|err| err.within(self.variant))
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        ValueDeserializer::new(self.value)
            .deserialize_seq(visitor)
            .map_err(|err| err.within(self.variant))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, FieldError> {
        ValueDeserializer::new(self.value)
            .deserialize_map(visitor)
            .map_err(|err| err.within(self.variant))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
