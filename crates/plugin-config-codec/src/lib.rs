// crates/plugin-config-codec/src/lib.rs
// ============================================================================
// Module: Plugin Config Codec Library
// Description: Envelope encoding and typed decoding of dynamic values.
// Purpose: Move parsed configuration from host to plugin without shared types.
// Dependencies: plugin-config-core, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! The host calls [`encode`] on the [`DynamicValue`] a parse produced and
//! ships the [`EncodedConfig`] bytes. The plugin calls [`decode`] (or
//! [`decode_into`] to keep defaults already set on its target) and receives
//! its own serde type, matched by serde field names.
//! Invariants:
//! - `decode_value(&encode(v)) == v` for every value.
//! - Envelope fields the target does not declare are ignored.
//! - Null or missing envelope fields never overwrite the target.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod de;
mod envelope;
pub mod error;

// ============================================================================
// SECTION: Imports
// ============================================================================

use plugin_config_core::DynamicValue;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::de::ValueDeserializer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use envelope::EncodedConfig;
pub use envelope::MAX_ENVELOPE_BYTES;
pub use envelope::MAX_ENVELOPE_DEPTH;
pub use error::CodecError;

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes a value into a self-describing envelope.
#[must_use]
#[tracing::instrument(skip_all)]
pub fn encode(value: &DynamicValue) -> EncodedConfig {
    let envelope = envelope::write_envelope(value);
    tracing::trace!(bytes = envelope.len(), "encoded plugin configuration");
    envelope
}

/// Decodes an envelope back into the value it carries.
///
/// # Errors
///
/// Returns [`CodecError::MalformedEnvelope`] for truncated, oversized,
/// unsorted, or otherwise invalid bytes.
#[tracing::instrument(skip_all, fields(bytes = envelope.len()))]
pub fn decode_value(envelope: &EncodedConfig) -> Result<DynamicValue, CodecError> {
    envelope::read_envelope(envelope)
        .inspect_err(|err| tracing::debug!(error = %err, "rejected envelope"))
}

// ============================================================================
// SECTION: Typed Decoding
// ============================================================================

/// Materializes a typed value from an in-process dynamic value.
///
/// # Errors
///
/// Returns [`CodecError::FieldTypeMismatch`] naming the first field that
/// cannot be coerced into the target type.
pub fn from_value<T: DeserializeOwned>(value: &DynamicValue) -> Result<T, CodecError> {
    <T as Deserialize>::deserialize(ValueDeserializer::new(value)).map_err(CodecError::from)
}

/// Decodes an envelope into a new typed value.
///
/// # Errors
///
/// Returns [`CodecError::MalformedEnvelope`] for invalid bytes and
/// [`CodecError::FieldTypeMismatch`] when the content does not fit `T`.
pub fn decode<T: DeserializeOwned>(envelope: &EncodedConfig) -> Result<T, CodecError> {
    from_value(&decode_value(envelope)?)
}

/// Decodes an envelope onto an existing target.
///
/// Each top-level envelope field is applied independently: fields that are
/// absent or null keep the target's current value, and a field that does not
/// fit is skipped while the remaining fields are still applied. The first
/// mismatch is returned after all other fields have been written.
///
/// # Errors
///
/// Returns [`CodecError::MalformedEnvelope`] for invalid bytes (the target is
/// untouched), [`CodecError::TargetSnapshot`] when the target cannot be
/// serialized, and [`CodecError::FieldTypeMismatch`] for the first field
/// that did not fit.
#[tracing::instrument(skip_all, fields(bytes = envelope.len()))]
pub fn decode_into<T>(envelope: &EncodedConfig, target: &mut T) -> Result<(), CodecError>
where
    T: Serialize + DeserializeOwned,
{
    let incoming = decode_value(envelope)?;
    let fields = match incoming {
        DynamicValue::Null => return Ok(()),
        DynamicValue::Object(fields) => fields,
        other => {
            *target = from_value(&other)?;
            return Ok(());
        }
    };

    let snapshot =
        serde_json::to_value(&*target).map_err(|err| CodecError::TargetSnapshot(err.to_string()))?;
    let mut base = DynamicValue::from_json(&snapshot);
    if base.as_object().is_none() {
        *target = from_value(&DynamicValue::Object(fields))?;
        return Ok(());
    }

    let mut first_error = None;
    for (key, value) in fields {
        if value.is_null() {
            continue;
        }
        let mut candidate = base.clone();
        if let DynamicValue::Object(map) = &mut candidate {
            map.insert(key.clone(), value);
        }
        match <T as Deserialize>::deserialize(ValueDeserializer::new(&candidate)) {
            Ok(_) => base = candidate,
            Err(err) => {
                tracing::debug!(
                    field = %key,
                    error = %err,
                    "envelope field does not fit the target"
                );
                first_error.get_or_insert_with(|| CodecError::from(err));
            }
        }
    }

    *target = from_value(&base)?;
    first_error.map_or(Ok(()), Err)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
