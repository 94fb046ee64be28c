// crates/plugin-config-codec/src/error.rs
// ============================================================================
// Module: Codec Errors
// Description: Failures raised while reading envelopes or filling targets.
// Purpose: Give callers a byte offset or field path for every rejection.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`CodecError`] is fatal to the single decode call that produced it.
//! [`crate::decode_into`] still applies every field that did fit before
//! returning the first mismatch.

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by envelope decoding and typed materialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The envelope bytes are not a well-formed encoding.
    #[error("malformed envelope at byte {offset}: {reason}")]
    MalformedEnvelope {
        /// Byte offset where decoding stopped.
        offset: usize,
        /// What was wrong at that offset.
        reason: String,
    },
    /// A value could not be coerced into the target field.
    #[error("field `{field}` cannot be decoded: {reason}")]
    FieldTypeMismatch {
        /// Dotted path of the offending field; empty for the root.
        field: String,
        /// Why the value does not fit.
        reason: String,
    },
    /// The target's current value could not be captured before overlaying.
    #[error("target value cannot be captured: {0}")]
    TargetSnapshot(String),
}

impl CodecError {
    /// Builds a malformed-envelope error.
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            offset,
            reason: reason.into(),
        }
    }
}
