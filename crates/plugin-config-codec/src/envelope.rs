// crates/plugin-config-codec/src/envelope.rs
// ============================================================================
// Module: Config Envelope
// Description: Self-describing binary encoding of dynamic values.
// Purpose: Carry parsed configuration across a process boundary without a schema.
// Dependencies: bincode, plugin-config-core, serde, crate::error
// ============================================================================

//! ## Overview
//! An envelope is a two-byte header followed by the value tree flattened into
//! pre-order [`WireNode`]s, each encoded with `bincode` (fixed-width integers,
//! big-endian). Containers carry their element count and are followed by
//! their children, so a reader never needs the schema that produced the value
//! and never recurses inside `bincode`.
//! Security posture: envelopes are untrusted input; total size, per-node
//! lengths, nesting, and key order are checked before any allocation
//! proportional to declared lengths.
//!
//! ### Layout
//! - header: `0xDC 0x01`
//! - node: u32 BE variant index, then its payload
//!   - `0` null, `1` bool (one byte)
//!   - `2` number: u64 BE length + canonical decimal text
//!   - `3` string: u64 BE length + UTF-8
//!   - `4` list: u64 BE count, followed by `count` nodes
//!   - `5` object: u64 BE key count + keys (strictly ascending), followed by
//!     one node per key

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;

use bincode::Options;
use plugin_config_core::DynamicValue;
use plugin_config_core::ValueMap;
use plugin_config_core::canonical_number;
use plugin_config_core::parse_decimal;
use serde::Deserialize;
use serde::Serialize;

use crate::error::CodecError;

// ============================================================================
// SECTION: Format Constants
// ============================================================================

/// Envelope magic byte.
const MAGIC: u8 = 0xDC;
/// Envelope format version.
const VERSION: u8 = 0x01;
/// Header length in bytes.
const HEADER_LEN: usize = 2;

/// Maximum accepted envelope size in bytes.
pub const MAX_ENVELOPE_BYTES: usize = 16 * 1024 * 1024;
/// Maximum container nesting accepted when reading.
pub const MAX_ENVELOPE_DEPTH: usize = 64;

/// Byte budget handed to `bincode` for any single node.
const NODE_BYTE_LIMIT: u64 = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Opaque encoded configuration ready to cross a process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedConfig(Vec<u8>);

impl EncodedConfig {
    /// Wraps bytes received from the other side of the boundary.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the envelope, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the encoded length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no bytes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for EncodedConfig {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// SECTION: Wire Nodes
// ============================================================================

/// One pre-order node of a flattened value tree.
///
/// Variant order is part of the format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum WireNode<'a> {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Number in canonical decimal form.
    Number(Cow<'a, str>),
    /// UTF-8 string.
    String(Cow<'a, str>),
    /// List header; the element nodes follow.
    List(u64),
    /// Object header with its keys; one value node per key follows.
    Object(Vec<Cow<'a, str>>),
}

/// `bincode` settings shared by the writer and the reader.
fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .with_limit(NODE_BYTE_LIMIT)
        .allow_trailing_bytes()
}

/// Converts a length into its wire form.
fn wire_len(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Encodes a value into a fresh envelope.
pub(crate) fn write_envelope(value: &DynamicValue) -> EncodedConfig {
    let mut out = vec![MAGIC, VERSION];
    write_value(&mut out, value);
    EncodedConfig(out)
}

/// Appends a value and its descendants in pre-order.
fn write_value(out: &mut Vec<u8>, value: &DynamicValue) {
    match value {
        DynamicValue::Null => write_node(out, &WireNode::Null),
        DynamicValue::Bool(flag) => write_node(out, &WireNode::Bool(*flag)),
        DynamicValue::Number(number) => {
            write_node(out, &WireNode::Number(Cow::Owned(canonical_number(number))));
        }
        DynamicValue::String(text) => {
            write_node(out, &WireNode::String(Cow::Borrowed(text.as_str())));
        }
        DynamicValue::List(items) => {
            write_node(out, &WireNode::List(wire_len(items.len())));
            for item in items {
                write_value(out, item);
            }
        }
        DynamicValue::Object(map) => {
            let keys = map.keys().map(|key| Cow::Borrowed(key.as_str())).collect();
            write_node(out, &WireNode::Object(keys));
            for item in map.values() {
                write_value(out, item);
            }
        }
    }
}

/// Appends one node.
///
/// A node that `bincode` refuses (a single string over the node budget) is
/// left out; the envelope is then rejected when read.
fn write_node(out: &mut Vec<u8>, node: &WireNode<'_>) {
    if let Err(err) = wire_options().serialize_into(&mut *out, node) {
        tracing::warn!(error = %err, "envelope node was not written");
    }
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Decodes an envelope back into a value.
pub(crate) fn read_envelope(envelope: &EncodedConfig) -> Result<DynamicValue, CodecError> {
    let bytes = envelope.as_bytes();
    if bytes.len() > MAX_ENVELOPE_BYTES {
        return Err(CodecError::malformed(
            0,
            format!(
                "envelope is {} bytes, exceeding the limit of {MAX_ENVELOPE_BYTES}",
                bytes.len()
            ),
        ));
    }
    match bytes {
        [MAGIC, VERSION, ..] => {}
        [MAGIC, version, ..] => {
            return Err(CodecError::malformed(1, format!("unsupported envelope version {version}")));
        }
        _ => return Err(CodecError::malformed(0, "missing envelope header")),
    }
    let mut reader = NodeReader {
        total: bytes.len(),
        rest: &bytes[HEADER_LEN ..],
    };
    let value = reader.read_value(0)?;
    if !reader.rest.is_empty() {
        return Err(CodecError::malformed(
            reader.offset(),
            format!("{} trailing bytes after the value", reader.rest.len()),
        ));
    }
    Ok(value)
}

/// Cursor that rebuilds a value tree from pre-order nodes.
struct NodeReader<'a> {
    /// Envelope length in bytes.
    total: usize,
    /// Unread bytes.
    rest: &'a [u8],
}

impl NodeReader<'_> {
    /// Returns the byte offset of the next unread byte.
    const fn offset(&self) -> usize {
        self.total - self.rest.len()
    }

    /// Reads the next node and the offset it started at.
    fn next_node(&mut self) -> Result<(usize, WireNode<'static>), CodecError> {
        let offset = self.offset();
        if self.rest.is_empty() {
            return Err(CodecError::malformed(offset, "unexpected end of envelope"));
        }
        let node = wire_options()
            .deserialize_from(&mut self.rest)
            .map_err(|err| CodecError::malformed(offset, err.to_string()))?;
        Ok((offset, node))
    }

    /// Reads one value at the given container depth.
    fn read_value(&mut self, depth: usize) -> Result<DynamicValue, CodecError> {
        let (offset, node) = self.next_node()?;
        match node {
            WireNode::Null => Ok(DynamicValue::Null),
            WireNode::Bool(flag) => Ok(DynamicValue::Bool(flag)),
            WireNode::Number(text) => {
                parse_decimal(&text).map(DynamicValue::Number).ok_or_else(|| {
                    let reason = format!("number `{text}` is malformed or out of range");
                    CodecError::malformed(offset, reason)
                })
            }
            WireNode::String(text) => Ok(DynamicValue::String(text.into_owned())),
            WireNode::List(count) => {
                let count = self.enter(offset, depth, count)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0 .. count {
                    items.push(self.read_value(depth + 1)?);
                }
                Ok(DynamicValue::List(items))
            }
            WireNode::Object(keys) => {
                self.enter(offset, depth, wire_len(keys.len()))?;
                if let Some(pair) = keys.windows(2).find(|pair| pair[0] >= pair[1]) {
                    return Err(CodecError::malformed(
                        offset,
                        format!("object key `{}` is out of order or repeated", pair[1]),
                    ));
                }
                let mut map = ValueMap::new();
                for key in keys {
                    let value = self.read_value(depth + 1)?;
                    map.insert(key.into_owned(), value);
                }
                Ok(DynamicValue::Object(map))
            }
        }
    }

    /// Checks the depth limit and the declared child count of a container.
    ///
    /// Every child node occupies at least four bytes, so counts larger than
    /// the remaining input are rejected before allocating.
    fn enter(&self, offset: usize, depth: usize, count: u64) -> Result<usize, CodecError> {
        if depth >= MAX_ENVELOPE_DEPTH {
            return Err(CodecError::malformed(
                offset,
                format!("nesting exceeds the limit of {MAX_ENVELOPE_DEPTH}"),
            ));
        }
        match usize::try_from(count) {
            Ok(count) if count <= self.rest.len() => Ok(count),
            _ => Err(CodecError::malformed(
                offset,
                format!("declared count {count} exceeds the {} remaining bytes", self.rest.len()),
            )),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
