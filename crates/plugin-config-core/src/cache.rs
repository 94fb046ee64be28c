// crates/plugin-config-core/src/cache.rs
// ============================================================================
// Module: Decode Plan Cache
// Description: Concurrency-safe cache of compiled plans keyed by schema digest.
// Purpose: Compile each distinct schema once per process.
// Dependencies: crate::compiler, crate::spec, serde_jcs, sha2, tracing
// ============================================================================

//! ## Overview
//! Plans are keyed by the SHA-256 digest of the schema's canonical JSON, so
//! equal schemas share one entry regardless of how they were built. Lookups
//! take a read lock; misses compile outside the lock and insert only if no
//! other caller won the race. Entries are pure data, so a poisoned lock is
//! recovered rather than propagated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::sync::RwLock;

use sha2::Digest;
use sha2::Sha256;

use crate::compiler::CompileError;
use crate::compiler::DecodePlan;
use crate::compiler::compile;
use crate::spec::Spec;

// ============================================================================
// SECTION: Spec Digest
// ============================================================================

/// SHA-256 digest of a schema's canonical JSON form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecDigest([u8; 32]);

impl SpecDigest {
    /// Computes the digest of a schema.
    ///
    /// Returns `None` when the schema cannot be canonicalized (for example a
    /// fallback number that JSON cannot represent).
    #[must_use]
    pub fn of(spec: &Spec) -> Option<Self> {
        let canonical = serde_jcs::to_vec(spec).ok()?;
        Some(Self(Sha256::digest(&canonical).into()))
    }

    /// Returns the digest as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(64), |mut out, byte| {
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0x0f)]));
            out
        })
    }
}

/// Hex alphabet for digest rendering.
const HEX: &[u8; 16] = b"0123456789abcdef";

impl fmt::Debug for SpecDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ============================================================================
// SECTION: Plan Cache
// ============================================================================

/// Compiled plan together with the schema it was compiled from.
#[derive(Debug)]
struct CacheEntry {
    /// Schema the plan belongs to.
    spec: Spec,
    /// Compiled plan.
    plan: Arc<DecodePlan>,
}

/// Cache of compiled plans keyed by [`SpecDigest`].
///
/// A digest hit is confirmed against the stored schema, so a plan is only
/// ever returned for a schema equal to the one it was compiled from.
#[derive(Debug, Default)]
pub struct PlanCache {
    /// Compiled plans.
    entries: RwLock<HashMap<SpecDigest, CacheEntry>>,
}

impl PlanCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached plan for `spec`, compiling it on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the schema is malformed. Failures are not
    /// cached.
    pub fn get_or_compile(&self, spec: &Spec) -> Result<Arc<DecodePlan>, CompileError> {
        let Some(digest) = SpecDigest::of(spec) else {
            tracing::warn!("schema has no canonical form; compiling without cache");
            return compile(spec).map(Arc::new);
        };
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&digest) {
                Some(entry) if entry.spec == *spec => {
                    tracing::trace!(digest = %digest.to_hex(), "decode plan cache hit");
                    return Ok(Arc::clone(&entry.plan));
                }
                Some(_) => {
                    tracing::warn!(
                        digest = %digest.to_hex(),
                        "digest collision; compiling without cache"
                    );
                    return compile(spec).map(Arc::new);
                }
                None => {}
            }
        }
        tracing::debug!(digest = %digest.to_hex(), "decode plan cache miss");
        let compiled = Arc::new(compile(spec)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(digest).or_insert_with(|| CacheEntry {
            spec: spec.clone(),
            plan: Arc::clone(&compiled),
        });
        if entry.spec == *spec {
            Ok(Arc::clone(&entry.plan))
        } else {
            Ok(compiled)
        }
    }

    /// Returns the number of cached plans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when no plan is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide plan cache.
static GLOBAL_CACHE: OnceLock<PlanCache> = OnceLock::new();

/// Compiles `spec` through the process-wide cache.
///
/// # Errors
///
/// Returns [`CompileError`] when the schema is malformed.
pub fn compile_cached(spec: &Spec) -> Result<Arc<DecodePlan>, CompileError> {
    GLOBAL_CACHE.get_or_init(PlanCache::new).get_or_compile(spec)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
