// crates/plugin-config-core/src/lib.rs
// ============================================================================
// Module: Plugin Config Core Library
// Description: Dynamic values, schema model, and schema compiler.
// Purpose: Shared foundation for the document parser and envelope codec.
// Dependencies: bigdecimal, serde, serde_jcs, sha2, thiserror, tracing
// ============================================================================

//! ## Overview
//! Plugins describe their configuration with a [`Spec`]; hosts compile it into
//! a [`DecodePlan`] (optionally through the [`PlanCache`]) and feed that plan
//! to the document parser, which produces [`DynamicValue`] trees.
//! Invariants:
//! - Specs, plans, and values are immutable once built and `Send + Sync`.
//! - Compilation is deterministic; equal specs yield equal plans.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod compiler;
pub mod spec;
pub mod types;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::PlanCache;
pub use cache::SpecDigest;
pub use cache::compile_cached;
pub use compiler::BlockBody;
pub use compiler::BodyScope;
pub use compiler::CompileError;
pub use compiler::DecodePlan;
pub use compiler::PlanNode;
pub use compiler::compile;
pub use spec::Spec;
pub use types::ValueType;
pub use value::DynamicValue;
pub use value::MAX_NUMBER_SCALE;
pub use value::ValueMap;
pub use value::VariableBinding;
pub use value::canonical_number;
pub use value::in_number_range;
pub use value::is_integral;
pub use value::parse_decimal;
