//! Shared primitive types used across the analytics engine.

/// Monetary amounts are always integer cents.
pub type Cents = i64;

/// A stable, unique identifier for any record in the store.
pub type EntityId = String;

/// The owning agency. Every Record Store query is scoped by it.
pub type AgencyId = String;
