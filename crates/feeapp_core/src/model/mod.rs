//! Domain model for the monthly fee cycle.
//!
//! # Responsibility
//! - Define the student record shared by storage, services and callers.
//! - Own the fee-month computation, the only piece of pure domain logic.
//!
//! # Invariants
//! - Every persisted student is identified by a store-assigned `StudentId`.
//! - Records are never hard-deleted by core.

pub mod student;
