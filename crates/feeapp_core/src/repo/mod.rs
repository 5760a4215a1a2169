//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the student store contract used by services and callers.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Write paths call `Student::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it, unless
//!   the caller explicitly asks for the lenient load.

pub mod student_repo;
