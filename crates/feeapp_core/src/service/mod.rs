//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and notifier calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage and transport details.

pub mod student_service;
