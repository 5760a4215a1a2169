//! Outbound notification capability.
//!
//! # Responsibility
//! - Define the `Notifier` seam that transports plug into.
//! - Compose fee-status message text.
//!
//! # Invariants
//! - Core never implements a real transport; it only composes text and calls
//!   the injected notifier.
//! - Notification failures never touch stored student state.

pub mod message;
pub mod notifier;
