//! castline core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level envelope exchanged between the broadcast
//! server and its clients, plus the error surface shared by both sides. It
//! intentionally carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `CastlineError`/`Result` so neither
//! process crashes on malformed input.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{CastlineError, Result};
pub use protocol::envelope::{Cause, Envelope, Kind};
