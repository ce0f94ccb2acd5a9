//! Shared error type across castline crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, CastlineError>;

/// Unified error type used by the server, client session, and TUI.
#[derive(Debug, Error)]
pub enum CastlineError {
    /// Malformed inbound frame. Recovered locally by dropping the frame.
    #[error("invalid envelope: {0}")]
    Decode(String),
    /// Transport failed to establish. Fatal to the join attempt.
    #[error("connect failed: {0}")]
    Connect(String),
    /// Username already held by a live session.
    #[error("username already in chat: {0}")]
    DuplicateName(String),
    /// The peer closed the connection. Expected during shutdown.
    #[error("connection closed")]
    Closed,
    /// Any other transport fault during steady-state traffic.
    #[error("transport error: {0}")]
    Transport(String),
    /// Bug-shaped condition that should not occur in normal operation.
    #[error("internal: {0}")]
    Internal(String),
}

impl CastlineError {
    /// Whether this is the expected end-of-connection condition, as opposed
    /// to a fault that should be surfaced to the user.
    pub fn is_closed(&self) -> bool {
        matches!(self, CastlineError::Closed)
    }
}
