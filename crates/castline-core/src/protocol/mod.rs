//! Protocol module (JSON text frames).
//!
//! One envelope per WebSocket text frame. The codec is panic-free: malformed
//! input is reported as `CastlineError::Decode` instead of panicking, keeping
//! both the server and the client resilient to bad traffic.

pub mod envelope;
