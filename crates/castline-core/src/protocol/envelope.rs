//! Chat envelope (JSON text frame).
//!
//! Wire shape: `{"type": "...", "name": "...", "message": "..."}`.
//! The `type` tag is a stable string, so encoder and decoder can evolve
//! independently; an unknown tag is a decode failure, never silently skipped.

use serde::{Deserialize, Serialize};

use crate::error::{CastlineError, Result};

/// Envelope kind. The four kinds are fixed and exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Chat text typed by a user.
    User,
    /// Server-originated notice; `sender` carries the machine-readable cause.
    Server,
    /// A user announcing presence on join.
    Connect,
    /// A user announcing departure.
    Disconnect,
}

/// Machine-readable cause carried in the `name` field of a server notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    /// Username already held by a live session; fatal to that join.
    Conflict,
    /// The server is going away; clients should exit cleanly.
    Shutdown,
    /// Transport-level trouble the server survived.
    Error,
}

impl Cause {
    /// Stable wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Cause::Conflict => "CONFLICT",
            Cause::Shutdown => "SHUTDOWN",
            Cause::Error => "ERROR",
        }
    }

    /// Parse the wire form. Unknown causes yield `None` so clients can still
    /// render notices from newer servers.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONFLICT" => Some(Cause::Conflict),
            "SHUTDOWN" => Some(Cause::Shutdown),
            "ERROR" => Some(Cause::Error),
            _ => None,
        }
    }
}

/// A single protocol frame. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Envelope kind (wire field `type`).
    #[serde(rename = "type")]
    pub kind: Kind,
    /// Originating username, or the notice cause for `Kind::Server`.
    #[serde(rename = "name")]
    pub sender: String,
    /// Free text; empty for presence events.
    #[serde(rename = "message", default)]
    pub body: String,
}

impl Envelope {
    /// Chat text from `sender`.
    pub fn user(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: Kind::User,
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Presence announcement on join.
    pub fn connect(sender: impl Into<String>) -> Self {
        Self {
            kind: Kind::Connect,
            sender: sender.into(),
            body: String::new(),
        }
    }

    /// Presence announcement on departure.
    pub fn disconnect(sender: impl Into<String>) -> Self {
        Self {
            kind: Kind::Disconnect,
            sender: sender.into(),
            body: String::new(),
        }
    }

    /// Server-originated notice.
    pub fn server(cause: Cause, body: impl Into<String>) -> Self {
        Self {
            kind: Kind::Server,
            sender: cause.as_str().to_string(),
            body: body.into(),
        }
    }

    /// Notice cause, when this is a server envelope with a known cause.
    pub fn cause(&self) -> Option<Cause> {
        match self.kind {
            Kind::Server => Cause::parse(&self.sender),
            _ => None,
        }
    }

    /// Serialize to the wire form.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CastlineError::Internal(format!("encode failed: {e}")))
    }

    /// Parse one frame. Missing required fields and unknown `type` tags are
    /// decode failures.
    pub fn decode(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| CastlineError::Decode(e.to_string()))
    }
}
