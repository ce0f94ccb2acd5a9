//! Session hub: registry of attached sessions plus the egress engine.
//!
//! Every session owns one bounded outbound queue; the hub only ever enqueues.
//! Per-session queues are ordered, which is what makes "notice strictly
//! before close" orderings hold without sleeps or flushes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use castline_core::{Cause, Envelope, Result};

use super::presence::Presence;

/// Opaque session identifier, unique for the server's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

struct SessionEntry {
    tx: mpsc::Sender<Message>,
    /// Username this session successfully connected as, once claimed.
    name: Option<String>,
}

/// Session registry + presence + broadcast.
#[derive(Default)]
pub struct Hub {
    sessions: DashMap<SessionId, SessionEntry>,
    presence: Presence,
    seq: AtomicU64,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            presence: Presence::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Attach a session. `tx` is the only path to that session's socket.
    pub fn register(&self, tx: mpsc::Sender<Message>) -> SessionId {
        let id = SessionId(self.seq.fetch_add(1, Ordering::Relaxed));
        self.sessions.insert(id, SessionEntry { tx, name: None });
        id
    }

    /// Claim `name` for `session`. Fails with `DuplicateName` if another live
    /// session holds it; the registry is left unchanged on rejection.
    pub fn try_connect(&self, session: SessionId, name: &str) -> Result<()> {
        self.presence.try_connect(name)?;
        if let Some(mut entry) = self.sessions.get_mut(&session) {
            entry.name = Some(name.to_string());
        }
        Ok(())
    }

    /// Release `name`, idempotently, and clear the session's claim if it was
    /// the holder.
    pub fn disconnect_name(&self, session: SessionId, name: &str) {
        self.presence.disconnect(name);
        if let Some(mut entry) = self.sessions.get_mut(&session) {
            if entry.name.as_deref() == Some(name) {
                entry.name = None;
            }
        }
    }

    /// Lossy broadcast of one prepared frame to every attached session.
    /// A full queue drops that receiver's copy; delivery is best-effort.
    pub fn broadcast(&self, frame: &str) {
        for entry in self.sessions.iter() {
            if entry.value().tx.try_send(Message::Text(frame.to_string())).is_err() {
                tracing::debug!(session = %entry.key(), "dropping frame for stalled session");
            }
        }
    }

    /// Awaited send to a single session. Used for direct replies that must
    /// not be dropped (the CONFLICT notice).
    pub async fn send_to(&self, session: SessionId, frame: String) {
        let Some(tx) = self.session_tx(session) else { return };
        if tx.send(Message::Text(frame)).await.is_err() {
            tracing::debug!(session = %session, "send to detached session");
        }
    }

    /// Enqueue a close for one session; its writer sends any queued frames
    /// first, then the close handshake, then the socket loop ends.
    pub async fn close_session(&self, session: SessionId) {
        let Some(tx) = self.session_tx(session) else { return };
        let _ = tx.send(Message::Close(None)).await;
    }

    /// Socket teardown. Detaches the session and frees its claimed username
    /// so a dead connection cannot squat a name.
    pub fn cleanup(&self, session: SessionId) {
        if let Some((_, entry)) = self.sessions.remove(&session) {
            if let Some(name) = entry.name {
                self.presence.disconnect(&name);
            }
        }
    }

    /// Orderly shutdown: every session observes the SHUTDOWN notice strictly
    /// before its close. Sends are awaited here, never dropped.
    pub async fn shutdown(&self) {
        let notice = match Envelope::server(Cause::Shutdown, "the server is shutting down...").encode() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode shutdown notice");
                return;
            }
        };

        let targets: Vec<(SessionId, mpsc::Sender<Message>)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().tx.clone()))
            .collect();

        for (session, tx) in targets {
            if tx.send(Message::Text(notice.clone())).await.is_err() {
                tracing::debug!(session = %session, "session vanished before shutdown notice");
                continue;
            }
            let _ = tx.send(Message::Close(None)).await;
        }
    }

    fn session_tx(&self, session: SessionId) -> Option<mpsc::Sender<Message>> {
        self.sessions.get(&session).map(|entry| entry.tx.clone())
    }
}
