//! Inbound envelope dispatch.
//!
//! One decode per frame; the original raw frame is what gets re-broadcast,
//! never a re-encoding. Malformed frames are logged and dropped; a single
//! session's garbage never takes the server down.

use std::sync::Arc;

use castline_core::{Cause, Envelope, Kind};

use crate::realtime::{Hub, SessionId};

/// Routes each inbound frame through the connect/disconnect/user policy.
pub struct Dispatcher {
    hub: Arc<Hub>,
}

impl Dispatcher {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    /// Handle one inbound text frame from `session`.
    pub async fn dispatch(&self, session: SessionId, raw: &str) {
        let env = match Envelope::decode(raw) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(session = %session, error = %e, payload = raw, "dropping malformed frame");
                return;
            }
        };

        match env.kind {
            Kind::Connect => self.handle_connect(session, &env, raw).await,
            Kind::Disconnect => {
                self.hub.disconnect_name(session, &env.sender);
                tracing::info!(session = %session, user = %env.sender, "user disconnected");
                self.hub.broadcast(raw);
            }
            Kind::User => {
                tracing::info!(session = %session, user = %env.sender, "broadcasting message");
                self.hub.broadcast(raw);
            }
            Kind::Server => {
                // Not a client operation; only the server originates notices.
                tracing::debug!(session = %session, "ignoring client-sent server notice");
            }
        }
    }

    /// A session's socket is gone. Frees its registry entries.
    pub fn session_closed(&self, session: SessionId) {
        self.hub.cleanup(session);
    }

    /// Report a failed connection attempt to everyone still attached.
    pub fn report_transport_error(&self, description: &str) {
        let notice = Envelope::server(
            Cause::Error,
            format!("the broadcast server has encountered an error, {description}"),
        );
        match notice.encode() {
            Ok(frame) => self.hub.broadcast(&frame),
            Err(e) => tracing::error!(error = %e, "failed to encode error notice"),
        }
    }

    async fn handle_connect(&self, session: SessionId, env: &Envelope, raw: &str) {
        match self.hub.try_connect(session, &env.sender) {
            Ok(()) => {
                tracing::info!(session = %session, user = %env.sender, "user connected");
                self.hub.broadcast(raw);
            }
            Err(e) => {
                tracing::info!(session = %session, user = %env.sender, error = %e, "connect rejected");
                let notice = Envelope::server(Cause::Conflict, "username already in chat");
                match notice.encode() {
                    Ok(frame) => self.hub.send_to(session, frame).await,
                    Err(e) => tracing::error!(error = %e, "failed to encode conflict notice"),
                }
                self.hub.close_session(session).await;
            }
        }
    }
}
