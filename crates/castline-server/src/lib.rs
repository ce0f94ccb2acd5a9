//! castline broadcast session server.
//!
//! This crate wires the WebSocket transport, the inbound dispatcher, and the
//! realtime hub (presence + session registry + egress) into a cohesive server.
//! It is consumed by the `castline` binary and by integration tests.

use std::future::Future;

use tokio::net::TcpListener;

use castline_core::{CastlineError, Result};

pub mod app_state;
pub mod dispatch;
pub mod realtime;
pub mod router;
pub mod transport;

pub use app_state::AppState;
pub use dispatch::Dispatcher;
pub use realtime::{Hub, Presence, SessionId};

/// Run the server until `shutdown` resolves.
///
/// Binds `addr` (a bare `:port` listens on all interfaces), serves WebSocket
/// sessions, and on shutdown broadcasts the SHUTDOWN notice to every session
/// strictly before closing it.
pub async fn serve(addr: &str, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let state = AppState::new();
    let hub = state.hub();
    let app = router::build_router(state);

    let listen = normalize_addr(addr);
    let listener = TcpListener::bind(&listen)
        .await
        .map_err(|e| CastlineError::Connect(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "castline server serving");

    let graceful = async move {
        shutdown.await;
        tracing::info!("shutdown signal received, ending server session");
        hub.shutdown().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .await
        .map_err(|e| CastlineError::Internal(format!("server failed: {e}")))?;

    tracing::info!("castline server stopped");
    Ok(())
}

/// `:3000` style addresses listen on all interfaces.
fn normalize_addr(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_addr;

    #[test]
    fn bare_port_listens_on_all_interfaces() {
        assert_eq!(normalize_addr(":3000"), "0.0.0.0:3000");
        assert_eq!(normalize_addr("127.0.0.1:3000"), "127.0.0.1:3000");
    }
}
