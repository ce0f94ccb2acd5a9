//! Client session: one live connection plus the local username.
//!
//! `join` dials and announces presence; `close` announces departure
//! best-effort and releases the socket, safe to call twice. The session
//! splits into sender/receiver halves so the inbound path and the foreground
//! path can run concurrently without sharing state.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};

use castline_core::{CastlineError, Envelope, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A joined chat session.
pub struct Session {
    sender: SessionSender,
    receiver: SessionReceiver,
}

/// Outbound half: owns the sink and the username.
pub struct SessionSender {
    sink: SplitSink<WsStream, Message>,
    name: String,
    closed: bool,
}

/// Inbound half: owns the stream.
pub struct SessionReceiver {
    stream: SplitStream<WsStream>,
}

impl Session {
    /// Dial `host` and announce presence as `name`. Dial failures surface as
    /// `Connect` before any protocol traffic is sent.
    pub async fn join(host: &str, name: &str) -> Result<Self> {
        let url = format!("ws://{host}");
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| CastlineError::Connect(e.to_string()))?;

        let (sink, stream) = stream.split();
        let mut sender = SessionSender {
            sink,
            name: name.to_string(),
            closed: false,
        };
        sender.transmit(&Envelope::connect(name)).await?;

        Ok(Self {
            sender,
            receiver: SessionReceiver { stream },
        })
    }

    pub fn name(&self) -> &str {
        &self.sender.name
    }

    /// Split into the two halves of the client's concurrency model.
    pub fn split(self) -> (SessionSender, SessionReceiver) {
        (self.sender, self.receiver)
    }
}

impl SessionSender {
    /// Wrap `text` in a user message tagged with the session's own name.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let env = Envelope::user(self.name.clone(), text);
        self.transmit(&env).await
    }

    /// Announce departure best-effort, then release the socket. The
    /// connection may already be gone, so both steps swallow errors; a
    /// second call observes the closed flag and no-ops.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        let env = Envelope::disconnect(self.name.clone());
        let _ = self.transmit(&env).await;
        self.closed = true;
        let _ = self.sink.close().await;
    }

    async fn transmit(&mut self, env: &Envelope) -> Result<()> {
        if self.closed {
            return Err(CastlineError::Closed);
        }
        let frame = env.encode()?;
        self.sink
            .send(Message::Text(frame))
            .await
            .map_err(map_ws_error)
    }
}

impl SessionReceiver {
    /// Block until the next envelope arrives or the connection ends.
    /// End-of-stream and close handshakes map to `Closed`; other transport
    /// faults to `Transport`; malformed frames to `Decode`.
    pub async fn receive(&mut self) -> Result<Envelope> {
        loop {
            let msg = match self.stream.next().await {
                None => return Err(CastlineError::Closed),
                Some(Err(e)) => return Err(map_ws_error(e)),
                Some(Ok(msg)) => msg,
            };
            match msg {
                Message::Text(raw) => return Envelope::decode(&raw),
                Message::Close(_) => return Err(CastlineError::Closed),
                // ping/pong/binary are transport noise at this layer
                _ => continue,
            }
        }
    }
}

fn map_ws_error(e: tungstenite::Error) -> CastlineError {
    match e {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            CastlineError::Closed
        }
        other => CastlineError::Transport(other.to_string()),
    }
}
