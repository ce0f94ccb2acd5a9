//! Interactive loop.
//!
//! Two execution paths share the session: a spawned reader task that forwards
//! inbound envelopes over a bounded channel, and this foreground loop, which
//! owns all render state and merges keystrokes, inbound events, and
//! cancellation through one `tokio::select!`.

pub mod app;
pub mod input;
pub mod ui;

use std::io::{self, stdout, Stdout};

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use castline_core::{CastlineError, Result};

use crate::session::Session;
use app::{App, AppAction, AppEvent, Outcome};
use input::{InputState, KeyInput};

/// Inbound envelopes queued between the reader task and the foreground loop.
const INBOUND_QUEUE: usize = 256;

/// Run the interactive client until the user quits or the server ends the
/// session. The transport handle is released exactly once, on the way out.
pub async fn run(session: Session, host: &str) -> Result<Outcome> {
    let own_name = session.name().to_string();
    let (mut sender, mut receiver) = session.split();

    let (in_tx, mut in_rx) = mpsc::channel::<AppEvent>(INBOUND_QUEUE);
    let reader = tokio::spawn(async move {
        loop {
            match receiver.receive().await {
                Ok(env) => {
                    if in_tx.send(AppEvent::Inbound(env)).await.is_err() {
                        break;
                    }
                }
                // expected at shutdown: stop silently after telling the UI
                Err(e) if e.is_closed() => {
                    let _ = in_tx.send(AppEvent::InboundClosed).await;
                    break;
                }
                Err(CastlineError::Decode(e)) => {
                    tracing::debug!(error = %e, "dropping malformed inbound frame");
                }
                Err(e) => {
                    let _ = in_tx.send(AppEvent::InboundFault(e)).await;
                    break;
                }
            }
        }
    });

    let mut terminal = TerminalGuard::new()?;
    let mut app = App::new(own_name, host);
    let mut input = InputState::new();
    let mut events = EventStream::new();

    let cancel = cancel_signal();
    tokio::pin!(cancel);

    terminal.draw(&app, &input)?;

    // stops polling the inbound channel once the reader is gone
    let mut inbound_open = true;

    let outcome = loop {
        let actions = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                        app.handle(AppEvent::Cancelled)
                    } else if let Some(k) = convert_key(key.code) {
                        input.handle_key(k, &app)
                    } else {
                        vec![]
                    }
                }
                Some(Ok(Event::Resize(..))) => vec![AppAction::Render],
                Some(Ok(_)) => vec![],
                Some(Err(e)) => return Err(CastlineError::Internal(format!("terminal: {e}"))),
                None => app.handle(AppEvent::Cancelled),
            },

            maybe_in = in_rx.recv(), if inbound_open => match maybe_in {
                Some(event) => app.handle(event),
                None => {
                    inbound_open = false;
                    vec![]
                }
            },

            () = &mut cancel => app.handle(AppEvent::Cancelled),
        };

        let mut quit = None;
        let mut dirty = false;
        for action in actions {
            match action {
                AppAction::Render => dirty = true,
                AppAction::Submit(line) => {
                    if let Err(e) = sender.send(&line).await {
                        app.fault(format!("failed to send message, {e}"));
                        dirty = true;
                    }
                }
                AppAction::Quit(outcome) => quit = Some(outcome),
            }
        }

        if let Some(outcome) = quit {
            break outcome;
        }
        if dirty {
            terminal.draw(&app, &input)?;
        }
    };

    sender.close().await;
    reader.abort();

    Ok(outcome)
}

fn convert_key(code: KeyCode) -> Option<KeyInput> {
    match code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        KeyCode::Esc => Some(KeyInput::Esc),
        _ => None,
    }
}

/// SIGTERM (unix). Ctrl-c arrives as a key event while the terminal is raw.
async fn cancel_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    }

    #[cfg(not(unix))]
    std::future::pending::<()>().await
}

/// Raw mode + alternate screen, restored on drop so panics and early returns
/// leave the terminal usable.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode().map_err(terminal_error)?;
        stdout().execute(EnterAlternateScreen).map_err(terminal_error)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout())).map_err(terminal_error)?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, app: &App, input: &InputState) -> Result<()> {
        self.terminal
            .draw(|frame| ui::render(frame, app, input))
            .map_err(terminal_error)?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

fn terminal_error(e: io::Error) -> CastlineError {
    CastlineError::Internal(format!("terminal: {e}"))
}
