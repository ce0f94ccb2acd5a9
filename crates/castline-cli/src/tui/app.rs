//! UI state machine.
//!
//! `App` is the only owner of the transcript; every state change flows
//! through `handle`, which returns the actions the runtime should take.
//! Termination is a returned `Quit` action, never a process exit from inside
//! an event handler, so the caller can release the session first.

use castline_core::{CastlineError, Cause, Envelope, Kind};

/// Events merged into the single update path.
#[derive(Debug)]
pub enum AppEvent {
    /// Envelope forwarded by the inbound reader.
    Inbound(Envelope),
    /// The inbound path ended with the expected closed condition.
    InboundClosed,
    /// The inbound path died on a real transport fault.
    InboundFault(CastlineError),
    /// External cancellation (ctrl-c or a process signal).
    Cancelled,
}

/// Actions for the runtime loop.
#[derive(Debug, PartialEq, Eq)]
pub enum AppAction {
    Render,
    /// Send the submitted line as a user message. An empty line is sent
    /// as-is.
    Submit(String),
    Quit(Outcome),
}

/// How the client run ended; drives the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// User quit, or the server announced shutdown. Exit 0.
    Clean,
    /// The username was rejected. Non-zero exit.
    Conflict,
    /// The connection faulted. Non-zero exit.
    Fault,
}

/// One transcript line, kept semantic; styling happens at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Own message echoed back by the broadcast.
    Sent(String),
    /// Another user's message.
    Received { sender: String, body: String },
    /// Server notice.
    Notice(String),
    /// Presence: someone joined.
    Joined(String),
    /// Presence: someone left.
    Left(String),
    /// Fatal local condition; input is disabled once one of these lands.
    Fatal(String),
}

pub struct App {
    name: String,
    host: String,
    transcript: Vec<Entry>,
    input_enabled: bool,
    faulted: bool,
}

impl App {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            transcript: Vec::new(),
            input_enabled: true,
            faulted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transcript(&self) -> &[Entry] {
        &self.transcript
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Outcome a user-initiated quit should carry.
    pub fn exit_outcome(&self) -> Outcome {
        if self.faulted {
            Outcome::Fault
        } else {
            Outcome::Clean
        }
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Inbound(env) => self.handle_envelope(env),
            // Expected at shutdown; the SHUTDOWN notice (or the user) ends
            // the session, not the closed stream.
            AppEvent::InboundClosed => vec![],
            AppEvent::InboundFault(e) => {
                self.fault(format!("failed to read from server, {e}"));
                vec![AppAction::Render]
            }
            AppEvent::Cancelled => vec![AppAction::Quit(self.exit_outcome())],
        }
    }

    /// A local send failed: same terminal handling as an inbound fault.
    pub fn fault(&mut self, line: String) {
        self.transcript.push(Entry::Fatal(line));
        self.input_enabled = false;
        self.faulted = true;
    }

    fn handle_envelope(&mut self, env: Envelope) -> Vec<AppAction> {
        match env.kind {
            Kind::User => {
                if env.sender == self.name {
                    self.transcript.push(Entry::Sent(env.body));
                } else {
                    self.transcript.push(Entry::Received {
                        sender: env.sender,
                        body: env.body,
                    });
                }
                vec![AppAction::Render]
            }
            Kind::Server => {
                let cause = env.cause();
                self.transcript.push(Entry::Notice(env.body));
                match cause {
                    Some(Cause::Shutdown) => vec![AppAction::Render, AppAction::Quit(Outcome::Clean)],
                    Some(Cause::Conflict) => {
                        vec![AppAction::Render, AppAction::Quit(Outcome::Conflict)]
                    }
                    _ => vec![AppAction::Render],
                }
            }
            Kind::Connect => {
                self.transcript.push(Entry::Joined(env.sender));
                vec![AppAction::Render]
            }
            Kind::Disconnect => {
                self.transcript.push(Entry::Left(env.sender));
                vec![AppAction::Render]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new("alice", "localhost:3000")
    }

    #[test]
    fn own_messages_render_as_sent() {
        let mut app = app();
        app.handle(AppEvent::Inbound(Envelope::user("alice", "hi")));
        app.handle(AppEvent::Inbound(Envelope::user("bob", "yo")));

        assert_eq!(
            app.transcript(),
            &[
                Entry::Sent("hi".into()),
                Entry::Received { sender: "bob".into(), body: "yo".into() },
            ]
        );
    }

    #[test]
    fn presence_events_append_transcript_lines() {
        let mut app = app();
        app.handle(AppEvent::Inbound(Envelope::connect("bob")));
        app.handle(AppEvent::Inbound(Envelope::disconnect("bob")));

        assert_eq!(
            app.transcript(),
            &[Entry::Joined("bob".into()), Entry::Left("bob".into())]
        );
    }

    #[test]
    fn shutdown_notice_quits_clean() {
        let mut app = app();
        let actions = app.handle(AppEvent::Inbound(Envelope::server(
            Cause::Shutdown,
            "the server is shutting down...",
        )));
        assert!(actions.contains(&AppAction::Quit(Outcome::Clean)));
    }

    #[test]
    fn conflict_notice_quits_nonzero() {
        let mut app = app();
        let actions = app.handle(AppEvent::Inbound(Envelope::server(
            Cause::Conflict,
            "username already in chat",
        )));
        assert!(actions.contains(&AppAction::Quit(Outcome::Conflict)));
    }

    #[test]
    fn unknown_cause_is_just_a_notice() {
        let mut app = app();
        let actions = app.handle(AppEvent::Inbound(Envelope::server(Cause::Error, "hiccup")));
        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.transcript().len(), 1);
    }

    #[test]
    fn inbound_fault_disables_input_and_taints_exit() {
        let mut app = app();
        app.handle(AppEvent::InboundFault(CastlineError::Transport("boom".into())));

        assert!(!app.input_enabled());
        assert_eq!(app.exit_outcome(), Outcome::Fault);
        assert!(matches!(app.transcript().last(), Some(Entry::Fatal(_))));
    }

    #[test]
    fn inbound_closed_is_silent() {
        let mut app = app();
        let actions = app.handle(AppEvent::InboundClosed);
        assert!(actions.is_empty());
        assert!(app.transcript().is_empty());
        assert!(app.input_enabled());
    }

    #[test]
    fn cancellation_quits_with_the_current_outcome() {
        let mut app = app();
        assert_eq!(app.handle(AppEvent::Cancelled), vec![AppAction::Quit(Outcome::Clean)]);

        app.fault("dead".into());
        assert_eq!(app.handle(AppEvent::Cancelled), vec![AppAction::Quit(Outcome::Fault)]);
    }
}
