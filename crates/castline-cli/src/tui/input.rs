//! Input buffer and key handling.

use super::app::{App, AppAction};

/// Key inputs the chat UI reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Esc,
}

/// The input line: text buffer plus cursor position.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle one key. Editing keys are ignored while input is disabled;
    /// Esc always quits.
    pub fn handle_key(&mut self, key: KeyInput, app: &App) -> Vec<AppAction> {
        if key == KeyInput::Esc {
            return vec![AppAction::Quit(app.exit_outcome())];
        }
        if !app.input_enabled() {
            return vec![];
        }

        match key {
            KeyInput::Char(c) => {
                self.buffer.insert(self.cursor, c);
                self.cursor = self.cursor.saturating_add(c.len_utf8());
                vec![AppAction::Render]
            }
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    let prev = floor_char_boundary(&self.buffer, self.cursor - 1);
                    self.buffer.remove(prev);
                    self.cursor = prev;
                }
                vec![AppAction::Render]
            }
            KeyInput::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
                vec![AppAction::Render]
            }
            KeyInput::Left => {
                if self.cursor > 0 {
                    self.cursor = floor_char_boundary(&self.buffer, self.cursor - 1);
                }
                vec![AppAction::Render]
            }
            KeyInput::Right => {
                if self.cursor < self.buffer.len() {
                    self.cursor = ceil_char_boundary(&self.buffer, self.cursor + 1);
                }
                vec![AppAction::Render]
            }
            KeyInput::Home => {
                self.cursor = 0;
                vec![AppAction::Render]
            }
            KeyInput::End => {
                self.cursor = self.buffer.len();
                vec![AppAction::Render]
            }
            // empty lines are submitted like any other
            KeyInput::Enter => {
                let line = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                vec![AppAction::Submit(line), AppAction::Render]
            }
            KeyInput::Esc => vec![],
        }
    }
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::Outcome;

    fn app() -> App {
        App::new("alice", "localhost:3000")
    }

    #[test]
    fn chars_build_the_buffer() {
        let mut input = InputState::new();
        let app = app();
        input.handle_key(KeyInput::Char('h'), &app);
        input.handle_key(KeyInput::Char('i'), &app);
        assert_eq!(input.buffer(), "hi");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut input = InputState::new();
        let app = app();
        input.handle_key(KeyInput::Char('a'), &app);
        input.handle_key(KeyInput::Char('b'), &app);
        input.handle_key(KeyInput::Backspace, &app);
        assert_eq!(input.buffer(), "a");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut input = InputState::new();
        let app = app();
        for c in "hello".chars() {
            input.handle_key(KeyInput::Char(c), &app);
        }
        let actions = input.handle_key(KeyInput::Enter, &app);
        assert_eq!(actions[0], AppAction::Submit("hello".into()));
        assert!(input.buffer().is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn empty_enter_still_submits() {
        let mut input = InputState::new();
        let app = app();
        let actions = input.handle_key(KeyInput::Enter, &app);
        assert_eq!(actions[0], AppAction::Submit(String::new()));
    }

    #[test]
    fn editing_is_ignored_while_disabled_but_esc_quits() {
        let mut input = InputState::new();
        let mut app = app();
        app.fault("dead".into());

        assert!(input.handle_key(KeyInput::Char('x'), &app).is_empty());
        assert!(input.handle_key(KeyInput::Enter, &app).is_empty());
        assert_eq!(
            input.handle_key(KeyInput::Esc, &app),
            vec![AppAction::Quit(Outcome::Fault)]
        );
    }

    #[test]
    fn cursor_movement_respects_char_boundaries() {
        let mut input = InputState::new();
        let app = app();
        input.handle_key(KeyInput::Char('é'), &app);
        input.handle_key(KeyInput::Char('x'), &app);
        input.handle_key(KeyInput::Home, &app);
        input.handle_key(KeyInput::Right, &app);
        assert_eq!(input.cursor(), 'é'.len_utf8());
        input.handle_key(KeyInput::Left, &app);
        assert_eq!(input.cursor(), 0);
    }
}
