//! Render functions. Pure: state in, widgets out.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::app::{App, Entry};
use super::input::InputState;

const TRANSCRIPT_MIN_HEIGHT: u16 = 3;
const INPUT_HEIGHT: u16 = 3;
const BORDER_SIZE: u16 = 2;
const PROMPT_WIDTH: u16 = 3; // "> "

/// Render the whole client view.
pub fn render(frame: &mut Frame, app: &App, input: &InputState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(TRANSCRIPT_MIN_HEIGHT), Constraint::Length(INPUT_HEIGHT)])
        .split(frame.area());

    let [transcript_area, input_area] = chunks.as_ref() else {
        return;
    };

    render_transcript(frame, app, *transcript_area);
    render_input(frame, app, input, *input_area);
}

fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} @ {} ", app.name(), app.host());
    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = app.transcript().iter().map(entry_line).map(ListItem::new).collect();

    // bottom-anchored: keep the newest lines in view
    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn entry_line(entry: &Entry) -> Line<'_> {
    match entry {
        Entry::Sent(body) => tagged_line("[you]:", Color::Yellow, body),
        Entry::Received { sender, body } => {
            let tag = format!("[{sender}]:");
            Line::from(vec![
                Span::styled(tag, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::raw(body.as_str()),
            ])
        }
        Entry::Notice(body) => tagged_line("<SERVER>:", Color::Magenta, body),
        Entry::Joined(name) => tagged_line("<CONNECTED>:", Color::Green, name),
        Entry::Left(name) => tagged_line("<DISCONNECTED>:", Color::Red, name),
        Entry::Fatal(body) => tagged_line("<ERROR>:", Color::Red, body),
    }
}

fn tagged_line<'a>(tag: &'a str, color: Color, body: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(tag, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::raw(body),
    ])
}

fn render_input(frame: &mut Frame, app: &App, input: &InputState, area: Rect) {
    let (border_style, text) = if app.input_enabled() {
        (Style::default(), format!("> {}", input.buffer()))
    } else {
        (
            Style::default().fg(Color::Red),
            "input disabled, press Esc to quit".to_string(),
        )
    };

    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    frame.render_widget(Paragraph::new(text).block(block), area);

    if !app.input_enabled() {
        return;
    }

    let cursor_cols = input.buffer()[..input.cursor()].chars().count() as u16;
    let available_width = area.width.saturating_sub(PROMPT_WIDTH + 1);
    let cursor_x = area.x + PROMPT_WIDTH + cursor_cols.min(available_width);
    frame.set_cursor_position((cursor_x, area.y + 1));
}
