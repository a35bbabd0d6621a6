//! ratatui rendering of a conversation snapshot.

use appointment_chat_core::{MessageEntry, Role};
use appointment_chat_session::ViewState;
use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::prompts::{DOCTORS, SUGGESTED_PROMPTS};

/// Most input lines shown before the box stops growing.
const MAX_INPUT_LINES: usize = 4;

/// Scroll position of the message list.
///
/// Follows the newest entry until the user scrolls up, and resumes
/// following once they scroll back to the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageScroll {
    offset: u16,
    follow: bool,
}

impl Default for MessageScroll {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl MessageScroll {
    pub const fn up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
        self.follow = false;
    }

    pub const fn down(&mut self, lines: u16) {
        self.offset = self.offset.saturating_add(lines);
    }

    /// Jump back to the newest entry.
    pub const fn follow(&mut self) {
        self.follow = true;
    }

    #[must_use]
    pub const fn offset(&self) -> u16 {
        self.offset
    }

    fn settle(&mut self, total: usize, visible: u16) {
        let max = u16::try_from(total.saturating_sub(usize::from(visible))).unwrap_or(u16::MAX);
        if self.follow || self.offset >= max {
            self.offset = max;
            self.follow = true;
        }
    }
}

/// Draw one frame.
pub fn draw(f: &mut Frame, state: &ViewState, scroll: &mut MessageScroll) {
    let input_lines = state.pending_input.split('\n').count().clamp(1, MAX_INPUT_LINES);
    let suggestion_rows = if state.suggestions_available {
        SUGGESTED_PROMPTS.len() + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),                       // Header
            Constraint::Min(3),                          // Messages
            Constraint::Length(as_u16(suggestion_rows)), // Suggestions
            Constraint::Length(as_u16(input_lines + 2)), // Input
            Constraint::Length(1),                       // Status
        ])
        .split(f.area());

    draw_header(f, chunks[0]);
    draw_messages(f, chunks[1], state, scroll);
    if state.suggestions_available {
        draw_suggestions(f, chunks[2]);
    }
    draw_input(f, chunks[3], state);
    draw_status(f, chunks[4], state);
}

fn as_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn draw_header(f: &mut Frame, area: Rect) {
    let mut doctors = vec![Span::styled("Available Doctors: ", Style::default().fg(Color::Gray))];
    for (name, specialty) in DOCTORS {
        doctors.push(Span::styled(
            format!(" {name} — {specialty} "),
            Style::default().fg(Color::Cyan),
        ));
    }

    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                "🏥 Doctor Appointment Agent",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled("● AI Agent Online", Style::default().fg(Color::Green)),
        ]),
        Line::from(doctors),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_messages(f: &mut Frame, area: Rect, state: &ViewState, scroll: &mut MessageScroll) {
    let mut lines = Vec::new();
    for entry in &state.entries {
        lines.extend(entry_lines(entry));
    }
    if state.awaiting {
        lines.push(Line::from(Span::styled(
            "🤖 Agent is thinking...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let messages = Paragraph::new(lines).wrap(Wrap { trim: false });
    scroll.settle(
        messages.line_count(area.width.saturating_sub(2)),
        area.height.saturating_sub(2),
    );

    let messages = messages
        .block(Block::default().borders(Borders::ALL).title("Conversation"))
        .scroll((scroll.offset(), 0));
    f.render_widget(messages, area);
}

/// Lines for one entry: a name/time line, the content, an optional booking
/// badge, and a blank separator. Wrapping is left to the paragraph.
fn entry_lines(entry: &MessageEntry) -> Vec<Line<'static>> {
    let time = entry.timestamp.with_timezone(&Local).format("%H:%M");
    let (label, alignment, style) = match entry.role {
        Role::User => ("👤 You", Alignment::Right, Style::default().fg(Color::Yellow)),
        Role::Assistant if entry.is_error => {
            ("🤖 Agent", Alignment::Left, Style::default().fg(Color::Red))
        }
        Role::Assistant => ("🤖 Agent", Alignment::Left, Style::default()),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{label} · {time}"),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(alignment),
    ];

    for raw in entry.lines() {
        lines.push(Line::from(Span::styled(raw.to_string(), style)).alignment(alignment));
    }

    if let Some(id) = &entry.appointment_id {
        lines.push(
            Line::from(Span::styled(
                format!("✅ Appointment #{id} Confirmed!"),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(alignment),
        );
    }

    lines.push(Line::default());
    lines
}

fn draw_suggestions(f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = SUGGESTED_PROMPTS
        .iter()
        .enumerate()
        .map(|(i, prompt)| {
            Line::from(vec![
                Span::styled(format!("Alt+{} ", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(*prompt),
            ])
        })
        .collect();

    let suggestions =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Try asking"));
    f.render_widget(suggestions, area);
}

fn draw_input(f: &mut Frame, area: Rect, state: &ViewState) {
    let (title, style) = if state.awaiting {
        ("Waiting for the agent...", Style::default().fg(Color::DarkGray))
    } else {
        ("Message", Style::default().fg(Color::Yellow))
    };

    let lines: Vec<Line> = state.pending_input.split('\n').map(Line::from).collect();
    let hidden = lines.len().saturating_sub(MAX_INPUT_LINES);
    let row = lines.len() - hidden - 1;
    let column = lines.last().map_or(0, Line::width);
    let visible = lines[hidden..].to_vec();

    let input = Paragraph::new(visible)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);

    if !state.awaiting {
        f.set_cursor_position((
            area.x + as_u16(column) + 1,
            area.y + as_u16(row) + 1,
        ));
    }
}

fn draw_status(f: &mut Frame, area: Rect, state: &ViewState) {
    let key = Style::default().fg(Color::Yellow);
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("session {}", state.session_id.short()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" | "),
        Span::styled("Enter", key),
        Span::raw(" send | "),
        Span::styled("Alt+Enter", key),
        Span::raw(" newline | "),
        Span::styled("Ctrl+R", key),
        Span::raw(" report | "),
        Span::styled("Ctrl+L", key),
        Span::raw(" clear | "),
        Span::styled("Ctrl+C", key),
        Span::raw(" quit "),
    ]));
    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use appointment_chat_core::{AppointmentId, SessionId};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn state(entries: Vec<MessageEntry>, awaiting: bool) -> ViewState {
        let suggestions_available = entries.len() <= 1 && !awaiting;
        ViewState {
            session_id: SessionId::new(),
            entries,
            awaiting,
            pending_input: String::new(),
            suggestions_available,
        }
    }

    fn terminal_with(state: &ViewState, width: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, 40)).unwrap();
        let mut scroll = MessageScroll::default();
        terminal.draw(|f| draw(f, state, &mut scroll)).unwrap();
        terminal
    }

    fn contents(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    fn render(state: &ViewState) -> String {
        contents(&terminal_with(state, 100))
    }

    #[test]
    fn test_welcome_screen_offers_suggestions() {
        let out = render(&state(vec![MessageEntry::assistant("Hello there", None)], false));
        assert!(out.contains("Doctor Appointment Agent"));
        assert!(out.contains("Hello there"));
        assert!(out.contains("Try asking"));
        assert!(out.contains("I need to see a cardiologist"));
    }

    #[test]
    fn test_confirmation_badge_and_thinking_indicator() {
        let out = render(&state(
            vec![
                MessageEntry::assistant("Welcome", None),
                MessageEntry::user("Book it"),
                MessageEntry::assistant("Booked.", Some(AppointmentId::from(42_i64))),
                MessageEntry::user("And another"),
            ],
            true,
        ));
        assert!(out.contains("Appointment #42 Confirmed!"));
        assert!(out.contains("Agent is thinking..."));
        assert!(out.contains("Waiting for the agent..."));
        assert!(!out.contains("Try asking"));
    }

    #[test]
    fn test_wide_glyphs_wrap_instead_of_clipping() {
        let content = format!("{}ENDMARK", "🏥".repeat(12));
        let out = contents(&terminal_with(
            &state(
                vec![
                    MessageEntry::assistant("Welcome", None),
                    MessageEntry::assistant(content, None),
                ],
                false,
            ),
            22,
        ));
        assert!(out.contains("ENDMARK"));
    }

    #[test]
    fn test_entry_lines_keep_line_breaks() {
        let entry = MessageEntry::assistant("one\n\ntwo", None);
        // name line + 3 content lines + separator
        assert_eq!(entry_lines(&entry).len(), 5);
    }

    #[test]
    fn test_cursor_follows_display_width() {
        let mut view = state(vec![MessageEntry::assistant("Welcome", None)], false);
        view.pending_input = "🏥ab".to_string();
        let mut terminal = terminal_with(&view, 100);
        // Border, then two columns for the glyph and one per letter.
        assert_eq!(terminal.get_cursor_position().unwrap().x, 5);
    }

    #[test]
    fn test_scroll_follows_until_user_scrolls_up() {
        let mut scroll = MessageScroll::default();
        scroll.settle(50, 10);
        assert_eq!(scroll.offset(), 40);

        scroll.up(5);
        scroll.settle(60, 10);
        assert_eq!(scroll.offset(), 35);

        scroll.down(100);
        scroll.settle(60, 10);
        assert_eq!(scroll.offset(), 50);
        scroll.settle(70, 10);
        assert_eq!(scroll.offset(), 60);
    }
}
