//! Keyboard mapping for the chat screen.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::prompts::SUGGESTED_PROMPTS;

/// Lines moved by PageUp/PageDown.
const PAGE: u16 = 10;

/// What a key press asks the chat screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    /// Type a character into the input box.
    Insert(char),
    /// Insert a line break without sending.
    Newline,
    /// Delete the last character.
    Backspace,
    /// Send the input box.
    Submit,
    /// Send the suggested prompt at this index.
    Suggest(usize),
    /// Ask for the summary report.
    Report,
    /// Clear the conversation.
    Clear,
    ScrollUp(u16),
    ScrollDown(u16),
    Quit,
}

impl ChatAction {
    /// Map a key event.
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if ctrl => Some(Self::Quit),
            KeyCode::Char('l') if ctrl => Some(Self::Clear),
            KeyCode::Char('r') if ctrl => Some(Self::Report),
            KeyCode::Char(c @ '1'..='9') if alt => {
                let index = (c as usize) - ('1' as usize);
                (index < SUGGESTED_PROMPTS.len()).then_some(Self::Suggest(index))
            }
            KeyCode::Char(_) if ctrl || alt => None,
            KeyCode::Char(c) => Some(Self::Insert(c)),
            KeyCode::Enter if alt || key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Self::Newline)
            }
            KeyCode::Enter => Some(Self::Submit),
            KeyCode::Backspace => Some(Self::Backspace),
            KeyCode::Up => Some(Self::ScrollUp(1)),
            KeyCode::Down => Some(Self::ScrollDown(1)),
            KeyCode::PageUp => Some(Self::ScrollUp(PAGE)),
            KeyCode::PageDown => Some(Self::ScrollDown(PAGE)),
            KeyCode::Esc => Some(Self::Quit),
            _ => None,
        }
    }

    /// Map a terminal event; only key presses produce actions.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        if let Event::Key(key) = event {
            Self::from_key(key)
        } else {
            None
        }
    }
}
