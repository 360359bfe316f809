use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// An edit the line editor performs in response to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    DeleteToHome,
    DeleteToEnd,
    /// Drops the whole input, keeping the prompt.
    Clear,
    HistoryPrev,
    HistoryNext,
    CompleteNext,
    CompletePrev,
    Cancel,
    Enter,
}

impl EditorAction {
    /// Maps a key press to an action; keys without a binding map to `None`.
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);

        let action = match key.code {
            KeyCode::Char(c) if control => match c.to_ascii_lowercase() {
                'c' => Self::Cancel,
                'a' => Self::Home,
                'e' => Self::End,
                'u' => Self::DeleteToHome,
                'k' => Self::DeleteToEnd,
                _ => return None,
            },
            KeyCode::Char(c) if !c.is_control() => Self::Insert(c),
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Delete => Self::Delete,
            KeyCode::Left => Self::Left,
            KeyCode::Right => Self::Right,
            KeyCode::Home if control => Self::DeleteToHome,
            KeyCode::End if control => Self::DeleteToEnd,
            KeyCode::Home => Self::Home,
            KeyCode::End => Self::End,
            KeyCode::Esc => Self::Clear,
            KeyCode::Up => Self::HistoryPrev,
            KeyCode::Down => Self::HistoryNext,
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Self::CompletePrev,
            KeyCode::Tab => Self::CompleteNext,
            KeyCode::BackTab => Self::CompletePrev,
            KeyCode::Enter => Self::Enter,
            _ => return None,
        };

        Some(action)
    }

    /// Whether the action keeps the current completion cycle alive.
    #[must_use]
    pub fn is_completion(self) -> bool {
        matches!(self, Self::CompleteNext | Self::CompletePrev)
    }
}
