//! In-memory terminal and scripted keyboard for driving the editor in tests.
//!
//! [`VirtualTerminal`] keeps a grid of cells, a cursor and the lines scrolled
//! off the top. It understands exactly what the editor emits: text, `\r`,
//! `\n`, absolute cursor moves and clearing from the cursor down. Wrapping at
//! the last column follows the configured [`WrapMode`].

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthChar;

use super::device::{KeySource, TerminalDevice, WrapMode};

const BLANK: char = ' ';
const WIDE_CONTINUATION: char = '\0';

#[derive(Debug)]
struct Screen {
    cols: u16,
    rows: u16,
    cells: Vec<Vec<char>>,
    scrollback: Vec<String>,
    x: u16,
    y: u16,
    wrap_mode: WrapMode,
    cursor_visible: bool,
    raw: bool,
}

impl Screen {
    fn row_text(cells: &[char]) -> String {
        let text: String = cells.iter().filter(|c| **c != WIDE_CONTINUATION).collect();
        text.trim_end().to_string()
    }

    fn linefeed(&mut self) {
        if self.y + 1 < self.rows {
            self.y += 1;
            return;
        }

        let top = self.cells.remove(0);
        self.scrollback.push(Self::row_text(&top));
        self.cells.push(vec![BLANK; usize::from(self.cols)]);
    }

    fn put_char(&mut self, c: char) {
        match c {
            '\r' => {
                self.x = 0;
                return;
            }
            '\n' => {
                if self.x >= self.cols {
                    self.x = 0;
                }
                self.linefeed();
                return;
            }
            _ => {}
        }

        let width = u16::try_from(c.width().unwrap_or(0)).unwrap_or(0);
        if width == 0 {
            return;
        }

        if self.x >= self.cols || self.x + width > self.cols {
            self.x = 0;
            self.linefeed();
        }

        let row = &mut self.cells[usize::from(self.y)];
        row[usize::from(self.x)] = c;
        if width == 2 {
            row[usize::from(self.x) + 1] = WIDE_CONTINUATION;
        }

        self.x += width;
        if self.x >= self.cols && self.wrap_mode == WrapMode::Eager {
            self.x = 0;
            self.linefeed();
        }
    }
}

/// A terminal screen held in memory. Clones share the same screen.
#[derive(Debug, Clone)]
pub struct VirtualTerminal {
    screen: Arc<Mutex<Screen>>,
}

impl VirtualTerminal {
    #[must_use]
    pub fn new(cols: u16, rows: u16, wrap_mode: WrapMode) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            screen: Arc::new(Mutex::new(Screen {
                cols,
                rows,
                cells: vec![vec![BLANK; usize::from(cols)]; usize::from(rows)],
                scrollback: Vec::new(),
                x: 0,
                y: 0,
                wrap_mode,
                cursor_visible: true,
                raw: false,
            })),
        }
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Text of a visible row, trailing blanks trimmed.
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        let screen = self.screen();
        screen
            .cells
            .get(usize::from(row))
            .map(|cells| Screen::row_text(cells))
            .unwrap_or_default()
    }

    /// Scrolled-off lines followed by the visible rows, trailing empty rows dropped.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let screen = self.screen();
        let mut lines = screen.scrollback.clone();
        lines.extend(screen.cells.iter().map(|cells| Screen::row_text(cells)));
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }

    /// Cursor column and row as the terminal would report them.
    #[must_use]
    pub fn cursor_position(&self) -> (u16, u16) {
        let screen = self.screen();
        (screen.x.min(screen.cols - 1), screen.y)
    }

    #[must_use]
    pub fn is_cursor_visible(&self) -> bool {
        self.screen().cursor_visible
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.screen().raw
    }

    /// Changes the width, keeping the text of each row.
    pub fn resize(&self, cols: u16) {
        let mut screen = self.screen();
        let cols = cols.max(1);
        screen.cols = cols;
        for row in &mut screen.cells {
            row.resize(usize::from(cols), BLANK);
        }
        screen.x = screen.x.min(cols - 1);
    }
}

impl TerminalDevice for VirtualTerminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        let screen = self.screen();
        Ok((screen.cols, screen.rows))
    }

    fn cursor(&mut self) -> io::Result<(u16, u16)> {
        Ok(self.cursor_position())
    }

    fn set_cursor(&mut self, col: u16, row: u16) -> io::Result<()> {
        let mut screen = self.screen();
        screen.x = col.min(screen.cols - 1);
        screen.y = row.min(screen.rows - 1);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        let mut screen = self.screen();
        for c in text.chars() {
            screen.put_char(c);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.screen().cursor_visible = false;
        Ok(())
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.screen().cursor_visible = true;
        Ok(())
    }

    fn clear_from_cursor_down(&mut self) -> io::Result<()> {
        let mut screen = self.screen();
        let x = usize::from(screen.x.min(screen.cols));
        let y = usize::from(screen.y);
        for (i, row) in screen.cells.iter_mut().enumerate().skip(y) {
            let from = if i == y { x } else { 0 };
            row[from..].fill(BLANK);
        }
        Ok(())
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        self.screen().raw = true;
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        self.screen().raw = false;
        Ok(())
    }

    fn wrap_mode(&self) -> WrapMode {
        self.screen().wrap_mode
    }
}

enum Step {
    Key(KeyEvent),
    Run(Box<dyn FnOnce() + Send>),
    Idle,
}

/// A keyboard that replays a fixed script.
///
/// Besides keys, the script can run a closure between keys, e.g. to write
/// through a shared writer mid-read, or report an empty poll. Polling past
/// the end of the script fails with [`io::ErrorKind::UnexpectedEof`].
#[derive(Default)]
pub struct ScriptedKeys {
    steps: VecDeque<Step>,
}

impl ScriptedKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn key(mut self, code: KeyCode) -> Self {
        self.steps
            .push_back(Step::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        self
    }

    #[must_use]
    pub fn key_with(mut self, code: KeyCode, modifiers: KeyModifiers) -> Self {
        self.steps.push_back(Step::Key(KeyEvent::new(code, modifiers)));
        self
    }

    /// Types every character of `text`.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        for c in text.chars() {
            self = self.key(KeyCode::Char(c));
        }
        self
    }

    #[must_use]
    pub fn enter(self) -> Self {
        self.key(KeyCode::Enter)
    }

    #[must_use]
    pub fn ctrl(self, c: char) -> Self {
        self.key_with(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[must_use]
    pub fn run(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.steps.push_back(Step::Run(Box::new(f)));
        self
    }

    /// A poll that times out without a key.
    #[must_use]
    pub fn idle(mut self) -> Self {
        self.steps.push_back(Step::Idle);
        self
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self, _timeout: Duration) -> io::Result<Option<KeyEvent>> {
        loop {
            match self.steps.pop_front() {
                Some(Step::Key(key)) => return Ok(Some(key)),
                Some(Step::Run(f)) => f(),
                Some(Step::Idle) => return Ok(None),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "key script exhausted",
                    ))
                }
            }
        }
    }
}
