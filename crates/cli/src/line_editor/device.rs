//! The terminal the editor draws on and the keys it reads.

use std::io::{self, stdout, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{cursor, queue, terminal};

pub use argline_core::config::WrapMode;

/// Output side of a terminal, addressed in absolute cells.
pub trait TerminalDevice: Send {
    /// Columns and rows.
    fn size(&self) -> io::Result<(u16, u16)>;
    /// Column and row of the cursor, after flushing pending output.
    fn cursor(&mut self) -> io::Result<(u16, u16)>;
    fn set_cursor(&mut self, col: u16, row: u16) -> io::Result<()>;
    fn write_str(&mut self, text: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
    fn hide_cursor(&mut self) -> io::Result<()>;
    fn show_cursor(&mut self) -> io::Result<()>;
    fn clear_from_cursor_down(&mut self) -> io::Result<()>;
    fn enter_raw_mode(&mut self) -> io::Result<()>;
    fn leave_raw_mode(&mut self) -> io::Result<()>;
    fn wrap_mode(&self) -> WrapMode;
}

/// Input side of a terminal.
pub trait KeySource: Send {
    /// Waits up to `timeout` for a key press.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;
}

/// The process's terminal, driven through crossterm.
pub struct CrosstermDevice {
    stdout: Stdout,
    wrap_mode: WrapMode,
}

impl CrosstermDevice {
    #[must_use]
    pub fn new(wrap_mode: WrapMode) -> Self {
        Self {
            stdout: stdout(),
            wrap_mode,
        }
    }
}

impl TerminalDevice for CrosstermDevice {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn cursor(&mut self) -> io::Result<(u16, u16)> {
        self.stdout.flush()?;
        cursor::position()
    }

    fn set_cursor(&mut self, col: u16, row: u16) -> io::Result<()> {
        queue!(self.stdout, MoveTo(col, row))
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        queue!(self.stdout, Print(text))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.stdout, Hide)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.stdout, Show)
    }

    fn clear_from_cursor_down(&mut self) -> io::Result<()> {
        queue!(self.stdout, Clear(ClearType::FromCursorDown))
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        enable_raw_mode()
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        self.stdout.flush()?;
        disable_raw_mode()
    }

    fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }
}

/// Key presses from crossterm's event queue; other events are dropped.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}
