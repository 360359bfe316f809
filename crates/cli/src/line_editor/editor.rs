//! Editor state shared between the read loop and foreign writers.
//!
//! Everything here runs with the editor's mutex held. Screen rows are tracked
//! relative to the anchor, the row the prompt starts on, and the anchor is
//! re-read from the device after every write so that scrolling is accounted
//! for.

use std::sync::{Mutex, MutexGuard, PoisonError};

use argline_core::error::{Error, Result};
use argline_core::tokenizer::{match_completion, trim_quotes};
use log::debug;

use super::actions::EditorAction;
use super::buffer::{advance, LineBuffer, Position};
use super::completion::{filter_candidates, Completer, CompletionCycle};
use super::device::{TerminalDevice, WrapMode};
use super::history::History;
use super::width::{UnicodeWidthTable, WidthTable};

/// Whether a read is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    Reading,
}

pub(crate) fn lock<D: TerminalDevice>(core: &Mutex<EditorCore<D>>) -> MutexGuard<'_, EditorCore<D>> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_u16(value: i64) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) struct EditorCore<D: TerminalDevice> {
    device: D,
    table: Box<dyn WidthTable>,
    state: EditorState,
    buffer: LineBuffer,
    anchor: i64,
    cols: u16,
    history: History,
    completion: CompletionCycle,
    foreign_column: Option<u16>,
    pending: Vec<u8>,
}

impl<D: TerminalDevice> EditorCore<D> {
    pub(crate) fn new(device: D) -> Self {
        Self {
            device,
            table: Box::new(UnicodeWidthTable),
            state: EditorState::Idle,
            buffer: LineBuffer::default(),
            anchor: 0,
            cols: 0,
            history: History::default(),
            completion: CompletionCycle::default(),
            foreign_column: None,
            pending: Vec::new(),
        }
    }

    pub(crate) fn set_width_table(&mut self, table: Box<dyn WidthTable>) {
        self.table = table;
    }

    pub(crate) fn state(&self) -> EditorState {
        self.state
    }

    pub(crate) fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub(crate) fn text(&self) -> String {
        self.buffer.text()
    }

    pub(crate) fn text_with_insert(&self, c: char) -> String {
        self.buffer.text_with_insert(c)
    }

    pub(crate) fn enter_raw_mode(&mut self) -> Result<()> {
        Ok(self.device.enter_raw_mode()?)
    }

    pub(crate) fn leave_raw_mode(&mut self) -> Result<()> {
        Ok(self.device.leave_raw_mode()?)
    }

    fn cols(&self) -> usize {
        usize::from(self.cols)
    }

    fn position(&self, upto: usize) -> Position {
        self.buffer.position(upto, self.cols(), self.table.as_ref())
    }

    fn move_to(&mut self, pos: Position) -> Result<()> {
        let row = to_u16(self.anchor + to_i64(pos.row));
        let col = u16::try_from(pos.col).unwrap_or(u16::MAX);
        Ok(self.device.set_cursor(col, row)?)
    }

    fn place_cursor(&mut self) -> Result<()> {
        let pos = self.position(self.buffer.cursor());
        self.move_to(pos)
    }

    /// Writes buffer text spanning `start..end` and re-reads the anchor.
    fn write_and_anchor(&mut self, text: &str, start: Position, end: Position) -> Result<()> {
        self.device.write_str(text)?;
        if self.device.wrap_mode() == WrapMode::Deferred
            && !text.is_empty()
            && end.col == 0
            && end.row > start.row
        {
            self.device.write_str("\r\n")?;
        }

        let (_, row) = self.device.cursor()?;
        self.anchor = i64::from(row) - to_i64(end.row);
        Ok(())
    }

    /// Redraws the buffer from character `from` to the end.
    fn render_from(&mut self, from: usize) -> Result<()> {
        let start = self.position(from);
        let end = self.position(self.buffer.total_len());
        self.move_to(start)?;
        self.device.clear_from_cursor_down()?;

        let text = self.buffer.display_from(from);
        self.write_and_anchor(&text, start, end)?;
        self.place_cursor()
    }

    fn sync_width(&mut self) -> Result<()> {
        let (cols, _) = self.device.size()?;
        let cols = cols.max(1);
        if cols == self.cols {
            return Ok(());
        }

        debug!("Terminal width changed from {} to {cols}", self.cols);
        self.cols = cols;
        if self.state == EditorState::Reading {
            self.render_from(0)?;
        }
        Ok(())
    }

    /// Runs `f` with the cursor hidden, then shows it and flushes.
    fn bracket(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        self.sync_width()?;
        self.device.hide_cursor()?;
        let result = f(self);
        self.device.show_cursor()?;
        self.device.flush()?;
        result
    }

    /// Starts a read: the prompt and `text` are drawn on a fresh row.
    pub(crate) fn begin(&mut self, prompt: &str, text: &str, hidden: bool) -> Result<()> {
        self.cols = self.device.size()?.0.max(1);
        let (col, mut row) = self.device.cursor()?;
        if col != 0 {
            self.device.write_str("\r\n")?;
            row = self.device.cursor()?.1;
        }

        self.anchor = i64::from(row);
        self.buffer = LineBuffer::new(prompt, text, hidden);
        self.state = EditorState::Reading;
        self.completion.reset();
        self.history.reset_cursor();
        self.foreign_column = None;
        debug!("Reading input at row {row}");

        self.bracket(|core| core.render_from(0))
    }

    /// Ends a read, leaving the cursor on the row after the buffer.
    pub(crate) fn release(&mut self) -> Result<()> {
        if self.state == EditorState::Idle {
            return Ok(());
        }

        let result = self.bracket(|core| {
            let end = core.position(core.buffer.total_len());
            core.move_to(end)?;
            if end.col != 0 || end.row == 0 {
                core.device.write_str("\r\n")?;
            }
            Ok(())
        });

        self.state = EditorState::Idle;
        self.buffer = LineBuffer::default();
        self.completion.reset();
        self.foreign_column = None;
        debug!("Input released");
        result
    }

    pub(crate) fn set_prompt(&mut self, prompt: &str) -> Result<()> {
        if self.state != EditorState::Reading {
            return Err(Error::NotReading);
        }

        self.buffer.set_prompt(prompt);
        self.bracket(|core| core.render_from(0))
    }

    pub(crate) fn apply(&mut self, action: EditorAction, completer: Option<&dyn Completer>) -> Result<()> {
        if !action.is_completion() {
            self.completion.reset();
        }

        self.bracket(|core| core.edit(action, completer))
    }

    fn edit(&mut self, action: EditorAction, completer: Option<&dyn Completer>) -> Result<()> {
        let index = self.buffer.index();
        let input_len = self.buffer.total_len() - self.buffer.prompt_len();

        match action {
            EditorAction::Insert(c) => {
                let from = self.buffer.cursor();
                self.buffer.insert(c);
                self.render_from(from)
            }
            EditorAction::Backspace => {
                if self.buffer.remove_before() {
                    self.render_from(self.buffer.cursor())?;
                }
                Ok(())
            }
            EditorAction::Delete => {
                if self.buffer.remove_at() {
                    self.render_from(self.buffer.cursor())?;
                }
                Ok(())
            }
            EditorAction::Left => self.move_index(index.checked_sub(1)),
            EditorAction::Right => self.move_index(Some(index + 1)),
            EditorAction::Home => self.move_index(Some(0)),
            EditorAction::End => self.move_index(Some(input_len)),
            EditorAction::DeleteToHome => {
                self.buffer.remove_to_start();
                self.render_from(self.buffer.prompt_len())
            }
            EditorAction::DeleteToEnd => {
                self.buffer.remove_to_end();
                self.render_from(self.buffer.cursor())
            }
            EditorAction::Clear => self.set_input(""),
            EditorAction::HistoryPrev => match self.history.prev().map(ToString::to_string) {
                Some(entry) => self.set_input(&entry),
                None => Ok(()),
            },
            EditorAction::HistoryNext => match self.history.next().map(ToString::to_string) {
                Some(entry) => self.set_input(&entry),
                None => Ok(()),
            },
            EditorAction::CompleteNext => self.complete(true, completer),
            EditorAction::CompletePrev => self.complete(false, completer),
            EditorAction::Cancel | EditorAction::Enter => Ok(()),
        }
    }

    fn move_index(&mut self, index: Option<usize>) -> Result<()> {
        if index.is_some_and(|index| self.buffer.set_index(index)) {
            self.place_cursor()?;
        }
        Ok(())
    }

    fn set_input(&mut self, text: &str) -> Result<()> {
        self.buffer.replace_input(text, text.chars().count());
        self.render_from(self.buffer.prompt_len())
    }

    fn complete(&mut self, forward: bool, completer: Option<&dyn Completer>) -> Result<()> {
        let Some(completer) = completer else {
            return Ok(());
        };

        let left = self.completion.snapshot(self.buffer.text_before_cursor());
        let mut spans = match_completion(&left);
        let Some(fragment) = spans.pop() else {
            return Ok(());
        };
        let context: Vec<String> = spans.into_iter().map(|span| span.text).collect();

        let quoted = fragment.text.starts_with('"');
        let find = trim_quotes(&fragment.text);
        let candidates = filter_candidates(completer.complete(&context, find), find);
        let Some(choice) = self.completion.step(&candidates, find, forward) else {
            return Ok(());
        };
        debug!("Completing {find:?} to {choice:?}");

        let replacement = if quoted || choice.contains(char::is_whitespace) {
            format!("\"{choice}\"")
        } else {
            choice
        };

        let mut text = left[..fragment.start].to_string();
        text.push_str(&replacement);
        let index = text.chars().count();
        text.push_str(&self.buffer.text_after_cursor());

        self.buffer.replace_input(&text, index);
        self.render_from(self.buffer.prompt_len())
    }

    /// Writes output that did not come from the editor.
    ///
    /// While reading, the buffer is erased, the text is written where the
    /// buffer started and the buffer is drawn again below it. Newlines always
    /// return to the first column. Incomplete
    /// UTF-8 at the end of `bytes` is held back until the rest arrives.
    pub(crate) fn write_foreign(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        let text = match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                text
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                text
            }
        };

        if text.is_empty() {
            return Ok(());
        }

        match self.state {
            EditorState::Idle => {
                self.device.write_str(&text.replace('\n', "\r\n"))?;
                Ok(self.device.flush()?)
            }
            EditorState::Reading => self.bracket(|core| core.interleave(&text)),
        }
    }

    fn interleave(&mut self, text: &str) -> Result<()> {
        self.move_to(Position::default())?;
        self.device.clear_from_cursor_down()?;
        let mut start = 0;
        if let Some(col) = self.foreign_column {
            self.device.set_cursor(col, to_u16(self.anchor - 1))?;
            start = usize::from(col);
        }

        self.device.write_str(&text.replace('\n', "\r\n"))?;

        // The device cannot tell a pending wrap from the last column, so the
        // end of the last line is measured with the width table.
        let (start, last_line) = match text.rfind('\n') {
            Some(i) => (0, &text[i + 1..]),
            None => (start, text),
        };
        let end = last_line
            .chars()
            .fold(Position { col: start, row: 0 }, |pos, c| {
                advance(pos, self.table.width(c), self.cols())
            });

        if end.col != 0 {
            self.foreign_column = Some(u16::try_from(end.col).unwrap_or(u16::MAX));
            self.device.write_str("\r\n")?;
        } else {
            self.foreign_column = None;
            if end.row > 0 && self.device.wrap_mode() == WrapMode::Deferred {
                self.device.write_str("\r\n")?;
            }
        }
        self.anchor = i64::from(self.device.cursor()?.1);

        self.render_from(0)
    }
}
