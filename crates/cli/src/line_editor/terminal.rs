use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argline_core::config::DEFAULT_POLL_INTERVAL_MS;
use argline_core::error::{Error, Result};
use crossterm::event::{KeyCode, KeyEvent};
use log::{debug, warn};

use super::actions::EditorAction;
use super::completion::Completer;
use super::device::{CrosstermDevice, CrosstermKeys, KeySource, TerminalDevice, WrapMode};
use super::editor::{lock, EditorCore, EditorState};
use super::history::History;
use super::shared_writer::SharedWriter;
use super::width::WidthTable;

/// Cancels the read in progress from any thread.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Changes the prompt of the read in progress from any thread.
pub struct PromptHandle<D: TerminalDevice> {
    core: Arc<Mutex<EditorCore<D>>>,
}

impl<D: TerminalDevice> Clone for PromptHandle<D> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<D: TerminalDevice> PromptHandle<D> {
    /// Fails with [`Error::NotReading`] when no read is in progress.
    pub fn set_prompt(&self, prompt: &str) -> Result<()> {
        lock(&self.core).set_prompt(prompt)
    }
}

/// Keeps the terminal in raw mode for the duration of a read.
///
/// Dropping the guard releases the editor, so foreign output goes straight
/// to the terminal again whichever way the read ended.
pub struct ReadGuard<D: TerminalDevice> {
    core: Arc<Mutex<EditorCore<D>>>,
}

impl<D: TerminalDevice> ReadGuard<D> {
    fn start(core: Arc<Mutex<EditorCore<D>>>, prompt: &str, text: &str, hidden: bool) -> Result<Self> {
        let guard = Self { core };
        {
            let mut core = lock(&guard.core);
            core.enter_raw_mode()?;
            core.begin(prompt, text, hidden)?;
        }
        Ok(guard)
    }
}

impl<D: TerminalDevice> Drop for ReadGuard<D> {
    fn drop(&mut self) {
        let mut core = lock(&self.core);
        if let Err(e) = core.release() {
            warn!("Failed to release input: {e}");
        }
        if let Err(e) = core.leave_raw_mode() {
            warn!("Failed to leave raw mode: {e}");
        }
        debug!("Read finished");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    Text,
    Hidden,
    Integer,
    Float,
}

impl ReadMode {
    fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    fn keeps_history(self) -> bool {
        self == Self::Text
    }

    fn allows(self, action: EditorAction) -> bool {
        match action {
            EditorAction::HistoryPrev
            | EditorAction::HistoryNext
            | EditorAction::CompleteNext
            | EditorAction::CompletePrev => self == Self::Text,
            _ => true,
        }
    }

    /// Whether `text` may appear in the buffer while typing.
    fn accepts(self, text: &str, placeholder: &str) -> bool {
        fn partial<T: FromStr>(text: &str) -> bool {
            text.parse::<T>().is_ok() || format!("{text}0").parse::<T>().is_ok()
        }

        if text.is_empty() || text == placeholder {
            return true;
        }
        match self {
            Self::Text | Self::Hidden => true,
            Self::Integer => partial::<i64>(text),
            Self::Float => partial::<f64>(text),
        }
    }

    /// Whether Enter may commit `text`. Partial numbers such as `-` or `1e`
    /// are kept in the buffer until they parse.
    fn commits(self, text: &str, placeholder: &str) -> bool {
        if text.is_empty() || text == placeholder {
            return true;
        }
        match self {
            Self::Text | Self::Hidden => true,
            Self::Integer => text.parse::<i64>().is_ok(),
            Self::Float => text.parse::<f64>().is_ok(),
        }
    }
}

type CancelKeyHandler = Box<dyn Fn() -> bool + Send + Sync>;
type CancelledHandler = Box<dyn Fn() + Send + Sync>;

/// An interactive line editor on a terminal device.
///
/// Reads block the calling thread. Output written through
/// [`Terminal::shared_writer`] from other threads is shown above the line
/// being edited.
pub struct Terminal<D: TerminalDevice> {
    core: Arc<Mutex<EditorCore<D>>>,
    keys: Box<dyn KeySource>,
    completer: Option<Box<dyn Completer>>,
    cancel: CancelHandle,
    poll_interval: Duration,
    on_cancel_key_press: Option<CancelKeyHandler>,
    on_cancelled: Option<CancelledHandler>,
}

impl Terminal<CrosstermDevice> {
    /// An editor on the process's own terminal.
    #[must_use]
    pub fn stdio(wrap_mode: WrapMode) -> Self {
        Self::new(CrosstermDevice::new(wrap_mode), CrosstermKeys)
    }
}

impl<D: TerminalDevice> Terminal<D> {
    pub fn new(device: D, keys: impl KeySource + 'static) -> Self {
        Self {
            core: Arc::new(Mutex::new(EditorCore::new(device))),
            keys: Box::new(keys),
            completer: None,
            cancel: CancelHandle::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            on_cancel_key_press: None,
            on_cancelled: None,
        }
    }

    #[must_use]
    pub fn with_history(self, history: History) -> Self {
        *lock(&self.core).history_mut() = history;
        self
    }

    #[must_use]
    pub fn with_completer(mut self, completer: impl Completer + 'static) -> Self {
        self.completer = Some(Box::new(completer));
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_width_table(self, table: impl WidthTable + 'static) -> Self {
        lock(&self.core).set_width_table(Box::new(table));
        self
    }

    /// Called on Ctrl+C during a read; returning `true` ignores the key.
    #[must_use]
    pub fn on_cancel_key_press(mut self, handler: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.on_cancel_key_press = Some(Box::new(handler));
        self
    }

    /// Called whenever a read is cancelled, by key or through a [`CancelHandle`].
    #[must_use]
    pub fn on_cancelled(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancelled = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn shared_writer(&self) -> SharedWriter<D> {
        SharedWriter::new(Arc::clone(&self.core))
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn prompt_handle(&self) -> PromptHandle<D> {
        PromptHandle {
            core: Arc::clone(&self.core),
        }
    }

    #[must_use]
    pub fn state(&self) -> EditorState {
        lock(&self.core).state()
    }

    /// Committed lines, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.core).history().entries().to_vec()
    }

    pub fn add_history(&self, line: &str) {
        lock(&self.core).history_mut().add(line);
    }

    /// Fails with [`Error::NotReading`] when no read is in progress.
    pub fn set_prompt(&self, prompt: &str) -> Result<()> {
        lock(&self.core).set_prompt(prompt)
    }

    pub fn read_string(&mut self, prompt: &str) -> Result<String> {
        self.read_string_with(prompt, "", false)
    }

    /// Reads a line starting from `default`. Hidden input is not echoed and
    /// is never added to the history.
    pub fn read_string_with(&mut self, prompt: &str, default: &str, hidden: bool) -> Result<String> {
        let mode = if hidden { ReadMode::Hidden } else { ReadMode::Text };
        self.read_line(prompt, default, mode)
    }

    pub fn read_secret(&mut self, prompt: &str) -> Result<String> {
        self.read_string_with(prompt, "", true)
    }

    /// Reads an integer. Keys that would make the text unparsable are
    /// ignored, and so is Enter on a partial number; an empty line yields `None`.
    pub fn read_long(&mut self, prompt: &str, default: Option<i64>) -> Result<Option<i64>> {
        let placeholder = default.map(|value| value.to_string()).unwrap_or_default();
        let text = self.read_line(prompt, &placeholder, ReadMode::Integer)?;
        Ok(text.trim().parse().ok())
    }

    /// Reads a floating point number, filtered like [`Terminal::read_long`].
    pub fn read_double(&mut self, prompt: &str, default: Option<f64>) -> Result<Option<f64>> {
        let placeholder = default.map(|value| value.to_string()).unwrap_or_default();
        let text = self.read_line(prompt, &placeholder, ReadMode::Float)?;
        Ok(text.trim().parse().ok())
    }

    /// Waits for a single key among `filters`, or any key when `filters` is empty.
    pub fn read_key(&mut self, prompt: &str, filters: &[KeyCode]) -> Result<KeyEvent> {
        self.cancel.reset();
        let _guard = ReadGuard::start(Arc::clone(&self.core), prompt, "", false)?;

        loop {
            let Some(key) = self.next_key()? else {
                continue;
            };
            if EditorAction::from_key(&key) == Some(EditorAction::Cancel) {
                if self.suppress_cancel() {
                    continue;
                }
                return Err(self.cancelled());
            }
            if filters.is_empty() || filters.contains(&key.code) {
                return Ok(key);
            }
        }
    }

    fn read_line(&mut self, prompt: &str, initial: &str, mode: ReadMode) -> Result<String> {
        self.cancel.reset();
        let _guard = ReadGuard::start(Arc::clone(&self.core), prompt, initial, mode == ReadMode::Hidden)?;

        loop {
            let Some(key) = self.next_key()? else {
                continue;
            };
            let Some(action) = EditorAction::from_key(&key) else {
                continue;
            };
            if !mode.allows(action) {
                continue;
            }

            match action {
                EditorAction::Cancel => {
                    if self.suppress_cancel() {
                        continue;
                    }
                    return Err(self.cancelled());
                }
                EditorAction::Enter => {
                    let mut core = lock(&self.core);
                    let text = core.text();
                    if !mode.commits(&text, initial) {
                        continue;
                    }
                    if mode.keeps_history() {
                        core.history_mut().add(&text);
                    }
                    return Ok(text);
                }
                EditorAction::Insert(c) if mode.is_numeric() => {
                    let mut core = lock(&self.core);
                    if mode.accepts(&core.text_with_insert(c), initial) {
                        core.apply(action, None)?;
                    }
                }
                _ => lock(&self.core).apply(action, self.completer.as_deref())?,
            }
        }
    }

    /// Polls for the next key, failing once the read has been cancelled.
    fn next_key(&mut self) -> Result<Option<KeyEvent>> {
        if self.cancel.is_cancelled() {
            return Err(self.cancelled());
        }
        Ok(self.keys.poll_key(self.poll_interval)?)
    }

    fn suppress_cancel(&self) -> bool {
        self.on_cancel_key_press.as_ref().is_some_and(|handler| handler())
    }

    fn cancelled(&self) -> Error {
        debug!("Read cancelled");
        if let Some(handler) = &self.on_cancelled {
            handler();
        }
        Error::ReadCancelled
    }
}
