use log::debug;

/// Previously committed lines, oldest first, with a browsing cursor.
///
/// The cursor sits one past the last entry while the user is typing a fresh
/// line, and moves back into the list with [`History::prev`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    max_size: Option<usize>,
}

impl History {
    #[must_use]
    pub fn new(max_size: Option<usize>) -> Self {
        Self::with_entries(Vec::new(), max_size)
    }

    /// History preloaded with `entries`, keeping only the newest `max_size`.
    #[must_use]
    pub fn with_entries(entries: Vec<String>, max_size: Option<usize>) -> Self {
        let mut history = Self {
            entries: Vec::with_capacity(entries.len()),
            cursor: 0,
            max_size,
        };
        for entry in entries {
            history.add(&entry);
        }
        history
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends `line`. An equal earlier entry is moved to the end instead of
    /// duplicated, and empty lines are ignored. Resets the cursor.
    pub fn add(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.entries.retain(|entry| entry != line);
            self.entries.push(line.to_string());

            if let Some(max_size) = self.max_size {
                let excess = self.entries.len().saturating_sub(max_size);
                if excess > 0 {
                    debug!("Dropping {excess} oldest history entries");
                    self.entries.drain(..excess);
                }
            }
        }

        self.reset_cursor();
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }

    /// Steps back to the previous entry.
    ///
    /// At the first entry nothing happens, except that a single-entry history
    /// selects its entry again.
    pub fn prev(&mut self) -> Option<&str> {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else if self.entries.len() != 1 {
            return None;
        }
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Steps forward to the next entry; nothing happens past the last one.
    pub fn next(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).map(String::as_str)
    }
}
