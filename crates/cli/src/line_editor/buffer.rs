//! The text being edited and its mapping to screen coordinates.
//!
//! The visible text is the prompt followed by the user's input. Positions are
//! counted in characters over the whole text, so the cursor index is always in
//! `prompt_len()..=total_len()`.

use super::width::WidthTable;

/// A screen cell relative to the row the buffer starts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

/// Moves `pos` past a character of `width` columns on a screen `cols` wide.
///
/// A character that does not fit on the current row starts the next one, and
/// reaching the last column moves to the start of the next row.
#[must_use]
pub fn advance(pos: Position, width: usize, cols: usize) -> Position {
    let cols = cols.max(1);
    if width == 0 {
        return pos;
    }

    let mut next = pos;
    if next.col + width > cols {
        next.col = 0;
        next.row += 1;
    }

    next.col += width;
    if next.col >= cols {
        next.col = 0;
        next.row += 1;
    }

    next
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    start: usize,
    index: usize,
    hidden: bool,
}

impl LineBuffer {
    /// A buffer showing `prompt` then `text`, with the cursor at the end.
    #[must_use]
    pub fn new(prompt: &str, text: &str, hidden: bool) -> Self {
        let mut chars: Vec<char> = prompt.chars().collect();
        let start = chars.len();
        chars.extend(text.chars());

        Self {
            index: chars.len(),
            chars,
            start,
            hidden,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        self.chars[..self.start].iter().collect()
    }

    /// The user's input, without the prompt.
    #[must_use]
    pub fn text(&self) -> String {
        self.chars[self.start..].iter().collect()
    }

    #[must_use]
    pub fn text_before_cursor(&self) -> String {
        self.chars[self.start..self.index].iter().collect()
    }

    #[must_use]
    pub fn text_after_cursor(&self) -> String {
        self.chars[self.index..].iter().collect()
    }

    /// The input as it would read after inserting `c` at the cursor.
    #[must_use]
    pub fn text_with_insert(&self, c: char) -> String {
        let mut text = self.text_before_cursor();
        text.push(c);
        text.push_str(&self.text_after_cursor());
        text
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[must_use]
    pub fn prompt_len(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        self.chars.len()
    }

    /// Cursor index over the whole text, prompt included.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.index
    }

    /// Cursor index within the input.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index - self.start
    }

    /// Moves the cursor within the input. Out of range indexes are ignored.
    pub fn set_index(&mut self, index: usize) -> bool {
        if index > self.chars.len() - self.start {
            return false;
        }
        self.index = self.start + index;
        true
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.index, c);
        self.index += 1;
    }

    /// Removes the character left of the cursor.
    pub fn remove_before(&mut self) -> bool {
        if self.index == self.start {
            return false;
        }
        self.index -= 1;
        self.chars.remove(self.index);
        true
    }

    /// Removes the character under the cursor.
    pub fn remove_at(&mut self) -> bool {
        if self.index == self.chars.len() {
            return false;
        }
        self.chars.remove(self.index);
        true
    }

    pub fn remove_to_start(&mut self) {
        self.chars.drain(self.start..self.index);
        self.index = self.start;
    }

    pub fn remove_to_end(&mut self) {
        self.chars.truncate(self.index);
    }

    /// Replaces the input, placing the cursor at `index` within it.
    pub fn replace_input(&mut self, text: &str, index: usize) {
        self.chars.truncate(self.start);
        self.chars.extend(text.chars());
        self.index = self.start + index.min(self.chars.len() - self.start);
    }

    /// Swaps the prompt, keeping the input and the cursor's place in it.
    pub fn set_prompt(&mut self, prompt: &str) {
        let index = self.index();
        let mut chars: Vec<char> = prompt.chars().collect();
        let start = chars.len();
        chars.extend_from_slice(&self.chars[self.start..]);

        self.chars = chars;
        self.start = start;
        self.index = start + index;
    }

    /// Column cost of the character at `i`; hidden input takes none.
    #[must_use]
    pub fn width_at(&self, i: usize, table: &dyn WidthTable) -> usize {
        if self.hidden && i >= self.start {
            return 0;
        }
        table.width(self.chars[i])
    }

    /// Where the text up to `upto` ends on a screen `cols` wide.
    #[must_use]
    pub fn position(&self, upto: usize, cols: usize, table: &dyn WidthTable) -> Position {
        (0..upto.min(self.chars.len())).fold(Position::default(), |pos, i| {
            advance(pos, self.width_at(i, table), cols)
        })
    }

    /// Text to write from `from` onwards; hidden input is not written.
    #[must_use]
    pub fn display_from(&self, from: usize) -> String {
        let end = if self.hidden {
            self.start.max(from)
        } else {
            self.chars.len()
        };
        self.chars[from.min(end)..end].iter().collect()
    }
}
