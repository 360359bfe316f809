use unicode_width::UnicodeWidthChar;

/// Column cost of a character on screen.
///
/// The same table is used for cursor placement and for wrap detection, so the
/// two can never disagree.
pub trait WidthTable: Send {
    fn width(&self, c: char) -> usize;
}

/// Widths from the Unicode East Asian Width tables; control characters take no column.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeWidthTable;

impl WidthTable for UnicodeWidthTable {
    fn width(&self, c: char) -> usize {
        if c.is_control() {
            return 0;
        }
        c.width().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_widths() {
        let table = UnicodeWidthTable;
        assert_eq!(table.width('a'), 1);
        assert_eq!(table.width('한'), 2);
        assert_eq!(table.width('\u{7}'), 0);
    }
}
