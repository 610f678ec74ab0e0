use unicode_width::UnicodeWidthStr;

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> u16 {
    s.width().min(u16::MAX as usize) as u16
}
