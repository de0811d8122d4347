//! The capability interface editing operations are written against.
//!
//! The text widget owns rendering and keyboard editing; everything else
//! (search, replace, formatting) only needs to read the text, move the
//! selection and splice ranges. All offsets are byte offsets into `text()`.

use std::ops::Range;

pub trait TextSurface {
    fn text(&self) -> &str;

    /// Current selection. An empty range is a plain caret.
    fn selection(&self) -> Range<usize>;

    fn set_selection(&mut self, range: Range<usize>);

    /// Replace `range` with `with`, leaving the caret right after the
    /// inserted text.
    fn replace_range(&mut self, range: Range<usize>, with: &str);

    /// Edits until the matching [`TextSurface::end_edit_group`] undo as one
    /// step. Groups may nest.
    fn begin_edit_group(&mut self) {}

    fn end_edit_group(&mut self) {}

    fn selected_text(&self) -> &str {
        let range = self.selection();
        self.text().get(range).unwrap_or("")
    }

    fn caret(&self) -> usize {
        self.selection().end
    }

    fn has_selection(&self) -> bool {
        !self.selection().is_empty()
    }
}

/// Byte offset of the `char_idx`-th char, clamped to the end of `text`.
pub fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Number of chars before byte offset `byte_idx`.
pub fn byte_to_char(text: &str, byte_idx: usize) -> usize {
    let byte_idx = floor_char_boundary(text, byte_idx);
    text[..byte_idx].chars().count()
}

/// Largest char boundary that is `<= idx`.
pub fn floor_char_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// 1-based (line, column) of byte offset `byte_idx`; columns count chars.
pub fn line_col(text: &str, byte_idx: usize) -> (usize, usize) {
    let byte_idx = floor_char_boundary(text, byte_idx);
    let before = &text[..byte_idx];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}

/// Clamp a range to `text` and snap both ends onto char boundaries.
pub fn clamp_range(text: &str, range: Range<usize>) -> Range<usize> {
    let start = floor_char_boundary(text, range.start.min(range.end));
    let end = floor_char_boundary(text, range.end.max(range.start));
    start..end
}
