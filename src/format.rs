//! Inline bold/italic formatting.
//!
//! Formatting lives next to the text as byte-range spans and is only used by
//! the layouter; saved files stay plain text.

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Bold,
    Italic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharFormat {
    pub bold: bool,
    pub italic: bool,
}

impl CharFormat {
    fn get(&self, attr: Attribute) -> bool {
        match attr {
            Attribute::Bold => self.bold,
            Attribute::Italic => self.italic,
        }
    }

    fn set(&mut self, attr: Attribute, on: bool) {
        match attr {
            Attribute::Bold => self.bold = on,
            Attribute::Italic => self.italic = on,
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSpan {
    pub range: Range<usize>,
    pub format: CharFormat,
}

/// Non-overlapping, sorted, non-empty spans of non-plain formatting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatSpans {
    spans: Vec<FormatSpan>,
}

impl FormatSpans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatSpan> {
        self.spans.iter()
    }

    /// Format of the char starting at byte `pos`.
    pub fn format_at(&self, pos: usize) -> CharFormat {
        self.spans
            .iter()
            .find(|s| s.range.contains(&pos))
            .map(|s| s.format)
            .unwrap_or_default()
    }

    /// True when every byte in `range` carries `attr`.
    pub fn all_have(&self, range: Range<usize>, attr: Attribute) -> bool {
        if range.is_empty() {
            return false;
        }
        let mut covered = range.start;
        for span in &self.spans {
            if span.range.end <= covered {
                continue;
            }
            if span.range.start > covered || !span.format.get(attr) {
                return false;
            }
            covered = span.range.end;
            if covered >= range.end {
                return true;
            }
        }
        false
    }

    /// Flip `attr` over `range`: cleared if the whole range already has it,
    /// applied otherwise.
    pub fn toggle(&mut self, range: Range<usize>, attr: Attribute) {
        if range.is_empty() {
            return;
        }
        let on = !self.all_have(range.clone(), attr);
        self.set(range, attr, on);
    }

    /// Set or clear `attr` over `range`, leaving other attributes alone.
    pub fn set(&mut self, range: Range<usize>, attr: Attribute, on: bool) {
        if range.is_empty() {
            return;
        }

        // Cut existing spans at the range boundaries, then rewrite the inside.
        let mut out: Vec<FormatSpan> = Vec::with_capacity(self.spans.len() + 2);
        let mut inside: Vec<FormatSpan> = Vec::new();
        for span in self.spans.drain(..) {
            let r = span.range.clone();
            if r.end <= range.start || r.start >= range.end {
                out.push(span);
                continue;
            }
            if r.start < range.start {
                out.push(FormatSpan {
                    range: r.start..range.start,
                    format: span.format,
                });
            }
            if r.end > range.end {
                out.push(FormatSpan {
                    range: range.end..r.end,
                    format: span.format,
                });
            }
            inside.push(FormatSpan {
                range: r.start.max(range.start)..r.end.min(range.end),
                format: span.format,
            });
        }

        // Fill gaps inside the range with plain segments so every byte gets
        // the attribute applied.
        let mut cursor = range.start;
        let mut segments = Vec::new();
        for span in inside {
            if span.range.start > cursor {
                segments.push(FormatSpan {
                    range: cursor..span.range.start,
                    format: CharFormat::default(),
                });
            }
            cursor = span.range.end;
            segments.push(span);
        }
        if cursor < range.end {
            segments.push(FormatSpan {
                range: cursor..range.end,
                format: CharFormat::default(),
            });
        }

        for mut seg in segments {
            seg.format.set(attr, on);
            if !seg.format.is_plain() {
                out.push(seg);
            }
        }

        out.sort_by_key(|s| s.range.start);
        self.spans = merge_adjacent(out);
    }

    /// Shift spans after the text changed from `old` to `new`.
    ///
    /// The edit is located by the common prefix and suffix of both strings;
    /// spans inside the replaced region are cut, spans after it move.
    pub fn adjust(&mut self, old: &str, new: &str) {
        if self.spans.is_empty() || old == new {
            return;
        }
        let (start, old_end, new_end) = edit_region(old, new);
        let delta = new_end as isize - old_end as isize;

        let mut out = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            let r = span.range;
            let shift = |p: usize| (p as isize + delta) as usize;
            let range = if r.end <= start {
                r
            } else if r.start >= old_end {
                shift(r.start)..shift(r.end)
            } else {
                // Overlaps the edited region: keep what survives on either side.
                let head = r.start..start.max(r.start).min(r.end);
                let tail_start = old_end.max(r.start);
                let tail = if r.end > tail_start {
                    shift(tail_start)..shift(r.end)
                } else {
                    0..0
                };
                if !head.is_empty() && !tail.is_empty() {
                    out.push(FormatSpan {
                        range: head,
                        format: span.format,
                    });
                    tail
                } else if !head.is_empty() {
                    head
                } else {
                    tail
                }
            };
            if !range.is_empty() {
                out.push(FormatSpan {
                    range,
                    format: span.format,
                });
            }
        }
        out.sort_by_key(|s| s.range.start);
        self.spans = merge_adjacent(out);
    }
}

fn merge_adjacent(spans: Vec<FormatSpan>) -> Vec<FormatSpan> {
    let mut merged: Vec<FormatSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(last) = merged.last_mut() {
            if last.range.end == span.range.start && last.format == span.format {
                last.range.end = span.range.end;
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

/// Returns `(start, old_end, new_end)` of the region that differs.
fn edit_region(old: &str, new: &str) -> (usize, usize, usize) {
    let prefix = old
        .char_indices()
        .zip(new.chars())
        .find(|((_, a), b)| a != b)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| old.len().min(new.len()));
    // `prefix` may exceed new.len() only when old is longer and matched fully.
    let prefix = prefix.min(new.len());

    let max_suffix = (old.len() - prefix).min(new.len() - prefix);
    let suffix = old[prefix..]
        .chars()
        .rev()
        .zip(new[prefix..].chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .scan(0usize, |acc, len| {
            *acc += len;
            Some(*acc)
        })
        .take_while(|&total| total <= max_suffix)
        .last()
        .unwrap_or(0);

    (prefix, old.len() - suffix, new.len() - suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(spans: &FormatSpans) -> Vec<(Range<usize>, bool, bool)> {
        spans
            .iter()
            .map(|s| (s.range.clone(), s.format.bold, s.format.italic))
            .collect()
    }

    #[test]
    fn toggle_applies_then_clears() {
        let mut spans = FormatSpans::new();
        spans.toggle(2..6, Attribute::Bold);
        assert_eq!(ranges(&spans), vec![(2..6, true, false)]);
        assert!(spans.all_have(3..5, Attribute::Bold));

        spans.toggle(2..6, Attribute::Bold);
        assert!(spans.is_empty());
    }

    #[test]
    fn partial_selection_is_made_uniform() {
        let mut spans = FormatSpans::new();
        spans.toggle(0..3, Attribute::Bold);
        // 2..6 is only partly bold, so the toggle turns all of it bold
        spans.toggle(2..6, Attribute::Bold);
        assert_eq!(ranges(&spans), vec![(0..6, true, false)]);
    }

    #[test]
    fn attributes_are_independent() {
        let mut spans = FormatSpans::new();
        spans.toggle(0..4, Attribute::Bold);
        spans.toggle(2..6, Attribute::Italic);
        assert_eq!(
            ranges(&spans),
            vec![(0..2, true, false), (2..4, true, true), (4..6, false, true)]
        );

        spans.toggle(0..4, Attribute::Bold);
        assert_eq!(ranges(&spans), vec![(2..6, false, true)]);
        assert_eq!(spans.format_at(3), CharFormat { bold: false, italic: true });
        assert_eq!(spans.format_at(7), CharFormat::default());
    }

    #[test]
    fn empty_range_is_ignored() {
        let mut spans = FormatSpans::new();
        spans.toggle(3..3, Attribute::Italic);
        assert!(spans.is_empty());
        assert!(!spans.all_have(3..3, Attribute::Italic));
    }

    #[test]
    fn insertion_before_span_shifts_it() {
        let mut spans = FormatSpans::new();
        spans.set(6..11, Attribute::Bold, true);
        spans.adjust("hello world", "oh, hello world");
        assert_eq!(ranges(&spans), vec![(10..15, true, false)]);
    }

    #[test]
    fn insertion_after_span_leaves_it() {
        let mut spans = FormatSpans::new();
        spans.set(0..5, Attribute::Italic, true);
        spans.adjust("hello world", "hello world!");
        assert_eq!(ranges(&spans), vec![(0..5, false, true)]);
    }

    #[test]
    fn deleting_inside_span_shrinks_it() {
        let mut spans = FormatSpans::new();
        spans.set(0..11, Attribute::Bold, true);
        spans.adjust("hello world", "helloworld");
        assert_eq!(ranges(&spans), vec![(0..10, true, false)]);
    }

    #[test]
    fn deleting_whole_span_removes_it() {
        let mut spans = FormatSpans::new();
        spans.set(6..11, Attribute::Bold, true);
        spans.adjust("hello world", "hello ");
        assert!(spans.is_empty());
    }

    #[test]
    fn edit_region_handles_repeated_chars() {
        assert_eq!(edit_region("aaa", "aaaa"), (3, 3, 4));
        assert_eq!(edit_region("abc", "abc"), (3, 3, 3));
        assert_eq!(edit_region("abXc", "abc"), (2, 3, 2));
        assert_eq!(edit_region("云记", "云云记"), (3, 3, 6));
    }
}
