//! Find and replace over a [`TextSurface`].
//!
//! Searching runs forward from the caret and wraps to the top of the
//! document once when it falls off the end.

use std::ops::Range;

use crate::surface::{floor_char_boundary, TextSurface};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub case_sensitive: bool,
    pub whole_words: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FindOutcome {
    /// `wrapped` is set when the match was only found after restarting from
    /// the first line.
    Found { range: Range<usize>, wrapped: bool },
    NotFound,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaceAllReport {
    pub replaced: usize,
    pub wrapped: bool,
}

/// First match of `query` at or after byte offset `from`.
///
/// Matches never span lines, so a query containing a newline finds nothing.
pub fn find(text: &str, query: &str, from: usize, options: FindOptions) -> Option<Range<usize>> {
    find_in(text, query, from, text.len(), options)
}

/// Like [`find`], but the match must end at or before `limit`.
pub fn find_in(
    text: &str,
    query: &str,
    from: usize,
    limit: usize,
    options: FindOptions,
) -> Option<Range<usize>> {
    if query.is_empty() || query.contains('\n') || from > text.len() {
        return None;
    }
    let from = floor_char_boundary(text, from);
    let limit = limit.min(text.len());

    let mut starts = text[from..].char_indices().map(|(i, _)| from + i);
    starts.find_map(|start| {
        let end = match_at(text, start, query, options.case_sensitive)?;
        if end > limit {
            return None;
        }
        if options.whole_words && !is_word_bounded(text, start, end) {
            return None;
        }
        Some(start..end)
    })
}

/// End offset of a match of `query` starting exactly at `start`.
fn match_at(text: &str, start: usize, query: &str, case_sensitive: bool) -> Option<usize> {
    if case_sensitive {
        return text[start..].starts_with(query).then(|| start + query.len());
    }

    let mut haystack = text[start..].char_indices();
    let mut end = start;
    for q in query.chars() {
        let (i, c) = haystack.next()?;
        if c != q && !c.to_lowercase().eq(q.to_lowercase()) {
            return None;
        }
        end = start + i + c.len_utf8();
    }
    Some(end)
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Locate the next match from the end of the selection, wrapping once.
fn locate<S: TextSurface + ?Sized>(
    surface: &S,
    query: &str,
    options: FindOptions,
) -> FindOutcome {
    let from = surface.selection().end;
    if let Some(range) = find(surface.text(), query, from, options) {
        return FindOutcome::Found {
            range,
            wrapped: false,
        };
    }
    match find(surface.text(), query, 0, options) {
        Some(range) => FindOutcome::Found {
            range,
            wrapped: true,
        },
        None => FindOutcome::NotFound,
    }
}

/// A match that starts before `pos` and ends after it.
fn match_around(text: &str, query: &str, pos: usize, options: FindOptions) -> Option<Range<usize>> {
    // Per-char folding keeps the match as many chars long as the query.
    let reach = query.chars().count() * 4;
    let mut from = floor_char_boundary(text, pos.saturating_sub(reach));
    while let Some(range) = find(text, query, from, options) {
        if range.start >= pos {
            return None;
        }
        if range.end > pos {
            return Some(range);
        }
        from = range.start + text[range.start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// Select the next match after the caret.
pub fn find_next<S: TextSurface + ?Sized>(
    surface: &mut S,
    query: &str,
    options: FindOptions,
) -> FindOutcome {
    let outcome = locate(surface, query, options);
    if let FindOutcome::Found { range, .. } = &outcome {
        surface.set_selection(range.clone());
    }
    outcome
}

/// Replace the next match after the caret. On success the returned range
/// covers the inserted replacement and the caret sits after it.
pub fn replace_next<S: TextSurface + ?Sized>(
    surface: &mut S,
    query: &str,
    replacement: &str,
    options: FindOptions,
) -> FindOutcome {
    match locate(surface, query, options) {
        FindOutcome::Found { range, wrapped } => {
            let start = range.start;
            surface.replace_range(range, replacement);
            FindOutcome::Found {
                range: start..start + replacement.len(),
                wrapped,
            }
        }
        FindOutcome::NotFound => FindOutcome::NotFound,
    }
}

/// Replace every match, starting at the caret and wrapping to the top.
///
/// The second pass stops where the first one began, and scanning always
/// resumes after the inserted text, so each occurrence present before the
/// call is replaced at most once even when `replacement` contains `query`.
pub fn replace_all<S: TextSurface + ?Sized>(
    surface: &mut S,
    query: &str,
    replacement: &str,
    options: FindOptions,
) -> ReplaceAllReport {
    let mut report = ReplaceAllReport::default();
    if query.is_empty() {
        return report;
    }

    // A match the caret sits inside belongs to pass one.
    let caret = surface.selection().start;
    let origin = match_around(surface.text(), query, caret, options).map_or(caret, |r| r.start);

    surface.begin_edit_group();

    // Pass one: origin to end of document.
    let mut pos = origin;
    while let Some(range) = find(surface.text(), query, pos, options) {
        surface.replace_range(range.clone(), replacement);
        report.replaced += 1;
        pos = range.start + replacement.len();
    }

    if origin > 0 {
        report.wrapped = true;
        // Pass two: top of document up to the original start. Text before
        // `origin` has not moved, so `origin` is still the right bound
        // until the first replacement in this pass shifts it.
        let mut limit = origin;
        let mut pos = 0;
        while let Some(range) = find_in(surface.text(), query, pos, limit, options) {
            surface.replace_range(range.clone(), replacement);
            report.replaced += 1;
            pos = range.start + replacement.len();
            limit = (limit + replacement.len()).saturating_sub(range.len());
        }
    }

    surface.end_edit_group();

    log::debug!(
        "Replaced {} occurrence(s) of {:?} (wrapped: {})",
        report.replaced,
        query,
        report.wrapped
    );
    report
}
