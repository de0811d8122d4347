use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{EditorError, Result};
use crate::format::{Attribute, FormatSpans};
use crate::surface::{clamp_range, line_col, TextSurface};

const UNDO_LIMIT: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEnding {
    Crlf,
    Lf,
    Cr,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
        }
    }

    fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::Crlf
        } else if content.contains('\r') {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }
}

/// What the right side of the status bar reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentStatus {
    Unmodified,
    Opened,
    Saved,
    Modified,
}

impl DocumentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Unmodified => "Unmodified",
            DocumentStatus::Opened => "Opened",
            DocumentStatus::Saved => "Saved",
            DocumentStatus::Modified => "Modified",
        }
    }
}

#[derive(Clone, Debug)]
struct Snapshot {
    content: String,
    selection: Range<usize>,
    formats: FormatSpans,
}

/// One plain-text document: its text, where it lives on disk and its edit
/// history. Text is kept with `\n` line endings while editing.
#[derive(Debug)]
pub struct Document {
    content: String,
    path: Option<PathBuf>,
    selection: Range<usize>,
    /// The moving end of the selection; either bound of `selection`.
    caret: usize,
    modified: bool,
    status: DocumentStatus,
    line_ending: LineEnding,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// State before the first edit of an open group, and the nesting depth.
    group: Option<(Snapshot, usize)>,
    formats: FormatSpans,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            content: String::new(),
            path: None,
            selection: 0..0,
            caret: 0,
            modified: false,
            status: DocumentStatus::Unmodified,
            line_ending: LineEnding::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            group: None,
            formats: FormatSpans::new(),
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Read `path` as UTF-8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| EditorError::io(path, e))?;
        let mut content = String::from_utf8(bytes).map_err(|source| EditorError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let line_ending = LineEnding::detect(&content);
        if line_ending != LineEnding::Lf {
            content = content.replace("\r\n", "\n").replace('\r', "\n");
        }

        log::info!("Opened {} ({} bytes)", path.display(), content.len());
        Ok(Self {
            content,
            path: Some(path.to_path_buf()),
            status: DocumentStatus::Opened,
            line_ending,
            ..Self::default()
        })
    }

    /// Write the text back to its path.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(EditorError::NoPath)?;

        let content_to_save = if self.line_ending == LineEnding::Lf {
            std::borrow::Cow::Borrowed(&self.content)
        } else {
            std::borrow::Cow::Owned(self.content.replace('\n', self.line_ending.as_str()))
        };

        let mut file = fs::File::create(&path).map_err(|e| EditorError::io(&path, e))?;
        file.write_all(content_to_save.as_bytes())
            .map_err(|e| EditorError::io(&path, e))?;

        self.modified = false;
        self.status = DocumentStatus::Saved;
        log::info!("Saved {}", path.display());
        Ok(())
    }

    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.path = Some(path.into());
        self.save()
    }

    /// Drop everything, e.g. after a failed open.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Mutable text for the widget to edit in place. Callers must report
    /// the change through [`Document::record_edit`].
    pub fn content_mut(&mut self) -> &mut String {
        &mut self.content
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn formats(&self) -> &FormatSpans {
        &self.formats
    }

    /// Number of lines, counting the empty line after a trailing newline.
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// 1-based (line, column) of the caret.
    pub fn cursor_position(&self) -> (usize, usize) {
        line_col(&self.content, self.caret)
    }

    /// The widget changed the text from `previous` to the current content.
    pub fn record_edit(&mut self, previous: String, previous_selection: Range<usize>) {
        if previous == self.content {
            return;
        }
        let before = Snapshot {
            content: previous,
            selection: previous_selection,
            formats: self.formats.clone(),
        };
        self.formats.adjust(&before.content, &self.content);
        self.push_undo(before);
        self.mark_modified();
    }

    /// Mirror the widget's selection without touching history. `caret` is
    /// the end the user is moving.
    pub fn sync_selection(&mut self, range: Range<usize>, caret: usize) {
        self.selection = clamp_range(&self.content, range);
        self.caret = if caret <= self.selection.start {
            self.selection.start
        } else {
            self.selection.end
        };
    }

    fn mark_modified(&mut self) {
        self.modified = true;
        self.status = DocumentStatus::Modified;
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            content: self.content.clone(),
            selection: self.selection.clone(),
            formats: self.formats.clone(),
        }
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        // Inside a group the state from before the group is the only step.
        if self.group.is_some() {
            return;
        }
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        if self.undo_stack.len() > UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let old = std::mem::replace(&mut self.content, snapshot.content);
        self.formats = snapshot.formats;
        self.selection = clamp_range(&self.content, snapshot.selection);
        self.caret = self.selection.end;
        if old != self.content {
            self.mark_modified();
        }
    }

    pub fn undo(&mut self) {
        if let Some(prev) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(prev);
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(next);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Toggle bold or italic on the selection. Returns false when nothing is
    /// selected.
    pub fn toggle_format(&mut self, attr: Attribute) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.push_undo(self.snapshot());
        self.formats.toggle(self.selection.clone(), attr);
        true
    }
}

impl TextSurface for Document {
    fn text(&self) -> &str {
        &self.content
    }

    fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_selection(&mut self, range: Range<usize>) {
        self.selection = clamp_range(&self.content, range);
        self.caret = self.selection.end;
    }

    fn replace_range(&mut self, range: Range<usize>, with: &str) {
        let range = clamp_range(&self.content, range);
        let before = self.snapshot();
        self.content.replace_range(range.clone(), with);
        self.formats.adjust(&before.content, &self.content);
        self.push_undo(before);
        let caret = range.start + with.len();
        self.selection = caret..caret;
        self.caret = caret;
        self.mark_modified();
    }

    fn begin_edit_group(&mut self) {
        match &mut self.group {
            Some((_, depth)) => *depth += 1,
            None => self.group = Some((self.snapshot(), 1)),
        }
    }

    fn end_edit_group(&mut self) {
        let Some((before, depth)) = self.group.take() else {
            return;
        };
        if depth > 1 {
            self.group = Some((before, depth - 1));
        } else if before.content != self.content || before.formats != self.formats {
            self.push_undo(before);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_reads_utf8_and_normalizes_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "第一行\r\nsecond\r\n").unwrap();

        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.content(), "第一行\nsecond\n");
        assert_eq!(doc.line_ending(), LineEnding::Crlf);
        assert_eq!(doc.status(), DocumentStatus::Opened);
        assert!(!doc.is_modified());
        assert_eq!(doc.file_name().as_deref(), Some("notes.txt"));
        assert_eq!(doc.line_count(), 3);
    }

    #[test]
    fn save_restores_original_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.txt");
        fs::write(&path, "a\r\nb").unwrap();

        let mut doc = Document::open(&path).unwrap();
        doc.replace_range(3..3, "c");
        assert!(doc.is_modified());
        doc.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\r\nbc");
        assert_eq!(doc.status(), DocumentStatus::Saved);
        assert!(!doc.is_modified());
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, EditorError::NotFound(_)));
        assert_eq!(err.title(), "File Error");
    }

    #[test]
    fn open_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0x66, 0x6f, 0xf6]).unwrap();
        let err = Document::open(&path).unwrap_err();
        assert!(matches!(err, EditorError::Decode { .. }));
        assert_eq!(err.title(), "Error");
    }

    #[test]
    fn save_without_path_fails() {
        let mut doc = Document::from_text("draft");
        assert!(matches!(doc.save(), Err(EditorError::NoPath)));
    }

    #[test]
    fn save_as_sets_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut doc = Document::from_text("hello\n");
        doc.save_as(&path).unwrap();
        assert_eq!(doc.path(), Some(path.as_path()));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "hello".to_string() + LineEnding::default().as_str());
    }

    #[test]
    fn undo_and_redo_restore_text_and_selection() {
        let mut doc = Document::from_text("hello");
        doc.set_selection(5..5);
        doc.replace_range(5..5, " world");
        assert_eq!(doc.content(), "hello world");
        assert_eq!(doc.selection(), 11..11);

        doc.undo();
        assert_eq!(doc.content(), "hello");
        assert_eq!(doc.selection(), 5..5);
        assert!(doc.can_redo());

        doc.redo();
        assert_eq!(doc.content(), "hello world");
        assert!(!doc.can_redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut doc = Document::from_text("abc");
        doc.replace_range(0..1, "x");
        doc.undo();
        assert!(doc.can_redo());
        doc.replace_range(0..0, "y");
        assert!(!doc.can_redo());
    }

    #[test]
    fn undo_history_is_capped() {
        let mut doc = Document::new();
        for i in 0..(UNDO_LIMIT + 20) {
            let end = doc.content().len();
            doc.replace_range(end..end, &i.to_string());
        }
        let mut undone = 0;
        while doc.can_undo() {
            doc.undo();
            undone += 1;
        }
        assert_eq!(undone, UNDO_LIMIT);
    }

    #[test]
    fn record_edit_marks_modified_and_ignores_no_ops() {
        let mut doc = Document::from_text("abc");
        doc.record_edit("abc".into(), 0..0);
        assert!(!doc.is_modified());

        doc.content_mut().push('d');
        doc.record_edit("abc".into(), 3..3);
        assert!(doc.is_modified());
        assert_eq!(doc.status(), DocumentStatus::Modified);
        doc.undo();
        assert_eq!(doc.content(), "abc");
    }

    #[test]
    fn cursor_position_follows_the_moving_end() {
        let mut doc = Document::from_text("one\ntwo\nthree");
        doc.sync_selection(4..6, 6);
        assert_eq!(doc.cursor_position(), (2, 3));

        // Shift+Left from the end of "two": the caret is the start.
        doc.sync_selection(4..7, 4);
        assert_eq!(doc.selection(), 4..7);
        assert_eq!(doc.cursor_position(), (2, 1));
        assert_eq!(doc.caret(), 4);
    }

    #[test]
    fn toggle_format_needs_a_selection() {
        let mut doc = Document::from_text("bold move");
        assert!(!doc.toggle_format(Attribute::Bold));
        doc.set_selection(0..4);
        assert!(doc.toggle_format(Attribute::Bold));
        assert!(doc.formats().format_at(2).bold);

        doc.replace_range(0..0, ">> ");
        assert!(doc.formats().format_at(5).bold);
        assert!(!doc.formats().format_at(0).bold);
    }

    #[test]
    fn format_toggles_are_undoable() {
        let mut doc = Document::from_text("bold move");
        doc.set_selection(0..4);
        doc.toggle_format(Attribute::Italic);
        assert!(doc.formats().format_at(1).italic);
        assert!(!doc.is_modified());

        doc.undo();
        assert!(doc.formats().is_empty());
        assert_eq!(doc.content(), "bold move");
        assert!(!doc.is_modified());

        doc.redo();
        assert!(doc.formats().format_at(1).italic);
    }

    #[test]
    fn undo_restores_formats_removed_by_an_edit() {
        let mut doc = Document::from_text("bold move");
        doc.set_selection(0..4);
        doc.toggle_format(Attribute::Bold);
        doc.replace_range(0..4, "");
        assert!(doc.formats().is_empty());

        doc.undo();
        assert_eq!(doc.content(), "bold move");
        assert!(doc.formats().format_at(0).bold);
    }

    #[test]
    fn edit_groups_undo_as_one_step_and_nest() {
        let mut doc = Document::from_text("abc");
        doc.begin_edit_group();
        doc.replace_range(0..1, "x");
        doc.begin_edit_group();
        doc.replace_range(1..2, "y");
        doc.end_edit_group();
        doc.replace_range(2..3, "z");
        doc.end_edit_group();
        assert_eq!(doc.content(), "xyz");

        doc.undo();
        assert_eq!(doc.content(), "abc");
        assert!(!doc.can_undo());
    }
}
