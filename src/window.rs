//! One editor window: menus, text view, status bar and the dialogs that
//! belong to it. Every action goes through [`EditorWindow::dispatch`].

use std::path::{Path, PathBuf};

use eframe::egui;
use rfd::FileDialog;

use crate::app::AppContext;
use crate::commands::{Command, SHORTCUTS};
use crate::config::clamp_font_size;
use crate::dialogs::{
    CloseChoice, CloseConfirmationDialog, ColorDialog, ColorTarget, FindMode, FindReplaceDialog,
    FontDialog, FontDialogAction, MessageQueue,
};
use crate::editor::Document;
use crate::format::Attribute;
use crate::search::{self, FindOutcome};
use crate::surface::TextSurface;
use crate::ui;
use crate::view::TextView;

const WRAPPED_NOTICE: &str = "Search restarted from the first line";

/// What the window asks of the application after a frame.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WindowRequests {
    pub new_window: bool,
    /// The user answered "Cancel" to the close confirmation.
    pub close_cancelled: bool,
}

/// Whether the chord for `command` should run given the focused widget.
/// History and format chords typed into another field (the find box, say)
/// stay with that field.
pub fn shortcut_applies(command: Command, focused: Option<egui::Id>, text_view: egui::Id) -> bool {
    !command.edits_document() || focused.map_or(true, |id| id == text_view)
}

pub struct EditorWindow {
    pub id: uuid::Uuid,
    document: Document,
    view: TextView,
    path_message: String,
    find_dialog: FindReplaceDialog,
    messages: MessageQueue,
    close_confirmation: CloseConfirmationDialog,
    color_dialog: ColorDialog,
    font_dialog: FontDialog,
    allow_close: bool,
    /// Leave close requests to the application this frame.
    pub defer_close: bool,
    closed: bool,
}

impl EditorWindow {
    pub fn new(app: &AppContext) -> Self {
        let id = uuid::Uuid::new_v4();
        log::debug!("New editor window {}", id);
        Self {
            id,
            document: Document::new(),
            view: TextView::new(egui::Id::new(("yunji_text", id)), &app.settings),
            path_message: String::new(),
            find_dialog: FindReplaceDialog::default(),
            messages: MessageQueue::default(),
            close_confirmation: CloseConfirmationDialog::default(),
            color_dialog: ColorDialog::default(),
            font_dialog: FontDialog::default(),
            allow_close: false,
            defer_close: false,
            closed: false,
        }
    }

    pub fn viewport_id(&self) -> egui::ViewportId {
        egui::ViewportId::from_hash_of(self.id)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Set once the window has agreed to close.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn open_path(&mut self, path: &Path) {
        match Document::open(path) {
            Ok(document) => {
                self.document = document;
                self.path_message = format!("Opened file: {}", path.display());
                self.view.request_selection(0..0);
            }
            Err(e) => {
                self.messages.error(e.title(), e.to_string());
                self.document.clear();
                self.path_message = "Current path: ".to_string();
                self.view.request_selection(0..0);
            }
        }
    }

    fn open_dialog(&mut self) {
        let picked = FileDialog::new()
            .set_title("Open File")
            .add_filter("Text files (*.txt)", &["txt"])
            .add_filter("All files", &["*"])
            .pick_file();
        if let Some(path) = picked {
            self.open_path(&path);
        }
    }

    /// Save to the current path, asking for one when there is none.
    /// Returns true when the text reached the disk.
    fn save(&mut self) -> bool {
        let Some(path) = self.document.path().map(Path::to_path_buf) else {
            return self.save_as();
        };
        match self.document.save() {
            Ok(()) => {
                self.path_message = format!("Saved file: {}", path.display());
                true
            }
            Err(e) => {
                self.messages.error(e.title(), e.to_string());
                false
            }
        }
    }

    fn save_as(&mut self) -> bool {
        let Some(path) = pick_save_path(self.document.file_name()) else {
            return false;
        };
        match self.document.save_as(&path) {
            Ok(()) => {
                self.path_message = format!("Saved as: {}", path.display());
                true
            }
            Err(e) => {
                self.messages.error(e.title(), e.to_string());
                false
            }
        }
    }

    fn copy_selection(&mut self) -> bool {
        let text = self.document.selected_text().to_string();
        if text.is_empty() {
            return false;
        }
        match arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Clipboard write failed: {}", e);
                false
            }
        }
    }

    fn paste(&mut self) {
        let text = match arboard::Clipboard::new().and_then(|mut c| c.get_text()) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Clipboard read failed: {}", e);
                return;
            }
        };
        // The text area has no line ending other than '\n'.
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let selection = self.document.selection();
        self.document.replace_range(selection, &text);
        self.view.request_selection(self.document.selection());
    }

    fn report_outcome(&mut self, outcome: FindOutcome, query: &str) {
        match outcome {
            FindOutcome::Found { range, wrapped } => {
                if wrapped {
                    self.messages.info(" ", WRAPPED_NOTICE);
                }
                self.view.request_selection(range);
            }
            FindOutcome::NotFound => {
                if self.document.selection().end > 0 {
                    self.messages.info(" ", WRAPPED_NOTICE);
                }
                self.messages.info("Find", format!("Cannot find \"{}\"", query));
            }
        }
    }

    pub fn dispatch(&mut self, command: Command, app: &mut AppContext, requests: &mut WindowRequests) {
        log::debug!("Window {}: {:?}", self.id, command);
        match command {
            Command::NewWindow => requests.new_window = true,
            Command::Open => self.open_dialog(),
            Command::Save => {
                self.save();
            }
            Command::SaveAs => {
                self.save_as();
            }
            Command::Undo | Command::Redo => {
                if command == Command::Undo {
                    self.document.undo();
                } else {
                    self.document.redo();
                }
                self.view.request_selection(self.document.selection());
            }
            Command::Cut => {
                if self.copy_selection() {
                    let selection = self.document.selection();
                    self.document.replace_range(selection, "");
                    self.view.request_selection(self.document.selection());
                }
            }
            Command::Copy => {
                self.copy_selection();
            }
            Command::Paste => self.paste(),
            Command::Find | Command::Replace => {
                let mode = if command == Command::Find {
                    FindMode::Find
                } else {
                    FindMode::Replace
                };
                let initial = self.document.selected_text().to_string();
                self.find_dialog.open(mode, &initial);
            }
            Command::FindNext => {
                let query = self.find_dialog.query.clone();
                if query.is_empty() {
                    return;
                }
                let outcome =
                    search::find_next(&mut self.document, &query, self.find_dialog.options());
                self.report_outcome(outcome, &query);
            }
            Command::ReplaceNext => {
                let query = self.find_dialog.query.clone();
                if query.is_empty() {
                    return;
                }
                let outcome = search::replace_next(
                    &mut self.document,
                    &query,
                    &self.find_dialog.replace_with,
                    self.find_dialog.options(),
                );
                let outcome = match outcome {
                    // Leave the caret after the replacement rather than
                    // selecting it.
                    FindOutcome::Found { range, wrapped } => FindOutcome::Found {
                        range: range.end..range.end,
                        wrapped,
                    },
                    other => other,
                };
                self.report_outcome(outcome, &query);
            }
            Command::ReplaceAll => {
                let query = self.find_dialog.query.clone();
                if query.is_empty() {
                    return;
                }
                let report = search::replace_all(
                    &mut self.document,
                    &query,
                    &self.find_dialog.replace_with,
                    self.find_dialog.options(),
                );
                if report.wrapped {
                    self.messages.info(" ", WRAPPED_NOTICE);
                }
                if report.replaced == 0 {
                    self.messages.info("Find", format!("Cannot find \"{}\"", query));
                } else {
                    self.messages.info(
                        "Replace",
                        format!("Replaced {} occurrence(s)", report.replaced),
                    );
                }
                self.view.request_selection(self.document.selection());
            }
            Command::Bold | Command::Italic => {
                let attr = if command == Command::Bold {
                    Attribute::Bold
                } else {
                    Attribute::Italic
                };
                if !self.document.toggle_format(attr) {
                    log::debug!("{:?} ignored: nothing selected", attr);
                }
            }
            Command::TextColor => {
                let current = self
                    .view
                    .text_color
                    .unwrap_or(egui::Visuals::light().text_color());
                self.color_dialog.open(ColorTarget::Text, current);
            }
            Command::LineNumberColor => {
                self.color_dialog
                    .open(ColorTarget::LineNumbers, self.view.gutter.number_color);
            }
            Command::ToggleLineNumbers => {
                self.view.gutter.visible = !self.view.gutter.visible;
                app.remember(&self.view);
            }
            Command::ToggleWordWrap => {
                self.view.word_wrap = !self.view.word_wrap;
                app.remember(&self.view);
            }
            Command::FontSettings => {
                self.font_dialog
                    .open(&self.view.font_family, self.view.font_size);
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context, app: &mut AppContext, requests: &mut WindowRequests) {
        let focused = ctx.memory(|m| m.focused());
        for (shortcut, command) in SHORTCUTS {
            if command.handled_by_widget() || !shortcut_applies(*command, focused, self.view.id()) {
                continue;
            }
            if ctx.input_mut(|i| i.consume_shortcut(shortcut)) {
                self.dispatch(*command, app, requests);
            }
        }
    }

    fn handle_close(&mut self, ctx: &egui::Context, requests: &mut WindowRequests) {
        if !self.defer_close && ctx.input(|i| i.viewport().close_requested()) {
            if self.document.is_modified() && !self.allow_close {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.close_confirmation.open = true;
            } else {
                log::debug!("Closing window {}", self.id);
                self.closed = true;
            }
        }

        match self.close_confirmation.show(ctx) {
            Some(CloseChoice::Save) => {
                if self.save() {
                    self.allow_close = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
            Some(CloseChoice::Discard) => {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Some(CloseChoice::Cancel) => requests.close_cancelled = true,
            None => {}
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context, app: &mut AppContext, requests: &mut WindowRequests) {
        if let Some(command) = self.find_dialog.show(ctx) {
            self.dispatch(command, app, requests);
        }

        if let Some((target, color)) = self.color_dialog.show(ctx) {
            match target {
                ColorTarget::Text => self.view.text_color = Some(color),
                ColorTarget::LineNumbers => self.view.gutter.number_color = color,
            }
            app.remember(&self.view);
        }

        let families = app.families();
        match self.font_dialog.show(ctx, &families) {
            Some(FontDialogAction::Apply { family, size }) => {
                self.view.font_family = family;
                self.view.font_size = clamp_font_size(size);
                app.remember(&self.view);
            }
            Some(FontDialogAction::LoadFontFile) => {
                if let Some(path) = pick_font_file() {
                    match app.load_font_file(ctx, &path) {
                        Ok(family) => self.font_dialog.select_family(&family),
                        Err(e) => self
                            .messages
                            .error("Error", format!("Cannot load font: {:#}", e)),
                    }
                }
            }
            None => {}
        }

        self.messages.show(ctx);
    }

    /// Draw the window into `ctx` (the root viewport or this window's own).
    pub fn show(&mut self, ctx: &egui::Context, app: &mut AppContext) -> WindowRequests {
        let mut requests = WindowRequests::default();

        self.handle_close(ctx, &mut requests);
        self.handle_shortcuts(ctx, app, &mut requests);

        let menu_command = egui::TopBottomPanel::top(self.view_id("menu_bar"))
            .show(ctx, |ui| ui::menu_bar(ui, &self.view))
            .inner;
        if let Some(command) = menu_command {
            self.dispatch(command, app, &mut requests);
        }

        let file_name = self.document.file_name();
        egui::TopBottomPanel::top(self.view_id("file_name"))
            .show_separator_line(false)
            .show(ctx, |ui| ui::file_name_bar(ui, file_name.as_deref()));

        egui::TopBottomPanel::bottom(self.view_id("status_bar")).show(ctx, |ui| {
            ui::status_bar(
                ui,
                &self.path_message,
                self.document.cursor_position(),
                self.document.status(),
            );
        });

        let response = egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::WHITE))
            .show(ctx, |ui| self.view.show(ui, &mut self.document))
            .inner;
        if response.zoomed {
            app.remember(&self.view);
        }

        self.show_dialogs(ctx, app, &mut requests);
        requests
    }

    fn view_id(&self, name: &str) -> egui::Id {
        egui::Id::new((name, self.id))
    }
}

fn pick_save_path(current_name: Option<String>) -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Save As")
        .add_filter("Text files (*.txt)", &["txt"])
        .add_filter("All files", &["*"])
        .set_file_name(current_name.unwrap_or_else(|| "untitled.txt".to_string()))
        .save_file()
}

fn pick_font_file() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Load Font")
        .add_filter("Font", &["ttf", "otf"])
        .pick_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn context() -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let app = AppContext::new(dir.path().join("settings.json"));
        (dir, app)
    }

    #[test]
    fn open_path_loads_the_document() {
        let (dir, app) = context();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello").unwrap();

        let mut window = EditorWindow::new(&app);
        window.open_path(&path);
        assert_eq!(window.document().content(), "hello");
        assert!(window.path_message.starts_with("Opened file: "));
        assert!(window.messages.is_empty());
    }

    #[test]
    fn failed_open_clears_the_editor_and_reports() {
        let (dir, app) = context();
        let mut window = EditorWindow::new(&app);
        window.document.replace_range(0..0, "stale");

        window.open_path(&dir.path().join("missing.txt"));
        assert_eq!(window.document().content(), "");
        assert!(!window.document().is_modified());
        let message = window.messages.current().unwrap();
        assert_eq!(message.title, "File Error");
    }

    #[test]
    fn find_next_wraps_and_notifies() {
        let (_dir, mut app) = context();
        let mut window = EditorWindow::new(&app);
        window.document = Document::from_text("alpha beta alpha");
        window.document.set_selection(12..12);
        window.find_dialog.open(FindMode::Find, "beta");

        let mut requests = WindowRequests::default();
        window.dispatch(Command::FindNext, &mut app, &mut requests);
        assert_eq!(window.document.selection(), 6..10);
        assert_eq!(
            window.messages.current().map(|m| m.body.as_str()),
            Some(WRAPPED_NOTICE)
        );
    }

    #[test]
    fn missing_query_reports_cannot_find() {
        let (_dir, mut app) = context();
        let mut window = EditorWindow::new(&app);
        window.document = Document::from_text("alpha");
        window.find_dialog.open(FindMode::Find, "zeta");

        window.dispatch(Command::FindNext, &mut app, &mut WindowRequests::default());
        assert_eq!(
            window.messages.current().map(|m| m.body.as_str()),
            Some("Cannot find \"zeta\"")
        );
    }

    #[test]
    fn replace_all_reports_count() {
        let (_dir, mut app) = context();
        let mut window = EditorWindow::new(&app);
        window.document = Document::from_text("a-a-a");
        window.find_dialog.open(FindMode::Replace, "a");
        window.find_dialog.replace_with = "bb".into();

        window.dispatch(Command::ReplaceAll, &mut app, &mut WindowRequests::default());
        assert_eq!(window.document.content(), "bb-bb-bb");
        assert_eq!(
            window.messages.current().map(|m| m.body.as_str()),
            Some("Replaced 3 occurrence(s)")
        );
    }

    #[test]
    fn view_toggles_are_persisted() {
        let (dir, mut app) = context();
        let mut window = EditorWindow::new(&app);
        window.dispatch(Command::ToggleLineNumbers, &mut app, &mut WindowRequests::default());
        assert!(app.settings.show_line_numbers);

        let stored = crate::config::Settings::load(&dir.path().join("settings.json")).unwrap();
        assert!(stored.show_line_numbers);
    }

    #[test]
    fn new_window_is_a_request() {
        let (_dir, mut app) = context();
        let mut window = EditorWindow::new(&app);
        let mut requests = WindowRequests::default();
        window.dispatch(Command::NewWindow, &mut app, &mut requests);
        assert!(requests.new_window);
    }

    fn close_request() -> egui::RawInput {
        let mut raw = egui::RawInput::default();
        raw.viewports
            .entry(egui::ViewportId::ROOT)
            .or_default()
            .events
            .push(egui::ViewportEvent::Close);
        raw
    }

    #[test]
    fn closing_a_modified_window_asks_first() {
        let (_dir, app) = context();
        let mut window = EditorWindow::new(&app);
        window.document.replace_range(0..0, "unsaved");

        let ctx = egui::Context::default();
        let mut requests = WindowRequests::default();
        let output = ctx.run(close_request(), |ctx| window.handle_close(ctx, &mut requests));

        assert!(!window.is_closed());
        assert!(window.close_confirmation.open);
        let commands = &output.viewport_output[&egui::ViewportId::ROOT].commands;
        assert!(commands.contains(&egui::ViewportCommand::CancelClose));
    }

    #[test]
    fn deferred_close_is_left_to_the_application() {
        let (_dir, app) = context();
        let mut window = EditorWindow::new(&app);
        window.document.replace_range(0..0, "unsaved");
        window.defer_close = true;

        let ctx = egui::Context::default();
        let mut requests = WindowRequests::default();
        ctx.run(close_request(), |ctx| window.handle_close(ctx, &mut requests));

        assert!(!window.is_closed());
        assert!(!window.close_confirmation.open);
    }

    #[test]
    fn unmodified_window_closes_without_asking() {
        let (_dir, app) = context();
        let mut window = EditorWindow::new(&app);

        let ctx = egui::Context::default();
        let mut requests = WindowRequests::default();
        ctx.run(close_request(), |ctx| window.handle_close(ctx, &mut requests));

        assert!(window.is_closed());
        assert!(!window.close_confirmation.open);
    }

    #[test]
    fn history_chords_stay_with_the_focused_field() {
        let text = egui::Id::new("text");
        let find_box = egui::Id::new("find");
        assert!(shortcut_applies(Command::Undo, Some(text), text));
        assert!(shortcut_applies(Command::Undo, None, text));
        assert!(!shortcut_applies(Command::Undo, Some(find_box), text));
        assert!(!shortcut_applies(Command::Bold, Some(find_box), text));
        assert!(shortcut_applies(Command::Find, Some(find_box), text));
        assert!(shortcut_applies(Command::Save, Some(find_box), text));
    }

    #[test]
    fn bold_without_selection_changes_nothing() {
        let (_dir, mut app) = context();
        let mut window = EditorWindow::new(&app);
        window.document = Document::from_text("plain");
        window.dispatch(Command::Bold, &mut app, &mut WindowRequests::default());
        assert!(window.document.formats().is_empty());

        window.document.set_selection(0..5);
        window.dispatch(Command::Bold, &mut app, &mut WindowRequests::default());
        assert!(window.document.formats().format_at(2).bold);
    }
}
