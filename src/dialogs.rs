use std::collections::VecDeque;

use eframe::egui;
use egui::widgets::color_picker::{color_picker_color32, Alpha};
use egui::Color32;

use crate::commands::Command;
use crate::config::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::search::FindOptions;

const BUTTON_SIZE: egui::Vec2 = egui::vec2(80.0, 24.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindMode {
    Find,
    Replace,
}

/// Non-modal find / find-and-replace window.
pub struct FindReplaceDialog {
    pub open: bool,
    pub mode: FindMode,
    pub query: String,
    pub replace_with: String,
    pub case_sensitive: bool,
    pub whole_words: bool,
    focus_query: bool,
}

impl Default for FindReplaceDialog {
    fn default() -> Self {
        Self {
            open: false,
            mode: FindMode::Find,
            query: String::new(),
            replace_with: String::new(),
            case_sensitive: false,
            whole_words: false,
            focus_query: false,
        }
    }
}

impl FindReplaceDialog {
    /// (Re)open in `mode` with a fresh form, the query prefilled with
    /// `initial`.
    pub fn open(&mut self, mode: FindMode, initial: &str) {
        *self = Self {
            open: true,
            mode,
            query: initial.to_string(),
            focus_query: true,
            ..Self::default()
        };
    }

    pub fn options(&self) -> FindOptions {
        FindOptions {
            case_sensitive: self.case_sensitive,
            whole_words: self.whole_words,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FindMode::Find => "Find",
            FindMode::Replace => "Find and Replace",
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<Command> {
        if !self.open {
            return None;
        }
        let mut open = self.open;
        let mut action = None;

        egui::Window::new(self.title())
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Find what:");
                let res = ui.text_edit_singleline(&mut self.query);
                if self.focus_query {
                    res.request_focus();
                    self.focus_query = false;
                }
                if res.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    action = Some(Command::FindNext);
                }

                ui.checkbox(&mut self.case_sensitive, "Match case");
                ui.checkbox(&mut self.whole_words, "Whole words");

                if self.mode == FindMode::Replace {
                    ui.label("Replace with:");
                    ui.text_edit_singleline(&mut self.replace_with);
                }

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_sized(BUTTON_SIZE, egui::Button::new(Command::FindNext.label()))
                        .clicked()
                    {
                        action = Some(Command::FindNext);
                    }
                    if self.mode == FindMode::Replace {
                        if ui
                            .add_sized(BUTTON_SIZE, egui::Button::new(Command::ReplaceNext.label()))
                            .clicked()
                        {
                            action = Some(Command::ReplaceNext);
                        }
                        if ui
                            .add_sized(BUTTON_SIZE, egui::Button::new(Command::ReplaceAll.label()))
                            .clicked()
                        {
                            action = Some(Command::ReplaceAll);
                        }
                    }
                });
            });

        self.open = open;
        action
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub title: String,
    pub body: String,
}

/// Message boxes, shown one at a time in the order they were raised.
#[derive(Default)]
pub struct MessageQueue {
    pending: VecDeque<Message>,
}

impl MessageQueue {
    pub fn info(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.push(MessageLevel::Info, title.into(), body.into());
    }

    pub fn error(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.push(MessageLevel::Error, title.into(), body.into());
    }

    fn push(&mut self, level: MessageLevel, title: String, body: String) {
        if level == MessageLevel::Error {
            log::error!("{}: {}", title, body);
        }
        self.pending.push_back(Message { level, title, body });
    }

    pub fn current(&self) -> Option<&Message> {
        self.pending.front()
    }

    pub fn dismiss(&mut self) {
        self.pending.pop_front();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(message) = self.current() else {
            return;
        };
        let mut dismissed = false;
        // Window ids come from the title; keep them unique per message.
        let id = egui::Id::new("message").with(self.pending.len());
        let title = if message.title.is_empty() {
            " ".to_string()
        } else {
            message.title.clone()
        };

        egui::Window::new(title)
            .id(id)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                if message.level == MessageLevel::Error {
                    ui.colored_label(ui.visuals().error_fg_color, &message.body);
                } else {
                    ui.label(&message.body);
                }
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add_sized(BUTTON_SIZE, egui::Button::new("OK")).clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.dismiss();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// "Save modified content?" asked when closing a modified window.
#[derive(Default)]
pub struct CloseConfirmationDialog {
    pub open: bool,
}

impl CloseConfirmationDialog {
    pub fn show(&mut self, ctx: &egui::Context) -> Option<CloseChoice> {
        if !self.open {
            return None;
        }
        let mut choice = None;

        egui::Window::new("Confirm Close")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Save the modified content?");
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_sized(BUTTON_SIZE, egui::Button::new("Cancel")).clicked() {
                            choice = Some(CloseChoice::Cancel);
                        }
                        if ui.add_sized(BUTTON_SIZE, egui::Button::new("Discard")).clicked() {
                            choice = Some(CloseChoice::Discard);
                        }
                        if ui.add_sized(BUTTON_SIZE, egui::Button::new("Save")).clicked() {
                            choice = Some(CloseChoice::Save);
                        }
                    });
                });
            });

        if choice.is_some() {
            self.open = false;
        }
        choice
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorTarget {
    Text,
    LineNumbers,
}

/// Colour picker with OK / Cancel.
#[derive(Default)]
pub struct ColorDialog {
    target: Option<ColorTarget>,
    color: Color32,
}

impl ColorDialog {
    pub fn open(&mut self, target: ColorTarget, current: Color32) {
        self.target = Some(target);
        self.color = current;
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<(ColorTarget, Color32)> {
        let target = self.target?;
        let title = match target {
            ColorTarget::Text => Command::TextColor.label(),
            ColorTarget::LineNumbers => Command::LineNumberColor.label(),
        };
        let mut chosen = None;
        let mut cancelled = false;

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                color_picker_color32(ui, &mut self.color, Alpha::Opaque);
                ui.add_space(8.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add_sized(BUTTON_SIZE, egui::Button::new("Cancel")).clicked() {
                        cancelled = true;
                    }
                    if ui.add_sized(BUTTON_SIZE, egui::Button::new("OK")).clicked() {
                        chosen = Some((target, self.color));
                    }
                });
            });

        if chosen.is_some() || cancelled {
            self.target = None;
        }
        chosen
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FontDialogAction {
    Apply { family: String, size: f32 },
    LoadFontFile,
}

/// Font family and size picker, opened from the settings button.
#[derive(Default)]
pub struct FontDialog {
    pub open: bool,
    family: String,
    size: f32,
}

impl FontDialog {
    pub fn open(&mut self, family: &str, size: f32) {
        self.open = true;
        self.family = family.to_string();
        self.size = size;
    }

    pub fn show(&mut self, ctx: &egui::Context, families: &[String]) -> Option<FontDialogAction> {
        if !self.open {
            return None;
        }
        let mut action = None;
        let mut close = false;

        egui::Window::new("Font Settings")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("font_settings_grid")
                    .num_columns(2)
                    .show(ui, |ui| {
                        ui.label("Family:");
                        egui::ComboBox::from_id_salt("font_family")
                            .selected_text(&self.family)
                            .show_ui(ui, |ui| {
                                for family in families {
                                    ui.selectable_value(&mut self.family, family.clone(), family);
                                }
                            });
                        ui.end_row();

                        ui.label("Size:");
                        ui.add(
                            egui::Slider::new(&mut self.size, MIN_FONT_SIZE..=MAX_FONT_SIZE)
                                .step_by(1.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Load font file…").clicked() {
                        action = Some(FontDialogAction::LoadFontFile);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_sized(BUTTON_SIZE, egui::Button::new("Cancel")).clicked() {
                            close = true;
                        }
                        if ui.add_sized(BUTTON_SIZE, egui::Button::new("OK")).clicked() {
                            action = Some(FontDialogAction::Apply {
                                family: self.family.clone(),
                                size: self.size,
                            });
                            close = true;
                        }
                    });
                });
            });

        if close {
            self.open = false;
        }
        action
    }

    /// Select a newly loaded family without closing the dialog.
    pub fn select_family(&mut self, family: &str) {
        self.family = family.to_string();
    }
}
