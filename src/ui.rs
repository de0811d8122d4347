use eframe::egui;
use egui::{Color32, RichText, Ui};

use crate::commands::Command;
use crate::editor::DocumentStatus;
use crate::view::TextView;

pub const ACCENT: Color32 = Color32::from_rgb(0xA4, 0xDD, 0xD3);
const FILE_NAME_COLOR: Color32 = Color32::from_rgb(0x99, 0x66, 0x00);

fn item(ui: &mut Ui, command: Command, action: &mut Option<Command>) {
    let button = egui::Button::new(command.label()).shortcut_text(command.shortcut_text());
    if ui.add(button).clicked() {
        *action = Some(command);
        ui.close_menu();
    }
}

fn check_item(ui: &mut Ui, command: Command, checked: bool, action: &mut Option<Command>) {
    let mut value = checked;
    if ui.checkbox(&mut value, command.label()).clicked() {
        *action = Some(command);
        ui.close_menu();
    }
}

/// File / Edit / Format / View menus plus the settings button on the right.
pub fn menu_bar(ui: &mut Ui, view: &TextView) -> Option<Command> {
    let mut action = None;

    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            item(ui, Command::NewWindow, &mut action);
            item(ui, Command::Open, &mut action);
            item(ui, Command::Save, &mut action);
            item(ui, Command::SaveAs, &mut action);
        });

        ui.menu_button("Edit", |ui| {
            item(ui, Command::Undo, &mut action);
            item(ui, Command::Redo, &mut action);
            ui.separator();
            item(ui, Command::Cut, &mut action);
            item(ui, Command::Copy, &mut action);
            item(ui, Command::Paste, &mut action);
            ui.separator();
            item(ui, Command::Find, &mut action);
            item(ui, Command::Replace, &mut action);
        });

        ui.menu_button("Format", |ui| {
            item(ui, Command::Bold, &mut action);
            item(ui, Command::Italic, &mut action);
        });

        ui.menu_button("View", |ui| {
            item(ui, Command::TextColor, &mut action);
            item(ui, Command::LineNumberColor, &mut action);
            ui.separator();
            check_item(ui, Command::ToggleLineNumbers, view.gutter.visible, &mut action);
            check_item(ui, Command::ToggleWordWrap, view.word_wrap, &mut action);
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add_space(15.0);
            let settings = egui::Button::new(RichText::new("⚙").size(18.0)).fill(ACCENT);
            if ui
                .add(settings)
                .on_hover_text(Command::FontSettings.label())
                .on_hover_cursor(egui::CursorIcon::PointingHand)
                .clicked()
            {
                action = Some(Command::FontSettings);
            }
        });
    });

    action
}

/// The selectable file-name strip above the text area.
pub fn file_name_bar(ui: &mut Ui, file_name: Option<&str>) {
    let text = RichText::new(format!("  {}", file_name.unwrap_or("")))
        .monospace()
        .size(12.0)
        .color(FILE_NAME_COLOR)
        .background_color(ACCENT);
    ui.add(egui::Label::new(text).selectable(true));
}

pub fn cursor_text((line, col): (usize, usize)) -> String {
    format!("Ln: {} ;  Col: {}", line, col)
}

pub fn status_text(status: DocumentStatus) -> String {
    format!("Document status: {}", status.label())
}

/// Path message on the left, caret position in the middle, document
/// status on the right.
pub fn status_bar(ui: &mut Ui, path_message: &str, cursor: (usize, usize), status: DocumentStatus) {
    ui.horizontal(|ui| {
        let third = ui.available_width() / 3.0;
        ui.add_sized(
            [third * 1.5, 15.0],
            egui::Label::new(RichText::new(path_message).monospace().size(10.0))
                .selectable(true)
                .truncate(),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add_space(10.0);
            ui.label(status_text(status));
            ui.add_space(20.0);
            ui.label(cursor_text(cursor));
        });
    });
}
