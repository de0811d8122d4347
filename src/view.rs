//! The editing area: a multiline text edit with a line-number gutter,
//! current-line highlight, inline formatting and Ctrl+wheel zoom.

use std::ops::Range;

use eframe::egui;
use egui::text::{CCursor, CCursorRange, LayoutJob, TextFormat};
use egui::{Color32, FontFamily, FontId, Rect, Shape};

use crate::config::{clamp_font_size, Settings};
use crate::editor::Document;
use crate::format::{CharFormat, FormatSpans};
use crate::gutter::{line_blocks, rows_of, Gutter};
use crate::surface::{byte_to_char, char_to_byte, clamp_range, TextSurface};

const MARGIN: f32 = 4.0;
const CURRENT_LINE: Color32 = Color32::from_rgb(240, 240, 246);

/// Font size after one Ctrl+wheel step in the direction of `delta_y`.
pub fn zoom_step(size: f32, delta_y: f32) -> f32 {
    let step = if delta_y > 0.0 {
        1.0
    } else if delta_y < 0.0 {
        -1.0
    } else {
        0.0
    };
    clamp_font_size(size + step)
}

pub fn font_family(name: &str) -> FontFamily {
    match name {
        "Monospace" => FontFamily::Monospace,
        "Proportional" => FontFamily::Proportional,
        other => FontFamily::Name(other.into()),
    }
}

/// Split `0..len` into runs of uniform formatting.
pub fn format_runs(len: usize, spans: &FormatSpans) -> Vec<(Range<usize>, CharFormat)> {
    let mut runs = Vec::new();
    let mut pos = 0;
    for span in spans.iter() {
        let start = span.range.start.min(len);
        let end = span.range.end.min(len);
        if start < pos || start >= end {
            continue;
        }
        if start > pos {
            runs.push((pos..start, CharFormat::default()));
        }
        runs.push((start..end, span.format));
        pos = end;
    }
    if pos < len || runs.is_empty() {
        runs.push((pos..len, CharFormat::default()));
    }
    runs
}

#[derive(Default)]
pub struct ViewResponse {
    /// The user edited the text this frame.
    pub changed: bool,
    /// Ctrl+wheel changed the font size.
    pub zoomed: bool,
}

pub struct TextView {
    id: egui::Id,
    pub font_family: String,
    pub font_size: f32,
    pub word_wrap: bool,
    pub text_color: Option<Color32>,
    pub gutter: Gutter,
    pending_selection: Option<Range<usize>>,
}

impl TextView {
    pub fn new(id: egui::Id, settings: &Settings) -> Self {
        Self {
            id,
            font_family: settings.font_family.clone(),
            font_size: settings.font_size,
            word_wrap: settings.word_wrap,
            text_color: settings.text_color,
            gutter: Gutter {
                visible: settings.show_line_numbers,
                number_color: settings.line_number_color,
                ..Gutter::default()
            },
            pending_selection: None,
        }
    }

    /// Copy the view state back into `settings`.
    pub fn store(&self, settings: &mut Settings) {
        settings.font_family = self.font_family.clone();
        settings.font_size = self.font_size;
        settings.word_wrap = self.word_wrap;
        settings.text_color = self.text_color;
        settings.show_line_numbers = self.gutter.visible;
        settings.line_number_color = self.gutter.number_color;
    }

    /// Id of the text edit widget, for focus checks.
    pub fn id(&self) -> egui::Id {
        self.id
    }

    pub fn font_id(&self) -> FontId {
        FontId::new(self.font_size, font_family(&self.font_family))
    }

    /// Push a selection made outside the widget (search, undo) into it on
    /// the next frame.
    pub fn request_selection(&mut self, range: Range<usize>) {
        self.pending_selection = Some(range);
    }

    fn apply_pending_selection(&mut self, ctx: &egui::Context, doc: &Document) -> bool {
        let Some(range) = self.pending_selection.take() else {
            return false;
        };
        let text = doc.content();
        let range = clamp_range(text, range);
        let mut state = egui::TextEdit::load_state(ctx, self.id).unwrap_or_default();
        state.cursor.set_char_range(Some(CCursorRange::two(
            CCursor::new(byte_to_char(text, range.start)),
            CCursor::new(byte_to_char(text, range.end)),
        )));
        egui::TextEdit::store_state(ctx, self.id, state);
        ctx.memory_mut(|mem| mem.request_focus(self.id));
        true
    }

    fn handle_zoom(&mut self, ui: &egui::Ui) -> bool {
        if !ui.rect_contains_pointer(ui.max_rect()) {
            return false;
        }
        let delta = ui.input(|i| {
            if i.modifiers.command {
                i.raw_scroll_delta.y
            } else {
                0.0
            }
        });
        if delta == 0.0 {
            return false;
        }
        let size = zoom_step(self.font_size, delta);
        let changed = size != self.font_size;
        self.font_size = size;
        changed
    }

    pub fn show(&mut self, ui: &mut egui::Ui, doc: &mut Document) -> ViewResponse {
        let mut response = ViewResponse {
            zoomed: self.handle_zoom(ui),
            ..ViewResponse::default()
        };
        let scroll_to_selection = self.apply_pending_selection(ui.ctx(), doc);

        let font_id = self.font_id();
        let word_wrap = self.word_wrap;
        let text_color = self.text_color.unwrap_or_else(|| ui.visuals().text_color());
        let strong_color = ui.visuals().strong_text_color();
        let digit_width = ui.fonts(|f| f.glyph_width(&font_id, '9'));
        let gutter_width = self.gutter.width(doc.line_count(), digit_width);
        let gutter = self.gutter.clone();
        let id = self.id;

        let scroll = if word_wrap {
            egui::ScrollArea::vertical()
        } else {
            egui::ScrollArea::both()
        };

        scroll
            .id_salt(id.with("scroll"))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let available_height = ui.available_height();
                ui.horizontal_top(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    if gutter.visible {
                        ui.add_space(gutter_width);
                    }

                    // Reserved so the highlight is painted underneath the text.
                    let highlight_idx = ui.painter().add(Shape::Noop);

                    let previous = doc.content().to_string();
                    let previous_selection = doc.selection();
                    let formats = doc.formats().clone();
                    let layout_font = font_id.clone();
                    let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
                        let mut job = LayoutJob::default();
                        for (range, format) in format_runs(text.len(), &formats) {
                            // Spans may lag one edit behind `text` within a frame.
                            let piece = &text[clamp_range(text, range)];
                            job.append(
                                piece,
                                0.0,
                                TextFormat {
                                    font_id: layout_font.clone(),
                                    color: if format.bold { strong_color } else { text_color },
                                    italics: format.italic,
                                    ..Default::default()
                                },
                            );
                        }
                        job.wrap.max_width = if word_wrap { wrap_width } else { f32::INFINITY };
                        ui.fonts(|f| f.layout_job(job))
                    };

                    let output = egui::TextEdit::multiline(doc.content_mut())
                        .id(id)
                        .font(font_id.clone())
                        .frame(false)
                        .lock_focus(true)
                        .margin(egui::Margin::same(MARGIN))
                        .desired_width(f32::INFINITY)
                        .min_size(egui::vec2(0.0, available_height))
                        .layouter(&mut layouter)
                        .show(ui);

                    if output.response.changed() {
                        response.changed = true;
                        doc.record_edit(previous, previous_selection);
                    }

                    let text_rect = output.response.rect;
                    let blocks = line_blocks(&rows_of(&output.galley));

                    if let Some(cursor) = output.cursor_range {
                        let text = doc.content();
                        let a = char_to_byte(text, cursor.primary.ccursor.index);
                        let b = char_to_byte(text, cursor.secondary.ccursor.index);
                        doc.sync_selection(a.min(b)..a.max(b), a);

                        let row = cursor.primary.rcursor.row;
                        if let Some(block) = blocks.iter().find(|b| b.contains_row(row)) {
                            let rect = Rect::from_min_max(
                                egui::pos2(text_rect.min.x, output.galley_pos.y + block.top),
                                egui::pos2(text_rect.max.x, output.galley_pos.y + block.bottom),
                            );
                            ui.painter()
                                .set(highlight_idx, Shape::rect_filled(rect, 0.0, CURRENT_LINE));
                        }

                        if scroll_to_selection {
                            let rect = output
                                .galley
                                .pos_from_cursor(&cursor.primary)
                                .translate(output.galley_pos.to_vec2());
                            ui.scroll_to_rect(rect, Some(egui::Align::Center));
                        }
                    }

                    if gutter.visible {
                        let gutter_rect = Rect::from_min_max(
                            egui::pos2(text_rect.min.x - gutter_width, text_rect.min.y),
                            egui::pos2(text_rect.min.x, text_rect.max.y),
                        );
                        let number_font = FontId::monospace(font_id.size);
                        gutter.paint(
                            ui.painter(),
                            gutter_rect,
                            &output.galley,
                            output.galley_pos,
                            &number_font,
                        );
                    }
                });
            });

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_FONT_SIZE, MIN_FONT_SIZE};
    use crate::format::Attribute;

    #[test]
    fn zoom_steps_by_one_point_and_clamps() {
        assert_eq!(zoom_step(14.0, 120.0), 15.0);
        assert_eq!(zoom_step(14.0, -3.5), 13.0);
        assert_eq!(zoom_step(14.0, 0.0), 14.0);
        assert_eq!(zoom_step(MAX_FONT_SIZE, 1.0), MAX_FONT_SIZE);
        assert_eq!(zoom_step(MIN_FONT_SIZE, -1.0), MIN_FONT_SIZE);
    }

    #[test]
    fn font_family_maps_builtins() {
        assert_eq!(font_family("Monospace"), FontFamily::Monospace);
        assert_eq!(font_family("Proportional"), FontFamily::Proportional);
        assert_eq!(font_family("Hack"), FontFamily::Name("Hack".into()));
    }

    #[test]
    fn format_runs_cover_the_whole_text() {
        let mut spans = FormatSpans::new();
        spans.set(2..4, Attribute::Bold, true);
        spans.set(6..8, Attribute::Italic, true);
        let runs = format_runs(10, &spans);
        let ranges: Vec<_> = runs.iter().map(|(r, _)| r.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..4, 4..6, 6..8, 8..10]);
        assert!(runs[1].1.bold);
        assert!(runs[3].1.italic);
    }

    #[test]
    fn format_runs_clip_stale_spans() {
        let mut spans = FormatSpans::new();
        spans.set(3..20, Attribute::Bold, true);
        let runs = format_runs(5, &spans);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].0, 3..5);

        assert_eq!(format_runs(0, &FormatSpans::new()), vec![(0..0, CharFormat::default())]);
    }

    #[test]
    fn view_settings_round_trip() {
        let settings = Settings {
            font_size: 22.0,
            show_line_numbers: true,
            word_wrap: false,
            ..Settings::default()
        };
        let view = TextView::new(egui::Id::new("t"), &settings);
        let mut stored = Settings::default();
        view.store(&mut stored);
        assert_eq!(stored, settings);
    }
}
