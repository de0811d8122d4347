//! Line-number gutter and the per-line geometry it is drawn from.

use eframe::egui;
use egui::{Align2, Color32, FontId, Galley, Painter, Pos2, Rect};

/// Space left between the numbers and the text.
const PADDING: f32 = 3.0;

/// Vertical extent of one laid-out row, in galley coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowGeom {
    pub top: f32,
    pub bottom: f32,
    pub ends_with_newline: bool,
}

/// One logical line: the rows it wraps over and its 1-based number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineBlock {
    pub number: usize,
    pub top: f32,
    pub bottom: f32,
    pub first_row: usize,
    pub last_row: usize,
}

impl LineBlock {
    pub fn contains_row(&self, row: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
    }
}

/// Group rows into logical lines. A line ends at a row that ends with a
/// newline, or at the last row.
pub fn line_blocks(rows: &[RowGeom]) -> Vec<LineBlock> {
    let mut blocks = Vec::new();
    let mut start: Option<(usize, f32)> = None;
    for (i, row) in rows.iter().enumerate() {
        let (first_row, top) = *start.get_or_insert((i, row.top));
        if row.ends_with_newline || i + 1 == rows.len() {
            blocks.push(LineBlock {
                number: blocks.len() + 1,
                top,
                bottom: row.bottom,
                first_row,
                last_row: i,
            });
            start = None;
        }
    }
    blocks
}

/// Lines intersecting `clip_top..=clip_bottom`, starting from the first one
/// whose bottom reaches the clip and stopping at the first whose top passes it.
pub fn visible_blocks(
    blocks: &[LineBlock],
    clip_top: f32,
    clip_bottom: f32,
) -> impl Iterator<Item = &LineBlock> {
    blocks
        .iter()
        .skip_while(move |b| b.bottom < clip_top)
        .take_while(move |b| b.top <= clip_bottom)
}

pub fn rows_of(galley: &Galley) -> Vec<RowGeom> {
    galley
        .rows
        .iter()
        .map(|row| RowGeom {
            top: row.rect.min.y,
            bottom: row.rect.max.y,
            ends_with_newline: row.ends_with_newline,
        })
        .collect()
}

/// Decimal digits needed to print `n`.
pub fn digits(n: usize) -> usize {
    n.max(1).to_string().len()
}

#[derive(Clone, Debug)]
pub struct Gutter {
    pub visible: bool,
    pub number_color: Color32,
    pub background: Color32,
}

impl Default for Gutter {
    fn default() -> Self {
        Self {
            visible: false,
            number_color: Color32::from_rgb(0, 255, 255),
            background: Color32::GRAY,
        }
    }
}

impl Gutter {
    /// Width reserved left of the text; zero while hidden.
    pub fn width(&self, line_count: usize, digit_width: f32) -> f32 {
        if !self.visible {
            return 0.0;
        }
        PADDING + digit_width * digits(line_count) as f32
    }

    /// Paint the gutter into `rect` (screen space) for `galley` drawn at
    /// `galley_pos`. Only lines inside the painter's clip rect are drawn.
    pub fn paint(
        &self,
        painter: &Painter,
        rect: Rect,
        galley: &Galley,
        galley_pos: Pos2,
        font_id: &FontId,
    ) {
        if !self.visible {
            return;
        }
        let clip = painter.clip_rect().intersect(rect);
        painter.rect_filled(clip, 0.0, self.background);

        let blocks = line_blocks(&rows_of(galley));
        let clip_top = clip.min.y - galley_pos.y;
        let clip_bottom = clip.max.y - galley_pos.y;
        for block in visible_blocks(&blocks, clip_top, clip_bottom) {
            painter.text(
                Pos2::new(rect.max.x - PADDING, galley_pos.y + block.top),
                Align2::RIGHT_TOP,
                block.number.to_string(),
                font_id.clone(),
                self.number_color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(top: f32, ends_with_newline: bool) -> RowGeom {
        RowGeom {
            top,
            bottom: top + 10.0,
            ends_with_newline,
        }
    }

    #[test]
    fn wrapped_rows_share_a_line_number() {
        // line 1 wraps over two rows, line 2 is one row, line 3 is the empty
        // line after a trailing newline
        let rows = [
            row(0.0, false),
            row(10.0, true),
            row(20.0, true),
            row(30.0, false),
        ];
        let blocks = line_blocks(&rows);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].number, 1);
        assert_eq!((blocks[0].top, blocks[0].bottom), (0.0, 20.0));
        assert_eq!((blocks[0].first_row, blocks[0].last_row), (0, 1));
        assert!(blocks[0].contains_row(1));
        assert_eq!(blocks[2].number, 3);
        assert_eq!(blocks[2].first_row, 3);
    }

    #[test]
    fn single_empty_row_is_line_one() {
        let blocks = line_blocks(&[row(0.0, false)]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].number, 1);
    }

    #[test]
    fn only_lines_inside_clip_are_visited() {
        let rows: Vec<_> = (0..100).map(|i| row(i as f32 * 10.0, true)).collect();
        let blocks = line_blocks(&rows);
        let numbers: Vec<_> = visible_blocks(&blocks, 205.0, 240.0)
            .map(|b| b.number)
            .collect();
        // line 21 spans 200..210 and line 25 starts at 240
        assert_eq!(numbers, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn hidden_gutter_takes_no_space() {
        let mut gutter = Gutter::default();
        assert_eq!(gutter.width(1234, 8.0), 0.0);
        gutter.visible = true;
        assert_eq!(gutter.width(9, 8.0), 3.0 + 8.0);
        assert_eq!(gutter.width(10, 8.0), 3.0 + 16.0);
        assert_eq!(gutter.width(1234, 8.0), 3.0 + 32.0);
    }

    #[test]
    fn digits_counts_decimal_places() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(100), 3);
    }
}
