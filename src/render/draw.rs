//! Drawing pass shared by the SVG and PNG backends.

use super::scene::{Scene, Track};
use super::text::{estimate_text_width_px, label_font_px, truncate_to_width};
use crate::models::ColorbarLocation;
use anyhow::{Result, anyhow};
use num_format::{Locale, ToFormattedString};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Gap between the heatmap and the strips around it.
const GAP: i32 = 6;
const SWATCH: i32 = 10;
const LEGEND_LINE: i32 = 14;
const LEGEND_FONT: u32 = 10;
const COLORBAR_WIDTH: i32 = 14;

fn text_style(px: u32, h: HPos, v: VPos) -> TextStyle<'static> {
    ("sans-serif", px)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(h, v))
}

/// Colorbar tick text: thousands separators for large values, two decimals otherwise.
pub fn format_tick(v: f64) -> String {
    if v.abs() >= 1000.0 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else {
        format!("{:.2}", v)
    }
}

/// Draw the whole scene. Text is skipped when `labels` is false (bitmap output
/// has no font source).
pub fn draw_scene<DB>(root: DrawingArea<DB, Shift>, s: &Scene, labels: bool) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (x0, y0, x1, y1) = s.plot;
    let nrows = s.data.row_labels.len();
    let ncols = s.data.column_labels.len();
    let cell_w = (x1 - x0) as f64 / ncols as f64;
    let cell_h = (y1 - y0) as f64 / nrows as f64;
    let col_x = |j: usize| x0 + (j as f64 * cell_w).round() as i32;
    let row_y = |i: usize| y0 + (i as f64 * cell_h).round() as i32;

    // Cells
    for (i, row) in s.data.values.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            root.draw(&Rectangle::new(
                [(col_x(j), row_y(i)), (col_x(j + 1), row_y(i + 1))],
                s.color_of(v).filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    for &i in &s.row_seps {
        let y = row_y(i);
        root.draw(&PathElement::new(vec![(x0, y), (x1, y)], s.sep_color.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    for &j in &s.col_seps {
        let x = col_x(j);
        root.draw(&PathElement::new(vec![(x, y0), (x, y1)], s.sep_color.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    for &i in &s.highlighted {
        root.draw(&Rectangle::new(
            [(x0 - 1, row_y(i)), (x1 + 1, row_y(i + 1))],
            BLACK.stroke_width(2),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    let m = &s.margins;

    // Row metadata strips, right-aligned against the heatmap.
    if !s.row_tracks.is_empty() {
        let k = s.row_tracks.len() as i32;
        let track_w = ((m.row_metadata as i32 - GAP) / k).max(2);
        let right = x0 - GAP;
        for (t, track) in s.row_tracks.iter().enumerate() {
            let left = right - (k - t as i32) * track_w;
            for (i, c) in track.colors.iter().enumerate() {
                root.draw(&Rectangle::new(
                    [(left, row_y(i)), (left + track_w, row_y(i + 1))],
                    c.filled(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }

    // Column metadata strips above, optionally repeated below the column labels.
    if !s.col_tracks.is_empty() {
        let k = s.col_tracks.len() as i32;
        let track_h = ((m.col_metadata as i32 - GAP) / k).max(2);
        let bottom = y0 - GAP;
        let dup_top = y1 + m.bottom_base as i32;
        for (t, track) in s.col_tracks.iter().enumerate() {
            let top = bottom - (k - t as i32) * track_h;
            draw_col_track(&root, track, top, track_h, &col_x)?;
            if s.duplicate_cols {
                draw_col_track(&root, track, dup_top + t as i32 * track_h, track_h, &col_x)?;
            }
            if labels {
                root.draw(&Text::new(
                    track.name.clone(),
                    (x0 - GAP - 2, top + track_h / 2),
                    text_style(LEGEND_FONT.min(track_h.max(6) as u32), HPos::Right, VPos::Center),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }

    if labels
        && s.show_row_labels
        && let Some(px) = label_font_px(cell_h)
    {
        let tracks_w = if s.row_tracks.is_empty() { 0 } else { m.row_metadata as i32 };
        let x = x0 - GAP - tracks_w - 4;
        let max_w = m.row_metadata_labels.saturating_sub(8);
        for (i, label) in s.data.row_labels.iter().enumerate() {
            root.draw(&Text::new(
                truncate_to_width(label, px, max_w),
                (x, (row_y(i) + row_y(i + 1)) / 2),
                text_style(px, HPos::Right, VPos::Center),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    // Column labels run downwards under the heatmap.
    if labels && let Some(px) = label_font_px(cell_w) {
        let max_w = m.bottom_base.saturating_sub(8);
        let style = ("sans-serif", px)
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        for (j, label) in s.data.column_labels.iter().enumerate() {
            root.draw(&Text::new(
                truncate_to_width(label, px, max_w),
                ((col_x(j) + col_x(j + 1)) / 2, y1 + 4),
                style.clone(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    let mut right_x = x1 + GAP;
    if let Some(cb) = &s.colorbar {
        let h = cb.height as i32;
        let top = match cb.location {
            ColorbarLocation::Top => y0,
            ColorbarLocation::Center => y0 + ((y1 - y0) - h) / 2,
            ColorbarLocation::Bottom => y1 - h,
        };
        let left = right_x + 4;
        for k in 0..h {
            let t = 1.0 - k as f64 / (h - 1).max(1) as f64;
            root.draw(&Rectangle::new(
                [(left, top + k), (left + COLORBAR_WIDTH, top + k + 1)],
                s.cmap.at(t).filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
        root.draw(&Rectangle::new(
            [(left, top), (left + COLORBAR_WIDTH, top + h)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        if labels {
            let tx = left + COLORBAR_WIDTH + 4;
            for (text, y, v) in [
                (format_tick(s.hi), top, VPos::Top),
                (format_tick(s.lo), top + h, VPos::Bottom),
            ] {
                root.draw(&Text::new(text, (tx, y), text_style(LEGEND_FONT, HPos::Left, v)))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            if let Some(title) = &cb.title {
                root.draw(&Text::new(
                    truncate_to_width(title, LEGEND_FONT, m.colorbar),
                    (left, top - 4),
                    text_style(LEGEND_FONT, HPos::Left, VPos::Bottom),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        right_x += m.colorbar as i32;
    }

    if s.show_rows_legend && !s.row_tracks.is_empty() {
        let max_w = m.row_legend.saturating_sub((SWATCH + 12) as u32);
        let mut y = y0;
        for track in &s.row_tracks {
            if labels {
                root.draw(&Text::new(
                    truncate_to_width(&track.name, LEGEND_FONT, m.row_legend),
                    (right_x, y),
                    text_style(LEGEND_FONT, HPos::Left, VPos::Top),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
            y += LEGEND_LINE;
            for (name, color) in &track.legend {
                draw_legend_item(&root, (right_x, y), name, *color, max_w, labels)?;
                y += LEGEND_LINE;
            }
            y += LEGEND_LINE / 2;
        }
    }

    if s.show_cols_legend && !s.col_tracks.is_empty() {
        let dup_h = if s.duplicate_cols { m.duplicated_col_metadata as i32 } else { 0 };
        let mut y = y1 + m.bottom_base as i32 + dup_h + 8;
        let limit = s.canvas.0 as i32 - 10;
        for track in &s.col_tracks {
            let mut x = x0;
            if labels {
                let head = format!("{}:", track.name);
                root.draw(&Text::new(
                    head.clone(),
                    (x, y),
                    text_style(LEGEND_FONT, HPos::Left, VPos::Top),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
                x += estimate_text_width_px(&head, LEGEND_FONT) as i32 + 8;
            }
            for (name, color) in &track.legend {
                let w = SWATCH + 4 + estimate_text_width_px(name, LEGEND_FONT) as i32 + 12;
                if x + w > limit && x > x0 {
                    x = x0;
                    y += LEGEND_LINE;
                }
                draw_legend_item(&root, (x, y), name, *color, w as u32, labels)?;
                x += w;
            }
            y += LEGEND_LINE;
        }
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_col_track<DB, F>(
    root: &DrawingArea<DB, Shift>,
    track: &Track,
    top: i32,
    track_h: i32,
    col_x: &F,
) -> Result<()>
where
    DB: DrawingBackend,
    F: Fn(usize) -> i32,
{
    for (j, c) in track.colors.iter().enumerate() {
        root.draw(&Rectangle::new(
            [(col_x(j), top), (col_x(j + 1), top + track_h)],
            c.filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

fn draw_legend_item<DB>(
    root: &DrawingArea<DB, Shift>,
    (x, y): (i32, i32),
    name: &str,
    color: RGBColor,
    max_w: u32,
    labels: bool,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.draw(&Rectangle::new([(x, y), (x + SWATCH, y + SWATCH)], color.filled()))
        .map_err(|e| anyhow!("{:?}", e))?;
    if labels {
        root.draw(&Text::new(
            truncate_to_width(name, LEGEND_FONT, max_w),
            (x + SWATCH + 4, y + SWATCH / 2),
            text_style(LEGEND_FONT, HPos::Left, VPos::Center),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_formatting() {
        assert_eq!(format_tick(1234567.4), "1,234,567");
        assert_eq!(format_tick(-2.5), "-2.50");
    }
}
