//! Everything the drawing pass needs, resolved once per render.

use super::RenderJob;
use super::colormap::{Colormap, Palette, luminance, parse_hex_color};
use super::prep::{color_range, prepare, quantile};
use crate::models::{ColorbarLocation, DuplicateColumns, EmbeddingGeometry, SeparatorValue};
use crate::sizing::MarginConstants;
use crate::table::{DataTable, MetadataTable};
use anyhow::{Result, anyhow};
use plotters::prelude::*;

/// With `DuplicateColumns::Auto`, column tracks are repeated at the bottom from this many rows on.
pub const AUTO_DUPLICATE_MIN_ROWS: usize = 50;

/// One metadata annotation drawn as a strip of colored cells.
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    /// One color per data row (row tracks) or data column (column tracks).
    pub colors: Vec<RGBColor>,
    /// Categories in order of first appearance.
    pub legend: Vec<(String, RGBColor)>,
}

#[derive(Debug, Clone)]
pub struct ColorbarSpec {
    pub height: u32,
    pub location: ColorbarLocation,
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub data: DataTable,
    pub lo: f64,
    pub hi: f64,
    pub cmap: Colormap,
    pub nan: RGBColor,
    pub canvas: (u32, u32),
    /// Heatmap rectangle: left, top, right, bottom.
    pub plot: (i32, i32, i32, i32),
    pub margins: MarginConstants,
    pub geometry: EmbeddingGeometry,
    pub row_tracks: Vec<Track>,
    pub col_tracks: Vec<Track>,
    pub duplicate_cols: bool,
    pub row_seps: Vec<usize>,
    pub col_seps: Vec<usize>,
    pub sep_color: RGBColor,
    pub highlighted: Vec<usize>,
    pub colorbar: Option<ColorbarSpec>,
    pub show_row_labels: bool,
    pub show_rows_legend: bool,
    pub show_cols_legend: bool,
}

impl Scene {
    pub fn build(job: &RenderJob) -> Result<Self> {
        let config = job.config;
        let params = &config.params;
        let flags = &config.flags;

        let data = prepare(job.data, params)?;
        let (lo, hi) = color_range(&data, params.color_scaling_quantile);
        let cmap = Colormap::by_name(params.colormap_main.as_deref())?;
        let nan = parse_hex_color(&params.nan_color)?;

        let row_tracks = match job.metadata_rows {
            Some(meta) if flags.show_metadata_rows => {
                let palette = Palette::by_name(params.colormap_metarows.as_deref())?;
                build_tracks(meta, &data.row_labels, palette, nan)
            }
            _ => Vec::new(),
        };
        let col_tracks = match job.metadata_cols {
            Some(meta) if flags.show_metadata_cols => {
                let palette = Palette::by_name(params.colormap_metacols.as_deref())?;
                build_tracks(meta, &data.column_labels, palette, nan)
            }
            _ => Vec::new(),
        };

        let duplicate_cols = match params.duplicate_metadata_cols {
            DuplicateColumns::No => false,
            DuplicateColumns::Yes => true,
            DuplicateColumns::Auto => data.row_labels.len() >= AUTO_DUPLICATE_MIN_ROWS,
        };

        let row_seps = match (&params.metadata_rows_sep, job.metadata_rows) {
            (Some(col), Some(meta)) => boundaries(meta, col, &data.row_labels)?,
            (Some(col), None) => {
                return Err(anyhow!("rows metadata separator {:?} set but no rows metadata", col));
            }
            _ => Vec::new(),
        };
        let col_seps = match (&params.metadata_cols_sep, job.metadata_cols) {
            (Some(col), Some(meta)) => boundaries(meta, col, &data.column_labels)?,
            (Some(col), None) => {
                return Err(anyhow!(
                    "columns metadata separator {:?} set but no columns metadata",
                    col
                ));
            }
            _ => Vec::new(),
        };

        let sep_color = separator_color(&data, params.sep_value, &params.sep_color, &cmap, lo, hi)?;

        let highlighted = params
            .row_labels_for_highlighting
            .iter()
            .map(|label| {
                data.row_labels
                    .iter()
                    .position(|r| r == label)
                    .ok_or_else(|| anyhow!("row label {:?} for highlighting not found", label))
            })
            .collect::<Result<Vec<usize>>>()?;

        let dims = config.dimensions;
        let colorbar = flags.show_colorbar.then(|| ColorbarSpec {
            height: params
                .colorbar_height
                .unwrap_or(config.default_colorbar_height)
                .clamp(20, dims.height.max(20)),
            location: params.colorbar_location,
            title: params.colorbar_title.clone(),
        });

        let g = config.geometry;
        let x0 = g.margin_left as i32;
        let y0 = g.margin_top as i32;

        Ok(Self {
            data,
            lo,
            hi,
            cmap,
            nan,
            canvas: (g.total_width, g.total_height),
            plot: (x0, y0, x0 + dims.width as i32, y0 + dims.height as i32),
            margins: config.margins,
            geometry: g,
            row_tracks,
            col_tracks,
            duplicate_cols,
            row_seps,
            col_seps,
            sep_color,
            highlighted,
            colorbar,
            show_row_labels: flags.show_metadata_rows_labels,
            show_rows_legend: flags.show_rows_legend,
            show_cols_legend: flags.show_cols_legend,
        })
    }

    /// Colormap position of a data value.
    pub fn color_of(&self, v: f64) -> RGBColor {
        if v.is_finite() {
            self.cmap.at((v - self.lo) / (self.hi - self.lo))
        } else {
            self.nan
        }
    }
}

/// Category colors per annotation; palette offsets continue across annotations
/// so neighbouring tracks do not reuse the same colors.
fn build_tracks(meta: &MetadataTable, labels: &[String], palette: Palette, missing: RGBColor) -> Vec<Track> {
    let mut offset = 0;
    let mut tracks = Vec::with_capacity(meta.columns.len());
    for (j, name) in meta.columns.iter().enumerate() {
        let mut categories: Vec<String> = Vec::new();
        let mut colors = Vec::with_capacity(labels.len());
        for label in labels {
            let Some(row) = meta.row_for(label) else {
                colors.push(missing);
                continue;
            };
            let value = &row[j];
            let idx = match categories.iter().position(|c| c == value) {
                Some(i) => i,
                None => {
                    categories.push(value.clone());
                    categories.len() - 1
                }
            };
            colors.push(palette.pick(offset + idx));
        }
        let legend = categories
            .into_iter()
            .enumerate()
            .map(|(i, c)| (c, palette.pick(offset + i)))
            .collect::<Vec<_>>();
        offset += legend.len();
        tracks.push(Track {
            name: name.clone(),
            colors,
            legend,
        });
    }
    tracks
}

/// Indices `i` where the annotation value of item `i` differs from item `i - 1`.
fn boundaries(meta: &MetadataTable, column: &str, labels: &[String]) -> Result<Vec<usize>> {
    let j = meta
        .columns
        .iter()
        .position(|c| c == column)
        .ok_or_else(|| anyhow!("separator column {:?} not found in metadata", column))?;
    let values: Vec<&str> = labels
        .iter()
        .map(|l| meta.row_for(l).map_or("", |row| row[j].as_str()))
        .collect();
    Ok((1..values.len()).filter(|&i| values[i] != values[i - 1]).collect())
}

fn separator_color(
    data: &DataTable,
    mode: SeparatorValue,
    user: &str,
    cmap: &Colormap,
    lo: f64,
    hi: f64,
) -> Result<RGBColor> {
    let median_color = || {
        let mut vals: Vec<f64> = data.finite_values().collect();
        vals.sort_by(|a, b| a.total_cmp(b));
        let m = quantile(&vals, 0.5).unwrap_or((lo + hi) / 2.0);
        cmap.at((m - lo) / (hi - lo))
    };
    Ok(match mode {
        SeparatorValue::UserColor => parse_hex_color(user)?,
        SeparatorValue::Min => cmap.at(0.0),
        SeparatorValue::Median => median_color(),
        SeparatorValue::Adapt => {
            if luminance(median_color()) > 0.5 {
                BLACK
            } else {
                WHITE
            }
        }
    })
}
