//! Default plot dimensions and embedding footprint derived from the data shape.
//!
//! The policy is a plain value: every constant that decides a default size or a
//! margin lives in [`SizingPolicy`] / [`MarginConstants`], and two presets are
//! provided. All functions here are pure.
//!
//! ### Example
//! ```
//! use rubix_rs::models::{FeatureFlags, TableShape};
//! use rubix_rs::sizing::SizingPolicy;
//!
//! let policy = SizingPolicy::standard();
//! let dims = policy.default_dimensions(Some(TableShape::new(100, 5)));
//! assert_eq!((dims.width, dims.height), (720, 600));
//! let geo = policy.embedding_geometry(dims, &FeatureFlags::default());
//! assert!(geo.total_width > dims.width);
//! ```

use crate::error::{Axis, SizingError};
use crate::models::{Dimension, DimensionSpec, EmbeddingGeometry, FeatureFlags, PlotDimensions, TableShape};
use serde::{Deserialize, Serialize};

/// Pixel allowance of each decoration around the main heatmap.
///
/// Every visible decoration adds its own fixed amount; nothing is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginConstants {
    pub left_base: u32,
    pub row_metadata: u32,
    pub row_metadata_labels: u32,
    pub row_legend: u32,
    pub colorbar: u32,
    pub right_base: u32,
    pub top_base: u32,
    pub col_metadata: u32,
    pub top_extra: u32,
    pub bottom_base: u32,
    pub duplicated_col_metadata: u32,
    pub col_legend: u32,
}

impl Default for MarginConstants {
    fn default() -> Self {
        Self {
            left_base: 50,
            row_metadata: 72,
            row_metadata_labels: 150,
            row_legend: 180,
            colorbar: 75,
            right_base: 100,
            top_base: 25,
            col_metadata: 72,
            top_extra: 25,
            bottom_base: 50,
            duplicated_col_metadata: 100,
            col_legend: 100,
        }
    }
}

/// Named presets, selectable from the CLI and the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyPreset {
    #[default]
    Standard,
    Compact,
}

impl PolicyPreset {
    pub fn policy(self) -> SizingPolicy {
        match self {
            PolicyPreset::Standard => SizingPolicy::standard(),
            PolicyPreset::Compact => SizingPolicy::compact(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingPolicy {
    /// Pixels allotted per data row and per data column.
    pub cell_px: u32,
    /// Width is floored at this multiple of the height.
    pub width_floor_ratio: f64,
    /// Absolute ceiling on the width floor.
    pub hard_cap: u32,
    /// Applied to the raw height before the width floor is computed.
    pub height_cap: Option<u32>,
    /// Returned when no data has been uploaded yet.
    pub fallback: PlotDimensions,
    pub margins: MarginConstants,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl SizingPolicy {
    /// Canonical preset: width floor capped at 900 px, height left uncapped.
    pub fn standard() -> Self {
        Self {
            cell_px: 6,
            width_floor_ratio: 1.2,
            hard_cap: 900,
            height_cap: None,
            fallback: PlotDimensions::new(1000, 500),
            margins: MarginConstants::default(),
        }
    }

    /// Keeps tall datasets on one screen: height capped at 600 px, width floor capped at 1000 px.
    pub fn compact() -> Self {
        Self {
            hard_cap: 1000,
            height_cap: Some(600),
            ..Self::standard()
        }
    }

    /// Default heatmap size for the given data shape.
    ///
    /// Order of operations: optional height cap first, then the width floor
    /// `min(width_floor_ratio * height, hard_cap)`. Both sides are at least 1 px
    /// and at most [`Dimension::MAX_PX`].
    pub fn default_dimensions(&self, shape: Option<TableShape>) -> PlotDimensions {
        let Some(shape) = shape else {
            return self.fallback;
        };

        let mut raw_width = self.cell_px as f64 * shape.column_count as f64;
        let mut raw_height = self.cell_px as f64 * shape.row_count as f64;

        if let Some(cap) = self.height_cap
            && raw_height > cap as f64
        {
            raw_height = cap as f64;
        }

        let floor = (self.width_floor_ratio * raw_height).min(self.hard_cap as f64);
        if raw_width < floor {
            raw_width = floor.round();
        }

        PlotDimensions::new(to_px(raw_width), to_px(raw_height))
    }

    /// Turn a possibly-proportional spec into concrete pixels.
    ///
    /// A proportional width is `height * columns / rows`, a proportional height
    /// is `width * rows / columns`, both rounded to the nearest pixel. Every side,
    /// given or derived, must stay within [`Dimension::MAX_PX`].
    pub fn resolve_proportional(
        &self,
        spec: DimensionSpec,
        shape: Option<TableShape>,
    ) -> Result<PlotDimensions, SizingError> {
        match (spec.width, spec.height) {
            (Dimension::Fixed(w), Dimension::Fixed(h)) => Ok(PlotDimensions::new(
                Dimension::checked_px(w, Axis::Width)?,
                Dimension::checked_px(h, Axis::Height)?,
            )),
            (Dimension::Proportional, Dimension::Proportional) => {
                Err(SizingError::BothProportional)
            }
            (Dimension::Proportional, Dimension::Fixed(h)) => {
                let h = Dimension::checked_px(h, Axis::Height)?;
                let shape = shape.ok_or(SizingError::MissingData { axis: Axis::Width })?;
                if shape.row_count == 0 || shape.column_count == 0 {
                    return Err(SizingError::EmptyTable { axis: Axis::Width });
                }
                let ratio = shape.column_count as f64 / shape.row_count as f64;
                let w = derived_px(h as f64 * ratio, Axis::Width)?;
                Ok(PlotDimensions::new(w, h))
            }
            (Dimension::Fixed(w), Dimension::Proportional) => {
                let w = Dimension::checked_px(w, Axis::Width)?;
                let shape = shape.ok_or(SizingError::MissingData { axis: Axis::Height })?;
                if shape.row_count == 0 || shape.column_count == 0 {
                    return Err(SizingError::EmptyTable { axis: Axis::Height });
                }
                let ratio = shape.row_count as f64 / shape.column_count as f64;
                let h = derived_px(w as f64 * ratio, Axis::Height)?;
                Ok(PlotDimensions::new(w, h))
            }
        }
    }

    /// Viewport needed to show the heatmap plus every enabled decoration.
    pub fn embedding_geometry(
        &self,
        dims: PlotDimensions,
        flags: &FeatureFlags,
    ) -> EmbeddingGeometry {
        let m = &self.margins;
        let on = |flag: bool, px: u32| if flag { px } else { 0 };

        let margin_left = m.left_base
            + on(flags.show_metadata_rows, m.row_metadata)
            + on(flags.show_metadata_rows_labels, m.row_metadata_labels);
        let margin_right = on(flags.show_rows_legend, m.row_legend)
            + on(flags.show_colorbar, m.colorbar)
            + m.right_base;
        let margin_top =
            m.top_base + on(flags.show_metadata_cols, m.col_metadata) + m.top_extra;
        let margin_bottom = m.bottom_base
            + on(flags.duplicate_metadata_cols, m.duplicated_col_metadata)
            + on(flags.show_cols_legend, m.col_legend);

        EmbeddingGeometry {
            margin_left,
            margin_right,
            margin_top,
            margin_bottom,
            total_width: margin_left.saturating_add(dims.width).saturating_add(margin_right),
            total_height: margin_top.saturating_add(dims.height).saturating_add(margin_bottom),
        }
    }
}

/// Default colorbar height: a quarter of the default heatmap height.
pub fn default_colorbar_height(defaults: PlotDimensions) -> u32 {
    to_px((defaults.height as f64 / 4.0).round())
}

fn to_px(v: f64) -> u32 {
    v.round().clamp(1.0, Dimension::MAX_PX as f64) as u32
}

/// Rounded proportional side; too large a result is reported, not clamped.
fn derived_px(v: f64, axis: Axis) -> Result<u32, SizingError> {
    let px = v.round().max(1.0);
    if px > Dimension::MAX_PX as f64 {
        return Err(SizingError::InvalidDimension {
            axis,
            value: format!("{}", px),
        });
    }
    Ok(px as u32)
}
