use crate::error::{Axis, SizingError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row and column counts of the uploaded main data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub row_count: usize,
    pub column_count: usize,
}

impl TableShape {
    pub fn new(row_count: usize, column_count: usize) -> Self {
        Self {
            row_count,
            column_count,
        }
    }
}

/// One side of the main heatmap: either a pixel count or derived from the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Fixed(u32),
    /// Follow the data's aspect ratio, using the other side as reference.
    Proportional,
}

impl Dimension {
    pub const PROPORTIONAL: &'static str = "proportional";
    /// Largest accepted side, in pixels. Keeps canvas arithmetic inside `i32`.
    pub const MAX_PX: u32 = 100_000;

    /// Parse user input for the given axis.
    ///
    /// Accepts `"proportional"` (case-insensitive) or any positive finite number
    /// up to [`Dimension::MAX_PX`], rounded to the nearest pixel (`"812.6"` -> `813`).
    pub fn parse(input: &str, axis: Axis) -> Result<Self, SizingError> {
        let s = input.trim();
        if s.eq_ignore_ascii_case(Self::PROPORTIONAL) {
            return Ok(Dimension::Proportional);
        }
        let invalid = || SizingError::InvalidDimension {
            axis,
            value: input.to_string(),
        };
        let v: f64 = s.parse().map_err(|_| invalid())?;
        if !v.is_finite() || v.round() < 1.0 || v.round() > Self::MAX_PX as f64 {
            return Err(invalid());
        }
        Ok(Dimension::Fixed(v.round() as u32))
    }

    /// Pixel count for `axis`, rejecting values above [`Dimension::MAX_PX`].
    pub fn checked_px(px: u32, axis: Axis) -> Result<u32, SizingError> {
        if px == 0 || px > Self::MAX_PX {
            return Err(SizingError::InvalidDimension {
                axis,
                value: px.to_string(),
            });
        }
        Ok(px)
    }

    pub fn is_proportional(&self) -> bool {
        matches!(self, Dimension::Proportional)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Fixed(px) => write!(f, "{}", px),
            Dimension::Proportional => f.write_str(Self::PROPORTIONAL),
        }
    }
}

impl Serialize for Dimension {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dimension::Fixed(px) => serializer.serialize_u32(*px),
            Dimension::Proportional => serializer.serialize_str(Self::PROPORTIONAL),
        }
    }
}

/// Config files may carry `800`, `"800"` or `"proportional"`; accept all three.
/// Errors name the field being read.
fn de_dimension<'de, D>(deserializer: D, axis: Axis) -> Result<Dimension, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct DimensionVisitor(Axis);

    impl<'de> Visitor<'de> for DimensionVisitor {
        type Value = Dimension;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a positive pixel count for {} or the string \"proportional\"", self.0)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let px = u32::try_from(v).unwrap_or(u32::MAX);
            Dimension::checked_px(px, self.0)
                .map(Dimension::Fixed)
                .map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v <= 0 {
                return Err(E::custom(SizingError::InvalidDimension {
                    axis: self.0,
                    value: v.to_string(),
                }));
            }
            self.visit_u64(v as u64)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Dimension::parse(&v.to_string(), self.0).map_err(E::custom)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Dimension::parse(s, self.0).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(DimensionVisitor(axis))
}

fn de_width<'de, D>(deserializer: D) -> Result<Dimension, D::Error>
where
    D: serde::Deserializer<'de>,
{
    de_dimension(deserializer, Axis::Width)
}

fn de_height<'de, D>(deserializer: D) -> Result<Dimension, D::Error>
where
    D: serde::Deserializer<'de>,
{
    de_dimension(deserializer, Axis::Height)
}

/// Requested plot size, possibly with one side left proportional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    #[serde(deserialize_with = "de_width")]
    pub width: Dimension,
    #[serde(deserialize_with = "de_height")]
    pub height: Dimension,
}

/// Concrete pixel size of the main heatmap area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotDimensions {
    pub width: u32,
    pub height: u32,
}

impl PlotDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<PlotDimensions> for DimensionSpec {
    fn from(d: PlotDimensions) -> Self {
        Self {
            width: Dimension::Fixed(d.width),
            height: Dimension::Fixed(d.height),
        }
    }
}

/// Which optional decorations are drawn around the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub show_metadata_rows: bool,
    pub show_metadata_rows_labels: bool,
    pub show_metadata_cols: bool,
    pub duplicate_metadata_cols: bool,
    pub show_rows_legend: bool,
    pub show_cols_legend: bool,
    pub show_colorbar: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            show_metadata_rows: true,
            show_metadata_rows_labels: true,
            show_metadata_cols: true,
            duplicate_metadata_cols: false,
            show_rows_legend: false,
            show_cols_legend: true,
            show_colorbar: true,
        }
    }
}

/// Pixel footprint of the embedded plot, decorations included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingGeometry {
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub total_width: u32,
    pub total_height: u32,
}

/// Whether the column metadata track is repeated under the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateColumns {
    #[default]
    No,
    Yes,
    /// Let the renderer decide from the main data size.
    Auto,
}

impl DuplicateColumns {
    /// Sizing reserves room whenever duplication may happen.
    pub fn reserves_space(self) -> bool {
        !matches!(self, DuplicateColumns::No)
    }
}

/// Axis along which data is scaled or normalized before coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataAxis {
    Columns,
    Rows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorbarLocation {
    #[default]
    Top,
    Center,
    Bottom,
}

/// How separator lines between metadata groups are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorValue {
    /// Use `sep_color` as given.
    #[default]
    UserColor,
    /// Color of the data minimum.
    Min,
    /// Color of the data median.
    Median,
    /// Black on light cells, white on dark ones.
    Adapt,
}

/// Parameters handed through to the renderer untouched by sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub scale_along: Option<DataAxis>,
    pub normalize_along: Option<DataAxis>,
    /// Percentile (80..=100) of absolute values mapped to the colormap ends.
    pub color_scaling_quantile: u8,
    pub data_rows_to_drop: Vec<String>,
    pub data_cols_to_drop: Vec<String>,
    pub colorbar_location: ColorbarLocation,
    pub colorbar_title: Option<String>,
    pub colorbar_height: Option<u32>,
    pub duplicate_metadata_cols: DuplicateColumns,
    pub colormap_main: Option<String>,
    pub colormap_metarows: Option<String>,
    pub colormap_metacols: Option<String>,
    pub nan_color: String,
    pub sep_color: String,
    pub sep_value: SeparatorValue,
    pub metadata_rows_sep: Option<String>,
    pub metadata_cols_sep: Option<String>,
    pub row_labels_for_highlighting: Vec<String>,
    pub save_png: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            scale_along: Some(DataAxis::Columns),
            normalize_along: None,
            color_scaling_quantile: 95,
            data_rows_to_drop: Vec::new(),
            data_cols_to_drop: Vec::new(),
            colorbar_location: ColorbarLocation::Top,
            colorbar_title: None,
            colorbar_height: None,
            duplicate_metadata_cols: DuplicateColumns::No,
            colormap_main: Some("coolwarm".into()),
            colormap_metarows: Some("glasbey".into()),
            colormap_metacols: Some("category20".into()),
            nan_color: "#000000".into(),
            sep_color: "#ffffff".into(),
            sep_value: SeparatorValue::UserColor,
            metadata_rows_sep: None,
            metadata_cols_sep: None,
            row_labels_for_highlighting: Vec::new(),
            save_png: false,
        }
    }
}
