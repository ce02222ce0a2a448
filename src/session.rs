//! One render cycle: uploads + form input -> config -> renderer -> embedded page.
//!
//! Nothing here keeps state between cycles. Each call builds an immutable
//! [`RenderConfig`] from explicit inputs, so a failed cycle leaves nothing
//! behind for the next one.
//!
//! ### Example
//! ```no_run
//! use rubix_rs::render::PlottersRenderer;
//! use rubix_rs::session::{FormInput, UploadPaths, Uploads, run_cycle};
//! use rubix_rs::sizing::SizingPolicy;
//!
//! let (uploads, warnings) = Uploads::load(&UploadPaths {
//!     data: Some("data.csv".into()),
//!     ..Default::default()
//! });
//! for w in &warnings {
//!     eprintln!("{}", w);
//! }
//! let renderer = PlottersRenderer::new("out");
//! let outcome = run_cycle(&uploads, &FormInput::default(), &SizingPolicy::standard(), &renderer, "out");
//! println!("{}", outcome.message());
//! ```

use crate::error::{Axis, ErrorKind, SizingError};
use crate::models::{
    ColorbarLocation, DataAxis, Dimension, DimensionSpec, DuplicateColumns, EmbeddingGeometry,
    FeatureFlags, PlotDimensions, RenderParams, SeparatorValue, TableShape,
};
use crate::render::{HeatmapRenderer, RenderJob};
use crate::sizing::{MarginConstants, SizingPolicy, default_colorbar_height};
use crate::table::{DataTable, MetadataTable, Preview};
use crate::{embed, storage};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};

/// Message prefix for failures coming from the renderer.
pub const WRONG_PARAMETER: &str = "WRONG PARAMETER OR DATA VALUES (please double-check and modify) ::: ";

pub const HTML_NAME: &str = "heatmap.html";
pub const PAGE_NAME: &str = "page.html";
pub const CONFIG_NAME: &str = "render_config.json";

/// Accepted `color_scaling_quantile` percentiles.
pub const QUANTILE_RANGE: std::ops::RangeInclusive<u8> = 80..=100;

/// Raw form input, as typed by the user or read from a JSON config file.
///
/// Optional strings that are absent or blank mean "use the default".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub width: Option<String>,
    pub height: Option<String>,
    pub save_png: bool,

    pub scale_along: Option<DataAxis>,
    pub normalize_along: Option<DataAxis>,
    pub color_scaling_quantile: u8,
    pub data_rows_to_drop: String,
    pub data_cols_to_drop: String,

    pub show_colorbar: bool,
    pub colorbar_location: ColorbarLocation,
    pub colorbar_title: String,
    pub colorbar_height: Option<String>,

    pub show_metadata_rows: bool,
    pub show_metadata_rows_labels: bool,
    pub show_metadata_cols: bool,
    pub duplicate_metadata_cols: DuplicateColumns,
    pub show_rows_legend: bool,
    pub show_cols_legend: bool,

    pub colormap_main: String,
    pub colormap_metarows: String,
    pub colormap_metacols: String,
    pub nan_color: String,
    pub sep_color: String,
    pub sep_value: SeparatorValue,

    pub metadata_rows_sep: String,
    pub metadata_cols_sep: String,
    pub row_labels_for_highlighting: String,
}

impl Default for FormInput {
    fn default() -> Self {
        let flags = FeatureFlags::default();
        let params = RenderParams::default();
        Self {
            width: None,
            height: None,
            save_png: params.save_png,
            scale_along: params.scale_along,
            normalize_along: params.normalize_along,
            color_scaling_quantile: params.color_scaling_quantile,
            data_rows_to_drop: String::new(),
            data_cols_to_drop: String::new(),
            show_colorbar: flags.show_colorbar,
            colorbar_location: params.colorbar_location,
            colorbar_title: String::new(),
            colorbar_height: None,
            show_metadata_rows: flags.show_metadata_rows,
            show_metadata_rows_labels: flags.show_metadata_rows_labels,
            show_metadata_cols: flags.show_metadata_cols,
            duplicate_metadata_cols: params.duplicate_metadata_cols,
            show_rows_legend: flags.show_rows_legend,
            show_cols_legend: flags.show_cols_legend,
            colormap_main: params.colormap_main.unwrap_or_default(),
            colormap_metarows: params.colormap_metarows.unwrap_or_default(),
            colormap_metacols: params.colormap_metacols.unwrap_or_default(),
            nan_color: params.nan_color,
            sep_color: params.sep_color,
            sep_value: params.sep_value,
            metadata_rows_sep: String::new(),
            metadata_cols_sep: String::new(),
            row_labels_for_highlighting: String::new(),
        }
    }
}

impl FormInput {
    pub fn flags(&self) -> FeatureFlags {
        FeatureFlags {
            show_metadata_rows: self.show_metadata_rows,
            show_metadata_rows_labels: self.show_metadata_rows_labels,
            show_metadata_cols: self.show_metadata_cols,
            duplicate_metadata_cols: self.duplicate_metadata_cols.reserves_space(),
            show_rows_legend: self.show_rows_legend,
            show_cols_legend: self.show_cols_legend,
            show_colorbar: self.show_colorbar,
        }
    }

    /// Requested dimensions, defaults filled in where the field is blank.
    pub fn dimension_spec(&self, defaults: PlotDimensions) -> Result<DimensionSpec, SizingError> {
        let pick = |input: &Option<String>, default: u32, axis: Axis| match non_blank(input) {
            Some(s) => Dimension::parse(s, axis),
            None => Ok(Dimension::Fixed(default)),
        };
        Ok(DimensionSpec {
            width: pick(&self.width, defaults.width, Axis::Width)?,
            height: pick(&self.height, defaults.height, Axis::Height)?,
        })
    }

    fn params(&self) -> Result<RenderParams, SizingError> {
        if !QUANTILE_RANGE.contains(&self.color_scaling_quantile) {
            return Err(SizingError::InvalidQuantile {
                value: self.color_scaling_quantile,
            });
        }
        let colorbar_height = match non_blank(&self.colorbar_height) {
            Some(s) => match Dimension::parse(s, Axis::Height)? {
                Dimension::Fixed(px) => Some(px),
                Dimension::Proportional => {
                    return Err(SizingError::InvalidDimension {
                        axis: Axis::Height,
                        value: s.to_string(),
                    });
                }
            },
            None => None,
        };
        Ok(RenderParams {
            scale_along: self.scale_along,
            normalize_along: self.normalize_along,
            color_scaling_quantile: self.color_scaling_quantile,
            data_rows_to_drop: parse_list(&self.data_rows_to_drop),
            data_cols_to_drop: parse_list(&self.data_cols_to_drop),
            colorbar_location: self.colorbar_location,
            colorbar_title: opt_string(&self.colorbar_title),
            colorbar_height,
            duplicate_metadata_cols: self.duplicate_metadata_cols,
            colormap_main: opt_string(&self.colormap_main),
            colormap_metarows: opt_string(&self.colormap_metarows),
            colormap_metacols: opt_string(&self.colormap_metacols),
            nan_color: self.nan_color.clone(),
            sep_color: self.sep_color.clone(),
            sep_value: self.sep_value,
            metadata_rows_sep: opt_string(&self.metadata_rows_sep),
            metadata_cols_sep: opt_string(&self.metadata_cols_sep),
            row_labels_for_highlighting: parse_list(&self.row_labels_for_highlighting),
            save_png: self.save_png,
        })
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn opt_string(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Split a comma-separated user list, trimming and dropping empties.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Everything a render needs, fixed for the duration of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub shape: Option<TableShape>,
    pub defaults: PlotDimensions,
    pub requested: DimensionSpec,
    pub dimensions: PlotDimensions,
    pub default_colorbar_height: u32,
    pub flags: FeatureFlags,
    pub geometry: EmbeddingGeometry,
    pub margins: MarginConstants,
    pub params: RenderParams,
}

impl RenderConfig {
    pub fn build(
        form: &FormInput,
        shape: Option<TableShape>,
        policy: &SizingPolicy,
    ) -> Result<Self, SizingError> {
        let defaults = policy.default_dimensions(shape);
        let requested = form.dimension_spec(defaults)?;
        let dimensions = policy.resolve_proportional(requested, shape)?;
        let flags = form.flags();
        let geometry = policy.embedding_geometry(dimensions, &flags);
        Ok(Self {
            shape,
            defaults,
            requested,
            dimensions,
            default_colorbar_height: default_colorbar_height(defaults),
            flags,
            geometry,
            margins: policy.margins,
            params: form.params()?,
        })
    }
}

/// File locations of the three uploads. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPaths {
    pub data: Option<PathBuf>,
    pub metadata_rows: Option<PathBuf>,
    pub metadata_cols: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct Uploads {
    pub data: Option<DataTable>,
    pub metadata_rows: Option<MetadataTable>,
    pub metadata_cols: Option<MetadataTable>,
}

impl Uploads {
    /// Parse every supplied file. Missing or broken files become warnings, not errors.
    pub fn load(paths: &UploadPaths) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let data = load_one(paths.data.as_deref(), "main data", &mut warnings, |p| {
            DataTable::from_path(p)
        });
        let metadata_rows = load_one(
            paths.metadata_rows.as_deref(),
            "rows metadata",
            &mut warnings,
            |p| MetadataTable::from_path(p),
        );
        let metadata_cols = load_one(
            paths.metadata_cols.as_deref(),
            "columns metadata",
            &mut warnings,
            |p| MetadataTable::from_path(p),
        );

        (
            Self {
                data,
                metadata_rows,
                metadata_cols,
            },
            warnings,
        )
    }

    pub fn shape(&self) -> Option<TableShape> {
        self.data.as_ref().map(DataTable::shape)
    }

    /// Top-left corner of every loaded table, labelled like the upload warnings.
    pub fn previews(&self, max_rows: usize, max_cols: usize) -> Vec<(&'static str, Preview)> {
        let mut out = Vec::new();
        if let Some(t) = &self.data {
            out.push(("main data", t.preview(max_rows, max_cols)));
        }
        if let Some(t) = &self.metadata_rows {
            out.push(("rows metadata", t.preview(max_rows, max_cols)));
        }
        if let Some(t) = &self.metadata_cols {
            out.push(("columns metadata", t.preview(max_rows, max_cols)));
        }
        out
    }
}

fn load_one<T, F>(
    path: Option<&Path>,
    what: &str,
    warnings: &mut Vec<String>,
    parse: F,
) -> Option<T>
where
    F: Fn(&Path) -> anyhow::Result<T>,
{
    let Some(path) = path else {
        warnings.push(format!("Please upload your {} file", what));
        return None;
    };
    match parse(path) {
        Ok(t) => Some(t),
        Err(err) => {
            warn!("could not read {} from {}: {:#}", what, path.display(), err);
            warnings.push(format!("Could not read your {} file: {:#}", what, err));
            None
        }
    }
}

/// Files and sizes produced by a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub html_path: PathBuf,
    pub page_path: PathBuf,
    pub png_path: Option<PathBuf>,
    pub config_path: PathBuf,
    pub config: RenderConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Rendered(Box<RenderReport>),
    /// Nothing to draw yet; not an error.
    Deferred(String),
    /// Shown to the user; the next cycle starts fresh.
    Failed(String),
}

impl CycleOutcome {
    pub fn message(&self) -> String {
        match self {
            CycleOutcome::Rendered(r) => format!(
                "PLOT READY ! {} ({}x{} px heatmap, {}x{} px page viewport)",
                r.page_path.display(),
                r.config.dimensions.width,
                r.config.dimensions.height,
                r.config.geometry.total_width,
                r.config.geometry.total_height
            ),
            CycleOutcome::Deferred(reason) => reason.clone(),
            CycleOutcome::Failed(msg) => msg.clone(),
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, CycleOutcome::Rendered(_))
    }

    /// Non-blocking check on a cycle running on a worker thread.
    ///
    /// `None` while the cycle is still running. A worker that hung up without
    /// sending an outcome (it panicked) yields a failed cycle.
    pub fn poll(receiver: &Receiver<CycleOutcome>) -> Option<CycleOutcome> {
        match receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                error!("render worker stopped without reporting an outcome");
                Some(CycleOutcome::Failed(WORKER_STOPPED.to_string()))
            }
        }
    }
}

pub const WORKER_STOPPED: &str = "Rendering stopped unexpectedly; check the log and try again";

/// Run one render cycle, writing artifacts into `out_dir`.
pub fn run_cycle<R, P>(
    uploads: &Uploads,
    form: &FormInput,
    policy: &SizingPolicy,
    renderer: &R,
    out_dir: P,
) -> CycleOutcome
where
    R: HeatmapRenderer + ?Sized,
    P: AsRef<Path>,
{
    let config = match RenderConfig::build(form, uploads.shape(), policy) {
        Ok(c) => c,
        Err(err) => match err.kind() {
            ErrorKind::MissingData => {
                info!("render deferred: {}", err);
                return CycleOutcome::Deferred(err.to_string());
            }
            ErrorKind::Configuration => {
                warn!("sizing failed: {}", err);
                return CycleOutcome::Failed(err.to_string());
            }
        },
    };

    let Some(data) = uploads.data.as_ref() else {
        return CycleOutcome::Deferred("Please upload your main data file".to_string());
    };

    let job = RenderJob {
        data,
        metadata_rows: uploads.metadata_rows.as_ref(),
        metadata_cols: uploads.metadata_cols.as_ref(),
        config: &config,
    };

    match render_and_store(&job, renderer, out_dir.as_ref()) {
        Ok(report) => {
            info!("plot ready: {}", report.page_path.display());
            CycleOutcome::Rendered(Box::new(report))
        }
        Err(err) => {
            warn!("render failed: {:#}", err);
            CycleOutcome::Failed(format!("{}{:#}", WRONG_PARAMETER, err))
        }
    }
}

fn render_and_store<R>(job: &RenderJob, renderer: &R, out_dir: &Path) -> anyhow::Result<RenderReport>
where
    R: HeatmapRenderer + ?Sized,
{
    let artifacts = renderer.render(job)?;
    let html = embed::whiten_body(&artifacts.html);
    let page = embed::embed_page(&html, &job.config.geometry, "Heatmap");

    std::fs::create_dir_all(out_dir)?;
    let html_path = out_dir.join(HTML_NAME);
    let page_path = out_dir.join(PAGE_NAME);
    let config_path = out_dir.join(CONFIG_NAME);
    storage::write_text(&html_path, &html)?;
    storage::write_text(&page_path, &page)?;
    storage::save_json(job.config, &config_path)?;

    Ok(RenderReport {
        html_path,
        page_path,
        png_path: artifacts.png,
        config_path,
        config: job.config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_split_on_commas_only() {
        assert_eq!(parse_list("A, B ,C"), vec!["A", "B", "C"]);
        assert_eq!(parse_list("x;y, z"), vec!["x;y", "z"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ,").is_empty());
    }

    #[test]
    fn blank_dimension_fields_use_defaults() {
        let form = FormInput {
            width: Some("  ".into()),
            height: Some("proportional".into()),
            ..FormInput::default()
        };
        let spec = form.dimension_spec(PlotDimensions::new(720, 600)).unwrap();
        assert_eq!(spec.width, Dimension::Fixed(720));
        assert_eq!(spec.height, Dimension::Proportional);
    }

    #[test]
    fn auto_duplication_reserves_space() {
        let form = FormInput {
            duplicate_metadata_cols: DuplicateColumns::Auto,
            ..FormInput::default()
        };
        assert!(form.flags().duplicate_metadata_cols);
        assert!(!FormInput::default().flags().duplicate_metadata_cols);
    }

    #[test]
    fn proportional_colorbar_height_is_rejected() {
        let form = FormInput {
            colorbar_height: Some("proportional".into()),
            ..FormInput::default()
        };
        let err = RenderConfig::build(&form, None, &SizingPolicy::standard()).unwrap_err();
        assert!(matches!(err, SizingError::InvalidDimension { .. }));
    }

    #[test]
    fn quantile_outside_range_is_rejected() {
        for q in [0u8, 50, 79, 101, 255] {
            let form = FormInput {
                color_scaling_quantile: q,
                ..FormInput::default()
            };
            let err = RenderConfig::build(&form, None, &SizingPolicy::standard()).unwrap_err();
            assert_eq!(err, SizingError::InvalidQuantile { value: q });
        }
        for q in [80u8, 95, 100] {
            let form = FormInput {
                color_scaling_quantile: q,
                ..FormInput::default()
            };
            assert!(RenderConfig::build(&form, None, &SizingPolicy::standard()).is_ok());
        }
    }
}
