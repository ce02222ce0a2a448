//! Heatmap rendering: the main matrix plus metadata tracks, colorbar, and legends.
//!
//! - [`HeatmapRenderer`] is the seam between the sizing/orchestration layer and
//!   whatever draws the plot
//! - [`PlottersRenderer`] draws with Plotters: SVG wrapped in a standalone HTML
//!   document, plus an optional PNG
//! - Dataprep (drops, scaling, normalization, quantile color range) happens
//!   here, not in sizing

pub mod colormap;
pub mod draw;
pub mod prep;
pub mod scene;
pub mod text;

use crate::session::RenderConfig;
use crate::table::{DataTable, MetadataTable};
use anyhow::{Context, Result, bail};
use log::debug;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::PathBuf;

use scene::Scene;

/// Inputs of one render call. Borrowed: the caller keeps the uploads.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    pub data: &'a DataTable,
    pub metadata_rows: Option<&'a MetadataTable>,
    pub metadata_cols: Option<&'a MetadataTable>,
    pub config: &'a RenderConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderArtifacts {
    /// Standalone HTML document containing the plot.
    pub html: String,
    /// Written only when `save_png` was requested.
    pub png: Option<PathBuf>,
}

pub trait HeatmapRenderer {
    fn render(&self, job: &RenderJob) -> Result<RenderArtifacts>;
}

/// Renderer backed by Plotters. PNG files are written to `out_dir`.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    pub out_dir: PathBuf,
}

impl PlottersRenderer {
    pub const PNG_NAME: &'static str = "heatmap.png";

    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl HeatmapRenderer for PlottersRenderer {
    fn render(&self, job: &RenderJob) -> Result<RenderArtifacts> {
        let g = job.config.geometry;
        check_canvas(g.total_width, g.total_height, job.config.params.save_png)?;

        let scene = Scene::build(job)?;
        let (w, h) = scene.canvas;
        debug!(
            "rendering {}x{} matrix on a {}x{} canvas",
            scene.data.row_labels.len(),
            scene.data.column_labels.len(),
            w,
            h
        );

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (w, h)).into_drawing_area();
            draw::draw_scene(root, &scene, true)?;
        }
        let html = html_document("Heatmap", &svg);

        let png = if job.config.params.save_png {
            std::fs::create_dir_all(&self.out_dir)?;
            let path = self.out_dir.join(Self::PNG_NAME);
            let path_string = path.to_string_lossy().into_owned();
            let root = BitMapBackend::new(path_string.as_str(), (w, h)).into_drawing_area();
            draw::draw_scene(root, &scene, false).context("PNG export failed")?;
            Some(path)
        } else {
            None
        };

        Ok(RenderArtifacts { html, png })
    }
}

/// Largest canvas, in pixels, rendered to a PNG file.
pub const MAX_PNG_PIXELS: u64 = 250_000_000;

/// Refuse canvases the backends cannot address or allocate.
pub fn check_canvas(width: u32, height: u32, png: bool) -> Result<()> {
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        bail!("canvas {}x{} px is too large to draw", width, height);
    }
    let pixels = width as u64 * height as u64;
    if png && pixels > MAX_PNG_PIXELS {
        bail!(
            "canvas {}x{} px is too large for PNG export (limit {} pixels)",
            width,
            height,
            MAX_PNG_PIXELS
        );
    }
    Ok(())
}

/// Standalone page around an inline SVG. The body has no margin so the page
/// is exactly the size of the canvas.
pub fn html_document(title: &str, svg: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
</head>
<body style="margin:0">
<div class="heatmap">
{svg}
</div>
</body>
</html>
"#
    )
}
