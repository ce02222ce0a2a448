//! rubix_rs
//!
//! A Rust library for sizing, rendering, and embedding annotated heatmaps from
//! CSV uploads. Pairs with the `rubix` CLI and the `rubix-gui` desktop form.
//!
//! ### Features
//! - Default heatmap dimensions derived from the data shape, with a
//!   `proportional` mode following the data's aspect ratio
//! - Embedding viewport sized for metadata tracks, legends, and colorbar
//! - Row/column metadata tracks, separators, highlighting, colorbar
//! - HTML (inline SVG) and PNG output, embedded in a ready-to-open page
//!
//! ### Example
//! ```no_run
//! use rubix_rs::models::{Dimension, DimensionSpec, FeatureFlags};
//! use rubix_rs::sizing::SizingPolicy;
//! use rubix_rs::table::DataTable;
//!
//! let data = DataTable::from_path("expression.csv")?;
//! let policy = SizingPolicy::standard();
//! let defaults = policy.default_dimensions(Some(data.shape()));
//! let dims = policy.resolve_proportional(
//!     DimensionSpec { width: Dimension::Fixed(defaults.width), height: Dimension::Proportional },
//!     Some(data.shape()),
//! )?;
//! let geometry = policy.embedding_geometry(dims, &FeatureFlags::default());
//! println!("{}x{} in a {}x{} viewport", dims.width, dims.height, geometry.total_width, geometry.total_height);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod docs;
pub mod embed;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod sizing;
pub mod storage;
pub mod table;

pub use error::{Axis, ErrorKind, SizingError};
pub use models::{Dimension, DimensionSpec, EmbeddingGeometry, FeatureFlags, PlotDimensions, TableShape};
pub use sizing::{PolicyPreset, SizingPolicy};
