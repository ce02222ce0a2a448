use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rubix_rs::docs::DocsClient;
use rubix_rs::models::DuplicateColumns;
use rubix_rs::render::PlottersRenderer;
use rubix_rs::session::{CycleOutcome, FormInput, RenderConfig, UploadPaths, Uploads, run_cycle};
use rubix_rs::table::DataTable;
use rubix_rs::{PolicyPreset, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rubix",
    version,
    about = "Size, render & embed annotated heatmaps from CSV data"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print default and resolved plot dimensions plus the embedding viewport.
    Size(SizeArgs),
    /// Render the heatmap and write heatmap.html, page.html (and heatmap.png).
    Render(RenderArgs),
    /// Show the first rows and columns of each uploaded table.
    Preview(PreviewArgs),
    /// Print the heatmap library documentation (README).
    Docs(DocsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    Standard,
    Compact,
}

impl From<Preset> for PolicyPreset {
    fn from(p: Preset) -> Self {
        match p {
            Preset::Standard => PolicyPreset::Standard,
            Preset::Compact => PolicyPreset::Compact,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Duplicate {
    No,
    Yes,
    Auto,
}

/// Options shared by `size` and `render`; each one overrides the config file.
#[derive(Args, Debug)]
struct FormArgs {
    /// JSON file with form values (see `render_config.json` / FormInput fields).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sizing preset.
    #[arg(long, value_enum, default_value_t = Preset::Standard)]
    preset: Preset,
    /// Heatmap width in pixels, or `proportional`.
    #[arg(long)]
    width: Option<String>,
    /// Heatmap height in pixels, or `proportional`.
    #[arg(long)]
    height: Option<String>,
    #[arg(long)]
    show_metadata_rows: Option<bool>,
    #[arg(long)]
    show_metadata_rows_labels: Option<bool>,
    #[arg(long)]
    show_metadata_cols: Option<bool>,
    /// Repeat column metadata under the heatmap.
    #[arg(long, value_enum)]
    duplicate_metadata_cols: Option<Duplicate>,
    #[arg(long)]
    show_rows_legend: Option<bool>,
    #[arg(long)]
    show_cols_legend: Option<bool>,
    #[arg(long)]
    show_colorbar: Option<bool>,
}

impl FormArgs {
    fn form(&self) -> Result<FormInput> {
        let mut form: FormInput = match &self.config {
            Some(path) => storage::load_json(path)?,
            None => FormInput::default(),
        };
        if self.width.is_some() {
            form.width = self.width.clone();
        }
        if self.height.is_some() {
            form.height = self.height.clone();
        }
        let set = |slot: &mut bool, v: Option<bool>| {
            if let Some(v) = v {
                *slot = v;
            }
        };
        set(&mut form.show_metadata_rows, self.show_metadata_rows);
        set(&mut form.show_metadata_rows_labels, self.show_metadata_rows_labels);
        set(&mut form.show_metadata_cols, self.show_metadata_cols);
        set(&mut form.show_rows_legend, self.show_rows_legend);
        set(&mut form.show_cols_legend, self.show_cols_legend);
        set(&mut form.show_colorbar, self.show_colorbar);
        if let Some(d) = self.duplicate_metadata_cols {
            form.duplicate_metadata_cols = match d {
                Duplicate::No => DuplicateColumns::No,
                Duplicate::Yes => DuplicateColumns::Yes,
                Duplicate::Auto => DuplicateColumns::Auto,
            };
        }
        Ok(form)
    }
}

#[derive(Args, Debug)]
struct SizeArgs {
    /// Main data CSV (header row, row labels in the first column). Omit for the fallback size.
    #[arg(short, long)]
    data: Option<PathBuf>,
    #[command(flatten)]
    form: FormArgs,
    /// Print the resolved configuration as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Main data CSV.
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// Rows metadata CSV (indexed by main data row labels).
    #[arg(long)]
    metadata_rows: Option<PathBuf>,
    /// Columns metadata CSV (indexed by main data column labels).
    #[arg(long)]
    metadata_cols: Option<PathBuf>,
    #[command(flatten)]
    form: FormArgs,
    /// Also write heatmap.png.
    #[arg(long, default_value_t = false)]
    png: bool,
    /// Output directory.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Main data CSV.
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// Rows metadata CSV.
    #[arg(long)]
    metadata_rows: Option<PathBuf>,
    /// Columns metadata CSV.
    #[arg(long)]
    metadata_cols: Option<PathBuf>,
    /// Rows shown per table.
    #[arg(long, default_value_t = 5)]
    rows: usize,
    /// Columns shown per table.
    #[arg(long, default_value_t = 8)]
    cols: usize,
}

#[derive(Args, Debug)]
struct DocsArgs {
    /// Override the README location.
    #[arg(long)]
    url: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Size(args) => cmd_size(args),
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Docs(args) => cmd_docs(args),
    }
}

fn cmd_size(args: SizeArgs) -> Result<()> {
    let shape = match &args.data {
        Some(path) => Some(DataTable::from_path(path)?.shape()),
        None => None,
    };
    let policy = PolicyPreset::from(args.form.preset).policy();
    let form = args.form.form()?;
    let config = RenderConfig::build(&form, shape, &policy)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match config.shape {
        Some(s) => println!("data      {} rows x {} columns", s.row_count, s.column_count),
        None => println!("data      (none)"),
    }
    println!(
        "default   {} x {}",
        config.defaults.width, config.defaults.height
    );
    println!(
        "heatmap   {} x {}  (requested {} x {})",
        config.dimensions.width,
        config.dimensions.height,
        config.requested.width,
        config.requested.height
    );
    let g = config.geometry;
    println!(
        "viewport  {} x {}  (margins l={} r={} t={} b={})",
        g.total_width, g.total_height, g.margin_left, g.margin_right, g.margin_top, g.margin_bottom
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let policy = PolicyPreset::from(args.form.preset).policy();
    let mut form = args.form.form()?;
    form.save_png |= args.png;

    let (uploads, warnings) = Uploads::load(&UploadPaths {
        data: args.data,
        metadata_rows: args.metadata_rows,
        metadata_cols: args.metadata_cols,
    });
    for w in &warnings {
        eprintln!("warning: {}", w);
    }

    let renderer = PlottersRenderer::new(&args.out_dir);
    match run_cycle(&uploads, &form, &policy, &renderer, &args.out_dir) {
        CycleOutcome::Rendered(report) => {
            eprintln!("Wrote {}", report.html_path.display());
            if let Some(png) = &report.png_path {
                eprintln!("Wrote {}", png.display());
            }
            eprintln!("Wrote {}", report.config_path.display());
            println!("{}", CycleOutcome::Rendered(report).message());
            Ok(())
        }
        CycleOutcome::Deferred(reason) => bail!("{}", reason),
        CycleOutcome::Failed(msg) => bail!("{}", msg),
    }
}

fn cmd_preview(args: PreviewArgs) -> Result<()> {
    let (uploads, warnings) = Uploads::load(&UploadPaths {
        data: args.data,
        metadata_rows: args.metadata_rows,
        metadata_cols: args.metadata_cols,
    });
    let previews = uploads.previews(args.rows, args.cols);
    if previews.is_empty() {
        bail!("{}", warnings.join("\n"));
    }
    for (what, p) in previews {
        println!(
            "{} ({} rows x {} columns)",
            what, p.shape.row_count, p.shape.column_count
        );
        println!("\t{}", p.columns.join("\t"));
        for (label, cells) in &p.rows {
            println!("{}\t{}", label, cells.join("\t"));
        }
        if p.is_truncated() {
            println!("...");
        }
        println!();
    }
    Ok(())
}

fn cmd_docs(args: DocsArgs) -> Result<()> {
    let client = match args.url {
        Some(url) => DocsClient::with_url(url)?,
        None => DocsClient::new()?,
    };
    println!("{}", client.fetch_readme()?);
    Ok(())
}
