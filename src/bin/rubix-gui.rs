/*!
 * GUI application for rubix-rs - heatmap form front-end
 *
 * A cross-platform desktop form for:
 * - Picking main data, rows metadata, and columns metadata CSV files
 * - Setting plot dimensions (defaults derived from the data shape) and options
 * - Rendering the heatmap and writing the embeddable page
 *
 * Platform support: Windows, macOS, Linux
 */

use eframe::egui;
use rubix_rs::docs::DocsClient;
use rubix_rs::models::{ColorbarLocation, DataAxis, DuplicateColumns, SeparatorValue};
use rubix_rs::render::PlottersRenderer;
use rubix_rs::session::{CycleOutcome, FormInput, QUANTILE_RANGE, UploadPaths, Uploads, run_cycle};
use rubix_rs::sizing::{PolicyPreset, default_colorbar_height};
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;

const PREVIEW_ROWS: usize = 5;
const PREVIEW_COLS: usize = 8;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 820.0])
            .with_min_inner_size([480.0, 500.0])
            .with_title("Heatmap builder - rubix-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "Heatmap builder",
        options,
        Box::new(|_cc| Ok(Box::new(RubixApp::new()))),
    )
}

/// Main application state
struct RubixApp {
    // Uploads
    data_path: String,
    metadata_rows_path: String,
    metadata_cols_path: String,
    output_path: String,
    preset: PolicyPreset,

    // Form values; width/height/colorbar height are plain text fields here
    form: FormInput,
    width: String,
    height: String,
    colorbar_height: String,

    // Tables parsed from `loaded_paths`; reused by previews and render cycles
    uploads: Uploads,
    loaded_paths: UploadPaths,
    upload_warnings: Vec<String>,

    // UI state
    is_loading: bool,
    status_message: String,
    error_message: String,
    docs_text: Option<String>,

    // Background operations
    operation_receiver: Option<mpsc::Receiver<CycleOutcome>>,
    docs_receiver: Option<mpsc::Receiver<anyhow::Result<String>>>,
}

impl RubixApp {
    fn new() -> Self {
        // Default to user's home directory for output
        let home_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .to_string();

        let mut app = Self {
            data_path: String::new(),
            metadata_rows_path: String::new(),
            metadata_cols_path: String::new(),
            output_path: home_dir,
            preset: PolicyPreset::Standard,
            form: FormInput::default(),
            width: String::new(),
            height: String::new(),
            colorbar_height: String::new(),
            uploads: Uploads::default(),
            loaded_paths: UploadPaths::default(),
            upload_warnings: Vec::new(),
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            docs_text: None,
            operation_receiver: None,
            docs_receiver: None,
        };
        app.reload_uploads();
        app
    }

    fn upload_paths(&self) -> UploadPaths {
        let opt = |s: &str| {
            let t = s.trim();
            (!t.is_empty()).then(|| PathBuf::from(t))
        };
        UploadPaths {
            data: opt(&self.data_path),
            metadata_rows: opt(&self.metadata_rows_path),
            metadata_cols: opt(&self.metadata_cols_path),
        }
    }

    /// Parse the picked files once; defaults follow only a new main data file.
    fn reload_uploads(&mut self) {
        let paths = self.upload_paths();
        let (uploads, warnings) = Uploads::load(&paths);
        let data_changed = paths.data != self.loaded_paths.data || self.width.is_empty();
        self.uploads = uploads;
        self.upload_warnings = warnings;
        self.loaded_paths = paths;
        if data_changed {
            self.refresh_defaults();
        }
    }

    /// Prefill width/height/colorbar height from the loaded main data.
    fn refresh_defaults(&mut self) {
        let defaults = self.preset.policy().default_dimensions(self.uploads.shape());
        self.width = defaults.width.to_string();
        self.height = defaults.height.to_string();
        self.colorbar_height = default_colorbar_height(defaults).to_string();
    }

    fn start_operation(&mut self) {
        if self.output_path.trim().is_empty() {
            self.error_message = "Please specify an output directory".to_string();
            return;
        }

        self.is_loading = true;
        self.error_message.clear();
        self.status_message = "Rendering heatmap...".to_string();

        let (sender, receiver) = mpsc::channel();
        self.operation_receiver = Some(receiver);

        // Immutable snapshot of the form for this cycle
        let mut form = self.form.clone();
        form.width = Some(self.width.clone());
        form.height = Some(self.height.clone());
        form.colorbar_height = Some(self.colorbar_height.clone());
        let uploads = self.uploads.clone();
        let policy = self.preset.policy();
        let out_dir = PathBuf::from(&self.output_path);

        thread::spawn(move || {
            let renderer = PlottersRenderer::new(&out_dir);
            let outcome = run_cycle(&uploads, &form, &policy, &renderer, &out_dir);
            let _ = sender.send(outcome);
        });
    }

    fn start_docs_fetch(&mut self) {
        match DocsClient::new() {
            Ok(client) => {
                self.docs_receiver = Some(client.fetch_in_background());
                self.docs_text = Some("Loading documentation...".to_string());
            }
            Err(e) => self.docs_text = Some(format!("Could not load documentation: {:#}", e)),
        }
    }

    fn check_docs_result(&mut self) {
        let Some(receiver) = &self.docs_receiver else {
            return;
        };
        match receiver.try_recv() {
            Ok(res) => {
                self.docs_text = Some(
                    res.unwrap_or_else(|e| format!("Could not load documentation: {:#}", e)),
                );
                self.docs_receiver = None;
            }
            Err(TryRecvError::Disconnected) => {
                self.docs_text = Some("Could not load documentation".to_string());
                self.docs_receiver = None;
            }
            Err(TryRecvError::Empty) => {}
        }
    }

    fn check_operation_result(&mut self) {
        let Some(outcome) = self.operation_receiver.as_ref().and_then(CycleOutcome::poll) else {
            return;
        };
        self.is_loading = false;
        self.operation_receiver = None;

        match outcome {
            CycleOutcome::Rendered(_) => {
                self.status_message = outcome.message();
                self.error_message.clear();
            }
            CycleOutcome::Deferred(reason) => {
                self.status_message = reason;
                self.error_message.clear();
            }
            CycleOutcome::Failed(error) => {
                self.error_message = error;
                self.status_message.clear();
            }
        }
    }

    fn preview_section(&self, ui: &mut egui::Ui) {
        let previews = self.uploads.previews(PREVIEW_ROWS, PREVIEW_COLS);
        if previews.is_empty() {
            ui.label("No table loaded");
            return;
        }
        for (what, p) in previews {
            ui.label(format!(
                "{} ({} rows x {} columns)",
                what, p.shape.row_count, p.shape.column_count
            ));
            egui::ScrollArea::horizontal().id_salt(what).show(ui, |ui| {
                egui::Grid::new(what).striped(true).show(ui, |ui| {
                    ui.label("");
                    for c in &p.columns {
                        ui.strong(c);
                    }
                    ui.end_row();
                    for (label, cells) in &p.rows {
                        ui.strong(label);
                        for cell in cells {
                            ui.label(cell);
                        }
                        ui.end_row();
                    }
                });
            });
            if p.is_truncated() {
                ui.label("...");
            }
            ui.add_space(5.0);
        }
    }

    fn file_row(ui: &mut egui::Ui, label: &str, path: &mut String) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label(label);
            changed |= ui.text_edit_singleline(path).lost_focus();
            if ui.button("Browse").clicked()
                && let Some(p) = rfd::FileDialog::new().add_filter("CSV", &["csv"]).pick_file()
            {
                *path = p.to_string_lossy().to_string();
                changed = true;
            }
        });
        changed
    }
}

impl eframe::App for RubixApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_operation_result();
        self.check_docs_result();

        if self.is_loading || self.docs_receiver.is_some() {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Heatmap builder");
                ui.add_space(10.0);

                ui.group(|ui| {
                    ui.label("Data Files");
                    ui.add_space(5.0);
                    let mut changed = false;
                    changed |= Self::file_row(ui, "Main data:", &mut self.data_path);
                    changed |= Self::file_row(ui, "Rows metadata:", &mut self.metadata_rows_path);
                    changed |= Self::file_row(ui, "Columns metadata:", &mut self.metadata_cols_path);
                    if changed || self.loaded_paths != self.upload_paths() {
                        self.reload_uploads();
                    }
                    for w in &self.upload_warnings {
                        ui.colored_label(egui::Color32::from_rgb(200, 120, 0), w);
                    }
                    ui.checkbox(&mut self.form.save_png, "Also save plot as PNG image");
                });

                ui.collapsing("Preview", |ui| self.preview_section(ui));

                ui.add_space(10.0);

                ui.group(|ui| {
                    ui.label("Plot dimensions (pixels; one of the two may be `proportional`)");
                    ui.horizontal(|ui| {
                        ui.label("Sizing preset:");
                        let before = self.preset;
                        ui.radio_value(&mut self.preset, PolicyPreset::Standard, "Standard");
                        ui.radio_value(&mut self.preset, PolicyPreset::Compact, "Compact");
                        if before != self.preset {
                            self.refresh_defaults();
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Width:");
                        ui.text_edit_singleline(&mut self.width);
                    });
                    ui.horizontal(|ui| {
                        ui.label("Height:");
                        ui.text_edit_singleline(&mut self.height);
                    });
                });

                ui.add_space(10.0);

                ui.collapsing("Dataprep", |ui| {
                    axis_combo(ui, "Scale data along:", &mut self.form.scale_along, "do not scale");
                    axis_combo(
                        ui,
                        "Normalize data along:",
                        &mut self.form.normalize_along,
                        "do not normalize",
                    );
                    ui.add(
                        egui::Slider::new(&mut self.form.color_scaling_quantile, QUANTILE_RANGE)
                            .text("Color scaling quantile"),
                    );
                    labelled_text(ui, "Rows to drop:", &mut self.form.data_rows_to_drop);
                    labelled_text(ui, "Columns to drop:", &mut self.form.data_cols_to_drop);
                });

                ui.collapsing("Colorbar", |ui| {
                    ui.checkbox(&mut self.form.show_colorbar, "Show colorbar");
                    ui.horizontal(|ui| {
                        ui.label("Location:");
                        let loc = &mut self.form.colorbar_location;
                        ui.radio_value(loc, ColorbarLocation::Top, "top");
                        ui.radio_value(loc, ColorbarLocation::Center, "center");
                        ui.radio_value(loc, ColorbarLocation::Bottom, "bottom");
                    });
                    labelled_text(ui, "Title:", &mut self.form.colorbar_title);
                    labelled_text(ui, "Height (pixels):", &mut self.colorbar_height);
                });

                ui.collapsing("Metadata & legends", |ui| {
                    ui.checkbox(&mut self.form.show_metadata_rows, "Show rows metadata");
                    ui.checkbox(&mut self.form.show_metadata_rows_labels, "Show labels of rows metadata");
                    ui.checkbox(&mut self.form.show_metadata_cols, "Show columns metadata");
                    ui.horizontal(|ui| {
                        ui.label("Duplicate columns metadata at the bottom:");
                        let d = &mut self.form.duplicate_metadata_cols;
                        ui.radio_value(d, DuplicateColumns::No, "no");
                        ui.radio_value(d, DuplicateColumns::Yes, "yes");
                        ui.radio_value(d, DuplicateColumns::Auto, "depending on data size");
                    });
                    ui.checkbox(&mut self.form.show_rows_legend, "Show the legend for rows metadata");
                    ui.checkbox(&mut self.form.show_cols_legend, "Show the legend for columns metadata");
                });

                ui.collapsing("Colormaps", |ui| {
                    labelled_text(ui, "Main data:", &mut self.form.colormap_main);
                    labelled_text(ui, "Rows metadata:", &mut self.form.colormap_metarows);
                    labelled_text(ui, "Columns metadata:", &mut self.form.colormap_metacols);
                    labelled_text(ui, "NaN color:", &mut self.form.nan_color);
                    labelled_text(ui, "Separator color:", &mut self.form.sep_color);
                    ui.horizontal(|ui| {
                        ui.label("Separators behavior:");
                        egui::ComboBox::from_id_salt("sep_value")
                            .selected_text(format!("{:?}", self.form.sep_value))
                            .show_ui(ui, |ui| {
                                let v = &mut self.form.sep_value;
                                ui.selectable_value(v, SeparatorValue::UserColor, "user-defined color");
                                ui.selectable_value(v, SeparatorValue::Min, "min");
                                ui.selectable_value(v, SeparatorValue::Median, "median");
                                ui.selectable_value(v, SeparatorValue::Adapt, "adapt");
                            });
                    });
                });

                ui.collapsing("Plot enhancement", |ui| {
                    labelled_text(ui, "Rows metadata separator (column label):", &mut self.form.metadata_rows_sep);
                    labelled_text(ui, "Columns metadata separator (column label):", &mut self.form.metadata_cols_sep);
                    labelled_text(ui, "Row labels for highlighting:", &mut self.form.row_labels_for_highlighting);
                });

                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    ui.label("Output directory:");
                    ui.text_edit_singleline(&mut self.output_path);
                    if ui.button("Browse").clicked()
                        && let Some(path) = rfd::FileDialog::new().pick_folder()
                    {
                        self.output_path = path.to_string_lossy().to_string();
                    }
                });

                ui.add_space(15.0);

                ui.horizontal(|ui| {
                    if ui.add_enabled(!self.is_loading, egui::Button::new("UPDATE PLOT")).clicked() {
                        self.start_operation();
                    }

                    if self.is_loading {
                        ui.spinner();
                        ui.label("Processing...");
                    }

                    if ui
                        .add_enabled(self.docs_receiver.is_none(), egui::Button::new("Docs"))
                        .clicked()
                    {
                        self.start_docs_fetch();
                    }
                });

                ui.add_space(10.0);

                if !self.status_message.is_empty() {
                    ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
                }

                if !self.error_message.is_empty() {
                    ui.colored_label(egui::Color32::RED, &self.error_message);
                }

                if let Some(text) = &self.docs_text {
                    ui.collapsing("Documentation", |ui| {
                        ui.label(text.as_str());
                    });
                }
            });
        });
    }
}

fn labelled_text(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.text_edit_singleline(value);
    });
}

fn axis_combo(ui: &mut egui::Ui, label: &str, value: &mut Option<DataAxis>, none_label: &str) {
    ui.horizontal(|ui| {
        ui.label(label);
        let selected = match value {
            Some(DataAxis::Columns) => "columns",
            Some(DataAxis::Rows) => "rows",
            None => none_label,
        };
        egui::ComboBox::from_id_salt(label)
            .selected_text(selected)
            .show_ui(ui, |ui| {
                ui.selectable_value(value, Some(DataAxis::Columns), "columns");
                ui.selectable_value(value, Some(DataAxis::Rows), "rows");
                ui.selectable_value(value, None, none_label);
            });
    });
}
