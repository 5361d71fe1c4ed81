//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::DashboardConfig;
use crate::data::{DataLoader, DatasetCache, LoadedDatasets};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::report::ReportExporter;
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use tracing::{error, warn};

/// Dataset loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Arc<LoadedDatasets>),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    cache: Arc<Mutex<DatasetCache>>,
    datasets: Option<Arc<LoadedDatasets>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

/// State of the loader channel after draining it once.
#[derive(Debug)]
enum LoadPoll {
    /// Still running; carries the latest progress message, if any.
    Pending(Option<String>),
    Complete(Arc<LoadedDatasets>),
    /// The loader thread ended without sending a result.
    Lost,
}

fn poll_loader(rx: &Receiver<LoadResult>) -> LoadPoll {
    let mut progress = None;
    loop {
        match rx.try_recv() {
            Ok(LoadResult::Progress(status)) => progress = Some(status),
            Ok(LoadResult::Complete(datasets)) => return LoadPoll::Complete(datasets),
            Err(TryRecvError::Empty) => return LoadPoll::Pending(progress),
            Err(TryRecvError::Disconnected) => return LoadPoll::Lost,
        }
    }
}

/// A panicked loader leaves the cache as it was before the load started.
fn lock_cache(cache: &Mutex<DatasetCache>) -> MutexGuard<'_, DatasetCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(config.data_dir.clone()),
            config,
            cache: Arc::new(Mutex::new(DatasetCache::new())),
            datasets: None,
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        app.start_load();
        app
    }

    /// Load the datasets of the selected directory in the background. The
    /// cache hands back the previous load when the directory is unchanged.
    fn start_load(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        let data_dir = self.control_panel.data_dir.clone();
        self.control_panel.set_progress(0.0, "Loading datasets...");
        self.control_panel.export_enabled = false;
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let cache = Arc::clone(&self.cache);

        // Load CSV files in background thread
        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(format!(
                "Reading {}...",
                data_dir.display()
            )));
            let datasets = lock_cache(&cache).get_or_load(&DataLoader::new(data_dir));
            let _ = tx.send(LoadResult::Complete(datasets));
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match poll_loader(&rx) {
            LoadPoll::Pending(progress) => {
                if let Some(status) = progress {
                    self.control_panel.set_progress(10.0, &status);
                }
                self.load_rx = Some(rx);
            }
            LoadPoll::Complete(datasets) => {
                self.apply_datasets(datasets);
                self.is_loading = false;
            }
            LoadPoll::Lost => {
                error!("dataset loader stopped without a result");
                self.control_panel.set_progress(0.0, "Loading failed, see log");
                self.is_loading = false;
            }
        }
    }

    fn apply_datasets(&mut self, datasets: Arc<LoadedDatasets>) {
        self.chart_viewer.set_datasets(&datasets);

        let loaded = datasets.loaded_count();
        let total = datasets.keys().count();
        let status = if loaded == total {
            format!("Loaded {loaded}/{total} datasets")
        } else {
            format!(
                "Loaded {loaded}/{total} datasets ({} failed)",
                total - loaded
            )
        };
        self.control_panel.set_progress(100.0, &status);
        self.control_panel.export_enabled = self.chart_viewer.has_charts();
        self.datasets = Some(datasets);
    }

    fn handle_reload(&mut self) {
        if self.is_loading {
            return;
        }
        lock_cache(&self.cache).invalidate();
        self.start_load();
    }

    fn handle_browse_data_dir(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.control_panel.data_dir)
            .pick_folder()
        {
            self.chart_viewer.clear();
            self.datasets = None;
            self.control_panel.data_dir = dir;
            self.start_load();
        }
    }

    /// Export all charts and the KPI summary to a timestamped folder.
    fn handle_export_charts(&mut self) {
        let Some(datasets) = self.datasets.clone() else {
            self.control_panel.set_progress(0.0, "No data loaded");
            return;
        };

        let Some(parent) = rfd::FileDialog::new()
            .set_directory(&self.config.export_dir)
            .pick_folder()
        else {
            return; // User cancelled
        };
        let target = parent.join(format!(
            "tablero_{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));

        self.control_panel.set_progress(50.0, "Rendering charts...");

        match ReportExporter::export(&datasets, &target) {
            Ok(report) => {
                let mut status = format!("Exported {} files", report.files.len());
                if !report.skipped.is_empty() {
                    status.push_str(&format!(", {} views skipped", report.skipped.len()));
                }
                self.control_panel.set_progress(100.0, &status);

                if let Err(e) = open::that(&report.directory) {
                    warn!(error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Export failed: {e}"));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, self.is_loading);

                    match action {
                        ControlPanelAction::BrowseDataDir => self.handle_browse_data_dir(),
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        let page = self.control_panel.page;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, page);
        });
    }
}
