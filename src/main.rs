//! Tablero Andina - Receivables & Inventory KPI Dashboard
//!
//! Loads the Andina CSV extracts and shows credit risk and inventory
//! dashboards with interactive charts.

mod charts;
mod config;
mod data;
mod gui;
mod report;
mod views;

use config::DashboardConfig;
use eframe::egui;
use gui::DashboardApp;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DashboardConfig::load()?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Tablero Andina"),
        ..Default::default()
    };

    info!("starting dashboard");

    // Run the application
    eframe::run_native(
        "Tablero Andina",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
