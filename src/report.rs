//! Report Export Module
//! Writes every dashboard chart as a PNG plus a JSON KPI summary into one
//! directory.

use crate::charts::StaticChartRenderer;
use crate::data::{DatasetStatus, LoadedDatasets};
use crate::views::{CreditRiskSummary, InventorySummary};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const CHART_SIZE: (u32, u32) = (1200, 700);
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to render {file}: {message}")]
    Render { file: String, message: String },
    #[error("Failed to write summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Files written and views skipped by one export.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

#[derive(Serialize)]
struct DashboardSummary<'a> {
    generated_at: String,
    data_dir: String,
    datasets: Vec<DatasetStatus>,
    credit_risk: Option<&'a CreditRiskSummary>,
    inventory: Option<&'a InventorySummary>,
}

/// Exports the dashboard to static files.
pub struct ReportExporter;

impl ReportExporter {
    pub fn export(
        datasets: &LoadedDatasets,
        directory: &Path,
    ) -> Result<ExportReport, ExportError> {
        fs::create_dir_all(directory)?;
        let mut report = ExportReport {
            directory: directory.to_path_buf(),
            ..Default::default()
        };

        let credit = match CreditRiskSummary::from_datasets(datasets) {
            Ok(summary) => {
                Self::export_credit_charts(&summary, directory, &mut report)?;
                Some(summary)
            }
            Err(e) => {
                warn!(error = %e, "credit risk charts skipped");
                report.skipped.push(format!("Riesgo crediticio: {e}"));
                None
            }
        };

        let inventory = match InventorySummary::from_datasets(datasets) {
            Ok(summary) => {
                Self::export_inventory_charts(&summary, directory, &mut report)?;
                Some(summary)
            }
            Err(e) => {
                warn!(error = %e, "inventory charts skipped");
                report.skipped.push(format!("Inventario: {e}"));
                None
            }
        };

        let summary = DashboardSummary {
            generated_at: chrono::Local::now().to_rfc3339(),
            data_dir: datasets.data_dir().display().to_string(),
            datasets: datasets.statuses(),
            credit_risk: credit.as_ref(),
            inventory: inventory.as_ref(),
        };
        let summary_path = directory.join(SUMMARY_FILE);
        fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
        report.files.push(summary_path);

        info!(
            directory = %directory.display(),
            files = report.files.len(),
            skipped = report.skipped.len(),
            "dashboard exported"
        );
        Ok(report)
    }

    fn export_credit_charts(
        summary: &CreditRiskSummary,
        directory: &Path,
        report: &mut ExportReport,
    ) -> Result<(), ExportError> {
        Self::render(directory, "aging.png", report, |path| {
            StaticChartRenderer::render_bar_chart(
                path,
                "Cartera por Rango de Mora",
                &summary.aging_series(),
                CHART_SIZE,
            )
        })?;
        Self::render(directory, "region_risk.png", report, |path| {
            StaticChartRenderer::render_pie_chart(
                path,
                "Saldo Vencido por Región",
                &summary.region_risk,
                CHART_SIZE,
            )
        })
    }

    fn export_inventory_charts(
        summary: &InventorySummary,
        directory: &Path,
        report: &mut ExportReport,
    ) -> Result<(), ExportError> {
        Self::render(directory, "inventory_by_center.png", report, |path| {
            StaticChartRenderer::render_bar_chart(
                path,
                "Valor por Centro",
                &summary.value_by_center,
                CHART_SIZE,
            )
        })?;
        Self::render(directory, "inventory_category_value.png", report, |path| {
            StaticChartRenderer::render_pie_chart(
                path,
                "Por Valor",
                &summary.value_by_category,
                CHART_SIZE,
            )
        })?;
        Self::render(directory, "inventory_category_units.png", report, |path| {
            StaticChartRenderer::render_pie_chart(
                path,
                "Por Unidades",
                &summary.units_by_category,
                CHART_SIZE,
            )
        })?;

        let labels: Vec<String> = summary
            .value_history
            .iter()
            .map(|s| s.cutoff_date.to_string())
            .collect();
        let values: Vec<f64> = summary.value_history.iter().map(|s| s.total_value).collect();
        Self::render(directory, "inventory_trend.png", report, |path| {
            StaticChartRenderer::render_line_chart(
                path,
                "Valor Total en el Tiempo",
                &labels,
                &values,
                CHART_SIZE,
            )
        })
    }

    fn render<F>(
        directory: &Path,
        file: &str,
        report: &mut ExportReport,
        draw: F,
    ) -> Result<(), ExportError>
    where
        F: FnOnce(&Path) -> Result<(), Box<dyn std::error::Error>>,
    {
        let path = directory.join(file);
        draw(&path).map_err(|e| ExportError::Render {
            file: file.to_string(),
            message: e.to_string(),
        })?;
        report.files.push(path);
        Ok(())
    }
}
