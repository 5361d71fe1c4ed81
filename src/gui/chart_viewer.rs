//! Chart Viewer Widget
//! Central scrollable panel rendering the selected dashboard page.

use crate::charts::ChartPlotter;
use crate::data::{DatasetStatus, LoadedDatasets};
use crate::gui::DashboardPage;
use crate::views::format::{format_count, format_currency, format_percent};
use crate::views::{CreditRiskSummary, InventorySummary};
use egui::{Color32, RichText, ScrollArea};
use tracing::warn;

const SECTION_SPACING: f32 = 15.0;

/// Scrollable view of one dashboard page.
///
/// Summaries are computed once per load cycle, not per frame. A failed view
/// keeps its error message and renders nothing else.
#[derive(Default)]
pub struct ChartViewer {
    credit_risk: Option<Result<CreditRiskSummary, String>>,
    inventory: Option<Result<InventorySummary, String>>,
    statuses: Vec<DatasetStatus>,
    diagnostics: Vec<String>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.credit_risk = None;
        self.inventory = None;
        self.statuses.clear();
        self.diagnostics.clear();
    }

    /// Whether any view has something to export.
    pub fn has_charts(&self) -> bool {
        matches!(self.credit_risk, Some(Ok(_))) || matches!(self.inventory, Some(Ok(_)))
    }

    pub fn set_datasets(&mut self, datasets: &LoadedDatasets) {
        self.credit_risk = Some(CreditRiskSummary::from_datasets(datasets).map_err(|e| {
            warn!(error = %e, "credit risk view unavailable");
            e.to_string()
        }));
        self.inventory = Some(InventorySummary::from_datasets(datasets).map_err(|e| {
            warn!(error = %e, "inventory view unavailable");
            e.to_string()
        }));
        self.statuses = datasets.statuses();
        self.diagnostics = datasets
            .diagnostics()
            .into_iter()
            .map(|(_, diagnostic)| diagnostic.to_string())
            .collect();
    }

    pub fn show(&self, ui: &mut egui::Ui, page: DashboardPage) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new(page.title()).size(24.0).strong());
                ui.add_space(10.0);

                match page {
                    DashboardPage::CreditRisk => match &self.credit_risk {
                        None => Self::placeholder(ui),
                        Some(Err(message)) => Self::error_banner(ui, message),
                        Some(Ok(summary)) => Self::show_credit_risk(ui, summary),
                    },
                    DashboardPage::Inventory => match &self.inventory {
                        None => Self::placeholder(ui),
                        Some(Err(message)) => Self::error_banner(ui, message),
                        Some(Ok(summary)) => Self::show_inventory(ui, summary),
                    },
                    DashboardPage::Datasets => {
                        Self::show_datasets(ui, &self.statuses, &self.diagnostics)
                    }
                }
            });
    }

    fn placeholder(ui: &mut egui::Ui) {
        ui.centered_and_justified(|ui| {
            ui.label(RichText::new("No Data").size(20.0));
        });
    }

    fn error_banner(ui: &mut egui::Ui, message: &str) {
        egui::Frame::none()
            .fill(Color32::from_rgb(248, 215, 218))
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!("⚠ {message}"))
                        .size(14.0)
                        .color(Color32::from_rgb(114, 28, 36)),
                );
            });
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(SECTION_SPACING);
        ui.separator();
        ui.label(RichText::new(title).size(17.0).strong());
        ui.add_space(5.0);
    }

    fn kpi_row(ui: &mut egui::Ui, kpis: [(&str, String); 3]) {
        ui.columns(3, |columns| {
            for (column, (title, value)) in columns.iter_mut().zip(kpis) {
                egui::Frame::none()
                    .fill(column.visuals().widgets.noninteractive.bg_fill)
                    .rounding(8.0)
                    .inner_margin(12.0)
                    .show(column, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(title).size(12.0).color(Color32::GRAY));
                        ui.label(RichText::new(value).size(24.0).strong());
                    });
            }
        });
    }

    fn show_credit_risk(ui: &mut egui::Ui, summary: &CreditRiskSummary) {
        Self::kpi_row(
            ui,
            [
                ("Total Cartera", format_currency(summary.total_balance)),
                ("Cartera Vencida", format_currency(summary.overdue_balance)),
                ("Riesgo de Portafolio (%)", format_percent(summary.overdue_pct)),
            ],
        );

        Self::section(ui, "Edades de Cartera");
        ChartPlotter::draw_bar_chart(
            ui,
            "aging_chart",
            &summary.aging_series(),
            "Días de Mora",
            "Saldo (COP)",
        );

        Self::section(ui, "Saldo Vencido por Región");
        ChartPlotter::draw_pie_chart(ui, "region_chart", &summary.region_risk);

        Self::section(ui, "Facturas con Mayor Mora");
        if summary.top_delinquent.is_empty() {
            ui.label(RichText::new("Sin facturas vencidas").color(Color32::GRAY));
            return;
        }
        egui::Grid::new("top_delinquent")
            .striped(true)
            .num_columns(4)
            .min_col_width(110.0)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("ID Cliente").strong());
                ui.label(RichText::new("Factura").strong());
                ui.label(RichText::new("Saldo Vencido").strong());
                ui.label(RichText::new("Días Mora").strong());
                ui.end_row();

                for invoice in &summary.top_delinquent {
                    ui.label(&invoice.client_id);
                    ui.label(&invoice.invoice_id);
                    ui.label(format_currency(invoice.overdue_balance));
                    ui.label(invoice.max_days_overdue.to_string());
                    ui.end_row();
                }
            });
    }

    fn show_inventory(ui: &mut egui::Ui, summary: &InventorySummary) {
        match summary.latest_cutoff {
            Some(date) => {
                ui.label(
                    RichText::new(format!("Mostrando inventario al corte de: {date}"))
                        .color(Color32::from_rgb(23, 162, 184)),
                );
            }
            None => {
                Self::error_banner(ui, "El inventario no tiene fechas de corte.");
                return;
            }
        }
        ui.add_space(8.0);

        Self::kpi_row(
            ui,
            [
                ("Valor Total Inventario", format_currency(summary.total_value)),
                ("Unidades Totales", format_count(summary.total_units)),
                ("Total SKUs", summary.distinct_products.to_string()),
            ],
        );

        Self::section(ui, "Valor de Inventario por Centro Logístico");
        ChartPlotter::draw_bar_chart(
            ui,
            "center_chart",
            &summary.value_by_center,
            "Centro Logístico",
            "Valor (COP)",
        );

        Self::section(ui, "Distribución de Stock por Categoría");
        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Por Valor").strong());
            ChartPlotter::draw_pie_chart(
                &mut columns[0],
                "category_value_chart",
                &summary.value_by_category,
            );
            columns[1].label(RichText::new("Por Unidades").strong());
            ChartPlotter::draw_pie_chart(
                &mut columns[1],
                "category_units_chart",
                &summary.units_by_category,
            );
        });

        Self::section(ui, "Tendencia de Valor de Inventario");
        let labels: Vec<String> = summary
            .value_history
            .iter()
            .map(|s| s.cutoff_date.to_string())
            .collect();
        let values: Vec<f64> = summary.value_history.iter().map(|s| s.total_value).collect();
        ChartPlotter::draw_line_chart(
            ui,
            "trend_chart",
            &labels,
            &values,
            "Fecha Corte",
            "Valor (COP)",
        );
    }

    fn show_datasets(ui: &mut egui::Ui, statuses: &[DatasetStatus], diagnostics: &[String]) {
        if statuses.is_empty() {
            Self::placeholder(ui);
            return;
        }

        egui::Grid::new("dataset_status")
            .striped(true)
            .num_columns(4)
            .min_col_width(90.0)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Dataset").strong());
                ui.label(RichText::new("Archivo").strong());
                ui.label(RichText::new("Filas").strong());
                ui.label(RichText::new("Columnas").strong());
                ui.end_row();

                for status in statuses {
                    let color = if status.loaded {
                        Color32::from_rgb(40, 167, 69)
                    } else {
                        Color32::from_rgb(220, 53, 69)
                    };
                    ui.label(RichText::new(status.key.as_str()).color(color).strong());
                    ui.label(status.file_name);
                    ui.label(format_count(status.rows as f64));
                    ui.label(status.columns.join(", "));
                    ui.end_row();
                }
            });

        if !diagnostics.is_empty() {
            Self::section(ui, "Diagnósticos");
            for diagnostic in diagnostics {
                Self::error_banner(ui, diagnostic);
                ui.add_space(4.0);
            }
        }
    }
}
