//! Control Panel Widget
//! Left side panel: data source, page selection, actions and progress.

use egui::{Color32, RichText};
use std::path::PathBuf;

/// Dashboard pages selectable from the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardPage {
    #[default]
    CreditRisk,
    Inventory,
    Datasets,
}

impl DashboardPage {
    pub const ALL: [DashboardPage; 3] = [
        DashboardPage::CreditRisk,
        DashboardPage::Inventory,
        DashboardPage::Datasets,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DashboardPage::CreditRisk => "Riesgo Crediticio",
            DashboardPage::Inventory => "Inventario y Operaciones",
            DashboardPage::Datasets => "Fuentes de Datos",
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub data_dir: PathBuf,
    pub page: DashboardPage,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            page: DashboardPage::default(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, is_loading: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Tablero Andina")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Cartera & Inventario")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(self.data_dir.display().to_string())
                        .size(12.0)
                        .monospace(),
                );
                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!is_loading, |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseDataDir;
                        }
                        if ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Page Section =====
        ui.label(RichText::new("🗂 Views").size(14.0).strong());
        ui.add_space(5.0);

        for page in DashboardPage::ALL {
            ui.selectable_value(&mut self.page, page, page.title());
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled && !is_loading, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                    .min_size(egui::vec2(180.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(is_loading),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") || self.status.contains("failed") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseDataDir,
    Reload,
    ExportCharts,
}
