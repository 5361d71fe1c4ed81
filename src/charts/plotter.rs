//! Chart Plotter Module
//! Creates interactive bar, pie and line charts using egui_plot.

use crate::charts::{palette_rgb, pie_slices, wedge_outlines};
use crate::views::format::{format_compact, format_percent};
use crate::views::LabeledAmount;
use egui::{Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points, Polygon};

const CHART_HEIGHT: f32 = 300.0;
const PIE_STEPS_PER_WEDGE: usize = 24;

/// Creates dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn get_color(index: usize) -> Color32 {
        let (r, g, b) = palette_rgb(index);
        Color32::from_rgb(r, g, b)
    }

    /// Label for an integer x position, empty between categories.
    fn category_label(labels: &[String], x: f64) -> String {
        if x < -0.5 || (x - x.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(x.round() as usize).cloned().unwrap_or_default()
    }

    /// One grid mark per category so every label is shown.
    fn category_marks(count: usize) -> Vec<GridMark> {
        (0..count)
            .map(|i| GridMark {
                value: i as f64,
                step_size: 1.0,
            })
            .collect()
    }

    fn no_data(ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.label(RichText::new("Sin datos").color(Color32::GRAY));
        ui.add_space(10.0);
    }

    /// Vertical bar chart, one bar per category in the given order.
    pub fn draw_bar_chart(
        ui: &mut egui::Ui,
        id: &str,
        data: &[LabeledAmount],
        x_label: &str,
        y_label: &str,
    ) {
        if data.is_empty() {
            Self::no_data(ui);
            return;
        }

        let labels: Vec<String> = data.iter().map(|d| d.label.clone()).collect();
        let count = labels.len();

        let bars: Vec<Bar> = data
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Bar::new(i as f64, d.amount)
                    .name(&d.label)
                    .width(0.6)
                    .fill(Self::get_color(i))
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .x_grid_spacer(move |_input| Self::category_marks(count))
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .y_axis_formatter(|mark, _range| format_compact(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(y_label));
            });
    }

    /// Pie chart with a legend entry per slice showing its share.
    pub fn draw_pie_chart(ui: &mut egui::Ui, id: &str, data: &[LabeledAmount]) {
        let values: Vec<f64> = data.iter().map(|d| d.amount).collect();
        let slices = pie_slices(&values);
        if slices.is_empty() {
            Self::no_data(ui);
            return;
        }

        Plot::new(id)
            .height(CHART_HEIGHT)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for slice in &slices {
                    let color = Self::get_color(slice.index);
                    let name = format!(
                        "{} ({})",
                        data[slice.index].label,
                        format_percent(slice.share * 100.0)
                    );
                    for outline in wedge_outlines(slice, PIE_STEPS_PER_WEDGE) {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(outline))
                                .fill_color(color)
                                .stroke(Stroke::new(1.0, color))
                                .name(&name),
                        );
                    }
                }
            });
    }

    /// Line chart with markers over labelled x positions (e.g. dates).
    pub fn draw_line_chart(
        ui: &mut egui::Ui,
        id: &str,
        labels: &[String],
        values: &[f64],
        x_label: &str,
        y_label: &str,
    ) {
        if values.is_empty() {
            Self::no_data(ui);
            return;
        }

        let points: Vec<[f64; 2]> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| [i as f64, v])
            .collect();
        let labels = labels.to_vec();
        let count = labels.len();
        let color = Self::get_color(0);

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .x_grid_spacer(move |_input| Self::category_marks(count))
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .y_axis_formatter(|mark, _range| format_compact(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .color(color)
                        .width(2.0)
                        .name(y_label),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(4.0)
                        .color(color),
                );
            });
    }
}
