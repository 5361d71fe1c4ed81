//! Static Chart Renderer
//! Renders dashboard charts to PNG files with plotters, using the same
//! palette and pie geometry as the interactive charts.

use crate::charts::{palette_rgb, pie_slices, wedge_outlines};
use crate::views::format::{format_compact, format_percent};
use crate::views::LabeledAmount;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

const TITLE_FONT: (&str, f64) = ("sans-serif", 28.0);
const LABEL_FONT: (&str, f64) = ("sans-serif", 16.0);

type RenderResult = Result<(), Box<dyn Error>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    fn color(index: usize) -> RGBColor {
        let (r, g, b) = palette_rgb(index);
        RGBColor(r, g, b)
    }

    /// Y range that always includes zero and leaves headroom above the data.
    fn value_range(values: &[f64]) -> (f64, f64) {
        let max = values.iter().copied().fold(0.0, f64::max);
        let min = values.iter().copied().fold(0.0, f64::min);
        let top = if max > 0.0 { max * 1.1 } else { 1.0 };
        let bottom = if min < 0.0 { min * 1.1 } else { 0.0 };
        (bottom, top)
    }

    fn draw_no_data(area: &DrawingArea<BitMapBackend<'_>, Shift>) -> RenderResult {
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            "Sin datos",
            (w as i32 / 2 - 40, h as i32 / 2),
            LABEL_FONT.into_font(),
        ))?;
        Ok(())
    }

    /// Vertical bar chart, one colored bar per category.
    pub fn render_bar_chart(
        path: &Path,
        title: &str,
        data: &[LabeledAmount],
        size: (u32, u32),
    ) -> RenderResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        if data.is_empty() {
            let area = root.titled(title, TITLE_FONT.into_font())?;
            Self::draw_no_data(&area)?;
            root.present()?;
            return Ok(());
        }

        let values: Vec<f64> = data.iter().map(|d| d.amount).collect();
        let (bottom, top) = Self::value_range(&values);

        let mut chart = ChartBuilder::on(&root)
            .caption(title, TITLE_FONT.into_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0..data.len()).into_segmented(), bottom..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(data.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => {
                    data.get(*i).map(|d| d.label.clone()).unwrap_or_default()
                }
                _ => String::new(),
            })
            .y_label_formatter(&|v| format_compact(*v))
            .label_style(LABEL_FONT.into_font())
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, d)| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), d.amount)],
                Self::color(i).filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))?;

        root.present()?;
        Ok(())
    }

    /// Pie chart with a legend listing each category and its share.
    pub fn render_pie_chart(
        path: &Path,
        title: &str,
        data: &[LabeledAmount],
        size: (u32, u32),
    ) -> RenderResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(title, TITLE_FONT.into_font())?;

        let values: Vec<f64> = data.iter().map(|d| d.amount).collect();
        let slices = pie_slices(&values);
        if slices.is_empty() {
            Self::draw_no_data(&area)?;
            root.present()?;
            return Ok(());
        }

        let (w, h) = area.dim_in_pixel();
        let (cx, cy) = (w as f64 * 0.35, h as f64 / 2.0);
        let radius = (w as f64 * 0.3).min(h as f64 * 0.42);

        for slice in &slices {
            let color = Self::color(slice.index);
            for outline in wedge_outlines(slice, 32) {
                let pixels: Vec<(i32, i32)> = outline
                    .iter()
                    .map(|[x, y]| {
                        (
                            (cx + x * radius).round() as i32,
                            (cy - y * radius).round() as i32,
                        )
                    })
                    .collect();
                area.draw(&Polygon::new(pixels, color.filled()))?;
            }
        }

        let legend_x = (w as f64 * 0.72) as i32;
        for (row, slice) in slices.iter().enumerate() {
            let y = 40 + row as i32 * 28;
            area.draw(&Rectangle::new(
                [(legend_x, y), (legend_x + 16, y + 16)],
                Self::color(slice.index).filled(),
            ))?;
            area.draw(&Text::new(
                format!(
                    "{} ({})",
                    data[slice.index].label,
                    format_percent(slice.share * 100.0)
                ),
                (legend_x + 24, y),
                LABEL_FONT.into_font(),
            ))?;
        }

        root.present()?;
        Ok(())
    }

    /// Line chart with markers; `labels[i]` names the i-th point.
    pub fn render_line_chart(
        path: &Path,
        title: &str,
        labels: &[String],
        values: &[f64],
        size: (u32, u32),
    ) -> RenderResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        if values.is_empty() {
            let area = root.titled(title, TITLE_FONT.into_font())?;
            Self::draw_no_data(&area)?;
            root.present()?;
            return Ok(());
        }

        let (bottom, top) = Self::value_range(values);
        let x_max = values.len().saturating_sub(1).max(1) as f64;
        let color = Self::color(0);
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, TITLE_FONT.into_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(-0.2f64..x_max + 0.2, bottom..top)?;

        chart
            .configure_mesh()
            .x_labels(values.len().min(12))
            .x_label_formatter(&|x| {
                if *x < -0.5 || (x - x.round()).abs() > 1e-6 {
                    return String::new();
                }
                labels.get(x.round() as usize).cloned().unwrap_or_default()
            })
            .y_label_formatter(&|v| format_compact(*v))
            .label_style(LABEL_FONT.into_font())
            .draw()?;

        chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;

        root.present()?;
        Ok(())
    }
}
