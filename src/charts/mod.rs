//! Charts module - interactive (egui_plot) and static (plotters) rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;

use std::f64::consts::{FRAC_PI_2, TAU};

/// Series colors shared by the interactive and the exported charts.
pub const PALETTE_RGB: [(u8, u8, u8); 10] = [
    (52, 152, 219),  // Blue
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (121, 85, 72),   // Brown
    (96, 125, 139),  // Blue Grey
];

pub fn palette_rgb(index: usize) -> (u8, u8, u8) {
    PALETTE_RGB[index % PALETTE_RGB.len()]
}

/// Angular extent of one pie slice, in radians, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub share: f64,
}

/// Split values into pie slices. Negative values are treated as zero and
/// zero-sized slices are skipped.
pub fn pie_slices(values: &[f64]) -> Vec<PieSlice> {
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut start = 0.0;
    values
        .iter()
        .enumerate()
        .filter_map(|(index, &v)| {
            let share = v.max(0.0) / total;
            if share <= 0.0 {
                return None;
            }
            let end = start + share * TAU;
            let slice = PieSlice {
                index,
                start,
                end,
                share,
            };
            start = end;
            Some(slice)
        })
        .collect()
}

/// Outline of a slice as convex wedges of at most a quarter turn each, in
/// unit-circle coordinates (y up).
pub fn wedge_outlines(slice: &PieSlice, steps_per_wedge: usize) -> Vec<Vec<[f64; 2]>> {
    let steps = steps_per_wedge.max(1);
    let sweep = slice.end - slice.start;
    let wedges = (sweep / FRAC_PI_2 - 1e-9).ceil().max(1.0) as usize;
    let wedge_sweep = sweep / wedges as f64;

    (0..wedges)
        .map(|w| {
            let from = slice.start + w as f64 * wedge_sweep;
            let mut outline = Vec::with_capacity(steps + 2);
            outline.push([0.0, 0.0]);
            for s in 0..=steps {
                let angle = FRAC_PI_2 - (from + wedge_sweep * s as f64 / steps as f64);
                outline.push([angle.cos(), angle.sin()]);
            }
            outline
        })
        .collect()
}
