use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use super::text::truncate_to_width;
use super::types::BarFigure;
use super::util::{
    category_tick_budget, compute_left_label_area_px, fmt_tick, label_at, office_color,
    padded_range,
};
use super::{MARGIN, axis_desc_font, render_err, title_font};
use crate::error::{AnalysisError, Result};

/// Center of bar `group` within category `category`: bars step right by one bar width per group.
pub fn bar_center(category: usize, group: usize, bar_width: f64) -> f64 {
    category as f64 + group as f64 * bar_width
}

/// Tick position under each category's cluster: `i + (groups - 1) * bar_width / 2`.
pub fn cluster_centers(categories: usize, groups: usize, bar_width: f64) -> Vec<f64> {
    let shift = axis_offset(groups, bar_width);
    (0..categories).map(|i| i as f64 + shift).collect()
}

/// Shift from bar coordinates to chart coordinates that puts every cluster center
/// on a whole number, where the default tick generator places its labels.
pub fn axis_offset(groups: usize, bar_width: f64) -> f64 {
    groups.saturating_sub(1) as f64 * bar_width / 2.0
}

pub(super) fn draw_grouped_bars<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    fig: &BarFigure,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;

    let values = fig.groups.iter().flat_map(|g| g.values.iter().copied());
    let all_non_negative = values.clone().all(|v| !(v < 0.0));
    let (mut ymin, ymax) = padded_range(values.chain(std::iter::once(0.0)))
        .ok_or_else(|| AnalysisError::EmptyInput(format!("{:?}: nothing to plot", fig.title)))?;
    if all_non_negative {
        ymin = 0.0;
    }

    let n = fig.categories.len();
    let g = fig.groups.len();
    let bw = fig.bar_width;
    let shift = axis_offset(g, bw);
    let ticks: Vec<f64> = cluster_centers(n, g, bw)
        .into_iter()
        .map(|c| c - shift)
        .collect();
    let x_lo = -bw / 2.0 - 0.3 - shift;
    let x_hi = bar_center(n - 1, g - 1, bw) + bw / 2.0 + 0.3 - shift;

    let (root_w, _) = root.dim_in_pixel();
    let caption = truncate_to_width(&fig.title, 20, root_w.saturating_sub(2 * MARGIN));
    let left = compute_left_label_area_px(ymin, ymax, 10, 12);

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .caption(caption, title_font())
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_lo..x_hi, ymin..ymax)
        .map_err(render_err)?;

    let x_label_fmt = |v: &f64| label_at(*v, &ticks, &fig.categories);
    let y_label_fmt = |v: &f64| fmt_tick(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(fig.y_label.as_str())
        .x_labels(category_tick_budget(x_lo, x_hi))
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style(axis_desc_font())
        .draw()
        .map_err(render_err)?;

    for (gi, (group, legend)) in fig.groups.iter().zip(&fig.legends).enumerate() {
        let color = office_color(gi);
        let bars = group.values.iter().enumerate().map(move |(ci, v)| {
            let x = bar_center(ci, gi, bw) - shift;
            Rectangle::new([(x - bw / 2.0, 0.0), (x + bw / 2.0, *v)], color.filled())
        });
        chart
            .draw_series(bars)
            .map_err(render_err)?
            .label(legend.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 14))
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
