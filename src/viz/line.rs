use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use super::legend::draw_side_legend;
use super::text::truncate_to_width;
use super::types::LineFigure;
use super::util::{
    category_tick_budget, compute_left_label_area_px, fmt_tick, label_at, padded_range,
};
use super::{MARGIN, axis_desc_font, render_err, title_font};
use crate::error::{AnalysisError, Result};

pub(super) fn draw_lines<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    fig: &LineFigure,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;

    let (ymin, ymax) = padded_range(fig.series.iter().flat_map(|s| s.values.iter().copied()))
        .ok_or_else(|| AnalysisError::EmptyInput(format!("{:?}: nothing to plot", fig.title)))?;

    // Legend lives outside the plotting area, right of it.
    let (plot_area, legend_area) = root.split_horizontally((80).percent_width());

    let n = fig.x_labels.len();
    let positions: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let pad = if n > 1 { (n - 1) as f64 * 0.05 } else { 0.5 };
    // Years sit on integer positions so the default tick generator lands on them.
    let x_max = n.saturating_sub(1) as f64;

    let (plot_w, _) = plot_area.dim_in_pixel();
    let caption = truncate_to_width(&fig.title, 20, plot_w.saturating_sub(2 * MARGIN));
    let left = compute_left_label_area_px(ymin, ymax, 10, 12);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .caption(caption, title_font())
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(-pad..x_max + pad, ymin..ymax)
        .map_err(render_err)?;

    let x_label_fmt = |v: &f64| label_at(*v, &positions, &fig.x_labels);
    let y_label_fmt = |v: &f64| fmt_tick(*v);
    chart
        .configure_mesh()
        .x_desc(fig.x_label.as_str())
        .y_desc(fig.y_label.as_str())
        .x_labels(category_tick_budget(-pad, x_max + pad))
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style(axis_desc_font())
        .draw()
        .map_err(render_err)?;

    for (series, color) in fig.series.iter().zip(&fig.colors) {
        let points = series
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(render_err)?;
    }

    let items: Vec<(String, RGBColor)> = fig
        .legends
        .iter()
        .cloned()
        .zip(fig.colors.iter().copied())
        .collect();
    draw_side_legend(&legend_area, &items, MARGIN as i32 + 40)?;

    root.present().map_err(render_err)?;
    Ok(())
}
