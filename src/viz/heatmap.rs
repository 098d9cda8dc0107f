use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::estimate_text_width_px;
use super::types::HeatmapFigure;
use super::util::{category_tick_budget, coolwarm, label_at};
use super::{MARGIN, render_err, title_font};
use crate::error::Result;

const NAN_CELL: RGBColor = RGBColor(160, 160, 160);
const LABEL_PX: u32 = 13;

/// Finite min/max of the matrix; falls back to `[-1, 1]` when nothing is finite.
fn value_span(fig: &HeatmapFigure) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in fig.matrix.cells().iter().flatten().filter(|v| v.is_finite()) {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }
    if lo > hi { (-1.0, 1.0) } else { (lo, hi) }
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi - lo < f64::EPSILON {
        0.5
    } else {
        (v - lo) / (hi - lo)
    }
}

/// Cell text: two decimals, `nan` for undefined coefficients.
pub fn annotation(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        "nan".to_string()
    }
}

pub(super) fn draw_heatmap<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    fig: &HeatmapFigure,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;
    let body = root.titled(&fig.title, title_font()).map_err(render_err)?;
    let (grid_area, bar_area) = body.split_horizontally((88).percent_width());

    let n = fig.labels.len();
    let (lo, hi) = value_span(fig);
    let positions: Vec<f64> = (0..n).map(|i| i as f64).collect();
    // Row 0 sits at the top, so the y axis reads the labels bottom-up.
    let y_labels: Vec<String> = fig.labels.iter().rev().cloned().collect();

    let gutter = fig
        .labels
        .iter()
        .map(|l| estimate_text_width_px(l, LABEL_PX))
        .max()
        .unwrap_or(0)
        .saturating_add(16)
        .clamp(40, 260);

    let span = (-0.5, n as f64 - 0.5);
    let ticks = category_tick_budget(span.0, span.1);
    let mut chart = ChartBuilder::on(&grid_area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, gutter)
        .set_label_area_size(LabelAreaPosition::Bottom, gutter)
        .build_cartesian_2d(span.0..span.1, span.0..span.1)
        .map_err(render_err)?;

    let x_label_fmt = |v: &f64| label_at(*v, &positions, &fig.labels);
    let y_label_fmt = |v: &f64| label_at(*v, &positions, &y_labels);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(ticks)
        .y_labels(ticks)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .x_label_style(
            (FontFamily::SansSerif, LABEL_PX)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style((FontFamily::SansSerif, LABEL_PX))
        .draw()
        .map_err(render_err)?;

    let mut cells = Vec::with_capacity(n * n);
    let mut notes = Vec::with_capacity(n * n);
    let note_style = TextStyle::from((FontFamily::SansSerif, 14))
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (i, row) in fig.matrix.cells().iter().enumerate() {
        let y = (n - 1 - i) as f64;
        for (j, v) in row.iter().enumerate() {
            let x = j as f64;
            let color = if v.is_finite() {
                coolwarm(normalize(*v, lo, hi))
            } else {
                NAN_CELL
            };
            cells.push(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                color.filled(),
            ));
            notes.push(Text::new(annotation(*v), (x, y), note_style.clone()));
        }
    }
    chart.draw_series(cells).map_err(render_err)?;
    chart.draw_series(notes).map_err(render_err)?;

    draw_color_bar(&bar_area, lo, hi, gutter)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lo: f64,
    hi: f64,
    bottom_px: u32,
) -> Result<()> {
    let (lo, hi) = if hi - lo < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    };
    let mut bar = ChartBuilder::on(area)
        .margin(MARGIN)
        .margin_bottom(MARGIN + bottom_px)
        .set_label_area_size(LabelAreaPosition::Right, 44)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(render_err)?;

    let tick_fmt = |v: &f64| format!("{v:.1}");
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(8)
        .y_label_formatter(&tick_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .draw()
        .map_err(render_err)?;

    const STEPS: usize = 64;
    let step = (hi - lo) / STEPS as f64;
    bar.draw_series((0..STEPS).map(|k| {
        let v0 = lo + step * k as f64;
        let t = (k as f64 + 0.5) / STEPS as f64;
        Rectangle::new([(0.0, v0), (1.0, v0 + step)], coolwarm(t).filled())
    }))
    .map_err(render_err)?;
    Ok(())
}
