//! Legend panel drawn in its own area to the right of a chart.

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::render_err;
use super::text::wrap_text_to_width;
use crate::error::Result;

/// Single-column legend of line samples anchored at the top-left of `area`, items in drawing order.
///
/// `top_px` aligns the first entry with the top of the plotting area.
pub fn draw_side_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBColor)],
    top_px: i32,
) -> Result<()> {
    area.fill(&WHITE).map_err(render_err)?;

    let (w_u32, _) = area.dim_in_pixel();
    let w = w_u32 as i32;

    let font_px: u32 = 14;
    let line_h: i32 = font_px as i32 + 2;
    let row_gap: i32 = 6;
    let pad_x: i32 = 8;
    let sample_w: i32 = 22;
    let text_x = pad_x + sample_w + 8;
    let max_text_w = (w - text_x - pad_x).max(40) as u32;

    let label_style =
        TextStyle::from((FontFamily::SansSerif, font_px)).pos(Pos::new(HPos::Left, VPos::Center));

    let mut y = top_px;
    for (label, color) in items {
        let lines = wrap_text_to_width(label, font_px, max_text_w);
        let block_h = (lines.len().max(1) as i32) * line_h;
        let mid = y + line_h / 2;

        area.draw(&PathElement::new(
            vec![(pad_x, mid), (pad_x + sample_w, mid)],
            color.stroke_width(3),
        ))
        .map_err(render_err)?;

        for (i, line) in lines.iter().enumerate() {
            let line_mid = y + (i as i32) * line_h + line_h / 2;
            area.draw(&Text::new(line.as_str(), (text_x, line_mid), label_style.clone()))
                .map_err(render_err)?;
        }
        y += block_h + row_gap;
    }
    Ok(())
}
