//! Utility functions for visualization: colors, color maps, axis ranges and label gutters.

use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Microsoft Office (2013+) chart series palette, used for bar groups.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

/// Resolve a CSS color name (the subset matplotlib users reach for) or `#rrggbb`.
pub fn named_color(name: &str) -> Option<RGBColor> {
    let n = name.trim().to_ascii_lowercase();
    if let Some(hex) = n.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let v = u32::from_str_radix(hex, 16).ok()?;
        return Some(RGBColor((v >> 16) as u8, (v >> 8) as u8, v as u8));
    }
    let rgb = match n.as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gray" | "grey" => (128, 128, 128),
        "lime" => (0, 255, 0),
        "indigo" => (75, 0, 130),
        "purple" => (128, 0, 128),
        "navy" => (0, 0, 128),
        "olive" => (128, 128, 0),
        "teal" => (0, 128, 128),
        "maroon" => (128, 0, 0),
        "gold" => (255, 215, 0),
        _ => return None,
    };
    Some(RGBColor(rgb.0, rgb.1, rgb.2))
}

// Anchors of a diverging blue-white-red map (matplotlib "coolwarm" end points and midpoint).
const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Diverging color for `t` in `[0, 1]` (0 = cool, 0.5 = neutral, 1 = warm).
pub fn coolwarm(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let (a, b, u) = if t < 0.5 {
        (COOL, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    let lerp = |x: f64, y: f64| (x + (y - x) * u).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Min/max over finite values, padded by 5% of the span; a flat range is widened by 1.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo > hi {
        return None;
    }
    if (hi - lo).abs() < f64::EPSILON {
        return Some((lo - 1.0, hi + 1.0));
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}

/// Tick label format shared by the Y axes: fewer decimals as magnitude grows.
pub fn fmt_tick(v: f64) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

/// Width of the left label gutter for Y ticks in `[ymin, ymax]`, plus room for the axis title.
///
/// Clamped to a sensible range to avoid extremes.
pub fn compute_left_label_area_px(ymin: f64, ymax: f64, ticks: usize, font_px: u32) -> u32 {
    let widest = (0..=ticks)
        .map(|i| {
            let t = if ticks == 0 { 0.0 } else { i as f64 / ticks as f64 };
            estimate_text_width_px(&fmt_tick(ymin + (ymax - ymin) * t), font_px)
        })
        .max()
        .unwrap_or(0);
    // tick marks + the rotated axis description
    widest.saturating_add(18 + font_px + 12).clamp(56, 160)
}

/// Tick budget for a categorical axis spanning `lo..hi` with categories on whole numbers.
///
/// At least one tick per unit keeps the generator's step at 1 or a divisor of it,
/// so every category position gets a tick; in-between ticks get empty labels.
pub fn category_tick_budget(lo: f64, hi: f64) -> usize {
    (hi - lo).abs().ceil() as usize + 1
}

/// Label for the key point at `v`, if `v` sits on one of `positions`.
pub fn label_at(v: f64, positions: &[f64], labels: &[String]) -> String {
    positions
        .iter()
        .position(|p| (p - v).abs() < 1e-6)
        .and_then(|i| labels.get(i).cloned())
        .unwrap_or_default()
}
