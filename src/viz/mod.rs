//! Visualization: render [`FigureSpec`]s to **SVG** or **PNG**.
//!
//! - Line charts with a legend panel right of the plot
//! - Grouped bar charts, one cluster per country and one bar per year
//! - Annotated correlation heatmaps on a diverging color scale
//!
//! Drawing code is generic over plotters' `DrawingBackend`; [`PlottersRenderer`]
//! picks the backend from the requested [`OutputFormat`] and returns the encoded bytes.

pub mod bars;
pub mod heatmap;
pub mod legend;
mod line;
pub mod text;
pub mod types;
pub mod util;

pub use types::{
    BarFigure, FigureSpec, HeatmapFigure, LineFigure, OutputFormat, RenderedArtifact,
};

use crate::error::{AnalysisError, Result};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontFamily, FontStyle};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::fmt::Debug;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Once;

pub(crate) const MARGIN: u32 = 12;

/// One-time registration of the bundled DejaVu faces for the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
        let _ = plotters::style::register_font(
            "sans-serif",
            FontStyle::Bold,
            include_bytes!("../../assets/DejaVuSans-Bold.ttf"),
        );
    });
}

pub(crate) fn render_err<E: Debug>(e: E) -> AnalysisError {
    AnalysisError::Render(format!("{e:?}"))
}

pub(crate) fn title_font() -> FontDesc<'static> {
    (FontFamily::SansSerif, 20).into_font().style(FontStyle::Bold)
}

pub(crate) fn axis_desc_font() -> TextStyle<'static> {
    TextStyle::from((FontFamily::SansSerif, 14))
}

/// Anything that can turn a figure description into an image.
pub trait Renderer {
    fn render(&mut self, figure: &FigureSpec) -> Result<RenderedArtifact>;
}

/// Renders with plotters; optionally also writes each image to `out_dir`.
///
/// Files are numbered in render order: `01-<title-slug>.svg`, `02-...`.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    out_dir: Option<PathBuf>,
    rendered: usize,
}

impl PlottersRenderer {
    pub fn new(format: OutputFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            out_dir: None,
            rendered: 0,
        }
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn out_dir(&self) -> Option<&PathBuf> {
        self.out_dir.as_ref()
    }

    fn encode(&self, figure: &FigureSpec) -> Result<Vec<u8>> {
        ensure_fonts_registered();
        let size = (self.width, self.height);
        match self.format {
            OutputFormat::Svg => {
                let mut svg = String::new();
                {
                    let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                    draw_figure(root, figure)?;
                }
                Ok(svg.into_bytes())
            }
            OutputFormat::Png => {
                let mut rgb = vec![0u8; self.width as usize * self.height as usize * 3];
                {
                    let root = BitMapBackend::with_buffer(&mut rgb, size).into_drawing_area();
                    draw_figure(root, figure)?;
                }
                let img = image::RgbImage::from_raw(self.width, self.height, rgb)
                    .ok_or_else(|| render_err("frame buffer does not match image size"))?;
                let mut png = Cursor::new(Vec::new());
                img.write_to(&mut png, image::ImageFormat::Png)
                    .map_err(render_err)?;
                Ok(png.into_inner())
            }
        }
    }
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self::new(OutputFormat::Svg, 1000, 800)
    }
}

impl Renderer for PlottersRenderer {
    fn render(&mut self, figure: &FigureSpec) -> Result<RenderedArtifact> {
        if self.width == 0 || self.height == 0 {
            return Err(AnalysisError::Render(format!(
                "invalid image size {}x{}",
                self.width, self.height
            )));
        }
        let bytes = self.encode(figure)?;
        self.rendered += 1;

        let path = match &self.out_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(render_err)?;
                let name = format!(
                    "{:02}-{}.{}",
                    self.rendered,
                    slug(figure.title()),
                    self.format.extension()
                );
                let path = dir.join(name);
                std::fs::write(&path, &bytes).map_err(render_err)?;
                log::info!("wrote {} ({})", path.display(), figure.kind());
                Some(path)
            }
            None => None,
        };

        Ok(RenderedArtifact {
            title: figure.title().to_string(),
            format: self.format,
            bytes,
            path,
        })
    }
}

fn draw_figure<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, figure: &FigureSpec) -> Result<()> {
    match figure {
        FigureSpec::Lines(f) => line::draw_lines(root, f),
        FigureSpec::GroupedBars(f) => bars::draw_grouped_bars(root, f),
        FigureSpec::Heatmap(f) => heatmap::draw_heatmap(root, f),
    }
}

/// Lowercase ASCII file stem: runs of other characters collapse to `-`.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.truncate(60);
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("figure");
    }
    out
}
