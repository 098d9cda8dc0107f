//! Figure descriptions handed to a [`Renderer`](super::Renderer).
//!
//! Constructors validate shapes up front so backends can index freely.

use crate::error::{AnalysisError, Result};
use crate::models::{Series, Table};
use plotters::style::RGBColor;
use std::path::PathBuf;

use super::util::named_color;

/// Serialized image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

/// One line per series over shared categorical x labels; legend to the right of the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_labels: Vec<String>,
    pub series: Vec<Series>,
    pub legends: Vec<String>,
    pub colors: Vec<RGBColor>,
}

impl LineFigure {
    /// `colors` are CSS names such as `"cyan"` or `#rrggbb`.
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        x_labels: Vec<String>,
        series: Vec<Series>,
        legends: Vec<String>,
        colors: &[String],
    ) -> Result<Self> {
        if series.is_empty() {
            return Err(AnalysisError::EmptyInput("line figure without series".into()));
        }
        check_len("legends", legends.len(), series.len())?;
        check_len("colors", colors.len(), series.len())?;
        for s in &series {
            check_len(&format!("points of series {:?}", s.name), s.len(), x_labels.len())?;
        }
        let colors = colors
            .iter()
            .map(|c| named_color(c).ok_or_else(|| AnalysisError::lookup("color", c.as_str())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_labels,
            series,
            legends,
            colors,
        })
    }
}

/// Bars clustered per category: one group (e.g. one year) per entry of `groups`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarFigure {
    pub title: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub bar_width: f64,
    pub groups: Vec<Series>,
    pub legends: Vec<String>,
}

impl BarFigure {
    pub fn new(
        title: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
        bar_width: f64,
        groups: Vec<Series>,
        legends: Vec<String>,
    ) -> Result<Self> {
        if groups.is_empty() || categories.is_empty() {
            return Err(AnalysisError::EmptyInput("bar figure without data".into()));
        }
        if !(bar_width > 0.0 && bar_width <= 1.0) {
            return Err(AnalysisError::DimensionMismatch(format!(
                "bar width must be in (0, 1], got {bar_width}"
            )));
        }
        check_len("legends", legends.len(), groups.len())?;
        for g in &groups {
            check_len(&format!("bars of group {:?}", g.name), g.len(), categories.len())?;
        }
        Ok(Self {
            title: title.into(),
            y_label: y_label.into(),
            categories,
            bar_width,
            groups,
            legends,
        })
    }
}

/// Annotated grid of a square correlation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapFigure {
    pub title: String,
    /// Axis labels, taken from the columns of the table the matrix was computed from.
    pub labels: Vec<String>,
    pub matrix: Table,
}

impl HeatmapFigure {
    pub fn new(title: impl Into<String>, source: &Table, matrix: Table) -> Result<Self> {
        let labels = source.columns().to_vec();
        if labels.is_empty() {
            return Err(AnalysisError::EmptyInput("heatmap without columns".into()));
        }
        let (r, c) = matrix.shape();
        if r != labels.len() || c != labels.len() {
            return Err(AnalysisError::DimensionMismatch(format!(
                "matrix is {r}x{c} but source has {} columns",
                labels.len()
            )));
        }
        Ok(Self {
            title: title.into(),
            labels,
            matrix,
        })
    }
}

/// Everything the renderer knows how to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum FigureSpec {
    Lines(LineFigure),
    GroupedBars(BarFigure),
    Heatmap(HeatmapFigure),
}

impl FigureSpec {
    pub fn title(&self) -> &str {
        match self {
            FigureSpec::Lines(f) => &f.title,
            FigureSpec::GroupedBars(f) => &f.title,
            FigureSpec::Heatmap(f) => &f.title,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FigureSpec::Lines(_) => "lines",
            FigureSpec::GroupedBars(_) => "grouped-bars",
            FigureSpec::Heatmap(_) => "heatmap",
        }
    }
}

/// Output of one render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub title: String,
    pub format: OutputFormat,
    /// Encoded image (SVG text or PNG).
    pub bytes: Vec<u8>,
    /// Set when the renderer also wrote the image to disk.
    pub path: Option<PathBuf>,
}

fn check_len(what: &str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(AnalysisError::DimensionMismatch(format!(
            "{what}: expected {expected}, got {got}"
        )));
    }
    Ok(())
}
