//! The report run end to end: load every indicator, then describe, chart and correlate.
//!
//! Text results go to the supplied writer; figures go to the supplied [`Renderer`].

use crate::api::{Client, SpreadsheetSource};
use crate::config::{AnalysisConfig, ChartKind, CorrelationStudy, IndicatorSpec};
use crate::correlate::{companion_table, correlate, correlation_matrix};
use crate::error::{AnalysisError, Result as AnalysisResult};
use crate::loader::{self, IndicatorTables, SheetLayout};
use crate::models::{Series, Table};
use crate::stats::{describe, describe_table, report};
use crate::viz::{
    BarFigure, FigureSpec, HeatmapFigure, LineFigure, RenderedArtifact, Renderer,
};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// One indicator with its loaded tables.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedIndicator {
    pub spec: IndicatorSpec,
    pub tables: IndicatorTables,
}

/// Load every configured indicator, in configuration order.
///
/// With `data_dir`, workbooks are read from `<data_dir>/<code>.xls(x)` instead of downloaded.
pub fn load_all(
    config: &AnalysisConfig,
    client: &Client,
    data_dir: Option<&Path>,
) -> Result<Vec<LoadedIndicator>> {
    let columns = config.selected_columns();
    let countries = config.country_names();
    let layout = SheetLayout {
        sheet_name: &config.sheet_name,
        preamble_rows: config.preamble_rows,
        columns: &columns,
        countries: &countries,
    };
    config
        .indicators
        .iter()
        .map(|spec| -> Result<LoadedIndicator> {
            let source = SpreadsheetSource::for_code(&spec.code, data_dir)?;
            let tables = loader::load(client, &source, &layout)
                .with_context(|| format!("failed to load {} ({})", spec.key, spec.code))?;
            Ok(LoadedIndicator {
                spec: spec.clone(),
                tables,
            })
        })
        .collect()
}

fn find<'a>(loaded: &'a [LoadedIndicator], key: &str) -> AnalysisResult<&'a LoadedIndicator> {
    loaded
        .iter()
        .find(|l| l.spec.key == key)
        .ok_or_else(|| AnalysisError::lookup("indicator", key))
}

/// One line per country over the year columns, legends and colors from the country list.
pub fn line_figure(config: &AnalysisConfig, ind: &LoadedIndicator) -> AnalysisResult<LineFigure> {
    let t = ind.tables.transposed.select_columns(&config.country_names())?;
    let series: Vec<Series> = t.iter_columns().collect();
    let legends = config.countries.iter().map(|c| c.legend.clone()).collect();
    let colors: Vec<String> = config.countries.iter().map(|c| c.color.clone()).collect();
    LineFigure::new(
        ind.spec.title.clone(),
        t.index_name.clone(),
        ind.spec.y_label.clone(),
        t.rows().to_vec(),
        series,
        legends,
        &colors,
    )
}

/// Countries as categories, one bar group per configured bar year.
pub fn bar_figure(config: &AnalysisConfig, ind: &LoadedIndicator) -> AnalysisResult<BarFigure> {
    let wide = &ind.tables.wide;
    let groups = config
        .bar_years
        .iter()
        .map(|y| wide.column(y))
        .collect::<AnalysisResult<Vec<Series>>>()?;
    BarFigure::new(
        ind.spec.title.clone(),
        ind.spec.y_label.clone(),
        wide.rows().to_vec(),
        config.bar_width,
        groups,
        config.bar_legends(),
    )
}

/// Years × indicators for the study's country, one column per indicator's companion label.
pub fn study_table(loaded: &[LoadedIndicator], study: &CorrelationStudy) -> AnalysisResult<Table> {
    let tables: Vec<(String, &Table)> = loaded
        .iter()
        .map(|l| (l.spec.companion_label.clone(), &l.tables.transposed))
        .collect();
    companion_table(&study.country, &tables)
}

/// Run the report over already-loaded indicators.
///
/// Order: optional table dump, `describe` printouts, line charts, bar charts,
/// correlation tables, then one correlation matrix and heatmap per study.
/// Each chart is followed by the statistics of the plotted series.
pub fn analyze(
    config: &AnalysisConfig,
    loaded: &[LoadedIndicator],
    renderer: &mut dyn Renderer,
    out: &mut dyn Write,
    show_tables: bool,
) -> Result<Vec<RenderedArtifact>> {
    let mut artifacts = Vec::new();

    if show_tables {
        for l in loaded {
            writeln!(out, "{} [{}]", l.spec.title, l.spec.code)?;
            writeln!(out, "{}", l.tables.wide)?;
            writeln!(out, "{}", l.tables.transposed)?;
        }
    }

    for key in &config.describe {
        let l = find(loaded, key)?;
        let d = describe_table(&l.tables.transposed)
            .with_context(|| format!("failed to describe {key}"))?;
        writeln!(out, "{}", l.spec.title)?;
        writeln!(out, "{d}")?;
    }

    for l in loaded.iter().filter(|l| l.spec.chart == ChartKind::Lines) {
        let fig = line_figure(config, l).with_context(|| format!("line chart for {}", l.spec.key))?;
        let d = describe(&fig.series, &fig.legends)?;
        artifacts.push(render(renderer, FigureSpec::Lines(fig))?);
        write!(out, "{}", report(&d))?;
    }

    for l in loaded.iter().filter(|l| l.spec.chart == ChartKind::GroupedBars) {
        let fig = bar_figure(config, l).with_context(|| format!("bar chart for {}", l.spec.key))?;
        let d = describe(&fig.groups, &fig.legends)?;
        artifacts.push(render(renderer, FigureSpec::GroupedBars(fig))?);
        write!(out, "{}", report(&d))?;
    }

    let mut companions = Vec::with_capacity(config.studies.len());
    for study in &config.studies {
        let companion = study_table(loaded, study)
            .with_context(|| format!("companion table for {}", study.country))?;
        let reference = find(loaded, &study.reference)?
            .tables
            .transposed
            .column(&study.country)?;
        let table = correlate(&reference, &companion).with_context(|| {
            format!("correlating {} for {}", study.reference, study.country)
        })?;
        writeln!(out, "{} vs. indicators, {}", study.reference, study.country)?;
        writeln!(out, "{table}")?;
        companions.push(companion);
    }

    for (study, companion) in config.studies.iter().zip(&companions) {
        let matrix = correlation_matrix(companion)?;
        writeln!(out, "{matrix}")?;
        let fig = HeatmapFigure::new(study.heatmap_title.clone(), companion, matrix)?;
        artifacts.push(render(renderer, FigureSpec::Heatmap(fig))?);
    }

    Ok(artifacts)
}

fn render(renderer: &mut dyn Renderer, figure: FigureSpec) -> Result<RenderedArtifact> {
    log::info!("rendering {} {:?}", figure.kind(), figure.title());
    renderer
        .render(&figure)
        .with_context(|| format!("failed to render {:?}", figure.title()))
}
