use wdi_explore::config::AnalysisConfig;
use wdi_explore::error::Result as AnalysisResult;
use wdi_explore::loader::IndicatorTables;
use wdi_explore::models::Table;
use wdi_explore::pipeline::{LoadedIndicator, analyze, bar_figure, study_table};
use wdi_explore::viz::{FigureSpec, OutputFormat, RenderedArtifact, Renderer};

/// Keeps every figure instead of drawing it.
#[derive(Default)]
struct Recording {
    figures: Vec<FigureSpec>,
}

impl Renderer for Recording {
    fn render(&mut self, figure: &FigureSpec) -> AnalysisResult<RenderedArtifact> {
        self.figures.push(figure.clone());
        Ok(RenderedArtifact {
            title: figure.title().to_string(),
            format: OutputFormat::Svg,
            bytes: Vec::new(),
            path: None,
        })
    }
}

fn loaded(config: &AnalysisConfig) -> Vec<LoadedIndicator> {
    config
        .indicators
        .iter()
        .enumerate()
        .map(|(ii, spec)| {
            let cells = (0..config.countries.len())
                .map(|ci| {
                    (0..config.year_columns.len())
                        .map(|yi| ((ci * 3 + yi * (ii + 1)) % 7) as f64 + yi as f64 * 0.5)
                        .collect()
                })
                .collect();
            let wide = Table::new(
                config.country_column.clone(),
                config.country_names(),
                config.year_columns.clone(),
                cells,
            )
            .unwrap()
            .with_columns_name("Year");
            let transposed = wide.transpose();
            LoadedIndicator {
                spec: spec.clone(),
                tables: IndicatorTables { wide, transposed },
            }
        })
        .collect()
}

fn run(show_tables: bool) -> (Recording, String) {
    let config = AnalysisConfig::default();
    let data = loaded(&config);
    let mut rec = Recording::default();
    let mut out = Vec::new();
    let artifacts = analyze(&config, &data, &mut rec, &mut out, show_tables).unwrap();
    assert_eq!(artifacts.len(), rec.figures.len());
    (rec, String::from_utf8(out).unwrap())
}

#[test]
fn renders_charts_then_heatmaps_in_report_order() {
    let (rec, _) = run(false);
    let kinds: Vec<&str> = rec.figures.iter().map(|f| f.kind()).collect();
    assert_eq!(
        kinds,
        ["lines", "lines", "grouped-bars", "grouped-bars", "heatmap", "heatmap"]
    );
    let titles: Vec<&str> = rec.figures.iter().map(|f| f.title()).collect();
    assert_eq!(
        titles,
        [
            "Electricity production from oil, gas and coal sources (% of total)",
            "CO2 emissions (metric tons per capita)",
            "Urban population growth (annual %)",
            "Agriculture, forestry, and fishing, value added (% of GDP)",
            "China",
            "United Kingdom",
        ]
    );
}

#[test]
fn line_charts_use_country_legends_and_colors() {
    let (rec, _) = run(false);
    let FigureSpec::Lines(fig) = &rec.figures[0] else {
        panic!("first figure should be a line chart");
    };
    assert_eq!(
        fig.legends,
        ["USA", "UK", "Germany", "Nigeria", "China", "Brazil", "Australia"]
    );
    assert_eq!(fig.x_labels, ["2000", "2003", "2006", "2009", "2012", "2015"]);
    assert_eq!(fig.x_label, "Year");
    assert_eq!(fig.y_label, "% electricity production");
    assert_eq!(fig.colors[0], plotters::style::RGBColor(0, 255, 255));
}

#[test]
fn agriculture_legends_name_the_plotted_years() {
    let config = AnalysisConfig::default();
    let data = loaded(&config);
    let agri = data
        .iter()
        .find(|l| l.spec.key == "agriculture_value_added")
        .unwrap();
    let fig = bar_figure(&config, agri).unwrap();
    assert_eq!(
        fig.legends,
        ["Year 2006", "Year 2009", "Year 2012", "Year 2015"]
    );
    let plotted: Vec<&str> = fig.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(plotted, ["2006", "2009", "2012", "2015"]);
    assert_eq!(fig.categories, config.country_names());
    assert_eq!(fig.bar_width, 0.2);
}

#[test]
fn heatmaps_cover_all_indicators_of_the_study_country() {
    let config = AnalysisConfig::default();
    let data = loaded(&config);
    let (rec, _) = run(false);
    let FigureSpec::Heatmap(fig) = &rec.figures[4] else {
        panic!("fifth figure should be a heatmap");
    };
    assert_eq!(
        fig.labels,
        [
            "Urban pop. growth",
            "Electricity production",
            "Agric. forestry and Fisheries",
            "CO2 Emissions",
            "Forest Area",
            "GDP Annual Growth",
        ]
    );
    let companion = study_table(&data, &config.studies[0]).unwrap();
    assert_eq!(fig.matrix.shape(), (6, 6));
    assert_eq!(
        fig.matrix.get("GDP Annual Growth", "GDP Annual Growth"),
        Some(1.0)
    );
    assert_eq!(companion.rows(), config.year_columns.as_slice());
}

#[test]
fn console_report_follows_each_chart() {
    let (_, text) = run(false);
    let describe_gdp = text.find("GDP growth (annual %)").unwrap();
    let describe_forest = text.find("Forest area (% of land area)").unwrap();
    let first_stats = text.find("Statistics for USA:").unwrap();
    let bar_stats = text.find("Statistics for Year 2006:").unwrap();
    let china = text.find("gdp_growth vs. indicators, China").unwrap();
    let uk = text.find("forest_area vs. indicators, United Kingdom").unwrap();
    assert!(describe_gdp < describe_forest);
    assert!(describe_forest < first_stats);
    assert!(first_stats < bar_stats);
    assert!(bar_stats < china);
    assert!(china < uk);
    // Two line charts with seven countries, two bar charts with four years.
    assert_eq!(text.matches("Statistics for USA:").count(), 2);
    assert_eq!(text.matches("Statistics for Year 2015:").count(), 2);
}

#[test]
fn show_tables_prints_every_loaded_table() {
    let (_, quiet) = run(false);
    let (_, loud) = run(true);
    assert!(!quiet.contains("[SP.URB.GROW]"));
    assert!(loud.contains("[SP.URB.GROW]"));
    assert!(loud.contains("[NY.GDP.MKTP.KD.ZG]"));
}
