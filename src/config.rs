use crate::viz::util::named_color;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Debug, fs::File, io::BufReader, ops::RangeBounds, path::Path};

/// Which chart an indicator gets in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// One line per country over the year columns.
    Lines,
    /// Countries as categories, one bar per configured bar year.
    GroupedBars,
    /// Only used as correlation input.
    None,
}

/// One World Bank indicator and how the report treats it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// Short key used by correlation studies, e.g. `"gdp_growth"`.
    pub key: String,
    /// World Bank indicator code, e.g. `"NY.GDP.MKTP.KD.ZG"`.
    pub code: String,
    /// Chart title.
    pub title: String,
    /// Y-axis label for the chart.
    pub y_label: String,
    /// Column name inside per-country companion tables.
    pub companion_label: String,
    pub chart: ChartKind,
}

/// A country row together with its legend text and line color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySpec {
    /// Name as it appears in the `Country Name` column.
    pub name: String,
    pub legend: String,
    /// CSS/matplotlib color name.
    pub color: String,
}

/// Correlate one indicator against all others for one country, then draw the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationStudy {
    pub reference: String,
    pub country: String,
    pub heatmap_title: String,
}

/// Everything the analysis needs, passed explicitly to each stage.
///
/// [`AnalysisConfig::default`] reproduces the standard seven-country report.
/// See [`AnalysisConfig::from_file`] for loading overrides from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Prefix of the spreadsheet download URL.
    pub base_url: String,
    pub sheet_name: String,
    /// Metadata rows preceding the header row.
    pub preamble_rows: usize,
    /// Row-index column of every sheet.
    pub country_column: String,
    pub year_columns: Vec<String>,
    pub countries: Vec<CountrySpec>,
    /// Year columns drawn as bar groups.
    pub bar_years: Vec<String>,
    pub bar_width: f64,
    pub indicators: Vec<IndicatorSpec>,
    /// Indicator keys whose transposed tables get a `describe` printout, in print order.
    #[serde(default)]
    pub describe: Vec<String>,
    pub studies: Vec<CorrelationStudy>,
}

fn indicator(
    key: &str,
    code: &str,
    title: &str,
    y_label: &str,
    companion_label: &str,
    chart: ChartKind,
) -> IndicatorSpec {
    IndicatorSpec {
        key: key.into(),
        code: code.into(),
        title: title.into(),
        y_label: y_label.into(),
        companion_label: companion_label.into(),
        chart,
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let countries = [
            ("United States", "USA", "cyan"),
            ("United Kingdom", "UK", "orange"),
            ("Germany", "Germany", "pink"),
            ("Nigeria", "Nigeria", "brown"),
            ("China", "China", "gray"),
            ("Brazil", "Brazil", "lime"),
            ("Australia", "Australia", "indigo"),
        ]
        .into_iter()
        .map(|(name, legend, color)| CountrySpec {
            name: name.into(),
            legend: legend.into(),
            color: color.into(),
        })
        .collect();

        Self {
            base_url: "https://api.worldbank.org/v2/en".into(),
            sheet_name: "Data".into(),
            preamble_rows: 3,
            country_column: "Country Name".into(),
            year_columns: ["2000", "2003", "2006", "2009", "2012", "2015"]
                .map(String::from)
                .to_vec(),
            countries,
            bar_years: ["2006", "2009", "2012", "2015"].map(String::from).to_vec(),
            bar_width: 0.2,
            indicators: vec![
                indicator(
                    "urban_population",
                    "SP.URB.GROW",
                    "Urban population growth (annual %)",
                    "Urban growth",
                    "Urban pop. growth",
                    ChartKind::GroupedBars,
                ),
                indicator(
                    "electricity_production",
                    "EG.ELC.FOSL.ZS",
                    "Electricity production from oil, gas and coal sources (% of total)",
                    "% electricity production",
                    "Electricity production",
                    ChartKind::Lines,
                ),
                indicator(
                    "agriculture_value_added",
                    "NV.AGR.TOTL.ZS",
                    "Agriculture, forestry, and fishing, value added (% of GDP)",
                    "% of GDP",
                    "Agric. forestry and Fisheries",
                    ChartKind::GroupedBars,
                ),
                indicator(
                    "co2_emissions",
                    "EN.ATM.CO2E.PC",
                    "CO2 emissions (metric tons per capita)",
                    "metric tons",
                    "CO2 Emissions",
                    ChartKind::Lines,
                ),
                indicator(
                    "forest_area",
                    "AG.LND.FRST.ZS",
                    "Forest area (% of land area)",
                    "% of land area",
                    "Forest Area",
                    ChartKind::None,
                ),
                indicator(
                    "gdp_growth",
                    "NY.GDP.MKTP.KD.ZG",
                    "GDP growth (annual %)",
                    "annual %",
                    "GDP Annual Growth",
                    ChartKind::None,
                ),
            ],
            describe: vec!["gdp_growth".into(), "forest_area".into()],
            studies: vec![
                CorrelationStudy {
                    reference: "gdp_growth".into(),
                    country: "China".into(),
                    heatmap_title: "China".into(),
                },
                CorrelationStudy {
                    reference: "forest_area".into(),
                    country: "United Kingdom".into(),
                    heatmap_title: "United Kingdom".into(),
                },
            ],
        }
    }
}

impl AnalysisConfig {
    /// Load an [`AnalysisConfig`] from a JSON file and validate it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are inconsistent.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let reader =
            BufReader::new(File::open(file).with_context(|| format!("failed to open {file:?}"))?);

        let config: AnalysisConfig =
            serde_json::from_reader(reader).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_non_empty(&self.year_columns).context("invalid year columns")?;
        check_non_empty(&self.countries).context("invalid countries")?;
        check_non_empty(&self.indicators).context("invalid indicators")?;
        check_num(self.preamble_rows, 0..100).context("invalid number of preamble rows")?;
        check_num(self.bar_width, f64::MIN_POSITIVE..=1.0).context("invalid bar width")?;

        check_unique(self.year_columns.iter()).context("invalid year columns")?;
        check_unique(self.countries.iter().map(|c| &c.name)).context("invalid countries")?;
        check_unique(self.indicators.iter().map(|i| &i.key)).context("invalid indicators")?;
        check_unique(self.indicators.iter().map(|i| &i.companion_label))
            .context("invalid companion labels")?;

        for c in &self.countries {
            if named_color(&c.color).is_none() {
                bail!("unknown color {:?} for country {:?}", c.color, c.name);
            }
        }
        for y in &self.bar_years {
            if !self.year_columns.contains(y) {
                bail!("bar year {y:?} is not one of the year columns");
            }
        }
        if self.year_columns.contains(&self.country_column) {
            bail!("country column {:?} doubles as a year column", self.country_column);
        }
        for key in &self.describe {
            if self.indicator(key).is_none() {
                bail!("describe references unknown indicator {key:?}");
            }
        }
        for s in &self.studies {
            if self.indicator(&s.reference).is_none() {
                bail!("study references unknown indicator {:?}", s.reference);
            }
            if !self.countries.iter().any(|c| c.name == s.country) {
                bail!("study references unknown country {:?}", s.country);
            }
        }
        Ok(())
    }

    pub fn indicator(&self, key: &str) -> Option<&IndicatorSpec> {
        self.indicators.iter().find(|i| i.key == key)
    }

    pub fn country_names(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.name.clone()).collect()
    }

    /// Columns requested from each sheet: the country column followed by the year columns.
    pub fn selected_columns(&self) -> Vec<String> {
        std::iter::once(self.country_column.clone())
            .chain(self.year_columns.iter().cloned())
            .collect()
    }

    /// Legend text for each bar group, derived from the plotted year columns.
    pub fn bar_legends(&self) -> Vec<String> {
        self.bar_years.iter().map(|y| format!("Year {y}")).collect()
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_non_empty<T>(items: &[T]) -> Result<()> {
    if items.is_empty() {
        bail!("list must not be empty");
    }
    Ok(())
}

fn check_unique<'a>(items: impl Iterator<Item = &'a String>) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item) {
            bail!("duplicate entry {item:?}");
        }
    }
    Ok(())
}
