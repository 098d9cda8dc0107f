use crate::error::{AnalysisError, Result};
use crate::models::{Series, Table, fmt_value, write_grid};
use serde::{Deserialize, Serialize};
use std::fmt;

const STAT_NAMES: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics for one series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1); NaN for a single observation.
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize a slice of observations.
    ///
    /// ### Errors
    /// [`AnalysisError::EmptyInput`] when `values` is empty.
    pub fn of(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "cannot describe an empty series".into(),
            ));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Ok(Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile_sorted(&sorted, 0.25),
            p50: quantile_sorted(&sorted, 0.50),
            p75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }

    fn fields(&self) -> [(&'static str, f64); 8] {
        let values = [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.p25,
            self.p50,
            self.p75,
            self.max,
        ];
        std::array::from_fn(|i| (STAT_NAMES[i], values[i]))
    }
}

/// Quantile with linear interpolation between closest ranks. `sorted` must be ascending and non-empty.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Ordered mapping label -> [`Summary`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Description {
    pub entries: Vec<(String, Summary)>,
}

impl Description {
    pub fn get(&self, label: &str) -> Option<&Summary> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, s)| s)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summarize each series under its matching label.
///
/// ### Errors
/// - [`AnalysisError::DimensionMismatch`] when `series` and `labels` differ in length
/// - [`AnalysisError::EmptyInput`] when any series is empty
pub fn describe(series: &[Series], labels: &[String]) -> Result<Description> {
    if series.len() != labels.len() {
        return Err(AnalysisError::DimensionMismatch(format!(
            "{} series but {} labels",
            series.len(),
            labels.len()
        )));
    }
    let entries = series
        .iter()
        .zip(labels)
        .map(|(s, l)| {
            Summary::of(&s.values)
                .map(|sum| (l.clone(), sum))
                .map_err(|_| AnalysisError::EmptyInput(format!("series {l:?} has no observations")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Description { entries })
}

/// Summarize every column of a table, labeled by column name.
pub fn describe_table(table: &Table) -> Result<Description> {
    let series: Vec<Series> = table.iter_columns().collect();
    let labels: Vec<String> = table.columns().to_vec();
    describe(&series, &labels)
}

/// Column-per-label layout: rows are the statistics, columns the series.
impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self.entries.iter().map(|(l, _)| l.clone()).collect();
        let rows: Vec<(String, Vec<String>)> = (0..STAT_NAMES.len())
            .map(|i| {
                let cells = self
                    .entries
                    .iter()
                    .map(|(_, s)| fmt_value(s.fields()[i].1))
                    .collect();
                (STAT_NAMES[i].to_string(), cells)
            })
            .collect();
        write_grid(f, "", &columns, &rows)
    }
}

/// Per-series report printed after a chart: one block per legend entry.
pub fn report(description: &Description) -> String {
    let mut out = String::new();
    for (label, s) in &description.entries {
        out.push_str(&format!("Statistics for {label}:\n"));
        for (name, v) in s.fields() {
            out.push_str(&format!("{name:<6} {:>12}\n", fmt_value(v)));
        }
        out.push('\n');
    }
    out
}
