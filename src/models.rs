use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Expected type of a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Free text, e.g. the country-name column used as the row index.
    Text,
    /// Numeric observations; unparsable cells are cleaned to zero.
    Numeric,
}

/// Column name -> expected type, declared once per table and checked at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Column used as the row index (always `Text`).
    pub index_column: String,
    pub columns: Vec<(String, ColumnType)>,
}

impl Schema {
    /// Schema for an indicator sheet: one text index column followed by numeric year columns.
    pub fn indicator(index_column: &str, year_columns: &[String]) -> Self {
        let mut columns = vec![(index_column.to_string(), ColumnType::Text)];
        columns.extend(year_columns.iter().map(|y| (y.clone(), ColumnType::Numeric)));
        Self {
            index_column: index_column.to_string(),
            columns,
        }
    }
}

/// A named, indexed vector of observations (one table column or row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub index: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, index: Vec<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if index.len() != values.len() {
            return Err(AnalysisError::DimensionMismatch(format!(
                "series {name:?} has {} labels but {} values",
                index.len(),
                values.len()
            )));
        }
        Ok(Self {
            name,
            index,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Labeled two-dimensional table of `f64`, stored row-major.
///
/// Indicator tables are "wide" (rows = countries, columns = years); their
/// transpose is the natural orientation for time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Name of the row index, e.g. `"Country Name"`.
    pub index_name: String,
    columns_name: String,
    rows: Vec<String>,
    columns: Vec<String>,
    cells: Vec<Vec<f64>>,
}

impl Table {
    /// Build a table, checking that every row has one cell per column and labels are unique.
    pub fn new(
        index_name: impl Into<String>,
        rows: Vec<String>,
        columns: Vec<String>,
        cells: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if cells.len() != rows.len() {
            return Err(AnalysisError::Schema(format!(
                "{} row labels for {} rows",
                rows.len(),
                cells.len()
            )));
        }
        if let Some((i, r)) = cells
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(AnalysisError::Schema(format!(
                "row {:?} has {} cells, expected {}",
                rows[i],
                r.len(),
                columns.len()
            )));
        }
        check_unique("row", &rows)?;
        check_unique("column", &columns)?;
        Ok(Self {
            index_name: index_name.into(),
            columns_name: String::new(),
            rows,
            columns,
            cells,
        })
    }

    /// Assemble a table from equally long columns sharing one index.
    pub fn from_columns(
        index_name: impl Into<String>,
        index: Vec<String>,
        columns: Vec<Series>,
    ) -> Result<Self> {
        for s in &columns {
            if s.len() != index.len() {
                return Err(AnalysisError::DimensionMismatch(format!(
                    "column {:?} has {} values, index has {}",
                    s.name,
                    s.len(),
                    index.len()
                )));
            }
        }
        let names = columns.iter().map(|s| s.name.clone()).collect();
        let cells = (0..index.len())
            .map(|i| columns.iter().map(|s| s.values[i]).collect())
            .collect();
        Self::new(index_name, index, names, cells)
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.cells[r][c])
    }

    /// Name the column axis, e.g. `"Year"` for a wide indicator table.
    pub fn with_columns_name(mut self, name: impl Into<String>) -> Self {
        self.columns_name = name.into();
        self
    }

    pub fn columns_name(&self) -> &str {
        &self.columns_name
    }

    /// Swap rows and columns, together with the axis names.
    pub fn transpose(&self) -> Table {
        let cells = (0..self.columns.len())
            .map(|c| self.cells.iter().map(|row| row[c]).collect())
            .collect();
        Table {
            index_name: self.columns_name.clone(),
            columns_name: self.index_name.clone(),
            rows: self.columns.clone(),
            columns: self.rows.clone(),
            cells,
        }
    }

    pub fn column(&self, name: &str) -> Result<Series> {
        let c = self
            .columns
            .iter()
            .position(|x| x == name)
            .ok_or_else(|| AnalysisError::lookup("column", name))?;
        Ok(Series {
            name: name.to_string(),
            index: self.rows.clone(),
            values: self.cells.iter().map(|row| row[c]).collect(),
        })
    }

    pub fn row(&self, name: &str) -> Result<Series> {
        let r = self
            .rows
            .iter()
            .position(|x| x == name)
            .ok_or_else(|| AnalysisError::lookup("row", name))?;
        Ok(Series {
            name: name.to_string(),
            index: self.columns.clone(),
            values: self.cells[r].clone(),
        })
    }

    /// All columns in table order.
    pub fn iter_columns(&self) -> impl Iterator<Item = Series> + '_ {
        (0..self.columns.len()).map(move |c| Series {
            name: self.columns[c].clone(),
            index: self.rows.clone(),
            values: self.cells.iter().map(|row| row[c]).collect(),
        })
    }

    pub fn select_columns(&self, names: &[String]) -> Result<Table> {
        let cols = names
            .iter()
            .map(|n| self.column(n))
            .collect::<Result<Vec<_>>>()?;
        Ok(Table::from_columns(self.index_name.clone(), self.rows.clone(), cols)?
            .with_columns_name(self.columns_name.clone()))
    }

    /// Replace every non-finite cell (NaN, +inf, -inf) with `replacement`.
    /// Returns the cleaned table and how many cells were replaced.
    pub fn map_non_finite(&self, replacement: f64) -> (Table, usize) {
        let mut replaced = 0usize;
        let cells = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| {
                        if v.is_finite() {
                            *v
                        } else {
                            replaced += 1;
                            replacement
                        }
                    })
                    .collect()
            })
            .collect();
        let table = Table {
            index_name: self.index_name.clone(),
            columns_name: self.columns_name.clone(),
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            cells,
        };
        (table, replaced)
    }

    pub fn all_finite(&self) -> bool {
        self.cells.iter().flatten().all(|v| v.is_finite())
    }
}

fn check_unique(axis: &str, labels: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for l in labels {
        if !seen.insert(l.as_str()) {
            return Err(AnalysisError::Schema(format!("duplicate {axis} label {l:?}")));
        }
    }
    Ok(())
}

/// Format a value for console tables: up to 4 decimals, trailing zeros trimmed, `NaN` for non-finite.
pub fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Render a labeled grid as fixed-width text with right-aligned value columns.
pub(crate) fn write_grid(
    f: &mut fmt::Formatter<'_>,
    corner: &str,
    columns: &[String],
    rows: &[(String, Vec<String>)],
) -> fmt::Result {
    let label_w = rows
        .iter()
        .map(|(l, _)| l.chars().count())
        .chain(std::iter::once(corner.chars().count()))
        .max()
        .unwrap_or(0);
    let col_w: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|(_, cells)| cells[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write!(f, "{corner:<label_w$}")?;
    for (c, w) in columns.iter().zip(&col_w) {
        write!(f, "  {c:>w$}")?;
    }
    writeln!(f)?;
    for (label, cells) in rows {
        write!(f, "{label:<label_w$}")?;
        for (v, w) in cells.iter().zip(&col_w) {
            write!(f, "  {v:>w$}")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<(String, Vec<String>)> = self
            .rows
            .iter()
            .zip(&self.cells)
            .map(|(l, r)| (l.clone(), r.iter().map(|v| fmt_value(*v)).collect()))
            .collect();
        write_grid(f, &self.index_name, &self.columns, &rows)
    }
}
