//! Turn an indicator workbook into a wide table (countries × years) and its transpose.
//!
//! Cleaning policy: infinities, empty cells, error cells and unparsable text in
//! numeric columns all become `0.0`. Callers must read `0.0` as "no data".

use crate::api::{Client, SpreadsheetSource};
use crate::error::{AnalysisError, Result};
use crate::models::{ColumnType, Schema, Table};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::collections::HashMap;
use std::io::Cursor;

/// Sheet layout shared by every indicator workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout<'a> {
    pub sheet_name: &'a str,
    /// Rows before the header row.
    pub preamble_rows: usize,
    /// Index column followed by the year columns.
    pub columns: &'a [String],
    /// Rows to keep, in output order.
    pub countries: &'a [String],
}

/// A loaded indicator: rows = countries, columns = years, plus the transpose.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTables {
    pub wide: Table,
    pub transposed: Table,
}

/// Fetch a workbook and load it.
pub fn load(
    client: &Client,
    source: &SpreadsheetSource,
    layout: &SheetLayout<'_>,
) -> Result<IndicatorTables> {
    let bytes = client.fetch(source)?;
    let name = match source {
        SpreadsheetSource::Remote { code } => code.clone(),
        SpreadsheetSource::File(p) => p.display().to_string(),
    };
    log::info!("loading {name} ({} bytes)", bytes.len());
    load_from_bytes(&name, bytes, layout)
}

/// Parse an in-memory `.xls`/`.xlsx` workbook.
///
/// `source_name` only appears in error messages and logs.
pub fn load_from_bytes(
    source_name: &str,
    bytes: Vec<u8>,
    layout: &SheetLayout<'_>,
) -> Result<IndicatorTables> {
    let (index_column, year_columns) = layout.columns.split_first().ok_or_else(|| {
        AnalysisError::Schema("column list must start with the country-name column".into())
    })?;
    let schema = Schema::indicator(index_column, year_columns);

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AnalysisError::fetch(source_name, e))?;
    if !workbook.sheet_names().iter().any(|s| s == layout.sheet_name) {
        return Err(AnalysisError::lookup("sheet", layout.sheet_name));
    }
    let range = workbook
        .worksheet_range(layout.sheet_name)
        .map_err(|e| AnalysisError::fetch(source_name, e))?;

    // The used range may start below row 0 when leading rows are blank.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let skip = layout.preamble_rows.saturating_sub(first_row);
    let mut rows = range.rows().skip(skip);

    let header = rows
        .next()
        .ok_or_else(|| AnalysisError::fetch(source_name, "sheet has no header row"))?;
    let positions = header_positions(header, &schema)?;

    let index_pos = positions[0];
    let mut by_country: HashMap<String, Vec<f64>> = HashMap::new();
    for row in rows {
        let Some(name) = row.get(index_pos).and_then(cell_text) else {
            continue;
        };
        by_country.entry(name).or_insert_with(|| {
            positions[1..]
                .iter()
                .map(|&p| row.get(p).map(cell_number).unwrap_or(f64::NAN))
                .collect()
        });
    }

    let mut cells = Vec::with_capacity(layout.countries.len());
    for country in layout.countries {
        let values = by_country
            .get(country)
            .ok_or_else(|| AnalysisError::lookup("country", country.as_str()))?;
        cells.push(values.clone());
    }

    let raw = Table::new(
        index_column.clone(),
        layout.countries.to_vec(),
        year_columns.to_vec(),
        cells,
    )?
    .with_columns_name("Year");
    let (wide, replaced) = raw.map_non_finite(0.0);
    if replaced > 0 {
        log::debug!("{source_name}: replaced {replaced} missing or non-finite cells with 0");
    }
    let transposed = wide.transpose();
    Ok(IndicatorTables { wide, transposed })
}

/// Locate every schema column in the header row and check its declared type.
///
/// The index column header must be text; year headers may be stored as text
/// (`"2000"`) or as numbers (`2000.0`).
fn header_positions(header: &[Data], schema: &Schema) -> Result<Vec<usize>> {
    let labels: Vec<Option<String>> = header.iter().map(cell_text).collect();
    schema
        .columns
        .iter()
        .map(|(name, ty)| {
            let pos = labels
                .iter()
                .position(|l| l.as_deref() == Some(name.as_str()))
                .ok_or_else(|| AnalysisError::lookup("column", name.as_str()))?;
            if *ty == ColumnType::Text && !matches!(header[pos], Data::String(_)) {
                return Err(AnalysisError::Schema(format!(
                    "index column {name:?} must have a text header"
                )));
            }
            Ok(pos)
        })
        .collect()
}

/// Cell as label text. Whole numbers print without a fractional part so `2000.0` matches `"2000"`.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Cell as an observation. Anything that is not a number becomes NaN and is cleaned later.
fn cell_number(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
