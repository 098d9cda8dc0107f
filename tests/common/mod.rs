//! In-memory indicator workbooks shaped like the World Bank `downloadformat=excel` files.
#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::Path;

pub const YEARS: [&str; 6] = ["2000", "2003", "2006", "2009", "2012", "2015"];

pub const COUNTRIES: [&str; 7] = [
    "United States",
    "United Kingdom",
    "Germany",
    "Nigeria",
    "China",
    "Brazil",
    "Australia",
];

pub const CODES: [&str; 6] = [
    "SP.URB.GROW",
    "EG.ELC.FOSL.ZS",
    "NV.AGR.TOTL.ZS",
    "EN.ATM.CO2E.PC",
    "AG.LND.FRST.ZS",
    "NY.GDP.MKTP.KD.ZG",
];

/// A cell in a data row.
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    Num(f64),
    /// Text placeholder such as `".."`.
    Text(&'static str),
    Blank,
}

/// Build a workbook with a 3-row preamble, a header at row 3 and one row per country.
///
/// Year headers are written as text, or as numbers with `numeric_years`.
pub fn workbook(
    sheet: &str,
    years: &[&str],
    numeric_years: bool,
    rows: &[(&str, Vec<Cell>)],
) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sheet).unwrap();
    ws.write_string(0, 0, "Data Source").unwrap();
    ws.write_string(0, 1, "World Development Indicators").unwrap();
    ws.write_string(2, 0, "Last Updated Date").unwrap();
    ws.write_string(2, 1, "2024-06-28").unwrap();

    let fixed = ["Country Name", "Country Code", "Indicator Name", "Indicator Code"];
    for (c, h) in fixed.iter().enumerate() {
        ws.write_string(3, c as u16, *h).unwrap();
    }
    for (i, y) in years.iter().enumerate() {
        let col = (fixed.len() + i) as u16;
        if numeric_years {
            ws.write_number(3, col, y.parse::<f64>().unwrap()).unwrap();
        } else {
            ws.write_string(3, col, *y).unwrap();
        }
    }

    for (r, (country, cells)) in rows.iter().enumerate() {
        let row = 4 + r as u32;
        ws.write_string(row, 0, *country).unwrap();
        ws.write_string(row, 1, "XXX").unwrap();
        ws.write_string(row, 2, "Some indicator").unwrap();
        ws.write_string(row, 3, "X.Y.Z").unwrap();
        for (i, cell) in cells.iter().enumerate() {
            let col = (fixed.len() + i) as u16;
            match cell {
                Cell::Num(v) => {
                    ws.write_number(row, col, *v).unwrap();
                }
                Cell::Text(s) => {
                    ws.write_string(row, col, *s).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    wb.save_to_buffer().unwrap()
}

/// Deterministic, non-constant values for indicator `ii`, country `ci`, year `yi`.
pub fn synthetic_value(ii: usize, ci: usize, yi: usize) -> f64 {
    ((ci * 7 + yi * (ii + 2) + ii) % 11) as f64 + yi as f64 * 0.25 + ci as f64 * 0.5
}

/// Full indicator workbook with the seven report countries plus an aggregate row.
pub fn indicator_workbook(ii: usize) -> Vec<u8> {
    let mut rows: Vec<(&str, Vec<Cell>)> = vec![(
        "World",
        YEARS.iter().map(|_| Cell::Num(1.0)).collect(),
    )];
    for (ci, c) in COUNTRIES.iter().enumerate() {
        let cells = (0..YEARS.len())
            .map(|yi| Cell::Num(synthetic_value(ii, ci, yi)))
            .collect();
        rows.push((*c, cells));
    }
    workbook("Data", &YEARS, false, &rows)
}

/// Write `<code>.xlsx` for every report indicator into `dir`.
pub fn write_indicator_dir(dir: &Path) {
    for (ii, code) in CODES.iter().enumerate() {
        std::fs::write(dir.join(format!("{code}.xlsx")), indicator_workbook(ii)).unwrap();
    }
}
