mod common;

use common::{COUNTRIES, Cell, YEARS, indicator_workbook, synthetic_value, workbook};
use wdi_explore::api::{Client, SpreadsheetSource};
use wdi_explore::error::AnalysisError;
use wdi_explore::loader::{SheetLayout, load, load_from_bytes};

fn columns() -> Vec<String> {
    std::iter::once("Country Name")
        .chain(YEARS)
        .map(String::from)
        .collect()
}

fn countries() -> Vec<String> {
    COUNTRIES.iter().map(|c| c.to_string()).collect()
}

fn layout<'a>(columns: &'a [String], countries: &'a [String]) -> SheetLayout<'a> {
    SheetLayout {
        sheet_name: "Data",
        preamble_rows: 3,
        columns,
        countries,
    }
}

#[test]
fn loads_wide_and_transposed_tables() {
    let (cols, ctry) = (columns(), countries());
    let t = load_from_bytes("synthetic", indicator_workbook(0), &layout(&cols, &ctry)).unwrap();

    assert_eq!(t.wide.rows(), ctry.as_slice());
    assert_eq!(t.wide.columns(), &cols[1..]);
    assert_eq!(t.wide.index_name, "Country Name");
    assert_eq!(t.transposed.rows(), &cols[1..]);
    assert_eq!(t.transposed.columns(), ctry.as_slice());
    assert_eq!(t.transposed.index_name, "Year");
    assert_eq!(t.wide.transpose(), t.transposed);

    // "World" is in the sheet but not requested.
    assert!(t.wide.row("World").is_err());
    assert_eq!(
        t.wide.get("China", "2009"),
        Some(synthetic_value(0, 4, 3))
    );
}

#[test]
fn rows_follow_requested_order() {
    let cols = columns();
    let ctry = vec!["China".to_string(), "Brazil".to_string()];
    let t = load_from_bytes("synthetic", indicator_workbook(1), &layout(&cols, &ctry)).unwrap();
    assert_eq!(t.wide.rows(), ["China", "Brazil"]);
    assert_eq!(t.wide.get("Brazil", "2000"), Some(synthetic_value(1, 5, 0)));
}

#[test]
fn numeric_year_headers_match_text_labels() {
    let rows = vec![(
        "Nigeria",
        YEARS.iter().enumerate().map(|(i, _)| Cell::Num(i as f64)).collect(),
    )];
    let bytes = workbook("Data", &YEARS, true, &rows);
    let cols = columns();
    let ctry = vec!["Nigeria".to_string()];
    let t = load_from_bytes("numeric-years", bytes, &layout(&cols, &ctry)).unwrap();
    assert_eq!(t.wide.get("Nigeria", "2015"), Some(5.0));
}

#[test]
fn missing_and_placeholder_cells_become_zero() {
    let rows = vec![(
        "Germany",
        vec![
            Cell::Num(1.5),
            Cell::Blank,
            Cell::Text(".."),
            Cell::Num(-2.0),
            Cell::Text("3.25"),
            Cell::Blank,
        ],
    )];
    let bytes = workbook("Data", &YEARS, false, &rows);
    let cols = columns();
    let ctry = vec!["Germany".to_string()];
    let t = load_from_bytes("gaps", bytes, &layout(&cols, &ctry)).unwrap();

    assert!(t.wide.all_finite());
    assert!(t.transposed.all_finite());
    let row = t.wide.row("Germany").unwrap();
    assert_eq!(row.values, vec![1.5, 0.0, 0.0, -2.0, 3.25, 0.0]);
}

#[test]
fn missing_country_is_lookup_error() {
    let cols = columns();
    let ctry = vec!["China".to_string(), "Atlantis".to_string()];
    let e = load_from_bytes("synthetic", indicator_workbook(0), &layout(&cols, &ctry)).unwrap_err();
    match e {
        AnalysisError::Lookup { kind, name } => {
            assert_eq!(kind, "country");
            assert_eq!(name, "Atlantis");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_year_column_is_lookup_error() {
    let mut cols = columns();
    cols.push("2017".into());
    let ctry = countries();
    let e = load_from_bytes("synthetic", indicator_workbook(0), &layout(&cols, &ctry)).unwrap_err();
    assert!(matches!(e, AnalysisError::Lookup { kind: "column", ref name } if name == "2017"));
}

#[test]
fn missing_sheet_is_lookup_error() {
    let (cols, ctry) = (columns(), countries());
    let bytes = workbook("Metadata - Countries", &YEARS, false, &[]);
    let e = load_from_bytes("synthetic", bytes, &layout(&cols, &ctry)).unwrap_err();
    assert!(matches!(e, AnalysisError::Lookup { kind: "sheet", .. }));
}

#[test]
fn loads_from_file_source() {
    let dir = tempfile::tempdir().unwrap();
    common::write_indicator_dir(dir.path());
    let source = SpreadsheetSource::for_code("SP.URB.GROW", Some(dir.path())).unwrap();
    assert!(matches!(source, SpreadsheetSource::File(_)));

    let (cols, ctry) = (columns(), countries());
    let t = load(&Client::default(), &source, &layout(&cols, &ctry)).unwrap();
    assert_eq!(t.wide.shape(), (7, 6));
}

#[test]
fn absent_workbook_in_data_dir_is_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let e = SpreadsheetSource::for_code("SP.URB.GROW", Some(dir.path())).unwrap_err();
    assert!(matches!(e, AnalysisError::Fetch { .. }));
}
