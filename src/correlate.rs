//! Pearson correlation between indicator series.
//!
//! p-values are two-tailed, from Student's t with `n - 2` degrees of freedom.

use crate::error::{AnalysisError, Result};
use crate::models::{Series, Table, fmt_value, write_grid};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

/// Pearson r and its two-tailed p-value, rounded to 3 decimals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub p: f64,
}

/// Correlations of one reference series against each companion column, in column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationTable {
    pub reference: String,
    pub entries: Vec<(String, Correlation)>,
}

impl CorrelationTable {
    pub fn get(&self, column: &str) -> Option<Correlation> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| *v)
    }
}

impl fmt::Display for CorrelationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<(String, Vec<String>)> = self
            .entries
            .iter()
            .map(|(c, v)| (c.clone(), vec![fmt_value(v.r), fmt_value(v.p)]))
            .collect();
        write_grid(f, "", &["r".to_string(), "p".to_string()], &rows)
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn check_pair(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(AnalysisError::DimensionMismatch(format!(
            "correlation inputs have lengths {} and {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(AnalysisError::DimensionMismatch(format!(
            "correlation needs at least 2 observations, got {}",
            x.len()
        )));
    }
    Ok(())
}

/// Pearson r at full precision. NaN when either input has zero variance.
pub fn pearson_r(x: &[f64], y: &[f64]) -> Result<f64> {
    check_pair(x, y)?;
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Ok(f64::NAN);
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Pearson r and two-tailed p-value at full precision.
///
/// With exactly two observations the p-value is 1.0; a perfect correlation has p = 0.0.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    let r = pearson_r(x, y)?;
    if r.is_nan() {
        return Ok((f64::NAN, f64::NAN));
    }
    let df = (x.len() - 2) as f64;
    if df == 0.0 {
        return Ok((r, 1.0));
    }
    if r.abs() >= 1.0 {
        return Ok((r, 0.0));
    }
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AnalysisError::DimensionMismatch(format!("t distribution: {e}")))?;
    let p = (2.0 * dist.sf(t.abs())).min(1.0);
    Ok((r, p))
}

/// Correlate `reference` with every column of `companion`.
///
/// ### Errors
/// [`AnalysisError::DimensionMismatch`] when the reference index differs from the
/// companion rows or has fewer than 2 observations.
pub fn correlate(reference: &Series, companion: &Table) -> Result<CorrelationTable> {
    if reference.index != companion.rows() {
        return Err(AnalysisError::DimensionMismatch(format!(
            "reference {:?} is indexed by {:?}, companion table by {:?}",
            reference.name,
            reference.index,
            companion.rows()
        )));
    }
    let entries = companion
        .iter_columns()
        .map(|col| {
            let (r, p) = pearson(&reference.values, &col.values)?;
            Ok((
                col.name,
                Correlation {
                    r: round3(r),
                    p: round3(p),
                },
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorrelationTable {
        reference: reference.name.clone(),
        entries,
    })
}

/// Pairwise Pearson r for every column pair, self-pairs included. Symmetric by construction.
pub fn correlation_matrix(table: &Table) -> Result<Table> {
    let cols: Vec<Series> = table.iter_columns().collect();
    let n = cols.len();
    let mut cells = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson_r(&cols[i].values, &cols[j].values)?;
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }
    let names = table.columns().to_vec();
    Table::new("", names.clone(), names, cells)
}

/// Build the years × indicators table for one country from transposed indicator tables.
///
/// Each entry is `(column label, transposed table)`; non-finite values are cleaned to 0.
pub fn companion_table(country: &str, tables: &[(String, &Table)]) -> Result<Table> {
    let (_, first) = tables
        .first()
        .ok_or_else(|| AnalysisError::EmptyInput("no indicator tables".into()))?;
    let index = first.rows().to_vec();
    let columns = tables
        .iter()
        .map(|(label, t)| {
            let mut s = t.column(country)?;
            s.name = label.clone();
            Ok(s)
        })
        .collect::<Result<Vec<_>>>()?;
    let table = Table::from_columns(first.index_name.clone(), index, columns)?;
    Ok(table.map_non_finite(0.0).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years(n: usize) -> Vec<String> {
        (0..n).map(|i| (2000 + 3 * i).to_string()).collect()
    }

    #[test]
    fn two_point_scenario() {
        // {A: [10, 20], B: [5, 15]}
        let t = Table::new(
            "Year",
            years(2),
            vec!["A".into(), "B".into(), "C".into()],
            vec![vec![10.0, 5.0, 20.0], vec![20.0, 15.0, 10.0]],
        )
        .unwrap();
        let a = t.column("A").unwrap();
        let c = correlate(&a, &t).unwrap();
        assert_eq!(c.get("A").unwrap().r, 1.0);
        assert_eq!(c.get("B").unwrap().r, 1.0);
        assert_eq!(c.get("C").unwrap().r, -1.0);
        // Two observations leave no degrees of freedom.
        assert_eq!(c.get("B").unwrap().p, 1.0);
    }

    #[test]
    fn self_correlation_is_one_with_zero_p() {
        let t = Table::new(
            "Year",
            years(6),
            vec!["x".into(), "y".into()],
            vec![
                vec![1.0, 2.0],
                vec![3.0, 1.0],
                vec![2.0, 7.0],
                vec![8.0, 3.0],
                vec![5.0, 5.0],
                vec![4.0, 0.0],
            ],
        )
        .unwrap();
        let x = t.column("x").unwrap();
        let c = correlate(&x, &t).unwrap();
        assert_eq!(c.get("x"), Some(Correlation { r: 1.0, p: 0.0 }));
    }

    #[test]
    fn p_value_matches_reference() {
        // scipy.stats.pearsonr([1,2,3,4,5], [2,1,4,3,5]) -> r=0.8, p=0.10408
        let (r, p) = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        assert!((r - 0.8).abs() < 1e-12);
        assert!((p - 0.104_08).abs() < 1e-4);
    }

    #[test]
    fn constant_input_yields_nan() {
        let (r, p) = pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(r.is_nan() && p.is_nan());
    }

    #[test]
    fn unequal_lengths_are_rejected() {
        assert!(matches!(
            pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(AnalysisError::DimensionMismatch(_))
        ));
        assert!(matches!(
            pearson(&[1.0], &[1.0]),
            Err(AnalysisError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn reference_index_must_match() {
        let t = Table::new("Year", years(3), vec!["a".into()], vec![vec![1.0], vec![2.0], vec![4.0]])
            .unwrap();
        let s = Series::new("ref", vec!["x".into(), "y".into(), "z".into()], vec![1.0, 2.0, 3.0])
            .unwrap();
        assert!(matches!(
            correlate(&s, &t),
            Err(AnalysisError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let t = Table::new(
            "Year",
            years(4),
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![1.0, 4.0, 2.0],
                vec![2.0, 3.0, 9.0],
                vec![3.0, 1.0, 4.0],
                vec![5.0, 2.0, 1.0],
            ],
        )
        .unwrap();
        let m = correlation_matrix(&t).unwrap();
        let names = m.columns().to_vec();
        assert_eq!(m.rows(), names.as_slice());
        for i in &names {
            assert!((m.get(i, i).unwrap() - 1.0).abs() < 1e-12);
            for j in &names {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn all_zero_column_has_nan_diagonal() {
        // A country with no data loads as a column of zeros.
        let t = Table::new(
            "Year",
            years(3),
            vec!["gdp".into(), "empty".into()],
            vec![vec![1.0, 0.0], vec![4.0, 0.0], vec![2.0, 0.0]],
        )
        .unwrap();
        let m = correlation_matrix(&t).unwrap();
        assert!((m.get("gdp", "gdp").unwrap() - 1.0).abs() < 1e-12);
        assert!(m.get("empty", "empty").unwrap().is_nan());
        assert!(m.get("gdp", "empty").unwrap().is_nan());
    }

    #[test]
    fn companion_table_relabels_columns() {
        let gdp = Table::new(
            "Year",
            years(2),
            vec!["China".into(), "Brazil".into()],
            vec![vec![8.0, 1.0], vec![f64::NAN, 2.0]],
        )
        .unwrap();
        let forest = Table::new(
            "Year",
            years(2),
            vec!["China".into(), "Brazil".into()],
            vec![vec![18.0, 60.0], vec![19.0, 59.0]],
        )
        .unwrap();
        let c = companion_table(
            "China",
            &[("GDP Annual Growth".into(), &gdp), ("Forest Area".into(), &forest)],
        )
        .unwrap();
        assert_eq!(c.columns(), ["GDP Annual Growth", "Forest Area"]);
        assert_eq!(c.get("2003", "GDP Annual Growth"), Some(0.0));
        assert!(companion_table("Peru", &[("x".into(), &gdp)]).is_err());
    }
}
