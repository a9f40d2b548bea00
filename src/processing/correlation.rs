use crate::state::column_stats::{CorrelationRow, CorrelationTable};

/// Pearson correlation over pairwise-complete observations.
///
/// `None` marks a missing cell. Returns `None` when fewer than two rows have
/// both values or either side is constant over those rows.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let first = pairs[0];
    if pairs.iter().all(|p| p.0 == first.0) || pairs.iter().all(|p| p.1 == first.1) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = sxy / (sxx * syy).sqrt();
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Full correlation matrix of the given numeric columns.
///
/// The diagonal is always 1.0. Each pair is computed once and mirrored, so
/// the matrix is exactly symmetric.
pub fn correlation_matrix(columns: &[(&str, Vec<Option<f64>>)]) -> CorrelationTable {
    let k = columns.len();
    let mut cells: Vec<Vec<Option<f64>>> = vec![vec![None; k]; k];
    for i in 0..k {
        cells[i][i] = Some(1.0);
        for j in (i + 1)..k {
            let r = pearson(&columns[i].1, &columns[j].1);
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    columns
        .iter()
        .zip(cells)
        .map(|((name, _), row)| {
            let row: CorrelationRow = columns
                .iter()
                .zip(row)
                .map(|((other, _), r)| (other.to_string(), r))
                .collect();
            (name.to_string(), row)
        })
        .collect()
}

/// Row of `table` for `name` without its diagonal entry.
pub fn off_diagonal(table: &CorrelationTable, name: &str) -> CorrelationRow {
    table
        .get(name)
        .map(|row| {
            row.iter()
                .filter(|(other, _)| *other != name)
                .map(|(other, r)| (other.to_string(), *r))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn perfect_correlations() {
        let x = col(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = col(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let z = col(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &z).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pairwise_complete_rows_only() {
        let x = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let y = vec![Some(2.0), Some(4.0), Some(100.0), Some(8.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_cases() {
        let x = col(&[1.0, 2.0, 3.0]);
        assert_eq!(pearson(&x, &col(&[7.0, 7.0, 7.0])), None);
        assert_eq!(pearson(&col(&[1.0]), &col(&[2.0])), None);
        assert_eq!(pearson(&[Some(1.0), None], &[None, Some(2.0)]), None);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let cols = vec![
            ("a", col(&[1.0, 2.0, 3.0, 4.0])),
            ("b", col(&[1.0, 3.0, 2.0, 5.0])),
            ("c", col(&[9.0, 9.0, 9.0, 9.0])),
        ];
        let m = correlation_matrix(&cols);
        for (a, _) in &cols {
            assert_eq!(m.get(a).unwrap().get(a), Some(&Some(1.0)));
            for (b, _) in &cols {
                assert_eq!(m.get(a).unwrap().get(b), m.get(b).unwrap().get(a));
            }
        }
        assert_eq!(m.get("a").unwrap().get("c"), Some(&None));

        let row = off_diagonal(&m, "a");
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
