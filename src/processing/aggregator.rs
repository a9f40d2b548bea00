//! Per-column descriptive statistics for a whole dataset.
//!
//! [`process_json`] and [`process_dataset`] never fail: every error is
//! reported through the returned [`StatsEnvelope`], and no partial result is
//! produced.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::data::dataset::Dataset;
use crate::data::loader;
use crate::data::value::{Scalar, ScalarKey};
use crate::error::{ForgeError, Result};
use crate::processing::correlation::{correlation_matrix, off_diagonal};
use crate::processing::statistics::{finite, NumericSummary, StdConvention};
use crate::state::column_stats::{
    CategoricalStats, ColumnStatistics, CorrelationRow, NumericStats, StatsReport, CORRELATION_KEY,
};
use crate::state::envelope::StatsEnvelope;
use crate::state::ordered::OrderedMap;
use crate::state::store::{StatsStore, StoredStats};

/// How a column is described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-missing value is an integer or float, and there is at least one.
    Numeric,
    /// Anything else: booleans, text, mixed types, all-missing.
    Categorical,
}

/// Infer the kind of a column from the union of its values.
pub fn infer_kind(cells: &[Scalar]) -> ColumnKind {
    let mut present = cells.iter().filter(|v| !v.is_missing()).peekable();
    if present.peek().is_none() {
        return ColumnKind::Categorical;
    }
    if present.all(Scalar::is_number) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Describe a JSON document (records, columnar, or index-oriented mapping).
pub fn process_json(input: &Value, convention: StdConvention) -> StatsEnvelope {
    let outcome = Dataset::from_json(input).and_then(|ds| describe(&ds, convention));
    into_envelope(outcome)
}

/// Describe an already-loaded dataset.
pub fn process_dataset(dataset: &Dataset, convention: StdConvention) -> StatsEnvelope {
    into_envelope(describe(dataset, convention))
}

/// Load a dataset file and describe it.
///
/// I/O and format errors are returned as `Err`; a file that loads but is
/// not a usable table yields a failure envelope.
pub fn process_file(path: &Path, max_size: u64, convention: StdConvention) -> Result<StatsEnvelope> {
    match loader::load_file(path, max_size) {
        Ok(dataset) => Ok(process_dataset(&dataset, convention)),
        Err(e @ (ForgeError::InputShape(_) | ForgeError::Computation(_))) => Ok(into_envelope(Err(e))),
        Err(e) => Err(e),
    }
}

/// Describe a dataset file and store the outcome under `dataset_id`, or the
/// file stem when no id is given. Failure envelopes are stored as well.
///
/// Returns the stored record and the path it was written to.
pub fn analyze_file(
    path: &Path,
    dataset_id: Option<&str>,
    store: &StatsStore,
    max_size: u64,
    convention: StdConvention,
) -> Result<(StoredStats, PathBuf)> {
    let dataset_id = match dataset_id {
        Some(id) => id.to_string(),
        None => default_dataset_id(path)?,
    };
    let envelope = process_file(path, max_size, convention)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stored = StoredStats::new(dataset_id, source, convention, envelope);
    let saved = store.save(&stored)?;
    if let Some(error) = stored.envelope.error() {
        tracing::error!("Statistics for {:?} failed: {error}", path);
    }
    Ok((stored, saved))
}

/// Dataset id derived from a file name: its stem.
pub fn default_dataset_id(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| ForgeError::InvalidDatasetId(path.display().to_string()))
}

fn into_envelope(outcome: Result<StatsReport>) -> StatsEnvelope {
    match outcome {
        Ok(report) => StatsEnvelope::Success(report),
        Err(e) => {
            tracing::warn!("Statistics computation failed: {e}");
            StatsEnvelope::Failure(e.to_string())
        }
    }
}

/// Compute the merged per-column report.
pub fn describe(dataset: &Dataset, convention: StdConvention) -> Result<StatsReport> {
    if dataset.is_empty() {
        return Err(ForgeError::input_shape("Your dataset is empty."));
    }
    if dataset.column(CORRELATION_KEY).is_some() {
        return Err(ForgeError::input_shape(format!(
            "Column name '{CORRELATION_KEY}' is reserved for the correlation table"
        )));
    }

    let mut columns: OrderedMap<ColumnStatistics> = OrderedMap::new();
    let mut numeric_values: Vec<(&str, Vec<Option<f64>>)> = Vec::new();

    for (name, cells) in dataset.iter() {
        let stats = match infer_kind(cells) {
            ColumnKind::Numeric => {
                let values: Vec<Option<f64>> = cells
                    .iter()
                    .map(|v| if v.is_missing() { None } else { v.as_f64() })
                    .collect();
                let stats = describe_numeric(name, cells, &values, convention)?;
                numeric_values.push((name, values));
                ColumnStatistics::Numeric(stats)
            }
            ColumnKind::Categorical => ColumnStatistics::Categorical(describe_categorical(name, cells)?),
        };
        columns.insert(name, stats);
    }

    let correlation = correlation_matrix(&numeric_values);
    for (name, _) in &numeric_values {
        if let Some(ColumnStatistics::Numeric(stats)) = columns.get_mut(name) {
            stats.correlation = off_diagonal(&correlation, name);
        }
    }

    tracing::debug!(
        "Described {} columns ({} numeric) over {} rows",
        dataset.column_count(),
        numeric_values.len(),
        dataset.row_count()
    );

    Ok(StatsReport {
        columns,
        correlation,
    })
}

fn describe_numeric(
    name: &str,
    cells: &[Scalar],
    values: &[Option<f64>],
    convention: StdConvention,
) -> Result<NumericStats> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let summary = NumericSummary::compute(&present, convention).ok_or_else(|| {
        ForgeError::computation(format!("column '{name}' has no numeric values"))
    })?;

    let distinct: HashSet<ScalarKey<'_>> = cells
        .iter()
        .filter(|v| !v.is_missing())
        .filter_map(Scalar::key)
        .collect();

    Ok(NumericStats {
        count: summary.count,
        mean: finite(summary.mean),
        std: summary.std.and_then(finite),
        min: finite(summary.min),
        p25: finite(summary.p25),
        p50: finite(summary.median),
        p75: finite(summary.p75),
        max: finite(summary.max),
        unique: distinct.len(),
        missing: values.len() - summary.count,
        skewness: summary.skewness.and_then(finite),
        kurtosis: summary.kurtosis.and_then(finite),
        correlation: CorrelationRow::new(),
    })
}

fn describe_categorical(name: &str, cells: &[Scalar]) -> Result<CategoricalStats> {
    // (first value seen, occurrences) in first-seen order
    let mut tally: Vec<(&Scalar, usize)> = Vec::new();
    let mut slots: HashMap<ScalarKey<'_>, usize> = HashMap::new();
    let mut count = 0usize;

    for cell in cells {
        if cell.is_missing() {
            continue;
        }
        let key = cell.key().ok_or_else(|| {
            ForgeError::computation(format!(
                "unhashable value of type '{}' in column '{name}'",
                cell.type_name()
            ))
        })?;
        count += 1;
        let slot = *slots.entry(key).or_insert_with(|| {
            tally.push((cell, 0));
            tally.len() - 1
        });
        tally[slot].1 += 1;
    }

    let mut top: Option<(&Scalar, usize)> = None;
    for &(value, freq) in &tally {
        if top.map_or(true, |(_, best)| freq > best) {
            top = Some((value, freq));
        }
    }

    Ok(CategoricalStats {
        count,
        unique: tally.len(),
        top: top.map(|(v, _)| v.clone()),
        freq: top.map(|(_, f)| f),
        missing: cells.len() - count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn report(input: Value) -> StatsReport {
        match process_json(&input, StdConvention::Sample) {
            StatsEnvelope::Success(report) => report,
            StatsEnvelope::Failure(e) => panic!("unexpected failure: {e}"),
        }
    }

    #[test]
    fn kinds() {
        assert_eq!(infer_kind(&[Scalar::Int(1), Scalar::Float(2.5), Scalar::Null]), ColumnKind::Numeric);
        assert_eq!(infer_kind(&[Scalar::Bool(true), Scalar::Bool(false)]), ColumnKind::Categorical);
        assert_eq!(infer_kind(&[Scalar::Int(1), Scalar::Text("x".into())]), ColumnKind::Categorical);
        assert_eq!(infer_kind(&[Scalar::Null, Scalar::Null]), ColumnKind::Categorical);
    }

    #[test]
    fn reference_example() {
        let r = report(json!([{"a":1,"b":"x"},{"a":2,"b":"y"},{"a":3,"b":"x"}]));
        let a = r.column("a").unwrap().as_numeric().unwrap();
        assert_eq!(a.count, 3);
        assert_eq!(a.mean, Some(2.0));
        assert_eq!(a.std, Some(1.0));
        assert_eq!(a.p50, Some(2.0));
        assert_eq!(a.unique, 3);
        assert_eq!(a.missing, 0);

        let b = r.column("b").unwrap().as_categorical().unwrap();
        assert_eq!(b.unique, 2);
        assert_eq!(b.top, Some(Scalar::Text("x".into())));
        assert_eq!(b.freq, Some(2));
    }

    #[test]
    fn ties_resolve_to_first_seen() {
        let r = report(json!({"c": ["y", "x", "x", "y", null]}));
        let c = r.column("c").unwrap().as_categorical().unwrap();
        assert_eq!(c.top, Some(Scalar::Text("y".into())));
        assert_eq!(c.freq, Some(2));
        assert_eq!(c.count, 4);
        assert_eq!(c.missing, 1);
    }

    #[test]
    fn all_null_column_is_categorical_without_top() {
        let r = report(json!([{"a": 1, "n": null}, {"a": 2, "n": null}]));
        let n = r.column("n").unwrap().as_categorical().unwrap();
        assert_eq!(n.count, 0);
        assert_eq!(n.unique, 0);
        assert_eq!(n.top, None);
        assert_eq!(n.freq, None);
        assert_eq!(n.missing, 2);
    }

    #[test]
    fn numeric_columns_carry_off_diagonal_correlation() {
        let r = report(json!({
            "x": [1, 2, 3, 4],
            "y": [2.0, 4.0, 6.0, 8.0],
            "label": ["a", "b", "a", "b"]
        }));
        let x = r.column("x").unwrap().as_numeric().unwrap();
        assert_eq!(x.correlation.keys().collect::<Vec<_>>(), vec!["y"]);
        assert!((x.correlation.get("y").unwrap().unwrap() - 1.0).abs() < 1e-12);
        assert!(r.correlation.get("label").is_none());
        assert_eq!(r.correlation_between("y", "y"), Some(1.0));
    }

    #[test]
    fn single_value_numeric_column() {
        let r = report(json!([{"v": 5}, {"v": null}]));
        let v = r.column("v").unwrap().as_numeric().unwrap();
        assert_eq!(v.count, 1);
        assert_eq!(v.std, None);
        assert_eq!(v.skewness, None);
        assert_eq!(v.kurtosis, None);
        assert_eq!(v.missing, 1);
    }

    #[test]
    fn nested_cells_fail_the_whole_computation() {
        let out = process_json(&json!([{"a": 1, "tags": ["x"]}]), StdConvention::Sample);
        let err = out.error().unwrap();
        assert!(err.contains("tags"), "{err}");
        assert!(out.result().is_none());
    }

    #[test]
    fn reserved_column_name_is_rejected() {
        let out = process_json(&json!([{"correlation": 1}]), StdConvention::Sample);
        assert!(!out.is_success());
    }

    #[test]
    fn empty_and_scalar_inputs_fail() {
        for input in [json!([]), json!({}), json!(3), json!("rows"), json!([1, 2])] {
            let out = process_json(&input, StdConvention::Sample);
            assert!(!out.is_success(), "{input}");
        }
        assert_eq!(
            process_json(&json!([]), StdConvention::Sample).error(),
            Some("Your dataset is empty.")
        );
    }

    #[test]
    fn large_integers_count_as_distinct() {
        let big = 1i64 << 53;
        let r = report(json!({
            "n": [big, big + 1, big + 1],
            "id": [big.to_string(), (big + 1).to_string(), (big + 1).to_string()]
        }));
        assert_eq!(r.column("n").unwrap().unique(), 2);
        let id = r.column("id").unwrap().as_categorical().unwrap();
        assert_eq!(id.unique, 2);
        assert_eq!(id.freq, Some(2));

        let mixed = report(json!({"m": [big + 1, "x", big, big + 1]}));
        let m = mixed.column("m").unwrap().as_categorical().unwrap();
        assert_eq!(m.unique, 3);
        assert_eq!(m.top, Some(Scalar::Int(big + 1)));
        assert_eq!(m.freq, Some(2));
    }

    #[test]
    fn int_and_float_values_are_one_distinct_value() {
        let r = report(json!({"v": [1, 1.0, 2.5]}));
        assert_eq!(r.column("v").unwrap().unique(), 2);
    }

    #[test]
    fn wide_dataset_has_full_correlation_table() {
        let k = 600;
        let mut columns = Map::new();
        for c in 0..k {
            columns.insert(format!("c{c}"), json!([c, c * 2 + 1, c * c]));
        }
        let r = report(Value::Object(columns));
        assert_eq!(r.columns.len(), k);
        assert_eq!(r.correlation.len(), k);
        assert_eq!(r.columns.keys().nth(k - 1), Some("c599"));
        let last = r.column("c599").unwrap().as_numeric().unwrap();
        assert_eq!(last.correlation.len(), k - 1);
        assert!(last.correlation.get("c599").is_none());
        assert_eq!(r.correlation_between("c0", "c599"), r.correlation_between("c599", "c0"));
    }

    #[test]
    fn convention_changes_std_only() {
        let input = json!({"v": [2, 4, 4, 4, 5, 5, 7, 9]});
        let sample = describe(&Dataset::from_json(&input).unwrap(), StdConvention::Sample).unwrap();
        let pop = describe(&Dataset::from_json(&input).unwrap(), StdConvention::Population).unwrap();
        let s = sample.column("v").unwrap().as_numeric().unwrap();
        let p = pop.column("v").unwrap().as_numeric().unwrap();
        assert_eq!(p.std, Some(2.0));
        assert!(s.std.unwrap() > 2.0);
        assert_eq!(s.skewness, p.skewness);
        assert_eq!(s.mean, p.mean);
    }
}
