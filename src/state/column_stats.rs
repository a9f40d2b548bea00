use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::data::value::Scalar;
use crate::state::ordered::OrderedMap;

/// Key under which the full correlation matrix is stored in a report.
pub const CORRELATION_KEY: &str = "correlation";

/// Pearson coefficients of one numeric column against others.
pub type CorrelationRow = OrderedMap<Option<f64>>;

/// Full numeric correlation matrix, column -> column -> coefficient.
pub type CorrelationTable = OrderedMap<CorrelationRow>;

/// Statistics of a column whose non-null values are all numbers.
///
/// Undefined values (too few observations, zero variance, non-finite
/// results) are `None` and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
    pub unique: usize,
    pub missing: usize,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    /// Off-diagonal coefficients against the other numeric columns.
    pub correlation: CorrelationRow,
}

/// Statistics of a boolean, text, mixed or all-null column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoricalStats {
    pub count: usize,
    pub unique: usize,
    /// Most frequent value, first encountered among ties.
    pub top: Option<Scalar>,
    pub freq: Option<usize>,
    pub missing: usize,
}

/// One record per column, typed by the column's inferred kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnStatistics {
    Numeric(NumericStats),
    Categorical(CategoricalStats),
}

impl ColumnStatistics {
    pub fn count(&self) -> usize {
        match self {
            Self::Numeric(s) => s.count,
            Self::Categorical(s) => s.count,
        }
    }

    pub fn unique(&self) -> usize {
        match self {
            Self::Numeric(s) => s.unique,
            Self::Categorical(s) => s.unique,
        }
    }

    pub fn missing(&self) -> usize {
        match self {
            Self::Numeric(s) => s.missing,
            Self::Categorical(s) => s.missing,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericStats> {
        match self {
            Self::Numeric(s) => Some(s),
            Self::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalStats> {
        match self {
            Self::Categorical(s) => Some(s),
            Self::Numeric(_) => None,
        }
    }
}

/// Merged statistics for a dataset.
///
/// Serializes as a single JSON object: one entry per column in dataset
/// order, followed by the full matrix under [`CORRELATION_KEY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsReport {
    pub columns: OrderedMap<ColumnStatistics>,
    pub correlation: CorrelationTable,
}

impl StatsReport {
    pub fn column(&self, name: &str) -> Option<&ColumnStatistics> {
        self.columns.get(name)
    }

    /// Coefficient between two numeric columns, `None` when undefined or
    /// either column is not numeric.
    pub fn correlation_between(&self, a: &str, b: &str) -> Option<f64> {
        self.correlation.get(a).and_then(|row| row.get(b)).copied().flatten()
    }
}

impl Serialize for StatsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        for (name, stats) in self.columns.iter() {
            map.serialize_entry(name, stats)?;
        }
        map.serialize_entry(CORRELATION_KEY, &self.correlation)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatsReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = OrderedMap::<Value>::deserialize(deserializer)?;
        let correlation = match raw.remove(CORRELATION_KEY) {
            Some(v) => serde_json::from_value(v).map_err(D::Error::custom)?,
            None => CorrelationTable::new(),
        };
        let mut columns = OrderedMap::new();
        for (name, v) in raw {
            let stats = serde_json::from_value(v)
                .map_err(|e| D::Error::custom(format!("column '{name}': {e}")))?;
            columns.insert(name, stats);
        }
        Ok(StatsReport {
            columns,
            correlation,
        })
    }
}
