use serde::{Deserialize, Serialize};

/// Divisor convention for the standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdConvention {
    /// Divide by `n - 1`.
    #[default]
    Sample,
    /// Divide by `n`.
    Population,
}

impl StdConvention {
    pub fn ddof(self) -> usize {
        match self {
            StdConvention::Sample => 1,
            StdConvention::Population => 0,
        }
    }
}

/// Descriptive statistics of the non-missing values of a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

impl NumericSummary {
    /// Compute statistics from values, filtering out NaN.
    ///
    /// Skewness and excess kurtosis are the third and fourth standardized
    /// population moments (`m3 / m2^1.5`, `m4 / m2^2 - 3`). They and the
    /// standard deviation are `None` below two values; skewness and kurtosis
    /// are also `None` for a constant column.
    pub fn compute(values: &[f64], convention: StdConvention) -> Option<Self> {
        let mut vals: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if vals.is_empty() {
            return None;
        }
        vals.sort_by(|a, b| a.total_cmp(b));

        let count = vals.len();
        let n = count as f64;
        let min = vals[0];
        let max = vals[count - 1];
        let mean = vals.iter().sum::<f64>() / n;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for v in &vals {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        let sum_sq = m2;
        m2 /= n;
        m3 /= n;
        m4 /= n;

        let constant = min == max;
        let std = if count >= 2 {
            if constant {
                Some(0.0)
            } else {
                Some((sum_sq / (count - convention.ddof()) as f64).sqrt())
            }
        } else {
            None
        };

        let (skewness, kurtosis) = if count < 2 || constant {
            (None, None)
        } else {
            (Some(m3 / m2.powf(1.5)), Some(m4 / (m2 * m2) - 3.0))
        };

        Some(NumericSummary {
            count,
            mean,
            std,
            min,
            p25: quantile_sorted(&vals, 0.25),
            median: quantile_sorted(&vals, 0.5),
            p75: quantile_sorted(&vals, 0.75),
            max,
            skewness,
            kurtosis,
        })
    }
}

/// Quantile of ascending-sorted data by linear interpolation between the
/// closest ranks (`h = (n - 1) * q`). `sorted` must be non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// `Some(v)` for finite values.
pub fn finite(v: f64) -> Option<f64> {
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}
