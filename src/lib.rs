//! # dataforge
//!
//! Descriptive statistics for uploaded tabular datasets.
//!
//! - [`data`] — scalar cells, the column-major [`data::dataset::Dataset`],
//!   CSV/Excel/JSON loading, previews and schema detection
//! - [`processing`] — numeric summaries, Pearson correlation and the
//!   per-column aggregator
//! - [`state`] — serializable reports, the result envelope and the stats store
//! - [`config`] — directories, size limit and standard deviation convention
//! - [`error`] — error types
//!
//! ```
//! use dataforge::processing::aggregator::process_json;
//! use dataforge::processing::statistics::StdConvention;
//! use serde_json::json;
//!
//! let input = json!([{"a": 1, "b": "x"}, {"a": 2, "b": "y"}, {"a": 3, "b": "x"}]);
//! let envelope = process_json(&input, StdConvention::Sample);
//! let report = envelope.result().unwrap();
//!
//! assert_eq!(report.column("a").unwrap().count(), 3);
//! assert_eq!(report.column("b").unwrap().unique(), 2);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod state;
