use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by dataforge operations.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// The input is not a rectangular record collection, or has no rows.
    #[error("{0}")]
    InputShape(String),

    /// A statistic could not be derived from the column values.
    #[error("{0}")]
    Computation(String),

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("File {path} is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid dataset id '{0}'")]
    InvalidDatasetId(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForgeError {
    pub fn input_shape(msg: impl Into<String>) -> Self {
        Self::InputShape(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
