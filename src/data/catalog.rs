use std::path::{Path, PathBuf};

use crate::data::dataset::Dataset;
use crate::data::loader;
use crate::data::value::Scalar;
use crate::error::Result;

/// Rows shown in a dataset preview.
pub const PREVIEW_ROWS: usize = 5;

/// A dataset file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    pub name: String,
    pub path: PathBuf,
}

/// List supported dataset files directly inside `dir`, sorted by name.
pub fn list_datasets(dir: &Path) -> Result<Vec<DatasetFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !loader::is_supported(&path) {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        files.push(DatasetFile { name, path });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Markdown summary of a dataset: name, shape, columns and the first rows.
pub fn preview(dataset: &Dataset, name: &str) -> String {
    let mut info = format!("**File:** {name}\n\n");
    info.push_str(&format!(
        "**Size:** {} rows, {} columns\n\n",
        dataset.row_count(),
        dataset.column_count()
    ));
    info.push_str(&format!("**Columns:** {}\n\n", dataset.columns.join(", ")));
    info.push_str(&format!("**First {PREVIEW_ROWS} rows:**\n\n"));
    info.push_str(&markdown_table(&dataset.columns, &dataset.head(PREVIEW_ROWS)));
    info
}

fn markdown_table(columns: &[String], rows: &[Vec<&Scalar>]) -> String {
    let escape = |s: String| s.replace('|', "\\|").replace('\n', " ");

    let mut out = String::new();
    out.push_str("| ");
    out.push_str(
        &columns
            .iter()
            .map(|c| escape(c.clone()))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    out.push_str(" |\n|");
    for _ in columns {
        out.push_str(":---|");
    }
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| escape(v.to_string())).collect();
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
    }
    out
}
