use std::path::Path;

use serde_json::Value;

use crate::data::dataset::Dataset;
use crate::data::parser;
use crate::data::value::Scalar;
use crate::error::{ForgeError, Result};

/// File extensions the loader understands, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "json"];

/// Lowercase extension of a path, empty if it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Load a CSV, Excel or JSON file into a dataset.
///
/// Files larger than `max_size` bytes are rejected before being read.
pub fn load_file(path: &Path, max_size: u64) -> Result<Dataset> {
    let ext = extension_of(path);
    if !is_supported(path) {
        return Err(ForgeError::UnsupportedFormat(ext));
    }
    check_size(path, max_size)?;

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "xls" | "xlsx" => load_excel(path)?,
        _ => Dataset::from_json(&read_json(path)?)?,
    };
    tracing::info!(
        "Loaded {:?}: {} rows, {} columns",
        path,
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

/// Parse a JSON file without interpreting its shape.
pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

fn check_size(path: &Path, max_size: u64) -> Result<()> {
    let size = std::fs::metadata(path)?.len();
    if size > max_size {
        return Err(ForgeError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_size,
        });
    }
    Ok(())
}

fn load_csv(path: &Path) -> Result<Dataset> {
    let text = parser::decode_text(std::fs::read(path)?);
    parse_csv_str(&text)
}

/// Parse CSV text whose first record is the header.
pub fn parse_csv_str(text: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let name = h.trim();
            if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name.to_string()
            }
        })
        .collect();
    let columns = parser::dedup_header_names(columns);

    let mut rows: Vec<Vec<Scalar>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(parser::parse_cell).collect());
    }

    Dataset::from_rows(columns, rows)
}

fn load_excel(path: &Path) -> Result<Dataset> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ForgeError::Excel(format!("Cannot open Excel file: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ForgeError::Excel("No sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ForgeError::Excel(format!("Cannot read sheet: {e}")))?;

    let mut row_iter = range.rows();
    let header = match row_iter.next() {
        Some(header) => header,
        None => return Ok(Dataset::default()),
    };
    let columns: Vec<String> = (0..header.len())
        .map(|idx| parser::header_name(header.get(idx), idx))
        .collect();
    let columns = parser::dedup_header_names(columns);

    let rows: Vec<Vec<Scalar>> = row_iter
        .map(|row| row.iter().map(parser::excel_cell).collect())
        .collect();

    Dataset::from_rows(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_header_and_types() {
        let ds = parse_csv_str("name,value,active\nAlice,1.5,true\nBob,,false\n").unwrap();
        assert_eq!(ds.columns, vec!["name", "value", "active"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column("value").unwrap(), &[Scalar::Float(1.5), Scalar::Null]);
        assert_eq!(ds.column("active").unwrap()[1], Scalar::Bool(false));
    }

    #[test]
    fn csv_short_rows_are_padded() {
        let ds = parse_csv_str("a,b,c\n1,2\n").unwrap();
        assert_eq!(ds.column("c").unwrap(), &[Scalar::Null]);
    }

    #[test]
    fn csv_blank_header_is_named() {
        let ds = parse_csv_str(",x\n0,1\n").unwrap();
        assert_eq!(ds.columns, vec!["Unnamed: 0", "x"]);
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert!(is_supported(Path::new("data/Report.XLSX")));
        assert!(is_supported(Path::new("a.json")));
        assert!(!is_supported(Path::new("a.txt")));
        assert!(!is_supported(Path::new("noext")));
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let err = load_file(Path::new("notes.txt"), u64::MAX).unwrap_err();
        assert!(matches!(err, ForgeError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn csv_repeated_headers_are_renamed() {
        let ds = parse_csv_str("a,a,b,a\n1,2,x,3\n4,5,y,6\n").unwrap();
        assert_eq!(ds.columns, vec!["a", "a.1", "b", "a.2"]);
        assert_eq!(ds.column("a.1").unwrap(), &[Scalar::Int(2), Scalar::Int(5)]);
        assert_eq!(ds.column("a.2").unwrap(), &[Scalar::Int(3), Scalar::Int(6)]);
    }

    #[test]
    fn csv_extra_cells_are_dropped() {
        let ds = parse_csv_str("a,b\n1,2,3\n4,5\n").unwrap();
        assert_eq!(ds.columns, vec!["a", "b"]);
        assert_eq!(ds.column("b").unwrap(), &[Scalar::Int(2), Scalar::Int(5)]);
    }
}
