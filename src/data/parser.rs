use std::collections::HashMap;

use calamine::Data;

use crate::data::datetime::format_datetime;
use crate::data::value::Scalar;

/// Cell texts read as missing values.
pub const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "-"];

/// Decode file bytes as UTF-8, falling back to Latin-1 where each byte maps
/// to the same Unicode code point.
pub fn decode_text(content: Vec<u8>) -> String {
    match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Infer a typed scalar from a CSV cell.
pub fn parse_cell(raw: &str) -> Scalar {
    let trimmed = raw.trim();
    if NULL_TOKENS.contains(&trimmed) {
        return Scalar::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Scalar::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Scalar::Bool(false);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Scalar::Int(i);
    }
    // Rust parses "inf"/"infinity" too; those stay text like any other word.
    if trimmed.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = trimmed.parse::<f64>() {
            return Scalar::Float(f);
        }
    }
    Scalar::Text(raw.to_string())
}

/// Convert a spreadsheet cell into a scalar.
pub fn excel_cell(cell: &Data) -> Scalar {
    match cell {
        Data::Empty | Data::Error(_) => Scalar::Null,
        Data::String(s) if s.trim().is_empty() => Scalar::Null,
        Data::String(s) => Scalar::Text(s.clone()),
        Data::Float(f) => Scalar::Float(*f),
        Data::Int(i) => Scalar::Int(*i),
        Data::Bool(b) => Scalar::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Scalar::Text(format_datetime(naive)),
            None => Scalar::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Scalar::Text(s.clone()),
    }
}

/// Header cell text for a spreadsheet column; blank headers get a positional
/// name.
pub fn header_name(cell: Option<&Data>, idx: usize) -> String {
    let name = match cell {
        Some(Data::Empty) | None => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    };
    if name.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        name
    }
}

/// Rename repeated header names to `name.1`, `name.2`, ... so every column
/// is addressable. A generated name that is itself taken gets suffixed again.
pub fn dedup_header_names(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::with_capacity(names.len());
    names
        .into_iter()
        .map(|mut name| {
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{name}.{seen}");
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), seen + 1);
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_typed() {
        assert_eq!(parse_cell("42"), Scalar::Int(42));
        assert_eq!(parse_cell(" -3.5 "), Scalar::Float(-3.5));
        assert_eq!(parse_cell("1e3"), Scalar::Float(1000.0));
        assert_eq!(parse_cell("TRUE"), Scalar::Bool(true));
        assert_eq!(parse_cell("false"), Scalar::Bool(false));
        assert_eq!(parse_cell("hello"), Scalar::Text("hello".into()));
        assert_eq!(parse_cell("inf"), Scalar::Text("inf".into()));
    }

    #[test]
    fn null_tokens_are_missing() {
        for token in ["", "  ", "NA", "NaN", "null", "None"] {
            assert_eq!(parse_cell(token), Scalar::Null, "token {token:?}");
        }
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(decode_text(vec![0x63, 0x61, 0x66, 0xE9]), "café");
        assert_eq!(decode_text("naïve".as_bytes().to_vec()), "naïve");
    }

    #[test]
    fn excel_cells_map_to_scalars() {
        assert_eq!(excel_cell(&Data::Empty), Scalar::Null);
        assert_eq!(excel_cell(&Data::Float(1.5)), Scalar::Float(1.5));
        assert_eq!(excel_cell(&Data::Int(7)), Scalar::Int(7));
        assert_eq!(excel_cell(&Data::String("  ".into())), Scalar::Null);
        assert_eq!(excel_cell(&Data::Bool(true)), Scalar::Bool(true));
    }

    #[test]
    fn blank_headers_get_positional_names() {
        assert_eq!(header_name(Some(&Data::String(" id ".into())), 0), "id");
        assert_eq!(header_name(Some(&Data::Empty), 2), "Unnamed: 2");
        assert_eq!(header_name(None, 3), "Unnamed: 3");
    }

    #[test]
    fn repeated_headers_are_suffixed() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(dedup_header_names(names(&["a", "b"])), names(&["a", "b"]));
        assert_eq!(dedup_header_names(names(&["a", "a", "a"])), names(&["a", "a.1", "a.2"]));
        assert_eq!(
            dedup_header_names(names(&["a", "a", "a.1"])),
            names(&["a", "a.1", "a.1.1"])
        );
    }
}
