//! CSV reading and writing with encoding auto-detection.
//!
//! Files are loaded into an ordered [`Table`] so that every pre-existing
//! column survives enrichment in its original position.

use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Column-ordered CSV contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Position of a column, matched exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell values of a column in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Overwrite a column in place, or append it if absent.
    ///
    /// `values` must hold one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= idx {
                row.resize(idx + 1, String::new());
            }
            row[idx] = value;
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parsed table plus the encoding it was decoded from
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: Table,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let content = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8(bytes.to_vec())
                .map_err(|e| CsvError::Encoding(format!("{}: {}", other, e)))?,
        },
    };

    // Spreadsheet exports often start with a byte order mark
    Ok(content.trim_start_matches('\u{feff}').to_string())
}

/// Parse comma-separated content into a [`Table`].
///
/// Short rows are padded with empty cells; rows with more fields than
/// the header are rejected.
pub fn parse_csv_str(content: &str) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut table = Table::new(headers);
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = idx + 2;

        if record.len() > table.headers.len() {
            return Err(CsvError::Parse(format!(
                "Line {}: expected {} fields, saw {}",
                line,
                table.headers.len(),
                record.len()
            )));
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(table.headers.len(), String::new());
        table.rows.push(row);
    }

    Ok(table)
}

/// Parse CSV bytes with encoding auto-detection.
///
/// Valid UTF-8 is always read as UTF-8; chardet is only consulted for
/// bytes that are not.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        "utf-8".to_string()
    } else {
        detect_encoding(bytes)
    };
    let content = decode_content(bytes, &encoding)?;
    let table = parse_csv_str(&content)?;

    Ok(ParseResult { table, encoding })
}

/// Parse a CSV file with encoding auto-detection.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Serialize a table as UTF-8 CSV.
pub fn to_csv_string(table: &Table) -> CsvResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Parse(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| CsvError::Encoding(e.to_string()))
}

/// Write a table to disk, replacing any existing file at `path`.
pub fn write_csv_file<P: AsRef<Path>>(path: P, table: &Table) -> CsvResult<()> {
    let content = to_csv_string(table)?;
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_csv_str("Service Tag,Owner\nABC123,Alice\nXYZ999,Bob\n").unwrap();

        assert_eq!(table.headers, vec!["Service Tag", "Owner"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("Service Tag").unwrap(), vec!["ABC123", "XYZ999"]);
        assert_eq!(table.column("Owner").unwrap(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_quoted_values() {
        let table = parse_csv_str("Service Tag,Location\nABC123,\"Paris, Floor 2\"\n").unwrap();
        assert_eq!(table.rows[0][1], "Paris, Floor 2");
    }

    #[test]
    fn test_short_rows_padded() {
        let table = parse_csv_str("a,b,c\n1,2\n").unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_long_rows_rejected() {
        let err = parse_csv_str("a,b\n1,2,3,4\n").unwrap_err();
        assert!(matches!(err, CsvError::Parse(_)));
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv_str(""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_csv_str("  \n"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_header_only() {
        let table = parse_csv_str("Service Tag\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column("Service Tag").unwrap(), Vec::<&str>::new());
    }

    #[test]
    fn test_missing_column_is_none() {
        let table = parse_csv_str("Serial,Owner\nABC123,Alice\n").unwrap();
        assert!(table.column("Service Tag").is_none());
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = b"\xEF\xBB\xBFService Tag\nABC123\n";
        let result = parse_bytes_auto(bytes).unwrap();
        assert_eq!(result.table.headers, vec!["Service Tag"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_utf8_accents_round_trip() {
        for content in [
            "Service Tag,Site\nABC123,Zürich\n",
            "Service Tag,Owner\nABC123,Søren\n",
            "Service Tag,Site\nABC123,Kraków\nXYZ999,Besançon\n",
        ] {
            let result = parse_bytes_auto(content.as_bytes()).unwrap();
            assert_eq!(result.encoding, "utf-8");
            assert_eq!(to_csv_string(&result.table).unwrap(), content);
        }
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_detection() {
        // "Société" in ISO-8859-1 is not valid UTF-8
        let bytes: &[u8] = b"Owner\nSoci\xE9t\xE9 G\xE9n\xE9rale du Qu\xE9bec\n";
        let result = parse_bytes_auto(bytes).unwrap();
        assert_eq!(result.table.headers, vec!["Owner"]);
        assert!(result.table.rows[0][0].starts_with("Soci"));
    }

    #[test]
    fn test_set_column_appends_and_overwrites() {
        let mut table = parse_csv_str("Service Tag,Model\nABC123,old\n").unwrap();

        table.set_column("Model", vec!["Latitude 5420".into()]);
        table.set_column("Warranty Start", vec!["2021-03-15".into()]);

        assert_eq!(table.headers, vec!["Service Tag", "Model", "Warranty Start"]);
        assert_eq!(table.rows[0], vec!["ABC123", "Latitude 5420", "2021-03-15"]);
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(vec!["Owner".into(), "Service Tag".into()]);
        table.rows.push(vec!["Alice, Jr.".into(), "ABC123".into()]);
        write_csv_file(&path, &table).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Owner,Service Tag\n\"Alice, Jr.\",ABC123\n");

        let reread = parse_csv_file_auto(&path).unwrap();
        assert_eq!(reread.table, table);
    }
}
