//! CSV loading with encoding and delimiter auto-detection.
//!
//! Every record becomes one worksheet row, header lines included, so the
//! serializer's `start_index` decides what is skipped. Non-empty cells are
//! kept as text; empty cells become null.

use std::path::Path;

use super::Worksheet;
use crate::error::{CsvError, CsvResult};
use crate::models::Value;

/// Delimiters tried by [`detect_delimiter`], in order of preference.
const SEPARATORS: [char; 4] = [';', ',', '\t', '|'];

/// A loaded sheet with the settings that were used to read it.
#[derive(Debug, Clone)]
pub struct CsvSheet {
    pub worksheet: Worksheet,
    pub encoding: String,
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes using the given encoding label.
///
/// Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(decoder) => {
                let (text, _, had_errors) = decoder.decode(bytes);
                if had_errors {
                    Err(CsvError::EncodingError(format!(
                        "content is not valid {}",
                        decoder.name()
                    )))
                } else {
                    Ok(text.into_owned())
                }
            }
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// Pick the separator that occurs most often in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = SEPARATORS[0];
    let mut best_count = 0;
    for &sep in &SEPARATORS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }
    best_sep
}

/// Read decoded CSV text into a worksheet.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Worksheet> {
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut worksheet = Worksheet::new();
    for record in reader.records() {
        let record = record?;
        worksheet.append(record.iter().map(|cell| {
            if cell.is_empty() {
                Value::Null
            } else {
                Value::from(cell)
            }
        }));
    }
    Ok(worksheet)
}

/// Load CSV bytes, detecting the encoding and, unless given, the delimiter.
pub fn load_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<CsvSheet> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let worksheet = parse_str(&content, delimiter)?;

    Ok(CsvSheet {
        worksheet,
        encoding,
        delimiter,
    })
}

/// Load a CSV file from disk.
pub fn load_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<CsvSheet> {
    let bytes = std::fs::read(path.as_ref())?;
    load_bytes(&bytes, delimiter)
}
