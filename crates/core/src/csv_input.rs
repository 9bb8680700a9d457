// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Upload guard and CSV tokenizer wrapper.
//!
//! Spreadsheet exports arrive with a UTF-8 byte-order mark, padded cells,
//! ragged rows and either `,` or `;` as the separator depending on locale.
//! The delimiter is sniffed from the header line and the other one is tried
//! once if the first attempt has a quoting error or matches no known column.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::CoreError;
use crate::fields::{FieldResolver, FieldSpec};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// A tokenized upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCsv {
    /// Header cells, trimmed, in file order.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<CsvRow>,
}

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// Line number in the uploaded file, so the header is line 1 and the
    /// first data row is normally line 2.
    pub row_number: u64,
    /// Cell values aligned with [`ParsedCsv::headers`]. Ragged rows may be
    /// shorter or longer than the header.
    pub values: Vec<String>,
}

impl ParsedCsv {
    /// Returns the original header-to-value mapping of a row for display.
    #[must_use]
    pub fn row_map(&self, row: &CsvRow) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .zip(row.values.iter())
            .map(|(header, value)| (header.clone(), value.clone()))
            .collect()
    }
}

/// Checks that an upload is present and named like a CSV file.
///
/// # Arguments
///
/// * `file_name` - The uploaded file name, if any
///
/// # Errors
///
/// Returns `CoreError::InvalidUpload` if no file name was given or the
/// name does not end in `.csv` (any case).
pub fn check_upload(file_name: Option<&str>) -> Result<&str, CoreError> {
    let name: &str = file_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CoreError::InvalidUpload(String::from("No file uploaded")))?;

    if !name.to_lowercase().ends_with(".csv") {
        return Err(CoreError::InvalidUpload(String::from(
            "Please upload a CSV file",
        )));
    }
    Ok(name)
}

fn sniff_delimiter(first_line: &str) -> u8 {
    if first_line.contains(';') && !first_line.contains(',') {
        b';'
    } else {
        b','
    }
}

/// Returns whether `content` breaks the quoting rules for `delimiter`.
///
/// A quote may only open a field, must be closed, and a closing quote must
/// be followed by the delimiter or a line break. Inside a quoted field `""`
/// is an escaped quote. The csv reader keeps stray quotes as cell text.
fn has_stray_quote(content: &str, delimiter: u8) -> bool {
    let bytes: &[u8] = content.as_bytes();
    let mut at_field_start: bool = true;
    let mut in_quotes: bool = false;
    let mut i: usize = 0;

    while i < bytes.len() {
        let byte: u8 = bytes[i];
        if in_quotes {
            if byte == b'"' {
                match bytes.get(i + 1) {
                    Some(b'"') => i += 1,
                    Some(&next) if next != delimiter && next != b'\n' && next != b'\r' => {
                        return true;
                    }
                    _ => in_quotes = false,
                }
            }
        } else if byte == delimiter || byte == b'\n' || byte == b'\r' {
            at_field_start = true;
            i += 1;
            continue;
        } else if byte == b'"' {
            if !at_field_start {
                return true;
            }
            in_quotes = true;
        }
        at_field_start = false;
        i += 1;
    }

    in_quotes
}

fn parse_with_delimiter(content: &str, delimiter: u8) -> Result<ParsedCsv, String> {
    if has_stray_quote(content, delimiter) {
        return Err(String::from("misplaced or unterminated quote"));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut rows: Vec<CsvRow> = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record: StringRecord = result.map_err(|e| e.to_string())?;

        // A whitespace-only line tokenizes to a single empty cell.
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }

        let fallback_line: u64 = u64::try_from(index).map_or(u64::MAX, |i| i.saturating_add(2));
        let row_number: u64 = record.position().map_or(fallback_line, csv::Position::line);

        rows.push(CsvRow {
            row_number,
            values: record.iter().map(ToString::to_string).collect(),
        });
    }

    Ok(ParsedCsv { headers, rows })
}

/// Parses with `delimiter` and checks that at least one of `fields` is
/// among the headers. An empty `fields` slice skips the header check.
fn attempt(content: &str, delimiter: u8, fields: &[FieldSpec]) -> Result<ParsedCsv, String> {
    let parsed: ParsedCsv = parse_with_delimiter(content, delimiter)?;
    if fields.is_empty() || parsed.headers.is_empty() {
        return Ok(parsed);
    }

    let resolver: FieldResolver = FieldResolver::resolve(fields, &parsed);
    if fields.iter().any(|spec| resolver.has(spec.canonical)) {
        Ok(parsed)
    } else {
        Err(format!("no recognised column in header {:?}", parsed.headers))
    }
}

/// Tokenizes uploaded CSV text for an import reading `fields`.
///
/// The sniffed delimiter is tried first. The attempt fails on a quoting
/// error, or when no header matches any of `fields`. The other delimiter is
/// then tried once if it appears in the header line.
///
/// # Arguments
///
/// * `content` - The raw file content
/// * `fields` - The canonical fields of the import type
///
/// # Errors
///
/// Returns `CoreError::UnparsableCsv` if the content has a quoting error
/// with every available delimiter, or if the fallback delimiter was tried
/// and also failed. A file whose header merely lacks every known column,
/// with no fallback to try, is returned as parsed so the validate phase can
/// report the missing fields per row.
pub fn parse_csv(content: &str, fields: &[FieldSpec]) -> Result<ParsedCsv, CoreError> {
    let content: &str = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
    let first_line: &str = content.lines().next().unwrap_or_default();
    let likely: u8 = sniff_delimiter(first_line);

    let err: String = match attempt(content, likely, fields) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };

    let fallback: u8 = if likely == b',' { b';' } else { b',' };
    if !first_line.contains(char::from(fallback)) {
        // Unknown headers alone are not a tokenizing failure.
        return parse_with_delimiter(content, likely).map_err(CoreError::UnparsableCsv);
    }

    debug!(
        error = %err,
        fallback = %char::from(fallback),
        "Retrying CSV parse with fallback delimiter"
    );
    attempt(content, fallback, fields).map_err(CoreError::UnparsableCsv)
}
