// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Import summary and per-row outcome accounting.

use serde::Serialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::CoreError;

/// Message recorded when a candidate row fails to persist.
pub const SAVE_FAILED_MESSAGE: &str = "Database save failed for this row";

/// Which file type an import handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    Staff,
    Stock,
}

impl ImportType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Stock => "stock",
        }
    }
}

impl std::fmt::Display for ImportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row counts for one import.
///
/// `total == success + skipped + failed` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub import_type: ImportType,
    pub file_name: Option<String>,
    /// RFC 3339 timestamp of when the import finished.
    pub processed_at: String,
    pub total: u64,
    /// Rows that passed validation.
    pub valid: u64,
    pub success: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// A row that was not created, with every reason found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRow {
    pub row_number: u64,
    pub errors: Vec<String>,
    pub row: BTreeMap<String, String>,
}

/// The response body of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub import_type: ImportType,
    pub summary: ImportSummary,
    pub invalid_rows: Vec<InvalidRow>,
    /// Human-readable error lines, grouped by message.
    pub errors: Vec<String>,
    /// Informational messages about rows that were created with changes.
    pub notices: Vec<String>,
}

/// Running tally of row outcomes during an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTally {
    import_type: ImportType,
    total: u64,
    valid: u64,
    success: u64,
    skipped: u64,
    failed: u64,
    invalid_rows: Vec<InvalidRow>,
    notices: Vec<String>,
}

impl ImportTally {
    #[must_use]
    pub const fn new(import_type: ImportType) -> Self {
        Self {
            import_type,
            total: 0,
            valid: 0,
            success: 0,
            skipped: 0,
            failed: 0,
            invalid_rows: Vec::new(),
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn import_type(&self) -> ImportType {
        self.import_type
    }

    /// Records a row that failed validation.
    pub fn record_invalid(
        &mut self,
        row_number: u64,
        errors: Vec<String>,
        row: BTreeMap<String, String>,
    ) {
        self.total += 1;
        self.failed += 1;
        self.invalid_rows.push(InvalidRow {
            row_number,
            errors,
            row,
        });
    }

    /// Records a row that passed validation and is waiting for the persist phase.
    pub const fn record_valid(&mut self) {
        self.total += 1;
        self.valid += 1;
    }

    /// Records a candidate that was written.
    pub const fn record_success(&mut self) {
        self.success += 1;
    }

    /// Records a candidate skipped as a duplicate.
    pub fn record_skipped(&mut self, row_number: u64, reason: &str, row: BTreeMap<String, String>) {
        self.skipped += 1;
        self.invalid_rows.push(InvalidRow {
            row_number,
            errors: vec![reason.to_string()],
            row,
        });
    }

    /// Records a candidate whose write failed.
    pub fn record_save_failure(&mut self, row_number: u64, row: BTreeMap<String, String>) {
        self.failed += 1;
        self.invalid_rows.push(InvalidRow {
            row_number,
            errors: vec![SAVE_FAILED_MESSAGE.to_string()],
            row,
        });
    }

    pub fn add_notice(&mut self, notice: String) {
        self.notices.push(notice);
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn valid(&self) -> u64 {
        self.valid
    }

    #[must_use]
    pub const fn success(&self) -> u64 {
        self.success
    }

    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    #[must_use]
    pub const fn failed(&self) -> u64 {
        self.failed
    }

    #[must_use]
    pub fn invalid_rows(&self) -> &[InvalidRow] {
        &self.invalid_rows
    }

    /// Closes the tally into a report.
    ///
    /// Invalid rows are ordered by row number so validation failures and
    /// persist-phase skips interleave the way they appear in the file.
    ///
    /// # Arguments
    ///
    /// * `file_name` - The uploaded file name, if known
    /// * `processed_at` - When the import finished
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Internal` if the timestamp cannot be formatted.
    pub fn finish(
        mut self,
        file_name: Option<&str>,
        processed_at: OffsetDateTime,
    ) -> Result<ImportReport, CoreError> {
        let processed_at: String = processed_at
            .format(&Rfc3339)
            .map_err(|e| CoreError::Internal(format!("Failed to format timestamp: {e}")))?;

        self.invalid_rows.sort_by_key(|row| row.row_number);
        let errors: Vec<String> = group_errors(&self.invalid_rows);

        Ok(ImportReport {
            import_type: self.import_type,
            summary: ImportSummary {
                import_type: self.import_type,
                file_name: file_name.map(ToString::to_string),
                processed_at,
                total: self.total,
                valid: self.valid,
                success: self.success,
                skipped: self.skipped,
                failed: self.failed,
            },
            invalid_rows: self.invalid_rows,
            errors,
            notices: self.notices,
        })
    }
}

/// Collapses per-row errors into display lines.
///
/// A message seen on one row renders as `Row 4: Missing EAN`. A message seen
/// on several rows renders once as
/// `Missing EAN (rows 4, 6, 9; 3 occurrences)`. Lines keep the order in
/// which each message was first seen.
#[must_use]
pub fn group_errors(invalid_rows: &[InvalidRow]) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut rows_by_message: BTreeMap<&str, Vec<u64>> = BTreeMap::new();

    for invalid in invalid_rows {
        for message in &invalid.errors {
            let rows: &mut Vec<u64> = rows_by_message.entry(message.as_str()).or_default();
            if rows.is_empty() {
                order.push(message.as_str());
            }
            rows.push(invalid.row_number);
        }
    }

    order
        .into_iter()
        .filter_map(|message| {
            let rows: &Vec<u64> = rows_by_message.get(message)?;
            match rows.as_slice() {
                [single] => Some(format!("Row {single}: {message}")),
                many => {
                    let listed: Vec<String> = many.iter().map(ToString::to_string).collect();
                    Some(format!(
                        "{message} (rows {}; {} occurrences)",
                        listed.join(", "),
                        many.len()
                    ))
                }
            }
        })
        .collect()
}
