// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persist phase of the staff and stock CSV imports.
//!
//! Candidates are applied one at a time in file order. A failed write moves
//! its row to the invalid list, releases the keys it reserved, and the
//! batch carries on. Preview runs the same decisions without writing.

use d1_store::{
    FieldSpec, ImportReport, ImportTally, ParsedCsv, STAFF_FIELDS, STOCK_FIELDS, StaffBatch,
    StaffCandidate, StaffDecision, StaffReconciliation, StaffReservation, StockBatch,
    StockCandidate, StockDecision, StockReconciliation, StockReservation, check_upload, parse_csv,
    validate_staff_rows, validate_stock_rows,
};
use d1_store_domain::{STAFF_NAME_SCOPE, STOCK_DUPLICATE_KEY, Staff, StockItem, Store};
use d1_store_persistence::{Persistence, PersistenceError};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::ImportCsvRequest;

/// Whether an import writes its decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Commit,
    /// Decide every row against current state but write nothing.
    /// Rows that would be created are counted as successes.
    Preview,
}

fn read_upload<'a>(
    request: &'a ImportCsvRequest,
    fields: &[FieldSpec],
) -> Result<(&'a str, ParsedCsv), ApiError> {
    let file_name: &str = check_upload(request.file_name.as_deref()).map_err(translate_core_error)?;
    let parsed: ParsedCsv =
        parse_csv(&request.csv_content, fields).map_err(translate_core_error)?;
    Ok((file_name, parsed))
}

fn finish(
    tally: ImportTally,
    file_name: &str,
    now: OffsetDateTime,
    mode: ImportMode,
) -> Result<ImportReport, ApiError> {
    info!(
        import_type = %tally.import_type(),
        file_name,
        ?mode,
        total = tally.total(),
        success = tally.success(),
        skipped = tally.skipped(),
        failed = tally.failed(),
        "Import finished"
    );
    tally
        .finish(Some(file_name), now)
        .map_err(translate_core_error)
}

/// Imports (or previews) a staff roster.
///
/// Stores are resolved by normalized name and created only when a staff
/// row that needs them is about to be written.
///
/// # Errors
///
/// Returns `ApiError::InvalidUpload` if the file is missing, not a CSV, or
/// cannot be tokenized, or an error if existing state cannot be loaded.
/// Per-row failures are reported inside the returned report.
pub fn import_staff(
    persistence: &mut Persistence,
    request: &ImportCsvRequest,
    mode: ImportMode,
    now: OffsetDateTime,
) -> Result<ImportReport, ApiError> {
    let (file_name, parsed): (&str, ParsedCsv) = read_upload(request, STAFF_FIELDS)?;
    let StaffBatch {
        mut tally,
        candidates,
    } = validate_staff_rows(&parsed);

    let stores: Vec<Store> = persistence
        .list_stores()
        .map_err(translate_persistence_error)?;
    let staff: Vec<Staff> = persistence.list_staff().map_err(translate_persistence_error)?;
    let mut reconciliation: StaffReconciliation =
        StaffReconciliation::new(STAFF_NAME_SCOPE, &stores, &staff);

    for candidate in candidates {
        match reconciliation.decide(&candidate) {
            StaffDecision::Skip { reason } => {
                debug!(row = candidate.row_number, %reason, "Skipping staff row");
                tally.record_skipped(candidate.row_number, &reason, candidate.row);
            }
            StaffDecision::Create => {
                let reservation: StaffReservation = reconciliation.reserve(&candidate);
                if mode == ImportMode::Preview {
                    tally.record_success();
                    continue;
                }
                match save_staff(persistence, &mut reconciliation, &candidate) {
                    Ok(staff_id) => {
                        debug!(row = candidate.row_number, staff_id, "Created staff member");
                        tally.record_success();
                    }
                    Err(e) => {
                        warn!(row = candidate.row_number, error = %e, "Failed to save staff row");
                        reconciliation.release(reservation);
                        tally.record_save_failure(candidate.row_number, candidate.row);
                    }
                }
            }
        }
    }

    finish(tally, file_name, now, mode)
}

fn save_staff(
    persistence: &mut Persistence,
    reconciliation: &mut StaffReconciliation,
    candidate: &StaffCandidate,
) -> Result<i64, PersistenceError> {
    let store_id: i64 = if let Some(store_id) = reconciliation.store_id(&candidate.store_name) {
        store_id
    } else {
        let store_id: i64 = persistence.create_store(&candidate.store_name)?;
        info!(store = %candidate.store_name, store_id, "Created store");
        reconciliation.register_store(&candidate.store_name, store_id);
        store_id
    };

    persistence.create_staff(
        &candidate.display_name,
        candidate.role,
        store_id,
        candidate.uniform_limit,
    )
}

/// Imports (or previews) a stock list.
///
/// A name already present is skipped. An EAN already held by another item
/// is replaced with the next free EAN and a notice is added to the report.
///
/// # Errors
///
/// Returns `ApiError::InvalidUpload` if the file is missing, not a CSV, or
/// cannot be tokenized, or an error if existing stock cannot be loaded.
pub fn import_stock(
    persistence: &mut Persistence,
    request: &ImportCsvRequest,
    mode: ImportMode,
    now: OffsetDateTime,
) -> Result<ImportReport, ApiError> {
    let (file_name, parsed): (&str, ParsedCsv) = read_upload(request, STOCK_FIELDS)?;
    let StockBatch {
        mut tally,
        candidates,
    } = validate_stock_rows(&parsed);

    let items: Vec<StockItem> = persistence.list_stock().map_err(translate_persistence_error)?;
    let mut reconciliation: StockReconciliation =
        StockReconciliation::new(STOCK_DUPLICATE_KEY, &items);

    for candidate in candidates {
        match reconciliation.decide(&candidate) {
            StockDecision::Skip { reason } => {
                debug!(row = candidate.row_number, %reason, "Skipping stock row");
                tally.record_skipped(candidate.row_number, &reason, candidate.row);
            }
            StockDecision::Create {
                ean,
                renumbered_from,
            } => {
                let reservation: StockReservation = reconciliation.reserve(&candidate, &ean);
                let saved: Result<(), PersistenceError> = match mode {
                    ImportMode::Preview => Ok(()),
                    ImportMode::Commit => save_stock(persistence, &candidate, ean.value()),
                };
                match saved {
                    Ok(()) => {
                        if renumbered_from.is_some() {
                            tally.add_notice(candidate.renumber_notice(&ean));
                        }
                        tally.record_success();
                    }
                    Err(e) => {
                        warn!(row = candidate.row_number, error = %e, "Failed to save stock row");
                        reconciliation.release(reservation);
                        tally.record_save_failure(candidate.row_number, candidate.row);
                    }
                }
            }
        }
    }

    finish(tally, file_name, now, mode)
}

fn save_stock(
    persistence: &mut Persistence,
    candidate: &StockCandidate,
    ean: &str,
) -> Result<(), PersistenceError> {
    let item_id: i64 = persistence.create_stock_item(ean, &candidate.name, candidate.qty)?;
    debug!(row = candidate.row_number, item_id, ean, "Created stock item");
    Ok(())
}
