// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV import reconciliation for the D1 Store.
//!
//! Imports run in two phases. The validate phase in this crate is pure: it
//! tokenizes the upload, resolves header aliases, and splits rows into
//! candidates and invalid rows. The persist phase walks the candidates in
//! file order against a per-batch reconciliation accumulator
//! (`StaffReconciliation` / `StockReconciliation`) that decides create,
//! skip or renumber before anything is written.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod csv_input;
mod error;
mod fields;
mod report;
mod staff_import;
mod stock_import;

#[cfg(test)]
mod tests;

pub use csv_input::{CsvRow, ParsedCsv, check_upload, parse_csv};
pub use error::CoreError;
pub use fields::{FieldResolver, FieldSpec, STAFF_FIELDS, STOCK_FIELDS};
pub use report::{ImportReport, ImportSummary, ImportTally, ImportType, InvalidRow, group_errors};
pub use staff_import::{
    StaffBatch, StaffCandidate, StaffDecision, StaffReconciliation, StaffReservation,
    validate_staff_rows,
};
pub use stock_import::{
    StockBatch, StockCandidate, StockDecision, StockReconciliation, StockReservation,
    validate_stock_rows,
};
