// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stock import: row validation, duplicate detection and EAN renumbering.

use d1_store_domain::{Ean, StockDuplicateKey, StockItem, normalize_key, validate_item_name};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::csv_input::ParsedCsv;
use crate::fields::{FieldResolver, STOCK_FIELDS};
use crate::report::{ImportTally, ImportType};

/// A stock row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCandidate {
    pub row_number: u64,
    pub ean: Ean,
    pub name: String,
    pub qty: i64,
    pub row: BTreeMap<String, String>,
}

impl StockCandidate {
    /// Notice emitted when this row is created under a different EAN.
    #[must_use]
    pub fn renumber_notice(&self, assigned: &Ean) -> String {
        format!(
            "Row {}: EAN {} already in use; item '{}' created with EAN {assigned}",
            self.row_number, self.ean, self.name
        )
    }
}

/// Output of the stock validate phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockBatch {
    pub tally: ImportTally,
    pub candidates: Vec<StockCandidate>,
}

/// Validates every data row of a stock upload.
#[must_use]
pub fn validate_stock_rows(parsed: &ParsedCsv) -> StockBatch {
    let resolver: FieldResolver = FieldResolver::resolve(STOCK_FIELDS, parsed);
    let mut tally: ImportTally = ImportTally::new(ImportType::Stock);
    let mut candidates: Vec<StockCandidate> = Vec::new();

    for csv_row in &parsed.rows {
        let raw_ean: &str = resolver.get(csv_row, "ean");
        let name: &str = resolver.get(csv_row, "name");
        let raw_qty: &str = resolver.get(csv_row, "qty");
        let row: BTreeMap<String, String> = parsed.row_map(csv_row);
        let mut errors: Vec<String> = Vec::new();

        let ean: Option<Ean> = if raw_ean.is_empty() {
            errors.push(String::from("Missing EAN"));
            None
        } else if let Ok(ean) = Ean::new(raw_ean) {
            Some(ean)
        } else {
            errors.push(String::from("EAN must contain digits only"));
            None
        };

        if validate_item_name(name).is_err() {
            errors.push(String::from("Missing Name"));
        }

        let qty: Option<i64> = if raw_qty.is_empty() {
            errors.push(String::from("Missing Qty"));
            None
        } else {
            match raw_qty.parse::<i64>() {
                Ok(value) if value >= 0 => Some(value),
                _ => {
                    errors.push(String::from("Qty must be a non-negative integer"));
                    None
                }
            }
        };

        match (ean, qty) {
            (Some(ean), Some(qty)) if errors.is_empty() => {
                tally.record_valid();
                candidates.push(StockCandidate {
                    row_number: csv_row.row_number,
                    ean,
                    name: name.to_string(),
                    qty,
                    row,
                });
            }
            _ => tally.record_invalid(csv_row.row_number, errors, row),
        }
    }

    StockBatch { tally, candidates }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOrigin {
    Existing,
    Batch,
}

impl KeyOrigin {
    const fn label(self) -> &'static str {
        match self {
            Self::Existing => "database",
            Self::Batch => "file",
        }
    }
}

/// What the persist phase should do with a stock candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockDecision {
    /// Create the item under `ean`. `renumbered_from` holds the file's EAN
    /// when it was already taken.
    Create {
        ean: Ean,
        renumbered_from: Option<Ean>,
    },
    Skip {
        reason: String,
    },
}

/// Keys newly taken by one candidate.
///
/// Only keys that were free before the reservation are recorded, so a
/// release never frees a key owned by an existing item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockReservation {
    name: Option<String>,
    pair: Option<(String, String)>,
    ean: Option<String>,
}

/// Batch-scoped view of existing stock names and EANs.
#[derive(Debug, Clone)]
pub struct StockReconciliation {
    duplicate_key: StockDuplicateKey,
    names: HashMap<String, KeyOrigin>,
    pairs: HashMap<(String, String), KeyOrigin>,
    eans: HashSet<String>,
}

impl StockReconciliation {
    /// Loads the accumulator from the existing stock items.
    #[must_use]
    pub fn new(duplicate_key: StockDuplicateKey, items: &[StockItem]) -> Self {
        let mut names: HashMap<String, KeyOrigin> = HashMap::new();
        let mut pairs: HashMap<(String, String), KeyOrigin> = HashMap::new();
        let mut eans: HashSet<String> = HashSet::new();

        for item in items {
            let name_key: String = normalize_key(&item.name);
            pairs.insert((item.ean.clone(), name_key.clone()), KeyOrigin::Existing);
            names.insert(name_key, KeyOrigin::Existing);
            eans.insert(item.ean.clone());
        }

        Self {
            duplicate_key,
            names,
            pairs,
            eans,
        }
    }

    /// Returns whether an EAN is held by an existing or reserved item.
    #[must_use]
    pub fn ean_taken(&self, ean: &Ean) -> bool {
        self.eans.contains(ean.value())
    }

    fn duplicate_origin(&self, candidate: &StockCandidate) -> Option<KeyOrigin> {
        let name_key: String = normalize_key(&candidate.name);
        match self.duplicate_key {
            StockDuplicateKey::Name => self.names.get(&name_key).copied(),
            StockDuplicateKey::EanAndName => self
                .pairs
                .get(&(candidate.ean.value().to_string(), name_key))
                .copied(),
        }
    }

    /// Decides whether a candidate is skipped, created as-is, or created
    /// under the next free EAN.
    #[must_use]
    pub fn decide(&self, candidate: &StockCandidate) -> StockDecision {
        if let Some(origin) = self.duplicate_origin(candidate) {
            return StockDecision::Skip {
                reason: format!("Duplicate stock name ({})", origin.label()),
            };
        }

        if !self.ean_taken(&candidate.ean) {
            return StockDecision::Create {
                ean: candidate.ean.clone(),
                renumbered_from: None,
            };
        }

        let mut next: Ean = candidate.ean.successor();
        while self.ean_taken(&next) {
            next = next.successor();
        }
        StockDecision::Create {
            ean: next,
            renumbered_from: Some(candidate.ean.clone()),
        }
    }

    /// Reserves the name and the assigned EAN of a candidate.
    pub fn reserve(&mut self, candidate: &StockCandidate, assigned: &Ean) -> StockReservation {
        let name_key: String = normalize_key(&candidate.name);
        let pair: (String, String) = (assigned.value().to_string(), name_key.clone());
        let mut reservation: StockReservation = StockReservation::default();

        if !self.names.contains_key(&name_key) {
            self.names.insert(name_key.clone(), KeyOrigin::Batch);
            reservation.name = Some(name_key);
        }
        if !self.pairs.contains_key(&pair) {
            self.pairs.insert(pair.clone(), KeyOrigin::Batch);
            reservation.pair = Some(pair);
        }
        if self.eans.insert(assigned.value().to_string()) {
            reservation.ean = Some(assigned.value().to_string());
        }

        reservation
    }

    /// Releases the keys of a candidate whose write failed.
    pub fn release(&mut self, reservation: StockReservation) {
        if let Some(name) = reservation.name {
            self.names.remove(&name);
        }
        if let Some(pair) = reservation.pair {
            self.pairs.remove(&pair);
        }
        if let Some(ean) = reservation.ean {
            self.eans.remove(&ean);
        }
    }
}
