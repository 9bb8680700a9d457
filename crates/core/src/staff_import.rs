// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff roster import: row validation and duplicate reconciliation.

use d1_store_domain::{
    Staff, StaffNameScope, StaffRole, Store, normalize_key, validate_display_name,
    validate_uniform_limit,
};
use std::collections::{BTreeMap, HashMap};

use crate::csv_input::ParsedCsv;
use crate::fields::{FieldResolver, STAFF_FIELDS};
use crate::report::{ImportTally, ImportType};

/// A staff row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffCandidate {
    pub row_number: u64,
    pub display_name: String,
    pub store_name: String,
    pub role: StaffRole,
    pub uniform_limit: Option<u32>,
    /// Original header-to-value mapping, kept for redisplay.
    pub row: BTreeMap<String, String>,
}

/// Output of the staff validate phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffBatch {
    pub tally: ImportTally,
    pub candidates: Vec<StaffCandidate>,
}

fn staff_row_errors(
    display_name: &str,
    store_name: &str,
    role: &str,
    uniform_limit: &str,
) -> (Vec<String>, Option<StaffRole>, Option<u32>) {
    let mut errors: Vec<String> = Vec::new();

    if validate_display_name(display_name).is_err() {
        errors.push(String::from("Missing Display Name"));
    }
    if store_name.is_empty() {
        errors.push(String::from("Missing store"));
    }

    let parsed_role: Option<StaffRole> = if role.is_empty() {
        errors.push(String::from("Missing role"));
        None
    } else if let Ok(parsed) = StaffRole::parse_import(role) {
        Some(parsed)
    } else {
        errors.push(String::from("Role must be staff, manager, or casual"));
        None
    };

    let parsed_limit: Option<u32> = if uniform_limit.is_empty() {
        None
    } else if let Some(limit) = uniform_limit
        .parse::<i64>()
        .ok()
        .and_then(|value| validate_uniform_limit(value).ok())
    {
        Some(limit)
    } else {
        errors.push(String::from("Uniform limit must be a positive integer"));
        None
    };

    (errors, parsed_role, parsed_limit)
}

/// Validates every data row of a staff upload.
///
/// Rows with errors are recorded as failed in the returned tally; the
/// rest become candidates in file order.
#[must_use]
pub fn validate_staff_rows(parsed: &ParsedCsv) -> StaffBatch {
    let resolver: FieldResolver = FieldResolver::resolve(STAFF_FIELDS, parsed);
    let mut tally: ImportTally = ImportTally::new(ImportType::Staff);
    let mut candidates: Vec<StaffCandidate> = Vec::new();

    for csv_row in &parsed.rows {
        let display_name: &str = resolver.get(csv_row, "display_name");
        let store_name: &str = resolver.get(csv_row, "store");
        let role: &str = resolver.get(csv_row, "role");
        let uniform_limit: &str = resolver.get(csv_row, "uniform_limit");
        let row: BTreeMap<String, String> = parsed.row_map(csv_row);

        match staff_row_errors(display_name, store_name, role, uniform_limit) {
            (errors, Some(role), parsed_limit) if errors.is_empty() => {
                tally.record_valid();
                candidates.push(StaffCandidate {
                    row_number: csv_row.row_number,
                    display_name: display_name.to_string(),
                    store_name: store_name.to_string(),
                    role,
                    uniform_limit: parsed_limit,
                    row,
                });
            }
            (errors, _, _) => tally.record_invalid(csv_row.row_number, errors, row),
        }
    }

    StaffBatch { tally, candidates }
}

/// Where a reserved key came from.
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

/// Normalized identity of a staff member under a name scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StaffKey {
    store: Option<String>,
    name: String,
}

/// What the persist phase should do with a staff candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffDecision {
    Create,
    Skip { reason: String },
}

/// Key held for a candidate between reservation and write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffReservation {
    key: StaffKey,
}

/// Batch-scoped view of existing stores and staff names.
///
/// Built once per import from the current tables, then updated as rows are
/// created so later rows in the same file see earlier ones.
#[derive(Debug, Clone)]
pub struct StaffReconciliation {
    scope: StaffNameScope,
    stores: HashMap<String, i64>,
    names: HashMap<StaffKey, KeyOrigin>,
}

impl StaffReconciliation {
    /// Loads the accumulator from existing rows.
    ///
    /// # Arguments
    ///
    /// * `scope` - Scope within which display names must be unique
    /// * `stores` - All existing stores
    /// * `staff` - All existing staff members
    #[must_use]
    pub fn new(scope: StaffNameScope, stores: &[Store], staff: &[Staff]) -> Self {
        let store_keys: HashMap<i64, String> = stores
            .iter()
            .map(|store| (store.id, normalize_key(&store.name)))
            .collect();

        let mut reconciliation: Self = Self {
            scope,
            stores: stores
                .iter()
                .map(|store| (normalize_key(&store.name), store.id))
                .collect(),
            names: HashMap::new(),
        };

        for member in staff {
            let store_key: &str = store_keys
                .get(&member.store_id)
                .map_or("", String::as_str);
            let key: StaffKey = reconciliation.key_for(&member.display_name, store_key);
            reconciliation.names.insert(key, KeyOrigin::Existing);
        }

        reconciliation
    }

    fn key_for(&self, display_name: &str, store_key: &str) -> StaffKey {
        StaffKey {
            store: match self.scope {
                StaffNameScope::Global => None,
                StaffNameScope::PerStore => Some(store_key.to_string()),
            },
            name: normalize_key(display_name),
        }
    }

    fn candidate_key(&self, candidate: &StaffCandidate) -> StaffKey {
        self.key_for(&candidate.display_name, &normalize_key(&candidate.store_name))
    }

    /// Returns the id of a known store matching `store_name` after normalization.
    #[must_use]
    pub fn store_id(&self, store_name: &str) -> Option<i64> {
        self.stores.get(&normalize_key(store_name)).copied()
    }

    /// Records a store created during this batch.
    pub fn register_store(&mut self, store_name: &str, store_id: i64) {
        self.stores.insert(normalize_key(store_name), store_id);
    }

    /// Decides whether a candidate is created or skipped as a duplicate.
    #[must_use]
    pub fn decide(&self, candidate: &StaffCandidate) -> StaffDecision {
        match self.names.get(&self.candidate_key(candidate)) {
            Some(origin) => StaffDecision::Skip {
                reason: format!("Duplicate staff name ({})", origin.label()),
            },
            None => StaffDecision::Create,
        }
    }

    /// Reserves a candidate's key so later rows see it as taken.
    pub fn reserve(&mut self, candidate: &StaffCandidate) -> StaffReservation {
        let key: StaffKey = self.candidate_key(candidate);
        self.names.insert(key.clone(), KeyOrigin::Batch);
        StaffReservation { key }
    }

    /// Releases a reservation whose write failed.
    pub fn release(&mut self, reservation: StaffReservation) {
        if self.names.get(&reservation.key) == Some(&KeyOrigin::Batch) {
            self.names.remove(&reservation.key);
        }
    }
}
