// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store and staff queries.

use d1_store_domain::{Staff, StaffRole, Store};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::str::FromStr;
use tracing::debug;

use crate::diesel_schema::{staff, stores};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = stores)]
struct StoreRow {
    store_id: i64,
    name: String,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.store_id,
            name: row.name,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = staff)]
struct StaffRow {
    staff_id: i64,
    display_name: String,
    role: String,
    store_id: i64,
    uniform_limit: Option<i64>,
}

impl TryFrom<StaffRow> for Staff {
    type Error = PersistenceError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        let role: StaffRole = StaffRole::from_str(&row.role)
            .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?;
        let uniform_limit: Option<u32> = row
            .uniform_limit
            .map(|limit| {
                u32::try_from(limit).map_err(|_| {
                    PersistenceError::CorruptRow(format!(
                        "Staff {} has out-of-range uniform limit {limit}",
                        row.staff_id
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            id: row.staff_id,
            display_name: row.display_name,
            role,
            store_id: row.store_id,
            uniform_limit,
        })
    }
}

/// Lists all stores by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_stores(conn: &mut SqliteConnection) -> Result<Vec<Store>, PersistenceError> {
    let rows: Vec<StoreRow> = stores::table
        .order(stores::store_id.asc())
        .select(StoreRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(Store::from).collect())
}

/// Lists all staff members by display name.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_staff(conn: &mut SqliteConnection) -> Result<Vec<Staff>, PersistenceError> {
    let rows: Vec<StaffRow> = staff::table
        .order((staff::display_name_key.asc(), staff::staff_id.asc()))
        .select(StaffRow::as_select())
        .load(conn)?;
    debug!(count = rows.len(), "Loaded staff");
    rows.into_iter().map(Staff::try_from).collect()
}

/// Retrieves a staff member by id.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if there is no
/// such staff member.
pub fn get_staff(
    conn: &mut SqliteConnection,
    staff_id: i64,
) -> Result<Option<Staff>, PersistenceError> {
    staff::table
        .filter(staff::staff_id.eq(staff_id))
        .select(StaffRow::as_select())
        .first(conn)
        .optional()?
        .map(Staff::try_from)
        .transpose()
}

/// Counts staff members.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_staff(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(staff::table.count().get_result(conn)?)
}
