// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use d1_store_domain::{Staff, StaffRole, normalize_key};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{staff, stores};
use crate::error::PersistenceError;
use crate::queries::staff::get_staff;

/// Creates a store.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if a store with the same
/// normalized name exists.
pub fn create_store(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(stores::table)
        .values((
            stores::name.eq(name.trim()),
            stores::name_key.eq(normalize_key(name)),
        ))
        .execute(conn)?;

    let store_id: i64 = conn.get_last_insert_rowid()?;
    info!(store_id, name, "Created store");
    Ok(store_id)
}

/// Creates a staff member.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `display_name` - The display name as imported
/// * `role` - The staff role
/// * `store_id` - The store the member belongs to
/// * `uniform_limit` - Optional allowance; `None` is unlimited
///
/// # Errors
///
/// Returns an error if the insert fails, including a foreign key violation
/// for an unknown store.
pub fn create_staff(
    conn: &mut SqliteConnection,
    display_name: &str,
    role: StaffRole,
    store_id: i64,
    uniform_limit: Option<u32>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(staff::table)
        .values((
            staff::display_name.eq(display_name.trim()),
            staff::display_name_key.eq(normalize_key(display_name)),
            staff::role.eq(role.as_str()),
            staff::store_id.eq(store_id),
            staff::uniform_limit.eq(uniform_limit.map(i64::from)),
        ))
        .execute(conn)?;

    let staff_id: i64 = conn.get_last_insert_rowid()?;
    info!(staff_id, store_id, role = %role, "Created staff member");
    Ok(staff_id)
}

/// Sets or clears a staff member's uniform limit.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the staff member does not exist.
pub fn set_uniform_limit(
    conn: &mut SqliteConnection,
    staff_id: i64,
    uniform_limit: Option<u32>,
) -> Result<Staff, PersistenceError> {
    let updated: usize = diesel::update(staff::table.filter(staff::staff_id.eq(staff_id)))
        .set(staff::uniform_limit.eq(uniform_limit.map(i64::from)))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Staff member {staff_id} not found"
        )));
    }

    info!(staff_id, ?uniform_limit, "Updated uniform limit");
    get_staff(conn, staff_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Staff member {staff_id} not found")))
}
