// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Uniform request queries and the history aggregates used by the
//! allowance and cooldown checks.

use d1_store_domain::{Eligibility, RequestStatus, UniformRequest};
use diesel::prelude::*;
use diesel::SqliteConnection;
use diesel::dsl::{count_star, sql};
use diesel::sql_types::BigInt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::diesel_schema::uniform_requests;
use crate::error::PersistenceError;
use crate::queries::staff::get_staff;
use crate::timestamp::parse_timestamp;

#[derive(Queryable, Selectable)]
#[diesel(table_name = uniform_requests)]
struct RequestRow {
    request_id: i64,
    tracking_id: String,
    staff_id: i64,
    item_id: i64,
    ean: String,
    item_name: String,
    quantity: i64,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RequestRow> for UniformRequest {
    type Error = PersistenceError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let status: RequestStatus = RequestStatus::from_str(&row.status)
            .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?;

        Ok(Self {
            id: row.request_id,
            tracking_id: row.tracking_id,
            staff_id: row.staff_id,
            stock_item_id: row.item_id,
            ean: row.ean,
            item_name: row.item_name,
            quantity: row.quantity,
            status,
            notes: row.notes,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Retrieves a request by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Option<UniformRequest>, PersistenceError> {
    uniform_requests::table
        .filter(uniform_requests::request_id.eq(request_id))
        .select(RequestRow::as_select())
        .first(conn)
        .optional()?
        .map(UniformRequest::try_from)
        .transpose()
}

/// Lists every request, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_requests(conn: &mut SqliteConnection) -> Result<Vec<UniformRequest>, PersistenceError> {
    let rows: Vec<RequestRow> = uniform_requests::table
        .order((
            uniform_requests::created_at.desc(),
            uniform_requests::request_id.desc(),
        ))
        .select(RequestRow::as_select())
        .load(conn)?;
    rows.into_iter().map(UniformRequest::try_from).collect()
}

/// Lists one staff member's requests, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_requests_for_staff(
    conn: &mut SqliteConnection,
    staff_id: i64,
) -> Result<Vec<UniformRequest>, PersistenceError> {
    let rows: Vec<RequestRow> = uniform_requests::table
        .filter(uniform_requests::staff_id.eq(staff_id))
        .order((
            uniform_requests::created_at.desc(),
            uniform_requests::request_id.desc(),
        ))
        .select(RequestRow::as_select())
        .load(conn)?;
    rows.into_iter().map(UniformRequest::try_from).collect()
}

/// Returns `(total_ordered, total_requests)` over a staff member's
/// non-cancelled requests.
///
/// # Errors
///
/// Returns an error if the query fails, including when the sum overflows.
pub fn ordered_totals(
    conn: &mut SqliteConnection,
    staff_id: i64,
) -> Result<(i64, i64), PersistenceError> {
    // SQLite's SUM raises an error on integer overflow instead of wrapping.
    Ok(uniform_requests::table
        .filter(uniform_requests::staff_id.eq(staff_id))
        .filter(uniform_requests::status.ne(RequestStatus::Cancelled.as_str()))
        .select((sql::<BigInt>("COALESCE(SUM(quantity), 0)"), count_star()))
        .first::<(i64, i64)>(conn)?)
}

/// Returns the creation time of a staff member's latest request of any
/// status.
///
/// # Errors
///
/// Returns an error if the query fails or the stored timestamp is corrupt.
pub fn latest_request_at(
    conn: &mut SqliteConnection,
    staff_id: i64,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    uniform_requests::table
        .filter(uniform_requests::staff_id.eq(staff_id))
        .order((
            uniform_requests::created_at.desc(),
            uniform_requests::request_id.desc(),
        ))
        .select(uniform_requests::created_at)
        .first::<String>(conn)
        .optional()?
        .map(|created_at| parse_timestamp(&created_at))
        .transpose()
}

/// Evaluates whether a staff member may submit at `now`.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the staff member does not exist.
pub fn staff_eligibility(
    conn: &mut SqliteConnection,
    staff_id: i64,
    now: OffsetDateTime,
    cooldown_hours: u32,
) -> Result<Eligibility, PersistenceError> {
    let member = get_staff(conn, staff_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Staff member {staff_id} not found")))?;
    let (total_ordered, total_requests) = ordered_totals(conn, staff_id)?;
    let last_requested_at: Option<OffsetDateTime> = latest_request_at(conn, staff_id)?;

    Ok(Eligibility::evaluate(
        member.uniform_limit,
        total_ordered,
        total_requests,
        last_requested_at,
        now,
        cooldown_hours,
    ))
}
