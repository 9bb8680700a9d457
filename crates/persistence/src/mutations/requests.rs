// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Uniform request transactions.
//!
//! Submission checks the allowance and the cooldown, decrements stock with
//! a conditional update and inserts the request and its delivery record,
//! all inside one `IMMEDIATE` transaction. A tracking-id collision rolls
//! the whole attempt back and the caller retries with a fresh id.

use d1_store_domain::{
    NewUniformRequest, RequestPolicy, RequestStatus, Staff, StockItem, UniformRequest,
    check_allowance, check_cooldown,
};
use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{CancelledRequest, CreatedRequest};
use crate::diesel_schema::{deliveries, stock_items, uniform_requests};
use crate::error::{PersistenceError, RequestError};
use crate::queries::requests::{get_request, latest_request_at, ordered_totals};
use crate::queries::staff::get_staff;
use crate::queries::stock::{find_stock_item, get_stock_item};
use crate::retry::{RetryFailure, retry_with_fresh_nonce};
use crate::timestamp::format_timestamp;

fn request_not_found(request_id: i64) -> PersistenceError {
    PersistenceError::NotFound(format!("Request {request_id} not found"))
}

fn load_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<UniformRequest, PersistenceError> {
    get_request(conn, request_id)?.ok_or_else(|| request_not_found(request_id))
}

/// Runs one submission attempt with a given tracking id.
fn submit_once(
    conn: &mut SqliteConnection,
    input: &NewUniformRequest,
    tracking_id: &str,
    now: OffsetDateTime,
    policy: &RequestPolicy,
) -> Result<CreatedRequest, RequestError> {
    conn.immediate_transaction(|conn| {
        let staff_id: i64 = input.staff_id;
        let member: Staff =
            get_staff(conn, staff_id)?.ok_or(RequestError::StaffNotFound { staff_id })?;

        if member.uniform_limit.is_some() {
            let (total_ordered, _) = ordered_totals(conn, staff_id)?;
            check_allowance(member.uniform_limit, total_ordered, input.quantity)?;
        }

        let last_requested_at: Option<OffsetDateTime> = latest_request_at(conn, staff_id)?;
        check_cooldown(last_requested_at, now, policy.cooldown_window())
            .map_err(|active| RequestError::cooldown(active, policy.cooldown_hours))?;

        let decremented: usize = diesel::update(
            stock_items::table
                .filter(stock_items::ean.eq(&input.ean))
                .filter(stock_items::name.eq(&input.item_name))
                .filter(stock_items::qty.ge(input.quantity)),
        )
        .set(stock_items::qty.eq(stock_items::qty - input.quantity))
        .execute(conn)?;

        if decremented == 0 {
            let available: i64 =
                find_stock_item(conn, &input.ean, &input.item_name)?.map_or(0, |item| item.qty);
            return Err(RequestError::InsufficientStock { available });
        }

        let item: StockItem = find_stock_item(conn, &input.ean, &input.item_name)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Stock item {} vanished", input.ean)))?;

        let created_at: String = format_timestamp(now)?;

        diesel::insert_into(uniform_requests::table)
            .values((
                uniform_requests::tracking_id.eq(tracking_id),
                uniform_requests::staff_id.eq(staff_id),
                uniform_requests::item_id.eq(item.id),
                uniform_requests::ean.eq(&input.ean),
                uniform_requests::item_name.eq(&input.item_name),
                uniform_requests::quantity.eq(input.quantity),
                uniform_requests::status.eq(RequestStatus::Request.as_str()),
                uniform_requests::notes.eq(input.notes.as_deref()),
                uniform_requests::created_at.eq(&created_at),
                uniform_requests::updated_at.eq(&created_at),
            ))
            .execute(conn)?;
        let request_id: i64 = conn.get_last_insert_rowid()?;

        diesel::insert_into(deliveries::table)
            .values((
                deliveries::tracking_id.eq(tracking_id),
                deliveries::store_id.eq(member.store_id),
                deliveries::staff_id.eq(staff_id),
                deliveries::created_at.eq(&created_at),
            ))
            .execute(conn)?;

        let request: UniformRequest = load_request(conn, request_id)?;

        Ok(CreatedRequest {
            request,
            requested_quantity: input.quantity,
            remaining_stock: item.qty,
            is_low_stock: policy.is_low_stock(item.qty),
        })
    })
}

/// Submits a uniform request.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `input` - The validated request
/// * `now` - Submission time, used for the cooldown and as `created_at`
/// * `policy` - Cooldown, low-stock and retry settings
/// * `next_tracking_id` - Produces a fresh tracking id for each attempt
///
/// # Errors
///
/// Returns the first rule the request breaks, `TrackingIdExhausted` when
/// every attempt collided, or the underlying persistence error.
pub fn create_uniform_request(
    conn: &mut SqliteConnection,
    input: &NewUniformRequest,
    now: OffsetDateTime,
    policy: &RequestPolicy,
    next_tracking_id: impl FnMut() -> String,
) -> Result<CreatedRequest, RequestError> {
    let result = retry_with_fresh_nonce(
        policy.max_tracking_attempts,
        next_tracking_id,
        |tracking_id: &String| submit_once(conn, input, tracking_id, now, policy),
        |err: &RequestError| {
            matches!(err, RequestError::Persistence(p) if p.is_tracking_id_collision())
        },
    );

    match result {
        Ok(created) => {
            info!(
                tracking_id = %created.request.tracking_id,
                staff_id = input.staff_id,
                quantity = input.quantity,
                remaining_stock = created.remaining_stock,
                "Uniform request created"
            );
            Ok(created)
        }
        Err(RetryFailure::Exhausted { attempts }) => {
            Err(RequestError::TrackingIdExhausted { attempts })
        }
        Err(RetryFailure::Failed(err)) => {
            debug!(staff_id = input.staff_id, error = %err, "Uniform request rejected");
            Err(err)
        }
    }
}

/// Cancels a request still in `REQUEST` and returns its quantity to stock.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown request, or
/// `PersistenceError::StatusConflict` if it is no longer in `REQUEST`.
pub fn cancel_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    now: OffsetDateTime,
) -> Result<CancelledRequest, PersistenceError> {
    conn.immediate_transaction(|conn| cancel_in_transaction(conn, request_id, now))
}

fn cancel_in_transaction(
    conn: &mut SqliteConnection,
    request_id: i64,
    now: OffsetDateTime,
) -> Result<CancelledRequest, PersistenceError> {
    let request: UniformRequest = load_request(conn, request_id)?;
    let updated_at: String = format_timestamp(now)?;

    let changed: usize = diesel::update(
        uniform_requests::table
            .filter(uniform_requests::request_id.eq(request_id))
            .filter(uniform_requests::status.eq(RequestStatus::Request.as_str())),
    )
    .set((
        uniform_requests::status.eq(RequestStatus::Cancelled.as_str()),
        uniform_requests::updated_at.eq(&updated_at),
    ))
    .execute(conn)?;

    if changed == 0 {
        return Err(PersistenceError::StatusConflict {
            request_id,
            current_status: request.status.as_str().to_string(),
        });
    }

    diesel::update(stock_items::table.filter(stock_items::item_id.eq(request.stock_item_id)))
        .set(stock_items::qty.eq(stock_items::qty + request.quantity))
        .execute(conn)?;

    let stock_after: i64 =
        get_stock_item(conn, request.stock_item_id)?.map_or(0, |item| item.qty);

    info!(
        request_id,
        tracking_id = %request.tracking_id,
        restored = request.quantity,
        stock_after,
        "Uniform request cancelled"
    );

    Ok(CancelledRequest {
        request: load_request(conn, request_id)?,
        restored_quantity: request.quantity,
        stock_after,
    })
}

/// Moves a request from `from` to `to` if it is still in `from`.
///
/// A move to `CANCELLED` goes through [`cancel_request`] so stock is
/// always returned.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown request, or
/// `PersistenceError::StatusConflict` if the request is not in `from`.
pub fn transition_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    from: RequestStatus,
    to: RequestStatus,
    now: OffsetDateTime,
) -> Result<UniformRequest, PersistenceError> {
    conn.immediate_transaction(|conn| transition_in_transaction(conn, request_id, from, to, now))
}

fn transition_in_transaction(
    conn: &mut SqliteConnection,
    request_id: i64,
    from: RequestStatus,
    to: RequestStatus,
    now: OffsetDateTime,
) -> Result<UniformRequest, PersistenceError> {
    if to == RequestStatus::Cancelled {
        return cancel_in_transaction(conn, request_id, now).map(|cancelled| cancelled.request);
    }

    let updated_at: String = format_timestamp(now)?;
    let changed: usize = diesel::update(
        uniform_requests::table
            .filter(uniform_requests::request_id.eq(request_id))
            .filter(uniform_requests::status.eq(from.as_str())),
    )
    .set((
        uniform_requests::status.eq(to.as_str()),
        uniform_requests::updated_at.eq(&updated_at),
    ))
    .execute(conn)?;

    let request: UniformRequest = load_request(conn, request_id)?;
    if changed == 0 {
        return Err(PersistenceError::StatusConflict {
            request_id,
            current_status: request.status.as_str().to_string(),
        });
    }

    debug!(request_id, from = %from, to = %to, "Request status changed");
    Ok(request)
}

/// Forces a non-terminal request straight to `COLLECTED`.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown request, or
/// `PersistenceError::StatusConflict` if it is already terminal.
pub fn override_collect(
    conn: &mut SqliteConnection,
    request_id: i64,
    now: OffsetDateTime,
) -> Result<UniformRequest, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let updated_at: String = format_timestamp(now)?;
        let terminal: [&str; 2] = [
            RequestStatus::Collected.as_str(),
            RequestStatus::Cancelled.as_str(),
        ];

        let changed: usize = diesel::update(
            uniform_requests::table
                .filter(uniform_requests::request_id.eq(request_id))
                .filter(uniform_requests::status.ne_all(terminal)),
        )
        .set((
            uniform_requests::status.eq(RequestStatus::Collected.as_str()),
            uniform_requests::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;

        let request: UniformRequest = load_request(conn, request_id)?;
        if changed == 0 {
            return Err(PersistenceError::StatusConflict {
                request_id,
                current_status: request.status.as_str().to_string(),
            });
        }

        debug!(request_id, "Request marked collected by override");
        Ok(request)
    })
}

/// Replaces a request's notes. Allowed in every status.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown request.
pub fn update_notes(
    conn: &mut SqliteConnection,
    request_id: i64,
    notes: Option<&str>,
    now: OffsetDateTime,
) -> Result<UniformRequest, PersistenceError> {
    conn.immediate_transaction(|conn| notes_in_transaction(conn, request_id, notes, now))
}

fn notes_in_transaction(
    conn: &mut SqliteConnection,
    request_id: i64,
    notes: Option<&str>,
    now: OffsetDateTime,
) -> Result<UniformRequest, PersistenceError> {
    let updated_at: String = format_timestamp(now)?;
    let notes: Option<&str> = notes.map(str::trim).filter(|n| !n.is_empty());

    let changed: usize =
        diesel::update(uniform_requests::table.filter(uniform_requests::request_id.eq(request_id)))
            .set((
                uniform_requests::notes.eq(notes),
                uniform_requests::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

    if changed == 0 {
        return Err(request_not_found(request_id));
    }
    load_request(conn, request_id)
}

/// Applies an optional status move and an optional notes edit together.
///
/// Either both take effect or neither does. The status move follows the
/// same rules as [`transition_request`].
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown request, or
/// `PersistenceError::StatusConflict` if the request is no longer in the
/// expected status.
pub fn update_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    status_change: Option<(RequestStatus, RequestStatus)>,
    notes: Option<&str>,
    now: OffsetDateTime,
) -> Result<UniformRequest, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let mut request: UniformRequest = load_request(conn, request_id)?;
        if notes.is_some() {
            request = notes_in_transaction(conn, request_id, notes, now)?;
        }
        if let Some((from, to)) = status_change {
            request = transition_in_transaction(conn, request_id, from, to, now)?;
        }
        Ok(request)
    })
}
