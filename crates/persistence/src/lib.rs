// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the D1 Store.
//!
//! Built on Diesel over `SQLite`. One [`Persistence`] value owns one
//! connection; the server shares it behind a mutex. Contended
//! read-check-write sequences (request submission, cancellation, status
//! changes) run in `IMMEDIATE` transactions, and stock is only ever
//! decremented by a conditional update, so the invariants hold even for
//! independent connections to the same database file.
//!
//! ## Testing
//!
//! - `new_in_memory()` gives each test its own shared-cache in-memory
//!   database, named from an atomic counter
//! - Concurrency tests open several file-backed connections on a temporary
//!   directory

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

use d1_store_domain::{
    Eligibility, NewUniformRequest, RequestPolicy, RequestStatus, Staff, StaffRole, StockItem,
    Store, TrackingIdGenerator, UniformRequest,
};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{OffsetDateTime, UtcOffset};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod retry;
mod timestamp;

#[cfg(test)]
mod tests;

pub use data_models::{CancelledRequest, CreatedRequest, SessionData};
pub use error::{PersistenceError, RequestError};
pub use retry::{RetryFailure, retry_with_fresh_nonce};
pub use timestamp::{format_timestamp, parse_timestamp};

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for stores, staff, stock, requests and sessions.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter over a fresh in-memory database.
    ///
    /// Each call gets its own database, so tests stay isolated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter over a database file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Stores & Staff
    // ========================================================================

    /// Lists all stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_stores(&mut self) -> Result<Vec<Store>, PersistenceError> {
        queries::staff::list_stores(&mut self.conn)
    }

    /// Creates a store and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_store(&mut self, name: &str) -> Result<i64, PersistenceError> {
        mutations::staff::create_store(&mut self.conn, name)
    }

    /// Lists all staff members.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_staff(&mut self) -> Result<Vec<Staff>, PersistenceError> {
        queries::staff::list_staff(&mut self.conn)
    }

    /// Retrieves a staff member by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_staff(&mut self, staff_id: i64) -> Result<Option<Staff>, PersistenceError> {
        queries::staff::get_staff(&mut self.conn, staff_id)
    }

    /// Counts staff members.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_staff(&mut self) -> Result<i64, PersistenceError> {
        queries::staff::count_staff(&mut self.conn)
    }

    /// Creates a staff member and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_staff(
        &mut self,
        display_name: &str,
        role: StaffRole,
        store_id: i64,
        uniform_limit: Option<u32>,
    ) -> Result<i64, PersistenceError> {
        mutations::staff::create_staff(&mut self.conn, display_name, role, store_id, uniform_limit)
    }

    /// Sets or clears a staff member's uniform limit.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the staff member does not exist.
    pub fn set_uniform_limit(
        &mut self,
        staff_id: i64,
        uniform_limit: Option<u32>,
    ) -> Result<Staff, PersistenceError> {
        mutations::staff::set_uniform_limit(&mut self.conn, staff_id, uniform_limit)
    }

    /// Evaluates a staff member's cooldown and allowance at `now`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the staff member does not exist.
    pub fn staff_eligibility(
        &mut self,
        staff_id: i64,
        now: OffsetDateTime,
        cooldown_hours: u32,
    ) -> Result<Eligibility, PersistenceError> {
        queries::requests::staff_eligibility(&mut self.conn, staff_id, now, cooldown_hours)
    }

    // ========================================================================
    // Stock
    // ========================================================================

    /// Lists all stock items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_stock(&mut self) -> Result<Vec<StockItem>, PersistenceError> {
        queries::stock::list_stock(&mut self.conn)
    }

    /// Retrieves a stock item by `(ean, name)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_stock_item(
        &mut self,
        ean: &str,
        name: &str,
    ) -> Result<Option<StockItem>, PersistenceError> {
        queries::stock::find_stock_item(&mut self.conn, ean, name)
    }

    /// Creates a stock item and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_stock_item(
        &mut self,
        ean: &str,
        name: &str,
        qty: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::stock::create_stock_item(&mut self.conn, ean, name, qty)
    }

    /// Deletes a stock item no request references.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` or
    /// `PersistenceError::StockItemReferenced`.
    pub fn delete_stock_item(&mut self, ean: &str, name: &str) -> Result<(), PersistenceError> {
        mutations::stock::delete_stock_item(&mut self.conn, ean, name)
    }

    // ========================================================================
    // Uniform Requests
    // ========================================================================

    /// Submits a uniform request with randomly generated tracking ids.
    ///
    /// # Errors
    ///
    /// See [`Self::create_uniform_request_with`].
    pub fn create_uniform_request(
        &mut self,
        input: &NewUniformRequest,
        now: OffsetDateTime,
        policy: &RequestPolicy,
    ) -> Result<CreatedRequest, RequestError> {
        let generator: TrackingIdGenerator = TrackingIdGenerator::new(policy.tracking_prefix.as_str());
        let date = now.to_offset(UtcOffset::UTC).date();
        let staff_id: i64 = input.staff_id;
        self.create_uniform_request_with(input, now, policy, || {
            generator.generate(date, staff_id)
        })
    }

    /// Submits a uniform request drawing tracking ids from `next_tracking_id`.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::StaffNotFound`, `UniformLimitExceeded`,
    /// `CooldownActive` or `InsufficientStock` when a rule fails,
    /// `TrackingIdExhausted` when every attempt collided, or
    /// `RequestError::Persistence` for database failures.
    pub fn create_uniform_request_with(
        &mut self,
        input: &NewUniformRequest,
        now: OffsetDateTime,
        policy: &RequestPolicy,
        next_tracking_id: impl FnMut() -> String,
    ) -> Result<CreatedRequest, RequestError> {
        mutations::requests::create_uniform_request(
            &mut self.conn,
            input,
            now,
            policy,
            next_tracking_id,
        )
    }

    /// Retrieves a request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_request(&mut self, request_id: i64) -> Result<Option<UniformRequest>, PersistenceError> {
        queries::requests::get_request(&mut self.conn, request_id)
    }

    /// Lists every request, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_requests(&mut self) -> Result<Vec<UniformRequest>, PersistenceError> {
        queries::requests::list_requests(&mut self.conn)
    }

    /// Lists a staff member's requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_requests_for_staff(
        &mut self,
        staff_id: i64,
    ) -> Result<Vec<UniformRequest>, PersistenceError> {
        queries::requests::list_requests_for_staff(&mut self.conn, staff_id)
    }

    /// Cancels a request in `REQUEST` and restores its stock.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` or `PersistenceError::StatusConflict`.
    pub fn cancel_request(
        &mut self,
        request_id: i64,
        now: OffsetDateTime,
    ) -> Result<CancelledRequest, PersistenceError> {
        mutations::requests::cancel_request(&mut self.conn, request_id, now)
    }

    /// Moves a request from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` or `PersistenceError::StatusConflict`.
    pub fn transition_request(
        &mut self,
        request_id: i64,
        from: RequestStatus,
        to: RequestStatus,
        now: OffsetDateTime,
    ) -> Result<UniformRequest, PersistenceError> {
        mutations::requests::transition_request(&mut self.conn, request_id, from, to, now)
    }

    /// Forces a non-terminal request to `COLLECTED`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` or `PersistenceError::StatusConflict`.
    pub fn override_collect(
        &mut self,
        request_id: i64,
        now: OffsetDateTime,
    ) -> Result<UniformRequest, PersistenceError> {
        mutations::requests::override_collect(&mut self.conn, request_id, now)
    }

    /// Replaces a request's notes.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` for an unknown request.
    pub fn update_notes(
        &mut self,
        request_id: i64,
        notes: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<UniformRequest, PersistenceError> {
        mutations::requests::update_notes(&mut self.conn, request_id, notes, now)
    }

    /// Applies a status move and a notes edit in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` or `PersistenceError::StatusConflict`;
    /// nothing is written in either case.
    pub fn update_request(
        &mut self,
        request_id: i64,
        status_change: Option<(RequestStatus, RequestStatus)>,
        notes: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<UniformRequest, PersistenceError> {
        mutations::requests::update_request(&mut self.conn, request_id, status_change, notes, now)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Stores a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(&mut self, session: &SessionData) -> Result<(), PersistenceError> {
        mutations::sessions::create_session(&mut self.conn, session)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::sessions::get_session_by_token(&mut self.conn, session_token)
    }

    /// Deletes a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::sessions::delete_session(&mut self.conn, session_token)
    }

    /// Deletes sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: OffsetDateTime) -> Result<usize, PersistenceError> {
        let now: String = format_timestamp(now)?;
        mutations::sessions::delete_expired_sessions(&mut self.conn, &now)
    }
}
