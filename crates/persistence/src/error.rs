// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use d1_store_domain::{AllowanceExceeded, CooldownActive};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use time::OffsetDateTime;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A unique constraint rejected a write. `column` is `table.column`
    /// when the backend reports it.
    UniqueViolation { column: String },
    /// A foreign key constraint rejected a write or delete.
    ForeignKeyViolation(String),
    /// A stored value could not be read back into a domain type.
    CorruptRow(String),
    /// A stock item cannot be deleted because requests reference it.
    StockItemReferenced { ean: String, name: String },
    /// A conditional status update found the request in another status.
    StatusConflict {
        request_id: i64,
        current_status: String,
    },
    /// The requested session was not found.
    SessionNotFound(String),
    /// The requested resource was not found.
    NotFound(String),
    /// A general error occurred.
    Other(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::UniqueViolation { column } => {
                write!(f, "Unique constraint violated on {column}")
            }
            Self::ForeignKeyViolation(msg) => write!(f, "Foreign key constraint violated: {msg}"),
            Self::CorruptRow(msg) => write!(f, "Corrupt row: {msg}"),
            Self::StockItemReferenced { ean, name } => write!(
                f,
                "Stock item {ean} '{name}' cannot be deleted: referenced by uniform requests"
            ),
            Self::StatusConflict {
                request_id,
                current_status,
            } => write!(
                f,
                "Request {request_id} is in status {current_status} and cannot be changed that way"
            ),
            Self::SessionNotFound(msg) => write!(f, "Session not found: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Resolves the `table.column` a unique violation names.
///
/// Uses the structured column when the backend provides one and otherwise
/// reads the SQLite message (`UNIQUE constraint failed: t.c`). A composite
/// key reports its first column.
fn unique_violation_target(info: &dyn DatabaseErrorInformation) -> String {
    if let (Some(table), Some(column)) = (info.table_name(), info.column_name()) {
        return format!("{table}.{column}");
    }

    info.message()
        .split_once("UNIQUE constraint failed:")
        .and_then(|(_, columns)| columns.split(',').next())
        .map_or_else(|| info.message().to_string(), |c| c.trim().to_string())
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation {
                    column: unique_violation_target(info.as_ref()),
                }
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl PersistenceError {
    /// Returns whether this is a unique violation on a tracking identifier
    /// column.
    #[must_use]
    pub fn is_tracking_id_collision(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation { column }
                if column == "uniform_requests.tracking_id"
                    || column == "deliveries.tracking_id"
        )
    }
}

/// Errors from the uniform request creation transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Staff member {staff_id} not found")]
    StaffNotFound { staff_id: i64 },

    #[error(
        "Uniform limit reached: limit {uniform_limit}, already ordered {total_ordered}, requested {requested}"
    )]
    UniformLimitExceeded {
        uniform_limit: u32,
        total_ordered: i64,
        requested: i64,
    },

    #[error("A request was submitted in the last {cooldown_hours} hours")]
    CooldownActive {
        last_requested_at: OffsetDateTime,
        next_allowed_at: OffsetDateTime,
        cooldown_hours: u32,
    },

    #[error("Insufficient stock: {available} available")]
    InsufficientStock { available: i64 },

    #[error("Could not allocate a unique tracking id after {attempts} attempts")]
    TrackingIdExhausted { attempts: u32 },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<diesel::result::Error> for RequestError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Persistence(PersistenceError::from(err))
    }
}

impl From<AllowanceExceeded> for RequestError {
    fn from(err: AllowanceExceeded) -> Self {
        Self::UniformLimitExceeded {
            uniform_limit: err.uniform_limit,
            total_ordered: err.total_ordered,
            requested: err.requested,
        }
    }
}

impl RequestError {
    /// Builds the cooldown error for a policy window in hours.
    #[must_use]
    pub const fn cooldown(active: CooldownActive, cooldown_hours: u32) -> Self {
        Self::CooldownActive {
            last_requested_at: active.last_requested_at,
            next_allowed_at: active.next_allowed_at,
            cooldown_hours,
        }
    }
}
