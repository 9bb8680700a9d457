// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use d1_store::CoreError;
use d1_store_domain::DomainError;
use d1_store_persistence::{PersistenceError, RequestError};
use time::OffsetDateTime;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform the action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain, core and persistence errors and
/// represent the API contract. Each variant carries what a client needs to
/// explain the failure without a second round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform the action.
        required_role: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The uploaded file is missing, not a CSV, or cannot be tokenized.
    InvalidUpload {
        /// A human-readable description of the rejection.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The write conflicts with the current state of the resource.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
        /// The status the request was found in, for status conflicts.
        current_status: Option<String>,
    },
    /// The request would exceed the staff member's allowance.
    UniformLimitExceeded {
        uniform_limit: u32,
        total_ordered: i64,
        requested: i64,
    },
    /// The staff member submitted too recently.
    CooldownActive {
        cooldown_hours: u32,
        last_requested_at: OffsetDateTime,
        next_allowed_at: OffsetDateTime,
    },
    /// The item does not have enough stock for the request.
    InsufficientStock {
        /// Stock on hand when the request was rejected.
        available: i64,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable machine-readable name of this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidInput { .. } => "invalid_input",
            Self::InvalidUpload { .. } => "invalid_upload",
            Self::ResourceNotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::UniformLimitExceeded { .. } => "uniform_limit_exceeded",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::InvalidUpload { message } | Self::Conflict { message, .. } => {
                write!(f, "{message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::UniformLimitExceeded {
                uniform_limit,
                total_ordered,
                requested,
            } => write!(
                f,
                "Uniform limit reached: limit {uniform_limit}, already ordered {total_ordered}, requested {requested}"
            ),
            Self::CooldownActive { cooldown_hours, .. } => write!(
                f,
                "Only one request is allowed every {cooldown_hours} hours"
            ),
            Self::InsufficientStock { available } => {
                write!(f, "Insufficient stock: {available} available")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidDisplayName(_) => invalid_input("display_name", message),
        DomainError::InvalidStoreName(_) => invalid_input("store", message),
        DomainError::InvalidStaffRole(_) => invalid_input("role", message),
        DomainError::InvalidEan(_) => invalid_input("ean", message),
        DomainError::InvalidItemName(_) => invalid_input("name", message),
        DomainError::InvalidQuantity { .. } => invalid_input("quantity", message),
        DomainError::InvalidUniformLimit { .. } => invalid_input("uniform_limit", message),
        DomainError::InvalidRequestStatus { .. } => invalid_input("status", message),
        DomainError::InvalidActorKind(_) => invalid_input("role", message),
        DomainError::MissingReorderReason => invalid_input("reason", message),
        DomainError::DateArithmeticOverflow { .. } => ApiError::Internal { message },
        DomainError::InvalidStatusTransition { from, .. } => ApiError::Conflict {
            message,
            current_status: Some(from),
        },
        DomainError::ReorderNotAllowed { status } => ApiError::Conflict {
            message,
            current_status: Some(status),
        },
        DomainError::TransitionNotPermitted { actor, from, to } => ApiError::Unauthorized {
            action: format!("move a request from {from} to {to} as {actor}"),
            required_role: String::from("a role permitted by the transition policy"),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::InvalidUpload(message) => ApiError::InvalidUpload { message },
        CoreError::UnparsableCsv(_) => ApiError::InvalidUpload {
            message: err.to_string(),
        },
        CoreError::Internal(message) => ApiError::Internal { message },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage failures never leak their details past the log.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message,
        },
        PersistenceError::SessionNotFound(reason) => ApiError::AuthenticationFailed { reason },
        PersistenceError::StatusConflict {
            ref current_status, ..
        } => ApiError::Conflict {
            message: err.to_string(),
            current_status: Some(current_status.clone()),
        },
        PersistenceError::StockItemReferenced { .. } | PersistenceError::UniqueViolation { .. } => {
            ApiError::Conflict {
                message: err.to_string(),
                current_status: None,
            }
        }
        _ => {
            tracing::error!(error = %err, "Persistence failure");
            ApiError::Internal {
                message: String::from("A database error occurred"),
            }
        }
    }
}

/// Translates a request-submission error into an API error.
#[must_use]
pub fn translate_request_error(err: RequestError) -> ApiError {
    match err {
        RequestError::StaffNotFound { staff_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Staff"),
            message: format!("Staff member {staff_id} does not exist"),
        },
        RequestError::UniformLimitExceeded {
            uniform_limit,
            total_ordered,
            requested,
        } => ApiError::UniformLimitExceeded {
            uniform_limit,
            total_ordered,
            requested,
        },
        RequestError::CooldownActive {
            last_requested_at,
            next_allowed_at,
            cooldown_hours,
        } => ApiError::CooldownActive {
            cooldown_hours,
            last_requested_at,
            next_allowed_at,
        },
        RequestError::InsufficientStock { available } => ApiError::InsufficientStock { available },
        RequestError::TrackingIdExhausted { .. } => {
            tracing::error!(error = %err, "Tracking id allocation failed");
            ApiError::Internal {
                message: err.to_string(),
            }
        }
        RequestError::Persistence(inner) => translate_persistence_error(inner),
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}
