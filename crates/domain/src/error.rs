// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Staff display name is empty or invalid.
    InvalidDisplayName(String),
    /// Store name is empty or invalid.
    InvalidStoreName(String),
    /// Staff role is not one of the accepted values.
    InvalidStaffRole(String),
    /// EAN is empty or contains non-digit characters.
    InvalidEan(String),
    /// Stock item name is empty or invalid.
    InvalidItemName(String),
    /// Requested or stocked quantity is out of range.
    InvalidQuantity {
        /// The rejected quantity.
        quantity: i64,
    },
    /// Uniform limit must be a positive integer.
    InvalidUniformLimit {
        /// The rejected limit.
        limit: i64,
    },
    /// Request status string is not recognised.
    InvalidRequestStatus {
        /// The rejected status string.
        status: String,
    },
    /// The status lifecycle does not allow this transition.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition is rejected.
        reason: String,
    },
    /// The transition exists but the actor may not perform it.
    TransitionNotPermitted {
        /// The actor kind attempting the transition.
        actor: String,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Actor kind string is not recognised.
    InvalidActorKind(String),
    /// Re-order is only offered for collected requests.
    ReorderNotAllowed {
        /// The current status of the source request.
        status: String,
    },
    /// Re-order requires a non-empty reason.
    MissingReorderReason,
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDisplayName(msg) => write!(f, "Invalid display name: {msg}"),
            Self::InvalidStoreName(msg) => write!(f, "Invalid store name: {msg}"),
            Self::InvalidStaffRole(role) => {
                write!(f, "Invalid staff role '{role}': must be staff, manager, or casual")
            }
            Self::InvalidEan(ean) => write!(f, "Invalid EAN '{ean}': must contain digits only"),
            Self::InvalidItemName(msg) => write!(f, "Invalid item name: {msg}"),
            Self::InvalidQuantity { quantity } => write!(f, "Invalid quantity: {quantity}"),
            Self::InvalidUniformLimit { limit } => {
                write!(f, "Invalid uniform limit {limit}: must be a positive integer")
            }
            Self::InvalidRequestStatus { status } => {
                write!(f, "Invalid request status: {status}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from {from} to {to}: {reason}")
            }
            Self::TransitionNotPermitted { actor, from, to } => {
                write!(f, "Actor '{actor}' may not move a request from {from} to {to}")
            }
            Self::InvalidActorKind(kind) => write!(f, "Invalid actor kind: {kind}"),
            Self::ReorderNotAllowed { status } => write!(
                f,
                "Re-order is only available for COLLECTED requests (current status: {status})"
            ),
            Self::MissingReorderReason => write!(f, "A reason is required to re-order"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
