// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Uniform request status tracking and transition logic.
//!
//! A request moves forward one step at a time:
//! `REQUEST -> DISPATCHED -> IN_TRANSIT -> ARRIVED -> COLLECTED`.
//! `CANCELLED` is reachable only from `REQUEST`. Both `COLLECTED` and
//! `CANCELLED` are terminal.
//!
//! Which actor may perform which step is decided separately by
//! [`TransitionPolicy`](crate::TransitionPolicy); this module only knows
//! the lifecycle graph.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle states of a uniform request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Submitted, stock reserved, nothing shipped yet.
    Request,
    /// Picked and handed to the carrier.
    Dispatched,
    /// On the way to the store.
    InTransit,
    /// At the store, waiting for the staff member.
    Arrived,
    /// Picked up by the staff member.
    Collected,
    /// Withdrawn before dispatch; stock has been restored.
    Cancelled,
}

impl RequestStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Request,
        Self::Dispatched,
        Self::InTransit,
        Self::Arrived,
        Self::Collected,
        Self::Cancelled,
    ];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Dispatched => "DISPATCHED",
            Self::InTransit => "IN_TRANSIT",
            Self::Arrived => "ARRIVED",
            Self::Collected => "COLLECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRequestStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "REQUEST" => Ok(Self::Request),
            "DISPATCHED" => Ok(Self::Dispatched),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "ARRIVED" => Ok(Self::Arrived),
            "COLLECTED" => Ok(Self::Collected),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidRequestStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Collected | Self::Cancelled)
    }

    /// Returns the next forward status, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Request => Some(Self::Dispatched),
            Self::Dispatched => Some(Self::InTransit),
            Self::InTransit => Some(Self::Arrived),
            Self::Arrived => Some(Self::Collected),
            Self::Collected | Self::Cancelled => None,
        }
    }

    /// Returns whether the lifecycle graph has an edge from `self` to `target`.
    ///
    /// This covers the ordered forward path and cancellation from `REQUEST`.
    /// The administrative jump to `COLLECTED` is not an edge; see
    /// [`Self::validate_collect_override`].
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        if *self == Self::Request && target == Self::Cancelled {
            return true;
        }
        self.next() == Some(target)
    }

    /// Validates a transition along the lifecycle graph.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the transition is not allowed.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        if target == Self::Cancelled && *self != Self::Request {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: format!(
                    "only requests in REQUEST status can be cancelled. Current status: \"{}\"",
                    self.as_str()
                ),
            });
        }

        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: "statuses must advance one step at a time".to_string(),
            })
        }
    }

    /// Validates the administrative jump straight to `COLLECTED`.
    ///
    /// Allowed from any non-terminal status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the request is
    /// already collected or cancelled.
    pub fn validate_collect_override(&self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: Self::Collected.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }
        Ok(())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
