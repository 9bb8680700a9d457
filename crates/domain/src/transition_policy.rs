// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor-to-transition permission table.
//!
//! The table can only narrow the lifecycle graph in
//! [`RequestStatus`]: a rule naming an edge the graph rejects never
//! grants anything.

use crate::error::DomainError;
use crate::request_status::RequestStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kinds of actor that act on uniform requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// The requesting staff member, acting on their own requests.
    Staff,
    /// Warehouse/dispatch operator progressing deliveries.
    DispatchAdmin,
    /// Store administrator.
    Admin,
}

impl ActorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::DispatchAdmin => "dispatch_admin",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for ActorKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Self::Staff),
            "dispatch_admin" | "dispatchAdmin" => Ok(Self::DispatchAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidActorKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One permitted `(actor, from, to)` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub actor: ActorKind,
    pub from: RequestStatus,
    pub to: RequestStatus,
}

impl TransitionRule {
    #[must_use]
    pub const fn new(actor: ActorKind, from: RequestStatus, to: RequestStatus) -> Self {
        Self { actor, from, to }
    }
}

const DEFAULT_RULES: [TransitionRule; 8] = [
    TransitionRule::new(ActorKind::Staff, RequestStatus::Request, RequestStatus::Cancelled),
    TransitionRule::new(
        ActorKind::DispatchAdmin,
        RequestStatus::Request,
        RequestStatus::Dispatched,
    ),
    TransitionRule::new(
        ActorKind::DispatchAdmin,
        RequestStatus::Dispatched,
        RequestStatus::InTransit,
    ),
    TransitionRule::new(
        ActorKind::DispatchAdmin,
        RequestStatus::InTransit,
        RequestStatus::Arrived,
    ),
    TransitionRule::new(
        ActorKind::DispatchAdmin,
        RequestStatus::Arrived,
        RequestStatus::Collected,
    ),
    TransitionRule::new(
        ActorKind::DispatchAdmin,
        RequestStatus::Request,
        RequestStatus::Cancelled,
    ),
    TransitionRule::new(ActorKind::Admin, RequestStatus::Request, RequestStatus::Cancelled),
    TransitionRule::new(ActorKind::Admin, RequestStatus::Arrived, RequestStatus::Collected),
];

/// Permission table for status changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPolicy {
    rules: Vec<TransitionRule>,
    collect_override: Vec<ActorKind>,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
            collect_override: vec![ActorKind::Admin, ActorKind::DispatchAdmin],
        }
    }
}

impl TransitionPolicy {
    /// Creates a policy from explicit rules.
    ///
    /// # Arguments
    ///
    /// * `rules` - Permitted `(actor, from, to)` edges
    /// * `collect_override` - Actors allowed to jump straight to `COLLECTED`
    #[must_use]
    pub const fn new(rules: Vec<TransitionRule>, collect_override: Vec<ActorKind>) -> Self {
        Self {
            rules,
            collect_override,
        }
    }

    /// Returns the configured rules.
    #[must_use]
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    fn has_rule(&self, actor: ActorKind, from: RequestStatus, to: RequestStatus) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.actor == actor && rule.from == from && rule.to == to)
    }

    /// Checks that `actor` may move a request from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the lifecycle forbids
    /// the edge, or `DomainError::TransitionNotPermitted` if the lifecycle
    /// allows it but the actor has no rule for it.
    pub fn authorize(
        &self,
        actor: ActorKind,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<(), DomainError> {
        from.validate_transition(to)?;

        if self.has_rule(actor, from, to) {
            Ok(())
        } else {
            Err(DomainError::TransitionNotPermitted {
                actor: actor.as_str().to_string(),
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    /// Checks that `actor` may force a request straight to `COLLECTED`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the request is
    /// terminal, or `DomainError::TransitionNotPermitted` if the actor may
    /// not override.
    pub fn authorize_collect_override(
        &self,
        actor: ActorKind,
        from: RequestStatus,
    ) -> Result<(), DomainError> {
        from.validate_collect_override()?;

        if self.collect_override.contains(&actor) {
            Ok(())
        } else {
            Err(DomainError::TransitionNotPermitted {
                actor: actor.as_str().to_string(),
                from: from.as_str().to_string(),
                to: RequestStatus::Collected.as_str().to_string(),
            })
        }
    }

    /// Lists the statuses `actor` may move a request in `status` to.
    ///
    /// Derived from the same table [`Self::authorize`] checks, so what a
    /// client offers and what the server accepts cannot drift apart.
    #[must_use]
    pub fn available_actions(&self, actor: ActorKind, status: RequestStatus) -> Vec<RequestStatus> {
        let mut targets: Vec<RequestStatus> = Vec::new();
        for rule in &self.rules {
            if rule.actor == actor
                && rule.from == status
                && status.can_transition_to(rule.to)
                && !targets.contains(&rule.to)
            {
                targets.push(rule.to);
            }
        }
        targets
    }

    /// Returns whether the collect override is offered to `actor` for `status`.
    #[must_use]
    pub fn can_override(&self, actor: ActorKind, status: RequestStatus) -> bool {
        !status.is_terminal() && self.collect_override.contains(&actor)
    }
}
