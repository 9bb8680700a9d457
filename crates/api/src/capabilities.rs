// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what an operator is permitted to do without leaking
//! domain internals. They are advisory only and do not replace the checks
//! in the handlers. Request-level actions come from the transition policy,
//! the same table the handlers enforce.

use d1_store_domain::{ActorKind, RequestStatus, TransitionPolicy, UniformRequest};

use crate::auth::AuthenticatedActor;
use crate::request_response::{Capability, GlobalCapabilities};

/// Computes global capabilities for an authenticated operator.
#[must_use]
pub fn compute_global_capabilities(
    actor: &AuthenticatedActor,
    policy: &TransitionPolicy,
) -> GlobalCapabilities {
    let is_admin: bool = actor.role == ActorKind::Admin;
    let can_progress: bool = RequestStatus::ALL
        .iter()
        .any(|status| !policy.available_actions(actor.role, *status).is_empty());
    let can_override: bool = RequestStatus::ALL
        .iter()
        .any(|status| policy.can_override(actor.role, *status));

    GlobalCapabilities {
        can_import: Capability::from(is_admin),
        can_manage_limits: Capability::from(is_admin),
        can_progress_requests: Capability::from(can_progress),
        can_override_collect: Capability::from(can_override),
        can_reorder: Capability::from(is_admin),
        can_delete_stock: Capability::from(is_admin),
    }
}

/// Lists the statuses `viewer` may move `request` to, as strings.
#[must_use]
pub fn request_actions(
    request: &UniformRequest,
    viewer: ActorKind,
    policy: &TransitionPolicy,
) -> Vec<String> {
    policy
        .available_actions(viewer, request.status)
        .into_iter()
        .map(|status| status.as_str().to_string())
        .collect()
}
