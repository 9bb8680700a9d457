// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers take the instant they act at as a parameter so callers (and
//! tests) control time. Staff-facing handlers take the viewer's
//! [`ActorKind`]; callers without a session pass [`ActorKind::Staff`].

use d1_store::{ImportReport, ImportType};
use d1_store_domain::{
    ActorKind, Eligibility, NewUniformRequest, ReorderDraft, RequestPolicy, RequestStatus, Staff,
    StockItem, Store, TransitionPolicy, UniformRequest, validate_uniform_limit,
};
use d1_store_persistence::{CancelledRequest, CreatedRequest, Persistence};
use std::collections::HashMap;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::capabilities::{compute_global_capabilities, request_actions};
use crate::credentials::OperatorDirectory;
use crate::error::{
    ApiError, translate_domain_error, translate_persistence_error, translate_request_error,
};
use crate::imports::{ImportMode, import_staff, import_stock};
use crate::request_response::{
    CancelRequestRequest, CancelRequestResponse, CreateRequestRequest, CreateRequestResponse,
    CurrentUserResponse, DeleteStockRequest, DeleteStockResponse, EligibilityResponse,
    ImportCsvRequest, ListRequestsResponse, ListStaffResponse, ListStockResponse, LoginRequest,
    LoginResponse, ReorderDraftResponse, ReorderRequest, RequestInfo, SetUniformLimitRequest,
    StaffInfo, StockInfo, UpdateRequestRequest,
};

// ============================================================================
// Helpers
// ============================================================================

fn request_info(
    request: UniformRequest,
    viewer: ActorKind,
    transitions: &TransitionPolicy,
) -> RequestInfo {
    RequestInfo {
        available_actions: request_actions(&request, viewer, transitions),
        can_override_collect: transitions.can_override(viewer, request.status),
        request_id: request.id,
        tracking_id: request.tracking_id,
        staff_id: request.staff_id,
        stock_item_id: request.stock_item_id,
        ean: request.ean,
        item_name: request.item_name,
        quantity: request.quantity,
        status: request.status.as_str().to_string(),
        notes: request.notes,
        created_at: request.created_at,
        updated_at: request.updated_at,
    }
}

fn load_request(persistence: &mut Persistence, request_id: i64) -> Result<UniformRequest, ApiError> {
    persistence
        .get_request(request_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Request"),
            message: format!("Request {request_id} does not exist"),
        })
}

fn load_staff(persistence: &mut Persistence, staff_id: i64) -> Result<Staff, ApiError> {
    persistence
        .get_staff(staff_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Staff"),
            message: format!("Staff member {staff_id} does not exist"),
        })
}

fn staff_info(staff: Staff, store_names: &HashMap<i64, String>) -> StaffInfo {
    StaffInfo {
        store_name: store_names.get(&staff.store_id).cloned().unwrap_or_default(),
        staff_id: staff.id,
        display_name: staff.display_name,
        role: staff.role.as_str().to_string(),
        store_id: staff.store_id,
        uniform_limit: staff.uniform_limit,
    }
}

fn store_names(persistence: &mut Persistence) -> Result<HashMap<i64, String>, ApiError> {
    let stores: Vec<Store> = persistence
        .list_stores()
        .map_err(translate_persistence_error)?;
    Ok(stores.into_iter().map(|store| (store.id, store.name)).collect())
}

// ============================================================================
// Sessions
// ============================================================================

/// Signs an operator in.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `directory` - The configured operators
/// * `request` - The login request
/// * `now` - The login instant
/// * `ttl` - Session lifetime
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` if the credentials do not match.
pub fn login(
    persistence: &mut Persistence,
    directory: &OperatorDirectory,
    request: &LoginRequest,
    now: OffsetDateTime,
    ttl: Duration,
) -> Result<LoginResponse, ApiError> {
    let (session_token, actor): (String, AuthenticatedActor) = AuthenticationService::login(
        persistence,
        directory,
        &request.login_email,
        &request.password,
        now,
        ttl,
    )?;

    Ok(LoginResponse {
        session_token,
        login_email: actor.login_email,
        display_name: actor.display_name,
        role: actor.role.as_str().to_string(),
        expires_at: actor.expires_at,
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the signed-in operator and what they may do.
#[must_use]
pub fn current_user(
    actor: &AuthenticatedActor,
    transitions: &TransitionPolicy,
) -> CurrentUserResponse {
    CurrentUserResponse {
        login_email: actor.login_email.clone(),
        display_name: actor.display_name.clone(),
        role: actor.role.as_str().to_string(),
        expires_at: actor.expires_at,
        capabilities: compute_global_capabilities(actor, transitions),
    }
}

// ============================================================================
// Imports
// ============================================================================

/// Imports or previews a staff or stock CSV upload.
///
/// Only Admin actors may import. The report is returned even when every
/// row fails; only an unusable upload is an error.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the upload is unusable,
/// or existing state cannot be loaded.
pub fn import_csv(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    import_type: ImportType,
    request: &ImportCsvRequest,
    mode: ImportMode,
    now: OffsetDateTime,
) -> Result<ImportReport, ApiError> {
    let action: &str = match mode {
        ImportMode::Commit => "import",
        ImportMode::Preview => "preview import",
    };
    AuthorizationService::require_admin(actor, action)?;

    match import_type {
        ImportType::Staff => import_staff(persistence, request, mode, now),
        ImportType::Stock => import_stock(persistence, request, mode, now),
    }
}

// ============================================================================
// Staff
// ============================================================================

/// Lists all staff with their store names.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub fn list_staff(persistence: &mut Persistence) -> Result<ListStaffResponse, ApiError> {
    let names: HashMap<i64, String> = store_names(persistence)?;
    let staff: Vec<Staff> = persistence.list_staff().map_err(translate_persistence_error)?;

    Ok(ListStaffResponse {
        staff: staff
            .into_iter()
            .map(|member| staff_info(member, &names))
            .collect(),
    })
}

/// Sets or clears a staff member's uniform limit.
///
/// This is the only path that changes an allowance; submitting a request
/// only checks it.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the limit is not a
/// positive integer, or the staff member does not exist.
pub fn set_uniform_limit(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    staff_id: i64,
    request: &SetUniformLimitRequest,
) -> Result<StaffInfo, ApiError> {
    AuthorizationService::require_admin(actor, "set uniform limit")?;

    let uniform_limit: Option<u32> = request
        .uniform_limit
        .map(validate_uniform_limit)
        .transpose()
        .map_err(translate_domain_error)?;

    load_staff(persistence, staff_id)?;
    let staff: Staff = persistence
        .set_uniform_limit(staff_id, uniform_limit)
        .map_err(translate_persistence_error)?;

    info!(
        staff_id,
        ?uniform_limit,
        operator = %actor.login_email,
        "Uniform limit updated"
    );

    let names: HashMap<i64, String> = store_names(persistence)?;
    Ok(staff_info(staff, &names))
}

/// Reports whether a staff member may submit a request now.
///
/// # Errors
///
/// Returns an error if the staff member does not exist.
pub fn get_eligibility(
    persistence: &mut Persistence,
    staff_id: i64,
    policy: &RequestPolicy,
    now: OffsetDateTime,
) -> Result<EligibilityResponse, ApiError> {
    load_staff(persistence, staff_id)?;
    let eligibility: Eligibility = persistence
        .staff_eligibility(staff_id, now, policy.cooldown_hours)
        .map_err(translate_persistence_error)?;

    Ok(EligibilityResponse {
        staff_id,
        can_request: eligibility.can_request,
        cooldown_hours: eligibility.cooldown_hours,
        last_requested_at: eligibility.last_requested_at,
        next_allowed_at: eligibility.next_allowed_at,
        uniform_limit: eligibility.uniform_limit,
        total_ordered: eligibility.total_ordered,
        total_requests: eligibility.total_requests,
        remaining: eligibility.remaining,
    })
}

// ============================================================================
// Requests
// ============================================================================

/// Submits a uniform request for a staff member.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `staff_id` - The requesting staff member
/// * `request` - Item, quantity and notes
/// * `viewer` - Who is looking at the response, for the offered actions
/// * `policy` - Cooldown, low-stock and tracking settings
/// * `transitions` - The transition policy
/// * `now` - The submission instant
///
/// # Errors
///
/// Returns an error if the input is invalid, the staff member does not
/// exist, the allowance or cooldown blocks the request, or stock is short.
pub fn create_request(
    persistence: &mut Persistence,
    staff_id: i64,
    request: &CreateRequestRequest,
    viewer: ActorKind,
    policy: &RequestPolicy,
    transitions: &TransitionPolicy,
    now: OffsetDateTime,
) -> Result<CreateRequestResponse, ApiError> {
    let input: NewUniformRequest = NewUniformRequest::new(
        staff_id,
        &request.ean,
        &request.name,
        request.quantity,
        request.notes.as_deref(),
    )
    .map_err(translate_domain_error)?;

    let created: CreatedRequest = persistence
        .create_uniform_request(&input, now, policy)
        .map_err(translate_request_error)?;

    let message: String = format!(
        "Request {} submitted for {} x {}",
        created.request.tracking_id, created.requested_quantity, created.request.item_name
    );
    Ok(CreateRequestResponse {
        request: request_info(created.request, viewer, transitions),
        requested_quantity: created.requested_quantity,
        remaining_stock: created.remaining_stock,
        is_low_stock: created.is_low_stock,
        message,
    })
}

/// Lists one staff member's requests, newest first.
///
/// # Errors
///
/// Returns an error if the staff member does not exist.
pub fn list_staff_requests(
    persistence: &mut Persistence,
    staff_id: i64,
    viewer: ActorKind,
    transitions: &TransitionPolicy,
) -> Result<ListRequestsResponse, ApiError> {
    load_staff(persistence, staff_id)?;
    let requests: Vec<UniformRequest> = persistence
        .list_requests_for_staff(staff_id)
        .map_err(translate_persistence_error)?;

    Ok(ListRequestsResponse {
        requests: requests
            .into_iter()
            .map(|request| request_info(request, viewer, transitions))
            .collect(),
    })
}

/// Cancels one of a staff member's own requests and restores its stock.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if the request belongs to someone else
/// or the viewer may not cancel, `ApiError::Conflict` if the request has
/// left `REQUEST`, or `ApiError::ResourceNotFound` if it does not exist.
pub fn cancel_staff_request(
    persistence: &mut Persistence,
    staff_id: i64,
    request: &CancelRequestRequest,
    viewer: ActorKind,
    transitions: &TransitionPolicy,
    now: OffsetDateTime,
) -> Result<CancelRequestResponse, ApiError> {
    let existing: UniformRequest = load_request(persistence, request.request_id)?;
    if existing.staff_id != staff_id {
        return Err(ApiError::Unauthorized {
            action: format!("cancel request {}", existing.tracking_id),
            required_role: String::from("the staff member who submitted it"),
        });
    }

    transitions
        .authorize(viewer, existing.status, RequestStatus::Cancelled)
        .map_err(translate_domain_error)?;

    let cancelled: CancelledRequest = persistence
        .cancel_request(existing.id, now)
        .map_err(translate_persistence_error)?;

    Ok(CancelRequestResponse {
        request: request_info(cancelled.request, viewer, transitions),
        restored_quantity: cancelled.restored_quantity,
        stock_after: cancelled.stock_after,
    })
}

/// Lists every request, newest first.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub fn list_requests(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    transitions: &TransitionPolicy,
) -> Result<ListRequestsResponse, ApiError> {
    let requests: Vec<UniformRequest> =
        persistence.list_requests().map_err(translate_persistence_error)?;

    Ok(ListRequestsResponse {
        requests: requests
            .into_iter()
            .map(|request| request_info(request, actor.role, transitions))
            .collect(),
    })
}

/// Returns one request.
///
/// # Errors
///
/// Returns an error if the request does not exist.
pub fn get_request(
    persistence: &mut Persistence,
    request_id: i64,
    viewer: ActorKind,
    transitions: &TransitionPolicy,
) -> Result<RequestInfo, ApiError> {
    let request: UniformRequest = load_request(persistence, request_id)?;
    Ok(request_info(request, viewer, transitions))
}

/// Changes a request's status, its notes, or both.
///
/// The status change is checked against the transition policy for the
/// actor. Moving to `CANCELLED` restores stock. Notes may be edited at any
/// status; an empty string clears them.
///
/// # Errors
///
/// Returns an error if neither field is given, the status is unknown or
/// not permitted for the actor, or the request changed status meanwhile.
pub fn update_request(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request_id: i64,
    request: &UpdateRequestRequest,
    transitions: &TransitionPolicy,
    now: OffsetDateTime,
) -> Result<RequestInfo, ApiError> {
    AuthorizationService::require_operator(actor, "update request")?;

    if request.status.is_none() && request.notes.is_none() {
        return Err(ApiError::InvalidInput {
            field: String::from("status"),
            message: String::from("Provide a status, notes, or both"),
        });
    }

    let target: Option<RequestStatus> = request
        .status
        .as_deref()
        .map(|status| RequestStatus::from_str(&status.trim().to_uppercase()))
        .transpose()
        .map_err(translate_domain_error)?;

    let current: UniformRequest = load_request(persistence, request_id)?;
    let from: RequestStatus = current.status;

    if let Some(target) = target {
        transitions
            .authorize(actor.role, from, target)
            .map_err(translate_domain_error)?;
    }

    let updated: UniformRequest = persistence
        .update_request(
            request_id,
            target.map(|to| (from, to)),
            request.notes.as_deref(),
            now,
        )
        .map_err(translate_persistence_error)?;

    if let Some(target) = target {
        info!(
            tracking_id = %updated.tracking_id,
            %from,
            to = %target,
            operator = %actor.login_email,
            "Request status changed"
        );
    }

    Ok(request_info(updated, actor.role, transitions))
}

/// Forces a non-terminal request straight to `COLLECTED`.
///
/// # Errors
///
/// Returns an error if the actor may not override, or the request is
/// already collected or cancelled.
pub fn override_collect(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request_id: i64,
    transitions: &TransitionPolicy,
    now: OffsetDateTime,
) -> Result<RequestInfo, ApiError> {
    let current: UniformRequest = load_request(persistence, request_id)?;
    transitions
        .authorize_collect_override(actor.role, current.status)
        .map_err(translate_domain_error)?;

    let collected: UniformRequest = persistence
        .override_collect(request_id, now)
        .map_err(translate_persistence_error)?;

    info!(
        tracking_id = %collected.tracking_id,
        from = %current.status,
        operator = %actor.login_email,
        "Request marked collected by override"
    );
    Ok(request_info(collected, actor.role, transitions))
}

/// Drafts a re-order of a collected request. Nothing is written.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the request is not
/// `COLLECTED`, or the reason is blank.
pub fn reorder_request(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request_id: i64,
    request: &ReorderRequest,
) -> Result<ReorderDraftResponse, ApiError> {
    AuthorizationService::require_admin(actor, "re-order")?;

    let source: UniformRequest = load_request(persistence, request_id)?;
    let draft: ReorderDraft =
        ReorderDraft::from_collected(&source, &request.reason).map_err(translate_domain_error)?;

    Ok(ReorderDraftResponse {
        source_tracking_id: draft.source_tracking_id,
        staff_id: draft.staff_id,
        ean: draft.ean,
        item_name: draft.item_name,
        quantity: draft.quantity,
        notes: draft.notes,
    })
}

// ============================================================================
// Stock
// ============================================================================

/// Lists stock with a low-stock flag per item.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub fn list_stock(
    persistence: &mut Persistence,
    policy: &RequestPolicy,
) -> Result<ListStockResponse, ApiError> {
    let items: Vec<StockItem> = persistence.list_stock().map_err(translate_persistence_error)?;

    Ok(ListStockResponse {
        items: items
            .into_iter()
            .map(|item| StockInfo {
                is_low_stock: policy.is_low_stock(item.qty),
                item_id: item.id,
                ean: item.ean,
                name: item.name,
                qty: item.qty,
            })
            .collect(),
        low_stock_threshold: policy.low_stock_threshold,
    })
}

/// Deletes a stock item that no request refers to.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the item does not exist,
/// or requests still reference it.
pub fn delete_stock(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &DeleteStockRequest,
) -> Result<DeleteStockResponse, ApiError> {
    AuthorizationService::require_admin(actor, "delete stock")?;

    let ean: &str = request.ean.trim();
    let name: &str = request.name.trim();
    persistence
        .delete_stock_item(ean, name)
        .map_err(translate_persistence_error)?;

    info!(ean, name, operator = %actor.login_email, "Stock item deleted");

    Ok(DeleteStockResponse {
        ean: ean.to_string(),
        name: name.to_string(),
        message: format!("Deleted {name} ({ean})"),
    })
}
