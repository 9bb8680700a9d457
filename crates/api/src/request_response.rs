// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Timestamps cross the boundary as RFC 3339 strings.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Sessions
// ============================================================================

/// API request to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub login_email: String,
    pub password: String,
}

/// API response for a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque session token, also set as the session cookie.
    pub session_token: String,
    pub login_email: String,
    pub display_name: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Whether the current operator may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Allowed,
    Denied,
}

impl From<bool> for Capability {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }
}

/// Advisory capabilities of the signed-in operator.
///
/// These only gate what a client offers; every handler still checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCapabilities {
    pub can_import: Capability,
    pub can_manage_limits: Capability,
    pub can_progress_requests: Capability,
    pub can_override_collect: Capability,
    pub can_reorder: Capability,
    pub can_delete_stock: Capability,
}

/// API response describing the signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub login_email: String,
    pub display_name: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub capabilities: GlobalCapabilities,
}

// ============================================================================
// Imports
// ============================================================================

/// API request carrying an uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCsvRequest {
    /// Original file name; must end in `.csv`.
    pub file_name: Option<String>,
    /// The file contents.
    pub csv_content: String,
}

// ============================================================================
// Staff
// ============================================================================

/// A staff member as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffInfo {
    pub staff_id: i64,
    pub display_name: String,
    pub role: String,
    pub store_id: i64,
    pub store_name: String,
    /// `None` means unlimited.
    pub uniform_limit: Option<u32>,
}

/// API response listing staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStaffResponse {
    pub staff: Vec<StaffInfo>,
}

/// API request to set or clear a uniform limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUniformLimitRequest {
    /// The new limit; `None` clears it.
    pub uniform_limit: Option<i64>,
}

/// API response describing whether a staff member may submit a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub staff_id: i64,
    pub can_request: bool,
    pub cooldown_hours: u32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_requested_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_allowed_at: Option<OffsetDateTime>,
    pub uniform_limit: Option<u32>,
    pub total_ordered: i64,
    pub total_requests: i64,
    /// `None` when the allowance is unlimited.
    pub remaining: Option<i64>,
}

// ============================================================================
// Requests
// ============================================================================

/// API request to submit a uniform request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequestRequest {
    pub ean: String,
    pub name: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// A uniform request as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    pub request_id: i64,
    pub tracking_id: String,
    pub staff_id: i64,
    pub stock_item_id: i64,
    pub ean: String,
    pub item_name: String,
    pub quantity: i64,
    pub status: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Statuses the viewer may move this request to.
    pub available_actions: Vec<String>,
    /// Whether the viewer may force this request to `COLLECTED`.
    pub can_override_collect: bool,
}

/// API response for a submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequestResponse {
    pub request: RequestInfo,
    pub requested_quantity: i64,
    pub remaining_stock: i64,
    pub is_low_stock: bool,
    pub message: String,
}

/// API response listing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequestsResponse {
    pub requests: Vec<RequestInfo>,
}

/// API request to cancel one of a staff member's requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequestRequest {
    pub request_id: i64,
}

/// API response for a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequestResponse {
    pub request: RequestInfo,
    pub restored_quantity: i64,
    pub stock_after: i64,
}

/// API request to change a request's status, notes, or both.
///
/// An empty `notes` string clears the notes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateRequestRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// API request to draft a re-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub reason: String,
}

/// A pre-filled request based on a collected one. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderDraftResponse {
    pub source_tracking_id: String,
    pub staff_id: i64,
    pub ean: String,
    pub item_name: String,
    pub quantity: i64,
    pub notes: String,
}

// ============================================================================
// Stock
// ============================================================================

/// A stock item as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    pub item_id: i64,
    pub ean: String,
    pub name: String,
    pub qty: i64,
    pub is_low_stock: bool,
}

/// API response listing stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStockResponse {
    pub items: Vec<StockInfo>,
    pub low_stock_threshold: i64,
}

/// API request to delete a stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStockRequest {
    pub ean: String,
    pub name: String,
}

/// API response for a deleted stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStockResponse {
    pub ean: String,
    pub name: String,
    pub message: String,
}
