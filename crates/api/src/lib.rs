// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the D1 Store.
//!
//! Handlers here are transport-agnostic: they take a [`Persistence`]
//! handle, the authenticated actor where one is required, and plain DTOs,
//! and return DTOs or an [`ApiError`]. The server crate maps them onto
//! HTTP.
//!
//! [`Persistence`]: d1_store_persistence::Persistence

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

mod auth;
mod capabilities;
mod credentials;
mod error;
mod handlers;
mod imports;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, DEFAULT_SESSION_TTL};
pub use capabilities::{compute_global_capabilities, request_actions};
pub use credentials::{CredentialError, MIN_PASSWORD_LENGTH, OperatorAccount, OperatorDirectory};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error, translate_request_error,
};
pub use handlers::{
    cancel_staff_request, create_request, current_user, delete_stock, get_eligibility,
    get_request, import_csv, list_requests, list_staff, list_staff_requests, list_stock, login,
    logout, override_collect, reorder_request, set_uniform_limit, update_request,
};
pub use imports::{ImportMode, import_staff, import_stock};
pub use request_response::{
    CancelRequestRequest, CancelRequestResponse, Capability, CreateRequestRequest,
    CreateRequestResponse, CurrentUserResponse, DeleteStockRequest, DeleteStockResponse,
    EligibilityResponse, GlobalCapabilities, ImportCsvRequest, ListRequestsResponse,
    ListStaffResponse, ListStockResponse, LoginRequest, LoginResponse, ReorderDraftResponse,
    ReorderRequest, RequestInfo, SetUniformLimitRequest, StaffInfo, StockInfo,
    UpdateRequestRequest,
};
