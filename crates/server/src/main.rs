// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use d1_store::{ImportReport, ImportType};
use d1_store_api::{
    ApiError, AuthenticatedActor, CancelRequestRequest, CancelRequestResponse, CreateRequestRequest,
    CreateRequestResponse, CredentialError, CurrentUserResponse, DeleteStockRequest,
    DeleteStockResponse, EligibilityResponse, ImportCsvRequest, ImportMode, ListRequestsResponse,
    ListStaffResponse, ListStockResponse, LoginRequest, LoginResponse, OperatorDirectory,
    ReorderDraftResponse, ReorderRequest, RequestInfo, SetUniformLimitRequest, StaffInfo,
    UpdateRequestRequest, cancel_staff_request, create_request, current_user, delete_stock,
    get_eligibility, get_request, import_csv, list_requests, list_staff, list_staff_requests,
    list_stock, login, logout, override_collect, reorder_request, set_uniform_limit,
    update_request,
};
use d1_store_domain::{
    ActorKind, DEFAULT_COOLDOWN_HOURS, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TRACKING_PREFIX,
    RequestPolicy, TransitionPolicy,
};
use d1_store_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::session::{SessionOperator, ViewerSession, expired_session_cookie, session_cookie};

/// Largest request body accepted, sized for CSV uploads.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// D1 Store Server - HTTP server for the D1 Store uniform inventory system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "D1_DATABASE")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "D1_PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, env = "D1_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Minimum hours between two requests from the same staff member
    #[arg(long, env = "D1_COOLDOWN_HOURS", default_value_t = DEFAULT_COOLDOWN_HOURS)]
    cooldown_hours: u32,

    /// Stock quantity at or below which an item is flagged as low
    #[arg(long, env = "D1_LOW_STOCK_THRESHOLD", default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
    low_stock_threshold: i64,

    /// Prefix of generated tracking identifiers
    #[arg(long, env = "D1_TRACKING_PREFIX", default_value = DEFAULT_TRACKING_PREFIX)]
    tracking_prefix: String,

    /// Lifetime of an operator session, in hours
    #[arg(long, env = "D1_SESSION_TTL_HOURS", default_value_t = 8)]
    session_ttl_hours: i64,

    /// Login email of the admin account
    #[arg(long, env = "D1_ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// Password of the admin account
    #[arg(long, env = "D1_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Display name of the admin account
    #[arg(long, env = "D1_ADMIN_NAME", default_value = "")]
    admin_name: String,

    /// Login email of the dispatch admin account
    #[arg(long, env = "D1_DISPATCH_EMAIL")]
    dispatch_email: Option<String>,

    /// Password of the dispatch admin account
    #[arg(long, env = "D1_DISPATCH_PASSWORD", hide_env_values = true)]
    dispatch_password: Option<String>,

    /// Display name of the dispatch admin account
    #[arg(long, env = "D1_DISPATCH_NAME", default_value = "")]
    dispatch_name: String,
}

/// Application state shared across handlers.
///
/// The persistence layer sits behind a Mutex so one handler at a time
/// holds the connection.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Operator accounts allowed to log in.
    directory: Arc<OperatorDirectory>,
    /// Cooldown, low-stock and tracking-id settings.
    policy: Arc<RequestPolicy>,
    /// Who may move a request between which statuses.
    transitions: Arc<TransitionPolicy>,
    /// Lifetime of a new session.
    session_ttl: Duration,
}

/// Error response body.
///
/// Only the fields that belong to `kind` are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ErrorResponse {
    /// Human-readable message.
    error: String,
    /// Stable machine-readable error name.
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uniform_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_ordered: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requested: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cooldown_hours: Option<u32>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    last_requested_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    next_allowed_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_status: Option<String>,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The JSON body.
    body: ErrorResponse,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let mut body: ErrorResponse = ErrorResponse {
            error: err.to_string(),
            kind: err.kind().to_string(),
            ..ErrorResponse::default()
        };

        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { field, .. } => {
                body.field = Some(field);
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidUpload { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { current_status, .. } => {
                body.current_status = current_status;
                StatusCode::CONFLICT
            }
            ApiError::UniformLimitExceeded {
                uniform_limit,
                total_ordered,
                requested,
            } => {
                body.uniform_limit = Some(uniform_limit);
                body.total_ordered = Some(total_ordered);
                body.requested = Some(requested);
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::CooldownActive {
                cooldown_hours,
                last_requested_at,
                next_allowed_at,
            } => {
                body.cooldown_hours = Some(cooldown_hours);
                body.last_requested_at = Some(last_requested_at);
                body.next_allowed_at = Some(next_allowed_at);
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::InsufficientStock { available } => {
                body.available = Some(available);
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self { status, body }
    }
}

/// Response body for logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogoutResponse {
    message: String,
}

/// Response body for the liveness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Parses the `{kind}` path segment of the import routes.
fn parse_import_type(kind: &str) -> Result<ImportType, HttpError> {
    match kind {
        "staff" => Ok(ImportType::Staff),
        "stock" => Ok(ImportType::Stock),
        _ => Err(HttpError::from(ApiError::ResourceNotFound {
            resource_type: String::from("Import type"),
            message: format!("Unknown import type '{kind}'. Must be 'staff' or 'stock'"),
        })),
    }
}

// ========================================================================
// Sessions
// ========================================================================

/// Handler for POST `/api/session/login`.
///
/// Returns the session token in the body and sets the session cookie.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, HttpError> {
    info!(login_email = %req.login_email, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = login(
        &mut persistence,
        &app_state.directory,
        &req,
        OffsetDateTime::now_utc(),
        app_state.session_ttl,
    )?;

    let cookie: String = session_cookie(
        &response.session_token,
        app_state.session_ttl.whole_seconds(),
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// Handler for POST `/api/session/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, token): SessionOperator,
) -> Result<Response, HttpError> {
    info!(login_email = %actor.login_email, "Handling logout request");

    let mut persistence = app_state.persistence.lock().await;
    logout(&mut persistence, &token)?;

    let body: LogoutResponse = LogoutResponse {
        message: String::from("Logged out"),
    };
    Ok(([(header::SET_COOKIE, expired_session_cookie())], Json(body)).into_response())
}

/// Handler for GET `/api/session/current`.
async fn handle_current_user(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Json<CurrentUserResponse> {
    Json(current_user(&actor, &app_state.transitions))
}

// ========================================================================
// Imports
// ========================================================================

/// Runs an import in `mode` on behalf of a session operator.
async fn run_import(
    app_state: &AppState,
    actor: &AuthenticatedActor,
    kind: &str,
    req: &ImportCsvRequest,
    mode: ImportMode,
) -> Result<Json<ImportReport>, HttpError> {
    let import_type: ImportType = parse_import_type(kind)?;
    info!(
        operator = %actor.login_email,
        import_type = import_type.as_str(),
        file_name = req.file_name.as_deref().unwrap_or(""),
        ?mode,
        "Handling import request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let report: ImportReport = import_csv(
        &mut persistence,
        actor,
        import_type,
        req,
        mode,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(report))
}

/// Handler for POST `/api/import/{kind}`.
async fn handle_import(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(kind): Path<String>,
    Json(req): Json<ImportCsvRequest>,
) -> Result<Json<ImportReport>, HttpError> {
    run_import(&app_state, &actor, &kind, &req, ImportMode::Commit).await
}

/// Handler for POST `/api/import/{kind}/preview`.
///
/// Same report as a real import, with nothing written.
async fn handle_import_preview(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(kind): Path<String>,
    Json(req): Json<ImportCsvRequest>,
) -> Result<Json<ImportReport>, HttpError> {
    run_import(&app_state, &actor, &kind, &req, ImportMode::Preview).await
}

// ========================================================================
// Staff
// ========================================================================

/// Handler for GET `/api/staff`.
async fn handle_list_staff(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListStaffResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_staff(&mut persistence)?))
}

/// Handler for PATCH `/api/staff/{id}/limit`.
async fn handle_set_uniform_limit(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(staff_id): Path<i64>,
    Json(req): Json<SetUniformLimitRequest>,
) -> Result<Json<StaffInfo>, HttpError> {
    info!(
        operator = %actor.login_email,
        staff_id,
        uniform_limit = ?req.uniform_limit,
        "Handling set_uniform_limit request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(set_uniform_limit(
        &mut persistence,
        &actor,
        staff_id,
        &req,
    )?))
}

/// Handler for GET `/api/staff/{id}/limit`.
async fn handle_get_eligibility(
    AxumState(app_state): AxumState<AppState>,
    Path(staff_id): Path<i64>,
) -> Result<Json<EligibilityResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_eligibility(
        &mut persistence,
        staff_id,
        &app_state.policy,
        OffsetDateTime::now_utc(),
    )?))
}

/// Handler for POST `/api/staff/{id}/requests`.
async fn handle_create_request(
    AxumState(app_state): AxumState<AppState>,
    viewer: ViewerSession,
    Path(staff_id): Path<i64>,
    Json(req): Json<CreateRequestRequest>,
) -> Result<Json<CreateRequestResponse>, HttpError> {
    info!(
        staff_id,
        ean = %req.ean,
        quantity = req.quantity,
        "Handling create_request request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_request(
        &mut persistence,
        staff_id,
        &req,
        viewer.viewer(),
        &app_state.policy,
        &app_state.transitions,
        OffsetDateTime::now_utc(),
    )?))
}

/// Handler for GET `/api/staff/{id}/requests`.
async fn handle_list_staff_requests(
    AxumState(app_state): AxumState<AppState>,
    viewer: ViewerSession,
    Path(staff_id): Path<i64>,
) -> Result<Json<ListRequestsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_staff_requests(
        &mut persistence,
        staff_id,
        viewer.viewer(),
        &app_state.transitions,
    )?))
}

/// Handler for POST `/api/staff/{id}/requests/cancel`.
async fn handle_cancel_staff_request(
    AxumState(app_state): AxumState<AppState>,
    viewer: ViewerSession,
    Path(staff_id): Path<i64>,
    Json(req): Json<CancelRequestRequest>,
) -> Result<Json<CancelRequestResponse>, HttpError> {
    info!(
        staff_id,
        request_id = req.request_id,
        "Handling cancel request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(cancel_staff_request(
        &mut persistence,
        staff_id,
        &req,
        viewer.viewer(),
        &app_state.transitions,
        OffsetDateTime::now_utc(),
    )?))
}

// ========================================================================
// Requests
// ========================================================================

/// Handler for GET `/api/requests`.
async fn handle_list_requests(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<ListRequestsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_requests(
        &mut persistence,
        &actor,
        &app_state.transitions,
    )?))
}

/// Handler for GET `/api/requests/{id}`.
async fn handle_get_request(
    AxumState(app_state): AxumState<AppState>,
    viewer: ViewerSession,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_request(
        &mut persistence,
        request_id,
        viewer.viewer(),
        &app_state.transitions,
    )?))
}

/// Handler for PATCH `/api/requests/{id}`.
async fn handle_update_request(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(request_id): Path<i64>,
    Json(req): Json<UpdateRequestRequest>,
) -> Result<Json<RequestInfo>, HttpError> {
    info!(
        operator = %actor.login_email,
        request_id,
        status = ?req.status,
        "Handling update_request request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_request(
        &mut persistence,
        &actor,
        request_id,
        &req,
        &app_state.transitions,
        OffsetDateTime::now_utc(),
    )?))
}

/// Handler for POST `/api/requests/{id}/collect`.
async fn handle_override_collect(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(override_collect(
        &mut persistence,
        &actor,
        request_id,
        &app_state.transitions,
        OffsetDateTime::now_utc(),
    )?))
}

/// Handler for POST `/api/requests/{id}/reorder`.
async fn handle_reorder_request(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(request_id): Path<i64>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<ReorderDraftResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(reorder_request(
        &mut persistence,
        &actor,
        request_id,
        &req,
    )?))
}

// ========================================================================
// Stock
// ========================================================================

/// Handler for GET `/api/stock`.
async fn handle_list_stock(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListStockResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_stock(&mut persistence, &app_state.policy)?))
}

/// Handler for DELETE `/api/stock`.
async fn handle_delete_stock(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<DeleteStockRequest>,
) -> Result<Json<DeleteStockResponse>, HttpError> {
    info!(
        operator = %actor.login_email,
        ean = %req.ean,
        name = %req.name,
        "Handling delete_stock request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(delete_stock(&mut persistence, &actor, &req)?))
}

/// Handler for GET `/health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/session/login", post(handle_login))
        .route("/api/session/logout", post(handle_logout))
        .route("/api/session/current", get(handle_current_user))
        .route("/api/import/{kind}", post(handle_import))
        .route("/api/import/{kind}/preview", post(handle_import_preview))
        .route("/api/staff", get(handle_list_staff))
        .route(
            "/api/staff/{id}/limit",
            get(handle_get_eligibility).patch(handle_set_uniform_limit),
        )
        .route(
            "/api/staff/{id}/requests",
            get(handle_list_staff_requests).post(handle_create_request),
        )
        .route(
            "/api/staff/{id}/requests/cancel",
            post(handle_cancel_staff_request),
        )
        .route("/api/requests", get(handle_list_requests))
        .route(
            "/api/requests/{id}",
            get(handle_get_request).patch(handle_update_request),
        )
        .route("/api/requests/{id}/collect", post(handle_override_collect))
        .route("/api/requests/{id}/reorder", post(handle_reorder_request))
        .route(
            "/api/stock",
            get(handle_list_stock).delete(handle_delete_stock),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}

/// Builds the request policy from the command line.
fn build_policy(args: &Args) -> RequestPolicy {
    RequestPolicy {
        cooldown_hours: args.cooldown_hours,
        low_stock_threshold: args.low_stock_threshold,
        tracking_prefix: args.tracking_prefix.trim().to_uppercase(),
        ..RequestPolicy::default()
    }
}

/// Hashes the configured operator credentials.
fn build_directory(args: &Args) -> Result<OperatorDirectory, CredentialError> {
    let mut directory: OperatorDirectory = OperatorDirectory::default();
    let accounts = [
        (
            &args.admin_email,
            &args.admin_password,
            &args.admin_name,
            ActorKind::Admin,
        ),
        (
            &args.dispatch_email,
            &args.dispatch_password,
            &args.dispatch_name,
            ActorKind::DispatchAdmin,
        ),
    ];

    for (email, password, name, role) in accounts {
        match (email, password) {
            (Some(email), Some(password)) => {
                directory.add(email, name, role, password)?;
                info!(login_email = %email, %role, "Configured operator account");
            }
            (None, None) => {}
            _ => warn!(%role, "Operator account needs both an email and a password; skipping"),
        }
    }

    if directory.is_empty() {
        warn!("No operator accounts configured; operator routes will reject every request");
    }

    Ok(directory)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing D1 Store Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let policy: RequestPolicy = build_policy(&args);
    info!(
        cooldown_hours = policy.cooldown_hours,
        low_stock_threshold = policy.low_stock_threshold,
        tracking_prefix = %policy.tracking_prefix,
        "Request policy loaded"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        directory: Arc::new(build_directory(&args)?),
        policy: Arc::new(policy),
        transitions: Arc::new(TransitionPolicy::default()),
        session_ttl: Duration::hours(args.session_ttl_hours),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
