// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Operators authenticate with a session token carried either in the
//! `d1_session` cookie set at login or in an `Authorization: Bearer`
//! header. Staff-facing routes accept requests without a session and
//! treat the caller as a staff member.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
    response::{IntoResponse, Response},
};
use d1_store_api::{ApiError, AuthenticatedActor, AuthenticationService};
use d1_store_domain::ActorKind;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "d1_session";

/// Extractor for authenticated operators.
///
/// Carries the validated actor and the raw token, which logout needs.
///
/// # Errors
///
/// Rejects with HTTP 401 when no token is present, or when the token is
/// unknown or expired.
pub struct SessionOperator(pub AuthenticatedActor, pub String);

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = session_token(&parts.headers).ok_or_else(|| {
            debug!("Request carries no session token");
            SessionError::MissingToken
        })?;

        let mut persistence = state.persistence.lock().await;
        let actor: AuthenticatedActor = AuthenticationService::validate_session(
            &mut persistence,
            &token,
            OffsetDateTime::now_utc(),
        )
        .map_err(|e| {
            warn!(error = %e, "Session validation failed");
            SessionError::InvalidSession(ApiError::from(e))
        })?;

        debug!(
            login_email = %actor.login_email,
            role = %actor.role,
            "Session validated successfully"
        );

        Ok(Self(actor, token))
    }
}

/// Extractor for routes that staff use without logging in.
///
/// A valid operator session is passed through. A missing or stale token
/// falls back to `None`, so a staff kiosk holding an expired cookie is not
/// locked out.
pub struct ViewerSession(pub Option<AuthenticatedActor>);

impl ViewerSession {
    /// Returns the role the caller acts with.
    #[must_use]
    pub fn viewer(&self) -> ActorKind {
        self.0.as_ref().map_or(ActorKind::Staff, |actor| actor.role)
    }
}

impl FromRequestParts<AppState> for ViewerSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Self(None));
        };

        let mut persistence = state.persistence.lock().await;
        match AuthenticationService::validate_session(
            &mut persistence,
            &token,
            OffsetDateTime::now_utc(),
        ) {
            Ok(actor) => Ok(Self(Some(actor))),
            Err(e) => {
                debug!(error = %e, "Ignoring stale session on staff-facing route");
                Ok(Self(None))
            }
        }
    }
}

/// Reads the session token from the bearer header, then the cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer: Option<&str> = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        let token: &str = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Builds the `Set-Cookie` value issued at login.
#[must_use]
pub fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}")
}

/// Builds the `Set-Cookie` value that clears the session at logout.
#[must_use]
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Neither a bearer header nor a session cookie was sent.
    MissingToken,
    /// Session validation failed.
    InvalidSession(ApiError),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let err: ApiError = match self {
            Self::MissingToken => ApiError::AuthenticationFailed {
                reason: String::from("Not logged in"),
            },
            Self::InvalidSession(err) => err,
        };

        HttpError::from(err).into_response()
    }
}
