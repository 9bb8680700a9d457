// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use d1_store_domain::ActorKind;
use d1_store_persistence::{Persistence, PersistenceError, SessionData, format_timestamp, parse_timestamp};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::credentials::{OperatorAccount, OperatorDirectory};
use crate::error::AuthError;

/// Default lifetime of an operator session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(8);

/// An operator with a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub login_email: String,
    pub display_name: String,
    pub role: ActorKind,
    pub expires_at: OffsetDateTime,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(
        login_email: String,
        display_name: String,
        role: ActorKind,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            login_email,
            display_name,
            role,
            expires_at,
        }
    }
}

/// Role checks for operator-only actions.
///
/// Request status changes are authorized against the transition policy
/// instead; these checks cover everything outside the request lifecycle.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an administrator.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - Name of the attempted action, for the error message
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            ActorKind::Admin => Ok(()),
            ActorKind::DispatchAdmin | ActorKind::Staff => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("the admin role"),
            }),
        }
    }

    /// Checks that the actor is an administrator or a dispatch operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a staff member.
    pub fn require_operator(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            ActorKind::Admin | ActorKind::DispatchAdmin => Ok(()),
            ActorKind::Staff => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("the admin or dispatch_admin role"),
            }),
        }
    }
}

/// Session-based authentication for configured operators.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Verifies credentials and opens a session.
    ///
    /// Expired sessions are purged on every login.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `directory` - The configured operators
    /// * `login_email` - The operator login
    /// * `password` - The plaintext password
    /// * `now` - The login instant
    /// * `ttl` - How long the session stays valid
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`)
    ///
    /// # Errors
    ///
    /// Returns an error if the login is unknown, the password does not match,
    /// or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        directory: &OperatorDirectory,
        login_email: &str,
        password: &str,
        now: OffsetDateTime,
        ttl: Duration,
    ) -> Result<(String, AuthenticatedActor), AuthError> {
        let account: &OperatorAccount = directory
            .find(login_email)
            .filter(|account| account.verify_password(password))
            .ok_or_else(|| {
                warn!(login_email = %login_email.trim(), "Rejected login");
                AuthError::AuthenticationFailed {
                    reason: String::from("Invalid login or password"),
                }
            })?;

        let purged: usize = persistence
            .delete_expired_sessions(now)
            .map_err(Self::map_persistence_error)?;
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }

        let session_token: String = Self::generate_session_token(now);
        let expires_at: OffsetDateTime = now.saturating_add(ttl);
        let session: SessionData = SessionData {
            session_token: session_token.clone(),
            role: account.role.as_str().to_string(),
            login_email: account.login_email.clone(),
            display_name: account.display_name.clone(),
            created_at: format_timestamp(now).map_err(Self::map_persistence_error)?,
            expires_at: format_timestamp(expires_at).map_err(Self::map_persistence_error)?,
        };
        persistence
            .create_session(&session)
            .map_err(Self::map_persistence_error)?;

        info!(login_email = %account.login_email, role = %account.role, "Operator signed in");

        Ok((
            session_token,
            AuthenticatedActor::new(
                account.login_email.clone(),
                account.display_name.clone(),
                account.role,
                expires_at,
            ),
        ))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// An expired session is deleted as it is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown, expired or unreadable.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(Self::map_persistence_error)?;
        if now >= expires_at {
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let role: ActorKind =
            ActorKind::from_str(&session.role).map_err(|e| AuthError::AuthenticationFailed {
                reason: e.to_string(),
            })?;

        Ok(AuthenticatedActor::new(
            session.login_email,
            session.display_name,
            role,
            expires_at,
        ))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    fn generate_session_token(now: OffsetDateTime) -> String {
        format!(
            "session_{}_{}",
            now.unix_timestamp_nanos(),
            rand::random::<u64>()
        )
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionNotFound(reason) => AuthError::AuthenticationFailed { reason },
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
