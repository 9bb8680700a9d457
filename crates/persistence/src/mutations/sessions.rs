// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::data_models::SessionData;
use crate::diesel_schema::sessions;
use crate::error::PersistenceError;

/// Stores a new session.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session: &SessionData,
) -> Result<(), PersistenceError> {
    debug!(role = %session.role, expires_at = %session.expires_at, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(&session.session_token),
            sessions::role.eq(&session.role),
            sessions::login_email.eq(&session.login_email),
            sessions::display_name.eq(&session.display_name),
            sessions::created_at.eq(&session.created_at),
            sessions::expires_at.eq(&session.expires_at),
        ))
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token. Deleting an unknown token is not an error.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(conn: &mut SqliteConnection, session_token: &str) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
        .execute(conn)?;

    Ok(())
}

/// Deletes sessions that expired before `now`.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `now` - Current time in the stored timestamp format
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(conn: &mut SqliteConnection, now: &str) -> Result<usize, PersistenceError> {
    let rows_affected: usize =
        diesel::delete(sessions::table.filter(sessions::expires_at.lt(now))).execute(conn)?;

    info!(rows_affected, "Deleted expired sessions");
    Ok(rows_affected)
}
