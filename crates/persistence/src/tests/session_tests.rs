// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;

use super::t0;
use crate::{Persistence, SessionData, format_timestamp};

fn session(token: &str, expires_in: Duration) -> SessionData {
    SessionData {
        session_token: token.to_string(),
        role: String::from("admin"),
        login_email: String::from("admin@d1.example"),
        display_name: String::from("Admin"),
        created_at: format_timestamp(t0()).unwrap(),
        expires_at: format_timestamp(t0() + expires_in).unwrap(),
    }
}

#[test]
fn test_session_round_trip_and_logout() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let stored: SessionData = session("session_1", Duration::hours(8));

    persistence.create_session(&stored).unwrap();
    assert_eq!(
        persistence.get_session_by_token("session_1").unwrap(),
        Some(stored)
    );

    persistence.delete_session("session_1").unwrap();
    assert_eq!(persistence.get_session_by_token("session_1").unwrap(), None);
}

#[test]
fn test_expired_sessions_are_purged() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence
        .create_session(&session("short", Duration::hours(1)))
        .unwrap();
    persistence
        .create_session(&session("long", Duration::hours(8)))
        .unwrap();

    let purged: usize = persistence
        .delete_expired_sessions(t0() + Duration::hours(2))
        .unwrap();

    assert_eq!(purged, 1);
    assert!(persistence.get_session_by_token("short").unwrap().is_none());
    assert!(persistence.get_session_by_token("long").unwrap().is_some());
}
