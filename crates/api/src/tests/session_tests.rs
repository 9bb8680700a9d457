// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Login, session and operator directory tests.

use d1_store_domain::ActorKind;
use time::Duration;

use crate::{
    ApiError, AuthenticatedActor, AuthenticationService, CredentialError, LoginRequest,
    LoginResponse, OperatorDirectory, current_user, login, logout,
};

use super::helpers::{
    ADMIN_LOGIN, ADMIN_PASSWORD, DISPATCH_LOGIN, DISPATCH_PASSWORD, TEST_BCRYPT_COST,
    create_test_directory, setup_test_persistence, t0, transitions,
};

fn login_request(login_email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        login_email: login_email.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn test_login_creates_valid_session() {
    let mut persistence = setup_test_persistence();
    let directory: OperatorDirectory = create_test_directory();

    let response: LoginResponse = login(
        &mut persistence,
        &directory,
        &login_request("  ADMIN@d1.example ", ADMIN_PASSWORD),
        t0(),
        Duration::hours(8),
    )
    .unwrap();

    assert_eq!(response.login_email, ADMIN_LOGIN);
    assert_eq!(response.role, "admin");
    assert_eq!(response.expires_at, t0() + Duration::hours(8));
    assert!(response.session_token.starts_with("session_"));

    let actor: AuthenticatedActor = AuthenticationService::validate_session(
        &mut persistence,
        &response.session_token,
        t0() + Duration::hours(1),
    )
    .unwrap();
    assert_eq!(actor.role, ActorKind::Admin);
    assert_eq!(actor.display_name, "Store Admin");
}

#[test]
fn test_login_rejects_wrong_password_and_unknown_login() {
    let mut persistence = setup_test_persistence();
    let directory: OperatorDirectory = create_test_directory();

    for (email, password) in [
        (ADMIN_LOGIN, DISPATCH_PASSWORD),
        ("nobody@d1.example", ADMIN_PASSWORD),
    ] {
        let result = login(
            &mut persistence,
            &directory,
            &login_request(email, password),
            t0(),
            Duration::hours(8),
        );
        assert!(matches!(result, Err(ApiError::AuthenticationFailed { .. })));
    }
}

#[test]
fn test_session_expires() {
    let mut persistence = setup_test_persistence();
    let directory: OperatorDirectory = create_test_directory();
    let response: LoginResponse = login(
        &mut persistence,
        &directory,
        &login_request(DISPATCH_LOGIN, DISPATCH_PASSWORD),
        t0(),
        Duration::hours(8),
    )
    .unwrap();

    let expired = AuthenticationService::validate_session(
        &mut persistence,
        &response.session_token,
        t0() + Duration::hours(8),
    );
    assert!(expired.is_err());

    // The expired session was removed, so even an earlier clock fails.
    let gone =
        AuthenticationService::validate_session(&mut persistence, &response.session_token, t0());
    assert!(gone.is_err());
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence = setup_test_persistence();
    let directory: OperatorDirectory = create_test_directory();
    let response: LoginResponse = login(
        &mut persistence,
        &directory,
        &login_request(ADMIN_LOGIN, ADMIN_PASSWORD),
        t0(),
        Duration::hours(8),
    )
    .unwrap();

    logout(&mut persistence, &response.session_token).unwrap();

    let result =
        AuthenticationService::validate_session(&mut persistence, &response.session_token, t0());
    assert!(result.is_err());
}

#[test]
fn test_current_user_reports_role() {
    let mut persistence = setup_test_persistence();
    let directory: OperatorDirectory = create_test_directory();
    let response: LoginResponse = login(
        &mut persistence,
        &directory,
        &login_request(DISPATCH_LOGIN, DISPATCH_PASSWORD),
        t0(),
        Duration::hours(8),
    )
    .unwrap();
    let actor: AuthenticatedActor =
        AuthenticationService::validate_session(&mut persistence, &response.session_token, t0())
            .unwrap();

    let me = current_user(&actor, &transitions());

    assert_eq!(me.role, "dispatch_admin");
    assert_eq!(me.login_email, DISPATCH_LOGIN);
    assert_eq!(me.expires_at, t0() + Duration::hours(8));
}

#[test]
fn test_directory_rejects_bad_accounts() {
    let mut directory: OperatorDirectory = OperatorDirectory::new(TEST_BCRYPT_COST);

    assert_eq!(
        directory.add("  ", "Nobody", ActorKind::Admin, ADMIN_PASSWORD),
        Err(CredentialError::MissingLogin)
    );
    assert!(matches!(
        directory.add(ADMIN_LOGIN, "Admin", ActorKind::Admin, "short"),
        Err(CredentialError::PasswordTooShort { .. })
    ));
    assert!(matches!(
        directory.add("ann@d1.example", "Ann", ActorKind::Staff, ADMIN_PASSWORD),
        Err(CredentialError::UnsupportedRole { .. })
    ));

    directory
        .add(ADMIN_LOGIN, "", ActorKind::Admin, ADMIN_PASSWORD)
        .unwrap();
    assert_eq!(
        directory.add("Admin@D1.example", "Again", ActorKind::DispatchAdmin, ADMIN_PASSWORD),
        Err(CredentialError::DuplicateLogin {
            login_email: String::from(ADMIN_LOGIN),
        })
    );

    assert_eq!(directory.len(), 1);
    let account = directory.find(ADMIN_LOGIN).unwrap();
    assert_eq!(account.display_name, ADMIN_LOGIN);
    assert!(account.verify_password(ADMIN_PASSWORD));
    assert!(!account.verify_password("not-the-password"));
}
