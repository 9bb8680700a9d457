// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the request submission transaction.

use d1_store_domain::{Eligibility, NewUniformRequest, RequestPolicy, RequestStatus};
use time::Duration;

use super::{policy, seed_shirts, seed_staff, shirt_request, shirt_stock, t0};
use crate::{CreatedRequest, Persistence, RequestError};

#[test]
fn test_submission_decrements_stock_and_records_request() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 10);

    let created: CreatedRequest = persistence
        .create_uniform_request(&shirt_request(staff_id, 3), t0(), &policy())
        .unwrap();

    assert_eq!(created.requested_quantity, 3);
    assert_eq!(created.remaining_stock, 7);
    assert!(!created.is_low_stock);
    assert_eq!(created.request.status, RequestStatus::Request);
    assert_eq!(created.request.created_at, t0());
    assert!(created.request.tracking_id.starts_with(&format!("D1-20260107-S{staff_id}-")));
    assert_eq!(shirt_stock(&mut persistence), 7);
}

#[test]
fn test_uniform_limit_scenario() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", Some(2));
    seed_shirts(&mut persistence, 10);

    let too_many = persistence.create_uniform_request(&shirt_request(staff_id, 3), t0(), &policy());
    assert_eq!(
        too_many,
        Err(RequestError::UniformLimitExceeded {
            uniform_limit: 2,
            total_ordered: 0,
            requested: 3
        })
    );

    persistence
        .create_uniform_request(&shirt_request(staff_id, 2), t0(), &policy())
        .unwrap();

    let later = t0() + Duration::hours(25);
    let over = persistence.create_uniform_request(&shirt_request(staff_id, 1), later, &policy());
    assert_eq!(
        over,
        Err(RequestError::UniformLimitExceeded {
            uniform_limit: 2,
            total_ordered: 2,
            requested: 1
        })
    );
    assert_eq!(shirt_stock(&mut persistence), 8);
}

#[test]
fn test_cancelled_requests_do_not_count_toward_allowance() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", Some(2));
    seed_shirts(&mut persistence, 10);

    let created = persistence
        .create_uniform_request(&shirt_request(staff_id, 2), t0(), &policy())
        .unwrap();
    persistence
        .cancel_request(created.request.id, t0() + Duration::hours(1))
        .unwrap();

    let again = persistence.create_uniform_request(
        &shirt_request(staff_id, 2),
        t0() + Duration::hours(24),
        &policy(),
    );
    assert!(again.is_ok());
}

#[test]
fn test_cooldown_boundary_is_half_open() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 10);

    persistence
        .create_uniform_request(&shirt_request(staff_id, 1), t0(), &policy())
        .unwrap();

    let just_before = t0() + Duration::hours(24) - Duration::seconds(1);
    let blocked = persistence.create_uniform_request(&shirt_request(staff_id, 1), just_before, &policy());
    assert_eq!(
        blocked,
        Err(RequestError::CooldownActive {
            last_requested_at: t0(),
            next_allowed_at: t0() + Duration::hours(24),
            cooldown_hours: 24
        })
    );

    let at_boundary = t0() + Duration::hours(24);
    assert!(
        persistence
            .create_uniform_request(&shirt_request(staff_id, 1), at_boundary, &policy())
            .is_ok()
    );
}

#[test]
fn test_cancelled_request_still_starts_cooldown() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 10);

    let created = persistence
        .create_uniform_request(&shirt_request(staff_id, 1), t0(), &policy())
        .unwrap();
    persistence.cancel_request(created.request.id, t0()).unwrap();

    let result = persistence.create_uniform_request(
        &shirt_request(staff_id, 1),
        t0() + Duration::hours(2),
        &policy(),
    );
    assert!(matches!(result, Err(RequestError::CooldownActive { .. })));
}

#[test]
fn test_configured_cooldown_window_applies() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 10);
    let short: RequestPolicy = RequestPolicy {
        cooldown_hours: 1,
        ..RequestPolicy::default()
    };

    persistence
        .create_uniform_request(&shirt_request(staff_id, 1), t0(), &short)
        .unwrap();

    assert!(
        persistence
            .create_uniform_request(&shirt_request(staff_id, 1), t0() + Duration::hours(1), &short)
            .is_ok()
    );
}

#[test]
fn test_insufficient_stock_reports_available() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 2);

    let result = persistence.create_uniform_request(&shirt_request(staff_id, 3), t0(), &policy());

    assert_eq!(result, Err(RequestError::InsufficientStock { available: 2 }));
    assert_eq!(shirt_stock(&mut persistence), 2);
    assert!(persistence.list_requests().unwrap().is_empty());
}

#[test]
fn test_unknown_item_reports_zero_available() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    let input: NewUniformRequest =
        NewUniformRequest::new(staff_id, "999", "Nothing", 1, None).unwrap();

    let result = persistence.create_uniform_request(&input, t0(), &policy());

    assert_eq!(result, Err(RequestError::InsufficientStock { available: 0 }));
}

#[test]
fn test_unknown_staff_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_shirts(&mut persistence, 5);

    let result = persistence.create_uniform_request(&shirt_request(77, 1), t0(), &policy());

    assert_eq!(result, Err(RequestError::StaffNotFound { staff_id: 77 }));
    assert_eq!(shirt_stock(&mut persistence), 5);
}

#[test]
fn test_low_stock_flag_uses_threshold() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 6);

    let created = persistence
        .create_uniform_request(&shirt_request(staff_id, 1), t0(), &policy())
        .unwrap();

    assert_eq!(created.remaining_stock, 5);
    assert!(created.is_low_stock);
}

#[test]
fn test_tracking_collision_retries_with_fresh_id() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let alice: i64 = seed_staff(&mut persistence, "Alice", None);
    let bob: i64 = seed_staff(&mut persistence, "Bob", None);
    seed_shirts(&mut persistence, 10);

    persistence
        .create_uniform_request_with(&shirt_request(alice, 1), t0(), &policy(), || {
            String::from("D1-TAKEN")
        })
        .unwrap();

    let mut ids = ["D1-TAKEN", "D1-TAKEN", "D1-FRESH"].into_iter();
    let created = persistence
        .create_uniform_request_with(&shirt_request(bob, 2), t0(), &policy(), || {
            ids.next().unwrap_or("D1-LAST").to_string()
        })
        .unwrap();

    assert_eq!(created.request.tracking_id, "D1-FRESH");
    assert_eq!(shirt_stock(&mut persistence), 7);
    assert_eq!(persistence.list_requests().unwrap().len(), 2);
}

#[test]
fn test_tracking_collision_exhaustion_rolls_back() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let alice: i64 = seed_staff(&mut persistence, "Alice", None);
    let bob: i64 = seed_staff(&mut persistence, "Bob", None);
    seed_shirts(&mut persistence, 10);

    persistence
        .create_uniform_request_with(&shirt_request(alice, 1), t0(), &policy(), || {
            String::from("D1-TAKEN")
        })
        .unwrap();

    let mut attempts: u32 = 0;
    let result = persistence.create_uniform_request_with(
        &shirt_request(bob, 2),
        t0(),
        &policy(),
        || {
            attempts += 1;
            String::from("D1-TAKEN")
        },
    );

    assert_eq!(result, Err(RequestError::TrackingIdExhausted { attempts: 5 }));
    assert_eq!(attempts, 5);
    assert_eq!(shirt_stock(&mut persistence), 9);
    assert!(persistence.list_requests_for_staff(bob).unwrap().is_empty());
}

#[test]
fn test_cancel_restores_stock() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 10);

    let created = persistence
        .create_uniform_request(&shirt_request(staff_id, 3), t0(), &policy())
        .unwrap();
    assert_eq!(shirt_stock(&mut persistence), 7);

    let cancelled = persistence.cancel_request(created.request.id, t0()).unwrap();

    assert_eq!(cancelled.request.status, RequestStatus::Cancelled);
    assert_eq!(cancelled.restored_quantity, 3);
    assert_eq!(cancelled.stock_after, 10);
    assert_eq!(shirt_stock(&mut persistence), 10);
}

#[test]
fn test_eligibility_reports_cooldown_and_allowance() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", Some(5));
    seed_shirts(&mut persistence, 10);

    let fresh: Eligibility = persistence.staff_eligibility(staff_id, t0(), 24).unwrap();
    assert!(fresh.can_request);
    assert_eq!(fresh.remaining, Some(5));
    assert_eq!(fresh.total_requests, 0);

    persistence
        .create_uniform_request(&shirt_request(staff_id, 2), t0(), &policy())
        .unwrap();

    let after: Eligibility = persistence
        .staff_eligibility(staff_id, t0() + Duration::hours(1), 24)
        .unwrap();
    assert!(!after.can_request);
    assert_eq!(after.next_allowed_at, Some(t0() + Duration::hours(24)));
    assert_eq!(after.total_ordered, 2);
    assert_eq!(after.total_requests, 1);
    assert_eq!(after.remaining, Some(3));
}

#[test]
fn test_eligibility_totals_skip_cancelled_requests() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 10);

    let first = persistence
        .create_uniform_request(&shirt_request(staff_id, 2), t0(), &policy())
        .unwrap();
    persistence
        .create_uniform_request(&shirt_request(staff_id, 3), t0() + Duration::hours(25), &policy())
        .unwrap();
    persistence
        .cancel_request(first.request.id, t0() + Duration::hours(26))
        .unwrap();

    let totals: Eligibility = persistence
        .staff_eligibility(staff_id, t0() + Duration::hours(27), 24)
        .unwrap();
    assert_eq!(totals.total_ordered, 3);
    assert_eq!(totals.total_requests, 1);
    assert_eq!(totals.remaining, None);
}

#[test]
fn test_ordered_total_overflow_is_an_error() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let staff_id: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, i64::MAX);
    persistence
        .create_stock_item("5012345678917", "Fleece", i64::MAX)
        .unwrap();
    let fleece: NewUniformRequest =
        NewUniformRequest::new(staff_id, "5012345678917", "Fleece", i64::MAX, None).unwrap();

    persistence
        .create_uniform_request(&shirt_request(staff_id, i64::MAX), t0(), &policy())
        .unwrap();
    persistence
        .create_uniform_request(&fleece, t0() + Duration::hours(25), &policy())
        .unwrap();

    assert!(
        persistence
            .staff_eligibility(staff_id, t0() + Duration::hours(50), 24)
            .is_err()
    );
}

#[test]
fn test_eligibility_for_unknown_staff_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(matches!(
        persistence.staff_eligibility(5, t0(), 24),
        Err(crate::PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_requests_list_newest_first() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let alice: i64 = seed_staff(&mut persistence, "Alice", None);
    seed_shirts(&mut persistence, 10);

    for day in 0..3 {
        persistence
            .create_uniform_request(&shirt_request(alice, 1), t0() + Duration::days(day), &policy())
            .unwrap();
    }

    let requests = persistence.list_requests_for_staff(alice).unwrap();
    let created: Vec<_> = requests.iter().map(|r| r.created_at).collect();
    assert_eq!(
        created,
        vec![t0() + Duration::days(2), t0() + Duration::days(1), t0()]
    );
}
