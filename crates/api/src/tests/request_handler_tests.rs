// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request submission, cancellation and status handler tests.

use d1_store_domain::ActorKind;
use time::Duration;

use crate::{
    ApiError, CancelRequestRequest, CreateRequestResponse, RequestInfo, ReorderRequest,
    UpdateRequestRequest, cancel_staff_request, create_request, get_eligibility, get_request,
    list_requests, list_staff_requests, override_collect, reorder_request, update_request,
};

use super::helpers::{
    create_test_admin, create_test_dispatcher, policy, seed_shirts, seed_staff, setup_test_persistence,
    shirt_order, shirt_stock, t0, transitions,
};

#[test]
fn test_create_request_decrements_stock_and_flags_low_stock() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 8);

    let response: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(3),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();

    assert_eq!(response.request.status, "REQUEST");
    assert_eq!(response.requested_quantity, 3);
    assert_eq!(response.remaining_stock, 5);
    assert!(response.is_low_stock);
    assert!(
        response
            .request
            .tracking_id
            .starts_with(&format!("D1-20260107-S{staff_id}-"))
    );
    assert_eq!(response.request.available_actions, vec![String::from("CANCELLED")]);
    assert!(!response.request.can_override_collect);
    assert_eq!(shirt_stock(&mut persistence), 5);
}

#[test]
fn test_uniform_limit_scenario() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", Some(2));
    seed_shirts(&mut persistence, 10);
    let no_cooldown = d1_store_domain::RequestPolicy {
        cooldown_hours: 0,
        ..policy()
    };

    let too_many = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(3),
        ActorKind::Staff,
        &no_cooldown,
        &transitions(),
        t0(),
    );
    assert_eq!(
        too_many,
        Err(ApiError::UniformLimitExceeded {
            uniform_limit: 2,
            total_ordered: 0,
            requested: 3,
        })
    );

    create_request(
        &mut persistence,
        staff_id,
        &shirt_order(2),
        ActorKind::Staff,
        &no_cooldown,
        &transitions(),
        t0(),
    )
    .unwrap();

    let one_more = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &no_cooldown,
        &transitions(),
        t0() + Duration::minutes(1),
    );
    assert_eq!(
        one_more,
        Err(ApiError::UniformLimitExceeded {
            uniform_limit: 2,
            total_ordered: 2,
            requested: 1,
        })
    );
    assert_eq!(shirt_stock(&mut persistence), 8);
}

#[test]
fn test_cooldown_blocks_second_request() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);

    create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();

    let blocked = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0() + Duration::hours(23),
    );
    assert_eq!(
        blocked,
        Err(ApiError::CooldownActive {
            cooldown_hours: 24,
            last_requested_at: t0(),
            next_allowed_at: t0() + Duration::hours(24),
        })
    );

    let eligibility = get_eligibility(&mut persistence, staff_id, &policy(), t0() + Duration::hours(23))
        .unwrap();
    assert!(!eligibility.can_request);
    assert_eq!(eligibility.next_allowed_at, Some(t0() + Duration::hours(24)));
    assert_eq!(eligibility.total_ordered, 1);

    create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0() + Duration::hours(24),
    )
    .unwrap();
}

#[test]
fn test_insufficient_stock_reports_available() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 2);

    let result = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(3),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    );

    assert_eq!(result, Err(ApiError::InsufficientStock { available: 2 }));
    assert_eq!(shirt_stock(&mut persistence), 2);
}

#[test]
fn test_zero_quantity_is_invalid_input() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 2);

    let result = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(0),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "quantity"
    ));
}

#[test]
fn test_unknown_staff_is_not_found() {
    let mut persistence = setup_test_persistence();
    seed_shirts(&mut persistence, 2);

    let result = create_request(
        &mut persistence,
        999,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_cancel_restores_stock() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(3),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();
    assert_eq!(shirt_stock(&mut persistence), 7);

    let cancelled = cancel_staff_request(
        &mut persistence,
        staff_id,
        &CancelRequestRequest {
            request_id: created.request.request_id,
        },
        ActorKind::Staff,
        &transitions(),
        t0() + Duration::minutes(5),
    )
    .unwrap();

    assert_eq!(cancelled.request.status, "CANCELLED");
    assert_eq!(cancelled.restored_quantity, 3);
    assert_eq!(cancelled.stock_after, 10);
    assert!(cancelled.request.available_actions.is_empty());
    assert_eq!(shirt_stock(&mut persistence), 10);
}

#[test]
fn test_cancel_rejects_someone_elses_request() {
    let mut persistence = setup_test_persistence();
    let ann: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    let bob: i64 = seed_staff(&mut persistence, "Bob Ray", None);
    seed_shirts(&mut persistence, 10);

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        ann,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();

    let result = cancel_staff_request(
        &mut persistence,
        bob,
        &CancelRequestRequest {
            request_id: created.request.request_id,
        },
        ActorKind::Staff,
        &transitions(),
        t0(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert_eq!(shirt_stock(&mut persistence), 9);
}

#[test]
fn test_cancel_after_dispatch_is_conflict() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);
    let dispatcher = create_test_dispatcher();

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(2),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();
    update_request(
        &mut persistence,
        &dispatcher,
        created.request.request_id,
        &UpdateRequestRequest {
            status: Some(String::from("DISPATCHED")),
            notes: None,
        },
        &transitions(),
        t0(),
    )
    .unwrap();

    let result = cancel_staff_request(
        &mut persistence,
        staff_id,
        &CancelRequestRequest {
            request_id: created.request.request_id,
        },
        ActorKind::Staff,
        &transitions(),
        t0(),
    );

    assert!(matches!(
        result,
        Err(ApiError::Conflict { current_status: Some(ref status), .. }) if status == "DISPATCHED"
    ));
    assert_eq!(shirt_stock(&mut persistence), 8);
}

#[test]
fn test_dispatcher_walks_request_to_collected() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);
    let dispatcher = create_test_dispatcher();

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();
    let request_id: i64 = created.request.request_id;

    for status in ["DISPATCHED", "IN_TRANSIT", "ARRIVED", "COLLECTED"] {
        let info: RequestInfo = update_request(
            &mut persistence,
            &dispatcher,
            request_id,
            &UpdateRequestRequest {
                status: Some(status.to_string()),
                notes: None,
            },
            &transitions(),
            t0(),
        )
        .unwrap();
        assert_eq!(info.status, status);
    }

    assert_eq!(shirt_stock(&mut persistence), 9);
}

#[test]
fn test_skipping_a_status_is_conflict() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();

    let result = update_request(
        &mut persistence,
        &create_test_dispatcher(),
        created.request.request_id,
        &UpdateRequestRequest {
            status: Some(String::from("ARRIVED")),
            notes: None,
        },
        &transitions(),
        t0(),
    );

    assert!(matches!(
        result,
        Err(ApiError::Conflict { current_status: Some(ref status), .. }) if status == "REQUEST"
    ));
}

#[test]
fn test_admin_cannot_dispatch() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();

    let result = update_request(
        &mut persistence,
        &create_test_admin(),
        created.request.request_id,
        &UpdateRequestRequest {
            status: Some(String::from("DISPATCHED")),
            notes: None,
        },
        &transitions(),
        t0(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_admin_cancel_through_update_restores_stock() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(4),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();

    let info: RequestInfo = update_request(
        &mut persistence,
        &create_test_admin(),
        created.request.request_id,
        &UpdateRequestRequest {
            status: Some(String::from("cancelled")),
            notes: Some(String::from("Ordered by mistake")),
        },
        &transitions(),
        t0(),
    )
    .unwrap();

    assert_eq!(info.status, "CANCELLED");
    assert_eq!(info.notes.as_deref(), Some("Ordered by mistake"));
    assert_eq!(shirt_stock(&mut persistence), 10);
}

#[test]
fn test_notes_editable_after_collection_and_clearable() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);
    let admin = create_test_admin();

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();
    let request_id: i64 = created.request.request_id;
    override_collect(&mut persistence, &admin, request_id, &transitions(), t0()).unwrap();

    let noted: RequestInfo = update_request(
        &mut persistence,
        &admin,
        request_id,
        &UpdateRequestRequest {
            status: None,
            notes: Some(String::from("Signed for by manager")),
        },
        &transitions(),
        t0(),
    )
    .unwrap();
    assert_eq!(noted.notes.as_deref(), Some("Signed for by manager"));

    let cleared: RequestInfo = update_request(
        &mut persistence,
        &admin,
        request_id,
        &UpdateRequestRequest {
            status: None,
            notes: Some(String::from("   ")),
        },
        &transitions(),
        t0(),
    )
    .unwrap();
    assert_eq!(cleared.notes, None);
}

#[test]
fn test_update_requires_status_or_notes() {
    let mut persistence = setup_test_persistence();

    let result = update_request(
        &mut persistence,
        &create_test_admin(),
        1,
        &UpdateRequestRequest::default(),
        &transitions(),
        t0(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_override_collect_from_in_transit() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);
    let dispatcher = create_test_dispatcher();

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(1),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();
    let request_id: i64 = created.request.request_id;
    for status in ["DISPATCHED", "IN_TRANSIT"] {
        update_request(
            &mut persistence,
            &dispatcher,
            request_id,
            &UpdateRequestRequest {
                status: Some(status.to_string()),
                notes: None,
            },
            &transitions(),
            t0(),
        )
        .unwrap();
    }

    let collected: RequestInfo =
        override_collect(&mut persistence, &dispatcher, request_id, &transitions(), t0()).unwrap();
    assert_eq!(collected.status, "COLLECTED");
    assert!(!collected.can_override_collect);

    let again = override_collect(&mut persistence, &dispatcher, request_id, &transitions(), t0());
    assert!(matches!(again, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_reorder_draft_from_collected_request() {
    let mut persistence = setup_test_persistence();
    let staff_id: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    seed_shirts(&mut persistence, 10);
    let admin = create_test_admin();

    let created: CreateRequestResponse = create_request(
        &mut persistence,
        staff_id,
        &shirt_order(2),
        ActorKind::Staff,
        &policy(),
        &transitions(),
        t0(),
    )
    .unwrap();
    let request_id: i64 = created.request.request_id;

    let early = reorder_request(
        &mut persistence,
        &admin,
        request_id,
        &ReorderRequest {
            reason: String::from("Wrong size"),
        },
    );
    assert!(matches!(early, Err(ApiError::Conflict { .. })));

    override_collect(&mut persistence, &admin, request_id, &transitions(), t0()).unwrap();

    let blank = reorder_request(
        &mut persistence,
        &admin,
        request_id,
        &ReorderRequest {
            reason: String::from("  "),
        },
    );
    assert!(matches!(blank, Err(ApiError::InvalidInput { .. })));

    let draft = reorder_request(
        &mut persistence,
        &admin,
        request_id,
        &ReorderRequest {
            reason: String::from("Wrong size"),
        },
    )
    .unwrap();
    assert_eq!(draft.source_tracking_id, created.request.tracking_id);
    assert_eq!(draft.staff_id, staff_id);
    assert_eq!(draft.quantity, 2);
    assert!(draft.notes.contains("Wrong size"));
    assert!(draft.notes.contains(&created.request.tracking_id));

    // The source is untouched and no new request was written.
    let source: RequestInfo =
        get_request(&mut persistence, request_id, ActorKind::Admin, &transitions()).unwrap();
    assert_eq!(source.status, "COLLECTED");
    let all = list_requests(&mut persistence, &admin, &transitions()).unwrap();
    assert_eq!(all.requests.len(), 1);
}

#[test]
fn test_listings_are_newest_first() {
    let mut persistence = setup_test_persistence();
    let ann: i64 = seed_staff(&mut persistence, "Ann Lee", None);
    let bob: i64 = seed_staff(&mut persistence, "Bob Ray", None);
    seed_shirts(&mut persistence, 10);

    for (offset, staff_id) in [(0, ann), (1, bob), (2, ann)] {
        create_request(
            &mut persistence,
            staff_id,
            &shirt_order(1),
            ActorKind::Staff,
            &policy(),
            &transitions(),
            t0() + Duration::days(offset),
        )
        .unwrap();
    }

    let all = list_requests(&mut persistence, &create_test_admin(), &transitions()).unwrap();
    let owners: Vec<i64> = all.requests.iter().map(|r| r.staff_id).collect();
    assert_eq!(owners, vec![ann, bob, ann]);
    assert!(all.requests[0].created_at > all.requests[2].created_at);

    let anns = list_staff_requests(&mut persistence, ann, ActorKind::Staff, &transitions()).unwrap();
    assert_eq!(anns.requests.len(), 2);
    assert!(anns.requests[0].created_at > anns.requests[1].created_at);

    let missing = list_staff_requests(&mut persistence, 999, ActorKind::Staff, &transitions());
    assert!(matches!(missing, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_get_request_not_found() {
    let mut persistence = setup_test_persistence();

    let result = get_request(&mut persistence, 42, ActorKind::Staff, &transitions());

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
