// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ActorKind, DomainError, RequestStatus, TransitionPolicy, TransitionRule};

#[test]
fn test_staff_may_only_cancel() {
    let policy: TransitionPolicy = TransitionPolicy::default();

    assert!(
        policy
            .authorize(ActorKind::Staff, RequestStatus::Request, RequestStatus::Cancelled)
            .is_ok()
    );
    assert!(matches!(
        policy.authorize(
            ActorKind::Staff,
            RequestStatus::Request,
            RequestStatus::Dispatched
        ),
        Err(DomainError::TransitionNotPermitted { .. })
    ));
}

#[test]
fn test_dispatch_admin_walks_the_forward_path() {
    let policy: TransitionPolicy = TransitionPolicy::default();
    let mut status: RequestStatus = RequestStatus::Request;

    while let Some(next) = status.next() {
        assert!(
            policy
                .authorize(ActorKind::DispatchAdmin, status, next)
                .is_ok(),
            "dispatch admin should move {status} to {next}"
        );
        status = next;
    }
    assert_eq!(status, RequestStatus::Collected);
}

#[test]
fn test_lifecycle_rejection_wins_over_policy() {
    // A rule for an illegal edge grants nothing.
    let policy: TransitionPolicy = TransitionPolicy::new(
        vec![TransitionRule::new(
            ActorKind::Admin,
            RequestStatus::Arrived,
            RequestStatus::Cancelled,
        )],
        Vec::new(),
    );

    assert!(matches!(
        policy.authorize(
            ActorKind::Admin,
            RequestStatus::Arrived,
            RequestStatus::Cancelled
        ),
        Err(DomainError::InvalidStatusTransition { .. })
    ));
    assert!(
        policy
            .available_actions(ActorKind::Admin, RequestStatus::Arrived)
            .is_empty()
    );
}

#[test]
fn test_available_actions_match_authorize() {
    let policy: TransitionPolicy = TransitionPolicy::default();

    for actor in [ActorKind::Staff, ActorKind::DispatchAdmin, ActorKind::Admin] {
        for from in RequestStatus::ALL {
            let offered: Vec<RequestStatus> = policy.available_actions(actor, from);
            for to in RequestStatus::ALL {
                let allowed: bool = policy.authorize(actor, from, to).is_ok();
                assert_eq!(
                    offered.contains(&to),
                    allowed,
                    "{actor} {from} -> {to} offered/allowed mismatch"
                );
            }
        }
    }
}

#[test]
fn test_available_actions_for_request_status() {
    let policy: TransitionPolicy = TransitionPolicy::default();

    assert_eq!(
        policy.available_actions(ActorKind::Staff, RequestStatus::Request),
        vec![RequestStatus::Cancelled]
    );
    assert_eq!(
        policy.available_actions(ActorKind::DispatchAdmin, RequestStatus::Request),
        vec![RequestStatus::Dispatched, RequestStatus::Cancelled]
    );
    assert!(
        policy
            .available_actions(ActorKind::Staff, RequestStatus::Dispatched)
            .is_empty()
    );
}

#[test]
fn test_collect_override_permissions() {
    let policy: TransitionPolicy = TransitionPolicy::default();

    assert!(
        policy
            .authorize_collect_override(ActorKind::Admin, RequestStatus::Dispatched)
            .is_ok()
    );
    assert!(
        policy
            .authorize_collect_override(ActorKind::DispatchAdmin, RequestStatus::Request)
            .is_ok()
    );
    assert!(matches!(
        policy.authorize_collect_override(ActorKind::Staff, RequestStatus::Arrived),
        Err(DomainError::TransitionNotPermitted { .. })
    ));
    assert!(matches!(
        policy.authorize_collect_override(ActorKind::Admin, RequestStatus::Cancelled),
        Err(DomainError::InvalidStatusTransition { .. })
    ));

    assert!(policy.can_override(ActorKind::Admin, RequestStatus::InTransit));
    assert!(!policy.can_override(ActorKind::Admin, RequestStatus::Collected));
    assert!(!policy.can_override(ActorKind::Staff, RequestStatus::InTransit));
}

#[test]
fn test_actor_kind_parsing() {
    assert_eq!("admin".parse::<ActorKind>(), Ok(ActorKind::Admin));
    assert_eq!(
        "dispatchAdmin".parse::<ActorKind>(),
        Ok(ActorKind::DispatchAdmin)
    );
    assert_eq!(
        "dispatch_admin".parse::<ActorKind>(),
        Ok(ActorKind::DispatchAdmin)
    );
    assert!("root".parse::<ActorKind>().is_err());
}
