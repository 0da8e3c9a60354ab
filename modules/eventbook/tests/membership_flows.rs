//! Membership mutations: join/leave, request approval rights, admin and
//! ownership management.

mod support;

use eventbook::domain::error::DomainError;
use eventbook::domain::service::JoinOutcome;
use support::{create_event, register, reload, service};

#[test]
fn public_join_adds_participant_and_never_requests() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let event_id = create_event(&svc, &alice, "Open air", true);

    assert_eq!(svc.join_event(event_id, &bob).unwrap(), JoinOutcome::Joined);

    let event = svc.get_event(event_id).unwrap();
    assert!(event.participants.contains(&bob.id));
    assert!(event.requests_to_join.is_empty());
    assert!(reload(&svc, &bob).events_participation.contains(&event_id));

    // Re-joining is reported, not rejected.
    assert_eq!(
        svc.join_event(event_id, &bob).unwrap(),
        JoinOutcome::AlreadyParticipant
    );
}

#[test]
fn private_join_creates_exactly_one_request() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let event_id = create_event(&svc, &alice, "Private dinner", false);

    let JoinOutcome::Requested(request_id) = svc.join_event(event_id, &bob).unwrap() else {
        panic!("expected a join request");
    };

    let event = svc.get_event(event_id).unwrap();
    assert_eq!(event.requests_to_join.len(), 1);
    assert!(event.participants.is_empty());

    // A second join before resolution reuses the pending request.
    assert_eq!(
        svc.join_event(event_id, &bob).unwrap(),
        JoinOutcome::AlreadyRequested(request_id)
    );
    assert_eq!(svc.get_event(event_id).unwrap().requests_to_join.len(), 1);
}

#[test]
fn only_moderators_may_approve_requests() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let mallory = register(&svc, "mallory");
    let event_id = create_event(&svc, &alice, "Private dinner", false);

    let JoinOutcome::Requested(request_id) = svc.join_event(event_id, &bob).unwrap() else {
        panic!("expected a join request");
    };

    let err = svc
        .respond_to_invitation(request_id, true, &mallory, Some(event_id))
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
    // The participant set is unchanged after the forbidden attempt.
    assert!(svc.get_event(event_id).unwrap().participants.is_empty());

    svc.respond_to_invitation(request_id, true, &alice, Some(event_id))
        .unwrap();

    let event = svc.get_event(event_id).unwrap();
    assert!(event.participants.contains(&bob.id));
    assert!(event.requests_to_join.is_empty());
    assert!(reload(&svc, &bob).events_participation.contains(&event_id));
}

#[test]
fn declined_request_is_removed_without_joining() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let event_id = create_event(&svc, &alice, "Private dinner", false);

    let JoinOutcome::Requested(request_id) = svc.join_event(event_id, &bob).unwrap() else {
        panic!("expected a join request");
    };
    svc.respond_to_invitation(request_id, false, &alice, Some(event_id))
        .unwrap();

    let event = svc.get_event(event_id).unwrap();
    assert!(event.requests_to_join.is_empty());
    assert!(event.participants.is_empty());

    // Answering the resolved request again is the idempotence boundary.
    let err = svc
        .respond_to_invitation(request_id, true, &alice, Some(event_id))
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn leave_removes_membership_and_rejects_strangers() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let event_id = create_event(&svc, &alice, "Open air", true);

    svc.join_event(event_id, &bob).unwrap();
    svc.leave_event(event_id, bob.id).unwrap();

    let event = svc.get_event(event_id).unwrap();
    assert!(!event.participants.contains(&bob.id));
    assert!(!reload(&svc, &bob).events_participation.contains(&event_id));

    let err = svc.leave_event(event_id, bob.id).unwrap_err();
    assert!(matches!(err, DomainError::BadRequest { .. }));
}

#[test]
fn the_organizer_cannot_leave_their_own_event() {
    let svc = service();
    let alice = register(&svc, "alice");
    let event_id = create_event(&svc, &alice, "Open air", true);

    let err = svc.leave_event(event_id, alice.id).unwrap_err();
    assert!(matches!(err, DomainError::BadRequest { .. }));
}

#[test]
fn admin_management_is_role_gated() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let mallory = register(&svc, "mallory");
    let event_id = create_event(&svc, &alice, "Open air", true);

    // Outsiders cannot grant admin rights.
    let err = svc.add_admin(event_id, "bob", mallory.id).unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    svc.add_admin(event_id, "bob", alice.id).unwrap();
    let event = svc.get_event(event_id).unwrap();
    assert!(event.admins.contains(&bob.id));

    // Granting twice is an idempotent union.
    svc.add_admin(event_id, "bob", alice.id).unwrap();
    assert_eq!(svc.get_event(event_id).unwrap().admins.len(), 2);

    // Admins may not remove admins; that is organizer-only.
    let err = svc.remove_admin(event_id, bob.id, bob.id).unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    svc.remove_admin(event_id, bob.id, alice.id).unwrap();
    assert!(!svc.get_event(event_id).unwrap().admins.contains(&bob.id));
}

#[test]
fn the_organizer_is_not_a_removable_admin() {
    let svc = service();
    let alice = register(&svc, "alice");
    let event_id = create_event(&svc, &alice, "Open air", true);

    let err = svc.remove_admin(event_id, alice.id, alice.id).unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let event = svc.get_event(event_id).unwrap();
    assert_eq!(event.organizer_id, alice.id);
    assert!(event.admins.contains(&alice.id));
}

#[test]
fn ownership_transfer_leaves_admin_sets_alone() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let event_id = create_event(&svc, &alice, "Open air", true);

    // Only the organizer may transfer.
    let err = svc
        .transfer_ownership(event_id, "bob", bob.id)
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    svc.transfer_ownership(event_id, "bob", alice.id).unwrap();

    let event = svc.get_event(event_id).unwrap();
    assert_eq!(event.organizer_id, bob.id);
    assert_eq!(event.organizer_name, "bob");
    // The old organizer's admin membership is untouched, and the new
    // owner is not auto-promoted into the admin set.
    assert!(event.admins.contains(&alice.id));
    assert!(!event.admins.contains(&bob.id));
}

#[test]
fn visibility_change_is_moderator_gated() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let event_id = create_event(&svc, &alice, "Open air", true);

    let err = svc.change_visibility(event_id, bob.id, false).unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    svc.change_visibility(event_id, alice.id, false).unwrap();
    assert!(!svc.get_event(event_id).unwrap().public);

    // Joining now files a request instead of joining directly.
    assert!(matches!(
        svc.join_event(event_id, &bob).unwrap(),
        JoinOutcome::Requested(_)
    ));
}
