//! Invitation state machine: friend and event invitations, duplicate
//! suppression, the double-answer boundary and revocation rights.

mod support;

use eventbook::domain::error::DomainError;
use eventbook::domain::model::InvitationKind;
use eventbook::domain::service::{GiveInvitation, InvitationOutcome};
use support::{create_event, register, reload, service};
use uuid::Uuid;

fn friend_invite(start: Uuid, end: Uuid) -> GiveInvitation {
    GiveInvitation {
        kind: InvitationKind::Friend,
        start_user: start,
        end_user: Some(end),
        event_id: None,
    }
}

#[test]
fn accepted_friend_invitation_makes_friendship_symmetric() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");

    let outcome = svc.give_invitation(friend_invite(alice.id, bob.id)).unwrap();
    let InvitationOutcome::Created(invite_id) = outcome else {
        panic!("expected a fresh invitation");
    };

    let bob = reload(&svc, &bob);
    assert!(bob.active_invitations.contains_key(&invite_id));

    svc.respond_to_invitation(invite_id, true, &bob, None)
        .unwrap();

    let alice = reload(&svc, &alice);
    let bob = reload(&svc, &bob);
    assert!(alice.friends.contains(&bob.id));
    assert!(bob.friends.contains(&alice.id));
    assert!(bob.active_invitations.is_empty());
}

#[test]
fn declined_friend_invitation_changes_no_friend_sets() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");

    let invite_id = svc
        .give_invitation(friend_invite(alice.id, bob.id))
        .unwrap()
        .invite_id();
    svc.respond_to_invitation(invite_id, false, &bob, None)
        .unwrap();

    let alice = reload(&svc, &alice);
    let bob = reload(&svc, &bob);
    assert!(alice.friends.is_empty());
    assert!(bob.friends.is_empty());
    assert!(bob.active_invitations.is_empty());
}

#[test]
fn answering_the_same_invitation_twice_is_not_found() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");

    let invite_id = svc
        .give_invitation(friend_invite(alice.id, bob.id))
        .unwrap()
        .invite_id();
    svc.respond_to_invitation(invite_id, true, &bob, None)
        .unwrap();

    let err = svc
        .respond_to_invitation(invite_id, true, &bob, None)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn duplicate_friend_invitation_is_suppressed() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");

    let first = svc.give_invitation(friend_invite(alice.id, bob.id)).unwrap();
    let second = svc.give_invitation(friend_invite(alice.id, bob.id)).unwrap();

    assert_eq!(second, InvitationOutcome::AlreadyPending(first.invite_id()));
    assert_eq!(reload(&svc, &bob).active_invitations.len(), 1);
}

#[test]
fn event_invitation_requires_moderator_rights() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let carol = register(&svc, "carol");
    let event_id = create_event(&svc, &alice, "Private dinner", false);

    // Bob is neither organizer nor admin of the event.
    let err = svc
        .give_invitation(GiveInvitation {
            kind: InvitationKind::Event,
            start_user: bob.id,
            end_user: Some(carol.id),
            event_id: Some(event_id),
        })
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
    assert!(reload(&svc, &carol).active_invitations.is_empty());
}

#[test]
fn accepted_event_invitation_adds_participation_on_both_sides() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let event_id = create_event(&svc, &alice, "Private dinner", false);

    let invite_id = svc
        .give_invitation(GiveInvitation {
            kind: InvitationKind::Event,
            start_user: alice.id,
            end_user: Some(bob.id),
            event_id: Some(event_id),
        })
        .unwrap()
        .invite_id();

    let bob = reload(&svc, &bob);
    svc.respond_to_invitation(invite_id, true, &bob, None)
        .unwrap();

    let event = svc.get_event(event_id).unwrap();
    let bob = reload(&svc, &bob);
    assert!(event.participants.contains(&bob.id));
    assert!(bob.events_participation.contains(&event_id));
    assert!(bob.active_invitations.is_empty());
}

#[test]
fn invitation_recipient_is_notified() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");

    svc.give_invitation(friend_invite(alice.id, bob.id)).unwrap();

    let notifications = svc.list_notifications(bob.id).unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains("alice"));
}

#[test]
fn only_the_inviter_may_revoke() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");
    let mallory = register(&svc, "mallory");

    let invite_id = svc
        .give_invitation(friend_invite(alice.id, bob.id))
        .unwrap()
        .invite_id();

    let err = svc
        .revoke_invitation(invite_id, bob.id, mallory.id)
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    svc.revoke_invitation(invite_id, bob.id, alice.id).unwrap();
    assert!(reload(&svc, &bob).active_invitations.is_empty());

    // Revoking again: the invitation is gone.
    let err = svc
        .revoke_invitation(invite_id, bob.id, alice.id)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn unknown_invitation_id_is_not_found() {
    let svc = service();
    let bob = register(&svc, "bob");

    let err = svc
        .respond_to_invitation(Uuid::new_v4(), true, &bob, None)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn friend_invitation_to_an_existing_friend_is_rejected() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");

    let invite_id = svc
        .give_invitation(friend_invite(alice.id, bob.id))
        .unwrap()
        .invite_id();
    let bob = reload(&svc, &bob);
    svc.respond_to_invitation(invite_id, true, &bob, None)
        .unwrap();

    let err = svc
        .give_invitation(friend_invite(alice.id, bob.id))
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest { .. }));
}
