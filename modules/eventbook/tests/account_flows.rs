//! Accounts: uniqueness, credentials, token-version invalidation,
//! friendship removal and the notification sink.

mod support;

use eventbook::domain::error::DomainError;
use eventbook::domain::model::NotificationKind;
use support::{PASSWORD, register, reload, service};
use uuid::Uuid;

#[test]
fn username_and_email_must_be_unique() {
    let svc = service();
    register(&svc, "alice");

    let err = svc
        .register_user("alice", "other@example.com", PASSWORD)
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    let err = svc
        .register_user("alice2", "alice@example.com", PASSWORD)
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));
}

#[test]
fn authentication_checks_credentials() {
    let svc = service();
    let alice = register(&svc, "alice");

    assert_eq!(svc.authenticate("alice", PASSWORD).unwrap().id, alice.id);
    assert!(matches!(
        svc.authenticate("alice", "wrong").unwrap_err(),
        DomainError::Unauthorized { .. }
    ));
    assert!(matches!(
        svc.authenticate("nobody", PASSWORD).unwrap_err(),
        DomainError::Unauthorized { .. }
    ));
}

#[test]
fn logout_invalidates_prior_token_versions() {
    let svc = service();
    let alice = register(&svc, "alice");

    assert!(svc.current_identity(alice.id, 0).is_ok());
    svc.logout(alice.id).unwrap();

    assert!(matches!(
        svc.current_identity(alice.id, 0).unwrap_err(),
        DomainError::Unauthorized { .. }
    ));
    assert!(svc.current_identity(alice.id, 1).is_ok());
}

#[test]
fn account_update_respects_uniqueness_of_others() {
    let svc = service();
    let alice = register(&svc, "alice");
    register(&svc, "bob");

    // Keeping your own identifiers is fine.
    svc.update_account(alice.id, "alice", "alice@example.com", None)
        .unwrap();

    // Taking someone else's username is not.
    let err = svc
        .update_account(alice.id, "bob", "alice@example.com", None)
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    // Password change invalidates the old one.
    svc.update_account(alice.id, "alice", "alice@example.com", Some("new-password"))
        .unwrap();
    assert!(svc.authenticate("alice", "new-password").is_ok());
    assert!(svc.authenticate("alice", PASSWORD).is_err());
}

#[test]
fn removing_a_friendship_updates_both_sides() {
    let svc = service();
    let alice = register(&svc, "alice");
    let bob = register(&svc, "bob");

    svc.set_friends(alice.id, [bob.id].into()).unwrap();
    svc.set_friends(bob.id, [alice.id].into()).unwrap();

    svc.remove_friend(alice.id, bob.id).unwrap();
    assert!(reload(&svc, &alice).friends.is_empty());
    assert!(reload(&svc, &bob).friends.is_empty());

    let err = svc.remove_friend(alice.id, bob.id).unwrap_err();
    assert!(matches!(err, DomainError::BadRequest { .. }));
}

#[test]
fn deleted_accounts_stop_resolving() {
    let svc = service();
    let alice = register(&svc, "alice");

    svc.delete_account(alice.id).unwrap();
    assert!(matches!(
        svc.get_user(alice.id).unwrap_err(),
        DomainError::NotFound { .. }
    ));
    assert!(matches!(
        svc.delete_account(alice.id).unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[test]
fn notifications_list_oldest_first_and_delete_by_id() {
    let svc = service();
    let alice = register(&svc, "alice");

    let first = svc
        .notify_user(alice.id, NotificationKind::System, "first", None)
        .unwrap();
    let second = svc
        .notify_user(alice.id, NotificationKind::EventUpdate, "second", None)
        .unwrap();

    let listed = svc.list_notifications(alice.id).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first);
    assert_eq!(listed[1].id, second);
    assert!(!listed[0].read);

    svc.delete_notification(alice.id, first).unwrap();
    let listed = svc.list_notifications(alice.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second);

    let err = svc.delete_notification(alice.id, first).unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn notifying_a_missing_user_is_not_found() {
    let svc = service();
    let err = svc
        .notify_user(Uuid::new_v4(), NotificationKind::System, "hello", None)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}
