//! The invitation state machine.
//!
//! An invitation is PENDING while it sits in exactly one collection: the
//! target user's `active_invitations` (EVENT, FRIEND) or the event's
//! `requests_to_join` (REQUEST). Responding - either way - removes it;
//! there is no persisted record of the resolution, so answering the same
//! id twice fails with `NotFound`. That removal is the idempotence
//! boundary.
//!
//! Acceptance mutates records beyond the one holding the invitation. The
//! side-effect record is written first and the holder last, so a pending
//! invitation never disappears before its effects exist; a hard failure
//! on the final write is surfaced as `PartialUpdate`.

use tracing::{debug, info};
use uuid::Uuid;

use super::Service;
use super::events::require_admin_or_organizer;
use crate::domain::error::DomainError;
use crate::domain::model::{Invitation, InvitationKind, NotificationKind, User};

/// A caller's intent to create an invitation. `start_user` is always the
/// authenticated caller; the API layer guarantees that.
#[derive(Debug, Clone)]
pub struct GiveInvitation {
    pub kind: InvitationKind,
    pub start_user: Uuid,
    pub end_user: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

/// Result of [`Service::give_invitation`]. Duplicate suppression applies
/// to every kind: proposing something already pending yields the existing
/// id instead of a second invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationOutcome {
    Created(Uuid),
    AlreadyPending(Uuid),
}

impl InvitationOutcome {
    #[must_use]
    pub fn invite_id(&self) -> Uuid {
        match *self {
            Self::Created(id) | Self::AlreadyPending(id) => id,
        }
    }
}

impl Service {
    /// Create a pending invitation and notify its recipient(s).
    pub fn give_invitation(
        &self,
        intent: GiveInvitation,
    ) -> Result<InvitationOutcome, DomainError> {
        match intent.kind {
            InvitationKind::Event => {
                self.give_event_invitation(intent.start_user, intent.end_user, intent.event_id)
            }
            InvitationKind::Request => {
                self.give_join_request(intent.start_user, intent.event_id)
            }
            InvitationKind::Friend => {
                self.give_friend_invitation(intent.start_user, intent.end_user)
            }
        }
    }

    /// Answer a pending invitation. With `event_id` the invitation is
    /// looked up in that event's join requests, otherwise in the
    /// responder's own inbox. Returns the resolved invitation.
    pub fn respond_to_invitation(
        &self,
        invite_id: Uuid,
        accept: bool,
        responder: &User,
        event_id: Option<Uuid>,
    ) -> Result<Invitation, DomainError> {
        match event_id {
            Some(event_id) => self.respond_to_join_request(event_id, invite_id, accept, responder),
            None => self.respond_to_own_invitation(invite_id, accept, responder),
        }
    }

    /// Withdraw a pending invitation from the target's inbox. Only the
    /// user who sent it may revoke it.
    pub fn revoke_invitation(
        &self,
        invitation_id: Uuid,
        target_user_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), DomainError> {
        let target = self.user_by_id(target_user_id)?.record;
        let invitation = target
            .active_invitations
            .get(&invitation_id)
            .ok_or_else(|| DomainError::not_found("invitation"))?;
        if invitation.start_user != requester_id {
            return Err(DomainError::forbidden(
                "only the inviter may revoke an invitation",
            ));
        }

        self.update_user_record(target_user_id, |user| {
            user.active_invitations
                .remove(&invitation_id)
                .ok_or_else(|| DomainError::not_found("invitation"))?;
            Ok(())
        })?;
        info!(invitation_id = %invitation_id, "invitation revoked");
        Ok(())
    }

    fn give_event_invitation(
        &self,
        start_user: Uuid,
        end_user: Option<Uuid>,
        event_id: Option<Uuid>,
    ) -> Result<InvitationOutcome, DomainError> {
        let event_id = event_id.ok_or_else(|| {
            DomainError::invalid_argument("event_id is required for event invitations")
        })?;
        let end_user = end_user.ok_or_else(|| {
            DomainError::invalid_argument("end_user is required for event invitations")
        })?;

        let event = self.event_by_id(event_id)?.record;
        require_admin_or_organizer(&event, start_user)?;
        let inviter = self.user_by_id(start_user)?.record;

        let invitation = Invitation::new(
            InvitationKind::Event,
            start_user,
            Some(end_user),
            Some(event_id),
        );
        let message = format!("{} invited you to '{}'", inviter.username, event.title);

        // Invitation and its notification land on the same record, so the
        // target sees both or neither.
        let outcome = self.update_user_record(end_user, |target| {
            if let Some(existing) = target.duplicate_invitation(&invitation) {
                return Ok(InvitationOutcome::AlreadyPending(existing.id));
            }
            target
                .active_invitations
                .insert(invitation.id, invitation.clone());
            push_notification(
                target,
                NotificationKind::Invitation,
                &message,
                Some(event_id),
            );
            Ok(InvitationOutcome::Created(invitation.id))
        })?;

        log_outcome("event invitation", &outcome);
        Ok(outcome)
    }

    fn give_join_request(
        &self,
        start_user: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<InvitationOutcome, DomainError> {
        let event_id = event_id.ok_or_else(|| {
            DomainError::invalid_argument("event_id is required for join requests")
        })?;

        // Any user may ask to join any event they can name.
        let requester = self.user_by_id(start_user)?.record;
        let invitation = Invitation::new(InvitationKind::Request, start_user, None, Some(event_id));

        let (outcome, event) = self.update_event_record(event_id, |event| {
            if let Some(existing) = event.pending_request_from(start_user) {
                return Ok((InvitationOutcome::AlreadyPending(existing.id), event.clone()));
            }
            event
                .requests_to_join
                .insert(invitation.id, invitation.clone());
            Ok((InvitationOutcome::Created(invitation.id), event.clone()))
        })?;

        if let InvitationOutcome::Created(_) = outcome {
            let message = format!("{} asked to join '{}'", requester.username, event.title);
            for moderator in event.moderators() {
                self.notify_best_effort(
                    moderator,
                    NotificationKind::Invitation,
                    &message,
                    Some(event_id),
                );
            }
        }

        log_outcome("join request", &outcome);
        Ok(outcome)
    }

    fn give_friend_invitation(
        &self,
        start_user: Uuid,
        end_user: Option<Uuid>,
    ) -> Result<InvitationOutcome, DomainError> {
        let end_user = end_user.ok_or_else(|| {
            DomainError::invalid_argument("end_user is required for friend invitations")
        })?;
        if end_user == start_user {
            return Err(DomainError::bad_request("cannot send a friend request to yourself"));
        }

        let inviter = self.user_by_id(start_user)?.record;
        if inviter.friends.contains(&end_user) {
            return Err(DomainError::bad_request("already friends"));
        }

        let invitation = Invitation::new(InvitationKind::Friend, start_user, Some(end_user), None);
        let message = format!("{} sent you a friend request", inviter.username);

        let outcome = self.update_user_record(end_user, |target| {
            if let Some(existing) = target.duplicate_invitation(&invitation) {
                return Ok(InvitationOutcome::AlreadyPending(existing.id));
            }
            target
                .active_invitations
                .insert(invitation.id, invitation.clone());
            push_notification(target, NotificationKind::Invitation, &message, None);
            Ok(InvitationOutcome::Created(invitation.id))
        })?;

        log_outcome("friend invitation", &outcome);
        Ok(outcome)
    }

    /// Answer a join request stored on an event. Approving and declining
    /// are both moderator actions.
    fn respond_to_join_request(
        &self,
        event_id: Uuid,
        invite_id: Uuid,
        accept: bool,
        responder: &User,
    ) -> Result<Invitation, DomainError> {
        let event = self.event_by_id(event_id)?.record;
        let invitation = event
            .requests_to_join
            .get(&invite_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("invitation"))?;
        require_admin_or_organizer(&event, responder.id)?;

        if accept {
            // Requester's participation first; the event, which owns the
            // pending request, commits last.
            self.update_user_record(invitation.start_user, |user| {
                user.events_participation.insert(event_id);
                Ok(())
            })?;
            self.update_event_record(event_id, |event| {
                event
                    .requests_to_join
                    .remove(&invite_id)
                    .ok_or_else(|| DomainError::not_found("invitation"))?;
                event.participants.insert(invitation.start_user);
                Ok(())
            })
            .map_err(|e| {
                DomainError::partial_update(
                    format!("user {}", invitation.start_user),
                    format!("event {event_id}"),
                    e.to_string(),
                )
            })?;

            self.notify_best_effort(
                invitation.start_user,
                NotificationKind::EventUpdate,
                &format!("your request to join '{}' was accepted", event.title),
                Some(event_id),
            );
            info!(invitation_id = %invite_id, event_id = %event_id, "join request accepted");
        } else {
            self.update_event_record(event_id, |event| {
                event
                    .requests_to_join
                    .remove(&invite_id)
                    .ok_or_else(|| DomainError::not_found("invitation"))?;
                Ok(())
            })?;
            info!(invitation_id = %invite_id, event_id = %event_id, "join request declined");
        }

        Ok(invitation)
    }

    /// Answer an EVENT or FRIEND invitation sitting in the responder's own
    /// inbox.
    fn respond_to_own_invitation(
        &self,
        invite_id: Uuid,
        accept: bool,
        responder: &User,
    ) -> Result<Invitation, DomainError> {
        let current = self.user_by_id(responder.id)?.record;
        let invitation = current
            .active_invitations
            .get(&invite_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("invitation"))?;

        if accept {
            match invitation.kind {
                InvitationKind::Friend => {
                    // The inviter's side first; the responder, who owns
                    // the pending invitation, commits last together with
                    // its removal.
                    self.update_user_record(invitation.start_user, |user| {
                        user.friends.insert(responder.id);
                        Ok(())
                    })?;
                    self.update_user_record(responder.id, |user| {
                        user.active_invitations
                            .remove(&invite_id)
                            .ok_or_else(|| DomainError::not_found("invitation"))?;
                        user.friends.insert(invitation.start_user);
                        Ok(())
                    })
                    .map_err(|e| {
                        DomainError::partial_update(
                            format!("user {}", invitation.start_user),
                            format!("user {}", responder.id),
                            e.to_string(),
                        )
                    })?;
                    info!(invitation_id = %invite_id, "friend invitation accepted");
                }
                InvitationKind::Event => {
                    let event_id = invitation.event_id.ok_or_else(|| {
                        DomainError::storage("event invitation without an event id")
                    })?;
                    self.update_event_record(event_id, |event| {
                        event.participants.insert(responder.id);
                        Ok(())
                    })?;
                    self.update_user_record(responder.id, |user| {
                        user.active_invitations
                            .remove(&invite_id)
                            .ok_or_else(|| DomainError::not_found("invitation"))?;
                        user.events_participation.insert(event_id);
                        Ok(())
                    })
                    .map_err(|e| {
                        DomainError::partial_update(
                            format!("event {event_id}"),
                            format!("user {}", responder.id),
                            e.to_string(),
                        )
                    })?;
                    info!(invitation_id = %invite_id, event_id = %event_id, "event invitation accepted");
                }
                InvitationKind::Request => {
                    return Err(DomainError::invalid_argument(
                        "join requests are answered on their event",
                    ));
                }
            }
        } else {
            self.update_user_record(responder.id, |user| {
                user.active_invitations
                    .remove(&invite_id)
                    .ok_or_else(|| DomainError::not_found("invitation"))?;
                Ok(())
            })?;
            info!(invitation_id = %invite_id, "invitation declined");
        }

        Ok(invitation)
    }
}

/// Append a notification while already holding the user record.
fn push_notification(
    user: &mut User,
    kind: NotificationKind,
    message: &str,
    event_id: Option<Uuid>,
) {
    let notification =
        crate::domain::model::Notification::new(user.id, kind, message, event_id);
    user.notifications.insert(notification.id, notification);
}

fn log_outcome(what: &str, outcome: &InvitationOutcome) {
    match outcome {
        InvitationOutcome::Created(id) => info!(invitation_id = %id, "{what} created"),
        InvitationOutcome::AlreadyPending(id) => {
            debug!(invitation_id = %id, "{what} already pending");
        }
    };
}
