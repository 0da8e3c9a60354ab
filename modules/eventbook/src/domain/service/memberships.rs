//! Event membership mutations: join, leave, admin and ownership changes.

use tracing::info;
use uuid::Uuid;

use super::events::require_admin_or_organizer;
use super::invitations::{GiveInvitation, InvitationOutcome};
use super::Service;
use crate::domain::error::DomainError;
use crate::domain::model::{InvitationKind, NotificationKind, User};

/// Result of [`Service::join_event`]. Joining a public event twice and
/// re-requesting a private one are both reported, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyParticipant,
    Requested(Uuid),
    AlreadyRequested(Uuid),
}

impl Service {
    /// Join a public event directly, or file a join request for a private
    /// one.
    pub fn join_event(&self, event_id: Uuid, user: &User) -> Result<JoinOutcome, DomainError> {
        let event = self.event_by_id(event_id)?.record;

        if !event.public {
            return match self.give_invitation(GiveInvitation {
                kind: InvitationKind::Request,
                start_user: user.id,
                end_user: None,
                event_id: Some(event_id),
            })? {
                InvitationOutcome::Created(id) => Ok(JoinOutcome::Requested(id)),
                InvitationOutcome::AlreadyPending(id) => Ok(JoinOutcome::AlreadyRequested(id)),
            };
        }

        if event.participants.contains(&user.id) {
            return Ok(JoinOutcome::AlreadyParticipant);
        }

        // Participation on the user first; the event's participant set is
        // the owning side and commits last.
        self.update_user_record(user.id, |u| {
            u.events_participation.insert(event_id);
            Ok(())
        })?;
        self.update_event_record(event_id, |e| {
            e.participants.insert(user.id);
            Ok(())
        })
        .map_err(|e| {
            DomainError::partial_update(
                format!("user {}", user.id),
                format!("event {event_id}"),
                e.to_string(),
            )
        })?;

        info!(event_id = %event_id, user_id = %user.id, "joined public event");
        Ok(JoinOutcome::Joined)
    }

    /// Leave an event the user participates in or administers.
    pub fn leave_event(&self, event_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let event = self.event_by_id(event_id)?.record;
        if event.is_organizer(user_id) {
            return Err(DomainError::bad_request(
                "the organizer cannot leave their own event",
            ));
        }
        if !event.participants.contains(&user_id) && !event.admins.contains(&user_id) {
            return Err(DomainError::bad_request(
                "you are not a participant or admin of this event",
            ));
        }

        self.update_user_record(user_id, |user| {
            user.events_participation.remove(&event_id);
            Ok(())
        })?;
        self.update_event_record(event_id, |event| {
            event.participants.remove(&user_id);
            event.admins.remove(&user_id);
            Ok(())
        })
        .map_err(|e| {
            DomainError::partial_update(
                format!("user {user_id}"),
                format!("event {event_id}"),
                e.to_string(),
            )
        })?;

        info!(event_id = %event_id, user_id = %user_id, "left event");
        Ok(())
    }

    /// Grant admin rights. Organizer or admin only; granting twice is a
    /// no-op union.
    pub fn add_admin(
        &self,
        event_id: Uuid,
        username: &str,
        requester_id: Uuid,
    ) -> Result<(), DomainError> {
        let new_admin = self.user_by_name(username)?.record;
        self.update_event_record(event_id, |event| {
            require_admin_or_organizer(event, requester_id)?;
            event.admins.insert(new_admin.id);
            Ok(())
        })?;
        info!(event_id = %event_id, admin_id = %new_admin.id, "admin added");
        Ok(())
    }

    /// Revoke admin rights. Stricter than granting: only the organizer may
    /// do this, and the organizer's own admin entry is not removable -
    /// ownership must be transferred first.
    pub fn remove_admin(
        &self,
        event_id: Uuid,
        admin_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), DomainError> {
        self.update_event_record(event_id, |event| {
            if !event.is_organizer(requester_id) {
                return Err(DomainError::forbidden(
                    "only the organizer may remove admins",
                ));
            }
            if admin_id == event.organizer_id {
                return Err(DomainError::forbidden(
                    "the organizer cannot be removed from admins; transfer ownership first",
                ));
            }
            if !event.admins.remove(&admin_id) {
                return Err(DomainError::bad_request("user is not an admin of this event"));
            }
            Ok(())
        })?;
        info!(event_id = %event_id, admin_id = %admin_id, "admin removed");
        Ok(())
    }

    /// Hand the organizer role to another user. Admin sets on both sides
    /// are deliberately untouched.
    pub fn transfer_ownership(
        &self,
        event_id: Uuid,
        username: &str,
        requester_id: Uuid,
    ) -> Result<(), DomainError> {
        let new_owner = self.user_by_name(username)?.record;
        let title = self.update_event_record(event_id, |event| {
            if !event.is_organizer(requester_id) {
                return Err(DomainError::forbidden(
                    "only the organizer may transfer ownership",
                ));
            }
            event.organizer_id = new_owner.id;
            event.organizer_name = new_owner.username.clone();
            Ok(event.title.clone())
        })?;

        self.notify_best_effort(
            new_owner.id,
            NotificationKind::EventUpdate,
            &format!("you are now the organizer of '{title}'"),
            Some(event_id),
        );
        info!(event_id = %event_id, new_owner = %new_owner.id, "ownership transferred");
        Ok(())
    }
}
