//! The per-user notification sink.
//!
//! Notifications live inside the owning user's record. The store keeps
//! them id-keyed, so listing imposes the documented ordering here:
//! created-at ascending, id as tiebreaker.

use tracing::{debug, info};
use uuid::Uuid;

use super::Service;
use crate::domain::error::DomainError;
use crate::domain::model::{Notification, NotificationKind};

impl Service {
    /// Append a notification to a user's sink. Returns the new id.
    pub fn notify_user(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        message: &str,
        event_id: Option<Uuid>,
    ) -> Result<Uuid, DomainError> {
        let notification = Notification::new(user_id, kind, message, event_id);
        let id = notification.id;
        self.update_user_record(user_id, |user| {
            user.notifications.insert(id, notification.clone());
            Ok(())
        })?;
        info!(user_id = %user_id, notification_id = %id, "user notified");
        Ok(id)
    }

    /// All of a user's notifications, oldest first.
    pub fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, DomainError> {
        let user = self.user_by_id(user_id)?.record;
        let mut out: Vec<Notification> = user.notifications.into_values().collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    /// Delete one notification by id from a user's sink.
    pub fn delete_notification(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<(), DomainError> {
        self.update_user_record(user_id, |user| {
            user.notifications
                .remove(&notification_id)
                .ok_or_else(|| DomainError::not_found("notification"))?;
            Ok(())
        })?;
        info!(user_id = %user_id, notification_id = %notification_id, "notification deleted");
        Ok(())
    }

    /// Notification delivery is a hook, not part of the operation's
    /// contract: failures are logged and swallowed.
    pub(super) fn notify_best_effort(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        message: &str,
        event_id: Option<Uuid>,
    ) {
        if let Err(e) = self.notify_user(user_id, kind, message, event_id) {
            debug!(user_id = %user_id, error = %e, "notification delivery failed (continuing)");
        }
    }
}
