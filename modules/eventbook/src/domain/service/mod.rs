//! Domain service layer - business logic and rules.
//!
//! One [`Service`] aggregates the repositories and providers; the rules
//! live in per-concern files:
//! - `accounts` - registration, credentials, profile updates, friendships
//! - `events` - event CRUD, listing filters, visibility
//! - `invitations` - the invitation state machine (give / respond / revoke)
//! - `memberships` - join, leave, admin and ownership mutations
//! - `notifications` - the per-user notification sink
//!
//! ## Write discipline
//!
//! The store has no cross-record transactions. Every mutation is a
//! read-modify-write guarded by the record's version stamp, retried a few
//! times on a lost race. Operations touching two records write the
//! side-effect record first and the record owning the pending state last,
//! and surface a failure in between as `PartialUpdate` rather than
//! claiming success.

use std::sync::Arc;

use eventbook_store::Versioned;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{Event, User};
use crate::domain::repos::{EventsRepository, UsersRepository};
use crate::infra::auth::PasswordHasher;
use crate::infra::weather::ForecastProvider;

mod accounts;
mod events;
mod invitations;
mod memberships;
mod notifications;

pub use invitations::{GiveInvitation, InvitationOutcome};
pub use memberships::JoinOutcome;

/// How many times a read-modify-write loop re-reads after losing the
/// version race before giving up.
const WRITE_RETRIES: u32 = 3;

/// Configuration for the domain service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_username_length: usize,
    pub max_title_length: usize,
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_username_length: 64,
            max_title_length: 200,
            min_password_length: 8,
        }
    }
}

/// Domain service with the business rules for the whole module.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    events: Arc<dyn EventsRepository>,
    forecast: Arc<dyn ForecastProvider>,
    hasher: PasswordHasher,
    config: ServiceConfig,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        users: Arc<dyn UsersRepository>,
        events: Arc<dyn EventsRepository>,
        forecast: Arc<dyn ForecastProvider>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            events,
            forecast,
            hasher: PasswordHasher::default(),
            config,
        }
    }

    pub(super) fn user_by_id(&self, id: Uuid) -> Result<Versioned<User>, DomainError> {
        self.users
            .get(id)?
            .ok_or_else(|| DomainError::not_found("user"))
    }

    pub(super) fn user_by_name(&self, username: &str) -> Result<Versioned<User>, DomainError> {
        self.users
            .get_by_username(username)?
            .ok_or_else(|| DomainError::not_found("user"))
    }

    pub(super) fn event_by_id(&self, id: Uuid) -> Result<Versioned<Event>, DomainError> {
        self.events
            .get(id)?
            .ok_or_else(|| DomainError::not_found("event"))
    }

    /// Run a read-modify-write attempt, re-reading on a lost version race.
    pub(super) fn with_write_retry<T>(
        &self,
        what: &str,
        mut attempt: impl FnMut() -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut last = DomainError::write_conflict(what);
        for _ in 0..WRITE_RETRIES {
            match attempt() {
                Err(e) if e.is_write_conflict() => {
                    tracing::debug!(record = what, "lost version race, retrying");
                    last = e;
                }
                other => return other,
            }
        }
        Err(last)
    }

    /// Versioned read-modify-write of one user record. The closure may run
    /// more than once after a lost race, so it must be idempotent.
    pub(super) fn update_user_record<T>(
        &self,
        user_id: Uuid,
        mutate: impl Fn(&mut User) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        self.with_write_retry("user", || {
            let mut current = self.user_by_id(user_id)?;
            let out = mutate(&mut current.record)?;
            self.users.replace(current.version, &current.record)?;
            Ok(out)
        })
    }

    /// Versioned read-modify-write of one event record; same contract as
    /// [`Self::update_user_record`].
    pub(super) fn update_event_record<T>(
        &self,
        event_id: Uuid,
        mutate: impl Fn(&mut Event) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        self.with_write_retry("event", || {
            let mut current = self.event_by_id(event_id)?;
            let out = mutate(&mut current.record)?;
            self.events.replace(current.version, &current.record)?;
            Ok(out)
        })
    }
}
