use eventbook_store::Versioned;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{Event, EventFilter};

/// Persistence operations for event records. Same versioned read /
/// guarded replace contract as [`UsersRepository`](super::UsersRepository).
pub trait EventsRepository: Send + Sync {
    /// Find an event by id.
    fn get(&self, id: Uuid) -> Result<Option<Versioned<Event>>, DomainError>;

    /// Insert a new event record.
    fn insert(&self, event: &Event) -> Result<(), DomainError>;

    /// Replace the whole record, guarded by the version it was read at.
    fn replace(&self, expected_version: u64, event: &Event) -> Result<u64, DomainError>;

    /// Remove an event record. Returns whether it was present.
    fn remove(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Whether a record with the given id exists.
    fn contains(&self, id: Uuid) -> bool;

    /// Events matching the AND-combined filter.
    fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, DomainError>;
}
