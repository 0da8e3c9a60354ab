//! Document-store implementations of the repository traits.
//!
//! Each entity type lives in its own named collection; lookups are
//! exact-match predicates over the decoded records.

use eventbook_store::{Collection, DocStore, Versioned};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{Event, EventFilter, User};
use crate::domain::repos::{EventsRepository, UsersRepository};

pub const USERS_COLLECTION: &str = "users";
pub const EVENTS_COLLECTION: &str = "events";

/// User records in the `users` collection.
#[derive(Clone)]
pub struct DocUsersRepository {
    users: Collection<User>,
}

impl DocUsersRepository {
    #[must_use]
    pub fn new(store: &DocStore) -> Self {
        Self {
            users: store.collection(USERS_COLLECTION),
        }
    }
}

impl UsersRepository for DocUsersRepository {
    fn get(&self, id: Uuid) -> Result<Option<Versioned<User>>, DomainError> {
        Ok(self.users.get(id)?)
    }

    fn get_by_username(&self, username: &str) -> Result<Option<Versioned<User>>, DomainError> {
        Ok(self.users.find_one(|u| u.username == username)?)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<Versioned<User>>, DomainError> {
        Ok(self.users.find_one(|u| u.email == email)?)
    }

    fn insert(&self, user: &User) -> Result<(), DomainError> {
        self.users.insert(user)?;
        Ok(())
    }

    fn replace(&self, expected_version: u64, user: &User) -> Result<u64, DomainError> {
        Ok(self.users.replace(expected_version, user)?)
    }

    fn remove(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.users.remove(id)?)
    }

    fn contains(&self, id: Uuid) -> bool {
        self.users.contains(id)
    }

    fn all(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.all()?)
    }
}

/// Event records in the `events` collection.
#[derive(Clone)]
pub struct DocEventsRepository {
    events: Collection<Event>,
}

impl DocEventsRepository {
    #[must_use]
    pub fn new(store: &DocStore) -> Self {
        Self {
            events: store.collection(EVENTS_COLLECTION),
        }
    }
}

impl EventsRepository for DocEventsRepository {
    fn get(&self, id: Uuid) -> Result<Option<Versioned<Event>>, DomainError> {
        Ok(self.events.get(id)?)
    }

    fn insert(&self, event: &Event) -> Result<(), DomainError> {
        self.events.insert(event)?;
        Ok(())
    }

    fn replace(&self, expected_version: u64, event: &Event) -> Result<u64, DomainError> {
        Ok(self.events.replace(expected_version, event)?)
    }

    fn remove(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.events.remove(id)?)
    }

    fn contains(&self, id: Uuid) -> bool {
        self.events.contains(id)
    }

    fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, DomainError> {
        Ok(self.events.find(|event| filter.matches(event))?)
    }
}
