//! Test support utilities shared by the integration suites.

#![allow(dead_code)] // Support module provides utilities that may not all be used

use std::collections::BTreeSet;
use std::sync::Arc;

use eventbook::domain::model::{NewEvent, User};
use eventbook::domain::service::{Service, ServiceConfig};
use eventbook::infra::storage::{DocEventsRepository, DocUsersRepository};
use eventbook::infra::weather::DisabledForecast;
use eventbook_store::DocStore;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse";

/// A service over a fresh in-memory store.
pub fn service() -> Service {
    let store = DocStore::in_memory();
    Service::new(
        Arc::new(DocUsersRepository::new(&store)),
        Arc::new(DocEventsRepository::new(&store)),
        Arc::new(DisabledForecast),
        ServiceConfig::default(),
    )
}

/// Register a user and return the live record.
pub fn register(svc: &Service, username: &str) -> User {
    svc.register_user(username, &format!("{username}@example.com"), PASSWORD)
        .expect("registration failed");
    svc.get_user_by_name(username).expect("user vanished")
}

/// Create an event owned by `organizer` and return its id.
pub fn create_event(svc: &Service, organizer: &User, title: &str, public: bool) -> Uuid {
    svc.create_event(
        organizer,
        NewEvent {
            title: title.to_owned(),
            description: format!("{title} description"),
            location: "Cluj".to_owned(),
            latitude: None,
            longitude: None,
            start_time: 1_700_000_000,
            end_time: 1_700_010_000,
            tags: BTreeSet::from(["test".to_owned()]),
            public,
        },
    )
    .expect("event creation failed")
}

/// Re-read a user after mutations.
pub fn reload(svc: &Service, user: &User) -> User {
    svc.get_user(user.id).expect("user vanished")
}
