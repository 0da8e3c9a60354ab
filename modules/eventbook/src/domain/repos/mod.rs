//! Repository traits abstracting the document store from the services.

mod events_repo;
mod users_repo;

pub use events_repo::EventsRepository;
pub use users_repo::UsersRepository;
