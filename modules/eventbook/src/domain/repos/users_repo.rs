use eventbook_store::Versioned;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::User;

/// Persistence operations for user records.
///
/// Reads hand back the version stamp the record was read at; writers pass
/// it to `replace` so lost updates surface as
/// [`DomainError::WriteConflict`](crate::domain::error::DomainError) instead
/// of silently overwriting.
pub trait UsersRepository: Send + Sync {
    /// Find a user by id.
    fn get(&self, id: Uuid) -> Result<Option<Versioned<User>>, DomainError>;

    /// Find a user by exact username.
    fn get_by_username(&self, username: &str) -> Result<Option<Versioned<User>>, DomainError>;

    /// Find a user by exact email.
    fn get_by_email(&self, email: &str) -> Result<Option<Versioned<User>>, DomainError>;

    /// Insert a new user record.
    fn insert(&self, user: &User) -> Result<(), DomainError>;

    /// Replace the whole record, guarded by the version it was read at.
    fn replace(&self, expected_version: u64, user: &User) -> Result<u64, DomainError>;

    /// Remove a user record. Returns whether it was present.
    fn remove(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Whether a record with the given id exists.
    fn contains(&self, id: Uuid) -> bool;

    /// Every user record.
    fn all(&self) -> Result<Vec<User>, DomainError>;
}
