//! Accounts: registration, credentials, profile updates and friendships.
//!
//! Friendship is symmetric and denormalized into both users, so every
//! toggle is a two-record write. The initiator's record is written first
//! and the caller's own record last; a hard failure between the two is
//! reported as `PartialUpdate`, never as success.

use tracing::{debug, info};
use uuid::Uuid;

use super::Service;
use crate::domain::error::DomainError;
use crate::domain::model::User;

impl Service {
    /// Register a new account. Returns the fresh user id.
    pub fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Uuid, DomainError> {
        self.validate_identity(username, email)?;
        if password.len() < self.config.min_password_length {
            return Err(DomainError::bad_request(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        self.ensure_identity_free(username, email, None)?;

        let id = self.fresh_user_id();
        let user = User {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: self.hasher.hash(password),
            role: Default::default(),
            token_version: 0,
            friends: Default::default(),
            events_created: Default::default(),
            events_participation: Default::default(),
            active_invitations: Default::default(),
            notifications: Default::default(),
        };
        self.users.insert(&user)?;

        info!(user_id = %id, "user registered");
        Ok(id)
    }

    /// Check a username/password pair. `Unauthorized` on any mismatch; the
    /// reason never says which of the two was wrong.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let found = self.users.get_by_username(username)?;
        let Some(user) = found else {
            return Err(DomainError::unauthorized("invalid credentials"));
        };
        if !self.hasher.verify(password, &user.record.password_hash) {
            return Err(DomainError::unauthorized("invalid credentials"));
        }
        Ok(user.record)
    }

    /// Resolve a token's (user id, token version) pair to the live user.
    /// A stale version means the token was invalidated by a logout.
    pub fn current_identity(&self, user_id: Uuid, token_version: u64) -> Result<User, DomainError> {
        let user = self
            .users
            .get(user_id)?
            .ok_or_else(|| DomainError::unauthorized("unknown identity"))?;
        if user.record.token_version != token_version {
            return Err(DomainError::unauthorized("token has been invalidated"));
        }
        Ok(user.record)
    }

    /// Invalidate every outstanding token by bumping the version counter.
    pub fn logout(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let version = self.update_user_record(user_id, |user| {
            user.token_version += 1;
            Ok(user.token_version)
        })?;
        info!(user_id = %user_id, "user logged out");
        Ok(version)
    }

    /// Update the caller's own username, email and optionally password.
    pub fn update_account(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        password: Option<&str>,
    ) -> Result<(), DomainError> {
        self.validate_identity(username, email)?;
        self.ensure_identity_free(username, email, Some(user_id))?;
        let password_hash = password.map(|p| self.hasher.hash(p));

        self.update_user_record(user_id, |user| {
            user.username = username.to_owned();
            user.email = email.to_owned();
            if let Some(hash) = &password_hash {
                user.password_hash = hash.clone();
            }
            Ok(())
        })?;
        info!(user_id = %user_id, "account updated");
        Ok(())
    }

    /// Delete the caller's own account record.
    pub fn delete_account(&self, user_id: Uuid) -> Result<(), DomainError> {
        if !self.users.remove(user_id)? {
            return Err(DomainError::not_found("user"));
        }
        info!(user_id = %user_id, "account deleted");
        Ok(())
    }

    pub fn get_user_by_name(&self, username: &str) -> Result<User, DomainError> {
        debug!(username, "looking up user by name");
        Ok(self.user_by_name(username)?.record)
    }

    pub fn get_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        debug!(user_id = %user_id, "looking up user by id");
        Ok(self.user_by_id(user_id)?.record)
    }

    pub fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.all()
    }

    /// Record a symmetric friendship between two users. Used by the
    /// invitation engine when a friend request is accepted. The `owner` is
    /// written last.
    pub(super) fn add_friendship(&self, other: Uuid, owner: Uuid) -> Result<(), DomainError> {
        self.update_user_record(other, |user| {
            user.friends.insert(owner);
            Ok(())
        })?;
        self.update_user_record(owner, |user| {
            user.friends.insert(other);
            Ok(())
        })
        .map_err(|e| friendship_partial(other, owner, &e))?;
        info!(user_a = %other, user_b = %owner, "friendship recorded");
        Ok(())
    }

    /// Remove an existing friendship from both sides.
    pub fn remove_friend(&self, caller: Uuid, friend_id: Uuid) -> Result<(), DomainError> {
        let current = self.user_by_id(caller)?.record;
        if !current.friends.contains(&friend_id) {
            return Err(DomainError::bad_request("not friends"));
        }
        // Friend record first, the caller's own record last.
        self.update_user_record(friend_id, |user| {
            user.friends.remove(&caller);
            Ok(())
        })?;
        self.update_user_record(caller, |user| {
            user.friends.remove(&friend_id);
            Ok(())
        })
        .map_err(|e| friendship_partial(friend_id, caller, &e))?;
        info!(user_id = %caller, friend_id = %friend_id, "friendship removed");
        Ok(())
    }

    /// Full replace of one user's friends set. The symmetric counterpart
    /// writes are the caller's responsibility.
    pub fn set_friends(
        &self,
        user_id: Uuid,
        friends: std::collections::BTreeSet<Uuid>,
    ) -> Result<(), DomainError> {
        self.update_user_record(user_id, |user| {
            user.friends = friends.clone();
            Ok(())
        })
    }

    fn validate_identity(&self, username: &str, email: &str) -> Result<(), DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::bad_request("username cannot be empty"));
        }
        if username.len() > self.config.max_username_length {
            return Err(DomainError::bad_request(format!(
                "username too long: {} characters (max: {})",
                username.len(),
                self.config.max_username_length
            )));
        }
        if !email.contains('@') {
            return Err(DomainError::bad_request(format!(
                "invalid email format: '{email}'"
            )));
        }
        Ok(())
    }

    /// Username and email must be unique across all users, excluding the
    /// record being updated.
    fn ensure_identity_free(
        &self,
        username: &str,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), DomainError> {
        if let Some(existing) = self.users.get_by_username(username)? {
            if exclude != Some(existing.record.id) {
                return Err(DomainError::conflict("username already registered"));
            }
        }
        if let Some(existing) = self.users.get_by_email(email)? {
            if exclude != Some(existing.record.id) {
                return Err(DomainError::conflict("email already registered"));
            }
        }
        Ok(())
    }

    /// Collision-checked fresh user id.
    fn fresh_user_id(&self) -> Uuid {
        let mut id = Uuid::new_v4();
        while self.users.contains(id) {
            id = Uuid::new_v4();
        }
        id
    }
}

fn friendship_partial(applied: Uuid, failed: Uuid, cause: &DomainError) -> DomainError {
    DomainError::partial_update(
        format!("user {applied}"),
        format!("user {failed}"),
        cause.to_string(),
    )
}
