//! In-memory user registry
//!
//! Single-key operations are atomic through the map's shard locks. There is
//! no cross-key transaction: a snapshot taken while other tasks write may or
//! may not include those writes.

use dashmap::DashMap;
use tracing::debug;

use super::models::{Credentials, UserRecord};

#[derive(Debug, Default)]
pub struct UserRegistry {
    users: DashMap<String, UserRecord>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or wholesale replace the record stored under `user_id`
    pub fn put(&self, user_id: &str, user: UserRecord) {
        debug!(user = ?user, "Storing user");
        self.users.insert(user_id.to_string(), user);
    }

    pub fn get(&self, user_id: &str) -> Option<UserRecord> {
        self.users.get(user_id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every registered user
    pub fn all_users(&self) -> Vec<UserRecord> {
        self.users
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Remove a user, returning the removed record. Absent keys are a no-op.
    pub fn remove(&self, user_id: &str) -> Option<UserRecord> {
        let removed = self.users.remove(user_id).map(|(_, user)| user);
        if removed.is_some() {
            debug!(user_id = %user_id, "Removed user");
        }
        removed
    }

    /// Swap in a new credential triple, but only if the stored triple is
    /// still `expected`.
    ///
    /// Returns false when the user is no longer registered (a removed user is
    /// never recreated) or when the credentials changed since `expected` was
    /// read, e.g. by a newer login.
    pub fn update_credentials(
        &self,
        user_id: &str,
        expected: &Credentials,
        credentials: Credentials,
    ) -> bool {
        match self.users.get_mut(user_id) {
            Some(mut entry) if entry.credentials == *expected => {
                entry.credentials = credentials;
                true
            }
            Some(_) => {
                debug!(user_id = %user_id, "Credentials changed concurrently, keeping newer ones");
                false
            }
            None => false,
        }
    }

    /// Set or clear the bot token of an existing user
    pub fn set_bot_token(&self, user_id: &str, token: Option<String>) -> bool {
        match self.users.get_mut(user_id) {
            Some(mut entry) => {
                entry.bot_access_token = token;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
