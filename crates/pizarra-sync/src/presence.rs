//! Room membership as seen by this client.
//!
//! Fed by `userJoined` / `userLeft` notifications and replaced wholesale
//! by the `connectedUsers` snapshot the hub sends after a join.

use std::collections::HashMap;

use tracing::debug;

use crate::protocol::User;

#[derive(Debug, Default)]
pub struct PresenceTracker {
    users: HashMap<String, User>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user unless one with the same id is already present.
    pub fn on_user_joined(&mut self, user: User) -> bool {
        if self.users.contains_key(&user.user_id) {
            debug!(user_id = %user.user_id, "Duplicate join notification ignored");
            return false;
        }
        debug!(user_id = %user.user_id, username = %user.username, "User joined");
        self.users.insert(user.user_id.clone(), user);
        true
    }

    /// Remove by user id. Clearing that user's editor claim is the caller's job.
    pub fn on_user_left(&mut self, user: &User) -> bool {
        let removed = self.users.remove(&user.user_id).is_some();
        if removed {
            debug!(user_id = %user.user_id, username = %user.username, "User left");
        }
        removed
    }

    /// Authoritative resync; later duplicates in `users` win.
    pub fn replace_all(&mut self, users: Vec<User>) {
        self.users = users
            .into_iter()
            .map(|u| (u.user_id.clone(), u))
            .collect();
    }

    pub fn clear(&mut self) -> bool {
        if self.users.is_empty() {
            return false;
        }
        self.users.clear();
        true
    }

    pub fn size(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    /// Present users, sorted by id for stable display.
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        users
    }
}
