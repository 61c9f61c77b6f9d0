//! Credentials handed to the sync core by the authentication service.
//!
//! Issuing and persisting tokens happens elsewhere; the core only asks for
//! the current bearer token and the identity it belongs to.

use std::sync::{Arc, RwLock};

use crate::protocol::User;

/// Source of the bearer token and the local user's identity.
pub trait AuthProvider: Send + Sync {
    fn token(&self) -> Option<String>;
    fn user(&self) -> Option<User>;
}

/// A logged-in user and their bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: User,
    pub token: String,
}

impl Credentials {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AuthProvider for Credentials {
    fn token(&self) -> Option<String> {
        (!self.token.is_empty()).then(|| self.token.clone())
    }

    fn user(&self) -> Option<User> {
        Some(self.user.clone())
    }
}

/// Credentials that can be swapped at runtime (login, logout, token refresh).
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, credentials: Credentials) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(credentials);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    fn current(&self) -> Option<Credentials> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("credentials", &self.current())
            .finish()
    }
}

impl AuthProvider for CredentialStore {
    fn token(&self) -> Option<String> {
        self.current().and_then(|c| c.token())
    }

    fn user(&self) -> Option<User> {
        self.current().map(|c| c.user)
    }
}
