//! Process-wide session state.
//!
//! The persisted fields live in the [`KeyValueStore`]; the username is also
//! published through a `watch` channel so views can react to login and logout
//! without holding the storage themselves.

use crate::errors::ApiError;
use crate::models::Session;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_ID_KEY: &str = "userId";
pub const CURRENT_USER_KEY: &str = "currentUser";

const SESSION_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, USER_ID_KEY, CURRENT_USER_KEY];

#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: KeyValueStore,
    current_user: Arc<watch::Sender<Option<String>>>,
}

impl SessionStore {
    /// Builds the store, seeding the published user from storage.
    pub fn new(storage: KeyValueStore) -> Self {
        let initial = storage.get(CURRENT_USER_KEY).filter(|name| !name.is_empty());
        let (current_user, _) = watch::channel(initial);
        Self {
            storage,
            current_user: Arc::new(current_user),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(AUTH_TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn user_id(&self) -> Option<String> {
        self.storage.get(USER_ID_KEY).filter(|id| !id.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.storage.contains(AUTH_TOKEN_KEY)
    }

    /// Last published username.
    pub fn current_user(&self) -> Option<String> {
        self.current_user.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current_user.subscribe()
    }

    pub fn storage(&self) -> &KeyValueStore {
        &self.storage
    }

    pub fn establish(&self, session: &Session) -> Result<(), ApiError> {
        self.storage.set(AUTH_TOKEN_KEY, session.token.as_str())?;
        self.storage.set(USER_ID_KEY, session.user_id.as_str())?;
        self.storage.set(CURRENT_USER_KEY, session.username.as_str())?;
        self.current_user.send_replace(Some(session.username.clone()));
        info!(user = %session.username, "session established");
        Ok(())
    }

    /// Drops every persisted session field and publishes no user.
    pub fn clear(&self) {
        if let Err(err) = self.storage.remove_all(&SESSION_KEYS) {
            warn!("failed to clear persisted session: {err}");
        }
        if self.current_user.send_replace(None).is_some() {
            info!("session cleared");
        }
    }
}
