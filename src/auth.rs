use crate::errors::ApiError;
use crate::events::AppEvents;
use crate::gateway::Gateway;
use crate::normalize;
use crate::progress::StartDateCache;
use crate::routes::Route;
use crate::session::SessionStore;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info};

pub const LOGIN_FAILED_ALERT: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Login and logout on top of the [`SessionStore`].
#[derive(Debug, Clone)]
pub struct AuthService {
    gateway: Gateway,
    session: SessionStore,
    start_date: StartDateCache,
    events: AppEvents,
}

impl AuthService {
    pub fn new(
        gateway: Gateway,
        session: SessionStore,
        start_date: StartDateCache,
        events: AppEvents,
    ) -> Self {
        Self {
            gateway,
            session,
            start_date,
            events,
        }
    }

    /// Exchanges credentials for a token. Failures are logged and alerted here;
    /// the error is still returned so callers can stop early.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let result = self.try_login(username, password).await;
        match &result {
            Ok(()) => {
                self.start_date.invalidate();
                self.events.navigate(Route::Tracker);
            }
            Err(err) => {
                error!("login failed: {err}");
                self.events.alert(LOGIN_FAILED_ALERT);
            }
        }
        result
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let payload = self
            .gateway
            .post_json("Login", &LoginRequest { username, password })
            .await?;
        let session = normalize::session(&payload, username)?;
        self.session.establish(&session)
    }

    pub fn logout(&self) {
        self.session.clear();
        self.start_date.invalidate();
        info!("logged out");
        self.events.navigate(Route::Login);
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn current_user(&self) -> Option<String> {
        self.session.current_user()
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<String>> {
        self.session.subscribe()
    }
}
