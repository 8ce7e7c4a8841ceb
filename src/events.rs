use crate::routes::{guard, Route};
use crate::session::SessionStore;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

const ALERT_CAPACITY: usize = 16;

/// Navigation target and user-visible alerts shared by every component.
#[derive(Debug, Clone)]
pub struct AppEvents {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    route: watch::Sender<Route>,
    alerts: broadcast::Sender<String>,
}

impl AppEvents {
    pub fn new(initial: Route) -> Self {
        let (route, _) = watch::channel(initial);
        let (alerts, _) = broadcast::channel(ALERT_CAPACITY);
        Self {
            inner: Arc::new(Inner { route, alerts }),
        }
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.inner.route.send_replace(route);
        if previous != route {
            info!("navigating from {previous} to {route}");
        }
    }

    /// Navigates to `path` after the route guard has had its say.
    pub fn open(&self, path: &str, session: &SessionStore) -> Route {
        let route = guard(Route::resolve(path), session);
        self.navigate(route);
        route
    }

    pub fn current_route(&self) -> Route {
        *self.inner.route.borrow()
    }

    pub fn subscribe_routes(&self) -> watch::Receiver<Route> {
        self.inner.route.subscribe()
    }

    pub fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("alert: {message}");
        // Nobody listening is fine; the alert is still logged.
        let _ = self.inner.alerts.send(message);
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<String> {
        self.inner.alerts.subscribe()
    }
}

impl Default for AppEvents {
    fn default() -> Self {
        Self::new(Route::Tracker)
    }
}
