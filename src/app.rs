use crate::auth::AuthService;
use crate::config::Config;
use crate::events::AppEvents;
use crate::gallery::GalleryView;
use crate::gateway::Gateway;
use crate::progress::{ProgressService, StartDateCache};
use crate::routes::{guard, Route};
use crate::session::SessionStore;
use crate::storage::KeyValueStore;
use crate::tracker::TrackerView;
use std::sync::Arc;

/// Every long-lived client component, wired together once at startup.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Config,
    pub events: AppEvents,
    pub session: SessionStore,
    pub gateway: Gateway,
    pub auth: AuthService,
    pub progress: ProgressService,
}

impl App {
    pub async fn open(config: Config) -> Self {
        let storage = KeyValueStore::open(&config.data_path).await;
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: KeyValueStore) -> Self {
        let session = SessionStore::new(storage);
        let events = AppEvents::new(guard(Route::Tracker, &session));
        let gateway = Gateway::new(config.api_url.as_str(), session.clone(), events.clone());
        let start_date = StartDateCache::new();
        let auth = AuthService::new(
            gateway.clone(),
            session.clone(),
            start_date.clone(),
            events.clone(),
        );
        let progress = ProgressService::new(gateway.clone(), session.clone(), start_date);

        Self {
            config,
            events,
            session,
            gateway,
            auth,
            progress,
        }
    }

    /// Routes to `path` through the session guard.
    pub fn navigate(&self, path: &str) -> Route {
        self.events.open(path, &self.session)
    }

    pub async fn tracker(&self) -> Arc<TrackerView> {
        TrackerView::mount(self.auth.clone(), self.progress.clone(), self.events.clone()).await
    }

    pub async fn gallery(&self) -> GalleryView {
        GalleryView::load(&self.progress).await
    }
}
