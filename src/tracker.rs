use crate::auth::AuthService;
use crate::errors::ApiError;
use crate::events::AppEvents;
use crate::models::{StartDateInfo, WeekProgress};
use crate::polling::{spawn_polling, PollingHandle};
use crate::progress::ProgressService;
use crate::week::WeekController;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::info;

/// State behind the main checklist screen.
#[derive(Debug)]
pub struct TrackerView {
    auth: AuthService,
    progress: ProgressService,
    events: AppEvents,
    weeks: Arc<watch::Sender<Vec<WeekProgress>>>,
    start: watch::Sender<Option<StartDateInfo>>,
    controllers: Mutex<Vec<Arc<WeekController>>>,
}

impl TrackerView {
    pub fn new(auth: AuthService, progress: ProgressService, events: AppEvents) -> Self {
        let (weeks, _) = watch::channel(Vec::new());
        let (start, _) = watch::channel(None);
        Self {
            auth,
            progress,
            events,
            weeks: Arc::new(weeks),
            start,
            controllers: Mutex::new(Vec::new()),
        }
    }

    /// Creates the view and loads weeks plus the (possibly cached) start date.
    pub async fn mount(auth: AuthService, progress: ProgressService, events: AppEvents) -> Arc<Self> {
        let view = Arc::new(Self::new(auth, progress, events));
        view.load().await;
        view
    }

    /// Fetches weeks and start date, then hands each week to its controller.
    /// Controllers survive reloads so a cell's Saving flag outlives a poll.
    pub async fn load(&self) {
        let weeks = self.progress.get_progress().await;
        let info = self.progress.get_start_date_info().await;
        let current_day = self.progress.get_current_day().await;

        let mut controllers = self.controllers.lock().await;
        let mut kept = Vec::with_capacity(weeks.len());
        let mut snapshot = Vec::with_capacity(weeks.len());
        for week in weeks {
            let existing = controllers
                .iter()
                .find(|controller| controller.week_number() == week.week_number)
                .cloned();
            let controller = match existing {
                Some(controller) => {
                    controller.sync(week, current_day, info.challenge_started).await;
                    controller
                }
                None => Arc::new(
                    WeekController::new(
                        self.progress.clone(),
                        self.events.clone(),
                        week,
                        current_day,
                        info.challenge_started,
                    )
                    .with_snapshot(Arc::clone(&self.weeks)),
                ),
            };
            snapshot.push(controller.week().await);
            kept.push(controller);
        }
        *controllers = kept;
        self.weeks.send_replace(snapshot);
        self.start.send_replace(Some(info));
    }

    pub async fn refresh(&self) {
        self.progress.refresh_start_date_info();
        self.load().await;
    }

    pub fn weeks(&self) -> Vec<WeekProgress> {
        self.weeks.borrow().clone()
    }

    pub fn subscribe_weeks(&self) -> watch::Receiver<Vec<WeekProgress>> {
        self.weeks.subscribe()
    }

    pub fn start_date_info(&self) -> Option<StartDateInfo> {
        *self.start.borrow()
    }

    pub fn current_user(&self) -> watch::Receiver<Option<String>> {
        self.auth.subscribe_user()
    }

    /// Resets all progress once the user has confirmed. Returns whether a
    /// reset was sent.
    pub async fn reset(&self, confirmed: bool) -> Result<bool, ApiError> {
        if !confirmed {
            info!("reset cancelled");
            return Ok(false);
        }
        self.progress.reset_progress().await?;
        self.load().await;
        Ok(true)
    }

    pub async fn start_challenge(&self, confirmed: bool) -> Result<bool, ApiError> {
        if !confirmed {
            info!("start challenge cancelled");
            return Ok(false);
        }
        self.progress.start_challenge().await?;
        self.load().await;
        Ok(true)
    }

    pub fn logout(&self) {
        self.auth.logout();
    }

    /// The view's controller for the week containing `day`, if that week is loaded.
    pub async fn controller_for_day(&self, day: u32) -> Option<Arc<WeekController>> {
        let controllers = self.controllers.lock().await;
        for controller in controllers.iter() {
            if controller.contains(day).await {
                return Some(Arc::clone(controller));
            }
        }
        None
    }

    pub fn start_polling(self: &Arc<Self>, every: Duration, visible: watch::Receiver<bool>) -> PollingHandle {
        let view = Arc::clone(self);
        spawn_polling(every, visible, move || {
            let view = Arc::clone(&view);
            async move { view.refresh().await }
        })
    }
}
