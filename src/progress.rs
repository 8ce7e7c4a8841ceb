use crate::errors::ApiError;
use crate::gateway::Gateway;
use crate::models::{backend_task_name, GalleryImage, ProgressPhoto, StartDateInfo, WeekProgress};
use crate::normalize;
use crate::session::SessionStore;
use chrono::{Local, NaiveDate};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

/// Shared slot for the start-date record. The slot holds a once-cell so
/// concurrent readers await a single fetch; invalidation swaps in an empty slot
/// and leaves any fetch already in flight to finish into the old cell.
#[derive(Debug, Clone, Default)]
pub struct StartDateCache {
    slot: Arc<Mutex<Option<Arc<OnceCell<StartDateInfo>>>>>,
}

impl StartDateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    pub fn is_cached(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.as_ref().is_some_and(|cell| cell.initialized())
    }

    fn cell(&self) -> Arc<OnceCell<StartDateInfo>> {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(slot.get_or_insert_with(|| Arc::new(OnceCell::new())))
    }
}

#[derive(Debug, Serialize)]
struct UpdateProgressRequest<'a> {
    #[serde(rename = "Day")]
    day: u32,
    #[serde(rename = "Task")]
    task: &'a str,
    #[serde(rename = "Status")]
    status: bool,
}

#[derive(Debug, Clone)]
pub struct ProgressService {
    gateway: Gateway,
    session: SessionStore,
    start_date: StartDateCache,
}

impl ProgressService {
    pub fn new(gateway: Gateway, session: SessionStore, start_date: StartDateCache) -> Self {
        Self {
            gateway,
            session,
            start_date,
        }
    }

    pub fn start_date_cache(&self) -> &StartDateCache {
        &self.start_date
    }

    /// All weeks, or an empty list when the fetch fails for any reason.
    pub async fn get_progress(&self) -> Vec<WeekProgress> {
        match self.gateway.get_value("GetProgress").await {
            Ok(payload) => normalize::weeks(&payload),
            Err(err) => {
                error!("error fetching progress, using empty grid: {err}");
                Vec::new()
            }
        }
    }

    pub async fn get_start_date_info(&self) -> StartDateInfo {
        let cell = self.start_date.cell();
        *cell.get_or_init(|| self.fetch_start_date_info()).await
    }

    pub async fn get_start_date(&self) -> NaiveDate {
        self.get_start_date_info().await.start_date
    }

    pub async fn get_challenge_status(&self) -> bool {
        self.get_start_date_info().await.challenge_started
    }

    pub async fn get_current_day(&self) -> i64 {
        let start = self.get_start_date().await;
        current_day_at(start, today())
    }

    pub fn refresh_start_date_info(&self) {
        self.start_date.invalidate();
    }

    pub async fn update_progress(&self, day: u32, task: &str, status: bool) -> Result<(), ApiError> {
        let payload = UpdateProgressRequest {
            day,
            task: backend_task_name(task),
            status,
        };
        self.gateway.post_json("UpdateProgress", &payload).await?;
        Ok(())
    }

    pub async fn reset_progress(&self) -> Result<(), ApiError> {
        self.gateway.post_json("ResetProgress", &json!({})).await?;
        self.refresh_start_date_info();
        info!("progress reset");
        Ok(())
    }

    pub async fn start_challenge(&self) -> Result<(), ApiError> {
        let user_id = self.session.user_id().ok_or(ApiError::MissingUserId)?;
        let request = self
            .gateway
            .request(Method::POST, "StartChallenge")
            .query(&[("userId", user_id.as_str())])
            .json(&json!({}));
        self.gateway.send(request).await?;
        self.refresh_start_date_info();
        info!(user_id = %user_id, "challenge started");
        Ok(())
    }

    pub async fn upload_progress_pic(&self, day: u32, photo: &ProgressPhoto) -> Result<(), ApiError> {
        let file = Part::bytes(photo.content.clone())
            .file_name(photo.file_name.clone())
            .mime_str(photo.mime_type())?;
        let form = Form::new().part("file", file).text("day", day.to_string());
        let request = self
            .gateway
            .request(Method::POST, "UploadProgressPic")
            .multipart(form);
        self.gateway.send(request).await?;
        info!(day, file = %photo.file_name, "progress pic uploaded");
        Ok(())
    }

    pub async fn get_gallery_images(&self) -> Vec<GalleryImage> {
        match self.gateway.get_value("GetGallery").await {
            Ok(payload) => normalize::gallery(&payload),
            Err(err) => {
                error!("error fetching gallery: {err}");
                Vec::new()
            }
        }
    }

    async fn fetch_start_date_info(&self) -> StartDateInfo {
        match self.gateway.get_value("GetStartDate").await {
            Ok(payload) => normalize::start_date_info(&payload, today()),
            Err(err) => {
                warn!("failed to get start date info, defaulting to today and not started: {err}");
                StartDateInfo::not_started(today())
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 1-based challenge day for `today`, counting whole calendar days since `start`.
pub fn current_day_at(start: NaiveDate, today: NaiveDate) -> i64 {
    (today - start).num_days() + 1
}
