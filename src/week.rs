//! Optimistic editing of one week of the checklist.
//!
//! Each (day, task) cell is either idle or saving. A toggle writes the new
//! value locally before the backend answers and puts it back if the backend
//! refuses. A saving cell ignores further toggles, so one cell never has two
//! writes in flight.

use crate::errors::ApiError;
use crate::events::AppEvents;
use crate::models::{ProgressPhoto, Task, WeekProgress};
use crate::progress::ProgressService;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error};

pub const UPLOAD_FAILED_ALERT: &str = "Upload failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Saving,
    NotEditable,
    ChallengeNotStarted,
    UnknownDay,
    NoPendingUpload,
    NoPhoto,
}

#[derive(Debug)]
pub enum ToggleOutcome {
    Saved,
    /// The backend refused the write; local state is back to what it was.
    Reverted(ApiError),
    Rejected(Rejection),
    /// Turning the progress pic on needs a photo; hand one to
    /// [`WeekController::on_file_selected`].
    PhotoRequested { day: u32 },
}

impl ToggleOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, ToggleOutcome::Saved)
    }
}

#[derive(Debug)]
struct WeekState {
    week: WeekProgress,
    saving: HashSet<(u32, Task)>,
    current_day: i64,
    challenge_started: bool,
    pending_upload_day: Option<u32>,
}

impl WeekState {
    fn check(&self, day: u32, task: Task) -> Result<bool, Rejection> {
        if self.saving.contains(&(day, task)) {
            return Err(Rejection::Saving);
        }
        if !self.challenge_started {
            return Err(Rejection::ChallengeNotStarted);
        }
        if i64::from(day) > self.current_day {
            return Err(Rejection::NotEditable);
        }
        self.week
            .day(day)
            .map(|entry| entry.status(task))
            .ok_or(Rejection::UnknownDay)
    }

    fn set(&mut self, day: u32, task: Task, value: bool) {
        if let Some(entry) = self.week.day_mut(day) {
            entry.set_status(task, value);
        }
    }
}

#[derive(Debug)]
pub struct WeekController {
    progress: ProgressService,
    events: AppEvents,
    week_number: u32,
    state: Mutex<WeekState>,
    snapshot: Option<Arc<watch::Sender<Vec<WeekProgress>>>>,
}

impl WeekController {
    pub fn new(
        progress: ProgressService,
        events: AppEvents,
        week: WeekProgress,
        current_day: i64,
        challenge_started: bool,
    ) -> Self {
        Self {
            progress,
            events,
            week_number: week.week_number,
            snapshot: None,
            state: Mutex::new(WeekState {
                week,
                saving: HashSet::new(),
                current_day,
                challenge_started,
                pending_upload_day: None,
            }),
        }
    }

    /// Builds a controller using the cached start-date record for editability.
    pub async fn load(progress: ProgressService, events: AppEvents, week: WeekProgress) -> Self {
        let info = progress.get_start_date_info().await;
        let current_day = progress.get_current_day().await;
        Self::new(progress, events, week, current_day, info.challenge_started)
    }

    /// Mirrors every local change into the matching week of `snapshot`.
    pub fn with_snapshot(mut self, snapshot: Arc<watch::Sender<Vec<WeekProgress>>>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn week_number(&self) -> u32 {
        self.week_number
    }

    /// Takes freshly fetched data for this week. Cells with a write in flight
    /// keep their local value until that write settles.
    pub async fn sync(&self, mut week: WeekProgress, current_day: i64, challenge_started: bool) {
        let mut state = self.state.lock().await;
        for &(day, task) in &state.saving {
            if let (Some(local), Some(entry)) = (state.week.day(day), week.day_mut(day)) {
                entry.set_status(task, local.status(task));
            }
        }
        state.week = week;
        state.current_day = current_day;
        state.challenge_started = challenge_started;
    }

    pub async fn contains(&self, day: u32) -> bool {
        self.state.lock().await.week.contains(day)
    }

    pub async fn week(&self) -> WeekProgress {
        self.state.lock().await.week.clone()
    }

    pub async fn status(&self, day: u32, task: Task) -> Option<bool> {
        let state = self.state.lock().await;
        state.week.day(day).map(|entry| entry.status(task))
    }

    pub async fn is_saving(&self, day: u32, task: Task) -> bool {
        self.state.lock().await.saving.contains(&(day, task))
    }

    pub async fn is_editable(&self, day: u32) -> bool {
        let state = self.state.lock().await;
        state.challenge_started && i64::from(day) <= state.current_day
    }

    pub async fn current_day(&self) -> i64 {
        self.state.lock().await.current_day
    }

    pub async fn set_current_day(&self, current_day: i64) {
        self.state.lock().await.current_day = current_day;
    }

    pub async fn set_challenge_started(&self, started: bool) {
        self.state.lock().await.challenge_started = started;
    }

    pub async fn pending_upload_day(&self) -> Option<u32> {
        self.state.lock().await.pending_upload_day
    }

    pub async fn toggle(&self, day: u32, task: Task) -> ToggleOutcome {
        let previous = {
            let mut state = self.state.lock().await;
            let previous = match state.check(day, task) {
                Ok(previous) => previous,
                Err(reason) => {
                    debug!(day, %task, ?reason, "toggle rejected");
                    return ToggleOutcome::Rejected(reason);
                }
            };
            if task == Task::ProgressPic && !previous {
                state.pending_upload_day = Some(day);
                return ToggleOutcome::PhotoRequested { day };
            }
            state.set(day, task, !previous);
            state.saving.insert((day, task));
            self.publish(&state.week);
            previous
        };

        let result = self.progress.update_progress(day, task.key(), !previous).await;

        let mut state = self.state.lock().await;
        state.saving.remove(&(day, task));
        match result {
            Ok(()) => ToggleOutcome::Saved,
            Err(err) => {
                error!(day, %task, "update failed, reverting: {err}");
                state.set(day, task, previous);
                self.publish(&state.week);
                ToggleOutcome::Reverted(err)
            }
        }
    }

    /// Completes a progress-pic toggle. `None` means the picker was dismissed.
    pub async fn on_file_selected(&self, photo: Option<ProgressPhoto>) -> ToggleOutcome {
        let task = Task::ProgressPic;
        let Some(photo) = photo else {
            self.state.lock().await.pending_upload_day = None;
            return ToggleOutcome::Rejected(Rejection::NoPhoto);
        };
        let day = {
            let mut state = self.state.lock().await;
            let Some(day) = state.pending_upload_day.take() else {
                return ToggleOutcome::Rejected(Rejection::NoPendingUpload);
            };
            if !state.saving.insert((day, task)) {
                return ToggleOutcome::Rejected(Rejection::Saving);
            }
            day
        };

        if let Err(err) = self.progress.upload_progress_pic(day, &photo).await {
            error!(day, "progress pic upload failed: {err}");
            self.state.lock().await.saving.remove(&(day, task));
            self.events.alert(UPLOAD_FAILED_ALERT);
            return ToggleOutcome::Reverted(err);
        }

        let result = self.progress.update_progress(day, task.key(), true).await;

        let mut state = self.state.lock().await;
        state.saving.remove(&(day, task));
        match result {
            Ok(()) => {
                state.set(day, task, true);
                self.publish(&state.week);
                ToggleOutcome::Saved
            }
            Err(err) => {
                error!(day, "failed to update progress pic status: {err}");
                ToggleOutcome::Reverted(err)
            }
        }
    }

    fn publish(&self, week: &WeekProgress) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        snapshot.send_if_modified(|weeks| {
            match weeks.iter_mut().find(|slot| slot.week_number == week.week_number) {
                Some(slot) if slot != week => {
                    *slot = week.clone();
                    true
                }
                _ => false,
            }
        });
    }
}
