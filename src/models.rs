use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

/// One of the six daily checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    Diet,
    WorkoutOutside,
    WorkoutAnywhere,
    Water,
    ProgressPic,
    Reading,
}

impl Task {
    /// Display order of the week grid rows.
    pub const ALL: [Task; 6] = [
        Task::Diet,
        Task::WorkoutOutside,
        Task::WorkoutAnywhere,
        Task::Water,
        Task::ProgressPic,
        Task::Reading,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Task::Diet => "diet",
            Task::WorkoutOutside => "workoutOutside",
            Task::WorkoutAnywhere => "workoutAnywhere",
            Task::Water => "water",
            Task::ProgressPic => "progressPic",
            Task::Reading => "reading",
        }
    }

    /// Identifier the backend expects in `UpdateProgress`.
    pub fn backend_name(self) -> &'static str {
        match self {
            Task::Diet => "Diet",
            Task::WorkoutOutside => "WorkoutOutside",
            Task::WorkoutAnywhere => "WorkoutAnywhere",
            Task::Water => "Water",
            Task::ProgressPic => "ProgressPic",
            Task::Reading => "Reading",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Task::Diet => "Follow Your Diet",
            Task::WorkoutOutside => "45 Min Workout (Outside)",
            Task::WorkoutAnywhere => "45 Min Workout (Anywhere)",
            Task::Water => "Drink 1 Gallon Water",
            Task::ProgressPic => "Progress Pic",
            Task::Reading => "10 Min of Reading",
        }
    }

    pub fn from_key(key: &str) -> Option<Task> {
        Task::ALL.into_iter().find(|task| task.key() == key)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Maps a client task key to the backend identifier. Unknown keys pass through.
pub fn backend_task_name(key: &str) -> &str {
    Task::from_key(key).map_or(key, |task| task.backend_name())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub day: u32,
    pub diet: bool,
    pub workout_outside: bool,
    pub workout_anywhere: bool,
    pub water: bool,
    pub reading: bool,
    pub progress_pic: bool,
    pub photo_url: Option<String>,
}

impl DailyProgress {
    pub fn status(&self, task: Task) -> bool {
        match task {
            Task::Diet => self.diet,
            Task::WorkoutOutside => self.workout_outside,
            Task::WorkoutAnywhere => self.workout_anywhere,
            Task::Water => self.water,
            Task::ProgressPic => self.progress_pic,
            Task::Reading => self.reading,
        }
    }

    pub fn set_status(&mut self, task: Task, value: bool) {
        let slot = match task {
            Task::Diet => &mut self.diet,
            Task::WorkoutOutside => &mut self.workout_outside,
            Task::WorkoutAnywhere => &mut self.workout_anywhere,
            Task::Water => &mut self.water,
            Task::ProgressPic => &mut self.progress_pic,
            Task::Reading => &mut self.reading,
        };
        *slot = value;
    }

    pub fn completed(&self) -> usize {
        Task::ALL.iter().filter(|task| self.status(**task)).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekProgress {
    pub week_number: u32,
    pub days: Vec<DailyProgress>,
}

impl WeekProgress {
    pub fn day(&self, day: u32) -> Option<&DailyProgress> {
        self.days.iter().find(|entry| entry.day == day)
    }

    pub fn day_mut(&mut self, day: u32) -> Option<&mut DailyProgress> {
        self.days.iter_mut().find(|entry| entry.day == day)
    }

    pub fn contains(&self, day: u32) -> bool {
        self.day(day).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartDateInfo {
    pub start_date: NaiveDate,
    pub challenge_started: bool,
}

impl StartDateInfo {
    pub fn not_started(today: NaiveDate) -> Self {
        Self {
            start_date: today,
            challenge_started: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub day: u32,
    pub url: String,
    /// `None` when the backend sent a date that could not be parsed.
    pub date: Option<NaiveDate>,
}

/// A photo picked for the progress-pic upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPhoto {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ProgressPhoto {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    pub async fn from_path(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self { file_name, content })
    }

    pub fn mime_type(&self) -> &'static str {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            _ => "application/octet-stream",
        }
    }
}
