use crate::models::{GalleryImage, StartDateInfo, Task, WeekProgress};
use std::fmt::Write;

const LABEL_WIDTH: usize = 28;

/// Text grid of one week: task rows against day columns. Future days show `.`.
pub fn render_week(week: &WeekProgress, current_day: i64) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<LABEL_WIDTH$}", format!("Week #{}", week.week_number));
    for day in &week.days {
        let _ = write!(out, "{:>4}", day.day);
    }
    out.push('\n');

    for task in Task::ALL {
        let _ = write!(out, "{:<LABEL_WIDTH$}", task.label());
        for day in &week.days {
            let mark = if i64::from(day.day) > current_day {
                "."
            } else if day.status(task) {
                "X"
            } else {
                "_"
            };
            let _ = write!(out, "{mark:>4}");
        }
        out.push('\n');
    }
    out
}

pub fn render_tracker(
    user: Option<&str>,
    start: Option<StartDateInfo>,
    current_day: i64,
    weeks: &[WeekProgress],
) -> String {
    let mut out = String::new();
    if let Some(user) = user {
        let _ = writeln!(out, "Welcome, {user}!");
    }
    out.push_str("#75HARD Checklist\n");
    match start {
        Some(info) if info.challenge_started => {
            let _ = writeln!(
                out,
                "Start Date: {} (day {current_day})",
                info.start_date.format("%b %-d, %Y")
            );
        }
        _ => out.push_str("Challenge not started yet.\n"),
    }
    if weeks.is_empty() {
        out.push_str("\nNo progress to show.\n");
    }
    for week in weeks {
        out.push('\n');
        out.push_str(&render_week(week, current_day));
    }
    out
}

pub fn render_gallery(images: &[GalleryImage]) -> String {
    if images.is_empty() {
        return "No progress pictures yet.\n".to_string();
    }
    let mut out = String::new();
    for image in images {
        let date = image
            .date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        let _ = writeln!(out, "Day {:>2}  {date}  {}", image.day, image.url);
    }
    out
}
