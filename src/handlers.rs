//! Terminal commands. Each handler prints what the matching screen would show.

use crate::app::App;
use crate::errors::ApiError;
use crate::login::{LoginAttempt, LoginForm};
use crate::models::{ProgressPhoto, Task};
use crate::routes::Route;
use crate::ui::{render_gallery, render_tracker};
use crate::week::{Rejection, ToggleOutcome};
use std::path::Path;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("not logged in; run `hard75 login` first")]
    NotLoggedIn,
    #[error("unknown task {0:?}; expected one of diet, workoutOutside, workoutAnywhere, water, reading, progressPic")]
    UnknownTask(String),
    #[error("day {0} is not in the loaded progress")]
    UnknownDay(u32),
    #[error("toggle rejected: {0:?}")]
    Rejected(Rejection),
    #[error("confirmation required; pass --yes")]
    NotConfirmed,
    #[error("username and password are required")]
    MissingCredentials,
    #[error("progress pic needs a photo; pass --photo <file>")]
    PhotoRequired,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to read photo: {0}")]
    Photo(#[source] std::io::Error),
}

fn require_session(app: &App, path: &str) -> Result<(), CommandError> {
    match app.navigate(path) {
        Route::Login => Err(CommandError::NotLoggedIn),
        _ => Ok(()),
    }
}

pub async fn login(app: &App, username: &str, password: &str) -> Result<(), CommandError> {
    let form = LoginForm::new(username, password);
    match form.submit(&app.auth).await? {
        LoginAttempt::Incomplete => Err(CommandError::MissingCredentials),
        LoginAttempt::Submitted => {
            println!("Welcome, {username}!");
            Ok(())
        }
    }
}

pub fn logout(app: &App) {
    app.auth.logout();
    println!("Logged out.");
}

pub fn whoami(app: &App) {
    match app.auth.current_user() {
        Some(user) if app.auth.is_logged_in() => println!("{user}"),
        _ => println!("Not logged in."),
    }
}

pub async fn progress(app: &App) -> Result<(), CommandError> {
    require_session(app, "/")?;
    let view = app.tracker().await;
    let current_day = app.progress.get_current_day().await;
    let user = view.current_user().borrow().clone();
    print!(
        "{}",
        render_tracker(user.as_deref(), view.start_date_info(), current_day, &view.weeks())
    );
    Ok(())
}

pub async fn toggle(
    app: &App,
    day: u32,
    task_key: &str,
    photo: Option<&Path>,
) -> Result<(), CommandError> {
    require_session(app, "/")?;
    let task = Task::from_key(task_key).ok_or_else(|| CommandError::UnknownTask(task_key.to_string()))?;
    let view = app.tracker().await;
    let controller = view
        .controller_for_day(day)
        .await
        .ok_or(CommandError::UnknownDay(day))?;

    let outcome = match controller.toggle(day, task).await {
        ToggleOutcome::PhotoRequested { .. } => {
            let Some(path) = photo else {
                controller.on_file_selected(None).await;
                return Err(CommandError::PhotoRequired);
            };
            let photo = ProgressPhoto::from_path(path).await.map_err(CommandError::Photo)?;
            controller.on_file_selected(Some(photo)).await
        }
        outcome => outcome,
    };

    match outcome {
        ToggleOutcome::Saved => {
            let status = controller.status(day, task).await.unwrap_or(false);
            println!("Day {day} {}: {}", task.label(), if status { "done" } else { "not done" });
            Ok(())
        }
        ToggleOutcome::Reverted(err) => Err(err.into()),
        ToggleOutcome::Rejected(reason) => Err(CommandError::Rejected(reason)),
        ToggleOutcome::PhotoRequested { .. } => Err(CommandError::PhotoRequired),
    }
}

pub async fn upload(app: &App, day: u32, path: &Path) -> Result<(), CommandError> {
    require_session(app, "/")?;
    let photo = ProgressPhoto::from_path(path).await.map_err(CommandError::Photo)?;
    app.progress.upload_progress_pic(day, &photo).await?;
    println!("Uploaded {} for day {day}.", photo.file_name);
    Ok(())
}

pub async fn gallery(app: &App) -> Result<(), CommandError> {
    require_session(app, "/gallery")?;
    let view = app.gallery().await;
    print!("{}", render_gallery(view.images()));
    Ok(())
}

pub async fn reset(app: &App, confirmed: bool) -> Result<(), CommandError> {
    require_session(app, "/")?;
    let view = app.tracker().await;
    if !view.reset(confirmed).await? {
        return Err(CommandError::NotConfirmed);
    }
    println!("Progress reset.");
    Ok(())
}

pub async fn start(app: &App, confirmed: bool) -> Result<(), CommandError> {
    require_session(app, "/")?;
    let view = app.tracker().await;
    if !view.start_challenge(confirmed).await? {
        return Err(CommandError::NotConfirmed);
    }
    println!("Challenge started. Good luck!");
    Ok(())
}

/// Prints the tracker and reprints it after every poll until Ctrl-C or logout.
pub async fn watch_tracker(app: &App) -> Result<(), CommandError> {
    require_session(app, "/")?;
    let view = app.tracker().await;
    let (_visible_tx, visible) = watch::channel(true);
    let _polling = view.start_polling(app.config.poll_interval, visible);
    let mut weeks = view.subscribe_weeks();
    let mut routes = app.events.subscribe_routes();
    info!("polling every {:?}", app.config.poll_interval);

    loop {
        let current_day = app.progress.get_current_day().await;
        let user = view.current_user().borrow().clone();
        print!(
            "{}",
            render_tracker(user.as_deref(), view.start_date_info(), current_day, &view.weeks())
        );

        tokio::select! {
            changed = weeks.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            _ = routes.changed() => {
                if *routes.borrow() == Route::Login {
                    return Err(CommandError::NotLoggedIn);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
        }
    }
}
