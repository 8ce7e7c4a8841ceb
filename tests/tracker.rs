mod common;

use axum::http::StatusCode;
use common::{app, logged_in_app, logged_in_storage, week_json, MockBackend};
use hard75_client::handlers::{self, CommandError};
use hard75_client::models::Task;
use hard75_client::routes::Route;
use hard75_client::week::{Rejection, ToggleOutcome};
use hard75_client::{App, Config};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

const FAST_POLL: Duration = Duration::from_millis(50);

#[tokio::test]
async fn tracker_mount_loads_weeks_and_start_date() {
    let mock = MockBackend::spawn().await;
    mock.set_progress(json!([week_json(2, 8), week_json(1, 1)])).await;
    mock.started_days_ago(9).await;
    let app = logged_in_app(&mock);

    let view = app.tracker().await;

    let numbers: Vec<u32> = view.weeks().iter().map(|week| week.week_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    let info = view.start_date_info().unwrap();
    assert!(info.challenge_started);
    assert_eq!(view.current_user().borrow().as_deref(), Some("Ajith"));
    assert_eq!(mock.count("GetProgress").await, 1);
    assert_eq!(mock.count("GetStartDate").await, 1);

    app.tracker().await;
    assert_eq!(mock.count("GetStartDate").await, 1);
}

#[tokio::test]
async fn tracker_controller_for_day_picks_the_right_week() {
    let mock = MockBackend::spawn().await;
    mock.set_progress(json!([week_json(1, 1), week_json(2, 8)])).await;
    mock.started_days_ago(9).await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;

    let controller = view.controller_for_day(9).await.unwrap();
    assert_eq!(controller.week().await.week_number, 2);
    assert_eq!(controller.current_day().await, 10);
    assert!(view.controller_for_day(20).await.is_none());
}

#[tokio::test]
async fn tracker_saving_flag_is_shared_by_every_handle_to_a_week() {
    let mock = MockBackend::spawn().await;
    mock.set_progress(json!([week_json(1, 1)])).await;
    mock.started_days_ago(3).await;
    mock.hold("UpdateProgress").await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;

    let first = view.controller_for_day(1).await.unwrap();
    let second = view.controller_for_day(1).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let pending = tokio::spawn({
        let first = Arc::clone(&first);
        async move { first.toggle(1, Task::Diet).await }
    });
    mock.wait_for_calls("UpdateProgress", 1).await;

    assert!(matches!(
        second.toggle(1, Task::Diet).await,
        ToggleOutcome::Rejected(Rejection::Saving)
    ));
    assert!(view.weeks()[0].day(1).unwrap().diet);

    mock.release();
    assert!(pending.await.unwrap().is_saved());
    assert_eq!(mock.count("UpdateProgress").await, 1);
}

#[tokio::test]
async fn tracker_snapshot_follows_saves_and_reverts() {
    let mock = MockBackend::spawn().await;
    mock.set_progress(json!([week_json(1, 1)])).await;
    mock.started_days_ago(3).await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;
    let mut weeks = view.subscribe_weeks();
    let controller = view.controller_for_day(2).await.unwrap();

    assert!(controller.toggle(2, Task::Reading).await.is_saved());
    assert!(weeks.has_changed().unwrap());
    assert!(weeks.borrow_and_update()[0].day(2).unwrap().reading);

    mock.fail("UpdateProgress", StatusCode::INTERNAL_SERVER_ERROR).await;
    assert!(matches!(
        controller.toggle(2, Task::Diet).await,
        ToggleOutcome::Reverted(_)
    ));
    let day = view.weeks()[0].day(2).cloned().unwrap();
    assert!(!day.diet);
    assert!(day.reading);
}

#[tokio::test]
async fn tracker_reload_keeps_cells_that_are_still_saving() {
    let mock = MockBackend::spawn().await;
    mock.set_progress(json!([week_json(1, 1)])).await;
    mock.started_days_ago(3).await;
    mock.hold("UpdateProgress").await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;
    let controller = view.controller_for_day(1).await.unwrap();

    let pending = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.toggle(1, Task::Diet).await }
    });
    mock.wait_for_calls("UpdateProgress", 1).await;

    view.refresh().await;

    let reloaded = view.controller_for_day(1).await.unwrap();
    assert!(Arc::ptr_eq(&controller, &reloaded));
    assert!(reloaded.is_saving(1, Task::Diet).await);
    assert!(view.weeks()[0].day(1).unwrap().diet);
    assert!(matches!(
        reloaded.toggle(1, Task::Diet).await,
        ToggleOutcome::Rejected(Rejection::Saving)
    ));

    mock.release();
    assert!(pending.await.unwrap().is_saved());
    assert_eq!(mock.count("UpdateProgress").await, 1);
}

#[tokio::test]
async fn tracker_reset_needs_confirmation() {
    let mock = MockBackend::spawn().await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;

    assert!(!view.reset(false).await.unwrap());
    assert_eq!(mock.count("ResetProgress").await, 0);

    assert!(view.reset(true).await.unwrap());
    assert_eq!(mock.count("ResetProgress").await, 1);
    assert_eq!(mock.count("GetProgress").await, 2);
    assert_eq!(mock.count("GetStartDate").await, 2);
}

#[tokio::test]
async fn tracker_start_challenge_reloads_start_date() {
    let mock = MockBackend::spawn().await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;
    assert!(!view.start_date_info().unwrap().challenge_started);

    assert!(!view.start_challenge(false).await.unwrap());
    assert_eq!(mock.count("StartChallenge").await, 0);

    mock.started_days_ago(0).await;
    assert!(view.start_challenge(true).await.unwrap());
    assert_eq!(mock.calls_to("StartChallenge").await[0].query.as_deref(), Some("userId=42"));
    assert!(view.start_date_info().unwrap().challenge_started);
}

#[tokio::test]
async fn tracker_logout_returns_to_login() {
    let mock = MockBackend::spawn().await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;
    let user = view.current_user();

    view.logout();

    assert_eq!(app.events.current_route(), Route::Login);
    assert_eq!(*user.borrow(), None);
    assert_eq!(app.navigate("/gallery"), Route::Login);
}

#[tokio::test]
async fn tracker_polls_while_visible() {
    let mock = MockBackend::spawn().await;
    mock.set_progress(json!([week_json(1, 1)])).await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;
    let mut weeks = view.subscribe_weeks();
    let (_visible_tx, visible) = watch::channel(true);

    let handle = view.start_polling(FAST_POLL, visible);
    mock.set_progress(json!([week_json(1, 1), week_json(2, 8)])).await;

    timeout(Duration::from_secs(3), weeks.changed()).await.unwrap().unwrap();
    mock.wait_for_calls("GetProgress", 3).await;
    assert_eq!(view.weeks().len(), 2);
    assert!(mock.count("GetStartDate").await >= 2);

    drop(handle);
    sleep(Duration::from_millis(100)).await;
    let settled = mock.count("GetProgress").await;
    sleep(Duration::from_millis(250)).await;
    assert_eq!(mock.count("GetProgress").await, settled);
}

#[tokio::test]
async fn tracker_hidden_view_does_not_poll() {
    let mock = MockBackend::spawn().await;
    let app = logged_in_app(&mock);
    let view = app.tracker().await;
    let (visible_tx, visible) = watch::channel(false);

    let handle = view.start_polling(FAST_POLL, visible);
    sleep(Duration::from_millis(250)).await;
    assert_eq!(mock.count("GetProgress").await, 1);
    assert!(!handle.is_finished());

    visible_tx.send_replace(true);
    mock.wait_for_calls("GetProgress", 2).await;
    handle.stop();
}

#[tokio::test]
async fn tracker_commands_require_a_session() {
    let mock = MockBackend::spawn().await;
    let app = app(&mock);

    assert!(matches!(
        handlers::progress(&app).await,
        Err(CommandError::NotLoggedIn)
    ));
    assert!(matches!(
        handlers::gallery(&app).await,
        Err(CommandError::NotLoggedIn)
    ));
    assert!(mock.calls().await.is_empty());
}

#[tokio::test]
async fn tracker_commands_validate_input() {
    let mock = MockBackend::spawn().await;
    mock.set_progress(json!([week_json(1, 1)])).await;
    mock.started_days_ago(3).await;
    let app = logged_in_app(&mock);

    assert!(matches!(
        handlers::toggle(&app, 1, "meditation", None).await,
        Err(CommandError::UnknownTask(_))
    ));
    assert!(matches!(
        handlers::toggle(&app, 30, "diet", None).await,
        Err(CommandError::UnknownDay(30))
    ));
    assert!(matches!(
        handlers::toggle(&app, 2, "progressPic", None).await,
        Err(CommandError::PhotoRequired)
    ));
    assert!(matches!(
        handlers::reset(&app, false).await,
        Err(CommandError::NotConfirmed)
    ));
    assert!(matches!(
        handlers::login(&app, "  ", "pw").await,
        Err(CommandError::MissingCredentials)
    ));

    handlers::toggle(&app, 2, "diet", None).await.unwrap();
    assert_eq!(mock.count("UpdateProgress").await, 1);
    assert_eq!(mock.count("ResetProgress").await, 0);
}

#[tokio::test]
async fn tracker_watch_stops_when_the_session_expires() {
    let mock = MockBackend::spawn().await;
    let config = Config {
        poll_interval: FAST_POLL,
        ..Config::new(mock.base_url.as_str())
    };
    let app = App::with_storage(config, logged_in_storage());
    assert_eq!(app.events.current_route(), Route::Tracker);

    let watching = tokio::spawn({
        let app = app.clone();
        async move { handlers::watch_tracker(&app).await }
    });
    mock.wait_for_calls("GetProgress", 1).await;
    mock.fail("GetProgress", StatusCode::UNAUTHORIZED).await;

    let result = timeout(Duration::from_secs(3), watching).await.unwrap().unwrap();
    assert!(matches!(result, Err(CommandError::NotLoggedIn)));
    assert!(!app.session.is_logged_in());
    assert_eq!(app.events.current_route(), Route::Login);
}
