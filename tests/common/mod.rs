#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use hard75_client::models::{DailyProgress, Session, WeekProgress};
use hard75_client::session::SessionStore;
use hard75_client::{App, Config, KeyValueStore};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

pub const TOKEN: &str = "token-abc";
pub const USER_ID: &str = "42";
pub const PASSWORD: &str = "  test123  ";

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl Call {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Debug)]
pub struct MockState {
    pub progress: Value,
    pub start_date: Value,
    pub gallery: Value,
    pub failures: HashMap<String, StatusCode>,
    pub held: HashSet<String>,
    pub calls: Vec<Call>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            progress: json!([]),
            start_date: json!({ "startDate": null, "challengeStarted": false }),
            gallery: json!([]),
            failures: HashMap::new(),
            held: HashSet::new(),
            calls: Vec::new(),
        }
    }
}

/// In-process stand-in for the checklist API.
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<Mutex<MockState>>,
    release: Arc<Notify>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        Lazy::force(&TRACING);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let mock = MockBackend {
            base_url: format!("http://{addr}/api"),
            state: Arc::new(Mutex::new(MockState::default())),
            release: Arc::new(Notify::new()),
        };

        let router = Router::new().fallback(handle).with_state(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock backend crashed");
        });
        mock
    }

    pub async fn fail(&self, path: &str, status: StatusCode) {
        self.state.lock().await.failures.insert(path.to_string(), status);
    }

    pub async fn hold(&self, path: &str) {
        self.state.lock().await.held.insert(path.to_string());
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub async fn set_progress(&self, progress: Value) {
        self.state.lock().await.progress = progress;
    }

    pub async fn set_start_date(&self, start_date: Value) {
        self.state.lock().await.start_date = start_date;
    }

    pub async fn set_gallery(&self, gallery: Value) {
        self.state.lock().await.gallery = gallery;
    }

    /// Challenge running since `days_ago` days before today.
    pub async fn started_days_ago(&self, days_ago: i64) {
        let start = chrono::Local::now().date_naive() - chrono::Duration::days(days_ago);
        self.set_start_date(json!({ "startDate": start.to_string(), "challengeStarted": true }))
            .await;
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    pub async fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls()
            .await
            .into_iter()
            .filter(|call| call.path == path)
            .collect()
    }

    pub async fn count(&self, path: &str) -> usize {
        self.calls_to(path).await.len()
    }

    pub async fn wait_for_calls(&self, path: &str, expected: usize) {
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            if self.count(path).await >= expected {
                return;
            }
            if Instant::now() > deadline {
                panic!("mock backend never saw {expected} call(s) to {path}");
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn handle(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches("/api/").to_string();
    let call = Call {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (failure, held, payload) = {
        let mut state = mock.state.lock().await;
        state.calls.push(call.clone());
        let payload = match path.as_str() {
            "GetProgress" => Some(state.progress.clone()),
            "GetStartDate" => Some(state.start_date.clone()),
            "GetGallery" => Some(state.gallery.clone()),
            _ => None,
        };
        (
            state.failures.get(&path).copied(),
            state.held.contains(&path),
            payload,
        )
    };

    if held {
        mock.release.notified().await;
    }

    if let Some(status) = failure {
        return (status, "forced failure").into_response();
    }

    match path.as_str() {
        "Login" => {
            let credentials = call.json();
            if credentials["password"] == PASSWORD {
                Json(json!({ "token": TOKEN, "userId": USER_ID })).into_response()
            } else {
                (StatusCode::UNAUTHORIZED, "bad credentials").into_response()
            }
        }
        "GetProgress" | "GetStartDate" | "GetGallery" => {
            Json(payload.unwrap_or(Value::Null)).into_response()
        }
        "UpdateProgress" | "ResetProgress" | "StartChallenge" | "UploadProgressPic" => {
            StatusCode::OK.into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn app(mock: &MockBackend) -> App {
    App::with_storage(Config::new(mock.base_url.as_str()), KeyValueStore::in_memory())
}

/// Storage holding a session from an earlier run, as if the client restarted.
pub fn logged_in_storage() -> KeyValueStore {
    let storage = KeyValueStore::in_memory();
    SessionStore::new(storage.clone())
        .establish(&Session {
            token: TOKEN.to_string(),
            user_id: USER_ID.to_string(),
            username: "Ajith".to_string(),
        })
        .expect("store session");
    storage
}

pub fn logged_in_app(mock: &MockBackend) -> App {
    App::with_storage(Config::new(mock.base_url.as_str()), logged_in_storage())
}

/// Seven empty days starting at `first_day`.
pub fn week(week_number: u32, first_day: u32) -> WeekProgress {
    WeekProgress {
        week_number,
        days: (first_day..first_day + 7)
            .map(|day| DailyProgress {
                day,
                ..Default::default()
            })
            .collect(),
    }
}

pub fn week_json(week_number: u32, first_day: u32) -> Value {
    let days: Vec<Value> = (first_day..first_day + 7)
        .map(|day| json!({ "day": day, "diet": false, "water": day % 2 == 0 }))
        .collect();
    json!({ "weekNumber": week_number, "days": days })
}
