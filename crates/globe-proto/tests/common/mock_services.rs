//! In-process stand-ins for the station directory and the timezone service.
//!
//! Both run on an ephemeral localhost port.  Directory responses are keyed by
//! `"<countrycode|world>:<order|default>"`; every request is recorded with its
//! query string and User-Agent so tests can assert on the plan.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    /// 200 with a body that is not JSON.
    Garbage,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub params: HashMap<String, String>,
    pub user_agent: Option<String>,
    pub arrived: Instant,
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<HashMap<String, Reply>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _task: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn directory_key(params: &HashMap<String, String>) -> String {
    format!(
        "{}:{}",
        params.get("countrycode").map(String::as_str).unwrap_or("world"),
        params.get("order").map(String::as_str).unwrap_or("default"),
    )
}

pub async fn spawn_directory(replies: HashMap<String, Reply>) -> MockServer {
    spawn("/json/stations/search", replies, directory_key, Duration::ZERO).await
}

/// Like [`spawn_directory`], but every request is recorded on arrival and
/// then held for `delay` before the reply goes out.
pub async fn spawn_slow_directory(replies: HashMap<String, Reply>, delay: Duration) -> MockServer {
    spawn("/json/stations/search", replies, directory_key, delay).await
}

/// Timezone replies are keyed by the `longitude` parameter as sent.
pub async fn spawn_timezone(replies: HashMap<String, Reply>) -> MockServer {
    spawn(
        "/api/timezone",
        replies,
        |p| p.get("longitude").cloned().unwrap_or_default(),
        Duration::ZERO,
    )
    .await
}

async fn spawn(
    path: &str,
    replies: HashMap<String, Reply>,
    key: fn(&HashMap<String, String>) -> String,
    delay: Duration,
) -> MockServer {
    let state = MockState {
        replies: Arc::new(replies),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let requests = Arc::clone(&state.requests);

    let handler = move |State(state): State<MockState>,
                        headers: HeaderMap,
                        Query(params): Query<HashMap<String, String>>| async move {
        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let reply = state.replies.get(&key(&params)).cloned();
        state.requests.lock().unwrap().push(RecordedRequest {
            params,
            user_agent,
            arrived: Instant::now(),
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        respond(reply)
    };

    let app = Router::new().route(path, get(handler)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{}{}", addr, path),
        requests,
        _task: task,
    }
}

fn respond(reply: Option<Reply>) -> Response {
    match reply {
        Some(Reply::Json(body)) => axum::Json(body).into_response(),
        Some(Reply::Status(code)) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Some(Reply::Garbage) => (StatusCode::OK, "<html>not json</html>").into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A directory station object in the radio-browser wire shape.
pub fn station(id: &str, name: &str, lat: Option<f64>, lon: Option<f64>, url: &str) -> Value {
    json!({
        "stationuuid": id,
        "name": name,
        "url": url,
        "url_resolved": url,
        "homepage": "",
        "favicon": "",
        "country": "India",
        "countrycode": "IN",
        "state": "Delhi",
        "language": "hindi",
        "tags": "news,talk",
        "votes": 1,
        "codec": "MP3",
        "bitrate": 128,
        "clickcount": 5,
        "clicktrend": 0,
        "geo_lat": lat,
        "geo_long": lon,
    })
}

pub fn good(id: &str, name: &str) -> Value {
    station(id, name, Some(28.6), Some(77.2), "https://stream.example/live")
}
