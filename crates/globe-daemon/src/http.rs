use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use globe_proto::directory::StationAggregator;
use globe_proto::protocol::{markers, GlobeMarker, NowPlaying, StationRecord};
use globe_proto::search::{search_stations, SEARCH_RESULT_LIMIT};
use globe_proto::state::SessionManager;
use globe_proto::timezone::TimezoneResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct HttpState {
    pub session: Arc<SessionManager>,
    pub aggregator: Arc<StationAggregator>,
    pub resolver: Arc<TimezoneResolver>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct VolumeStatus {
    volume: u8,
    muted: bool,
}

#[derive(Serialize)]
struct RefreshStatus {
    stations: usize,
}

pub fn router(app_state: HttpState) -> Router {
    Router::new()
        .route("/api/stations", get(get_stations))
        .route("/api/markers", get(get_markers))
        .route("/api/search", get(search))
        .route("/api/now", get(now_playing))
        .route("/api/select/:id", get(select_station).post(select_station))
        .route("/api/next", get(next_station).post(next_station))
        .route("/api/prev", get(prev_station).post(prev_station))
        .route("/api/toggle", get(toggle_pause).post(toggle_pause))
        .route("/api/close", get(close).post(close))
        .route("/api/volume/:volume", get(set_volume).post(set_volume))
        .route("/api/volume", get(get_volume))
        .route("/api/mute", get(toggle_mute).post(toggle_mute))
        .route("/api/refresh", post(refresh))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn get_stations(State(state): State<HttpState>) -> Json<Vec<StationRecord>> {
    Json(state.session.stations().await)
}

async fn get_markers(State(state): State<HttpState>) -> Json<Vec<GlobeMarker>> {
    let stations = state.session.stations().await;
    Json(markers(&stations))
}

async fn search(
    State(state): State<HttpState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<StationRecord>> {
    let stations = state.session.stations().await;
    let found = search_stations(&stations, &params.q, SEARCH_RESULT_LIMIT)
        .into_iter()
        .cloned()
        .collect();
    Json(found)
}

async fn now_playing(State(state): State<HttpState>) -> Json<NowPlaying> {
    Json(state.session.now_playing().await)
}

/// Look up the zone for a freshly selected station and store it, unless the
/// selection has moved on in the meantime.
async fn resolve_zone(state: &HttpState, station: &StationRecord) {
    let zone = state
        .resolver
        .resolve_timezone(station.latitude, station.longitude)
        .await;
    if !state.session.set_timezone(&station.id, zone).await {
        info!("Dropped timezone for {}: selection changed", station.id);
    }
}

async fn select_station(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<Json<NowPlaying>, StatusCode> {
    info!("HTTP API: Select station {}", id);
    let station = state.session.select(&id).await.map_err(|e| {
        warn!("Select failed: {}", e);
        StatusCode::NOT_FOUND
    })?;
    resolve_zone(&state, &station).await;
    Ok(Json(state.session.now_playing().await))
}

async fn next_station(State(state): State<HttpState>) -> Json<NowPlaying> {
    info!("HTTP API: Next station");
    if let Some(station) = state.session.next().await {
        resolve_zone(&state, &station).await;
    }
    Json(state.session.now_playing().await)
}

async fn prev_station(State(state): State<HttpState>) -> Json<NowPlaying> {
    info!("HTTP API: Previous station");
    if let Some(station) = state.session.prev().await {
        resolve_zone(&state, &station).await;
    }
    Json(state.session.now_playing().await)
}

async fn toggle_pause(State(state): State<HttpState>) -> Json<NowPlaying> {
    info!("HTTP API: Toggle pause");
    state.session.toggle_pause().await;
    Json(state.session.now_playing().await)
}

async fn close(State(state): State<HttpState>) -> Json<NowPlaying> {
    info!("HTTP API: Close player");
    state.session.close().await;
    Json(state.session.now_playing().await)
}

async fn set_volume(
    State(state): State<HttpState>,
    Path(volume): Path<i32>,
) -> Json<VolumeStatus> {
    let vol = (volume as f32 / 100.0).clamp(0.0, 1.0);
    info!("HTTP API: Set volume to {}%", volume);
    state.session.set_volume(vol).await;
    get_volume(State(state)).await
}

async fn get_volume(State(state): State<HttpState>) -> Json<VolumeStatus> {
    let session = state.session.get_state().await;
    Json(VolumeStatus {
        volume: (session.volume * 100.0).round() as u8,
        muted: session.is_muted,
    })
}

async fn toggle_mute(State(state): State<HttpState>) -> Json<VolumeStatus> {
    let muted = state.session.toggle_mute().await;
    info!("HTTP API: Mute {}", if muted { "on" } else { "off" });
    get_volume(State(state)).await
}

async fn refresh(State(state): State<HttpState>) -> Json<RefreshStatus> {
    info!("HTTP API: Refresh stations");
    let stations = state.aggregator.fetch_stations().await;
    let count = stations.len();
    state.session.replace_stations(stations).await;
    Json(RefreshStatus { stations: count })
}
