use crate::error::SessionError;
use crate::protocol::{CameraTarget, NowPlaying, StationRecord};
use crate::timezone;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Playback session as the player widget sees it.  Nothing here is persisted;
/// a new process starts with no selection.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Monotonic revision counter — incremented on every state change.
    pub rev: u64,
    pub stations: Vec<StationRecord>,
    pub selected: Option<StationRecord>,
    pub is_playing: bool,
    pub volume: f32,
    pub is_muted: bool,
    /// Zone of the selected station, once resolved.
    pub timezone: Option<String>,
}

impl SessionState {
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        self.stations.iter().position(|s| s.id == selected.id)
    }

    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying {
            rev: self.rev,
            station: self.selected.clone(),
            is_playing: self.is_playing,
            volume: self.volume,
            is_muted: self.is_muted,
            effective_volume: self.effective_volume(),
            timezone: self.timezone.clone(),
            station_time: self.timezone.as_deref().map(timezone::format_current_time),
            zone_abbreviation: self
                .timezone
                .as_deref()
                .map(timezone::timezone_abbreviation)
                .unwrap_or_default(),
            local_time: timezone::format_local_time(),
            camera: self
                .selected
                .as_ref()
                .map(CameraTarget::focus)
                .unwrap_or_else(CameraTarget::default_view),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next,
    Prev,
}

/// Volume used when a caller hands over something that is not a number.
pub const DEFAULT_VOLUME: f32 = 0.7;

pub struct SessionManager {
    state: Arc<RwLock<SessionState>>,
}

impl SessionManager {
    pub fn new(stations: Vec<StationRecord>, volume: f32) -> Self {
        let state = SessionState {
            rev: 1,
            stations,
            volume: if volume.is_finite() {
                volume.clamp(0.0, 1.0)
            } else {
                DEFAULT_VOLUME
            },
            ..SessionState::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn now_playing(&self) -> NowPlaying {
        self.state.read().await.now_playing()
    }

    pub async fn stations(&self) -> Vec<StationRecord> {
        self.state.read().await.stations.clone()
    }

    /// Install a fresh aggregation.  The selection survives only if its id is
    /// still in the new list.
    pub async fn replace_stations(&self, stations: Vec<StationRecord>) {
        let mut state = self.state.write().await;
        let keep = state
            .selected
            .as_ref()
            .map(|sel| stations.iter().any(|s| s.id == sel.id))
            .unwrap_or(false);
        if !keep {
            state.selected = None;
            state.is_playing = false;
            state.timezone = None;
        }
        state.stations = stations;
        state.rev += 1;
    }

    pub async fn select(&self, id: &str) -> Result<StationRecord, SessionError> {
        let mut state = self.state.write().await;
        let station = state
            .stations
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownStation(id.to_string()))?;
        set_selected(&mut state, station.clone());
        Ok(station)
    }

    /// Move to the following station, wrapping at the end.  `None` when
    /// nothing is selected or the list is empty.
    pub async fn next(&self) -> Option<StationRecord> {
        self.step(Step::Next).await
    }

    /// Move to the preceding station, wrapping at the start.
    pub async fn prev(&self) -> Option<StationRecord> {
        self.step(Step::Prev).await
    }

    async fn step(&self, step: Step) -> Option<StationRecord> {
        let mut state = self.state.write().await;
        let len = state.stations.len();
        if len == 0 || state.selected.is_none() {
            return None;
        }

        let target = match (state.selected_index(), step) {
            (Some(i), Step::Next) => (i + 1) % len,
            (Some(i), Step::Prev) => (i + len - 1) % len,
            // Selected station vanished from the list.
            (None, Step::Next) => 0,
            (None, Step::Prev) => len - 1,
        };
        let station = state.stations[target].clone();
        set_selected(&mut state, station.clone());
        Some(station)
    }

    /// Flip play/pause.  Returns the new `is_playing`, or `None` without a
    /// selection.
    pub async fn toggle_pause(&self) -> Option<bool> {
        let mut state = self.state.write().await;
        state.selected.as_ref()?;
        state.is_playing = !state.is_playing;
        state.rev += 1;
        Some(state.is_playing)
    }

    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.selected = None;
        state.is_playing = false;
        state.timezone = None;
        state.rev += 1;
    }

    /// Set the volume, clamped to `0.0..=1.0`.  NaN and infinities are
    /// ignored.
    pub async fn set_volume(&self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let mut state = self.state.write().await;
        state.volume = volume.clamp(0.0, 1.0);
        if state.volume > 0.0 {
            state.is_muted = false;
        }
        state.rev += 1;
    }

    pub async fn toggle_mute(&self) -> bool {
        let mut state = self.state.write().await;
        state.is_muted = !state.is_muted;
        state.rev += 1;
        state.is_muted
    }

    /// Record the zone resolved for `station_id`.  Dropped (returns false) if
    /// the selection moved on while the lookup was in flight.
    pub async fn set_timezone(&self, station_id: &str, zone: String) -> bool {
        let mut state = self.state.write().await;
        let current = state.selected.as_ref().map(|s| s.id.as_str());
        if current != Some(station_id) {
            return false;
        }
        state.timezone = Some(zone);
        state.rev += 1;
        true
    }
}

fn set_selected(state: &mut SessionState, station: StationRecord) {
    state.selected = Some(station);
    state.is_playing = true;
    state.timezone = None; // stale zone from the previous station
    state.rev += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::tests::raw;

    fn stations(ids: &[&str]) -> Vec<StationRecord> {
        ids.iter()
            .map(|id| StationRecord::from_directory(raw(id)).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_next_prev_wrap() {
        let session = SessionManager::new(stations(&["a", "b", "c"]), 0.7);
        session.select("c").await.unwrap();
        assert_eq!(session.next().await.unwrap().id, "a");
        assert_eq!(session.prev().await.unwrap().id, "c");
        assert_eq!(session.prev().await.unwrap().id, "b");
        assert_eq!(session.next().await.unwrap().id, "c");
    }

    #[tokio::test]
    async fn test_step_without_selection_is_noop() {
        let session = SessionManager::new(stations(&["a", "b"]), 0.7);
        let rev = session.get_state().await.rev;
        assert!(session.next().await.is_none());
        assert!(session.prev().await.is_none());
        assert_eq!(session.get_state().await.rev, rev);

        let empty = SessionManager::new(Vec::new(), 0.7);
        assert!(empty.next().await.is_none());
    }

    #[tokio::test]
    async fn test_select_unknown_station() {
        let session = SessionManager::new(stations(&["a"]), 0.7);
        assert_eq!(
            session.select("zzz").await,
            Err(SessionError::UnknownStation("zzz".to_string()))
        );
        assert!(session.get_state().await.selected.is_none());
    }

    #[tokio::test]
    async fn test_replace_keeps_surviving_selection() {
        let session = SessionManager::new(stations(&["a", "b"]), 0.7);
        session.select("b").await.unwrap();
        session.replace_stations(stations(&["b", "c"])).await;
        assert_eq!(session.get_state().await.selected.unwrap().id, "b");

        session.replace_stations(stations(&["c"])).await;
        let state = session.get_state().await;
        assert!(state.selected.is_none());
        assert!(!state.is_playing);
    }

    #[tokio::test]
    async fn test_vanished_selection_steps_to_ends() {
        let session = SessionManager::new(stations(&["a", "b", "c"]), 0.7);
        session.select("b").await.unwrap();
        // Bypass replace_stations so the stale selection stays in place.
        session.state.write().await.stations = stations(&["x", "y", "z"]);
        assert_eq!(session.next().await.unwrap().id, "x");
        session.state.write().await.stations = stations(&["p", "q"]);
        assert_eq!(session.prev().await.unwrap().id, "q");
    }

    #[tokio::test]
    async fn test_stale_timezone_dropped() {
        let session = SessionManager::new(stations(&["a", "b"]), 0.7);
        session.select("a").await.unwrap();
        session.select("b").await.unwrap();
        assert!(!session.set_timezone("a", "Asia/Kolkata".to_string()).await);
        assert!(session.get_state().await.timezone.is_none());
        assert!(session.set_timezone("b", "Asia/Kolkata".to_string()).await);

        let now = session.now_playing().await;
        assert_eq!(now.timezone.as_deref(), Some("Asia/Kolkata"));
        assert!(now.station_time.is_some());
        assert_eq!(now.zone_abbreviation, "");
        assert_eq!(now.camera.altitude, 0.25);

        // A new selection clears the old zone.
        session.select("a").await.unwrap();
        assert!(session.now_playing().await.timezone.is_none());
    }

    #[tokio::test]
    async fn test_volume_and_mute() {
        let session = SessionManager::new(stations(&["a"]), 3.0);
        assert_eq!(session.get_state().await.volume, 1.0);

        assert!(session.toggle_mute().await);
        assert_eq!(session.get_state().await.effective_volume(), 0.0);

        session.set_volume(0.0).await;
        assert!(session.get_state().await.is_muted);
        session.set_volume(0.4).await;
        let state = session.get_state().await;
        assert!(!state.is_muted);
        assert_eq!(state.effective_volume(), 0.4);

        session.set_volume(-1.0).await;
        assert_eq!(session.get_state().await.volume, 0.0);
    }

    #[tokio::test]
    async fn test_non_finite_volume_never_stored() {
        let session = SessionManager::new(stations(&["a"]), f32::NAN);
        assert_eq!(session.get_state().await.volume, DEFAULT_VOLUME);

        let rev = session.get_state().await.rev;
        session.set_volume(f32::NAN).await;
        session.set_volume(f32::INFINITY).await;
        let state = session.get_state().await;
        assert_eq!(state.volume, DEFAULT_VOLUME);
        assert_eq!(state.rev, rev);

        let loud = SessionManager::new(stations(&["a"]), f32::INFINITY);
        assert_eq!(loud.get_state().await.volume, DEFAULT_VOLUME);
    }

    #[tokio::test]
    async fn test_toggle_pause_and_close() {
        let session = SessionManager::new(stations(&["a"]), 0.7);
        assert_eq!(session.toggle_pause().await, None);

        session.select("a").await.unwrap();
        assert!(session.get_state().await.is_playing);
        assert_eq!(session.toggle_pause().await, Some(false));
        assert_eq!(session.toggle_pause().await, Some(true));

        session.close().await;
        let now = session.now_playing().await;
        assert!(now.station.is_none());
        assert!(!now.is_playing);
        assert_eq!(now.camera, CameraTarget::default_view());
        assert!(now.station_time.is_none());
    }
}
