use serde::{Deserialize, Serialize};

/// Marker color used for every station dot on the globe.
pub const MARKER_COLOR: &str = "#00ffcc";
/// Above this many stations the globe switches to small dots.
pub const DOT_MODE_THRESHOLD: usize = 7000;
const MARKER_SIZE: f64 = 0.5;
const DOT_MARKER_SIZE: f64 = 0.2;

/// Sort order requested from the directory.  Ordered queries are always
/// descending (`reverse=true`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StationOrder {
    ClickCount,
    Votes,
    /// No `order` parameter: whatever the directory returns by default.
    Unsorted,
}

impl StationOrder {
    /// Value of the `order` query parameter, if any.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            Self::ClickCount => Some("clickcount"),
            Self::Votes => Some("votes"),
            Self::Unsorted => None,
        }
    }
}

/// Raw station object as returned by the radio-browser search endpoint.
///
/// Everything but the uuid is defaulted, so a missing or null field does not
/// sink the whole page.  A field of the wrong type still does.  Numeric
/// passthrough fields are `i64` because the directory sends `-1` for unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectoryStation {
    pub stationuuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_resolved: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub countrycode: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub bitrate: Option<i64>,
    #[serde(default)]
    pub votes: Option<i64>,
    #[serde(default)]
    pub clickcount: Option<i64>,
    #[serde(default)]
    pub geo_lat: Option<f64>,
    #[serde(default)]
    pub geo_long: Option<f64>,
}

/// A station that can be both placed on the globe and played.
///
/// Only built through [`StationRecord::from_directory`], which enforces the
/// mapping/playback contract: coordinates present, stream url is http(s).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationRecord {
    pub id: String,
    pub name: String,
    pub stream_url: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    /// Comma-joined, as the directory sends it.
    #[serde(default)]
    pub tags: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub click_count: i64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub bitrate: i64,
}

impl StationRecord {
    /// Convert a raw directory entry, or `None` if it is unusable.
    pub fn from_directory(raw: DirectoryStation) -> Option<Self> {
        let latitude = raw.geo_lat?;
        let longitude = raw.geo_long?;
        let stream_url = raw.url_resolved.filter(|u| u.starts_with("http"))?;

        Some(Self {
            id: raw.stationuuid,
            name: raw.name.unwrap_or_default(),
            stream_url,
            country_code: raw.countrycode.unwrap_or_default(),
            country: raw.country.unwrap_or_default(),
            state: raw.state.unwrap_or_default(),
            tags: raw.tags.unwrap_or_default(),
            latitude,
            longitude,
            favicon: non_empty(raw.favicon),
            homepage: non_empty(raw.homepage),
            votes: raw.votes.unwrap_or_default(),
            click_count: raw.clickcount.unwrap_or_default(),
            language: raw.language.unwrap_or_default(),
            codec: raw.codec.unwrap_or_default(),
            bitrate: raw.bitrate.unwrap_or_default(),
        })
    }

    /// "State, Country" or just the country, as the search dropdown shows it.
    pub fn location_label(&self) -> String {
        if self.state.is_empty() {
            self.country.clone()
        } else {
            format!("{}, {}", self.state, self.country)
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// One point on the globe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobeMarker {
    pub lat: f64,
    pub lng: f64,
    pub size: f64,
    pub color: String,
    pub station_id: String,
}

/// Project the station list to markers.  Marker size depends on the size of
/// the whole list, not on the station.
pub fn markers(stations: &[StationRecord]) -> Vec<GlobeMarker> {
    let size = if stations.len() > DOT_MODE_THRESHOLD {
        DOT_MARKER_SIZE
    } else {
        MARKER_SIZE
    };
    stations
        .iter()
        .map(|s| GlobeMarker {
            lat: s.latitude,
            lng: s.longitude,
            size,
            color: MARKER_COLOR.to_string(),
            station_id: s.id.clone(),
        })
        .collect()
}

/// Where the globe camera should point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraTarget {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
}

impl CameraTarget {
    /// Initial view, centered on the default priority region.
    pub fn default_view() -> Self {
        Self {
            lat: 22.0,
            lng: 78.0,
            altitude: 1.5,
        }
    }

    pub fn focus(station: &StationRecord) -> Self {
        Self {
            lat: station.latitude,
            lng: station.longitude,
            altitude: 0.25,
        }
    }
}

/// Snapshot handed to the player widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NowPlaying {
    pub rev: u64,
    pub station: Option<StationRecord>,
    pub is_playing: bool,
    pub volume: f32,
    pub is_muted: bool,
    /// `0.0` while muted, `volume` otherwise.
    pub effective_volume: f32,
    pub timezone: Option<String>,
    /// Wall clock at the station; only once its zone is known.
    pub station_time: Option<String>,
    /// Always empty: zone names are not shown in the player.
    pub zone_abbreviation: String,
    pub local_time: String,
    pub camera: CameraTarget,
}
