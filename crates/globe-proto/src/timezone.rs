//! Station-local time.
//!
//! Zones come from the live timezone service when it answers, and from a
//! static longitude-band table otherwise.  The table ignores latitude,
//! borders and DST; it is only there so the clock never goes blank.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TimezoneConfig;
use crate::error::TimezoneError;

/// Zone returned when no band matches.
pub const FALLBACK_ZONE: &str = "UTC";

/// `hh:mm AM/PM`, matching the player's clock.
const CLOCK_FORMAT: &str = "%I:%M %p";

/// Half-open `[lower, upper)` unless `closed` is set.
#[derive(Debug, Clone, Copy)]
struct LongitudeBand {
    lower: f64,
    upper: f64,
    closed: bool,
    zone: &'static str,
}

impl LongitudeBand {
    const fn open(lower: f64, upper: f64, zone: &'static str) -> Self {
        Self {
            lower,
            upper,
            closed: false,
            zone,
        }
    }

    fn contains(&self, longitude: f64) -> bool {
        longitude >= self.lower
            && (longitude < self.upper || (self.closed && longitude <= self.upper))
    }
}

const LONGITUDE_BANDS: [LongitudeBand; 17] = [
    LongitudeBand::open(-180.0, -150.0, "Pacific/Honolulu"),
    LongitudeBand::open(-150.0, -120.0, "America/Anchorage"),
    LongitudeBand::open(-120.0, -105.0, "America/Los_Angeles"),
    LongitudeBand::open(-105.0, -90.0, "America/Chicago"),
    LongitudeBand::open(-90.0, -75.0, "America/New_York"),
    LongitudeBand::open(-75.0, -45.0, "America/Sao_Paulo"),
    LongitudeBand::open(-45.0, -22.5, "Atlantic/Azores"),
    LongitudeBand::open(-22.5, 7.5, "Europe/London"),
    LongitudeBand::open(7.5, 30.0, "Europe/Belgrade"),
    LongitudeBand::open(30.0, 45.0, "Europe/Istanbul"),
    LongitudeBand::open(45.0, 60.0, "Europe/Moscow"),
    LongitudeBand::open(60.0, 82.5, "Asia/Karachi"),
    LongitudeBand::open(82.5, 97.5, "Asia/Kolkata"),
    LongitudeBand::open(97.5, 112.5, "Asia/Bangkok"),
    LongitudeBand::open(112.5, 127.5, "Asia/Shanghai"),
    LongitudeBand::open(127.5, 142.5, "Asia/Tokyo"),
    LongitudeBand {
        lower: 142.5,
        upper: 180.0,
        closed: true,
        zone: "Australia/Sydney",
    },
];

/// Estimate a zone from longitude alone.
pub fn estimate_timezone(longitude: f64) -> &'static str {
    LONGITUDE_BANDS
        .iter()
        .find(|band| band.contains(longitude))
        .map(|band| band.zone)
        .unwrap_or(FALLBACK_ZONE)
}

/// Where a resolved zone came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneSource {
    Service,
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub zone: String,
    pub source: ZoneSource,
}

#[derive(Debug, Deserialize)]
struct TimezoneResponse {
    #[serde(default)]
    timezone: Option<String>,
}

pub struct TimezoneResolver {
    client: reqwest::Client,
    api_url: String,
    reference_date: String,
}

impl TimezoneResolver {
    pub fn new(config: &TimezoneConfig) -> Result<Self, TimezoneError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(TimezoneError::Client)?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            reference_date: config.reference_date.clone(),
        })
    }

    /// IANA zone for a coordinate.  Never fails.
    pub async fn resolve_timezone(&self, latitude: f64, longitude: f64) -> String {
        self.resolve(latitude, longitude).await.zone
    }

    pub async fn resolve(&self, latitude: f64, longitude: f64) -> Resolution {
        match self.lookup(latitude, longitude).await {
            Ok(zone) => Resolution {
                zone,
                source: ZoneSource::Service,
            },
            Err(e) => {
                let zone = estimate_timezone(longitude);
                debug!(
                    "Timezone service unavailable for ({}, {}): {}; estimated {}",
                    latitude, longitude, e, zone
                );
                Resolution {
                    zone: zone.to_string(),
                    source: ZoneSource::Estimated,
                }
            }
        }
    }

    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<String, TimezoneError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_date", self.reference_date.clone()),
            ])
            .send()
            .await
            .map_err(TimezoneError::Request)?;

        if !response.status().is_success() {
            return Err(TimezoneError::Status(response.status()));
        }

        let body: TimezoneResponse = response.json().await.map_err(TimezoneError::Decode)?;
        body.timezone
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty())
            .ok_or(TimezoneError::MissingZone)
    }
}

/// Format `now` in `zone`, or `None` if the zone is unknown.
pub fn format_time_in(zone: &str, now: DateTime<Utc>) -> Option<String> {
    let tz: Tz = zone.parse().ok()?;
    Some(now.with_timezone(&tz).format(CLOCK_FORMAT).to_string())
}

/// Current time in `zone`.  An unknown zone gets the host's local time.
pub fn format_current_time(zone: &str) -> String {
    format_time_in(zone, Utc::now()).unwrap_or_else(format_local_time)
}

pub fn format_local_time() -> String {
    Local::now().format(CLOCK_FORMAT).to_string()
}

/// Zone names and abbreviations are not shown in the player.
pub fn timezone_abbreviation(_zone: &str) -> String {
    String::new()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneResult {
    pub zone: String,
    pub local_time: String,
}

impl TimezoneResult {
    pub fn now(zone: &str) -> Self {
        Self {
            zone: zone.to_string(),
            local_time: format_current_time(zone),
        }
    }
}
