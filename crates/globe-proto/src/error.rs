use thiserror::Error;

/// Failure talking to the station directory.  Every variant is absorbed by
/// [`crate::directory::StationAggregator::fetch_stations`]; callers that need
/// to tell "failed" apart from "nothing matched" use `try_fetch_stations`.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed station list from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure on the live timezone lookup.  Never surfaced past the resolver:
/// any of these sends it down the longitude-band estimator.
#[derive(Debug, Error)]
pub enum TimezoneError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("timezone request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("timezone service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed timezone response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("timezone response carried no zone")]
    MissingZone,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no station with id {0}")]
    UnknownStation(String),
}
