//! Station directory aggregation.
//!
//! One aggregation = several radio-browser searches issued together (the
//! priority-region queries in configured order, then the worldwide query),
//! joined, merged by `stationuuid`, and filtered down to stations that can be
//! mapped and played.
//!
//! The join is all-or-nothing: one failed search fails the whole aggregation,
//! and [`StationAggregator::fetch_stations`] turns that failure into an empty
//! list.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::future::try_join_all;
use tracing::{debug, info, warn};

use crate::config::DirectoryConfig;
use crate::error::DirectoryError;
use crate::protocol::{DirectoryStation, StationOrder, StationRecord};

/// One search against the directory.  `hidebroken=true` is always sent.
#[derive(Debug, Clone, PartialEq)]
pub struct StationQuery {
    /// `None` searches worldwide.
    pub country_code: Option<String>,
    pub limit: u32,
    pub order: StationOrder,
}

impl StationQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(code) = &self.country_code {
            params.push(("countrycode", code.clone()));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("hidebroken", "true".to_string()));
        if let Some(order) = self.order.param() {
            params.push(("order", order.to_string()));
            params.push(("reverse", "true".to_string()));
        }
        params
    }
}

/// Priority-region queries first, in configured order, then the worldwide
/// query ordered by click count.
pub fn plan_queries(config: &DirectoryConfig) -> Vec<StationQuery> {
    let mut queries = Vec::new();
    if let Some(region) = config.priority_region() {
        for order in &config.priority_orders {
            queries.push(StationQuery {
                country_code: Some(region.to_string()),
                limit: config.priority_limit,
                order: *order,
            });
        }
    }
    queries.push(StationQuery {
        country_code: None,
        limit: config.world_limit,
        order: StationOrder::ClickCount,
    });
    queries
}

/// Concatenate pages in order and collapse duplicate uuids.
///
/// Last write wins: a later record replaces the earlier one's content, but
/// keeps the slot where that uuid was first seen.
pub fn merge_pages(pages: Vec<Vec<DirectoryStation>>) -> Vec<DirectoryStation> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<DirectoryStation> = Vec::new();

    for station in pages.into_iter().flatten() {
        match slots.get(&station.stationuuid) {
            Some(&slot) => merged[slot] = station,
            None => {
                slots.insert(station.stationuuid.clone(), merged.len());
                merged.push(station);
            }
        }
    }

    merged
}

/// Merge, then drop anything without coordinates or an http(s) stream.
/// Drops are silent.
pub fn aggregate(pages: Vec<Vec<DirectoryStation>>) -> Vec<StationRecord> {
    merge_pages(pages)
        .into_iter()
        .filter_map(StationRecord::from_directory)
        .collect()
}

pub struct StationAggregator {
    client: reqwest::Client,
    base_url: String,
    queries: Vec<StationQuery>,
}

impl StationAggregator {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(DirectoryError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            queries: plan_queries(config),
        })
    }

    pub fn queries(&self) -> &[StationQuery] {
        &self.queries
    }

    /// Fetch, merge and filter.  Never fails: any error is logged and yields
    /// an empty list, indistinguishable from a directory with no matches.
    pub async fn fetch_stations(&self) -> Vec<StationRecord> {
        match self.try_fetch_stations().await {
            Ok(stations) => stations,
            Err(e) => {
                warn!("Station aggregation failed, returning no stations: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch_stations(&self) -> Result<Vec<StationRecord>, DirectoryError> {
        info!(
            "Fetching stations: {} queries against {}",
            self.queries.len(),
            self.base_url
        );

        let pages = try_join_all(self.queries.iter().map(|q| self.fetch_page(q))).await?;
        let raw_count: usize = pages.iter().map(Vec::len).sum();
        let stations = aggregate(pages);

        info!(
            "Aggregated {} usable stations from {} raw entries",
            stations.len(),
            raw_count
        );
        Ok(stations)
    }

    async fn fetch_page(
        &self,
        query: &StationQuery,
    ) -> Result<Vec<DirectoryStation>, DirectoryError> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&query.params())
            .build()
            .map_err(|source| DirectoryError::Request {
                url: self.base_url.clone(),
                source,
            })?;
        let url = request.url().to_string();
        debug!("directory GET {}", url);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| DirectoryError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DirectoryError::Status {
                url,
                status: response.status(),
            });
        }

        let page: Vec<DirectoryStation> = response
            .json()
            .await
            .map_err(|source| DirectoryError::Decode {
                url: url.clone(),
                source,
            })?;

        debug!("directory page {} -> {} entries", url, page.len());
        Ok(page)
    }
}
