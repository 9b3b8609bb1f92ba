//! # Tide Data Fetching and Caching
//!
//! This module handles the network side: fetching tide events for a spot from the
//! surf spots API and caching the payload on disk.
//!
//! ## Data Source
//! - **Endpoint**: `GET {base_url}/api/spots/{spot_id}/tides`
//! - **Format**: JSON, either a bare array of events or
//!   `{ "events": [...], "hourly": [...] }` (see [`TidePayload`])
//!
//! ## Caching Strategy
//! - **Location**: `{cache_dir}/tides-{spot_id}.json`
//! - **Format**: `{ "saved_at": <unix seconds>, "payload": <API body> }`
//! - **TTL**: `display.cache_ttl_minutes` (30 by default)
//!
//! A stale cache is not deleted: [`crate::fallback`] still serves it when the
//! API is unreachable.
//!
//! ## Error Handling
//! All failures propagate through [`TideError`]. Cache write failures are logged
//! and otherwise ignored; a failed fetch should be answered with
//! [`crate::fallback::offline_report`].

use crate::{config::Config, TidePayload, TideReport};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while fetching or caching tide data.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, timeout, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Body was not a tides payload
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Cache file operations failed (missing, stale, permissions)
    #[error("cache IO: {0}")]
    Cache(#[from] io::Error),
}

/// On-disk cache record.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Unix seconds at which the payload was fetched
    pub saved_at: u64,
    pub payload: TidePayload,
}

impl CacheEntry {
    fn age(&self, now: SystemTime) -> Duration {
        let now_secs = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        Duration::from_secs(now_secs.saturating_sub(self.saved_at))
    }
}

/// Fetch the configured spot's tides from cache or API.
///
/// Cache first: a payload younger than the TTL is returned without touching the
/// network. Otherwise the API is queried and the fresh payload cached.
///
/// # Example
/// ```no_run
/// use surf_tides::{config::Config, fallback, tide_data};
///
/// # async fn run() {
/// let config = Config::default();
/// let report = tide_data::fetch(&config).await.unwrap_or_else(|err| {
///     eprintln!("Failed to fetch tide data: {}", err);
///     fallback::offline_report(&config)
/// });
/// # }
/// ```
pub async fn fetch(config: &Config) -> Result<TideReport, TideError> {
    let path = config.cache_path();
    let ttl = Duration::from_secs(config.display.cache_ttl_minutes * 60);

    // Try cache first - avoids a round trip on every run
    match load_cache(&path, Some(ttl), SystemTime::now()) {
        Ok(payload) => {
            debug!(path = %path.display(), "serving tides from cache");
            return Ok(TideReport::from_payload(&payload, false));
        }
        Err(err) => debug!(%err, "cache miss"),
    }

    let payload = fetch_remote(config).await?;

    if let Err(err) = save_cache(&path, &payload, SystemTime::now()) {
        warn!(%err, path = %path.display(), "could not write tide cache");
    }

    Ok(TideReport::from_payload(&payload, false))
}

/// Query the API for the configured spot.
async fn fetch_remote(config: &Config) -> Result<TidePayload, TideError> {
    let url = config.tides_url();
    info!(%url, "fetching tides");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()?;
    let response = client
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        warn!(%url, status = status.as_u16(), "tides request failed");
        return Err(TideError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    decode_payload(&body)
}

/// Decode an API body.
///
/// The envelope must be valid JSON in one of the two accepted shapes; the
/// events inside are checked one at a time later by [`TidePayload::events`].
pub fn decode_payload(body: &[u8]) -> Result<TidePayload, TideError> {
    Ok(serde_json::from_slice(body)?)
}

/// Load a cached payload.
///
/// With `ttl = Some(..)` an entry older than the TTL is rejected as stale;
/// `None` accepts any age.
pub fn load_cache(
    path: &Path,
    ttl: Option<Duration>,
    now: SystemTime,
) -> Result<TidePayload, TideError> {
    let data = fs::read(path)?;
    let entry: CacheEntry = serde_json::from_slice(&data)?;

    if let Some(ttl) = ttl {
        if entry.age(now) > ttl {
            return Err(TideError::Cache(io::Error::other("stale")));
        }
    }

    Ok(entry.payload)
}

/// Save a payload to the cache, creating the cache directory if needed.
pub fn save_cache(path: &Path, payload: &TidePayload, now: SystemTime) -> Result<(), TideError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let entry = CacheEntry {
        saved_at: now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs(),
        payload: payload.clone(),
    };
    fs::write(path, serde_json::to_vec(&entry)?)?;
    Ok(())
}
