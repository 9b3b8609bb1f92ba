//! # Offline Fallback
//!
//! When the API cannot be reached the last cached payload is still better than
//! nothing: tide times for a spot only drift slowly, and the scheduler drops
//! events that are already past anyway. This module serves that payload
//! regardless of its age, or an empty report if there is none.
//!
//! Reports built here are marked `offline = true` so the display shows
//! "⚠ OFFLINE" and users know the list may be out of date.

use crate::{config::Config, tide_data, TideReport};
use std::time::SystemTime;
use tracing::{info, warn};

/// Build an offline report for the configured spot.
pub fn offline_report(config: &Config) -> TideReport {
    let path = config.cache_path();

    match tide_data::load_cache(&path, None, SystemTime::now()) {
        Ok(payload) => {
            info!(path = %path.display(), "serving stale cached tides");
            TideReport::from_payload(&payload, true)
        }
        Err(err) => {
            warn!(%err, "no cached tides available");
            TideReport {
                offline: true,
                ..TideReport::default()
            }
        }
    }
}
