//! Hourly telemetry snapshot retrieval.
//!
//! The upstream feed publishes one JSON array per hour offset at
//! `<base_url>00.json` (current) through `<base_url>23.json`. Each element
//! is expected to be `[latitude, longitude, altitude_km]`, but the feed is
//! known to contain empty, truncated, and out-of-range entries, which are
//! skipped rather than failing the whole snapshot.

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::models::{BalloonRecord, Snapshot};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the hourly telemetry feed.
#[derive(Debug, Clone)]
pub struct TelemetryFetcher {
    client: reqwest::Client,
    base_url: String,
    hours_available: u8,
    concurrency: usize,
}

impl TelemetryFetcher {
    /// Create a fetcher from feed settings.
    pub fn new(config: &FeedConfig, concurrency: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client for telemetry feed")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            hours_available: config.hours_available,
            concurrency: concurrency.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn hours_available(&self) -> u8 {
        self.hours_available
    }

    /// URL of the snapshot for an hour offset, zero-padded to two digits.
    pub fn snapshot_url(&self, hours_ago: u8) -> String {
        format!("{}{:02}.json", self.base_url, hours_ago)
    }

    /// Check that an hour offset lies within the published window.
    pub fn check_hour(&self, hours_ago: i64) -> Result<u8, FeedError> {
        if (0..i64::from(self.hours_available)).contains(&hours_ago) {
            Ok(hours_ago as u8)
        } else {
            Err(FeedError::InvalidHour {
                requested: hours_ago,
                max: self.hours_available.saturating_sub(1),
            })
        }
    }

    /// Fetch and parse the snapshot for one hour offset.
    pub async fn fetch_snapshot(&self, hours_ago: u8) -> Result<Snapshot, FeedError> {
        self.check_hour(i64::from(hours_ago))?;

        let url = self.snapshot_url(hours_ago);
        debug!("Fetching snapshot {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| FeedError::Request {
                url: url.clone(),
                source,
            })?;

        let body = response.bytes().await.map_err(|source| FeedError::Request {
            url: url.clone(),
            source,
        })?;

        let raw: Value = serde_json::from_slice(&body).map_err(|source| FeedError::Decode {
            url: url.clone(),
            source,
        })?;

        let snapshot = parse_snapshot(&raw, hours_ago, Utc::now())
            .map_err(|message| FeedError::Malformed { url, message })?;

        debug!(
            "Snapshot {:02} contains {} valid balloons",
            hours_ago,
            snapshot.balloons.len()
        );
        Ok(snapshot)
    }

    /// Fetch the most recent `hours` snapshots, ordered newest first.
    ///
    /// Hours that fail to fetch or parse are logged and left out.
    pub async fn fetch_history(&self, hours: u8) -> Vec<Snapshot> {
        let hours = hours.min(self.hours_available);

        let mut snapshots: Vec<Snapshot> = stream::iter(0..hours)
            .map(|h| async move { (h, self.fetch_snapshot(h).await) })
            .buffer_unordered(self.concurrency)
            .filter_map(|(h, result)| async move {
                match result {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        warn!("Skipping hour {:02}: {}", h, e);
                        None
                    }
                }
            })
            .collect()
            .await;

        snapshots.sort_by_key(|s| s.hours_ago);
        info!(
            "Fetched {}/{} hourly snapshots ({} records)",
            snapshots.len(),
            hours,
            snapshots.iter().map(|s| s.balloons.len()).sum::<usize>()
        );
        snapshots
    }

    /// Fetch history and flatten it into a single record list.
    pub async fn fetch_history_records(&self, hours: u8) -> Vec<BalloonRecord> {
        self.fetch_history(hours)
            .await
            .into_iter()
            .flat_map(|s| s.balloons)
            .collect()
    }
}

/// Turn a raw feed payload into a snapshot, dropping invalid entries.
pub fn parse_snapshot(
    raw: &Value,
    hours_ago: u8,
    fetched_at: DateTime<Utc>,
) -> Result<Snapshot, String> {
    let entries = raw
        .as_array()
        .ok_or_else(|| format!("expected a JSON array, got {}", json_kind(raw)))?;

    // A leading empty element shifts the indices by one.
    let entries = match entries.first() {
        Some(first) if is_falsy(first) => &entries[1..],
        _ => &entries[..],
    };

    let timestamp = fetched_at - ChronoDuration::hours(i64::from(hours_ago));
    let mut snapshot = Snapshot::empty(hours_ago, fetched_at);
    let mut skipped = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        match parse_position(entry) {
            Some((latitude, longitude, altitude)) => snapshot.balloons.push(BalloonRecord {
                balloon_id: index as u32,
                latitude,
                longitude,
                altitude,
                timestamp,
                hours_ago,
            }),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} invalid entries in hour {:02}", skipped, hours_ago);
    }

    Ok(snapshot)
}

/// Extract `(lat, lon, alt)` from one entry, or `None` if it is unusable.
fn parse_position(entry: &Value) -> Option<(f64, f64, f64)> {
    let coords = entry.as_array()?;
    if coords.len() != 3 {
        return None;
    }

    let lat = coords[0].as_f64()?;
    let lon = coords[1].as_f64()?;
    let alt = coords[2].as_f64()?;

    if !(lat.is_finite() && lon.is_finite() && alt.is_finite()) {
        return None;
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }

    Some((lat, lon, alt))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{feed_config, spawn_feed, FEED_HOUR_00, FEED_HOUR_01};
    use serde_json::json;

    fn fetched_at() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_snapshot_url_is_zero_padded() {
        let fetcher = TelemetryFetcher::new(&FeedConfig::default(), 4).unwrap();
        assert_eq!(
            fetcher.snapshot_url(3),
            "https://a.windbornesystems.com/treasure/03.json"
        );
        assert_eq!(
            fetcher.snapshot_url(23),
            "https://a.windbornesystems.com/treasure/23.json"
        );
    }

    #[test]
    fn test_check_hour_bounds() {
        let fetcher = TelemetryFetcher::new(&FeedConfig::default(), 4).unwrap();
        assert_eq!(fetcher.check_hour(0).unwrap(), 0);
        assert_eq!(fetcher.check_hour(23).unwrap(), 23);
        assert!(matches!(
            fetcher.check_hour(24),
            Err(FeedError::InvalidHour {
                requested: 24,
                max: 23
            })
        ));
        assert!(fetcher.check_hour(-1).is_err());
    }

    #[test]
    fn test_parse_skips_invalid_entries() {
        let raw: Value = serde_json::from_str(FEED_HOUR_00).unwrap();
        let snapshot = parse_snapshot(&raw, 0, fetched_at()).unwrap();

        let ids: Vec<u32> = snapshot.balloons.iter().map(|b| b.balloon_id).collect();
        assert_eq!(ids, vec![0, 1, 5]);
        assert_eq!(snapshot.balloons[0].latitude, 10.0);
        assert_eq!(snapshot.balloons[2].longitude, 179.5);
    }

    #[test]
    fn test_parse_keeps_indices_without_leading_empty() {
        let raw: Value = serde_json::from_str(FEED_HOUR_01).unwrap();
        let snapshot = parse_snapshot(&raw, 1, fetched_at()).unwrap();

        let ids: Vec<u32> = snapshot.balloons.iter().map(|b| b.balloon_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_parse_timestamps_offset_by_hour() {
        let raw = json!([[1.0, 2.0, 3.0]]);
        let snapshot = parse_snapshot(&raw, 5, fetched_at()).unwrap();

        let expected: DateTime<Utc> = "2024-06-01T07:00:00Z".parse().unwrap();
        assert_eq!(snapshot.balloons[0].timestamp, expected);
        assert_eq!(snapshot.balloons[0].hours_ago, 5);
        assert_eq!(snapshot.fetched_at, fetched_at());
    }

    #[test]
    fn test_parse_boundary_coordinates() {
        let raw = json!([[90.0, -180.0, 1.0], [-90.0, 180.0, 2.0], [-90.01, 0.0, 3.0]]);
        let snapshot = parse_snapshot(&raw, 0, fetched_at()).unwrap();
        assert_eq!(snapshot.balloons.len(), 2);
    }

    #[test]
    fn test_parse_rejects_non_array_payload() {
        let raw = json!({"balloons": []});
        let err = parse_snapshot(&raw, 0, fetched_at()).unwrap_err();
        assert!(err.contains("an object"));
    }

    #[test]
    fn test_parse_empty_payload() {
        let snapshot = parse_snapshot(&json!([]), 0, fetched_at()).unwrap();
        assert!(snapshot.balloons.is_empty());

        let snapshot = parse_snapshot(&json!([null]), 0, fetched_at()).unwrap();
        assert!(snapshot.balloons.is_empty());
    }

    #[test]
    fn test_parse_drops_any_falsy_leading_element() {
        for leading in [json!(0), json!(false), json!(""), json!({}), json!([])] {
            let raw = json!([leading, [1.0, 2.0, 3.0]]);
            let snapshot = parse_snapshot(&raw, 0, fetched_at()).unwrap();
            assert_eq!(snapshot.balloons.len(), 1, "leading {}", leading);
            assert_eq!(snapshot.balloons[0].balloon_id, 0, "leading {}", leading);
        }

        // A truthy leading element keeps its slot
        let raw = json!([1, [1.0, 2.0, 3.0]]);
        let snapshot = parse_snapshot(&raw, 0, fetched_at()).unwrap();
        assert_eq!(snapshot.balloons[0].balloon_id, 1);
    }

    #[test]
    fn test_parse_skips_out_of_range_numbers() {
        let raw: Value =
            serde_json::from_str("[[1e400, 0.0, 1.0], [10.0, -1e400, 2.0], [10.0, 20.0, 15.0]]")
                .unwrap();
        let snapshot = parse_snapshot(&raw, 0, fetched_at()).unwrap();

        assert_eq!(snapshot.balloons.len(), 1);
        assert_eq!(snapshot.balloons[0].balloon_id, 2);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_from_feed() {
        let base_url = spawn_feed(&[("00.json", FEED_HOUR_00)]).await;
        let fetcher = TelemetryFetcher::new(&feed_config(&base_url), 2).unwrap();

        let snapshot = fetcher.fetch_snapshot(0).await.unwrap();
        assert_eq!(snapshot.balloons.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_tolerates_overflowing_entry() {
        let base_url = spawn_feed(&[("00.json", "[[1e400, 0.0, 1.0], [10.0, 20.0, 15.0]]")]).await;
        let fetcher = TelemetryFetcher::new(&feed_config(&base_url), 2).unwrap();

        let snapshot = fetcher.fetch_snapshot(0).await.unwrap();
        assert_eq!(snapshot.balloons.len(), 1);
        assert_eq!(snapshot.balloons[0].balloon_id, 1);
        assert_eq!(snapshot.balloons[0].altitude, 15.0);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_missing_hour_is_request_error() {
        let base_url = spawn_feed(&[]).await;
        let fetcher = TelemetryFetcher::new(&feed_config(&base_url), 2).unwrap();

        let err = fetcher.fetch_snapshot(4).await.unwrap_err();
        assert!(matches!(err, FeedError::Request { .. }));
    }

    #[tokio::test]
    async fn test_fetch_snapshot_invalid_json_is_decode_error() {
        let base_url = spawn_feed(&[("00.json", "[[1.0, 2.0,")]).await;
        let fetcher = TelemetryFetcher::new(&feed_config(&base_url), 2).unwrap();

        let err = fetcher.fetch_snapshot(0).await.unwrap_err();
        assert!(matches!(err, FeedError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_history_skips_failed_hours() {
        let base_url = spawn_feed(&[("00.json", FEED_HOUR_00), ("01.json", FEED_HOUR_01)]).await;
        let fetcher = TelemetryFetcher::new(&feed_config(&base_url), 2).unwrap();

        let snapshots = fetcher.fetch_history(3).await;
        let hours: Vec<u8> = snapshots.iter().map(|s| s.hours_ago).collect();
        assert_eq!(hours, vec![0, 1]);

        let records = fetcher.fetch_history_records(3).await;
        assert_eq!(records.len(), 6);
    }
}
