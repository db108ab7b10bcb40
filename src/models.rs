//! Data models for the balloon constellation.
//!
//! This module contains the core data structures shared by the feed,
//! the analysis modules, and the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single validated balloon position taken from one hourly snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalloonRecord {
    /// Index of the balloon within its snapshot array.
    ///
    /// The upstream feed has no stable identifiers, so this is only a
    /// best-effort identity across hours.
    pub balloon_id: u32,
    /// Latitude in degrees, within [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, within [-180, 180].
    pub longitude: f64,
    /// Altitude in kilometers.
    pub altitude: f64,
    /// Estimated observation time (fetch time minus `hours_ago`).
    pub timestamp: DateTime<Utc>,
    /// Hour offset of the snapshot this record came from (0 = current).
    pub hours_ago: u8,
}

/// All balloon positions for one hour offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hour offset (0 = current).
    pub hours_ago: u8,
    /// When the snapshot was retrieved.
    pub fetched_at: DateTime<Utc>,
    /// Valid records, in feed order.
    pub balloons: Vec<BalloonRecord>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn empty(hours_ago: u8, fetched_at: DateTime<Utc>) -> Self {
        Self {
            hours_ago,
            fetched_at,
            balloons: Vec::new(),
        }
    }
}

/// One point on a balloon track, shaped for the map front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
    pub time: DateTime<Utc>,
}

/// A per-balloon trajectory ready for rendering as a polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    pub points: Vec<TrackPoint>,
    /// `#rrggbb` color derived from the id.
    pub color: String,
}

/// Kind of LLM analysis requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Free-form user question (never cached).
    Question,
    /// General overview of the constellation.
    GeneralInsights,
    /// Assessment of detected anomalies.
    Anomalies,
    /// Recommendations for the next launch.
    LaunchRecommendations,
}

impl AnalysisKind {
    /// Whether results of this kind are kept in the analysis cache.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, AnalysisKind::Question)
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::Question => write!(f, "question"),
            AnalysisKind::GeneralInsights => write!(f, "general_insights"),
            AnalysisKind::Anomalies => write!(f, "anomalies"),
            AnalysisKind::LaunchRecommendations => write!(f, "launch_recommendations"),
        }
    }
}

/// Text produced by the analysis gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub kind: AnalysisKind,
    pub text: String,
    /// Creation time of the text (the cache entry's time when `cached`).
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_kind_cacheable() {
        assert!(!AnalysisKind::Question.is_cacheable());
        assert!(AnalysisKind::GeneralInsights.is_cacheable());
        assert!(AnalysisKind::Anomalies.is_cacheable());
        assert!(AnalysisKind::LaunchRecommendations.is_cacheable());
    }

    #[test]
    fn test_analysis_kind_display() {
        assert_eq!(AnalysisKind::GeneralInsights.to_string(), "general_insights");
        assert_eq!(
            AnalysisKind::LaunchRecommendations.to_string(),
            "launch_recommendations"
        );
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = BalloonRecord {
            balloon_id: 7,
            latitude: 12.5,
            longitude: -40.25,
            altitude: 17.1,
            timestamp: "2024-03-01T12:00:00Z".parse().unwrap(),
            hours_ago: 3,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["balloon_id"], 7);
        assert_eq!(json["longitude"], -40.25);
        assert_eq!(json["hours_ago"], 3);
        assert_eq!(json["timestamp"], "2024-03-01T12:00:00Z");
    }
}
