//! Descriptive statistics over balloon records.
//!
//! Counts by hemisphere and altitude band, altitude aggregates, mean
//! displacement across the observed window, and simple threshold-based
//! anomaly flags. The rendered summaries are the context handed to the LLM.

use crate::analysis::trajectory::assemble;
use crate::models::BalloonRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bounds (km, exclusive) of the altitude bands; the last band is open.
const ALTITUDE_BAND_EDGES: [f64; 4] = [5.0, 10.0, 15.0, 20.0];
const ALTITUDE_BAND_LABELS: [&str; 5] = ["<5 km", "5-10 km", "10-15 km", "15-20 km", ">=20 km"];

/// Hour-to-hour change thresholds beyond which a move counts as anomalous.
pub const MAX_ALTITUDE_STEP_KM: f64 = 5.0;
pub const MAX_LATITUDE_STEP_DEG: f64 = 15.0;
pub const MAX_LONGITUDE_STEP_DEG: f64 = 15.0;

/// Altitude outliers lie further than this many standard deviations from the mean.
const OUTLIER_SIGMAS: f64 = 2.0;

/// Altitude aggregates in kilometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Observation counts per hemisphere. Points on the equator or prime
/// meridian belong to neither side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HemisphereCounts {
    pub north: usize,
    pub south: usize,
    pub east: usize,
    pub west: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCount {
    pub band: String,
    pub count: usize,
}

/// Aggregates over a set of records (one snapshot or a whole history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub total_observations: usize,
    pub unique_balloons: usize,
    /// Observations from the current hour.
    pub current_balloons: usize,
    /// `None` when there are no observations.
    pub altitude: Option<AltitudeStats>,
    pub hemispheres: HemisphereCounts,
    pub altitude_bands: Vec<BandCount>,
}

impl SnapshotStats {
    /// Compute statistics for a list of records.
    pub fn from_records(records: &[BalloonRecord]) -> Self {
        let unique: HashSet<u32> = records.iter().map(|r| r.balloon_id).collect();

        let mut hemispheres = HemisphereCounts::default();
        let mut bands = [0usize; 5];
        for r in records {
            if r.latitude > 0.0 {
                hemispheres.north += 1;
            } else if r.latitude < 0.0 {
                hemispheres.south += 1;
            }
            if r.longitude > 0.0 {
                hemispheres.east += 1;
            } else if r.longitude < 0.0 {
                hemispheres.west += 1;
            }
            bands[altitude_band(r.altitude)] += 1;
        }

        let altitude = if records.is_empty() {
            None
        } else {
            let (min, max, sum) = records.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY, 0.0),
                |(min, max, sum), r| (min.min(r.altitude), max.max(r.altitude), sum + r.altitude),
            );
            Some(AltitudeStats {
                min,
                max,
                mean: sum / records.len() as f64,
            })
        };

        Self {
            total_observations: records.len(),
            unique_balloons: unique.len(),
            current_balloons: records.iter().filter(|r| r.hours_ago == 0).count(),
            altitude,
            hemispheres,
            altitude_bands: ALTITUDE_BAND_LABELS
                .iter()
                .zip(bands)
                .map(|(label, count)| BandCount {
                    band: label.to_string(),
                    count,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_observations == 0
    }
}

fn altitude_band(altitude: f64) -> usize {
    ALTITUDE_BAND_EDGES
        .iter()
        .position(|&edge| altitude < edge)
        .unwrap_or(ALTITUDE_BAND_EDGES.len())
}

/// Mean displacement between each balloon's oldest and newest observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementStats {
    /// Balloons observed in at least two snapshots.
    pub balloons_tracked: usize,
    /// Mean latitude change in degrees (positive = northward).
    pub mean_lat_change: f64,
    /// Mean longitude change in degrees (positive = eastward).
    pub mean_lon_change: f64,
}

impl MovementStats {
    /// Returns `None` unless some balloon appears in two or more snapshots.
    pub fn from_records(records: &[BalloonRecord]) -> Option<Self> {
        let displacements: Vec<(f64, f64)> = assemble(records)
            .values()
            .filter(|positions| positions.len() >= 2)
            .filter_map(|positions| {
                let newest = positions.first()?;
                let oldest = positions.last()?;
                Some((
                    newest.latitude - oldest.latitude,
                    newest.longitude - oldest.longitude,
                ))
            })
            .collect();

        if displacements.is_empty() {
            return None;
        }

        let n = displacements.len() as f64;
        Some(Self {
            balloons_tracked: displacements.len(),
            mean_lat_change: displacements.iter().map(|d| d.0).sum::<f64>() / n,
            mean_lon_change: displacements.iter().map(|d| d.1).sum::<f64>() / n,
        })
    }

    pub fn latitude_trend(&self) -> &'static str {
        if self.mean_lat_change > 0.0 {
            "north"
        } else {
            "south"
        }
    }

    pub fn longitude_trend(&self) -> &'static str {
        if self.mean_lon_change > 0.0 {
            "east"
        } else {
            "west"
        }
    }
}

/// A suspicious hour-to-hour step of one balloon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementAnomaly {
    pub balloon_id: u32,
    pub from_hour: u8,
    pub to_hour: u8,
    pub alt_change: f64,
    pub lat_change: f64,
    pub lon_change: f64,
}

/// Results of threshold-based anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub altitude_outliers: Vec<BalloonRecord>,
    pub movement_anomalies: Vec<MovementAnomaly>,
}

impl AnomalyReport {
    pub fn detect(records: &[BalloonRecord]) -> Self {
        Self {
            altitude_outliers: altitude_outliers(records),
            movement_anomalies: movement_anomalies(records),
        }
    }
}

/// Records whose altitude lies beyond mean ± 2 sample standard deviations.
fn altitude_outliers(records: &[BalloonRecord]) -> Vec<BalloonRecord> {
    if records.len() < 2 {
        return Vec::new();
    }

    let n = records.len() as f64;
    let mean = records.iter().map(|r| r.altitude).sum::<f64>() / n;
    let variance = records
        .iter()
        .map(|r| (r.altitude - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let limit = OUTLIER_SIGMAS * variance.sqrt();

    records
        .iter()
        .filter(|r| (r.altitude - mean).abs() > limit)
        .cloned()
        .collect()
}

fn movement_anomalies(records: &[BalloonRecord]) -> Vec<MovementAnomaly> {
    let mut anomalies = Vec::new();

    for (&balloon_id, positions) in &assemble(records) {
        for pair in positions.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let alt_change = (curr.altitude - prev.altitude).abs();
            let lat_change = (curr.latitude - prev.latitude).abs();
            let lon_change = (curr.longitude - prev.longitude).abs();

            if alt_change > MAX_ALTITUDE_STEP_KM
                || lat_change > MAX_LATITUDE_STEP_DEG
                || lon_change > MAX_LONGITUDE_STEP_DEG
            {
                anomalies.push(MovementAnomaly {
                    balloon_id,
                    from_hour: prev.hours_ago,
                    to_hour: curr.hours_ago,
                    alt_change,
                    lat_change,
                    lon_change,
                });
            }
        }
    }

    anomalies
}

/// Render the constellation summary used as LLM context.
pub fn render_summary(stats: &SnapshotStats, movement: Option<&MovementStats>) -> String {
    let Some(altitude) = &stats.altitude else {
        return "No data available.".to_string();
    };

    let mut lines = vec![
        "Balloon Constellation Summary:".to_string(),
        format!("- Total unique balloons tracked: {}", stats.unique_balloons),
        format!("- Current active balloons: {}", stats.current_balloons),
        format!(
            "- Altitude range: {:.2} km to {:.2} km (avg: {:.2} km)",
            altitude.min, altitude.max, altitude.mean
        ),
        String::new(),
        "Geographic Distribution:".to_string(),
        format!(
            "- Northern Hemisphere: {} observations",
            stats.hemispheres.north
        ),
        format!(
            "- Southern Hemisphere: {} observations",
            stats.hemispheres.south
        ),
        format!("- Eastern Hemisphere: {} observations", stats.hemispheres.east),
        format!("- Western Hemisphere: {} observations", stats.hemispheres.west),
        String::new(),
        "Altitude Bands:".to_string(),
    ];

    for band in &stats.altitude_bands {
        lines.push(format!("- {}: {} observations", band.band, band.count));
    }

    if let Some(movement) = movement {
        lines.push(String::new());
        lines.push("Movement Analysis:".to_string());
        lines.push(format!(
            "- Average latitude change: {:.2} degrees",
            movement.mean_lat_change
        ));
        lines.push(format!(
            "- Average longitude change: {:.2} degrees",
            movement.mean_lon_change
        ));
        lines.push(format!(
            "- This indicates a general movement trend toward the {} and {}.",
            movement.latitude_trend(),
            movement.longitude_trend()
        ));
    }

    lines.push(String::new());
    lines.push("The data includes the following for each balloon:".to_string());
    lines.push("- Balloon ID".to_string());
    lines.push("- Latitude and Longitude".to_string());
    lines.push("- Altitude in kilometers".to_string());
    lines.push("- Timestamp".to_string());
    lines.push("- Hours ago (0 for current, higher values for historical data)".to_string());

    lines.join("\n")
}

/// Render anomaly detection results for the LLM.
pub fn render_anomaly_summary(report: &AnomalyReport) -> String {
    format!(
        "Altitude Anomalies:\n{} balloons with unusual altitudes detected.\n\n\
         Movement Anomalies:\n{} instances of unusual movement patterns detected.",
        report.altitude_outliers.len(),
        report.movement_anomalies.len()
    )
}
