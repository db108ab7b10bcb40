//! Constellation report generation.
//!
//! Renders the statistics printed by the `summary` command as Markdown
//! or JSON.

use crate::analysis::stats::{AnomalyReport, MovementStats, SnapshotStats};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Movement anomalies listed individually in the Markdown report.
const MAX_LISTED_ANOMALIES: usize = 10;

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Feed base URL the snapshots came from.
    pub feed_url: String,
    pub generated_at: DateTime<Utc>,
    /// Hours of history requested.
    pub hours_requested: u8,
    /// Snapshots that were fetched successfully.
    pub snapshots_fetched: usize,
    pub duration_seconds: f64,
}

/// Everything the `summary` command reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstellationReport {
    pub metadata: ReportMetadata,
    pub stats: SnapshotStats,
    pub movement: Option<MovementStats>,
    pub anomalies: AnomalyReport,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &ConstellationReport) -> String {
    let mut output = String::new();

    output.push_str("# Balloon Constellation Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    if report.stats.is_empty() {
        output.push_str("No balloon data was available for the requested window.\n\n");
        output.push_str(&generate_footer());
        return output;
    }

    output.push_str(&generate_summary_section(&report.stats));
    output.push_str(&generate_movement_section(report.movement.as_ref()));
    output.push_str(&generate_anomaly_section(&report.anomalies));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Feed:** {}\n", metadata.feed_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Snapshots:** {} of {} hours\n",
        metadata.snapshots_fetched, metadata.hours_requested
    ));
    section.push_str(&format!(
        "- **Fetch Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_summary_section(stats: &SnapshotStats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Observations | Unique Balloons | Current Balloons |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        stats.total_observations, stats.unique_balloons, stats.current_balloons
    ));

    if let Some(altitude) = &stats.altitude {
        section.push_str(&format!(
            "Altitude ranges from **{:.2} km** to **{:.2} km** (mean {:.2} km).\n\n",
            altitude.min, altitude.max, altitude.mean
        ));
    }

    section.push_str("### Hemispheres\n\n");
    section.push_str("| North | South | East | West |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        stats.hemispheres.north,
        stats.hemispheres.south,
        stats.hemispheres.east,
        stats.hemispheres.west
    ));

    section.push_str("### Altitude Bands\n\n");
    section.push_str("| Band | Observations |\n");
    section.push_str("|:---|:---:|\n");
    for band in &stats.altitude_bands {
        section.push_str(&format!("| {} | {} |\n", band.band, band.count));
    }
    section.push('\n');

    section
}

fn generate_movement_section(movement: Option<&MovementStats>) -> String {
    let Some(movement) = movement else {
        return String::new();
    };

    format!(
        "## Movement\n\n\
         - **Balloons tracked across hours:** {}\n\
         - **Mean latitude change:** {:.2}°\n\
         - **Mean longitude change:** {:.2}°\n\
         - **Trend:** toward the {} and {}\n\n",
        movement.balloons_tracked,
        movement.mean_lat_change,
        movement.mean_lon_change,
        movement.latitude_trend(),
        movement.longitude_trend()
    )
}

fn generate_anomaly_section(anomalies: &AnomalyReport) -> String {
    let mut section = String::new();

    section.push_str("## Anomalies\n\n");
    section.push_str(&format!(
        "- **Altitude outliers:** {}\n- **Unusual hourly moves:** {}\n\n",
        anomalies.altitude_outliers.len(),
        anomalies.movement_anomalies.len()
    ));

    if anomalies.movement_anomalies.is_empty() {
        return section;
    }

    section.push_str("| Balloon | Hours | Δ Alt (km) | Δ Lat (°) | Δ Lon (°) |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    for a in anomalies.movement_anomalies.iter().take(MAX_LISTED_ANOMALIES) {
        section.push_str(&format!(
            "| {} | {}→{} | {:.2} | {:.2} | {:.2} |\n",
            a.balloon_id, a.from_hour, a.to_hour, a.alt_change, a.lat_change, a.lon_change
        ));
    }
    if anomalies.movement_anomalies.len() > MAX_LISTED_ANOMALIES {
        section.push_str(&format!(
            "\n*…and {} more.*\n",
            anomalies.movement_anomalies.len() - MAX_LISTED_ANOMALIES
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by balloonwatch*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ConstellationReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
