//! Trajectory assembly.
//!
//! Joins hourly records into per-balloon position sequences. The feed has
//! no stable identifiers, so balloons are matched by their index within
//! each hourly array.

use crate::models::{BalloonRecord, Track, TrackPoint};
use std::collections::BTreeMap;

/// Group records by balloon id, each sequence ordered newest first.
pub fn assemble(records: &[BalloonRecord]) -> BTreeMap<u32, Vec<BalloonRecord>> {
    let mut grouped: BTreeMap<u32, Vec<BalloonRecord>> = BTreeMap::new();

    for record in records {
        grouped
            .entry(record.balloon_id)
            .or_default()
            .push(record.clone());
    }

    for positions in grouped.values_mut() {
        positions.sort_by_key(|r| r.hours_ago);
    }

    grouped
}

/// Convert assembled trajectories into map tracks.
///
/// Balloons seen in only one snapshot have nothing to draw and are left out.
pub fn to_tracks(trajectories: &BTreeMap<u32, Vec<BalloonRecord>>) -> Vec<Track> {
    trajectories
        .iter()
        .filter(|(_, positions)| positions.len() > 1)
        .map(|(&id, positions)| Track {
            id,
            points: positions
                .iter()
                .map(|p| TrackPoint {
                    lat: p.latitude,
                    lng: p.longitude,
                    alt: p.altitude,
                    time: p.timestamp,
                })
                .collect(),
            color: track_color(id),
        })
        .collect()
}

/// Deterministic `#rrggbb` color for a balloon id.
pub fn track_color(id: u32) -> String {
    // FNV-1a over the decimal id
    let mut hash: u32 = 0x811c_9dc5;
    for byte in id.to_string().bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("#{:06x}", hash % 0x00ff_ffff)
}
