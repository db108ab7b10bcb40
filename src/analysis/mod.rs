//! Analysis over fetched telemetry: trajectory assembly and statistics.

pub mod stats;
pub mod trajectory;

pub use stats::{
    render_anomaly_summary, render_summary, AnomalyReport, MovementStats, SnapshotStats,
};
pub use trajectory::{assemble, to_tracks};
