//! Report rendering for the command-line summary.

pub mod generator;

pub use generator::{
    generate_json_report, generate_markdown_report, ConstellationReport, ReportMetadata,
};
