//! Error types for the telemetry feed and the analysis gateway.

use thiserror::Error;

/// Errors raised while retrieving telemetry snapshots.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Requested hour offset lies outside the published window.
    #[error("hours_ago must be between 0 and {max}, got {requested}")]
    InvalidHour { requested: i64, max: u8 },

    /// The HTTP request failed or returned a non-success status.
    #[error("failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not valid JSON.
    #[error("failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response was JSON but not the expected top-level array.
    #[error("unexpected payload from {url}: {message}")]
    Malformed { url: String, message: String },
}

/// Errors raised by the LLM analysis gateway.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Missing API key")]
    MissingCredential,

    #[error("Missing question")]
    MissingQuestion,

    /// The completion API could not be reached.
    #[error("LLM request failed: {0}")]
    Transport(String),

    /// The completion API answered with an error status.
    #[error("LLM API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The completion API answered with an unusable body.
    #[error("LLM returned an invalid response: {0}")]
    InvalidResponse(String),
}
