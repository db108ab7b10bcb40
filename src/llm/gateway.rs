//! Analysis gateway: telemetry in, natural-language analysis out.
//!
//! Each request fetches the recent history, condenses it into a text
//! summary, wraps it in the prompt for the requested kind, and relays it
//! to the completion backend. Results for the fixed analysis kinds are
//! cached for a configurable time.

use crate::analysis::{
    render_anomaly_summary, render_summary, AnomalyReport, MovementStats, SnapshotStats,
};
use crate::error::AnalysisError;
use crate::feed::TelemetryFetcher;
use crate::llm::cache::AnalysisCache;
use crate::llm::client::CompletionBackend;
use crate::llm::prompts;
use crate::models::{AnalysisKind, AnalysisOutcome, BalloonRecord};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Text returned when there is nothing to look for anomalies in.
pub const NO_ANOMALY_DATA: &str = "No data available for anomaly detection.";

pub struct AnalysisGateway {
    fetcher: Arc<TelemetryFetcher>,
    backend: Arc<dyn CompletionBackend>,
    cache: AnalysisCache,
}

impl AnalysisGateway {
    pub fn new(
        fetcher: Arc<TelemetryFetcher>,
        backend: Arc<dyn CompletionBackend>,
        cache_max_age: Duration,
    ) -> Self {
        Self {
            fetcher,
            backend,
            cache: AnalysisCache::new(cache_max_age),
        }
    }

    /// Run one analysis.
    ///
    /// The credential (and the question, for [`AnalysisKind::Question`]) is
    /// checked before the cache, so a cached result is never served to a
    /// request without a key.
    pub async fn analyze(
        &self,
        kind: AnalysisKind,
        api_key: Option<&str>,
        question: Option<&str>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AnalysisError::MissingCredential)?;

        let question = if kind == AnalysisKind::Question {
            question
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .ok_or(AnalysisError::MissingQuestion)?
        } else {
            prompts::GENERAL_INSIGHTS_QUESTION
        };

        if kind.is_cacheable() {
            if let Some(hit) = self.cache.get(kind).await {
                debug!("Serving cached {} analysis", kind);
                return Ok(AnalysisOutcome {
                    kind,
                    text: hit.text,
                    timestamp: hit.created_at,
                    cached: true,
                });
            }
        }

        let records = self
            .fetcher
            .fetch_history_records(self.fetcher.hours_available())
            .await;

        let prompt = match kind {
            AnalysisKind::Anomalies => {
                if records.is_empty() {
                    return Ok(AnalysisOutcome {
                        kind,
                        text: NO_ANOMALY_DATA.to_string(),
                        timestamp: Utc::now(),
                        cached: false,
                    });
                }
                let report = AnomalyReport::detect(&records);
                prompts::anomaly_prompt(&render_anomaly_summary(&report))
            }
            AnalysisKind::LaunchRecommendations => {
                prompts::launch_prompt(&constellation_summary(&records))
            }
            AnalysisKind::Question | AnalysisKind::GeneralInsights => {
                prompts::question_prompt(&constellation_summary(&records), question)
            }
        };

        info!("Requesting {} analysis from LLM", kind);
        let text = self.backend.complete(api_key, &prompt).await?.trim().to_string();

        let timestamp = if kind.is_cacheable() {
            self.cache.insert(kind, text.clone()).await
        } else {
            Utc::now()
        };

        Ok(AnalysisOutcome {
            kind,
            text,
            timestamp,
            cached: false,
        })
    }
}

fn constellation_summary(records: &[BalloonRecord]) -> String {
    let stats = SnapshotStats::from_records(records);
    let movement = MovementStats::from_records(records);
    render_summary(&stats, movement.as_ref())
}
