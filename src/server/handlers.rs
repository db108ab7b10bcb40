//! API handlers.

use crate::analysis::{assemble, to_tracks, SnapshotStats};
use crate::models::{AnalysisKind, BalloonRecord, Track};
use crate::server::error::ApiError;
use crate::server::state::SharedState;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `?hours_ago=N`; anything that is not an integer counts as 0.
#[derive(Debug, Default, Deserialize)]
pub struct HourQuery {
    hours_ago: Option<String>,
}

impl HourQuery {
    /// Integers too large for `i64` saturate so they fail the range check.
    fn hours_ago(&self) -> i64 {
        let Some(raw) = self.hours_ago.as_deref().map(str::trim) else {
            return 0;
        };
        if let Ok(hours) = raw.parse::<i64>() {
            return hours;
        }

        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if negative {
                i64::MIN
            } else {
                i64::MAX
            }
        } else {
            0
        }
    }
}

/// Body of the analysis endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalloonDataResponse {
    timestamp: DateTime<Utc>,
    balloons: Vec<BalloonRecord>,
}

#[derive(Debug, Serialize)]
pub struct TrajectoryResponse {
    timestamp: DateTime<Utc>,
    trajectories: Vec<Track>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    timestamp: DateTime<Utc>,
    hours_ago: u8,
    stats: SnapshotStats,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    analysis: String,
    timestamp: DateTime<Utc>,
}

/// GET /api/balloon-data
pub async fn balloon_data(
    State(state): State<SharedState>,
    Query(query): Query<HourQuery>,
) -> Result<Json<BalloonDataResponse>, ApiError> {
    let hours_ago = state.fetcher.check_hour(query.hours_ago())?;
    let snapshot = state.fetcher.fetch_snapshot(hours_ago).await?;

    Ok(Json(BalloonDataResponse {
        timestamp: Utc::now(),
        balloons: snapshot.balloons,
    }))
}

/// GET /api/trajectory-data
pub async fn trajectory_data(State(state): State<SharedState>) -> Json<TrajectoryResponse> {
    let records = state
        .fetcher
        .fetch_history_records(state.fetcher.hours_available())
        .await;

    Json(TrajectoryResponse {
        timestamp: Utc::now(),
        trajectories: to_tracks(&assemble(&records)),
    })
}

/// GET /api/stats
pub async fn stats(
    State(state): State<SharedState>,
    Query(query): Query<HourQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    let hours_ago = state.fetcher.check_hour(query.hours_ago())?;
    let snapshot = state.fetcher.fetch_snapshot(hours_ago).await?;

    Ok(Json(StatsResponse {
        timestamp: Utc::now(),
        hours_ago,
        stats: SnapshotStats::from_records(&snapshot.balloons),
    }))
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<SharedState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let outcome = state
        .gateway
        .analyze(
            AnalysisKind::Question,
            request.api_key.as_deref(),
            request.question.as_deref(),
        )
        .await?;

    Ok(Json(AnalyzeResponse {
        analysis: outcome.text,
        timestamp: outcome.timestamp,
    }))
}

/// POST /api/insights
pub async fn insights(
    State(state): State<SharedState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<Value>, ApiError> {
    cached_analysis(&state, AnalysisKind::GeneralInsights, "insights", request).await
}

/// POST /api/anomalies
pub async fn anomalies(
    State(state): State<SharedState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<Value>, ApiError> {
    cached_analysis(&state, AnalysisKind::Anomalies, "anomalies", request).await
}

/// POST /api/launch-recommendations
pub async fn launch_recommendations(
    State(state): State<SharedState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<Value>, ApiError> {
    cached_analysis(
        &state,
        AnalysisKind::LaunchRecommendations,
        "recommendations",
        request,
    )
    .await
}

/// Run a cacheable analysis and answer `{<field>, timestamp, cached}`.
async fn cached_analysis(
    state: &SharedState,
    kind: AnalysisKind,
    field: &str,
    request: AnalysisRequest,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .gateway
        .analyze(kind, request.api_key.as_deref(), None)
        .await?;

    let mut body = Map::new();
    body.insert(field.to_string(), Value::String(outcome.text));
    body.insert(
        "timestamp".to_string(),
        Value::String(outcome.timestamp.to_rfc3339()),
    );
    body.insert("cached".to_string(), Value::Bool(outcome.cached));
    Ok(Json(Value::Object(body)))
}
