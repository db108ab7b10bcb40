//! Shared helpers for tests: fixture payloads, an in-process feed server,
//! and a scripted completion backend.

use crate::config::FeedConfig;
use crate::error::AnalysisError;
use crate::llm::CompletionBackend;
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const FEED_HOUR_00: &str = include_str!("../fixtures/treasure_00.json");
pub const FEED_HOUR_01: &str = include_str!("../fixtures/treasure_01.json");

/// Serve the given `(file name, body)` pairs under `/treasure/` on a random
/// local port. Returns the feed base URL.
pub async fn spawn_feed(files: &[(&str, &str)]) -> String {
    let files: Arc<HashMap<String, String>> = Arc::new(
        files
            .iter()
            .map(|(name, body)| (name.to_string(), body.to_string()))
            .collect(),
    );

    let app = Router::new()
        .route("/treasure/{name}", get(serve_file))
        .with_state(files);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/treasure/", addr)
}

async fn serve_file(
    State(files): State<Arc<HashMap<String, String>>>,
    Path(name): Path<String>,
) -> Result<String, StatusCode> {
    files.get(&name).cloned().ok_or(StatusCode::NOT_FOUND)
}

pub fn feed_config(base_url: &str) -> FeedConfig {
    FeedConfig {
        base_url: base_url.to_string(),
        ..FeedConfig::default()
    }
}

/// Completion backend that records prompts and answers from a script.
#[derive(Default)]
pub struct ScriptedBackend {
    pub prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl ScriptedBackend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _api_key: &str, prompt: &str) -> Result<String, AnalysisError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(AnalysisError::Api {
                status: 401,
                body: "invalid api key".to_string(),
            });
        }
        Ok(format!("  answer #{}\n", n))
    }
}
