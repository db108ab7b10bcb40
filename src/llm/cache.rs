//! Time-boxed cache of analysis results, one entry per analysis kind.

use crate::models::AnalysisKind;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    created_at: DateTime<Utc>,
    stored: Instant,
}

/// A cached analysis text and the time it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAnalysis {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AnalysisCache {
    max_age: Duration,
    entries: RwLock<HashMap<AnalysisKind, CacheEntry>>,
}

impl AnalysisCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the entry for `kind` if it is non-empty and no older than `max_age`.
    pub async fn get(&self, kind: AnalysisKind) -> Option<CachedAnalysis> {
        let entries = self.entries.read().await;
        let entry = entries.get(&kind)?;

        if entry.text.is_empty() || entry.stored.elapsed() > self.max_age {
            debug!("Cache miss for {} (expired or empty)", kind);
            return None;
        }

        Some(CachedAnalysis {
            text: entry.text.clone(),
            created_at: entry.created_at,
        })
    }

    /// Store a fresh result for `kind`, replacing any previous entry.
    pub async fn insert(&self, kind: AnalysisKind, text: String) -> DateTime<Utc> {
        let created_at = Utc::now();
        self.entries.write().await.insert(
            kind,
            CacheEntry {
                text,
                created_at,
                stored: Instant::now(),
            },
        );
        created_at
    }
}
