//! LLM analysis: completion client, prompts, result cache, and the gateway
//! tying them to the telemetry feed.

pub mod cache;
pub mod client;
pub mod gateway;
pub mod prompts;

pub use client::{CompletionBackend, OpenAiClient};
pub use gateway::AnalysisGateway;
