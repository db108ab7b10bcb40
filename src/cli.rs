//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Balloonwatch - weather-balloon constellation dashboard
///
/// Polls the hourly balloon telemetry feed, serves positions and
/// trajectories to the map dashboard, and asks an LLM for insights.
///
/// Examples:
///   balloonwatch serve --port 5000
///   balloonwatch snapshot --hours-ago 3
///   balloonwatch summary --hours 12 --format json
///   balloonwatch analyze --kind question --question "Where are most balloons?"
///   balloonwatch init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Command to run (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .balloonwatch.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base URL of the hourly telemetry feed
    ///
    /// Snapshots are fetched from `<URL>00.json` through `<URL>23.json`.
    #[arg(long, value_name = "URL", env = "BALLOONWATCH_FEED_URL", global = true)]
    pub feed_url: Option<String>,

    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, value_name = "URL", env = "BALLOONWATCH_LLM_URL", global = true)]
    pub llm_url: Option<String>,

    /// LLM model name
    #[arg(short, long, env = "BALLOONWATCH_MODEL", global = true)]
    pub model: Option<String>,

    /// Number of hourly snapshots fetched concurrently
    #[arg(long, value_name = "NUM", global = true)]
    pub concurrency: Option<usize>,

    /// Upstream request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP dashboard server
    Serve {
        /// Address to bind
        #[arg(long, env = "BALLOONWATCH_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Fetch one hourly snapshot and print it as JSON
    Snapshot {
        /// Hour offset (0 = current)
        #[arg(long, default_value = "0")]
        hours_ago: u8,
    },

    /// Fetch recent history and print constellation statistics
    Summary {
        /// Number of hours of history to include
        #[arg(long, default_value = "24")]
        hours: u8,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Run one LLM analysis and print the result
    Analyze {
        /// Kind of analysis
        #[arg(long, default_value = "insights")]
        kind: AnalyzeKind,

        /// Question to ask (required for --kind question)
        #[arg(long)]
        question: Option<String>,

        /// API key for the completion API
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Generate a default .balloonwatch.toml configuration file
    InitConfig,
}

/// Output format for the summary command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Analysis kind accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AnalyzeKind {
    Question,
    Insights,
    Anomalies,
    Launch,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run, with `serve` as the default.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        for (flag, url) in [("--feed-url", &self.feed_url), ("--llm-url", &self.llm_url)] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(format!("{} must start with 'http://' or 'https://'", flag));
                }
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(Command::Analyze {
            kind: AnalyzeKind::Question,
            question,
            ..
        }) = &self.command
        {
            if question.as_deref().map_or(true, |q| q.trim().is_empty()) {
                return Err("--question is required for --kind question".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `general.verbose` setting from the config
    /// file; `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
