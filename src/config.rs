// src/config.rs
//! Command-line and environment configuration.
//!
//! Every option can also come from the environment, and a `.env` file in the
//! working directory is loaded before parsing.
//!
//! ```bash
//! insight-chat --api-url http://analysis.internal:8000 --query "segment my panel"
//! INSIGHT_API_URL=http://analysis.internal:8000 insight-chat
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::services::catalog;
use crate::services::persistence::LocalStore;
use crate::services::uploader::ProgressSettings;

#[derive(Debug, Clone, Parser)]
#[command(name = "insight-chat")]
#[command(about = "Chat with the market-research analysis service about an uploaded dataset")]
#[command(version)]
pub struct Cli {
    /// Base URL of the analysis service.
    #[arg(long, env = "INSIGHT_API_URL", default_value = "http://localhost:3000")]
    pub api_url: Url,

    /// Directory for the local dataset cache.
    #[arg(long, env = "INSIGHT_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Opening message, shown as the first user turn.
    #[arg(long, env = "INSIGHT_QUERY")]
    pub query: Option<String>,

    /// Analysis link whose `query` parameter seeds the transcript.
    /// Ignored when `--query` is given.
    #[arg(long)]
    pub link: Option<Url>,

    /// Milliseconds between upload progress ticks.
    #[arg(
        long,
        env = "INSIGHT_PROGRESS_INTERVAL_MS",
        default_value_t = 200,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub progress_interval_ms: u64,

    /// Percent added per progress tick.
    #[arg(
        long,
        env = "INSIGHT_PROGRESS_STEP",
        default_value_t = 10,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub progress_step: u8,

    /// Request timeout in seconds. Unset means requests may wait forever.
    #[arg(long, env = "INSIGHT_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
}

impl Cli {
    pub fn initial_query(&self) -> Option<String> {
        self.query
            .clone()
            .or_else(|| self.link.as_ref().and_then(catalog::query_from_link))
    }

    pub fn state_dir(&self) -> Option<PathBuf> {
        self.state_dir.clone().or_else(LocalStore::default_dir)
    }

    pub fn progress(&self) -> ProgressSettings {
        ProgressSettings {
            interval: Duration::from_millis(self.progress_interval_ms),
            step: self.progress_step,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["insight-chat"]).unwrap();
        assert_eq!(cli.api_url.as_str(), "http://localhost:3000/");
        assert_eq!(cli.progress(), ProgressSettings::default());
        assert_eq!(cli.request_timeout(), None);
    }

    #[test]
    fn query_wins_over_link() {
        let cli = Cli::try_parse_from([
            "insight-chat",
            "--link",
            "https://insights.example/analysis?query=from+link",
        ])
        .unwrap();
        assert_eq!(cli.initial_query().as_deref(), Some("from link"));

        let cli = Cli::try_parse_from([
            "insight-chat",
            "--query",
            "direct",
            "--link",
            "https://insights.example/analysis?query=from+link",
        ])
        .unwrap();
        assert_eq!(cli.initial_query().as_deref(), Some("direct"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["insight-chat", "--api-url", "not a url"]).is_err());
        assert!(Cli::try_parse_from(["insight-chat", "--progress-step", "0"]).is_err());
        assert!(Cli::try_parse_from(["insight-chat", "--progress-interval-ms", "0"]).is_err());

        let cli = Cli::try_parse_from(["insight-chat", "--progress-interval-ms", "1"]).unwrap();
        assert_eq!(cli.progress().interval, Duration::from_millis(1));
    }

    #[test]
    fn explicit_state_dir_and_timeout() {
        let cli = Cli::try_parse_from([
            "insight-chat",
            "--state-dir",
            "/tmp/insight",
            "--request-timeout-secs",
            "30",
        ])
        .unwrap();
        assert_eq!(cli.state_dir(), Some(PathBuf::from("/tmp/insight")));
        assert_eq!(cli.request_timeout(), Some(Duration::from_secs(30)));
    }
}
