use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Seed URLs used when the configuration does not supply any
pub const DEFAULT_SEEDS: &[&str] = &[
    "https://www.bbc.com/sport/football",
    "https://www.eurosport.com/score-center.shtml",
    "https://store.steampowered.com/app/2667160/Timeworks/",
    "https://www.skysports.com/football",
];

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
            seeds: default_seeds(),
        }
    }
}

fn default_seeds() -> Vec<String> {
    DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect()
}

/// Worker pool and fetch limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of outstanding fetch workers
    #[serde(rename = "max-concurrent-workers")]
    pub max_concurrent_workers: u32,

    /// Fixed delay between worker launches (milliseconds)
    #[serde(rename = "launch-delay-ms")]
    pub launch_delay_ms: u64,

    /// Capacity of the visited-URL registry
    #[serde(rename = "max-visited-urls")]
    pub max_visited_urls: usize,

    /// Maximum number of raw content bytes kept per fetch
    #[serde(rename = "raw-buffer-capacity")]
    pub raw_buffer_capacity: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Whether cancellation also abandons fetches already in flight
    #[serde(rename = "abort-in-flight")]
    pub abort_in_flight: bool,
}

impl CrawlerConfig {
    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Capacity of the extracted-text buffer, one tenth of the raw buffer
    pub fn text_buffer_capacity(&self) -> usize {
        self.raw_buffer_capacity / 10
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_workers: 10,
            launch_delay_ms: 5000,
            max_visited_urls: 10_000,
            raw_buffer_capacity: 1_000_000,
            request_timeout_secs: 30,
            abort_in_flight: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the `output_<hash>.txt` files
    pub directory: PathBuf,

    /// Path of the visited-URL checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            checkpoint_path: PathBuf::from("crawler_state.dat"),
        }
    }
}
