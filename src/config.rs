//! Application configuration.
//!
//! Values come from an optional `coursesearch.toml` in the working directory,
//! overridden by environment variables (`.env` is loaded first by `main`).

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE: &str = "coursesearch.toml";

/// Environment variables read by [`Config::load`], matched case-insensitively.
const ENV_KEYS: &[&str] = &[
    "log_level",
    "portal_url",
    "user_agent",
    "request_timeout",
    "batch_size",
    "batch_delay",
    "campus",
    "output",
    "accept_invalid_certs",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Level for this crate's logs; overridden entirely by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Root of the course search site. `search/` is resolved against it.
    #[serde(default = "default_portal_url")]
    pub portal_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    /// Subjects fetched back-to-back before pausing.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(
        default = "default_batch_delay",
        deserialize_with = "deserialize_duration"
    )]
    pub batch_delay: Duration,
    /// Campus code sent with every harvest search (10 = Statesboro).
    #[serde(default = "default_campus")]
    pub campus: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// The portal has served certificates that fail verification; off unless asked for.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Config {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::raw().only(ENV_KEYS))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_portal_url() -> String {
    "https://coursesearch.georgiasouthern.edu/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; EagleExplorer/1.0)".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_campus() -> String {
    "10".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("courses.csv")
}

/// Accept either whole seconds (`5`) or a duration string (`"5s"`, `"1.5m"`).
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DurationValue {
        Seconds(u64),
        Text(String),
    }

    match DurationValue::deserialize(deserializer)? {
        DurationValue::Seconds(secs) => Ok(Duration::from_secs(secs)),
        DurationValue::Text(text) => {
            fundu::parse_duration(text.trim()).map_err(serde::de::Error::custom)
        }
    }
}
