use anyhow::{Context, Result};
use docqa_core::session::StatsErrorPolicy;
use serde::Deserialize;
use std::path::Path;

/// Environment variable overriding `service.base_url`.
pub const API_URL_ENV: &str = "DOCQA_API_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Deadline for each request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub on_stats_error: StatsErrorPolicy,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// ANSI styling for rendered answers; `None` means "when stdout is a TTY".
    #[serde(default)]
    pub color: Option<bool>,
    /// Terminal width used to wrap previews.
    #[serde(default = "default_width")]
    pub width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: None,
            width: default_width(),
        }
    }
}

fn default_width() -> usize {
    100
}

/// Load the configuration file and apply the environment override.
///
/// A missing file yields the defaults; a file that exists but cannot be
/// read or parsed is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.service.base_url = url.trim().to_string();
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let url = &config.service.base_url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!(
            "service.base_url must start with http:// or https:// (got '{}')",
            url
        );
    }

    if config.service.timeout_secs == 0 {
        anyhow::bail!("service.timeout_secs must be > 0");
    }

    if config.output.width < 20 {
        anyhow::bail!("output.width must be >= 20");
    }

    Ok(())
}
