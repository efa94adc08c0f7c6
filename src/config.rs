use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the news-aggregation backend.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Period of the unconditional feed+status refresh, in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Quiet window for coalescing custom-search keystrokes, in milliseconds.
    #[serde(default = "default_search_quiet_ms")]
    pub search_quiet_ms: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter level (overridden by RUST_LOG).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for the rolling log file while the TUI owns the terminal.
    pub log_directory: Option<String>,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

fn default_search_quiet_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            search_quiet_ms: default_search_quiet_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_directory: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        // Look for config.ron in the current directory or next to the executable
        let mut candidates = Vec::new();
        candidates.push(PathBuf::from("config.ron"));
        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join("config.ron"));
        }

        for path in candidates {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match ron::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse config at {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Self::default()
    }
}
