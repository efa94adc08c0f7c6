use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_TOPIC: &str = "all";

/// The user's topic and free-text search refinement. This is the fast local
/// copy; the server holds the authoritative one for what fetches return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    #[serde(rename = "newsPreferences", default = "default_topic")]
    pub topic: String,
    #[serde(rename = "customSearch", default)]
    pub custom_search: String,
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

impl Default for Preference {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            custom_search: String::new(),
        }
    }
}

/// File-backed preference storage under the OS config directory.
///
/// Storage is treated as always available: any read problem (missing file,
/// unparseable content, unresolvable config dir) silently yields defaults,
/// and write failures are logged but never surfaced to callers.
#[derive(Debug, Clone)]
pub struct PrefStore {
    file_path: Option<PathBuf>,
}

impl PrefStore {
    /// Resolve `<config_dir>/newsdeck/preferences.json`, creating the
    /// directory if needed.
    pub fn open() -> Self {
        let Some(config_dir) = dirs::config_dir().map(|d| d.join("newsdeck")) else {
            warn!("could not resolve a config directory; preferences will not persist");
            return Self { file_path: None };
        };

        if !config_dir.exists()
            && let Err(e) = fs::create_dir_all(&config_dir)
        {
            warn!(config_dir = %config_dir.display(), error = %e,
                "failed to create config directory; preferences will not persist");
            return Self { file_path: None };
        }

        let file_path = config_dir.join("preferences.json");
        info!(preferences_file = %file_path.display(), "resolved preferences file path");
        Self {
            file_path: Some(file_path),
        }
    }

    /// Store backed by an explicit file path. Used by tests.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file_path: Some(path),
        }
    }

    /// Read the stored preference, substituting defaults for anything
    /// missing or unreadable.
    pub fn get(&self) -> Preference {
        let Some(path) = &self.file_path else {
            return Preference::default();
        };
        let Ok(content) = fs::read_to_string(path) else {
            return Preference::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Write both fields in a single file write, so readers never observe a
    /// partial update.
    pub fn set(&self, topic: &str, custom_search: &str) {
        let Some(path) = &self.file_path else {
            return;
        };
        let pref = Preference {
            topic: topic.to_string(),
            custom_search: custom_search.to_string(),
        };
        match serde_json::to_string_pretty(&pref) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    warn!(preferences_file = %path.display(), error = %e,
                        "failed to write preferences");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize preferences"),
        }
    }
}
