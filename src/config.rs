use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::scheduler::SchedulerConfig;
use crate::model::action::KeywordTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Delay before the single chat retry after a failed turn.
    pub chat_retry_delay_ms: u64,
    pub scheduler: SchedulerConfig,
    pub keywords: KeywordTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 60,
            chat_retry_delay_ms: 2_000,
            scheduler: SchedulerConfig::default(),
            keywords: KeywordTable::default(),
        }
    }
}

pub fn config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("firenze");
    fs::create_dir_all(&path).ok();
    path.push("config.json");
    path
}

/// Loads the config file if present, falling back to defaults on any
/// problem. A broken config should never keep the game from starting.
pub fn load_config(path: &Path) -> EngineConfig {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config file");
                EngineConfig::default()
            }
        },
        Err(_) => EngineConfig::default(),
    }
}
