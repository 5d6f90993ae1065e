use crate::decompose::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::persistence::{atomic_write, config_file};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// App configuration stored in config.json. Every field defaults, so a
/// missing or partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Decomposition endpoint (OpenAI-compatible chat completions)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; the OPENAI_API_KEY environment variable takes precedence
    #[serde(default)]
    pub api_key: Option<String>,
    /// Minutes before a subtask's datetime at which its reminder fires
    #[serde(default)]
    pub reminder_window_minutes: Option<i64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            reminder_window_minutes: None,
        }
    }
}

impl AppConfig {
    /// Resolve the API key: environment first, then config file
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Load config from a specific path; missing file means defaults
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Load config from the default location, seeding a fresh config.json with
/// defaults on first run so the user has a file to edit
pub fn load_default_config() -> Result<AppConfig> {
    let path = config_file()?;
    if !path.exists() {
        let config = AppConfig::default();
        save_config(&path, &config)?;
        return Ok(config);
    }
    load_config(path)
}

/// Save config atomically
pub fn save_config<P: AsRef<Path>>(path: P, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    atomic_write(path, &json)?;
    Ok(())
}
