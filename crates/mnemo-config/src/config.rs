use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use mnemo_core::ChunkLimits;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "mnemo";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8477";
const DEFAULT_PLATFORM: &str = "mnemo";
const DEFAULT_CHUNK_THRESHOLD: usize = 15_000;
const DEFAULT_SLICE_CHARS: usize = 20_000;
const DEFAULT_LOOKBACK_CHARS: usize = 1_000;

/// Top-level configuration loaded from `~/.config/mnemo/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MnemoConfig {
    pub store: StoreSettings,
    pub chunking: ChunkingSettings,
}

impl MnemoConfig {
    /// Load from the config file, then apply environment overrides
    /// (`MNEMO_STORE_URL`, `MNEMO_STORE_API_KEY`, `MNEMO_PLATFORM`).
    ///
    /// Returns defaults if the file does not exist or the config directory
    /// cannot be determined (e.g., no HOME in containers).
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Path to the config file: `~/.config/mnemo/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", APP_NAME)
            .context("Failed to determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MNEMO_STORE_URL")
            && !url.trim().is_empty()
        {
            self.store.base_url = url;
        }
        if let Ok(key) = std::env::var("MNEMO_STORE_API_KEY")
            && !key.trim().is_empty()
        {
            self.store.api_key = key;
        }
        if let Ok(platform) = std::env::var("MNEMO_PLATFORM")
            && !platform.trim().is_empty()
        {
            self.store.platform = platform;
        }
    }

    pub fn redacted_for_display(&self) -> Self {
        let mut redacted = self.clone();
        redacted.store.api_key = redacted.store.redacted_api_key();
        redacted
    }
}

/// Remote memory store connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Base address of the memory store HTTP API.
    pub base_url: String,
    /// Bearer token for the store, if it requires one.
    pub api_key: String,
    /// Tag identifying this host environment on every record it writes.
    pub platform: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl StoreSettings {
    pub fn is_default(&self) -> bool {
        self.base_url == DEFAULT_BASE_URL
            && self.api_key.is_empty()
            && self.platform == DEFAULT_PLATFORM
    }

    pub fn redacted_api_key(&self) -> String {
        mask_api_key(&self.api_key)
    }
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.redacted_api_key())
            .field("platform", &self.platform)
            .finish()
    }
}

impl fmt::Display for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base_url=\"{}\", api_key=\"{}\", platform=\"{}\"",
            self.base_url,
            self.redacted_api_key(),
            self.platform
        )
    }
}

/// Chunking constants consumed by the chunk planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Content at or below this many chars is saved as a single record.
    pub threshold_chars: usize,
    /// Tentative slice length for chunked saves.
    pub slice_chars: usize,
    /// Lookback window for boundary-aware cut points.
    pub lookback_chars: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            threshold_chars: DEFAULT_CHUNK_THRESHOLD,
            slice_chars: DEFAULT_SLICE_CHARS,
            lookback_chars: DEFAULT_LOOKBACK_CHARS,
        }
    }
}

impl ChunkingSettings {
    pub fn limits(&self) -> ChunkLimits {
        ChunkLimits {
            threshold_chars: self.threshold_chars,
            slice_chars: self.slice_chars,
            lookback_chars: self.lookback_chars,
        }
    }
}

fn mask_api_key(api_key: &str) -> String {
    if api_key.is_empty() {
        return String::new();
    }

    let char_count = api_key.chars().count();
    let prefix: String = api_key.chars().take(3).collect();
    let suffix: String = api_key.chars().skip(char_count.saturating_sub(4)).collect();

    if char_count <= 4 {
        format!("***{suffix}")
    } else {
        format!("{prefix}...{suffix}")
    }
}
