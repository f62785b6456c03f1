//! TOML configuration with per-section defaults.
//!
//! Every knob the decision logic exposes (conflict tolerance, quality
//! ladder) lives here rather than in the algorithms, so deployments
//! can tune them without a rebuild.

use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::quality::QualityLadder;
use crate::timetable::conflict::ConflictPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub conflict: ConflictPolicy,
    pub quality: QualityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "data/classwise.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub ladder: QualityLadder,
    pub poll_interval_secs: u64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            ladder: QualityLadder::default(),
            poll_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is
    /// missing. A present-but-invalid file is an error, as is a ladder
    /// that violates its ordering invariant.
    pub fn load(path: &str) -> Result<Self> {
        let config: AppConfig = match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("Invalid config file at {}", path))?,
            Err(_) => {
                warn!("Config file not found at {}. Using defaults.", path);
                AppConfig::default()
            }
        };

        config
            .quality
            .ladder
            .validate()
            .context("Quality ladder rejected")?;

        Ok(config)
    }
}
