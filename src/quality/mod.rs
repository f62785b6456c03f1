//! Adaptive stream quality selection.
//!
//! Maps observed network conditions to a recommended playback tier.
//! The selection logic itself is pure (see `selector`); the background
//! sampling loop lives in `monitor`.

pub mod monitor;
pub mod selector;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LadderError {
    #[error("quality ladder is empty")]
    Empty,

    #[error("ladder thresholds must strictly decrease: {tier} at {min_mbps} Mbps does not")]
    NotDescending { tier: QualityTier, min_mbps: f64 },
}

/// Playback quality tiers, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityTier::P360 => write!(f, "360p"),
            QualityTier::P480 => write!(f, "480p"),
            QualityTier::P720 => write!(f, "720p"),
            QualityTier::P1080 => write!(f, "1080p"),
        }
    }
}

/// Connection category for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionCategory {
    #[serde(rename = "wifi")]
    Wifi,
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for ConnectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionCategory::Wifi => write!(f, "wifi"),
            ConnectionCategory::FourG => write!(f, "4g"),
            ConnectionCategory::ThreeG => write!(f, "3g"),
            ConnectionCategory::TwoG => write!(f, "2g"),
            ConnectionCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// One rung of the ladder: the minimum bandwidth that qualifies for a tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityStep {
    pub tier: QualityTier,
    pub min_mbps: f64,
}

/// Ordered threshold table, highest tier first. The last rung is the
/// floor: it is the answer for data-saver mode and for bandwidth below
/// every threshold. Invariants (non-empty, strictly descending
/// thresholds) are enforced at config-load time, not per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityLadder {
    pub steps: Vec<QualityStep>,
}

impl Default for QualityLadder {
    fn default() -> Self {
        Self {
            steps: vec![
                QualityStep {
                    tier: QualityTier::P1080,
                    min_mbps: 5.0,
                },
                QualityStep {
                    tier: QualityTier::P720,
                    min_mbps: 2.5,
                },
                QualityStep {
                    tier: QualityTier::P480,
                    min_mbps: 1.2,
                },
                QualityStep {
                    tier: QualityTier::P360,
                    min_mbps: 0.4,
                },
            ],
        }
    }
}

impl QualityLadder {
    pub fn validate(&self) -> Result<(), LadderError> {
        if self.steps.is_empty() {
            return Err(LadderError::Empty);
        }
        for pair in self.steps.windows(2) {
            if pair[1].min_mbps >= pair[0].min_mbps {
                return Err(LadderError::NotDescending {
                    tier: pair[1].tier,
                    min_mbps: pair[1].min_mbps,
                });
            }
        }
        Ok(())
    }

    /// The fallback tier. An empty ladder should not survive config
    /// validation; 360p covers the hole anyway.
    pub fn floor_tier(&self) -> QualityTier {
        self.steps.last().map(|s| s.tier).unwrap_or(QualityTier::P360)
    }
}

/// Observed connection characteristics, as reported by a playback
/// client or measured on the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkQualitySample {
    pub effective_bandwidth_mbps: f64,
    #[serde(default)]
    pub latency_ms: u32,
    #[serde(default = "default_true")]
    pub is_online: bool,
    #[serde(default)]
    pub save_data_enabled: bool,
    #[serde(default)]
    pub connection_type_raw: Option<String>,
}

fn default_true() -> bool {
    true
}
