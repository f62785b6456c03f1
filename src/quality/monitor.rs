//! Periodic network sampling loop.
//!
//! A `SampleProvider` yields `NetworkQualitySample`s; the loop records
//! each one with the tier it maps to and logs tier changes. The pure
//! selection functions never touch ambient state -- everything they
//! need arrives through the sample.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::quality::{selector, ConnectionCategory, NetworkQualitySample, QualityLadder, QualityTier};
use crate::storage::{self, Pool};

/// Source of network condition samples.
#[async_trait::async_trait]
pub trait SampleProvider: Send + Sync {
    async fn sample(&self) -> Result<NetworkQualitySample>;
}

/// Estimates bandwidth from the negotiated link speed under
/// /sys/class/net. Wired hosts expose no connection-type signal, so
/// `connection_type_raw` is always absent here.
pub struct LinkSpeedProvider;

#[async_trait::async_trait]
impl SampleProvider for LinkSpeedProvider {
    async fn sample(&self) -> Result<NetworkQualitySample> {
        let speed = tokio::task::spawn_blocking(read_best_link_speed).await??;
        Ok(NetworkQualitySample {
            effective_bandwidth_mbps: speed.unwrap_or(0.0),
            latency_ms: 0,
            is_online: speed.is_some(),
            save_data_enabled: false,
            connection_type_raw: None,
        })
    }
}

fn read_best_link_speed() -> Result<Option<f64>> {
    let entries =
        std::fs::read_dir("/sys/class/net").context("Failed to read network interfaces")?;

    let mut best: Option<f64> = None;
    for entry in entries {
        let entry = entry?;
        let iface = entry.file_name().to_string_lossy().into_owned();
        if iface == "lo" {
            continue;
        }

        let speed_path = entry.path().join("speed");
        let Ok(text) = std::fs::read_to_string(&speed_path) else {
            continue;
        };
        // Down links report -1
        let Ok(mbps) = text.trim().parse::<f64>() else {
            continue;
        };
        if mbps <= 0.0 {
            continue;
        }

        if best.map_or(true, |b| mbps > b) {
            best = Some(mbps);
        }
    }

    Ok(best)
}

/// Fixed sample source for tests and one-shot CLI queries.
pub struct StaticProvider(pub NetworkQualitySample);

#[async_trait::async_trait]
impl SampleProvider for StaticProvider {
    async fn sample(&self) -> Result<NetworkQualitySample> {
        Ok(self.0.clone())
    }
}

/// Classify a sample the way a playback client would: a host with no
/// connection-type signal at all is assumed to be on wifi. The pure
/// classifier itself never makes that guess.
pub fn categorize(sample: &NetworkQualitySample) -> ConnectionCategory {
    match sample.connection_type_raw.as_deref() {
        None => ConnectionCategory::Wifi,
        raw => selector::classify_connection_type(raw),
    }
}

/// Poll the provider forever, recording each sample with the tier it
/// maps to.
pub async fn run_monitor_loop(
    provider: Arc<dyn SampleProvider>,
    pool: Pool,
    ladder: QualityLadder,
    poll_interval: Duration,
) {
    info!("Quality monitor started ({}s poll)", poll_interval.as_secs());

    let mut interval = tokio::time::interval(poll_interval);
    let mut last_tier: Option<QualityTier> = None;

    loop {
        interval.tick().await;

        let sample = match provider.sample().await {
            Ok(s) => s,
            Err(e) => {
                warn!("Sampling failed: {}", e);
                continue;
            }
        };

        let category = categorize(&sample);
        let tier = selector::recommend_quality(
            sample.effective_bandwidth_mbps,
            sample.save_data_enabled,
            &ladder,
        );

        if !sample.is_online {
            warn!("Host looks offline; advertising {} until the link recovers", tier);
        }
        if last_tier != Some(tier) {
            info!(
                bandwidth_mbps = sample.effective_bandwidth_mbps,
                %category,
                %tier,
                "Recommended tier changed"
            );
            last_tier = Some(tier);
        }

        if let Err(e) = storage::save_sample(&pool, &sample, category, tier, "monitor") {
            error!("Failed to record sample: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(raw: Option<&str>) -> NetworkQualitySample {
        NetworkQualitySample {
            effective_bandwidth_mbps: 3.0,
            latency_ms: 40,
            is_online: true,
            save_data_enabled: false,
            connection_type_raw: raw.map(str::to_string),
        }
    }

    #[test]
    fn test_categorize_assumes_wifi_without_signal() {
        assert_eq!(categorize(&sample(None)), ConnectionCategory::Wifi);
    }

    #[test]
    fn test_categorize_defers_to_classifier_with_signal() {
        assert_eq!(categorize(&sample(Some("3g"))), ConnectionCategory::ThreeG);
        assert_eq!(
            categorize(&sample(Some("balloon"))),
            ConnectionCategory::Unknown
        );
    }

    #[test]
    fn test_static_provider_returns_fixed_sample() {
        let provider = StaticProvider(sample(Some("4g")));
        let got = tokio_test::block_on(provider.sample()).unwrap();
        assert_eq!(got.connection_type_raw.as_deref(), Some("4g"));
        assert_eq!(got.effective_bandwidth_mbps, 3.0);
    }
}
