//! Pure tier recommendation and connection classification.
//!
//! Both functions are total and side-effect-free: every input produces
//! a defined answer, nothing is retried or recovered.

use super::{ConnectionCategory, QualityLadder, QualityTier};

/// Pick a playback tier for the observed bandwidth.
///
/// Data-saver forces the ladder floor regardless of bandwidth.
/// Otherwise the first rung (highest to lowest) whose threshold fits
/// wins; below every threshold the floor is returned anyway, so low
/// bandwidth degrades playback but never disables it. Negative or NaN
/// bandwidth is clamped to zero.
pub fn recommend_quality(
    bandwidth_mbps: f64,
    save_data: bool,
    ladder: &QualityLadder,
) -> QualityTier {
    if save_data {
        return ladder.floor_tier();
    }

    let bandwidth = if bandwidth_mbps.is_nan() || bandwidth_mbps < 0.0 {
        0.0
    } else {
        bandwidth_mbps
    };

    for step in &ladder.steps {
        if step.min_mbps <= bandwidth {
            return step.tier;
        }
    }

    ladder.floor_tier()
}

/// Map a raw connection-type signal to a display category.
///
/// Unrecognized or absent signals are `Unknown`; this function never
/// guesses `Wifi`. Hosts with no connection-type support at all are
/// handled by the caller (see `monitor::categorize`).
pub fn classify_connection_type(raw: Option<&str>) -> ConnectionCategory {
    match raw {
        Some("4g") => ConnectionCategory::FourG,
        Some("3g") => ConnectionCategory::ThreeG,
        Some("2g") | Some("slow-2g") => ConnectionCategory::TwoG,
        _ => ConnectionCategory::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> QualityLadder {
        QualityLadder::default()
    }

    #[test]
    fn test_high_bandwidth_gets_top_tier() {
        assert_eq!(
            recommend_quality(6.0, false, &ladder()),
            QualityTier::P1080
        );
    }

    #[test]
    fn test_below_floor_falls_back_to_lowest() {
        assert_eq!(recommend_quality(0.2, false, &ladder()), QualityTier::P360);
    }

    #[test]
    fn test_save_data_overrides_bandwidth() {
        assert_eq!(recommend_quality(6.0, true, &ladder()), QualityTier::P360);
        assert_eq!(recommend_quality(100.0, true, &ladder()), QualityTier::P360);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(recommend_quality(5.0, false, &ladder()), QualityTier::P1080);
        assert_eq!(recommend_quality(2.5, false, &ladder()), QualityTier::P720);
        assert_eq!(recommend_quality(1.2, false, &ladder()), QualityTier::P480);
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        assert_eq!(
            recommend_quality(-3.0, false, &ladder()),
            QualityTier::P360
        );
        assert_eq!(
            recommend_quality(f64::NAN, false, &ladder()),
            QualityTier::P360
        );
    }

    #[test]
    fn test_huge_bandwidth_is_defined() {
        assert_eq!(
            recommend_quality(f64::INFINITY, false, &ladder()),
            QualityTier::P1080
        );
        assert_eq!(
            recommend_quality(1.0e9, false, &ladder()),
            QualityTier::P1080
        );
    }

    #[test]
    fn test_tier_is_monotonic_in_bandwidth() {
        let ladder = ladder();
        let mut last = recommend_quality(0.0, false, &ladder);
        let mut mbps = 0.0;
        while mbps < 10.0 {
            let tier = recommend_quality(mbps, false, &ladder);
            assert!(tier >= last, "tier dropped at {} Mbps", mbps);
            last = tier;
            mbps += 0.1;
        }
    }

    #[test]
    fn test_classify_known_signals() {
        assert_eq!(
            classify_connection_type(Some("4g")),
            ConnectionCategory::FourG
        );
        assert_eq!(
            classify_connection_type(Some("3g")),
            ConnectionCategory::ThreeG
        );
        assert_eq!(
            classify_connection_type(Some("2g")),
            ConnectionCategory::TwoG
        );
        assert_eq!(
            classify_connection_type(Some("slow-2g")),
            ConnectionCategory::TwoG
        );
    }

    #[test]
    fn test_classify_never_guesses_wifi() {
        assert_eq!(classify_connection_type(None), ConnectionCategory::Unknown);
        assert_eq!(
            classify_connection_type(Some("wifi")),
            ConnectionCategory::Unknown
        );
        assert_eq!(
            classify_connection_type(Some("5g")),
            ConnectionCategory::Unknown
        );
    }
}
