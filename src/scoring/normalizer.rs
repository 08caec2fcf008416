// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Goal-relative normalization primitives.
//!
//! Every helper is null-safe: missing or non-finite inputs yield None
//! (or a documented zero fallback) so downstream scoring never panics
//! on a data gap.

use crate::models::FulfilmentBand;

/// Clamp to [0,1]; missing or non-finite values become 0.
pub fn clamp01(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Clamp to [0,100]; missing or non-finite values become 0.
pub fn pct_clamp(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// Round and clamp a fulfilment percent to the [0,130] display window.
pub fn clamp_fulfilment(value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v.round().clamp(0.0, 130.0)),
        _ => None,
    }
}

/// Percent of goal, rounded and clamped to [0,100].
/// A zero or missing goal yields None rather than a division blowup.
pub fn pct_of_goal(value: Option<f64>, goal: Option<f64>) -> Option<f64> {
    let (v, g) = both_finite(value, goal)?;
    if g == 0.0 {
        return None;
    }
    Some(((v / g) * 100.0).round().clamp(0.0, 100.0))
}

/// Percent of goal without the 100 ceiling, for over-achievement display.
pub fn pct_of_goal_unlimited(value: Option<f64>, goal: Option<f64>) -> Option<f64> {
    let (v, g) = both_finite(value, goal)?;
    if g == 0.0 {
        return None;
    }
    Some(((v / g) * 100.0).round())
}

/// Rounded percent change of `current` against a trailing average.
pub fn pct_vs_trend(current: Option<f64>, average: Option<f64>) -> Option<f64> {
    let (c, a) = both_finite(current, average)?;
    if a == 0.0 {
        return None;
    }
    Some((((c - a) / a) * 100.0).round())
}

/// Classify a fulfilment percent by its deviation from 100.
pub fn band_for_fulfilment(
    pct: Option<f64>,
    green_tolerance: f64,
    yellow_tolerance: f64,
) -> FulfilmentBand {
    let p = match pct {
        Some(v) if v.is_finite() => v,
        _ => return FulfilmentBand::Unknown,
    };
    let diff = p - 100.0;
    let abs_diff = diff.abs();
    if abs_diff <= green_tolerance {
        FulfilmentBand::Green
    } else if abs_diff <= yellow_tolerance {
        if diff >= 0.0 {
            FulfilmentBand::YellowHigh
        } else {
            FulfilmentBand::YellowLow
        }
    } else if diff >= 0.0 {
        FulfilmentBand::RedHigh
    } else {
        FulfilmentBand::RedLow
    }
}

/// Weighted average over the components whose value is present,
/// re-normalizing weights across them. All components missing yields None.
pub fn weighted_average(components: &[(f64, Option<f64>)]) -> Option<f64> {
    let mut sum = 0.0;
    let mut weights = 0.0;
    for (weight, value) in components {
        if let Some(v) = value {
            if v.is_finite() {
                sum += v * weight;
                weights += weight;
            }
        }
    }
    if weights > 0.0 {
        Some(sum / weights)
    } else {
        None
    }
}

/// Recency-weighted blend of up to `weights.len()` values, newest first.
///
/// A missing week's weight is simply dropped, never redistributed, so
/// sparse history reads conservatively low instead of inflating the
/// remaining weeks.
pub fn recency_blend(values: &[Option<f64>], weights: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sum = 0.0;
    let mut any = false;
    for (i, value) in values.iter().enumerate() {
        let weight = weights.get(i).copied().unwrap_or(0.0);
        if let Some(v) = value {
            if v.is_finite() {
                sum += v * weight;
                any = true;
            }
        }
    }
    if any {
        Some(sum)
    } else {
        None
    }
}

/// Raw rounded point delta between the two most recent per-week values.
pub fn point_delta(current: Option<f64>, previous: Option<f64>) -> Option<i32> {
    let (c, p) = both_finite(current, previous)?;
    Some((c - p).round() as i32)
}

/// Score a value against a target: ratio capped at 1.2, scaled to
/// percent, rounded and ceilinged at 100. Missing inputs score 0.
/// `better_is_lower` inverts the ratio for metrics like resting HR.
pub fn score_from_target(value: Option<f64>, target: Option<f64>, better_is_lower: bool) -> f64 {
    let (v, t) = match both_finite(value, target) {
        Some(pair) => pair,
        None => return 0.0,
    };
    let ratio = if better_is_lower {
        t / v.max(1.0)
    } else {
        v / t.max(1.0)
    };
    let score = ratio.clamp(0.0, 1.2) * 100.0;
    score.min(100.0).round()
}

/// Square-root scale mapping a goal ratio to [0,100]: 0.25 scores 50,
/// 1.0 scores 100. Rewards partial progress without linear harshness.
pub fn sqrt_scale(ratio: f64) -> f64 {
    if !ratio.is_finite() {
        return 0.0;
    }
    (ratio.max(0.0).sqrt() * 100.0).min(100.0).round()
}

/// Sample standard deviation; fewer than two points yields 0.
pub fn stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// One-word trend descriptor, "stable" inside the tolerance band.
pub fn trend_word(
    delta: Option<f64>,
    positive_is_good: bool,
    tolerance: f64,
    up_word: &'static str,
    down_word: &'static str,
) -> Option<&'static str> {
    let d = match delta {
        Some(v) if v.is_finite() => v,
        _ => return None,
    };
    if d.abs() <= tolerance {
        return Some("stable");
    }
    let is_good = (d > 0.0) == positive_is_good;
    Some(if is_good { up_word } else { down_word })
}

fn both_finite(a: Option<f64>, b: Option<f64>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_of_goal_bounds() {
        assert_eq!(pct_of_goal(Some(50.0), Some(100.0)), Some(50.0));
        assert_eq!(pct_of_goal(Some(100.0), Some(100.0)), Some(100.0));
        assert_eq!(pct_of_goal(Some(180.0), Some(100.0)), Some(100.0));
        assert_eq!(pct_of_goal(Some(-5.0), Some(100.0)), Some(0.0));
        assert_eq!(pct_of_goal(Some(50.0), Some(0.0)), None);
        assert_eq!(pct_of_goal(None, Some(100.0)), None);
    }

    #[test]
    fn test_pct_of_goal_unlimited_keeps_overshoot() {
        assert_eq!(pct_of_goal_unlimited(Some(180.0), Some(100.0)), Some(180.0));
        assert_eq!(pct_of_goal_unlimited(Some(50.0), Some(0.0)), None);
    }

    #[test]
    fn test_pct_vs_trend() {
        assert_eq!(pct_vs_trend(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(pct_vs_trend(Some(90.0), Some(100.0)), Some(-10.0));
        assert_eq!(pct_vs_trend(Some(90.0), Some(0.0)), None);
        assert_eq!(pct_vs_trend(None, Some(100.0)), None);
    }

    #[test]
    fn test_clamp_fulfilment_window() {
        assert_eq!(clamp_fulfilment(Some(145.2)), Some(130.0));
        assert_eq!(clamp_fulfilment(Some(-4.0)), Some(0.0));
        assert_eq!(clamp_fulfilment(Some(96.6)), Some(97.0));
        assert_eq!(clamp_fulfilment(None), None);
    }

    #[test]
    fn test_band_for_fulfilment() {
        assert_eq!(
            band_for_fulfilment(Some(103.0), 5.0, 10.0),
            FulfilmentBand::Green
        );
        assert_eq!(
            band_for_fulfilment(Some(108.0), 5.0, 10.0),
            FulfilmentBand::YellowHigh
        );
        assert_eq!(
            band_for_fulfilment(Some(92.0), 5.0, 10.0),
            FulfilmentBand::YellowLow
        );
        assert_eq!(
            band_for_fulfilment(Some(115.0), 5.0, 10.0),
            FulfilmentBand::RedHigh
        );
        assert_eq!(
            band_for_fulfilment(Some(80.0), 5.0, 10.0),
            FulfilmentBand::RedLow
        );
        assert_eq!(band_for_fulfilment(None, 5.0, 10.0), FulfilmentBand::Unknown);
    }

    #[test]
    fn test_weighted_average_renormalizes_over_present_terms() {
        let all = [(0.4, Some(100.0)), (0.3, Some(50.0)), (0.3, Some(0.0))];
        assert_eq!(weighted_average(&all), Some(55.0));

        let sparse = [(0.4, Some(100.0)), (0.3, None), (0.3, Some(0.0))];
        let blended = weighted_average(&sparse).unwrap();
        assert!((blended - 40.0 / 0.7).abs() < 1e-9);

        let empty: [(f64, Option<f64>); 2] = [(0.4, None), (0.6, None)];
        assert_eq!(weighted_average(&empty), None);
    }

    #[test]
    fn test_recency_blend_drops_missing_weights() {
        let weights = [0.4, 0.3, 0.2, 0.1];
        let full = [Some(80.0), Some(70.0), Some(60.0), Some(50.0)];
        assert_eq!(recency_blend(&full, &weights), Some(70.0));

        // Missing weeks under-weight the blend instead of inflating it.
        let sparse = [Some(80.0), None, Some(60.0), None];
        assert_eq!(recency_blend(&sparse, &weights), Some(44.0));

        assert_eq!(recency_blend(&[None, None], &weights), None);
        assert_eq!(recency_blend(&[], &weights), None);
    }

    #[test]
    fn test_point_delta_is_raw_points() {
        assert_eq!(point_delta(Some(74.0), Some(70.0)), Some(4));
        assert_eq!(point_delta(Some(60.0), Some(70.4)), Some(-10));
        assert_eq!(point_delta(Some(74.0), None), None);
    }

    #[test]
    fn test_score_from_target() {
        assert_eq!(score_from_target(Some(444.0), Some(444.0), false), 100.0);
        assert_eq!(score_from_target(Some(222.0), Some(444.0), false), 50.0);
        // Over-achievement is capped at 100 even before the 1.2 ratio cap.
        assert_eq!(score_from_target(Some(600.0), Some(444.0), false), 100.0);
        assert_eq!(score_from_target(None, Some(444.0), false), 0.0);
        // Lower-is-better inverts the ratio.
        assert_eq!(score_from_target(Some(52.0), Some(52.0), true), 100.0);
        assert_eq!(score_from_target(Some(65.0), Some(52.0), true), 80.0);
    }

    #[test]
    fn test_sqrt_scale_anchors() {
        assert_eq!(sqrt_scale(0.25), 50.0);
        assert_eq!(sqrt_scale(1.0), 100.0);
        assert_eq!(sqrt_scale(2.0), 100.0);
        assert_eq!(sqrt_scale(-1.0), 0.0);
    }

    #[test]
    fn test_stdev() {
        assert_eq!(stdev(&[]), 0.0);
        assert_eq!(stdev(&[5.0]), 0.0);
        let sd = stdev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.138).abs() < 0.001);
    }

    #[test]
    fn test_trend_word() {
        assert_eq!(
            trend_word(Some(5.0), true, 2.0, "improving", "sliding"),
            Some("improving")
        );
        assert_eq!(
            trend_word(Some(-5.0), true, 2.0, "improving", "sliding"),
            Some("sliding")
        );
        assert_eq!(
            trend_word(Some(1.0), true, 2.0, "improving", "sliding"),
            Some("stable")
        );
        assert_eq!(trend_word(None, true, 2.0, "improving", "sliding"), None);
    }
}
