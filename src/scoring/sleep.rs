// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sleep timing consistency estimation.
//!
//! Three tiers, best available wins: recorded per-day consistency
//! scores, a timing-midpoint variability proxy, or an explicit data
//! gap. The proxy never fabricates a score; it only supplies the band
//! label and standard deviation.

use crate::models::{SleepBand, SleepConsistency, SleepDay, SleepSource};
use crate::scoring::normalizer::stdev;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Band from the timing-midpoint standard deviation in minutes.
pub fn band_from_sd(sd_minutes: f64) -> SleepBand {
    if !sd_minutes.is_finite() {
        return SleepBand::DataGap;
    }
    let sd = sd_minutes.round().max(0.0);
    if sd <= 15.0 {
        SleepBand::Elite
    } else if sd <= 30.0 {
        SleepBand::Stable
    } else if sd <= 45.0 {
        SleepBand::Drifting
    } else if sd <= 60.0 {
        SleepBand::Irregular
    } else {
        SleepBand::Chaotic
    }
}

/// Band from a recorded consistency score, used when timing data is
/// too thin for the midpoint proxy.
pub fn band_from_score(score: Option<f64>) -> SleepBand {
    let s = match score {
        Some(v) if v.is_finite() => v,
        _ => return SleepBand::DataGap,
    };
    if s >= 90.0 {
        SleepBand::Elite
    } else if s >= 75.0 {
        SleepBand::Stable
    } else if s >= 60.0 {
        SleepBand::Drifting
    } else if s >= 45.0 {
        SleepBand::Irregular
    } else {
        SleepBand::Chaotic
    }
}

/// Sleep midpoints in minutes since midnight, wrapping past-midnight
/// bedtimes forward a day before halving.
fn collect_midpoints(days: &[SleepDay]) -> (Vec<f64>, u32) {
    let mut mids = Vec::new();
    let mut missing = 0u32;
    for day in days {
        let (start, end) = match (day.start_minutes, day.end_minutes) {
            (Some(s), Some(e)) if s.is_finite() && e.is_finite() => (s, e),
            _ => {
                missing += 1;
                continue;
            }
        };
        let end = if end <= start { end + MINUTES_PER_DAY } else { end };
        mids.push(((start + end) / 2.0) % MINUTES_PER_DAY);
    }
    (mids, missing)
}

/// Estimate weekly sleep consistency from daily rows.
pub fn compute_sleep_consistency(days: &[SleepDay]) -> SleepConsistency {
    if days.is_empty() {
        return SleepConsistency::default();
    }

    let recorded: Vec<f64> = days
        .iter()
        .filter_map(|d| d.consistency_score.filter(|v| v.is_finite()))
        .collect();

    if !recorded.is_empty() {
        let avg = recorded.iter().sum::<f64>() / recorded.len() as f64;
        let score = avg.round().clamp(0.0, 100.0);
        let gaps = (days.len() - recorded.len()) as u32;
        let (mids, _) = collect_midpoints(days);
        let sd_minutes = if mids.len() >= 2 {
            Some(stdev(&mids).round())
        } else {
            None
        };
        let label = match sd_minutes {
            Some(sd) => band_from_sd(sd),
            None => band_from_score(Some(score)),
        };
        return SleepConsistency {
            score: Some(score),
            label,
            source: SleepSource::Recorded,
            sd_minutes,
            gaps,
        };
    }

    let (mids, missing) = collect_midpoints(days);
    if mids.len() < 2 {
        return SleepConsistency {
            score: None,
            label: SleepBand::DataGap,
            source: SleepSource::Proxy,
            sd_minutes: None,
            gaps: missing.max((days.len() - mids.len()) as u32),
        };
    }

    let sd = stdev(&mids);
    SleepConsistency {
        score: None,
        label: band_from_sd(sd),
        source: SleepSource::Proxy,
        sd_minutes: Some(sd.round()),
        gaps: missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32, score: Option<f64>, start: Option<f64>, end: Option<f64>) -> SleepDay {
        SleepDay {
            date: NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
            total_minutes: Some(420.0),
            consistency_score: score,
            start_minutes: start,
            end_minutes: end,
        }
    }

    #[test]
    fn test_empty_week_is_full_gap() {
        let info = compute_sleep_consistency(&[]);
        assert_eq!(info.score, None);
        assert_eq!(info.label, SleepBand::DataGap);
        assert_eq!(info.source, SleepSource::Missing);
        assert_eq!(info.gaps, 7);
    }

    #[test]
    fn test_recorded_scores_average_and_clamp() {
        let days = vec![
            day(14, Some(90.0), None, None),
            day(15, Some(80.0), None, None),
            day(16, None, None, None),
        ];
        let info = compute_sleep_consistency(&days);
        assert_eq!(info.score, Some(85.0));
        assert_eq!(info.source, SleepSource::Recorded);
        assert_eq!(info.gaps, 1);
        // No timing data, so the band falls back to the score ladder.
        assert_eq!(info.sd_minutes, None);
        assert_eq!(info.label, SleepBand::Stable);
    }

    #[test]
    fn test_recorded_scores_prefer_timing_band_when_available() {
        // Midpoints hours apart: a chaotic rhythm even though the
        // recorded score reads high.
        let days = vec![
            day(14, Some(95.0), Some(1140.0), Some(60.0)),
            day(15, Some(95.0), Some(240.0), Some(600.0)),
        ];
        let info = compute_sleep_consistency(&days);
        assert_eq!(info.score, Some(95.0));
        assert_eq!(info.label, SleepBand::Chaotic);
        assert!(info.sd_minutes.unwrap() > 60.0);
    }

    #[test]
    fn test_proxy_path_uses_midpoint_sd() {
        // Bedtime 23:00-07:00 both nights: identical midpoints, sd 0.
        let days = vec![
            day(14, None, Some(1380.0), Some(420.0)),
            day(15, None, Some(1380.0), Some(420.0)),
        ];
        let info = compute_sleep_consistency(&days);
        assert_eq!(info.score, None);
        assert_eq!(info.source, SleepSource::Proxy);
        assert_eq!(info.label, SleepBand::Elite);
        assert_eq!(info.sd_minutes, Some(0.0));
        assert_eq!(info.gaps, 0);
    }

    #[test]
    fn test_proxy_path_with_thin_timing_is_gap() {
        let days = vec![
            day(14, None, Some(1380.0), Some(420.0)),
            day(15, None, None, None),
        ];
        let info = compute_sleep_consistency(&days);
        assert_eq!(info.score, None);
        assert_eq!(info.label, SleepBand::DataGap);
        assert_eq!(info.source, SleepSource::Proxy);
        assert_eq!(info.gaps, 1);
    }

    #[test]
    fn test_midnight_wrap() {
        // 23:00 to 07:00 wraps: midpoint (1380 + 1860)/2 = 1620 % 1440 = 180.
        let (mids, missing) = collect_midpoints(&[day(14, None, Some(1380.0), Some(420.0))]);
        assert_eq!(missing, 0);
        assert_eq!(mids, vec![180.0]);
    }

    #[test]
    fn test_band_ladders() {
        assert_eq!(band_from_sd(10.0), SleepBand::Elite);
        assert_eq!(band_from_sd(30.0), SleepBand::Stable);
        assert_eq!(band_from_sd(45.0), SleepBand::Drifting);
        assert_eq!(band_from_sd(60.0), SleepBand::Irregular);
        assert_eq!(band_from_sd(61.0), SleepBand::Chaotic);
        assert_eq!(band_from_score(Some(92.0)), SleepBand::Elite);
        assert_eq!(band_from_score(Some(50.0)), SleepBand::Irregular);
        assert_eq!(band_from_score(None), SleepBand::DataGap);
    }
}
