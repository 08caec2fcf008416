// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Graded bucket scores for the four report domains.
//!
//! Each bucket starts from a goal ratio and applies bounded penalties
//! for secondary risk signals. Grades and bands are pure functions of
//! the final score, so re-grading an already graded score is a no-op.

use crate::constants::{acwr, rhr, sleep};
use crate::models::{BucketScore, ConfidenceBadge, MissingCounts, ScoreBand};

const GRADE_LADDER: [(f64, &str); 11] = [
    (95.0, "A+"),
    (90.0, "A"),
    (85.0, "A-"),
    (80.0, "B+"),
    (75.0, "B"),
    (70.0, "B-"),
    (65.0, "C+"),
    (60.0, "C"),
    (55.0, "C-"),
    (45.0, "D"),
    (0.0, "F"),
];

/// Band from a raw score: 85+ success, 70+ warning, below danger.
pub fn band_of_score(score: Option<f64>) -> ScoreBand {
    let s = match score {
        Some(v) if v.is_finite() => v,
        _ => return ScoreBand::Neutral,
    };
    if s >= 85.0 {
        ScoreBand::Success
    } else if s >= 70.0 {
        ScoreBand::Warning
    } else {
        ScoreBand::Danger
    }
}

/// Attach a letter grade and band to a score. Missing scores grade as
/// an em-dash with a neutral band.
pub fn grade_from_score(score: Option<f64>) -> BucketScore {
    let normalized = score
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0));
    let grade = match normalized {
        None => "—".to_string(),
        Some(n) => {
            let mut grade = "F";
            for (cut, letter) in GRADE_LADDER {
                if n >= cut {
                    grade = letter;
                    break;
                }
            }
            grade.to_string()
        }
    };
    let band = band_of_score(normalized);
    let score_text = match normalized {
        Some(n) => format!("{}/100", n as i64),
        None => String::new(),
    };
    BucketScore {
        score: normalized,
        grade,
        band,
        band_class: band.status_class().to_string(),
        band_label: band.label().to_string(),
        score_text,
    }
}

/// Sleep bucket: goal ratio, penalized for chaotic timing and an
/// elevated resting heart rate.
pub fn score_sleep_bucket(
    sleep_minutes: Option<f64>,
    sleep_goal: Option<f64>,
    sd_minutes: Option<f64>,
    rhr_delta: Option<f64>,
) -> BucketScore {
    let mut score = 50.0;
    if let (Some(minutes), Some(goal)) = (sleep_minutes, sleep_goal) {
        if goal > 0.0 {
            score = (minutes / goal * 100.0).round();
        }
    }
    if let Some(sd) = sd_minutes {
        if sd > sleep::CONSISTENCY_RED {
            score = (score - 10.0).max(30.0);
        }
    }
    if let Some(delta) = rhr_delta {
        if delta > rhr::RED_DELTA_BPM {
            score = (score - 15.0).max(20.0);
        }
    }
    grade_from_score(Some(score.clamp(0.0, 100.0)))
}

/// Load bucket: scored off the workload ratio band, penalized for a
/// large swing against the 4-week trend.
pub fn score_load_bucket(acwr_ratio: Option<f64>, load_pct_vs_trend: Option<f64>) -> BucketScore {
    let mut score = 50.0;
    if let Some(ratio) = acwr_ratio {
        score = if ratio > 1.5 {
            (100.0 - (ratio - 1.0) * 50.0).max(30.0)
        } else if ratio > acwr::RED_RATIO {
            55.0
        } else if ratio > acwr::AMBER_RATIO {
            70.0
        } else if ratio >= acwr::ALERT_LOW {
            80.0
        } else {
            65.0
        };
    }
    if let Some(pct) = load_pct_vs_trend {
        if pct.abs() > 20.0 {
            score = (score - 10.0).max(25.0);
        }
    }
    grade_from_score(Some(score.clamp(0.0, 100.0)))
}

/// Activity bucket: step-goal ratio, penalized for poor floor compliance.
pub fn score_activity_bucket(
    steps: Option<f64>,
    steps_goal: Option<f64>,
    floor_days: u32,
    floor_target: u32,
) -> BucketScore {
    let mut score = 50.0;
    if let (Some(s), Some(goal)) = (steps, steps_goal) {
        if goal > 0.0 {
            score = (s / goal * 100.0).round();
        }
    }
    if floor_target > 0 {
        let floor_ratio = f64::from(floor_days) / f64::from(floor_target);
        if floor_ratio < 0.5 {
            score = (score - 20.0).max(25.0);
        } else if floor_ratio < 0.8 {
            score = (score - 10.0).max(40.0);
        }
    }
    grade_from_score(Some(score.clamp(0.0, 100.0)))
}

/// Work bucket: hours-goal ratio, penalized for thin deep-focus share.
pub fn score_work_bucket(
    hours: Option<f64>,
    hours_goal: Option<f64>,
    deep_work_pct: Option<f64>,
) -> BucketScore {
    let mut score = 50.0;
    if let (Some(h), Some(goal)) = (hours, hours_goal) {
        if goal > 0.0 {
            score = (h / goal * 100.0).round();
        }
    }
    if let Some(deep) = deep_work_pct {
        if deep < 0.3 {
            score = (score - 15.0).max(30.0);
        }
    }
    grade_from_score(Some(score.clamp(0.0, 100.0)))
}

/// The four graded domain buckets for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketScores {
    pub sleep: BucketScore,
    pub load: BucketScore,
    pub activity: BucketScore,
    pub work: BucketScore,
}

impl BucketScores {
    /// Equal-weight total; an unscored bucket contributes the 50 midpoint.
    pub fn total(&self) -> f64 {
        let scores = [
            self.sleep.score.unwrap_or(50.0),
            self.load.score.unwrap_or(50.0),
            self.activity.score.unwrap_or(50.0),
            self.work.score.unwrap_or(50.0),
        ];
        (scores.iter().sum::<f64>() / 4.0).round()
    }
}

/// Score all four buckets from the week's raw inputs.
#[allow(clippy::too_many_arguments)]
pub fn score_buckets(
    weekly: &crate::models::WeeklyMetrics,
    goals: &crate::models::Goals,
    sd_minutes: Option<f64>,
    rhr_delta: Option<f64>,
    acwr_ratio: Option<f64>,
    load_pct_vs_trend: Option<f64>,
    floor_days: u32,
) -> BucketScores {
    BucketScores {
        sleep: score_sleep_bucket(
            weekly.sleep_minutes,
            goals.sleep_minutes,
            sd_minutes,
            rhr_delta,
        ),
        load: score_load_bucket(acwr_ratio, load_pct_vs_trend),
        activity: score_activity_bucket(
            weekly.steps,
            goals.steps,
            floor_days,
            goals.steps_floor_days,
        ),
        work: score_work_bucket(
            weekly.work_hours,
            goals.weekly_work_hours,
            weekly.deep_work_pct,
        ),
    }
}

/// Confidence badge from missing-day tallies. No gaps and no degraded
/// estimates means no badge at all.
pub fn confidence_from_missing(missing: &MissingCounts, degraded: bool) -> Option<ConfidenceBadge> {
    let total = missing.total();
    if !degraded && total == 0 {
        return None;
    }
    let effective = if degraded { total.max(1) } else { total };
    let (label, class_name) = if effective <= 2 {
        ("Confidence: Medium", "status-warning")
    } else {
        ("Confidence: Low", "status-danger")
    };
    Some(ConfidenceBadge {
        label: label.to_string(),
        class_name: class_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_ladder() {
        assert_eq!(grade_from_score(Some(97.0)).grade, "A+");
        assert_eq!(grade_from_score(Some(90.0)).grade, "A");
        assert_eq!(grade_from_score(Some(84.0)).grade, "B+");
        assert_eq!(grade_from_score(Some(72.0)).grade, "B-");
        assert_eq!(grade_from_score(Some(50.0)).grade, "D");
        assert_eq!(grade_from_score(Some(30.0)).grade, "F");
        assert_eq!(grade_from_score(None).grade, "—");
    }

    #[test]
    fn test_grade_bands_monotonic() {
        let mut last = 0u8;
        for score in 0..=100 {
            let band = band_of_score(Some(f64::from(score)));
            let rank = match band {
                ScoreBand::Danger => 0,
                ScoreBand::Warning => 1,
                ScoreBand::Success => 2,
                ScoreBand::Neutral => unreachable!("finite score cannot be neutral"),
            };
            assert!(rank >= last, "band regressed at score {score}");
            last = rank;
        }
    }

    #[test]
    fn test_grading_is_idempotent() {
        let first = grade_from_score(Some(82.0));
        let second = grade_from_score(first.score);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_score_is_neutral() {
        let graded = grade_from_score(None);
        assert_eq!(graded.band, ScoreBand::Neutral);
        assert_eq!(graded.band_class, "status-neutral");
        assert_eq!(graded.score_text, "");
    }

    #[test]
    fn test_sleep_bucket_penalties_floor() {
        let clean = score_sleep_bucket(Some(444.0), Some(444.0), Some(20.0), Some(1.0));
        assert_eq!(clean.score, Some(100.0));

        let chaotic = score_sleep_bucket(Some(444.0), Some(444.0), Some(75.0), Some(1.0));
        assert_eq!(chaotic.score, Some(90.0));

        let strained = score_sleep_bucket(Some(310.0), Some(444.0), Some(75.0), Some(6.0));
        // 70 - 10 - 15, both penalties above their floors.
        assert_eq!(strained.score, Some(45.0));

        let no_goal = score_sleep_bucket(Some(444.0), None, None, None);
        assert_eq!(no_goal.score, Some(50.0));
    }

    #[test]
    fn test_load_bucket_bands() {
        assert_eq!(score_load_bucket(Some(1.0), None).score, Some(80.0));
        assert_eq!(score_load_bucket(Some(1.2), None).score, Some(70.0));
        assert_eq!(score_load_bucket(Some(1.4), None).score, Some(55.0));
        assert_eq!(score_load_bucket(Some(0.5), None).score, Some(65.0));
        // Above the gating threshold the score decays with the ratio.
        assert_eq!(score_load_bucket(Some(1.6), None).score, Some(70.0));
        assert_eq!(score_load_bucket(Some(2.5), None).score, Some(30.0));
        assert_eq!(score_load_bucket(None, None).score, Some(50.0));
    }

    #[test]
    fn test_load_bucket_trend_swing_penalty() {
        assert_eq!(score_load_bucket(Some(1.0), Some(25.0)).score, Some(70.0));
        assert_eq!(score_load_bucket(Some(1.0), Some(-25.0)).score, Some(70.0));
        assert_eq!(score_load_bucket(Some(1.0), Some(10.0)).score, Some(80.0));
    }

    #[test]
    fn test_activity_bucket_floor_compliance() {
        let good = score_activity_bucket(Some(70_000.0), Some(70_000.0), 5, 5);
        assert_eq!(good.score, Some(100.0));

        let partial = score_activity_bucket(Some(70_000.0), Some(70_000.0), 3, 5);
        assert_eq!(partial.score, Some(90.0));

        let poor = score_activity_bucket(Some(70_000.0), Some(70_000.0), 1, 5);
        assert_eq!(poor.score, Some(80.0));
    }

    #[test]
    fn test_work_bucket_deep_focus_penalty() {
        let focused = score_work_bucket(Some(45.0), Some(45.0), Some(0.5));
        assert_eq!(focused.score, Some(100.0));

        let shallow = score_work_bucket(Some(45.0), Some(45.0), Some(0.2));
        assert_eq!(shallow.score, Some(85.0));

        let untracked = score_work_bucket(Some(45.0), Some(45.0), None);
        assert_eq!(untracked.score, Some(100.0));
    }

    #[test]
    fn test_bucket_total_defaults_midpoint() {
        let buckets = BucketScores {
            sleep: grade_from_score(Some(80.0)),
            load: grade_from_score(Some(70.0)),
            activity: grade_from_score(None),
            work: grade_from_score(Some(60.0)),
        };
        assert_eq!(buckets.total(), 65.0);
    }

    #[test]
    fn test_confidence_badge_ladder() {
        let none = MissingCounts::default();
        assert!(confidence_from_missing(&none, false).is_none());

        let degraded = confidence_from_missing(&none, true).unwrap();
        assert_eq!(degraded.label, "Confidence: Medium");

        let few = MissingCounts {
            activity: 1,
            sleep: 1,
            rhr: 0,
        };
        assert_eq!(
            confidence_from_missing(&few, false).unwrap().label,
            "Confidence: Medium"
        );

        let many = MissingCounts {
            activity: 2,
            sleep: 2,
            rhr: 1,
        };
        let badge = confidence_from_missing(&many, false).unwrap();
        assert_eq!(badge.label, "Confidence: Low");
        assert_eq!(badge.class_name, "status-danger");
    }
}
