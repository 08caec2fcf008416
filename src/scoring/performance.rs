// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Performance index and quality scores.
//!
//! The index is one square-root-scaled number blending work, strength
//! and fitness execution against goals; work hours are capped before
//! scoring so overtime never inflates it. The quality-score helpers
//! map recovery signals onto 0-100 ladders and feed both the overall
//! score and the gauges persisted with each rollup entry.

use crate::constants::work;
use crate::models::{Goals, TrendMetrics, WeeklyMetrics};
use crate::scoring::normalizer::{score_from_target, sqrt_scale};

/// Sub-scores feeding the index, kept for renderer drill-down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceComponents {
    pub work_score: f64,
    pub strength_score: f64,
    pub fitness_score: f64,
    pub load_goal_score: f64,
    pub load_trend_score: f64,
    pub pr_boost: f64,
    /// Days this week at or above the step floor
    pub days_at_floor: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceIndex {
    /// 0-100 blend: 40% work, 40% strength, 20% fitness
    pub score: f64,
    pub components: PerformanceComponents,
}

fn num(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn goal_denom(goal: Option<f64>) -> f64 {
    num(goal).max(1.0)
}

/// Compute the weekly performance index.
pub fn calculate_performance_index(
    weekly: &WeeklyMetrics,
    trend: &TrendMetrics,
    goals: &Goals,
    days_at_floor: u32,
) -> PerformanceIndex {
    let hours_eff = num(weekly.work_hours).min(work::EXTREME_HOURS);
    let work_score = sqrt_scale(hours_eff / goal_denom(goals.weekly_work_hours));

    let load = num(weekly.training_load_kg);
    let load_goal_score = sqrt_scale(load / goal_denom(goals.weekly_training_load));
    let trend_load = match num(trend.training_load_kg) {
        v if v == 0.0 => 1.0,
        v => v,
    };
    let load_trend_score = sqrt_scale(load / trend_load.max(1.0));
    let pr_boost = (f64::from(weekly.prs.unwrap_or(0)) * 2.0).min(6.0);
    let strength_score = (0.6 * load_goal_score + 0.4 * load_trend_score + pr_boost)
        .round()
        .min(100.0);

    let step_score = sqrt_scale(num(weekly.steps) / goal_denom(goals.steps));
    let floor_bonus = if days_at_floor >= goals.steps_floor_days {
        5.0
    } else {
        0.0
    };
    let fitness_score = (step_score + floor_bonus).min(100.0);

    let score = (0.4 * work_score + 0.4 * strength_score + 0.2 * fitness_score).round();
    PerformanceIndex {
        score,
        components: PerformanceComponents {
            work_score,
            strength_score,
            fitness_score,
            load_goal_score,
            load_trend_score,
            pr_boost,
            days_at_floor,
        },
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Timing-consistency quality from the midpoint standard deviation.
pub fn consistency_score(sd_minutes: Option<f64>) -> Option<f64> {
    let sd = sd_minutes.filter(|v| v.is_finite())?.max(0.0);
    Some(if sd <= 15.0 {
        100.0
    } else if sd <= 30.0 {
        lerp(85.0, 100.0, (30.0 - sd) / 15.0).round()
    } else if sd <= 45.0 {
        lerp(70.0, 85.0, (45.0 - sd) / 15.0).round()
    } else if sd <= 60.0 {
        lerp(50.0, 70.0, (60.0 - sd) / 15.0).round()
    } else {
        30.0
    })
}

/// Recovery quality from the magnitude of resting-HR drift.
pub fn rhr_delta_score(delta_bpm: Option<f64>) -> Option<f64> {
    let d = delta_bpm.filter(|v| v.is_finite())?.abs();
    Some(if d <= 1.0 {
        95.0
    } else if d <= 3.0 {
        85.0
    } else if d <= 5.0 {
        70.0
    } else if d <= 8.0 {
        50.0
    } else {
        30.0
    })
}

/// Workload quality: peaks at 100 around a 1.0 ratio, interpolating
/// through the anchor points, with 60 outside the healthy band.
pub fn acwr_score(acwr: Option<f64>) -> Option<f64> {
    let a = acwr.filter(|v| v.is_finite())?;
    if a <= 0.7 || a >= 1.3 {
        return Some(60.0);
    }
    const POINTS: [(f64, f64); 5] = [
        (0.70, 70.0),
        (0.85, 85.0),
        (1.00, 100.0),
        (1.15, 85.0),
        (1.30, 70.0),
    ];
    for pair in POINTS.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        if a >= x1 && a <= x2 {
            let t = (a - x1) / (x2 - x1);
            return Some(lerp(y1, y2, t).round());
        }
    }
    Some(100.0)
}

/// Headline scores for the report card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallScores {
    /// 40% performance index, 30% recovery, 30% readiness
    pub overall: f64,
    /// The performance index itself
    pub activity: f64,
    /// Sleep duration against goal
    pub recovery: f64,
    /// Resting HR against goal, lower is better
    pub readiness: f64,
}

/// Blend the performance index with recovery and readiness scores.
pub fn compute_overall_scores(
    weekly: &WeeklyMetrics,
    goals: &Goals,
    index: &PerformanceIndex,
) -> OverallScores {
    let recovery = score_from_target(weekly.sleep_minutes, goals.sleep_minutes, false);
    let readiness = score_from_target(
        weekly.resting_heart_rate,
        goals.resting_heart_rate,
        true,
    );
    OverallScores {
        overall: (0.4 * index.score + 0.3 * recovery + 0.3 * readiness).round(),
        activity: index.score,
        recovery,
        readiness,
    }
}
