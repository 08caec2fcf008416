// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Delta-first derived stats.
//!
//! Everything here is computed once per run and pre-formatted for
//! display: goal deltas, trend percentages, fulfilment bands and the
//! estimator outputs, all null-safe. Renderers and the narrative layer
//! consume these strings verbatim.

use crate::formatters::{fmt_h_min, fmt_int, fmt_pct};
use crate::models::{
    AcwrInfo, FulfilmentBand, Goals, MissingCounts, SleepConsistency, TrendMetrics, WeeklyMetrics,
};
use crate::scoring::normalizer::{band_for_fulfilment, clamp_fulfilment, stdev};

/// Goal-fulfilment percentages per domain, clamped to [0,130].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fulfilment {
    pub work_pct: Option<f64>,
    pub strength_pct: Option<f64>,
    /// True when the strength goal fell back to the 4-week trend
    pub strength_proxy_goal: bool,
    pub fitness_pct: Option<f64>,
    pub sleep_pct: Option<f64>,
    /// Inverted: goal over actual, so lower resting HR reads above 100
    pub rhr_pct: Option<f64>,
}

/// Deviation bands for each fulfilment percentage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FulfilmentBands {
    pub work: FulfilmentBand,
    pub strength: FulfilmentBand,
    pub fitness: FulfilmentBand,
    pub sleep: FulfilmentBand,
    pub readiness: FulfilmentBand,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkStats {
    pub delta_goal_str: String,
    pub pct_trend_str: String,
    pub trend_goal_str: String,
    /// Percent change vs the 4-week trend, zero when trend is missing
    pub pct_vs_trend: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStats {
    pub delta_goal_str: String,
    pub pct_trend_str: String,
    pub trend_goal_str: String,
    pub pct_vs_trend: f64,
    pub acwr: AcwrInfo,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepsStats {
    pub delta_goal_str: String,
    pub pct_trend_str: String,
    pub trend_goal_str: String,
    /// Days this week at or above the step floor
    pub days_at_floor: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepStats {
    pub delta_goal_str: String,
    pub pct_trend_str: String,
    pub trend_goal_str: String,
    /// Nightly-duration spread, e.g. "0h 38m stdev (range 6h 10m–8h 2m)"
    pub variability: String,
    pub consistency: SleepConsistency,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RhrStats {
    pub delta_trend_str: String,
    /// Raw bpm delta vs the 4-week trend, zero-filled when data is thin
    pub delta_vs_trend: f64,
}

/// All derived stats for one report run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedStats {
    pub fulfilment: Fulfilment,
    pub bands: FulfilmentBands,
    pub work: WorkStats,
    pub load: LoadStats,
    pub steps: StepsStats,
    pub sleep: SleepStats,
    pub rhr: RhrStats,
    pub missing: MissingCounts,
}

fn signed_h_min(delta_minutes: f64) -> String {
    if delta_minutes >= 0.0 {
        format!("+{}", fmt_h_min(delta_minutes))
    } else {
        format!("-{}", fmt_h_min(-delta_minutes))
    }
}

fn signed_int(delta: f64, unit: &str) -> String {
    let sign = if delta >= 0.0 { "+" } else { "" };
    format!("{sign}{}{unit}", fmt_int(Some(delta)))
}

fn goal_or_none(goal: Option<f64>) -> Option<f64> {
    goal.filter(|g| g.is_finite() && *g != 0.0)
}

/// Compute all derived stats from the week, its trailing baseline and
/// the estimator outputs.
#[allow(clippy::too_many_arguments)]
pub fn compute_derived_stats(
    weekly: &WeeklyMetrics,
    trend: &TrendMetrics,
    goals: &Goals,
    sleep_consistency: SleepConsistency,
    acwr: AcwrInfo,
    sleep_series: &[f64],
    days_at_floor: u32,
    missing: MissingCounts,
) -> DerivedStats {
    // Work, all in minutes so sub-hour deltas survive rounding.
    let work_goal_min = goal_or_none(goals.weekly_work_hours).map(|g| g * 60.0);
    let work_wk_min = weekly.work_hours.unwrap_or(0.0) * 60.0;
    let work_trend_min = trend.work_hours.unwrap_or(0.0) * 60.0;
    let work_delta_goal_min = work_goal_min.map(|g| work_wk_min - g).unwrap_or(0.0);
    let work_pct_vs_trend = if work_trend_min != 0.0 {
        (work_wk_min - work_trend_min) / work_trend_min * 100.0
    } else {
        0.0
    };
    let work_trend_goal_min = work_goal_min.map(|g| work_trend_min - g);

    // Load
    let load_goal = goal_or_none(goals.weekly_training_load);
    let load_wk = weekly.training_load_kg.unwrap_or(0.0);
    let load_trend = trend.training_load_kg.filter(|v| *v != 0.0);
    let load_delta_goal_kg = load_goal.map(|g| load_wk - g).unwrap_or(0.0);
    let load_pct_vs_trend = match load_trend {
        Some(t) => (load_wk - t) / t.max(1.0) * 100.0,
        None => 0.0,
    };
    let load_trend_goal_kg = load_goal.map(|g| trend.training_load_kg.unwrap_or(0.0) - g);

    // Steps
    let steps_goal = goal_or_none(goals.steps);
    let steps_wk = weekly.steps.unwrap_or(0.0);
    let steps_delta_goal = steps_goal.map(|g| steps_wk - g).unwrap_or(0.0);
    let steps_pct_vs_trend = match trend.steps.filter(|v| *v != 0.0) {
        Some(t) => (steps_wk - t) / t * 100.0,
        None => 0.0,
    };
    let steps_trend_goal = steps_goal.map(|g| trend.steps.unwrap_or(0.0) - g);

    // Sleep duration
    let sleep_goal = goal_or_none(goals.sleep_minutes);
    let sleep_wk = weekly.sleep_minutes.unwrap_or(0.0);
    let sleep_delta_goal_min = sleep_goal.map(|g| sleep_wk - g).unwrap_or(0.0);
    let sleep_pct_vs_trend = match trend.sleep_minutes.filter(|v| *v != 0.0) {
        Some(t) => (sleep_wk - t) / t * 100.0,
        None => 0.0,
    };
    let sleep_trend_goal_min = sleep_goal.map(|g| trend.sleep_minutes.unwrap_or(0.0) - g);

    let sleep_sd = if sleep_series.len() >= 2 {
        stdev(sleep_series)
    } else {
        0.0
    };
    let (series_min, series_max) = sleep_series.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), v| (lo.min(*v), hi.max(*v)),
    );
    let (series_min, series_max) = if sleep_series.is_empty() {
        (0.0, 0.0)
    } else {
        (series_min, series_max)
    };
    let variability = format!(
        "{} stdev (range {}–{})",
        fmt_h_min(sleep_sd),
        fmt_h_min(series_min),
        fmt_h_min(series_max)
    );

    // RHR, lower is better; a missing trend pins the delta at zero.
    let rhr_wk = weekly.resting_heart_rate.unwrap_or(0.0);
    let rhr_baseline = trend
        .resting_heart_rate
        .or(weekly.resting_heart_rate)
        .unwrap_or(0.0);
    let rhr_delta_vs_trend = rhr_wk - rhr_baseline;

    // Fulfilment vs goals
    let fulfilment = {
        let work_pct = work_goal_min.map(|_| {
            let goal_hours = goals.weekly_work_hours.unwrap_or(0.0);
            weekly.work_hours.unwrap_or(0.0) / goal_hours.max(1.0) * 100.0
        });

        let mut strength_goal = goals.weekly_training_load.unwrap_or(0.0);
        let mut strength_proxy_goal = false;
        if strength_goal == 0.0 {
            if let Some(t) = trend.training_load_kg.filter(|v| *v != 0.0) {
                strength_goal = t;
                strength_proxy_goal = true;
            }
        }
        let strength_pct = (strength_goal != 0.0)
            .then(|| weekly.training_load_kg.unwrap_or(0.0) / strength_goal.max(1.0) * 100.0);

        let fitness_pct =
            steps_goal.map(|g| weekly.steps.unwrap_or(0.0) / g.max(1.0) * 100.0);
        let sleep_pct =
            sleep_goal.map(|g| weekly.sleep_minutes.unwrap_or(0.0) / g.max(1.0) * 100.0);
        let rhr_pct = match (goal_or_none(goals.resting_heart_rate), weekly.resting_heart_rate) {
            (Some(goal), Some(actual)) if actual != 0.0 => {
                Some(goal / actual.max(1.0) * 100.0)
            }
            _ => None,
        };

        Fulfilment {
            work_pct: clamp_fulfilment(work_pct),
            strength_pct: clamp_fulfilment(strength_pct),
            strength_proxy_goal,
            fitness_pct: clamp_fulfilment(fitness_pct),
            sleep_pct: clamp_fulfilment(sleep_pct),
            rhr_pct: clamp_fulfilment(rhr_pct),
        }
    };

    let bands = FulfilmentBands {
        work: band_for_fulfilment(fulfilment.work_pct, 5.0, 10.0),
        strength: band_for_fulfilment(fulfilment.strength_pct, 5.0, 10.0),
        fitness: band_for_fulfilment(fulfilment.fitness_pct, 5.0, 10.0),
        sleep: band_for_fulfilment(fulfilment.sleep_pct, 5.0, 12.0),
        readiness: band_for_fulfilment(fulfilment.rhr_pct, 3.0, 6.0),
    };

    DerivedStats {
        fulfilment,
        bands,
        work: WorkStats {
            delta_goal_str: match work_goal_min {
                Some(_) => signed_h_min(work_delta_goal_min),
                None => "—".to_string(),
            },
            pct_trend_str: fmt_pct(Some(work_pct_vs_trend)),
            trend_goal_str: match work_trend_goal_min {
                Some(delta) => signed_h_min(delta),
                None => "—".to_string(),
            },
            pct_vs_trend: work_pct_vs_trend,
        },
        load: LoadStats {
            delta_goal_str: match load_goal {
                Some(_) => signed_int(load_delta_goal_kg, "kg"),
                None => "—".to_string(),
            },
            pct_trend_str: fmt_pct(Some(load_pct_vs_trend)),
            trend_goal_str: match load_trend_goal_kg {
                Some(delta) => signed_int(delta, "kg"),
                None => "—".to_string(),
            },
            pct_vs_trend: load_pct_vs_trend,
            acwr,
        },
        steps: StepsStats {
            delta_goal_str: match steps_goal {
                Some(_) => signed_int(steps_delta_goal, ""),
                None => "—".to_string(),
            },
            pct_trend_str: fmt_pct(Some(steps_pct_vs_trend)),
            trend_goal_str: match steps_trend_goal {
                Some(delta) => signed_int(delta, ""),
                None => "—".to_string(),
            },
            days_at_floor,
        },
        sleep: SleepStats {
            delta_goal_str: match sleep_goal {
                Some(_) => signed_h_min(sleep_delta_goal_min),
                None => "—".to_string(),
            },
            pct_trend_str: fmt_pct(Some(sleep_pct_vs_trend)),
            trend_goal_str: match sleep_trend_goal_min {
                Some(delta) => signed_h_min(delta),
                None => "—".to_string(),
            },
            variability,
            consistency: sleep_consistency,
        },
        rhr: RhrStats {
            delta_trend_str: format!(
                "{}{} bpm",
                if rhr_delta_vs_trend >= 0.0 { "+" } else { "" },
                fmt_int(Some(rhr_delta_vs_trend))
            ),
            delta_vs_trend: rhr_delta_vs_trend,
        },
        missing,
    }
}
