// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Capacity classification and the next-week decision rule.
//!
//! The classifier accumulates red/amber counters across six risk
//! checks, with a compound short-circuit when a workload spike lands
//! together with a fatigue signal. Purple is a deliberately favorable
//! spare-capacity state, reachable only when no counter fired.
//!
//! The decision engine runs its own push-eligibility gates, separate
//! from the capacity ladder. The two rule sets are intentionally
//! independent, so a Purple capacity with a Sustain decision is a
//! valid, meaningful output.

use crate::constants::{acwr, load, rhr, sleep, steps, work};
use crate::formatters::{fmt_acwr, fmt_bpm, fmt_h_min};
use crate::models::{
    Capacity, CapacityLabel, Decision, Goals, PlanAction, TrendMetrics, WeeklyMetrics,
};
use crate::scoring::derived::DerivedStats;

/// Shared per-run signals both rule sets read.
struct RiskSignals {
    sleep_deficit_minutes: f64,
    rhr_delta: f64,
    load_ratio: f64,
    work_hours: f64,
    acwr_ratio: Option<f64>,
    acwr_display: Option<f64>,
    sri_score: Option<f64>,
}

fn num(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

impl RiskSignals {
    fn gather(
        weekly: &WeeklyMetrics,
        trend: &TrendMetrics,
        goals: &Goals,
        ds: &DerivedStats,
    ) -> Self {
        let sleep_deficit_minutes =
            (num(goals.sleep_minutes) - num(weekly.sleep_minutes)).max(0.0);
        let rhr_baseline = nonzero(trend.resting_heart_rate)
            .or(nonzero(weekly.resting_heart_rate))
            .unwrap_or(0.0);
        let rhr_delta = num(weekly.resting_heart_rate) - rhr_baseline;
        let load_ratio =
            num(weekly.training_load_kg) / nonzero(trend.training_load_kg).unwrap_or(1.0).max(1.0);
        let acwr_ratio = ds.load.acwr.ratio.filter(|v| v.is_finite());
        Self {
            sleep_deficit_minutes,
            rhr_delta,
            load_ratio,
            work_hours: num(weekly.work_hours),
            acwr_ratio,
            acwr_display: ds.load.acwr.value.or(acwr_ratio),
            sri_score: ds.sleep.consistency.score.filter(|v| v.is_finite()),
        }
    }
}

/// Classify the week's capacity from the red/amber rule ladder.
pub fn classify_capacity(
    weekly: &WeeklyMetrics,
    trend: &TrendMetrics,
    goals: &Goals,
    ds: &DerivedStats,
) -> Capacity {
    let s = RiskSignals::gather(weekly, trend, goals, ds);

    let mut red = 0u32;
    let mut amber = 0u32;
    let mut reasons: Vec<String> = Vec::new();

    if s.sleep_deficit_minutes >= sleep::DEFICIT_RED_MINUTES {
        red += 1;
        reasons.push(format!("Sleep −{}", fmt_h_min(s.sleep_deficit_minutes)));
    } else if s.sleep_deficit_minutes >= sleep::DEFICIT_AMBER_MINUTES {
        amber += 1;
        reasons.push(format!("Sleep −{}", fmt_h_min(s.sleep_deficit_minutes)));
    }

    if s.rhr_delta >= rhr::RED_DELTA_BPM {
        red += 1;
        reasons.push(format!("RHR +{} vs 4-wk", fmt_bpm(Some(s.rhr_delta))));
    } else if s.rhr_delta >= rhr::AMBER_DELTA_BPM {
        amber += 1;
        reasons.push(format!("RHR +{} vs 4-wk", fmt_bpm(Some(s.rhr_delta))));
    }

    if let Some(ratio) = s.acwr_ratio {
        if ratio >= acwr::RED_RATIO {
            red += 1;
            reasons.push(format!("ACWR high ({})", fmt_acwr(s.acwr_display)));
        } else if ratio >= acwr::AMBER_RATIO {
            amber += 1;
            reasons.push(format!("ACWR rising ({})", fmt_acwr(s.acwr_display)));
        }
    }

    if let Some(sri) = s.sri_score {
        if sri < sleep::CONSISTENCY_RED {
            red += 1;
            reasons.push(format!("SRI low ({}/100)", sri.round() as i64));
        } else if sri < sleep::CONSISTENCY_AMBER {
            amber += 1;
            reasons.push(format!("SRI drifting ({}/100)", sri.round() as i64));
        }
    }

    if s.load_ratio >= acwr::HIGH_LOAD_RATIO {
        red += 1;
        reasons.push(format!(
            "Load +{}% vs 4-wk",
            ((s.load_ratio - 1.0) * 100.0).round() as i64
        ));
    } else if s.load_ratio >= load::AMBER_RATIO {
        amber += 1;
        reasons.push(format!(
            "Load +{}%",
            ((s.load_ratio - 1.0) * 100.0).round() as i64
        ));
    }

    if s.work_hours >= work::PLATEAU_HOURS {
        amber += 1;
        reasons.push(format!(
            "Work {}h (near plateau)",
            s.work_hours.round() as i64
        ));
    }

    // A workload spike landing on a fatigue signal outranks the counters.
    let spike = s.acwr_ratio.map(|r| r >= acwr::RED_RATIO).unwrap_or(false);
    let fatigued = s.sri_score.map(|v| v < sleep::CONSISTENCY_RED).unwrap_or(false)
        || s.rhr_delta >= rhr::RED_DELTA_BPM;
    if spike && fatigued {
        let marker = "ACWR spike + fatigue".to_string();
        if !reasons.contains(&marker) {
            reasons.push(marker);
        }
        return Capacity {
            label: CapacityLabel::Red,
            reasons,
        };
    }

    if red >= 2 {
        return Capacity {
            label: CapacityLabel::Red,
            reasons,
        };
    }
    if red == 1 || amber >= 1 {
        return Capacity {
            label: CapacityLabel::Amber,
            reasons,
        };
    }

    let under_work = goals
        .weekly_work_hours
        .filter(|g| g.is_finite() && *g != 0.0)
        .map(|g| s.work_hours <= work::PURPLE_GOAL_RATIO * g)
        .unwrap_or(false)
        && s.work_hours < work::PLATEAU_HOURS;
    let under_load = nonzero(trend.training_load_kg)
        .map(|t| num(weekly.training_load_kg) <= work::PURPLE_GOAL_RATIO * t)
        .unwrap_or(false);
    let low_steps = ds.steps.days_at_floor < steps::PURPLE_MIN_DAYS;
    let could_be_purple =
        (under_work && under_load) || (under_work && low_steps) || (under_load && low_steps);
    let sleep_ok = s.sleep_deficit_minutes < sleep::PURPLE_MAX_DEFICIT_MINUTES
        && s.sri_score.map(|v| v >= sleep::CONSISTENCY_AMBER).unwrap_or(true);
    let acwr_ok = s.acwr_ratio.map(|r| r <= acwr::PURPLE_MAX_RATIO).unwrap_or(true);

    if sleep_ok && acwr_ok && could_be_purple {
        return Capacity {
            label: CapacityLabel::Purple,
            reasons: vec!["Under capacity—low work & training/NEAT".to_string()],
        };
    }
    if could_be_purple && !sleep_ok {
        reasons.push("Sleep rhythm unstable".to_string());
    }
    Capacity {
        label: CapacityLabel::Green,
        reasons,
    }
}

/// Choose next week's plan and the one lever to pull.
pub fn decide_next_action(
    weekly: &WeeklyMetrics,
    trend: &TrendMetrics,
    goals: &Goals,
    ds: &DerivedStats,
    capacity: &Capacity,
) -> Decision {
    let s = RiskSignals::gather(weekly, trend, goals, ds);
    let work_eff = s.work_hours.min(work::EXTREME_HOURS);

    let can_push = work_eff < work::EXTREME_HOURS
        && s.sleep_deficit_minutes < sleep::PUSH_DEFICIT_MAX_MINUTES
        && s.rhr_delta <= rhr::AMBER_DELTA_BPM
        && s.acwr_ratio.map(|r| r <= acwr::AMBER_RATIO).unwrap_or(true)
        && s.sri_score.map(|v| v >= sleep::CONSISTENCY_AMBER).unwrap_or(true);

    if can_push && matches!(capacity.label, CapacityLabel::Green | CapacityLabel::Purple) {
        let lever = if capacity.label == CapacityLabel::Purple {
            "Use slack: add ~10% training load and one quality session"
        } else {
            "Controlled push: +8% load while keeping sleep 7h+"
        };
        return Decision {
            plan: PlanAction::Push,
            lever: lever.to_string(),
        };
    }

    let spike = s.acwr_ratio.map(|r| r >= acwr::RED_RATIO).unwrap_or(false);
    if spike
        && (s.sri_score.map(|v| v < sleep::CONSISTENCY_RED).unwrap_or(false)
            || s.sleep_deficit_minutes >= sleep::DEFICIT_AMBER_MINUTES
            || s.rhr_delta >= rhr::RED_DELTA_BPM)
    {
        return Decision {
            plan: PlanAction::Deload,
            lever: "ACWR spike — trim 20% volume and add 60m sleep".to_string(),
        };
    }

    let redish = u32::from(s.sleep_deficit_minutes >= sleep::PURPLE_MAX_DEFICIT_MINUTES)
        + u32::from(s.rhr_delta >= rhr::RED_DELTA_BPM)
        + u32::from(s.load_ratio >= acwr::HIGH_LOAD_RATIO)
        + u32::from(work_eff >= work::EXTREME_HOURS)
        + u32::from(s.sri_score.map(|v| v < sleep::SEVERE_CONSISTENCY).unwrap_or(false))
        + u32::from(spike);
    if redish >= 2 || capacity.label == CapacityLabel::Red {
        return Decision {
            plan: PlanAction::Deload,
            lever: "Reduce load 15–25%; prioritise sleep consistency and HR recovery".to_string(),
        };
    }

    let acwr_caution = s.acwr_ratio.map(|r| r > acwr::AMBER_RATIO).unwrap_or(false);
    let sri_drifting = s.sri_score.map(|v| v < sleep::CONSISTENCY_AMBER).unwrap_or(false);
    if acwr_caution || sri_drifting || s.sleep_deficit_minutes >= sleep::DEFICIT_AMBER_MINUTES {
        let lever = if s.sleep_deficit_minutes >= sleep::DEFICIT_AMBER_MINUTES {
            "Hold load; add 45–60m nightly sleep before next push".to_string()
        } else if sri_drifting {
            "Stabilise bedtime/wake; keep load flat until SRI ≥70".to_string()
        } else {
            format!(
                "Bank this week; let ACWR fall below {} (currently {})",
                fmt_acwr(Some(acwr::PURPLE_MAX_RATIO)),
                fmt_acwr(s.acwr_display)
            )
        };
        return Decision {
            plan: PlanAction::Sustain,
            lever,
        };
    }

    Decision {
        plan: PlanAction::Sustain,
        lever: "Maintain; keep steps steady".to_string(),
    }
}
