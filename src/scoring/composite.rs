// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Recency-weighted composite readiness/output gauges.
//!
//! Blends up to four complete rollup weeks into two gauges, takes the
//! raw point delta between the two newest weeks as the trend, and maps
//! the readiness-output balance onto a PUSH/HOLD/RECOVER plan. Weeks
//! with any data gap are excluded from the blend, and a missing week's
//! recency weight is dropped rather than redistributed.

use chrono::NaiveDate;

use crate::constants::{composite, sleep};
use crate::formatters::append_trend_cue;
use crate::models::{
    CompositeAxis, CompositePlan, CompositeSeries, CompositeSummary, Goals, PlanCode,
    WeeklyMetrics, WeeklyRollupEntry,
};
use crate::scoring::normalizer::{pct_of_goal, point_delta, recency_blend, weighted_average};

/// Everything the composite blend needs from the current run.
#[derive(Debug, Clone)]
pub struct CompositeInputs<'a> {
    /// Persisted rollup history, any order
    pub rollups: &'a [WeeklyRollupEntry],
    /// Saturday start of the week being reported
    pub current_week_start: NaiveDate,
    /// Current-week observations, used to synthesize a rollup entry
    /// when the ledger has none for this week yet
    pub weekly: &'a WeeklyMetrics,
    /// Timing-midpoint standard deviation for the current week
    pub sleep_sd_minutes: Option<f64>,
    /// Current-week workload ratio, the fallback when an entry has none
    pub acwr_value: Option<f64>,
    /// Pre-computed readiness for the current week, if any
    pub readiness_pct: Option<f64>,
    /// Pre-computed output for the current week, if any
    pub output_pct: Option<f64>,
    pub goals: &'a Goals,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Resting-HR drift against the goal baseline, as a percent.
fn map_rhr_delta_to_pct(rhr_avg: Option<f64>, baseline: Option<f64>) -> Option<f64> {
    let rhr = finite(rhr_avg)?;
    let base = finite(baseline)?;
    if base == 0.0 {
        return None;
    }
    Some(((rhr - base) / base) * 100.0)
}

/// Timing variability as a percent of the 30-minute target.
fn map_sd_to_pct(sd_minutes: Option<f64>) -> Option<f64> {
    finite(sd_minutes).map(|sd| (sd / sleep::SD_TARGET_MINUTES) * 100.0)
}

/// Workload ratio mapped onto a coarse percent ladder.
fn map_acwr_to_pct(acwr: Option<f64>) -> Option<f64> {
    let a = finite(acwr)?;
    Some(if a >= 1.5 {
        150.0
    } else if a >= 1.2 {
        120.0
    } else if a >= 1.0 {
        100.0
    } else if a >= 0.8 {
        80.0
    } else {
        50.0
    })
}

/// Build the current week's candidate entry from live observations.
///
/// The candidate never carries a gap count, so it is excluded from the
/// complete-weeks blend until a real rollup confirms it.
fn current_week_candidate(inputs: &CompositeInputs<'_>) -> WeeklyRollupEntry {
    WeeklyRollupEntry {
        week_start: inputs.current_week_start,
        week_end: None,
        sleep_min_avg: inputs.weekly.sleep_minutes,
        sleep_sd_min: inputs.sleep_sd_minutes,
        rhr_avg: inputs.weekly.resting_heart_rate,
        steps_day_avg: inputs.weekly.steps,
        gym_load_sum: inputs.weekly.training_load_kg,
        work_hours_sum: inputs.weekly.work_hours,
        prs_sum: inputs.weekly.prs,
        acwr: inputs.acwr_value,
        readiness_pct: inputs.readiness_pct,
        output_pct: inputs.output_pct,
        data_gaps: None,
        sleep_days_present: None,
        activity_days_present: None,
    }
}

/// Merge the live candidate into the history: fill only the fields the
/// persisted entry is missing, or append when the week is absent.
fn ensure_current_entry(entries: &mut Vec<WeeklyRollupEntry>, inputs: &CompositeInputs<'_>) {
    let candidate = current_week_candidate(inputs);
    if !candidate.has_data() {
        return;
    }
    match entries
        .iter_mut()
        .find(|e| e.week_start == candidate.week_start)
    {
        Some(existing) => {
            existing.sleep_min_avg = existing.sleep_min_avg.or(candidate.sleep_min_avg);
            existing.sleep_sd_min = existing.sleep_sd_min.or(candidate.sleep_sd_min);
            existing.rhr_avg = existing.rhr_avg.or(candidate.rhr_avg);
            existing.steps_day_avg = existing.steps_day_avg.or(candidate.steps_day_avg);
            existing.gym_load_sum = existing.gym_load_sum.or(candidate.gym_load_sum);
            existing.work_hours_sum = existing.work_hours_sum.or(candidate.work_hours_sum);
            existing.prs_sum = existing.prs_sum.or(candidate.prs_sum);
            existing.acwr = existing.acwr.or(candidate.acwr);
            existing.readiness_pct = existing.readiness_pct.or(candidate.readiness_pct);
            existing.output_pct = existing.output_pct.or(candidate.output_pct);
        }
        None => entries.push(candidate),
    }
}

/// A persisted readiness wins; otherwise synthesize from the entry's
/// recovery signals, re-weighting across whichever are present.
fn per_week_readiness(entry: &WeeklyRollupEntry, inputs: &CompositeInputs<'_>) -> Option<f64> {
    if let Some(r) = finite(entry.readiness_pct) {
        return Some(r);
    }
    let sleep_pct = pct_of_goal(entry.sleep_min_avg, inputs.goals.sleep_minutes);
    let rhr_score = map_rhr_delta_to_pct(entry.rhr_avg, inputs.goals.resting_heart_rate);
    let sd_score = map_sd_to_pct(entry.sleep_sd_min);
    let acwr_score = map_acwr_to_pct(entry.acwr.or(inputs.acwr_value));
    let w = composite::READINESS_WEIGHTS;
    weighted_average(&[
        (w[0], sleep_pct),
        (w[1], rhr_score),
        (w[2], sd_score),
        (w[3], acwr_score),
    ])
}

/// A persisted output wins; otherwise synthesize from goal fulfilment.
fn per_week_output(entry: &WeeklyRollupEntry, inputs: &CompositeInputs<'_>) -> Option<f64> {
    if let Some(o) = finite(entry.output_pct) {
        return Some(o);
    }
    let gym_pct = pct_of_goal(entry.gym_load_sum, inputs.goals.weekly_training_load);
    let steps_pct = pct_of_goal(entry.steps_day_avg, inputs.goals.steps);
    let work_pct = pct_of_goal(entry.work_hours_sum, inputs.goals.weekly_work_hours);
    let w = composite::OUTPUT_WEIGHTS;
    weighted_average(&[(w[0], gym_pct), (w[1], steps_pct), (w[2], work_pct)])
}

fn readiness_subtitle(pct: Option<f64>, trend: Option<i32>) -> String {
    let base = match pct {
        None => "Readiness data missing — log recovery inputs.",
        Some(p) if p >= 85.0 => "Capacity high — ready to build.",
        Some(p) if p >= 70.0 => "Moderate capacity — maintain rhythm.",
        Some(_) => "Recovery limited — protect sleep.",
    };
    append_trend_cue(base, trend.map(f64::from))
}

fn output_subtitle(pct: Option<f64>, trend: Option<i32>) -> String {
    let base = match pct {
        None => "Output data missing — keep execution logs.",
        Some(p) if p >= 90.0 => "Strong execution.",
        Some(p) if p >= 75.0 => "Below optimal stimulus.",
        Some(_) => "Under-stimulus — raise base.",
    };
    append_trend_cue(base, trend.map(f64::from))
}

fn plan_narrative(readiness: Option<f64>, output: Option<f64>) -> String {
    if readiness.is_none() || output.is_none() {
        return "Maintain current workload and protect bedtime/wake windows.".to_string();
    }
    "Metrics balanced—maintain current rhythm.".to_string()
}

/// The summary rendered when no complete week exists to blend.
fn empty_summary() -> CompositeSummary {
    CompositeSummary {
        readiness: CompositeAxis {
            pct: None,
            trend: None,
            subtitle: "Readiness data missing — log recovery inputs.".to_string(),
        },
        output: CompositeAxis {
            pct: None,
            trend: None,
            subtitle: "Output data missing — keep execution logs.".to_string(),
        },
        plan: CompositePlan {
            code: PlanCode::Hold,
            balance: None,
            narrative: "Data limited this week — log core metrics daily.".to_string(),
        },
        series: CompositeSeries::default(),
        latest: None,
    }
}

/// Blend rollup history plus the live week into the composite summary.
pub fn build_composite_summary(inputs: &CompositeInputs<'_>) -> CompositeSummary {
    let mut entries: Vec<WeeklyRollupEntry> = inputs.rollups.to_vec();
    entries.sort_by_key(|e| e.week_start);
    ensure_current_entry(&mut entries, inputs);

    let recent: Vec<&WeeklyRollupEntry> = entries
        .iter()
        .filter(|e| e.is_complete())
        .rev()
        .take(composite::BLEND_WEEKS)
        .collect();

    if recent.is_empty() {
        return empty_summary();
    }

    let readiness_per_week: Vec<Option<f64>> = recent
        .iter()
        .map(|e| per_week_readiness(e, inputs))
        .collect();
    let output_per_week: Vec<Option<f64>> =
        recent.iter().map(|e| per_week_output(e, inputs)).collect();

    let readiness_pct = recency_blend(&readiness_per_week, &composite::READINESS_RECENCY)
        .map(|v| v.clamp(0.0, 100.0));
    let output_pct =
        recency_blend(&output_per_week, &composite::OUTPUT_RECENCY).map(|v| v.clamp(0.0, 100.0));

    let readiness_trend = if readiness_per_week.len() > 1 {
        point_delta(readiness_per_week[0], readiness_per_week[1])
    } else {
        None
    };
    let output_trend = if output_per_week.len() > 1 {
        point_delta(output_per_week[0], output_per_week[1])
    } else {
        None
    };

    let balance = match (readiness_pct, output_pct) {
        (Some(r), Some(o)) => Some(r - o),
        _ => None,
    };
    let code = match balance {
        Some(b) if b >= composite::PLAN_BALANCE_THRESHOLD => PlanCode::Push,
        Some(b) if b <= -composite::PLAN_BALANCE_THRESHOLD => PlanCode::Recover,
        _ => PlanCode::Hold,
    };

    CompositeSummary {
        readiness: CompositeAxis {
            pct: readiness_pct,
            trend: readiness_trend,
            subtitle: readiness_subtitle(readiness_pct, readiness_trend),
        },
        output: CompositeAxis {
            pct: output_pct,
            trend: output_trend,
            subtitle: output_subtitle(output_pct, output_trend),
        },
        plan: CompositePlan {
            code,
            balance,
            narrative: plan_narrative(readiness_pct, output_pct),
        },
        series: CompositeSeries {
            readiness: readiness_per_week,
            output: output_per_week,
        },
        latest: recent.first().map(|e| (*e).clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn entry(d: u32, readiness: Option<f64>, output: Option<f64>) -> WeeklyRollupEntry {
        WeeklyRollupEntry {
            week_start: date(d),
            week_end: None,
            sleep_min_avg: None,
            sleep_sd_min: None,
            rhr_avg: None,
            steps_day_avg: None,
            gym_load_sum: None,
            work_hours_sum: None,
            prs_sum: None,
            acwr: None,
            readiness_pct: readiness,
            output_pct: output,
            data_gaps: Some(0),
            sleep_days_present: None,
            activity_days_present: None,
        }
    }

    fn inputs<'a>(
        rollups: &'a [WeeklyRollupEntry],
        weekly: &'a WeeklyMetrics,
        goals: &'a Goals,
    ) -> CompositeInputs<'a> {
        CompositeInputs {
            rollups,
            current_week_start: date(28),
            weekly,
            sleep_sd_minutes: None,
            acwr_value: None,
            readiness_pct: None,
            output_pct: None,
            goals,
        }
    }

    #[test]
    fn test_empty_history_yields_default_summary() {
        let weekly = WeeklyMetrics::default();
        let goals = Goals::default();
        let summary = build_composite_summary(&inputs(&[], &weekly, &goals));
        assert_eq!(summary.readiness.pct, None);
        assert_eq!(summary.readiness.trend, None);
        assert_eq!(
            summary.readiness.subtitle,
            "Readiness data missing — log recovery inputs."
        );
        assert_eq!(
            summary.output.subtitle,
            "Output data missing — keep execution logs."
        );
        assert_eq!(summary.plan.code, PlanCode::Hold);
        assert_eq!(summary.plan.balance, None);
        assert_eq!(
            summary.plan.narrative,
            "Data limited this week — log core metrics daily."
        );
        assert!(summary.series.readiness.is_empty());
        assert_eq!(summary.latest, None);
    }

    #[test]
    fn test_four_complete_weeks_blend() {
        let rollups = vec![
            entry(7, Some(50.0), Some(50.0)),
            entry(14, Some(60.0), Some(60.0)),
            entry(21, Some(70.0), Some(70.0)),
            entry(28, Some(80.0), Some(80.0)),
        ];
        let weekly = WeeklyMetrics::default();
        let goals = Goals::default();
        let summary = build_composite_summary(&inputs(&rollups, &weekly, &goals));
        // 80*0.4 + 70*0.3 + 60*0.2 + 50*0.1
        assert_eq!(summary.readiness.pct, Some(70.0));
        // 80*0.5 + 70*0.25 + 60*0.15 + 50*0.10
        assert_eq!(summary.output.pct, Some(71.5));
        assert_eq!(summary.readiness.trend, Some(10));
        assert_eq!(summary.output.trend, Some(10));
        assert_eq!(summary.plan.balance, Some(-1.5));
        assert_eq!(summary.plan.code, PlanCode::Hold);
        assert_eq!(
            summary.plan.narrative,
            "Metrics balanced—maintain current rhythm."
        );
        assert_eq!(
            summary.readiness.subtitle,
            "Moderate capacity — maintain rhythm. (improving)"
        );
        assert_eq!(
            summary.output.subtitle,
            "Under-stimulus — raise base. (improving)"
        );
        assert_eq!(summary.latest.as_ref().map(|e| e.week_start), Some(date(28)));
        assert_eq!(
            summary.series.readiness,
            vec![Some(80.0), Some(70.0), Some(60.0), Some(50.0)]
        );
    }

    #[test]
    fn test_single_week_blend_is_not_renormalized() {
        let rollups = vec![entry(21, Some(80.0), Some(80.0))];
        let weekly = WeeklyMetrics::default();
        let goals = Goals::default();
        let summary = build_composite_summary(&inputs(&rollups, &weekly, &goals));
        // A lone week keeps only its own recency weight.
        assert_eq!(summary.readiness.pct, Some(32.0));
        assert_eq!(summary.output.pct, Some(40.0));
        assert_eq!(summary.readiness.trend, None);
        assert_eq!(
            summary.readiness.subtitle,
            "Recovery limited — protect sleep."
        );
    }

    #[test]
    fn test_blend_window_caps_at_four_weeks() {
        let rollups: Vec<WeeklyRollupEntry> = (0..6)
            .map(|k| entry(3 + 5 * k, Some(90.0 - f64::from(k) * 5.0), Some(70.0)))
            .collect();
        let weekly = WeeklyMetrics::default();
        let goals = Goals::default();
        let summary = build_composite_summary(&inputs(&rollups, &weekly, &goals));
        assert_eq!(summary.series.readiness.len(), 4);
        // Newest four only: 65, 70, 75, 80.
        assert_eq!(
            summary.series.readiness,
            vec![Some(65.0), Some(70.0), Some(75.0), Some(80.0)]
        );
        assert_eq!(summary.latest.as_ref().map(|e| e.week_start), Some(date(28)));
    }

    #[test]
    fn test_incomplete_weeks_are_excluded() {
        let mut gappy = entry(14, Some(95.0), Some(95.0));
        gappy.data_gaps = Some(2);
        let rollups = vec![gappy, entry(21, Some(80.0), Some(80.0))];
        let weekly = WeeklyMetrics::default();
        let goals = Goals::default();
        let summary = build_composite_summary(&inputs(&rollups, &weekly, &goals));
        assert_eq!(summary.series.readiness, vec![Some(80.0)]);
        assert_eq!(summary.latest.as_ref().map(|e| e.week_start), Some(date(21)));
    }

    #[test]
    fn test_live_candidate_is_appended_but_never_complete() {
        let weekly = WeeklyMetrics {
            steps: Some(9_500.0),
            sleep_minutes: Some(430.0),
            ..WeeklyMetrics::default()
        };
        let goals = Goals::default();
        let summary = build_composite_summary(&inputs(&[], &weekly, &goals));
        // Live data alone has no confirmed gap count, so nothing blends.
        assert_eq!(summary.readiness.pct, None);
        assert_eq!(summary.latest, None);
    }

    #[test]
    fn test_live_candidate_fills_missing_fields_of_current_week() {
        let mut existing = entry(28, None, Some(75.0));
        existing.data_gaps = Some(0);
        let rollups = vec![existing];
        let weekly = WeeklyMetrics {
            sleep_minutes: Some(420.0),
            ..WeeklyMetrics::default()
        };
        let goals = Goals {
            sleep_minutes: Some(450.0),
            ..Goals::default()
        };
        let mut input = inputs(&rollups, &weekly, &goals);
        input.sleep_sd_minutes = Some(30.0);
        input.acwr_value = Some(1.0);
        let summary = build_composite_summary(&input);

        let latest = summary.latest.expect("merged entry survives");
        assert_eq!(latest.sleep_min_avg, Some(420.0));
        assert_eq!(latest.sleep_sd_min, Some(30.0));
        assert_eq!(latest.acwr, Some(1.0));
        // Persisted output wins over synthesis.
        assert_eq!(summary.series.output, vec![Some(75.0)]);
        // Readiness synthesized: sleep 93, sd 100, acwr 100 over 0.7 weight.
        let readiness = summary.series.readiness[0].unwrap();
        assert!((readiness - (0.4 * 93.0 + 0.2 * 100.0 + 0.1 * 100.0) / 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_plan_flips_on_balance_threshold() {
        let weekly = WeeklyMetrics::default();
        let goals = Goals::default();

        let push = vec![entry(21, Some(100.0), Some(10.0))];
        let summary = build_composite_summary(&inputs(&push, &weekly, &goals));
        // 40 readiness vs 5 output.
        assert_eq!(summary.plan.code, PlanCode::Push);
        assert_eq!(
            summary.plan.narrative,
            "Metrics balanced—maintain current rhythm."
        );

        let recover = vec![entry(21, Some(10.0), Some(100.0))];
        let summary = build_composite_summary(&inputs(&recover, &weekly, &goals));
        // 4 readiness vs 50 output.
        assert_eq!(summary.plan.code, PlanCode::Recover);
    }

    #[test]
    fn test_acwr_ladder_and_rhr_drift_mapping() {
        assert_eq!(map_acwr_to_pct(Some(1.6)), Some(150.0));
        assert_eq!(map_acwr_to_pct(Some(1.2)), Some(120.0));
        assert_eq!(map_acwr_to_pct(Some(1.0)), Some(100.0));
        assert_eq!(map_acwr_to_pct(Some(0.85)), Some(80.0));
        assert_eq!(map_acwr_to_pct(Some(0.5)), Some(50.0));
        assert_eq!(map_acwr_to_pct(None), None);

        assert_eq!(map_rhr_delta_to_pct(Some(55.0), Some(50.0)), Some(10.0));
        assert_eq!(map_rhr_delta_to_pct(Some(55.0), Some(0.0)), None);
        assert_eq!(map_sd_to_pct(Some(45.0)), Some(150.0));
    }
}
