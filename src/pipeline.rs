// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Report Pipeline
//!
//! The single-pass weekly run: resolve the Saturday-start windows, load
//! goals, source the week's observations (preferring a complete rollup
//! entry over raw day rows), run the estimators and scorers, assemble
//! the narrative with its deterministic fallback, apply the safety
//! gates to the plan, and append the week to the rollup ledger.
//!
//! Only a missing goal configuration aborts the run. Every other
//! failure degrades: the report still renders, carries a confidence
//! badge and lists its degrade reasons.

use std::time::Instant;

use chrono::NaiveDate;
use serde_json::json;
use tracing::warn;

use crate::constants::{composite as composite_consts, rollups};
use crate::errors::ReportError;
use crate::formatters::{fmt_acwr, fmt_duration_minutes, fmt_int, format_list,
    format_percent_headline};
use crate::logging::JobLogger;
use crate::models::{
    ActivityDay, BucketScore, Capacity, ConfidenceBadge, Decision, Goals, MissingCounts,
    PlanAction, PlanCode, ScoreBand, SleepConsistency, SleepDay, SleepSource, TrendMetrics,
    WeeklyMetrics, WeeklyRollupEntry,
};
use crate::narrative::{
    build_fallback_narrative, merge_narrative, validate_narrative, FactBundle, FactFulfilment,
    FactScores, FallbackInputs, Narrative, NarrativeGenerator,
};
use crate::providers::{aggregate_trend, aggregate_week, days_at_floor, missing_counts,
    DataProvider};
use crate::scoring::buckets::confidence_from_missing;
use crate::scoring::normalizer::{pct_of_goal, weighted_average};
use crate::scoring::performance::{acwr_score, consistency_score, rhr_delta_score};
use crate::scoring::sleep::band_from_sd;
use crate::scoring::{
    build_composite_summary, calculate_performance_index, classify_capacity, compute_acwr,
    compute_derived_stats, compute_overall_scores, compute_sleep_consistency, decide_next_action,
    grade_from_score, score_buckets, BucketScores, CompositeInputs, DerivedStats, OverallScores,
    PerformanceIndex,
};
use crate::weeks::WeekWindow;

/// Workload ratio above which the plan is forced to RECOVER.
const GATING_ACWR: f64 = 1.5;

const COERCED_NOTE: &str = "Plan adjusted due to gating metrics.";
const DEFAULT_LEVER: &str = "Maintain; keep steps steady";
const ACWR_GATE_LEVER: &str = "Reduce load 15–25%; prioritise recovery.";
const SLEEP_GATE_LEVER: &str = "Stabilise sleep cadence before increasing load.";

/// The final plan shown on the report, after safety gating.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDisplay {
    pub code: PlanCode,
    pub icon: &'static str,
    /// The one lever to pull, gate-specific when coerced
    pub lever: String,
    /// True when a gate overrode the base plan
    pub coerced: bool,
    /// One-line snapshot of the gating inputs
    pub gating_summary: String,
}

/// Everything one weekly run produced, ready to render or serialize.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub week_label: String,
    pub iso_label: String,
    pub window: WeekWindow,
    pub weekly: WeeklyMetrics,
    pub trend: TrendMetrics,
    pub derived: DerivedStats,
    pub performance: PerformanceIndex,
    pub scores: OverallScores,
    pub buckets: BucketScores,
    pub total_grade: BucketScore,
    pub composite: crate::models::CompositeSummary,
    pub capacity: Capacity,
    pub decision: Decision,
    pub plan: PlanDisplay,
    pub narrative: Narrative,
    pub degraded: bool,
    pub degrade_reasons: Vec<String>,
    pub confidence: Option<ConfidenceBadge>,
    /// True when the week came from a complete ledger entry instead of
    /// raw day rows
    pub used_rollup: bool,
}

/// Orchestrates one weekly report run over an injected data source and
/// an optional narrative service.
pub struct ReportPipeline {
    provider: Box<dyn DataProvider>,
    generator: Option<Box<dyn NarrativeGenerator>>,
}

fn recover<T>(
    result: Result<Vec<T>, ReportError>,
    domain: &str,
    reasons: &mut Vec<String>,
) -> Result<Vec<T>, ReportError> {
    match result {
        Ok(rows) => Ok(rows),
        Err(e) if e.is_recoverable() => {
            warn!(domain = %domain, error = %e, "provider rows unavailable, continuing without");
            let reason = format!("provider_error:{domain}");
            if !reasons.contains(&reason) {
                reasons.push(reason);
            }
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

fn narrative_failure_reason(err: &ReportError) -> String {
    match err {
        ReportError::NarrativeSchema(violations) => {
            format!("narrative_schema:{}", violations.join(","))
        }
        _ => "narrative_unavailable".to_string(),
    }
}

/// Plan-keyed coach call used when the external copy left it blank.
fn default_coach_call(plan: &str) -> &'static str {
    match plan.to_ascii_lowercase().as_str() {
        "push" => "Push with measured progression; monitor readiness daily.",
        "hold" | "sustain" => "Maintain workload and protect sleep routine.",
        "recover" | "deload" => "Deload and bank recovery this week.",
        _ => "Hold steady and reinforce core recovery habits.",
    }
}

fn base_plan_code(decision: &Decision) -> PlanCode {
    match decision.plan {
        PlanAction::Push => PlanCode::Push,
        PlanAction::Sustain => PlanCode::Hold,
        PlanAction::Deload => PlanCode::Recover,
    }
}

/// Apply the safety gates to the base plan and pick the lever.
///
/// A workload-ratio spike forces RECOVER regardless of the base plan; a
/// warning-or-worse sleep bucket demotes a PUSH to HOLD. Gate levers
/// replace the narrative's lever so the displayed action always matches
/// the coerced plan.
pub fn resolve_plan_display(
    base: PlanCode,
    acwr_value: Option<f64>,
    sleep_bucket: &BucketScore,
    sd_minutes: Option<f64>,
    rhr_delta: f64,
    narrative_lever: &str,
) -> PlanDisplay {
    let gating_acwr = acwr_value.map(|v| v > GATING_ACWR).unwrap_or(false);
    let gating_sleep = base == PlanCode::Push
        && matches!(sleep_bucket.band, ScoreBand::Warning | ScoreBand::Danger);

    let code = if gating_acwr {
        PlanCode::Recover
    } else if gating_sleep {
        PlanCode::Hold
    } else {
        base
    };

    let lever = if gating_acwr {
        ACWR_GATE_LEVER.to_string()
    } else if gating_sleep {
        SLEEP_GATE_LEVER.to_string()
    } else if narrative_lever.is_empty() {
        DEFAULT_LEVER.to_string()
    } else {
        narrative_lever.to_string()
    };

    let icon = match code {
        PlanCode::Push => "↑",
        PlanCode::Hold => "↔",
        PlanCode::Recover => "↓",
    };

    let gating_summary = format!(
        "Sleep {} · SD {} · ACWR {} · RHR Δ {:+.1}",
        sleep_bucket.band_label,
        fmt_duration_minutes(sd_minutes),
        fmt_acwr(acwr_value),
        rhr_delta,
    );

    PlanDisplay {
        code,
        icon,
        lever,
        coerced: code != base,
        gating_summary,
    }
}

fn synthesize_readiness(
    weekly: &WeeklyMetrics,
    goals: &Goals,
    rhr_delta: f64,
    sd_minutes: Option<f64>,
    acwr_value: Option<f64>,
) -> Option<f64> {
    let w = composite_consts::READINESS_WEIGHTS;
    weighted_average(&[
        (w[0], pct_of_goal(weekly.sleep_minutes, goals.sleep_minutes)),
        (w[1], rhr_delta_score(Some(rhr_delta))),
        (w[2], consistency_score(sd_minutes)),
        (w[3], acwr_score(acwr_value)),
    ])
    .map(f64::round)
}

fn synthesize_output(weekly: &WeeklyMetrics, goals: &Goals) -> Option<f64> {
    let w = composite_consts::OUTPUT_WEIGHTS;
    weighted_average(&[
        (
            w[0],
            pct_of_goal(weekly.training_load_kg, goals.weekly_training_load),
        ),
        (w[1], pct_of_goal(weekly.steps, goals.steps)),
        (w[2], pct_of_goal(weekly.work_hours, goals.weekly_work_hours)),
    ])
    .map(f64::round)
}

impl ReportPipeline {
    pub fn new(
        provider: Box<dyn DataProvider>,
        generator: Option<Box<dyn NarrativeGenerator>>,
    ) -> Self {
        Self {
            provider,
            generator,
        }
    }

    /// Run the full weekly report for the week containing `reference`.
    pub async fn run(&self, reference: NaiveDate) -> Result<ReportBundle, ReportError> {
        let window = WeekWindow::containing(reference);
        let trend_window = window.trend_window();
        let week_label = window.label();
        let iso_label = window.iso_label();
        JobLogger::log_stage("resolve_windows", &week_label);

        let goals = self.provider.goals().await?;
        if goals.is_empty() {
            return Err(ReportError::Configuration(
                "no goals configured; set at least one weekly target".to_string(),
            ));
        }
        JobLogger::log_stage("load_goals", &week_label);

        let mut degrade_reasons: Vec<String> = Vec::new();

        let history = recover(
            self.provider.rollup_history(rollups::HISTORY_LIMIT).await,
            "Rollups",
            &mut degrade_reasons,
        )?;

        // Prefer the ledger's complete entry for the reference week; raw
        // day rows are the fallback for weeks not yet rolled up.
        JobLogger::log_stage("weekly_metrics", &week_label);
        let rollup_match = history
            .iter()
            .find(|e| e.is_complete() && e.week_start == window.start)
            .cloned();
        let used_rollup = rollup_match.is_some();

        let mut sleep_days: Vec<SleepDay> = Vec::new();
        let mut activity_days: Vec<ActivityDay> = Vec::new();
        let mut missing = MissingCounts::default();
        let mut carried_readiness = None;
        let mut carried_output = None;
        let mut rollup_sd = None;

        let weekly = if let Some(entry) = rollup_match {
            carried_readiness = entry.readiness_pct;
            carried_output = entry.output_pct;
            rollup_sd = entry.sleep_sd_min;
            WeeklyMetrics {
                steps: entry.steps_day_avg,
                training_load_kg: entry.gym_load_sum,
                work_hours: entry.work_hours_sum,
                sleep_minutes: entry.sleep_min_avg,
                resting_heart_rate: entry.rhr_avg,
                prs: entry.prs_sum,
                deep_work_pct: None,
            }
        } else {
            sleep_days = recover(
                self.provider.sleep_days(&window).await,
                "Sleep",
                &mut degrade_reasons,
            )?;
            activity_days = recover(
                self.provider.activity_days(&window).await,
                "Activity",
                &mut degrade_reasons,
            )?;
            let rhr_days = recover(
                self.provider.rhr_days(&window).await,
                "HeartRate",
                &mut degrade_reasons,
            )?;

            missing = missing_counts(&window, &sleep_days, &activity_days, &rhr_days);
            let mut absent: Vec<&str> = Vec::new();
            for (domain, count) in [
                ("Activity", missing.activity),
                ("Sleep", missing.sleep),
                ("HeartRate", missing.rhr),
            ] {
                if count > 0 {
                    JobLogger::log_data_gap(domain, count, count == 7);
                }
                if count == 7 {
                    absent.push(domain);
                }
            }
            if !absent.is_empty() {
                degrade_reasons.push(format!("missing_weekly_data:{}", absent.join(",")));
            }

            aggregate_week(&sleep_days, &activity_days, &rhr_days)
        };

        let trend_sleep = recover(
            self.provider.sleep_days(&trend_window).await,
            "Sleep",
            &mut degrade_reasons,
        )?;
        let trend_activity = recover(
            self.provider.activity_days(&trend_window).await,
            "Activity",
            &mut degrade_reasons,
        )?;
        let trend_rhr = recover(
            self.provider.rhr_days(&trend_window).await,
            "HeartRate",
            &mut degrade_reasons,
        )?;
        let trend = aggregate_trend(&trend_sleep, &trend_activity, &trend_rhr);

        JobLogger::log_stage("estimators", &week_label);
        let consistency = if used_rollup {
            match rollup_sd {
                Some(sd) => SleepConsistency {
                    score: None,
                    label: band_from_sd(sd),
                    source: SleepSource::Proxy,
                    sd_minutes: Some(sd),
                    gaps: 0,
                },
                None => SleepConsistency::default(),
            }
        } else {
            compute_sleep_consistency(&sleep_days)
        };
        let acwr = compute_acwr(weekly.training_load_kg, trend.training_load_kg);
        let floor_days = days_at_floor(&activity_days, goals.steps_floor);
        let sd_minutes = consistency.sd_minutes.or(rollup_sd);

        let sleep_series: Vec<f64> = sleep_days.iter().filter_map(|d| d.total_minutes).collect();
        let derived = compute_derived_stats(
            &weekly,
            &trend,
            &goals,
            consistency.clone(),
            acwr.clone(),
            &sleep_series,
            floor_days,
            missing,
        );

        JobLogger::log_stage("composite", &week_label);
        let readiness_pct = carried_readiness.or_else(|| {
            synthesize_readiness(
                &weekly,
                &goals,
                derived.rhr.delta_vs_trend,
                sd_minutes,
                acwr.value,
            )
        });
        let output_pct = carried_output.or_else(|| synthesize_output(&weekly, &goals));
        let composite = build_composite_summary(&CompositeInputs {
            rollups: &history,
            current_week_start: window.start,
            weekly: &weekly,
            sleep_sd_minutes: sd_minutes,
            acwr_value: acwr.value,
            readiness_pct,
            output_pct,
            goals: &goals,
        });

        JobLogger::log_stage("scores", &week_label);
        let capacity = classify_capacity(&weekly, &trend, &goals, &derived);
        let decision = decide_next_action(&weekly, &trend, &goals, &derived, &capacity);
        let performance = calculate_performance_index(&weekly, &trend, &goals, floor_days);
        let scores = compute_overall_scores(&weekly, &goals, &performance);
        let buckets = score_buckets(
            &weekly,
            &goals,
            sd_minutes,
            Some(derived.rhr.delta_vs_trend),
            acwr.ratio,
            Some(derived.load.pct_vs_trend),
            floor_days,
        );
        let total_grade = grade_from_score(Some(buckets.total()));

        JobLogger::log_stage("narrative", &week_label);
        let fallback = build_fallback_narrative(&FallbackInputs {
            weekly: &weekly,
            trend: &trend,
            goals: &goals,
            derived: &derived,
            scores: &scores,
            capacity: &capacity,
            decision: &decision,
        });
        let facts = FactBundle {
            week_label: week_label.clone(),
            iso_label: iso_label.clone(),
            scores: FactScores {
                overall: scores.overall,
                activity: scores.activity,
                recovery: scores.recovery,
                readiness: scores.readiness,
            },
            fulfilment: FactFulfilment {
                work_pct: derived.fulfilment.work_pct,
                strength_pct: derived.fulfilment.strength_pct,
                fitness_pct: derived.fulfilment.fitness_pct,
                sleep_pct: derived.fulfilment.sleep_pct,
                rhr_pct: derived.fulfilment.rhr_pct,
            },
            sleep_consistency_score: consistency.score,
            sleep_consistency_label: consistency.label.to_string(),
            acwr_value: acwr.value,
            acwr_label: acwr.label.to_string(),
            capacity: capacity.label.to_string(),
            capacity_reasons: capacity.reasons.clone(),
            plan: decision.plan.to_string(),
            lever: decision.lever.clone(),
            data_gaps: missing.total(),
        };

        let mut external: Option<Narrative> = None;
        if let Some(generator) = &self.generator {
            let source = generator.generator_name();
            match generator.generate(&facts).await {
                Ok(raw) => {
                    let plan_key = if raw.decision.plan.is_empty() {
                        decision.plan.to_string()
                    } else {
                        raw.decision.plan.clone()
                    };
                    match validate_narrative(&raw) {
                        Ok(valid) => {
                            JobLogger::log_narrative_event(source, true, None);
                            external = Some(valid);
                        }
                        Err(err) => {
                            let repairable = matches!(
                                &err,
                                ReportError::NarrativeSchema(v)
                                    if v.len() == 1 && v[0] == "coach_call_missing"
                            );
                            if repairable {
                                let mut repaired = raw;
                                repaired.coach_call = default_coach_call(&plan_key).to_string();
                                match validate_narrative(&repaired) {
                                    Ok(valid) => {
                                        JobLogger::log_narrative_event(
                                            source,
                                            true,
                                            Some("coach_call_repaired"),
                                        );
                                        external = Some(valid);
                                    }
                                    Err(err) => {
                                        let reason = narrative_failure_reason(&err);
                                        JobLogger::log_narrative_event(
                                            source,
                                            false,
                                            Some(&reason),
                                        );
                                        degrade_reasons.push(reason);
                                    }
                                }
                            } else {
                                let reason = narrative_failure_reason(&err);
                                JobLogger::log_narrative_event(source, false, Some(&reason));
                                degrade_reasons.push(reason);
                            }
                        }
                    }
                }
                Err(err) => {
                    JobLogger::log_narrative_event(source, false, Some(&err.to_string()));
                    degrade_reasons.push("narrative_unavailable".to_string());
                }
            }
        } else {
            JobLogger::log_narrative_event("fallback", true, None);
        }

        let (mut narrative, fallback_used) = merge_narrative(external, fallback);

        let base = if composite.latest.is_some() {
            composite.plan.code
        } else {
            base_plan_code(&decision)
        };
        let plan = resolve_plan_display(
            base,
            acwr.value,
            &buckets.sleep,
            sd_minutes,
            derived.rhr.delta_vs_trend,
            &narrative.decision.lever,
        );
        if plan.coerced {
            narrative.decision.notes.push(COERCED_NOTE.to_string());
        }
        JobLogger::log_decision(
            &capacity.label.to_string(),
            &plan.code.to_string(),
            plan.coerced,
        );

        if let Some(newest) = history.iter().max_by_key(|e| e.week_start) {
            if newest.data_gaps.unwrap_or(0) >= rollups::DEGRADE_GAP_THRESHOLD {
                degrade_reasons.push("insufficient_rollup_history".to_string());
            }
        }

        let degraded = fallback_used || !degrade_reasons.is_empty();
        let confidence = confidence_from_missing(&missing, degraded);

        JobLogger::log_stage("ledger", &week_label);
        let entry = WeeklyRollupEntry {
            week_start: window.start,
            week_end: Some(window.end),
            sleep_min_avg: weekly.sleep_minutes,
            sleep_sd_min: sd_minutes,
            rhr_avg: weekly.resting_heart_rate,
            steps_day_avg: weekly.steps,
            gym_load_sum: weekly.training_load_kg,
            work_hours_sum: weekly.work_hours,
            prs_sum: weekly.prs,
            acwr: acwr.value.or(acwr.ratio),
            readiness_pct,
            output_pct,
            data_gaps: Some(missing.total()),
            sleep_days_present: Some(7u32.saturating_sub(missing.sleep)),
            activity_days_present: Some(7u32.saturating_sub(missing.activity)),
        };
        let started = Instant::now();
        match self.provider.upsert_rollup(entry).await {
            Ok(()) => JobLogger::log_ledger_append(
                &window.start.to_string(),
                true,
                started.elapsed().as_millis() as u64,
            ),
            Err(e) => {
                warn!(error = %e, "rollup ledger append failed");
                JobLogger::log_ledger_append(
                    &window.start.to_string(),
                    false,
                    started.elapsed().as_millis() as u64,
                );
            }
        }

        Ok(ReportBundle {
            week_label,
            iso_label,
            window,
            weekly,
            trend,
            derived,
            performance,
            scores,
            buckets,
            total_grade,
            composite,
            capacity,
            decision,
            plan,
            narrative,
            degraded,
            degrade_reasons,
            confidence,
            used_rollup,
        })
    }
}

fn bucket_cell(bucket: &BucketScore) -> String {
    if bucket.score_text.is_empty() {
        bucket.grade.clone()
    } else {
        format!("{} ({})", bucket.grade, bucket.score_text)
    }
}

impl ReportBundle {
    /// Render the report as plain text for terminal output.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} · {}\n", self.week_label, self.iso_label));
        out.push_str(&format!("{}\n\n", self.narrative.headline));

        out.push_str(&format!(
            "Scores     overall {} · activity {} · recovery {} · readiness {}\n",
            fmt_int(Some(self.scores.overall)),
            fmt_int(Some(self.scores.activity)),
            fmt_int(Some(self.scores.recovery)),
            fmt_int(Some(self.scores.readiness)),
        ));
        out.push_str(&format!(
            "Report     {}\n",
            bucket_cell(&self.total_grade)
        ));
        out.push_str(&format!(
            "Buckets    sleep {} · load {} · activity {} · work {}\n",
            bucket_cell(&self.buckets.sleep),
            bucket_cell(&self.buckets.load),
            bucket_cell(&self.buckets.activity),
            bucket_cell(&self.buckets.work),
        ));
        out.push_str(&format!(
            "Gauges     {} · {}\n",
            format_percent_headline("Readiness", self.composite.readiness.pct),
            format_percent_headline("Output", self.composite.output.pct),
        ));

        if self.capacity.reasons.is_empty() {
            out.push_str(&format!("Capacity   {}\n", self.capacity.label));
        } else {
            out.push_str(&format!(
                "Capacity   {} ({})\n",
                self.capacity.label,
                format_list(&self.capacity.reasons),
            ));
        }
        out.push_str(&format!(
            "Next week  {} {}: {}\n",
            self.plan.icon, self.plan.code, self.plan.lever,
        ));
        out.push_str(&format!("Gating     {}\n", self.plan.gating_summary));
        if self.plan.coerced {
            out.push_str(&format!("           {COERCED_NOTE}\n"));
        }
        out.push('\n');

        for (name, section) in [
            ("ACTIVITY", &self.narrative.sections.activity),
            ("RECOVERY", &self.narrative.sections.recovery),
            ("READINESS", &self.narrative.sections.readiness),
        ] {
            out.push_str(&format!("{name} · {}\n", section.title));
            for bullet in &section.bullets {
                out.push_str(&format!("  - {bullet}\n"));
            }
            for note in &section.notes {
                out.push_str(&format!("  note: {note}\n"));
            }
            out.push('\n');
        }

        if !self.narrative.insights.is_empty() {
            out.push_str("Insights\n");
            for insight in &self.narrative.insights {
                out.push_str(&format!("  - {insight}\n"));
            }
            out.push('\n');
        }
        if !self.narrative.recommendations.is_empty() {
            out.push_str("Recommendations\n");
            for rec in &self.narrative.recommendations {
                out.push_str(&format!("  - {rec}\n"));
            }
            out.push('\n');
        }
        if !self.narrative.coach_call.is_empty() {
            out.push_str(&format!("Coach's call: {}\n", self.narrative.coach_call));
        }
        for warning in &self.narrative.warnings {
            out.push_str(&format!("Warning: {warning}\n"));
        }

        if let Some(badge) = &self.confidence {
            out.push_str(&format!("{}\n", badge.label));
        }
        if self.degraded {
            if self.degrade_reasons.is_empty() {
                out.push_str("Degraded run (deterministic copy)\n");
            } else {
                out.push_str(&format!(
                    "Degraded run: {}\n",
                    self.degrade_reasons.join("; ")
                ));
            }
        }
        out.push_str(&format!("Narrative source: {}\n", self.narrative.model));
        out
    }

    /// Serialize the bundle for the JSON output mode.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "week": {
                "label": self.week_label,
                "iso": self.iso_label,
                "start": self.window.start.to_string(),
                "end": self.window.end.to_string(),
            },
            "weekly": self.weekly,
            "trend": self.trend,
            "scores": {
                "overall": self.scores.overall,
                "activity": self.scores.activity,
                "recovery": self.scores.recovery,
                "readiness": self.scores.readiness,
            },
            "performance": {
                "score": self.performance.score,
                "components": {
                    "work_score": self.performance.components.work_score,
                    "strength_score": self.performance.components.strength_score,
                    "fitness_score": self.performance.components.fitness_score,
                    "load_goal_score": self.performance.components.load_goal_score,
                    "load_trend_score": self.performance.components.load_trend_score,
                    "pr_boost": self.performance.components.pr_boost,
                    "days_at_floor": self.performance.components.days_at_floor,
                },
            },
            "fulfilment": {
                "work_pct": self.derived.fulfilment.work_pct,
                "strength_pct": self.derived.fulfilment.strength_pct,
                "strength_proxy_goal": self.derived.fulfilment.strength_proxy_goal,
                "fitness_pct": self.derived.fulfilment.fitness_pct,
                "sleep_pct": self.derived.fulfilment.sleep_pct,
                "rhr_pct": self.derived.fulfilment.rhr_pct,
            },
            "sleep_consistency": self.derived.sleep.consistency,
            "acwr": self.derived.load.acwr,
            "buckets": {
                "sleep": self.buckets.sleep,
                "load": self.buckets.load,
                "activity": self.buckets.activity,
                "work": self.buckets.work,
                "total": self.buckets.total(),
                "grade": self.total_grade,
            },
            "composite": self.composite,
            "capacity": self.capacity,
            "decision": self.decision,
            "plan": {
                "code": self.plan.code,
                "icon": self.plan.icon,
                "lever": self.plan.lever,
                "coerced": self.plan.coerced,
                "gating_summary": self.plan.gating_summary,
            },
            "narrative": self.narrative,
            "degraded": self.degraded,
            "degrade_reasons": self.degrade_reasons,
            "confidence": self.confidence,
            "used_rollup": self.used_rollup,
        })
    }
}
