// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deterministic fallback copy.
//!
//! When the external generator fails or returns invalid output, the
//! report is assembled entirely from the fulfilment bands: a status
//! sentence, an action sentence from a fixed per-band library, and an
//! optional context clause per domain. The copy never mentions internal
//! jargon, so it always passes the same contract the external text is
//! held to.

use crate::formatters::format_list;
use crate::models::{Capacity, Decision, FulfilmentBand, Goals, PlanAction, TrendMetrics,
    WeeklyMetrics};
use crate::scoring::derived::DerivedStats;
use crate::scoring::performance::OverallScores;

use super::{Narrative, NarrativeDecision, NarrativeSection, NarrativeSections};

const DEFAULT_ACTIVITY_TITLE: &str = "Output shifted from normal — act accordingly this week.";
const DEFAULT_RECOVERY_TITLE: &str =
    "Sleep roughly on target; timing consistency needs attention.";
const DEFAULT_READINESS_TITLE: &str =
    "Body signals mixed; stay conservative and reassess mid-week.";

const FALLBACK_RECOMMENDATIONS: [&str; 4] = [
    "Hold core training blocks with focused execution.",
    "Protect sleep routine with fixed lights-out.",
    "Monitor resting heart rate before harder efforts.",
    "Log sessions and recovery notes nightly.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Work,
    Strength,
    Fitness,
    Sleep,
    Readiness,
}

impl Section {
    fn label(self) -> &'static str {
        match self {
            Self::Work => "Work hours",
            Self::Strength => "Strength training load",
            Self::Fitness => "Daily movement",
            Self::Sleep => "Sleep duration",
            Self::Readiness => "Readiness (resting heart rate)",
        }
    }

    fn short_label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Strength => "Strength",
            Self::Fitness => "Movement",
            Self::Sleep => "Sleep",
            Self::Readiness => "Readiness",
        }
    }

    fn better_is_lower(self) -> bool {
        matches!(self, Self::Readiness)
    }

    fn where_how(self) -> &'static str {
        match self {
            Self::Work => "via two 90-minute focus sprints",
            Self::Strength => "via the main lifts; tempo 3-1-0",
            Self::Fitness => "via two purposeful walks (20 minutes each)",
            Self::Sleep => "via a fixed 10:00pm wind-down routine",
            Self::Readiness => "via five-minute evening parasympathetic breathing",
        }
    }
}

fn action_sentence(section: Section, band: FulfilmentBand, has_goal: bool) -> &'static str {
    use FulfilmentBand::{Green, RedHigh, RedLow, Unknown, YellowHigh, YellowLow};
    use Section::{Fitness, Readiness, Sleep, Strength, Work};
    if !has_goal {
        return match section {
            Work => "Set a weekly work target to guide decisions.",
            Strength => "Set a weekly load target (or proxy) to direct training.",
            Fitness => "Set a daily movement goal to guide choices.",
            Sleep => "Set a nightly sleep target to anchor recovery.",
            Readiness => "Add a resting heart rate goal to guide recovery.",
        };
    }
    match (section, band) {
        (Work, Green) => "Keep the work rhythm steady.",
        (Work, YellowHigh) => "Trim work hours a little to protect recovery.",
        (Work, YellowLow) => "Add a focused block to close the work gap.",
        (Work, RedHigh) => "Pull hours back to avoid burnout.",
        (Work, RedLow) => "Schedule firm focus time to meet commitments.",
        (Work, Unknown) => "Note work hours so we can steer next week.",
        (Strength, Green) => "Maintain the current training mix.",
        (Strength, YellowHigh) => "Dial volume down slightly to bank recovery.",
        (Strength, YellowLow) => "Add one quality strength session to keep load on track.",
        (Strength, RedHigh) => "Deload strength volume this week.",
        (Strength, RedLow) => "Plan progressive overload to build toward the goal.",
        (Strength, Unknown) => "Log strength sessions so we can steer the load.",
        (Fitness, Green) => "Keep daily movement habits steady.",
        (Fitness, YellowHigh) => "Channel extra steps into easy aerobic sessions.",
        (Fitness, YellowLow) => "Layer in walks to close the movement gap.",
        (Fitness, RedHigh) => "Hold steps steady and make recovery intentional.",
        (Fitness, RedLow) => "Prioritise daily walks to meet the movement goal.",
        (Fitness, Unknown) => "Track step counts consistently to steer movement.",
        (Sleep, Green) => "Keep bedtime and wake routines consistent.",
        (Sleep, YellowHigh) => "Use the extra rest to fuel deliberate training.",
        (Sleep, YellowLow) => "Bring lights-out forward to protect sleep time.",
        (Sleep, RedHigh) => "Hold a firm wake-up time so sleep stays purposeful.",
        (Sleep, RedLow) => "Block non-negotiable wind-down time to recover.",
        (Sleep, Unknown) => "Log sleep duration so we can adjust quickly.",
        (Readiness, Green) => "Keep recovery practices consistent.",
        (Readiness, YellowHigh) => "Ease up slightly and watch recovery markers.",
        (Readiness, YellowLow) => {
            "You are trending better than goal, stay patient with buildup."
        }
        (Readiness, RedHigh) => "Heart rate is well below goal; build gradually while monitoring.",
        (Readiness, RedLow) => "Prioritise rest until heart rate settles.",
        (Readiness, Unknown) => "Track resting heart rate to steer readiness.",
    }
}

/// Second-choice copy used when the primary action sentence collides
/// with a recommendation.
fn dedup_action_sentence(section: Section, band: FulfilmentBand) -> &'static str {
    use FulfilmentBand::{Green, RedHigh, RedLow, Unknown, YellowHigh, YellowLow};
    use Section::{Fitness, Readiness, Sleep, Strength, Work};
    match (section, band) {
        (Work, Green) => "Keep work cadence steady to preserve bandwidth.",
        (Work, YellowHigh) => "Ease workload slightly to free recovery space.",
        (Work, YellowLow) => "Add one deliberate focus block to close the work gap.",
        (Work, RedHigh) => "Cut back hours sharply so fatigue drops.",
        (Work, RedLow) => "Bookend deep-work blocks to rebuild momentum.",
        (Work, Unknown) => "Rebalance workload deliberately.",
        (Strength, Green) => "Hold the current strength mix steady.",
        (Strength, YellowHigh) => "Dial strength volume down to bank recovery.",
        (Strength, YellowLow) => "Layer one quality strength session to lift the load.",
        (Strength, RedHigh) => "Deload strength sets while monitoring fatigue.",
        (Strength, RedLow) => "Plan progressive overload carefully to rebuild.",
        (Strength, Unknown) => "Tune strength load deliberately.",
        (Fitness, Green) => "Keep daily movement habits steady.",
        (Fitness, YellowHigh) => "Channel surplus steps into easy aerobic time.",
        (Fitness, YellowLow) => "Layer extra walks to close the movement gap.",
        (Fitness, RedHigh) => "Hold step volume steady so recovery settles.",
        (Fitness, RedLow) => "Prioritise daily walks to rebuild momentum.",
        (Fitness, Unknown) => "Adjust movement deliberately.",
        (Sleep, Green) => "Keep bedtime cadence consistent.",
        (Sleep, YellowHigh) => "Use the extra rest intentionally for the training plan.",
        (Sleep, YellowLow) => "Bring lights-out forward to protect sleep time.",
        (Sleep, RedHigh) => "Hold a firm wake window so sleep stays purposeful.",
        (Sleep, RedLow) => "Block a non-negotiable wind-down to recover.",
        (Sleep, Unknown) => "Adjust sleep rhythm deliberately.",
        (Readiness, Green) => "Keep recovery practices steady.",
        (Readiness, YellowHigh) => "Ease effort slightly and monitor signals.",
        (Readiness, YellowLow) => "Stay patient with the positive recovery trend.",
        (Readiness, RedHigh) => "Build gradually while you watch heart rate.",
        (Readiness, RedLow) => "Prioritise rest until heart rate settles.",
        (Readiness, Unknown) => "Adjust recovery deliberately.",
    }
}

fn percent_as_text(pct: Option<f64>) -> String {
    match pct.filter(|v| v.is_finite()) {
        Some(v) => format!("{} percent", v.round() as i64),
        None => "no percent insight".to_string(),
    }
}

fn minutes_to_words(minutes: f64) -> String {
    let total = minutes.round() as i64;
    let hours = total / 60;
    let mins = total % 60;
    let mut parts = Vec::new();
    if hours != 0 {
        parts.push(format!("{hours} hour{}", if hours == 1 { "" } else { "s" }));
    }
    if mins != 0 {
        parts.push(format!("{mins} minute{}", if mins == 1 { "" } else { "s" }));
    }
    if parts.is_empty() {
        parts.push("0 minutes".to_string());
    }
    parts.join(" ")
}

fn section_value_text(section: Section, value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return "no data logged".to_string();
    };
    match section {
        Section::Work => format!("{} hours", (v * 10.0).round() / 10.0),
        Section::Strength => format!("{} kilograms", v.round() as i64),
        Section::Fitness => format!("{} steps", v.round() as i64),
        Section::Sleep => minutes_to_words(v),
        Section::Readiness => format!("{} beats per minute", v.round() as i64),
    }
}

fn describe_goal_status(fulfil_pct: Option<f64>, better_is_lower: bool) -> Option<&'static str> {
    let pct = fulfil_pct.filter(|v| v.is_finite())?;
    let diff = pct - 100.0;
    let effective = if better_is_lower { -diff } else { diff };
    let magnitude = effective.abs();
    Some(if magnitude <= 3.0 {
        "on goal"
    } else if magnitude <= 7.0 {
        if effective > 0.0 {
            "slightly ahead of goal"
        } else {
            "slightly behind goal"
        }
    } else if magnitude <= 12.0 {
        if effective > 0.0 {
            "ahead of goal"
        } else {
            "behind goal"
        }
    } else if effective > 0.0 {
        "well ahead of goal"
    } else {
        "well behind goal"
    })
}

struct SectionFacts {
    weekly_value: Option<f64>,
    goal_value: Option<f64>,
    fulfil_pct: Option<f64>,
    band: FulfilmentBand,
    trend_value: Option<f64>,
    acwr_ratio: Option<f64>,
    sleep_consistency_score: Option<f64>,
    goal_descriptor: &'static str,
}

impl Default for SectionFacts {
    fn default() -> Self {
        Self {
            weekly_value: None,
            goal_value: None,
            fulfil_pct: None,
            band: FulfilmentBand::Unknown,
            trend_value: None,
            acwr_ratio: None,
            sleep_consistency_score: None,
            goal_descriptor: "goal",
        }
    }
}

fn status_sentence(section: Section, facts: &SectionFacts) -> String {
    let label = section.label();
    let descriptor = facts.goal_descriptor;
    if facts.goal_value.is_some() {
        if let Some(status) = describe_goal_status(facts.fulfil_pct, section.better_is_lower()) {
            return format!(
                "{label} lands {status} at {} of the {descriptor}.",
                percent_as_text(facts.fulfil_pct)
            );
        }
        if facts.weekly_value.is_some() {
            return format!(
                "{label} progress tracks the {descriptor}; percent insight is limited this week."
            );
        }
    }
    if facts.weekly_value.is_some() {
        return format!(
            "{label} logged {} with no goal for comparison.",
            section_value_text(section, facts.weekly_value)
        );
    }
    format!("{label} data is missing this week.")
}

fn context_clause(section: Section, facts: &SectionFacts) -> Option<&'static str> {
    use crate::constants::{acwr, trend};
    let weekly = facts.weekly_value.unwrap_or(0.0);
    match section {
        Section::Work => {
            let t = facts.trend_value.filter(|v| *v != 0.0)?;
            (weekly >= t * trend::WORK_HIGH_RATIO)
                .then_some("Work time beats the four week norm; protect recovery.")
        }
        Section::Strength => {
            let above_trend = facts
                .trend_value
                .filter(|v| *v != 0.0)
                .map(|t| weekly >= t * trend::STRENGTH_HIGH_RATIO)
                .unwrap_or(false);
            let acwr_hot = facts
                .acwr_ratio
                .map(|r| r >= acwr::AMBER_RATIO)
                .unwrap_or(false);
            (above_trend || acwr_hot)
                .then_some("Load tops four week average; keep next week easy.")
        }
        Section::Fitness => {
            let t = facts.trend_value.filter(|v| *v != 0.0)?;
            (weekly <= t * trend::FITNESS_LOW_RATIO)
                .then_some("Steps trail four week trend; plan extra walks.")
        }
        Section::Sleep => {
            if facts
                .sleep_consistency_score
                .map(|s| s < 65.0)
                .unwrap_or(false)
            {
                return Some("Sleep rhythm drifting; lock in lights-out times.");
            }
            let t = facts.trend_value.filter(|v| *v != 0.0)?;
            (weekly <= t * trend::SLEEP_LOW_RATIO)
                .then_some("Sleep time dipped below trend; wind down earlier.")
        }
        Section::Readiness => {
            let t = facts.trend_value?;
            (weekly >= t + trend::READINESS_HIGH_DELTA)
                .then_some("Heart rate trend climbing; schedule extra recovery.")
        }
    }
}

fn append_where_how(sentence: &str, clause: &str) -> String {
    let trimmed = sentence.trim().trim_end_matches('.');
    if clause.is_empty() {
        return format!("{trimmed}.");
    }
    format!("{trimmed} {}.", clause.trim().trim_end_matches('.'))
}

fn comparison_text(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn duplicates_recommendation(sentence: &str, recommendations: &[&str]) -> bool {
    let action = comparison_text(sentence);
    if action.is_empty() {
        return false;
    }
    recommendations.iter().any(|rec| {
        let rec = comparison_text(rec);
        if rec.is_empty() {
            return false;
        }
        let (shorter, longer) = if action.len() <= rec.len() {
            (&action, &rec)
        } else {
            (&rec, &action)
        };
        longer.contains(shorter.as_str())
            && shorter.len() as f64 / longer.len().max(1) as f64 >= 0.8
    })
}

fn section_text(
    section: Section,
    facts: &SectionFacts,
    highlights: &mut Vec<(&'static str, &'static str)>,
) -> String {
    let mut sentences = vec![status_sentence(section, facts)];

    let clause = section.where_how();
    let has_goal = facts.goal_value.is_some();
    let mut action = append_where_how(action_sentence(section, facts.band, has_goal), clause);
    if duplicates_recommendation(&action, &FALLBACK_RECOMMENDATIONS) {
        action = append_where_how(dedup_action_sentence(section, facts.band), clause);
        if duplicates_recommendation(&action, &FALLBACK_RECOMMENDATIONS) {
            action = append_where_how("Action: Follow this lever in a fresh way", clause);
        }
    }
    sentences.push(action);

    if let Some(context) = context_clause(section, facts) {
        sentences.push(format!("Context: {context}"));
        highlights.push((section.short_label(), context));
    }

    sentences.join(" ")
}

fn coach_call(
    derived: &DerivedStats,
    highlights: &[(&'static str, &'static str)],
    decision: &Decision,
) -> String {
    let bands = [
        ("Work", derived.bands.work),
        ("Strength", derived.bands.strength),
        ("Movement", derived.bands.fitness),
        ("Sleep", derived.bands.sleep),
        ("Readiness", derived.bands.readiness),
    ];
    let mut met = Vec::new();
    let mut watch = Vec::new();
    let mut strain = Vec::new();
    for (label, band) in bands {
        match band {
            FulfilmentBand::Green => met.push(label.to_string()),
            FulfilmentBand::YellowHigh | FulfilmentBand::YellowLow => {
                watch.push(label.to_string())
            }
            FulfilmentBand::RedHigh | FulfilmentBand::RedLow => strain.push(label.to_string()),
            FulfilmentBand::Unknown => {}
        }
    }

    let mut parts = Vec::new();
    if !met.is_empty() {
        parts.push(format!("Goals met: {}.", format_list(&met)));
    }
    if !watch.is_empty() {
        parts.push(format!("Watch: {}.", format_list(&watch)));
    }
    if !strain.is_empty() {
        parts.push(format!("Needs action: {}.", format_list(&strain)));
    }
    if let Some((section, message)) = highlights.first() {
        parts.push(format!("{section}: {message}."));
    }
    parts.push(match decision.plan {
        PlanAction::Push => {
            "Plan: Push with a measured progression while monitoring recovery.".to_string()
        }
        PlanAction::Deload => "Plan: Deload and bank recovery time.".to_string(),
        PlanAction::Sustain => "Plan: Hold steady and reinforce routines.".to_string(),
    });
    parts.join(" ")
}

/// Everything the deterministic narrative needs, all computed upstream.
#[derive(Debug, Clone)]
pub struct FallbackInputs<'a> {
    pub weekly: &'a WeeklyMetrics,
    pub trend: &'a TrendMetrics,
    pub goals: &'a Goals,
    pub derived: &'a DerivedStats,
    pub scores: &'a OverallScores,
    pub capacity: &'a Capacity,
    pub decision: &'a Decision,
}

/// Assemble the full fallback narrative from bands and scores.
pub fn build_fallback_narrative(inputs: &FallbackInputs<'_>) -> Narrative {
    let ds = inputs.derived;
    let fulfil = &ds.fulfilment;
    let consistency = &ds.sleep.consistency;
    let acwr_ratio = ds.load.acwr.ratio.or(ds.load.acwr.value);
    let mut highlights = Vec::new();

    let work_text = section_text(
        Section::Work,
        &SectionFacts {
            weekly_value: inputs.weekly.work_hours,
            goal_value: inputs.goals.weekly_work_hours.filter(|v| *v != 0.0),
            fulfil_pct: fulfil.work_pct,
            band: ds.bands.work,
            trend_value: inputs.trend.work_hours,
            acwr_ratio,
            ..SectionFacts::default()
        },
        &mut highlights,
    );

    let strength_goal = inputs
        .goals
        .weekly_training_load
        .filter(|v| *v != 0.0)
        .or_else(|| {
            fulfil
                .strength_proxy_goal
                .then_some(inputs.trend.training_load_kg)
                .flatten()
        });
    let strength_text = section_text(
        Section::Strength,
        &SectionFacts {
            weekly_value: inputs.weekly.training_load_kg,
            goal_value: strength_goal,
            fulfil_pct: fulfil.strength_pct,
            band: ds.bands.strength,
            trend_value: inputs.trend.training_load_kg,
            acwr_ratio,
            goal_descriptor: if fulfil.strength_proxy_goal {
                "proxy goal (four week average)"
            } else {
                "goal"
            },
            ..SectionFacts::default()
        },
        &mut highlights,
    );

    let fitness_text = section_text(
        Section::Fitness,
        &SectionFacts {
            weekly_value: inputs.weekly.steps,
            goal_value: inputs.goals.steps.filter(|v| *v != 0.0),
            fulfil_pct: fulfil.fitness_pct,
            band: ds.bands.fitness,
            trend_value: inputs.trend.steps,
            ..SectionFacts::default()
        },
        &mut highlights,
    );

    let sleep_text = section_text(
        Section::Sleep,
        &SectionFacts {
            weekly_value: inputs.weekly.sleep_minutes,
            goal_value: inputs.goals.sleep_minutes.filter(|v| *v != 0.0),
            fulfil_pct: fulfil.sleep_pct,
            band: ds.bands.sleep,
            trend_value: inputs.trend.sleep_minutes,
            sleep_consistency_score: consistency.score,
            ..SectionFacts::default()
        },
        &mut highlights,
    );

    let readiness_text = section_text(
        Section::Readiness,
        &SectionFacts {
            weekly_value: inputs.weekly.resting_heart_rate,
            goal_value: inputs.goals.resting_heart_rate.filter(|v| *v != 0.0),
            fulfil_pct: fulfil.rhr_pct,
            band: ds.bands.readiness,
            trend_value: inputs.trend.resting_heart_rate,
            ..SectionFacts::default()
        },
        &mut highlights,
    );

    let consistency_text = match consistency.score {
        Some(score) => format!("{}/100 ({})", score.round() as i64, consistency.label),
        None => "Data Gaps".to_string(),
    };
    let insights = vec![
        format!(
            "Performance index sits at {}/100 with activity fulfilment {} and strength fulfilment {}.",
            inputs.scores.activity.round() as i64,
            percent_as_text(fulfil.work_pct),
            percent_as_text(fulfil.strength_pct)
        ),
        format!(
            "Sleep fulfilment is {}; consistency reads {consistency_text}.",
            percent_as_text(fulfil.sleep_pct)
        ),
        format!(
            "Readiness trends {}; recommendation stays {} — {}.",
            percent_as_text(fulfil.rhr_pct),
            inputs.decision.plan,
            inputs.decision.lever
        ),
    ];

    Narrative {
        headline: format!(
            "{} capacity — next week: {}",
            inputs.capacity.label, inputs.decision.plan
        ),
        insights,
        sections: NarrativeSections {
            activity: NarrativeSection {
                title: DEFAULT_ACTIVITY_TITLE.to_string(),
                bullets: vec![work_text, strength_text, fitness_text],
                notes: vec![],
            },
            recovery: NarrativeSection {
                title: DEFAULT_RECOVERY_TITLE.to_string(),
                bullets: vec![sleep_text],
                notes: vec![],
            },
            readiness: NarrativeSection {
                title: DEFAULT_READINESS_TITLE.to_string(),
                bullets: vec![readiness_text],
                notes: vec![],
            },
        },
        recommendations: FALLBACK_RECOMMENDATIONS
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        decision: NarrativeDecision {
            plan: inputs.decision.plan.to_string(),
            lever: inputs.decision.lever.clone(),
            notes: vec![],
        },
        coach_call: coach_call(ds, &highlights, inputs.decision),
        model: "fallback".to_string(),
        warnings: vec![],
    }
}
