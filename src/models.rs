// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures used throughout the health report engine.
//! These models carry weekly observations, user goals, derived estimator
//! outputs and the scored results handed to renderers.
//!
//! ## Design Principles
//!
//! - **Source Agnostic**: Models abstract away where a week's data came from
//! - **Gap Tolerant**: Optional fields represent missing days, never zero-fill
//! - **Serializable**: All models support JSON for the rollup ledger contract
//! - **Type Safe**: Bands, labels and plans are enums, not stringly-typed
//!
//! ## Core Models
//!
//! - [`WeeklyMetrics`]: One observed Saturday-start week
//! - [`TrendMetrics`]: Trailing 4-week baseline in the same shape
//! - [`Goals`]: User targets, loaded once and immutable per run
//! - [`WeeklyRollupEntry`]: Persisted weekly snapshot with a stable field contract
//! - [`CompositeSummary`]: Recency-weighted readiness/output gauges and plan
//! - [`Capacity`] / [`Decision`]: Risk classification and next-week action

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One observed week of metrics. Any field may be absent when the
/// underlying source had no usable rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    /// Daily step average across the week
    pub steps: Option<f64>,
    /// Weekly training volume sum in kilograms
    pub training_load_kg: Option<f64>,
    /// Weekly working-hours sum
    pub work_hours: Option<f64>,
    /// Nightly sleep-minutes average
    pub sleep_minutes: Option<f64>,
    /// Resting heart rate average (bpm)
    pub resting_heart_rate: Option<f64>,
    /// Personal records logged this week
    pub prs: Option<u32>,
    /// Fraction of work hours spent in deep focus, when tracked
    pub deep_work_pct: Option<f64>,
}

/// Trailing 4-week rolling baseline, same shape as the weekly observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendMetrics {
    pub steps: Option<f64>,
    pub training_load_kg: Option<f64>,
    pub work_hours: Option<f64>,
    pub sleep_minutes: Option<f64>,
    pub resting_heart_rate: Option<f64>,
}

fn default_steps_floor() -> f64 {
    crate::constants::steps::FALLBACK_FLOOR
}

fn default_steps_floor_days() -> u32 {
    crate::constants::steps::FALLBACK_FLOOR_DAYS
}

/// User-set weekly targets. Loaded once per run and immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    /// Weekly step target (daily average basis)
    pub steps: Option<f64>,
    /// Nightly sleep-minutes target
    #[serde(alias = "sleepMinutes")]
    pub sleep_minutes: Option<f64>,
    /// Resting heart rate target (bpm, lower is better)
    #[serde(alias = "restingHeartRate")]
    pub resting_heart_rate: Option<f64>,
    /// Weekly training volume target (kg)
    #[serde(alias = "weeklyTrainingLoad")]
    pub weekly_training_load: Option<f64>,
    /// Weekly working-hours target
    #[serde(alias = "weeklyWorkHours")]
    pub weekly_work_hours: Option<f64>,
    /// Daily step floor used for compliance counting
    #[serde(default = "default_steps_floor", alias = "stepsFloor")]
    pub steps_floor: f64,
    /// Days at the floor required for the fitness bonus
    #[serde(default = "default_steps_floor_days", alias = "stepsFloorDays")]
    pub steps_floor_days: u32,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            steps: None,
            sleep_minutes: None,
            resting_heart_rate: None,
            weekly_training_load: None,
            weekly_work_hours: None,
            steps_floor: default_steps_floor(),
            steps_floor_days: default_steps_floor_days(),
        }
    }
}

impl Goals {
    /// True when no target at all has been configured.
    pub fn is_empty(&self) -> bool {
        self.steps.is_none()
            && self.sleep_minutes.is_none()
            && self.resting_heart_rate.is_none()
            && self.weekly_training_load.is_none()
            && self.weekly_work_hours.is_none()
    }
}

/// Status band attached to a graded score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Success,
    Warning,
    Danger,
    Neutral,
}

impl ScoreBand {
    /// CSS-style status class consumed by renderers.
    pub fn status_class(&self) -> &'static str {
        match self {
            Self::Success => "status-success",
            Self::Warning => "status-warning",
            Self::Danger => "status-danger",
            Self::Neutral => "status-neutral",
        }
    }

    /// Short human label for the band.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "Good",
            Self::Warning => "Caution",
            Self::Danger => "Action",
            Self::Neutral => "Neutral",
        }
    }
}

/// Goal-deviation band for a fulfilment percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfilmentBand {
    Green,
    YellowHigh,
    YellowLow,
    RedHigh,
    RedLow,
    #[default]
    Unknown,
}

/// Acute:chronic workload ratio classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcwrLabel {
    Underload,
    Stable,
    Caution,
    Spike,
    #[serde(rename = "Data Gaps")]
    DataGaps,
}

impl fmt::Display for AcwrLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Underload => "Underload",
            Self::Stable => "Stable",
            Self::Caution => "Caution",
            Self::Spike => "Spike",
            Self::DataGaps => "Data Gaps",
        };
        write!(f, "{text}")
    }
}

/// Acute:chronic workload ratio estimate.
///
/// Derived each run from trailing sums, never persisted as source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcwrInfo {
    /// Raw ratio capped at 2.5, None when chronic data is absent
    pub ratio: Option<f64>,
    /// Display ratio rounded to one decimal
    pub value: Option<f64>,
    pub label: AcwrLabel,
    /// Current-week load sum
    pub acute: f64,
    /// Trailing 4-week average load
    pub chronic: f64,
}

impl Default for AcwrInfo {
    fn default() -> Self {
        Self {
            ratio: None,
            value: None,
            label: AcwrLabel::DataGaps,
            acute: 0.0,
            chronic: 0.0,
        }
    }
}

/// Where a sleep-consistency estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepSource {
    /// Averaged from recorded per-day consistency scores
    Recorded,
    /// Timing-variability proxy only, no recorded score
    Proxy,
    /// No usable rows at all
    Missing,
}

/// Sleep timing-regularity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepBand {
    Elite,
    Stable,
    Drifting,
    Irregular,
    Chaotic,
    #[serde(rename = "Data gap")]
    DataGap,
}

impl fmt::Display for SleepBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Elite => "Elite",
            Self::Stable => "Stable",
            Self::Drifting => "Drifting",
            Self::Irregular => "Irregular",
            Self::Chaotic => "Chaotic",
            Self::DataGap => "Data gap",
        };
        write!(f, "{text}")
    }
}

/// Weekly sleep-consistency estimate with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepConsistency {
    /// Averaged recorded score, clamped [0,100]; None on the proxy path
    pub score: Option<f64>,
    pub label: SleepBand,
    pub source: SleepSource,
    /// Timing midpoint standard deviation in minutes
    pub sd_minutes: Option<f64>,
    /// Days in the week without a usable row
    pub gaps: u32,
}

impl Default for SleepConsistency {
    fn default() -> Self {
        Self {
            score: None,
            label: SleepBand::DataGap,
            source: SleepSource::Missing,
            sd_minutes: None,
            gaps: 7,
        }
    }
}

/// A graded domain score. Grade and band are pure functions of the score,
/// so re-attaching them is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketScore {
    /// Clamped [0,100], None when there was no signal at all
    pub score: Option<f64>,
    /// Letter grade A+ through F, em dash when score is None
    pub grade: String,
    pub band: ScoreBand,
    pub band_class: String,
    pub band_label: String,
    /// Display text like "82/100", empty when score is None
    pub score_text: String,
}

/// Persisted snapshot of one week, keyed by `week_start`.
///
/// Serialized field names are a stable contract read back across runs.
/// Parsing accepts legacy camelCase aliases, leading-apostrophe date
/// strings and spreadsheet serial dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRollupEntry {
    #[serde(
        alias = "weekStart",
        deserialize_with = "crate::weeks::deserialize_date"
    )]
    pub week_start: NaiveDate,
    #[serde(
        default,
        alias = "weekEnd",
        deserialize_with = "crate::weeks::deserialize_opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub week_end: Option<NaiveDate>,
    #[serde(default, alias = "sleepMinAvg")]
    pub sleep_min_avg: Option<f64>,
    #[serde(default, alias = "sleepSdMin")]
    pub sleep_sd_min: Option<f64>,
    #[serde(default, alias = "rhrAvg")]
    pub rhr_avg: Option<f64>,
    #[serde(default, alias = "stepsDayAvg")]
    pub steps_day_avg: Option<f64>,
    #[serde(default, alias = "gymLoadSum")]
    pub gym_load_sum: Option<f64>,
    #[serde(default, alias = "workHoursSum")]
    pub work_hours_sum: Option<f64>,
    #[serde(default, alias = "prsSum")]
    pub prs_sum: Option<u32>,
    #[serde(default)]
    pub acwr: Option<f64>,
    #[serde(default, alias = "readinessPct")]
    pub readiness_pct: Option<f64>,
    #[serde(default, alias = "outputPct")]
    pub output_pct: Option<f64>,
    #[serde(default, alias = "dataGaps")]
    pub data_gaps: Option<u32>,
    #[serde(default, alias = "sleepDaysPresent")]
    pub sleep_days_present: Option<u32>,
    #[serde(default, alias = "activityDaysPresent")]
    pub activity_days_present: Option<u32>,
}

impl WeeklyRollupEntry {
    /// A week counts toward composites only when it had zero data gaps.
    pub fn is_complete(&self) -> bool {
        self.data_gaps == Some(0)
    }

    /// True when any metric field carries a finite value.
    pub fn has_data(&self) -> bool {
        [
            self.sleep_min_avg,
            self.sleep_sd_min,
            self.rhr_avg,
            self.steps_day_avg,
            self.gym_load_sum,
            self.work_hours_sum,
            self.acwr,
        ]
        .iter()
        .any(|v| v.map(f64::is_finite).unwrap_or(false))
    }
}

/// One gauge (readiness or output) of the composite summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAxis {
    /// Recency-weighted blend, clamped [0,100]
    pub pct: Option<f64>,
    /// Raw point delta between the two most recent weeks
    pub trend: Option<i32>,
    pub subtitle: String,
}

/// Composite plan classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanCode {
    Push,
    Hold,
    Recover,
}

impl fmt::Display for PlanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Push => "PUSH",
            Self::Hold => "HOLD",
            Self::Recover => "RECOVER",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositePlan {
    pub code: PlanCode,
    /// Readiness minus output, None when either gauge is missing
    pub balance: Option<f64>,
    pub narrative: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeSeries {
    /// Per-week readiness values, newest first
    pub readiness: Vec<Option<f64>>,
    /// Per-week output values, newest first
    pub output: Vec<Option<f64>>,
}

/// Recency-weighted multi-week readiness/output gauges and the plan
/// classification they imply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSummary {
    pub readiness: CompositeAxis,
    pub output: CompositeAxis,
    pub plan: CompositePlan,
    pub series: CompositeSeries,
    /// Most recent complete week that fed the blend
    pub latest: Option<WeeklyRollupEntry>,
}

/// Capacity classification from the risk rule ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityLabel {
    Green,
    Amber,
    Red,
    /// Spare capacity: meaningfully under work/load with safe recovery signals
    Purple,
}

impl fmt::Display for CapacityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Green => "Green",
            Self::Amber => "Amber",
            Self::Red => "Red",
            Self::Purple => "Purple",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    pub label: CapacityLabel,
    /// Short operator-facing reasons for the classification
    pub reasons: Vec<String>,
}

/// Next-week action from the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanAction {
    Push,
    Sustain,
    Deload,
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Push => "Push",
            Self::Sustain => "Sustain",
            Self::Deload => "Deload",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub plan: PlanAction,
    /// The one lever to pull next week
    pub lever: String,
}

/// Missing-day tallies per source for the week window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCounts {
    pub activity: u32,
    pub sleep: u32,
    pub rhr: u32,
}

impl MissingCounts {
    pub fn total(&self) -> u32 {
        self.activity + self.sleep + self.rhr
    }
}

/// Confidence indicator shown whenever degradation paths were taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBadge {
    pub label: String,
    pub class_name: String,
}

/// One day of sleep observations. Timing fields are minutes since
/// midnight, already parsed at the provider boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepDay {
    pub date: NaiveDate,
    pub total_minutes: Option<f64>,
    /// Recorded per-day consistency score, when the source tracks one
    pub consistency_score: Option<f64>,
    pub start_minutes: Option<f64>,
    pub end_minutes: Option<f64>,
}

/// One day of activity observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub steps: Option<f64>,
    pub training_load_kg: Option<f64>,
    pub work_hours: Option<f64>,
    pub prs: Option<u32>,
}

/// One day of resting heart rate observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RhrDay {
    pub date: NaiveDate,
    pub bpm: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollup_entry_snake_case_contract() {
        let json = r#"{
            "week_start": "2025-06-14",
            "sleep_min_avg": 430.0,
            "rhr_avg": 52.0,
            "steps_day_avg": 9800.0,
            "gym_load_sum": 18500.0,
            "work_hours_sum": 44.0,
            "acwr": 1.05,
            "readiness_pct": 81.0,
            "output_pct": 77.0,
            "data_gaps": 0
        }"#;
        let entry: WeeklyRollupEntry = serde_json::from_str(json).unwrap();
        assert_eq!(
            entry.week_start,
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()
        );
        assert_eq!(entry.sleep_min_avg, Some(430.0));
        assert!(entry.is_complete());
        assert!(entry.has_data());
    }

    #[test]
    fn test_rollup_entry_legacy_camel_case_and_apostrophe() {
        let json = r#"{
            "weekStart": "'2025-06-07",
            "sleepMinAvg": 410.0,
            "rhrAvg": 54.0,
            "dataGaps": 2
        }"#;
        let entry: WeeklyRollupEntry = serde_json::from_str(json).unwrap();
        assert_eq!(
            entry.week_start,
            NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()
        );
        assert_eq!(entry.data_gaps, Some(2));
        assert!(!entry.is_complete());
    }

    #[test]
    fn test_rollup_entry_serializes_iso_week_start() {
        let entry = WeeklyRollupEntry {
            week_start: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            week_end: None,
            sleep_min_avg: None,
            sleep_sd_min: None,
            rhr_avg: None,
            steps_day_avg: None,
            gym_load_sum: None,
            work_hours_sum: None,
            prs_sum: None,
            acwr: None,
            readiness_pct: None,
            output_pct: None,
            data_gaps: Some(0),
            sleep_days_present: None,
            activity_days_present: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"week_start\":\"2025-06-14\""));

        let reparsed: WeeklyRollupEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed.week_start, entry.week_start);
    }

    #[test]
    fn test_goals_emptiness() {
        assert!(Goals::default().is_empty());
        let goals = Goals {
            steps: Some(70_000.0),
            ..Goals::default()
        };
        assert!(!goals.is_empty());
    }

    #[test]
    fn test_plan_code_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&PlanCode::Push).unwrap(), "\"PUSH\"");
        assert_eq!(
            serde_json::to_string(&PlanCode::Recover).unwrap(),
            "\"RECOVER\""
        );
    }

    #[test]
    fn test_band_classes_and_labels() {
        assert_eq!(ScoreBand::Success.status_class(), "status-success");
        assert_eq!(ScoreBand::Warning.label(), "Caution");
        assert_eq!(ScoreBand::Danger.label(), "Action");
        assert_eq!(ScoreBand::Neutral.status_class(), "status-neutral");
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(AcwrLabel::DataGaps.to_string(), "Data Gaps");
        assert_eq!(SleepBand::DataGap.to_string(), "Data gap");
        assert_eq!(CapacityLabel::Purple.to_string(), "Purple");
        assert_eq!(PlanAction::Deload.to_string(), "Deload");
    }
}
