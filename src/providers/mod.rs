// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Providers
//!
//! Abstract sources for day-level observations and the persisted weekly
//! rollup ledger. The pipeline only speaks to [`DataProvider`], so tests
//! run against the in-memory provider while the CLI uses the file-backed
//! ledger.
//!
//! Aggregation from day rows to weekly and trailing baselines lives here
//! as shared helpers, so every provider hands back raw rows and the math
//! stays in one place.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::ReportError;
use crate::models::{
    ActivityDay, Goals, MissingCounts, RhrDay, SleepDay, TrendMetrics, WeeklyMetrics,
    WeeklyRollupEntry,
};
use crate::weeks::WeekWindow;

pub mod ledger;
pub mod memory;

pub use ledger::LedgerProvider;
pub use memory::MemoryProvider;

/// A source of observations and rollup history for the report pipeline.
///
/// Day-row queries take an explicit window so the same methods serve the
/// report week and the 28-day trailing baseline. Implementations return
/// empty vectors, not errors, when a window simply has no rows.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// User targets, loaded from wherever this source keeps them.
    async fn goals(&self) -> Result<Goals, ReportError>;

    /// Sleep rows with dates inside `window`.
    async fn sleep_days(&self, window: &WeekWindow) -> Result<Vec<SleepDay>, ReportError>;

    /// Activity rows (steps, load, work, PRs) with dates inside `window`.
    async fn activity_days(&self, window: &WeekWindow) -> Result<Vec<ActivityDay>, ReportError>;

    /// Resting heart rate rows with dates inside `window`.
    async fn rhr_days(&self, window: &WeekWindow) -> Result<Vec<RhrDay>, ReportError>;

    /// The most recent `limit` rollup entries, oldest first.
    async fn rollup_history(&self, limit: usize) -> Result<Vec<WeeklyRollupEntry>, ReportError>;

    /// Insert or replace the rollup row keyed by `entry.week_start`.
    async fn upsert_rollup(&self, entry: WeeklyRollupEntry) -> Result<(), ReportError>;

    fn provider_name(&self) -> &'static str;
}

#[async_trait]
impl<T: DataProvider + ?Sized> DataProvider for std::sync::Arc<T> {
    async fn goals(&self) -> Result<Goals, ReportError> {
        (**self).goals().await
    }

    async fn sleep_days(&self, window: &WeekWindow) -> Result<Vec<SleepDay>, ReportError> {
        (**self).sleep_days(window).await
    }

    async fn activity_days(&self, window: &WeekWindow) -> Result<Vec<ActivityDay>, ReportError> {
        (**self).activity_days(window).await
    }

    async fn rhr_days(&self, window: &WeekWindow) -> Result<Vec<RhrDay>, ReportError> {
        (**self).rhr_days(window).await
    }

    async fn rollup_history(&self, limit: usize) -> Result<Vec<WeeklyRollupEntry>, ReportError> {
        (**self).rollup_history(limit).await
    }

    async fn upsert_rollup(&self, entry: WeeklyRollupEntry) -> Result<(), ReportError> {
        (**self).upsert_rollup(entry).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Collapse one week of day rows into the weekly observation.
///
/// Sleep, RHR and steps average over the rows present (an absent value
/// on a present row counts as zero, matching the ledger's history).
/// Load and work hours sum across the week. A zero PR total reads as
/// "none logged" rather than a recorded zero.
pub fn aggregate_week(
    sleep: &[SleepDay],
    activity: &[ActivityDay],
    rhr: &[RhrDay],
) -> WeeklyMetrics {
    let sleep_vals: Vec<f64> = sleep
        .iter()
        .map(|d| d.total_minutes.unwrap_or(0.0))
        .collect();
    let rhr_vals: Vec<f64> = rhr.iter().map(|d| d.bpm.unwrap_or(0.0)).collect();
    let step_vals: Vec<f64> = activity.iter().map(|d| d.steps.unwrap_or(0.0)).collect();

    let load_sum: f64 = activity
        .iter()
        .map(|d| d.training_load_kg.unwrap_or(0.0))
        .sum();
    let work_sum: f64 = activity.iter().map(|d| d.work_hours.unwrap_or(0.0)).sum();
    let prs_sum: u32 = activity.iter().map(|d| d.prs.unwrap_or(0)).sum();

    WeeklyMetrics {
        steps: mean(&step_vals),
        training_load_kg: (!activity.is_empty()).then_some(load_sum),
        work_hours: (!activity.is_empty()).then_some(work_sum),
        sleep_minutes: mean(&sleep_vals),
        resting_heart_rate: mean(&rhr_vals),
        prs: (prs_sum > 0).then_some(prs_sum),
        deep_work_pct: None,
    }
}

/// Collapse the 28-day trailing window into the baseline.
///
/// Daily-average metrics (sleep, RHR, steps) average over rows present;
/// the summed metrics (load, work) divide the span total by four to give
/// a per-week baseline comparable with the weekly sums.
pub fn aggregate_trend(
    sleep: &[SleepDay],
    activity: &[ActivityDay],
    rhr: &[RhrDay],
) -> TrendMetrics {
    let sleep_vals: Vec<f64> = sleep
        .iter()
        .map(|d| d.total_minutes.unwrap_or(0.0))
        .collect();
    let rhr_vals: Vec<f64> = rhr.iter().map(|d| d.bpm.unwrap_or(0.0)).collect();
    let step_vals: Vec<f64> = activity.iter().map(|d| d.steps.unwrap_or(0.0)).collect();

    let load_sum: f64 = activity
        .iter()
        .map(|d| d.training_load_kg.unwrap_or(0.0))
        .sum();
    let work_sum: f64 = activity.iter().map(|d| d.work_hours.unwrap_or(0.0)).sum();

    TrendMetrics {
        steps: mean(&step_vals),
        training_load_kg: (!activity.is_empty()).then_some(load_sum / 4.0),
        work_hours: (!activity.is_empty()).then_some(work_sum / 4.0),
        sleep_minutes: mean(&sleep_vals),
        resting_heart_rate: mean(&rhr_vals),
    }
}

/// Calendar days of `window` with no matching row. Duplicate rows on
/// one day count once.
pub fn missing_days(window: &WeekWindow, dates: &[NaiveDate]) -> u32 {
    let mut seen: Vec<NaiveDate> = dates
        .iter()
        .copied()
        .filter(|d| window.contains(*d))
        .collect();
    seen.sort_unstable();
    seen.dedup();
    7u32.saturating_sub(seen.len() as u32)
}

/// Per-source missing-day tally for the report week.
pub fn missing_counts(
    window: &WeekWindow,
    sleep: &[SleepDay],
    activity: &[ActivityDay],
    rhr: &[RhrDay],
) -> MissingCounts {
    let sleep_dates: Vec<NaiveDate> = sleep.iter().map(|d| d.date).collect();
    let activity_dates: Vec<NaiveDate> = activity.iter().map(|d| d.date).collect();
    let rhr_dates: Vec<NaiveDate> = rhr.iter().map(|d| d.date).collect();
    MissingCounts {
        activity: missing_days(window, &activity_dates),
        sleep: missing_days(window, &sleep_dates),
        rhr: missing_days(window, &rhr_dates),
    }
}

/// Days in the rows with a step count at or above `floor`.
pub fn days_at_floor(activity: &[ActivityDay], floor: f64) -> u32 {
    activity
        .iter()
        .filter(|d| d.steps.unwrap_or(0.0) >= floor)
        .count() as u32
}
