// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! In-memory provider for tests and CLI fixtures.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ReportError;
use crate::models::{ActivityDay, Goals, RhrDay, SleepDay, WeeklyRollupEntry};
use crate::weeks::WeekWindow;

use super::DataProvider;

/// Fixture-backed provider. Day rows are fixed at construction; rollup
/// upserts land in memory so append behavior is observable from tests.
pub struct MemoryProvider {
    goals: Goals,
    sleep: Vec<SleepDay>,
    activity: Vec<ActivityDay>,
    heart_rate: Vec<RhrDay>,
    rollups: RwLock<Vec<WeeklyRollupEntry>>,
}

impl MemoryProvider {
    pub fn new(goals: Goals) -> Self {
        Self {
            goals,
            sleep: Vec::new(),
            activity: Vec::new(),
            heart_rate: Vec::new(),
            rollups: RwLock::new(Vec::new()),
        }
    }

    pub fn with_sleep(mut self, days: Vec<SleepDay>) -> Self {
        self.sleep = days;
        self
    }

    pub fn with_activity(mut self, days: Vec<ActivityDay>) -> Self {
        self.activity = days;
        self
    }

    pub fn with_rhr(mut self, days: Vec<RhrDay>) -> Self {
        self.heart_rate = days;
        self
    }

    pub fn with_rollups(self, rollups: Vec<WeeklyRollupEntry>) -> Self {
        Self {
            rollups: RwLock::new(rollups),
            ..self
        }
    }

    /// Snapshot of the stored rollups, for asserting append behavior.
    pub async fn stored_rollups(&self) -> Vec<WeeklyRollupEntry> {
        self.rollups.read().await.clone()
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    async fn goals(&self) -> Result<Goals, ReportError> {
        Ok(self.goals.clone())
    }

    async fn sleep_days(&self, window: &WeekWindow) -> Result<Vec<SleepDay>, ReportError> {
        Ok(self
            .sleep
            .iter()
            .filter(|d| window.contains(d.date))
            .cloned()
            .collect())
    }

    async fn activity_days(&self, window: &WeekWindow) -> Result<Vec<ActivityDay>, ReportError> {
        Ok(self
            .activity
            .iter()
            .filter(|d| window.contains(d.date))
            .cloned()
            .collect())
    }

    async fn rhr_days(&self, window: &WeekWindow) -> Result<Vec<RhrDay>, ReportError> {
        Ok(self
            .heart_rate
            .iter()
            .filter(|d| window.contains(d.date))
            .cloned()
            .collect())
    }

    async fn rollup_history(&self, limit: usize) -> Result<Vec<WeeklyRollupEntry>, ReportError> {
        let mut rows = self.rollups.read().await.clone();
        rows.sort_by_key(|r| r.week_start);
        if rows.len() > limit {
            rows.drain(..rows.len() - limit);
        }
        Ok(rows)
    }

    async fn upsert_rollup(&self, entry: WeeklyRollupEntry) -> Result<(), ReportError> {
        let mut rows = self.rollups.write().await;
        match rows.iter_mut().find(|r| r.week_start == entry.week_start) {
            Some(existing) => *existing = entry,
            None => rows.push(entry),
        }
        rows.sort_by_key(|r| r.week_start);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[tokio::test]
    async fn test_window_filtering() {
        let provider = MemoryProvider::new(Goals::default()).with_activity(vec![
            ActivityDay {
                date: date(14),
                steps: Some(9000.0),
                ..ActivityDay::default()
            },
            ActivityDay {
                date: date(28),
                steps: Some(1000.0),
                ..ActivityDay::default()
            },
        ]);
        let window = WeekWindow::containing(date(14));
        let rows = provider.activity_days(&window).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].steps, Some(9000.0));
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_week_start() {
        let provider = MemoryProvider::new(Goals::default());
        let mut entry = WeeklyRollupEntry {
            week_start: date(14),
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
            data_gaps: Some(2),
            sleep_days_present: None,
            activity_days_present: None,
        };
        provider.upsert_rollup(entry.clone()).await.unwrap();
        entry.data_gaps = Some(0);
        provider.upsert_rollup(entry).await.unwrap();
        let stored = provider.stored_rollups().await;
        assert_eq!(stored.len(), 1);
        assert!(stored[0].is_complete());
    }
}
