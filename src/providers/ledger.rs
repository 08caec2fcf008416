// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! File-backed ledger provider.
//!
//! A single JSON document holds day rows for each source plus the
//! persisted weekly rollups. Missing file means an empty ledger, the
//! first upsert creates it. Reads tolerate the legacy camelCase field
//! names and spreadsheet date formats via the model deserializers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::ReportError;
use crate::models::{ActivityDay, Goals, RhrDay, SleepDay, WeeklyRollupEntry};
use crate::weeks::WeekWindow;

use super::DataProvider;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    sleep: Vec<SleepDay>,
    #[serde(default)]
    activity: Vec<ActivityDay>,
    #[serde(default, alias = "heartRate")]
    heart_rate: Vec<RhrDay>,
    #[serde(default, alias = "weeklyRollups")]
    rollups: Vec<WeeklyRollupEntry>,
}

/// Production provider reading and writing one JSON ledger file.
#[derive(Debug)]
pub struct LedgerProvider {
    path: PathBuf,
    goals: Goals,
    state: RwLock<LedgerFile>,
}

impl LedgerProvider {
    /// Open the ledger at `path`. A missing file is an empty ledger;
    /// an unreadable or malformed one is a provider error.
    pub fn open(path: impl AsRef<Path>, goals: Goals) -> Result<Self, ReportError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                ReportError::Provider(format!("reading ledger {}: {e}", path.display()))
            })?;
            serde_json::from_str(&raw).map_err(|e| {
                ReportError::Provider(format!("parsing ledger {}: {e}", path.display()))
            })?
        } else {
            debug!(path = %path.display(), "ledger file absent, starting empty");
            LedgerFile::default()
        };
        Ok(Self {
            path,
            goals,
            state: RwLock::new(state),
        })
    }

    fn persist(&self, state: &LedgerFile) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| ReportError::Provider(format!("serializing ledger: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            ReportError::Provider(format!("writing ledger {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl DataProvider for LedgerProvider {
    async fn goals(&self) -> Result<Goals, ReportError> {
        Ok(self.goals.clone())
    }

    async fn sleep_days(&self, window: &WeekWindow) -> Result<Vec<SleepDay>, ReportError> {
        let state = self.state.read().await;
        Ok(state
            .sleep
            .iter()
            .filter(|d| window.contains(d.date))
            .cloned()
            .collect())
    }

    async fn activity_days(&self, window: &WeekWindow) -> Result<Vec<ActivityDay>, ReportError> {
        let state = self.state.read().await;
        Ok(state
            .activity
            .iter()
            .filter(|d| window.contains(d.date))
            .cloned()
            .collect())
    }

    async fn rhr_days(&self, window: &WeekWindow) -> Result<Vec<RhrDay>, ReportError> {
        let state = self.state.read().await;
        Ok(state
            .heart_rate
            .iter()
            .filter(|d| window.contains(d.date))
            .cloned()
            .collect())
    }

    async fn rollup_history(&self, limit: usize) -> Result<Vec<WeeklyRollupEntry>, ReportError> {
        let state = self.state.read().await;
        let mut rows: Vec<WeeklyRollupEntry> = state.rollups.clone();
        rows.sort_by_key(|r| r.week_start);
        if rows.len() > limit {
            rows.drain(..rows.len() - limit);
        }
        Ok(rows)
    }

    async fn upsert_rollup(&self, entry: WeeklyRollupEntry) -> Result<(), ReportError> {
        let mut state = self.state.write().await;
        let week_start = entry.week_start;
        match state
            .rollups
            .iter_mut()
            .find(|r| r.week_start == week_start)
        {
            Some(existing) => *existing = entry,
            None => state.rollups.push(entry),
        }
        state.rollups.sort_by_key(|r| r.week_start);
        self.persist(&state)?;
        info!(week_start = %week_start, path = %self.path.display(), "rollup persisted");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "ledger"
    }
}
