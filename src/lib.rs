// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Health Report Engine
//!
//! A weekly health report card engine. It aggregates training, sleep,
//! work and recovery inputs for a Saturday-start week, scores them into
//! graded buckets, blends recent weeks into readiness and output gauges,
//! classifies capacity, and decides the next week's training plan.
//!
//! ## Features
//!
//! - **Goal-relative scoring**: Every metric is normalized to percent-of-goal
//! - **Load safety**: Acute:chronic workload estimation with spike handling
//! - **Sleep timing**: Three-tier consistency estimation with proxy fallback
//! - **Composite gauges**: Recency-weighted readiness and output across weeks
//! - **Plan decisions**: Capacity classification plus push/sustain/deload rules
//! - **Narrative copy**: Injected generator with a deterministic fallback
//!
//! ## Quick Start
//!
//! 1. Write a `health_report.toml` with your `[goals]`
//! 2. Point the engine at a rollup ledger file
//! 3. Run `health-report --reference-date 2025-06-14`
//!
//! ## Architecture
//!
//! The engine follows a modular architecture:
//! - **Providers**: Abstract data sources for weekly and historical inputs
//! - **Models**: Common data structures for metrics, scores and decisions
//! - **Scoring**: Normalization, estimators, buckets, composite, capacity
//! - **Narrative**: Report copy generation, validation and fallback
//! - **Pipeline**: Staged orchestration from raw inputs to a report bundle
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use health_report_engine::pipeline::ReportPipeline;
//! use health_report_engine::providers::memory::MemoryProvider;
//! use health_report_engine::models::Goals;
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let goals = Goals {
//!         steps: Some(70_000.0),
//!         weekly_training_load: Some(20_000.0),
//!         weekly_work_hours: Some(45.0),
//!         sleep_minutes: Some(444.0),
//!         resting_heart_rate: Some(52.0),
//!         ..Goals::default()
//!     };
//!     let provider = MemoryProvider::new(goals);
//!
//!     let pipeline = ReportPipeline::new(Box::new(provider), None);
//!     let reference = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
//!     let bundle = pipeline.run(reference).await?;
//!     println!("Plan: {:?}", bundle.decision.plan);
//!
//!     Ok(())
//! }
//! ```

/// Data providers for weekly and historical inputs
pub mod providers;

/// Common data models for metrics, scores and decisions
pub mod models;

/// Configuration management and persistence
pub mod config;

/// Scoring thresholds and narrative limits
pub mod constants;

/// Error taxonomy for the report engine
pub mod errors;

/// Week windows and date normalization
pub mod weeks;

/// Display formatting helpers
pub mod formatters;

/// Normalization, estimators, buckets, composite and capacity scoring
pub mod scoring;

/// Narrative generation, validation and fallback copy
pub mod narrative;

/// Staged report orchestration
pub mod pipeline;

/// Production logging and structured output
pub mod logging;
