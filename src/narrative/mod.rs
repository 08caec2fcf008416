// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Narrative Generation
//!
//! Report copy is produced by an injected [`NarrativeGenerator`]. The
//! pipeline always builds the deterministic fallback first, then asks
//! the generator for richer copy, validates it against the report
//! contract, and merges it over the fallback. A failed or invalid
//! response degrades the run but never aborts it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ReportError;

pub mod fallback;
pub mod http;
pub mod validate;

pub use fallback::{build_fallback_narrative, FallbackInputs};
pub use http::HttpNarrativeGenerator;
pub use validate::validate_narrative;

/// Scores handed to the generator, already rounded for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactScores {
    pub overall: f64,
    pub activity: f64,
    pub recovery: f64,
    pub readiness: f64,
}

/// Goal-fulfilment percentages per domain, None when no goal was set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactFulfilment {
    pub work_pct: Option<f64>,
    pub strength_pct: Option<f64>,
    pub fitness_pct: Option<f64>,
    pub sleep_pct: Option<f64>,
    pub rhr_pct: Option<f64>,
}

/// The prompt-context payload POSTed to the narrative service.
///
/// Everything here is already computed and display-safe; the service
/// only turns numbers into prose.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactBundle {
    pub week_label: String,
    pub iso_label: String,
    pub scores: FactScores,
    pub fulfilment: FactFulfilment,
    pub sleep_consistency_score: Option<f64>,
    pub sleep_consistency_label: String,
    pub acwr_value: Option<f64>,
    pub acwr_label: String,
    pub capacity: String,
    pub capacity_reasons: Vec<String>,
    pub plan: String,
    pub lever: String,
    pub data_gaps: u32,
}

/// One titled section of the report body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// The three fixed report sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSections {
    #[serde(default)]
    pub activity: NarrativeSection,
    #[serde(default)]
    pub recovery: NarrativeSection,
    #[serde(default)]
    pub readiness: NarrativeSection,
}

/// The generator's plan restatement. Display mapping and coercion
/// happen later, so this stays free text here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeDecision {
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub lever: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// A complete narrative payload, external or fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub sections: NarrativeSections,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub decision: NarrativeDecision,
    #[serde(default, alias = "coachCall")]
    pub coach_call: String,
    /// Producing model identifier, "fallback" for deterministic copy
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Source of report prose. Implementations may call out over the
/// network; the pipeline treats every failure as recoverable.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, facts: &FactBundle) -> Result<Narrative, ReportError>;

    fn generator_name(&self) -> &'static str;
}

/// Merge an already-validated external narrative over the fallback.
///
/// Field groups only replace the fallback when the external copy
/// actually carried them, so a sparse-but-valid response still renders
/// a complete report.
pub fn merge_narrative(external: Option<Narrative>, fallback: Narrative) -> (Narrative, bool) {
    let Some(ext) = external else {
        return (fallback, true);
    };

    let mut merged = fallback;
    if !ext.headline.is_empty() {
        merged.headline = ext.headline;
    }
    if ext.insights.len() == crate::constants::narrative::INSIGHT_COUNT {
        merged.insights = ext.insights;
    }
    for (target, source) in [
        (&mut merged.sections.activity, ext.sections.activity),
        (&mut merged.sections.recovery, ext.sections.recovery),
        (&mut merged.sections.readiness, ext.sections.readiness),
    ] {
        if !source.title.is_empty() {
            target.title = source.title;
        }
        if !source.bullets.is_empty() {
            target.bullets = source.bullets;
        }
        if !source.notes.is_empty() {
            target.notes = source.notes;
        }
    }
    if !ext.recommendations.is_empty() {
        merged.recommendations = ext.recommendations;
    }
    if !ext.decision.plan.is_empty() {
        merged.decision.plan = ext.decision.plan;
    }
    if !ext.decision.lever.is_empty() {
        merged.decision.lever = ext.decision.lever;
    }
    if !ext.decision.notes.is_empty() {
        merged.decision.notes = ext.decision.notes;
    }
    if !ext.coach_call.is_empty() {
        merged.coach_call = ext.coach_call;
    }
    if !ext.model.is_empty() {
        merged.model = ext.model;
    }
    if !ext.warnings.is_empty() {
        merged.warnings = ext.warnings;
    }
    (merged, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> Narrative {
        Narrative {
            headline: "Fallback headline".into(),
            insights: vec!["a".into(), "b".into(), "c".into()],
            recommendations: vec!["r1".into(), "r2".into(), "r3".into(), "r4".into()],
            decision: NarrativeDecision {
                plan: "Sustain".into(),
                lever: "Keep core habits steady".into(),
                notes: vec![],
            },
            coach_call: "Hold steady.".into(),
            model: "fallback".into(),
            ..Narrative::default()
        }
    }

    #[test]
    fn test_absent_external_degrades_to_fallback() {
        let (merged, degraded) = merge_narrative(None, fallback());
        assert!(degraded);
        assert_eq!(merged.model, "fallback");
    }

    #[test]
    fn test_merge_keeps_fallback_for_sparse_fields() {
        let ext = Narrative {
            headline: "Strong week".into(),
            insights: vec!["only one".into()],
            model: "svc-1".into(),
            ..Narrative::default()
        };
        let (merged, degraded) = merge_narrative(Some(ext), fallback());
        assert!(!degraded);
        assert_eq!(merged.headline, "Strong week");
        // wrong insight count keeps the fallback trio
        assert_eq!(merged.insights.len(), 3);
        assert_eq!(merged.decision.plan, "Sustain");
        assert_eq!(merged.model, "svc-1");
    }

    #[test]
    fn test_narrative_parses_camel_case_coach_call() {
        let json = r#"{"headline": "h", "coachCall": "rest up"}"#;
        let parsed: Narrative = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.coach_call, "rest up");
    }
}
