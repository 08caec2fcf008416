// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Narrative contract validation.
//!
//! Over-long strings are normalized (trimmed and truncated), never
//! rejected; structural problems collect into one schema error so the
//! log shows every violation from a single bad response.

use crate::constants::narrative::{
    BANNED_SYMBOLS, BANNED_TOKENS, BULLET_CHAR_LIMIT, COACH_CALL_CHAR_LIMIT, INSIGHT_COUNT,
    MIN_RECOMMENDATIONS, RECOMMENDATION_CHAR_LIMIT, RECOMMENDATION_WORD_LIMIT,
    SECTION_TITLE_LIMIT,
};
use crate::errors::ReportError;

use super::{Narrative, NarrativeSection};

const MAX_BULLETS: usize = 4;
const MAX_NOTES: usize = 2;
const MAX_RECOMMENDATIONS: usize = 5;
const MAX_DECISION_NOTES: usize = 3;
const PLAN_CHAR_LIMIT: usize = 40;

fn normalize_string(value: &str, max_chars: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim()
        .to_string()
}

fn normalize_array(values: &[String], max_items: usize, max_chars: usize) -> Vec<String> {
    values
        .iter()
        .map(|v| normalize_string(v, max_chars))
        .filter(|v| !v.is_empty())
        .take(max_items)
        .collect()
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// First banned token or symbol found in `text`, if any. Tokens match
/// case-insensitively on word boundaries so "sleep disd" stays legal
/// while "SD" and "sd" do not.
fn banned_term(text: &str) -> Option<String> {
    if let Some(symbol) = text.chars().find(|c| BANNED_SYMBOLS.contains(c)) {
        return Some(symbol.to_string());
    }
    let upper = text.to_uppercase();
    let bytes = upper.as_bytes();
    for token in BANNED_TOKENS {
        let mut from = 0;
        while let Some(pos) = upper[from..].find(token) {
            let at = from + pos;
            let end = at + token.len();
            let before_ok = at == 0 || !bytes[at - 1].is_ascii_alphanumeric();
            let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphanumeric();
            if before_ok && after_ok {
                return Some((*token).to_string());
            }
            from = at + 1;
        }
    }
    None
}

fn normalize_section(
    key: &str,
    section: &NarrativeSection,
    errors: &mut Vec<String>,
) -> NarrativeSection {
    let title = normalize_string(&section.title, SECTION_TITLE_LIMIT);
    if title.is_empty() {
        errors.push(format!("{key}_title_missing"));
    }
    let bullets = normalize_array(&section.bullets, MAX_BULLETS, BULLET_CHAR_LIMIT);
    if bullets.is_empty() {
        errors.push(format!("{key}_bullets_missing"));
    }
    NarrativeSection {
        title,
        bullets,
        notes: normalize_array(&section.notes, MAX_NOTES, BULLET_CHAR_LIMIT),
    }
}

/// Normalize a narrative against the report contract.
///
/// Returns the cleaned-up narrative, or a [`ReportError::NarrativeSchema`]
/// listing every violation.
pub fn validate_narrative(raw: &Narrative) -> Result<Narrative, ReportError> {
    let mut errors = Vec::new();
    let mut out = Narrative {
        model: normalize_string(&raw.model, PLAN_CHAR_LIMIT),
        ..Narrative::default()
    };

    out.headline = normalize_string(&raw.headline, SECTION_TITLE_LIMIT);
    if out.headline.is_empty() {
        errors.push("headline_missing".to_string());
    }

    out.insights = normalize_array(&raw.insights, INSIGHT_COUNT, BULLET_CHAR_LIMIT);
    if out.insights.len() != INSIGHT_COUNT {
        errors.push("insights_length".to_string());
    }

    out.sections.activity = normalize_section("activity", &raw.sections.activity, &mut errors);
    out.sections.recovery = normalize_section("recovery", &raw.sections.recovery, &mut errors);
    out.sections.readiness = normalize_section("readiness", &raw.sections.readiness, &mut errors);

    out.recommendations = normalize_array(
        &raw.recommendations,
        MAX_RECOMMENDATIONS,
        RECOMMENDATION_CHAR_LIMIT,
    );
    if out.recommendations.len() < MIN_RECOMMENDATIONS {
        errors.push("recommendations_insufficient".to_string());
    }
    if out
        .recommendations
        .iter()
        .any(|rec| word_count(rec) > RECOMMENDATION_WORD_LIMIT)
    {
        errors.push("recommendation_word_limit".to_string());
    }

    out.decision.plan = normalize_string(&raw.decision.plan, PLAN_CHAR_LIMIT);
    if out.decision.plan.is_empty() {
        errors.push("decision_plan_missing".to_string());
    }
    out.decision.lever = normalize_string(&raw.decision.lever, BULLET_CHAR_LIMIT);
    if out.decision.lever.is_empty() {
        errors.push("decision_lever_missing".to_string());
    }
    out.decision.notes = normalize_array(&raw.decision.notes, MAX_DECISION_NOTES, BULLET_CHAR_LIMIT);

    out.coach_call = normalize_string(&raw.coach_call, COACH_CALL_CHAR_LIMIT);
    if out.coach_call.is_empty() {
        errors.push("coach_call_missing".to_string());
    } else if let Some(term) = banned_term(&out.coach_call) {
        errors.push(format!("coach_call_banned_term:{term}"));
    }

    out.warnings = normalize_array(&raw.warnings, MAX_BULLETS, BULLET_CHAR_LIMIT);

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(ReportError::NarrativeSchema(errors))
    }
}
