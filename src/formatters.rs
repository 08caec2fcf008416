// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Display formatting helpers for report copy.
//!
//! Every formatter is total: a missing value renders as an em-dash (or
//! "0" for delta counters) instead of erroring, so report assembly
//! never fails on a data gap.

/// Round minutes to "Xh Ym", omitting a zero hour or minute part.
/// Missing or non-finite values render as the fallback dash.
pub fn fmt_duration_minutes(minutes: Option<f64>) -> String {
    let m = match minutes {
        Some(v) if v.is_finite() => v.round() as i64,
        _ => return "—".to_string(),
    };
    let hours = m / 60;
    let rem = m % 60;
    if hours == 0 {
        format!("{rem}m")
    } else if rem == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {rem}m")
    }
}

/// Minutes as "Xh Ym" with both units always present, floored at zero.
pub fn fmt_h_min(minutes: f64) -> String {
    let m = if minutes.is_finite() {
        minutes.round().max(0.0) as i64
    } else {
        0
    };
    format!("{}h {}m", m / 60, m % 60)
}

/// Percent with a zero fallback, e.g. "87%".
pub fn fmt_pct(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    };
    format!("{}%", v.round() as i64)
}

/// Step counts in "12.3k" form above a thousand.
pub fn fmt_steps(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return "—".to_string(),
    };
    if v >= 1000.0 {
        format!("{}k", strip_trailing_zero(v / 1000.0))
    } else {
        format!("{}", v.round() as i64)
    }
}

/// Absolute step delta, "0" when missing.
pub fn fmt_steps_delta(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return "0".to_string(),
    };
    let thousands = v / 1000.0;
    if thousands.abs() >= 1.0 {
        format!("{}k", strip_trailing_zero(thousands.abs()))
    } else {
        format!("{}", v.abs().round() as i64)
    }
}

/// Rounded integer, "0" when missing.
pub fn fmt_int(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}", v.round() as i64),
        _ => "0".to_string(),
    }
}

/// Heart rate with its unit, e.g. "52 bpm".
pub fn fmt_bpm(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{} bpm", v.round() as i64),
        _ => "—".to_string(),
    }
}

/// Workload ratio with two decimals, e.g. "1.24".
pub fn fmt_acwr(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "—".to_string(),
    }
}

/// Fulfilment percent clamped to the display ceiling, e.g. "118%".
pub fn fmt_fulfilment(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", v.clamp(0.0, 130.0).round() as i64),
        _ => "—".to_string(),
    }
}

/// Percent or dash, e.g. "74%".
pub fn format_percent_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", v.round() as i64),
        _ => "—".to_string(),
    }
}

/// Signed percent delta; positive deltas carry an explicit plus.
pub fn format_percent_delta(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return "—".to_string(),
    };
    let rounded = v.round() as i64;
    if rounded > 0 {
        format!("+{rounded}%")
    } else {
        format!("{rounded}%")
    }
}

/// Trend arrow with signed percent, "→ 0%" at rest.
pub fn format_trend_arrow(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return "→ 0%".to_string(),
    };
    let rounded = v.round() as i64;
    if rounded == 0 {
        return "→ 0%".to_string();
    }
    let arrow = if rounded > 0 { "↑" } else { "↓" };
    let sign = if rounded > 0 { "+" } else { "" };
    format!("{arrow} {sign}{rounded}%")
}

/// Append an "(improving)" or "(sliding)" cue for trends beyond ±3 points.
pub fn append_trend_cue(text: &str, trend: Option<f64>) -> String {
    if text.is_empty() {
        return String::new();
    }
    match trend {
        Some(t) if t.is_finite() && t > 3.0 => format!("{text} (improving)"),
        Some(t) if t.is_finite() && t < -3.0 => format!("{text} (sliding)"),
        _ => text.to_string(),
    }
}

/// Compliance ratio like "4/5 (80%)". Over-achievement caps at 100%.
pub fn format_floor_compliance(actual: Option<f64>, target: f64) -> String {
    let a = match actual {
        Some(v) if v.is_finite() => v,
        _ => return "—".to_string(),
    };
    if !target.is_finite() || target <= 0.0 {
        return "—".to_string();
    }
    let pct = ((a.clamp(0.0, target) / target) * 100.0).round() as i64;
    format!(
        "{}/{} ({}%)",
        a.round() as i64,
        target.round() as i64,
        pct
    )
}

/// Label plus rounded percent, e.g. "Readiness 74%".
pub fn format_percent_headline(label: &str, pct: Option<f64>) -> String {
    match pct {
        Some(v) if v.is_finite() => format!("{label} {}%", v.round() as i64),
        _ => "—".to_string(),
    }
}

/// Arrow-prefixed delta versus a baseline. A zero delta renders the
/// current value unadorned; arrow direction reflects whether growth is
/// desirable for the metric.
pub fn format_delta_arrow<F>(
    current: Option<f64>,
    baseline: Option<f64>,
    formatter: F,
    positive_is_good: bool,
) -> String
where
    F: Fn(f64) -> String,
{
    let (c, b) = match (current, baseline) {
        (Some(c), Some(b)) if c.is_finite() && b.is_finite() => (c, b),
        _ => return "—".to_string(),
    };
    let delta = c - b;
    if delta == 0.0 {
        return formatter(c);
    }
    let arrow = if (delta > 0.0) == positive_is_good {
        "↑"
    } else {
        "↓"
    };
    format!("{arrow} {}", formatter(delta.abs()))
}

/// Oxford-comma list: "a", "a and b", "a, b, and c".
pub fn format_list(items: &[String]) -> String {
    match items.len() {
        0 => String::new(),
        1 => items[0].clone(),
        2 => format!("{} and {}", items[0], items[1]),
        _ => {
            let head = items[..items.len() - 1].join(", ");
            format!("{}, and {}", head, items[items.len() - 1])
        }
    }
}

fn strip_trailing_zero(value: f64) -> String {
    let text = format!("{value:.1}");
    text.strip_suffix(".0").unwrap_or(&text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_duration_minutes() {
        assert_eq!(fmt_duration_minutes(Some(452.0)), "7h 32m");
        assert_eq!(fmt_duration_minutes(Some(420.0)), "7h");
        assert_eq!(fmt_duration_minutes(Some(45.0)), "45m");
        assert_eq!(fmt_duration_minutes(None), "—");
    }

    #[test]
    fn test_fmt_h_min_always_both_units() {
        assert_eq!(fmt_h_min(452.0), "7h 32m");
        assert_eq!(fmt_h_min(420.0), "7h 0m");
        assert_eq!(fmt_h_min(45.0), "0h 45m");
        assert_eq!(fmt_h_min(-10.0), "0h 0m");
    }

    #[test]
    fn test_fmt_pct_zero_fallback() {
        assert_eq!(fmt_pct(Some(87.4)), "87%");
        assert_eq!(fmt_pct(None), "0%");
    }

    #[test]
    fn test_fmt_steps() {
        assert_eq!(fmt_steps(Some(12_340.0)), "12.3k");
        assert_eq!(fmt_steps(Some(12_000.0)), "12k");
        assert_eq!(fmt_steps(Some(950.0)), "950");
        assert_eq!(fmt_steps(None), "—");
    }

    #[test]
    fn test_fmt_steps_delta() {
        assert_eq!(fmt_steps_delta(Some(-1500.0)), "1.5k");
        assert_eq!(fmt_steps_delta(Some(640.0)), "640");
        assert_eq!(fmt_steps_delta(Some(-640.0)), "640");
        assert_eq!(fmt_steps_delta(None), "0");
    }

    #[test]
    fn test_fmt_bpm_and_acwr() {
        assert_eq!(fmt_bpm(Some(51.6)), "52 bpm");
        assert_eq!(fmt_bpm(None), "—");
        assert_eq!(fmt_acwr(Some(1.237)), "1.24");
        assert_eq!(fmt_acwr(None), "—");
    }

    #[test]
    fn test_fmt_fulfilment_clamps_to_ceiling() {
        assert_eq!(fmt_fulfilment(Some(145.0)), "130%");
        assert_eq!(fmt_fulfilment(Some(-5.0)), "0%");
        assert_eq!(fmt_fulfilment(Some(96.4)), "96%");
        assert_eq!(fmt_fulfilment(None), "—");
    }

    #[test]
    fn test_format_percent_delta_signs() {
        assert_eq!(format_percent_delta(Some(4.2)), "+4%");
        assert_eq!(format_percent_delta(Some(-4.2)), "-4%");
        assert_eq!(format_percent_delta(Some(0.2)), "0%");
        assert_eq!(format_percent_delta(None), "—");
    }

    #[test]
    fn test_format_trend_arrow() {
        assert_eq!(format_trend_arrow(Some(6.0)), "↑ +6%");
        assert_eq!(format_trend_arrow(Some(-6.0)), "↓ -6%");
        assert_eq!(format_trend_arrow(Some(0.3)), "→ 0%");
        assert_eq!(format_trend_arrow(None), "→ 0%");
    }

    #[test]
    fn test_append_trend_cue() {
        assert_eq!(append_trend_cue("Sleep 92%", Some(5.0)), "Sleep 92% (improving)");
        assert_eq!(append_trend_cue("Sleep 92%", Some(-5.0)), "Sleep 92% (sliding)");
        assert_eq!(append_trend_cue("Sleep 92%", Some(2.0)), "Sleep 92%");
        assert_eq!(append_trend_cue("", Some(10.0)), "");
    }

    #[test]
    fn test_format_floor_compliance() {
        assert_eq!(format_floor_compliance(Some(4.0), 5.0), "4/5 (80%)");
        assert_eq!(format_floor_compliance(Some(7.0), 5.0), "7/5 (100%)");
        assert_eq!(format_floor_compliance(None, 5.0), "—");
        assert_eq!(format_floor_compliance(Some(4.0), 0.0), "—");
    }

    #[test]
    fn test_format_percent_headline() {
        assert_eq!(format_percent_headline("Readiness", Some(74.4)), "Readiness 74%");
        assert_eq!(format_percent_headline("Readiness", None), "—");
    }

    #[test]
    fn test_format_delta_arrow() {
        let f = |v: f64| format!("{} bpm", v.round() as i64);
        assert_eq!(format_delta_arrow(Some(54.0), Some(52.0), f, false), "↓ 2 bpm");
        assert_eq!(format_delta_arrow(Some(50.0), Some(52.0), f, false), "↑ 2 bpm");
        assert_eq!(format_delta_arrow(Some(52.0), Some(52.0), f, false), "52 bpm");
        assert_eq!(format_delta_arrow(None, Some(52.0), f, false), "—");
    }

    #[test]
    fn test_format_list_oxford() {
        assert_eq!(format_list(&[]), "");
        assert_eq!(format_list(&["sleep".into()]), "sleep");
        assert_eq!(format_list(&["sleep".into(), "steps".into()]), "sleep and steps");
        assert_eq!(
            format_list(&["sleep".into(), "steps".into(), "load".into()]),
            "sleep, steps, and load"
        );
    }
}
