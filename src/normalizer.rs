//! Attribute normalization
//!
//! Converts loosely typed telemetry readings into percentage-scale signals.
//! Every function here is total: bad input resolves to a fallback, never an
//! error.
//!
//! Scale detection follows one rule everywhere: a reading `<= 1` is a
//! fraction and is scaled by 100, anything larger is already a percentage.
//! This makes a genuine "1%" indistinguishable from "100%"; the rule is kept
//! as is because changing it changes scores.

use serde_json::Value;

/// Fallback fraction for a missing reading (50%)
pub const DEFAULT_FALLBACK: f64 = 0.5;

/// Duration used when a task reports none, or a non-positive one
pub const MIN_DURATION_SEC: f64 = 1.0;

/// Returned by [`clamp_percent`] for NaN/infinite aggregates
const NON_FINITE_PERCENT: f64 = 50.0;

/// Normalize an arbitrary reading to a 0-100 signal.
///
/// - absent, null, or non-numeric after coercion => `fallback * 100`
/// - `v <= 1` => `v * 100`
/// - `v > 1` => `v` unchanged (clamping happens on aggregates, not readings)
pub fn to_percent(value: Option<&Value>, fallback: f64) -> f64 {
    match value.and_then(coerce_number) {
        Some(v) => scale_to_percent(v),
        None => fallback * 100.0,
    }
}

/// Apply the fraction-or-percentage rule to a finite number
pub fn scale_to_percent(v: f64) -> f64 {
    if v <= 1.0 {
        v * 100.0
    } else {
        v
    }
}

/// Numeric coercion of a JSON value.
///
/// Numbers pass through, booleans map to 1/0, strings are parsed after
/// trimming (an empty string is 0). Arrays, objects and null are not numbers.
/// Non-finite results are rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    v.is_finite().then_some(v)
}

/// Loose truthiness: false for null, `false`, zero, NaN and the empty string
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Task engagement as a fraction (a missing score counts as 0.5)
pub fn engagement_fraction(score: Option<f64>) -> f64 {
    let score = score.unwrap_or(DEFAULT_FALLBACK);
    if score.is_finite() {
        scale_to_percent(score) / 100.0
    } else {
        DEFAULT_FALLBACK
    }
}

/// Task duration floored to one second
pub fn effective_duration(duration_seconds: Option<f64>) -> f64 {
    match duration_seconds {
        Some(d) if d.is_finite() && d > 0.0 => d.max(MIN_DURATION_SEC),
        _ => MIN_DURATION_SEC,
    }
}

/// Clamp an aggregate to [0, 100]; non-finite values become 50
pub fn clamp_percent(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        NON_FINITE_PERCENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_use_fallback() {
        assert_eq!(to_percent(None, DEFAULT_FALLBACK), 50.0);
        assert_eq!(to_percent(Some(&Value::Null), 0.3), 30.0);
    }

    #[test]
    fn test_fraction_is_scaled() {
        assert!((to_percent(Some(&json!(0.25)), 0.5) - 25.0).abs() < 1e-9);
        assert_eq!(to_percent(Some(&json!(0)), 0.5), 0.0);
        // Exactly 1.0 is read as a fraction
        assert_eq!(to_percent(Some(&json!(1)), 0.5), 100.0);
    }

    #[test]
    fn test_percentage_passes_through_unclamped() {
        assert_eq!(to_percent(Some(&json!(72)), 0.5), 72.0);
        assert_eq!(to_percent(Some(&json!(250)), 0.5), 250.0);
        assert_eq!(to_percent(Some(&json!(-0.2)), 0.5), -20.0);
    }

    #[test]
    fn test_non_numeric_uses_fallback() {
        assert_eq!(to_percent(Some(&json!("abc")), 0.5), 50.0);
        assert_eq!(to_percent(Some(&json!({"nested": 1})), 0.5), 50.0);
        assert_eq!(to_percent(Some(&json!([0.2])), 0.4), 40.0);
        assert_eq!(to_percent(Some(&json!("Infinity")), 0.5), 50.0);
    }

    #[test]
    fn test_string_and_bool_coercion() {
        assert_eq!(coerce_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_number(&json!("")), Some(0.0));
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!(false)), Some(0.0));
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(to_percent(Some(&json!(true)), 0.5), 100.0);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!([])));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_engagement_fraction_scales() {
        assert!((engagement_fraction(Some(0.8)) - 0.8).abs() < 1e-9);
        assert!((engagement_fraction(Some(80.0)) - 0.8).abs() < 1e-9);
        assert_eq!(engagement_fraction(None), 0.5);
        assert_eq!(engagement_fraction(Some(f64::NAN)), 0.5);
    }

    #[test]
    fn test_effective_duration_floor() {
        assert_eq!(effective_duration(None), 1.0);
        assert_eq!(effective_duration(Some(0.0)), 1.0);
        assert_eq!(effective_duration(Some(-30.0)), 1.0);
        assert_eq!(effective_duration(Some(0.4)), 1.0);
        assert_eq!(effective_duration(Some(90.0)), 90.0);
    }

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(120.0), 100.0);
        assert_eq!(clamp_percent(-3.0), 0.0);
        assert_eq!(clamp_percent(f64::NAN), 50.0);
        assert_eq!(clamp_percent(f64::INFINITY), 50.0);
        assert_eq!(clamp_percent(64.5), 64.5);
    }
}
