//! Domain aggregation
//!
//! Builds per-task signals for the four behavioral domains and folds them into
//! session scores using one engagement- and duration-based weight per task.

use crate::normalizer::{
    clamp_percent, effective_duration, engagement_fraction, DEFAULT_FALLBACK,
};
use crate::types::{DomainScores, TaskRecord};

/// Social communication capability attributes
pub const SOCIAL_KEYS: [&str; 4] = [
    "eyeContact",
    "nameResponse",
    "jointAttention",
    "socialReciprocity",
];

/// Single-value social score used when the attribute mean is exactly zero
pub const SOCIAL_SCORE_KEY: &str = "socialScore";

/// Repetitive behavior risk attributes
pub const REPETITIVE_KEYS: [&str; 2] = ["repetitiveIntensity", "repetitiveFrequency"];

/// Sensory risk attributes
pub const SENSORY_KEYS: [&str; 2] = ["sensoryHypo", "sensoryHyper"];

/// Motor capability attributes
pub const MOTOR_KEYS: [&str; 4] = ["fineMotor", "grossMotor", "motorPlanning", "imitation"];

/// Prior for an unreported repetitive behavior reading (30% risk)
const REPETITIVE_PRIOR: f64 = 0.3;

/// Per-task domain signals on a 0-100 capability scale (before weighting)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskSignals {
    pub social: f64,
    pub repetitive: f64,
    pub sensory: f64,
    pub motor: f64,
}

/// Weight of a task in every domain average.
///
/// `engagement * ln(1 + duration)`, with engagement as a fraction floored at
/// zero and duration floored at one second, so the weight is never negative.
pub fn task_weight(task: &TaskRecord) -> f64 {
    let engagement = engagement_fraction(task.engagement_score).max(0.0);
    let duration = effective_duration(task.duration_seconds);
    engagement * duration.ln_1p()
}

/// Compute the unweighted domain signals for one task
pub fn task_signals(task: &TaskRecord) -> TaskSignals {
    let attrs = &task.raw_data;

    let social_mean = mean(SOCIAL_KEYS.map(|k| attrs.percent(k, DEFAULT_FALLBACK)));
    // A mean of exactly zero (or NaN) defers to the single social score,
    // which itself defaults to the task's engagement.
    let social = if social_mean == 0.0 || social_mean.is_nan() {
        attrs.percent(SOCIAL_SCORE_KEY, engagement_fraction(task.engagement_score))
    } else {
        social_mean
    };

    let repetitive_risk = mean(REPETITIVE_KEYS.map(|k| attrs.percent(k, REPETITIVE_PRIOR)));
    let sensory_risk = mean(SENSORY_KEYS.map(|k| attrs.percent(k, DEFAULT_FALLBACK)));
    let motor = mean(MOTOR_KEYS.map(|k| attrs.percent(k, DEFAULT_FALLBACK)));

    TaskSignals {
        social,
        repetitive: 100.0 - repetitive_risk,
        sensory: 100.0 - sensory_risk,
        motor,
    }
}

fn mean<const N: usize>(values: [f64; N]) -> f64 {
    values.iter().sum::<f64>() / N as f64
}

/// Folds tasks into weighted domain scores
pub struct DomainAggregator {
    fallbacks: DomainScores,
}

impl Default for DomainAggregator {
    fn default() -> Self {
        Self::new(DomainScores::NEUTRAL)
    }
}

impl DomainAggregator {
    /// Create an aggregator with the scores to report when no task carries weight
    pub fn new(fallbacks: DomainScores) -> Self {
        Self { fallbacks }
    }

    /// Weighted mean of each domain signal across the session, clamped to [0, 100]
    pub fn aggregate(&self, tasks: &[TaskRecord]) -> DomainScores {
        let mut total_weight = 0.0;
        let mut social = 0.0;
        let mut repetitive = 0.0;
        let mut sensory = 0.0;
        let mut motor = 0.0;

        for task in tasks {
            let weight = task_weight(task);
            let signals = task_signals(task);

            social += weight * signals.social;
            repetitive += weight * signals.repetitive;
            sensory += weight * signals.sensory;
            motor += weight * signals.motor;
            total_weight += weight;
        }

        if total_weight == 0.0 {
            return DomainScores {
                social: clamp_percent(self.fallbacks.social),
                repetitive: clamp_percent(self.fallbacks.repetitive),
                sensory: clamp_percent(self.fallbacks.sensory),
                motor: clamp_percent(self.fallbacks.motor),
            };
        }

        DomainScores {
            social: clamp_percent(social / total_weight),
            repetitive: clamp_percent(repetitive / total_weight),
            sensory: clamp_percent(sensory / total_weight),
            motor: clamp_percent(motor / total_weight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawAttributes;
    use serde_json::json;

    fn task(engagement: Option<f64>, duration: Option<f64>, raw: serde_json::Value) -> TaskRecord {
        TaskRecord {
            engagement_score: engagement,
            duration_seconds: duration,
            raw_data: serde_json::from_value::<RawAttributes>(raw).unwrap(),
            ..TaskRecord::default()
        }
    }

    #[test]
    fn test_empty_session_uses_neutral_fallbacks() {
        let scores = DomainAggregator::default().aggregate(&[]);
        assert_eq!(scores, DomainScores::NEUTRAL);
    }

    #[test]
    fn test_zero_engagement_tasks_use_fallbacks() {
        let tasks = vec![task(Some(0.0), Some(60.0), json!({ "eyeContact": 0.1 }))];
        let scores = DomainAggregator::default().aggregate(&tasks);
        assert_eq!(scores, DomainScores::NEUTRAL);
    }

    #[test]
    fn test_task_weight() {
        let t = task(Some(0.9), Some(60.0), json!({}));
        assert!((task_weight(&t) - 0.9 * 61f64.ln()).abs() < 1e-9);

        // Percentage engagement and a missing duration
        let t = task(Some(80.0), None, json!({}));
        assert!((task_weight(&t) - 0.8 * 2f64.ln()).abs() < 1e-9);

        // Negative engagement never yields a negative weight
        let t = task(Some(-0.4), Some(30.0), json!({}));
        assert_eq!(task_weight(&t), 0.0);
    }

    #[test]
    fn test_default_signals_for_empty_attributes() {
        let signals = task_signals(&task(Some(0.9), Some(60.0), json!({})));
        assert_eq!(signals.social, 50.0);
        assert_eq!(signals.repetitive, 70.0);
        assert_eq!(signals.sensory, 50.0);
        assert_eq!(signals.motor, 50.0);
    }

    #[test]
    fn test_social_zero_mean_falls_back_to_social_score() {
        let zeros = json!({
            "eyeContact": 0, "nameResponse": 0, "jointAttention": 0, "socialReciprocity": 0
        });
        let signals = task_signals(&task(Some(0.7), Some(30.0), zeros.clone()));
        // socialScore missing => task engagement as a percentage
        assert!((signals.social - 70.0).abs() < 1e-9);

        let mut with_score = zeros;
        with_score["socialScore"] = json!(0.35);
        let signals = task_signals(&task(Some(0.7), Some(30.0), with_score));
        assert!((signals.social - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_social_score_ignored_when_mean_nonzero() {
        let raw = json!({ "eyeContact": 0.2, "socialScore": 0.9 });
        let signals = task_signals(&task(Some(0.7), Some(30.0), raw));
        // (20 + 50 + 50 + 50) / 4
        assert!((signals.social - 42.5).abs() < 1e-9);
    }

    #[test]
    fn test_risk_domains_are_inverted() {
        let raw = json!({
            "repetitiveIntensity": 0.8, "repetitiveFrequency": 60,
            "sensoryHypo": 0.1, "sensoryHyper": 0.3
        });
        let signals = task_signals(&task(Some(1.0), Some(30.0), raw));
        assert!((signals.repetitive - 30.0).abs() < 1e-9);
        assert!((signals.sensory - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_average_favors_long_engaged_tasks() {
        let strong = task(Some(1.0), Some(300.0), json!({ "fineMotor": 1, "grossMotor": 1,
            "motorPlanning": 1, "imitation": 1 }));
        let weak = task(Some(0.2), Some(10.0), json!({ "fineMotor": 0, "grossMotor": 0,
            "motorPlanning": 0, "imitation": 0 }));

        let w_strong = task_weight(&strong);
        let w_weak = task_weight(&weak);
        let expected = 100.0 * w_strong / (w_strong + w_weak);

        let scores = DomainAggregator::default().aggregate(&[strong, weak]);
        assert!((scores.motor - expected).abs() < 1e-9);
        assert!(scores.motor > 90.0);
    }

    #[test]
    fn test_aggregate_clamps_out_of_range_readings() {
        let raw = json!({ "eyeContact": 500, "nameResponse": 500,
            "jointAttention": 500, "socialReciprocity": 500 });
        let scores = DomainAggregator::default().aggregate(&[task(Some(0.5), Some(20.0), raw)]);
        assert_eq!(scores.social, 100.0);
    }

    #[test]
    fn test_custom_fallbacks() {
        let fallbacks = DomainScores {
            social: 40.0,
            repetitive: 41.0,
            sensory: 42.0,
            motor: 43.0,
        };
        let scores = DomainAggregator::new(fallbacks).aggregate(&[]);
        assert_eq!(scores, fallbacks);
    }
}
