//! Probability, confidence and severity derivation
//!
//! Maps domain risk through a calibrated logistic curve, then classifies the
//! result into confidence and severity tiers.

use crate::calibration::{
    Calibration, ConfidenceThresholds, RecommendationThresholds, SeverityThresholds,
};
use crate::normalizer::{clamp_percent, DEFAULT_FALLBACK};
use crate::types::{ConfidenceLevel, DomainScores, Recommendation, SeverityScore, TaskRecord};

/// Raw mean of task engagement values (a missing value counts as 0.5).
///
/// The result keeps whatever scale the values arrived in. An empty session
/// averages to 0.5.
pub fn engagement_average(tasks: &[TaskRecord]) -> f64 {
    if tasks.is_empty() {
        return DEFAULT_FALLBACK;
    }
    let sum: f64 = tasks
        .iter()
        .map(|t| t.engagement_score.unwrap_or(DEFAULT_FALLBACK))
        .sum();
    sum / tasks.len().max(1) as f64
}

/// Mean engagement on a 0-1 scale.
///
/// The raw average is scaled as a whole: `<= 1` is already a fraction,
/// otherwise it is divided by 100.
pub fn mean_engagement(tasks: &[TaskRecord]) -> f64 {
    let average = engagement_average(tasks);
    if !average.is_finite() {
        DEFAULT_FALLBACK
    } else if average <= 1.0 {
        average
    } else {
        average / 100.0
    }
}

/// Logistic transform
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Linear risk score fed into the logistic curve
pub fn risk_logit(domains: &DomainScores, calibration: &Calibration) -> f64 {
    let c = &calibration.coefficients;
    c.social * domains.social_risk()
        + c.repetitive * domains.repetitive_risk()
        + c.sensory * domains.sensory_risk()
        + c.motor * domains.motor_risk()
        + c.intercept
}

/// Overall probability (0-100) from domain scores and mean engagement (0-1)
pub fn compute_probability(
    domains: &DomainScores,
    mean_engagement: f64,
    calibration: &Calibration,
) -> f64 {
    let z = risk_logit(domains, calibration);
    let adjustment = calibration.engagement_adjustment.base
        + calibration.engagement_adjustment.span * mean_engagement;
    clamp_percent(sigmoid(z) * 100.0 * adjustment)
}

/// Confidence from sample size and engagement; the high check runs first
pub fn classify_confidence(
    task_count: usize,
    mean_engagement: f64,
    thresholds: &ConfidenceThresholds,
) -> ConfidenceLevel {
    if task_count >= thresholds.high_min_tasks && mean_engagement >= thresholds.high_min_engagement
    {
        ConfidenceLevel::High
    } else if task_count >= thresholds.medium_min_tasks
        && mean_engagement >= thresholds.medium_min_engagement
    {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Severity tier from probability, highest tier checked first
pub fn classify_severity(probability: f64, thresholds: &SeverityThresholds) -> SeverityScore {
    if probability >= thresholds.substantial {
        SeverityScore::Substantial
    } else if probability >= thresholds.moderate {
        SeverityScore::Moderate
    } else {
        SeverityScore::Mild
    }
}

/// Recommendation policy: refer, then reassure, then monitor
pub fn decide_recommendation(
    probability: f64,
    severity: SeverityScore,
    confidence: ConfidenceLevel,
    thresholds: &RecommendationThresholds,
) -> Recommendation {
    if probability >= thresholds.refer_probability || severity == SeverityScore::Substantial {
        Recommendation::ReferForDiagnostic
    } else if probability < thresholds.reassure_below && confidence != ConfidenceLevel::Low {
        Recommendation::Reassure
    } else {
        Recommendation::Monitor
    }
}
