//! Scoring calibration
//!
//! Every tunable constant of the scoring pipeline lives here. The default set
//! is tagged [`DEFAULT_CALIBRATION_VERSION`]; results record the tag they were
//! produced with so stored analyses stay reproducible.

use serde::{Deserialize, Serialize};

use crate::error::ScreeningError;
use crate::types::DomainScores;

/// Tag of the built-in constant set
pub const DEFAULT_CALIBRATION_VERSION: &str = "v0.1-internal";

/// Logistic model over domain risk indices
///
/// `z = social*riskSocial + repetitive*riskRepetitive + sensory*riskSensory
///      + motor*riskMotor + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskCoefficients {
    pub social: f64,
    pub repetitive: f64,
    pub sensory: f64,
    pub motor: f64,
    pub intercept: f64,
}

impl Default for RiskCoefficients {
    fn default() -> Self {
        Self {
            social: 0.045,
            repetitive: 0.035,
            sensory: 0.03,
            motor: 0.02,
            intercept: -1.5,
        }
    }
}

/// Probability multiplier `base + span * meanEngagement`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementAdjustment {
    pub base: f64,
    pub span: f64,
}

impl Default for EngagementAdjustment {
    fn default() -> Self {
        Self {
            base: 0.85,
            span: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub high_min_tasks: usize,
    pub high_min_engagement: f64,
    pub medium_min_tasks: usize,
    pub medium_min_engagement: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high_min_tasks: 6,
            high_min_engagement: 0.65,
            medium_min_tasks: 3,
            medium_min_engagement: 0.5,
        }
    }
}

/// Probability cut-offs (inclusive) for severity 3 and 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub substantial: f64,
    pub moderate: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            substantial: 70.0,
            moderate: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// Refer at or above this probability
    pub refer_probability: f64,
    /// Reassure strictly below this probability (and confidence above low)
    pub reassure_below: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            refer_probability: 60.0,
            reassure_below: 35.0,
        }
    }
}

/// Session-level red-flag thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedFlagThresholds {
    pub social_reciprocity_below: f64,
    pub joint_attention_below: f64,
    pub repetitive_risk_above: f64,
    pub sensory_risk_above: f64,
    pub motor_below: f64,
    pub spin_repetitions_above: f64,
}

impl Default for RedFlagThresholds {
    fn default() -> Self {
        Self {
            social_reciprocity_below: 45.0,
            joint_attention_below: 50.0,
            repetitive_risk_above: 50.0,
            sensory_risk_above: 45.0,
            motor_below: 55.0,
            spin_repetitions_above: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationSettings {
    pub max_observations: usize,
    /// Minimum timeline advance per task, in seconds
    pub min_step_sec: f64,
}

impl Default for ObservationSettings {
    fn default() -> Self {
        Self {
            max_observations: 6,
            min_step_sec: 5.0,
        }
    }
}

/// Full constant set for one scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub version: String,
    pub coefficients: RiskCoefficients,
    pub engagement_adjustment: EngagementAdjustment,
    /// Domain scores used when a session carries no weighted evidence
    pub domain_fallbacks: DomainScores,
    pub confidence: ConfidenceThresholds,
    pub severity: SeverityThresholds,
    pub recommendation: RecommendationThresholds,
    pub red_flags: RedFlagThresholds,
    pub observations: ObservationSettings,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            version: DEFAULT_CALIBRATION_VERSION.to_string(),
            coefficients: RiskCoefficients::default(),
            engagement_adjustment: EngagementAdjustment::default(),
            domain_fallbacks: DomainScores::NEUTRAL,
            confidence: ConfidenceThresholds::default(),
            severity: SeverityThresholds::default(),
            recommendation: RecommendationThresholds::default(),
            red_flags: RedFlagThresholds::default(),
            observations: ObservationSettings::default(),
        }
    }
}

impl Calibration {
    /// Load a calibration from JSON. Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self, ScreeningError> {
        let calibration: Calibration = serde_json::from_str(json)
            .map_err(|e| ScreeningError::InvalidCalibration(e.to_string()))?;
        calibration.validate()?;
        Ok(calibration)
    }

    pub fn to_json(&self) -> Result<String, ScreeningError> {
        serde_json::to_string_pretty(self).map_err(ScreeningError::JsonError)
    }

    /// Check that the constant set can produce well-formed results
    pub fn validate(&self) -> Result<(), ScreeningError> {
        if self.version.trim().is_empty() {
            return Err(ScreeningError::InvalidCalibration(
                "version tag must not be empty".to_string(),
            ));
        }

        let named = [
            ("coefficients.social", self.coefficients.social),
            ("coefficients.repetitive", self.coefficients.repetitive),
            ("coefficients.sensory", self.coefficients.sensory),
            ("coefficients.motor", self.coefficients.motor),
            ("coefficients.intercept", self.coefficients.intercept),
            ("engagement_adjustment.base", self.engagement_adjustment.base),
            ("engagement_adjustment.span", self.engagement_adjustment.span),
            ("domain_fallbacks.social", self.domain_fallbacks.social),
            ("domain_fallbacks.repetitive", self.domain_fallbacks.repetitive),
            ("domain_fallbacks.sensory", self.domain_fallbacks.sensory),
            ("domain_fallbacks.motor", self.domain_fallbacks.motor),
            ("confidence.high_min_engagement", self.confidence.high_min_engagement),
            ("confidence.medium_min_engagement", self.confidence.medium_min_engagement),
            ("severity.substantial", self.severity.substantial),
            ("severity.moderate", self.severity.moderate),
            ("recommendation.refer_probability", self.recommendation.refer_probability),
            ("recommendation.reassure_below", self.recommendation.reassure_below),
            ("red_flags.social_reciprocity_below", self.red_flags.social_reciprocity_below),
            ("red_flags.joint_attention_below", self.red_flags.joint_attention_below),
            ("red_flags.repetitive_risk_above", self.red_flags.repetitive_risk_above),
            ("red_flags.sensory_risk_above", self.red_flags.sensory_risk_above),
            ("red_flags.motor_below", self.red_flags.motor_below),
            ("red_flags.spin_repetitions_above", self.red_flags.spin_repetitions_above),
            ("observations.min_step_sec", self.observations.min_step_sec),
        ];
        if let Some((name, _)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScreeningError::InvalidCalibration(format!(
                "{name} must be a finite number"
            )));
        }

        if self.engagement_adjustment.base < 0.0 || self.engagement_adjustment.span < 0.0 {
            return Err(ScreeningError::InvalidCalibration(
                "engagement adjustment must not be negative".to_string(),
            ));
        }

        if self.severity.moderate > self.severity.substantial {
            return Err(ScreeningError::InvalidCalibration(
                "severity.moderate must not exceed severity.substantial".to_string(),
            ));
        }

        // Severity 3 must always refer
        if self.recommendation.refer_probability > self.severity.substantial {
            return Err(ScreeningError::InvalidCalibration(
                "recommendation.refer_probability must not exceed severity.substantial"
                    .to_string(),
            ));
        }

        if self.confidence.medium_min_tasks > self.confidence.high_min_tasks {
            return Err(ScreeningError::InvalidCalibration(
                "confidence.medium_min_tasks must not exceed confidence.high_min_tasks"
                    .to_string(),
            ));
        }

        if self.observations.max_observations == 0 {
            return Err(ScreeningError::InvalidCalibration(
                "observations.max_observations must be at least 1".to_string(),
            ));
        }

        if self.observations.min_step_sec <= 0.0 {
            return Err(ScreeningError::InvalidCalibration(
                "observations.min_step_sec must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
