//! Pipeline orchestration
//!
//! This module provides the public API for the screening engine. It runs the
//! full scoring pipeline over one session's ordered task list:
//! normalize → aggregate domains → probability → tiers → red flags →
//! observations → recommendation.
//!
//! Scoring is a pure function of the task list. Identical input always yields
//! an identical [`AnalysisResult`].

use crate::adapter::parse_session;
use crate::calibration::Calibration;
use crate::domains::DomainAggregator;
use crate::error::ScreeningError;
use crate::flags::derive_red_flags;
use crate::observations::extract_observations;
use crate::probability::{
    classify_confidence, classify_severity, compute_probability, decide_recommendation,
    engagement_average, mean_engagement,
};
use crate::types::{AnalysisMetadata, AnalysisResult, SessionId, TaskRecord};

/// Stored with every result
pub const ANALYSIS_NOTES: &str = "Heuristic domain-based scoring for screening; not diagnostic.";

/// Supplies the ordered task list of a session.
///
/// Implemented by the persistence layer. A fetch failure is returned to the
/// caller unchanged; an existing session with no tasks is an empty list, not
/// an error.
pub trait TaskSource {
    fn fetch_tasks(&self, session_id: &SessionId) -> Result<Vec<TaskRecord>, ScreeningError>;
}

/// Score one session with the default calibration (stateless, one-shot).
///
/// # Example
/// ```
/// use screening_engine::analyze_tasks;
///
/// let tasks = vec![];
/// let result = analyze_tasks(&tasks);
/// assert!(result.asd_probability <= 100.0);
/// ```
pub fn analyze_tasks(tasks: &[TaskRecord]) -> AnalysisResult {
    ScreeningAnalyzer::new().analyze(tasks)
}

/// Convert session JSON to analysis-result JSON (stateless, one-shot).
///
/// # Arguments
/// * `session_json` - A session object or a bare task array
///
/// # Returns
/// The persisted JSON form of the [`AnalysisResult`]
pub fn analyze_session_json(session_json: String) -> Result<String, ScreeningError> {
    ScreeningAnalyzer::new().analyze_json(&session_json)
}

/// Scoring entry point carrying a calibration.
///
/// Holds no per-session state, so one analyzer can score any number of
/// sessions, from any number of threads.
#[derive(Debug, Clone)]
pub struct ScreeningAnalyzer {
    calibration: Calibration,
}

impl Default for ScreeningAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreeningAnalyzer {
    /// Create an analyzer with the built-in calibration
    pub fn new() -> Self {
        Self {
            calibration: Calibration::default(),
        }
    }

    /// Create an analyzer with a custom calibration, validated up front
    pub fn with_calibration(calibration: Calibration) -> Result<Self, ScreeningError> {
        calibration.validate()?;
        Ok(Self { calibration })
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Score an ordered task list
    pub fn analyze(&self, tasks: &[TaskRecord]) -> AnalysisResult {
        let calibration = &self.calibration;

        // Stage 1-2: Normalize attributes and aggregate domains
        let domains = DomainAggregator::new(calibration.domain_fallbacks).aggregate(tasks);

        // Stage 3: Probability
        let engagement = mean_engagement(tasks);
        let probability = compute_probability(&domains, engagement, calibration);

        // Stage 4: Confidence and severity
        let confidence = classify_confidence(tasks.len(), engagement, &calibration.confidence);
        let severity = classify_severity(probability, &calibration.severity);

        // Stage 5: Red flags and observations
        let red_flags = derive_red_flags(tasks, &domains, &calibration.red_flags);
        let key_observations = extract_observations(tasks, &calibration.observations);

        // Stage 6: Recommendation
        let recommendation =
            decide_recommendation(probability, severity, confidence, &calibration.recommendation);

        tracing::debug!(
            tasks = tasks.len(),
            probability,
            confidence = confidence.as_str(),
            severity = severity.level(),
            recommendation = recommendation.as_str(),
            red_flags = red_flags.len(),
            calibration = %calibration.version,
            "scored screening session"
        );

        // Stage 7: Assemble
        AnalysisResult {
            asd_probability: probability,
            confidence_level: confidence,
            severity_score: severity,
            social_communication_score: domains.social,
            repetitive_behaviors_score: domains.repetitive,
            sensory_processing_score: domains.sensory,
            motor_coordination_score: domains.motor,
            red_flags,
            key_observations,
            recommendation,
            analysis_data: AnalysisMetadata {
                tasks_analyzed: tasks.len(),
                domain_scores: domains,
                engagement_average: engagement_average(tasks),
                calibration_version: calibration.version.clone(),
                notes: ANALYSIS_NOTES.to_string(),
            },
        }
    }

    /// Fetch a session's tasks from the collaborator and score them.
    ///
    /// Fetch errors propagate unchanged.
    pub fn analyze_session<S>(
        &self,
        source: &S,
        session_id: &SessionId,
    ) -> Result<AnalysisResult, ScreeningError>
    where
        S: TaskSource + ?Sized,
    {
        let tasks = source.fetch_tasks(session_id).map_err(|e| {
            tracing::warn!(%session_id, error = %e, "task fetch failed");
            e
        })?;
        Ok(self.analyze(&tasks))
    }

    /// Parse session JSON, score it and return the result JSON
    pub fn analyze_json(&self, session_json: &str) -> Result<String, ScreeningError> {
        let session = parse_session(session_json)?;
        let result = self.analyze(&session.tasks);
        result
            .to_json()
            .map_err(|e| ScreeningError::EncodingError(e.to_string()))
    }
}
