//! Core data types for the screening engine
//!
//! These types define the task records that flow into the scoring pipeline and
//! the analysis result that comes out of it. Field names serialize in the
//! camelCase form the persistence layer stores.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::normalizer;

/// Reference to the screening session a task belongs to.
///
/// Sessions are keyed by integer row ids in the main backend, but string
/// identifiers are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionId::Numeric(id) => write!(f, "{id}"),
            SessionId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        SessionId::Numeric(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId::Text(id.to_string())
    }
}

/// Open bag of behavioral attributes recorded for a task.
///
/// No attribute is required. Every getter is total: missing, null or
/// non-numeric values resolve to a fallback instead of an error. A `null`
/// attribute bag deserializes as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawAttributes(Map<String, Value>);

impl<'de> Deserialize<'de> for RawAttributes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(Self(map.unwrap_or_default()))
    }
}

impl RawAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for a key, `None` when absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Read a 0-100 signal, see [`normalizer::to_percent`]
    pub fn percent(&self, key: &str, fallback: f64) -> f64 {
        normalizer::to_percent(self.get(key), fallback)
    }

    /// Numeric reading after coercion; `None` for absent or non-numeric values
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(normalizer::coerce_number)
    }

    /// True only for an explicit boolean `true`
    pub fn is_true(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    /// Loose presence check: any non-empty, non-zero, non-false value
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(normalizer::is_truthy)
    }

    /// Non-empty string value
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for RawAttributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One completed screening activity.
///
/// Records are ordered by insertion; that order is the only temporal signal
/// the engine has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Row id assigned by the persistence layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Owning session
    #[serde(default, alias = "session_id", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Free-form task category (e.g. "social", "motor")
    #[serde(default, alias = "task_type")]
    pub task_type: String,
    /// Free-form display name
    #[serde(default, alias = "task_name")]
    pub task_name: String,
    /// Task duration in seconds; missing or non-positive is floored to 1
    #[serde(default, alias = "duration_seconds")]
    pub duration_seconds: Option<f64>,
    /// Engagement as a 0-1 fraction or a 0-100 percentage
    #[serde(default, alias = "engagement_score")]
    pub engagement_score: Option<f64>,
    /// Behavioral attributes
    #[serde(default, alias = "raw_data")]
    pub raw_data: RawAttributes,
}

/// Scores for the four behavioral domains, each 0-100 with higher = more typical.
///
/// Missing fields deserialize to their [`DomainScores::NEUTRAL`] value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainScores {
    pub social: f64,
    pub repetitive: f64,
    pub sensory: f64,
    pub motor: f64,
}

impl DomainScores {
    /// Neutral priors used when there is no weighted evidence at all
    pub const NEUTRAL: DomainScores = DomainScores {
        social: 55.0,
        repetitive: 60.0,
        sensory: 58.0,
        motor: 62.0,
    };

    pub fn social_risk(&self) -> f64 {
        100.0 - self.social
    }

    pub fn repetitive_risk(&self) -> f64 {
        100.0 - self.repetitive
    }

    pub fn sensory_risk(&self) -> f64 {
        100.0 - self.sensory
    }

    pub fn motor_risk(&self) -> f64 {
        100.0 - self.motor
    }
}

impl Default for DomainScores {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Qualitative reliability of a result, driven by sample size and engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

/// Severity tier, serialized as the integers 1, 2, 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SeverityScore {
    Mild = 1,
    Moderate = 2,
    Substantial = 3,
}

impl SeverityScore {
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

impl From<SeverityScore> for u8 {
    fn from(severity: SeverityScore) -> Self {
        severity.level()
    }
}

impl TryFrom<u8> for SeverityScore {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SeverityScore::Mild),
            2 => Ok(SeverityScore::Moderate),
            3 => Ok(SeverityScore::Substantial),
            other => Err(format!("severity must be 1, 2 or 3, got {other}")),
        }
    }
}

/// Follow-up category for a screened child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ReferForDiagnostic,
    Monitor,
    Reassure,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::ReferForDiagnostic => "refer_for_diagnostic",
            Recommendation::Monitor => "monitor",
            Recommendation::Reassure => "reassure",
        }
    }
}

/// A timestamped behavioral note on the session timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyObservation {
    /// Elapsed session time as `HH:MM:SS`
    pub timestamp: String,
    pub behavior: String,
}

/// Audit record stored next to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub tasks_analyzed: usize,
    pub domain_scores: DomainScores,
    /// Raw mean of task engagement values, in whatever scale they arrived
    pub engagement_average: f64,
    pub calibration_version: String,
    pub notes: String,
}

/// Output of one scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0-100
    pub asd_probability: f64,
    pub confidence_level: ConfidenceLevel,
    pub severity_score: SeverityScore,
    pub social_communication_score: f64,
    pub repetitive_behaviors_score: f64,
    pub sensory_processing_score: f64,
    pub motor_coordination_score: f64,
    /// Deduplicated, in order of first trigger
    pub red_flags: Vec<String>,
    /// At most six entries, in timeline order
    pub key_observations: Vec<KeyObservation>,
    pub recommendation: Recommendation,
    pub analysis_data: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn domain_scores(&self) -> DomainScores {
        DomainScores {
            social: self.social_communication_score,
            repetitive: self.repetitive_behaviors_score,
            sensory: self.sensory_processing_score,
            motor: self.motor_coordination_score,
        }
    }

    /// Serialize to the persisted JSON form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
