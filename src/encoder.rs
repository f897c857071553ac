//! Analysis envelope encoder
//!
//! Wraps an [`AnalysisResult`] with engine provenance for transport. The
//! envelope carries a wall-clock timestamp and an instance id; the result
//! inside it stays deterministic.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScreeningError;
use crate::types::{AnalysisResult, SessionId};
use crate::{ENGINE_NAME, ENGINE_VERSION};

/// Engine that produced a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineInfo {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Result plus provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEnvelope {
    pub engine: EngineInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub computed_at_utc: String,
    pub result: AnalysisResult,
}

/// Envelope encoder
pub struct AnalysisEncoder {
    instance_id: String,
}

impl Default for AnalysisEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn encode(
        &self,
        session_id: Option<&SessionId>,
        result: &AnalysisResult,
    ) -> AnalysisEnvelope {
        AnalysisEnvelope {
            engine: EngineInfo {
                name: ENGINE_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            session_id: session_id.cloned(),
            computed_at_utc: Utc::now().to_rfc3339(),
            result: result.clone(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        session_id: Option<&SessionId>,
        result: &AnalysisResult,
    ) -> Result<String, ScreeningError> {
        let envelope = self.encode(session_id, result);
        serde_json::to_string_pretty(&envelope).map_err(ScreeningError::JsonError)
    }
}
