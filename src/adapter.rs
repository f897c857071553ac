//! Screening session adapter
//!
//! Parses session JSON from the ingestion side into [`TaskRecord`]s and checks
//! the obligations the scoring engine places on its collaborators.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ScreeningError;
use crate::types::{RawAttributes, SessionId, TaskRecord};

/// A session's ordered task list as handed to the scoring engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub tasks: Vec<TaskRecord>,
}

/// Task as it arrives on the wire; `rawData` may still be a serialized string
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTask {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default, alias = "session_id")]
    session_id: Option<SessionId>,
    #[serde(default, alias = "task_type")]
    task_type: Option<String>,
    #[serde(default, alias = "task_name")]
    task_name: Option<String>,
    #[serde(default, alias = "duration_seconds")]
    duration_seconds: Option<f64>,
    #[serde(default, alias = "engagement_score")]
    engagement_score: Option<f64>,
    #[serde(default, alias = "raw_data")]
    raw_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSession {
    #[serde(default, alias = "session_id")]
    session_id: Option<SessionId>,
    tasks: Option<Vec<WireTask>>,
}

/// Parse a screening session.
///
/// Accepts either `{ "sessionId": .., "tasks": [..] }` or a bare array of
/// tasks. Array order is task order.
pub fn parse_session(json: &str) -> Result<ScreeningSession, ScreeningError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ScreeningError::ParseError(format!("Failed to parse session: {}", e)))?;

    let (session_id, wire_tasks) = match value {
        Value::Array(_) => {
            let tasks: Vec<WireTask> = serde_json::from_value(value)
                .map_err(|e| ScreeningError::ParseError(format!("Invalid task list: {}", e)))?;
            (None, tasks)
        }
        Value::Object(_) => {
            let session: WireSession = serde_json::from_value(value)
                .map_err(|e| ScreeningError::ParseError(format!("Invalid session: {}", e)))?;
            let tasks = session
                .tasks
                .ok_or_else(|| ScreeningError::MissingField("tasks".to_string()))?;
            (session.session_id, tasks)
        }
        other => {
            return Err(ScreeningError::ParseError(format!(
                "Expected a session object or task array, got {}",
                json_type_name(&other)
            )))
        }
    };

    let tasks = wire_tasks
        .into_iter()
        .enumerate()
        .map(|(index, wire)| wire_to_task(index, wire, session_id.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        session_id = ?session_id,
        task_count = tasks.len(),
        "parsed screening session"
    );

    Ok(ScreeningSession { session_id, tasks })
}

fn wire_to_task(
    index: usize,
    wire: WireTask,
    session_id: Option<&SessionId>,
) -> Result<TaskRecord, ScreeningError> {
    let raw_data = decode_raw_data(wire.raw_data).map_err(|reason| {
        tracing::warn!(task_index = index, %reason, "rejecting task rawData");
        ScreeningError::ParseError(format!("Task {index}: {reason}"))
    })?;

    Ok(TaskRecord {
        id: wire.id,
        session_id: wire.session_id.or_else(|| session_id.cloned()),
        task_type: wire.task_type.unwrap_or_default(),
        task_name: wire.task_name.unwrap_or_default(),
        duration_seconds: wire.duration_seconds,
        engagement_score: wire.engagement_score,
        raw_data,
    })
}

/// Decode a task's `rawData` into an attribute map.
///
/// Absent or null is an empty map. A string is treated as serialized JSON
/// and must hold an object.
pub fn decode_raw_data(value: Option<Value>) -> Result<RawAttributes, String> {
    match value {
        None | Some(Value::Null) => Ok(RawAttributes::new()),
        Some(Value::Object(map)) => Ok(RawAttributes::from(map)),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => Ok(RawAttributes::from(map)),
            Ok(other) => Err(format!(
                "rawData string decodes to {}, expected an object",
                json_type_name(&other)
            )),
            Err(e) => Err(format!("rawData string is not valid JSON: {e}")),
        },
        Some(other) => Err(format!(
            "rawData must be an object, got {}",
            json_type_name(&other)
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Kinds of input quality issue the engine tolerates but callers may want to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskIssueKind {
    /// Duration absent; scored as one second
    MissingDuration,
    /// Duration zero or negative; scored as one second
    NonPositiveDuration,
    /// Engagement absent; scored as 0.5
    MissingEngagement,
    /// Engagement exactly 1.0: read as 100%, could have meant 1%
    AmbiguousEngagementScale,
    /// Engagement below zero; the task carries no weight
    NegativeEngagement,
    /// No behavioral attributes; every signal uses its prior
    EmptyRawData,
}

impl fmt::Display for TaskIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TaskIssueKind::MissingDuration => "duration missing, treated as 1 second",
            TaskIssueKind::NonPositiveDuration => "duration not positive, treated as 1 second",
            TaskIssueKind::MissingEngagement => "engagement missing, treated as 0.5",
            TaskIssueKind::AmbiguousEngagementScale => {
                "engagement of exactly 1 is read as a fraction (100%)"
            }
            TaskIssueKind::NegativeEngagement => "engagement negative, task carries no weight",
            TaskIssueKind::EmptyRawData => "no behavioral attributes recorded",
        };
        f.write_str(msg)
    }
}

/// One issue found on one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIssue {
    pub index: usize,
    pub task_id: Option<i64>,
    pub kind: TaskIssueKind,
}

/// Report input-quality issues without rejecting anything
pub fn validate_tasks(tasks: &[TaskRecord]) -> Vec<TaskIssue> {
    let mut issues = Vec::new();

    for (index, task) in tasks.iter().enumerate() {
        let mut push = |kind| {
            issues.push(TaskIssue {
                index,
                task_id: task.id,
                kind,
            })
        };

        match task.duration_seconds {
            None => push(TaskIssueKind::MissingDuration),
            Some(d) if d <= 0.0 || d.is_nan() => push(TaskIssueKind::NonPositiveDuration),
            Some(_) => {}
        }

        match task.engagement_score {
            None => push(TaskIssueKind::MissingEngagement),
            Some(e) if e == 1.0 => push(TaskIssueKind::AmbiguousEngagementScale),
            Some(e) if e < 0.0 => push(TaskIssueKind::NegativeEngagement),
            Some(_) => {}
        }

        if task.raw_data.is_empty() {
            push(TaskIssueKind::EmptyRawData);
        }
    }

    issues
}
