//! Key-observation extraction
//!
//! Walks the session in task order with an elapsed-time cursor and emits
//! timestamped behavior notes.

use chrono::NaiveTime;

use crate::calibration::ObservationSettings;
use crate::flags::{HAND_FLAPPING_KEY, NO_EYE_CONTACT_KEY, NO_NAME_RESPONSE_KEY};
use crate::types::{KeyObservation, TaskRecord};

/// Free-text observation recorded by the task itself
pub const OBSERVATION_KEY: &str = "observation";

pub const BEHAVIOR_LIMITED_EYE_CONTACT: &str = "Limited eye contact during task";
pub const BEHAVIOR_NO_NAME_RESPONSE: &str = "No response to name";
pub const BEHAVIOR_HAND_FLAPPING: &str = "Repetitive hand flapping observed";

/// Emitted when no task produced an observation
pub const FALLBACK_TIMESTAMP: &str = "00:02:00";
pub const FALLBACK_BEHAVIOR: &str = "Typical engagement with intermittent gaze shifts";

const SECONDS_PER_DAY: i64 = 86_400;

/// Format elapsed seconds as `HH:MM:SS`.
///
/// Fractional seconds are dropped and the clock wraps every 24 hours.
pub fn format_elapsed(seconds: f64) -> String {
    let whole = if seconds.is_finite() {
        seconds.floor() as i64
    } else {
        0
    };
    let of_day = whole.rem_euclid(SECONDS_PER_DAY) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(of_day, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "00:00:00".to_string())
}

/// Extract the session timeline.
///
/// The cursor advances by `max(min_step, duration)` for every task, whether
/// or not it yields an observation, and each observation is stamped with the
/// cursor after its task has been added (the elapsed time when the task
/// ended). A task's own `observation` text replaces the attribute-derived
/// notes for that task.
pub fn extract_observations(
    tasks: &[TaskRecord],
    settings: &ObservationSettings,
) -> Vec<KeyObservation> {
    let mut observations = Vec::new();
    let mut cursor = 0.0;

    for task in tasks {
        cursor += task
            .duration_seconds
            .unwrap_or(settings.min_step_sec)
            .max(settings.min_step_sec);
        let timestamp = format_elapsed(cursor);
        let attrs = &task.raw_data;

        if let Some(text) = attrs.text(OBSERVATION_KEY) {
            observations.push(KeyObservation {
                timestamp,
                behavior: text.to_string(),
            });
            continue;
        }

        let derived = [
            (NO_EYE_CONTACT_KEY, BEHAVIOR_LIMITED_EYE_CONTACT),
            (NO_NAME_RESPONSE_KEY, BEHAVIOR_NO_NAME_RESPONSE),
            (HAND_FLAPPING_KEY, BEHAVIOR_HAND_FLAPPING),
        ];
        for (key, behavior) in derived {
            if attrs.is_truthy(key) {
                observations.push(KeyObservation {
                    timestamp: timestamp.clone(),
                    behavior: behavior.to_string(),
                });
            }
        }
    }

    if observations.is_empty() {
        observations.push(KeyObservation {
            timestamp: FALLBACK_TIMESTAMP.to_string(),
            behavior: FALLBACK_BEHAVIOR.to_string(),
        });
    }

    observations.truncate(settings.max_observations);
    observations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawAttributes;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn task(duration: Option<f64>, raw: serde_json::Value) -> TaskRecord {
        TaskRecord {
            duration_seconds: duration,
            raw_data: serde_json::from_value::<RawAttributes>(raw).unwrap(),
            ..TaskRecord::default()
        }
    }

    fn obs(timestamp: &str, behavior: &str) -> KeyObservation {
        KeyObservation {
            timestamp: timestamp.to_string(),
            behavior: behavior.to_string(),
        }
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0.0), "00:00:00");
        assert_eq!(format_elapsed(75.9), "00:01:15");
        assert_eq!(format_elapsed(3_725.0), "01:02:05");
        assert_eq!(format_elapsed(86_400.0 + 61.0), "00:01:01");
        assert_eq!(format_elapsed(f64::NAN), "00:00:00");
    }

    #[test]
    fn test_empty_session_gets_fallback() {
        let observations = extract_observations(&[], &ObservationSettings::default());
        assert_eq!(observations, vec![obs(FALLBACK_TIMESTAMP, FALLBACK_BEHAVIOR)]);
    }

    #[test]
    fn test_tasks_without_notes_get_fallback() {
        let tasks = vec![task(Some(30.0), json!({})), task(None, json!({ "eyeContact": 0.2 }))];
        let observations = extract_observations(&tasks, &ObservationSettings::default());
        assert_eq!(observations, vec![obs(FALLBACK_TIMESTAMP, FALLBACK_BEHAVIOR)]);
    }

    #[test]
    fn test_attribute_notes_share_the_task_timestamp() {
        let tasks = vec![task(
            Some(60.0),
            json!({ "noEyeContact": true, "noNameResponse": 1, "handFlapping": "yes" }),
        )];
        let observations = extract_observations(&tasks, &ObservationSettings::default());
        assert_eq!(
            observations,
            vec![
                obs("00:01:00", BEHAVIOR_LIMITED_EYE_CONTACT),
                obs("00:01:00", BEHAVIOR_NO_NAME_RESPONSE),
                obs("00:01:00", BEHAVIOR_HAND_FLAPPING),
            ]
        );
    }

    #[test]
    fn test_text_observation_replaces_attribute_notes() {
        let tasks = vec![task(
            Some(45.0),
            json!({ "observation": "Covered ears at loud noise", "handFlapping": true }),
        )];
        let observations = extract_observations(&tasks, &ObservationSettings::default());
        assert_eq!(observations, vec![obs("00:00:45", "Covered ears at loud noise")]);
    }

    #[test]
    fn test_cursor_advances_on_silent_tasks_and_min_step() {
        let tasks = vec![
            task(Some(90.0), json!({})),
            task(Some(0.0), json!({})),
            task(None, json!({})),
            task(Some(2.0), json!({ "handFlapping": true })),
        ];
        let observations = extract_observations(&tasks, &ObservationSettings::default());
        // 90 + 5 + 5 + 5
        assert_eq!(observations, vec![obs("00:01:45", BEHAVIOR_HAND_FLAPPING)]);
    }

    #[test]
    fn test_observations_are_capped() {
        let tasks: Vec<TaskRecord> = (0..4)
            .map(|_| task(Some(10.0), json!({ "noEyeContact": true, "handFlapping": true })))
            .collect();
        let observations = extract_observations(&tasks, &ObservationSettings::default());
        assert_eq!(observations.len(), 6);
        assert_eq!(observations[5], obs("00:00:30", BEHAVIOR_HAND_FLAPPING));
    }

    #[test]
    fn test_empty_observation_text_is_ignored() {
        let tasks = vec![task(Some(20.0), json!({ "observation": "", "noEyeContact": true }))];
        let observations = extract_observations(&tasks, &ObservationSettings::default());
        assert_eq!(observations, vec![obs("00:00:20", BEHAVIOR_LIMITED_EYE_CONTACT)]);
    }
}
