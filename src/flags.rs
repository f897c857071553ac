//! Red-flag extraction
//!
//! Session-level rules look at domain scores once; per-task rules look at
//! explicit attributes on every task. Both feed one deduplicated list kept in
//! order of first trigger.

use crate::calibration::RedFlagThresholds;
use crate::types::{DomainScores, TaskRecord};

pub const FLAG_REDUCED_RECIPROCITY: &str = "Reduced eye contact and social reciprocity";
pub const FLAG_LIMITED_JOINT_ATTENTION: &str =
    "Delayed response to name or limited joint attention";
pub const FLAG_REPETITIVE_BEHAVIORS: &str =
    "Elevated repetitive behaviors or restricted interests";
pub const FLAG_ATYPICAL_SENSORY: &str = "Atypical sensory processing (hyper/hypo sensitivity)";
pub const FLAG_MOTOR_CHALLENGES: &str = "Motor coordination or imitation challenges";
pub const FLAG_MINIMAL_EYE_CONTACT: &str = "Minimal eye contact during social tasks";
pub const FLAG_NO_NAME_RESPONSE: &str = "No response to name";
pub const FLAG_HAND_FLAPPING: &str = "Observed hand flapping";
pub const FLAG_OBJECT_SPINNING: &str = "Object spinning / repetitive motions";
pub const FLAG_COVERS_EARS: &str = "Hyperacusis / covers ears to sounds";

pub const NO_EYE_CONTACT_KEY: &str = "noEyeContact";
pub const NO_NAME_RESPONSE_KEY: &str = "noNameResponse";
pub const HAND_FLAPPING_KEY: &str = "handFlapping";
pub const SPIN_REPETITIONS_KEY: &str = "spinRepetitions";
pub const COVER_EARS_KEY: &str = "coverEars";

/// Insertion-ordered set of flag strings
#[derive(Debug, Default)]
struct FlagSet(Vec<String>);

impl FlagSet {
    fn push(&mut self, flag: &str) {
        if !self.0.iter().any(|f| f == flag) {
            self.0.push(flag.to_string());
        }
    }
}

/// Extract the red flags for a session
pub fn derive_red_flags(
    tasks: &[TaskRecord],
    domains: &DomainScores,
    thresholds: &RedFlagThresholds,
) -> Vec<String> {
    let mut flags = FlagSet::default();

    // Both social rules may fire together
    if domains.social < thresholds.social_reciprocity_below {
        flags.push(FLAG_REDUCED_RECIPROCITY);
    }
    if domains.social < thresholds.joint_attention_below {
        flags.push(FLAG_LIMITED_JOINT_ATTENTION);
    }
    if domains.repetitive_risk() > thresholds.repetitive_risk_above {
        flags.push(FLAG_REPETITIVE_BEHAVIORS);
    }
    if domains.sensory_risk() > thresholds.sensory_risk_above {
        flags.push(FLAG_ATYPICAL_SENSORY);
    }
    if domains.motor < thresholds.motor_below {
        flags.push(FLAG_MOTOR_CHALLENGES);
    }

    for task in tasks {
        let attrs = &task.raw_data;
        if attrs.is_true(NO_EYE_CONTACT_KEY) {
            flags.push(FLAG_MINIMAL_EYE_CONTACT);
        }
        if attrs.is_true(NO_NAME_RESPONSE_KEY) {
            flags.push(FLAG_NO_NAME_RESPONSE);
        }
        if attrs.is_true(HAND_FLAPPING_KEY) {
            flags.push(FLAG_HAND_FLAPPING);
        }
        if attrs
            .number(SPIN_REPETITIONS_KEY)
            .is_some_and(|n| n > thresholds.spin_repetitions_above)
        {
            flags.push(FLAG_OBJECT_SPINNING);
        }
        if attrs.is_true(COVER_EARS_KEY) {
            flags.push(FLAG_COVERS_EARS);
        }
    }

    flags.0
}
