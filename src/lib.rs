//! Screening Engine - Deterministic scoring for gamified developmental screening
//!
//! The engine turns one session's ordered task records into a screening
//! probability, confidence and severity tiers, domain sub-scores, red flags,
//! timeline observations and a follow-up recommendation:
//! attribute normalization → domain aggregation → logistic probability →
//! tier classification → flag/observation extraction → recommendation.
//!
//! This is a screening heuristic, not a diagnostic instrument.
//!
//! ## Modules
//!
//! - **Scoring**: `normalizer`, `domains`, `probability`, `flags`, `observations`
//! - **Orchestration**: `pipeline`, configured through `calibration`
//! - **Edges**: `adapter` (session JSON), `encoder` (result envelope), `ffi` (C ABI)

pub mod adapter;
pub mod calibration;
pub mod domains;
pub mod encoder;
pub mod error;
pub mod flags;
pub mod normalizer;
pub mod observations;
pub mod pipeline;
pub mod probability;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::{parse_session, validate_tasks, ScreeningSession, TaskIssue, TaskIssueKind};
pub use calibration::{Calibration, DEFAULT_CALIBRATION_VERSION};
pub use encoder::{AnalysisEncoder, AnalysisEnvelope};
pub use error::ScreeningError;
pub use pipeline::{analyze_session_json, analyze_tasks, ScreeningAnalyzer, TaskSource};
pub use types::{
    AnalysisMetadata, AnalysisResult, ConfidenceLevel, DomainScores, KeyObservation,
    RawAttributes, Recommendation, SessionId, SeverityScore, TaskRecord,
};

/// Engine version embedded in result envelopes
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name for result envelopes
pub const ENGINE_NAME: &str = "screening-engine";
