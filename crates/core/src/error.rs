//! Error types for the wind-tunnel core.
//!
//! The simulation step itself never fails; these errors only surface where
//! external data (JSON parameters, obstacle lists, run files) enters the engine.

use thiserror::Error;

/// Errors produced at the engine's ingestion boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A parameter had the right type but an unusable value.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// An obstacle description could not be interpreted.
    #[error("invalid obstacle: {0}")]
    InvalidObstacle(String),

    /// A JSON document could not be parsed or produced.
    #[error("json error: {0}")]
    Json(String),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Json(e.to_string())
    }
}
