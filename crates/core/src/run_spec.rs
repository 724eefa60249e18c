//! Reproducible description of a headless simulation run.
//!
//! A [`RunSpec`] captures everything needed to replay a run within one build:
//! parameter overrides, visualization overrides, the obstacle list, the
//! master seed, the number of frames, and the fixed frame step.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default frame step: one 60 Hz animation frame.
pub const DEFAULT_FRAME_DT: f64 = 1.0 / 60.0;

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn default_dt() -> f64 {
    DEFAULT_FRAME_DT
}

/// Replayable run description, usually loaded from a JSON file.
///
/// Every field except `seed` is optional in JSON. `params` and
/// `visualization` hold partial overrides resolved against engine defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    #[serde(default = "empty_object")]
    pub params: Value,
    #[serde(default = "empty_object")]
    pub visualization: Value,
    #[serde(default)]
    pub obstacles: Vec<Value>,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
}

impl RunSpec {
    /// Creates a spec with empty overrides, no obstacles, and zero frames.
    pub fn new(seed: u64) -> Self {
        Self {
            params: empty_object(),
            visualization: empty_object(),
            obstacles: Vec::new(),
            seed,
            frames: 0,
            dt: DEFAULT_FRAME_DT,
        }
    }

    /// Parses a spec from JSON text and validates it.
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        let spec: RunSpec = serde_json::from_str(text)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks that overrides are JSON objects and the frame step is positive.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.params.is_object() {
            return Err(EngineError::InvalidParam {
                name: "params".into(),
                reason: "must be a JSON object".into(),
            });
        }
        if !self.visualization.is_object() {
            return Err(EngineError::InvalidParam {
                name: "visualization".into(),
                reason: "must be a JSON object".into(),
            });
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(EngineError::InvalidParam {
                name: "dt".into(),
                reason: format!("must be a positive finite number, got {}", self.dt),
            });
        }
        Ok(())
    }
}
