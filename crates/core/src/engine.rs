//! The `Engine` trait implemented by frame-stepped flow simulations.
//!
//! The trait is object-safe so hosts can hold a `Box<dyn Engine>` and drive it
//! once per animation frame without knowing the concrete simulation.

use crate::error::EngineError;
use crate::snapshot::Snapshot;
use serde_json::Value;

/// A frame-stepped simulation producing one [`Snapshot`] per frame.
pub trait Engine {
    /// Advance the simulation by `dt` seconds and return the new snapshot.
    ///
    /// Never fails: invalid `dt` values are replaced by a default step, and a
    /// paused or disposed engine returns its previous snapshot unchanged.
    fn update(&mut self, dt: f64) -> &Snapshot;

    /// The most recent snapshot without advancing time.
    fn snapshot(&self) -> &Snapshot;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// Applies a partial parameter update given as JSON.
    ///
    /// Keys not present are left unchanged. Returns an error and applies
    /// nothing if any present key has the wrong type or an unusable value.
    fn apply_params(&mut self, patch: &Value) -> Result<(), EngineError>;
}
