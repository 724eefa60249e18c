#![deny(unsafe_code)]
//! Core types and traits for the wind-tunnel flow engine.
//!
//! Provides the `Engine` trait, the `Snapshot` data contract consumed by
//! renderers, `EngineError`, the `Xorshift64` PRNG, JSON parameter helpers,
//! and `RunSpec` for reproducible headless runs.

pub mod engine;
pub mod error;
pub mod params;
pub mod prng;
pub mod run_spec;
pub mod snapshot;

pub use engine::Engine;
pub use error::EngineError;
pub use prng::Xorshift64;
pub use run_spec::RunSpec;
pub use snapshot::Snapshot;
