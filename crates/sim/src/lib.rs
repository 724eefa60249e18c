#![deny(unsafe_code)]
//! Particle wind-tunnel flow simulation.
//!
//! Thousands of massless tracers are advected through a box-shaped tunnel
//! past sphere obstacles. The flow is qualitative rather than physical:
//! - an inlet velocity profile ([`boundary`])
//! - divergence-free curl-noise turbulence ([`curl`], [`noise`])
//! - a procedurally shed alternating vortex wake ([`vortex`])
//! - obstacle deflection and proximity heat ([`particles`])
//!
//! [`Simulation`] owns all of it and produces one
//! [`Snapshot`](wind_tunnel_core::Snapshot) per frame.

pub mod boundary;
pub mod curl;
pub mod noise;
pub mod obstacle;
pub mod params;
pub mod particles;
pub mod simulation;
pub mod trail;
pub mod vortex;

pub use obstacle::Obstacle;
pub use params::{
    InletProfile, SimulationParams, SimulationParamsPatch, TunnelBounds, VisualizationParams,
    VisualizationParamsPatch,
};
pub use simulation::Simulation;
