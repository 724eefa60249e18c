//! Per-frame output handed to renderers.
//!
//! A [`Snapshot`] owns all of its buffers. It is a deep copy of engine state at
//! the end of a frame, so holding one across later `update` calls is safe.

use serde::{Deserialize, Serialize};

/// Read-only view of particle state at the end of one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub particle_count: usize,
    /// Interleaved `[x0, y0, z0, x1, ...]`, length `particle_count * 3`.
    pub positions: Vec<f32>,
    /// Velocity magnitude per particle.
    pub speeds: Vec<f32>,
    /// Turbulence-driven vorticity proxy per particle.
    pub vorticity: Vec<f32>,
    /// Obstacle proximity heat per particle, in [0, 1].
    pub heat: Vec<f32>,
    /// Constant per-particle phase in `[0, 2π)`, for animation offsets.
    #[serde(default)]
    pub phases: Vec<f32>,
    /// Samples per trail. Zero when trails are omitted.
    pub trail_len: usize,
    /// Per particle, oldest to newest, `particle_count * trail_len * 3` floats.
    pub trails: Option<Vec<f32>>,
    /// Heat for each trail sample, `particle_count * trail_len` floats.
    pub trail_heat: Option<Vec<f32>>,
    pub sim_time: f64,
    pub frame: u64,
}

impl Snapshot {
    /// Position of particle `i` as `[x, y, z]`, or `None` if out of range.
    pub fn position(&self, i: usize) -> Option<[f32; 3]> {
        let p = self.positions.get(i * 3..i * 3 + 3)?;
        Some([p[0], p[1], p[2]])
    }

    /// Trail samples of particle `i` (oldest first), or `None` when trails are
    /// omitted or `i` is out of range.
    pub fn trail(&self, i: usize) -> Option<&[f32]> {
        let stride = self.trail_len * 3;
        self.trails.as_ref()?.get(i * stride..(i + 1) * stride)
    }

    /// Mean particle speed, 0 for an empty snapshot.
    pub fn mean_speed(&self) -> f32 {
        if self.speeds.is_empty() {
            return 0.0;
        }
        self.speeds.iter().sum::<f32>() / self.speeds.len() as f32
    }

    /// Largest per-particle heat, 0 for an empty snapshot.
    pub fn max_heat(&self) -> f32 {
        self.heat.iter().copied().fold(0.0, f32::max)
    }
}
