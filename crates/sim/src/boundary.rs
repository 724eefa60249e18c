//! Tunnel geometry: inlet profile, particle recycling, and wall collisions.

use glam::Vec3;

use crate::params::{InletProfile, SimulationParams, TunnelBounds};
use crate::particles::ParticleSystem;

/// How far past a wall a particle may drift during integration before it
/// is treated as escaped.
pub const WALL_PADDING: f32 = 0.05;
/// Distance past the outlet that triggers recycling.
pub const OUTLET_MARGIN: f32 = 0.5;
/// Distance behind the inlet that triggers recycling.
pub const BACKFLOW_MARGIN: f32 = 1.5;
/// Respawned particles land in `[x.min, x.min + INLET_DEPTH)`.
pub const INLET_DEPTH: f32 = 0.1;
/// Fraction of wall-normal velocity kept after a bounce.
pub const WALL_BOUNCE: f32 = 0.5;
/// Floor for cross-section half-extents in the parabolic profile.
const MIN_HALF_EXTENT: f32 = 1e-3;

/// Owns the tunnel bounds and applies inlet, outlet, and wall rules.
#[derive(Debug, Clone)]
pub struct BoundarySystem {
    bounds: TunnelBounds,
}

impl BoundarySystem {
    pub fn new(bounds: TunnelBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &TunnelBounds {
        &self.bounds
    }

    pub fn set_bounds(&mut self, bounds: TunnelBounds) {
        self.bounds = bounds;
    }

    /// Per-frame hook for moving or resizing boundaries. Currently a no-op.
    pub fn prepare_step(&mut self, _params: &SimulationParams, _sim_time: f64) {}

    /// Inlet velocity at cross-section point `(y, z)`; see [`inlet_profile_velocity`].
    pub fn inlet_velocity(&self, y: f32, z: f32, params: &SimulationParams) -> Vec3 {
        inlet_profile_velocity(&self.bounds, y, z, params)
    }

    /// Moves every particle that left the tunnel back to the inlet.
    ///
    /// A particle is recycled if it escaped the y/z cross-section by more
    /// than [`WALL_PADDING`], passed the outlet by [`OUTLET_MARGIN`], or
    /// drifted [`BACKFLOW_MARGIN`] behind the inlet. Recycled particles get
    /// the inlet velocity at their new position. Returns how many moved.
    pub fn recycle(
        &self,
        particles: &mut ParticleSystem,
        params: &SimulationParams,
        _sim_time: f64,
    ) -> usize {
        let b = &self.bounds;
        let mut recycled = 0;
        for i in 0..particles.len() {
            let (x, y, z) = (particles.x[i], particles.y[i], particles.z[i]);
            let escaped = y < b.y.0 - WALL_PADDING
                || y > b.y.1 + WALL_PADDING
                || z < b.z.0 - WALL_PADDING
                || z > b.z.1 + WALL_PADDING;
            let overshot = x > b.x.1 + OUTLET_MARGIN;
            let backflow = x < b.x.0 - BACKFLOW_MARGIN;
            if !(escaped || overshot || backflow) {
                continue;
            }
            particles.respawn(i, b, params);
            let v = self.inlet_velocity(particles.y[i], particles.z[i], params);
            particles.vx[i] = v.x;
            particles.vy[i] = v.y;
            particles.vz[i] = v.z;
            recycled += 1;
        }
        recycled
    }

    /// Clamps y/z into the walls, reflecting and damping the normal velocity.
    pub fn enforce(&self, particles: &mut ParticleSystem) {
        let b = &self.bounds;
        for i in 0..particles.len() {
            bounce(&mut particles.y[i], &mut particles.vy[i], b.y);
            bounce(&mut particles.z[i], &mut particles.vz[i], b.z);
        }
    }
}

/// Inlet velocity at cross-section point `(y, z)` of `bounds`.
///
/// Uniform: `(wind, 0, 0)` everywhere. Parabolic: `wind * max(0, 1 - r²)`
/// along x, where `r` is the distance from the cross-section center
/// normalized by the half-extents on each axis.
pub fn inlet_profile_velocity(
    bounds: &TunnelBounds,
    y: f32,
    z: f32,
    params: &SimulationParams,
) -> Vec3 {
    match params.inlet_profile {
        InletProfile::Uniform => Vec3::new(params.wind_speed, 0.0, 0.0),
        InletProfile::Parabolic => {
            let (cy, cz) = bounds.cross_center();
            let (hy, hz) = bounds.cross_half_extents();
            let ny = (y - cy) / hy.max(MIN_HALF_EXTENT);
            let nz = (z - cz) / hz.max(MIN_HALF_EXTENT);
            let r2 = ny * ny + nz * nz;
            Vec3::new(params.wind_speed * (1.0 - r2).max(0.0), 0.0, 0.0)
        }
    }
}

fn bounce(pos: &mut f32, vel: &mut f32, (lo, hi): (f32, f32)) {
    if *pos < lo {
        *pos = lo;
        *vel = -*vel * WALL_BOUNCE;
    } else if *pos > hi {
        *pos = hi;
        *vel = -*vel * WALL_BOUNCE;
    }
}
