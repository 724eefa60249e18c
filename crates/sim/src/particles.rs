//! Tracer particle state and the per-frame advection step.
//!
//! Particles are stored as a structure of arrays: one `Vec<f32>` per
//! attribute, all of length [`ParticleSystem::len`]. Trails live in a
//! [`TrailBuffer`] owned alongside them.

use glam::Vec3;
use wind_tunnel_core::{Snapshot, Xorshift64};

use crate::boundary::{inlet_profile_velocity, BoundarySystem, INLET_DEPTH, WALL_PADDING};
use crate::curl::CurlNoiseField;
use crate::obstacle::Obstacle;
use crate::params::{SimulationParams, TunnelBounds};
use crate::trail::TrailBuffer;
use crate::vortex::VortexSystem;

/// Largest step `advect` integrates in one call.
pub const MAX_DT: f32 = 0.05;
/// Step used when the caller passes a non-positive or non-finite `dt`.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Turbulence is clamped per axis to `± wind_speed * TURBULENCE_CEILING`.
const TURBULENCE_CEILING: f32 = 1.0;
/// Gain applied to the vortex wake velocity.
const VORTEX_GAIN: f32 = 0.6;
/// Viscosity 0 maps to `MIN_BLEND`, viscosity 1 to `MAX_BLEND`.
const MIN_BLEND: f32 = 0.02;
const MAX_BLEND: f32 = 0.25;

// Obstacle deflection, radii in units of the sphere radius.
const DEFLECT_SHELL: f32 = 1.05;
const DEFLECT_INFLUENCE: f32 = 2.5;
const PUSH_GAIN: f32 = 4.0;
const AXIAL_DAMPING: f32 = 0.9;
const LATERAL_GAIN: f32 = 0.6;
/// Below this distance from a sphere center the outward normal is undefined.
const NORMAL_EPS: f32 = 1e-5;

// Obstacle heat, radii in units of the sphere radius.
const HEAT_SHELL: f32 = 1.1;
const HEAT_INFLUENCE: f32 = 2.0;

/// Normalizes a frame step: `(0, MAX_DT]` is kept, larger values are
/// clamped to `MAX_DT`, anything else becomes `DEFAULT_DT`.
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_DT)
    } else {
        DEFAULT_DT
    }
}

/// Maps viscosity in [0, 1] linearly onto the velocity blend weight.
///
/// Higher viscosity gives a larger weight, so particles lock onto the target
/// flow faster.
pub fn viscosity_blend(viscosity: f32) -> f32 {
    MIN_BLEND + (MAX_BLEND - MIN_BLEND) * viscosity
}

/// Velocity added by sphere obstacles at `p`.
///
/// For each sphere whose influence radius contains `p`: inside the shell a
/// radial push-out proportional to penetration depth times `base_speed`;
/// anywhere in the influence zone an axial slowdown and a lateral push along
/// `x̂ × n̂`, both scaled by the squared linear falloff from shell to
/// influence edge. Boxes are ignored.
pub fn compute_obstacle_velocity(p: Vec3, obstacles: &[Obstacle], base_speed: f32) -> Vec3 {
    let mut v = Vec3::ZERO;
    for (center, radius) in obstacles.iter().filter_map(Obstacle::as_sphere) {
        let offset = p - center;
        let d = offset.length();
        let influence = radius * DEFLECT_INFLUENCE;
        if d >= influence {
            continue;
        }
        let shell = radius * DEFLECT_SHELL;
        let normal = if d > NORMAL_EPS {
            offset / d
        } else {
            Vec3::NEG_X
        };

        if d < shell {
            v += normal * ((shell - d) * base_speed * PUSH_GAIN);
        }

        let ramp = ((influence - d) / (influence - shell)).clamp(0.0, 1.0);
        let falloff = ramp * ramp;
        v.x -= base_speed * AXIAL_DAMPING * falloff;
        let tangent = Vec3::X.cross(normal).normalize_or_zero();
        v += tangent * (base_speed * LATERAL_GAIN * falloff);
    }
    v
}

/// Proximity heat in [0, 1] at `p`: 1 inside any sphere's heat shell,
/// ramping linearly to 0 at its heat influence radius. Max over spheres.
pub fn compute_obstacle_heat(p: Vec3, obstacles: &[Obstacle]) -> f32 {
    obstacles
        .iter()
        .filter_map(Obstacle::as_sphere)
        .map(|(center, radius)| {
            let d = p.distance(center);
            let shell = radius * HEAT_SHELL;
            let influence = radius * HEAT_INFLUENCE;
            if d <= shell {
                1.0
            } else if d < influence {
                (influence - d) / (influence - shell)
            } else {
                0.0
            }
        })
        .fold(0.0, f32::max)
}

/// Owns every particle attribute and its trail history.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub(crate) x: Vec<f32>,
    pub(crate) y: Vec<f32>,
    pub(crate) z: Vec<f32>,
    pub(crate) vx: Vec<f32>,
    pub(crate) vy: Vec<f32>,
    pub(crate) vz: Vec<f32>,
    pub(crate) speed: Vec<f32>,
    pub(crate) vort: Vec<f32>,
    pub(crate) phase: Vec<f32>,
    pub(crate) heat: Vec<f32>,
    pub(crate) respawns: Vec<u32>,
    trails: TrailBuffer,
    rng: Xorshift64,
}

impl ParticleSystem {
    /// Allocates `count` particles at the origin with zero velocity.
    ///
    /// Call [`seed_fill`](Self::seed_fill) or [`respawn_all`](Self::respawn_all)
    /// before the first `advect`. `rng` drives phases, placement, and the
    /// per-frame inlet jitter.
    pub fn new(count: usize, trail_length: usize, mut rng: Xorshift64) -> Self {
        let phase = (0..count)
            .map(|_| rng.next_range(0.0, std::f32::consts::TAU))
            .collect();
        Self {
            x: vec![0.0; count],
            y: vec![0.0; count],
            z: vec![0.0; count],
            vx: vec![0.0; count],
            vy: vec![0.0; count],
            vz: vec![0.0; count],
            speed: vec![0.0; count],
            vort: vec![0.0; count],
            phase,
            heat: vec![0.0; count],
            respawns: vec![0; count],
            trails: TrailBuffer::new(count, trail_length),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Samples per trail, at least 1.
    pub fn trail_length(&self) -> usize {
        self.trails.trail_length()
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.x[i], self.y[i], self.z[i])
    }

    pub fn velocity(&self, i: usize) -> Vec3 {
        Vec3::new(self.vx[i], self.vy[i], self.vz[i])
    }

    pub fn speeds(&self) -> &[f32] {
        &self.speed
    }

    pub fn vorticity(&self) -> &[f32] {
        &self.vort
    }

    pub fn heat(&self) -> &[f32] {
        &self.heat
    }

    /// How many times each particle has re-entered at the inlet.
    pub fn respawn_counts(&self) -> &[u32] {
        &self.respawns
    }

    pub fn trails(&self) -> &TrailBuffer {
        &self.trails
    }

    /// Scatters every particle uniformly through the whole tunnel volume with
    /// the inlet velocity of its cross-section position, and resets trails.
    pub fn seed_fill(&mut self, bounds: &TunnelBounds, params: &SimulationParams) {
        for i in 0..self.len() {
            let x = self.rng.next_range(bounds.x.0, bounds.x.1);
            let y = self.rng.next_range(bounds.y.0, bounds.y.1);
            let z = self.rng.next_range(bounds.z.0, bounds.z.1);
            let v = inlet_profile_velocity(bounds, y, z, params);
            self.x[i] = x;
            self.y[i] = y;
            self.z[i] = z;
            self.vx[i] = v.x;
            self.vy[i] = v.y;
            self.vz[i] = v.z;
            self.speed[i] = v.length();
            self.vort[i] = 0.0;
            self.heat[i] = 0.0;
            self.trails.init(i, x, y, z);
        }
    }

    /// Places particle `i` just inside the inlet at a random cross-section
    /// point, at rest, and restarts its trail there.
    ///
    /// Heat and trail heat are cleared when
    /// `params.reset_trail_heat_on_respawn` is set.
    pub fn respawn(&mut self, i: usize, bounds: &TunnelBounds, params: &SimulationParams) {
        let x = bounds.x.0 + self.rng.next_range(0.0, INLET_DEPTH);
        let y = self.rng.next_range(bounds.y.0, bounds.y.1);
        let z = self.rng.next_range(bounds.z.0, bounds.z.1);
        self.x[i] = x;
        self.y[i] = y;
        self.z[i] = z;
        self.vx[i] = 0.0;
        self.vy[i] = 0.0;
        self.vz[i] = 0.0;
        self.speed[i] = 0.0;
        if params.reset_trail_heat_on_respawn {
            self.heat[i] = 0.0;
            self.trails.clear_heat(i);
        }
        self.trails.init(i, x, y, z);
        self.respawns[i] = self.respawns[i].saturating_add(1);
    }

    /// Respawns every particle at the inlet.
    pub fn respawn_all(&mut self, bounds: &TunnelBounds, params: &SimulationParams) {
        for i in 0..self.len() {
            self.respawn(i, bounds, params);
        }
    }

    /// Advances every particle by one frame.
    ///
    /// Order matters: recycle first so recycled particles see inlet forces,
    /// then per-particle forces, heat, velocity blend, and integration, then
    /// the trail append, and the wall bounce last. Trails therefore hold the
    /// pre-bounce position for this frame.
    #[allow(clippy::too_many_arguments)]
    pub fn advect(
        &mut self,
        dt: f32,
        params: &SimulationParams,
        obstacles: &[Obstacle],
        boundary: &BoundarySystem,
        vortices: &VortexSystem,
        curl: &CurlNoiseField,
        sim_time: f64,
    ) {
        let dt = clamp_dt(dt);
        boundary.recycle(self, params, sim_time);

        let bounds = *boundary.bounds();
        let t = sim_time as f32;
        let ceiling = Vec3::splat(params.wind_speed.abs() * TURBULENCE_CEILING);
        let blend = viscosity_blend(params.viscosity);
        let heat_keep = (-params.trail_heat_decay * dt).exp();
        let (y_lo, y_hi) = (bounds.y.0 - WALL_PADDING, bounds.y.1 + WALL_PADDING);
        let (z_lo, z_hi) = (bounds.z.0 - WALL_PADDING, bounds.z.1 + WALL_PADDING);

        for i in 0..self.len() {
            let p = self.position(i);

            let jitter = Vec3::new(self.rng.next_f32(), self.rng.next_f32(), self.rng.next_f32());
            let inlet = boundary.inlet_velocity(p.y, p.z, params) * jitter;
            let swirl = curl.sample(p.x, p.y, p.z, t);
            let turbulence = (swirl * params.turbulence).max(-ceiling).min(ceiling);
            let wake = vortices.sample_velocity(p) * VORTEX_GAIN;
            let deflection = compute_obstacle_velocity(p, obstacles, params.wind_speed);
            let target = inlet + turbulence + wake + deflection;

            let proximity = compute_obstacle_heat(p, obstacles);
            self.heat[i] = (self.heat[i] * heat_keep).max(proximity);

            let v = self.velocity(i);
            let v = v + (target - v) * blend;
            let next = p + v * dt;

            self.x[i] = next.x;
            self.y[i] = next.y.clamp(y_lo, y_hi);
            self.z[i] = next.z.clamp(z_lo, z_hi);
            self.vx[i] = v.x;
            self.vy[i] = v.y;
            self.vz[i] = v.z;
            self.speed[i] = v.length();
            self.vort[i] = swirl.length() * params.turbulence;
        }

        let n = self.len();
        self.trails.push_all(&self.x, &self.y, &self.z, &self.heat, n);
        boundary.enforce(self);
    }

    /// Deep copy of the current state. Trail arrays are included only when
    /// `include_trails` is set.
    pub fn build_snapshot(&self, include_trails: bool, sim_time: f64, frame: u64) -> Snapshot {
        let positions = (0..self.len())
            .flat_map(|i| [self.x[i], self.y[i], self.z[i]])
            .collect();
        let (trail_len, trails, trail_heat) = if include_trails {
            (
                self.trails.trail_length(),
                Some(self.trails.positions().to_vec()),
                Some(self.trails.heat().to_vec()),
            )
        } else {
            (0, None, None)
        };
        Snapshot {
            particle_count: self.len(),
            positions,
            speeds: self.speed.clone(),
            vorticity: self.vort.clone(),
            heat: self.heat.clone(),
            phases: self.phase.clone(),
            trail_len,
            trails,
            trail_heat,
            sim_time,
            frame,
        }
    }
}
