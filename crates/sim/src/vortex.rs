//! Procedural vortex shedding behind the leading sphere obstacle.
//!
//! Emulates an alternating (Kármán-like) wake without solving for it: point
//! vortices are spawned at a wind-dependent period just downstream of the
//! obstacle, on alternating sides, and fade out linearly over a fixed life.

use glam::Vec3;

use crate::obstacle::{first_sphere, Obstacle};
use crate::params::SimulationParams;
use crate::particles::DEFAULT_DT;

/// Shedding period is `SHED_PERIOD_SCALE / wind_speed`, clamped to the range below.
const SHED_PERIOD_SCALE: f32 = 1.2;
const MIN_SHED_PERIOD: f32 = 0.08;
const MAX_SHED_PERIOD: f32 = 1.5;
/// Wind speed floor used when computing the period.
const MIN_SHED_WIND: f32 = 0.1;
/// Spawn point downstream of the surface, in obstacle radii.
const DOWNSTREAM_OFFSET: f32 = 0.35;
/// Lateral spawn offset from the wake axis, in obstacle radii.
const LATERAL_OFFSET: f32 = 0.6;
const STRENGTH_PER_WIND: f32 = 0.8;
const CORE_RADIUS_FACTOR: f32 = 0.6;
const VORTEX_LIFE: f32 = 2.5;

/// A decaying point vortex. Sampling ignores `position.z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vortex {
    pub position: Vec3,
    pub strength: f32,
    pub radius: f32,
    pub age: f32,
    pub life: f32,
    /// Rotation direction, `+1.0` or `-1.0`.
    pub sign: f32,
}

impl Vortex {
    /// 1 at spawn, 0 at expiry.
    fn decay(&self) -> f32 {
        (1.0 - self.age / self.life).clamp(0.0, 1.0)
    }
}

/// Owns the live vortices and the shedding clock.
#[derive(Debug, Clone)]
pub struct VortexSystem {
    vortices: Vec<Vortex>,
    last_time: Option<f64>,
    since_spawn: f32,
    next_sign: f32,
}

impl Default for VortexSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VortexSystem {
    pub fn new() -> Self {
        Self {
            vortices: Vec::new(),
            last_time: None,
            since_spawn: 0.0,
            next_sign: 1.0,
        }
    }

    pub fn vortices(&self) -> &[Vortex] {
        &self.vortices
    }

    /// Drops every vortex and restarts the shedding clock.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Ages, prunes, and possibly spawns one vortex.
    ///
    /// `dt` is inferred from the previous call's `sim_time`, falling back to
    /// [`DEFAULT_DT`] on the first call and whenever time does not advance.
    /// After this returns, no vortex has `age >= life`.
    pub fn update(&mut self, params: &SimulationParams, obstacles: &[Obstacle], sim_time: f64) {
        let dt = match self.last_time {
            Some(prev) if sim_time > prev => (sim_time - prev) as f32,
            _ => DEFAULT_DT,
        };
        self.last_time = Some(sim_time);

        for v in &mut self.vortices {
            v.age += dt;
        }
        self.vortices.retain(|v| v.age < v.life);

        let Some((center, radius)) = first_sphere(obstacles) else {
            return;
        };

        self.since_spawn += dt;
        let period = (SHED_PERIOD_SCALE / params.wind_speed.max(MIN_SHED_WIND))
            .clamp(MIN_SHED_PERIOD, MAX_SHED_PERIOD);
        if self.since_spawn < period {
            return;
        }
        self.since_spawn = 0.0;

        let sign = self.next_sign;
        self.next_sign = -self.next_sign;
        let position = center
            + Vec3::new(
                radius * (1.0 + DOWNSTREAM_OFFSET),
                sign * radius * LATERAL_OFFSET,
                0.0,
            );
        let vortex = Vortex {
            position,
            strength: params.wind_speed * STRENGTH_PER_WIND,
            radius: radius * CORE_RADIUS_FACTOR,
            age: 0.0,
            life: VORTEX_LIFE,
            sign,
        };
        tracing::trace!(x = position.x, y = position.y, sign, "shed vortex");
        self.vortices.push(vortex);
    }

    /// Velocity induced at `p` by all live vortices, in the X–Y plane.
    ///
    /// Each vortex contributes a regularized point-vortex swirl: the
    /// perpendicular of the offset scaled by a Gaussian core, the remaining
    /// life fraction, and `1 / (r² + radius²)`, finite even at `r = 0`.
    pub fn sample_velocity(&self, p: Vec3) -> Vec3 {
        self.vortices.iter().fold(Vec3::ZERO, |acc, v| {
            let dx = p.x - v.position.x;
            let dy = p.y - v.position.y;
            let r2 = dx * dx + dy * dy;
            let core2 = v.radius * v.radius;
            if core2 <= 0.0 {
                return acc;
            }
            let falloff = (-r2 / core2).exp();
            let magnitude = v.strength * v.sign * falloff * v.decay() / (r2 + core2);
            acc + Vec3::new(-dy * magnitude, dx * magnitude, 0.0)
        })
    }
}
