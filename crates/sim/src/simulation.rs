//! The `Simulation` façade: owns every subsystem and steps them in order.

use serde_json::{json, Map, Value};
use wind_tunnel_core::{Engine, EngineError, Snapshot, Xorshift64};

use crate::boundary::BoundarySystem;
use crate::curl::CurlNoiseField;
use crate::noise::NoiseField;
use crate::obstacle::{obstacles_from_json, Obstacle};
use crate::params::{
    SimulationParams, SimulationParamsPatch, VisualizationParams, VisualizationParamsPatch,
};
use crate::particles::{clamp_dt, ParticleSystem, MAX_DT};
use crate::vortex::VortexSystem;

/// Wind tunnel flow simulation.
///
/// Each [`update`](Self::update) runs, strictly in this order: vortex
/// shedding, boundary preparation, then particle advection (which itself
/// recycles, integrates, appends trails, and bounces off walls). The result
/// is a deep-copied [`Snapshot`] cached until the next frame.
///
/// Configuration changes that affect buffer sizes or geometry never resize
/// in place: the affected subsystem is rebuilt and swapped in between frames.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: SimulationParams,
    visualization: VisualizationParams,
    obstacles: Vec<Obstacle>,
    sim_time: f64,
    frame: u64,
    paused: bool,
    disposed: bool,
    snapshot: Snapshot,
    boundary: BoundarySystem,
    vortices: VortexSystem,
    curl: CurlNoiseField,
    particles: ParticleSystem,
    /// Source of particle generators for rebuilds.
    rng: Xorshift64,
}

impl Simulation {
    /// Builds a simulation with the particle field spread through the whole
    /// tunnel.
    ///
    /// `seed` derives two independent generators: one seeds the turbulence
    /// noise, the other drives particle placement and inlet jitter.
    pub fn new(params: SimulationParams, visualization: VisualizationParams, seed: u64) -> Self {
        let visualization = visualization.normalized();
        let mut master = Xorshift64::new(seed);
        let noise_seed = master.fork().next_u32();
        let jitter = master.fork();

        let boundary = BoundarySystem::new(params.tunnel_bounds);
        let mut particles =
            ParticleSystem::new(params.particle_count, visualization.trail_length, jitter);
        particles.seed_fill(&params.tunnel_bounds, &params);

        let snapshot = particles.build_snapshot(visualization.show_trails, 0.0, 0);
        tracing::debug!(
            seed,
            noise_seed,
            particles = params.particle_count,
            trail_length = visualization.trail_length,
            "simulation created"
        );
        Self {
            params,
            visualization,
            obstacles: Vec::new(),
            sim_time: 0.0,
            frame: 0,
            paused: false,
            disposed: false,
            snapshot,
            boundary,
            vortices: VortexSystem::new(),
            curl: CurlNoiseField::new(NoiseField::new(noise_seed)),
            particles,
            rng: master,
        }
    }

    /// Builds a simulation from JSON parameter objects, resolving defaults.
    pub fn from_json(params: &Value, visualization: &Value, seed: u64) -> Self {
        Self::new(
            SimulationParams::from_json(params),
            VisualizationParams::from_json(visualization),
            seed,
        )
    }

    /// Advances one frame by `dt` seconds and returns the fresh snapshot.
    ///
    /// `dt` is clamped to `(0, MAX_DT]`, with non-positive or non-finite
    /// values replaced by the default step. While paused or after
    /// [`dispose`](Self::dispose) the previous snapshot is returned and time
    /// does not advance.
    pub fn update(&mut self, dt: f64) -> &Snapshot {
        if self.paused || self.disposed {
            return &self.snapshot;
        }
        // Clamp before narrowing: huge finite f64 steps overflow f32.
        let dt = if dt.is_finite() {
            dt.min(f64::from(MAX_DT))
        } else {
            dt
        };
        let dt = clamp_dt(dt as f32);
        self.sim_time += f64::from(dt);
        self.frame += 1;

        self.vortices
            .update(&self.params, &self.obstacles, self.sim_time);
        self.boundary.prepare_step(&self.params, self.sim_time);
        self.particles.advect(
            dt,
            &self.params,
            &self.obstacles,
            &self.boundary,
            &self.vortices,
            &self.curl,
            self.sim_time,
        );

        self.snapshot = self.particles.build_snapshot(
            self.visualization.show_trails,
            self.sim_time,
            self.frame,
        );
        &self.snapshot
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Shallow-merges `patch` into the simulation parameters.
    ///
    /// A new `particle_count` rebuilds the particle field with every particle
    /// entering at the inlet. New `tunnel_bounds` rebuild the boundary.
    pub fn set_params(&mut self, patch: &SimulationParamsPatch) {
        let next = self.params.merged(patch);
        let count_changed = next.particle_count != self.params.particle_count;
        let bounds_changed = next.tunnel_bounds != self.params.tunnel_bounds;
        self.params = next;

        if bounds_changed {
            self.boundary = BoundarySystem::new(self.params.tunnel_bounds);
            tracing::debug!(bounds = ?self.params.tunnel_bounds, "rebuilt boundary");
        }
        if count_changed {
            let mut particles = self.fresh_particles();
            particles.respawn_all(&self.params.tunnel_bounds, &self.params);
            self.particles = particles;
            tracing::debug!(particles = self.params.particle_count, "rebuilt particle field at inlet");
        }
    }

    /// Merges `patch` into the visualization options.
    ///
    /// A new `trail_length` rebuilds the particle field spread through the
    /// whole tunnel, unlike a `particle_count` change in
    /// [`set_params`](Self::set_params) which starts everything at the inlet.
    pub fn set_visualization(&mut self, patch: &VisualizationParamsPatch) {
        let next = self.visualization.merged(patch);
        let trail_changed = next.trail_length != self.visualization.trail_length;
        self.visualization = next;

        if trail_changed {
            let mut particles = self.fresh_particles();
            particles.seed_fill(&self.params.tunnel_bounds, &self.params);
            self.particles = particles;
            tracing::debug!(trail_length = self.visualization.trail_length, "rebuilt particle field");
        }
    }

    /// Replaces the obstacle list wholesale.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn visualization(&self) -> &VisualizationParams {
        &self.visualization
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn vortices(&self) -> &VortexSystem {
        &self.vortices
    }

    /// Reseeds the particle field, drops all vortices, and rewinds time.
    /// Parameters, obstacles, and the paused flag are kept.
    pub fn reset(&mut self) {
        let mut particles = self.fresh_particles();
        particles.seed_fill(&self.params.tunnel_bounds, &self.params);
        self.particles = particles;
        self.vortices.clear();
        self.sim_time = 0.0;
        self.frame = 0;
        self.snapshot = self
            .particles
            .build_snapshot(self.visualization.show_trails, 0.0, 0);
        tracing::debug!("simulation reset");
    }

    /// Stops the simulation for good. Later updates return the last
    /// snapshot. Calling this twice is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.obstacles.clear();
        self.vortices.clear();
        tracing::debug!(frame = self.frame, "simulation disposed");
    }

    /// Schema for every key [`Engine::apply_params`] accepts.
    pub fn schema() -> Value {
        let mut schema = match SimulationParams::schema() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        schema.insert(
            "visualization".into(),
            json!({
                "type": "object",
                "properties": VisualizationParams::schema(),
                "description": "Trail sizing and snapshot contents"
            }),
        );
        schema.insert(
            "obstacles".into(),
            json!({
                "type": "array",
                "default": [],
                "description": "Obstacles, each {\"shape\": \"sphere\", \"position\", \"radius\"} or {\"shape\": \"box\", \"position\", \"half_extents\"}"
            }),
        );
        Value::Object(schema)
    }

    fn fresh_particles(&mut self) -> ParticleSystem {
        ParticleSystem::new(
            self.params.particle_count,
            self.visualization.trail_length,
            self.rng.fork(),
        )
    }
}

impl Engine for Simulation {
    fn update(&mut self, dt: f64) -> &Snapshot {
        Simulation::update(self, dt)
    }

    fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Simulation parameters at the top level, visualization options under
    /// `"visualization"`, and the obstacle list under `"obstacles"`.
    fn params(&self) -> Value {
        let mut out = self.params.to_json();
        if let Value::Object(map) = &mut out {
            map.insert("visualization".into(), self.visualization.to_json());
            map.insert("obstacles".into(), json!(self.obstacles));
        }
        out
    }

    fn param_schema(&self) -> Value {
        Simulation::schema()
    }

    fn apply_params(&mut self, patch: &Value) -> Result<(), EngineError> {
        if !patch.is_object() {
            return Err(EngineError::InvalidParam {
                name: "params".into(),
                reason: "expected a JSON object".into(),
            });
        }
        let sim = SimulationParamsPatch::from_json(patch)?;
        let vis = match patch.get("visualization").filter(|v| !v.is_null()) {
            Some(v) => Some(VisualizationParamsPatch::from_json(v)?),
            None => None,
        };
        let obstacles = match patch.get("obstacles").filter(|v| !v.is_null()) {
            Some(Value::Array(items)) => Some(obstacles_from_json(items)?),
            Some(other) => {
                return Err(EngineError::ParamTypeMismatch {
                    name: "obstacles".into(),
                    expected: "array".into(),
                    got: wind_tunnel_core::params::json_type_name(other).into(),
                })
            }
            None => None,
        };

        self.set_params(&sim);
        if let Some(vis) = vis {
            self.set_visualization(&vis);
        }
        if let Some(obstacles) = obstacles {
            self.set_obstacles(obstacles);
        }
        Ok(())
    }
}
