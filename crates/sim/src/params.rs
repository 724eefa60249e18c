//! Simulation and visualization parameters.
//!
//! The engine only ever sees fully resolved structs. Defaults and JSON
//! parsing live here, at the edge: [`SimulationParams::from_json`] resolves a
//! complete parameter set leniently, while the `*Patch` types parse partial
//! updates strictly and report type errors instead of guessing.
//!
//! Values are not range-checked. Out-of-range or NaN inputs flow through to
//! the simulation unchanged.

use serde_json::{json, Value};
use wind_tunnel_core::params::{
    opt_param_bool, opt_param_f64, opt_param_interval, opt_param_str, opt_param_usize, param_bool,
    param_f64, param_usize,
};
use wind_tunnel_core::EngineError;

pub const DEFAULT_WIND_SPEED: f32 = 3.0;
pub const DEFAULT_PARTICLE_COUNT: usize = 4000;
pub const DEFAULT_TURBULENCE: f32 = 0.4;
pub const DEFAULT_VISCOSITY: f32 = 0.3;
/// Heat decay rate per second.
pub const DEFAULT_TRAIL_HEAT_DECAY: f32 = 1.5;
pub const DEFAULT_RESET_TRAIL_HEAT_ON_RESPAWN: bool = true;
pub const DEFAULT_TRAIL_LENGTH: usize = 16;
/// Shorter trails are raised to this length.
pub const MIN_TRAIL_LENGTH: usize = 1;
pub const DEFAULT_SHOW_TRAILS: bool = true;

/// Velocity profile imposed at the inlet plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InletProfile {
    /// Full wind speed across the whole cross-section.
    #[default]
    Uniform,
    /// Full speed on the tunnel axis, falling to zero at the walls.
    Parabolic,
}

impl InletProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            InletProfile::Uniform => "uniform",
            InletProfile::Parabolic => "parabolic",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "uniform" => Ok(InletProfile::Uniform),
            "parabolic" => Ok(InletProfile::Parabolic),
            other => Err(EngineError::InvalidParam {
                name: "inlet_profile".into(),
                reason: format!("unknown profile '{other}', expected uniform or parabolic"),
            }),
        }
    }
}

/// Closed `[min, max]` intervals on each axis.
///
/// Flow travels along +x: the inlet is at `x.0`, the outlet at `x.1`, and the
/// y/z intervals bound the walled cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelBounds {
    pub x: (f32, f32),
    pub y: (f32, f32),
    pub z: (f32, f32),
}

impl Default for TunnelBounds {
    fn default() -> Self {
        Self {
            x: (-8.0, 8.0),
            y: (-2.5, 2.5),
            z: (-2.5, 2.5),
        }
    }
}

impl TunnelBounds {
    pub fn new(x: (f32, f32), y: (f32, f32), z: (f32, f32)) -> Self {
        Self { x, y, z }
    }

    /// Cross-section center `(y, z)`.
    pub fn cross_center(&self) -> (f32, f32) {
        ((self.y.0 + self.y.1) * 0.5, (self.z.0 + self.z.1) * 0.5)
    }

    /// Cross-section half-extents `(y, z)`, not floored.
    pub fn cross_half_extents(&self) -> (f32, f32) {
        ((self.y.1 - self.y.0) * 0.5, (self.z.1 - self.z.0) * 0.5)
    }

    fn to_json(self) -> Value {
        json!({
            "x": [self.x.0, self.x.1],
            "y": [self.y.0, self.y.1],
            "z": [self.z.0, self.z.1],
        })
    }

    /// Parses `{"x": [min, max], "y": [...], "z": [...]}`. All three axes are required.
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        if !value.is_object() {
            return Err(EngineError::ParamTypeMismatch {
                name: "tunnel_bounds".into(),
                expected: "object".into(),
                got: wind_tunnel_core::params::json_type_name(value).into(),
            });
        }
        let axis = |name: &str| -> Result<(f32, f32), EngineError> {
            opt_param_interval(value, name)?
                .map(|(a, b)| (a as f32, b as f32))
                .ok_or_else(|| EngineError::InvalidParam {
                    name: format!("tunnel_bounds.{name}"),
                    reason: "missing axis interval".into(),
                })
        };
        Ok(Self {
            x: axis("x")?,
            y: axis("y")?,
            z: axis("z")?,
        })
    }
}

/// Fully resolved flow parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Free-stream speed along +x.
    pub wind_speed: f32,
    pub particle_count: usize,
    /// Curl-noise gain, 0 disables turbulence.
    pub turbulence: f32,
    /// In [0, 1]. Higher values pull particles toward the target flow faster.
    pub viscosity: f32,
    pub tunnel_bounds: TunnelBounds,
    pub inlet_profile: InletProfile,
    pub trail_heat_decay: f32,
    pub reset_trail_heat_on_respawn: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            wind_speed: DEFAULT_WIND_SPEED,
            particle_count: DEFAULT_PARTICLE_COUNT,
            turbulence: DEFAULT_TURBULENCE,
            viscosity: DEFAULT_VISCOSITY,
            tunnel_bounds: TunnelBounds::default(),
            inlet_profile: InletProfile::default(),
            trail_heat_decay: DEFAULT_TRAIL_HEAT_DECAY,
            reset_trail_heat_on_respawn: DEFAULT_RESET_TRAIL_HEAT_ON_RESPAWN,
        }
    }
}

impl SimulationParams {
    /// Resolves a complete parameter set from JSON, falling back to defaults
    /// for missing or mistyped keys.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            wind_speed: param_f64(params, "wind_speed", d.wind_speed as f64) as f32,
            particle_count: param_usize(params, "particle_count", d.particle_count),
            turbulence: param_f64(params, "turbulence", d.turbulence as f64) as f32,
            viscosity: param_f64(params, "viscosity", d.viscosity as f64) as f32,
            tunnel_bounds: params
                .get("tunnel_bounds")
                .and_then(|v| TunnelBounds::from_json(v).ok())
                .unwrap_or(d.tunnel_bounds),
            inlet_profile: params
                .get("inlet_profile")
                .and_then(Value::as_str)
                .and_then(|s| InletProfile::from_name(s).ok())
                .unwrap_or(d.inlet_profile),
            trail_heat_decay: param_f64(params, "trail_heat_decay", d.trail_heat_decay as f64)
                as f32,
            reset_trail_heat_on_respawn: param_bool(
                params,
                "reset_trail_heat_on_respawn",
                d.reset_trail_heat_on_respawn,
            ),
        }
    }

    /// Returns a copy with every field present in `patch` replaced.
    pub fn merged(&self, patch: &SimulationParamsPatch) -> Self {
        Self {
            wind_speed: patch.wind_speed.unwrap_or(self.wind_speed),
            particle_count: patch.particle_count.unwrap_or(self.particle_count),
            turbulence: patch.turbulence.unwrap_or(self.turbulence),
            viscosity: patch.viscosity.unwrap_or(self.viscosity),
            tunnel_bounds: patch.tunnel_bounds.unwrap_or(self.tunnel_bounds),
            inlet_profile: patch.inlet_profile.unwrap_or(self.inlet_profile),
            trail_heat_decay: patch.trail_heat_decay.unwrap_or(self.trail_heat_decay),
            reset_trail_heat_on_respawn: patch
                .reset_trail_heat_on_respawn
                .unwrap_or(self.reset_trail_heat_on_respawn),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "wind_speed": self.wind_speed,
            "particle_count": self.particle_count,
            "turbulence": self.turbulence,
            "viscosity": self.viscosity,
            "tunnel_bounds": self.tunnel_bounds.to_json(),
            "inlet_profile": self.inlet_profile.as_str(),
            "trail_heat_decay": self.trail_heat_decay,
            "reset_trail_heat_on_respawn": self.reset_trail_heat_on_respawn,
        })
    }

    pub fn schema() -> Value {
        json!({
            "wind_speed": {
                "type": "number",
                "default": DEFAULT_WIND_SPEED,
                "min": 0.0,
                "max": 20.0,
                "description": "Free-stream speed along the tunnel axis"
            },
            "particle_count": {
                "type": "integer",
                "default": DEFAULT_PARTICLE_COUNT,
                "min": 0,
                "max": 200000,
                "description": "Number of tracer particles (changing it rebuilds the particle field)"
            },
            "turbulence": {
                "type": "number",
                "default": DEFAULT_TURBULENCE,
                "min": 0.0,
                "max": 2.0,
                "description": "Curl-noise turbulence gain"
            },
            "viscosity": {
                "type": "number",
                "default": DEFAULT_VISCOSITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Blend rate toward the target flow; higher converges faster"
            },
            "tunnel_bounds": {
                "type": "object",
                "default": TunnelBounds::default().to_json(),
                "description": "Axis intervals {x, y, z} as [min, max]; flow enters at x.min"
            },
            "inlet_profile": {
                "type": "string",
                "default": InletProfile::default().as_str(),
                "enum": ["uniform", "parabolic"],
                "description": "Inlet velocity profile across the cross-section"
            },
            "trail_heat_decay": {
                "type": "number",
                "default": DEFAULT_TRAIL_HEAT_DECAY,
                "min": 0.0,
                "max": 10.0,
                "description": "Exponential decay rate of obstacle proximity heat, per second"
            },
            "reset_trail_heat_on_respawn": {
                "type": "boolean",
                "default": DEFAULT_RESET_TRAIL_HEAT_ON_RESPAWN,
                "description": "Clear a particle's heat and trail heat when it re-enters at the inlet"
            }
        })
    }
}

/// Partial update to [`SimulationParams`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationParamsPatch {
    pub wind_speed: Option<f32>,
    pub particle_count: Option<usize>,
    pub turbulence: Option<f32>,
    pub viscosity: Option<f32>,
    pub tunnel_bounds: Option<TunnelBounds>,
    pub inlet_profile: Option<InletProfile>,
    pub trail_heat_decay: Option<f32>,
    pub reset_trail_heat_on_respawn: Option<bool>,
}

impl SimulationParamsPatch {
    /// Parses a patch, rejecting present keys of the wrong type.
    pub fn from_json(patch: &Value) -> Result<Self, EngineError> {
        let f32_of = |name: &str| opt_param_f64(patch, name).map(|v| v.map(|f| f as f32));
        Ok(Self {
            wind_speed: f32_of("wind_speed")?,
            particle_count: opt_param_usize(patch, "particle_count")?,
            turbulence: f32_of("turbulence")?,
            viscosity: f32_of("viscosity")?,
            tunnel_bounds: match patch.get("tunnel_bounds").filter(|v| !v.is_null()) {
                Some(v) => Some(TunnelBounds::from_json(v)?),
                None => None,
            },
            inlet_profile: opt_param_str(patch, "inlet_profile")?
                .map(InletProfile::from_name)
                .transpose()?,
            trail_heat_decay: f32_of("trail_heat_decay")?,
            reset_trail_heat_on_respawn: opt_param_bool(patch, "reset_trail_heat_on_respawn")?,
        })
    }
}

/// Rendering-facing options the engine needs to size its buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualizationParams {
    /// Samples kept per trail, at least 1.
    pub trail_length: usize,
    /// Whether snapshots carry trail arrays.
    pub show_trails: bool,
}

impl Default for VisualizationParams {
    fn default() -> Self {
        Self {
            trail_length: DEFAULT_TRAIL_LENGTH,
            show_trails: DEFAULT_SHOW_TRAILS,
        }
    }
}

impl VisualizationParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            trail_length: param_usize(params, "trail_length", DEFAULT_TRAIL_LENGTH)
                .max(MIN_TRAIL_LENGTH),
            show_trails: param_bool(params, "show_trails", DEFAULT_SHOW_TRAILS),
        }
    }

    pub fn merged(&self, patch: &VisualizationParamsPatch) -> Self {
        Self {
            trail_length: patch
                .trail_length
                .unwrap_or(self.trail_length)
                .max(MIN_TRAIL_LENGTH),
            show_trails: patch.show_trails.unwrap_or(self.show_trails),
        }
    }

    /// Copy with `trail_length` raised to [`MIN_TRAIL_LENGTH`].
    pub fn normalized(&self) -> Self {
        Self {
            trail_length: self.trail_length.max(MIN_TRAIL_LENGTH),
            ..*self
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "trail_length": self.trail_length,
            "show_trails": self.show_trails,
        })
    }

    pub fn schema() -> Value {
        json!({
            "trail_length": {
                "type": "integer",
                "default": DEFAULT_TRAIL_LENGTH,
                "min": 1,
                "max": 128,
                "description": "Samples per particle trail (changing it reseeds the particle field)"
            },
            "show_trails": {
                "type": "boolean",
                "default": DEFAULT_SHOW_TRAILS,
                "description": "Include trail positions and heat in snapshots"
            }
        })
    }
}

/// Partial update to [`VisualizationParams`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisualizationParamsPatch {
    pub trail_length: Option<usize>,
    pub show_trails: Option<bool>,
}

impl VisualizationParamsPatch {
    pub fn from_json(patch: &Value) -> Result<Self, EngineError> {
        Ok(Self {
            trail_length: opt_param_usize(patch, "trail_length")?,
            show_trails: opt_param_bool(patch, "show_trails")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_uses_defaults_for_empty_json() {
        assert_eq!(SimulationParams::from_json(&json!({})), SimulationParams::default());
        assert_eq!(
            VisualizationParams::from_json(&json!({})),
            VisualizationParams::default()
        );
    }

    #[test]
    fn from_json_extracts_custom_values() {
        let p = SimulationParams::from_json(&json!({
            "wind_speed": 5,
            "particle_count": 100,
            "turbulence": 0.0,
            "viscosity": 0.9,
            "tunnel_bounds": {"x": [-4, 4], "y": [-1, 1], "z": [-1, 2]},
            "inlet_profile": "parabolic",
            "trail_heat_decay": 0.5,
            "reset_trail_heat_on_respawn": false
        }));
        assert_eq!(p.wind_speed, 5.0);
        assert_eq!(p.particle_count, 100);
        assert_eq!(p.turbulence, 0.0);
        assert!((p.viscosity - 0.9).abs() < 1e-6);
        assert_eq!(p.tunnel_bounds, TunnelBounds::new((-4.0, 4.0), (-1.0, 1.0), (-1.0, 2.0)));
        assert_eq!(p.inlet_profile, InletProfile::Parabolic);
        assert!(!p.reset_trail_heat_on_respawn);
    }

    #[test]
    fn from_json_falls_back_on_bad_values() {
        let p = SimulationParams::from_json(&json!({
            "wind_speed": "fast",
            "inlet_profile": "swirl",
            "tunnel_bounds": {"x": [1, -1]}
        }));
        assert_eq!(p, SimulationParams::default());
    }

    #[test]
    fn params_json_round_trips_through_from_json() {
        let p = SimulationParams {
            wind_speed: 7.5,
            inlet_profile: InletProfile::Parabolic,
            ..SimulationParams::default()
        };
        assert_eq!(SimulationParams::from_json(&p.to_json()), p);
    }

    #[test]
    fn patch_only_sets_present_keys() {
        let patch = SimulationParamsPatch::from_json(&json!({"particle_count": 12})).unwrap();
        assert_eq!(
            patch,
            SimulationParamsPatch {
                particle_count: Some(12),
                ..Default::default()
            }
        );
        let merged = SimulationParams::default().merged(&patch);
        assert_eq!(merged.particle_count, 12);
        assert_eq!(merged.wind_speed, DEFAULT_WIND_SPEED);
    }

    #[test]
    fn patch_rejects_wrong_types() {
        assert!(SimulationParamsPatch::from_json(&json!({"viscosity": true})).is_err());
        assert!(SimulationParamsPatch::from_json(&json!({"inlet_profile": "swirl"})).is_err());
        assert!(SimulationParamsPatch::from_json(&json!({"tunnel_bounds": {"x": [0, 1]}})).is_err());
        assert!(VisualizationParamsPatch::from_json(&json!({"trail_length": -3})).is_err());
    }

    #[test]
    fn patch_treats_null_as_absent() {
        let patch = SimulationParamsPatch::from_json(&json!({"tunnel_bounds": null})).unwrap();
        assert_eq!(patch, SimulationParamsPatch::default());
    }

    #[test]
    fn bounds_and_profile_survive_to_json_from_json() {
        let p = SimulationParams {
            tunnel_bounds: TunnelBounds::new((-5.0, 6.0), (-1.5, 1.5), (0.0, 2.0)),
            inlet_profile: InletProfile::Parabolic,
            ..SimulationParams::default()
        };
        let back = SimulationParams::from_json(&p.to_json());
        assert_eq!(back.tunnel_bounds, p.tunnel_bounds);
        assert_eq!(back.inlet_profile, InletProfile::Parabolic);
    }

    #[test]
    fn zero_trail_length_is_raised_to_minimum() {
        let v = VisualizationParams::from_json(&json!({"trail_length": 0}));
        assert_eq!(v.trail_length, MIN_TRAIL_LENGTH);

        let patch = VisualizationParamsPatch::from_json(&json!({"trail_length": 0})).unwrap();
        assert_eq!(VisualizationParams::default().merged(&patch).trail_length, MIN_TRAIL_LENGTH);

        let raw = VisualizationParams {
            trail_length: 0,
            ..VisualizationParams::default()
        };
        assert_eq!(raw.normalized().trail_length, MIN_TRAIL_LENGTH);
    }

    #[test]
    fn bounds_geometry_helpers() {
        let b = TunnelBounds::new((-8.0, 8.0), (-1.0, 3.0), (0.0, 4.0));
        assert_eq!(b.cross_center(), (1.0, 2.0));
        assert_eq!(b.cross_half_extents(), (2.0, 2.0));
    }

    #[test]
    fn schemas_describe_every_param() {
        let sim = SimulationParams::schema();
        for key in SimulationParams::default().to_json().as_object().unwrap().keys() {
            assert!(sim.get(key).is_some(), "schema missing {key}");
            assert!(sim[key].get("default").is_some(), "{key} missing default");
        }
        let vis = VisualizationParams::schema();
        for key in VisualizationParams::default().to_json().as_object().unwrap().keys() {
            assert!(vis.get(key).is_some(), "schema missing {key}");
        }
    }
}
