//! Obstacles placed in the tunnel by the host application.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wind_tunnel_core::EngineError;

/// Smallest sphere radius used in force and heat falloffs.
pub const MIN_OBSTACLE_RADIUS: f32 = 1e-3;

/// A solid body in the flow, supplied by the caller and never mutated by the engine.
///
/// Only spheres deflect particles, shed vortices, or produce heat. Boxes are
/// accepted and carried through but are inert in this engine.
///
/// JSON form: `{"shape": "sphere", "position": [x, y, z], "radius": r}` or
/// `{"shape": "box", "position": [x, y, z], "half_extents": [hx, hy, hz]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Obstacle {
    Sphere { position: Vec3, radius: f32 },
    Box { position: Vec3, half_extents: Vec3 },
}

impl Obstacle {
    pub fn sphere(position: Vec3, radius: f32) -> Self {
        Obstacle::Sphere { position, radius }
    }

    pub fn cuboid(position: Vec3, half_extents: Vec3) -> Self {
        Obstacle::Box {
            position,
            half_extents,
        }
    }

    pub fn position(&self) -> Vec3 {
        match *self {
            Obstacle::Sphere { position, .. } | Obstacle::Box { position, .. } => position,
        }
    }

    /// Center and radius (floored at [`MIN_OBSTACLE_RADIUS`]) for spheres.
    pub fn as_sphere(&self) -> Option<(Vec3, f32)> {
        match *self {
            Obstacle::Sphere { position, radius } => {
                Some((position, radius.max(MIN_OBSTACLE_RADIUS)))
            }
            Obstacle::Box { .. } => None,
        }
    }

    /// Parses one obstacle description.
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        serde_json::from_value(value.clone())
            .map_err(|e| EngineError::InvalidObstacle(format!("{e} in {value}")))
    }
}

/// The first sphere in the list: the only wake source for vortex shedding.
pub fn first_sphere(obstacles: &[Obstacle]) -> Option<(Vec3, f32)> {
    obstacles.iter().find_map(Obstacle::as_sphere)
}

/// Parses a list of obstacle descriptions, failing on the first bad entry.
pub fn obstacles_from_json(values: &[Value]) -> Result<Vec<Obstacle>, EngineError> {
    values.iter().map(Obstacle::from_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_sphere() {
        let o = Obstacle::from_json(&json!({
            "shape": "sphere",
            "position": [1.0, 2.0, 3.0],
            "radius": 0.5
        }))
        .unwrap();
        assert_eq!(o, Obstacle::sphere(Vec3::new(1.0, 2.0, 3.0), 0.5));
    }

    #[test]
    fn parses_box() {
        let o = Obstacle::from_json(&json!({
            "shape": "box",
            "position": [0.0, 0.0, 0.0],
            "half_extents": [1.0, 0.5, 0.25]
        }))
        .unwrap();
        assert_eq!(o.position(), Vec3::ZERO);
        assert!(o.as_sphere().is_none());
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let err = Obstacle::from_json(&json!({"shape": "cone", "position": [0, 0, 0]})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidObstacle(_)));
    }

    #[test]
    fn degenerate_radius_is_floored() {
        let o = Obstacle::sphere(Vec3::ZERO, 0.0);
        let (_, r) = o.as_sphere().unwrap();
        assert_eq!(r, MIN_OBSTACLE_RADIUS);
    }

    #[test]
    fn first_sphere_skips_boxes() {
        let list = [
            Obstacle::cuboid(Vec3::ZERO, Vec3::ONE),
            Obstacle::sphere(Vec3::X, 2.0),
            Obstacle::sphere(Vec3::Y, 3.0),
        ];
        assert_eq!(first_sphere(&list), Some((Vec3::X, 2.0)));
        assert_eq!(first_sphere(&list[..1]), None);
    }

    #[test]
    fn list_parse_fails_on_first_bad_entry() {
        let values = vec![
            json!({"shape": "sphere", "position": [0, 0, 0], "radius": 1}),
            json!({"shape": "sphere", "position": "origin", "radius": 1}),
        ];
        assert!(obstacles_from_json(&values).is_err());
        assert_eq!(obstacles_from_json(&values[..1]).unwrap().len(), 1);
    }

    #[test]
    fn json_round_trip() {
        let o = Obstacle::cuboid(Vec3::new(1.0, -1.0, 0.5), Vec3::splat(0.25));
        let v = serde_json::to_value(o).unwrap();
        assert_eq!(v["shape"], "box");
        assert_eq!(Obstacle::from_json(&v).unwrap(), o);
    }
}
