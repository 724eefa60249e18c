//! Divergence-free turbulence from the curl of a noise vector potential.

use glam::Vec3;

use crate::noise::NoiseField;

/// Default spatial frequency applied to world positions.
pub const DEFAULT_SPATIAL_SCALE: f32 = 0.35;
/// Default rate at which the potential evolves over simulation time.
pub const DEFAULT_TIME_SCALE: f32 = 0.25;
/// Central-difference step, in scaled noise coordinates.
const CURL_EPS: f32 = 0.01;

/// Offsets that decorrelate the three potential channels sampled from one
/// [`NoiseField`].
const CHANNEL_OFFSETS: [Vec3; 3] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(31.416, 47.853, 12.793),
    Vec3::new(-19.123, 5.271, 83.519),
];

/// Turbulence field `curl(A)` where each component of the potential `A` is a
/// phase-shifted sample of the same noise.
///
/// The curl of any smooth potential has zero divergence, so the field swirls
/// without sources or sinks and particles do not bunch up.
#[derive(Debug, Clone)]
pub struct CurlNoiseField {
    noise: NoiseField,
    spatial_scale: f32,
    time_scale: f32,
}

impl CurlNoiseField {
    pub fn new(noise: NoiseField) -> Self {
        Self::with_scales(noise, DEFAULT_SPATIAL_SCALE, DEFAULT_TIME_SCALE)
    }

    pub fn with_scales(noise: NoiseField, spatial_scale: f32, time_scale: f32) -> Self {
        Self {
            noise,
            spatial_scale,
            time_scale,
        }
    }

    /// Samples the turbulence velocity at world position `(x, y, z)` and time `t`.
    ///
    /// Central differences at the six points `p ± eps` on each axis; each point
    /// reads the two potential channels its partials need.
    pub fn sample(&self, x: f32, y: f32, z: f32, t: f32) -> Vec3 {
        let p = Vec3::new(x, y, z) * self.spatial_scale;
        let ts = t * self.time_scale;
        let e = CURL_EPS;
        let inv = 1.0 / (2.0 * e);

        let dx = Vec3::new(e, 0.0, 0.0);
        let dy = Vec3::new(0.0, e, 0.0);
        let dz = Vec3::new(0.0, 0.0, e);

        let d_az_dy = (self.channel(2, p + dy, ts) - self.channel(2, p - dy, ts)) * inv;
        let d_ay_dz = (self.channel(1, p + dz, ts) - self.channel(1, p - dz, ts)) * inv;
        let d_ax_dz = (self.channel(0, p + dz, ts) - self.channel(0, p - dz, ts)) * inv;
        let d_az_dx = (self.channel(2, p + dx, ts) - self.channel(2, p - dx, ts)) * inv;
        let d_ay_dx = (self.channel(1, p + dx, ts) - self.channel(1, p - dx, ts)) * inv;
        let d_ax_dy = (self.channel(0, p + dy, ts) - self.channel(0, p - dy, ts)) * inv;

        Vec3::new(d_az_dy - d_ay_dz, d_ax_dz - d_az_dx, d_ay_dx - d_ax_dy)
    }

    fn channel(&self, c: usize, p: Vec3, t: f32) -> f32 {
        let q = p + CHANNEL_OFFSETS[c];
        self.noise.noise3(q.x, q.y, q.z, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> CurlNoiseField {
        CurlNoiseField::new(NoiseField::new(2024))
    }

    #[test]
    fn sample_is_deterministic() {
        let a = field();
        let b = field();
        let va = a.sample(1.2, -0.7, 0.4, 3.5);
        let vb = b.sample(1.2, -0.7, 0.4, 3.5);
        assert_eq!(va, vb);
    }

    #[test]
    fn sample_is_finite_and_bounded() {
        let f = field();
        for i in 0..500 {
            let s = i as f32 * 0.091;
            let v = f.sample(s - 8.0, (s * 1.3).sin() * 2.0, (s * 0.7).cos() * 2.0, s * 0.05);
            assert!(v.is_finite(), "non-finite curl at sample {i}");
            // Smoothstep value noise has slope at most 3 per axis.
            assert!(v.abs().max_element() < 7.0, "unexpectedly large curl {v} at {i}");
        }
    }

    #[test]
    fn field_produces_motion() {
        let f = field();
        let total: f32 = (0..100)
            .map(|i| f.sample(i as f32 * 0.3, 0.1, -0.2, 0.0).length())
            .sum();
        assert!(total > 1.0, "curl field should not be identically zero");
    }

    #[test]
    fn continuous_across_lattice_lines() {
        let f = field();
        // x * scale crosses an integer lattice coordinate between these samples.
        let x_lattice = 1.0 / DEFAULT_SPATIAL_SCALE;
        let before = f.sample(x_lattice - 1e-3, 0.3, 0.3, 0.0);
        let after = f.sample(x_lattice + 1e-3, 0.3, 0.3, 0.0);
        assert!((before - after).length() < 0.1, "{before} vs {after}");
    }

    #[test]
    fn divergence_is_small() {
        let f = field();
        let h = 0.05;
        for i in 0..20 {
            let p = Vec3::new(i as f32 * 0.41 - 4.0, 0.25, -0.6);
            let div = (f.sample(p.x + h, p.y, p.z, 0.0).x - f.sample(p.x - h, p.y, p.z, 0.0).x
                + f.sample(p.x, p.y + h, p.z, 0.0).y
                - f.sample(p.x, p.y - h, p.z, 0.0).y
                + f.sample(p.x, p.y, p.z + h, 0.0).z
                - f.sample(p.x, p.y, p.z - h, 0.0).z)
                / (2.0 * h);
            let scale = f.sample(p.x, p.y, p.z, 0.0).length().max(1.0);
            assert!(div.abs() < 0.5 * scale, "divergence {div} at {p}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn small_perturbations_give_small_changes(
                x in -8.0_f32..8.0,
                y in -2.0_f32..2.0,
                z in -2.0_f32..2.0,
                t in 0.0_f32..50.0,
            ) {
                let f = field();
                let a = f.sample(x, y, z, t);
                let b = f.sample(x + 1e-3, y - 1e-3, z + 1e-3, t);
                prop_assert!((a - b).length() < 0.1, "jump from {a} to {b}");
            }
        }
    }
}
