//! Seeded 4D value noise over space and time.

/// Hash-based value noise on the integer lattice of (x, y, z, t).
///
/// Each lattice corner gets a pseudo-random value in [-1, 1] from an integer
/// hash of its coordinates and the construction seed. Samples blend the 16
/// corners surrounding the query point (8 spatial corners on two time slices)
/// with smoothstep-faded quadrilinear interpolation.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u32,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Samples the field. Always in [-1, 1]; identical inputs give identical output.
    pub fn noise3(&self, x: f32, y: f32, z: f32, t: f32) -> f32 {
        let (x0, fx) = split(x);
        let (y0, fy) = split(y);
        let (z0, fz) = split(z);
        let (t0, ft) = split(t);

        let u = fade(fx);
        let v = fade(fy);
        let w = fade(fz);
        let s = fade(ft);

        let slice0 = self.trilinear(x0, y0, z0, t0, u, v, w);
        let slice1 = self.trilinear(x0, y0, z0, t0.wrapping_add(1), u, v, w);
        lerp(slice0, slice1, s).clamp(-1.0, 1.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn trilinear(&self, x0: i32, y0: i32, z0: i32, t: i32, u: f32, v: f32, w: f32) -> f32 {
        let x1 = x0.wrapping_add(1);
        let y1 = y0.wrapping_add(1);
        let z1 = z0.wrapping_add(1);

        let c000 = self.corner(x0, y0, z0, t);
        let c100 = self.corner(x1, y0, z0, t);
        let c010 = self.corner(x0, y1, z0, t);
        let c110 = self.corner(x1, y1, z0, t);
        let c001 = self.corner(x0, y0, z1, t);
        let c101 = self.corner(x1, y0, z1, t);
        let c011 = self.corner(x0, y1, z1, t);
        let c111 = self.corner(x1, y1, z1, t);

        let near = lerp(lerp(c000, c100, u), lerp(c010, c110, u), v);
        let far = lerp(lerp(c001, c101, u), lerp(c011, c111, u), v);
        lerp(near, far, w)
    }

    /// Lattice value in [-1, 1].
    fn corner(&self, x: i32, y: i32, z: i32, t: i32) -> f32 {
        let h = hash4(self.seed, x, y, z, t);
        (h & 0x00FF_FFFF) as f32 / 0x00FF_FFFF as f32 * 2.0 - 1.0
    }
}

/// Multiply/xor integer hash of a 4D lattice point.
fn hash4(seed: u32, x: i32, y: i32, z: i32, t: i32) -> u32 {
    let mut h = seed
        ^ (x as u32).wrapping_mul(0x8DA6_B343)
        ^ (y as u32).wrapping_mul(0xD816_3841)
        ^ (z as u32).wrapping_mul(0xCB1A_B31F)
        ^ (t as u32).wrapping_mul(0x1656_67B1);
    h = (h ^ (h >> 13)).wrapping_mul(0x5BD1_E995);
    h ^= h >> 15;
    h = h.wrapping_mul(0x27D4_EB2D);
    h ^ (h >> 16)
}

/// Integer lattice cell and fractional offset within it.
fn split(v: f32) -> (i32, f32) {
    let f = v.floor();
    (f as i32, v - f)
}

/// Smoothstep fade: zero slope at both lattice ends.
fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
