//! Fixed-capacity per-particle history of positions and heat.

/// Trail history for `count` particles, `trail_length` samples each.
///
/// Samples are stored oldest first in two flat buffers: positions
/// (`count * trail_length * 3`) and heat (`count * trail_length`). Each
/// particle owns a contiguous block, so advancing a trail is one
/// `copy_within` per buffer.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    count: usize,
    trail_length: usize,
    positions: Vec<f32>,
    heat: Vec<f32>,
}

impl TrailBuffer {
    /// Creates a zeroed buffer. `trail_length` is floored at 1.
    pub fn new(count: usize, trail_length: usize) -> Self {
        let trail_length = trail_length.max(1);
        Self {
            count,
            trail_length,
            positions: vec![0.0; count * trail_length * 3],
            heat: vec![0.0; count * trail_length],
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn trail_length(&self) -> usize {
        self.trail_length
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn heat(&self) -> &[f32] {
        &self.heat
    }

    /// Fills every sample of particle `i` with `(x, y, z)` and zero heat.
    pub fn init(&mut self, i: usize, x: f32, y: f32, z: f32) {
        let len = self.trail_length;
        for slot in self.positions[i * len * 3..(i + 1) * len * 3].chunks_exact_mut(3) {
            slot.copy_from_slice(&[x, y, z]);
        }
        self.heat[i * len..(i + 1) * len].fill(0.0);
    }

    /// Appends one sample per particle, discarding each particle's oldest.
    ///
    /// Reads the first `count` entries of each input slice; `count` is
    /// capped at the buffer's particle count.
    pub fn push_all(&mut self, xs: &[f32], ys: &[f32], zs: &[f32], heats: &[f32], count: usize) {
        let len = self.trail_length;
        let n = count.min(self.count);
        for i in 0..n {
            let p = &mut self.positions[i * len * 3..(i + 1) * len * 3];
            p.copy_within(3.., 0);
            p[(len - 1) * 3..].copy_from_slice(&[xs[i], ys[i], zs[i]]);

            let h = &mut self.heat[i * len..(i + 1) * len];
            h.copy_within(1.., 0);
            h[len - 1] = heats[i];
        }
    }

    /// Zeroes all heat samples of particle `i`.
    pub fn clear_heat(&mut self, i: usize) {
        let len = self.trail_length;
        self.heat[i * len..(i + 1) * len].fill(0.0);
    }

    /// Position samples of particle `i`, oldest first.
    pub fn trail(&self, i: usize) -> &[f32] {
        let len = self.trail_length;
        &self.positions[i * len * 3..(i + 1) * len * 3]
    }

    /// Heat samples of particle `i`, oldest first.
    pub fn trail_heat(&self, i: usize) -> &[f32] {
        let len = self.trail_length;
        &self.heat[i * len..(i + 1) * len]
    }
}
