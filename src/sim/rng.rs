//! Seeded hazard placement RNG
//!
//! Terrain hazards are laid out with a 32-bit linear congruential generator so
//! the same `terrain_seed` always yields the same craters, mountains and gates.

use rand::RngCore;
use serde::{Deserialize, Serialize};

const LCG_MUL: u32 = 1_664_525;
const LCG_INC: u32 = 1_013_904_223;
const TWO_POW_32: f64 = 4_294_967_296.0;
/// Largest f32 below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// `s = s * 1664525 + 1013904223 (mod 2^32)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainLcg {
    state: u32,
}

impl TerrainLcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance and return a draw in `[0, 1)`
    pub fn draw(&mut self) -> f32 {
        let s = self.step();
        ((s as f64 / TWO_POW_32) as f32).min(BELOW_ONE)
    }

    /// Draw uniformly in `[lo, hi)`
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.draw()
    }

    /// Draw in `[-1, 1)`
    pub fn signed(&mut self) -> f32 {
        self.draw() * 2.0 - 1.0
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        self.state
    }
}

impl RngCore for TerrainLcg {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
