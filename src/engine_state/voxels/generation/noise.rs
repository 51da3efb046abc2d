//! # Coherent Noise
//!
//! The noise primitive behind every terrain decision. A [`CoherentNoise`] source yields
//! smooth values in [0, 1]; [`NoiseField`] layers the world seed and per-pass offsets
//! on top so independent passes sampling the same position stay decorrelated.

use cgmath::Point3;
use ::noise::{NoiseFn, Perlin};

/// A smooth, deterministic 2-D noise function with values in [0, 1].
pub trait CoherentNoise: Send + Sync {
    /// Samples the noise at `(x, y)`.
    fn sample_2d(&self, x: f64, y: f64) -> f64;
}

/// Perlin noise remapped from [-1, 1] to [0, 1].
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    /// Creates a Perlin source with its permutation table seeded by `seed`.
    pub fn new(seed: u32) -> Self {
        PerlinNoise {
            perlin: Perlin::new(seed),
        }
    }
}

impl CoherentNoise for PerlinNoise {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        ((self.perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// A constant noise field. Terrain built on it is flat, which makes heights predictable.
#[derive(Copy, Clone, Debug)]
pub struct FlatNoise(pub f64);

impl CoherentNoise for FlatNoise {
    fn sample_2d(&self, _x: f64, _y: f64) -> f64 {
        self.0
    }
}

/// Nudge keeping sample positions off the integer lattice, where Perlin is always 0.5.
const LATTICE_NUDGE: f64 = 0.1;

/// Seeded noise sampling shared by the terrain sampler and structure generation.
pub struct NoiseField {
    source: Box<dyn CoherentNoise>,
    seed: f64,
    chunk_width: f64,
}

impl NoiseField {
    /// Wraps a noise source for a world with the given seed and chunk width.
    pub fn new(source: Box<dyn CoherentNoise>, seed: i32, chunk_width: usize) -> Self {
        NoiseField {
            source,
            seed: seed as f64,
            chunk_width: chunk_width as f64,
        }
    }

    /// 2-D noise in [0, 1] for the column at `(x, z)`.
    ///
    /// Positions are measured in chunk widths before scaling, so `scale` reads as
    /// "features per chunk".
    pub fn get_2d(&self, x: f64, z: f64, offset: f64, scale: f64) -> f64 {
        let shift = offset + self.seed + LATTICE_NUDGE;
        self.source.sample_2d(
            (x + shift) / self.chunk_width * scale,
            (z + shift) / self.chunk_width * scale,
        )
    }

    /// 3-D threshold test built from the six axis-pair projections of 2-D noise.
    ///
    /// # Returns
    /// `true` if the averaged noise at `position` exceeds `threshold`.
    pub fn get_3d(&self, position: Point3<f64>, offset: f64, scale: f64, threshold: f64) -> bool {
        let shift = offset + self.seed + LATTICE_NUDGE;
        let x = (position.x + shift) * scale;
        let y = (position.y + shift) * scale;
        let z = (position.z + shift) * scale;

        let ab = self.source.sample_2d(x, y);
        let bc = self.source.sample_2d(y, z);
        let ac = self.source.sample_2d(x, z);
        let ba = self.source.sample_2d(y, x);
        let cb = self.source.sample_2d(z, y);
        let ca = self.source.sample_2d(z, x);

        (ab + bc + ac + ba + cb + ca) / 6.0 > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perlin_stays_in_unit_range_and_is_deterministic() {
        let field = NoiseField::new(Box::new(PerlinNoise::new(42)), 42, 16);
        let again = NoiseField::new(Box::new(PerlinNoise::new(42)), 42, 16);
        for _ in 0..500 {
            let x = fastrand::f64() * 4000.0 - 2000.0;
            let z = fastrand::f64() * 4000.0 - 2000.0;
            let value = field.get_2d(x, z, 0.0, 0.3);
            assert!((0.0..=1.0).contains(&value));
            assert_eq!(value, again.get_2d(x, z, 0.0, 0.3));
        }
    }

    #[test]
    fn flat_noise_thresholds() {
        let field = NoiseField::new(Box::new(FlatNoise(0.5)), 7, 16);
        let position = Point3::new(3.0, 4.0, 5.0);
        assert!(field.get_3d(position, 0.0, 0.1, 0.4));
        assert!(!field.get_3d(position, 0.0, 0.1, 0.5));
        assert_eq!(field.get_2d(1.0, 2.0, 100.0, 2.0), 0.5);
    }
}
