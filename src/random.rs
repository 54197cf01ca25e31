//! Random number sources for the stochastic generators
//!
//! Generators treat a source as an opaque zero-argument function returning a
//! real number (a [`Draw`]). [`DistributionKind`] names the shapes that can be
//! configured and turns them into draws backed by a seeded [`StdRng`], so
//! every run is reproducible from its seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A boxed random source
pub type Draw = Box<dyn FnMut() -> f64 + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DistributionKind {
    /// Uniform over `[0, 1)`
    Uniform,
    /// Normal distribution, unbounded
    Gauss {
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_sigma")]
        sigma: f64,
    },
    /// Smaller of two uniforms, skewed towards 0
    Low,
    /// Mean of two uniforms, peaked at 0.5
    Mid,
    /// Larger of two uniforms, skewed towards 1
    High,
}

fn default_sigma() -> f64 {
    1.0
}

impl Default for DistributionKind {
    fn default() -> Self {
        DistributionKind::Gauss {
            mean: 0.0,
            sigma: 1.0,
        }
    }
}

impl DistributionKind {
    /// Turn this distribution into a draw seeded with `seed`
    pub fn into_draw(self, seed: u64) -> Draw {
        let mut rng = StdRng::seed_from_u64(seed);
        Box::new(move || self.sample(&mut rng))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            DistributionKind::Uniform => uniform(rng),
            DistributionKind::Gauss { mean, sigma } => gauss(rng, mean, sigma),
            DistributionKind::Low => low(rng),
            DistributionKind::Mid => mid(rng),
            DistributionKind::High => high(rng),
        }
    }

    /// Range the draws are normally expected in
    pub fn natural_range(&self) -> (f64, f64) {
        match *self {
            DistributionKind::Gauss { mean, sigma } => {
                (mean - 4.0 * sigma.abs(), mean + 4.0 * sigma.abs())
            }
            _ => (0.0, 1.0),
        }
    }
}

pub fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Box-Muller transform
pub fn gauss<R: Rng + ?Sized>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    // 1 - u keeps the log argument in (0, 1]
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    mean + sigma * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

pub fn low<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>().min(rng.gen::<f64>())
}

pub fn mid<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.gen::<f64>() + rng.gen::<f64>()) / 2.0
}

pub fn high<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>().max(rng.gen::<f64>())
}

/// True with probability `p`; values outside [0, 1] saturate
pub fn odds<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen_bool(p.clamp(0.0, 1.0))
}

/// Linearly map `value` from `[old_min, old_max]` onto `[new_min, new_max]`
pub fn rescale(value: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    new_min + (value - old_min) * (new_max - new_min) / (old_max - old_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_draws_repeat() {
        let mut a = DistributionKind::Uniform.into_draw(7);
        let mut b = DistributionKind::Uniform.into_draw(7);
        for _ in 0..16 {
            assert_eq!(a(), b());
        }
    }

    #[test]
    fn test_skewed_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            for value in [low(&mut rng), mid(&mut rng), high(&mut rng)] {
                assert!((0.0..1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_low_high_skew() {
        let mut rng = StdRng::seed_from_u64(2);
        let n = 4000;
        let low_mean: f64 = (0..n).map(|_| low(&mut rng)).sum::<f64>() / n as f64;
        let high_mean: f64 = (0..n).map(|_| high(&mut rng)).sum::<f64>() / n as f64;
        assert!(low_mean < 0.4, "low mean was {low_mean}");
        assert!(high_mean > 0.6, "high mean was {high_mean}");
    }

    #[test]
    fn test_gauss_centered() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 4000;
        let mean: f64 = (0..n).map(|_| gauss(&mut rng, 2.0, 0.5)).sum::<f64>() / n as f64;
        assert!((mean - 2.0).abs() < 0.1, "mean was {mean}");
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(0.5, 0.0, 1.0, 0.0, 127.0), 63.5);
        assert_eq!(rescale(-4.0, -4.0, 4.0, 0.0, 9.0), 0.0);
        assert_eq!(rescale(4.0, -4.0, 4.0, 0.0, 9.0), 9.0);
    }
}
