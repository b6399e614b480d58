//! Uniform random source helpers shared by the procedural generators
//!
//! Every generator takes the random source as an argument so callers can
//! inject a seeded `StdRng` in tests and an entropy-seeded one in production.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draw a uniform value in `[0, 1)`
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Draw a uniform value in `[low, high)`
pub fn between<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + unit(rng) * (high - low)
}

/// Pick a uniform index into a collection of `len` items. `len` must be > 0.
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    let index = (unit(rng) * len as f64).floor() as usize;
    index.min(len.saturating_sub(1))
}

/// Uniform integer in the inclusive range `[min, max]`
pub fn int_in_range<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let span = f64::from(max - min + 1);
    min + ((unit(rng) * span).floor() as u32).min(max - min)
}

/// Random source for production use, seeded from system entropy or a fixed seed
pub fn system_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_index_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(pick_index(&mut rng, 5) < 5);
        }
    }

    #[test]
    fn test_int_in_range_handles_inverted_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let v = int_in_range(&mut rng, 20, 10);
            assert!((10..=20).contains(&v));
        }
    }

    #[test]
    fn test_between_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let v = between(&mut rng, 0.8, 1.2);
            assert!((0.8..1.2).contains(&v));
        }
    }

    #[test]
    fn test_seeded_system_rng_is_reproducible() {
        let mut a = system_rng(Some(42));
        let mut b = system_rng(Some(42));
        assert_eq!(unit(&mut a), unit(&mut b));
    }
}
