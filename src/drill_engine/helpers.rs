//! Small shared utilities: seeded RNG construction, shuffling, and the
//! zero-padded counters the HUD shows.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seeded when a seed is given, otherwise from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    }
}

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Four-digit zero-padded counter, clamped to `0..=9999`.
pub fn pad4(value: usize) -> String {
    format!("{:04}", value.min(9_999))
}

/// Rough run length shown before a session starts: five seconds per item.
pub fn estimated_seconds(total: usize) -> usize {
    total * 5
}
