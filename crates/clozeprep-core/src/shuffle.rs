//! Fisher–Yates shuffle over an explicitly seeded RNG.
//!
//! All randomness in the pipeline (example order, entity-id pools) flows
//! through a caller-provided [`oorandom::Rand32`] so runs are reproducible.

use oorandom::Rand32;

/// Shuffles a slice in place, uniformly at random.
pub fn shuffle<T>(rng: &mut Rand32, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.rand_range(0..(i as u32 + 1)) as usize;
        items.swap(i, j);
    }
}
