//! Deterministic shuffle primitives.
//!
//! The permutation used by `order_by: shuffle_deterministic` is pinned to a
//! specific construction so independent implementations produce identical
//! output: the seed string is hashed with 32-bit FNV-1a, the hash seeds a
//! mulberry32 generator yielding floats in `[0, 1)`, and that stream drives
//! a classic Fisher-Yates shuffle. None of these steps may be substituted
//! for another hash or RNG without breaking output stability across runs
//! and implementations.

/// Hash a seed string to an unsigned 32-bit integer with FNV-1a.
pub fn fnv1a_32(input: &str) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for byte in input.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}

/// The mulberry32 generator: a 32-bit state stepped by a fixed increment,
/// mixed, and scaled to `[0, 1)`.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Create a generator from a raw 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Create a generator from a seed string via [`fnv1a_32`].
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(fnv1a_32(seed))
    }

    /// The next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// The next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

/// Classic Fisher-Yates: walk from the last index down, swapping each
/// position with one drawn from the float stream.
pub fn fisher_yates<T>(items: &mut [T], mut next: impl FnMut() -> f64) {
    for i in (1..items.len()).rev() {
        let j = ((next() * ((i + 1) as f64)) as usize).min(i);
        items.swap(i, j);
    }
}

/// Partial Fisher-Yates: fix only the first `take` positions, leaving the
/// tail in whatever order the swaps produced. Used for random sampling,
/// where only the kept prefix matters.
pub fn partial_fisher_yates<T>(items: &mut [T], take: usize, next: &mut dyn FnMut() -> f64) {
    let len = items.len();
    for i in 0..take.min(len) {
        let j = i + (((next() * ((len - i) as f64)) as usize).min(len - i - 1));
        items.swap(i, j);
    }
}
