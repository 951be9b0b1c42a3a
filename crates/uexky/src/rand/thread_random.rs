use ::rand::{Rng, rng};

use crate::RandSource;

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This type does **not** store the RNG itself; it accesses the thread-local
/// generator on each call, so it is zero-sized and may be shared across
/// threads freely.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }

    fn rand_below(&self, bound: u64) -> u64 {
        if bound == 0 {
            0
        } else {
            rng().random_range(0..bound)
        }
    }
}
