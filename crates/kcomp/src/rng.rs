use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// pi * 100_000
const RANDOM_SEED: u64 = 314159;

/// The generator [`Trainer::fit`](crate::Trainer::fit) uses: fixed seed, so
/// repeated fits of the same data agree.
pub fn new() -> Xoshiro256PlusPlus {
    from_seed(RANDOM_SEED)
}

pub fn from_seed(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}
