mod evaluator_tests;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::encoding::{NUM_FEATURES, NUM_VARIANTS};
use crate::network::{Network, HIDDEN_SIZE};

/// Deterministic network with small weights, so accumulator sums stay far
/// from the i16 range even over long update chains.
pub fn test_network(seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);

    let accumulator_weights = (0..NUM_FEATURES * HIDDEN_SIZE)
        .map(|_| rng.gen_range(-48..=48))
        .collect();
    let accumulator_biases = (0..HIDDEN_SIZE)
        .map(|_| rng.gen_range(-128..=128))
        .collect();
    let output_weights = (0..NUM_VARIANTS * 2 * HIDDEN_SIZE)
        .map(|_| rng.gen_range(-64..=64))
        .collect();
    let output_biases = (0..NUM_VARIANTS)
        .map(|_| rng.gen_range(-4096..=4096))
        .collect();

    Network::from_parts(
        accumulator_weights,
        accumulator_biases,
        output_weights,
        output_biases,
    )
}
