//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunable parameters for genome mutation, speciation, and the evolve
/// cycle.
///
/// Defaults match the canonical values: per-call mutation probabilities
/// of 0.05 / 0.03 / 0.01 / 0.9 / 0.1, compatibility threshold 1.25, cull
/// fraction 0.75, maturity age 500 ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeatConfig {
    /// Number of input nodes per genome.
    pub input_size: usize,
    /// Number of output nodes per genome.
    pub output_size: usize,
    /// Probability of attempting an add-connection mutation per
    /// `mutate` call.
    pub add_connection_prob: f64,
    /// Probability of attempting an add-node (connection split) mutation.
    pub add_node_prob: f64,
    /// Probability of toggling a random connection's enabled flag.
    pub toggle_connection_prob: f64,
    /// Probability of shifting a random connection's weight by a uniform
    /// delta in `[-1, 1]`.
    pub weight_shift_prob: f64,
    /// Probability of resampling a random connection's weight uniformly
    /// in `[-1, 1]`.
    pub weight_randomise_prob: f64,
    /// Retry budget for mutations that can pick an invalid target.
    pub mutation_attempts: u32,
    /// Compatibility-distance threshold for specie membership.
    pub compatibility_threshold: f64,
    /// Fraction of each specie culled per evolve cycle.
    pub cull_fraction: f64,
    /// Minimum genome age (in ticks) before an agent is speciated or
    /// culled.
    pub maturity_age: u64,
    /// Seed for the population's RNG. `None` seeds from the OS, which is
    /// what a live run wants; tests pin it for reproducibility.
    pub seed: Option<u64>,
}

impl NeatConfig {
    /// Config with the canonical parameters for the given network shape.
    #[must_use]
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            ..Self::default()
        }
    }
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            input_size: 2,
            output_size: 1,
            add_connection_prob: 0.05,
            add_node_prob: 0.03,
            toggle_connection_prob: 0.01,
            weight_shift_prob: 0.9,
            weight_randomise_prob: 0.1,
            mutation_attempts: 10,
            compatibility_threshold: 1.25,
            cull_fraction: 0.75,
            maturity_age: 500,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_shape() {
        let config = NeatConfig::new(16, 4);
        assert_eq!(config.input_size, 16);
        assert_eq!(config.output_size, 4);
        assert!((config.compatibility_threshold - 1.25).abs() < 1e-12);
        assert!((config.cull_fraction - 0.75).abs() < 1e-12);
        assert_eq!(config.maturity_age, 500);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = NeatConfig {
            seed: Some(7),
            ..NeatConfig::new(3, 2)
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: NeatConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.input_size, 3);
        assert_eq!(restored.seed, Some(7));
    }
}
