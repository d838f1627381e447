//! NEAT neuroevolution engine with a recyclable agent pool.
//!
//! The crate implements NeuroEvolution of Augmenting Topologies: genomes
//! start minimal, grow structure through mutation, align by innovation
//! number for crossover, and cluster into species so new topology gets
//! time to settle before it competes. Fitness evaluation lives outside
//! the crate entirely. A driver requests agents from a [`Population`],
//! feeds them inputs, reports fitness, and periodically asks the
//! population to evolve.
//!
//! Agents are recycled rather than destroyed. Culling empties an agent's
//! genome slot; the next evolve cycle breeds a replacement into it. An
//! [`AgentId`] the driver holds therefore stays valid forever, and an
//! agent the driver has taken is never culled out from under it.
//!
//! # Example
//!
//! ```
//! use neat_arena::{NeatConfig, Population};
//!
//! let config = NeatConfig {
//!     seed: Some(42),
//!     ..NeatConfig::new(2, 1)
//! };
//! let mut population = Population::new(config, 16);
//!
//! let agent = population.request_agent();
//! let outputs = population.activate(agent, &[1.0, 0.0]).unwrap();
//! assert_eq!(outputs.len(), 1);
//!
//! population.set_fitness(agent, outputs[0]).unwrap();
//! population.release_agent(agent).unwrap();
//!
//! population.tick();
//! population.evolve();
//! assert_eq!(population.generation(), 1);
//! ```

pub mod activation;
pub mod agent;
pub mod collection;
pub mod config;
pub mod error;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod population;
pub mod speciation;

pub use activation::steep_sigmoid;
pub use agent::{Agent, AgentId, GenomeSlot};
pub use collection::GeneCollection;
pub use config::NeatConfig;
pub use error::NeatError;
pub use gene::{ConnectionGene, Gene, NodeGene, NodeRole};
pub use genome::{Genome, GenomeSnapshot};
pub use innovation::InnovationTracker;
pub use population::Population;
pub use speciation::{Speciation, Specie, SpecieId};
