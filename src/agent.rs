//! Recyclable agents: the stable handles the external driver holds.
//!
//! An agent is a slot that genomes move through. The agent's identity
//! (its [`AgentId`]) outlives any single genome: when a genome is culled
//! the agent stays in the population, flagged as awaiting reproduction,
//! and receives a freshly bred genome on the next evolve cycle.

use slotmap::new_key_type;

use crate::error::NeatError;
use crate::genome::{Genome, GenomeSnapshot};
use crate::speciation::SpecieId;

new_key_type! {
    /// Stable handle to one agent in a [`Population`](crate::population::Population).
    pub struct AgentId;
}

/// What an agent's genome slot currently holds.
///
/// `AwaitingReproduction` is a first-class state, not an error: culling
/// puts agents here and the evolve cycle moves them back to `Holding`.
#[derive(Debug, Clone)]
pub enum GenomeSlot {
    /// The agent carries a live genome.
    Holding(Genome),
    /// The genome was culled; a new one arrives on the next evolve cycle.
    AwaitingReproduction,
}

impl GenomeSlot {
    /// The held genome, if any.
    #[must_use]
    pub fn genome(&self) -> Option<&Genome> {
        match self {
            GenomeSlot::Holding(genome) => Some(genome),
            GenomeSlot::AwaitingReproduction => None,
        }
    }

    /// The held genome, mutably.
    pub fn genome_mut(&mut self) -> Option<&mut Genome> {
        match self {
            GenomeSlot::Holding(genome) => Some(genome),
            GenomeSlot::AwaitingReproduction => None,
        }
    }
}

/// One agent: a genome slot plus the bookkeeping the evolve cycle reads.
#[derive(Debug, Clone)]
pub struct Agent {
    pub(crate) slot: GenomeSlot,
    pub(crate) fitness: f64,
    pub(crate) adjusted_fitness: f64,
    pub(crate) age: u64,
    pub(crate) taken: bool,
    pub(crate) specie: Option<SpecieId>,
}

impl Agent {
    /// Create an agent holding `genome`, fitness and age zeroed, not
    /// taken, unspeciated.
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self {
            slot: GenomeSlot::Holding(genome),
            fitness: 0.0,
            adjusted_fitness: 0.0,
            age: 0,
            taken: false,
            specie: None,
        }
    }

    /// The genome slot.
    #[must_use]
    pub fn slot(&self) -> &GenomeSlot {
        &self.slot
    }

    /// The held genome, if any.
    #[must_use]
    pub fn genome(&self) -> Option<&Genome> {
        self.slot.genome()
    }

    /// Raw fitness as last reported by the driver.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Fitness after sharing within the agent's specie.
    #[must_use]
    pub fn adjusted_fitness(&self) -> f64 {
        self.adjusted_fitness
    }

    /// Ticks survived by the current genome.
    #[must_use]
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Whether the driver currently holds this agent.
    #[must_use]
    pub fn is_taken(&self) -> bool {
        self.taken
    }

    /// The specie this agent was last assigned to, if any.
    #[must_use]
    pub fn specie(&self) -> Option<SpecieId> {
        self.specie
    }

    /// Whether the agent's genome has survived at least `maturity_age`
    /// ticks. Immature agents are exempt from culling.
    #[must_use]
    pub fn is_mature(&self, maturity_age: u64) -> bool {
        self.age > maturity_age
    }

    /// Feed `inputs` through the held genome.
    ///
    /// # Errors
    ///
    /// [`NeatError::MissingGenome`] if the slot is awaiting reproduction;
    /// otherwise whatever genome evaluation returns.
    pub fn activate(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NeatError> {
        match &mut self.slot {
            GenomeSlot::Holding(genome) => genome.calculate_output(inputs),
            GenomeSlot::AwaitingReproduction => Err(NeatError::MissingGenome),
        }
    }

    /// Install a freshly bred genome, resetting fitness, adjusted
    /// fitness, and age. The previous genome's record must not leak into
    /// the new one's.
    pub fn install_genome(&mut self, genome: Genome) {
        self.slot = GenomeSlot::Holding(genome);
        self.fitness = 0.0;
        self.adjusted_fitness = 0.0;
        self.age = 0;
    }

    /// Drop the held genome, moving the slot to awaiting reproduction.
    pub fn clear_genome(&mut self) {
        self.slot = GenomeSlot::AwaitingReproduction;
    }

    /// Snapshot of the held genome, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<GenomeSnapshot> {
        self.genome().map(Genome::snapshot)
    }
}
