//! The population: agent pool, evolve cycle, and the driver-facing API.
//!
//! The population never runs fitness evaluation itself. An external
//! driver requests agents, feeds them inputs through [`activate`],
//! reports fitness, ticks the clock, and periodically calls [`evolve`].
//! Agents are recycled rather than destroyed: culling empties an agent's
//! genome slot and the evolve cycle refills it, so every [`AgentId`] the
//! driver holds stays valid for the population's lifetime.
//!
//! [`activate`]: Population::activate
//! [`evolve`]: Population::evolve

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use slotmap::SlotMap;

use crate::agent::{Agent, AgentId};
use crate::config::NeatConfig;
use crate::error::NeatError;
use crate::genome::{Genome, GenomeSnapshot};
use crate::innovation::InnovationTracker;
use crate::speciation::Speciation;

/// A fixed-size pool of recyclable agents sharing one innovation lineage.
#[derive(Debug)]
pub struct Population {
    config: NeatConfig,
    tracker: InnovationTracker,
    agents: SlotMap<AgentId, Agent>,
    /// Ids the driver may request. Disjoint from `taken`; together they
    /// cover every agent.
    available: Vec<AgentId>,
    taken: HashSet<AgentId>,
    speciation: Speciation,
    generation: u64,
    rng: ChaCha8Rng,
}

impl Population {
    /// Create a population of `size` agents, each holding a minimal
    /// unconnected genome with the configured IO shape.
    ///
    /// With `config.seed` set the whole run is deterministic; otherwise
    /// the RNG is seeded from the OS.
    #[must_use]
    pub fn new(config: NeatConfig, size: usize) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        let mut tracker = InnovationTracker::new();
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut available = Vec::with_capacity(size);
        for _ in 0..size {
            let genome = Genome::new(config.input_size, config.output_size, &mut tracker);
            available.push(agents.insert(Agent::new(genome)));
        }

        log::info!(
            "population of {} agents ({} in, {} out)",
            size,
            config.input_size,
            config.output_size
        );

        Self {
            config,
            tracker,
            agents,
            available,
            taken: HashSet::new(),
            speciation: Speciation::new(),
            generation: 0,
            rng,
        }
    }

    /// The configuration this population runs with.
    #[must_use]
    pub fn config(&self) -> &NeatConfig {
        &self.config
    }

    // ---- pool --------------------------------------------------------

    /// Hand out an agent holding a genome, growing the pool if every
    /// existing agent is already taken.
    ///
    /// A grown agent is seeded by in-specie breeding where species exist,
    /// or with a fresh minimal genome before the first speciation, so the
    /// call never fails.
    pub fn request_agent(&mut self) -> AgentId {
        let pooled = self.available.iter().position(|&id| {
            self.agents
                .get(id)
                .is_some_and(|agent| agent.genome().is_some())
        });
        let id = match pooled {
            Some(index) => self.available.swap_remove(index),
            None => {
                let genome = self.reproduced_genome();
                self.agents.insert(Agent::new(genome))
            }
        };
        if let Some(agent) = self.agents.get_mut(id) {
            agent.taken = true;
        }
        self.taken.insert(id);
        id
    }

    /// Return a taken agent to the pool.
    ///
    /// # Errors
    ///
    /// [`NeatError::UnknownAgent`] for a foreign id,
    /// [`NeatError::AgentNotTaken`] if the agent is already in the pool.
    pub fn release_agent(&mut self, id: AgentId) -> Result<(), NeatError> {
        if !self.agents.contains_key(id) {
            return Err(NeatError::UnknownAgent);
        }
        if !self.taken.remove(&id) {
            return Err(NeatError::AgentNotTaken);
        }
        self.agents[id].taken = false;
        self.available.push(id);
        Ok(())
    }

    /// The agent behind an id.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Iterate over all agents.
    pub fn iter_agents(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents.iter()
    }

    // ---- driving -----------------------------------------------------

    /// Feed `inputs` through an agent's genome.
    ///
    /// # Errors
    ///
    /// [`NeatError::UnknownAgent`] for a foreign id, plus anything agent
    /// activation returns.
    pub fn activate(&mut self, id: AgentId, inputs: &[f64]) -> Result<Vec<f64>, NeatError> {
        self.agents
            .get_mut(id)
            .ok_or(NeatError::UnknownAgent)?
            .activate(inputs)
    }

    /// Record the driver's fitness judgement for an agent. Overwrites,
    /// never accumulates.
    ///
    /// # Errors
    ///
    /// [`NeatError::UnknownAgent`] for a foreign id.
    pub fn set_fitness(&mut self, id: AgentId, fitness: f64) -> Result<(), NeatError> {
        self.agents
            .get_mut(id)
            .ok_or(NeatError::UnknownAgent)?
            .fitness = fitness;
        Ok(())
    }

    /// Advance the population clock: every agent holding a genome ages
    /// by one tick.
    pub fn tick(&mut self) {
        for (_, agent) in &mut self.agents {
            if agent.genome().is_some() {
                agent.age += 1;
            }
        }
    }

    /// Structural snapshot of an agent's genome.
    ///
    /// # Errors
    ///
    /// [`NeatError::UnknownAgent`] for a foreign id,
    /// [`NeatError::MissingGenome`] while the agent awaits reproduction.
    pub fn snapshot(&self, id: AgentId) -> Result<GenomeSnapshot, NeatError> {
        self.agents
            .get(id)
            .ok_or(NeatError::UnknownAgent)?
            .snapshot()
            .ok_or(NeatError::MissingGenome)
    }

    // ---- evolve cycle ------------------------------------------------

    /// Run one evolve cycle: speciate mature agents, share fitness, cull
    /// the weak, and breed replacements into every empty slot.
    ///
    /// Taken agents are never culled; the driver can hold an agent across
    /// any number of cycles. Agents left without a genome and without a
    /// surviving specie to breed from receive a fresh minimal genome, so
    /// the pool never shrinks.
    pub fn evolve(&mut self) {
        self.generation += 1;
        let ids: Vec<AgentId> = self.agents.keys().collect();

        for &id in &ids {
            let needs_specie = self.agents.get(id).is_some_and(|agent| {
                agent.specie().is_none()
                    && agent.genome().is_some()
                    && agent.is_mature(self.config.maturity_age)
            });
            if !needs_specie {
                continue;
            }
            if let Some(specie) =
                self.speciation
                    .assign(id, &self.agents, self.config.compatibility_threshold)
            {
                self.agents[id].specie = Some(specie);
            }
        }

        // Fitness sharing: each member's score is divided by its specie's
        // size, so large species cannot starve small ones of offspring.
        for &id in &ids {
            let Some(specie) = self.agents.get(id).and_then(Agent::specie) else {
                continue;
            };
            let size = self.speciation.get(specie).map_or(1, |s| s.len()).max(1);
            let agent = &mut self.agents[id];
            agent.adjusted_fitness = agent.fitness / size as f64;
        }

        let culled = self.speciation.cull(
            &mut self.agents,
            self.config.cull_fraction,
            self.config.maturity_age,
        );

        let mut bred = 0;
        for &id in &ids {
            let empty = self
                .agents
                .get(id)
                .is_some_and(|agent| agent.genome().is_none());
            if !empty {
                continue;
            }
            let mut genome = self.reproduced_genome();
            genome.mutate(&mut self.tracker, &self.config, &mut self.rng);
            self.agents[id].install_genome(genome);
            bred += 1;
        }

        log::info!(
            "generation {}: {} species, {} culled, {} bred",
            self.generation,
            self.speciation.len(),
            culled,
            bred
        );
    }

    /// Breed one genome from a random specie, falling back to a fresh
    /// minimal genome while no species exist.
    fn reproduced_genome(&mut self) -> Genome {
        self.speciation
            .reproduce(&self.agents, &mut self.rng)
            .unwrap_or_else(|| {
                Genome::new(
                    self.config.input_size,
                    self.config.output_size,
                    &mut self.tracker,
                )
            })
    }

    // ---- stats -------------------------------------------------------

    /// Number of evolve cycles run so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total number of agents currently allocated.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Agents currently in the pool.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Agents currently held by the driver.
    #[must_use]
    pub fn taken_count(&self) -> usize {
        self.taken.len()
    }

    /// Number of live species.
    #[must_use]
    pub fn species_count(&self) -> usize {
        self.speciation.len()
    }

    /// Highest raw fitness across agents holding a genome.
    #[must_use]
    pub fn best_fitness(&self) -> Option<f64> {
        self.agents
            .values()
            .filter(|agent| agent.genome().is_some())
            .map(Agent::fitness)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}
