//! Species: clusters of compatible genomes that compete and breed
//! internally.
//!
//! Speciation protects new structure. A fresh topological mutation almost
//! always performs worse before its weights settle, so agents are grouped
//! by compatibility distance and culled only against their own specie,
//! with fitness shared across members so no one specie overruns the
//! population.

use rand::Rng;
use slotmap::{new_key_type, SlotMap};

use crate::agent::{Agent, AgentId};
use crate::genome::Genome;

new_key_type! {
    /// Stable handle to one specie in the registry.
    pub struct SpecieId;
}

/// One cluster of compatible agents.
///
/// The first member is the representative: compatibility checks measure
/// against its genome. Members are agent ids, never genomes, so a
/// member's genome can be culled without disturbing the others.
#[derive(Debug, Clone)]
pub struct Specie {
    members: Vec<AgentId>,
}

impl Specie {
    fn new(representative: AgentId) -> Self {
        Self {
            members: vec![representative],
        }
    }

    /// Member ids, representative first.
    #[must_use]
    pub fn members(&self) -> &[AgentId] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the specie has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `genome` is compatible with this specie's representative.
    fn admits(
        &self,
        genome: &Genome,
        agents: &SlotMap<AgentId, Agent>,
        threshold: f64,
    ) -> bool {
        let Some(representative) = self
            .members
            .first()
            .and_then(|&id| agents.get(id))
            .and_then(Agent::genome)
        else {
            return false;
        };
        Genome::distance(representative, genome) < threshold
    }

    fn add_member(&mut self, agent: AgentId) {
        self.members.push(agent);
    }

    /// Reorder members descending by raw fitness. Members whose genome is
    /// gone sort to the tail.
    fn sort_by_fitness(&mut self, agents: &SlotMap<AgentId, Agent>) {
        self.members.sort_by(|&a, &b| {
            let fitness = |id: AgentId| {
                agents
                    .get(id)
                    .filter(|agent| agent.genome().is_some())
                    .map_or(f64::NEG_INFINITY, Agent::fitness)
            };
            fitness(b)
                .partial_cmp(&fitness(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Cull the weakest eligible members.
    ///
    /// Eligible means mature and not currently taken by the driver. The
    /// doomed count is `floor(eligible * fraction)`, taken from the tail
    /// of the fitness ordering. Culled agents lose their genome and their
    /// specie membership but keep their identity. Returns the number
    /// culled.
    fn kill(
        &mut self,
        agents: &mut SlotMap<AgentId, Agent>,
        fraction: f64,
        maturity_age: u64,
    ) -> usize {
        self.sort_by_fitness(agents);

        let eligible: Vec<AgentId> = self
            .members
            .iter()
            .copied()
            .filter(|&id| {
                agents
                    .get(id)
                    .is_some_and(|agent| agent.is_mature(maturity_age) && !agent.is_taken())
            })
            .collect();

        let doomed_count = (eligible.len() as f64 * fraction).floor() as usize;
        if doomed_count == 0 {
            return 0;
        }

        // Eligible members preserve the fitness ordering, so the tail of
        // the eligible list is the weakest.
        let doomed = &eligible[eligible.len() - doomed_count..];
        for &id in doomed {
            if let Some(agent) = agents.get_mut(id) {
                agent.clear_genome();
                agent.specie = None;
            }
        }
        self.members.retain(|id| !doomed.contains(id));
        doomed_count
    }

    /// Breed one offspring genome from two uniformly chosen members,
    /// fitter parent first. `None` if the specie is empty or a chosen
    /// parent has no genome.
    fn reproduce<R: Rng>(
        &self,
        agents: &SlotMap<AgentId, Agent>,
        rng: &mut R,
    ) -> Option<Genome> {
        if self.members.is_empty() {
            return None;
        }
        let a = self.members[rng.random_range(0..self.members.len())];
        let b = self.members[rng.random_range(0..self.members.len())];

        let parent_a = agents.get(a)?;
        let parent_b = agents.get(b)?;
        let (fitter, other) = if parent_a.fitness() >= parent_b.fitness() {
            (parent_a, parent_b)
        } else {
            (parent_b, parent_a)
        };

        Some(Genome::crossover(fitter.genome()?, other.genome()?, rng))
    }
}

/// The specie registry for one population.
#[derive(Debug, Default)]
pub struct Speciation {
    species: SlotMap<SpecieId, Specie>,
}

impl Speciation {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Whether no species exist yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// The specie behind an id, if still live.
    #[must_use]
    pub fn get(&self, id: SpecieId) -> Option<&Specie> {
        self.species.get(id)
    }

    /// Iterate over all live species.
    pub fn iter(&self) -> impl Iterator<Item = (SpecieId, &Specie)> {
        self.species.iter()
    }

    /// Place an agent into the first compatible specie, founding a new
    /// one if nothing admits it. Returns `None` if the agent is missing
    /// or holds no genome.
    pub fn assign(
        &mut self,
        agent: AgentId,
        agents: &SlotMap<AgentId, Agent>,
        threshold: f64,
    ) -> Option<SpecieId> {
        let genome = agents.get(agent)?.genome()?;

        let target = self
            .species
            .iter()
            .find(|(_, specie)| specie.admits(genome, agents, threshold))
            .map(|(id, _)| id);

        match target {
            Some(id) => {
                self.species[id].add_member(agent);
                Some(id)
            }
            None => Some(self.species.insert(Specie::new(agent))),
        }
    }

    /// Cull every specie, then drop the ones left empty. Returns the
    /// total number of agents culled.
    pub fn cull(
        &mut self,
        agents: &mut SlotMap<AgentId, Agent>,
        fraction: f64,
        maturity_age: u64,
    ) -> usize {
        let mut culled = 0;
        for (id, specie) in &mut self.species {
            let killed = specie.kill(agents, fraction, maturity_age);
            if killed > 0 {
                log::debug!(
                    "culled {} member(s) from specie {:?}, {} remain",
                    killed,
                    id,
                    specie.len()
                );
            }
            culled += killed;
        }
        self.species.retain(|_, specie| !specie.is_empty());
        culled
    }

    /// Breed one offspring from a uniformly chosen specie.
    pub fn reproduce<R: Rng>(
        &self,
        agents: &SlotMap<AgentId, Agent>,
        rng: &mut R,
    ) -> Option<Genome> {
        if self.species.is_empty() {
            return None;
        }
        let pick = rng.random_range(0..self.species.len());
        let (_, specie) = self.species.iter().nth(pick)?;
        specie.reproduce(agents, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::innovation::InnovationTracker;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn spawn(
        agents: &mut SlotMap<AgentId, Agent>,
        tracker: &mut InnovationTracker,
        fitness: f64,
        age: u64,
    ) -> AgentId {
        let mut agent = Agent::new(Genome::new(2, 1, tracker));
        agent.fitness = fitness;
        agent.age = age;
        agents.insert(agent)
    }

    #[test]
    fn test_assign_groups_identical_genomes() {
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut tracker = InnovationTracker::new();
        let mut speciation = Speciation::new();

        let a = spawn(&mut agents, &mut tracker, 0.0, 0);
        let b = spawn(&mut agents, &mut tracker, 0.0, 0);

        let sa = speciation.assign(a, &agents, 1.25).unwrap();
        let sb = speciation.assign(b, &agents, 1.25).unwrap();

        assert_eq!(sa, sb, "identical genomes must share a specie");
        assert_eq!(speciation.len(), 1);
        assert_eq!(speciation.get(sa).unwrap().len(), 2);
    }

    #[test]
    fn test_assign_splits_divergent_genomes() {
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut tracker = InnovationTracker::new();
        let mut speciation = Speciation::new();

        let a = spawn(&mut agents, &mut tracker, 0.0, 0);
        let b = spawn(&mut agents, &mut tracker, 0.0, 0);

        // Push b's genome far away: one matching-free connection with a
        // large weight contributes a big excess term.
        {
            let genome = agents[b].slot.genome_mut().unwrap();
            genome.add_connection(&mut tracker, 0, 2, 3.0).unwrap();
            genome.add_connection(&mut tracker, 1, 2, -3.0).unwrap();
        }

        let sa = speciation.assign(a, &agents, 1.25).unwrap();
        let sb = speciation.assign(b, &agents, 1.25).unwrap();

        assert_ne!(sa, sb);
        assert_eq!(speciation.len(), 2);
    }

    #[test]
    fn test_assign_without_genome_is_none() {
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut tracker = InnovationTracker::new();
        let mut speciation = Speciation::new();

        let a = spawn(&mut agents, &mut tracker, 0.0, 0);
        agents[a].clear_genome();

        assert!(speciation.assign(a, &agents, 1.25).is_none());
        assert!(speciation.is_empty());
    }

    #[test]
    fn test_cull_takes_weakest_tail() {
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut tracker = InnovationTracker::new();
        let mut speciation = Speciation::new();

        // Four mature members, fitness 4, 3, 2, 1.
        let ids: Vec<AgentId> = (0..4)
            .map(|i| spawn(&mut agents, &mut tracker, 4.0 - i as f64, 600))
            .collect();
        for &id in &ids {
            speciation.assign(id, &agents, 1.25).unwrap();
        }
        assert_eq!(speciation.len(), 1);

        // floor(4 * 0.75) = 3 doomed: everyone but the fittest.
        let culled = speciation.cull(&mut agents, 0.75, 500);
        assert_eq!(culled, 3);

        assert!(agents[ids[0]].genome().is_some());
        for &id in &ids[1..] {
            assert!(agents[id].genome().is_none());
            assert!(agents[id].specie().is_none());
        }

        let (_, survivors) = speciation.iter().next().unwrap();
        assert_eq!(survivors.members().to_vec(), vec![ids[0]]);
    }

    #[test]
    fn test_cull_spares_immature_and_taken() {
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut tracker = InnovationTracker::new();
        let mut speciation = Speciation::new();

        let immature = spawn(&mut agents, &mut tracker, 0.0, 10);
        let taken = spawn(&mut agents, &mut tracker, 0.5, 600);
        agents[taken].taken = true;
        let weak = spawn(&mut agents, &mut tracker, 1.0, 600);
        let strong = spawn(&mut agents, &mut tracker, 9.0, 600);

        for id in [immature, taken, weak, strong] {
            speciation.assign(id, &agents, 1.25).unwrap();
        }

        // Only weak and strong are eligible; floor(2 * 0.75) = 1 doomed.
        let culled = speciation.cull(&mut agents, 0.75, 500);
        assert_eq!(culled, 1);
        assert!(agents[weak].genome().is_none());
        assert!(agents[immature].genome().is_some());
        assert!(agents[taken].genome().is_some());
        assert!(agents[strong].genome().is_some());
    }

    #[test]
    fn test_empty_species_are_dropped() {
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut tracker = InnovationTracker::new();
        let mut speciation = Speciation::new();

        for _ in 0..2 {
            let id = spawn(&mut agents, &mut tracker, 1.0, 600);
            speciation.assign(id, &agents, 1.25).unwrap();
        }

        // floor(2 * 1.0) = 2: the whole specie goes, and with it the
        // specie itself.
        let culled = speciation.cull(&mut agents, 1.0, 500);
        assert_eq!(culled, 2);
        assert!(speciation.is_empty());
    }

    #[test]
    fn test_reproduce_prefers_nothing_from_empty_registry() {
        let agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let speciation = Speciation::new();
        let mut rng = test_rng();
        assert!(speciation.reproduce(&agents, &mut rng).is_none());
    }

    #[test]
    fn test_reproduce_yields_union_of_parents() {
        let mut agents: SlotMap<AgentId, Agent> = SlotMap::with_key();
        let mut tracker = InnovationTracker::new();
        let mut speciation = Speciation::new();
        let mut rng = test_rng();

        let a = spawn(&mut agents, &mut tracker, 2.0, 0);
        let b = spawn(&mut agents, &mut tracker, 1.0, 0);
        agents[a]
            .slot
            .genome_mut()
            .unwrap()
            .add_connection(&mut tracker, 0, 2, 0.5)
            .unwrap();

        speciation.assign(a, &agents, 10.0).unwrap();
        speciation.assign(b, &agents, 10.0).unwrap();

        let child = speciation.reproduce(&agents, &mut rng).unwrap();
        assert_eq!(child.input_count(), 2);
        assert_eq!(child.output_count(), 1);
        assert!(child.connections().len() <= 1);
    }
}
