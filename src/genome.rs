//! NEAT genome: mutation, feed-forward evaluation, crossover, and
//! compatibility distance.
//!
//! A genome owns one [`GeneCollection`] of nodes and one of connections.
//! Connections reference their endpoints by node innovation number, so
//! the graph is a pair of flat arenas with no cross-references; adjacency
//! is derived on demand. The `from.x < to.x` layer invariant (enforced at
//! connection creation) guarantees acyclicity, and evaluation is a single
//! iterative pass in ascending layer order.

use std::cmp::Ordering;

use rand::Rng;
use serde::Serialize;

use crate::activation::steep_sigmoid;
use crate::collection::GeneCollection;
use crate::config::NeatConfig;
use crate::error::NeatError;
use crate::gene::{ConnectionGene, NodeGene, NodeRole};
use crate::innovation::InnovationTracker;

/// The structural mutation operators, dispatched from an explicit
/// probability table so each can be tested in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationOp {
    AddConnection,
    AddNode,
    ToggleConnection,
    WeightShift,
    WeightRandomise,
}

/// One candidate network.
#[derive(Debug, Clone)]
pub struct Genome {
    nodes: GeneCollection<NodeGene>,
    connections: GeneCollection<ConnectionGene>,
}

impl Genome {
    /// Create a genome with `input_count` input nodes at layer 0 and
    /// `output_count` output nodes at layer 1, evenly spread in rank, and
    /// no connections.
    ///
    /// Node ids `0..input_count+output_count` are claimed in creation
    /// order and registered with the tracker so the whole lineage shares
    /// IO markings.
    #[must_use]
    pub fn new(
        input_count: usize,
        output_count: usize,
        tracker: &mut InnovationTracker,
    ) -> Self {
        let mut nodes = GeneCollection::new();

        for i in 0..input_count {
            let y = spread_rank(i, input_count);
            let node = NodeGene::input(i as u64, y);
            tracker.register_node(node.innovation);
            nodes.add(node);
        }

        for i in 0..output_count {
            let y = spread_rank(i, output_count);
            let node = NodeGene::output((input_count + i) as u64, y);
            tracker.register_node(node.innovation);
            nodes.add(node);
        }

        Self {
            nodes,
            connections: GeneCollection::new(),
        }
    }

    /// A genome with no genes at all; crossover assembles into this.
    fn empty() -> Self {
        Self {
            nodes: GeneCollection::new(),
            connections: GeneCollection::new(),
        }
    }

    /// The node collection.
    #[must_use]
    pub fn nodes(&self) -> &GeneCollection<NodeGene> {
        &self.nodes
    }

    /// The connection collection.
    #[must_use]
    pub fn connections(&self) -> &GeneCollection<ConnectionGene> {
        &self.connections
    }

    /// Input nodes in insertion order.
    pub fn input_nodes(&self) -> impl Iterator<Item = &NodeGene> {
        self.nodes.iter().filter(|n| n.role == NodeRole::Input)
    }

    /// Output nodes in insertion order.
    pub fn output_nodes(&self) -> impl Iterator<Item = &NodeGene> {
        self.nodes.iter().filter(|n| n.role == NodeRole::Output)
    }

    /// Number of input nodes.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.input_nodes().count()
    }

    /// Number of output nodes.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.output_nodes().count()
    }

    // ---- mutation ----------------------------------------------------

    /// Apply one mutation pass: each operator fires independently with
    /// its configured probability.
    pub fn mutate<R: Rng>(
        &mut self,
        tracker: &mut InnovationTracker,
        config: &NeatConfig,
        rng: &mut R,
    ) {
        let table: [(MutationOp, f64); 5] = [
            (MutationOp::AddConnection, config.add_connection_prob),
            (MutationOp::AddNode, config.add_node_prob),
            (MutationOp::ToggleConnection, config.toggle_connection_prob),
            (MutationOp::WeightShift, config.weight_shift_prob),
            (MutationOp::WeightRandomise, config.weight_randomise_prob),
        ];

        for (op, probability) in table {
            if rng.random::<f64>() >= probability {
                continue;
            }
            match op {
                MutationOp::AddConnection => {
                    self.mutate_add_connection(tracker, config.mutation_attempts, rng);
                }
                MutationOp::AddNode => self.mutate_add_node(tracker, rng),
                MutationOp::ToggleConnection => self.mutate_toggle_connection(rng),
                MutationOp::WeightShift => self.mutate_weight_shift(rng),
                MutationOp::WeightRandomise => self.mutate_weight_randomise(rng),
            }
        }
    }

    /// Insert a connection between two existing nodes.
    ///
    /// Returns the connection's innovation number, or `None` if the
    /// endpoints are unknown, share a layer, are ordered against the
    /// layer invariant, or are already connected.
    pub fn add_connection(
        &mut self,
        tracker: &mut InnovationTracker,
        from: u64,
        to: u64,
        weight: f64,
    ) -> Option<u64> {
        let from_x = self.nodes.get_by_innovation(from)?.x;
        let to_x = self.nodes.get_by_innovation(to)?.x;
        if from_x >= to_x {
            return None;
        }
        if self
            .connections
            .iter()
            .any(|c| c.from == from && c.to == to)
        {
            return None;
        }

        let innovation = tracker.allocate_connection(from, to);
        self.connections
            .add(ConnectionGene::new(innovation, from, to, weight));
        Some(innovation)
    }

    /// Try up to `attempts` times to connect two random nodes.
    ///
    /// The lower-layer node becomes the source; picks with equal layers
    /// or an existing connection are rejected. Exhausting the budget is a
    /// silent no-op. New connections start at weight 0.0 and acquire
    /// their effect through the weight mutations.
    pub fn mutate_add_connection<R: Rng>(
        &mut self,
        tracker: &mut InnovationTracker,
        attempts: u32,
        rng: &mut R,
    ) {
        for _ in 0..attempts {
            let Some(a) = self.nodes.random_index(rng) else {
                return;
            };
            let Some(b) = self.nodes.random_index(rng) else {
                return;
            };
            let (Some(node_a), Some(node_b)) = (self.nodes.get(a), self.nodes.get(b)) else {
                return;
            };

            let (mut from, mut to) = (node_a.innovation, node_b.innovation);
            if node_a.x > node_b.x {
                std::mem::swap(&mut from, &mut to);
            }

            if self.add_connection(tracker, from, to, 0.0).is_some() {
                return;
            }
        }
    }

    /// Split an existing connection identified by its innovation number.
    ///
    /// The connection is removed and replaced by a hidden node at the
    /// midpoint of its endpoints (rank jittered slightly) plus two fresh
    /// connections: source -> node at weight 1.0, node -> target carrying
    /// the removed weight. Returns the new node's innovation number.
    pub fn split_connection<R: Rng>(
        &mut self,
        tracker: &mut InnovationTracker,
        connection: u64,
        rng: &mut R,
    ) -> Option<u64> {
        let old = self.connections.get_by_innovation(connection)?.clone();
        let from = self.nodes.get_by_innovation(old.from)?;
        let to = self.nodes.get_by_innovation(old.to)?;
        let (from_x, from_y) = (from.x, from.y);
        let (to_x, to_y) = (to.x, to.y);

        self.connections.remove(old.innovation);

        let node_innovation = tracker.allocate_split_node(old.innovation);
        let x = (from_x + to_x) / 2.0;
        let y = (from_y + to_y) / 2.0 + (rng.random::<f64>() / 10.0 - 0.05);
        self.nodes.add(NodeGene::hidden(node_innovation, x, y));

        let lead = tracker.allocate_connection(old.from, node_innovation);
        self.connections
            .add(ConnectionGene::new(lead, old.from, node_innovation, 1.0));

        let trail = tracker.allocate_connection(node_innovation, old.to);
        self.connections.add(ConnectionGene::new(
            trail,
            node_innovation,
            old.to,
            old.weight,
        ));

        Some(node_innovation)
    }

    /// Split a random connection; no-op if none exist.
    pub fn mutate_add_node<R: Rng>(&mut self, tracker: &mut InnovationTracker, rng: &mut R) {
        let Some(index) = self.connections.random_index(rng) else {
            return;
        };
        let Some(connection) = self.connections.get(index).map(|c| c.innovation) else {
            return;
        };
        self.split_connection(tracker, connection, rng);
    }

    /// Flip a random connection's enabled flag; no-op if none exist.
    pub fn mutate_toggle_connection<R: Rng>(&mut self, rng: &mut R) {
        let Some(index) = self.connections.random_index(rng) else {
            return;
        };
        if let Some(connection) = self.connections.get_mut(index) {
            connection.toggle_enabled();
        }
    }

    /// Shift a random connection's weight by a uniform delta in `[-1, 1]`.
    pub fn mutate_weight_shift<R: Rng>(&mut self, rng: &mut R) {
        let Some(index) = self.connections.random_index(rng) else {
            return;
        };
        if let Some(connection) = self.connections.get_mut(index) {
            connection.weight += rng.random::<f64>() * 2.0 - 1.0;
        }
    }

    /// Resample a random connection's weight uniformly in `[-1, 1]`.
    pub fn mutate_weight_randomise<R: Rng>(&mut self, rng: &mut R) {
        let Some(index) = self.connections.random_index(rng) else {
            return;
        };
        if let Some(connection) = self.connections.get_mut(index) {
            connection.weight = rng.random::<f64>() * 2.0 - 1.0;
        }
    }

    // ---- evaluation --------------------------------------------------

    /// Feed-forward evaluation: vector in, vector out.
    ///
    /// Clears every cached output, seeds input nodes from `inputs` in
    /// node order, evaluates every remaining node in ascending layer
    /// order (sum of enabled incoming `source * weight` through the
    /// steepened logistic), and returns the output nodes' values in node
    /// order.
    ///
    /// # Errors
    ///
    /// [`NeatError::InputLengthMismatch`] if `inputs` does not match the
    /// input node count; [`NeatError::UnresolvedNode`] if evaluation
    /// encounters a node with no value, which indicates a structural
    /// defect.
    pub fn calculate_output(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NeatError> {
        let expected = self.input_count();
        if inputs.len() != expected {
            return Err(NeatError::InputLengthMismatch {
                expected,
                got: inputs.len(),
            });
        }

        for node in self.nodes.iter_mut() {
            node.output = None;
        }

        let mut seed = inputs.iter();
        for node in self
            .nodes
            .iter_mut()
            .filter(|n| n.role == NodeRole::Input)
        {
            node.output = seed.next().copied();
        }

        // Ascending x is a topological order: every connection's source
        // sits at a strictly smaller layer than its target.
        let mut order: Vec<(usize, f64)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.role != NodeRole::Input)
            .map(|(index, n)| (index, n.x))
            .collect();
        order.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        for (index, _) in order {
            let Some(target) = self.nodes.get(index).map(|n| n.innovation) else {
                continue;
            };

            let mut sum = 0.0;
            for connection in self.connections.iter().filter(|c| c.enabled && c.to == target) {
                let source = self
                    .nodes
                    .get_by_innovation(connection.from)
                    .ok_or(NeatError::UnresolvedNode {
                        innovation: connection.from,
                    })?;
                let value = source.output.ok_or(NeatError::UnresolvedNode {
                    innovation: connection.from,
                })?;
                sum += value * connection.weight;
            }

            if let Some(node) = self.nodes.get_mut(index) {
                node.output = Some(steep_sigmoid(sum));
            }
        }

        let mut outputs = Vec::with_capacity(self.output_count());
        for node in self.nodes.iter().filter(|n| n.role == NodeRole::Output) {
            outputs.push(node.output.ok_or(NeatError::UnresolvedNode {
                innovation: node.innovation,
            })?);
        }
        Ok(outputs)
    }

    // ---- crossover & distance ----------------------------------------

    /// Cross two genomes, `fitter` first (pick arbitrarily on a fitness
    /// tie).
    ///
    /// Connection lists are merged by a two-pointer walk over the sorted
    /// innovation order: matching genes are copied from a uniformly
    /// random parent, disjoint and excess genes from whichever parent
    /// owns them. Input and output nodes come unconditionally from
    /// `fitter`; any hidden node referenced by a copied connection is
    /// copied in from the parent that owns it. The child's connection
    /// innovation set is exactly the union of both parents'.
    #[must_use]
    pub fn crossover<R: Rng>(fitter: &Genome, other: &Genome, rng: &mut R) -> Genome {
        let mut child = Genome::empty();

        let lhs = fitter.connections.sorted_by_innovation();
        let rhs = other.connections.sorted_by_innovation();
        let (mut i, mut j) = (0, 0);

        while i < lhs.len() && j < rhs.len() {
            match lhs[i].innovation.cmp(&rhs[j].innovation) {
                Ordering::Equal => {
                    let chosen = if rng.random::<bool>() { lhs[i] } else { rhs[j] };
                    child.connections.add(chosen.clone());
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    child.connections.add(lhs[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    child.connections.add(rhs[j].clone());
                    j += 1;
                }
            }
        }
        for connection in &lhs[i..] {
            child.connections.add((*connection).clone());
        }
        for connection in &rhs[j..] {
            child.connections.add((*connection).clone());
        }

        for node in fitter.nodes.iter().filter(|n| n.role != NodeRole::Hidden) {
            child.nodes.add(node.clone());
        }

        // Copy in every endpoint the merged connections reference but the
        // child does not yet own, from whichever parent has it.
        let mut missing: Vec<u64> = Vec::new();
        for connection in &child.connections {
            for endpoint in [connection.from, connection.to] {
                if !child.nodes.contains(endpoint) && !missing.contains(&endpoint) {
                    missing.push(endpoint);
                }
            }
        }
        for endpoint in missing {
            if let Some(node) = fitter
                .nodes
                .get_by_innovation(endpoint)
                .or_else(|| other.nodes.get_by_innovation(endpoint))
            {
                child.nodes.add(node.clone());
            }
        }

        // Parent evaluations must not leak into the child.
        for node in child.nodes.iter_mut() {
            node.output = None;
        }

        child
    }

    /// Compatibility distance between two genomes.
    ///
    /// Walks both sorted connection lists like crossover, counting
    /// matching genes (accumulating absolute weight differences),
    /// disjoint genes, and the excess remainder once one list is
    /// exhausted. Small genomes (fewer than 20 genes on the longer side)
    /// are not normalized by gene count. Excess attribution makes this
    /// not strictly symmetric.
    #[must_use]
    pub fn distance(a: &Genome, b: &Genome) -> f64 {
        let lhs = a.connections.sorted_by_innovation();
        let rhs = b.connections.sorted_by_innovation();
        let (mut i, mut j) = (0, 0);

        let mut matching = 0u32;
        let mut disjoint = 0u32;
        let mut weight_diff = 0.0;

        while i < lhs.len() && j < rhs.len() {
            match lhs[i].innovation.cmp(&rhs[j].innovation) {
                Ordering::Equal => {
                    matching += 1;
                    weight_diff += (lhs[i].weight - rhs[j].weight).abs();
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    disjoint += 1;
                    i += 1;
                }
                Ordering::Greater => {
                    disjoint += 1;
                    j += 1;
                }
            }
        }

        let excess = if i < lhs.len() {
            lhs.len() - i
        } else {
            rhs.len() - j
        };

        let weight_diff = weight_diff / f64::from(matching.max(1));
        let mut n = lhs.len().max(rhs.len());
        if n < 20 {
            n = 1;
        }
        let n = n as f64;

        excess as f64 / n + f64::from(disjoint) / n + weight_diff
    }

    /// Read-only structural view for external rendering.
    #[must_use]
    pub fn snapshot(&self) -> GenomeSnapshot {
        GenomeSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeSnapshot {
                    innovation: n.innovation,
                    x: n.x,
                    y: n.y,
                    role: n.role,
                    output: n.output,
                })
                .collect(),
            connections: self
                .connections
                .iter()
                .map(|c| ConnectionSnapshot {
                    innovation: c.innovation,
                    from: c.from,
                    to: c.to,
                    weight: c.weight,
                    enabled: c.enabled,
                })
                .collect(),
        }
    }
}

/// Evenly spread `count` ranks over `[0, 1]`, centering a lone node.
fn spread_rank(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.5
    } else {
        index as f64 / (count - 1) as f64
    }
}

/// One node of a [`GenomeSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    /// Innovation number.
    pub innovation: u64,
    /// Structural layer.
    pub x: f64,
    /// Rank within the layer.
    pub y: f64,
    /// Node role.
    pub role: NodeRole,
    /// Last-computed output, if the genome has been evaluated.
    pub output: Option<f64>,
}

/// One connection of a [`GenomeSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionSnapshot {
    /// Innovation number.
    pub innovation: u64,
    /// Source node innovation number.
    pub from: u64,
    /// Target node innovation number.
    pub to: u64,
    /// Connection weight.
    pub weight: f64,
    /// Whether the connection is enabled.
    pub enabled: bool,
}

/// Read-only structural snapshot of a genome, for the external
/// visualizer. Mutating the snapshot has no effect on the genome.
#[derive(Debug, Clone, Serialize)]
pub struct GenomeSnapshot {
    /// All nodes in insertion order.
    pub nodes: Vec<NodeSnapshot>,
    /// All connections in insertion order.
    pub connections: Vec<ConnectionSnapshot>,
}
