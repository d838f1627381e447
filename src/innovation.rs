//! Historical-marking allocation for one lineage.
//!
//! Innovation numbers make crossover between differently-sized genomes
//! well-defined: two genes are "the same" structural element exactly when
//! they carry the same number. The tracker is the only mutable state
//! shared across genomes in a lineage — it allocates monotonically
//! increasing ids and memoizes structural mutations so that identical
//! mutations occurring independently receive identical markings.

use std::collections::HashMap;

/// Per-lineage innovation authority.
///
/// Node and connection numbers are separate series; both only increase.
/// One tracker lives for the duration of one
/// [`Population`](crate::population::Population) and is threaded by
/// mutable reference into every mutation that creates structure.
#[derive(Debug, Default)]
pub struct InnovationTracker {
    next_node: u64,
    next_connection: u64,
    /// Split memo: innovation of the connection that was split -> the
    /// hidden node id issued for that split.
    split_nodes: HashMap<u64, u64>,
    /// Endpoint memo: (from node, to node) -> connection id.
    connections: HashMap<(u64, u64), u64>,
}

impl InnovationTracker {
    /// Create a tracker with both counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a fixed node id.
    ///
    /// Genome constructors hand out ids `0..inputs+outputs` themselves so
    /// that every genome in the lineage shares markings for its IO nodes;
    /// registering keeps the counter strictly ahead of every claimed id.
    pub fn register_node(&mut self, innovation: u64) {
        self.next_node = self.next_node.max(innovation + 1);
    }

    /// Allocate a fresh node id.
    pub fn allocate_node(&mut self) -> u64 {
        let id = self.next_node;
        self.next_node += 1;
        id
    }

    /// Allocate (or recall) the node id for splitting a connection.
    ///
    /// Splitting the same connection in two unrelated genomes yields the
    /// same hidden node id, which is what lets those genomes align later.
    pub fn allocate_split_node(&mut self, split_connection: u64) -> u64 {
        if let Some(&id) = self.split_nodes.get(&split_connection) {
            return id;
        }
        let id = self.next_node;
        self.next_node += 1;
        self.split_nodes.insert(split_connection, id);
        id
    }

    /// Allocate (or recall) the connection id for an endpoint pair.
    pub fn allocate_connection(&mut self, from: u64, to: u64) -> u64 {
        if let Some(&id) = self.connections.get(&(from, to)) {
            return id;
        }
        let id = self.next_connection;
        self.next_connection += 1;
        self.connections.insert((from, to), id);
        id
    }
}
