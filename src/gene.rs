//! Gene types for NEAT genomes.
//!
//! This module defines the fundamental building blocks of NEAT networks:
//! - [`NodeGene`]: a network unit with a 2D layout position and a role
//! - [`ConnectionGene`]: a weighted, directed edge between two nodes
//!
//! Every gene carries an innovation number, the historical marking that
//! lets structurally different genomes be aligned gene-by-gene during
//! crossover and compatibility distance.

use serde::{Deserialize, Serialize};

/// Anything keyed by an innovation number.
///
/// [`GeneCollection`](crate::collection::GeneCollection) stores its
/// elements through this trait, so node and connection sets share one
/// container type.
pub trait Gene {
    /// The historical marking assigned when this gene was first created.
    fn innovation(&self) -> u64;
}

/// The role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Receives an external value; its output is seeded, never computed.
    Input,
    /// Produces one component of the network's output vector.
    Output,
    /// Internal node added by the split mutation.
    Hidden,
}

/// A node gene.
///
/// The `x` coordinate is the structural layer in `[0, 1]` (inputs at 0,
/// outputs at 1, hidden nodes strictly between their endpoints). It
/// doubles as the feed-forward evaluation order: a connection's source
/// always has a strictly smaller `x` than its target, which keeps the
/// graph acyclic. The `y` coordinate is the rank within the layer, kept
/// only for external rendering.
#[derive(Debug, Clone)]
pub struct NodeGene {
    /// Historical marking for this node.
    pub innovation: u64,
    /// Structural layer in `[0, 1]`.
    pub x: f64,
    /// Rank within the layer in `[0, 1]`.
    pub y: f64,
    /// The role of this node.
    pub role: NodeRole,
    /// Cached output of the last evaluation. Cleared at the start of
    /// every `calculate_output` call; `None` outside evaluation.
    pub output: Option<f64>,
}

impl NodeGene {
    /// Create an input node at layer 0.
    #[must_use]
    pub fn input(innovation: u64, y: f64) -> Self {
        Self {
            innovation,
            x: 0.0,
            y,
            role: NodeRole::Input,
            output: None,
        }
    }

    /// Create an output node at layer 1.
    #[must_use]
    pub fn output(innovation: u64, y: f64) -> Self {
        Self {
            innovation,
            x: 1.0,
            y,
            role: NodeRole::Output,
            output: None,
        }
    }

    /// Create a hidden node at an explicit position.
    #[must_use]
    pub fn hidden(innovation: u64, x: f64, y: f64) -> Self {
        Self {
            innovation,
            x,
            y,
            role: NodeRole::Hidden,
            output: None,
        }
    }
}

impl Gene for NodeGene {
    fn innovation(&self) -> u64 {
        self.innovation
    }
}

/// A connection gene.
///
/// Endpoints are stored as node innovation numbers and resolved through
/// the owning genome's node collection. This keeps the graph an arena
/// with no cross-references: copying a connection into another genome
/// re-points it automatically once the endpoint nodes are copied in.
#[derive(Debug, Clone)]
pub struct ConnectionGene {
    /// Historical marking for this connection.
    pub innovation: u64,
    /// Innovation number of the source node.
    pub from: u64,
    /// Innovation number of the target node.
    pub to: u64,
    /// The connection weight.
    pub weight: f64,
    /// Whether this connection participates in evaluation. Disabled
    /// connections are skipped but still travel through crossover.
    pub enabled: bool,
}

impl ConnectionGene {
    /// Create a new enabled connection.
    #[must_use]
    pub fn new(innovation: u64, from: u64, to: u64, weight: f64) -> Self {
        Self {
            innovation,
            from,
            to,
            weight,
            enabled: true,
        }
    }

    /// Flip the enabled flag.
    pub fn toggle_enabled(&mut self) {
        self.enabled = !self.enabled;
    }
}

impl Gene for ConnectionGene {
    fn innovation(&self) -> u64 {
        self.innovation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_gene_creation() {
        let input = NodeGene::input(0, 0.5);
        assert_eq!(input.role, NodeRole::Input);
        assert!((input.x - 0.0).abs() < 1e-12);
        assert!(input.output.is_none());

        let output = NodeGene::output(1, 0.5);
        assert_eq!(output.role, NodeRole::Output);
        assert!((output.x - 1.0).abs() < 1e-12);

        let hidden = NodeGene::hidden(2, 0.5, 0.25);
        assert_eq!(hidden.role, NodeRole::Hidden);
        assert!((hidden.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_connection_gene_creation() {
        let conn = ConnectionGene::new(7, 0, 1, 0.5);
        assert_eq!(conn.innovation(), 7);
        assert_eq!(conn.from, 0);
        assert_eq!(conn.to, 1);
        assert!((conn.weight - 0.5).abs() < 1e-12);
        assert!(conn.enabled);
    }

    #[test]
    fn test_toggle_enabled() {
        let mut conn = ConnectionGene::new(0, 0, 1, 1.0);
        conn.toggle_enabled();
        assert!(!conn.enabled);
        conn.toggle_enabled();
        assert!(conn.enabled);
    }
}
