//! Error types for the driver-facing surface.
//!
//! Mutation operators never fail — an attempt that finds no valid target
//! simply produces no change. Errors are reserved for contract violations
//! at the evaluation and pool boundaries.

use thiserror::Error;

/// Errors surfaced to the external driver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NeatError {
    /// `activate` was called with an input vector that does not match the
    /// genome's input node count. No partial evaluation is performed.
    #[error("input length mismatch: expected {expected}, got {got}")]
    InputLengthMismatch {
        /// Number of input nodes in the genome.
        expected: usize,
        /// Length of the vector the caller supplied.
        got: usize,
    },

    /// A node resolved with no value during evaluation. This indicates a
    /// structural defect (an endpoint missing from the node collection or
    /// an evaluation-order violation), never a recoverable condition.
    #[error("node {innovation} resolved with no value during evaluation")]
    UnresolvedNode {
        /// Innovation number of the node that failed to resolve.
        innovation: u64,
    },

    /// `activate` was called on an agent whose genome slot is awaiting
    /// reproduction. The pool contract forbids driving such an agent.
    #[error("agent has no genome; it is awaiting reproduction")]
    MissingGenome,

    /// The agent id does not refer to any agent in this population.
    #[error("unknown agent id")]
    UnknownAgent,

    /// `release_agent` was called with an agent that is not in the taken
    /// set.
    #[error("agent is not in the taken set")]
    AgentNotTaken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NeatError::InputLengthMismatch {
            expected: 4,
            got: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 4"), "unexpected message: {msg}");
        assert!(msg.contains("got 2"), "unexpected message: {msg}");
    }

    #[test]
    fn test_missing_genome_display() {
        let msg = NeatError::MissingGenome.to_string();
        assert!(msg.contains("awaiting reproduction"), "unexpected message: {msg}");
    }
}
