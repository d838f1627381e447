//! Insertion-ordered gene storage keyed by innovation number.

use rand::Rng;

use crate::gene::Gene;

/// An insertion-ordered set of genes with no duplicate innovation numbers.
///
/// Used uniformly for a genome's node set and connection set. Iteration
/// follows insertion order; crossover and distance use
/// [`sorted_by_innovation`](Self::sorted_by_innovation) for alignment.
/// Lookups scan linearly — genomes stay small enough that this beats
/// maintaining a secondary index across removals.
#[derive(Debug, Clone)]
pub struct GeneCollection<T: Gene> {
    genes: Vec<T>,
}

impl<T: Gene> GeneCollection<T> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self { genes: Vec::new() }
    }

    /// Number of genes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the collection holds no genes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether a gene with this innovation number is present.
    #[must_use]
    pub fn contains(&self, innovation: u64) -> bool {
        self.genes.iter().any(|g| g.innovation() == innovation)
    }

    /// Append a gene. No-op if its innovation number is already present.
    pub fn add(&mut self, gene: T) {
        if self.contains(gene.innovation()) {
            return;
        }
        self.genes.push(gene);
    }

    /// Remove and return the gene with this innovation number, if present.
    pub fn remove(&mut self, innovation: u64) -> Option<T> {
        let index = self
            .genes
            .iter()
            .position(|g| g.innovation() == innovation)?;
        Some(self.genes.remove(index))
    }

    /// Gene at a positional index (insertion order).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.genes.get(index)
    }

    /// Mutable gene at a positional index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.genes.get_mut(index)
    }

    /// Gene with this innovation number.
    #[must_use]
    pub fn get_by_innovation(&self, innovation: u64) -> Option<&T> {
        self.genes.iter().find(|g| g.innovation() == innovation)
    }

    /// Mutable gene with this innovation number.
    pub fn get_by_innovation_mut(&mut self, innovation: u64) -> Option<&mut T> {
        self.genes.iter_mut().find(|g| g.innovation() == innovation)
    }

    /// References to all genes in ascending innovation order.
    ///
    /// This is the canonical view for crossover, distance, and any
    /// comparison between genomes.
    #[must_use]
    pub fn sorted_by_innovation(&self) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.genes.iter().collect();
        sorted.sort_by_key(|g| g.innovation());
        sorted
    }

    /// Uniform random positional index, or `None` on an empty collection.
    /// Callers must guard the `None` case rather than treating it as an
    /// error.
    pub fn random_index<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.genes.is_empty() {
            return None;
        }
        Some(rng.random_range(0..self.genes.len()))
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.genes.iter()
    }

    /// Iterate mutably in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.genes.iter_mut()
    }
}

impl<T: Gene> Default for GeneCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Gene> IntoIterator for &'a GeneCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.genes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::ConnectionGene;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn conn(innovation: u64) -> ConnectionGene {
        ConnectionGene::new(innovation, 0, 1, 0.0)
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut genes = GeneCollection::new();
        genes.add(conn(3));
        genes.add(conn(3));
        assert_eq!(genes.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut genes = GeneCollection::new();
        genes.add(conn(5));
        genes.add(conn(1));
        genes.add(conn(9));

        let order: Vec<u64> = genes.iter().map(|g| g.innovation).collect();
        assert_eq!(order, vec![5, 1, 9]);
    }

    #[test]
    fn test_sorted_by_innovation() {
        let mut genes = GeneCollection::new();
        genes.add(conn(5));
        genes.add(conn(1));
        genes.add(conn(9));

        let sorted: Vec<u64> = genes
            .sorted_by_innovation()
            .iter()
            .map(|g| g.innovation)
            .collect();
        assert_eq!(sorted, vec![1, 5, 9]);

        // The sorted view must not disturb insertion order.
        let order: Vec<u64> = genes.iter().map(|g| g.innovation).collect();
        assert_eq!(order, vec![5, 1, 9]);
    }

    #[test]
    fn test_remove() {
        let mut genes = GeneCollection::new();
        genes.add(conn(1));
        genes.add(conn(2));

        let removed = genes.remove(1);
        assert_eq!(removed.map(|g| g.innovation), Some(1));
        assert_eq!(genes.len(), 1);
        assert!(genes.remove(1).is_none());
    }

    #[test]
    fn test_random_index_on_empty() {
        let genes: GeneCollection<ConnectionGene> = GeneCollection::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!(genes.random_index(&mut rng).is_none());
    }

    #[test]
    fn test_random_index_in_bounds() {
        let mut genes = GeneCollection::new();
        for i in 0..10 {
            genes.add(conn(i));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let index = genes.random_index(&mut rng).unwrap();
            assert!(index < genes.len());
        }
    }

    #[test]
    fn test_get_by_innovation() {
        let mut genes = GeneCollection::new();
        genes.add(conn(7));
        assert!(genes.get_by_innovation(7).is_some());
        assert!(genes.get_by_innovation(8).is_none());
    }
}
