//! Benchmarks for neat-arena.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use neat_arena::{Genome, InnovationTracker, NeatConfig, Population};

/// A genome with some hidden structure for the hot-path benches.
fn grown_genome(tracker: &mut InnovationTracker, rng: &mut ChaCha8Rng) -> Genome {
    let config = NeatConfig {
        add_connection_prob: 0.5,
        add_node_prob: 0.2,
        ..NeatConfig::new(4, 2)
    };
    let mut genome = Genome::new(4, 2, tracker);
    for _ in 0..20 {
        genome.mutate(tracker, &config, rng);
    }
    genome
}

fn bench_genome_creation(c: &mut Criterion) {
    c.bench_function("genome_new", |b| {
        let mut tracker = InnovationTracker::new();
        b.iter(|| {
            black_box(Genome::new(4, 2, &mut tracker));
        });
    });
}

fn bench_mutation(c: &mut Criterion) {
    let config = NeatConfig {
        add_connection_prob: 0.3,
        add_node_prob: 0.1,
        ..NeatConfig::new(4, 2)
    };
    let mut tracker = InnovationTracker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let genome = Genome::new(4, 2, &mut tracker);

    c.bench_function("genome_mutation", |b| {
        let mut g = genome.clone();
        b.iter(|| {
            g.mutate(&mut tracker, &config, &mut rng);
            black_box(&g);
        });
    });
}

fn bench_crossover(c: &mut Criterion) {
    let mut tracker = InnovationTracker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let parent1 = grown_genome(&mut tracker, &mut rng);
    let parent2 = grown_genome(&mut tracker, &mut rng);

    c.bench_function("genome_crossover", |b| {
        b.iter(|| {
            black_box(Genome::crossover(&parent1, &parent2, &mut rng));
        });
    });
}

fn bench_evaluation(c: &mut Criterion) {
    let mut tracker = InnovationTracker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut genome = grown_genome(&mut tracker, &mut rng);
    let inputs = [0.5, -0.5, 1.0, 0.0];

    c.bench_function("genome_evaluate", |b| {
        b.iter(|| {
            black_box(genome.calculate_output(&inputs).unwrap());
        });
    });
}

fn bench_compatibility_distance(c: &mut Criterion) {
    let mut tracker = InnovationTracker::new();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let genome1 = grown_genome(&mut tracker, &mut rng);
    let genome2 = grown_genome(&mut tracker, &mut rng);

    c.bench_function("compatibility_distance", |b| {
        b.iter(|| {
            black_box(Genome::distance(&genome1, &genome2));
        });
    });
}

fn bench_evolve_cycle(c: &mut Criterion) {
    c.bench_function("population_evolve_64", |b| {
        let config = NeatConfig {
            seed: Some(42),
            ..NeatConfig::new(4, 2)
        };
        let mut population = Population::new(config, 64);
        for _ in 0..=500 {
            population.tick();
        }
        let ids: Vec<_> = population.iter_agents().map(|(id, _)| id).collect();
        for (i, &id) in ids.iter().enumerate() {
            population.set_fitness(id, i as f64).unwrap();
        }

        b.iter(|| {
            population.evolve();
            black_box(population.species_count());
        });
    });
}

criterion_group!(
    benches,
    bench_genome_creation,
    bench_mutation,
    bench_crossover,
    bench_evaluation,
    bench_compatibility_distance,
    bench_evolve_cycle,
);
criterion_main!(benches);
