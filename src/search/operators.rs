//! Variation and selection operators over placement vectors.

use crate::domain::ids::ServerId;
use crate::search::nsga2::Individual;
use rand::rngs::StdRng;
use rand::Rng;

/// Binary tournament by (rank, crowding distance). Returns the index of the
/// winner within the population.
pub fn binary_tournament(rng: &mut StdRng, population: &[Individual]) -> usize {
    let first = rng.random_range(0..population.len());
    let second = rng.random_range(0..population.len());

    let a = &population[first];
    let b = &population[second];

    if a.rank != b.rank {
        if a.rank < b.rank { first } else { second }
    } else if b.crowding > a.crowding {
        second
    } else {
        first
    }
}

/// Uniform crossover: with the configured probability, every gene position
/// swaps between the children with a fair coin; otherwise the parents are
/// copied through unchanged.
pub fn uniform_crossover(rng: &mut StdRng, parent_a: &[ServerId], parent_b: &[ServerId], probability: f64) -> (Vec<ServerId>, Vec<ServerId>) {
    let mut child_a = parent_a.to_vec();
    let mut child_b = parent_b.to_vec();

    if rng.random_bool(probability) {
        for position in 0..child_a.len() {
            if rng.random_bool(0.5) {
                std::mem::swap(&mut child_a[position], &mut child_b[position]);
            }
        }
    }

    (child_a, child_b)
}

/// Per-gene mutation: each gene is independently resampled to a uniformly
/// random server with the configured probability.
pub fn mutate(rng: &mut StdRng, genes: &mut [ServerId], probability: f64, server_count: usize) {
    for gene in genes.iter_mut() {
        if rng.random_bool(probability) {
            *gene = ServerId::new(rng.random_range(0..server_count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn genes(values: &[usize]) -> Vec<ServerId> {
        values.iter().map(|v| ServerId::new(*v)).collect()
    }

    #[test]
    fn crossover_without_probability_copies_parents() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = genes(&[0, 1, 2]);
        let b = genes(&[3, 4, 5]);

        let (child_a, child_b) = uniform_crossover(&mut rng, &a, &b, 0.0);

        assert_eq!(child_a, a);
        assert_eq!(child_b, b);
    }

    #[test]
    fn crossover_children_partition_parent_genes() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = genes(&[0, 0, 0, 0, 0, 0, 0, 0]);
        let b = genes(&[1, 1, 1, 1, 1, 1, 1, 1]);

        let (child_a, child_b) = uniform_crossover(&mut rng, &a, &b, 1.0);

        for position in 0..a.len() {
            let pair = (child_a[position], child_b[position]);
            assert!(pair == (a[position], b[position]) || pair == (b[position], a[position]));
        }
    }

    #[test]
    fn mutation_stays_in_server_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sample = genes(&[0; 64]);

        mutate(&mut rng, &mut sample, 1.0, 5);

        assert!(sample.iter().all(|gene| gene.index() < 5));
    }

    #[test]
    fn zero_probability_mutation_is_identity() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sample = genes(&[2, 3, 4]);
        let original = sample.clone();

        mutate(&mut rng, &mut sample, 0.0, 5);

        assert_eq!(sample, original);
    }
}
