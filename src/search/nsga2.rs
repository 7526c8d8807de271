//! Elitist multi-objective selection: constrained non-dominated sorting and
//! crowding-distance truncation over placement-vector individuals.

use crate::domain::ids::ServerId;
use crate::placement::evaluator::Evaluation;

/// One member of the search population: a placement vector with its
/// evaluated objectives, constraint value, and selection metadata.
#[derive(Debug, Clone)]
pub struct Individual {
    pub genes: Vec<ServerId>,
    pub fitness: [f64; 3],
    pub penalty: f64,
    pub rank: usize,
    pub crowding: f64,
}

impl Individual {
    pub fn new(genes: Vec<ServerId>, evaluation: Evaluation) -> Self {
        Self { genes, fitness: evaluation.fitness(), penalty: evaluation.penalty(), rank: 0, crowding: 0.0 }
    }

    pub fn is_feasible(&self) -> bool {
        self.penalty <= 0.0
    }
}

/// Constrained domination: any feasible solution beats any infeasible one;
/// among infeasible solutions the smaller constraint violation wins; among
/// feasible solutions ordinary Pareto domination on the fitness vector
/// decides.
pub fn constrained_dominates(a: &Individual, b: &Individual) -> bool {
    match (a.is_feasible(), b.is_feasible()) {
        (true, false) => true,
        (false, true) => false,
        (false, false) => a.penalty < b.penalty,
        (true, true) => dominates(&a.fitness, &b.fitness),
    }
}

/// True iff `a` is no worse than `b` on every objective and strictly better
/// on at least one.
pub fn dominates(a: &[f64; 3], b: &[f64; 3]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b.iter()) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Fast non-dominated sort. Assigns `rank` on every individual and returns
/// the fronts as index lists, best front first.
pub fn non_dominated_sort(population: &mut [Individual]) -> Vec<Vec<usize>> {
    let n = population.len();
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];
    let mut fronts: Vec<Vec<usize>> = vec![Vec::new()];

    for p in 0..n {
        for q in 0..n {
            if p == q {
                continue;
            }
            if constrained_dominates(&population[p], &population[q]) {
                dominated_by[p].push(q);
            } else if constrained_dominates(&population[q], &population[p]) {
                domination_count[p] += 1;
            }
        }

        if domination_count[p] == 0 {
            population[p].rank = 0;
            fronts[0].push(p);
        }
    }

    let mut current = 0;
    while !fronts[current].is_empty() {
        let mut next_front = Vec::new();

        for &p in &fronts[current] {
            for &q in &dominated_by[p] {
                domination_count[q] -= 1;
                if domination_count[q] == 0 {
                    population[q].rank = current + 1;
                    next_front.push(q);
                }
            }
        }

        current += 1;
        fronts.push(next_front);
    }

    fronts.pop();
    fronts
}

/// Assigns the crowding distance of every individual of one front. Boundary
/// solutions get an infinite distance so they always survive truncation.
pub fn assign_crowding_distance(population: &mut [Individual], front: &[usize]) {
    for &index in front {
        population[index].crowding = 0.0;
    }

    if front.len() <= 2 {
        for &index in front {
            population[index].crowding = f64::INFINITY;
        }
        return;
    }

    for objective in 0..3 {
        let mut ordered: Vec<usize> = front.to_vec();
        ordered.sort_by(|a, b| population[*a].fitness[objective].total_cmp(&population[*b].fitness[objective]));

        let min = population[ordered[0]].fitness[objective];
        let max = population[*ordered.last().expect("front is non-empty")].fitness[objective];

        population[ordered[0]].crowding = f64::INFINITY;
        population[*ordered.last().unwrap()].crowding = f64::INFINITY;

        if max > min {
            for window in ordered.windows(3) {
                let spread = (population[window[2]].fitness[objective] - population[window[0]].fitness[objective]) / (max - min);
                population[window[1]].crowding += spread;
            }
        }
    }
}

/// Elitist environmental selection: keeps the best `target` individuals of
/// the combined parent + offspring population by (rank, crowding distance).
pub fn environmental_selection(mut combined: Vec<Individual>, target: usize) -> Vec<Individual> {
    let fronts = non_dominated_sort(&mut combined);
    for front in &fronts {
        assign_crowding_distance(&mut combined, front);
    }

    let mut selected_indices: Vec<usize> = Vec::with_capacity(target);
    for front in fronts {
        if selected_indices.len() + front.len() <= target {
            selected_indices.extend(front);
        } else {
            let mut remaining = front;
            remaining.sort_by(|a, b| combined[*b].crowding.total_cmp(&combined[*a].crowding));
            remaining.truncate(target - selected_indices.len());
            selected_indices.extend(remaining);
            break;
        }
    }

    let mut keep = vec![false; combined.len()];
    for &index in &selected_indices {
        keep[index] = true;
    }

    combined.into_iter().zip(keep).filter_map(|(individual, kept)| kept.then_some(individual)).collect()
}
