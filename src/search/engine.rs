//! Generation loop of the evolutionary placement search.

use crate::config::{Scalarization, SearchParameters};
use crate::domain::ids::ServerId;
use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::{Error, Result};
use crate::placement::candidates::min_max_norm;
use crate::placement::evaluator::{apply_placement, evaluate, evaluate_placement, Evaluation};
use crate::search::nsga2::{environmental_selection, non_dominated_sort, Individual};
use crate::search::operators::{binary_tournament, mutate, uniform_crossover};
use crate::search::seeding::capacity_aware_random_placement;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// How often a duplicate chromosome is re-drawn before being accepted as-is.
/// Tiny search spaces cannot fill a population with unique genomes.
const DUPLICATE_RETRY_LIMIT: usize = 20;

/// One non-dominated solution of the final population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoSolution {
    pub placement: Vec<ServerId>,
    pub evaluation: Evaluation,
}

/// Result of a finished search run. The committed placement has been applied
/// to the scenario and deliberately not rolled back.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub pareto_front: Vec<ParetoSolution>,
    pub committed_placement: Vec<ServerId>,
    pub committed_evaluation: Evaluation,
}

/// Runs the full evolutionary search and commits the scalarization winner.
pub fn run(scenario: &mut Scenario, parameters: &SearchParameters, paths: &dyn PathComputer, rng: &mut StdRng) -> Result<SearchOutcome> {
    parameters.validate()?;

    if scenario.servers.is_empty() {
        return Err(Error::InvalidSearchParameters("the scenario has no edge servers to place onto".to_string()));
    }
    if scenario.services.is_empty() {
        return Err(Error::InvalidSearchParameters("the scenario has no services to place".to_string()));
    }

    let mut population = seed_population(scenario, parameters, paths, rng)?;

    for generation in 1..=parameters.generations {
        log_generation(generation, &population);

        let offspring = make_offspring(scenario, &population, parameters, paths, rng)?;
        population.extend(offspring);
        population = environmental_selection(population, parameters.population_size);
    }

    let pareto_front = extract_pareto_front(&mut population);
    let committed_placement = choose_solution(&pareto_front, &population, parameters.scalarization);

    apply_placement(scenario, &committed_placement, paths)?;
    let committed_evaluation = evaluate_placement(scenario, paths);

    log::info!(
        "Search finished: {} non-dominated solutions; committed placement has {} delay violations, {} privacy violations, {:.2} power",
        pareto_front.len(),
        committed_evaluation.delay_sla_violations,
        committed_evaluation.privacy_sla_violations,
        committed_evaluation.power_consumption
    );

    Ok(SearchOutcome { pareto_front, committed_placement, committed_evaluation })
}

fn seed_population(scenario: &mut Scenario, parameters: &SearchParameters, paths: &dyn PathComputer, rng: &mut StdRng) -> Result<Vec<Individual>> {
    let server_count = scenario.servers.len();
    let service_count = scenario.services.len();

    let mut seen: HashSet<Vec<ServerId>> = HashSet::new();
    let mut genomes: Vec<Vec<ServerId>> = Vec::with_capacity(parameters.population_size);

    let mut attempts = 0;
    while genomes.len() < parameters.population_size {
        let genome = if attempts < DUPLICATE_RETRY_LIMIT {
            capacity_aware_random_placement(scenario, paths, rng)?
        } else {
            (0..service_count).map(|_| ServerId::new(rng.random_range(0..server_count))).collect()
        };

        if seen.insert(genome.clone()) || attempts >= 2 * DUPLICATE_RETRY_LIMIT {
            genomes.push(genome);
            attempts = 0;
        } else {
            attempts += 1;
        }
    }

    genomes
        .into_iter()
        .map(|genome| {
            let evaluation = evaluate(scenario, &genome, paths)?;
            Ok(Individual::new(genome, evaluation))
        })
        .collect()
}

fn make_offspring(
    scenario: &mut Scenario,
    population: &[Individual],
    parameters: &SearchParameters,
    paths: &dyn PathComputer,
    rng: &mut StdRng,
) -> Result<Vec<Individual>> {
    let server_count = scenario.servers.len();

    let mut seen: HashSet<Vec<ServerId>> = population.iter().map(|individual| individual.genes.clone()).collect();
    let mut offspring: Vec<Individual> = Vec::with_capacity(parameters.population_size);

    let mut attempts = 0;
    while offspring.len() < parameters.population_size {
        let parent_a = binary_tournament(rng, population);
        let parent_b = binary_tournament(rng, population);

        let (mut child_a, mut child_b) = uniform_crossover(rng, &population[parent_a].genes, &population[parent_b].genes, parameters.crossover_probability);
        mutate(rng, &mut child_a, parameters.mutation_probability, server_count);
        mutate(rng, &mut child_b, parameters.mutation_probability, server_count);

        for child in [child_a, child_b] {
            if offspring.len() >= parameters.population_size {
                break;
            }

            if seen.insert(child.clone()) || attempts >= DUPLICATE_RETRY_LIMIT {
                offspring.push(Individual::new(child.clone(), evaluate(scenario, &child, paths)?));
                attempts = 0;
            } else {
                attempts += 1;
            }
        }
    }

    Ok(offspring)
}

/// Non-dominated (rank 0) solutions of the final population, with duplicate
/// genomes removed.
fn extract_pareto_front(population: &mut Vec<Individual>) -> Vec<ParetoSolution> {
    non_dominated_sort(population);

    let mut seen: HashSet<Vec<ServerId>> = HashSet::new();
    population
        .iter()
        .filter(|individual| individual.rank == 0)
        .filter(|individual| seen.insert(individual.genes.clone()))
        .map(|individual| ParetoSolution {
            placement: individual.genes.clone(),
            evaluation: Evaluation {
                delay_sla_violations: individual.fitness[0] as u32,
                privacy_sla_violations: individual.fitness[1] as u32,
                power_consumption: individual.fitness[2],
                overloaded_servers: individual.penalty as u32,
            },
        })
        .collect()
}

/// Scalarizes the Pareto set into the single committed solution. Ties keep
/// the earliest solution in vector order.
fn choose_solution(pareto_front: &[ParetoSolution], population: &[Individual], scalarization: Scalarization) -> Vec<ServerId> {
    let scores: Vec<f64> = match scalarization {
        Scalarization::GeometricMean => pareto_front
            .iter()
            .map(|solution| {
                let fitness = solution.evaluation.fitness();
                (fitness[0] * fitness[1] * fitness[2]).cbrt()
            })
            .collect(),
        Scalarization::NormalizedSum => {
            let mut min = [f64::INFINITY; 3];
            let mut max = [f64::NEG_INFINITY; 3];
            for individual in population {
                for objective in 0..3 {
                    min[objective] = min[objective].min(individual.fitness[objective]);
                    max[objective] = max[objective].max(individual.fitness[objective]);
                }
            }

            pareto_front
                .iter()
                .map(|solution| {
                    let fitness = solution.evaluation.fitness();
                    (0..3).map(|objective| min_max_norm(fitness[objective], min[objective], max[objective])).sum()
                })
                .collect()
        }
    };

    let mut best = 0;
    for (index, score) in scores.iter().enumerate() {
        if *score < scores[best] {
            best = index;
        }
    }

    pareto_front[best].placement.clone()
}

fn log_generation(generation: usize, population: &[Individual]) {
    let min_objective = |objective: usize| population.iter().map(|individual| individual.fitness[objective]).fold(f64::INFINITY, f64::min);
    let min_penalty = population.iter().map(|individual| individual.penalty).fold(f64::INFINITY, f64::min);

    log::info!(
        "Generation {:>4} | delay viol. {:>4} | privacy viol. {:>4} | power {:>10.2} | overloaded {:>3}",
        generation,
        min_objective(0),
        min_objective(1),
        min_objective(2),
        min_penalty
    );
}
