use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How the evolutionary engine collapses the final Pareto set into the one
/// solution it commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Scalarization {
    /// Geometric mean of the raw objective values.
    #[default]
    GeometricMean,

    /// Sum of the objectives min-max normalized across the final population.
    NormalizedSum,
}

/// Parameters of the evolutionary search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,

    #[serde(default)]
    pub scalarization: Scalarization,
}

impl SearchParameters {
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::InvalidSearchParameters(format!("population_size must be at least 2, got {}", self.population_size)));
        }
        if self.generations == 0 {
            return Err(Error::InvalidSearchParameters("generations must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(Error::InvalidSearchParameters(format!("crossover_probability must be within [0, 1], got {}", self.crossover_probability)));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(Error::InvalidSearchParameters(format!("mutation_probability must be within [0, 1], got {}", self.mutation_probability)));
        }
        Ok(())
    }
}

/// The algorithm a caller asks the engine to run: a greedy strategy selected
/// by name, or the evolutionary search with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    Greedy(String),
    Evolutionary(SearchParameters),
}

impl Algorithm {
    pub fn greedy(name: &str) -> Self {
        Algorithm::Greedy(name.to_string())
    }
}
