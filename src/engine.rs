use crate::config::Algorithm;
use crate::domain::ids::ServerId;
use crate::domain::routing::{CachedShortestPaths, PathComputer};
use crate::domain::scenario::Scenario;
use crate::error::Result;
use crate::metrics::{self, MetricsRecord};
use crate::placement::strategy::strategy_by_name;
use crate::search;
use crate::search::engine::ParetoSolution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// What the engine hands back after committing a placement: the host of
/// every service (unplaced services keep `None`), the metrics record, and —
/// for the evolutionary path — the Pareto front of the final population.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementReport {
    pub placement: Vec<Option<ServerId>>,
    pub metrics: MetricsRecord,
    pub pareto_front: Option<Vec<ParetoSolution>>,
}

impl PlacementReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Entry point of the placement engine.
///
/// The path computer is chosen once at construction time and passed into
/// every component that refreshes communication paths.
#[derive(Debug)]
pub struct PlacementEngine {
    paths: Box<dyn PathComputer>,
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self::with_path_computer(Box::new(CachedShortestPaths))
    }

    pub fn with_path_computer(paths: Box<dyn PathComputer>) -> Self {
        Self { paths }
    }

    /// Runs the selected algorithm against the scenario and commits the
    /// resulting placement (the ledger is left mutated, not rolled back).
    ///
    /// The seed drives every stochastic step of the evolutionary search;
    /// greedy strategies are deterministic and ignore it.
    pub fn run(&self, scenario: &mut Scenario, algorithm: &Algorithm, seed: u64) -> Result<PlacementReport> {
        let pareto_front = match algorithm {
            Algorithm::Greedy(name) => {
                let strategy = strategy_by_name(name)?;
                log::info!("Running greedy strategy '{}' over {} services on {} servers", strategy.name(), scenario.services.len(), scenario.servers.len());

                strategy.place(scenario, &*self.paths)?;
                None
            }
            Algorithm::Evolutionary(parameters) => {
                log::info!(
                    "Running evolutionary search (population {}, {} generations) over {} services on {} servers",
                    parameters.population_size,
                    parameters.generations,
                    scenario.services.len(),
                    scenario.servers.len()
                );

                let mut rng = StdRng::seed_from_u64(seed);
                let outcome = search::engine::run(scenario, parameters, &*self.paths, &mut rng)?;
                Some(outcome.pareto_front)
            }
        };

        let metrics = metrics::collect(scenario, &*self.paths);
        let placement = scenario.services.iter().map(|service| service.server).collect();

        Ok(PlacementReport { placement, metrics, pareto_front })
    }
}
