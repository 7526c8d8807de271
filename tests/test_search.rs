use edge_placement::config::{Algorithm, Scalarization, SearchParameters};
use edge_placement::domain::ids::ProviderId;
use edge_placement::domain::scenario::Scenario;
use edge_placement::domain::server::{ContainerImage, LayerDescriptor, PowerModel};
use edge_placement::search::engine::ParetoSolution;
use edge_placement::PlacementEngine;

fn parameters() -> SearchParameters {
    SearchParameters {
        population_size: 12,
        generations: 5,
        crossover_probability: 1.0,
        mutation_probability: 0.2,
        scalarization: Scalarization::GeometricMean,
    }
}

/// Three servers across two providers and two chains of two services each —
/// small enough to search quickly, contended enough that placements differ
/// in fitness.
fn search_scenario() -> Scenario {
    let mut scenario = Scenario::new();

    let core = scenario.topology.add_switch();
    let west = scenario.topology.add_switch();
    let east = scenario.topology.add_switch();
    let south = scenario.topology.add_switch();
    scenario.topology.add_link(core, west, 1.0, 10_000);
    scenario.topology.add_link(core, east, 2.0, 10_000);
    scenario.topology.add_link(east, south, 1.5, 10_000);

    scenario.add_image(ContainerImage {
        reference: "app:v1".to_string(),
        layers: vec![LayerDescriptor { digest: "sha256:base".to_string(), size: 40 }],
    });

    scenario.add_server(west, ProviderId::new(1), 4, 4096, 500, PowerModel::new(0.2, 250.0));
    scenario.add_server(east, ProviderId::new(1), 8, 8192, 500, PowerModel::new(0.25, 550.0));
    scenario.add_server(south, ProviderId::new(2), 4, 4096, 500, PowerModel::new(0.2, 250.0));

    for base in [core, west] {
        let user = scenario.add_user(base);
        scenario.set_trust(user, ProviderId::new(1), 2);
        scenario.set_trust(user, ProviderId::new(2), 0);

        let app = scenario.add_application(user, 5.0);
        scenario.add_service(app, 2, 1024, 1, "app:v1");
        scenario.add_service(app, 1, 512, 0, "app:v1");
    }

    scenario
}

/// Deb-style constrained domination over reported solutions.
fn dominates(a: &ParetoSolution, b: &ParetoSolution) -> bool {
    let feasible_a = a.evaluation.overloaded_servers == 0;
    let feasible_b = b.evaluation.overloaded_servers == 0;

    match (feasible_a, feasible_b) {
        (true, false) => true,
        (false, true) => false,
        (false, false) => a.evaluation.overloaded_servers < b.evaluation.overloaded_servers,
        (true, true) => {
            let fa = a.evaluation.fitness();
            let fb = b.evaluation.fitness();
            fa.iter().zip(fb.iter()).all(|(x, y)| x <= y) && fa.iter().zip(fb.iter()).any(|(x, y)| x < y)
        }
    }
}

#[test]
fn final_front_is_mutually_non_dominated() {
    let mut scenario = search_scenario();
    let engine = PlacementEngine::new();

    let report = engine.run(&mut scenario, &Algorithm::Evolutionary(parameters()), 1).unwrap();
    let front = report.pareto_front.expect("the evolutionary path reports a Pareto front");

    assert!(!front.is_empty());
    for (i, a) in front.iter().enumerate() {
        for (j, b) in front.iter().enumerate() {
            if i != j {
                assert!(!dominates(a, b), "solution {} dominates solution {} inside the reported front", i, j);
            }
        }
    }
}

#[test]
fn committed_placement_is_applied_and_total() {
    let mut scenario = search_scenario();
    let engine = PlacementEngine::new();

    let report = engine.run(&mut scenario, &Algorithm::Evolutionary(parameters()), 1).unwrap();

    assert_eq!(report.placement.len(), 4);
    assert!(report.placement.iter().all(|host| host.is_some()), "the committed vector assigns every service");
    assert!(scenario.servers.iter().any(|server| server.cpu_demand > 0), "the winning placement is provisioned, not rolled back");
}

#[test]
fn identical_seeds_reproduce_the_run() {
    let engine = PlacementEngine::new();

    let mut first = search_scenario();
    let report_a = engine.run(&mut first, &Algorithm::Evolutionary(parameters()), 42).unwrap();

    let mut second = search_scenario();
    let report_b = engine.run(&mut second, &Algorithm::Evolutionary(parameters()), 42).unwrap();

    assert_eq!(report_a.placement, report_b.placement);
    assert_eq!(report_a.metrics, report_b.metrics);
}

#[test]
fn normalized_sum_scalarization_also_commits_a_front_member() {
    let mut scenario = search_scenario();
    let engine = PlacementEngine::new();

    let mut params = parameters();
    params.scalarization = Scalarization::NormalizedSum;

    let report = engine.run(&mut scenario, &Algorithm::Evolutionary(params), 3).unwrap();
    let front = report.pareto_front.unwrap();

    let committed: Vec<_> = report.placement.iter().map(|host| host.unwrap()).collect();
    assert!(front.iter().any(|solution| solution.placement == committed), "the committed vector comes from the Pareto set");
}

#[test]
fn invalid_parameters_are_rejected_before_searching() {
    let mut scenario = search_scenario();
    let engine = PlacementEngine::new();

    let mut params = parameters();
    params.population_size = 1;

    assert!(engine.run(&mut scenario, &Algorithm::Evolutionary(params), 1).is_err());
}

#[test]
fn report_serializes_to_json() {
    let mut scenario = search_scenario();
    let engine = PlacementEngine::new();

    let report = engine.run(&mut scenario, &Algorithm::Evolutionary(parameters()), 1).unwrap();
    let json = report.to_json().unwrap();

    assert!(json.contains("pareto_front"));
    assert!(json.contains("delay_sla_violations"));
}
