use edge_placement::config::Algorithm;
use edge_placement::domain::ids::{ProviderId, ServerId};
use edge_placement::domain::scenario::Scenario;
use edge_placement::domain::server::{ContainerImage, PowerModel};
use edge_placement::PlacementEngine;

const STRATEGIES: [&str; 3] = ["trust-delay", "chain-position", "composite-score"];

/// Two servers operated by different providers: server 0 (cpu=4, mem=4096)
/// is run by a provider the user fully trusts, server 1 (cpu=2, mem=2048) by
/// an untrusted one. A single service (cpu=3, mem=3072, privacy=1) only fits
/// on server 0.
fn capacity_and_trust_scenario() -> Scenario {
    let mut scenario = Scenario::new();

    let user_switch = scenario.topology.add_switch();
    let switch_a = scenario.topology.add_switch();
    let switch_b = scenario.topology.add_switch();
    scenario.topology.add_link(user_switch, switch_a, 1.0, 10_000);
    scenario.topology.add_link(user_switch, switch_b, 1.0, 10_000);

    scenario.add_image(ContainerImage { reference: "app:v1".to_string(), layers: Vec::new() });

    scenario.add_server(switch_a, ProviderId::new(1), 4, 4096, 1000, PowerModel::new(0.2, 250.0));
    scenario.add_server(switch_b, ProviderId::new(2), 2, 2048, 1000, PowerModel::new(0.2, 250.0));

    let user = scenario.add_user(user_switch);
    scenario.set_trust(user, ProviderId::new(1), 2);
    scenario.set_trust(user, ProviderId::new(2), 0);

    let app = scenario.add_application(user, 100.0);
    scenario.add_service(app, 3, 3072, 1, "app:v1");

    scenario
}

/// A single feasible server two delay units away from the user, with a delay
/// SLA of 1: any placement violates the delay SLA, and nothing else.
fn tight_sla_scenario() -> Scenario {
    let mut scenario = Scenario::new();

    let user_switch = scenario.topology.add_switch();
    let server_switch = scenario.topology.add_switch();
    scenario.topology.add_link(user_switch, server_switch, 2.0, 10_000);

    scenario.add_image(ContainerImage { reference: "app:v1".to_string(), layers: Vec::new() });
    scenario.add_server(server_switch, ProviderId::new(1), 8, 8192, 1000, PowerModel::new(0.2, 250.0));

    let user = scenario.add_user(user_switch);
    scenario.set_trust(user, ProviderId::new(1), 2);

    let app = scenario.add_application(user, 1.0);
    scenario.add_service(app, 2, 1024, 0, "app:v1");

    scenario
}

#[test]
fn service_lands_on_the_only_server_with_capacity() {
    for name in STRATEGIES {
        let mut scenario = capacity_and_trust_scenario();
        let engine = PlacementEngine::new();

        let report = engine.run(&mut scenario, &Algorithm::greedy(name), 1).unwrap();

        assert_eq!(report.placement, vec![Some(ServerId::new(0))], "strategy '{}' must pick the only server with capacity", name);
        assert_eq!(report.metrics.privacy_sla_violations, 0, "trust 2 covers privacy requirement 1 for strategy '{}'", name);
        assert_eq!(report.metrics.overloaded_edge_servers, 0);
    }
}

#[test]
fn tight_delay_sla_counts_exactly_one_violation() {
    for name in STRATEGIES {
        let mut scenario = tight_sla_scenario();
        let engine = PlacementEngine::new();

        let report = engine.run(&mut scenario, &Algorithm::greedy(name), 1).unwrap();

        assert_eq!(report.placement, vec![Some(ServerId::new(0))]);
        assert_eq!(report.metrics.delay_sla_violations, 1, "delay 2 against SLA 1 is one violation for strategy '{}'", name);
        assert_eq!(report.metrics.privacy_sla_violations, 0);
    }
}

#[test]
fn greedy_strategies_are_deterministic() {
    for name in STRATEGIES {
        let mut first = multi_application_scenario();
        let mut second = multi_application_scenario();
        let engine = PlacementEngine::new();

        let report_a = engine.run(&mut first, &Algorithm::greedy(name), 7).unwrap();
        let report_b = engine.run(&mut second, &Algorithm::greedy(name), 7).unwrap();

        assert_eq!(report_a.placement, report_b.placement, "strategy '{}' must reproduce its placement on identical scenarios", name);
        assert_eq!(report_a.metrics, report_b.metrics);
    }
}

#[test]
fn unplaceable_service_is_left_unplaced_without_error() {
    for name in STRATEGIES {
        let mut scenario = capacity_and_trust_scenario();
        // A second service that fits nowhere once the first occupies server 0.
        let app = scenario.applications[0].id;
        scenario.add_service(app, 4, 4096, 0, "app:v1");

        let engine = PlacementEngine::new();
        let report = engine.run(&mut scenario, &Algorithm::greedy(name), 1).unwrap();

        assert!(report.placement.iter().any(|host| host.is_none()), "strategy '{}' must leave the oversized service unplaced", name);
        assert!(report.placement.iter().any(|host| host.is_some()), "strategy '{}' must still place the feasible service", name);
    }
}

#[test]
fn unknown_strategy_name_is_an_error() {
    let mut scenario = capacity_and_trust_scenario();
    let engine = PlacementEngine::new();

    let result = engine.run(&mut scenario, &Algorithm::greedy("best-fit"), 1);
    assert!(result.is_err());
}

#[test]
fn trust_delay_prefers_trusted_provider_over_closer_server() {
    // Both servers have capacity; the closer one is untrusted. The
    // trust-first ranking must pick the distant, trusted server.
    let mut scenario = Scenario::new();

    let user_switch = scenario.topology.add_switch();
    let near_switch = scenario.topology.add_switch();
    let far_switch = scenario.topology.add_switch();
    scenario.topology.add_link(user_switch, near_switch, 1.0, 10_000);
    scenario.topology.add_link(near_switch, far_switch, 5.0, 10_000);

    scenario.add_image(ContainerImage { reference: "app:v1".to_string(), layers: Vec::new() });
    scenario.add_server(near_switch, ProviderId::new(1), 8, 8192, 1000, PowerModel::new(0.2, 250.0));
    scenario.add_server(far_switch, ProviderId::new(2), 8, 8192, 1000, PowerModel::new(0.2, 250.0));

    let user = scenario.add_user(user_switch);
    scenario.set_trust(user, ProviderId::new(1), 0);
    scenario.set_trust(user, ProviderId::new(2), 2);

    let app = scenario.add_application(user, 100.0);
    scenario.add_service(app, 2, 1024, 1, "app:v1");

    let engine = PlacementEngine::new();
    let report = engine.run(&mut scenario, &Algorithm::greedy("trust-delay"), 1).unwrap();

    assert_eq!(report.placement, vec![Some(ServerId::new(1))]);
    assert_eq!(report.metrics.privacy_sla_violations, 0);
}

/// Three applications with distinct SLAs and privacy profiles across two
/// providers, enough to exercise ordering decisions in every strategy.
fn multi_application_scenario() -> Scenario {
    let mut scenario = Scenario::new();

    let core = scenario.topology.add_switch();
    let west = scenario.topology.add_switch();
    let east = scenario.topology.add_switch();
    let south = scenario.topology.add_switch();
    scenario.topology.add_link(core, west, 1.0, 10_000);
    scenario.topology.add_link(core, east, 2.0, 10_000);
    scenario.topology.add_link(core, south, 3.0, 10_000);
    scenario.topology.add_link(west, east, 2.5, 10_000);

    scenario.add_image(ContainerImage { reference: "app:v1".to_string(), layers: Vec::new() });

    scenario.add_server(west, ProviderId::new(1), 8, 8192, 1000, PowerModel::new(0.2, 250.0));
    scenario.add_server(east, ProviderId::new(1), 4, 4096, 1000, PowerModel::new(0.1, 150.0));
    scenario.add_server(south, ProviderId::new(2), 12, 16_384, 1000, PowerModel::new(0.3, 550.0));

    for (base, sla, privacy, chain_len) in [(core, 4.0, 2, 2), (west, 8.0, 0, 1), (east, 6.0, 1, 3)] {
        let user = scenario.add_user(base);
        scenario.set_trust(user, ProviderId::new(1), 2);
        scenario.set_trust(user, ProviderId::new(2), 1);

        let app = scenario.add_application(user, sla);
        for hop in 0..chain_len {
            scenario.add_service(app, 1 + hop as i64, 512 * (hop as i64 + 1), privacy, "app:v1");
        }
    }

    scenario
}
