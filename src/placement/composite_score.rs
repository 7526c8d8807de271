use crate::domain::ids::{ApplicationId, ServiceId, SwitchId, UserId};
use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::Result;
use crate::placement::candidates::{min_max_norm, normalize_cpu_and_memory, CompositeCandidate, FieldBounds};
use crate::placement::strategy::PlacementStrategy;

/// Composite-score priority strategy.
///
/// Keeps a work queue of unprovisioned applications. Each round scores every
/// pending application on delay urgency and privacy weight, min-max
/// normalizes both scores across the queue, and places the application with
/// the highest combined score, service by service in chain order. Candidate
/// servers are sorted by (ascending SLA-violation count, ascending normalized
/// sum of the affected-services, power, and delay costs).
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeScorePriority;

impl CompositeScorePriority {
    pub const NAME: &'static str = "composite-score";
}

impl PlacementStrategy for CompositeScorePriority {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn place(&self, scenario: &mut Scenario, paths: &dyn PathComputer) -> Result<()> {
        while scenario.applications.iter().any(|app| !app.provisioned) {
            let pending: Vec<ApplicationId> = scenario.applications.iter().filter(|app| !app.provisioned).map(|app| app.id).collect();
            let selected = select_application(scenario, &pending);

            for service in scenario.application(selected).services.clone() {
                let mut candidates = host_candidates(scenario, service);
                let bounds = FieldBounds::of(&candidates);

                candidates.sort_by(|a, b| {
                    a.sla_violations.cmp(&b.sla_violations).then_with(|| bounds.normalized_sum(a).total_cmp(&bounds.normalized_sum(b)))
                });

                for candidate in &candidates {
                    if scenario.has_capacity_to_host(candidate.server, service) {
                        scenario.provision(service, candidate.server, paths)?;
                        break;
                    }
                }

                if scenario.service(service).server.is_none() {
                    log::debug!("No host with capacity for service {}; leaving it unplaced", service);
                }
            }

            // The chain has been visited once; mark it done regardless of
            // whether every service found a host so the queue always drains.
            scenario.applications[selected.index()].provisioned = true;
        }

        Ok(())
    }
}

/// Picks the pending application maximizing the sum of its normalized delay
/// and privacy scores. Ties keep the earliest application.
fn select_application(scenario: &mut Scenario, pending: &[ApplicationId]) -> ApplicationId {
    let scored: Vec<(ApplicationId, f64, f64)> =
        pending.iter().map(|app| (*app, application_delay_score(scenario, *app), application_privacy_score(scenario, *app))).collect();

    let (delay_min, delay_max) = score_bounds(scored.iter().map(|(_, delay, _)| *delay));
    let (privacy_min, privacy_max) = score_bounds(scored.iter().map(|(_, _, privacy)| *privacy));

    let mut best = scored[0].0;
    let mut best_score = f64::NEG_INFINITY;
    for (app, delay, privacy) in &scored {
        let combined = min_max_norm(*delay, delay_min, delay_max) + min_max_norm(*privacy, privacy_min, privacy_max);
        if combined > best_score {
            best = *app;
            best_score = combined;
        }
    }
    best
}

fn score_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| (min.min(value), max.max(value)))
}

/// Delay urgency of an application: inversely related to its SLA budget and
/// to the number of servers reachable within that budget, scaled by chain
/// length. Applications no server can satisfy score 0.
fn application_delay_score(scenario: &mut Scenario, app: ApplicationId) -> f64 {
    let user = scenario.user_of_application(app);
    let sla = scenario.user(user).delay_sla(app);
    let user_switch = scenario.user(user).base_station;
    let chain_len = scenario.application(app).services.len();

    let Scenario { topology, servers, .. } = scenario;

    let mut within_budget = 0usize;
    for host in servers.iter() {
        if topology.delay_between(user_switch, host.network_switch) <= sla {
            within_budget += 1;
        }
    }

    let base = if within_budget == 0 { 0.0 } else { 1.0 / (within_budget as f64 * sla).sqrt() };
    base * chain_len as f64
}

/// Privacy weight of an application: normalized demand of each service
/// weighted by its privacy requirement.
fn application_privacy_score(scenario: &Scenario, app: ApplicationId) -> f64 {
    scenario
        .application(app)
        .services
        .iter()
        .map(|service| {
            let svc = scenario.service(*service);
            normalize_cpu_and_memory(svc.cpu_demand, svc.memory_demand) * svc.privacy_requirement as f64
        })
        .sum()
}

/// Scores every server as a host for the given service.
fn host_candidates(scenario: &mut Scenario, service: ServiceId) -> Vec<CompositeCandidate> {
    let svc = scenario.service(service).clone();
    let app = svc.application;
    let user = scenario.user_of_application(app);
    let last_in_chain = scenario.is_last_in_chain(service);
    let position = scenario.chain_position(service);

    // Hop anchor: the host of the nearest placed predecessor, or the user's
    // base station when no predecessor found a host.
    let chain = scenario.application(app).services.clone();
    let mut previous_switch = scenario.user(user).base_station;
    for predecessor in chain[..position].iter().rev() {
        if let Some(host) = scenario.service(*predecessor).server {
            previous_switch = scenario.server(host).network_switch;
            break;
        }
    }

    let app_delay = scenario.user(user).delay(app);
    let sla = scenario.user(user).delay_sla(app);

    // Pending services elsewhere that could legally use a candidate server,
    // gathered up front: (base-station switch, privacy requirement, owner).
    let pending: Vec<(SwitchId, u8, UserId)> = scenario
        .services
        .iter()
        .filter(|other| other.server.is_none() && other.id != service)
        .map(|other| {
            let owner = scenario.user_of_application(other.application);
            (scenario.user(owner).base_station, other.privacy_requirement, owner)
        })
        .collect();

    let Scenario { topology, servers, users, .. } = scenario;
    let owner = &users[user.index()];

    let mut candidates = Vec::with_capacity(servers.len());
    for host in servers.iter() {
        let additional_delay = topology.delay_between(previous_switch, host.network_switch);
        let overall_delay = app_delay + additional_delay;

        let violates_delay = u32::from(overall_delay > sla);
        let violates_privacy = u32::from(owner.trust_in(host.provider) < svc.privacy_requirement);

        // Power cost of hosting here: one busy core, plus the static share if
        // this placement would be the one powering the server on.
        let mut power_consumption = host.power_model.per_core(host.cpu);
        if host.cpu_demand == 0 {
            power_consumption += host.power_model.static_power_fraction;
        }

        let mut affected_services_cost = 0.0;
        if last_in_chain {
            for (pending_switch, privacy_requirement, pending_owner) in &pending {
                if users[pending_owner.index()].trust_in(host.provider) >= *privacy_requirement {
                    let distance = topology.delay_between(*pending_switch, host.network_switch);
                    affected_services_cost += 1.0 / distance.max(1.0);
                }
            }
        }

        candidates.push(CompositeCandidate {
            server: host.id,
            sla_violations: violates_delay + violates_privacy,
            affected_services_cost,
            power_consumption,
            delay_cost: if last_in_chain { additional_delay } else { 0.0 },
        });
    }

    candidates
}
