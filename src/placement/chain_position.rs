use crate::domain::ids::{ServerId, ServiceId};
use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::Result;
use crate::placement::strategy::{mark_provisioned_applications, PlacementStrategy};

/// Chain-position priority strategy.
///
/// All services are processed globally, ordered by their position inside
/// their application's chain (every chain head first, then every second hop,
/// and so on). Candidate servers are re-ranked for each service by
/// (descending trust, ascending delay from the user, descending residual
/// cpu), and the first with capacity wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainPositionPriority;

impl ChainPositionPriority {
    pub const NAME: &'static str = "chain-position";
}

impl PlacementStrategy for ChainPositionPriority {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn place(&self, scenario: &mut Scenario, paths: &dyn PathComputer) -> Result<()> {
        let mut services: Vec<ServiceId> = scenario.services.iter().map(|service| service.id).collect();
        services.sort_by_key(|service| scenario.chain_position(*service));

        for service in services {
            let ranked = ranked_servers(scenario, service);

            for server in ranked {
                if scenario.has_capacity_to_host(server, service) {
                    scenario.provision(service, server, paths)?;
                    break;
                }
            }

            if scenario.service(service).server.is_none() {
                log::debug!("No host with capacity for service {}; leaving it unplaced", service);
            }
        }

        mark_provisioned_applications(scenario);
        Ok(())
    }
}

/// Servers ranked for one service. Residual cpu changes with every
/// provisioning decision, so the ranking is rebuilt per service.
fn ranked_servers(scenario: &mut Scenario, service: ServiceId) -> Vec<ServerId> {
    let app = scenario.service(service).application;
    let user = scenario.user_of_application(app);
    let user_switch = scenario.user(user).base_station;

    let Scenario { topology, servers, users, .. } = scenario;
    let owner = &users[user.index()];

    let mut ranked: Vec<(ServerId, u8, f64, i64)> = servers
        .iter()
        .map(|host| (host.id, owner.trust_in(host.provider), topology.delay_between(user_switch, host.network_switch), host.free_cpu()))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.total_cmp(&b.2)).then_with(|| b.3.cmp(&a.3)));
    ranked.into_iter().map(|(server, _, _, _)| server).collect()
}
