use crate::domain::ids::{ApplicationId, UserId};
use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::Result;
use crate::placement::candidates::TrustDelayCandidate;
use crate::placement::strategy::{mark_provisioned_applications, PlacementStrategy};
use std::cmp::Reverse;

/// Privacy-aware priority strategy.
///
/// Applications are processed in ascending delay-SLA order, so the tightest
/// budgets pick their hosts first. Within an application, services are
/// processed by descending (privacy requirement, cpu demand); candidate
/// servers are ranked by descending trust of the owning user in the server's
/// provider, then by ascending delay from the user's base station.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustDelayPriority;

impl TrustDelayPriority {
    pub const NAME: &'static str = "trust-delay";
}

impl PlacementStrategy for TrustDelayPriority {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn place(&self, scenario: &mut Scenario, paths: &dyn PathComputer) -> Result<()> {
        let mut apps: Vec<ApplicationId> = scenario.applications.iter().map(|app| app.id).collect();
        apps.sort_by(|a, b| {
            let sla_a = scenario.user(scenario.user_of_application(*a)).delay_sla(*a);
            let sla_b = scenario.user(scenario.user_of_application(*b)).delay_sla(*b);
            sla_a.total_cmp(&sla_b)
        });

        for app in apps {
            let user = scenario.user_of_application(app);
            let candidates = host_candidates(scenario, user);

            let mut services = scenario.application(app).services.clone();
            services.sort_by_key(|service| {
                let svc = scenario.service(*service);
                Reverse((svc.privacy_requirement, svc.cpu_demand))
            });

            for service in services {
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
        }

        mark_provisioned_applications(scenario);
        Ok(())
    }
}

/// All edge servers ranked by (descending trust, ascending delay) for the
/// given user. The ranking depends only on static scenario data, so it is
/// computed once per application.
fn host_candidates(scenario: &mut Scenario, user: UserId) -> Vec<TrustDelayCandidate> {
    let user_switch = scenario.user(user).base_station;

    let mut candidates = Vec::with_capacity(scenario.servers.len());
    let Scenario { topology, servers, users, .. } = scenario;
    let owner = &users[user.index()];

    for host in servers.iter() {
        candidates.push(TrustDelayCandidate {
            server: host.id,
            trust_degree: owner.trust_in(host.provider),
            delay: topology.delay_between(user_switch, host.network_switch),
        });
    }

    candidates.sort_by(|a, b| b.trust_degree.cmp(&a.trust_degree).then_with(|| a.delay.total_cmp(&b.delay)));
    candidates
}
