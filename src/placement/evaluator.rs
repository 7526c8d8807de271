//! Whole-placement evaluation: apply a placement vector, measure the
//! fitness tuple and overload penalty, and roll the scenario back.
//!
//! The cycle mutates shared scenario state, so no two evaluations may run
//! against the same `Scenario` value concurrently. Parallel searches must
//! clone the scenario per worker and merge only the resulting evaluations.

use crate::domain::ids::{ServerId, ServiceId};
use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::{Error, Result};
use serde::Serialize;

/// Outcome of evaluating one placement: the three fitness objectives plus
/// the overload constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    /// Applications whose end-to-end delay exceeds their SLA.
    pub delay_sla_violations: u32,

    /// Services whose privacy requirement exceeds the owning user's trust in
    /// their host's provider.
    pub privacy_sla_violations: u32,

    /// Aggregate power consumption of all servers with nonzero demand.
    pub power_consumption: f64,

    /// Servers whose demand exceeds capacity on any of cpu/memory/disk.
    pub overloaded_servers: u32,
}

impl Evaluation {
    /// The three objectives as a minimization vector.
    pub fn fitness(&self) -> [f64; 3] {
        [self.delay_sla_violations as f64, self.privacy_sla_violations as f64, self.power_consumption]
    }

    /// The overload constraint value; feasible solutions have 0.
    pub fn penalty(&self) -> f64 {
        self.overloaded_servers as f64
    }
}

/// Provisions every (service, server) pair of the placement vector.
pub fn apply_placement(scenario: &mut Scenario, placement: &[ServerId], paths: &dyn PathComputer) -> Result<()> {
    if placement.len() != scenario.services.len() {
        return Err(Error::PlacementLengthMismatch { vector_len: placement.len(), service_count: scenario.services.len() });
    }

    for (index, server) in placement.iter().enumerate() {
        scenario.provision(ServiceId::new(index), *server, paths)?;
    }
    Ok(())
}

/// Measures the current placement state without modifying placements.
///
/// Refreshes every (user, application) communication path first, since that
/// is the only operation that recomputes delays.
pub fn evaluate_placement(scenario: &mut Scenario, paths: &dyn PathComputer) -> Evaluation {
    let mut delay_sla_violations = 0;
    let mut privacy_sla_violations = 0;

    let user_ids: Vec<_> = scenario.users.iter().map(|user| user.id).collect();
    for user in user_ids {
        for app in scenario.user(user).applications.clone() {
            paths.set_communication_path(scenario, user, app);

            let owner = scenario.user(user);
            if owner.delay(app) > owner.delay_sla(app) {
                delay_sla_violations += 1;
            }

            for service in &scenario.application(app).services {
                let svc = scenario.service(*service);
                if let Some(host) = svc.server {
                    let provider = scenario.server(host).provider;
                    if svc.privacy_requirement > scenario.user(user).trust_in(provider) {
                        privacy_sla_violations += 1;
                    }
                }
            }
        }
    }

    let mut power_consumption = 0.0;
    let mut overloaded_servers = 0;
    for host in &scenario.servers {
        power_consumption += host.power_consumption();
        if host.is_overloaded() {
            overloaded_servers += 1;
        }
    }

    Evaluation { delay_sla_violations, privacy_sla_violations, power_consumption, overloaded_servers }
}

/// Full apply → measure → reset cycle for one candidate placement vector.
/// Leaves the scenario at its pre-evaluation baseline.
pub fn evaluate(scenario: &mut Scenario, placement: &[ServerId], paths: &dyn PathComputer) -> Result<Evaluation> {
    apply_placement(scenario, placement, paths)?;
    let evaluation = evaluate_placement(scenario, paths);
    scenario.reset();
    Ok(evaluation)
}
