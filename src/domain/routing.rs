use crate::domain::ids::{ApplicationId, SwitchId, UserId};
use crate::domain::scenario::Scenario;
use std::fmt;

/// Strategy for deriving the communication path of a (user, application)
/// pair.
///
/// The computer is selected once when the engine is configured and passed
/// explicitly into every component that refreshes paths; entity types carry
/// no pluggable behavior themselves.
pub trait PathComputer: fmt::Debug {
    /// Recomputes the set of links used for the communication between a user
    /// and its application, updates link usage attribution and the user's
    /// stored delay, and returns the new path.
    ///
    /// This is the only operation that refreshes an application's delay:
    /// every component that changes a placement must call it afterwards for
    /// each affected application.
    fn set_communication_path(&self, scenario: &mut Scenario, user: UserId, app: ApplicationId) -> Vec<Vec<SwitchId>>;
}

/// Default path computer: one cached minimum-delay path per chain hop.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedShortestPaths;

impl PathComputer for CachedShortestPaths {
    fn set_communication_path(&self, scenario: &mut Scenario, user: UserId, app: ApplicationId) -> Vec<Vec<SwitchId>> {
        // Releasing links used in the past to connect the user with its application
        let previous = scenario.users[user.index()].communication_paths.get(&app).cloned().unwrap_or_default();
        if !previous.is_empty() {
            scenario.topology.release_communication_path(&previous, app);
        }

        // Service chain: the user's base station followed by the base station
        // of each placed service's host. Unplaced services contribute no hop.
        let mut chain = vec![scenario.users[user.index()].base_station];
        for service_id in scenario.applications[app.index()].services.clone() {
            if let Some(server) = scenario.services[service_id.index()].server {
                chain.push(scenario.servers[server.index()].network_switch);
            }
        }

        // One path segment per consecutive pair; identical endpoints yield an
        // empty segment with delay 0.
        let mut segments: Vec<Vec<SwitchId>> = Vec::with_capacity(chain.len().saturating_sub(1));
        for pair in chain.windows(2) {
            if pair[0] == pair[1] {
                segments.push(Vec::new());
            } else {
                segments.push(scenario.topology.shortest_path(pair[0], pair[1]));
            }
        }

        scenario.topology.allocate_communication_path(&segments, app);

        let delay: f64 = segments.iter().map(|segment| scenario.topology.path_delay(segment)).sum();

        let owner = &mut scenario.users[user.index()];
        owner.communication_paths.insert(app, segments.clone());
        owner.delays.insert(app, delay);

        segments
    }
}
