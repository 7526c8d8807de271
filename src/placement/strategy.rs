use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::{Error, Result};
use crate::placement::chain_position::ChainPositionPriority;
use crate::placement::composite_score::CompositeScorePriority;
use crate::placement::trust_delay::TrustDelayPriority;
use std::fmt;

/// A greedy placement policy: a total pass over the currently unplaced
/// services that provisions each on a chosen server, or leaves it unplaced
/// when no server has capacity.
///
/// Strategies never fail on an unplaceable service; the gap surfaces later
/// through the metrics record.
pub trait PlacementStrategy: fmt::Debug {
    fn name(&self) -> &'static str;

    fn place(&self, scenario: &mut Scenario, paths: &dyn PathComputer) -> Result<()>;
}

/// Resolves a strategy from its configured name.
pub fn strategy_by_name(name: &str) -> Result<Box<dyn PlacementStrategy>> {
    match name {
        TrustDelayPriority::NAME => Ok(Box::new(TrustDelayPriority)),
        ChainPositionPriority::NAME => Ok(Box::new(ChainPositionPriority)),
        CompositeScorePriority::NAME => Ok(Box::new(CompositeScorePriority)),
        _ => Err(Error::UnknownStrategy(name.to_string())),
    }
}

/// Flags every application whose whole chain found a host as provisioned.
pub(crate) fn mark_provisioned_applications(scenario: &mut Scenario) {
    for index in 0..scenario.applications.len() {
        let fully_placed = scenario.applications[index].services.iter().all(|service| scenario.services[service.index()].server.is_some());
        scenario.applications[index].provisioned = fully_placed;
    }
}
