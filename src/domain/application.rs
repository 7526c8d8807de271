use crate::domain::ids::{ApplicationId, ServerId, ServiceId, UserId};

/// A deployable unit of an application with its own resource demand and
/// privacy requirement.
///
/// Lifecycle: created unplaced; provisioned by a placement decision; may be
/// returned to unplaced by a ledger reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: ServiceId,

    /// Application this service belongs to.
    pub application: ApplicationId,

    pub cpu_demand: i64,
    pub memory_demand: i64,

    /// Ordinal privacy level this service requires from its host's provider.
    pub privacy_requirement: u8,

    /// Reference of the container image this service runs.
    pub image: String,

    /// Host server, or `None` while unplaced.
    pub server: Option<ServerId>,
}

/// An ordered chain of services owned by a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub id: ApplicationId,

    /// Services composing the chain, in traversal order from the user outward.
    pub services: Vec<ServiceId>,

    /// User accessing this application.
    pub user: UserId,

    /// Set once the placement pass has visited every service of the chain.
    pub provisioned: bool,
}
