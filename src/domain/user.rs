use crate::domain::ids::{ApplicationId, ProviderId, SwitchId, UserId};
use std::collections::HashMap;

/// A user accessing one or more applications from a base station.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,

    /// Switch of the base station the user is connected to.
    pub base_station: SwitchId,

    /// Applications owned by this user.
    pub applications: Vec<ApplicationId>,

    /// End-to-end delay budget per application.
    pub delay_slas: HashMap<ApplicationId, f64>,

    /// Ordinal trust level per infrastructure provider, compared against the
    /// privacy requirement of services placed on that provider's servers.
    pub providers_trust: HashMap<ProviderId, u8>,

    /// Active communication path per application: one switch sequence per hop
    /// of the service chain (empty sequence for a zero-length hop).
    pub communication_paths: HashMap<ApplicationId, Vec<Vec<SwitchId>>>,

    /// Computed end-to-end delay per application.
    pub delays: HashMap<ApplicationId, f64>,
}

impl User {
    /// Trust level of this user in the given provider. Providers absent from
    /// the trust vector are treated as untrusted (level 0).
    pub fn trust_in(&self, provider: ProviderId) -> u8 {
        self.providers_trust.get(&provider).copied().unwrap_or(0)
    }

    pub fn delay_sla(&self, app: ApplicationId) -> f64 {
        self.delay_slas.get(&app).copied().unwrap_or(f64::INFINITY)
    }

    pub fn delay(&self, app: ApplicationId) -> f64 {
        self.delays.get(&app).copied().unwrap_or(0.0)
    }
}
