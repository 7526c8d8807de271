use crate::domain::ids::{ProviderId, ServerId, ServiceId, SwitchId};
use std::collections::HashMap;

/// Linear server power model: a fixed static share plus a load-proportional
/// share, parameterized by the power drawn at full load.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerModel {
    /// Fraction of `max_power` drawn by a powered-on server regardless of load.
    pub static_power_fraction: f64,

    /// Power drawn at 100% cpu utilization.
    pub max_power: f64,
}

impl PowerModel {
    pub fn new(static_power_fraction: f64, max_power: f64) -> Self {
        Self { static_power_fraction, max_power }
    }

    /// Power consumption for the given cpu demand. A server with no demand is
    /// considered powered off and consumes nothing.
    pub fn consumption(&self, cpu_demand: i64, cpu_capacity: i64) -> f64 {
        if cpu_demand <= 0 {
            return 0.0;
        }

        let static_power = self.static_power_fraction * self.max_power;
        let utilization = cpu_demand as f64 / cpu_capacity as f64;
        static_power + (self.max_power - static_power) * utilization
    }

    /// Power cost of one additional busy core.
    pub fn per_core(&self, cpu_capacity: i64) -> f64 {
        self.max_power / cpu_capacity as f64
    }
}

/// Content digest of a container image layer.
pub type LayerDigest = String;

/// Description of one layer of a container image.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub digest: LayerDigest,
    pub size: i64,
}

/// A container image: an ordered list of content-addressed layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerImage {
    pub reference: String,
    pub layers: Vec<LayerDescriptor>,
}

/// An edge server attached to a network switch.
///
/// Demand exceeding capacity is a soft invariant: violations are counted as
/// overload penalties, never blocked.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeServer {
    pub id: ServerId,

    /// Switch (base station) this server is attached to.
    pub network_switch: SwitchId,

    /// Infrastructure provider operating this server.
    pub provider: ProviderId,

    pub cpu: i64,
    pub memory: i64,
    pub disk: i64,

    pub cpu_demand: i64,
    pub memory_demand: i64,
    pub disk_demand: i64,

    pub power_model: PowerModel,

    /// Container layers currently cached on this server, by digest.
    pub cached_layers: HashMap<LayerDigest, i64>,

    /// Services currently hosted by this server.
    pub hosted_services: Vec<ServiceId>,

    /// Permanent registry hosts keep their cached layers across resets.
    pub registry_host: bool,
}

impl EdgeServer {
    pub fn free_cpu(&self) -> i64 {
        self.cpu - self.cpu_demand
    }

    pub fn free_memory(&self) -> i64 {
        self.memory - self.memory_demand
    }

    pub fn free_disk(&self) -> i64 {
        self.disk - self.disk_demand
    }

    /// True if demand exceeds capacity on any resource dimension.
    pub fn is_overloaded(&self) -> bool {
        self.free_cpu() < 0 || self.free_memory() < 0 || self.free_disk() < 0
    }

    pub fn power_consumption(&self) -> f64 {
        self.power_model.consumption(self.cpu_demand, self.cpu)
    }
}
