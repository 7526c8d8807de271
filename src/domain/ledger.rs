//! Resource bookkeeping: capacity checks, provisioning, and rollback.
//!
//! Provisioning and reset form the apply/measure/reset cycle the evaluator
//! and the greedy strategies share. Reset restores the exact pre-evaluation
//! baseline, so repeated trial evaluations are side-effect-free between one
//! another.

use crate::domain::ids::{ServerId, ServiceId};
use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::Result;

impl Scenario {
    /// True iff the server's residual cpu and memory each cover the service's
    /// declared demand.
    ///
    /// Disk is deliberately not part of this check: image-layer disk cost is
    /// only known after provisioning, so disk pressure surfaces through the
    /// overload penalty instead of blocking selection.
    pub fn has_capacity_to_host(&self, server: ServerId, service: ServiceId) -> bool {
        let host = self.server(server);
        let svc = self.service(service);

        host.free_cpu() >= svc.cpu_demand && host.free_memory() >= svc.memory_demand
    }

    /// Provisions the service on the server.
    ///
    /// Increments the host's cpu/memory demand, caches every image layer the
    /// host lacks (bumping disk demand by its size), records the host/service
    /// relationship, and refreshes the communication path of the owning
    /// application.
    pub fn provision(&mut self, service: ServiceId, server: ServerId, paths: &dyn PathComputer) -> Result<()> {
        let (cpu_demand, memory_demand) = {
            let svc = self.service(service);
            (svc.cpu_demand, svc.memory_demand)
        };

        let missing_layers = self.uncached_layers(server, service)?;

        let host = &mut self.servers[server.index()];
        host.cpu_demand += cpu_demand;
        host.memory_demand += memory_demand;

        for layer in missing_layers {
            host.disk_demand += layer.size;
            host.cached_layers.insert(layer.digest, layer.size);
        }

        host.hosted_services.push(service);
        self.services[service.index()].server = Some(server);

        let app = self.services[service.index()].application;
        let user = self.user_of_application(app);
        paths.set_communication_path(self, user, app);

        Ok(())
    }

    /// Rolls every server, service, user, and link back to the pre-placement
    /// baseline.
    ///
    /// Demand counters are zeroed, hosted services are detached and unplaced,
    /// cached layers are dropped from every server that is not a permanent
    /// registry host, link usage attribution is cleared, and per-application
    /// delay and path state is emptied.
    pub fn reset(&mut self) {
        for service in &mut self.services {
            service.server = None;
        }

        for host in &mut self.servers {
            host.cpu_demand = 0;
            host.memory_demand = 0;
            host.disk_demand = 0;
            host.hosted_services.clear();

            if !host.registry_host {
                host.cached_layers.clear();
            }
        }

        for app in &mut self.applications {
            app.provisioned = false;
        }

        for user in &mut self.users {
            let owned: Vec<_> = user.applications.clone();
            for app in owned {
                user.delays.insert(app, 0.0);
                user.communication_paths.insert(app, Vec::new());
            }
        }

        self.topology.clear_active_flows();
    }
}
