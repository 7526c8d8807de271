use crate::domain::application::{Application, Service};
use crate::domain::ids::{ApplicationId, ProviderId, ServerId, ServiceId, SwitchId, UserId};
use crate::domain::server::{ContainerImage, EdgeServer, LayerDescriptor, PowerModel};
use crate::domain::topology::NetworkTopology;
use crate::domain::user::User;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// A frozen snapshot of the infrastructure and workload handed to the
/// placement engine, together with all mutable placement state.
///
/// The scenario is the single owner of every entity arena. It is `Clone` so
/// that callers wanting to evaluate placements in parallel can give each
/// worker an independent deep copy and merge only the resulting fitness
/// values; two evaluations must never share one scenario (see the evaluator
/// module).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scenario {
    pub topology: NetworkTopology,
    pub servers: Vec<EdgeServer>,
    pub services: Vec<Service>,
    pub applications: Vec<Application>,
    pub users: Vec<User>,
    pub images: HashMap<String, ContainerImage>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container image so services can reference it by name.
    pub fn add_image(&mut self, image: ContainerImage) {
        self.images.insert(image.reference.clone(), image);
    }

    /// Creates an edge server attached to the given switch.
    pub fn add_server(&mut self, switch: SwitchId, provider: ProviderId, cpu: i64, memory: i64, disk: i64, power_model: PowerModel) -> ServerId {
        let id = ServerId::new(self.servers.len());

        self.servers.push(EdgeServer {
            id,
            network_switch: switch,
            provider,
            cpu,
            memory,
            disk,
            cpu_demand: 0,
            memory_demand: 0,
            disk_demand: 0,
            power_model,
            cached_layers: HashMap::new(),
            hosted_services: Vec::new(),
            registry_host: false,
        });

        self.topology.switch_mut(switch).edge_server = Some(id);
        id
    }

    /// Marks a server as a permanent registry host and seeds it with the
    /// layers of the given images. Seeded layers belong to the baseline and
    /// carry no demand, so a later reset restores exactly this state.
    pub fn make_registry_host(&mut self, server: ServerId, image_references: &[&str]) -> Result<()> {
        for reference in image_references {
            let image = self.images.get(*reference).ok_or_else(|| Error::UnknownImage(reference.to_string()))?;
            for layer in &image.layers {
                self.servers[server.index()].cached_layers.insert(layer.digest.clone(), layer.size);
            }
        }
        self.servers[server.index()].registry_host = true;
        Ok(())
    }

    /// Creates a user bound to the given base-station switch.
    pub fn add_user(&mut self, base_station: SwitchId) -> UserId {
        let id = UserId::new(self.users.len());

        self.users.push(User {
            id,
            base_station,
            applications: Vec::new(),
            delay_slas: HashMap::new(),
            providers_trust: HashMap::new(),
            communication_paths: HashMap::new(),
            delays: HashMap::new(),
        });
        id
    }

    pub fn set_trust(&mut self, user: UserId, provider: ProviderId, level: u8) {
        self.users[user.index()].providers_trust.insert(provider, level);
    }

    /// Creates an application owned by the user, with the given delay SLA.
    pub fn add_application(&mut self, user: UserId, delay_sla: f64) -> ApplicationId {
        let id = ApplicationId::new(self.applications.len());

        self.applications.push(Application { id, services: Vec::new(), user, provisioned: false });

        let owner = &mut self.users[user.index()];
        owner.applications.push(id);
        owner.delay_slas.insert(id, delay_sla);
        owner.delays.insert(id, 0.0);
        owner.communication_paths.insert(id, Vec::new());
        id
    }

    /// Appends a service to the application's chain.
    pub fn add_service(&mut self, application: ApplicationId, cpu_demand: i64, memory_demand: i64, privacy_requirement: u8, image: &str) -> ServiceId {
        let id = ServiceId::new(self.services.len());

        self.services.push(Service {
            id,
            application,
            cpu_demand,
            memory_demand,
            privacy_requirement,
            image: image.to_string(),
            server: None,
        });

        self.applications[application.index()].services.push(id);
        id
    }

    pub fn server(&self, id: ServerId) -> &EdgeServer {
        &self.servers[id.index()]
    }

    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[id.index()]
    }

    pub fn application(&self, id: ApplicationId) -> &Application {
        &self.applications[id.index()]
    }

    pub fn user(&self, id: UserId) -> &User {
        &self.users[id.index()]
    }

    /// User owning the given application. Applications have exactly one user
    /// in this scheduling context.
    pub fn user_of_application(&self, app: ApplicationId) -> UserId {
        self.applications[app.index()].user
    }

    /// Position of a service inside its application's chain.
    pub fn chain_position(&self, service: ServiceId) -> usize {
        let app = &self.applications[self.services[service.index()].application.index()];
        app.services.iter().position(|s| *s == service).expect("service must appear in its application's chain")
    }

    /// True if the service is the last hop of its application's chain.
    pub fn is_last_in_chain(&self, service: ServiceId) -> bool {
        let app = &self.applications[self.services[service.index()].application.index()];
        app.services.last() == Some(&service)
    }

    /// Layers of the service's image that are not yet cached on the server.
    ///
    /// An image reference with no registered image is a configuration error
    /// in the input scenario and is fatal.
    pub fn uncached_layers(&self, server: ServerId, service: ServiceId) -> Result<Vec<LayerDescriptor>> {
        let reference = &self.services[service.index()].image;
        let image = self.images.get(reference).ok_or_else(|| Error::UnknownImage(reference.clone()))?;

        let host = &self.servers[server.index()];
        Ok(image.layers.iter().filter(|layer| !host.cached_layers.contains_key(&layer.digest)).cloned().collect())
    }
}
