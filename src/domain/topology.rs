use crate::domain::ids::{ApplicationId, LinkId, ServerId, SwitchId};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Represents a network switch within the edge topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    /// The unique identifier of the switch.
    pub id: SwitchId,

    /// The edge server attached to this switch, if any.
    ///
    /// Base stations without compute capacity keep this unset; a switch never
    /// hosts more than one server.
    pub edge_server: Option<ServerId>,
}

/// Represents a physical network link connecting two switches.
///
/// The delay weight is fixed at construction time; only the per-application
/// usage attribution mutates while communication paths are active.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLink {
    pub id: LinkId,

    /// The two switches joined by this link. Links are undirected.
    pub endpoints: (SwitchId, SwitchId),

    /// Delay weight used by the shortest-path computation.
    pub delay: f64,

    /// Total bandwidth capacity of the link.
    pub bandwidth: i64,

    /// How many active path segments of each application traverse this link.
    pub active_flows: HashMap<ApplicationId, u32>,
}

/// Models the edge network as a weighted graph.
///
/// The topology manages:
/// * **Physical layer**: switches and network links.
/// * **Connectivity**: the adjacency list defining how switches connect.
/// * **Routing**: computation and caching of minimum-delay paths.
/// * **Bookkeeping**: per-application link usage attribution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkTopology {
    switches: Vec<Switch>,
    links: Vec<NetworkLink>,

    /// Maps a switch to its outgoing (neighbor, link) pairs, enabling efficient graph traversal.
    adjacency: HashMap<SwitchId, Vec<(SwitchId, LinkId)>>,

    /// Cache of computed minimum-delay paths, keyed by the unordered switch pair.
    ///
    /// Entries are never invalidated: delay weights are static, and changes to
    /// link usage attribution do not affect the weight used for routing.
    path_cache: HashMap<(SwitchId, SwitchId), Vec<SwitchId>>,
}

/// Entry of the Dijkstra frontier. Ordered so the binary heap pops the
/// lowest-cost switch first, with the switch id breaking cost ties.
#[derive(Debug, PartialEq)]
struct FrontierEntry {
    cost: f64,
    switch: SwitchId,
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.switch.cmp(&self.switch))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl NetworkTopology {
    pub fn new() -> Self {
        Self { switches: Vec::new(), links: Vec::new(), adjacency: HashMap::new(), path_cache: HashMap::new() }
    }

    pub fn add_switch(&mut self) -> SwitchId {
        let id = SwitchId::new(self.switches.len());
        self.switches.push(Switch { id, edge_server: None });
        id
    }

    pub fn add_link(&mut self, source: SwitchId, target: SwitchId, delay: f64, bandwidth: i64) -> LinkId {
        let id = LinkId::new(self.links.len());
        self.links.push(NetworkLink { id, endpoints: (source, target), delay, bandwidth, active_flows: HashMap::new() });

        self.adjacency.entry(source).or_default().push((target, id));
        self.adjacency.entry(target).or_default().push((source, id));
        id
    }

    pub fn switch(&self, id: SwitchId) -> &Switch {
        &self.switches[id.index()]
    }

    pub fn switch_mut(&mut self, id: SwitchId) -> &mut Switch {
        &mut self.switches[id.index()]
    }

    pub fn link(&self, id: LinkId) -> &NetworkLink {
        &self.links[id.index()]
    }

    pub fn links(&self) -> &[NetworkLink] {
        &self.links
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    /// Returns the link joining two adjacent switches, if one exists.
    pub fn link_between(&self, a: SwitchId, b: SwitchId) -> Option<LinkId> {
        self.adjacency.get(&a)?.iter().find(|(neighbor, _)| *neighbor == b).map(|(_, link_id)| *link_id)
    }

    /// Computes the minimum-delay path between two switches as an ordered
    /// switch sequence, including both endpoints.
    ///
    /// Results are cached per unordered switch pair for the lifetime of the
    /// topology. The tie-break between equal-delay alternatives follows the
    /// traversal order of the search and is not part of the contract.
    ///
    /// Precondition: `target` is reachable from `origin`. Disconnected
    /// topologies are an input-data contract violation.
    pub fn shortest_path(&mut self, origin: SwitchId, target: SwitchId) -> Vec<SwitchId> {
        if origin == target {
            return vec![origin];
        }

        let key = if origin <= target { (origin, target) } else { (target, origin) };

        if !self.path_cache.contains_key(&key) {
            let path = self.dijkstra(key.0, key.1);
            log::debug!("Path found {} => {}: {} hops", key.0, key.1, path.len().saturating_sub(1));
            self.path_cache.insert(key, path);
        }

        let cached = self.path_cache.get(&key).expect("path cache entry was just inserted");

        if cached.first() == Some(&origin) {
            cached.clone()
        } else {
            let mut reversed = cached.clone();
            reversed.reverse();
            reversed
        }
    }

    /// Sum of the delay weights along consecutive links of a path.
    ///
    /// A zero-length path (origin equals target) has delay 0.
    pub fn path_delay(&self, path: &[SwitchId]) -> f64 {
        path.windows(2)
            .map(|pair| {
                let link_id = self.link_between(pair[0], pair[1]).expect("consecutive path switches must be adjacent");
                self.links[link_id.index()].delay
            })
            .sum()
    }

    /// Delay of the minimum-delay path between two switches.
    pub fn delay_between(&mut self, origin: SwitchId, target: SwitchId) -> f64 {
        let path = self.shortest_path(origin, target);
        self.path_delay(&path)
    }

    fn dijkstra(&self, origin: SwitchId, target: SwitchId) -> Vec<SwitchId> {
        let mut distance: HashMap<SwitchId, f64> = HashMap::new();
        let mut previous: HashMap<SwitchId, SwitchId> = HashMap::new();
        let mut frontier = BinaryHeap::new();

        distance.insert(origin, 0.0);
        frontier.push(FrontierEntry { cost: 0.0, switch: origin });

        while let Some(FrontierEntry { cost, switch }) = frontier.pop() {
            if switch == target {
                break;
            }

            if cost > *distance.get(&switch).unwrap_or(&f64::INFINITY) {
                continue;
            }

            if let Some(neighbors) = self.adjacency.get(&switch) {
                for (neighbor, link_id) in neighbors {
                    let next_cost = cost + self.links[link_id.index()].delay;

                    if next_cost < *distance.get(neighbor).unwrap_or(&f64::INFINITY) {
                        distance.insert(*neighbor, next_cost);
                        previous.insert(*neighbor, switch);
                        frontier.push(FrontierEntry { cost: next_cost, switch: *neighbor });
                    }
                }
            }
        }

        if !previous.contains_key(&target) {
            panic!("No path between {} and {}: the topology is expected to be connected", origin, target);
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(prev) = previous.get(&current) {
            path.push(*prev);
            current = *prev;
        }
        path.reverse();
        path
    }

    /// Increases the usage attribution of every link along the given path
    /// segments for the application.
    pub fn allocate_communication_path(&mut self, segments: &[Vec<SwitchId>], app: ApplicationId) {
        self.for_each_segment_link(segments, |link| {
            *link.active_flows.entry(app).or_insert(0) += 1;
        });
    }

    /// Decreases the usage attribution previously recorded by
    /// [`allocate_communication_path`](Self::allocate_communication_path).
    pub fn release_communication_path(&mut self, segments: &[Vec<SwitchId>], app: ApplicationId) {
        self.for_each_segment_link(segments, |link| {
            if let Some(count) = link.active_flows.get_mut(&app) {
                *count -= 1;
                if *count == 0 {
                    link.active_flows.remove(&app);
                }
            }
        });
    }

    /// Removes every recorded flow attribution. Used by the ledger reset.
    pub fn clear_active_flows(&mut self) {
        for link in &mut self.links {
            link.active_flows.clear();
        }
    }

    fn for_each_segment_link<F: FnMut(&mut NetworkLink)>(&mut self, segments: &[Vec<SwitchId>], mut f: F) {
        for segment in segments {
            for pair in segment.windows(2) {
                let link_id = self.link_between(pair[0], pair[1]).expect("consecutive path switches must be adjacent");
                f(&mut self.links[link_id.index()]);
            }
        }
    }
}
