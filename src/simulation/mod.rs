//! Force-directed 3D layout engine.
//!
//! A [`Simulation`] owns the mutable node and link tables for one layout run.
//! Each [`Simulation::tick`] decays alpha, accumulates every force against the
//! previous tick's positions, then integrates velocities and positions in one
//! commit step. Callers read positions through [`Simulation::nodes`] or tick
//! listeners and never write them directly; drags go through
//! [`Simulation::drag_start`] and friends.

mod config;
mod forces;
mod node;

pub use config::SimulationConfig;
pub use node::{ForceLink, ForceNode, RadiusScale};

use bevy::math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::models::{VisualEdge, VisualNode};

/// Lifecycle of a layout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationState {
    #[default]
    Uninitialized,
    /// Just started or reheated.
    Hot,
    Cooling,
    /// Alpha fell below `alpha_min`; ticks are no-ops until reheated.
    Settled,
}

impl SimulationState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Hot | Self::Cooling)
    }
}

/// Payload passed to tick listeners after every committed tick.
#[derive(Debug, Clone, Copy)]
pub struct TickEvent<'a> {
    /// Incremented on every `start` and `refresh`.
    pub generation: u64,
    /// Ticks since the current generation began.
    pub tick: u64,
    pub alpha: f32,
    pub state: SimulationState,
    pub nodes: &'a [ForceNode],
}

/// Handle returned by [`Simulation::on_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type TickListener = Box<dyn FnMut(&TickEvent<'_>) + Send + Sync>;

/// The force simulation.
pub struct Simulation {
    config: SimulationConfig,
    state: SimulationState,
    alpha: f32,
    alpha_target: f32,
    generation: u64,
    tick: u64,

    nodes: Vec<ForceNode>,
    links: Vec<ForceLink>,
    index: FxHashMap<String, usize>,

    // Reused across ticks.
    snapshot: Vec<Vec3>,
    accum: Vec<Vec3>,
    radii: Vec<f32>,
    norms: Vec<f32>,

    listeners: Vec<(ListenerId, TickListener)>,
    next_listener: u64,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("state", &self.state)
            .field("alpha", &self.alpha)
            .field("generation", &self.generation)
            .field("tick", &self.tick)
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: SimulationState::Uninitialized,
            alpha: 0.0,
            alpha_target: 0.0,
            generation: 0,
            tick: 0,
            nodes: Vec::new(),
            links: Vec::new(),
            index: FxHashMap::default(),
            snapshot: Vec::new(),
            accum: Vec::new(),
            radii: Vec::new(),
            norms: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticks committed in the current generation.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn nodes(&self) -> &[ForceNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[ForceLink] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&ForceNode> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    pub fn node_id(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|n| n.id.as_str())
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn link(&self, index: usize) -> Option<&ForceLink> {
        self.links.get(index)
    }

    /// Discard any previous run and start a new one.
    ///
    /// An empty node set goes straight to `Settled`.
    pub fn start(&mut self, nodes: &[VisualNode], edges: &[VisualEdge]) -> SimulationState {
        self.rebuild(nodes, edges, &FxHashMap::default());
        self.alpha = 1.0;
        self.after_rebuild()
    }

    /// Replace the node set, keeping position and velocity of surviving ids.
    pub fn refresh(&mut self, nodes: &[VisualNode], edges: &[VisualEdge]) -> SimulationState {
        let previous: FxHashMap<String, (Vec3, Vec3)> = self
            .nodes
            .drain(..)
            .map(|n| (n.id, (n.position, n.velocity)))
            .collect();
        let kept = nodes.iter().filter(|n| previous.contains_key(&n.id)).count();
        self.rebuild(nodes, edges, &previous);
        self.alpha = self.alpha.max(self.config.alpha_restart);
        tracing::debug!(
            "Refreshed simulation nodes: {} kept, {} added",
            kept,
            nodes.len() - kept
        );
        self.after_rebuild()
    }

    /// Stop advancing and release all per-node state and listeners.
    pub fn stop(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.index.clear();
        self.snapshot.clear();
        self.accum.clear();
        self.radii.clear();
        self.norms.clear();
        self.listeners.clear();
        self.alpha = 0.0;
        self.alpha_target = 0.0;
        self.state = SimulationState::Uninitialized;
        tracing::info!("Simulation stopped at generation {}", self.generation);
    }

    /// Register a listener called after every committed tick.
    pub fn on_tick<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TickEvent<'_>) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Raise alpha back to `alpha_restart` after a perturbation of `id`.
    ///
    /// Returns false if the node is unknown.
    pub fn reheat(&mut self, id: &str) -> bool {
        if self.node_index(id).is_none() {
            return false;
        }
        self.heat();
        tracing::debug!("Reheated simulation for {} (alpha {:.3})", id, self.alpha);
        true
    }

    /// Pin a node at its current position and keep the layout warm.
    pub fn drag_start(&mut self, id: &str) -> bool {
        let Some(i) = self.node_index(id) else {
            return false;
        };
        let node = &mut self.nodes[i];
        node.pinned = Some(node.position);
        node.velocity = Vec3::ZERO;
        self.alpha_target = self.config.alpha_restart;
        self.heat();
        tracing::debug!("Drag started on {}", id);
        true
    }

    /// Move a dragged node's pin.
    pub fn drag_to(&mut self, id: &str, position: Vec3) -> bool {
        let Some(i) = self.node_index(id) else {
            return false;
        };
        if !position.is_finite() {
            return false;
        }
        let node = &mut self.nodes[i];
        if node.pinned.is_none() {
            return false;
        }
        node.pinned = Some(position);
        self.heat();
        true
    }

    /// Release a dragged node and let the layout cool.
    pub fn drag_end(&mut self, id: &str) -> bool {
        let Some(i) = self.node_index(id) else {
            return false;
        };
        let released = self.nodes[i].pinned.take().is_some();
        if !self.nodes.iter().any(ForceNode::is_pinned) {
            self.alpha_target = 0.0;
        }
        if released {
            tracing::debug!("Drag ended on {}", id);
        }
        released
    }

    /// Advance one tick. A no-op unless the simulation is running.
    pub fn tick(&mut self) -> SimulationState {
        if !self.state.is_running() {
            return self.state;
        }
        let cfg = &self.config;

        self.alpha += (self.alpha_target - self.alpha) * cfg.alpha_decay;
        let alpha = self.alpha;

        self.snapshot.clear();
        self.snapshot.extend(self.nodes.iter().map(|n| n.position));
        self.accum.clear();
        self.accum.resize(self.nodes.len(), Vec3::ZERO);

        forces::apply_links(
            &self.links,
            &self.snapshot,
            &mut self.accum,
            alpha,
            cfg.charge_distance_min,
        );
        forces::apply_charge(
            &self.snapshot,
            &mut self.accum,
            alpha,
            cfg.charge_strength,
            cfg.charge_distance_min,
            cfg.charge_distance_max,
        );
        forces::apply_center(&self.snapshot, &mut self.accum, alpha, cfg.center_strength);
        forces::apply_collision(&self.snapshot, &self.radii, &mut self.accum, cfg.collide_strength);
        forces::apply_axis(&self.snapshot, &mut self.accum, alpha, cfg.z_strength);
        forces::apply_weight_pull(
            &self.snapshot,
            &self.norms,
            &mut self.accum,
            alpha,
            cfg.weight_pull,
        );

        let damping = 1.0 - cfg.velocity_decay;
        for (node, acc) in self.nodes.iter_mut().zip(&self.accum) {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec3::ZERO;
                continue;
            }
            let acc = if acc.is_finite() { *acc } else { Vec3::ZERO };
            node.velocity = (node.velocity + acc) * damping;
            if !node.velocity.is_finite() {
                node.velocity = Vec3::ZERO;
            }
            node.position += node.velocity;
            forces::contain(&mut node.position, &mut node.velocity, cfg.max_radius);
        }

        self.tick += 1;
        let holding = self.nodes.iter().any(ForceNode::is_pinned);
        self.state = if self.alpha < cfg.alpha_min && !holding {
            tracing::info!(
                "Simulation settled after {} ticks (generation {})",
                self.tick,
                self.generation
            );
            SimulationState::Settled
        } else {
            SimulationState::Cooling
        };
        tracing::trace!("Tick {} alpha {:.4}", self.tick, alpha);

        self.notify();
        self.state
    }

    /// Tick until settled or `max_ticks` ran. Returns the ticks run.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ran = 0;
        while ran < max_ticks && self.state.is_running() {
            self.tick();
            ran += 1;
        }
        ran
    }

    fn heat(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.alpha = self.alpha.max(self.config.alpha_restart);
        self.state = SimulationState::Hot;
    }

    fn after_rebuild(&mut self) -> SimulationState {
        self.tick = 0;
        self.alpha_target = 0.0;
        self.state = if self.nodes.is_empty() {
            self.alpha = 0.0;
            SimulationState::Settled
        } else {
            SimulationState::Hot
        };
        tracing::info!(
            "Simulation started: {} nodes, {} links, generation {} ({:?})",
            self.nodes.len(),
            self.links.len(),
            self.generation,
            self.state
        );
        self.state
    }

    /// Build the node and link tables. Nodes found in `previous` keep their
    /// position and velocity; the rest are seeded.
    fn rebuild(
        &mut self,
        nodes: &[VisualNode],
        edges: &[VisualEdge],
        previous: &FxHashMap<String, (Vec3, Vec3)>,
    ) {
        self.generation += 1;
        let cfg = &self.config;
        let scale = RadiusScale::from_weights(
            nodes.iter().map(|n| n.meta.weight),
            cfg.radius_min,
            cfg.radius_max,
        );
        let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(self.generation));
        let jitter = cfg.seed_jitter.abs();

        self.index.clear();
        self.nodes.clear();
        for visual in nodes {
            if self.index.contains_key(&visual.id) {
                tracing::debug!("Skipping duplicate node id {}", visual.id);
                continue;
            }
            let seeded = Vec3::from_array(visual.position) * cfg.seed_spread * 2.0
                + Vec3::new(
                    rng.gen_range(-jitter..=jitter),
                    rng.gen_range(-jitter..=jitter),
                    rng.gen_range(-jitter..=jitter),
                );
            let mut node = match previous.get(&visual.id) {
                Some(&(position, velocity)) => {
                    let mut node = ForceNode::from_visual(visual, position, &scale);
                    node.velocity = velocity;
                    node
                }
                None => ForceNode::from_visual(visual, seeded, &scale),
            };
            if !node.position.is_finite() {
                node.position = Vec3::ZERO;
            }
            forces::contain(&mut node.position, &mut node.velocity, cfg.max_radius);
            self.index.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
        }

        self.links.clear();
        let mut degree = vec![0usize; self.nodes.len()];
        for edge in edges {
            let (Some(&s), Some(&t)) = (self.index.get(&edge.source), self.index.get(&edge.target))
            else {
                tracing::debug!("Dropping dangling link {} -> {}", edge.source, edge.target);
                continue;
            };
            if s == t {
                continue;
            }
            degree[s] += 1;
            degree[t] += 1;
            self.links.push(ForceLink::from_visual(edge, s, t));
        }
        for link in &mut self.links {
            let (ds, dt) = (degree[link.source] as f32, degree[link.target] as f32);
            let thickness = link.thickness.clamp(0.0, 1.0);
            link.bias = ds / (ds + dt);
            link.strength = cfg.link_strength / ds.min(dt) * (0.5 + 0.5 * thickness);
            link.rest_length = cfg.link_distance * (1.0 - 0.5 * thickness);
        }

        self.radii.clear();
        self.radii.extend(self.nodes.iter().map(|n| n.radius));
        self.norms.clear();
        self.norms.extend(self.nodes.iter().map(|n| n.weight_norm));
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let event = TickEvent {
            generation: self.generation,
            tick: self.tick,
            alpha: self.alpha,
            state: self.state,
            nodes: &self.nodes,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::models::{ConnectionKind, EdgeMeta, NodeMeta, Rgb};

    fn visual(id: &str, weight: f64, position: [f32; 3]) -> VisualNode {
        VisualNode {
            id: id.to_string(),
            name: id.to_uppercase(),
            position,
            size: 0.5,
            color: Rgb::NEUTRAL,
            glow: 0.0,
            drift: [0.0; 3],
            meta: NodeMeta {
                weight,
                category: None,
                is_home: false,
            },
        }
    }

    fn edge(source: &str, target: &str) -> VisualEdge {
        VisualEdge {
            source: source.to_string(),
            target: target.to_string(),
            thickness: 0.5,
            color: Rgb::NEUTRAL,
            dashed: false,
            particles: false,
            pulses_on_active: false,
            meta: EdgeMeta {
                kind: ConnectionKind::Partner,
                strength: 0.5,
                sentiment: None,
            },
        }
    }

    fn triangle() -> (Vec<VisualNode>, Vec<VisualEdge>) {
        (
            vec![
                visual("a", 1e9, [0.1, 0.0, 0.0]),
                visual("b", 1e6, [-0.1, 0.1, 0.0]),
                visual("c", 1e3, [0.0, -0.1, 0.1]),
            ],
            vec![edge("a", "b"), edge("b", "c"), edge("c", "a")],
        )
    }

    #[test]
    fn test_new_simulation_is_uninitialized() {
        let mut sim = Simulation::default();
        assert_eq!(sim.state(), SimulationState::Uninitialized);
        assert_eq!(sim.tick(), SimulationState::Uninitialized);
    }

    #[test]
    fn test_start_is_hot_then_cools() {
        let (nodes, edges) = triangle();
        let mut sim = Simulation::default();
        assert_eq!(sim.start(&nodes, &edges), SimulationState::Hot);
        assert_eq!(sim.alpha(), 1.0);
        assert_eq!(sim.tick(), SimulationState::Cooling);
        assert!(sim.alpha() < 1.0);
    }

    #[test]
    fn test_seeded_positions_are_distinct() {
        let nodes = vec![visual("a", 1.0, [0.0; 3]), visual("b", 1.0, [0.0; 3])];
        let mut sim = Simulation::default();
        sim.start(&nodes, &[]);
        assert_ne!(sim.nodes()[0].position, sim.nodes()[1].position);
    }

    #[test]
    fn test_link_parameters_follow_degree() {
        let nodes = vec![
            visual("hub", 1.0, [0.0; 3]),
            visual("x", 1.0, [0.2, 0.0, 0.0]),
            visual("y", 1.0, [0.0, 0.2, 0.0]),
        ];
        let mut sim = Simulation::default();
        sim.start(&nodes, &[edge("hub", "x"), edge("hub", "y"), edge("x", "ghost")]);
        assert_eq!(sim.links().len(), 2);
        let link = sim.link(0).unwrap();
        // hub has degree 2, x has degree 1.
        assert!((link.bias - 2.0 / 3.0).abs() < 1e-6);
        assert!((link.strength - 0.75).abs() < 1e-6);
        assert!((link.rest_length - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_lookup_by_index_and_id() {
        let (nodes, edges) = triangle();
        let mut sim = Simulation::default();
        sim.start(&nodes, &edges);
        assert_eq!(sim.node_id(1), Some("b"));
        assert_eq!(sim.node_index("c"), Some(2));
        assert_eq!(sim.node_id(9), None);
        assert!(sim.node("zzz").is_none());
    }

    #[test]
    fn test_listeners_see_every_tick_until_stop() {
        let (nodes, edges) = triangle();
        let mut sim = Simulation::default();
        let seen = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&seen);
        sim.on_tick(move |event| {
            assert_eq!(event.nodes.len(), 3);
            counter.store(event.tick, Ordering::SeqCst);
        });
        sim.start(&nodes, &edges);
        sim.tick();
        sim.tick();
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        sim.stop();
        assert_eq!(sim.state(), SimulationState::Uninitialized);
        assert!(sim.nodes().is_empty());
        sim.start(&nodes, &edges);
        sim.tick();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_listener() {
        let mut sim = Simulation::default();
        let id = sim.on_tick(|_| {});
        assert!(sim.remove_listener(id));
        assert!(!sim.remove_listener(id));
    }

    #[test]
    fn test_drag_pins_node_and_holds_heat() {
        let (nodes, edges) = triangle();
        let mut sim = Simulation::default();
        sim.start(&nodes, &edges);
        sim.run_until_settled(1000);
        assert_eq!(sim.state(), SimulationState::Settled);

        assert!(sim.drag_start("b"));
        let target = Vec3::new(5.0, 5.0, 0.0);
        assert!(sim.drag_to("b", target));
        for _ in 0..2000 {
            sim.tick();
        }
        assert!(sim.state().is_running());
        assert_eq!(sim.node("b").unwrap().position, target);

        assert!(sim.drag_end("b"));
        sim.run_until_settled(2000);
        assert_eq!(sim.state(), SimulationState::Settled);
        assert!(!sim.drag_to("b", target));
    }

    #[test]
    fn test_refresh_keeps_surviving_positions() {
        let (nodes, edges) = triangle();
        let mut sim = Simulation::default();
        sim.start(&nodes, &edges);
        sim.run_until_settled(1000);
        let before = sim.node("a").unwrap().position;
        let generation = sim.generation();

        let mut next = nodes.clone();
        next.push(visual("d", 10.0, [0.3, 0.3, 0.0]));
        assert_eq!(sim.refresh(&next, &edges), SimulationState::Hot);
        assert_eq!(sim.generation(), generation + 1);
        assert_eq!(sim.node("a").unwrap().position, before);
        assert!(sim.node("d").is_some());
        assert!(sim.alpha() >= sim.config().alpha_restart);
    }

    #[test]
    fn test_reheat_unknown_node() {
        let (nodes, edges) = triangle();
        let mut sim = Simulation::default();
        sim.start(&nodes, &edges);
        assert!(!sim.reheat("nope"));
    }
}
