//! Force-directed layout over an id-addressed node arena.
//!
//! Every registered node repels every other node and is pulled along its
//! edges by a one-sided spring. A step computes all next positions from one
//! snapshot of the current positions, then recenters the whole set on the
//! origin.

mod forces;
mod node;

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::geometry::{Bounds, Vector2};
use forces::{attraction_between, repulsion_between};
pub use node::{GraphNode, NodeId};

const DETERMINISTIC_SEED: u64 = 0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutSettings {
    pub repulsion: f64,
    pub attraction: f64,
    pub max_speed: f64,
    pub deterministic: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            repulsion: 10_000.0,
            attraction: 0.1,
            max_speed: 5.0,
            deterministic: false,
        }
    }
}

#[derive(Default)]
struct LayoutScratch {
    positions: Vec<Vector2>,
    next_positions: Vec<Vector2>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

pub struct LayoutEngine {
    nodes: Vec<GraphNode>,
    index_by_id: HashMap<NodeId, usize>,
    next_id: u64,
    settings: LayoutSettings,
    rng: StdRng,
    scratch: LayoutScratch,
}

impl LayoutEngine {
    pub fn new(settings: LayoutSettings) -> Self {
        let rng = if settings.deterministic {
            StdRng::seed_from_u64(DETERMINISTIC_SEED)
        } else {
            StdRng::from_entropy()
        };

        Self {
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            next_id: 0,
            settings,
            rng,
            scratch: LayoutScratch::default(),
        }
    }

    /// Builds an unregistered node with a fresh id.
    pub fn create_node(&mut self, position: Vector2) -> GraphNode {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        GraphNode::new(id, position)
    }

    /// Registers `node`. Returns `false` without touching the engine when the
    /// id is already registered. Connections to unregistered ids are dropped.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        self.add_subgraph([node]) == 1
    }

    /// Registers a batch of nodes that may reference each other. Returns how
    /// many were newly registered.
    pub fn add_subgraph(&mut self, nodes: impl IntoIterator<Item = GraphNode>) -> usize {
        let first_new = self.nodes.len();
        for node in nodes {
            if self.index_by_id.contains_key(&node.id) {
                continue;
            }
            self.next_id = self.next_id.max(node.id.raw() + 1);
            self.index_by_id.insert(node.id, self.nodes.len());
            self.nodes.push(node);
        }

        let index_by_id = &self.index_by_id;
        for node in &mut self.nodes[first_new..] {
            let before = node.connections().len();
            node.retain_connections(|target| index_by_id.contains_key(target));
            let dropped = before - node.connections().len();
            if dropped > 0 {
                tracing::debug!(node = %node.id, dropped, "dropped connections to unregistered nodes");
            }
        }

        self.nodes.len() - first_new
    }

    /// Deregisters `id` after severing every edge that points at it. Nodes it
    /// was connected to stay registered.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.index_by_id.remove(&id) else {
            return false;
        };

        for other in &mut self.nodes {
            if other.id != id {
                other.disconnect(id);
            }
        }

        self.nodes.remove(index);
        for (position, node) in self.nodes.iter().enumerate().skip(index) {
            self.index_by_id.insert(node.id, position);
        }
        true
    }

    /// Adds a directed edge between two registered nodes.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.index_by_id.contains_key(&to) {
            return false;
        }
        match self.index_by_id.get(&from) {
            Some(&index) => self.nodes[index].connect(to),
            None => false,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.index_by_id.get(&id).map(|&index| &self.nodes[index])
    }

    pub fn position(&self, id: NodeId) -> Option<Vector2> {
        self.node(id).map(|node| node.position)
    }

    /// Registered nodes in registration order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.nodes.iter().map(|node| node.position))
    }

    /// Runs one simultaneous simulation step and returns the summed
    /// displacement of all nodes.
    pub fn step(&mut self, damping: f64, spring_length: f64) -> f64 {
        let node_count = self.nodes.len();
        if node_count == 0 {
            return 0.0;
        }

        let damping = damping.clamp(0.0, 1.0);
        let spring_length = spring_length.max(0.0);
        let LayoutSettings {
            repulsion,
            attraction,
            max_speed,
            ..
        } = self.settings;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));
        scratch.next_positions.clear();
        scratch.next_positions.resize(node_count, Vector2::ZERO);
        scratch.outgoing.resize_with(node_count, Vec::new);
        scratch.incoming.resize_with(node_count, Vec::new);
        for list in scratch
            .outgoing
            .iter_mut()
            .chain(scratch.incoming.iter_mut())
        {
            list.clear();
        }
        for (source, node) in self.nodes.iter().enumerate() {
            for target in node.connections() {
                if let Some(&target) = self.index_by_id.get(target) {
                    scratch.outgoing[source].push(target);
                    scratch.incoming[target].push(source);
                }
            }
        }

        let positions = &scratch.positions;
        for index in 0..node_count {
            let point = positions[index];
            let mut net_force = Vector2::ZERO;

            for (other_index, &other) in positions.iter().enumerate() {
                if other_index != index {
                    net_force += repulsion_between(point, other, repulsion, &mut self.rng);
                }
            }

            for &neighbor in scratch.outgoing[index]
                .iter()
                .chain(scratch.incoming[index].iter())
            {
                net_force += attraction_between(
                    point,
                    positions[neighbor],
                    attraction,
                    spring_length,
                    &mut self.rng,
                );
            }

            let node = &mut self.nodes[index];
            let mut velocity = ((node.velocity + net_force) * damping).clamp_magnitude(max_speed);
            if !velocity.is_finite() {
                velocity = Vector2::ZERO;
            }
            node.velocity = velocity;
            scratch.next_positions[index] = point + velocity;
        }

        let mut displacement = 0.0;
        for (node, &next) in self.nodes.iter_mut().zip(&scratch.next_positions) {
            displacement += node.position.distance(next);
            node.position = next;
        }

        if let Some(bounds) = self.bounds() {
            let center = bounds.center();
            if center != Vector2::ZERO {
                for node in &mut self.nodes {
                    node.position -= center;
                }
            }
        }

        displacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vector2;

    fn deterministic_engine() -> LayoutEngine {
        LayoutEngine::new(LayoutSettings {
            deterministic: true,
            ..LayoutSettings::default()
        })
    }

    fn star(engine: &mut LayoutEngine, leaves: usize, at: Vector2) -> (NodeId, Vec<NodeId>) {
        let root = engine.create_node(Vector2::ZERO);
        let root_id = root.id;
        engine.add_node(root);

        let mut ids = Vec::new();
        for _ in 0..leaves {
            let mut leaf = engine.create_node(at);
            leaf.connect(root_id);
            ids.push(leaf.id);
            engine.add_node(leaf);
        }
        (root_id, ids)
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut engine = deterministic_engine();
        let node = engine.create_node(Vector2::ZERO);
        assert!(engine.add_node(node.clone()));
        assert!(!engine.add_node(node));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn subgraph_keeps_internal_edges_and_drops_dangling_ones() {
        let mut engine = deterministic_engine();
        let mut a = engine.create_node(Vector2::ZERO);
        let b = engine.create_node(vector2(10.0, 0.0));
        let ghost = engine.create_node(vector2(20.0, 0.0));
        a.connect(b.id);
        a.connect(ghost.id);
        let (a_id, b_id) = (a.id, b.id);

        assert_eq!(engine.add_subgraph([a, b]), 2);
        let a = engine.node(a_id).unwrap();
        assert_eq!(a.connections(), &[b_id]);
    }

    #[test]
    fn created_ids_do_not_collide_with_registered_ones() {
        let mut engine = deterministic_engine();
        let first = engine.create_node(Vector2::ZERO);
        let second = engine.create_node(Vector2::ZERO);
        assert_ne!(first.id, second.id);
        engine.add_subgraph([first, second]);
        let third = engine.create_node(Vector2::ZERO);
        assert!(engine.add_node(third));
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn remove_node_severs_incoming_edges_without_cascading() {
        let mut engine = deterministic_engine();
        let (root, leaves) = star(&mut engine, 2, vector2(5.0, 5.0));
        assert!(engine.connect(root, leaves[0]));

        assert!(engine.remove_node(leaves[0]));
        assert!(!engine.contains(leaves[0]));
        assert!(engine.contains(root));
        assert!(engine.contains(leaves[1]));
        assert!(!engine.node(root).unwrap().is_connected_to(leaves[0]));
        assert!(!engine.remove_node(leaves[0]));

        // index bookkeeping survives the shift
        assert_eq!(engine.node(leaves[1]).unwrap().id, leaves[1]);
    }

    #[test]
    fn coincident_leaves_separate_after_one_step() {
        let mut engine = deterministic_engine();
        let (_root, leaves) = star(&mut engine, 2, Vector2::ZERO);

        engine.step(0.5, 100.0);

        let first = engine.node(leaves[0]).unwrap();
        let second = engine.node(leaves[1]).unwrap();
        assert!(first.velocity.magnitude() <= 5.0 + 1e-9);
        assert!(second.velocity.magnitude() <= 5.0 + 1e-9);
        assert_ne!(first.position, second.position);
    }

    #[test]
    fn velocity_never_exceeds_the_ceiling() {
        let mut engine = deterministic_engine();
        star(&mut engine, 12, vector2(1.0, 1.0));
        for _ in 0..25 {
            engine.step(1.0, 100.0);
            for node in engine.nodes() {
                assert!(node.velocity.magnitude() <= 5.0 + 1e-9);
            }
        }
    }

    #[test]
    fn deterministic_runs_are_bit_identical() {
        let run = || {
            let mut engine = deterministic_engine();
            star(&mut engine, 6, Vector2::ZERO);
            let mut trace = Vec::new();
            for _ in 0..40 {
                engine.step(0.5, 100.0);
                trace.extend(
                    engine
                        .nodes()
                        .iter()
                        .map(|node| (node.position.x.to_bits(), node.position.y.to_bits())),
                );
            }
            trace
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn step_recenters_bounds_on_origin() {
        let mut engine = deterministic_engine();
        let a = engine.create_node(vector2(400.0, 300.0));
        let b = engine.create_node(vector2(460.0, 340.0));
        engine.add_subgraph([a, b]);

        engine.step(0.5, 100.0);

        let center = engine.bounds().unwrap().center();
        assert!(center.magnitude() < 1e-9);
    }

    #[test]
    fn stretched_spring_pulls_nodes_together() {
        let mut engine = LayoutEngine::new(LayoutSettings {
            repulsion: 0.0,
            deterministic: true,
            ..LayoutSettings::default()
        });
        let root = engine.create_node(Vector2::ZERO);
        let mut leaf = engine.create_node(vector2(500.0, 0.0));
        leaf.connect(root.id);
        let (root_id, leaf_id) = (root.id, leaf.id);
        engine.add_subgraph([root, leaf]);

        let before = engine
            .position(root_id)
            .unwrap()
            .distance(engine.position(leaf_id).unwrap());
        engine.step(0.5, 100.0);
        let after = engine
            .position(root_id)
            .unwrap()
            .distance(engine.position(leaf_id).unwrap());

        // both ends feel the spring through the undirected edge
        assert!((before - after - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_engine_steps_quietly() {
        let mut engine = deterministic_engine();
        assert_eq!(engine.step(0.5, 100.0), 0.0);
        assert!(engine.bounds().is_none());
    }
}
