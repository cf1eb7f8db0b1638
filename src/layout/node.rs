use std::fmt;

use crate::geometry::Vector2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: NodeId,
    pub position: Vector2,
    pub velocity: Vector2,
    connections: Vec<NodeId>,
}

impl GraphNode {
    pub fn new(id: NodeId, position: Vector2) -> Self {
        Self {
            id,
            position,
            velocity: Vector2::ZERO,
            connections: Vec::new(),
        }
    }

    /// Adds a directed edge. Self-loops and duplicates are ignored.
    pub fn connect(&mut self, target: NodeId) -> bool {
        if target == self.id || self.connections.contains(&target) {
            return false;
        }
        self.connections.push(target);
        true
    }

    pub fn disconnect(&mut self, target: NodeId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|&existing| existing != target);
        self.connections.len() != before
    }

    pub fn connections(&self) -> &[NodeId] {
        &self.connections
    }

    pub fn is_connected_to(&self, target: NodeId) -> bool {
        self.connections.contains(&target)
    }

    pub(super) fn retain_connections(&mut self, keep: impl FnMut(&NodeId) -> bool) {
        self.connections.retain(keep);
    }
}
