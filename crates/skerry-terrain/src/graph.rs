//! The disk forest produced by the sampler.

use glam::DVec2;
use skerry_grid::{Disk, GridObject, GridObjectMut, ObjectId};

/// A directed `(parent, child)` pair of node indices.
pub type Edge = (usize, usize);

/// Accepted disks, their ancestry edges and the roots of every tree.
///
/// Node indices are stable for the lifetime of a run. A parent is always
/// appended before any of its children, so walking `edges` in order visits
/// every parent before its children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<Disk>,
    edges: Vec<Edge>,
    roots: Vec<usize>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Disk] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 2D node centers in index order.
    pub fn positions(&self) -> Vec<DVec2> {
        self.nodes.iter().map(Disk::position).collect()
    }

    /// Reset all three sequences, keeping their allocations.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.roots.clear();
    }

    /// Append a root node and return its index.
    pub(crate) fn push_root(&mut self, disk: Disk) -> usize {
        let index = self.nodes.len();
        self.nodes.push(disk);
        self.roots.push(index);
        index
    }

    /// Append a node spawned by `parent` and return its index.
    pub(crate) fn push_child(&mut self, parent: usize, disk: Disk) -> usize {
        debug_assert!(parent < self.nodes.len(), "parent {parent} not in graph");
        let index = self.nodes.len();
        self.edges.push((parent, index));
        self.nodes.push(disk);
        index
    }

    /// Check the structural invariants: edge count matches node and root
    /// counts, every edge points forward, and every non-root has exactly one
    /// parent.
    pub fn is_forest(&self) -> bool {
        if self.edges.len() + self.roots.len() != self.nodes.len() {
            return false;
        }
        let mut has_parent = vec![false; self.nodes.len()];
        for &root in &self.roots {
            if root >= self.nodes.len() || has_parent[root] {
                return false;
            }
            has_parent[root] = true;
        }
        for &(parent, child) in &self.edges {
            if parent >= child || child >= self.nodes.len() || has_parent[child] {
                return false;
            }
            has_parent[child] = true;
        }
        has_parent.into_iter().all(|p| p)
    }
}

/// A graph node as tracked by the spatial grid. The object id is the node index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphNode {
    pub index: usize,
    pub disk: Disk,
}

impl GridObject for GraphNode {
    fn object_id(&self) -> ObjectId {
        ObjectId::new(self.index as u64)
    }

    fn position(&self) -> DVec2 {
        self.disk.position()
    }

    fn radius(&self) -> f64 {
        self.disk.radius()
    }

    fn rect(&self) -> skerry_grid::Rect {
        self.disk.rect()
    }
}

impl GridObjectMut for GraphNode {
    fn set_position(&mut self, position: DVec2) {
        self.disk = Disk::new(position, self.disk.radius());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(x: f64) -> Disk {
        Disk::new(DVec2::new(x, 0.0), 0.5)
    }

    #[test]
    fn test_push_records_edges_and_roots() {
        let mut graph = NodeGraph::new();
        let root = graph.push_root(disk(0.0));
        let child = graph.push_child(root, disk(1.0));
        let grandchild = graph.push_child(child, disk(2.0));

        assert_eq!((root, child, grandchild), (0, 1, 2));
        assert_eq!(graph.edges(), &[(0, 1), (1, 2)]);
        assert_eq!(graph.roots(), &[0]);
        assert!(graph.is_forest());
    }

    #[test]
    fn test_two_roots_form_a_forest() {
        let mut graph = NodeGraph::new();
        let a = graph.push_root(disk(0.0));
        let b = graph.push_root(disk(5.0));
        graph.push_child(a, disk(1.0));
        graph.push_child(b, disk(6.0));
        assert!(graph.is_forest());
        assert_eq!(graph.edges().len(), graph.len() - graph.roots().len());
    }

    #[test]
    fn test_is_forest_rejects_backward_edge() {
        let graph = NodeGraph {
            nodes: vec![disk(0.0), disk(1.0)],
            edges: vec![(1, 0)],
            roots: vec![1],
        };
        assert!(!graph.is_forest());
    }

    #[test]
    fn test_is_forest_rejects_double_parent() {
        let graph = NodeGraph {
            nodes: vec![disk(0.0), disk(1.0), disk(2.0)],
            edges: vec![(0, 2), (1, 2)],
            roots: vec![0],
        };
        assert!(!graph.is_forest());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut graph = NodeGraph::new();
        let root = graph.push_root(disk(0.0));
        graph.push_child(root, disk(1.0));
        graph.clear();
        assert!(graph.is_empty());
        assert!(graph.edges().is_empty());
        assert!(graph.roots().is_empty());
        assert!(graph.is_forest());
    }

    #[test]
    fn test_graph_node_id_is_index() {
        let node = GraphNode {
            index: 9,
            disk: disk(3.0),
        };
        assert_eq!(node.object_id(), ObjectId::new(9));
        assert_eq!(node.rect(), node.disk.rect());
    }
}
