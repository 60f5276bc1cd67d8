//! Skim (C1): an immutable shortest-path distance/path oracle over a static road graph.
//!
//! A [`Skim`] is built once, at startup, from an edge-list graph and never mutates afterwards
//! (§4.1's "pure over the immutable graph" contract). The pairwise distance table is computed
//! eagerly with one Dijkstra run per node (`pathfinding::prelude::dijkstra_all`) so that
//! [`Skim::distance`] is a plain `HashMap` lookup; [`Skim::path`] re-runs Dijkstra per segment
//! on demand, since materializing every pairwise path up front is unnecessary and would be
//! memory-quadratic in network size.

use std::collections::HashMap;

use pathfinding::prelude::dijkstra;

use crate::errors::SkimError;
use crate::ids::Node;

/// A directed, weighted road-graph edge list: `from -> [(to, meters)]`.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    adjacency: HashMap<Node, Vec<(Node, f64)>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.adjacency.entry(node).or_default();
    }

    /// Adds a directed edge. Road networks in the source data are two-way streets encoded as
    /// a pair of directed edges, so callers add both directions when the street is two-way.
    pub fn add_edge(&mut self, from: Node, to: Node, meters: f64) {
        self.add_node(from);
        self.add_node(to);
        self.adjacency.entry(from).or_default().push((to, meters));
    }

    pub fn contains(&self, node: Node) -> bool {
        self.adjacency.contains_key(&node)
    }

    fn successors(&self, node: Node) -> Vec<(Node, u64)> {
        self.adjacency
            .get(&node)
            .map(|edges| {
                edges
                    .iter()
                    .map(|(to, meters)| (*to, meters_to_fixed(*meters)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// `pathfinding`'s Dijkstra wants an additive, `Ord` edge weight; road distances are meters as
/// `f64`, so weights are scaled to integer millimeters for the search and rescaled back.
const DISTANCE_SCALE: f64 = 1000.0;

fn meters_to_fixed(meters: f64) -> u64 {
    (meters * DISTANCE_SCALE).round() as u64
}

fn fixed_to_meters(fixed: u64) -> f64 {
    fixed as f64 / DISTANCE_SCALE
}

/// Immutable bundle of the road graph and its pairwise shortest-path-length table (§3).
#[derive(Debug)]
pub struct Skim {
    graph: Option<RoadGraph>,
    distances: HashMap<(Node, Node), f64>,
    nodes: std::collections::HashSet<Node>,
}

impl Skim {
    /// Builds a graph-backed skim: the distance table is precomputed with one Dijkstra run
    /// per node, and `path()` is supported.
    pub fn from_graph(graph: RoadGraph) -> Self {
        let nodes: Vec<Node> = graph.adjacency.keys().copied().collect();
        let mut distances = HashMap::with_capacity(nodes.len() * nodes.len());
        for &from in &nodes {
            distances.insert((from, from), 0.0);
            let reachable = pathfinding::prelude::dijkstra_all(&from, |n| graph.successors(*n));
            for (to, (_, cost)) in reachable {
                distances.insert((from, to), fixed_to_meters(cost));
            }
        }
        let node_set = nodes.into_iter().collect();
        Self {
            graph: Some(graph),
            distances,
            nodes: node_set,
        }
    }

    /// Builds a table-only skim from a precomputed pairwise distance matrix (e.g. a
    /// `skim_matrix` file with no accompanying graph). `path()` fails with
    /// [`SkimError::UnsupportedSkim`] for this variant.
    pub fn from_distance_table(distances: HashMap<(Node, Node), f64>) -> Self {
        let nodes = distances.keys().flat_map(|(a, b)| [*a, *b]).collect();
        Self {
            graph: None,
            distances,
            nodes,
        }
    }

    pub fn contains_node(&self, node: Node) -> bool {
        self.nodes.contains(&node)
    }

    fn pairwise(&self, a: Node, b: Node) -> Result<f64, SkimError> {
        if !self.nodes.contains(&a) {
            return Err(SkimError::UnknownNode(a));
        }
        if !self.nodes.contains(&b) {
            return Err(SkimError::UnknownNode(b));
        }
        if a == b {
            return Ok(0.0);
        }
        self.distances
            .get(&(a, b))
            .copied()
            .ok_or(SkimError::UnknownNode(b))
    }

    /// Sums pairwise shortest-path lengths between consecutive distinct nodes in `seq`.
    /// Zero for a singleton sequence or adjacent-equal nodes.
    pub fn distance(&self, seq: &[Node]) -> Result<f64, SkimError> {
        let mut total = 0.0;
        for pair in seq.windows(2) {
            total += self.pairwise(pair[0], pair[1])?;
        }
        Ok(total)
    }

    /// Distance from a single origin to a single destination; a named convenience for the
    /// deadhead-distance computations in §4.3/§4.5 (vehicle position -> request origin, or
    /// dropoff -> next pickup).
    pub fn deadhead(&self, from: Node, to: Node) -> Result<f64, SkimError> {
        self.pairwise(from, to)
    }

    /// Concatenation of per-segment shortest node-paths, deduplicating seam nodes. Requires a
    /// graph-backed skim.
    pub fn path(&self, seq: &[Node]) -> Result<Vec<Node>, SkimError> {
        let graph = self.graph.as_ref().ok_or(SkimError::UnsupportedSkim)?;
        if seq.is_empty() {
            return Ok(Vec::new());
        }
        let mut full = vec![seq[0]];
        for pair in seq.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if !graph.contains(from) {
                return Err(SkimError::UnknownNode(from));
            }
            if !graph.contains(to) {
                return Err(SkimError::UnknownNode(to));
            }
            if from == to {
                continue;
            }
            let (segment, _) =
                dijkstra(&from, |n| graph.successors(*n), |n| *n == to).ok_or(SkimError::UnknownNode(to))?;
            full.extend(segment.into_iter().skip(1));
        }
        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> RoadGraph {
        let mut g = RoadGraph::new();
        g.add_edge(Node(1), Node(2), 1000.0);
        g.add_edge(Node(2), Node(1), 1000.0);
        g.add_edge(Node(2), Node(3), 1000.0);
        g.add_edge(Node(3), Node(2), 1000.0);
        g
    }

    #[test]
    fn distance_sums_consecutive_segments() {
        let skim = Skim::from_graph(line_graph());
        let ab = skim.distance(&[Node(1), Node(2)]).unwrap();
        let bc = skim.distance(&[Node(2), Node(3)]).unwrap();
        let abc = skim.distance(&[Node(1), Node(2), Node(3)]).unwrap();
        assert!((abc - (ab + bc)).abs() < 1e-6);
    }

    #[test]
    fn distance_is_zero_for_singleton_and_equal_adjacent() {
        let skim = Skim::from_graph(line_graph());
        assert_eq!(skim.distance(&[Node(1)]).unwrap(), 0.0);
        assert_eq!(skim.distance(&[Node(1), Node(1)]).unwrap(), 0.0);
    }

    #[test]
    fn unknown_node_is_an_error() {
        let skim = Skim::from_graph(line_graph());
        assert!(matches!(
            skim.distance(&[Node(1), Node(99)]),
            Err(SkimError::UnknownNode(Node(99)))
        ));
    }

    #[test]
    fn path_concatenates_segments_without_duplicating_seams() {
        let skim = Skim::from_graph(line_graph());
        let path = skim.path(&[Node(1), Node(2), Node(3)]).unwrap();
        assert_eq!(path, vec![Node(1), Node(2), Node(3)]);
    }

    #[test]
    fn path_fails_on_table_only_skim() {
        let mut distances = HashMap::new();
        distances.insert((Node(1), Node(2)), 1000.0);
        let skim = Skim::from_distance_table(distances);
        assert!(matches!(skim.path(&[Node(1), Node(2)]), Err(SkimError::UnsupportedSkim)));
    }
}
