//! Road network graph with time-dependent edge costs

use geo::Point;
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::components::{RoadEdge, RoadNode, TimeBucket};
use crate::{EdgeId, Error, NodeId, Seconds, Timestamp};

/// Node position in the spatial index, as `[lon, lat]`
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Directed road network.
///
/// Parallel edges are allowed, a two-way street is two edges. Edge IDs are
/// handed out sequentially starting at 1 and never reused, since edges are
/// never removed from the graph.
#[derive(Clone, Default)]
pub struct RoadGraph {
    pub(crate) graph: DiGraph<RoadNode, RoadEdge>,
    node_lookup: HashMap<NodeId, NodeIndex>,
    rtree: RTree<IndexedPoint>,
}

impl std::fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadGraph")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, replacing the coordinates of an existing node with the same ID
    pub fn add_node(&mut self, id: NodeId, lat: f64, lon: f64) {
        self.add_named_node(id, lat, lon, None);
    }

    pub fn add_named_node(&mut self, id: NodeId, lat: f64, lon: f64, name: Option<String>) {
        let node = RoadNode {
            id,
            geometry: Point::new(lon, lat),
            name,
        };

        if let Some(&index) = self.node_lookup.get(&id) {
            let old = &self.graph[index];
            self.rtree
                .remove(&IndexedPoint::new([old.lon(), old.lat()], index));
            self.graph[index] = node;
            self.rtree.insert(IndexedPoint::new([lon, lat], index));
            return;
        }

        let index = self.graph.add_node(node);
        self.node_lookup.insert(id, index);
        self.rtree.insert(IndexedPoint::new([lon, lat], index));
    }

    /// Appends a directed edge from `from` to `to` and returns its ID
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if either endpoint is unknown and
    /// [`Error::InvalidData`] for negative or non-finite times.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        base_time: Seconds,
        distance: f64,
        time_buckets: Vec<TimeBucket>,
    ) -> Result<EdgeId, Error> {
        let source = self.node_index(from).ok_or(Error::InvalidNode(from))?;
        let target = self.node_index(to).ok_or(Error::InvalidNode(to))?;

        validate_time("base_time", base_time)?;
        if !distance.is_finite() || distance < 0.0 {
            return Err(Error::InvalidData(format!(
                "Edge {from}->{to} has invalid distance {distance}"
            )));
        }
        for bucket in &time_buckets {
            validate_time("avg_time", bucket.avg_time)?;
            if !(bucket.start < bucket.end) {
                return Err(Error::InvalidData(format!(
                    "Edge {from}->{to} has an empty time bucket [{}, {})",
                    bucket.start, bucket.end
                )));
            }
        }

        let id = EdgeId::try_from(self.graph.edge_count() + 1)
            .map_err(|_| Error::InvalidData("Edge ID space exhausted".to_string()))?;
        let edge = RoadEdge::new(id, from, to, base_time, distance, time_buckets);
        self.graph.add_edge(source, target, edge);

        Ok(id)
    }

    /// Travel time of an edge entered at `at`, `None` for an unknown edge
    pub fn travel_time(&self, edge: EdgeId, at: Timestamp) -> Option<Seconds> {
        self.edge(edge).map(|edge| edge.travel_time(at))
    }

    /// Outgoing `(target, edge)` pairs of a node, in no particular order
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        self.node_index(node)
            .into_iter()
            .flat_map(|index| self.graph.edges(index))
            .map(|edge| (edge.weight().to, edge.weight().id))
    }

    /// Node closest to the given coordinates, by squared distance in degree space
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<NodeId> {
        self.rtree
            .nearest_neighbor(&[lon, lat])
            .map(|point| self.graph[point.data].id)
    }

    /// First edge added from `from` to `to`
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let source = self.node_index(from)?;
        self.graph
            .edges(source)
            .filter(|edge| edge.weight().to == to)
            .map(|edge| edge.weight().id)
            .min()
    }

    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.node_index(id).map(|index| &self.graph[index])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&RoadEdge> {
        self.edge_index(id)
            .and_then(|index| self.graph.edge_weight(index))
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Option<&mut RoadEdge> {
        self.edge_index(id)
            .and_then(|index| self.graph.edge_weight_mut(index))
    }

    /// Display name of a node, or its ID if it has none
    pub fn node_label(&self, id: NodeId) -> String {
        self.node(id)
            .map_or_else(|| id.to_string(), RoadNode::label)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_lookup.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    fn edge_index(&self, id: EdgeId) -> Option<EdgeIndex> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        (index < self.graph.edge_count()).then(|| EdgeIndex::new(index))
    }
}

fn validate_time(field: &str, value: Seconds) -> Result<(), Error> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "{field} must be a non-negative number of seconds, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RoadGraph {
        let mut graph = RoadGraph::new();
        graph.add_node(1, 0.0, 0.0);
        graph.add_node(2, 0.0, 1.0);
        graph.add_node(3, 1.0, 1.0);
        graph.add_edge(1, 2, 10.0, 100.0, Vec::new()).unwrap();
        graph.add_edge(2, 3, 10.0, 100.0, Vec::new()).unwrap();
        graph.add_edge(1, 3, 30.0, 150.0, Vec::new()).unwrap();
        graph
    }

    #[test]
    fn test_edge_ids_are_sequential() {
        let mut graph = triangle();
        let id = graph.add_edge(3, 1, 5.0, 10.0, Vec::new()).unwrap();
        assert_eq!(id, 4);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.edge(0).is_none());
        assert!(graph.edge(5).is_none());
        assert_eq!(graph.edge(2).map(|e| (e.from, e.to)), Some((2, 3)));
    }

    #[test]
    fn test_add_edge_rejects_unknown_nodes() {
        let mut graph = triangle();
        assert!(matches!(
            graph.add_edge(1, 99, 1.0, 1.0, Vec::new()),
            Err(Error::InvalidNode(99))
        ));
        assert!(matches!(
            graph.add_edge(42, 1, 1.0, 1.0, Vec::new()),
            Err(Error::InvalidNode(42))
        ));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_add_edge_rejects_invalid_times() {
        let mut graph = triangle();
        assert!(matches!(
            graph.add_edge(1, 2, -1.0, 1.0, Vec::new()),
            Err(Error::InvalidData(_))
        ));
        let bucket = TimeBucket {
            start: 100.0,
            end: 100.0,
            avg_time: 1.0,
        };
        assert!(matches!(
            graph.add_edge(1, 2, 1.0, 1.0, vec![bucket]),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_neighbors_and_edge_between() {
        let mut graph = triangle();
        let mut out: Vec<_> = graph.neighbors(1).collect();
        out.sort_unstable();
        assert_eq!(out, vec![(2, 1), (3, 3)]);
        assert_eq!(graph.neighbors(99).count(), 0);

        // A parallel edge does not shadow the first one
        graph.add_edge(1, 2, 3.0, 100.0, Vec::new()).unwrap();
        assert_eq!(graph.edge_between(1, 2), Some(1));
        assert_eq!(graph.edge_between(2, 1), None);
    }

    #[test]
    fn test_nearest_node_follows_overwrites() {
        let mut graph = triangle();
        assert_eq!(graph.nearest_node(0.1, 0.9), Some(2));
        assert_eq!(graph.nearest_node(0.9, 1.2), Some(3));

        graph.add_node(2, 5.0, 5.0);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.nearest_node(0.1, 0.9), Some(1));
        assert_eq!(graph.nearest_node(4.8, 5.1), Some(2));
        assert_eq!(RoadGraph::new().nearest_node(0.0, 0.0), None);
    }

    #[test]
    fn test_travel_time_lookup() {
        let graph = triangle();
        assert_eq!(graph.travel_time(3, 0.0), Some(30.0));
        assert_eq!(graph.travel_time(17, 0.0), None);
        assert_eq!(graph.node_label(1), "1");
    }
}
