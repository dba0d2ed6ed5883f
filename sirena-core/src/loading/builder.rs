use log::{info, warn};

use super::raw_types::{NetworkDocument, RawEdge, RawNode};
use crate::{Error, RoadGraph};

/// Builds a road graph from a parsed network description.
///
/// Nodes are inserted before edges, so edges may reference nodes in any
/// order. Any edge with an unknown endpoint aborts the build.
///
/// # Errors
///
/// Returns [`Error::InvalidNode`] for edges referencing unknown nodes and
/// [`Error::InvalidData`] for invalid coordinates or times.
pub fn build_road_graph(document: NetworkDocument) -> Result<RoadGraph, Error> {
    build_from_parts(document.nodes, document.edges)
}

pub(crate) fn build_from_parts(nodes: Vec<RawNode>, edges: Vec<RawEdge>) -> Result<RoadGraph, Error> {
    let mut graph = RoadGraph::new();

    for node in nodes {
        validate_coordinates(&node)?;
        if graph.contains_node(node.id) {
            warn!("Node {} is defined twice, keeping the last definition", node.id);
        }
        graph.add_named_node(node.id, node.lat, node.lon, node.name);
    }

    let mut restricted = 0usize;
    for edge in edges {
        let id = graph.add_edge(
            edge.from,
            edge.to,
            edge.base_time,
            edge.distance,
            edge.time_buckets,
        )?;
        if !edge.emergency_allowed {
            restricted += 1;
            if let Some(road) = graph.edge_mut(id) {
                road.emergency_allowed = false;
            }
        }
    }

    info!(
        "Road graph built with {} nodes and {} edges ({} closed to emergency vehicles)",
        graph.node_count(),
        graph.edge_count(),
        restricted
    );
    Ok(graph)
}

fn validate_coordinates(node: &RawNode) -> Result<(), Error> {
    let valid_lat = node.lat.is_finite() && (-90.0..=90.0).contains(&node.lat);
    let valid_lon = node.lon.is_finite() && (-180.0..=180.0).contains(&node.lon);
    if valid_lat && valid_lon {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "Node {} has invalid coordinates ({}, {})",
            node.id, node.lat, node.lon
        )))
    }
}
