use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use log::trace;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::state::State;
use crate::routing::{RoutePlan, RouteSegment, SearchLimits};
use crate::{Error, NodeId, RoadGraph, Seconds, Timestamp};

/// Time-dependent Dijkstra: earliest arrival at `target` when leaving `source` at `departure`.
///
/// Labels are arrival instants and every edge is evaluated at the instant the
/// search reaches its tail. The result is optimal as long as every edge is
/// FIFO, i.e. entering it later never gets you out earlier. A bucket profile
/// where a later slot is much faster breaks that, and the returned route may
/// then be slower than the best one.
///
/// Returns `Ok(None)` when the target can not be reached.
///
/// # Errors
///
/// [`Error::InvalidNode`] for unknown endpoints, [`Error::SearchBudgetExceeded`]
/// when `limits` stop the search.
pub fn td_dijkstra(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    departure: Timestamp,
    limits: &SearchLimits,
) -> Result<Option<RoutePlan>, Error> {
    time_dependent_search(graph, source, target, departure, limits, |_| 0.0)
}

/// Label-correcting core shared by the Dijkstra and A* variants.
///
/// Queue keys are `arrival + potential(node)`, labels stay plain arrivals. A
/// node is expanded again only if its arrival strictly improved since its last
/// expansion.
pub(crate) fn time_dependent_search<P>(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    departure: Timestamp,
    limits: &SearchLimits,
    potential: P,
) -> Result<Option<RoutePlan>, Error>
where
    P: Fn(NodeIndex) -> Seconds,
{
    let start = graph.node_index(source).ok_or(Error::InvalidNode(source))?;
    let goal = graph.node_index(target).ok_or(Error::InvalidNode(target))?;
    if !departure.is_finite() {
        return Err(Error::InvalidData(format!(
            "Departure must be a finite timestamp, got {departure}"
        )));
    }

    let node_count = graph.graph.node_count();
    let mut arrivals = vec![Timestamp::INFINITY; node_count];
    let mut predecessors: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; node_count];
    let mut heap = BinaryHeap::with_capacity(node_count.min(1000) / 4);
    let mut expansions = 0usize;

    arrivals[start.index()] = departure;
    heap.push(State {
        key: departure + potential(start),
        arrival: departure,
        node: start,
    });

    while let Some(State { arrival, node, .. }) = heap.pop() {
        // Skip if we've found a better arrival since this entry was queued
        if arrival > arrivals[node.index()] {
            continue;
        }

        if node == goal {
            break;
        }

        expansions += 1;
        if let Some(max) = limits.max_expansions
            && expansions > max
        {
            return Err(Error::SearchBudgetExceeded(max));
        }

        for edge in graph.graph.edges(node) {
            let road = edge.weight();
            if !road.emergency_allowed {
                continue;
            }

            let next = edge.target();
            let next_arrival = arrival + road.travel_time(arrival);
            if next_arrival < arrivals[next.index()] {
                arrivals[next.index()] = next_arrival;
                predecessors[next.index()] = Some((node, edge.id()));
                heap.push(State {
                    key: next_arrival + potential(next),
                    arrival: next_arrival,
                    node: next,
                });
            }
        }
    }

    trace!("Search {source} -> {target} expanded {expansions} nodes");

    if !arrivals[goal.index()].is_finite() {
        return Ok(None);
    }

    let edges = reconstruct_edges(graph, start, goal, &predecessors)?;
    Ok(Some(replay(graph, source, departure, &edges)))
}

/// Follows predecessor links back from `goal` and returns the edges in travel order
fn reconstruct_edges(
    graph: &RoadGraph,
    start: NodeIndex,
    goal: NodeIndex,
    predecessors: &[Option<(NodeIndex, EdgeIndex)>],
) -> Result<Vec<EdgeIndex>, Error> {
    let mut visited = FixedBitSet::with_capacity(predecessors.len());
    let mut edges = Vec::new();
    let mut current = goal;
    visited.insert(current.index());

    while current != start {
        let Some((previous, edge)) = predecessors[current.index()] else {
            return Err(Error::SolverFailure(format!(
                "Broken predecessor chain at node {}",
                graph.graph[current].id
            )));
        };
        if visited.put(previous.index()) {
            return Err(Error::SolverFailure(format!(
                "Predecessor cycle through node {}",
                graph.graph[previous].id
            )));
        }
        edges.push(edge);
        current = previous;
    }

    edges.reverse();
    Ok(edges)
}

/// Evaluates travel times along `edges` starting at `departure`
fn replay(
    graph: &RoadGraph,
    source: NodeId,
    departure: Timestamp,
    edges: &[EdgeIndex],
) -> RoutePlan {
    let mut path = Vec::with_capacity(edges.len() + 1);
    let mut segments = Vec::with_capacity(edges.len());
    path.push(source);

    let mut clock = departure;
    for &index in edges {
        let road = &graph.graph[index];
        let arrival = clock + road.travel_time(clock);
        segments.push(RouteSegment {
            edge_id: road.id,
            from: road.from,
            to: road.to,
            departure: clock,
            arrival,
        });
        path.push(road.to);
        clock = arrival;
    }

    RoutePlan {
        departure,
        arrival: clock,
        path,
        segments,
    }
}
