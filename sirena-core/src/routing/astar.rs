//! Time-dependent A* guided by straight-line distance

use geo::{Distance, Haversine, Point};

use super::SearchLimits;
use super::dijkstra::time_dependent_search;
use crate::{Error, NodeId, RoadGraph, RoutePlan, Seconds, Timestamp};

/// Lower bound on the remaining travel time from `from` to `to` when
/// nobody drives faster than `max_speed` (m/s)
pub fn travel_time_lower_bound(from: Point<f64>, to: Point<f64>, max_speed: f64) -> Seconds {
    Haversine.distance(from, to) / max_speed
}

/// Same contract as [`td_dijkstra`](super::td_dijkstra), with the queue
/// ordered by arrival plus [`travel_time_lower_bound`] to the target.
///
/// The bound only holds if no edge is traversed faster than `max_speed`. An
/// edge beating it makes the potential inadmissible and the returned route may
/// be suboptimal.
///
/// # Errors
///
/// As [`td_dijkstra`](super::td_dijkstra), plus [`Error::InvalidData`] for a
/// non-positive `max_speed`.
pub fn td_astar(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    departure: Timestamp,
    max_speed: f64,
    limits: &SearchLimits,
) -> Result<Option<RoutePlan>, Error> {
    if !max_speed.is_finite() || max_speed <= 0.0 {
        return Err(Error::InvalidData(format!(
            "Maximum speed must be positive, got {max_speed}"
        )));
    }
    let goal = graph.node(target).ok_or(Error::InvalidNode(target))?.geometry;

    time_dependent_search(graph, source, target, departure, limits, |node| {
        travel_time_lower_bound(graph.graph[node].geometry, goal, max_speed)
    })
}
