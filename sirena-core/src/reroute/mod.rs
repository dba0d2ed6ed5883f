//! Decides whether a vehicle should leave its active route.
//!
//! A check places the vehicle on its stored route by the clock, routes again
//! from there and compares the remaining times. Independently, a few upcoming
//! edges of the stored route are inspected for live slowdowns.

mod decision;

use log::{debug, warn};

pub use decision::{RerouteDecision, RerouteReason, Slowdown, TimeBreakdown};

use crate::routing::{RouteSegment, solve};
use crate::{ActiveRoute, NodeId, RoadGraph, RoutingConfig, Seconds, Timestamp};

/// Evaluates `route` at instant `now`.
///
/// The vehicle is assumed to be at the far end of the segment it is
/// scheduled to be on. This is a coarse approximation, not a continuous
/// position estimate. Failing to compute an alternative never fails the
/// check, it yields a decision not to reroute.
pub fn check_reroute(
    graph: &RoadGraph,
    route: &ActiveRoute,
    now: Timestamp,
    config: &RoutingConfig,
) -> RerouteDecision {
    let plan = &route.plan;
    let old_remaining = (plan.arrival - now).max(0.0);

    let Some(segment_index) = locate_progress(&plan.segments, now) else {
        let node = plan.path.first().copied().unwrap_or_default();
        return RerouteDecision::unchanged(
            RerouteReason::AlreadyAtDestination,
            "route has no segments left".to_string(),
            node,
            0,
            old_remaining,
            labels(graph, &plan.path),
        );
    };

    let current_node = plan.segments[segment_index].to;
    let remaining_path = &plan.path[segment_index + 1..];
    let old_path = labels(graph, remaining_path);
    let Some(destination) = plan.target() else {
        return RerouteDecision::unchanged(
            RerouteReason::RecomputeFailed,
            "stored route has an empty path".to_string(),
            current_node,
            segment_index,
            old_remaining,
            old_path,
        );
    };

    let alternative = match solve(
        graph,
        current_node,
        destination,
        now,
        &config.solver_options(),
    ) {
        Ok(Some(alternative)) => alternative,
        Ok(None) => {
            debug!(
                "Vehicle {}: no route from {current_node} to {destination}",
                route.vehicle_id
            );
            return RerouteDecision::unchanged(
                RerouteReason::RecomputeFailed,
                format!("no alternative route from node {current_node} to node {destination}"),
                current_node,
                segment_index,
                old_remaining,
                old_path,
            );
        }
        Err(e) => {
            warn!(
                "Vehicle {}: error computing alternative route: {e}",
                route.vehicle_id
            );
            return RerouteDecision::unchanged(
                RerouteReason::RecomputeFailed,
                format!("error computing alternative route: {e}"),
                current_node,
                segment_index,
                old_remaining,
                old_path,
            );
        }
    };

    let new_remaining = (alternative.arrival - now).max(0.0);
    let time_saved = old_remaining - new_remaining;
    let slowdown = scan_slowdowns(
        graph,
        &plan.segments[segment_index..],
        now,
        config.slowdown_factor,
        config.slowdown_lookahead,
    );

    let reason = if slowdown.is_some() {
        RerouteReason::TrafficSlowdown
    } else if time_saved >= config.reroute_threshold_secs {
        RerouteReason::BetterRouteFound
    } else {
        RerouteReason::NoImprovement
    };

    let message = match &slowdown {
        Some(slowdown) => slowdown.detail.clone(),
        None => format!(
            "alternative saves {time_saved:.0}s (threshold {:.0}s)",
            config.reroute_threshold_secs
        ),
    };

    debug!(
        "Vehicle {} at node {current_node}: saved {time_saved:.1}s, reason {reason:?}",
        route.vehicle_id
    );

    RerouteDecision {
        reroute_recommended: reason.recommends_reroute(),
        reason,
        message,
        current_node,
        segment_index,
        time_saved: TimeBreakdown::from_seconds(time_saved),
        old_remaining: TimeBreakdown::from_seconds(old_remaining),
        new_remaining: TimeBreakdown::from_seconds(new_remaining),
        old_path,
        new_path: labels(graph, &alternative.path),
        slowdown,
    }
}

/// Index of the segment the vehicle is scheduled to be on at `now`.
///
/// Before departure this is the first segment, after arrival the last one.
/// `None` for a route without segments.
pub fn locate_progress(segments: &[RouteSegment], now: Timestamp) -> Option<usize> {
    let last = segments.len().checked_sub(1)?;
    Some(
        segments
            .iter()
            .position(|segment| now < segment.arrival)
            .unwrap_or(last),
    )
}

/// First of the next `lookahead` segments whose live travel time exceeds
/// `factor` times its planned duration
pub fn scan_slowdowns(
    graph: &RoadGraph,
    upcoming: &[RouteSegment],
    now: Timestamp,
    factor: f64,
    lookahead: usize,
) -> Option<Slowdown> {
    upcoming.iter().take(lookahead).find_map(|segment| {
        let live = graph.travel_time(segment.edge_id, now)?;
        let planned = segment.duration();
        (live > factor * planned).then(|| Slowdown::new(graph, segment, planned, live))
    })
}

fn labels(graph: &RoadGraph, path: &[NodeId]) -> Vec<String> {
    path.iter().map(|&node| graph.node_label(node)).collect()
}

pub(crate) fn minutes(seconds: Seconds) -> f64 {
    (seconds / 60.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::routing::td_dijkstra;
    use crate::traffic::apply_update;
    use crate::{EdgeUpdate, RoutePlan, SearchLimits};

    const T: Timestamp = 1_760_436_000.0;

    fn active(graph: &RoadGraph, source: NodeId, target: NodeId) -> ActiveRoute {
        let plan = td_dijkstra(graph, source, target, T, &SearchLimits::default())
            .unwrap()
            .unwrap();
        ActiveRoute {
            vehicle_id: "amb-7".to_string(),
            plan,
            last_position: Point::new(0.0, 0.0),
            recorded_at: T,
        }
    }

    /// Stored route 1 -> 2 -> 3 -> 4 (10 + 20 + 300 s), alternative 2 -> 5 -> 4 (50 + 300 s)
    fn network() -> RoadGraph {
        let mut graph = RoadGraph::new();
        for (id, lon) in [(1, 0.0), (2, 0.001), (3, 0.002), (4, 0.003)] {
            graph.add_node(id, 0.0, lon);
        }
        graph.add_named_node(5, -0.001, 0.002, Some("Bypass".to_string()));
        graph.add_edge(1, 2, 10.0, 100.0, Vec::new()).unwrap();
        graph.add_edge(2, 3, 20.0, 100.0, Vec::new()).unwrap();
        graph.add_edge(3, 4, 300.0, 100.0, Vec::new()).unwrap();
        graph.add_edge(2, 5, 50.0, 150.0, Vec::new()).unwrap();
        graph.add_edge(5, 4, 300.0, 150.0, Vec::new()).unwrap();
        graph
    }

    fn segment(edge_id: u32, from: NodeId, to: NodeId, departure: f64, arrival: f64) -> RouteSegment {
        RouteSegment {
            edge_id,
            from,
            to,
            departure,
            arrival,
        }
    }

    #[test]
    fn test_locate_progress() {
        let segments = vec![
            segment(1, 1, 2, 100.0, 110.0),
            segment(2, 2, 3, 110.0, 130.0),
            segment(3, 3, 4, 130.0, 430.0),
        ];
        assert_eq!(locate_progress(&segments, 50.0), Some(0));
        assert_eq!(locate_progress(&segments, 100.0), Some(0));
        assert_eq!(locate_progress(&segments, 110.0), Some(1));
        assert_eq!(locate_progress(&segments, 200.0), Some(2));
        assert_eq!(locate_progress(&segments, 10_000.0), Some(2));
        assert_eq!(locate_progress(&[], 100.0), None);
    }

    #[test]
    fn test_small_saving_is_not_enough() {
        // Stored arrival T + 500, the alternative needs 440 s from now
        let mut graph = RoadGraph::new();
        graph.add_node(1, 0.0, 0.0);
        graph.add_node(2, 0.0, 0.001);
        graph.add_node(3, 0.0, 0.05);
        graph.add_edge(1, 2, 60.0, 100.0, Vec::new()).unwrap();
        graph.add_edge(2, 3, 440.0, 5_000.0, Vec::new()).unwrap();
        let route = active(&graph, 1, 3);
        assert_eq!(route.arrival(), T + 500.0);

        let decision = check_reroute(&graph, &route, T, &RoutingConfig::default());
        assert_eq!(decision.current_node, 2);
        assert_eq!(decision.old_remaining.seconds, 500.0);
        assert_eq!(decision.new_remaining.seconds, 440.0);
        assert_eq!(decision.time_saved.seconds, 60.0);
        assert_eq!(decision.time_saved.minutes, 1.0);
        assert_eq!(decision.reason, RerouteReason::NoImprovement);
        assert!(!decision.reroute_recommended);
        assert!(decision.slowdown.is_none());
    }

    #[test]
    fn test_better_route_found() {
        let mut graph = network();
        let route = active(&graph, 1, 4);
        assert_eq!(route.plan.path, vec![1, 2, 3, 4]);

        apply_update(&mut graph, &EdgeUpdate::multiplier(4, 0.2));
        apply_update(&mut graph, &EdgeUpdate::multiplier(5, 0.2));

        let decision = check_reroute(&graph, &route, T + 5.0, &RoutingConfig::default());
        assert_eq!(decision.segment_index, 0);
        assert_eq!(decision.old_remaining.seconds, 325.0);
        assert_eq!(decision.new_remaining.seconds, 70.0);
        assert_eq!(decision.reason, RerouteReason::BetterRouteFound);
        assert!(decision.reroute_recommended);
        assert_eq!(decision.old_path, vec!["2", "3", "4"]);
        assert_eq!(decision.new_path, vec!["2", "Bypass", "4"]);
    }

    #[test]
    fn test_slowdown_takes_priority() {
        let mut graph = network();
        let route = active(&graph, 1, 4);

        // Planned 20 s, now 35 s
        apply_update(&mut graph, &EdgeUpdate::multiplier(2, 1.75));
        apply_update(&mut graph, &EdgeUpdate::multiplier(4, 0.2));
        apply_update(&mut graph, &EdgeUpdate::multiplier(5, 0.2));

        let decision = check_reroute(&graph, &route, T + 5.0, &RoutingConfig::default());
        assert!(decision.time_saved.seconds >= 120.0);
        assert_eq!(decision.reason, RerouteReason::TrafficSlowdown);
        assert!(decision.reroute_recommended);

        let slowdown = decision.slowdown.unwrap();
        assert_eq!(slowdown.edge_id, 2);
        assert_eq!(slowdown.planned, 20.0);
        assert_eq!(slowdown.live, 35.0);
        assert_eq!(slowdown.ratio, 1.75);
        assert_eq!(decision.message, slowdown.detail);
    }

    #[test]
    fn test_first_slowdown_wins() {
        let mut graph = network();
        let route = active(&graph, 1, 4);
        apply_update(&mut graph, &EdgeUpdate::multiplier(2, 2.0));
        apply_update(&mut graph, &EdgeUpdate::multiplier(3, 2.0));

        let slowdown = scan_slowdowns(&graph, &route.plan.segments, T, 1.5, 3).unwrap();
        assert_eq!(slowdown.edge_id, 2);

        // Outside of the lookahead window
        assert!(scan_slowdowns(&graph, &route.plan.segments, T, 1.5, 1).is_none());
    }

    #[test]
    fn test_slowdown_without_saving_still_reroutes() {
        let mut graph = network();
        let route = active(&graph, 1, 4);
        apply_update(&mut graph, &EdgeUpdate::absolute(3, 600.0));

        // On segment 1, heading for node 3
        let decision = check_reroute(&graph, &route, T + 15.0, &RoutingConfig::default());
        assert_eq!(decision.current_node, 3);
        assert!(decision.time_saved.seconds < 0.0);
        assert_eq!(decision.reason, RerouteReason::TrafficSlowdown);
        assert!(decision.reroute_recommended);
    }

    #[test]
    fn test_recompute_failure_is_not_fatal() {
        let mut graph = network();
        let route = active(&graph, 1, 4);
        graph.edge_mut(2).unwrap().emergency_allowed = false;
        graph.edge_mut(4).unwrap().emergency_allowed = false;

        let decision = check_reroute(&graph, &route, T + 5.0, &RoutingConfig::default());
        assert_eq!(decision.reason, RerouteReason::RecomputeFailed);
        assert!(!decision.reroute_recommended);
        assert!(decision.new_path.is_empty());

        let config = RoutingConfig {
            max_expansions: Some(0),
            ..RoutingConfig::default()
        };
        let decision = check_reroute(&network(), &route, T + 5.0, &config);
        assert_eq!(decision.reason, RerouteReason::RecomputeFailed);
        assert!(decision.message.starts_with("error computing alternative route"));
    }

    #[test]
    fn test_route_without_segments() {
        let graph = network();
        let route = ActiveRoute {
            vehicle_id: "amb-0".to_string(),
            plan: RoutePlan {
                departure: T,
                arrival: T,
                path: vec![4],
                segments: Vec::new(),
            },
            last_position: Point::new(0.0, 0.0),
            recorded_at: T,
        };
        let decision = check_reroute(&graph, &route, T + 60.0, &RoutingConfig::default());
        assert_eq!(decision.reason, RerouteReason::AlreadyAtDestination);
        assert!(!decision.reroute_recommended);
        assert_eq!(decision.old_remaining.seconds, 0.0);
    }
}
