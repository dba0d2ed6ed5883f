use serde::Serialize;

use super::minutes;
use crate::routing::RouteSegment;
use crate::{EdgeId, NodeId, RoadGraph, Seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RerouteReason {
    /// The alternative saves at least the configured threshold
    BetterRouteFound,
    /// An upcoming edge of the current route got much slower than planned
    TrafficSlowdown,
    NoImprovement,
    /// No alternative could be computed
    RecomputeFailed,
    AlreadyAtDestination,
}

impl RerouteReason {
    pub fn recommends_reroute(self) -> bool {
        matches!(
            self,
            RerouteReason::BetterRouteFound | RerouteReason::TrafficSlowdown
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            RerouteReason::BetterRouteFound => "better route found",
            RerouteReason::TrafficSlowdown => "traffic slowdown detected",
            RerouteReason::NoImprovement => "current route is still good",
            RerouteReason::RecomputeFailed => "no reroute, error computing alternative",
            RerouteReason::AlreadyAtDestination => "vehicle is at its destination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeBreakdown {
    pub seconds: Seconds,
    /// Rounded to one decimal
    pub minutes: f64,
}

impl TimeBreakdown {
    pub fn from_seconds(seconds: Seconds) -> Self {
        Self {
            seconds,
            minutes: minutes(seconds),
        }
    }
}

/// Upcoming edge whose live travel time exceeds its plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slowdown {
    pub edge_id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub planned: Seconds,
    pub live: Seconds,
    pub ratio: f64,
    pub detail: String,
}

impl Slowdown {
    pub(super) fn new(
        graph: &RoadGraph,
        segment: &RouteSegment,
        planned: Seconds,
        live: Seconds,
    ) -> Self {
        let ratio = if planned > 0.0 {
            live / planned
        } else {
            f64::INFINITY
        };
        let detail = format!(
            "slowdown on {} -> {}: {live:.0}s now vs {planned:.0}s planned ({ratio:.2}x)",
            graph.node_label(segment.from),
            graph.node_label(segment.to),
        );
        Self {
            edge_id: segment.edge_id,
            from: segment.from,
            to: segment.to,
            planned,
            live,
            ratio,
            detail,
        }
    }
}

/// Outcome of a reroute check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RerouteDecision {
    pub reroute_recommended: bool,
    pub reason: RerouteReason,
    pub message: String,
    /// Node the vehicle is assumed to be heading to
    pub current_node: NodeId,
    pub segment_index: usize,
    pub time_saved: TimeBreakdown,
    pub old_remaining: TimeBreakdown,
    pub new_remaining: TimeBreakdown,
    /// Remaining part of the stored route from `current_node`, as node names
    pub old_path: Vec<String>,
    pub new_path: Vec<String>,
    pub slowdown: Option<Slowdown>,
}

impl RerouteDecision {
    pub(super) fn unchanged(
        reason: RerouteReason,
        message: String,
        current_node: NodeId,
        segment_index: usize,
        old_remaining: Seconds,
        old_path: Vec<String>,
    ) -> Self {
        Self {
            reroute_recommended: false,
            reason,
            message,
            current_node,
            segment_index,
            time_saved: TimeBreakdown::from_seconds(0.0),
            old_remaining: TimeBreakdown::from_seconds(old_remaining),
            new_remaining: TimeBreakdown::from_seconds(old_remaining),
            old_path,
            new_path: Vec::new(),
            slowdown: None,
        }
    }

    /// Reason as shown to dispatchers
    pub fn reason_text(&self) -> &'static str {
        self.reason.description()
    }
}
