use serde::Serialize;

use crate::{EdgeId, NodeId, Seconds, Timestamp};

/// One traversed edge of a route with its planned timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteSegment {
    pub edge_id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub departure: Timestamp,
    pub arrival: Timestamp,
}

impl RouteSegment {
    pub fn duration(&self) -> Seconds {
        self.arrival - self.departure
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        self.departure <= at && at < self.arrival
    }
}

/// Earliest-arrival route between two nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub departure: Timestamp,
    pub arrival: Timestamp,
    /// Visited nodes from source to target, inclusive
    pub path: Vec<NodeId>,
    /// One segment per consecutive pair of `path`
    pub segments: Vec<RouteSegment>,
}

impl RoutePlan {
    pub fn travel_time(&self) -> Seconds {
        self.arrival - self.departure
    }

    pub fn source(&self) -> Option<NodeId> {
        self.path.first().copied()
    }

    pub fn target(&self) -> Option<NodeId> {
        self.path.last().copied()
    }
}
