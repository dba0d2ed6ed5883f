//! Commonly used items, for `use sirena_core::prelude::*`

pub use crate::{EdgeId, NodeId, SECONDS_PER_DAY, Seconds, Timestamp};

// Network
pub use crate::loading::{load_network, load_network_csv, load_network_json};
pub use crate::model::{RoadEdge, RoadGraph, RoadNode, TimeBucket};

// Routing
pub use crate::routing::{
    Algorithm, RoutePlan, RouteSegment, SearchLimits, SolverOptions, solve, td_astar, td_dijkstra,
};

// Live traffic and active routes
pub use crate::reroute::{RerouteDecision, RerouteReason, check_reroute};
pub use crate::tracking::{ActiveRoute, ActiveRouteTracker};
pub use crate::traffic::{EdgeUpdate, TrafficSnapshot, UpdateSummary, apply_snapshot, apply_update};

pub use crate::{Error, RoutingConfig, RoutingService};
