//! Time-dependent routing for emergency vehicles.
//!
//! The crate holds a road network whose edge travel times depend on the time
//! of day and on live traffic events, solvers that find earliest-arrival
//! routes over it, and the bookkeeping needed to decide whether a vehicle
//! already on its way should switch to a better route.

pub mod config;
mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod reroute;
pub mod routing;
mod service;
pub mod time;
pub mod tracking;
pub mod traffic;

pub use config::RoutingConfig;
pub use error::Error;
pub use loading::{load_network, load_network_csv, load_network_json};
pub use model::{RoadEdge, RoadGraph, RoadNode, TimeBucket};
pub use reroute::{RerouteDecision, RerouteReason, check_reroute};
pub use routing::{Algorithm, RoutePlan, RouteSegment, SearchLimits, SolverOptions, solve};
pub use service::RoutingService;
pub use tracking::{ActiveRoute, ActiveRouteTracker};
pub use traffic::{EdgeUpdate, TrafficSnapshot, UpdateOutcome, UpdateSummary};

/// External node identifier as given by the network description
pub type NodeId = u64;
/// Sequential edge identifier, starting at 1
pub type EdgeId = u32;
/// Instant in seconds since the Unix epoch (UTC)
pub type Timestamp = f64;
/// Duration in seconds
pub type Seconds = f64;

/// Length of the time-of-day cycle used by time buckets
pub const SECONDS_PER_DAY: f64 = 86_400.0;
