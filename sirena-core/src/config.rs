use serde::{Deserialize, Serialize};

use crate::Seconds;
use crate::routing::{Algorithm, SearchLimits, SolverOptions};

/// Tunables of the routing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub algorithm: Algorithm,
    /// Upper bound on vehicle speed in m/s, used by the A* lower bound
    pub max_speed_mps: f64,
    /// Minimum saving that makes a reroute worthwhile on its own
    pub reroute_threshold_secs: Seconds,
    /// Live over planned travel time ratio that counts as a slowdown
    pub slowdown_factor: f64,
    /// Number of upcoming edges inspected for slowdowns
    pub slowdown_lookahead: usize,
    /// How long a route is kept after its planned arrival
    pub route_retention_secs: Seconds,
    /// Node expansions allowed per search, `None` for unbounded
    pub max_expansions: Option<usize>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Dijkstra,
            max_speed_mps: 15.0,
            reroute_threshold_secs: 120.0,
            slowdown_factor: 1.5,
            slowdown_lookahead: 3,
            route_retention_secs: 3_600.0,
            max_expansions: Some(1_000_000),
        }
    }
}

impl RoutingConfig {
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            algorithm: self.algorithm,
            max_speed: self.max_speed_mps,
            limits: SearchLimits {
                max_expansions: self.max_expansions,
            },
        }
    }
}
