//! Earliest-arrival routing over the time-dependent road graph

pub mod astar;
pub mod dijkstra;
mod plan;
mod to_geojson;

use serde::{Deserialize, Serialize};

pub use astar::td_astar;
pub use dijkstra::td_dijkstra;
pub use plan::{RoutePlan, RouteSegment};

use crate::{Error, NodeId, RoadGraph, Timestamp};

/// Which solver answers route requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Time-dependent Dijkstra
    #[default]
    Dijkstra,
    /// Time-dependent A* with a haversine lower bound
    #[serde(alias = "a_star")]
    AStar,
}

/// Bounds on the work a single search may do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of node expansions before giving up
    pub max_expansions: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    pub algorithm: Algorithm,
    /// Speed in m/s no vehicle exceeds, used by the A* lower bound
    pub max_speed: f64,
    pub limits: SearchLimits,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Dijkstra,
            max_speed: 15.0,
            limits: SearchLimits::default(),
        }
    }
}

/// Routes from `source` to `target` departing at `departure` with the configured solver.
///
/// `Ok(None)` means no path exists, which callers are expected to handle as
/// a regular outcome.
pub fn solve(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    departure: Timestamp,
    options: &SolverOptions,
) -> Result<Option<RoutePlan>, Error> {
    match options.algorithm {
        Algorithm::Dijkstra => td_dijkstra(graph, source, target, departure, &options.limits),
        Algorithm::AStar => td_astar(
            graph,
            source,
            target,
            departure,
            options.max_speed,
            &options.limits,
        ),
    }
}
