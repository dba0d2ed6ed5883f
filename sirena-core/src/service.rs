use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use geo::Point;
use log::{debug, info};
use rayon::prelude::*;

use crate::reroute::check_reroute;
use crate::routing::solve;
use crate::time::{now, to_timestamp};
use crate::traffic::{apply_snapshot, apply_update};
use crate::{
    ActiveRoute, ActiveRouteTracker, EdgeUpdate, Error, RerouteDecision, RoadGraph, RoutePlan,
    RoutingConfig, Timestamp, TrafficSnapshot, UpdateSummary,
};

/// Shared state behind every routing operation.
///
/// The road graph sits behind a reader/writer lock: route searches and
/// reroute checks read it, traffic updates take the write side, so an edge is
/// never observed half-updated. Active routes have their own lock.
#[derive(Debug)]
pub struct RoutingService {
    graph: RwLock<RoadGraph>,
    tracker: ActiveRouteTracker,
    config: RoutingConfig,
}

impl RoutingService {
    pub fn new(graph: RoadGraph, config: RoutingConfig) -> Self {
        info!(
            "Routing service ready: {} nodes, {} edges, {:?} solver",
            graph.node_count(),
            graph.edge_count(),
            config.algorithm
        );
        Self {
            graph: RwLock::new(graph),
            tracker: ActiveRouteTracker::new(config.route_retention_secs),
            config,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ActiveRouteTracker {
        &self.tracker
    }

    /// Routes between the nodes nearest to `source` and `destination`.
    ///
    /// Departs now when `departure` is `None`. With a vehicle ID the route
    /// becomes that vehicle's active route. `Ok(None)` when no route exists.
    pub fn compute_route(
        &self,
        source: Point<f64>,
        destination: Point<f64>,
        departure: Option<DateTime<Utc>>,
        vehicle_id: Option<&str>,
    ) -> Result<Option<RoutePlan>, Error> {
        let departure = departure.map_or_else(now, to_timestamp);

        let plan = {
            let graph = self.read_graph()?;
            let from = graph
                .nearest_node(source.y(), source.x())
                .ok_or_else(|| Error::InvalidData("Road network has no nodes".to_string()))?;
            let to = graph
                .nearest_node(destination.y(), destination.x())
                .ok_or_else(|| Error::InvalidData("Road network has no nodes".to_string()))?;
            debug!("Routing {from} -> {to} departing at {departure}");
            solve(&graph, from, to, departure, &self.config.solver_options())?
        };

        if let (Some(plan), Some(vehicle_id)) = (&plan, vehicle_id) {
            self.tracker.record(ActiveRoute {
                vehicle_id: vehicle_id.to_string(),
                plan: plan.clone(),
                last_position: source,
                recorded_at: now(),
            })?;
        }

        Ok(plan)
    }

    /// Applies one traffic event, `false` if it was ignored
    pub fn apply_traffic_event(&self, update: &EdgeUpdate) -> Result<bool, Error> {
        let mut graph = self.write_graph()?;
        Ok(apply_update(&mut graph, update).is_applied())
    }

    pub fn apply_traffic_snapshot(&self, snapshot: &TrafficSnapshot) -> Result<UpdateSummary, Error> {
        let mut graph = self.write_graph()?;
        Ok(apply_snapshot(&mut graph, snapshot))
    }

    /// Checks whether `vehicle_id` should leave its active route at `at`
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVehicle`] when the vehicle has no active route.
    pub fn check_reroute(&self, vehicle_id: &str, at: DateTime<Utc>) -> Result<RerouteDecision, Error> {
        let route = self
            .tracker
            .get(vehicle_id)?
            .ok_or_else(|| Error::UnknownVehicle(vehicle_id.to_string()))?;
        let graph = self.read_graph()?;
        Ok(check_reroute(&graph, &route, to_timestamp(at), &self.config))
    }

    /// Runs a reroute check for every tracked vehicle, in parallel
    pub fn check_all_reroutes(&self, at: DateTime<Utc>) -> Result<Vec<(String, RerouteDecision)>, Error> {
        let now: Timestamp = to_timestamp(at);
        let routes: Vec<ActiveRoute> = self
            .tracker
            .vehicle_ids()?
            .iter()
            .filter_map(|id| self.tracker.get(id).transpose())
            .collect::<Result<_, _>>()?;

        let graph = self.read_graph()?;
        let graph: &RoadGraph = &graph;
        Ok(routes
            .par_iter()
            .map(|route| {
                (
                    route.vehicle_id.clone(),
                    check_reroute(graph, route, now, &self.config),
                )
            })
            .collect())
    }

    /// Active route of a vehicle as `GeoJSON`
    pub fn route_geojson(&self, vehicle_id: &str) -> Result<geojson::FeatureCollection, Error> {
        let route = self
            .tracker
            .get(vehicle_id)?
            .ok_or_else(|| Error::UnknownVehicle(vehicle_id.to_string()))?;
        let graph = self.read_graph()?;
        route.plan.to_geojson(&graph)
    }

    /// Read access to the graph, e.g. for labels or statistics
    pub fn read_graph(&self) -> Result<RwLockReadGuard<'_, RoadGraph>, Error> {
        self.graph
            .read()
            .map_err(|_| Error::UnrecoverableError("road graph lock poisoned"))
    }

    fn write_graph(&self) -> Result<RwLockWriteGuard<'_, RoadGraph>, Error> {
        self.graph
            .write()
            .map_err(|_| Error::UnrecoverableError("road graph lock poisoned"))
    }
}
