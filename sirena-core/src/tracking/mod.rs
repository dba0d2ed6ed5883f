//! Last computed route of every vehicle.
//!
//! The tracker keeps one [`ActiveRoute`] per vehicle. A new route for the
//! same vehicle replaces the old one. A route is dropped once both its
//! planned arrival and the moment it was recorded lie more than the retention
//! period in the past, so replayed or historic plans survive while in use.

use std::sync::RwLock;

use geo::Point;
use hashbrown::HashMap;
use log::debug;

use crate::{Error, NodeId, RoutePlan, Seconds, Timestamp, time};

/// Route a vehicle is currently following
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRoute {
    pub vehicle_id: String,
    pub plan: RoutePlan,
    /// Coordinates the route was requested from, x = longitude and y = latitude
    pub last_position: Point<f64>,
    /// Wall clock instant the route was stored
    pub recorded_at: Timestamp,
}

impl ActiveRoute {
    pub fn departure(&self) -> Timestamp {
        self.plan.departure
    }

    pub fn arrival(&self) -> Timestamp {
        self.plan.arrival
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.plan.target()
    }

    fn is_expired(&self, now: Timestamp, retention: Seconds) -> bool {
        self.plan.arrival.max(self.recorded_at) + retention < now
    }
}

#[derive(Debug)]
pub struct ActiveRouteTracker {
    routes: RwLock<HashMap<String, ActiveRoute>>,
    retention: Seconds,
}

impl ActiveRouteTracker {
    pub fn new(retention: Seconds) -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Stores `route`, replacing any earlier route of the same vehicle, and
    /// evicts routes that expired before `route.recorded_at`.
    ///
    /// Eviction never looks past the wall clock, a `recorded_at` in the future
    /// is capped at the current time.
    pub fn record(&self, route: ActiveRoute) -> Result<(), Error> {
        let now = route.recorded_at.min(time::now());
        let mut routes = self.write()?;
        routes.insert(route.vehicle_id.clone(), route);
        let evicted = evict(&mut routes, now, self.retention);
        if evicted > 0 {
            debug!("Evicted {evicted} expired routes");
        }
        Ok(())
    }

    pub fn get(&self, vehicle_id: &str) -> Result<Option<ActiveRoute>, Error> {
        Ok(self.read()?.get(vehicle_id).cloned())
    }

    /// Drops every route whose arrival is older than the retention period, returns the count
    pub fn evict_expired(&self, now: Timestamp) -> Result<usize, Error> {
        let mut routes = self.write()?;
        Ok(evict(&mut routes, now, self.retention))
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.read()?.is_empty())
    }

    pub fn vehicle_ids(&self) -> Result<Vec<String>, Error> {
        let mut ids: Vec<String> = self.read()?.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, ActiveRoute>>, Error> {
        self.routes
            .read()
            .map_err(|_| Error::UnrecoverableError("active route table lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, ActiveRoute>>, Error> {
        self.routes
            .write()
            .map_err(|_| Error::UnrecoverableError("active route table lock poisoned"))
    }
}

fn evict(routes: &mut HashMap<String, ActiveRoute>, now: Timestamp, retention: Seconds) -> usize {
    let before = routes.len();
    routes.retain(|_, route| !route.is_expired(now, retention));
    before - routes.len()
}
