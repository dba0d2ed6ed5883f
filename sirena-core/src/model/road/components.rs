//! Road network components - nodes, edges, and time-of-day buckets

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{EdgeId, NodeId, Seconds, Timestamp, time::seconds_of_day};

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// External ID of the node
    pub id: NodeId,
    /// Node coordinates, x = longitude and y = latitude
    pub geometry: Point<f64>,
    /// Optional display name
    pub name: Option<String>,
}

impl RoadNode {
    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    pub fn lon(&self) -> f64 {
        self.geometry.x()
    }

    /// Display name of the node, falls back to the ID
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Average travel time over a slice `[start, end)` of the day, in seconds since midnight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub start: Seconds,
    pub end: Seconds,
    pub avg_time: Seconds,
}

impl TimeBucket {
    pub fn contains(&self, second_of_day: Seconds) -> bool {
        self.start <= second_of_day && second_of_day < self.end
    }
}

/// Directed road segment
#[derive(Debug, Clone)]
pub struct RoadEdge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    /// Free-flow travel time in seconds, used outside of any bucket
    pub base_time: Seconds,
    /// Length in meters
    pub distance: f64,
    /// Time-of-day profile, searched in stored order
    pub time_buckets: Vec<TimeBucket>,
    /// Cumulative live traffic factor
    pub multiplier: f64,
    /// Absolute travel time overriding buckets and base time
    pub override_time: Option<Seconds>,
    /// Whether emergency vehicles may use this segment
    pub emergency_allowed: bool,
}

impl RoadEdge {
    pub(crate) fn new(
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        base_time: Seconds,
        distance: f64,
        time_buckets: Vec<TimeBucket>,
    ) -> Self {
        Self {
            id,
            from,
            to,
            base_time,
            distance,
            time_buckets,
            multiplier: 1.0,
            override_time: None,
            emergency_allowed: true,
        }
    }

    /// Travel time when entering the edge at `at`.
    ///
    /// An override always wins. Otherwise the first bucket covering the time
    /// of day is scaled by the multiplier, and instants falling in a gap
    /// between buckets use the base time.
    pub fn travel_time(&self, at: Timestamp) -> Seconds {
        if let Some(override_time) = self.override_time {
            return override_time;
        }

        let second_of_day = seconds_of_day(at);
        let time = self
            .time_buckets
            .iter()
            .find(|bucket| bucket.contains(second_of_day))
            .map_or(self.base_time, |bucket| bucket.avg_time);

        time * self.multiplier
    }
}
