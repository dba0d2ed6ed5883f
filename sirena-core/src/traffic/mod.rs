//! Live traffic updates applied to road edges in place.
//!
//! Traffic feeds may reference edges the network does not model (yet), so an
//! update for an unknown edge is dropped and reported as
//! [`UpdateOutcome::Ignored`] instead of failing the whole batch.
//!
//! Multiplier updates compound: applying the same update twice doubles its
//! effect. Deduplicating repeated feed messages is up to the caller.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{EdgeId, RoadGraph, Seconds};

/// Single traffic event for one edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeUpdate {
    pub edge_id: EdgeId,
    /// Factor multiplied into the running multiplier of the edge
    #[serde(default)]
    pub multiplier: Option<f64>,
    /// Absolute travel time replacing every other cost of the edge
    #[serde(default)]
    pub absolute_time: Option<Seconds>,
    /// Drops a previously set absolute time, e.g. when a closed road reopens
    #[serde(default)]
    pub clear_override: bool,
}

impl EdgeUpdate {
    pub fn multiplier(edge_id: EdgeId, multiplier: f64) -> Self {
        Self {
            edge_id,
            multiplier: Some(multiplier),
            absolute_time: None,
            clear_override: false,
        }
    }

    pub fn absolute(edge_id: EdgeId, absolute_time: Seconds) -> Self {
        Self {
            edge_id,
            multiplier: None,
            absolute_time: Some(absolute_time),
            clear_override: false,
        }
    }
}

/// Batch of traffic events observed at the same instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub timestamp: DateTime<Utc>,
    pub edge_updates: Vec<EdgeUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Edge is not part of the network
    Ignored,
    /// Multiplier or absolute time is negative or not a number
    Rejected,
}

impl UpdateOutcome {
    pub fn is_applied(self) -> bool {
        self == UpdateOutcome::Applied
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub applied: usize,
    pub ignored: usize,
}

/// Applies one traffic event.
///
/// Multiplier and absolute time are written through a single mutable borrow
/// of the edge, so a reader holding the graph never sees one without the other.
pub fn apply_update(graph: &mut RoadGraph, update: &EdgeUpdate) -> UpdateOutcome {
    if !is_valid_factor(update.multiplier) || !is_valid_factor(update.absolute_time) {
        warn!(
            "Rejected traffic update for edge {}: multiplier {:?}, absolute time {:?}",
            update.edge_id, update.multiplier, update.absolute_time
        );
        return UpdateOutcome::Rejected;
    }

    let Some(edge) = graph.edge_mut(update.edge_id) else {
        debug!("Ignoring traffic update for unknown edge {}", update.edge_id);
        return UpdateOutcome::Ignored;
    };

    if let Some(multiplier) = update.multiplier {
        edge.multiplier *= multiplier;
    }
    if update.clear_override {
        edge.override_time = None;
    }
    if let Some(absolute_time) = update.absolute_time {
        edge.override_time = Some(absolute_time);
    }

    debug!(
        "Edge {} now has multiplier {} and override {:?}",
        edge.id, edge.multiplier, edge.override_time
    );
    UpdateOutcome::Applied
}

/// Applies every event of a snapshot in order
pub fn apply_snapshot(graph: &mut RoadGraph, snapshot: &TrafficSnapshot) -> UpdateSummary {
    let summary = snapshot
        .edge_updates
        .iter()
        .fold(UpdateSummary::default(), |mut summary, update| {
            if apply_update(graph, update).is_applied() {
                summary.applied += 1;
            } else {
                summary.ignored += 1;
            }
            summary
        });

    debug!(
        "Traffic snapshot at {}: {} applied, {} ignored",
        snapshot.timestamp, summary.applied, summary.ignored
    );
    summary
}

fn is_valid_factor(value: Option<f64>) -> bool {
    value.is_none_or(|v| v.is_finite() && v >= 0.0)
}
