use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::{DateTime, SecondsFormat, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sirena_core::reroute::TimeBreakdown;
use sirena_core::time::from_timestamp;
use sirena_core::{
    EdgeId, NodeId, RerouteDecision, RoadGraph, RoutePlan, Timestamp, TrafficSnapshot,
    UpdateSummary,
};
use tracing::info;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    fn to_point(self, field: &str) -> Result<Point<f64>, ApiError> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ApiError::BadRequest(format!(
                "{field} ({}, {}) is not a valid coordinate",
                self.lat, self.lon
            )));
        }
        Ok(Point::new(self.lon, self.lat))
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub ambulance_id: Option<String>,
    pub current_location: LatLon,
    pub destination: LatLon,
    /// Defaults to now
    pub departure_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub edge_id: EdgeId,
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub eta_start: String,
    pub eta_end: String,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub ambulance_id: Option<String>,
    pub departure: String,
    pub estimated_arrival: String,
    pub total_time_minutes: f64,
    pub path: Vec<NodeId>,
    pub segments: Vec<SegmentResponse>,
    pub route_steps: Vec<String>,
}

impl RouteResponse {
    fn new(ambulance_id: Option<String>, plan: &RoutePlan, graph: &RoadGraph) -> Result<Self, ApiError> {
        let segments = plan
            .segments
            .iter()
            .map(|segment| {
                Ok(SegmentResponse {
                    edge_id: segment.edge_id,
                    start_node: segment.from,
                    end_node: segment.to,
                    eta_start: rfc3339(segment.departure)?,
                    eta_end: rfc3339(segment.arrival)?,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(Self {
            ambulance_id,
            departure: rfc3339(plan.departure)?,
            estimated_arrival: rfc3339(plan.arrival)?,
            total_time_minutes: TimeBreakdown::from_seconds(plan.travel_time()).minutes,
            path: plan.path.clone(),
            segments,
            route_steps: route_steps(plan, graph),
        })
    }
}

/// "Go from (lat,lon) to (lat,lon) in N min" per segment, whole minutes rounded down
fn route_steps(plan: &RoutePlan, graph: &RoadGraph) -> Vec<String> {
    plan.segments
        .iter()
        .filter_map(|segment| {
            let from = graph.node(segment.from)?;
            let to = graph.node(segment.to)?;
            Some(format!(
                "Go from ({},{}) to ({},{}) in {} min",
                from.lat(),
                from.lon(),
                to.lat(),
                to.lon(),
                (segment.duration() / 60.0).floor()
            ))
        })
        .collect()
}

fn rfc3339(timestamp: Timestamp) -> Result<String, ApiError> {
    from_timestamp(timestamp)
        .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| ApiError::Internal(format!("timestamp {timestamp} out of range")))
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: UpdateSummary,
}

#[derive(Debug, Deserialize)]
pub struct RerouteRequest {
    pub ambulance_id: String,
    /// Defaults to now
    pub current_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RerouteResponse {
    pub ambulance_id: String,
    #[serde(flatten)]
    pub decision: RerouteDecision,
    pub reason_text: &'static str,
    /// e.g. "A -> B -> D -> E (8.3 min)"
    pub old_route: String,
    pub new_route: Option<String>,
}

impl RerouteResponse {
    fn new(ambulance_id: String, decision: RerouteDecision) -> Self {
        let old_route = format!(
            "{} ({:.1} min)",
            decision.old_path.join(" -> "),
            decision.old_remaining.minutes
        );
        let new_route = (!decision.new_path.is_empty()).then(|| {
            format!(
                "{} ({:.1} min)",
                decision.new_path.join(" -> "),
                decision.new_remaining.minutes
            )
        });
        Self {
            ambulance_id,
            reason_text: decision.reason_text(),
            decision,
            old_route,
            new_route,
        }
    }
}

/// Runs CPU-bound routing work off the async workers
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Emergency vehicle routing API is running" }))
}

pub async fn health(State(service): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (nodes, edges) = {
        let graph = service.read_graph()?;
        (graph.node_count(), graph.edge_count())
    };
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "nodes": nodes,
        "edges": edges,
        "tracked_vehicles": service.tracker().len()?,
    })))
}

pub async fn route_ambulance(
    State(service): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let source = request.current_location.to_point("current_location")?;
    let destination = request.destination.to_point("destination")?;

    let response = blocking(move || {
        let plan = service
            .compute_route(
                source,
                destination,
                request.departure_time,
                request.ambulance_id.as_deref(),
            )?
            .ok_or(ApiError::NoRoute)?;
        let graph = service.read_graph()?;
        RouteResponse::new(request.ambulance_id, &plan, &graph)
    })
    .await?;

    info!(
        ambulance_id = ?response.ambulance_id,
        minutes = response.total_time_minutes,
        "Route computed"
    );
    Ok(Json(response))
}

pub async fn traffic_snapshot(
    State(service): State<AppState>,
    Json(snapshot): Json<TrafficSnapshot>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let summary = blocking(move || Ok(service.apply_traffic_snapshot(&snapshot)?)).await?;
    info!(
        applied = summary.applied,
        ignored = summary.ignored,
        "Traffic snapshot applied"
    );
    Ok(Json(SnapshotResponse {
        status: "ok",
        summary,
    }))
}

pub async fn reroute_check(
    State(service): State<AppState>,
    Json(request): Json<RerouteRequest>,
) -> Result<Json<RerouteResponse>, ApiError> {
    let at = request.current_time.unwrap_or_else(Utc::now);
    let vehicle_id = request.ambulance_id.clone();
    let decision = blocking(move || Ok(service.check_reroute(&vehicle_id, at)?)).await?;
    info!(
        ambulance_id = %request.ambulance_id,
        reroute = decision.reroute_recommended,
        reason = decision.reason_text(),
        "Reroute checked"
    );
    Ok(Json(RerouteResponse::new(request.ambulance_id, decision)))
}

pub async fn route_geojson(
    State(service): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let collection: geojson::FeatureCollection = service.route_geojson(&vehicle_id)?;
    let body = serde_json::to_string(&collection).map_err(sirena_core::Error::from)?;
    Ok(([(header::CONTENT_TYPE, "application/geo+json")], body))
}
