use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sirena_core::{RoadGraph, RoutingConfig, RoutingService};
use sirena_server::{ServerConfig, app};
use tower::ServiceExt;

/// Depot (1) -> 2 -> Clinic (3) takes 20 s, the bypass over 4 takes 24 s
fn test_app() -> Router {
    let mut graph = RoadGraph::new();
    graph.add_named_node(1, 0.0, 0.0, Some("Depot".to_string()));
    graph.add_node(2, 0.0, 0.001);
    graph.add_named_node(3, 0.0, 0.002, Some("Clinic".to_string()));
    graph.add_node(4, 0.001, 0.001);
    graph.add_edge(1, 2, 10.0, 111.0, Vec::new()).unwrap();
    graph.add_edge(2, 3, 10.0, 111.0, Vec::new()).unwrap();
    graph.add_edge(1, 4, 12.0, 157.0, Vec::new()).unwrap();
    graph.add_edge(4, 3, 12.0, 157.0, Vec::new()).unwrap();

    let service = Arc::new(RoutingService::new(graph, RoutingConfig::default()));
    app(service, &ServerConfig::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn route_request() -> Value {
    json!({
        "ambulance_id": "amb-1",
        "current_location": {"lat": 0.0, "lon": 0.0},
        "destination": {"lat": 0.0, "lon": 0.0021},
        "departure_time": "2025-10-14T10:00:00Z"
    })
}

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app();

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"], 4);
    assert_eq!(body["edges"], 4);
    assert_eq!(body["tracked_vehicles"], 0);
}

#[tokio::test]
async fn test_route_ambulance() {
    let app = test_app();
    let (status, body) = send(&app, post_json("/route_ambulance", &route_request())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ambulance_id"], "amb-1");
    assert_eq!(body["path"], json!([1, 2, 3]));
    assert_eq!(body["departure"], "2025-10-14T10:00:00Z");
    assert_eq!(body["estimated_arrival"], "2025-10-14T10:00:20Z");
    assert_eq!(body["total_time_minutes"], 0.3);
    assert_eq!(body["segments"].as_array().unwrap().len(), 2);
    assert_eq!(body["segments"][1]["eta_start"], "2025-10-14T10:00:10Z");
    assert_eq!(body["segments"][1]["eta_end"], "2025-10-14T10:00:20Z");
    assert_eq!(
        body["route_steps"][0],
        "Go from (0,0) to (0,0.001) in 0 min"
    );

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["tracked_vehicles"], 1);
}

#[tokio::test]
async fn test_route_ambulance_rejects_bad_coordinates() {
    let app = test_app();
    let mut request = route_request();
    request["destination"]["lat"] = json!(120.0);

    let (status, body) = send(&app, post_json("/route_ambulance", &request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("destination"));
}

#[tokio::test]
async fn test_no_route_is_not_found() {
    let app = test_app();
    // Nothing leaves the clinic
    let request = json!({
        "current_location": {"lat": 0.0, "lon": 0.002},
        "destination": {"lat": 0.0, "lon": 0.0}
    });
    let (status, _) = send(&app, post_json("/route_ambulance", &request)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traffic_snapshot_counts_updates() {
    let app = test_app();
    let snapshot = json!({
        "timestamp": "2025-10-14T10:00:00Z",
        "edge_updates": [
            {"edge_id": 2, "multiplier": 1.5},
            {"edge_id": 99, "multiplier": 2.0},
            {"edge_id": 3, "absolute_time": 600.0}
        ]
    });
    let (status, body) = send(&app, post_json("/traffic_snapshot", &snapshot)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "applied": 2, "ignored": 1}));

    // 10 s + 1.5 * 10 s
    let (_, route) = send(&app, post_json("/route_ambulance", &route_request())).await;
    assert_eq!(route["estimated_arrival"], "2025-10-14T10:00:25Z");
}

#[tokio::test]
async fn test_reroute_check_flags_slowdown() {
    let app = test_app();
    send(&app, post_json("/route_ambulance", &route_request())).await;

    let snapshot = json!({
        "timestamp": "2025-10-14T10:00:05Z",
        "edge_updates": [{"edge_id": 2, "multiplier": 3.0}]
    });
    send(&app, post_json("/traffic_snapshot", &snapshot)).await;

    let check = json!({"ambulance_id": "amb-1", "current_time": "2025-10-14T10:00:05Z"});
    let (status, body) = send(&app, post_json("/reroute_check", &check)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ambulance_id"], "amb-1");
    assert_eq!(body["reroute_recommended"], true);
    assert_eq!(body["reason"], "traffic_slowdown");
    assert_eq!(body["reason_text"], "traffic slowdown detected");
    assert_eq!(body["current_node"], 2);
    assert_eq!(body["slowdown"]["edge_id"], 2);
    assert_eq!(body["old_path"], json!(["2", "Clinic"]));
    assert_eq!(body["new_path"], json!(["2", "Clinic"]));
}

#[tokio::test]
async fn test_reroute_check_unknown_vehicle() {
    let app = test_app();
    let check = json!({"ambulance_id": "amb-9", "current_time": "2025-10-14T10:00:00Z"});
    let (status, body) = send(&app, post_json("/reroute_check", &check)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("amb-9"));
}

#[tokio::test]
async fn test_route_geojson() {
    let app = test_app();
    send(&app, post_json("/route_ambulance", &route_request())).await;

    let response = app
        .clone()
        .oneshot(get("/vehicles/amb-1/route.geojson"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/geo+json"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(body["features"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, get("/vehicles/amb-2/route.geojson")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
