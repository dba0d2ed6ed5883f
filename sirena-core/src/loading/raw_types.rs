use serde::Deserialize;

use crate::{NodeId, Seconds, TimeBucket};

/// Network description as read from a JSON document
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct NetworkDocument {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, deserialize_with = "super::de::deserialize_optional_name")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub base_time: Seconds,
    #[serde(default)]
    pub distance: f64,
    #[serde(default, deserialize_with = "super::de::deserialize_buckets")]
    pub time_buckets: Vec<TimeBucket>,
    #[serde(default = "default_emergency_allowed")]
    pub emergency_allowed: bool,
}

/// Row of `edges.csv`; time buckets are only supported in JSON
#[derive(Debug, Clone, Deserialize)]
pub struct CsvEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub base_time: Seconds,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub emergency_allowed: Option<bool>,
}

impl From<CsvEdge> for RawEdge {
    fn from(edge: CsvEdge) -> Self {
        RawEdge {
            from: edge.from,
            to: edge.to,
            base_time: edge.base_time,
            distance: edge.distance.unwrap_or_default(),
            time_buckets: Vec::new(),
            emergency_allowed: edge.emergency_allowed.unwrap_or(true),
        }
    }
}

fn default_emergency_allowed() -> bool {
    true
}
