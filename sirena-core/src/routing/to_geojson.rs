use geo::{LineString, line_string};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{RoutePlan, RouteSegment};
use crate::{Error, RoadGraph};

impl RoutePlan {
    /// Converts the route to a `GeoJSON` `FeatureCollection` with one
    /// `LineString` feature per segment.
    pub fn to_geojson(&self, graph: &RoadGraph) -> Result<FeatureCollection, Error> {
        let features = self
            .segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| create_segment_feature(graph, idx, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self, graph: &RoadGraph) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson(graph)?)
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn create_segment_feature(
    graph: &RoadGraph,
    segment_idx: usize,
    segment: &RouteSegment,
) -> Result<Feature, Error> {
    let from = graph
        .node(segment.from)
        .ok_or(Error::InvalidNode(segment.from))?;
    let to = graph
        .node(segment.to)
        .ok_or(Error::InvalidNode(segment.to))?;

    let line: LineString<f64> = line_string![
        (x: from.lon(), y: from.lat()),
        (x: to.lon(), y: to.lat()),
    ];
    let geometry = Geometry::new(GeoJsonValue::from(&line));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "segment_index": segment_idx,
            "edge_id": segment.edge_id,
            "from_name": from.label(),
            "to_name": to.label(),
            "departure_time": segment.departure,
            "arrival_time": segment.arrival,
            "duration": segment.duration(),
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
