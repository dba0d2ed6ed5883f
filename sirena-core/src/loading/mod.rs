//! This module is responsible for loading road network descriptions
//! (JSON document or CSV tables) and building the road graph.

mod builder;
pub mod de;
pub mod raw_types;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;

pub use builder::build_road_graph;
pub use raw_types::NetworkDocument;

use crate::{Error, RoadGraph};
use raw_types::{CsvEdge, RawNode};

/// Loads a network from a JSON file, or from a directory holding
/// `nodes.csv` and `edges.csv`
///
/// # Errors
///
/// Returns an error if the files can not be read or describe an invalid network
pub fn load_network(path: &Path) -> Result<RoadGraph, Error> {
    if path.is_dir() {
        load_network_csv(path)
    } else {
        load_network_json(path)
    }
}

pub fn load_network_json(path: &Path) -> Result<RoadGraph, Error> {
    info!("Loading road network from {}", path.display());
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open network file '{}': {}", path.display(), e),
        )
    })?;
    let document: NetworkDocument = serde_json::from_reader(BufReader::new(file))?;
    build_road_graph(document)
}

pub fn load_network_csv(dir: &Path) -> Result<RoadGraph, Error> {
    info!("Loading road network tables from {}", dir.display());
    let nodes: Vec<RawNode> = de::deserialize_csv_file(&dir.join("nodes.csv"))?;
    let edges: Vec<CsvEdge> = de::deserialize_csv_file(&dir.join("edges.csv"))?;
    builder::build_from_parts(nodes, edges.into_iter().map(Into::into).collect())
}
