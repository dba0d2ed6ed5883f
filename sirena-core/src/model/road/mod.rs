//! Road network model

pub mod components;
pub mod network;

pub use components::{RoadEdge, RoadNode, TimeBucket};
pub use network::{IndexedPoint, RoadGraph};
