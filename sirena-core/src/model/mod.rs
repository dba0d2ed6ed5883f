//! Data model for time-dependent road routing
//!
//! Contains the road network and its components.

pub mod road;

pub use road::components::{RoadEdge, RoadNode, TimeBucket};
pub use road::network::{IndexedPoint, RoadGraph};
