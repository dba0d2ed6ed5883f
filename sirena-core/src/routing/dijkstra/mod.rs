mod state;
pub mod td_dijkstra;

pub use td_dijkstra::td_dijkstra;
pub(crate) use td_dijkstra::time_dependent_search;
