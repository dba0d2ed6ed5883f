use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

use crate::{Seconds, Timestamp};

#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    /// Arrival plus the potential of the node
    pub(super) key: Seconds,
    pub(super) arrival: Timestamp,
    pub(super) node: NodeIndex,
}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by key (reversed from standard Rust BinaryHeap)
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}
