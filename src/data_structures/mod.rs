//! Frontiers (open lists) for the search drivers.
//!
//! A frontier holds the generated but not yet expanded nodes of a search. The
//! only thing telling search strategies apart is the order in which their
//! frontier hands nodes back.

pub mod frontier;
pub mod sorted_frontier;

use crate::map::LocationId;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;

/// The operations the shared search loop needs from a frontier.
pub trait OpenList: std::fmt::Debug {
    /// Queues a node.
    fn push(&mut self, tree: &SearchTree, node: SearchTreeIndex);
    /// Takes the next node to expand.
    fn pop(&mut self) -> Option<SearchTreeIndex>;

    fn is_empty(&self) -> bool;
    fn len(&self) -> usize;
}

/// A frontier that can look up and drop queued nodes by Location.
///
/// Needed to replace a queued node when a cheaper way to its Location shows
/// up.
pub trait IndexedOpenList: OpenList {
    /// Finds the queued node at `location` that would be popped first.
    fn find(&self, location: LocationId) -> Option<SearchTreeIndex>;
    /// Drops a queued node. Returns whether it was queued.
    fn remove(&mut self, node: SearchTreeIndex) -> bool;
}
