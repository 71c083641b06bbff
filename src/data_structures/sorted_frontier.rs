use std::fmt::Debug;

use derive_more::Display;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cost::TravelCost;
use crate::data_structures::IndexedOpenList;
use crate::data_structures::OpenList;
use crate::heap_primitives::index_children_end;
use crate::heap_primitives::index_first_child;
use crate::heap_primitives::index_parent;
use crate::heuristic::Heuristic;
use crate::map::LocationId;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::search::SearchTreeNode;

const HEAP_ARITY: usize = 4usize;
#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    index_parent::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_left(i: usize) -> usize {
    index_first_child::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_end(i: usize, len: usize) -> usize {
    index_children_end::<HEAP_ARITY>(i, len)
}

/// The scalar a `SortedFrontier` orders by.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum SortBy {
    /// Path cost so far.
    #[display("g")]
    G,
    /// Estimated remaining cost.
    #[display("h")]
    H,
    /// `g + h`.
    #[display("f")]
    F,
}

/// Computes the key a node is ranked by. Lower keys come out first.
pub trait Ranking: Debug {
    fn sort_by(&self) -> SortBy;
    fn key(&self, node: &SearchTreeNode) -> TravelCost;
}

/// Ranks by g.
#[derive(Copy, Clone, Debug, Default)]
pub struct ByPathCost;

impl Ranking for ByPathCost {
    fn sort_by(&self) -> SortBy {
        SortBy::G
    }
    #[inline(always)]
    fn key(&self, node: &SearchTreeNode) -> TravelCost {
        node.path_cost()
    }
}

/// Ranks by h.
#[derive(Clone, Debug)]
pub struct ByHeuristic<H: Heuristic>(pub H);

impl<H: Heuristic> Ranking for ByHeuristic<H> {
    fn sort_by(&self) -> SortBy {
        SortBy::H
    }
    #[inline(always)]
    fn key(&self, node: &SearchTreeNode) -> TravelCost {
        self.0.heuristic_value(node)
    }
}

/// Ranks by f = g + h.
#[derive(Clone, Debug)]
pub struct ByEstimatedTotal<H: Heuristic>(pub H);

impl<H: Heuristic> Ranking for ByEstimatedTotal<H> {
    fn sort_by(&self) -> SortBy {
        SortBy::F
    }
    #[inline(always)]
    fn key(&self, node: &SearchTreeNode) -> TravelCost {
        node.path_cost() + self.0.heuristic_value(node)
    }
}

/// The ranking tuple of a queued node.
///
/// Nodes with equal keys are ranked by insertion order, making the frontier
/// stable: ties come out first-in first-out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrontierRank {
    key: TravelCost,
    sequence: u64,
}

impl FrontierRank {
    pub fn key(&self) -> TravelCost {
        self.key
    }
}

/// A heap entry. Carries just enough to rank it and find its node.
#[derive(Debug)]
struct SortedFrontierEntry {
    rank: FrontierRank,
    node: SearchTreeIndex,
    location: LocationId,
}

/// A frontier handing nodes back in ascending key order.
///
/// Backed by a d-ary heap of `(FrontierRank, SearchTreeIndex)` plus two
/// indices,
/// - `positions`, the heap slot of every queued node, to remove arbitrary
///   nodes without a linear search.
/// - `by_location`, the queued nodes at each Location, to answer `contains`
///   and `find` without a linear search.
///
/// ```pseudocode
/// for (i, e) in self.heap.enumerate():
///   assert_eq(self.positions[e.node], i)
///   assert(e.node in self.by_location[e.location])
/// ```
pub struct SortedFrontier<R: Ranking> {
    ranking: R,
    heap: Vec<SortedFrontierEntry>,
    positions: FxHashMap<SearchTreeIndex, usize>,
    by_location: FxHashMap<LocationId, SmallVec<[SearchTreeIndex; 2]>>,
    next_sequence: u64,
}

impl<R: Ranking> SortedFrontier<R> {
    #[must_use]
    pub fn new(ranking: R) -> Self {
        Self {
            ranking,
            heap: Vec::with_capacity(256),
            positions: FxHashMap::default(),
            by_location: FxHashMap::default(),
            next_sequence: 0,
        }
    }

    pub fn ranking(&self) -> &R {
        &self.ranking
    }
    pub fn sort_by(&self) -> SortBy {
        self.ranking.sort_by()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.positions.clear();
        self.by_location.clear();
    }

    /// Queues a node keeping the frontier sorted.
    pub fn add_sorted(&mut self, tree: &SearchTree, node: SearchTreeIndex) {
        debug_assert!(
            !self.positions.contains_key(&node),
            "{node} is already queued"
        );

        let n = &tree[node];
        let rank = FrontierRank {
            key: self.ranking.key(n),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        let slot = self.heap.len();
        self.heap.push(SortedFrontierEntry {
            rank,
            node,
            location: n.location(),
        });
        self.positions.insert(node, slot);
        self.by_location.entry(n.location()).or_default().push(node);
        self.sift_up(slot);

        self.verify();
    }

    /// Queues several nodes, one at a time.
    pub fn add_all_sorted(
        &mut self,
        tree: &SearchTree,
        nodes: impl IntoIterator<Item = SearchTreeIndex>,
    ) {
        for node in nodes {
            self.add_sorted(tree, node);
        }
    }

    /// The lowest-ranked node, if any.
    pub fn peek(&self) -> Option<SearchTreeIndex> {
        self.heap.first().map(|e| e.node)
    }

    /// Removes and returns the lowest-ranked node.
    pub fn remove_top(&mut self) -> Option<SearchTreeIndex> {
        if self.heap.is_empty() {
            return None;
        }
        self.remove_at(0)
    }

    /// Whether a node at `location` is queued.
    pub fn contains(&self, location: LocationId) -> bool {
        self.by_location.contains_key(&location)
    }

    /// The best-ranked queued node at `location`.
    ///
    /// This is the node a scan over the frontier in sorted order would meet
    /// first.
    pub fn find(&self, location: LocationId) -> Option<SearchTreeIndex> {
        self.by_location
            .get(&location)?
            .iter()
            .copied()
            .min_by_key(|n| self.heap[self.positions[n]].rank)
    }

    /// The key a queued node was ranked with.
    pub fn key_of(&self, node: SearchTreeIndex) -> Option<TravelCost> {
        self.positions.get(&node).map(|&slot| self.heap[slot].rank.key)
    }

    /// Removes a specific queued node. Returns whether it was queued.
    pub fn remove(&mut self, node: SearchTreeIndex) -> bool {
        match self.positions.get(&node) {
            Some(&slot) => self.remove_at(slot).is_some(),
            None => false,
        }
    }

    /// Queued nodes in ascending rank.
    pub fn to_sorted_vec(&self) -> Vec<SearchTreeIndex> {
        let mut entries: Vec<&SortedFrontierEntry> = self.heap.iter().collect();
        entries.sort_by_key(|e| e.rank);
        entries.into_iter().map(|e| e.node).collect()
    }

    // Implementation details

    fn remove_at(&mut self, slot: usize) -> Option<SearchTreeIndex> {
        let last = self.heap.len().checked_sub(1)?;
        if slot != last {
            self.swap(slot, last);
        }
        let entry = self.heap.pop()?;

        self.positions.remove(&entry.node);
        if let Some(queued) = self.by_location.get_mut(&entry.location) {
            queued.retain(|n| *n != entry.node);
            if queued.is_empty() {
                self.by_location.remove(&entry.location);
            }
        }

        // The previous last entry now sits at `slot` and may be out of place
        // either way.
        if slot < self.heap.len() && self.sift_up(slot) == slot {
            self.sift_down(slot);
        }

        self.verify();
        Some(entry.node)
    }

    /// Raises an entry.
    /// Returns its new slot.
    fn sift_up(&mut self, mut slot: usize) -> usize {
        debug_assert!(slot < self.heap.len(), "Slot out of bounds");

        while slot > 0 {
            let parent = up(slot);
            if self.heap[parent].rank <= self.heap[slot].rank {
                break;
            }
            self.swap(parent, slot);
            slot = parent;
        }
        slot
    }

    /// Lowers an entry.
    /// Returns its new slot.
    fn sift_down(&mut self, mut slot: usize) -> usize {
        let len = self.heap.len();
        debug_assert!(slot < len, "Slot out of bounds");

        loop {
            let first = down_left(slot);
            if first >= len {
                break;
            }
            let mut best = first;
            for child in (first + 1)..down_end(slot, len) {
                if self.heap[child].rank < self.heap[best].rank {
                    best = child;
                }
            }

            if self.heap[slot].rank <= self.heap[best].rank {
                break;
            }
            self.swap(slot, best);
            slot = best;
        }
        slot
    }

    /// Swaps two entries, keeping `positions` in sync.
    #[inline(always)]
    fn swap(&mut self, l: usize, r: usize) {
        self.heap.swap(l, r);
        self.positions.insert(self.heap[l].node, l);
        self.positions.insert(self.heap[r].node, r);
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    fn verify(&self) {
        // All good... (hopefully)
    }
    #[cfg(feature = "verify")]
    fn verify(&self) {
        assert_eq!(self.heap.len(), self.positions.len());
        assert_eq!(
            self.heap.len(),
            self.by_location.values().map(|v| v.len()).sum::<usize>()
        );

        for (i, e) in self.heap.iter().enumerate() {
            assert_eq!(self.positions[&e.node], i, "Stale position for {}", e.node);
            assert!(self.by_location[&e.location].contains(&e.node));

            if i == 0 {
                continue;
            }
            let p = up(i);
            assert!(
                self.heap[p].rank <= self.heap[i].rank,
                "Entry[{p}]={:?} !<= child[{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }
}

impl<R: Ranking> OpenList for SortedFrontier<R> {
    fn push(&mut self, tree: &SearchTree, node: SearchTreeIndex) {
        self.add_sorted(tree, node);
    }
    fn pop(&mut self) -> Option<SearchTreeIndex> {
        self.remove_top()
    }
    fn is_empty(&self) -> bool {
        SortedFrontier::is_empty(self)
    }
    fn len(&self) -> usize {
        SortedFrontier::len(self)
    }
}

impl<R: Ranking> IndexedOpenList for SortedFrontier<R> {
    fn find(&self, location: LocationId) -> Option<SearchTreeIndex> {
        SortedFrontier::find(self, location)
    }
    fn remove(&mut self, node: SearchTreeIndex) -> bool {
        SortedFrontier::remove(self, node)
    }
}

impl<R: Ranking> std::fmt::Debug for SortedFrontier<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "SortedFrontier{{by {}; {} nodes}}",
            self.sort_by(),
            self.len()
        )
    }
}
