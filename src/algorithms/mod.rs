//! Route search strategies over a `StreetMap`.
//!
//! Every strategy runs the same loop,
//! - pop the next node off the frontier,
//! - stop if it sits at the destination,
//! - expand it and queue its children, subject to a `DuplicatePolicy`.
//!
//! The frontier's discipline is what tells strategies apart.

pub mod breadth_first;
pub mod greedy;
pub mod uniform_cost;

use derive_more::Display;
use log::debug;
use log::trace;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::data_structures::IndexedOpenList;
use crate::data_structures::OpenList;
use crate::heuristic::HeuristicError;
use crate::map::LocationId;
use crate::map::MapError;
use crate::map::StreetMap;
use crate::search::Children;
use crate::search::Route;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::search::SearchTreeNode;

pub use breadth_first::BreadthFirstSearch;
pub use greedy::GreedySearch;
pub use uniform_cost::UniformCostSearch;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Strategy {
    #[display("breadth-first")]
    BreadthFirst,
    #[display("greedy")]
    Greedy,
    #[display("uniform-cost")]
    UniformCost,
}

/// How to decide the search starts at its destination.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StartCheck {
    /// The initial and destination names are equal.
    #[default]
    ByName,
    /// The initial and destination names are the very same string slice.
    ///
    /// Equal names held in different strings fall through to the search
    /// loop, which still recognises the root as the destination once it's
    /// popped, as long as the depth limit lets it run.
    SameInstance,
}

/// Knobs shared by all strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Nodes at depth `depth_limit - 1` or deeper are never popped after.
    pub depth_limit: u32,
    pub start_check: StartCheck,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth_limit: 1000,
            start_check: StartCheck::ByName,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_depth_limit(mut self, depth_limit: u32) -> Self {
        self.depth_limit = depth_limit;
        self
    }
    #[must_use]
    pub fn with_start_check(mut self, start_check: StartCheck) -> Self {
        self.start_check = start_check;
        self
    }
}

/// What to do with a child whose Location was already queued or expanded.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Queue every child.
    #[display("keep-all")]
    KeepAll,
    /// Queue only children at Locations never seen before.
    #[display("skip-explored")]
    SkipExplored,
    /// Like `SkipExplored`, but a child cheaper than the queued node at its
    /// Location takes that node's place.
    #[display("replace-cheaper")]
    ReplaceCheaper,
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Reached the destination at the given node.
    #[display("solved at {_0}")]
    Solved(SearchTreeIndex),
    /// Ran out of nodes to expand.
    #[display("exhausted")]
    Exhausted,
    /// Hit the depth limit with nodes still queued.
    #[display("depth-bounded")]
    DepthBounded,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Heuristic(#[from] HeuristicError),
    #[error("The heuristic estimates towards {found}, not {expected}")]
    HeuristicDestination { expected: String, found: String },
}

/// The named endpoints of a search, resolved on the map.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Endpoints<'m> {
    pub(crate) initial_name: &'m str,
    pub(crate) destination_name: &'m str,
    pub(crate) initial: LocationId,
    pub(crate) destination: LocationId,
}

impl<'m> Endpoints<'m> {
    pub(crate) fn resolve(
        map: &StreetMap,
        initial_name: &'m str,
        destination_name: &'m str,
    ) -> Result<Self, MapError> {
        Ok(Self {
            initial: map.find_location(initial_name)?,
            destination: map.find_location(destination_name)?,
            initial_name,
            destination_name,
        })
    }

    fn starts_at_destination(&self, check: StartCheck) -> bool {
        match check {
            StartCheck::ByName => self.initial_name == self.destination_name,
            StartCheck::SameInstance => std::ptr::eq(self.initial_name, self.destination_name),
        }
    }
}

/// The result of one search, owning the tree it grew.
#[derive(Debug)]
pub struct SearchRun {
    strategy: Strategy,
    policy: DuplicatePolicy,
    outcome: SearchOutcome,
    tree: SearchTree,
    expansions: usize,
    explored: usize,
    peak_frontier: usize,
}

impl SearchRun {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }
    pub fn outcome(&self) -> SearchOutcome {
        self.outcome
    }
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Solved(_))
    }

    /// Nodes expanded during the search.
    pub fn expansion_count(&self) -> usize {
        self.expansions
    }
    pub fn nodes_generated(&self) -> usize {
        self.tree.len()
    }
    pub fn peak_frontier(&self) -> usize {
        self.peak_frontier
    }

    pub fn goal_index(&self) -> Option<SearchTreeIndex> {
        match self.outcome {
            SearchOutcome::Solved(goal) => Some(goal),
            _ => None,
        }
    }
    pub fn goal(&self) -> Option<&SearchTreeNode> {
        self.goal_index().map(|goal| &self.tree[goal])
    }
    /// The route to the goal, from the initial Location.
    pub fn route(&self) -> Option<Route> {
        self.goal_index().map(|goal| self.tree.route(goal))
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn write_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "{} search stats ({}):", self.strategy, self.policy)?;
        writeln!(out, "  - Outcome:     {}", self.outcome)?;
        writeln!(
            out,
            "  - Expansions:  {}",
            self.expansions.separate_with_commas()
        )?;

        let s = size_of::<SearchTreeNode>();
        let l = self.tree.len();
        let c = self.tree.capacity();
        writeln!(
            out,
            "  - |Nodes|:     {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Nodes|*:    {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<SearchTreeIndex>();
        let l = self.peak_frontier;
        writeln!(
            out,
            "  - |Open|max:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        let s = size_of::<LocationId>();
        let l = self.explored;
        writeln!(
            out,
            "  - |Explored|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        Ok(())
    }

    pub fn print_stats(&self) -> std::io::Result<()> {
        self.write_stats(std::io::stdout().lock())
    }
}

/// The state of one search pass. Built fresh for every run.
pub(crate) struct SearchSession<'m, F: OpenList> {
    map: &'m StreetMap,
    tree: SearchTree,
    frontier: F,
    explored: FxHashSet<LocationId>,
    expansions: usize,
    peak_frontier: usize,
}

impl<'m, F: OpenList> SearchSession<'m, F> {
    fn new(map: &'m StreetMap, frontier: F) -> Self {
        Self {
            map,
            tree: SearchTree::with_capacity(1024),
            frontier,
            explored: FxHashSet::default(),
            expansions: 0,
            peak_frontier: 0,
        }
    }

    #[inline(always)]
    fn push(&mut self, node: SearchTreeIndex) {
        self.frontier.push(&self.tree, node);
        self.peak_frontier = self.peak_frontier.max(self.frontier.len());
    }

    fn finish(
        self,
        strategy: Strategy,
        policy: DuplicatePolicy,
        outcome: SearchOutcome,
    ) -> SearchRun {
        debug!(
            "{strategy} ({policy}) {outcome} after {} expansions, {} nodes",
            self.expansions,
            self.tree.len()
        );
        SearchRun {
            strategy,
            policy,
            outcome,
            tree: self.tree,
            expansions: self.expansions,
            explored: self.explored.len(),
            peak_frontier: self.peak_frontier,
        }
    }
}

/// Type-level counterpart of `DuplicatePolicy`, picked by each driver.
///
/// Only `ReplaceCheaper` needs to look up queued nodes, so only it asks for
/// an `IndexedOpenList`.
pub(crate) trait Policy<F: OpenList> {
    const KIND: DuplicatePolicy;

    /// Queues a freshly generated child, or drops it.
    fn admit(session: &mut SearchSession<'_, F>, child: SearchTreeIndex);
}

pub(crate) struct KeepAll;
pub(crate) struct SkipExplored;
pub(crate) struct ReplaceCheaper;

impl<F: OpenList> Policy<F> for KeepAll {
    const KIND: DuplicatePolicy = DuplicatePolicy::KeepAll;

    fn admit(session: &mut SearchSession<'_, F>, child: SearchTreeIndex) {
        session.push(child);
    }
}

impl<F: OpenList> Policy<F> for SkipExplored {
    const KIND: DuplicatePolicy = DuplicatePolicy::SkipExplored;

    fn admit(session: &mut SearchSession<'_, F>, child: SearchTreeIndex) {
        if session.explored.insert(session.tree[child].location()) {
            session.push(child);
        }
    }
}

impl<F: IndexedOpenList> Policy<F> for ReplaceCheaper {
    const KIND: DuplicatePolicy = DuplicatePolicy::ReplaceCheaper;

    fn admit(session: &mut SearchSession<'_, F>, child: SearchTreeIndex) {
        let location = session.tree[child].location();
        if session.explored.insert(location) {
            session.push(child);
            return;
        }
        // Explored and no longer queued means expanded. Drop it.
        let Some(queued) = session.frontier.find(location) else {
            return;
        };
        if session.tree[child].path_cost() < session.tree[queued].path_cost() {
            trace!(
                "Replacing {queued} at {} ({} -> {})",
                session.map[location].name(),
                session.tree[queued].path_cost(),
                session.tree[child].path_cost(),
            );
            session.frontier.remove(queued);
            session.push(child);
        }
    }
}

/// The loop every strategy runs.
pub(crate) fn run<F: OpenList, P: Policy<F>>(
    map: &StreetMap,
    endpoints: &Endpoints,
    config: &SearchConfig,
    strategy: Strategy,
    frontier: F,
) -> SearchRun {
    let policy = P::KIND;
    debug!(
        "{strategy} ({policy}) from {} to {} on {map}, depth limit {}",
        endpoints.initial_name, endpoints.destination_name, config.depth_limit
    );

    let mut session = SearchSession::new(map, frontier);
    let root = session.tree.push_root(endpoints.initial);
    if endpoints.starts_at_destination(config.start_check) {
        return session.finish(strategy, policy, SearchOutcome::Solved(root));
    }

    session.push(root);
    session.explored.insert(endpoints.initial);

    let bound = config.depth_limit.saturating_sub(1);
    // Depth of the last popped node.
    let mut depth = 0u32;

    let outcome = loop {
        if depth >= bound {
            break if session.frontier.is_empty() {
                SearchOutcome::Exhausted
            } else {
                SearchOutcome::DepthBounded
            };
        }
        let Some(node) = session.frontier.pop() else {
            break SearchOutcome::Exhausted;
        };
        depth = session.tree[node].depth();

        if session
            .tree
            .is_destination(map, node, endpoints.destination_name)
        {
            break SearchOutcome::Solved(node);
        }

        trace!(
            "Expanding {node} at {} (depth={}, g={})",
            map[session.tree[node].location()].name(),
            depth,
            session.tree[node].path_cost(),
        );
        let children = Children::from(session.tree.expand(map, node));
        session.expansions += 1;

        for child in children {
            P::admit(&mut session, child);
        }
    };

    session.finish(strategy, policy, outcome)
}
