use derive_more::Display;
use nonmax::NonMaxU32;
use num_traits::Zero;
use smallvec::SmallVec;

use crate::cost::TravelCost;
use crate::map::LocationId;
use crate::map::Road;
use crate::map::RoadId;
use crate::map::StreetMap;

/// A reference to a `SearchTreeNode` within its `SearchTree`.
///
/// Backed by a `NonMaxU32` so `Option<SearchTreeIndex>` stays 4 bytes wide.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("#{}", _0.get())]
pub struct SearchTreeIndex(NonMaxU32);

impl SearchTreeIndex {
    #[inline(always)]
    fn from_usize(i: usize) -> Self {
        match u32::try_from(i).ok().and_then(NonMaxU32::new) {
            Some(i) => Self(i),
            None => panic!("SearchTree outgrew u32 indices ({i} nodes)"),
        }
    }
    #[inline(always)]
    pub fn as_usize(&self) -> usize {
        self.0.get() as usize
    }
}

pub type Children = SmallVec<[SearchTreeIndex; 4]>;

/// A node of the implicit search tree.
///
/// Each node is a partial path from the root to `location`, reached through
/// `parent` by taking a Road.
#[derive(Clone, Debug)]
pub struct SearchTreeNode {
    pub(crate) parent: Option<(SearchTreeIndex, RoadId)>,
    pub(crate) location: LocationId,
    pub(crate) g: TravelCost,
    pub(crate) depth: u32,
    /// Filled in by the first expansion.
    pub(crate) children: Option<Children>,
}

impl SearchTreeNode {
    fn new_root(location: LocationId) -> Self {
        Self {
            parent: None,
            location,
            g: TravelCost::zero(),
            depth: 0,
            children: None,
        }
    }

    fn new_child(parent: (SearchTreeIndex, &Self), road_id: RoadId, road: &Road) -> Self {
        let (parent_index, parent) = parent;
        debug_assert_eq!(road.from(), parent.location);
        Self {
            parent: Some((parent_index, road_id)),
            location: road.to(),
            g: parent.g + road.cost(),
            depth: parent.depth + 1,
            children: None,
        }
    }

    pub fn location(&self) -> LocationId {
        self.location
    }
    pub fn parent(&self) -> Option<SearchTreeIndex> {
        self.parent.map(|(p, _)| p)
    }
    /// The Road taken from the parent.
    pub fn road(&self) -> Option<RoadId> {
        self.parent.map(|(_, r)| r)
    }
    pub fn depth(&self) -> u32 {
        self.depth
    }
    /// The accumulated path cost, g.
    pub fn path_cost(&self) -> TravelCost {
        self.g
    }
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }
    pub fn children(&self) -> Option<&[SearchTreeIndex]> {
        self.children.as_deref()
    }
    #[inline(always)]
    pub fn is_at(&self, location: LocationId) -> bool {
        self.location == location
    }
}

/// All the nodes created during one search pass.
///
/// Nodes are only ever appended, so indices stay valid for the lifetime of
/// the tree and parent links naturally form a tree rooted at the first node.
#[derive(Clone, Default)]
pub struct SearchTree {
    nodes: Vec<SearchTreeNode>,
}

impl SearchTree {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn get(&self, index: SearchTreeIndex) -> Option<&SearchTreeNode> {
        self.nodes.get(index.as_usize())
    }

    #[inline(always)]
    fn push(&mut self, node: SearchTreeNode) -> SearchTreeIndex {
        let index = SearchTreeIndex::from_usize(self.nodes.len());
        self.nodes.push(node);
        index
    }

    pub fn push_root(&mut self, location: LocationId) -> SearchTreeIndex {
        self.push(SearchTreeNode::new_root(location))
    }

    /// Expands a node, creating one child per outgoing Road.
    ///
    /// Children follow the order of the Roads on the Location. Expanding an
    /// already expanded node returns the same children.
    pub fn expand(&mut self, map: &StreetMap, index: SearchTreeIndex) -> &[SearchTreeIndex] {
        if self[index].children.is_none() {
            let location = self[index].location;
            let mut children = Children::with_capacity(map[location].roads().len());
            for (road_id, road) in map.outgoing(location) {
                let child = SearchTreeNode::new_child((index, &self[index]), road_id, road);
                children.push(self.push(child));
            }
            self[index].children = Some(children);
        }

        self[index].children.as_deref().unwrap_or_default()
    }

    /// Whether the node sits at the Location called `name`.
    pub fn is_destination(&self, map: &StreetMap, index: SearchTreeIndex, name: &str) -> bool {
        map[self[index].location].name() == name
    }

    /// Reconstructs the Route from the root to `index`.
    #[must_use]
    pub fn route(&self, mut index: SearchTreeIndex) -> Route {
        let goal = &self[index];
        let mut route = Route::new_at(goal.location);

        while let Some((parent_index, road)) = self[index].parent {
            route.append(self[parent_index].location, road);
            debug_assert!(index != parent_index);
            index = parent_index;
        }

        route.reverse();
        route.cost = goal.g;
        debug_assert_eq!(route.len(), goal.depth as usize);
        route
    }

    /// Iterates from `index` up to the root.
    pub fn ancestors(&self, index: SearchTreeIndex) -> impl Iterator<Item = SearchTreeIndex> {
        std::iter::successors(Some(index), |&i| self[i].parent())
    }
}

impl std::ops::Index<SearchTreeIndex> for SearchTree {
    type Output = SearchTreeNode;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.as_usize()]
    }
}

impl std::ops::IndexMut<SearchTreeIndex> for SearchTree {
    #[inline(always)]
    fn index_mut(&mut self, index: SearchTreeIndex) -> &mut SearchTreeNode {
        &mut self.nodes[index.as_usize()]
    }
}

impl std::fmt::Debug for SearchTree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

/// A sequence of Roads leading from `start` to `end`.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub start: LocationId,
    pub end: LocationId,
    pub cost: TravelCost,
    pub roads: Vec<RoadId>,
}

impl Route {
    #[inline(always)]
    pub fn new_at(location: LocationId) -> Self {
        Self {
            start: location,
            end: location,
            cost: TravelCost::zero(),
            roads: vec![],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.roads.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    #[inline(always)]
    pub fn append(&mut self, location: LocationId, road: RoadId) {
        self.roads.push(road);
        self.end = location;
    }

    /// Reverses the Route.
    ///
    /// Routes are naturally reconstructed from the goal, so they are built
    /// backwards and flipped once.
    pub fn reverse(&mut self) {
        (self.end, self.start) = (self.start, self.end);
        self.roads.reverse();
    }

    /// The visited Locations, `start` and `end` included.
    pub fn locations(&self, map: &StreetMap) -> Vec<LocationId> {
        std::iter::once(self.start)
            .chain(self.roads.iter().map(|&r| map[r].to()))
            .collect()
    }

    pub fn names<'m>(&self, map: &'m StreetMap) -> Vec<&'m str> {
        self.locations(map)
            .into_iter()
            .map(|l| map[l].name())
            .collect()
    }

    /// Whether every Road connects to the next and the cost adds up.
    pub fn is_valid(&self, map: &StreetMap) -> bool {
        let mut at = self.start;
        let mut cost = TravelCost::zero();
        for &r in &self.roads {
            let Some(road) = map.road(r) else {
                return false;
            };
            if road.from() != at {
                return false;
            }
            at = road.to();
            cost += road.cost();
        }
        at == self.end && (cost - self.cost).as_f64().abs() <= 1e-9
    }

    pub fn display<'a>(&'a self, map: &'a StreetMap) -> RouteDisplay<'a> {
        RouteDisplay { route: self, map }
    }
}

/// Helper to print a Route with the names of its Locations.
pub struct RouteDisplay<'a> {
    route: &'a Route,
    map: &'a StreetMap,
}

impl std::fmt::Display for RouteDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Route({}: {})",
            self.route.cost,
            self.route.names(self.map).join(" -> ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> StreetMap {
        let mut b = StreetMap::builder();
        b.add_location("A", 0.0, 0.0).unwrap();
        b.add_location("B", 1.0, 0.0).unwrap();
        b.add_location("C", 0.0, 1.0).unwrap();
        b.add_location("D", 1.0, 1.0).unwrap();
        b.add_road("A", "B", 1.0).unwrap();
        b.add_road("B", "D", 1.0).unwrap();
        b.add_road("A", "C", 5.0).unwrap();
        b.add_road("C", "D", 1.0).unwrap();
        b.build()
    }

    #[test]
    fn expand_bookkeeping() {
        let map = diamond();
        let mut tree = SearchTree::new();
        let root = tree.push_root(map.find_location("A").unwrap());
        assert_eq!(tree[root].depth(), 0);
        assert!(tree[root].path_cost().is_zero());

        let children = tree.expand(&map, root).to_vec();
        assert_eq!(children.len(), 2);
        for child in children.iter().copied() {
            let c = &tree[child];
            let road = &map[c.road().unwrap()];
            assert_eq!(c.parent(), Some(root));
            assert_eq!(c.depth(), tree[root].depth() + 1);
            assert_eq!(c.path_cost(), tree[root].path_cost() + road.cost());
            assert_eq!(road.to(), c.location());
        }

        // Children follow the road order on the Location.
        assert_eq!(map[tree[children[0]].location()].name(), "B");
        assert_eq!(map[tree[children[1]].location()].name(), "C");

        let grandchildren = tree.expand(&map, children[0]).to_vec();
        let d = &tree[grandchildren[0]];
        assert_eq!(d.depth(), 2);
        assert_eq!(d.path_cost(), TravelCost::new(2.0));
    }

    #[test]
    fn expand_is_computed_once() {
        let map = diamond();
        let mut tree = SearchTree::new();
        let root = tree.push_root(map.find_location("A").unwrap());

        assert!(!tree[root].is_expanded());
        let first = tree.expand(&map, root).to_vec();
        let len = tree.len();
        let second = tree.expand(&map, root).to_vec();
        assert_eq!(first, second);
        assert_eq!(tree.len(), len);
        assert!(tree[root].is_expanded());
    }

    #[test]
    fn expand_dead_end() {
        let map = diamond();
        let mut tree = SearchTree::new();
        let root = tree.push_root(map.find_location("D").unwrap());
        assert!(tree.expand(&map, root).is_empty());
        assert_eq!(tree[root].children(), Some(&[][..]));
    }

    #[test]
    fn is_destination() {
        let map = diamond();
        let mut tree = SearchTree::new();
        let root = tree.push_root(map.find_location("A").unwrap());
        assert!(tree.is_destination(&map, root, "A"));
        assert!(!tree.is_destination(&map, root, "D"));
    }

    #[test]
    fn route_reconstruction() {
        let map = diamond();
        let mut tree = SearchTree::new();
        let root = tree.push_root(map.find_location("A").unwrap());
        let c = tree.expand(&map, root)[1];
        let d = tree.expand(&map, c)[0];

        let route = tree.route(d);
        assert_eq!(route.names(&map), vec!["A", "C", "D"]);
        assert_eq!(route.cost, TravelCost::new(6.0));
        assert_eq!(route.len(), 2);
        assert!(route.is_valid(&map));
        assert_eq!(route.display(&map).to_string(), "Route($6: A -> C -> D)");
        assert_eq!(tree.ancestors(d).collect::<Vec<_>>(), vec![d, c, root]);

        let trivial = tree.route(root);
        assert!(trivial.is_empty());
        assert_eq!(trivial.start, trivial.end);
    }
}
