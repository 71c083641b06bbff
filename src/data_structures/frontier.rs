use std::collections::VecDeque;

use crate::data_structures::OpenList;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;

/// A first-in first-out frontier.
///
/// Nodes come out in the order they went in, which is what makes a search
/// over it breadth-first.
#[derive(Clone, Debug, Default)]
pub struct Frontier {
    queue: VecDeque<SearchTreeIndex>,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn add_to_bottom(&mut self, node: SearchTreeIndex) {
        self.queue.push_back(node);
    }

    #[inline(always)]
    pub fn remove_top(&mut self) -> Option<SearchTreeIndex> {
        self.queue.pop_front()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = SearchTreeIndex> {
        self.queue.iter().copied()
    }
}

impl OpenList for Frontier {
    fn push(&mut self, _tree: &SearchTree, node: SearchTreeIndex) {
        self.add_to_bottom(node);
    }
    fn pop(&mut self) -> Option<SearchTreeIndex> {
        self.remove_top()
    }
    fn is_empty(&self) -> bool {
        Frontier::is_empty(self)
    }
    fn len(&self) -> usize {
        Frontier::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::StreetMap;

    fn star() -> (StreetMap, SearchTree, Vec<SearchTreeIndex>) {
        let mut b = StreetMap::builder();
        b.add_location("hub", 0.0, 0.0).unwrap();
        for name in ["n", "e", "s", "w"] {
            b.add_location(name, 1.0, 1.0).unwrap();
            b.add_road("hub", name, 1.0).unwrap();
        }
        let map = b.build();
        let mut tree = SearchTree::new();
        let root = tree.push_root(map.find_location("hub").unwrap());
        let children = tree.expand(&map, root).to_vec();
        (map, tree, children)
    }

    #[test]
    fn fifo_order() {
        let (_, _, children) = star();
        let mut frontier = Frontier::new();
        assert!(frontier.is_empty());
        assert_eq!(frontier.remove_top(), None);

        for &c in &children {
            frontier.add_to_bottom(c);
        }
        assert_eq!(frontier.len(), 4);
        for &c in &children {
            assert_eq!(frontier.remove_top(), Some(c));
        }
        assert!(frontier.is_empty());
    }

    #[test]
    fn open_list() {
        let (_, tree, children) = star();
        let mut frontier = Frontier::with_capacity(2);
        for &c in &children {
            OpenList::push(&mut frontier, &tree, c);
        }
        assert_eq!(OpenList::len(&frontier), 4);
        assert_eq!(frontier.iter().collect::<Vec<_>>(), children);

        assert_eq!(OpenList::pop(&mut frontier), Some(children[0]));
        frontier.clear();
        assert!(OpenList::is_empty(&frontier));
        assert_eq!(OpenList::pop(&mut frontier), None);
    }
}
