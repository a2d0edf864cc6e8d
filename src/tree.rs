//! Tree Utilities
//!
//! Parent/child views of the ticket cache and progress rollups over them.
//! The server does not guarantee an acyclic tree, so every walk here keeps
//! a visited set.

use std::collections::{HashMap, HashSet};

use crate::models::TicketKey;
use crate::tickets::TicketStore;
use crate::time::Progress;

/// Parent -> children adjacency. Roots (and tickets whose parent is
/// missing) are listed under `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subgraph {
    children: HashMap<Option<TicketKey>, Vec<TicketKey>>,
}

impl Subgraph {
    pub fn children(&self, parent: Option<TicketKey>) -> &[TicketKey] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[TicketKey] {
        self.children(None)
    }
}

/// Build the adjacency in one pass over the store (children ascending by key)
pub fn ticket_subgraph(store: &TicketStore) -> Subgraph {
    let mut children: HashMap<Option<TicketKey>, Vec<TicketKey>> = HashMap::new();
    for ticket in store.values() {
        let parent = ticket.parent.filter(|p| store.contains(*p));
        children.entry(parent).or_default().push(ticket.key);
    }
    Subgraph { children }
}

/// Every descendant of `key`, depth first
pub fn all_children(subgraph: &Subgraph, key: TicketKey) -> Vec<TicketKey> {
    let mut result = Vec::new();
    let mut seen = HashSet::from([key]);
    let mut stack: Vec<TicketKey> = subgraph.children(Some(key)).iter().rev().copied().collect();
    while let Some(next) = stack.pop() {
        if !seen.insert(next) {
            continue;
        }
        result.push(next);
        stack.extend(subgraph.children(Some(next)).iter().rev());
    }
    result
}

/// Would making `new_parent` the parent of `key` close a loop?
pub fn would_create_cycle(store: &TicketStore, key: TicketKey, new_parent: TicketKey) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(new_parent);
    while let Some(k) = current {
        if k == key {
            return true;
        }
        if !seen.insert(k) {
            return false;
        }
        current = store.get(k).and_then(|t| t.parent);
    }
    false
}

/// Tickets as (key, depth) pairs in depth-first display order.
/// Tickets only reachable through a cycle are appended at depth 0.
pub fn flatten_tree(store: &TicketStore) -> Vec<(TicketKey, usize)> {
    let subgraph = ticket_subgraph(store);

    fn collect(
        parent: Option<TicketKey>,
        depth: usize,
        subgraph: &Subgraph,
        seen: &mut HashSet<TicketKey>,
        result: &mut Vec<(TicketKey, usize)>,
    ) {
        for key in subgraph.children(parent) {
            if !seen.insert(*key) {
                continue;
            }
            result.push((*key, depth));
            collect(Some(*key), depth + 1, subgraph, seen, result);
        }
    }

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    collect(None, 0, &subgraph, &mut seen, &mut result);
    for ticket in store.values() {
        if !seen.contains(&ticket.key) {
            seen.insert(ticket.key);
            result.push((ticket.key, 0));
            collect(Some(ticket.key), 1, &subgraph, &mut seen, &mut result);
        }
    }
    result
}

/// Per-render-pass memo of rolled-up progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressCache {
    memo: HashMap<TicketKey, Progress>,
    visiting: HashSet<TicketKey>,
}

impl ProgressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll up every ticket once
    pub fn compute_all(store: &TicketStore) -> Self {
        let subgraph = ticket_subgraph(store);
        let mut cache = Self::new();
        for key in store.tickets.keys() {
            ticket_progress(store, &subgraph, *key, &mut cache);
        }
        cache
    }

    /// Memoized rollup, zero for unknown tickets
    pub fn get(&self, key: TicketKey) -> Progress {
        self.memo.get(&key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }
}

/// The ticket's own time
pub fn own_progress(store: &TicketStore, key: TicketKey) -> Progress {
    store.time.progress(key)
}

/// Own time plus every descendant's, memoized in `cache`
pub fn ticket_progress(
    store: &TicketStore,
    subgraph: &Subgraph,
    key: TicketKey,
    cache: &mut ProgressCache,
) -> Progress {
    if let Some(done) = cache.memo.get(&key) {
        return *done;
    }
    if !cache.visiting.insert(key) {
        // Back edge of a cycle
        return Progress::default();
    }
    let mut total = own_progress(store, key);
    for child in subgraph.children(Some(key)) {
        total += ticket_progress(store, subgraph, *child, cache);
    }
    cache.visiting.remove(&key);
    cache.memo.insert(key, total);
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::tests::{store_of, ticket};

    fn sample() -> TicketStore {
        let mut store = store_of(vec![
            ticket(1, None, 3, 0.0),    // Root 1
            ticket(2, None, 3, 1.0),    // Root 2
            ticket(3, Some(1), 3, 0.0), // Child of 1
            ticket(4, Some(1), 3, 1.0), // Child of 1
            ticket(5, Some(3), 3, 0.0), // Child of 3 (grandchild of 1)
        ]);
        store.time.add(1, 10, 100, 10);
        store.time.add(3, 10, 50, 50);
        store.time.add(5, 11, 200, 20);
        store.time.add(5, 10, 0, 5);
        store
    }

    #[test]
    fn test_subgraph() {
        let store = sample();
        let sub = ticket_subgraph(&store);
        assert_eq!(sub.roots(), &[1, 2]);
        assert_eq!(sub.children(Some(1)), &[3, 4]);
        assert!(sub.children(Some(4)).is_empty());
    }

    #[test]
    fn test_dangling_parent_is_root() {
        let store = store_of(vec![ticket(1, None, 3, 0.0), ticket(2, Some(42), 3, 0.0)]);
        assert_eq!(ticket_subgraph(&store).roots(), &[1, 2]);
    }

    #[test]
    fn test_all_children() {
        let store = sample();
        let sub = ticket_subgraph(&store);
        assert_eq!(all_children(&sub, 1), vec![3, 5, 4]);
        assert!(all_children(&sub, 2).is_empty());
    }

    #[test]
    fn test_flatten_tree() {
        let tree = flatten_tree(&sample());
        // 1 (depth 0), 3 (depth 1), 5 (depth 2), 4 (depth 1), 2 (depth 0)
        assert_eq!(tree, vec![(1, 0), (3, 1), (5, 2), (4, 1), (2, 0)]);
    }

    #[test]
    fn test_flatten_tree_includes_cycles() {
        let store = store_of(vec![
            ticket(1, None, 3, 0.0),
            ticket(2, Some(3), 3, 0.0),
            ticket(3, Some(2), 3, 0.0),
        ]);
        let tree = flatten_tree(&store);
        assert_eq!(tree, vec![(1, 0), (2, 0), (3, 1)]);
    }

    #[test]
    fn test_would_create_cycle() {
        let store = sample();
        assert!(would_create_cycle(&store, 1, 5));
        assert!(would_create_cycle(&store, 3, 3));
        assert!(!would_create_cycle(&store, 3, 4));
        assert!(!would_create_cycle(&store, 2, 5));
    }

    #[test]
    fn test_progress_rolls_up_descendants() {
        let store = sample();
        let cache = ProgressCache::compute_all(&store);
        assert_eq!(cache.get(5), Progress { spent: 25, estimate: 200 });
        assert_eq!(cache.get(3), Progress { spent: 75, estimate: 250 });
        assert_eq!(cache.get(1), Progress { spent: 85, estimate: 350 });
        assert_eq!(cache.get(2), Progress::default());
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_progress_reuses_memo() {
        let store = sample();
        let sub = ticket_subgraph(&store);
        let mut cache = ProgressCache::new();
        ticket_progress(&store, &sub, 3, &mut cache);
        assert_eq!(cache.len(), 2);
        // Subtree of 3 is already known; only 1 and 4 are new
        ticket_progress(&store, &sub, 1, &mut cache);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_progress_survives_cycle() {
        let mut store = store_of(vec![ticket(1, Some(2), 3, 0.0), ticket(2, Some(1), 3, 0.0)]);
        store.time.add(1, 1, 10, 1);
        store.time.add(2, 1, 20, 2);
        let cache = ProgressCache::compute_all(&store);
        // Neither is a root, so neither is reachable from one; each counts itself at least
        assert!(cache.get(1).estimate >= 10);
        assert!(cache.get(2).estimate >= 20);
    }
}
