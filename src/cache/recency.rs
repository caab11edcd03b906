//! Recency Index Module
//!
//! Tracks the order in which live keys were last touched, for LRU and MRU
//! eviction.
//!
//! Keys live in an arena-backed doubly-linked list addressed by slot indices,
//! with a side map from key to slot so that promotion and removal are O(1).

use std::collections::HashMap;
use std::hash::Hash;
use std::iter::FusedIterator;

/// Null link marker.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: usize,
    next: usize,
}

// == Recency Index ==
/// Ordered set of keys by last access.
///
/// - Front = Most recently touched
/// - Back = Least recently touched
#[derive(Debug)]
pub struct RecencyIndex<K> {
    /// Key -> arena slot
    slots: HashMap<K, usize>,
    /// Arena of list nodes, `None` marks a free slot
    nodes: Vec<Option<Node<K>>>,
    /// Recycled slots
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl<K> Default for RecencyIndex<K> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }
}

impl<K: Hash + Eq + Clone> RecencyIndex<K> {
    // == Constructor ==
    /// Creates a new empty recency index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Front ==
    /// Inserts a key as the most recently touched one.
    ///
    /// A key that is already indexed is moved to the front instead, so each
    /// key appears at most once.
    pub fn push_front(&mut self, key: K) {
        if self.move_to_front(&key) {
            return;
        }

        let node = Node {
            key: key.clone(),
            prev: NIL,
            next: self.head,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };

        if let Some(old_head) = self.node_mut(self.head) {
            old_head.prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
        self.slots.insert(key, slot);
    }

    // == Move To Front ==
    /// Marks a key as most recently touched.
    ///
    /// Returns `false` if the key is not indexed.
    pub fn move_to_front(&mut self, key: &K) -> bool {
        let Some(&slot) = self.slots.get(key) else {
            return false;
        };
        if slot != self.head {
            self.unlink(slot);
            self.link_front(slot);
        }
        true
    }

    // == Remove ==
    /// Removes a key from the index.
    ///
    /// Returns `false` if the key was not indexed.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(slot) = self.slots.remove(key) else {
            return false;
        };
        self.unlink(slot);
        self.nodes[slot] = None;
        self.free.push(slot);
        true
    }

    // == Front / Back ==
    /// Returns the most recently touched key.
    pub fn front(&self) -> Option<&K> {
        self.node(self.head).map(|node| &node.key)
    }

    /// Returns the least recently touched key.
    pub fn back(&self) -> Option<&K> {
        self.node(self.tail).map(|node| &node.key)
    }

    // == Clear ==
    /// Drops every key and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    // == Length ==
    /// Returns the number of indexed keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // == Contains ==
    /// Checks if a key is indexed.
    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    // == Iter ==
    /// Iterates keys from most to least recently touched.
    ///
    /// Use `.rev()` to walk from the least recently touched key.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            nodes: self.nodes.as_slice(),
            front: self.head,
            back: self.tail,
            remaining: self.slots.len(),
        }
    }

    fn node(&self, slot: usize) -> Option<&Node<K>> {
        self.nodes.get(slot).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut Node<K>> {
        self.nodes.get_mut(slot).and_then(Option::as_mut)
    }

    /// Detaches a node from its neighbours, leaving its own links stale.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.node(slot) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match self.node_mut(prev) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match self.node_mut(next) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(slot) {
            node.prev = NIL;
            node.next = old_head;
        }
        if let Some(head) = self.node_mut(old_head) {
            head.prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`RecencyIndex`].
#[derive(Debug, Clone)]
pub struct Iter<'a, K> {
    nodes: &'a [Option<Node<K>>],
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.nodes.get(self.front)?.as_ref()?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> DoubleEndedIterator for Iter<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.nodes.get(self.back)?.as_ref()?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.key)
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}
