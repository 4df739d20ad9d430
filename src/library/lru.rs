//! Fixed-capacity least-recently-used map.
//!
//! Entries live in a slab and are threaded on a doubly-linked recency list,
//! so lookup, promotion and eviction are O(1).

use ahash::RandomState;
use std::collections::HashMap;
use std::hash::Hash;

struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU map with a fixed capacity.
///
/// `head` is the most recently used entry, `tail` the next to be evicted.
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Vec<usize>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty cache. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free: Vec::new(),
            capacity,
        }
    }

    /// Look up a value and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Look up a value without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Insert or replace a value, marking it most recently used.
    ///
    /// Returns the evicted entry when the insert pushed the cache past
    /// capacity.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
            }
            self.move_to_front(idx);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        let idx = self.alloc();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: self.head,
        });
        if let Some(head) = self.head.and_then(|h| self.nodes[h].as_mut()) {
            head.prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.map.insert(key, idx);

        evicted
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.free.push(idx);
        self.nodes[idx].take().map(|node| node.value)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.map.len());
        let mut cursor = self.head;
        while let Some(node) = cursor.and_then(|i| self.nodes[i].as_ref()) {
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }
        if let Some(head) = self.head.and_then(|h| self.nodes[h].as_mut()) {
            head.prev = Some(idx);
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let Some((prev, next)) = self.nodes[idx].as_ref().map(|n| (n.prev, n.next)) else {
            return;
        };

        match prev.and_then(|p| self.nodes[p].as_mut()) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes[n].as_mut()) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        self.unlink(idx);
        self.free.push(idx);
        let node = self.nodes[idx].take()?;
        self.map.remove(&node.key);
        Some((node.key, node.value))
    }

    fn alloc(&mut self) -> usize {
        self.free.pop().unwrap_or_else(|| {
            self.nodes.push(None);
            self.nodes.len() - 1
        })
    }
}
