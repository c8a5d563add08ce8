//! Bounded Cache
//!
//! Fixed-capacity key → value cache with least-recently-used eviction.
//!
//! Entries live in a slab of nodes linked into a recency list by index, and a
//! hash map points each key at its node, so `get`, `set` and `remove` are all
//! O(1). The cache never fails: it is an accelerator, not the system of record.

use std::collections::HashMap;

use bytes::Bytes;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node {
    key: String,
    value: Bytes,
    /// Towards the most recently used end
    prev: usize,
    /// Towards the least recently used end
    next: usize,
}

/// LRU cache with a hard entry limit
#[derive(Debug)]
pub struct BoundedCache {
    capacity: usize,
    map: HashMap<String, usize>,
    nodes: Vec<Node>,
    /// Slots of removed nodes, reused before growing `nodes`
    free: Vec<usize>,
    /// Most recently used
    head: usize,
    /// Least recently used, evicted first
    tail: usize,
}

impl BoundedCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Look up `key`, marking it most recently used
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        Some(self.nodes[idx].value.clone())
    }

    /// Insert or replace `key`, evicting the least recently used entry when full
    pub fn set(&mut self, key: &str, value: Bytes) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&idx) = self.map.get(key) {
            self.nodes[idx].value = value;
            self.move_to_front(idx);
            return;
        }

        if self.map.len() >= self.capacity {
            self.evict();
        }

        let node = Node {
            key: key.to_string(),
            value,
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.push_front(idx);
        self.map.insert(key.to_string(), idx);
    }

    /// Drop `key`, returning its value if it was cached
    pub fn remove(&mut self, key: &str) -> Option<Bytes> {
        let idx = self.map.remove(key)?;
        self.detach(idx);
        self.free.push(idx);

        let node = &mut self.nodes[idx];
        node.key = String::new();
        Some(std::mem::take(&mut node.value))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // =========================================================================
    // Recency list
    // =========================================================================

    fn evict(&mut self) {
        if self.tail == NIL {
            return;
        }
        let key = std::mem::take(&mut self.nodes[self.tail].key);
        self.remove(&key);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.detach(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}
