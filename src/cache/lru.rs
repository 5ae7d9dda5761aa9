//! LRU Tracker Module
//!
//! Implements Least Recently Used ordering as an arena-backed doubly linked list.

// == Constants ==
/// Sentinel index marking the absence of a neighbour.
const NIL: usize = usize::MAX;

// == Node ==
#[derive(Debug)]
struct Node<K> {
    /// `None` while the slot sits on the free list
    key: Option<K>,
    prev: usize,
    next: usize,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Nodes live in a `Vec` and link to each other by index:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Callers hold on to the slot index returned by [`push_front`](Self::push_front)
/// and use it to relocate or remove the node in O(1).
#[derive(Debug)]
pub struct LruTracker<K> {
    nodes: Vec<Node<K>>,
    head: usize,
    tail: usize,
    /// Reclaimed slots, reused before the arena grows
    free: Vec<usize>,
    len: usize,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LruTracker<K> {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: NIL,
            tail: NIL,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a key as the most recently used and returns its slot.
    pub fn push_front(&mut self, key: K) -> usize {
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot].key = Some(key);
                slot
            }
            None => {
                self.nodes.push(Node {
                    key: Some(key),
                    prev: NIL,
                    next: NIL,
                });
                self.nodes.len() - 1
            }
        };

        self.attach_front(slot);
        self.len += 1;
        slot
    }

    // == Move To Front ==
    /// Marks the node at `slot` as most recently used.
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == slot {
            return;
        }
        self.detach(slot);
        self.attach_front(slot);
    }

    // == Remove ==
    /// Unlinks the node at `slot`, recycles the slot and returns its key.
    ///
    /// Returns None if the slot is not currently linked.
    pub fn remove(&mut self, slot: usize) -> Option<K> {
        let key = self.nodes.get_mut(slot)?.key.take()?;
        self.detach(slot);
        self.free.push(slot);
        self.len -= 1;
        Some(key)
    }

    // == Pop Back ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn pop_back(&mut self) -> Option<K> {
        if self.tail == NIL {
            return None;
        }
        self.remove(self.tail)
    }

    // == Peek Back ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_back(&self) -> Option<&K> {
        self.nodes.get(self.tail).and_then(|node| node.key.as_ref())
    }

    // == Clear ==
    /// Drops every node and releases the arena.
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.free = Vec::new();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of tracked keys.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iter ==
    /// Iterates keys from most to least recently used.
    #[cfg(test)]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            tracker: self,
            cursor: self.head,
        }
    }

    /// Number of slots ever allocated, live or free.
    #[cfg(test)]
    pub(crate) fn capacity_slots(&self) -> usize {
        self.nodes.len()
    }

    /// Key stored at `slot`, if the slot is live.
    #[cfg(test)]
    pub(crate) fn key_at(&self, slot: usize) -> Option<&K> {
        self.nodes.get(slot).and_then(|node| node.key.as_ref())
    }

    // == Link Helpers ==
    fn attach_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[slot];
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head == NIL {
            self.tail = slot;
        } else {
            self.nodes[old_head].prev = slot;
        }
        self.head = slot;
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = {
            let node = &self.nodes[slot];
            (node.prev, node.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }

        let node = &mut self.nodes[slot];
        node.prev = NIL;
        node.next = NIL;
    }

    /// Walks the list in both directions and panics on any broken link.
    #[cfg(test)]
    pub(crate) fn assert_links(&self) {
        let mut forward = 0;
        let mut prev = NIL;
        let mut cursor = self.head;
        while cursor != NIL {
            let node = &self.nodes[cursor];
            assert!(node.key.is_some(), "linked slot {} has no key", cursor);
            assert_eq!(node.prev, prev, "back link of slot {} is stale", cursor);
            prev = cursor;
            cursor = node.next;
            forward += 1;
            assert!(forward <= self.nodes.len(), "cycle in recency list");
        }
        assert_eq!(prev, self.tail, "tail does not match last node");
        assert_eq!(forward, self.len, "forward walk disagrees with len");
        assert_eq!(
            self.len + self.free.len(),
            self.nodes.len(),
            "live and free slots do not cover the arena"
        );
        for &slot in &self.free {
            assert!(self.nodes[slot].key.is_none(), "free slot {} still has a key", slot);
        }
    }
}

// == Iterator ==
/// Iterator over tracked keys, most recently used first.
#[cfg(test)]
pub struct Iter<'a, K> {
    tracker: &'a LruTracker<K>,
    cursor: usize,
}

#[cfg(test)]
impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tracker.nodes.get(self.cursor)?;
        self.cursor = node.next;
        node.key.as_ref()
    }
}
