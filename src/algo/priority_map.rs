//! Keyed priority queue with decrease-key.
//!
//! `PriorityMap` holds at most one entity per *key*, where the key is
//! extracted from the entity by a caller-supplied function. This lets a
//! search queue rich frontier positions while deduplicating them by node.
//! Priorities are ordered by a caller-supplied comparator, so cost types
//! without a native `Ord` work too.
//!
//! Backing structure: an array binary heap plus a key → slot index, so
//! `put` can find and improve an existing entry in `O(log n)`.
//! Equal priorities pop in insertion order.

use std::cmp::Ordering;
use std::hash::Hash;

use hashbrown::HashMap;

/// An entity popped from the queue together with its priority.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<E, P> {
    pub entity: E,
    pub priority: P,
}

struct Slot<E, K, P> {
    entity: E,
    key: K,
    priority: P,
    seq: u64,
}

type KeyFn<E, K> = Box<dyn Fn(&E) -> K>;
type CompareFn<P> = Box<dyn Fn(&P, &P) -> Ordering>;

/// Min-priority queue keyed by a natural key of its entities.
pub struct PriorityMap<E, K, P> {
    heap: Vec<Slot<E, K, P>>,
    index: HashMap<K, usize>,
    key_of: KeyFn<E, K>,
    compare: CompareFn<P>,
    next_seq: u64,
}

impl<E, K, P> PriorityMap<E, K, P>
where
    K: Eq + Hash + Clone,
{
    /// Queue keyed by `key_of`, ordered by `compare` (smallest first).
    pub fn with_comparator(
        key_of: impl Fn(&E) -> K + 'static,
        compare: impl Fn(&P, &P) -> Ordering + 'static,
    ) -> Self {
        Self {
            heap: Vec::new(),
            index: HashMap::new(),
            key_of: Box::new(key_of),
            compare: Box::new(compare),
            next_seq: 0,
        }
    }

    /// Queue keyed by `key_of`, ordered by the priority's own `Ord`.
    pub fn with_natural_order(key_of: impl Fn(&E) -> K + 'static) -> Self
    where
        P: Ord + 'static,
    {
        Self::with_comparator(key_of, P::cmp)
    }

    /// Insert `entity`, or improve the priority of the entity already
    /// queued under the same key.
    ///
    /// Returns `false` (and drops `entity`) if the queued priority is
    /// already at least as good.
    pub fn put(&mut self, entity: E, priority: P) -> bool {
        let key = (self.key_of)(&entity);
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(&pos) = self.index.get(&key) {
            if (self.compare)(&priority, &self.heap[pos].priority) != Ordering::Less {
                return false;
            }
            let slot = &mut self.heap[pos];
            slot.entity = entity;
            slot.priority = priority;
            slot.seq = seq;
            self.sift_up(pos);
            return true;
        }

        let pos = self.heap.len();
        self.index.insert(key.clone(), pos);
        self.heap.push(Slot { entity, key, priority, seq });
        self.sift_up(pos);
        true
    }

    /// Remove and return the entry with the smallest priority.
    pub fn pop(&mut self) -> Option<Entry<E, P>> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let slot = self.heap.pop()?;
        self.index.remove(&slot.key);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(Entry { entity: slot.entity, priority: slot.priority })
    }

    /// The smallest priority currently queued.
    pub fn peek_priority(&self) -> Option<&P> {
        self.heap.first().map(|slot| &slot.priority)
    }

    /// Priority queued under `key`, if any.
    pub fn priority_of(&self, key: &K) -> Option<&P> {
        self.index.get(key).map(|&pos| &self.heap[pos].priority)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.heap[a], &self.heap[b]);
        (self.compare)(&a.priority, &b.priority).then(a.seq.cmp(&b.seq)) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.index.insert(self.heap[a].key.clone(), a);
        self.index.insert(self.heap[b].key.clone(), b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }
}

impl<E, P> PriorityMap<E, E, P>
where
    E: Eq + Hash + Clone + 'static,
{
    /// Queue whose entities are their own keys.
    pub fn keyed_by_self(compare: impl Fn(&P, &P) -> Ordering + 'static) -> Self {
        Self::with_comparator(E::clone, compare)
    }
}
