//! Max-priority queue with stable ordering among equal priorities.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Entry<T, P> {
    priority: P,
    /// Insertion sequence number, used as tie-break.
    seq: u64,
    item: T,
}

impl<T, P: Ord> Entry<T, P> {
    fn rank(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T, P: Ord> PartialEq for Entry<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl<T, P: Ord> Eq for Entry<T, P> {}

impl<T, P: Ord> PartialOrd for Entry<T, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, P: Ord> Ord for Entry<T, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

/// Priority queue that always yields the highest priority first.
///
/// Items with equal priority come out in insertion order, which keeps
/// seeded runs reproducible.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T, P: Ord> {
    heap: BinaryHeap<Entry<T, P>>,
    next_seq: u64,
}

impl<T, P: Ord> Default for PriorityQueue<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord> PriorityQueue<T, P> {
    /// Create an empty priority queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Insert an item with the given priority.
    pub fn enqueue(&mut self, item: T, priority: P) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            item,
        });
    }

    /// Remove the highest-priority item together with its priority.
    pub fn dequeue(&mut self) -> Option<(T, P)> {
        self.heap.pop().map(|entry| (entry.item, entry.priority))
    }

    /// Read the item [`dequeue`](Self::dequeue) would return.
    #[must_use]
    pub fn peek(&self) -> Option<(&T, &P)> {
        self.heap.peek().map(|entry| (&entry.item, &entry.priority))
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Iterate in dequeue order.
    ///
    /// Sorts a snapshot of the heap, so this is O(n log n); it is meant for
    /// display.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &P)> {
        let mut entries: Vec<&Entry<T, P>> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries
            .into_iter()
            .map(|entry| (&entry.item, &entry.priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_priority_first() {
        let mut pq = PriorityQueue::new();
        pq.enqueue("low", 1);
        pq.enqueue("high", 9);
        pq.enqueue("mid", 5);

        assert_eq!(pq.peek(), Some((&"high", &9)));
        assert_eq!(pq.dequeue(), Some(("high", 9)));
        assert_eq!(pq.dequeue(), Some(("mid", 5)));
        assert_eq!(pq.dequeue(), Some(("low", 1)));
        assert_eq!(pq.dequeue(), None);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut pq = PriorityQueue::new();
        pq.enqueue('a', 3);
        pq.enqueue('b', 7);
        pq.enqueue('c', 3);
        pq.enqueue('d', 7);
        pq.enqueue('e', 3);

        let order: Vec<char> = std::iter::from_fn(|| pq.dequeue().map(|(c, _)| c)).collect();
        assert_eq!(order, vec!['b', 'd', 'a', 'c', 'e']);
    }

    #[test]
    fn test_iter_matches_dequeue_order() {
        let mut pq = PriorityQueue::new();
        for (item, priority) in [(1, 2), (2, 8), (3, 2), (4, 5)] {
            pq.enqueue(item, priority);
        }

        let listed: Vec<i32> = pq.iter().map(|(item, _)| *item).collect();
        let drained: Vec<i32> = std::iter::from_fn(|| pq.dequeue().map(|(item, _)| item)).collect();
        assert_eq!(listed, drained);
        assert_eq!(listed, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_empty_is_noop() {
        let mut pq: PriorityQueue<u8, u8> = PriorityQueue::default();
        assert!(pq.peek().is_none());
        assert!(pq.dequeue().is_none());
        assert!(pq.is_empty());
    }
}
