//! Double-ended queue.

use std::collections::VecDeque;

/// Queue that can be fed and drained from both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deque<T> {
    items: VecDeque<T>,
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deque<T> {
    /// Create an empty deque.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append at the back.
    pub fn push_back(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Prepend at the front.
    pub fn push_front(&mut self, item: T) {
        self.items.push_front(item);
    }

    /// Remove from the front.
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Remove from the back.
    pub fn pop_back(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    /// Read the front item.
    #[must_use]
    pub fn peek_front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Read the back item.
    #[must_use]
    pub fn peek_back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the deque is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_ends() {
        let mut deque = Deque::new();
        deque.push_back(2);
        deque.push_back(3);
        deque.push_front(1);

        assert_eq!(deque.peek_front(), Some(&1));
        assert_eq!(deque.peek_back(), Some(&3));
        assert_eq!(deque.pop_back(), Some(3));
        assert_eq!(deque.pop_front(), Some(1));
        assert_eq!(deque.pop_front(), Some(2));
        assert_eq!(deque.pop_back(), None);
    }
}
