//! Last-in, first-out stack with optional fixed capacity.

use super::CapacityError;

/// LIFO stack. The top is the most recently pushed item.
///
/// A stack created with [`Stack::bounded`] rejects pushes once full and
/// hands the item back through [`CapacityError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
    limit: Option<usize>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    /// Create an unbounded stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            limit: None,
        }
    }

    /// Create a stack that holds at most `limit` items.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit),
            limit: Some(limit),
        }
    }

    /// Push an item on top.
    pub fn push(&mut self, item: T) -> Result<(), CapacityError<T>> {
        if self.is_full() {
            return Err(CapacityError(item));
        }
        self.items.push(item);
        Ok(())
    }

    /// Pop the top item, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Read the top item without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Number of stacked items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if a bounded stack has reached its limit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.items.len() >= limit)
    }

    /// Iterate from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = Stack::new();
        for i in 1..=3 {
            stack.push(i).unwrap();
        }

        assert_eq!(stack.peek(), Some(&3));
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_bounded_overflow_returns_item() {
        let mut stack = Stack::bounded(2);
        assert!(stack.push('a').is_ok());
        assert!(stack.push('b').is_ok());
        assert!(stack.is_full());

        let err = stack.push('c').unwrap_err();
        assert_eq!(err.into_inner(), 'c');
        assert_eq!(stack.len(), 2);

        stack.pop();
        assert!(stack.push('d').is_ok());
    }

    #[test]
    fn test_empty_stack_is_noop() {
        let mut stack: Stack<u8> = Stack::default();
        assert_eq!(stack.peek(), None);
        assert_eq!(stack.pop(), None);
        assert!(!stack.is_full());
    }
}
