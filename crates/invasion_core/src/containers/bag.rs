//! Unordered random-access array.

/// Array with O(1) insertion and swap-removal by index.
///
/// Removing an item moves the last item into the vacated slot, so positions
/// are not stable across removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bag<T> {
    items: Vec<T>,
}

impl<T> Default for Bag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Bag<T> {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an item.
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    /// Remove the item at `index`, or `None` when out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.items.swap_remove(index))
    }

    /// Read the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_remove() {
        let mut bag = Bag::new();
        for i in 10..15 {
            bag.insert(i);
        }

        assert_eq!(bag.remove_at(1), Some(11));
        // last item fills the hole
        assert_eq!(bag.get(1), Some(&14));
        assert_eq!(bag.len(), 4);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut bag: Bag<u8> = Bag::new();
        assert_eq!(bag.remove_at(0), None);
        bag.insert(1);
        assert_eq!(bag.remove_at(3), None);
        assert_eq!(bag.len(), 1);
    }
}
