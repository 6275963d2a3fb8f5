//! Ordered container primitives used by armies and the global lists.
//!
//! Every container treats "empty" as a normal state: removal and peek
//! return `None` instead of panicking. Only the bounded [`Stack`] can refuse
//! an insertion, and it hands the rejected item back in a [`CapacityError`].

mod bag;
mod deque;
mod priority_queue;
mod queue;
mod stack;

pub use bag::Bag;
pub use deque::Deque;
pub use priority_queue::PriorityQueue;
pub use queue::Queue;
pub use stack::Stack;

use std::fmt;

/// Insertion into a full container. Carries the rejected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityError<T>(pub T);

impl<T> fmt::Display for CapacityError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("container is at capacity")
    }
}

impl<T: fmt::Debug> std::error::Error for CapacityError<T> {}

impl<T> CapacityError<T> {
    /// Recover the rejected item.
    pub fn into_inner(self) -> T {
        self.0
    }
}
