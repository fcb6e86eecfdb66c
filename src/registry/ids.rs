//! ID allocation.

use std::collections::BTreeSet;

/// Largest ID accepted when restoring a saved registry. Every gap below
/// the highest restored point ID becomes a pool entry, so the bound also
/// bounds the pool.
pub const MAX_RESTORED_ID: u32 = 1 << 20;

/// Monotonic allocator for entity kinds whose IDs are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCounter {
    next: u32,
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn mint(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Move past `id` so it is never minted again. Returns false for
    /// `u32::MAX`, which nothing can follow.
    pub fn observe(&mut self, id: u32) -> bool {
        let Some(after) = id.checked_add(1) else { return false };
        if after > self.next {
            self.next = after;
        }
        true
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocator that hands freed IDs back out, smallest first, before
/// minting new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdPool {
    counter: IdCounter,
    recycled: BTreeSet<u32>,
}

impl IdPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u32 {
        self.recycled.pop_first().unwrap_or_else(|| self.counter.mint())
    }

    /// Return `id` to the pool. IDs never minted are ignored.
    pub fn release(&mut self, id: u32) {
        if id < self.counter.peek() {
            self.recycled.insert(id);
        }
    }

    /// Recycled IDs in the order they will be reissued.
    pub fn recycled(&self) -> impl Iterator<Item = u32> + '_ {
        self.recycled.iter().copied()
    }

    /// Rebuild from a set of live IDs: the counter moves past the largest
    /// and every gap below it becomes recyclable.
    pub fn from_live(live: impl IntoIterator<Item = u32>) -> Self {
        let live: BTreeSet<u32> = live.into_iter().collect();
        let mut counter = IdCounter::new();
        if let Some(&max) = live.last() {
            counter.observe(max);
        }
        let recycled = (1..counter.peek()).filter(|id| !live.contains(id)).collect();
        Self { counter, recycled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_recycled_first() {
        let mut pool = IdPool::new();
        let ids: Vec<u32> = (0..5).map(|_| pool.allocate()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        pool.release(4);
        pool.release(2);
        assert_eq!(pool.allocate(), 2);
        assert_eq!(pool.allocate(), 4);
        assert_eq!(pool.allocate(), 6);
    }

    #[test]
    fn test_release_unknown_ignored() {
        let mut pool = IdPool::new();
        pool.release(42);
        assert_eq!(pool.allocate(), 1);
    }

    #[test]
    fn test_from_live_fills_gaps() {
        let mut pool = IdPool::from_live([1, 4, 5]);
        assert_eq!(pool.recycled().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(pool.allocate(), 2);
        assert_eq!(pool.allocate(), 3);
        assert_eq!(pool.allocate(), 6);
    }

    #[test]
    fn test_observe_last_id_refused() {
        let mut counter = IdCounter::new();
        assert!(counter.observe(7));
        assert!(!counter.observe(u32::MAX));
        assert_eq!(counter.mint(), 8);
    }
}
