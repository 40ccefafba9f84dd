//! Node Registry - index allocation for the scene arena.
//!
//! Manages the lifecycle of node indices:
//! - Slot vector indexed by node index
//! - Free index pool for O(1) reuse
//! - Auto-reset once every node is released

// =============================================================================
// Registry
// =============================================================================

/// Arena of `T` addressed by reusable indices.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    slots: Vec<Option<T>>,
    /// Pool of freed indices for reuse (LIFO).
    free: Vec<usize>,
    live: usize,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` and return its index.
    ///
    /// Reuses a freed index when one is available.
    pub fn allocate(&mut self, value: T) -> usize {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                index
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    /// Remove the value at `index` and return the index to the pool.
    pub fn release(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        self.live -= 1;
        self.free.push(index);

        // AUTO-CLEANUP: nothing allocated, drop the slot storage
        if self.live == 0 {
            self.slots.clear();
            self.free.clear();
        }
        Some(value)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    pub fn is_allocated(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of allocated indices.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
