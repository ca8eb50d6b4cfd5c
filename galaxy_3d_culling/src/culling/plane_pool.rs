/// PlanePool: reusable plane lists for the graph walk and work items.
///
/// Every traversal node and every leaf work item needs its own plane list.
/// Lists are checked out as `PooledPlanes` guards and go back to the free
/// list when the guard drops, on every path (early rejects included), so a
/// steady-state frame allocates nothing.
///
/// The free list is lock-protected: guards may be dropped on worker threads.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use crate::geometry::Plane;

#[derive(Debug, Default)]
pub struct PlanePool {
    free: Mutex<Vec<Vec<Plane>>>,
    /// Lists ever allocated by this pool
    created: AtomicUsize,
}

impl PlanePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out an empty list.
    pub fn acquire(self: &Arc<Self>) -> PooledPlanes {
        let planes = match self.free.lock().pop() {
            Some(planes) => planes,
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(16)
            }
        };
        PooledPlanes { planes, pool: Arc::clone(self) }
    }

    /// Check out a list holding a copy of `planes`.
    pub fn acquire_copy(self: &Arc<Self>, planes: &[Plane]) -> PooledPlanes {
        let mut pooled = self.acquire();
        pooled.extend_from_slice(planes);
        pooled
    }

    /// Lists currently waiting in the free list.
    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }

    /// Lists allocated since the pool was created.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    fn release(&self, mut planes: Vec<Plane>) {
        planes.clear();
        self.free.lock().push(planes);
    }
}

/// Scoped checkout of a plane list. Returned to its pool on drop.
#[derive(Debug)]
pub struct PooledPlanes {
    planes: Vec<Plane>,
    pool: Arc<PlanePool>,
}

impl Deref for PooledPlanes {
    type Target = Vec<Plane>;

    fn deref(&self) -> &Vec<Plane> {
        &self.planes
    }
}

impl DerefMut for PooledPlanes {
    fn deref_mut(&mut self) -> &mut Vec<Plane> {
        &mut self.planes
    }
}

impl Drop for PooledPlanes {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.planes));
    }
}

#[cfg(test)]
#[path = "plane_pool_tests.rs"]
mod tests;
