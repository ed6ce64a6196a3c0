use std::sync::{Mutex, MutexGuard, RwLock};

use log::error;

use crate::particles::Particle;
use crate::tree::{NodeId, QuadTree};

/// The tree workers read from, together with its partition into per-thread work lists.
#[derive(Debug, Clone)]
pub struct CurrentView {
    pub tree: QuadTree,
    pub work_lists: Vec<Vec<NodeId>>,
}

/// A pair of quadtrees: `current`, read by workers and the renderer, and
/// `buffer`, which collects the particles of the next step.
///
/// The swap holds the write side of `current`, so it never overlaps a reader.
/// Locks are always taken in the order `current` then `buffer`.
#[derive(Debug)]
pub struct DoubleBufferedTree {
    current: RwLock<CurrentView>,
    buffer: Mutex<QuadTree>,
}

impl DoubleBufferedTree {
    pub fn new(size: f64) -> Self {
        Self {
            current: RwLock::new(CurrentView {
                tree: QuadTree::new(size),
                work_lists: Vec::new(),
            }),
            buffer: Mutex::new(QuadTree::new(size)),
        }
    }

    fn lock_buffer(&self) -> MutexGuard<'_, QuadTree> {
        self.buffer.lock().unwrap_or_else(|poisoned| {
            error!("Buffer lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Runs `f` with shared access to the current tree; swaps wait until it returns.
    pub fn read_current<R>(&self, f: impl FnOnce(&CurrentView) -> R) -> R {
        let guard = self.current.read().unwrap_or_else(|poisoned| {
            error!("Current tree lock poisoned, recovering");
            poisoned.into_inner()
        });
        f(&guard)
    }

    /// Runs `f` with exclusive access to the current tree.
    pub fn write_current<R>(&self, f: impl FnOnce(&mut CurrentView) -> R) -> R {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| {
            error!("Current tree lock poisoned, recovering");
            poisoned.into_inner()
        });
        f(&mut guard)
    }

    /// Runs `f` with exclusive access to the buffer tree.
    pub fn write_buffer<R>(&self, f: impl FnOnce(&mut QuadTree) -> R) -> R {
        f(&mut self.lock_buffer())
    }

    /// Pushes a batch of particles into the buffer under one lock and returns
    /// how many were rejected for lying outside the domain.
    pub fn push_batch(&self, particles: impl IntoIterator<Item = Particle>) -> usize {
        let mut buffer = self.lock_buffer();
        particles
            .into_iter()
            .filter(|p| buffer.push(*p).is_none())
            .count()
    }

    /// Makes the buffer current, leaves an empty buffer behind, and
    /// recomputes the work lists with `partition`.
    pub fn swap(&self, partition: impl FnOnce(&QuadTree) -> Vec<Vec<NodeId>>) {
        self.write_current(|view| {
            let mut buffer = self.lock_buffer();
            view.tree.clear();
            view.tree.swap(&mut buffer);
            debug_assert!(buffer.is_empty());
            view.work_lists = partition(&view.tree);
        });
    }
}
