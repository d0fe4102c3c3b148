//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// One root-to-completion execution of a node tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub u32);

/// The interpolation runtime currently allowed to write a value slot.
/// Allocated globally so a stale writer can never collide with its
/// replacement on the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WriterId(pub u64);

/// A registered value-store subscriber.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Monotonic allocator for RunId, WriterId, and SubscriptionId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_run: u32,
    next_writer: u64,
    next_sub: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_run(&mut self) -> RunId {
        let id = RunId(self.next_run);
        self.next_run = self.next_run.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_writer(&mut self) -> WriterId {
        let id = WriterId(self.next_writer);
        self.next_writer = self.next_writer.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_sub(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_sub);
        self.next_sub = self.next_sub.wrapping_add(1);
        id
    }
}
