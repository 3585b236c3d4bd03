//! Id allocation for technologies.

use crate::models::Technology;

/// Largest id handed out or accepted, the largest integer a JSON reader
/// holding numbers as doubles represents exactly.
pub const MAX_ID: u64 = (1 << 53) - 1;

/// Hands out technology ids in strictly increasing order.
///
/// The allocator starts just past the largest id in the collection it was
/// seeded from, so ids created in quick succession never collide and a
/// deleted id is never reused within a session. Once [`MAX_ID`] has been
/// handed out or observed the allocator is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn seeded_from(technologies: &[Technology]) -> Self {
        let mut allocator = Self { next: 1 };
        for tech in technologies {
            allocator.observe(tech.id);
        }
        allocator
    }

    /// The next free id, or `None` once every id up to [`MAX_ID`] is used.
    pub fn allocate(&mut self) -> Option<u64> {
        if self.next > MAX_ID {
            return None;
        }
        let id = self.next;
        self.next += 1;
        Some(id)
    }

    /// Move past `id` if it is at or beyond the next id to hand out.
    pub fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id.min(MAX_ID) + 1;
        }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}
