//! Per-compilation arena.
//!
//! Every node, decoded string and offset map of one compilation unit lives in
//! a single bump region and is released together when the arena is dropped or
//! reset. Nothing under the front end is freed individually.

use bumpalo::Bump;

/// Bump arena owning one compilation unit's AST.
pub struct Arena {
    bump: Bump,
}

impl Arena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Allocate a string in the arena.
    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Create a Vec with capacity that allocates in this arena.
    #[inline]
    pub fn vec_with_capacity<T>(&self, capacity: usize) -> Vec<'_, T> {
        Vec::with_capacity_in(capacity, &self.bump)
    }

    /// Create an arena string with exactly `capacity` bytes reserved.
    #[inline]
    pub fn string_with_capacity(&self, capacity: usize) -> String<'_> {
        String::with_capacity_in(capacity, &self.bump)
    }

    /// Release everything allocated so far.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    /// Total bytes handed out by the arena.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

/// A vec allocated in an arena.
pub type Vec<'a, T> = bumpalo::collections::Vec<'a, T>;

/// A growable string allocated in an arena.
pub type String<'a> = bumpalo::collections::String<'a>;
