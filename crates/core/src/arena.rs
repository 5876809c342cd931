//! Request-scoped arena
//!
//! Each request owns one `RequestArena`: a bump allocator preallocated to a
//! configured slab size. The serde layer allocates its key/value scratch
//! buffers here instead of the global heap, and the whole arena is released
//! when the request completes.
//!
//! Borrows from the arena must not be held across await points; encode and
//! decode are synchronous, so in practice borrows stay inside one call.

use bumpalo::Bump;

/// Per-request bump allocator
pub struct RequestArena {
    bump: Bump,
}

impl RequestArena {
    /// Create an arena with `prealloc_bytes` reserved up front
    pub fn with_prealloc(prealloc_bytes: usize) -> Self {
        RequestArena {
            bump: Bump::with_capacity(prealloc_bytes),
        }
    }

    /// Copy `bytes` into the arena
    pub fn alloc_slice(&self, bytes: &[u8]) -> &[u8] {
        self.bump.alloc_slice_copy(bytes)
    }

    /// Copy `s` into the arena
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// The underlying bump allocator, for `bumpalo::collections` users
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    /// Bytes handed out so far (diagnostics)
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for RequestArena {
    fn default() -> Self {
        Self::with_prealloc(4096)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_slice_copies() {
        let arena = RequestArena::with_prealloc(64);
        let stored = arena.alloc_slice(b"abc");
        assert_eq!(stored, b"abc");
    }

    #[test]
    fn test_alloc_str_copies() {
        let arena = RequestArena::with_prealloc(64);
        let stored = arena.alloc_str("mkdir");
        assert_eq!(stored, "mkdir");
    }

    #[test]
    fn test_prealloc_absorbs_small_requests() {
        let arena = RequestArena::with_prealloc(4096);
        for i in 0..16 {
            arena.alloc_slice(&[i; 32]);
        }
        assert!(arena.allocated_bytes() >= 16 * 32);
    }

    #[test]
    fn test_bump_collections_work() {
        let arena = RequestArena::with_prealloc(256);
        let mut v = bumpalo::collections::Vec::new_in(arena.bump());
        v.extend_from_slice(b"key");
        assert_eq!(v.as_slice(), b"key");
    }
}
