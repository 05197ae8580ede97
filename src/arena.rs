use bumpalo::Bump;

/// Per-compilation bump allocator.
///
/// Every token lexeme, literal string payload, and diagnostic filename
/// produced while scanning a module lives here and is freed en masse when
/// the arena drops. Allocation never fails short of the process aborting,
/// so callers receive plain references rather than `Result`s.
pub struct Arena {
    bump: Bump,
}

impl Arena {
    pub fn new() -> Self {
        Arena { bump: Bump::new() }
    }

    pub fn alloc<T>(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    /// Copy a string into the arena and return a slice that lives as long
    /// as the arena itself.
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    pub fn alloc_slice<T, I>(&self, items: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.bump.alloc_slice_fill_iter(items)
    }

    /// Bytes currently allocated, across all chunks.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Resets the arena, invalidating all references but keeping allocated
    /// capacity. Lets a driver reuse one arena across compilations.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
