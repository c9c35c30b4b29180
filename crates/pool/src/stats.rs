//! Statistics tracking for block pools

/// Counters for pool operations
///
/// Single-threaded like the pool itself, so plain integers suffice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful `acquire` calls
    pub acquires: u64,
    /// Successful `release` calls
    pub releases: u64,
    /// Acquires served from the free set
    pub reuses: u64,
    /// Pages added on demand after creation
    pub grows: u64,
}

impl PoolStats {
    pub(crate) fn record_acquire(&mut self, reused: bool) {
        self.acquires += 1;
        if reused {
            self.reuses += 1;
        } else {
            self.grows += 1;
        }
    }

    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    /// Fraction of acquires served without growing (0.0 when nothing was acquired)
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.acquires == 0 {
            0.0
        } else {
            self.reuses as f64 / self.acquires as f64
        }
    }
}
