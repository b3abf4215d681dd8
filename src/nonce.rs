/// Hands out gap-free nonces for one funding account.
///
/// The base is read once at run start and never refreshed, so no other process
/// may send from the same account while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceAllocator {
    base: u64,
    batch_size: u32,
}

impl NonceAllocator {
    pub fn new(base: u64, batch_size: u32) -> Self {
        Self {
            base,
            batch_size: batch_size.max(1),
        }
    }

    /// Nonce for position `position` of batch `batch`: `base + batch * size + position`.
    pub fn nonce(&self, batch: usize, position: usize) -> u64 {
        self.base + (batch as u64) * u64::from(self.batch_size) + position as u64
    }

    /// Nonce for the `offset`-th transaction of an unbatched run.
    pub fn sequential(&self, offset: usize) -> u64 {
        self.base + offset as u64
    }
}
