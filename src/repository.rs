//! Storage for the configured pack sizes

use anyhow::Result;
use parking_lot::RwLock;

/// Pack size storage used when a request brings no sizes of its own
pub trait PackRepository: Send + Sync {
    fn get_all_pack_sizes(&self) -> Result<Vec<u64>>;
    fn set_pack_sizes(&self, sizes: &[u64]) -> Result<()>;
}

/// In-memory pack sizes, empty until configured
#[derive(Debug, Default)]
pub struct InMemoryPackRepository {
    pack_sizes: RwLock<Vec<u64>>,
}

impl InMemoryPackRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PackRepository for InMemoryPackRepository {
    /// Sorted copy of the stored sizes
    fn get_all_pack_sizes(&self) -> Result<Vec<u64>> {
        let mut sizes = self.pack_sizes.read().clone();
        sizes.sort_unstable();
        Ok(sizes)
    }

    /// Replaces the stored sizes; an empty slice leaves them untouched
    fn set_pack_sizes(&self, sizes: &[u64]) -> Result<()> {
        if sizes.is_empty() {
            return Ok(());
        }

        let mut sorted = sizes.to_vec();
        sorted.sort_unstable();
        *self.pack_sizes.write() = sorted;
        Ok(())
    }
}
