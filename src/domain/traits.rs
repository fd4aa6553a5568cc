// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The dataset never reads files itself. It asks a VolumeSource
// for a VolumePair once, at construction, and samples from the
// returned buffers from then on.
//
// Implementations:
//   - RawVolumeLoader → headerless .DAT files on disk
//   - InMemorySource  → pre-built pairs, test builds only

use crate::domain::subject::DatasetName;
use crate::domain::volume::VolumePair;
use crate::error::Result;

#[cfg(test)]
pub use in_memory::InMemorySource;

// ─── VolumeSource ─────────────────────────────────────────────────────────────
/// Anything that can produce the HR + per-scale LR volumes of a dataset.
pub trait VolumeSource {
    /// Load the pair for `name`, one LR volume per entry of `scales`
    /// in the same order.
    fn load_pair(&self, name: &DatasetName, scales: &[usize]) -> Result<VolumePair>;
}

// ─── InMemorySource ───────────────────────────────────────────────────────────
#[cfg(test)]
mod in_memory {
    use std::collections::HashMap;

    use super::VolumeSource;
    use crate::domain::subject::DatasetName;
    use crate::domain::volume::VolumePair;
    use crate::error::{DataError, Result};

    /// Serves pairs that are already in memory, keyed by dataset name.
    #[derive(Debug, Default, Clone)]
    pub struct InMemorySource {
        pairs: HashMap<String, VolumePair>,
    }

    impl InMemorySource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, name: impl Into<String>, pair: VolumePair) {
            self.pairs.insert(name.into(), pair);
        }
    }

    impl VolumeSource for InMemorySource {
        fn load_pair(&self, name: &DatasetName, scales: &[usize]) -> Result<VolumePair> {
            let pair = self
                .pairs
                .get(&name.raw)
                .ok_or_else(|| DataError::config(format!("no in-memory volumes for '{name}'")))?;

            if pair.scales.as_slice() != scales {
                return Err(DataError::config(format!(
                    "'{name}' holds scales {:?}, requested {scales:?}",
                    pair.scales
                )));
            }
            Ok(pair.clone())
        }
    }
}
