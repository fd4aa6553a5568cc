// ============================================================
// Layer 4 — Dataset Collection
// ============================================================
// Training usually draws from several named datasets at once
// (e.g. OABreast_07_train + OABreast_35_train). The collection
// chains them into one index space:
//
//   [ ds0: 0..len0 | ds1: len0..len0+len1 | ... ]
//
// Each member keeps its own repeat and wraparound; the collection
// only routes a global index to (member, local index).

use burn::data::dataset::Dataset;
use rand::Rng;

use crate::data::dataset::{SrSample, VolumetricPairDataset};
use crate::error::{DataError, Result};

pub struct PairDatasetCollection {
    members: Vec<VolumetricPairDataset>,
    /// Global start index of each member
    offsets: Vec<usize>,
    total:   usize,
}

impl PairDatasetCollection {
    pub fn new(members: Vec<VolumetricPairDataset>) -> Self {
        let mut offsets = Vec::with_capacity(members.len());
        let mut total   = 0;
        for m in &members {
            offsets.push(total);
            total += m.length();
        }
        Self { members, offsets, total }
    }

    pub fn length(&self) -> usize {
        self.total
    }

    /// Map a global index to (member position, local index).
    pub fn locate(&self, index: usize) -> Result<(usize, usize)> {
        if index >= self.total {
            return Err(DataError::Index { index, len: self.total });
        }
        // offsets is sorted; the owner is the last member starting at or before index
        let member = self.offsets.partition_point(|&start| start <= index) - 1;
        Ok((member, index - self.offsets[member]))
    }

    pub fn get_item<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Result<SrSample> {
        let (member, local) = self.locate(index)?;
        self.members[member].get_item(local, rng)
    }

    /// Select the same LR scale in every member.
    pub fn set_active_scale(&mut self, scale_index: usize) -> Result<()> {
        for m in &mut self.members {
            m.set_active_scale(scale_index)?;
        }
        Ok(())
    }
}

impl Dataset<SrSample> for PairDatasetCollection {
    fn get(&self, index: usize) -> Option<SrSample> {
        let (member, local) = self.locate(index).ok()?;
        self.members[member].get(local)
    }

    fn len(&self) -> usize {
        self.total
    }
}
