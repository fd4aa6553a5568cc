// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw .DAT volumes to tensor batches.
//
//   .DAT files (HR + LR/X{s})
//       │
//       ▼
//   RawVolumeLoader     → VolumePair, loaded once per dataset
//       │
//       ▼
//   VolumetricPairDataset
//       ├─ PatchSampler       co-located LR/HR crop
//       ├─ Augmentor          shared flips / transpose
//       └─ ChannelNormalizer  channel parity, CHW f32
//       │
//       ▼
//   PairDatasetCollection → several datasets, one index space
//       │
//       ▼
//   SrBatcher           → [N, C, H, W] tensors
//       │
//       ▼
//   DataLoader          → consumer (evaluation, inspection)

/// Reads headerless .DAT volumes from the dataset directory tree
pub mod loader;

/// Co-located LR/HR patch extraction
pub mod sampler;

/// Shared random flips and transposition
pub mod augment;

/// Channel-count reconciliation and CHW conversion
pub mod channel;

/// Implements Burn's Dataset trait over one volume pair
pub mod dataset;

/// Chains several datasets into one index space
pub mod collection;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
