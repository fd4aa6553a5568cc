// ============================================================
// Layer 4 — Volumetric Pair Dataset
// ============================================================
// Implements Burn's Dataset trait over one loaded VolumePair.
//
// Index space:
//   training   → [0, num_slices * repeat), wrapped onto slices
//                with `idx % num_slices`, so one epoch visits every
//                slice `repeat` times without re-reading anything.
//                Any index wraps; only the Burn adapter stops at
//                `length()`.
//   evaluation → [0, num_slices), one full slice per index
//
// Per-index pipeline:
//
//   logical idx ─► physical slice z
//                    │
//                    ▼
//   LR[:, :, z], HR[:, :, z]        (shared, read-only volumes)
//                    │
//                    ▼
//   PatchSampler    train: random co-located crop
//                   eval:  HR cropped to scale * LR
//                    │
//                    ▼
//   Augmentor       train only, when enabled
//                    │
//                    ▼
//   ChannelNormalizer → CHW f32 arrays
//
// Nothing is cached: every call draws a fresh crop and a fresh
// augmentation decision.

use burn::data::dataset::Dataset;
use ndarray::Array3;
use rand::Rng;

use crate::data::augment::{AugmentConfig, Augmentor};
use crate::data::channel::ChannelNormalizer;
use crate::data::sampler::{PatchPair, PatchSampler, SamplingMode};
use crate::domain::subject::DatasetName;
use crate::domain::traits::VolumeSource;
use crate::domain::volume::VolumePair;
use crate::error::{DataError, Result};

/// One sample handed to the batcher. Arrays are (channel, height, width).
#[derive(Debug, Clone)]
pub struct SrSample {
    pub lr:    Array3<f32>,
    pub hr:    Array3<f32>,
    /// The logical index this sample was requested with
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Eval,
}

/// Everything the dataset reads from the run configuration.
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    pub phase:              Phase,
    pub patch_size:         usize,
    pub n_colors:           usize,
    pub rgb_range:          f32,
    /// None disables augmentation
    pub augment:            Option<AugmentConfig>,
    pub mode:               SamplingMode,
    pub batch_size:         usize,
    pub test_every:         usize,
    pub num_train_datasets: usize,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            phase:              Phase::Train,
            patch_size:         48,
            n_colors:           1,
            rgb_range:          255.0,
            augment:            Some(AugmentConfig::default()),
            mode:               SamplingMode::Standard,
            batch_size:         16,
            test_every:         1000,
            num_train_datasets: 1,
        }
    }
}

/// How many times each slice is visited between two evaluations.
///
/// `max(1, (batch_size * test_every) / (num_datasets * num_slices))`,
/// or 0 when there is nothing to sample.
pub fn compute_repeat(
    batch_size:   usize,
    test_every:   usize,
    num_datasets: usize,
    num_slices:   usize,
) -> usize {
    let n_patches = batch_size.saturating_mul(test_every);
    let n_images  = num_datasets.saturating_mul(num_slices);
    if n_images == 0 {
        0
    } else {
        (n_patches / n_images).max(1)
    }
}

pub struct VolumetricPairDataset {
    name:       String,
    volumes:    VolumePair,
    phase:      Phase,
    sampler:    PatchSampler,
    augmentor:  Option<Augmentor>,
    normalizer: ChannelNormalizer,
    patch_size: usize,
    idx_scale:  usize,
    repeat:     usize,
}

impl VolumetricPairDataset {
    /// Build a dataset over an already loaded pair.
    pub fn new(name: impl Into<String>, volumes: VolumePair, options: &DatasetOptions) -> Result<Self> {
        let name       = name.into();
        let num_slices = volumes.num_slices();
        if num_slices == 0 {
            return Err(DataError::config(format!("dataset '{name}' has no slices")));
        }

        let sampler = PatchSampler::new(options.mode);
        if options.phase == Phase::Train {
            check_patch_fits(&name, &volumes, &sampler, options.patch_size)?;
        }

        let repeat = match options.phase {
            Phase::Train => compute_repeat(
                options.batch_size,
                options.test_every,
                options.num_train_datasets.max(1),
                num_slices,
            ),
            Phase::Eval => 1,
        };

        tracing::info!(
            "Dataset '{}': {} slices, scales {:?}, {:?} phase, repeat {}",
            name, num_slices, volumes.scales, options.phase, repeat
        );

        Ok(Self {
            name,
            volumes,
            phase:      options.phase,
            sampler,
            augmentor:  options.augment.map(Augmentor::new),
            normalizer: ChannelNormalizer::new(options.n_colors, options.rgb_range),
            patch_size: options.patch_size,
            idx_scale:  0,
            repeat,
        })
    }

    /// Load the volumes for `name` through `source`, then build.
    pub fn from_source<S: VolumeSource + ?Sized>(
        source:  &S,
        name:    &str,
        scales:  &[usize],
        options: &DatasetOptions,
    ) -> Result<Self> {
        let parsed  = DatasetName::parse(name)?;
        let volumes = source.load_pair(&parsed, scales)?;
        Self::new(name, volumes, options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_slices(&self) -> usize {
        self.volumes.num_slices()
    }

    pub fn repeat(&self) -> usize {
        self.repeat
    }

    /// Number of logical samples.
    pub fn length(&self) -> usize {
        match self.phase {
            Phase::Train => self.num_slices() * self.repeat,
            Phase::Eval  => self.num_slices(),
        }
    }

    /// Logical index → slice index. Training wraps every index onto the
    /// slices; evaluation rejects indices past the last slice.
    pub fn resolve_physical_index(&self, logical_idx: usize) -> Result<usize> {
        match self.phase {
            Phase::Train => Ok(logical_idx % self.num_slices()),
            Phase::Eval  => {
                let len = self.length();
                if logical_idx >= len {
                    return Err(DataError::Index { index: logical_idx, len });
                }
                Ok(logical_idx)
            }
        }
    }

    /// Scale factor of the active LR volume.
    pub fn active_scale(&self) -> usize {
        self.volumes.scales[self.idx_scale]
    }

    /// Select the LR volume used by subsequent samples.
    pub fn set_active_scale(&mut self, scale_index: usize) -> Result<()> {
        self.set_active_scale_with(scale_index, &mut rand::thread_rng())
    }

    /// Like `set_active_scale`; LargeInput mode ignores `scale_index` and
    /// draws one uniformly from `rng`.
    pub fn set_active_scale_with<R: Rng + ?Sized>(
        &mut self,
        scale_index: usize,
        rng:         &mut R,
    ) -> Result<()> {
        let n = self.volumes.scales.len();
        self.idx_scale = match self.sampler.mode() {
            SamplingMode::Standard => {
                if scale_index >= n {
                    return Err(DataError::config(format!(
                        "scale index {scale_index} out of range for scales {:?}",
                        self.volumes.scales
                    )));
                }
                scale_index
            }
            SamplingMode::LargeInput => rng.gen_range(0..n),
        };
        Ok(())
    }

    /// Produce the sample for `logical_idx`, drawing crop and augmentation
    /// from `rng`.
    pub fn get_item<R: Rng + ?Sized>(&self, logical_idx: usize, rng: &mut R) -> Result<SrSample> {
        let z     = self.resolve_physical_index(logical_idx)?;
        let scale = self.active_scale();
        let lr    = self.volumes.lr_at(self.idx_scale)?.slice_hwc(z)?;
        let hr    = self.volumes.hr.slice_hwc(z)?;

        let pair = match self.phase {
            Phase::Train => {
                let pair = self.sampler.sample_train(lr, hr, self.patch_size, scale, rng)?;
                match &self.augmentor {
                    Some(augmentor) => PatchPair::from_array(augmentor.augment(pair.into_array(), rng)),
                    None            => pair,
                }
            }
            Phase::Eval => self.sampler.sample_eval(lr, hr, scale)?,
        };

        let pair = pair
            .map(|img| self.normalizer.set_channel(img.mapv(f32::from)))
            .map(|img| self.normalizer.to_numeric_tensor(&img));

        Ok(SrSample { lr: pair.lr, hr: pair.hr, index: logical_idx })
    }
}

/// Every LR volume must be at least one patch wide and tall.
fn check_patch_fits(
    name:       &str,
    volumes:    &VolumePair,
    sampler:    &PatchSampler,
    patch_size: usize,
) -> Result<()> {
    if patch_size == 0 {
        return Err(DataError::config("patch size must be positive"));
    }
    let hr = volumes.hr.dims();
    for (lr, &scale) in volumes.lr.iter().zip(&volumes.scales) {
        let lr = lr.dims();
        let (ip, tp) = sampler.mode().patch_edges(patch_size, scale);
        if ip > lr.nx || ip > lr.ny || tp > hr.nx || tp > hr.ny {
            return Err(DataError::config(format!(
                "patch {ip} (HR {tp}) exceeds '{name}' slices at x{scale}: LR {}x{}, HR {}x{}",
                lr.nx, lr.ny, hr.nx, hr.ny
            )));
        }
    }
    Ok(())
}

// ─── Burn Dataset Trait Implementation ────────────────────────────────────────
// The DataLoader calls get() from its worker threads, so randomness
// comes from the calling thread's own generator.
//
// Burn's loaders read `get(0), get(1), ...` until the first None, so
// any None ends the epoch. Indices past `length()` return None even in
// training, where `get_item` would wrap. Geometry is validated in `new`,
// so an in-range index cannot fail on a well-formed pair; if it still
// does, the error is logged at error level.
impl Dataset<SrSample> for VolumetricPairDataset {
    fn get(&self, index: usize) -> Option<SrSample> {
        if index >= self.length() {
            return None;
        }
        match self.get_item(index, &mut rand::thread_rng()) {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::error!(
                    "Sample {} of '{}' failed, the loader stops here: {}",
                    index, self.name, e
                );
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.length()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::subject::VolumeDims;
    use crate::domain::volume::Volume;
    use rand::{rngs::StdRng, SeedableRng};

    /// HR volume whose every `scale`x`scale` block repeats one LR pixel.
    pub(crate) fn block_pair(lr_dims: VolumeDims, scale: usize) -> VolumePair {
        let lr = ndarray::Array3::from_shape_fn((lr_dims.nx, lr_dims.ny, lr_dims.nz), |(x, y, z)| {
            ((x * 13 + y * 7 + z * 29) % 256) as u8
        });
        let hr = ndarray::Array3::from_shape_fn(
            (lr_dims.nx * scale, lr_dims.ny * scale, lr_dims.nz),
            |(x, y, z)| lr[[x / scale, y / scale, z]],
        );
        VolumePair::new(Volume::from_array(hr), vec![Volume::from_array(lr)], vec![scale]).unwrap()
    }

    fn train_options(patch_size: usize) -> DatasetOptions {
        DatasetOptions { patch_size, batch_size: 4, test_every: 10, ..Default::default() }
    }

    #[test]
    fn test_repeat_formula() {
        assert_eq!(compute_repeat(16, 1000, 1, 719), 22);
        assert_eq!(compute_repeat(16, 1000, 2, 719), 11);
        // Never below 1 while there is data
        assert_eq!(compute_repeat(1, 1, 1, 719), 1);
        assert_eq!(compute_repeat(16, 1000, 1, 0), 0);
    }

    #[test]
    fn test_repeat_saturates_on_huge_config() {
        assert_eq!(compute_repeat(usize::MAX, 2, 1, 719), usize::MAX / 719);
        assert_eq!(compute_repeat(1, 1, usize::MAX, 2), 1);
    }

    #[test]
    fn test_train_length_and_wraparound() {
        let pair = block_pair(VolumeDims::new(12, 10, 5), 2);
        let ds   = VolumetricPairDataset::new("OABreast_07_train", pair, &train_options(4)).unwrap();

        // 4 * 10 / 5 = 8
        assert_eq!(ds.repeat(), 8);
        assert_eq!(ds.length(), 40);
        // Wraps for every k, including indices past length()
        for i in 0..5 {
            for k in 0..20 {
                assert_eq!(ds.resolve_physical_index(i + k * 5).unwrap(), i);
            }
        }
        assert_eq!(ds.resolve_physical_index(42).unwrap(), 2);

        let mut rng = StdRng::seed_from_u64(5);
        assert!(ds.get_item(42, &mut rng).is_ok());
    }

    #[test]
    fn test_eval_length_ignores_repeat() {
        let pair = block_pair(VolumeDims::new(12, 10, 5), 2);
        let opts = DatasetOptions { phase: Phase::Eval, ..train_options(4) };
        let ds   = VolumetricPairDataset::new("OABreast_07_test", pair, &opts).unwrap();

        assert_eq!(ds.length(), 5);
        assert_eq!(ds.resolve_physical_index(3).unwrap(), 3);
        assert!(matches!(
            ds.resolve_physical_index(5),
            Err(DataError::Index { index: 5, len: 5 })
        ));
    }

    #[test]
    fn test_train_samples_are_synchronized() {
        let pair = block_pair(VolumeDims::new(12, 10, 5), 2);
        let opts = DatasetOptions { n_colors: 3, ..train_options(4) };
        let ds   = VolumetricPairDataset::new("OABreast_07_train", pair, &opts).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for idx in 0..ds.length() {
            let sample = ds.get_item(idx, &mut rng).unwrap();
            assert_eq!(sample.index, idx);
            assert_eq!(sample.lr.dim(), (3, 4, 4));
            assert_eq!(sample.hr.dim(), (3, 8, 8));
            for y in 0..4 {
                for x in 0..4 {
                    assert_eq!(sample.hr[[1, 2 * y + 1, 2 * x]], sample.lr[[1, y, x]]);
                }
            }
        }
    }

    #[test]
    fn test_eval_sample_is_full_slice() {
        let pair = block_pair(VolumeDims::new(12, 10, 3), 2);
        let opts = DatasetOptions { phase: Phase::Eval, rgb_range: 1.0, ..train_options(4) };
        let ds   = VolumetricPairDataset::new("OABreast_07_test", pair, &opts).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let sample = ds.get_item(2, &mut rng).unwrap();
        assert_eq!(sample.lr.dim(), (1, 12, 10));
        assert_eq!(sample.hr.dim(), (1, 24, 20));
        assert!(sample.hr.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_zero_slices_rejected() {
        let pair = block_pair(VolumeDims::new(12, 10, 0), 2);
        let err  = VolumetricPairDataset::new("OABreast_07_train", pair, &train_options(4))
            .err()
            .unwrap();
        assert!(matches!(err, DataError::Configuration { .. }));
    }

    #[test]
    fn test_oversized_patch_rejected_in_training_only() {
        let pair = block_pair(VolumeDims::new(12, 10, 2), 2);
        let err  = VolumetricPairDataset::new("OABreast_07_train", pair.clone(), &train_options(11))
            .err()
            .unwrap();
        assert!(matches!(err, DataError::Configuration { .. }));

        let opts = DatasetOptions { phase: Phase::Eval, ..train_options(11) };
        assert!(VolumetricPairDataset::new("OABreast_07_test", pair, &opts).is_ok());
    }

    #[test]
    fn test_set_active_scale() {
        let lr_dims = VolumeDims::new(6, 6, 2);
        let lr2 = ndarray::Array3::<u8>::zeros((6, 6, 2));
        let lr3 = ndarray::Array3::<u8>::zeros((4, 4, 2));
        let hr  = ndarray::Array3::<u8>::zeros((12, 12, 2));
        let pair = VolumePair::new(
            Volume::from_array(hr),
            vec![Volume::from_array(lr2), Volume::from_array(lr3)],
            vec![2, 3],
        )
        .unwrap();
        assert_eq!(pair.lr[0].dims(), lr_dims);

        let mut ds = VolumetricPairDataset::new("OABreast_07_train", pair, &train_options(4)).unwrap();
        assert_eq!(ds.active_scale(), 2);
        ds.set_active_scale(1).unwrap();
        assert_eq!(ds.active_scale(), 3);

        let mut rng = StdRng::seed_from_u64(1);
        let sample  = ds.get_item(0, &mut rng).unwrap();
        assert_eq!(sample.hr.dim(), (1, 12, 12));

        assert!(matches!(ds.set_active_scale(2), Err(DataError::Configuration { .. })));
    }

    #[test]
    fn test_large_input_scale_is_random() {
        let pair = VolumePair::new(
            Volume::from_array(ndarray::Array3::<u8>::zeros((12, 12, 1))),
            vec![
                Volume::from_array(ndarray::Array3::<u8>::zeros((6, 6, 1))),
                Volume::from_array(ndarray::Array3::<u8>::zeros((4, 4, 1))),
            ],
            vec![2, 3],
        )
        .unwrap();
        let opts   = DatasetOptions { mode: SamplingMode::LargeInput, ..train_options(4) };
        let mut ds = VolumetricPairDataset::new("OABreast_07_train", pair, &opts).unwrap();
        let mut rng  = StdRng::seed_from_u64(8);
        let mut seen = [false; 2];
        for _ in 0..64 {
            // The requested index is ignored
            ds.set_active_scale_with(0, &mut rng).unwrap();
            seen[ds.active_scale() - 2] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_burn_dataset_adapter() {
        let pair = block_pair(VolumeDims::new(12, 10, 5), 2);
        let opts = DatasetOptions { phase: Phase::Eval, ..train_options(4) };
        let ds   = VolumetricPairDataset::new("OABreast_07_test", pair, &opts).unwrap();

        assert_eq!(Dataset::len(&ds), 5);
        assert!(ds.get(4).is_some());
        assert!(ds.get(5).is_none());
    }

    #[test]
    fn test_burn_adapter_ends_training_epoch_at_length() {
        let pair = block_pair(VolumeDims::new(12, 10, 5), 2);
        let ds   = VolumetricPairDataset::new("OABreast_07_train", pair, &train_options(4)).unwrap();

        // Every in-range sample is produced, then iteration stops
        assert!((0..ds.length()).all(|i| ds.get(i).is_some()));
        assert!(ds.get(ds.length()).is_none());
        assert_eq!(ds.iter().count(), 40);
    }
}
