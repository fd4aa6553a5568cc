// ============================================================
// Layer 2 — Run Configuration
// ============================================================
// All options for one run, shared by every use case.
// Serialisable so it can be saved next to the results and
// loaded back with `--config`.

use serde::{Deserialize, Serialize};

use crate::data::augment::AugmentConfig;
use crate::data::dataset::{DatasetOptions, Phase};
use crate::data::sampler::SamplingMode;
use crate::error::DataError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrConfig {
    pub dir_data:       String,
    pub data_train:     Vec<String>,
    pub data_test:      Vec<String>,
    pub scale:          Vec<usize>,
    pub patch_size:     usize,
    pub n_colors:       usize,
    pub rgb_range:      f32,
    pub no_augment:     bool,
    pub batch_size:     usize,
    pub test_every:     usize,
    pub model:          String,
    pub seed:           u64,
    pub num_workers:    usize,
    pub experiment_dir: String,
    pub save_results:   bool,
    /// Shave `scale` and compare on luma when computing PSNR
    pub benchmark:      bool,
}

impl Default for SrConfig {
    fn default() -> Self {
        Self {
            dir_data:       "dataset".to_string(),
            data_train:     vec!["OABreast_07_train".to_string()],
            data_test:      vec!["OABreast_07_test".to_string()],
            scale:          vec![2],
            patch_size:     48,
            n_colors:       1,
            rgb_range:      255.0,
            no_augment:     false,
            batch_size:     16,
            test_every:     1000,
            model:          "EDSR".to_string(),
            seed:           1,
            num_workers:    2,
            experiment_dir: "experiment/oabreast".to_string(),
            save_results:   false,
            benchmark:      false,
        }
    }
}

impl SrConfig {
    /// Reject option combinations the data pipeline cannot serve.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.scale.is_empty() {
            return Err(DataError::config("at least one scale factor is required"));
        }
        if let Some(bad) = self.scale.iter().find(|&&s| s == 0) {
            return Err(DataError::config(format!("invalid scale factor {bad}")));
        }
        if self.patch_size == 0 {
            return Err(DataError::config("patch size must be positive"));
        }
        if self.n_colors != 1 && self.n_colors != 3 {
            return Err(DataError::config(format!(
                "n_colors must be 1 or 3, got {}",
                self.n_colors
            )));
        }
        if self.rgb_range.is_nan() || self.rgb_range <= 0.0 {
            return Err(DataError::config(format!(
                "rgb_range must be positive, got {}",
                self.rgb_range
            )));
        }
        if self.batch_size == 0 {
            return Err(DataError::config("batch size must be positive"));
        }
        Ok(())
    }

    pub fn sampling_mode(&self) -> SamplingMode {
        SamplingMode::for_model(&self.model)
    }

    pub fn augment(&self) -> Option<AugmentConfig> {
        if self.no_augment {
            None
        } else {
            Some(AugmentConfig::default())
        }
    }

    /// Options for a dataset of the given phase.
    pub fn dataset_options(&self, phase: Phase) -> DatasetOptions {
        DatasetOptions {
            phase,
            patch_size:         self.patch_size,
            n_colors:           self.n_colors,
            rgb_range:          self.rgb_range,
            augment:            self.augment(),
            mode:               self.sampling_mode(),
            batch_size:         self.batch_size,
            test_every:         self.test_every,
            num_train_datasets: self.data_train.len(),
        }
    }
}
