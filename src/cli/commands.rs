// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `inspect` and `baseline`, and
// the run flags they share.
//
// List-valued flags take '+'-separated values, e.g.
//   --data-train OABreast_07_train+OABreast_35_train --scale 2+4

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::application::config::SrConfig;
use crate::infra::experiment::load_config_file;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the training pipeline and summarise a few batches
    Inspect(InspectArgs),

    /// Score nearest-neighbour upscaling on the test datasets
    Baseline(BaselineArgs),
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Number of batches to pull per scale
    #[arg(long, default_value_t = 4)]
    pub batches: usize,
}

#[derive(Args, Debug)]
pub struct BaselineArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

/// Flags shared by every subcommand.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Load the whole configuration from a JSON file; other run flags are ignored
    #[arg(long)]
    pub config: Option<String>,

    /// Root directory holding one sub-directory per dataset
    #[arg(long, default_value = "dataset")]
    pub dir_data: String,

    /// Training dataset names
    #[arg(long, value_delimiter = '+', default_value = "OABreast_07_train")]
    pub data_train: Vec<String>,

    /// Test dataset names
    #[arg(long, value_delimiter = '+', default_value = "OABreast_07_test")]
    pub data_test: Vec<String>,

    /// Super-resolution scale factors
    #[arg(long, value_delimiter = '+', default_value = "2")]
    pub scale: Vec<usize>,

    /// LR training patch edge in pixels
    #[arg(long, default_value_t = 48)]
    pub patch_size: usize,

    /// Output channels: 1 (grayscale) or 3
    #[arg(long, default_value_t = 1)]
    pub n_colors: usize,

    /// Maximum sample value after normalisation
    #[arg(long, default_value_t = 255.0)]
    pub rgb_range: f32,

    /// Disable flip / transpose augmentation
    #[arg(long)]
    pub no_augment: bool,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Training batches between two evaluations
    #[arg(long, default_value_t = 1000)]
    pub test_every: usize,

    /// Model name; VDSR switches to pre-upsampled input patches
    #[arg(long, default_value = "EDSR")]
    pub model: String,

    /// Seed for the data loader shuffle
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Data loader worker threads
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    /// Directory for config.json, log.txt, metrics.csv and results
    #[arg(long, default_value = "experiment/oabreast")]
    pub experiment_dir: String,

    /// Write SR volumes as .DAT files
    #[arg(long)]
    pub save_results: bool,

    /// Shave `scale` pixels and compare on luma when computing PSNR
    #[arg(long)]
    pub benchmark: bool,
}

impl RunArgs {
    /// The effective configuration: the `--config` file if given,
    /// otherwise the flags.
    pub fn into_config(self) -> Result<SrConfig> {
        if let Some(path) = self.config.clone() {
            tracing::info!("Loading configuration from '{}'", path);
            return load_config_file(path);
        }
        Ok(self.into())
    }
}

/// Convert CLI RunArgs into the application-layer SrConfig.
/// The application layer never sees clap types.
impl From<RunArgs> for SrConfig {
    fn from(a: RunArgs) -> Self {
        SrConfig {
            dir_data:       a.dir_data,
            data_train:     a.data_train,
            data_test:      a.data_test,
            scale:          a.scale,
            patch_size:     a.patch_size,
            n_colors:       a.n_colors,
            rgb_range:      a.rgb_range,
            no_augment:     a.no_augment,
            batch_size:     a.batch_size,
            test_every:     a.test_every,
            model:          a.model,
            seed:           a.seed,
            num_workers:    a.num_workers,
            experiment_dir: a.experiment_dir,
            save_results:   a.save_results,
            benchmark:      a.benchmark,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["oabreast-sr", "baseline"]).unwrap();
        let Commands::Baseline(args) = cli.command else { panic!("expected baseline") };
        assert_eq!(args.run.into_config().unwrap(), SrConfig::default());
    }

    #[test]
    fn test_plus_separated_lists() {
        let cli = Cli::try_parse_from([
            "oabreast-sr", "inspect",
            "--data-train", "OABreast_07_train+OABreast_35_train",
            "--scale", "2+4",
            "--no-augment",
            "--batches", "1",
        ])
        .unwrap();
        let Commands::Inspect(args) = cli.command else { panic!("expected inspect") };
        assert_eq!(args.batches, 1);

        let cfg = args.run.into_config().unwrap();
        assert_eq!(cfg.data_train.len(), 2);
        assert_eq!(cfg.scale, vec![2, 4]);
        assert!(cfg.no_augment);
    }

    #[test]
    fn test_config_file_overrides_flags() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "scale": [3], "model": "VDSR" }"#).unwrap();

        let cli = Cli::try_parse_from([
            "oabreast-sr", "baseline",
            "--config", path.to_str().unwrap(),
            "--scale", "2",
        ])
        .unwrap();
        let Commands::Baseline(args) = cli.command else { panic!("expected baseline") };

        let cfg = args.run.into_config().unwrap();
        assert_eq!(cfg.scale, vec![3]);
        assert_eq!(cfg.model, "VDSR");
    }
}
