// ============================================================
// Layer 6 — Experiment Directory
// ============================================================
// Everything a run leaves on disk lives under one directory:
//
//   experiment/
//     config.json               ← the SrConfig the run used
//     log.txt                   ← human-readable run log (appended)
//     metrics.csv               ← PSNR rows (see metrics.rs)
//     results-OABreast_07_test/
//       OABreast_07_test_x2_SR.DAT   ← optional SR volume
//
// SR volumes are written in the same raw layout as the inputs:
// one byte per voxel, row-major over (nx, ny, nz).

use anyhow::{Context, Result};
use ndarray::Array3;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// Owns the experiment directory and the files inside it.
pub struct ExperimentDir {
    dir: PathBuf,
}

impl ExperimentDir {
    /// Create the directory and one results-{name} subdirectory per
    /// evaluation dataset.
    pub fn new(dir: impl AsRef<Path>, datasets: &[String]) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create experiment directory '{}'", dir.display()))?;

        for name in datasets {
            let sub = dir.join(format!("results-{name}"));
            fs::create_dir_all(&sub)
                .with_context(|| format!("Cannot create '{}'", sub.display()))?;
        }

        tracing::debug!("Experiment directory: '{}'", dir.display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write the run configuration as pretty JSON.
    pub fn save_config<T: Serialize>(&self, cfg: &T) -> Result<()> {
        let path = self.dir.join("config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved config to '{}'", path.display());
        Ok(())
    }

    /// Append one line to log.txt and echo it through tracing.
    pub fn write_log(&self, line: &str) -> Result<()> {
        tracing::info!("{line}");

        let path = self.dir.join("log.txt");
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Cannot open '{}'", path.display()))?;
        writeln!(f, "{line}")?;
        Ok(())
    }

    /// Where the SR volume for (dataset, scale) is written.
    pub fn results_path(&self, dataset: &str, scale: usize) -> PathBuf {
        self.dir
            .join(format!("results-{dataset}"))
            .join(format!("{dataset}_x{scale}_SR.DAT"))
    }
}

/// Load a JSON config file from an arbitrary path.
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid config JSON in '{}'", path.display()))
}

/// Write a volume as headerless raw bytes in row-major order, the
/// layout `read_volume` expects.
pub fn save_results_dat(path: impl AsRef<Path>, volume: &Array3<u8>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }

    let bytes: Vec<u8> = volume.iter().copied().collect();

    fs::write(path, bytes)
        .with_context(|| format!("Cannot write SR volume to '{}'", path.display()))?;

    let (nx, ny, nz) = volume.dim();
    tracing::debug!("Saved {nx} x {ny} x {nz} volume to '{}'", path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_volume;
    use crate::domain::subject::VolumeDims;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Cfg {
        scale: Vec<usize>,
        seed:  u64,
    }

    #[test]
    fn test_creates_results_dirs() {
        let tmp = tempdir().unwrap();
        let exp = ExperimentDir::new(tmp.path().join("exp"), &["OABreast_07_test".into()]).unwrap();
        assert!(exp.path().join("results-OABreast_07_test").is_dir());
        assert_eq!(
            exp.results_path("OABreast_07_test", 2),
            exp.path().join("results-OABreast_07_test/OABreast_07_test_x2_SR.DAT"),
        );
    }

    #[test]
    fn test_config_roundtrip_and_log() {
        let tmp = tempdir().unwrap();
        let exp = ExperimentDir::new(tmp.path(), &[]).unwrap();

        let cfg = Cfg { scale: vec![2, 4], seed: 7 };
        exp.save_config(&cfg).unwrap();
        assert_eq!(load_config_file::<Cfg>(exp.path().join("config.json")).unwrap(), cfg);

        exp.write_log("first").unwrap();
        exp.write_log("second").unwrap();
        let log = fs::read_to_string(tmp.path().join("log.txt")).unwrap();
        assert_eq!(log, "first\nsecond\n");
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let tmp = tempdir().unwrap();
        assert!(load_config_file::<Cfg>(tmp.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_saved_volume_reads_back() {
        let tmp  = tempdir().unwrap();
        let dims = VolumeDims::new(5, 3, 2);
        let vol  = Array3::from_shape_fn((5, 3, 2), |(x, y, z)| (50 * x + 10 * y + z) as u8);

        let path = tmp.path().join("out/vol_SR.DAT");
        save_results_dat(&path, &vol).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), dims.voxel_count());
        // last axis fastest
        assert_eq!(&bytes[..4], &[0, 1, 10, 11]);

        let back = read_volume(&path, dims).unwrap();
        assert_eq!(back.as_array(), &vol);
    }
}
