// ============================================================
// Layer 4 — Raw Volume Loader
// ============================================================
// Loads headerless .DAT volumes from the dataset directory tree:
//
//   {root}/{dataset}/HR/*.DAT          → (nx, ny, nz)
//   {root}/{dataset}/LR/X{scale}/*.DAT → (nx/scale, ny/scale, nz)
//
// Each file is a flat array of u8 samples. Because there is no
// header, the expected dimensions come from the subject table in
// domain::subject and the byte length must match them exactly.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::subject::{DatasetName, VolumeDims};
use crate::domain::traits::VolumeSource;
use crate::domain::volume::{Volume, VolumePair};
use crate::error::{DataError, Result};

const VOLUME_EXT: &str = "DAT";

/// Loads HR / LR volumes from a data root directory.
/// Implements the VolumeSource trait from Layer 3.
#[derive(Debug, Clone)]
pub struct RawVolumeLoader {
    /// Root containing one sub-directory per dataset name
    root: PathBuf,
}

impl RawVolumeLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn hr_dir(&self, name: &DatasetName) -> PathBuf {
        self.root.join(&name.raw).join("HR")
    }

    pub fn lr_dir(&self, name: &DatasetName, scale: usize) -> PathBuf {
        self.root.join(&name.raw).join("LR").join(format!("X{scale}"))
    }

    /// Load a pair whose HR dimensions are given explicitly instead of
    /// being looked up from the subject table.
    pub fn load_pair_with_dims(
        &self,
        name:   &DatasetName,
        dims:   VolumeDims,
        scales: &[usize],
    ) -> Result<VolumePair> {
        tracing::info!("Loading '{}' ({}, {:?} role)", name, dims, name.role);

        let hr_path = find_volume_file(&self.hr_dir(name))?;
        let hr      = read_volume(&hr_path, dims)?;

        let mut lr = Vec::with_capacity(scales.len());
        for &scale in scales {
            let lr_path = find_volume_file(&self.lr_dir(name, scale))?;
            lr.push(read_volume(&lr_path, dims.downscaled(scale))?);
        }

        VolumePair::new(hr, lr, scales.to_vec())
    }
}

impl VolumeSource for RawVolumeLoader {
    fn load_pair(&self, name: &DatasetName, scales: &[usize]) -> Result<VolumePair> {
        if scales.is_empty() {
            return Err(DataError::config("at least one scale factor is required"));
        }
        if let Some(bad) = scales.iter().find(|&&s| s == 0) {
            return Err(DataError::config(format!("invalid scale factor {bad}")));
        }

        self.load_pair_with_dims(name, name.dims(), scales)
    }
}

/// Locate the single .DAT file in `dir`.
///
/// When several are present the lexicographically first is used so the
/// choice does not depend on directory iteration order.
fn find_volume_file(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| DataError::io(dir, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DataError::io(dir, e))?.path();
        let is_volume = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(VOLUME_EXT))
            .unwrap_or(false);
        if is_volume && path.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => Err(DataError::MissingVolume { path: dir.to_path_buf() }),
        1 => Ok(candidates.remove(0)),
        n => {
            tracing::warn!(
                "{} .DAT files in '{}' — using '{}'",
                n,
                dir.display(),
                candidates[0].display()
            );
            Ok(candidates.remove(0))
        }
    }
}

/// Read one raw file and reshape it to `dims`.
pub fn read_volume(path: &Path, dims: VolumeDims) -> Result<Volume> {
    let bytes = fs::read(path).map_err(|e| DataError::io(path, e))?;

    let expected = dims.voxel_count();
    if bytes.len() != expected {
        return Err(DataError::LengthMismatch {
            path: path.to_path_buf(),
            expected,
            actual: bytes.len(),
            dims: dims.as_array(),
        });
    }

    tracing::debug!("Read '{}' ({} bytes → {})", path.display(), bytes.len(), dims);
    Volume::from_raw(bytes, dims)
}
