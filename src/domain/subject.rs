// ============================================================
// Layer 3 — Subject / Split Lookup Table
// ============================================================
// The raw .DAT files carry no header, so the volume dimensions
// must be known before a file is read. They are fixed per scanned
// subject and per split role:
//
//   subject | nx  | ny  | nz original | nz train | nz test
//   --------+-----+-----+-------------+----------+--------
//     07    | 616 | 484 |     719     |   319    |  400
//     35    | 284 | 410 |     722     |   322    |  400
//     47    | 494 | 614 |     752     |   352    |  400
//
// A dataset name encodes both keys:
//   "OABreast_07"        → subject 07, original volume
//   "OABreast_07_train"  → subject 07, train subset
//   "OABreast_35_test"   → subject 35, test subset

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// The scanned subjects with known volume geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectId {
    S07,
    S35,
    S47,
}

impl SubjectId {
    pub fn parse(code: &str) -> Result<Self> {
        match code {
            "07" => Ok(Self::S07),
            "35" => Ok(Self::S35),
            "47" => Ok(Self::S47),
            other => Err(DataError::config(format!(
                "unknown subject code '{other}' (expected 07, 35 or 47)"
            ))),
        }
    }

    /// In-plane HR size (nx, ny). Identical for every split role.
    fn plane(&self) -> (usize, usize) {
        match self {
            Self::S07 => (616, 484),
            Self::S35 => (284, 410),
            Self::S47 => (494, 614),
        }
    }
}

/// Which part of the subject's volume a dataset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitRole {
    Original,
    Train,
    Test,
}

impl SplitRole {
    /// Role implied by the suffix of a dataset name.
    pub fn from_name(name: &str) -> Self {
        if name.ends_with("train") {
            Self::Train
        } else if name.ends_with("test") {
            Self::Test
        } else {
            Self::Original
        }
    }
}

/// HR volume dimensions (height, width, depth).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl VolumeDims {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    pub fn lookup(subject: SubjectId, role: SplitRole) -> Self {
        let (nx, ny) = subject.plane();
        let nz = match (subject, role) {
            (SubjectId::S07, SplitRole::Original) => 719,
            (SubjectId::S35, SplitRole::Original) => 722,
            (SubjectId::S47, SplitRole::Original) => 752,
            (SubjectId::S07, SplitRole::Train)    => 319,
            (SubjectId::S35, SplitRole::Train)    => 322,
            (SubjectId::S47, SplitRole::Train)    => 352,
            (_, SplitRole::Test)                  => 400,
        };
        Self { nx, ny, nz }
    }

    /// Dimensions of the LR volume at `scale` (integer division in-plane,
    /// depth unchanged).
    pub fn downscaled(&self, scale: usize) -> Self {
        Self {
            nx: self.nx / scale,
            ny: self.ny / scale,
            nz: self.nz,
        }
    }

    pub fn voxel_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn as_array(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }
}

impl fmt::Display for VolumeDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.nx, self.ny, self.nz)
    }
}

/// A parsed dataset name such as `OABreast_07_train`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetName {
    pub raw:     String,
    pub subject: SubjectId,
    pub role:    SplitRole,
}

impl DatasetName {
    /// Parse `<Prefix>_<subject>[_...]`. The subject code is the second
    /// underscore-separated field; the role comes from the name suffix.
    pub fn parse(name: &str) -> Result<Self> {
        let code = name.split('_').nth(1).ok_or_else(|| {
            DataError::config(format!(
                "dataset name '{name}' has no subject field (expected <Prefix>_<subject>[_train|_test])"
            ))
        })?;

        Ok(Self {
            raw:     name.to_string(),
            subject: SubjectId::parse(code)?,
            role:    SplitRole::from_name(name),
        })
    }

    pub fn dims(&self) -> VolumeDims {
        VolumeDims::lookup(self.subject, self.role)
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_name() {
        let name = DatasetName::parse("OABreast_07_train").unwrap();
        assert_eq!(name.subject, SubjectId::S07);
        assert_eq!(name.role, SplitRole::Train);
        assert_eq!(name.dims(), VolumeDims::new(616, 484, 319));
    }

    #[test]
    fn test_parse_original_and_test_names() {
        let original = DatasetName::parse("OABreast_35").unwrap();
        assert_eq!(original.role, SplitRole::Original);
        assert_eq!(original.dims(), VolumeDims::new(284, 410, 722));

        let test = DatasetName::parse("OABreast_47_test").unwrap();
        assert_eq!(test.role, SplitRole::Test);
        assert_eq!(test.dims(), VolumeDims::new(494, 614, 400));
    }

    #[test]
    fn test_unknown_subject_is_configuration_error() {
        let err = DatasetName::parse("OABreast_99_train").unwrap_err();
        assert!(matches!(err, DataError::Configuration { .. }));
    }

    #[test]
    fn test_missing_subject_field() {
        let err = DatasetName::parse("OABreast").unwrap_err();
        assert!(matches!(err, DataError::Configuration { .. }));
    }

    #[test]
    fn test_downscaled_dims_use_integer_division() {
        let dims = VolumeDims::new(617, 485, 3);
        assert_eq!(dims.downscaled(2), VolumeDims::new(308, 242, 3));
        assert_eq!(VolumeDims::new(616, 484, 719).voxel_count(), 616 * 484 * 719);
    }
}
