// ============================================================
// Layer 4 — Patch Sampler
// ============================================================
// Cuts a co-located LR/HR patch pair out of one slice pair.
//
// In Standard mode the HR image has `scale` times as many pixels
// per side as the LR image, so an LR patch of edge P at (ix, iy)
// corresponds to an HR patch of edge P*scale at (ix*scale, iy*scale):
//
//      LR (ih x iw)                 HR (ih*s x iw*s)
//   ┌──────────────┐          ┌────────────────────────┐
//   │  (ix,iy)     │          │   (ix*s, iy*s)         │
//   │    ┌──┐      │   ───►   │      ┌────┐            │
//   │    └──┘ P    │          │      │    │ P*s        │
//   └──────────────┘          │      └────┘            │
//                             └────────────────────────┘
//
// In LargeInput mode training patches share one pixel grid, so the
// corner and edge are used unchanged on the HR side. Evaluation
// always crops HR to `scale` times the LR slice, whatever the mode.

use ndarray::{s, ArrayView3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::volume::Image;
use crate::error::{DataError, Result};

/// How LR pixel coordinates map onto the HR image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingMode {
    /// HR = scale × LR in both dimensions.
    #[default]
    Standard,
    /// LR and HR share one pixel grid (pre-upsampled input).
    LargeInput,
}

impl SamplingMode {
    /// Mode implied by a model name. Only VDSR consumes pre-upsampled input.
    pub fn for_model(model: &str) -> Self {
        if model.eq_ignore_ascii_case("vdsr") {
            Self::LargeInput
        } else {
            Self::Standard
        }
    }

    /// Factor applied to LR coordinates to reach HR coordinates.
    pub fn hr_factor(&self, scale: usize) -> usize {
        match self {
            Self::Standard   => scale,
            Self::LargeInput => 1,
        }
    }

    /// (LR edge, HR edge) for a training patch.
    pub fn patch_edges(&self, patch_size: usize, scale: usize) -> (usize, usize) {
        match self {
            Self::Standard   => (patch_size, patch_size * scale),
            Self::LargeInput => (patch_size, patch_size),
        }
    }
}

/// Top-left corner of a patch, in LR pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub ix: usize,
    pub iy: usize,
}

/// A co-located LR/HR pair of HWC images.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPair<A> {
    pub lr: Image<A>,
    pub hr: Image<A>,
}

impl<A> PatchPair<A> {
    pub fn new(lr: Image<A>, hr: Image<A>) -> Self {
        Self { lr, hr }
    }

    /// Apply the same transform to both members.
    pub fn map<B, F>(self, mut f: F) -> PatchPair<B>
    where
        F: FnMut(Image<A>) -> Image<B>,
    {
        PatchPair { lr: f(self.lr), hr: f(self.hr) }
    }

    pub fn into_array(self) -> [Image<A>; 2] {
        [self.lr, self.hr]
    }

    pub fn from_array([lr, hr]: [Image<A>; 2]) -> Self {
        Self { lr, hr }
    }
}

/// Extracts synchronized patch pairs. Stateless apart from its mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchSampler {
    mode: SamplingMode,
}

impl PatchSampler {
    pub fn new(mode: SamplingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Random co-located crop for training.
    pub fn sample_train<R: Rng + ?Sized>(
        &self,
        lr:         ArrayView3<'_, u8>,
        hr:         ArrayView3<'_, u8>,
        patch_size: usize,
        scale:      usize,
        rng:        &mut R,
    ) -> Result<PatchPair<u8>> {
        let (ip, _) = self.mode.patch_edges(patch_size, scale);
        let corner  = draw_corner(lr, ip, rng)?;
        self.extract_at(lr, hr, corner, patch_size, scale)
    }

    /// Deterministic crop at a known LR corner.
    pub fn extract_at(
        &self,
        lr:         ArrayView3<'_, u8>,
        hr:         ArrayView3<'_, u8>,
        corner:     Corner,
        patch_size: usize,
        scale:      usize,
    ) -> Result<PatchPair<u8>> {
        let (ip, tp)  = self.mode.patch_edges(patch_size, scale);
        let factor    = self.mode.hr_factor(scale);
        let (ih, iw, _) = lr.dim();
        let (th, tw, _) = hr.dim();
        let Corner { ix, iy } = corner;

        if ip == 0 || iy + ip > ih || ix + ip > iw {
            return Err(DataError::geometry(format!(
                "LR patch {ip}x{ip} at ({ix}, {iy}) does not fit LR slice {ih}x{iw}"
            )));
        }

        let (tx, ty) = (ix * factor, iy * factor);
        if ty + tp > th || tx + tp > tw {
            return Err(DataError::geometry(format!(
                "HR patch {tp}x{tp} at ({tx}, {ty}) does not fit HR slice {th}x{tw}"
            )));
        }

        let lr_patch = lr.slice(s![iy..iy + ip, ix..ix + ip, ..]).to_owned();
        let hr_patch = hr.slice(s![ty..ty + tp, tx..tx + tp, ..]).to_owned();
        Ok(PatchPair::new(lr_patch, hr_patch))
    }

    /// Full-slice pair for evaluation. HR is cut to `scale` times the LR
    /// slice in both modes; the border that does not cover a whole LR
    /// pixel is discarded.
    pub fn sample_eval(
        &self,
        lr:    ArrayView3<'_, u8>,
        hr:    ArrayView3<'_, u8>,
        scale: usize,
    ) -> Result<PatchPair<u8>> {
        let (ih, iw, _) = lr.dim();
        let (th, tw, _) = hr.dim();
        let (ch, cw)    = (ih * scale, iw * scale);

        if ch > th || cw > tw {
            return Err(DataError::geometry(format!(
                "HR slice {th}x{tw} is smaller than {ch}x{cw} required by LR {ih}x{iw} at x{scale}"
            )));
        }

        let hr_crop = hr.slice(s![0..ch, 0..cw, ..]).to_owned();
        Ok(PatchPair::new(lr.to_owned(), hr_crop))
    }
}

/// Uniform corner such that an `ip`-sized patch fits inside `lr`.
pub fn draw_corner<R: Rng + ?Sized>(
    lr:  ArrayView3<'_, u8>,
    ip:  usize,
    rng: &mut R,
) -> Result<Corner> {
    let (ih, iw, _) = lr.dim();
    if ip == 0 || ip > ih || ip > iw {
        return Err(DataError::geometry(format!(
            "patch edge {ip} does not fit LR slice {ih}x{iw}"
        )));
    }

    Ok(Corner {
        ix: rng.gen_range(0..=iw - ip),
        iy: rng.gen_range(0..=ih - ip),
    })
}
