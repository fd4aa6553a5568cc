// ============================================================
// Layer 4 — Channel Normaliser
// ============================================================
// Two steps between a u8 patch and a model-ready array:
//
//   set_channel        → make the channel count match the model
//                        (grey → 3 identical channels, RGB → luma)
//   to_numeric_tensor  → HWC → CHW, f32, scaled by range/255
//
// The output of to_numeric_tensor owns a fresh contiguous buffer,
// so nothing downstream can alias the shared volume.

use ndarray::{Array3, Axis, Zip};

// ITU-R BT.601 RGB → Y for inputs in [0, 255]; output in [16, 235].
const LUMA_OFFSET: f32 = 16.0;
const LUMA_COEFFS: [f32; 3] = [65.481, 128.553, 24.966];

#[derive(Debug, Clone, Copy)]
pub struct ChannelNormalizer {
    /// Channel count the model expects (1 or 3)
    pub n_colors:  usize,
    /// Upper end of the numeric range the model expects
    pub rgb_range: f32,
}

impl ChannelNormalizer {
    pub fn new(n_colors: usize, rgb_range: f32) -> Self {
        Self { n_colors, rgb_range }
    }

    /// Reconcile the channel count of one HWC image.
    pub fn set_channel(&self, img: Array3<f32>) -> Array3<f32> {
        let channels = img.len_of(Axis(2));
        match (self.n_colors, channels) {
            (1, 3) => rgb_to_luma(&img),
            (3, 1) => {
                let (h, w, _) = img.dim();
                Array3::from_shape_fn((h, w, 3), |(y, x, _)| img[[y, x, 0]])
            }
            _ => img,
        }
    }

    /// HWC → CHW, scaled by `rgb_range / 255`.
    pub fn to_numeric_tensor(&self, img: &Array3<f32>) -> Array3<f32> {
        let factor = self.rgb_range / 255.0;
        let chw    = img.view().permuted_axes([2, 0, 1]);
        let mut out = chw.as_standard_layout().into_owned();
        out.mapv_inplace(|v| v * factor);
        out
    }
}

/// Collapse an RGB image to its luma channel (kept as a 1-channel image).
fn rgb_to_luma(img: &Array3<f32>) -> Array3<f32> {
    let (h, w, _) = img.dim();
    let mut out = Array3::<f32>::zeros((h, w, 1));
    let r = img.index_axis(Axis(2), 0);
    let g = img.index_axis(Axis(2), 1);
    let b = img.index_axis(Axis(2), 2);

    Zip::from(out.index_axis_mut(Axis(2), 0))
        .and(&r)
        .and(&g)
        .and(&b)
        .for_each(|y, &r, &g, &b| {
            *y = LUMA_OFFSET
                + (LUMA_COEFFS[0] * r + LUMA_COEFFS[1] * g + LUMA_COEFFS[2] * b) / 255.0;
        });
    out
}
