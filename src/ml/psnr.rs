// ============================================================
// Layer 5 — PSNR and Quantisation
// ============================================================
// PSNR in dB between a super-resolved batch and its HR target:
//
//   diff = (sr - hr) / rgb_range
//   mse  = mean(diff²) over the interior, `shave` pixels dropped
//          from every border
//   psnr = -10 · log10(mse)
//
// Benchmark datasets shave `scale` pixels and compare on luma
// (3-channel diffs are collapsed with BT.601 weights / 256).
// Every other dataset shaves `scale + 6`.

use burn::prelude::*;

use crate::error::{DataError, Result};

const GRAY_COEFFS: [f32; 3] = [65.738, 129.057, 25.064];

/// Round to the 8-bit grid of `rgb_range`, clamped to the valid range.
pub fn quantize<B: Backend>(img: Tensor<B, 4>, rgb_range: f64) -> Tensor<B, 4> {
    let pixel_range = 255.0 / rgb_range;
    img.mul_scalar(pixel_range)
        .clamp(0.0, 255.0)
        .round()
        .div_scalar(pixel_range)
}

/// PSNR of `sr` against `hr`, both [batch, channels, height, width].
pub fn calc_psnr<B: Backend>(
    sr:        Tensor<B, 4>,
    hr:        Tensor<B, 4>,
    scale:     usize,
    rgb_range: f64,
    benchmark: bool,
) -> Result<f64> {
    if sr.dims() != hr.dims() {
        return Err(DataError::geometry(format!(
            "SR {:?} and HR {:?} differ in shape",
            sr.dims(),
            hr.dims()
        )));
    }
    if hr.shape().num_elements() == 1 {
        return Ok(0.0);
    }

    let device = hr.device();
    let mut diff = (sr - hr).div_scalar(rgb_range);

    let shave = if benchmark {
        let [_, c, _, _] = diff.dims();
        if c == 3 {
            let convert = Tensor::<B, 1>::from_floats(GRAY_COEFFS.as_slice(), &device)
                .div_scalar(256.0)
                .reshape([1, 3, 1, 1]);
            diff = diff.mul(convert).sum_dim(1);
        }
        scale
    } else {
        scale + 6
    };

    let [n, c, h, w] = diff.dims();
    if h <= 2 * shave || w <= 2 * shave {
        return Err(DataError::geometry(format!(
            "{h}x{w} image leaves nothing after shaving {shave} pixels per border"
        )));
    }

    let valid = diff.slice([0..n, 0..c, shave..h - shave, shave..w - shave]);
    let mse: f64 = valid.powf_scalar(2.0).mean().into_scalar().elem::<f64>();

    Ok(-10.0 * mse.log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn filled(value: f32, dims: [usize; 4]) -> Tensor<TestBackend, 4> {
        Tensor::<TestBackend, 4>::ones(dims, &Default::default()).mul_scalar(value)
    }

    #[test]
    fn test_constant_offset_psnr() {
        // diff = 25.5 / 255 = 0.1 everywhere → mse 0.01 → 20 dB
        let sr   = filled(125.5, [1, 1, 32, 32]);
        let hr   = filled(100.0, [1, 1, 32, 32]);
        let psnr = calc_psnr(sr, hr, 2, 255.0, false).unwrap();
        assert!((psnr - 20.0).abs() < 1e-3, "psnr = {psnr}");
    }

    #[test]
    fn test_identical_images_are_infinite() {
        let psnr = calc_psnr(filled(3.0, [1, 1, 20, 20]), filled(3.0, [1, 1, 20, 20]), 2, 255.0, false)
            .unwrap();
        assert!(psnr.is_infinite());
    }

    #[test]
    fn test_border_is_shaved() {
        // Error only in the corner pixel; shave = 2 + 6 removes it
        let hr = filled(0.0, [1, 1, 24, 24]);
        let mut sr_data = vec![0.0f32; 24 * 24];
        sr_data[0] = 200.0;
        let sr = Tensor::<TestBackend, 1>::from_floats(sr_data.as_slice(), &Default::default())
            .reshape([1, 1, 24, 24]);

        let psnr = calc_psnr(sr, hr, 2, 255.0, false).unwrap();
        assert!(psnr.is_infinite());
    }

    #[test]
    fn test_benchmark_luma_collapse() {
        let sr   = filled(25.5, [1, 3, 16, 16]);
        let hr   = filled(0.0, [1, 3, 16, 16]);
        let psnr = calc_psnr(sr, hr, 2, 255.0, true).unwrap();
        // diff 0.1 per channel, luma weight sum = 219.859 / 256
        let y: f64 = 0.1 * (65.738 + 129.057 + 25.064) / 256.0;
        let expected: f64 = -10.0 * (y * y).log10();
        assert!((psnr - expected).abs() < 1e-3, "{psnr} vs {expected}");
    }

    #[test]
    fn test_too_small_to_shave() {
        let err = calc_psnr(filled(1.0, [1, 1, 10, 10]), filled(0.0, [1, 1, 10, 10]), 2, 255.0, false)
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_quantize_rounds_and_clamps() {
        let device = Default::default();
        let img = Tensor::<TestBackend, 1>::from_floats([0.2f32, 0.5, 1.7, -3.0, 300.0].as_slice(), &device)
            .reshape([1, 1, 1, 5]);
        let out: Vec<f32> = quantize(img, 255.0).into_data().to_vec().unwrap();
        assert_eq!(out[0], 0.0);
        assert_eq!(out[2], 2.0);
        assert_eq!(out[3], 0.0);
        assert_eq!(out[4], 255.0);
    }
}
