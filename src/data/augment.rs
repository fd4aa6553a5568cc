// ============================================================
// Layer 4 — Paired Augmentation
// ============================================================
// Random flips and transposition applied identically to every
// member of a group (usually [lr, hr]). One decision is drawn per
// call and shared, so the members stay co-registered:
//
//   hflip     → reverse the width axis
//   vflip     → reverse the height axis
//   transpose → swap height and width (channel stays last)
//
// Applied in that order. Flip + transpose combinations reach all
// eight dihedral orientations of a square patch.

use ndarray::{s, Array3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which augmentations may fire, and how often.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Enables horizontal flips
    pub hflip:       bool,
    /// Enables vertical flips and transposition
    pub rot:         bool,
    /// Probability of each enabled decision being true
    pub probability: f64,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self { hflip: true, rot: true, probability: 0.5 }
    }
}

/// One draw of the three decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AugmentDecision {
    pub hflip:     bool,
    pub vflip:     bool,
    pub transpose: bool,
}

impl AugmentDecision {
    /// Apply this decision to a single HWC image.
    pub fn apply<A: Clone>(&self, img: Array3<A>) -> Array3<A> {
        let mut img = img;
        if self.hflip {
            img = img.slice_move(s![.., ..;-1, ..]);
        }
        if self.vflip {
            img = img.slice_move(s![..;-1, .., ..]);
        }
        if self.transpose {
            img = img.permuted_axes([1, 0, 2]);
        }
        img.as_standard_layout().into_owned()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Augmentor {
    config: AugmentConfig,
}

impl Augmentor {
    pub fn new(config: AugmentConfig) -> Self {
        Self { config }
    }

    /// Draw hflip, vflip, transpose in that order. A disabled decision is
    /// false and consumes no randomness.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> AugmentDecision {
        let p = self.config.probability.clamp(0.0, 1.0);
        let hflip     = self.config.hflip && rng.gen_bool(p);
        let vflip     = self.config.rot   && rng.gen_bool(p);
        let transpose = self.config.rot   && rng.gen_bool(p);
        AugmentDecision { hflip, vflip, transpose }
    }

    /// Transform every image of the group with one shared decision.
    pub fn augment<A: Clone, R: Rng + ?Sized, const N: usize>(
        &self,
        images: [Array3<A>; N],
        rng:    &mut R,
    ) -> [Array3<A>; N] {
        let decision = self.draw(rng);
        images.map(|img| decision.apply(img))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn marker(h: usize, w: usize, at: (usize, usize)) -> Array3<u8> {
        let mut img = Array3::zeros((h, w, 1));
        img[[at.0, at.1, 0]] = 255;
        img
    }

    fn find_marker(img: &Array3<u8>) -> (usize, usize) {
        let (y, x, _) = img
            .indexed_iter()
            .find(|(_, &v)| v == 255)
            .map(|(idx, _)| idx)
            .unwrap();
        (y, x)
    }

    #[test]
    fn test_each_transform_moves_marker() {
        let img = marker(4, 6, (1, 2));

        let h = AugmentDecision { hflip: true, ..Default::default() }.apply(img.clone());
        assert_eq!(find_marker(&h), (1, 3));

        let v = AugmentDecision { vflip: true, ..Default::default() }.apply(img.clone());
        assert_eq!(find_marker(&v), (2, 2));

        let t = AugmentDecision { transpose: true, ..Default::default() }.apply(img);
        assert_eq!(t.dim(), (6, 4, 1));
        assert_eq!(find_marker(&t), (2, 1));
    }

    #[test]
    fn test_group_stays_aligned() {
        // LR marker at (3, 5) lines up with HR marker at (6, 10) for x2
        let augmentor = Augmentor::new(AugmentConfig::default());
        let mut rng   = StdRng::seed_from_u64(11);

        for _ in 0..64 {
            let lr = marker(8, 8, (3, 5));
            let hr = Array3::from_shape_fn((16, 16, 1), |(y, x, _)| lr[[y / 2, x / 2, 0]]);

            let [lr, hr] = augmentor.augment([lr, hr], &mut rng);
            let (ly, lx) = find_marker(&lr);
            let (hy, hx) = find_marker(&hr);
            assert_eq!((hy / 2, hx / 2), (ly, lx));
        }
    }

    #[test]
    fn test_disabled_flags_never_fire() {
        let augmentor = Augmentor::new(AugmentConfig { hflip: false, rot: false, probability: 0.5 });
        let mut rng   = StdRng::seed_from_u64(5);
        for _ in 0..32 {
            assert_eq!(augmentor.draw(&mut rng), AugmentDecision::default());
        }
    }

    #[test]
    fn test_same_seed_same_decision() {
        let augmentor = Augmentor::new(AugmentConfig::default());
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..16).map(|_| augmentor.draw(&mut rng)).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..16).map(|_| augmentor.draw(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_output_is_standard_layout() {
        let img = marker(3, 5, (0, 0));
        let out = AugmentDecision { hflip: true, vflip: true, transpose: true }.apply(img);
        assert!(out.is_standard_layout());
    }
}
