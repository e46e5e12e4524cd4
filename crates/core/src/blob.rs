//! Blobs and the pool that creates them.

use glam::DVec2;
use std::f64::consts::TAU;

use crate::color::BlobColor;
use crate::prng::RandomSource;
use crate::settings::{Settings, SizeMode};
use crate::synth;

/// Radii are drawn from `[RADIUS_MIN, RADIUS_MIN + RADIUS_SPAN)` before the
/// base-mode size multiplier.
const RADIUS_MIN: f64 = 200.0;
const RADIUS_SPAN: f64 = 400.0;
/// Creation opacity range `[0.3, 0.7)`.
const OPACITY_MIN: f64 = 0.3;
const OPACITY_SPAN: f64 = 0.4;

/// One animated gradient entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Center in logical pixels. Rewritten every tick.
    pub position: DVec2,
    /// Extent in absolute logical pixels, fixed at creation.
    pub radius: f64,
    /// Offset into the periodic motion, in `[0, 2π)`.
    pub phase: f64,
    /// Creation-order identity in `0..count`.
    pub base_index: usize,
    /// Rewritten every tick.
    pub color: BlobColor,
    /// Rewritten every tick.
    pub opacity: f64,
}

/// The live blob set plus the randomness it is generated from.
pub struct BlobPool {
    blobs: Vec<Blob>,
    rng: Box<dyn RandomSource>,
}

impl std::fmt::Debug for BlobPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobPool")
            .field("blobs", &self.blobs)
            .finish_non_exhaustive()
    }
}

impl BlobPool {
    /// An empty pool drawing from `rng`.
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            blobs: Vec::new(),
            rng,
        }
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn blobs_mut(&mut self) -> &mut [Blob] {
        &mut self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Discards every blob and creates exactly `count` new ones.
    ///
    /// Positions are uniform over `bounds`; radii are uniform in
    /// `[200, 600)`, scaled by `size_multiplier` only in [`SizeMode::Base`].
    /// Colors come from `settings` via [`synth::creation_color`].
    #[tracing::instrument(skip(self, settings))]
    pub fn regenerate(
        &mut self,
        count: usize,
        size_mode: SizeMode,
        size_multiplier: f64,
        settings: &Settings,
        bounds: DVec2,
    ) {
        let radius_scale = match size_mode {
            SizeMode::Base => size_multiplier,
            SizeMode::Drawing => 1.0,
        };
        let rng = self.rng.as_mut();
        self.blobs = (0..count)
            .map(|base_index| {
                let position = DVec2::new(rng.next_f64() * bounds.x, rng.next_f64() * bounds.y);
                let radius = (RADIUS_MIN + rng.next_f64() * RADIUS_SPAN) * radius_scale;
                let color = synth::creation_color(settings, base_index, rng);
                let opacity = OPACITY_MIN + rng.next_f64() * OPACITY_SPAN;
                let phase = rng.next_f64() * TAU;
                Blob {
                    position,
                    radius,
                    phase,
                    base_index,
                    color,
                    opacity,
                }
            })
            .collect();
        tracing::debug!(count = self.blobs.len(), "blob pool regenerated");
    }

    /// Regenerates using the count and sizing currently in `settings`.
    pub fn regenerate_from(&mut self, settings: &Settings, bounds: DVec2) {
        self.regenerate(
            settings.gradient_count,
            settings.gradient_size_mode,
            settings.gradient_size_multiplier,
            settings,
            bounds,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;
    use crate::prng::{ScriptedSource, Xorshift64};
    use crate::settings::ColorMode;

    const BOUNDS: DVec2 = DVec2::new(1280.0, 720.0);

    fn pool(seed: u64) -> BlobPool {
        BlobPool::new(Box::new(Xorshift64::new(seed)))
    }

    #[test]
    fn regenerate_creates_exact_count_with_contiguous_indices() {
        let settings = Settings::default();
        let mut p = pool(1);
        for count in [1, 2, 5, 17] {
            p.regenerate(count, SizeMode::Base, 1.0, &settings, BOUNDS);
            assert_eq!(p.len(), count);
            let indices: Vec<usize> = p.blobs().iter().map(|b| b.base_index).collect();
            assert_eq!(indices, (0..count).collect::<Vec<_>>());
        }
    }

    #[test]
    fn regenerate_zero_empties_pool() {
        let mut p = pool(1);
        p.regenerate_from(&Settings::default(), BOUNDS);
        assert!(!p.is_empty());
        p.regenerate(0, SizeMode::Base, 1.0, &Settings::default(), BOUNDS);
        assert!(p.is_empty());
    }

    #[test]
    fn creation_ranges_hold() {
        let settings = Settings::default();
        let mut p = pool(77);
        p.regenerate(200, SizeMode::Base, 1.0, &settings, BOUNDS);
        for b in p.blobs() {
            assert!((0.0..BOUNDS.x).contains(&b.position.x));
            assert!((0.0..BOUNDS.y).contains(&b.position.y));
            assert!((200.0..600.0).contains(&b.radius), "radius {}", b.radius);
            assert!((0.0..TAU).contains(&b.phase));
            assert!((0.3..0.7).contains(&b.opacity), "opacity {}", b.opacity);
        }
    }

    #[test]
    fn base_mode_scales_radius_drawing_mode_does_not() {
        let settings = Settings::default();
        let mut scripted = BlobPool::new(Box::new(ScriptedSource::new(vec![0.5])));
        scripted.regenerate(1, SizeMode::Base, 2.0, &settings, BOUNDS);
        assert_eq!(scripted.blobs()[0].radius, 800.0);
        let mut scripted = BlobPool::new(Box::new(ScriptedSource::new(vec![0.5])));
        scripted.regenerate(1, SizeMode::Drawing, 2.0, &settings, BOUNDS);
        assert_eq!(scripted.blobs()[0].radius, 400.0);
    }

    #[test]
    fn same_seed_same_blobs() {
        let settings = Settings::default();
        let mut a = pool(9);
        let mut b = pool(9);
        a.regenerate_from(&settings, BOUNDS);
        b.regenerate_from(&settings, BOUNDS);
        assert_eq!(a.blobs(), b.blobs());
    }

    #[test]
    fn palette_creation_colors_in_creation_order() {
        let settings = Settings {
            gradient_count: 3,
            color_mode: ColorMode::Palette,
            palette_colors: ["#ff0000", "#00ff00", "#0000ff"]
                .iter()
                .map(|h| Srgb::from_hex(h).unwrap())
                .collect(),
            ..Settings::default()
        };
        let mut p = pool(3);
        p.regenerate_from(&settings, BOUNDS);
        let hexes: Vec<String> = p.blobs().iter().map(|b| b.color.to_css()).collect();
        assert_eq!(hexes, ["#ff0000", "#00ff00", "#0000ff"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn indices_always_contiguous(seed: u64, count in 1usize..64) {
                let mut p = pool(seed);
                p.regenerate(count, SizeMode::Base, 1.0, &Settings::default(), BOUNDS);
                prop_assert_eq!(p.len(), count);
                for (i, b) in p.blobs().iter().enumerate() {
                    prop_assert_eq!(b.base_index, i);
                }
            }
        }
    }
}
