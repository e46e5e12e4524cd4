//! Color synthesis: blob colors, pulsing opacity, and the animated hue
//! rotation accumulator.
//!
//! Two mutually exclusive modes. Palette mode hands each blob a fixed palette
//! slot (`base_index mod len`) and ignores time. Hue-range mode derives a
//! base hue from the blob's identity, then wobbles hue, saturation and
//! lightness with independent sinusoids.

use crate::blob::Blob;
use crate::clock::TICK_RATE;
use crate::color::{BlobColor, Hsl};
use crate::prng::RandomSource;
use crate::settings::Settings;

/// Peak hue wobble in degrees.
const HUE_WOBBLE: f64 = 20.0;
/// Angular rate of the hue wobble relative to simulation time.
const HUE_WOBBLE_RATE: f64 = 0.3;
/// Angular rate of the lightness oscillation (saturation runs at 1.0).
const LIGHTNESS_RATE: f64 = 0.5;
/// Angular rate of the opacity pulse.
const PULSE_RATE: f64 = 0.4;
/// Opacity pulse center and amplitude.
const PULSE_CENTER: f64 = 0.3;
const PULSE_AMPLITUDE: f64 = 0.2;

/// Width of the hue range actually used, after `hueSeparation` percent.
pub fn separation_range(settings: &Settings) -> f64 {
    (settings.hue_end - settings.hue_start) * (settings.hue_separation / 100.0)
}

fn evenly_spaced(settings: &Settings) -> bool {
    settings.evenly_spaced_colors && settings.gradient_count > 1
}

/// The blob's hue before the per-frame wobble and manual hue shift.
///
/// Evenly spaced across the separation range when enabled (and more than one
/// blob exists), otherwise a stable pseudo-random offset `(i * 0.1) mod 1`.
pub fn base_hue(settings: &Settings, base_index: usize) -> f64 {
    let range = separation_range(settings);
    if evenly_spaced(settings) {
        let spacing = range / (settings.gradient_count - 1) as f64;
        settings.hue_start + base_index as f64 * spacing
    } else {
        let offset = (base_index as f64 * 0.1) % 1.0;
        settings.hue_start + offset * range
    }
}

/// Color assigned when a blob is created.
///
/// Overwritten on the first tick, but it is what a blob shows if drawn
/// before ever being advanced.
pub fn creation_color(
    settings: &Settings,
    base_index: usize,
    rng: &mut dyn RandomSource,
) -> BlobColor {
    if let Some(palette) = settings.active_palette() {
        return BlobColor::Solid(palette[base_index % palette.len()]);
    }
    let h = if evenly_spaced(settings) {
        base_hue(settings, base_index)
    } else {
        settings.hue_start + rng.next_f64() * separation_range(settings)
    };
    let s = rng.next_range(settings.saturation_min, settings.saturation_max);
    let l = rng.next_range(settings.lightness_min, settings.lightness_max);
    BlobColor::Hsl(Hsl::new(h, s, l))
}

/// Oscillates around the middle of `[min, max]` and clamps into it.
///
/// Clamps as `max(min, min(max, v))`, so an inverted band yields `min`.
fn oscillate_in_band(min: f64, max: f64, wave: f64) -> f64 {
    let v = (min + max) / 2.0 + wave * ((max - min) / 2.0);
    v.min(max).max(min)
}

/// Color of a blob at `time`.
///
/// `pool_index` is the blob's position in the pool, which drives the
/// per-blob phase of the wobbles.
pub fn frame_color(settings: &Settings, blob: &Blob, pool_index: usize, time: f64) -> BlobColor {
    if let Some(palette) = settings.active_palette() {
        return BlobColor::Solid(palette[blob.base_index % palette.len()]);
    }
    let i = pool_index as f64;
    let shift = (time * HUE_WOBBLE_RATE + i).sin() * HUE_WOBBLE + settings.hue;
    let hue = (base_hue(settings, blob.base_index) + shift).rem_euclid(360.0);
    let sat = oscillate_in_band(
        settings.saturation_min,
        settings.saturation_max,
        (time + i).sin(),
    );
    let light = oscillate_in_band(
        settings.lightness_min,
        settings.lightness_max,
        (time * LIGHTNESS_RATE + i).sin(),
    );
    BlobColor::Hsl(Hsl::new(hue, sat, light))
}

/// Pulsing opacity of a blob, scaled by the global opacity setting.
pub fn pulse_opacity(time: f64, phase: f64, global_opacity: f64) -> f64 {
    (PULSE_CENTER + (time * PULSE_RATE + phase).sin() * PULSE_AMPLITUDE) * global_opacity
}

/// Animated hue rotation, in degrees, added to the manual hue at the
/// post-process filter stage only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HueRotation {
    degrees: f64,
}

impl HueRotation {
    /// Resumes a rotation at `degrees` (wrapped into [0, 360)).
    pub fn at(degrees: f64) -> Self {
        Self {
            degrees: degrees.rem_euclid(360.0),
        }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Advances one tick. `speed` is in full turns per second; non-positive
    /// speeds leave the accumulator untouched.
    pub fn advance(&mut self, speed: f64) {
        if speed > 0.0 {
            let per_tick = speed * 360.0 / TICK_RATE;
            self.degrees = (self.degrees + per_tick) % 360.0;
        }
    }

    /// Reacts to a new speed setting: turning rotation off snaps it back to 0.
    pub fn set_speed(&mut self, speed: f64) {
        if speed == 0.0 {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.degrees = 0.0;
    }
}
