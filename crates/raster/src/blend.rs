//! Canvas compositing: every blend mode a 2D context accepts, applied with
//! source-over Porter-Duff on premultiplied pixels.
//!
//! Blend functions `B(cb, cs)` operate on straight (unpremultiplied) color.
//! The composite is `co = as(1-ab)cs + as·ab·B(cb, cs) + (1-as)·ab·cb`,
//! `ao = as + ab(1-as)`, except `Lighter`, which adds premultiplied values.

use gradient_field_core::BlendMode;

/// Premultiplied RGBA with components in [0, 1].
pub type Premul = [f32; 4];

pub const CLEAR: Premul = [0.0; 4];

fn unpremultiply(p: Premul) -> [f32; 3] {
    if p[3] <= 0.0 {
        [0.0; 3]
    } else {
        [0, 1, 2].map(|i| (p[i] / p[3]).min(1.0))
    }
}

fn per_channel(cb: [f32; 3], cs: [f32; 3], f: impl Fn(f32, f32) -> f32) -> [f32; 3] {
    [f(cb[0], cs[0]), f(cb[1], cs[1]), f(cb[2], cs[2])]
}

fn multiply(cb: f32, cs: f32) -> f32 {
    cb * cs
}

fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        multiply(cb, 2.0 * cs)
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

fn color_dodge(cb: f32, cs: f32) -> f32 {
    if cb == 0.0 {
        0.0
    } else if cs >= 1.0 {
        1.0
    } else {
        (cb / (1.0 - cs)).min(1.0)
    }
}

fn color_burn(cb: f32, cs: f32) -> f32 {
    if cb >= 1.0 {
        1.0
    } else if cs <= 0.0 {
        0.0
    } else {
        1.0 - ((1.0 - cb) / cs).min(1.0)
    }
}

fn soft_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        let d = if cb <= 0.25 {
            ((16.0 * cb - 12.0) * cb + 4.0) * cb
        } else {
            cb.sqrt()
        };
        cb + (2.0 * cs - 1.0) * (d - cb)
    }
}

// -- non-separable helpers --

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l > n {
        out = out.map(|v| l + (v - l) * l / (l - n));
    }
    if x > 1.0 && x > l {
        out = out.map(|v| l + (v - l) * (1.0 - l) / (x - l));
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color(c.map(|v| v + d))
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max > min {
        c.map(|v| (v - min) * s / (max - min))
    } else {
        [0.0; 3]
    }
}

/// The blend function `B(cb, cs)` for a mode, on straight color.
pub fn blend_color(mode: BlendMode, cb: [f32; 3], cs: [f32; 3]) -> [f32; 3] {
    match mode {
        BlendMode::Normal | BlendMode::Lighter => cs,
        BlendMode::Multiply => per_channel(cb, cs, multiply),
        BlendMode::Screen => per_channel(cb, cs, screen),
        BlendMode::Overlay => per_channel(cb, cs, |b, s| hard_light(s, b)),
        BlendMode::Darken => per_channel(cb, cs, f32::min),
        BlendMode::Lighten => per_channel(cb, cs, f32::max),
        BlendMode::ColorDodge => per_channel(cb, cs, color_dodge),
        BlendMode::ColorBurn => per_channel(cb, cs, color_burn),
        BlendMode::HardLight => per_channel(cb, cs, hard_light),
        BlendMode::SoftLight => per_channel(cb, cs, soft_light),
        BlendMode::Difference => per_channel(cb, cs, |b, s| (b - s).abs()),
        BlendMode::Exclusion => per_channel(cb, cs, |b, s| b + s - 2.0 * b * s),
        BlendMode::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
        BlendMode::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
        BlendMode::Color => set_lum(cs, lum(cb)),
        BlendMode::Luminosity => set_lum(cb, lum(cs)),
    }
}

/// Composites `source` onto `backdrop` with `mode`.
pub fn blend_pixel(mode: BlendMode, backdrop: Premul, source: Premul) -> Premul {
    let a_s = source[3];
    if a_s <= 0.0 {
        return backdrop;
    }
    let a_b = backdrop[3];
    if mode == BlendMode::Lighter {
        return [0, 1, 2, 3].map(|i| (source[i] + backdrop[i]).min(1.0));
    }
    let cs = unpremultiply(source);
    let cb = unpremultiply(backdrop);
    let mixed = blend_color(mode, cb, cs);
    let mut out = [0.0; 4];
    for i in 0..3 {
        let v = a_s * (1.0 - a_b) * cs[i] + a_s * a_b * mixed[i] + (1.0 - a_s) * backdrop[i];
        out[i] = v.clamp(0.0, 1.0);
    }
    out[3] = (a_s + a_b * (1.0 - a_s)).clamp(0.0, 1.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Premul, b: Premul) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPS)
    }

    fn opaque(r: f32, g: f32, b: f32) -> Premul {
        [r, g, b, 1.0]
    }

    #[test]
    fn transparent_source_is_noop_for_every_mode() {
        let dst = [0.1, 0.2, 0.3, 0.4];
        for mode in BlendMode::ALL {
            assert_eq!(blend_pixel(mode, dst, CLEAR), dst, "{mode:?}");
        }
    }

    #[test]
    fn normal_opaque_replaces() {
        let out = blend_pixel(BlendMode::Normal, opaque(0.0, 0.0, 1.0), opaque(1.0, 0.0, 0.0));
        assert_eq!(out, opaque(1.0, 0.0, 0.0));
    }

    #[test]
    fn normal_half_alpha_mixes() {
        let out = blend_pixel(BlendMode::Normal, opaque(0.0, 0.0, 0.0), [0.5, 0.5, 0.5, 0.5]);
        assert!(approx(out, opaque(0.5, 0.5, 0.5)));
    }

    #[test]
    fn onto_transparent_every_mode_acts_like_normal() {
        let src = [0.3, 0.15, 0.05, 0.5];
        for mode in BlendMode::ALL {
            assert!(approx(blend_pixel(mode, CLEAR, src), src), "{mode:?}");
        }
    }

    #[test]
    fn multiply_by_white_is_identity() {
        let dst = opaque(0.2, 0.4, 0.8);
        assert!(approx(blend_pixel(BlendMode::Multiply, dst, opaque(1.0, 1.0, 1.0)), dst));
    }

    #[test]
    fn multiply_by_near_white_decays() {
        let dst = opaque(0.8, 0.8, 0.8);
        let out = blend_pixel(BlendMode::Multiply, dst, opaque(0.97, 0.97, 0.97));
        assert!((out[0] - 0.776).abs() < EPS, "{out:?}");
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn translucent_white_multiply_leaves_opaque_backdrop_unchanged() {
        let dst = opaque(0.8, 0.5, 0.2);
        let out = blend_pixel(BlendMode::Multiply, dst, [0.97, 0.97, 0.97, 0.97]);
        assert!(approx(out, dst), "{out:?}");
    }

    #[test]
    fn screen_and_lighten_never_darken() {
        let dst = opaque(0.4, 0.6, 0.2);
        let src = opaque(0.5, 0.1, 0.9);
        for mode in [BlendMode::Screen, BlendMode::Lighten, BlendMode::ColorDodge] {
            let out = blend_pixel(mode, dst, src);
            for i in 0..3 {
                assert!(out[i] + EPS >= dst[i], "{mode:?} channel {i}: {out:?}");
            }
        }
    }

    #[test]
    fn lighter_adds_and_saturates() {
        let out = blend_pixel(BlendMode::Lighter, [0.6, 0.2, 0.0, 0.6], [0.6, 0.2, 0.1, 0.6]);
        assert!(approx(out, [1.0, 0.4, 0.1, 1.0]));
    }

    #[test]
    fn difference_and_exclusion() {
        let cb = [0.8, 0.5, 0.0];
        let cs = [0.3, 0.5, 1.0];
        let d = blend_color(BlendMode::Difference, cb, cs);
        assert!((d[0] - 0.5).abs() < EPS && d[1].abs() < EPS && (d[2] - 1.0).abs() < EPS);
        let e = blend_color(BlendMode::Exclusion, cb, cs);
        assert!((e[1] - 0.5).abs() < EPS);
    }

    #[test]
    fn overlay_is_hard_light_with_layers_swapped() {
        let cb = [0.2, 0.7, 0.5];
        let cs = [0.9, 0.1, 0.4];
        assert_eq!(
            blend_color(BlendMode::Overlay, cb, cs),
            blend_color(BlendMode::HardLight, cs, cb)
        );
    }

    #[test]
    fn luminosity_takes_source_luma() {
        let out = blend_color(BlendMode::Luminosity, [1.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
        assert!((lum(out) - 0.5).abs() < 1e-4, "{out:?}");
    }

    #[test]
    fn color_keeps_backdrop_luma() {
        let cb = [0.3, 0.3, 0.3];
        let out = blend_color(BlendMode::Color, cb, [0.0, 0.0, 1.0]);
        assert!((lum(out) - 0.3).abs() < 1e-4, "{out:?}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn premul() -> impl Strategy<Value = Premul> {
            (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0)
                .prop_map(|(r, g, b, a)| [r * a, g * a, b * a, a])
        }

        proptest! {
            #[test]
            fn output_stays_in_unit_range(
                mode_idx in 0usize..BlendMode::ALL.len(),
                dst in premul(),
                src in premul(),
            ) {
                let out = blend_pixel(BlendMode::ALL[mode_idx], dst, src);
                for v in out {
                    prop_assert!((0.0..=1.0).contains(&v), "{out:?}");
                }
                for i in 0..3 {
                    prop_assert!(out[i] <= out[3] + 1e-4, "not premultiplied: {out:?}");
                }
            }
        }
    }
}
