//! Separable gaussian blur over premultiplied pixels.
//!
//! Samples past the edge clamp to the nearest edge pixel, so a fill that
//! covers the whole surface keeps full coverage at the borders.

use crate::blend::Premul;

/// Kernel half-width in multiples of sigma.
const KERNEL_SIGMAS: f64 = 3.0;

/// Normalized 1D gaussian weights for `sigma`, `2r + 1` taps.
fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f32> {
    let radius = ((sigma * KERNEL_SIGMAS).ceil() as usize).clamp(1, max_radius.max(1));
    let denom = 2.0 * sigma * sigma;
    let r = radius as i64;
    let weights: Vec<f64> = (-r..=r).map(|i| (-((i * i) as f64) / denom).exp()).collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Blurs a `width * height` buffer. Non-positive or non-finite sigma returns
/// the input unchanged.
pub fn gaussian_blur(src: &[Premul], width: usize, height: usize, sigma: f64) -> Vec<Premul> {
    if !(sigma.is_finite() && sigma > 0.0) || width == 0 || height == 0 {
        return src.to_vec();
    }
    let kernel = gaussian_kernel(sigma, width.max(height));
    let mut tmp = vec![[0.0; 4]; src.len()];
    let mut out = vec![[0.0; 4]; src.len()];
    pass(src, &mut tmp, width, height, &kernel, true);
    pass(&tmp, &mut out, width, height, &kernel, false);
    out
}

fn pass(src: &[Premul], dst: &mut [Premul], width: usize, height: usize, k: &[f32], horizontal: bool) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (width as i64, height as i64);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i64 - radius;
                let (sx, sy) = if horizontal {
                    ((x + d).clamp(0, w - 1), y)
                } else {
                    (x, (y + d).clamp(0, h - 1))
                };
                let px = src[(sy * w + sx) as usize];
                for c in 0..4 {
                    acc[c] += kw * px[c];
                }
            }
            dst[(y * w + x) as usize] = acc.map(|v| v.clamp(0.0, 1.0));
        }
    }
}
