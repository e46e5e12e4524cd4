//! CSS display filters applied to a straight RGBA8 buffer.
//!
//! Order follows the filter string: brightness, contrast, saturate, then
//! hue-rotate, each clamped to [0, 1] before the next. Alpha is untouched.

use gradient_field_core::FilterStack;

type Matrix = [[f64; 3]; 3];

fn saturate_matrix(s: f64) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f64) -> Matrix {
    let (s, c) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + c * 0.787 - s * 0.213,
            0.715 - c * 0.715 - s * 0.715,
            0.072 - c * 0.072 + s * 0.928,
        ],
        [
            0.213 - c * 0.213 + s * 0.143,
            0.715 + c * 0.285 + s * 0.140,
            0.072 - c * 0.072 - s * 0.283,
        ],
        [
            0.213 - c * 0.213 - s * 0.787,
            0.715 - c * 0.715 + s * 0.715,
            0.072 + c * 0.928 + s * 0.072,
        ],
    ]
}

fn apply_matrix(m: &Matrix, c: [f64; 3]) -> [f64; 3] {
    m.map(|row| (row[0] * c[0] + row[1] * c[1] + row[2] * c[2]).clamp(0.0, 1.0))
}

/// Stack resolved to slopes and matrices once per frame.
struct Resolved {
    brightness: f64,
    contrast: f64,
    saturate: Matrix,
    hue: Matrix,
}

impl Resolved {
    fn new(filter: &FilterStack) -> Self {
        Self {
            brightness: filter.brightness.max(0.0) / 100.0,
            contrast: filter.contrast.max(0.0) / 100.0,
            saturate: saturate_matrix(filter.saturation.max(0.0) / 100.0),
            hue: hue_rotate_matrix(filter.hue_rotate),
        }
    }

    fn apply(&self, c: [f64; 3]) -> [f64; 3] {
        let (b, k) = (self.brightness, self.contrast);
        let c = c.map(|v| (v * b).clamp(0.0, 1.0));
        let c = c.map(|v| (v * k + 0.5 - 0.5 * k).clamp(0.0, 1.0));
        apply_matrix(&self.hue, apply_matrix(&self.saturate, c))
    }
}

/// One straight sRGB color through the whole stack.
pub fn filter_color(filter: &FilterStack, c: [f64; 3]) -> [f64; 3] {
    Resolved::new(filter).apply(c)
}

/// Filters `rgba` in place. An identity stack leaves the buffer untouched.
pub fn apply_filters(rgba: &mut [u8], filter: &FilterStack) {
    if filter.is_identity() {
        return;
    }
    let resolved = Resolved::new(filter);
    for px in rgba.chunks_exact_mut(4) {
        let c = resolved.apply([px[0], px[1], px[2]].map(|v| f64::from(v) / 255.0));
        for i in 0..3 {
            px[i] = (c[i] * 255.0).round() as u8;
        }
    }
}
