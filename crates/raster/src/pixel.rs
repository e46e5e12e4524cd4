//! Conversion of the premultiplied working buffer to straight RGBA8.
//!
//! Always available (no feature gate) so the PNG path and any in-memory
//! consumer share the same conversion.

use crate::blend::Premul;

/// Unpremultiplies and quantizes to four bytes per pixel.
pub fn premul_to_rgba8(pixels: &[Premul]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|p| {
            let a = p[3].clamp(0.0, 1.0);
            let channel = |v: f32| {
                if a <= 0.0 {
                    0
                } else {
                    ((v / a).clamp(0.0, 1.0) * 255.0).round() as u8
                }
            };
            [channel(p[0]), channel(p[1]), channel(p[2]), (a * 255.0).round() as u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_length() {
        let buf = premul_to_rgba8(&[[0.0; 4]; 6]);
        assert_eq!(buf.len(), 24);
    }

    #[test]
    fn unpremultiplies() {
        let buf = premul_to_rgba8(&[[0.5, 0.25, 0.0, 0.5]]);
        assert_eq!(buf, vec![255, 128, 0, 128]);
    }

    #[test]
    fn transparent_is_all_zero() {
        assert_eq!(premul_to_rgba8(&[[0.3, 0.3, 0.3, 0.0]]), vec![0, 0, 0, 0]);
    }
}
