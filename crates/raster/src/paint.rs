//! Sampling of solid and radial-gradient paints.
//!
//! Gradient stops interpolate in premultiplied space, so fading a color to
//! transparent black does not darken the color on the way.

use glam::DVec2;
use gradient_field_core::{ColorStop, Paint, Rgba};

use crate::blend::{Premul, CLEAR};

pub fn premultiply(c: Rgba) -> Premul {
    let a = c.a.clamp(0.0, 1.0);
    [
        (c.r.clamp(0.0, 1.0) * a) as f32,
        (c.g.clamp(0.0, 1.0) * a) as f32,
        (c.b.clamp(0.0, 1.0) * a) as f32,
        a as f32,
    ]
}

fn lerp(a: Premul, b: Premul, f: f32) -> Premul {
    [0, 1, 2, 3].map(|i| a[i] + (b[i] - a[i]) * f)
}

/// Color at `t` along sorted stops. Outside the stop range the nearest end
/// stop extends (pad); with no stops the result is transparent.
pub fn sample_stops(stops: &[ColorStop], t: f64) -> Premul {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return CLEAR;
    };
    if t <= first.offset {
        return premultiply(first.color);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= 0.0 {
                return premultiply(b.color);
            }
            let f = ((t - a.offset) / span) as f32;
            return lerp(premultiply(a.color), premultiply(b.color), f);
        }
    }
    premultiply(last.color)
}

/// Paint color at a point in the paint's own coordinates.
pub fn sample_paint(paint: &Paint, p: DVec2) -> Premul {
    match paint {
        Paint::Solid(c) => premultiply(*c),
        Paint::Radial {
            center,
            radius,
            stops,
        } => {
            if *radius <= 0.0 {
                return CLEAR;
            }
            sample_stops(stops, p.distance(*center) / radius)
        }
    }
}
