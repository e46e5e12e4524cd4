#![deny(unsafe_code)]
//! CPU replay of gradient-field frames.
//!
//! A [`Raster`] owns a premultiplied working buffer at the frame's physical
//! size and replays each [`DrawOp`] the way a 2D canvas context would: the
//! op's transform composed onto the device-pixel-ratio base transform, the
//! paint sampled at pixel centres, an optional per-draw gaussian blur, then
//! the op's blend mode. Display filters apply on readout, not to the buffer,
//! so accumulation across frames is unaffected by them.

pub mod blend;
pub mod blur;
pub mod filter;
pub mod paint;
pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::{DAffine2, DVec2};
use gradient_field_core::{DrawOp, EngineError, FilterStack, Frame, SurfaceLayout};

use crate::blend::{blend_pixel, Premul, CLEAR};

/// Largest surface area, in pixels, a browser canvas accepts.
pub const MAX_PIXELS: usize = 1 << 28;

/// Pixel-space span `[x0, x1) x [y0, y1)`.
type Span = (usize, usize, usize, usize);

/// A persistent software surface.
#[derive(Debug, Clone)]
pub struct Raster {
    layout: SurfaceLayout,
    pixels: Vec<Premul>,
}

impl Raster {
    /// Allocates a transparent surface for `layout`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either physical dimension is
    /// zero or the area exceeds [`MAX_PIXELS`].
    pub fn new(layout: SurfaceLayout) -> Result<Self, EngineError> {
        let w = layout.physical_width as usize;
        let h = layout.physical_height as usize;
        if w == 0 || h == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = w
            .checked_mul(h)
            .filter(|&len| len <= MAX_PIXELS)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            layout,
            pixels: vec![CLEAR; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.layout.physical_width
    }

    pub fn height(&self) -> u32 {
        self.layout.physical_height
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.layout
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Premul> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.pixels
            .get(y as usize * self.width() as usize + x as usize)
            .copied()
    }

    /// Replays one frame onto the surface. A frame with a different layout
    /// reallocates the surface first, which clears it.
    #[tracing::instrument(level = "trace", skip_all, fields(ops = frame.ops.len()))]
    pub fn draw(&mut self, frame: &Frame) -> Result<(), EngineError> {
        if frame.layout != self.layout {
            tracing::debug!(
                width = frame.layout.physical_width,
                height = frame.layout.physical_height,
                "raster resized"
            );
            *self = Raster::new(frame.layout)?;
        }
        for op in &frame.ops {
            self.draw_op(op);
        }
        Ok(())
    }

    fn draw_op(&mut self, op: &DrawOp) {
        let to_device = self.layout.base_transform() * op.transform;
        if to_device.matrix2.determinant().abs() < f64::EPSILON {
            return;
        }
        let to_local = to_device.inverse();
        let (w, h) = (self.width() as usize, self.height() as usize);
        let sigma = op.blur * self.layout.device_pixel_ratio;

        if sigma > 0.0 {
            // The blur spreads past the shape, so the layer covers the surface.
            let mut layer = vec![CLEAR; self.pixels.len()];
            for_each_pixel((0, w, 0, h), |x, y| {
                layer[y * w + x] = sample(op, &to_local, x, y);
            });
            let layer = blur::gaussian_blur(&layer, w, h, sigma);
            for (dst, src) in self.pixels.iter_mut().zip(layer) {
                *dst = blend_pixel(op.blend, *dst, src);
            }
            return;
        }

        let Some(span) = device_span(&to_device, op, w, h) else {
            return;
        };
        let pixels = &mut self.pixels;
        for_each_pixel(span, |x, y| {
            let i = y * w + x;
            pixels[i] = blend_pixel(op.blend, pixels[i], sample(op, &to_local, x, y));
        });
    }

    /// Straight RGBA8 of the surface, without display filters.
    pub fn pixels(&self) -> Vec<u8> {
        pixel::premul_to_rgba8(&self.pixels)
    }

    /// Straight RGBA8 as displayed through `filter`.
    pub fn to_rgba(&self, filter: &FilterStack) -> Vec<u8> {
        let mut rgba = self.pixels();
        filter::apply_filters(&mut rgba, filter);
        rgba
    }
}

fn for_each_pixel(span: Span, mut f: impl FnMut(usize, usize)) {
    let (x0, x1, y0, y1) = span;
    for y in y0..y1 {
        for x in x0..x1 {
            f(x, y);
        }
    }
}

/// Paint at the centre of device pixel `(x, y)`, clipped to the op's rect.
fn sample(op: &DrawOp, to_local: &DAffine2, x: usize, y: usize) -> Premul {
    let local = to_local.transform_point2(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
    if op.rect.contains(local) {
        paint::sample_paint(&op.paint, local)
    } else {
        CLEAR
    }
}

/// Device-pixel bounding box of the op's rect, clamped to the surface.
fn device_span(to_device: &DAffine2, op: &DrawOp, w: usize, h: usize) -> Option<Span> {
    let r = op.rect;
    let corners = [
        DVec2::new(r.x, r.y),
        DVec2::new(r.x + r.width, r.y),
        DVec2::new(r.x, r.y + r.height),
        DVec2::new(r.x + r.width, r.y + r.height),
    ]
    .map(|p| to_device.transform_point2(p));
    if corners.iter().any(|p| !p.is_finite()) {
        return None;
    }
    let min = corners.iter().fold(DVec2::INFINITY, |a, p| a.min(*p));
    let max = corners.iter().fold(DVec2::NEG_INFINITY, |a, p| a.max(*p));
    let x0 = min.x.floor().clamp(0.0, w as f64) as usize;
    let x1 = max.x.ceil().clamp(0.0, w as f64) as usize;
    let y0 = min.y.floor().clamp(0.0, h as f64) as usize;
    let y1 = max.y.ceil().clamp(0.0, h as f64) as usize;
    (x0 < x1 && y0 < y1).then_some((x0, x1, y0, y1))
}
