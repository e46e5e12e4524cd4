//! Drawing surface sizing with device-pixel-ratio awareness.
//!
//! The backing store is `logical * dpr` physical pixels, displayed at the
//! logical (CSS) size, with a uniform `dpr` scale applied to the drawing
//! transform so all drawing happens in logical coordinates.

use glam::{DAffine2, DVec2};

use crate::error::EngineError;

/// What the host reports about its viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width in CSS pixels.
    pub width: f64,
    /// Logical height in CSS pixels.
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }
}

/// Resolved surface geometry after a resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayout {
    /// Logical size; also the displayed (CSS) size.
    pub logical: DVec2,
    pub physical_width: u32,
    pub physical_height: u32,
    pub device_pixel_ratio: f64,
}

impl SurfaceLayout {
    /// Logical-to-physical transform applied before any drawing.
    pub fn base_transform(&self) -> DAffine2 {
        DAffine2::from_scale(DVec2::splat(self.device_pixel_ratio))
    }

    /// Display size of the surface element.
    pub fn css_size(&self) -> DVec2 {
        self.logical
    }
}

/// Owns the current surface geometry.
#[derive(Debug, Clone)]
pub struct Surface {
    layout: SurfaceLayout,
}

fn resolve(viewport: Viewport) -> Result<SurfaceLayout, EngineError> {
    let Viewport {
        width,
        height,
        device_pixel_ratio,
    } = viewport;
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(EngineError::InvalidDimensions);
    }
    // Hosts without a ratio report 0 or NaN; treat as 1.
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    // Canvas backing-store sizes truncate.
    let physical = |logical: f64| {
        let px = (logical * dpr).floor().max(1.0) as u64;
        u32::try_from(px).map_err(|_| EngineError::InvalidDimensions)
    };
    Ok(SurfaceLayout {
        logical: DVec2::new(width, height),
        physical_width: physical(width)?,
        physical_height: physical(height)?,
        device_pixel_ratio: dpr,
    })
}

impl Surface {
    /// A surface sized for `viewport`.
    ///
    /// Returns `EngineError::InvalidDimensions` for a non-positive or
    /// non-finite logical size, or a physical size that overflows `u32`.
    pub fn new(viewport: Viewport) -> Result<Self, EngineError> {
        Ok(Self {
            layout: resolve(viewport)?,
        })
    }

    /// Re-sizes the surface for a new viewport and returns the new layout.
    ///
    /// On error the previous layout is kept.
    pub fn resize(&mut self, viewport: Viewport) -> Result<SurfaceLayout, EngineError> {
        self.layout = resolve(viewport)?;
        tracing::debug!(
            width = self.layout.logical.x,
            height = self.layout.logical.y,
            dpr = self.layout.device_pixel_ratio,
            "surface resized"
        );
        Ok(self.layout)
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.layout
    }

    /// Logical size, the coordinate space blobs live in.
    pub fn bounds(&self) -> DVec2 {
        self.layout.logical
    }
}
