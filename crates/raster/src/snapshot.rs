//! PNG export of a [`Raster`].
//!
//! Feature-gated behind `png` (default on) so that WASM builds can depend on
//! this crate without pulling in the `image` crate.

use gradient_field_core::{EngineError, FilterStack};
use std::path::Path;

use crate::Raster;

/// Writes the surface as displayed through `filter` as a PNG image.
///
/// Returns `EngineError::Io` on write failure.
pub fn write_png(raster: &Raster, filter: &FilterStack, path: &Path) -> Result<(), EngineError> {
    let rgba = raster.to_rgba(filter);
    let img = image::RgbaImage::from_raw(raster.width(), raster.height(), rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), "wrote png");
    Ok(())
}
