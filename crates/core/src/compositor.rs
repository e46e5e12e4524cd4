//! The compositor: turns blobs and settings into a per-frame display list.
//!
//! A [`Frame`] is an ordered list of [`DrawOp`]s in logical coordinates plus
//! the display-level [`FilterStack`]. Hosts replay it: the wasm binding onto
//! a canvas 2D context, the raster crate onto a CPU buffer. Draw order is a
//! background clear (normal compositing), one or two gradient fills per blob
//! in the configured blend mode, then an optional multiply decay pass.

use glam::{DAffine2, DVec2};

use crate::blob::Blob;
use crate::clock::TICK_RATE;
use crate::color::{BlobColor, Rgba, Srgb};
use crate::settings::{BlendMode, FadeoutMode, Settings};
use crate::surface::SurfaceLayout;

/// Fadeout interval used by [`FadeoutMode::Auto`], in seconds.
pub const AUTO_FADEOUT_SECONDS: f64 = 10.0;
/// Upper bound on the per-tick decay.
pub const MAX_FADE_PER_TICK: f64 = 0.03;
/// The decay runs slightly slower than one full interval.
const FADE_EASING: f64 = 0.8;

/// Axis-aligned rectangle in an op's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// A gradient color stop. `offset` is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

/// Fill style of a draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Radial gradient from `center` (inner radius 0) out to `radius`.
    Radial {
        center: DVec2,
        radius: f64,
        stops: Vec<ColorStop>,
    },
}

/// What a draw op is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Clear,
    Radial,
    Line,
    Decay,
}

/// One rectangle fill.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    pub kind: OpKind,
    pub paint: Paint,
    /// Filled area, in the coordinates `transform` maps from.
    pub rect: Rect,
    /// Local-to-logical transform.
    pub transform: DAffine2,
    pub blend: BlendMode,
    /// Gaussian blur radius in logical pixels applied to this draw only.
    pub blur: f64,
}

/// Display-level post-process filters. Percentages are 100 at identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStack {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    /// Degrees.
    pub hue_rotate: f64,
}

impl Default for FilterStack {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            hue_rotate: 0.0,
        }
    }
}

impl FilterStack {
    /// Filters from settings; the hue rotation combines the manual hue with
    /// the animated accumulator.
    pub fn from_settings(settings: &Settings, animated_hue: f64) -> Self {
        Self {
            brightness: settings.brightness,
            contrast: settings.contrast,
            saturation: settings.saturation,
            hue_rotate: settings.hue + animated_hue,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// CSS `filter` syntax. Identity filters are omitted; all-identity is `none`.
    pub fn to_css(&self) -> String {
        let mut parts = Vec::new();
        if self.brightness != 100.0 {
            parts.push(format!("brightness({}%)", self.brightness));
        }
        if self.contrast != 100.0 {
            parts.push(format!("contrast({}%)", self.contrast));
        }
        if self.saturation != 100.0 {
            parts.push(format!("saturate({}%)", self.saturation));
        }
        if self.hue_rotate != 0.0 {
            parts.push(format!("hue-rotate({}deg)", self.hue_rotate));
        }
        if parts.is_empty() {
            "none".to_owned()
        } else {
            parts.join(" ")
        }
    }
}

/// A composed frame, ready to replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub layout: SurfaceLayout,
    pub ops: Vec<DrawOp>,
    pub filter: FilterStack,
}

impl Frame {
    pub fn ops_of(&self, kind: OpKind) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| op.kind == kind)
    }
}

/// Per-tick decay applied after drawing, or `None` when no decay pass runs.
///
/// Decay only happens for accumulating blend modes with a fadeout mode set.
/// The rate is `min(3%, (1 / interval) / 60 * 0.8)`.
pub fn fade_amount(settings: &Settings) -> Option<f64> {
    if !settings.blend_mode.is_accumulating() {
        return None;
    }
    let interval = match settings.fadeout_mode {
        FadeoutMode::None => return None,
        FadeoutMode::Auto => AUTO_FADEOUT_SECONDS,
        FadeoutMode::Custom => settings.fadeout_time,
    };
    let per_tick = (1.0 / interval) / TICK_RATE * FADE_EASING;
    Some(per_tick.min(MAX_FADE_PER_TICK).max(0.0))
}

/// Gradient stops for a blob.
///
/// Synthesized colors fade through `fade` with the blob's opacity; palette
/// colors are drawn opaque, fading straight to transparent.
pub fn blob_stops(color: BlobColor, opacity: f64, fade: f64) -> Vec<ColorStop> {
    match color {
        BlobColor::Hsl(hsl) => {
            let rgb = hsl.to_srgb();
            let fade = fade.clamp(0.0, 1.0);
            vec![
                ColorStop {
                    offset: 0.0,
                    color: rgb.with_alpha(opacity),
                },
                ColorStop {
                    offset: fade,
                    color: rgb.with_alpha(opacity * (1.0 - fade)),
                },
                ColorStop {
                    offset: 1.0,
                    color: rgb.with_alpha(0.0),
                },
            ]
        }
        BlobColor::Solid(rgb) => vec![
            ColorStop {
                offset: 0.0,
                color: rgb.with_alpha(1.0),
            },
            ColorStop {
                offset: 1.0,
                color: Rgba::TRANSPARENT,
            },
        ],
    }
}

fn line_op(blob: &Blob, settings: &Settings, stops: Vec<ColorStop>, blur: f64) -> Option<DrawOp> {
    let mult = settings.drawing_multiplier();
    let half_len = settings.line_gradient_length * mult / 2.0;
    let half_wid = settings.line_gradient_width * mult / 2.0;
    let max_r = half_len.max(half_wid);
    if !(max_r > 0.0) {
        return None;
    }
    let transform = DAffine2::from_translation(blob.position)
        * DAffine2::from_angle(settings.line_gradient_angle.to_radians())
        * DAffine2::from_scale(DVec2::new(half_len / max_r, half_wid / max_r));
    Some(DrawOp {
        kind: OpKind::Line,
        paint: Paint::Radial {
            center: DVec2::ZERO,
            radius: max_r,
            stops,
        },
        rect: Rect::new(-max_r, -max_r, 2.0 * max_r, 2.0 * max_r),
        transform,
        blend: settings.blend_mode,
        blur,
    })
}

/// Builds the display list for one frame.
#[tracing::instrument(level = "trace", skip_all, fields(blobs = blobs.len()))]
pub fn compose(
    blobs: &[Blob],
    settings: &Settings,
    layout: &SurfaceLayout,
    animated_hue: f64,
) -> Frame {
    let full = Rect::new(0.0, 0.0, layout.logical.x, layout.logical.y);
    let solid = |kind, color: Rgba, blend| DrawOp {
        kind,
        paint: Paint::Solid(color),
        rect: full,
        transform: DAffine2::IDENTITY,
        blend,
        blur: 0.0,
    };

    let mut ops = vec![solid(
        OpKind::Clear,
        settings.background_color.with_alpha(1.0),
        BlendMode::Normal,
    )];

    let blur = settings.blur.max(0.0);
    let radial_scale = settings.scale * settings.drawing_multiplier();
    for blob in blobs {
        let stops = blob_stops(blob.color, blob.opacity, settings.gradient_fade);
        if settings.radial_gradients_enabled {
            let radius = blob.radius * radial_scale;
            if radius > 0.0 {
                ops.push(DrawOp {
                    kind: OpKind::Radial,
                    paint: Paint::Radial {
                        center: blob.position,
                        radius,
                        stops: stops.clone(),
                    },
                    rect: full,
                    transform: DAffine2::IDENTITY,
                    blend: settings.blend_mode,
                    blur,
                });
            }
        }
        if settings.line_gradients_enabled {
            ops.extend(line_op(blob, settings, stops, blur));
        }
    }

    if let Some(fade) = fade_amount(settings) {
        // Multiplying by translucent white is an identity on an opaque
        // surface, so the decay lives in the color channels.
        let keep = 1.0 - fade;
        let gray = Srgb {
            r: keep,
            g: keep,
            b: keep,
        };
        ops.push(solid(OpKind::Decay, gray.with_alpha(1.0), BlendMode::Multiply));
    }

    Frame {
        layout: *layout,
        ops,
        filter: FilterStack::from_settings(settings, animated_hue),
    }
}
