#![deny(unsafe_code)]
//! Core of the gradient-field animated background.
//!
//! A [`Simulator`] drives a pool of moving, color-shifting gradient blobs:
//! periodic orbits with a short-range repulsion sweep and edge wraparound
//! (`motion`), hue-range or palette colors (`synth`), and a per-frame
//! display list with blend modes, decay and post-process filters
//! (`compositor`). Settings live in one typed record whose keys each carry a
//! regeneration policy (`settings`). Hosts provide a [`FrameScheduler`] and
//! replay the [`Frame`]s it produces.

pub mod blob;
pub mod clock;
pub mod color;
pub mod compositor;
pub mod error;
pub mod motion;
pub mod params;
pub mod prng;
pub mod scheduler;
pub mod settings;
pub mod simulator;
pub mod snapshot;
pub mod surface;
pub mod synth;

pub use blob::{Blob, BlobPool};
pub use color::{BlobColor, Hsl, Rgba, Srgb};
pub use compositor::{ColorStop, DrawOp, FilterStack, Frame, OpKind, Paint, Rect};
pub use error::EngineError;
pub use prng::{RandomSource, Xorshift64};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use settings::{
    BlendMode, ColorMode, FadeoutMode, RegenPolicy, Setting, SettingKey, Settings, SizeMode,
};
pub use simulator::Simulator;
pub use snapshot::SimulatorSnapshot;
pub use surface::{Surface, SurfaceLayout, Viewport};
