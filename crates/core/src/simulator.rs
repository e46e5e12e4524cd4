//! The gradient field simulator.
//!
//! Owns the settings, surface, blob pool, clock and hue accumulator, and
//! wires them together once per tick: advance the clock, move and recolor
//! blobs, compose a [`Frame`], then ask the scheduler for the next frame.
//! Setting changes go through [`Simulator::update_setting`], which consults
//! each key's [`RegenPolicy`](crate::settings::RegenPolicy) to decide whether
//! the blob pool is rebuilt.

use glam::DVec2;
use serde_json::Value;

use crate::blob::{Blob, BlobPool};
use crate::clock::Clock;
use crate::compositor::{self, Frame};
use crate::error::EngineError;
use crate::motion;
use crate::prng::Xorshift64;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::settings::{Setting, SettingKey, Settings};
use crate::snapshot::SimulatorSnapshot;
use crate::surface::{Surface, SurfaceLayout, Viewport};
use crate::synth::{self, HueRotation};

/// One simulation step for `blobs` at `time`.
///
/// Each blob moves onto its orbit and gets its frame color and pulsing
/// opacity. The sequential repulsion sweep and edge wraparound follow.
pub fn advance(blobs: &mut [Blob], settings: &Settings, bounds: DVec2, time: f64) {
    motion::advance_positions(
        blobs,
        DVec2::new(settings.position_x, settings.position_y),
        bounds,
        time,
        settings.gradient_speed,
    );
    for (i, blob) in blobs.iter_mut().enumerate() {
        blob.color = synth::frame_color(settings, blob, i, time);
        blob.opacity = synth::pulse_opacity(time, blob.phase, settings.opacity);
    }
    motion::apply_repulsion(blobs);
    motion::wrap_to_bounds(blobs, bounds);
}

/// PRNG seed for the pool built after `generation` regenerations.
///
/// Generation 0 uses `seed` itself; later generations are spread by the
/// golden-ratio increment so each rebuild draws a fresh blob set.
pub fn generation_seed(seed: u64, generation: u64) -> u64 {
    seed.wrapping_add(generation.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn seeded_pool(settings: &Settings, bounds: DVec2, seed: u64, generation: u64) -> BlobPool {
    let mut pool = BlobPool::new(Box::new(Xorshift64::new(generation_seed(seed, generation))));
    pool.regenerate_from(settings, bounds);
    pool
}

/// A running gradient field bound to one surface and frame scheduler.
pub struct Simulator {
    settings: Settings,
    surface: Surface,
    pool: BlobPool,
    clock: Clock,
    hue_rotation: HueRotation,
    seed: u64,
    generation: u64,
    scheduler: Box<dyn FrameScheduler>,
    frame_handle: Option<FrameHandle>,
    destroyed: bool,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("settings", &self.settings)
            .field("surface", &self.surface)
            .field("clock", &self.clock)
            .field("hue_rotation", &self.hue_rotation)
            .field("seed", &self.seed)
            .field("generation", &self.generation)
            .field("frame_handle", &self.frame_handle)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Creates a running simulator: sizes the surface, generates the blob
    /// pool from `seed`, and requests the first frame.
    ///
    /// Returns `EngineError::InvalidDimensions` for an unusable viewport.
    pub fn new(
        viewport: Viewport,
        settings: Settings,
        seed: u64,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Result<Self, EngineError> {
        Self::resume(
            viewport,
            settings,
            seed,
            0,
            Clock::default(),
            HueRotation::default(),
            scheduler,
        )
    }

    /// Resumes from a frozen state. Blobs regenerate from the snapshot's
    /// seed and generation, so they match the pool that was live when the
    /// snapshot was taken; time and the hue accumulator carry over.
    pub fn from_snapshot(
        snapshot: SimulatorSnapshot,
        viewport: Viewport,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Result<Self, EngineError> {
        snapshot.validate()?;
        Self::resume(
            viewport,
            snapshot.settings,
            snapshot.seed,
            snapshot.generation,
            Clock::at(snapshot.time),
            HueRotation::at(snapshot.animated_hue),
            scheduler,
        )
    }

    fn resume(
        viewport: Viewport,
        settings: Settings,
        seed: u64,
        generation: u64,
        clock: Clock,
        hue_rotation: HueRotation,
        mut scheduler: Box<dyn FrameScheduler>,
    ) -> Result<Self, EngineError> {
        let surface = Surface::new(viewport)?;
        let pool = seeded_pool(&settings, surface.bounds(), seed, generation);
        let frame_handle = Some(scheduler.request_frame());
        Ok(Self {
            settings,
            surface,
            pool,
            clock,
            hue_rotation,
            seed,
            generation,
            scheduler,
            frame_handle,
            destroyed: false,
        })
    }

    /// Runs one tick and returns the frame to present, or `None` once
    /// destroyed.
    pub fn tick(&mut self) -> Option<Frame> {
        if self.destroyed {
            return None;
        }
        let time = self.clock.tick();
        self.hue_rotation.advance(self.settings.hue_rotation_speed);
        let bounds = self.surface.bounds();
        advance(self.pool.blobs_mut(), &self.settings, bounds, time);
        let frame = self.frame();
        self.frame_handle = Some(self.scheduler.request_frame());
        Some(frame)
    }

    /// Composes the current state without advancing it.
    pub fn frame(&self) -> Frame {
        compositor::compose(
            self.pool.blobs(),
            &self.settings,
            &self.surface.layout(),
            self.hue_rotation.degrees(),
        )
    }

    /// Applies a typed setting and regenerates the pool when the key's
    /// policy says so.
    pub fn update_setting(&mut self, setting: Setting) {
        let key = setting.key();
        self.settings.apply(setting);
        if key == SettingKey::HueRotationSpeed {
            self.hue_rotation.set_speed(self.settings.hue_rotation_speed);
        }
        if key.policy().regenerates(&self.settings) {
            tracing::debug!(setting = key.name(), "structural setting changed");
            self.regenerate();
        }
    }

    /// Applies a setting from a controller's key name and JSON value.
    ///
    /// Malformed values are rejected and the previous value is kept.
    pub fn update_setting_json(&mut self, name: &str, value: &Value) -> Result<(), EngineError> {
        match Setting::from_json(name, value) {
            Ok(setting) => {
                self.update_setting(setting);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(setting = name, %value, error = %e, "setting update rejected");
                Err(e)
            }
        }
    }

    /// Discards and recreates every blob from the current settings. Each
    /// regeneration draws from the next generation's seed.
    pub fn regenerate(&mut self) {
        self.generation += 1;
        self.pool = seeded_pool(&self.settings, self.surface.bounds(), self.seed, self.generation);
    }

    /// Re-sizes the surface. Blobs are kept; their radii stay in absolute
    /// pixels while orbits follow the new bounds on the next tick.
    pub fn resize(&mut self, viewport: Viewport) -> Result<SurfaceLayout, EngineError> {
        self.surface.resize(viewport)
    }

    /// Stops the tick loop. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.frame_handle.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Animated hue rotation in degrees.
    pub fn animated_hue(&self) -> f64 {
        self.hue_rotation.degrees()
    }

    pub fn blobs(&self) -> &[Blob] {
        self.pool.blobs()
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.surface.layout()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn snapshot(&self) -> SimulatorSnapshot {
        SimulatorSnapshot {
            settings: self.settings.clone(),
            time: self.time(),
            animated_hue: self.animated_hue(),
            seed: self.seed,
            generation: self.generation,
        }
    }
}
