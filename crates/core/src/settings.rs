//! The settings store: a flat, JSON-able configuration record.
//!
//! Every key carries a [`RegenPolicy`] declared once in [`SETTING_TABLE`].
//! Structural keys invalidate the blob pool and force a full regeneration;
//! continuous keys are simply read again on the next tick.
//!
//! Controllers either build a typed [`Setting`] directly or go through
//! [`Setting::from_json`] with the original camelCase key names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Srgb;
use crate::error::EngineError;
use crate::params::{expect_bool, expect_f64, expect_str, expect_str_array, expect_usize};

/// Canvas compositing mode used when drawing blobs.
///
/// `Normal` maps to the canvas `source-over` operation; every other mode
/// shares its name with the canvas/CSS blend mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Lighter,
}

impl BlendMode {
    pub const ALL: [BlendMode; 17] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Hue,
        BlendMode::Saturation,
        BlendMode::Color,
        BlendMode::Luminosity,
        BlendMode::Lighter,
    ];

    /// The settings-file spelling (`"color-dodge"`).
    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
            BlendMode::Lighter => "lighter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// The value for a canvas context's `globalCompositeOperation`.
    pub fn composite_operation(self) -> &'static str {
        match self {
            BlendMode::Normal => "source-over",
            other => other.name(),
        }
    }

    /// Modes that only ever brighten what is already on the surface.
    ///
    /// Drawing with these every frame saturates the canvas unless a fadeout
    /// pass decays it again.
    pub fn is_accumulating(self) -> bool {
        matches!(
            self,
            BlendMode::Lighten
                | BlendMode::Screen
                | BlendMode::ColorDodge
                | BlendMode::Overlay
                | BlendMode::SoftLight
        )
    }
}

/// How blob colors are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// Procedural HSL within `[hueStart, hueEnd]` and the saturation/lightness bands.
    #[default]
    HueRange,
    /// Fixed colors from `paletteColors`, cycled by base index.
    Palette,
}

impl ColorMode {
    pub fn name(self) -> &'static str {
        match self {
            ColorMode::HueRange => "hue-range",
            ColorMode::Palette => "palette",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [ColorMode::HueRange, ColorMode::Palette]
            .into_iter()
            .find(|m| m.name() == name)
    }
}

/// Where `gradientSizeMultiplier` is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeMode {
    /// Baked into each blob's radius at creation.
    #[default]
    Base,
    /// Applied to the drawn radius every frame.
    Drawing,
}

impl SizeMode {
    pub fn name(self) -> &'static str {
        match self {
            SizeMode::Base => "base",
            SizeMode::Drawing => "drawing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [SizeMode::Base, SizeMode::Drawing]
            .into_iter()
            .find(|m| m.name() == name)
    }
}

/// Brightness decay for accumulating blend modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FadeoutMode {
    #[default]
    None,
    /// Fixed ten second interval.
    Auto,
    /// Interval taken from `fadeoutTime`.
    Custom,
}

impl FadeoutMode {
    pub fn name(self) -> &'static str {
        match self {
            FadeoutMode::None => "none",
            FadeoutMode::Auto => "auto",
            FadeoutMode::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [FadeoutMode::None, FadeoutMode::Auto, FadeoutMode::Custom]
            .into_iter()
            .find(|m| m.name() == name)
    }
}

/// The full configuration of the gradient field.
///
/// Field names serialize in camelCase so settings documents use the same keys
/// controllers send to [`Setting::from_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Global multiplier on blob opacity.
    pub opacity: f64,
    /// Blur radius in pixels applied to each blob draw.
    pub blur: f64,
    /// Post-process brightness, percent.
    pub brightness: f64,
    /// Post-process contrast, percent.
    pub contrast: f64,
    /// Post-process saturation, percent.
    pub saturation: f64,
    /// Manual hue rotation, degrees.
    pub hue: f64,
    /// Multiplier on drawn radial radius.
    pub scale: f64,
    pub gradient_size_multiplier: f64,
    pub gradient_size_mode: SizeMode,
    /// Motion center as a fraction of surface width.
    pub position_x: f64,
    /// Motion center as a fraction of surface height.
    pub position_y: f64,
    pub blend_mode: BlendMode,
    pub gradient_count: usize,
    pub gradient_speed: f64,
    pub background_color: Srgb,
    /// Position of the middle color stop, in [0, 1].
    pub gradient_fade: f64,
    /// Full hue turns per second of the animated rotation (0 = off).
    pub hue_rotation_speed: f64,
    pub hue_start: f64,
    pub hue_end: f64,
    /// Percent of the hue range actually used.
    pub hue_separation: f64,
    pub evenly_spaced_colors: bool,
    pub saturation_min: f64,
    pub saturation_max: f64,
    pub lightness_min: f64,
    pub lightness_max: f64,
    pub color_mode: ColorMode,
    pub palette_colors: Vec<Srgb>,
    pub fadeout_mode: FadeoutMode,
    /// Fadeout interval in seconds for [`FadeoutMode::Custom`].
    pub fadeout_time: f64,
    pub radial_gradients_enabled: bool,
    pub line_gradients_enabled: bool,
    /// Degrees.
    pub line_gradient_angle: f64,
    pub line_gradient_length: f64,
    pub line_gradient_width: f64,
}

/// The palette shipped as the default.
const DEFAULT_PALETTE: [Srgb; 5] = [
    Srgb {
        r: 0x4a as f64 / 255.0,
        g: 0x90 as f64 / 255.0,
        b: 0xe2 as f64 / 255.0,
    },
    Srgb {
        r: 0x5b as f64 / 255.0,
        g: 0xa3 as f64 / 255.0,
        b: 0xf5 as f64 / 255.0,
    },
    Srgb {
        r: 0x6b as f64 / 255.0,
        g: 0xb6 as f64 / 255.0,
        b: 0xff as f64 / 255.0,
    },
    Srgb {
        r: 0x7b as f64 / 255.0,
        g: 0xc9 as f64 / 255.0,
        b: 0xff as f64 / 255.0,
    },
    Srgb {
        r: 0x8b as f64 / 255.0,
        g: 0xda as f64 / 255.0,
        b: 0xff as f64 / 255.0,
    },
];

impl Default for Settings {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            blur: 0.0,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            hue: 0.0,
            scale: 1.0,
            gradient_size_multiplier: 1.0,
            gradient_size_mode: SizeMode::Base,
            position_x: 0.5,
            position_y: 0.5,
            blend_mode: BlendMode::Normal,
            gradient_count: 5,
            gradient_speed: 0.5,
            background_color: Srgb::BLACK,
            gradient_fade: 0.5,
            hue_rotation_speed: 0.0,
            hue_start: 200.0,
            hue_end: 280.0,
            hue_separation: 100.0,
            evenly_spaced_colors: true,
            saturation_min: 60.0,
            saturation_max: 100.0,
            lightness_min: 20.0,
            lightness_max: 50.0,
            color_mode: ColorMode::HueRange,
            palette_colors: DEFAULT_PALETTE.to_vec(),
            fadeout_mode: FadeoutMode::None,
            fadeout_time: 10.0,
            radial_gradients_enabled: true,
            line_gradients_enabled: false,
            line_gradient_angle: 0.0,
            line_gradient_length: 200.0,
            line_gradient_width: 100.0,
        }
    }
}

impl Settings {
    /// Multiplier folded into blob radii at creation (`Base` size mode only).
    pub fn base_radius_multiplier(&self) -> f64 {
        match self.gradient_size_mode {
            SizeMode::Base => self.gradient_size_multiplier,
            SizeMode::Drawing => 1.0,
        }
    }

    /// Multiplier applied to drawn extents (`Drawing` size mode only).
    pub fn drawing_multiplier(&self) -> f64 {
        match self.gradient_size_mode {
            SizeMode::Base => 1.0,
            SizeMode::Drawing => self.gradient_size_multiplier,
        }
    }

    /// The palette in effect, or `None` when hue-range colors apply.
    ///
    /// Palette mode with an empty palette falls back to hue-range colors.
    pub fn active_palette(&self) -> Option<&[Srgb]> {
        match self.color_mode {
            ColorMode::Palette if !self.palette_colors.is_empty() => Some(&self.palette_colors),
            _ => None,
        }
    }

    /// Reads one key back as JSON, using the camelCase key name.
    pub fn get(&self, name: &str) -> Result<Value, EngineError> {
        let key = SettingKey::from_name(name)
            .ok_or_else(|| EngineError::UnknownSetting(name.to_owned()))?;
        let doc = serde_json::to_value(self)
            .map_err(|e| EngineError::InvalidValue {
                name: name.to_owned(),
                value: e.to_string(),
            })?;
        doc.get(key.name())
            .cloned()
            .ok_or_else(|| EngineError::UnknownSetting(name.to_owned()))
    }

    /// Writes one typed value into the record.
    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::Opacity(v) => self.opacity = v,
            Setting::Blur(v) => self.blur = v,
            Setting::Brightness(v) => self.brightness = v,
            Setting::Contrast(v) => self.contrast = v,
            Setting::Saturation(v) => self.saturation = v,
            Setting::Hue(v) => self.hue = v,
            Setting::Scale(v) => self.scale = v,
            Setting::GradientSizeMultiplier(v) => self.gradient_size_multiplier = v,
            Setting::GradientSizeMode(v) => self.gradient_size_mode = v,
            Setting::PositionX(v) => self.position_x = v,
            Setting::PositionY(v) => self.position_y = v,
            Setting::BlendMode(v) => self.blend_mode = v,
            Setting::GradientCount(v) => self.gradient_count = v,
            Setting::GradientSpeed(v) => self.gradient_speed = v,
            Setting::BackgroundColor(v) => self.background_color = v,
            Setting::GradientFade(v) => self.gradient_fade = v,
            Setting::HueRotationSpeed(v) => self.hue_rotation_speed = v,
            Setting::HueStart(v) => self.hue_start = v,
            Setting::HueEnd(v) => self.hue_end = v,
            Setting::HueSeparation(v) => self.hue_separation = v,
            Setting::EvenlySpacedColors(v) => self.evenly_spaced_colors = v,
            Setting::SaturationMin(v) => self.saturation_min = v,
            Setting::SaturationMax(v) => self.saturation_max = v,
            Setting::LightnessMin(v) => self.lightness_min = v,
            Setting::LightnessMax(v) => self.lightness_max = v,
            Setting::ColorMode(v) => self.color_mode = v,
            Setting::PaletteColors(v) => self.palette_colors = v,
            Setting::FadeoutMode(v) => self.fadeout_mode = v,
            Setting::FadeoutTime(v) => self.fadeout_time = v,
            Setting::RadialGradientsEnabled(v) => self.radial_gradients_enabled = v,
            Setting::LineGradientsEnabled(v) => self.line_gradients_enabled = v,
            Setting::LineGradientAngle(v) => self.line_gradient_angle = v,
            Setting::LineGradientLength(v) => self.line_gradient_length = v,
            Setting::LineGradientWidth(v) => self.line_gradient_width = v,
        }
    }
}

/// What a change to a key does to the blob pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenPolicy {
    /// Discard and recreate every blob.
    Structural,
    /// Recreate only while sizes are baked in at creation ([`SizeMode::Base`]).
    StructuralInBaseMode,
    /// Picked up on the next tick; blobs keep their identity.
    Continuous,
}

impl RegenPolicy {
    pub fn name(self) -> &'static str {
        match self {
            RegenPolicy::Structural => "structural",
            RegenPolicy::StructuralInBaseMode => "structural-in-base-mode",
            RegenPolicy::Continuous => "continuous",
        }
    }

    /// Whether a change under this policy regenerates, given the settings
    /// after the change was applied.
    pub fn regenerates(self, settings: &Settings) -> bool {
        match self {
            RegenPolicy::Structural => true,
            RegenPolicy::StructuralInBaseMode => settings.gradient_size_mode == SizeMode::Base,
            RegenPolicy::Continuous => false,
        }
    }
}

/// Every configuration key, in [`SETTING_TABLE`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Opacity,
    Blur,
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Scale,
    GradientSizeMultiplier,
    GradientSizeMode,
    PositionX,
    PositionY,
    BlendMode,
    GradientCount,
    GradientSpeed,
    BackgroundColor,
    GradientFade,
    HueRotationSpeed,
    HueStart,
    HueEnd,
    HueSeparation,
    EvenlySpacedColors,
    SaturationMin,
    SaturationMax,
    LightnessMin,
    LightnessMax,
    ColorMode,
    PaletteColors,
    FadeoutMode,
    FadeoutTime,
    RadialGradientsEnabled,
    LineGradientsEnabled,
    LineGradientAngle,
    LineGradientLength,
    LineGradientWidth,
}

/// One row of [`SETTING_TABLE`].
#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
    pub key: SettingKey,
    pub name: &'static str,
    pub policy: RegenPolicy,
}

const fn spec(key: SettingKey, name: &'static str, policy: RegenPolicy) -> SettingSpec {
    SettingSpec { key, name, policy }
}

use RegenPolicy::{Continuous, Structural, StructuralInBaseMode};

/// Key names and regeneration policies. Row `i` describes the key whose
/// discriminant is `i`.
pub const SETTING_TABLE: [SettingSpec; 34] = [
    spec(SettingKey::Opacity, "opacity", Continuous),
    spec(SettingKey::Blur, "blur", Continuous),
    spec(SettingKey::Brightness, "brightness", Continuous),
    spec(SettingKey::Contrast, "contrast", Continuous),
    spec(SettingKey::Saturation, "saturation", Continuous),
    spec(SettingKey::Hue, "hue", Continuous),
    spec(SettingKey::Scale, "scale", Continuous),
    spec(SettingKey::GradientSizeMultiplier, "gradientSizeMultiplier", StructuralInBaseMode),
    spec(SettingKey::GradientSizeMode, "gradientSizeMode", Structural),
    spec(SettingKey::PositionX, "positionX", Continuous),
    spec(SettingKey::PositionY, "positionY", Continuous),
    spec(SettingKey::BlendMode, "blendMode", Continuous),
    spec(SettingKey::GradientCount, "gradientCount", Structural),
    spec(SettingKey::GradientSpeed, "gradientSpeed", Continuous),
    spec(SettingKey::BackgroundColor, "backgroundColor", Continuous),
    spec(SettingKey::GradientFade, "gradientFade", Continuous),
    spec(SettingKey::HueRotationSpeed, "hueRotationSpeed", Continuous),
    spec(SettingKey::HueStart, "hueStart", Continuous),
    spec(SettingKey::HueEnd, "hueEnd", Continuous),
    spec(SettingKey::HueSeparation, "hueSeparation", Structural),
    spec(SettingKey::EvenlySpacedColors, "evenlySpacedColors", Structural),
    spec(SettingKey::SaturationMin, "saturationMin", Continuous),
    spec(SettingKey::SaturationMax, "saturationMax", Continuous),
    spec(SettingKey::LightnessMin, "lightnessMin", Continuous),
    spec(SettingKey::LightnessMax, "lightnessMax", Continuous),
    spec(SettingKey::ColorMode, "colorMode", Structural),
    spec(SettingKey::PaletteColors, "paletteColors", Structural),
    spec(SettingKey::FadeoutMode, "fadeoutMode", Continuous),
    spec(SettingKey::FadeoutTime, "fadeoutTime", Continuous),
    spec(SettingKey::RadialGradientsEnabled, "radialGradientsEnabled", Continuous),
    spec(SettingKey::LineGradientsEnabled, "lineGradientsEnabled", Continuous),
    spec(SettingKey::LineGradientAngle, "lineGradientAngle", Continuous),
    spec(SettingKey::LineGradientLength, "lineGradientLength", Continuous),
    spec(SettingKey::LineGradientWidth, "lineGradientWidth", Continuous),
];

impl SettingKey {
    pub fn spec(self) -> &'static SettingSpec {
        &SETTING_TABLE[self as usize]
    }

    /// The camelCase key name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn policy(self) -> RegenPolicy {
        self.spec().policy
    }

    pub fn from_name(name: &str) -> Option<Self> {
        SETTING_TABLE.iter().find(|s| s.name == name).map(|s| s.key)
    }

    pub fn all() -> impl Iterator<Item = SettingKey> {
        SETTING_TABLE.iter().map(|s| s.key)
    }
}

/// A typed value for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Opacity(f64),
    Blur(f64),
    Brightness(f64),
    Contrast(f64),
    Saturation(f64),
    Hue(f64),
    Scale(f64),
    GradientSizeMultiplier(f64),
    GradientSizeMode(SizeMode),
    PositionX(f64),
    PositionY(f64),
    BlendMode(BlendMode),
    GradientCount(usize),
    GradientSpeed(f64),
    BackgroundColor(Srgb),
    GradientFade(f64),
    HueRotationSpeed(f64),
    HueStart(f64),
    HueEnd(f64),
    HueSeparation(f64),
    EvenlySpacedColors(bool),
    SaturationMin(f64),
    SaturationMax(f64),
    LightnessMin(f64),
    LightnessMax(f64),
    ColorMode(ColorMode),
    PaletteColors(Vec<Srgb>),
    FadeoutMode(FadeoutMode),
    FadeoutTime(f64),
    RadialGradientsEnabled(bool),
    LineGradientsEnabled(bool),
    LineGradientAngle(f64),
    LineGradientLength(f64),
    LineGradientWidth(f64),
}

fn enum_value<T>(name: &str, value: &Value, parse: fn(&str) -> Option<T>) -> Result<T, EngineError> {
    let s = expect_str(name, value)?;
    parse(s).ok_or_else(|| EngineError::InvalidValue {
        name: name.to_owned(),
        value: s.to_owned(),
    })
}

impl Setting {
    pub fn key(&self) -> SettingKey {
        match self {
            Setting::Opacity(_) => SettingKey::Opacity,
            Setting::Blur(_) => SettingKey::Blur,
            Setting::Brightness(_) => SettingKey::Brightness,
            Setting::Contrast(_) => SettingKey::Contrast,
            Setting::Saturation(_) => SettingKey::Saturation,
            Setting::Hue(_) => SettingKey::Hue,
            Setting::Scale(_) => SettingKey::Scale,
            Setting::GradientSizeMultiplier(_) => SettingKey::GradientSizeMultiplier,
            Setting::GradientSizeMode(_) => SettingKey::GradientSizeMode,
            Setting::PositionX(_) => SettingKey::PositionX,
            Setting::PositionY(_) => SettingKey::PositionY,
            Setting::BlendMode(_) => SettingKey::BlendMode,
            Setting::GradientCount(_) => SettingKey::GradientCount,
            Setting::GradientSpeed(_) => SettingKey::GradientSpeed,
            Setting::BackgroundColor(_) => SettingKey::BackgroundColor,
            Setting::GradientFade(_) => SettingKey::GradientFade,
            Setting::HueRotationSpeed(_) => SettingKey::HueRotationSpeed,
            Setting::HueStart(_) => SettingKey::HueStart,
            Setting::HueEnd(_) => SettingKey::HueEnd,
            Setting::HueSeparation(_) => SettingKey::HueSeparation,
            Setting::EvenlySpacedColors(_) => SettingKey::EvenlySpacedColors,
            Setting::SaturationMin(_) => SettingKey::SaturationMin,
            Setting::SaturationMax(_) => SettingKey::SaturationMax,
            Setting::LightnessMin(_) => SettingKey::LightnessMin,
            Setting::LightnessMax(_) => SettingKey::LightnessMax,
            Setting::ColorMode(_) => SettingKey::ColorMode,
            Setting::PaletteColors(_) => SettingKey::PaletteColors,
            Setting::FadeoutMode(_) => SettingKey::FadeoutMode,
            Setting::FadeoutTime(_) => SettingKey::FadeoutTime,
            Setting::RadialGradientsEnabled(_) => SettingKey::RadialGradientsEnabled,
            Setting::LineGradientsEnabled(_) => SettingKey::LineGradientsEnabled,
            Setting::LineGradientAngle(_) => SettingKey::LineGradientAngle,
            Setting::LineGradientLength(_) => SettingKey::LineGradientLength,
            Setting::LineGradientWidth(_) => SettingKey::LineGradientWidth,
        }
    }

    /// Builds a typed setting from a controller's key name and JSON value.
    ///
    /// Numeric keys accept numbers and numeric text (`"50%"`); enum keys
    /// accept their kebab-case names; colors accept hex strings.
    pub fn from_json(name: &str, value: &Value) -> Result<Setting, EngineError> {
        let key =
            SettingKey::from_name(name).ok_or_else(|| EngineError::UnknownSetting(name.to_owned()))?;
        let num = || expect_f64(name, value);
        let flag = || expect_bool(name, value);
        let setting = match key {
            SettingKey::Opacity => Setting::Opacity(num()?),
            SettingKey::Blur => Setting::Blur(num()?),
            SettingKey::Brightness => Setting::Brightness(num()?),
            SettingKey::Contrast => Setting::Contrast(num()?),
            SettingKey::Saturation => Setting::Saturation(num()?),
            SettingKey::Hue => Setting::Hue(num()?),
            SettingKey::Scale => Setting::Scale(num()?),
            SettingKey::GradientSizeMultiplier => Setting::GradientSizeMultiplier(num()?),
            SettingKey::GradientSizeMode => {
                Setting::GradientSizeMode(enum_value(name, value, SizeMode::from_name)?)
            }
            SettingKey::PositionX => Setting::PositionX(num()?),
            SettingKey::PositionY => Setting::PositionY(num()?),
            SettingKey::BlendMode => Setting::BlendMode(enum_value(name, value, BlendMode::from_name)?),
            SettingKey::GradientCount => Setting::GradientCount(expect_usize(name, value)?),
            SettingKey::GradientSpeed => Setting::GradientSpeed(num()?),
            SettingKey::BackgroundColor => {
                Setting::BackgroundColor(Srgb::from_hex(expect_str(name, value)?)?)
            }
            SettingKey::GradientFade => Setting::GradientFade(num()?),
            SettingKey::HueRotationSpeed => Setting::HueRotationSpeed(num()?),
            SettingKey::HueStart => Setting::HueStart(num()?),
            SettingKey::HueEnd => Setting::HueEnd(num()?),
            SettingKey::HueSeparation => Setting::HueSeparation(num()?),
            SettingKey::EvenlySpacedColors => Setting::EvenlySpacedColors(flag()?),
            SettingKey::SaturationMin => Setting::SaturationMin(num()?),
            SettingKey::SaturationMax => Setting::SaturationMax(num()?),
            SettingKey::LightnessMin => Setting::LightnessMin(num()?),
            SettingKey::LightnessMax => Setting::LightnessMax(num()?),
            SettingKey::ColorMode => Setting::ColorMode(enum_value(name, value, ColorMode::from_name)?),
            SettingKey::PaletteColors => Setting::PaletteColors(
                expect_str_array(name, value)?
                    .into_iter()
                    .map(Srgb::from_hex)
                    .collect::<Result<_, _>>()?,
            ),
            SettingKey::FadeoutMode => {
                Setting::FadeoutMode(enum_value(name, value, FadeoutMode::from_name)?)
            }
            SettingKey::FadeoutTime => Setting::FadeoutTime(num()?),
            SettingKey::RadialGradientsEnabled => Setting::RadialGradientsEnabled(flag()?),
            SettingKey::LineGradientsEnabled => Setting::LineGradientsEnabled(flag()?),
            SettingKey::LineGradientAngle => Setting::LineGradientAngle(num()?),
            SettingKey::LineGradientLength => Setting::LineGradientLength(num()?),
            SettingKey::LineGradientWidth => Setting::LineGradientWidth(num()?),
        };
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- table --

    #[test]
    fn table_rows_match_discriminants() {
        for (i, row) in SETTING_TABLE.iter().enumerate() {
            assert_eq!(row.key as usize, i, "row {i} ({}) out of order", row.name);
        }
    }

    #[test]
    fn every_key_is_a_settings_field() {
        let doc = serde_json::to_value(Settings::default()).unwrap();
        let obj = doc.as_object().unwrap();
        assert_eq!(obj.len(), SETTING_TABLE.len());
        for key in SettingKey::all() {
            assert!(obj.contains_key(key.name()), "missing field {}", key.name());
        }
    }

    #[test]
    fn structural_keys_are_exactly_the_regenerating_set() {
        let structural: Vec<&str> = SETTING_TABLE
            .iter()
            .filter(|s| s.policy == RegenPolicy::Structural)
            .map(|s| s.name)
            .collect();
        assert_eq!(
            structural,
            vec![
                "gradientSizeMode",
                "gradientCount",
                "hueSeparation",
                "evenlySpacedColors",
                "colorMode",
                "paletteColors"
            ]
        );
        assert_eq!(
            SettingKey::GradientSizeMultiplier.policy(),
            RegenPolicy::StructuralInBaseMode
        );
    }

    #[test]
    fn base_mode_policy_depends_on_size_mode() {
        let mut s = Settings::default();
        assert!(RegenPolicy::StructuralInBaseMode.regenerates(&s));
        s.gradient_size_mode = SizeMode::Drawing;
        assert!(!RegenPolicy::StructuralInBaseMode.regenerates(&s));
        assert!(RegenPolicy::Structural.regenerates(&s));
        assert!(!RegenPolicy::Continuous.regenerates(&s));
    }

    #[test]
    fn key_names_round_trip() {
        for key in SettingKey::all() {
            assert_eq!(SettingKey::from_name(key.name()), Some(key));
        }
        assert_eq!(SettingKey::from_name("animatedHue"), None);
    }

    // -- enums --

    #[test]
    fn blend_mode_names_round_trip_through_serde() {
        for mode in BlendMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.name()));
            assert_eq!(BlendMode::from_name(mode.name()), Some(mode));
        }
    }

    #[test]
    fn normal_blend_maps_to_source_over() {
        assert_eq!(BlendMode::Normal.composite_operation(), "source-over");
        assert_eq!(BlendMode::ColorDodge.composite_operation(), "color-dodge");
    }

    #[test]
    fn accumulating_set_is_exact() {
        let acc: Vec<BlendMode> = BlendMode::ALL
            .into_iter()
            .filter(|m| m.is_accumulating())
            .collect();
        assert_eq!(
            acc,
            vec![
                BlendMode::Screen,
                BlendMode::Overlay,
                BlendMode::Lighten,
                BlendMode::ColorDodge,
                BlendMode::SoftLight,
            ]
        );
    }

    #[test]
    fn small_enums_parse_their_names() {
        assert_eq!(ColorMode::from_name("hue-range"), Some(ColorMode::HueRange));
        assert_eq!(ColorMode::from_name("palette"), Some(ColorMode::Palette));
        assert_eq!(SizeMode::from_name("drawing"), Some(SizeMode::Drawing));
        assert_eq!(FadeoutMode::from_name("custom"), Some(FadeoutMode::Custom));
        assert_eq!(FadeoutMode::from_name("sometimes"), None);
    }

    // -- settings record --

    #[test]
    fn defaults_match_shipped_configuration() {
        let s = Settings::default();
        assert_eq!(s.gradient_count, 5);
        assert_eq!(s.hue_start, 200.0);
        assert_eq!(s.hue_end, 280.0);
        assert_eq!(s.color_mode, ColorMode::HueRange);
        assert_eq!(s.palette_colors.len(), 5);
        assert_eq!(s.palette_colors[0].to_hex(), "#4a90e2");
        assert_eq!(s.palette_colors[4].to_hex(), "#8bdaff");
        assert_eq!(s.background_color.to_hex(), "#000000");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: Settings =
            serde_json::from_value(json!({"gradientCount": 9, "blendMode": "screen"})).unwrap();
        assert_eq!(s.gradient_count, 9);
        assert_eq!(s.blend_mode, BlendMode::Screen);
        assert_eq!(s.hue_end, 280.0);
    }

    #[test]
    fn serde_round_trip() {
        let mut s = Settings::default();
        s.color_mode = ColorMode::Palette;
        s.fadeout_mode = FadeoutMode::Auto;
        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn size_multipliers_follow_mode() {
        let mut s = Settings::default();
        s.gradient_size_multiplier = 2.0;
        assert_eq!(s.base_radius_multiplier(), 2.0);
        assert_eq!(s.drawing_multiplier(), 1.0);
        s.gradient_size_mode = SizeMode::Drawing;
        assert_eq!(s.base_radius_multiplier(), 1.0);
        assert_eq!(s.drawing_multiplier(), 2.0);
    }

    #[test]
    fn empty_palette_is_not_active() {
        let mut s = Settings::default();
        assert!(s.active_palette().is_none());
        s.color_mode = ColorMode::Palette;
        assert_eq!(s.active_palette().map(<[Srgb]>::len), Some(5));
        s.palette_colors.clear();
        assert!(s.active_palette().is_none());
    }

    #[test]
    fn get_reads_back_camel_case_keys() {
        let s = Settings::default();
        assert_eq!(s.get("gradientCount").unwrap(), json!(5));
        assert_eq!(s.get("colorMode").unwrap(), json!("hue-range"));
        assert_eq!(s.get("backgroundColor").unwrap(), json!("#000000"));
        assert!(matches!(s.get("nope"), Err(EngineError::UnknownSetting(_))));
    }

    // -- typed settings from json --

    #[test]
    fn from_json_builds_typed_values() {
        assert_eq!(
            Setting::from_json("gradientCount", &json!(3)).unwrap(),
            Setting::GradientCount(3)
        );
        assert_eq!(
            Setting::from_json("blendMode", &json!("soft-light")).unwrap(),
            Setting::BlendMode(BlendMode::SoftLight)
        );
        assert_eq!(
            Setting::from_json("brightness", &json!("120%")).unwrap(),
            Setting::Brightness(120.0)
        );
        let palette = Setting::from_json("paletteColors", &json!(["#ff0000", "#00ff00"])).unwrap();
        assert_eq!(palette.key(), SettingKey::PaletteColors);
    }

    #[test]
    fn from_json_rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            Setting::from_json("sparkle", &json!(1)),
            Err(EngineError::UnknownSetting(_))
        ));
        assert!(matches!(
            Setting::from_json("brightness", &json!("very")),
            Err(EngineError::SettingTypeMismatch { .. })
        ));
        assert!(matches!(
            Setting::from_json("blendMode", &json!("glow")),
            Err(EngineError::InvalidValue { .. })
        ));
        assert!(matches!(
            Setting::from_json("paletteColors", &json!(["#ff0000", "nope"])),
            Err(EngineError::InvalidColor(_))
        ));
    }

    #[test]
    fn apply_then_get_reflects_every_key() {
        let mut s = Settings::default();
        s.apply(Setting::Hue(45.0));
        s.apply(Setting::LineGradientsEnabled(true));
        s.apply(Setting::FadeoutMode(FadeoutMode::Custom));
        assert_eq!(s.get("hue").unwrap(), json!(45.0));
        assert_eq!(s.get("lineGradientsEnabled").unwrap(), json!(true));
        assert_eq!(s.get("fadeoutMode").unwrap(), json!("custom"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn numeric_settings_accept_any_finite_number(v in -1e6_f64..1e6) {
                let setting = Setting::from_json("gradientSpeed", &json!(v)).unwrap();
                prop_assert_eq!(setting, Setting::GradientSpeed(v));
            }

            #[test]
            fn typed_key_matches_json_key(idx in 0usize..34) {
                let key = SETTING_TABLE[idx].key;
                let value = Settings::default().get(key.name()).unwrap();
                let setting = Setting::from_json(key.name(), &value).unwrap();
                prop_assert_eq!(setting.key(), key);
            }
        }
    }
}
