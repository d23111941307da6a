//! Scene descriptor
//!
//! A [`Scene`] fully describes what the engine renders: the effect variant
//! with its parameters plus the common descriptor fields that are exchanged
//! between devices (brightness, color, palette, speed, direction).

use crate::{color::Rgb, palette::PaletteId};

/// Effect identifier. The discriminant is the wire id.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EffectId {
    Off = 0,
    Solid = 1,
    PaletteCycle = 2,
    #[default]
    PaletteStream = 3,
    SpectrumCycle = 4,
    SpectrumStream = 5,
    SpectrumSparkle = 6,
    Strobe = 7,
    Sparkle = 8,
    Breathe = 9,
    SetChsv = 10,
    PositionStatus = 11,
    ColorWheel = 12,
    Speedometer = 13,
    JacketDance = 14,
    ColorRadial = 15,
    PulseWave = 16,
    MeteorShower = 17,
    FirePlasma = 18,
    Kaleidoscope = 19,
    RainbowComet = 20,
    MatrixRain = 21,
    PlasmaClouds = 22,
    LavaLamp = 23,
    AuroraBorealis = 24,
    LightningStorm = 25,
    ColorExplosion = 26,
    SpiralGalaxy = 27,
}

pub const EFFECT_NAME_PALETTE_STREAM: &str = "pstream";
pub const EFFECT_NAME_PALETTE_CYCLE: &str = "pcycle";
pub const EFFECT_NAME_COLOR_RADIAL: &str = "cradial";
pub const EFFECT_NAME_COLOR_WHEEL: &str = "cwheel";
pub const EFFECT_NAME_SPEEDOMETER: &str = "speedo";
pub const EFFECT_NAME_POSITION_STATUS: &str = "pstat";

impl EffectId {
    /// Highest valid wire id
    pub const MAX_ID: u8 = EffectId::SpiralGalaxy as u8;

    pub const ALL: [EffectId; 28] = [
        EffectId::Off,
        EffectId::Solid,
        EffectId::PaletteCycle,
        EffectId::PaletteStream,
        EffectId::SpectrumCycle,
        EffectId::SpectrumStream,
        EffectId::SpectrumSparkle,
        EffectId::Strobe,
        EffectId::Sparkle,
        EffectId::Breathe,
        EffectId::SetChsv,
        EffectId::PositionStatus,
        EffectId::ColorWheel,
        EffectId::Speedometer,
        EffectId::JacketDance,
        EffectId::ColorRadial,
        EffectId::PulseWave,
        EffectId::MeteorShower,
        EffectId::FirePlasma,
        EffectId::Kaleidoscope,
        EffectId::RainbowComet,
        EffectId::MatrixRain,
        EffectId::PlasmaClouds,
        EffectId::LavaLamp,
        EffectId::AuroraBorealis,
        EffectId::LightningStorm,
        EffectId::ColorExplosion,
        EffectId::SpiralGalaxy,
    ];

    pub const fn from_raw(raw: u8) -> Option<Self> {
        if raw > Self::MAX_ID {
            return None;
        }
        Some(Self::ALL[raw as usize])
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Solid => "solid",
            Self::PaletteCycle => EFFECT_NAME_PALETTE_CYCLE,
            Self::PaletteStream => EFFECT_NAME_PALETTE_STREAM,
            Self::SpectrumCycle => "spectrum_cycle",
            Self::SpectrumStream => "spectrum_stream",
            Self::SpectrumSparkle => "spectrum_sparkle",
            Self::Strobe => "strobe",
            Self::Sparkle => "sparkle",
            Self::Breathe => "breathe",
            Self::SetChsv => "set_chsv",
            Self::PositionStatus => EFFECT_NAME_POSITION_STATUS,
            Self::ColorWheel => EFFECT_NAME_COLOR_WHEEL,
            Self::Speedometer => EFFECT_NAME_SPEEDOMETER,
            Self::JacketDance => "jacket_dance",
            Self::ColorRadial => EFFECT_NAME_COLOR_RADIAL,
            Self::PulseWave => "pulse_wave",
            Self::MeteorShower => "meteor_shower",
            Self::FirePlasma => "fire_plasma",
            Self::Kaleidoscope => "kaleidoscope",
            Self::RainbowComet => "rainbow_comet",
            Self::MatrixRain => "matrix_rain",
            Self::PlasmaClouds => "plasma_clouds",
            Self::LavaLamp => "lava_lamp",
            Self::AuroraBorealis => "aurora_borealis",
            Self::LightningStorm => "lightning_storm",
            Self::ColorExplosion => "color_explosion",
            Self::SpiralGalaxy => "spiral_galaxy",
        }
    }

    /// Look an effect up by name, ignoring ASCII case
    pub fn find(name: &str) -> Option<Self> {
        let name = name.trim_matches(char::from(0)).trim();
        if name.eq_ignore_ascii_case("palette_stream") {
            return Some(Self::PaletteStream);
        }
        if name.eq_ignore_ascii_case("palette_cycle") {
            return Some(Self::PaletteCycle);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(name))
    }

    /// Parse an effect name, falling back to [`EffectId::PaletteStream`]
    pub fn parse_from_str(name: &str) -> Self {
        Self::find(name).unwrap_or(Self::PaletteStream)
    }

    /// Effects that need a location fix or a device-specific renderer
    pub const fn is_position_dependent(self) -> bool {
        matches!(
            self,
            Self::PositionStatus
                | Self::ColorWheel
                | Self::Speedometer
                | Self::JacketDance
                | Self::ColorRadial
        )
    }
}

/// Effect variant with its parameter payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    Off,
    Solid {
        color: Rgb,
    },
    PaletteCycle {
        palette: PaletteId,
        duration: u16,
    },
    PaletteStream {
        palette: PaletteId,
        duration: u16,
        direction: bool,
    },
    SpectrumCycle {
        duration: u16,
    },
    SpectrumStream {
        duration: u16,
    },
    SpectrumSparkle {
        duration: u16,
        density: u8,
    },
    Strobe {
        num_flashes: u16,
        duration_on: u16,
        duration_off: u16,
        duration_between_sets: u16,
        color: Rgb,
    },
    Sparkle {
        duration: u16,
        density: u8,
        color: Rgb,
    },
    Breathe {
        duration: u16,
        dimness: u8,
        color: Rgb,
    },
    SetChsv {
        hue: u8,
        saturation: u8,
        value: u8,
    },
    PulseWave {
        duration: u16,
        wave_width: u8,
        palette: PaletteId,
    },
    MeteorShower {
        duration: u16,
        meteor_count: u8,
        trail_length: u8,
        palette: PaletteId,
    },
    FirePlasma {
        duration: u16,
        heat_variance: u8,
        palette: PaletteId,
    },
    Kaleidoscope {
        duration: u16,
        mirror_count: u8,
        palette: PaletteId,
    },
    RainbowComet {
        duration: u16,
        comet_count: u8,
        trail_length: u8,
    },
    MatrixRain {
        duration: u16,
        drop_rate: u8,
        color: Rgb,
    },
    PlasmaClouds {
        duration: u16,
        cloud_scale: u8,
        palette: PaletteId,
    },
    LavaLamp {
        duration: u16,
        blob_count: u8,
        palette: PaletteId,
    },
    AuroraBorealis {
        duration: u16,
        wave_count: u8,
        palette: PaletteId,
    },
    LightningStorm {
        duration: u16,
        flash_intensity: u8,
        flash_frequency: u16,
    },
    ColorExplosion {
        duration: u16,
        explosion_size: u8,
        palette: PaletteId,
    },
    SpiralGalaxy {
        duration: u16,
        spiral_arms: u8,
        palette: PaletteId,
    },
}

impl Effect {
    pub const fn id(&self) -> EffectId {
        match self {
            Self::Off => EffectId::Off,
            Self::Solid { .. } => EffectId::Solid,
            Self::PaletteCycle { .. } => EffectId::PaletteCycle,
            Self::PaletteStream { .. } => EffectId::PaletteStream,
            Self::SpectrumCycle { .. } => EffectId::SpectrumCycle,
            Self::SpectrumStream { .. } => EffectId::SpectrumStream,
            Self::SpectrumSparkle { .. } => EffectId::SpectrumSparkle,
            Self::Strobe { .. } => EffectId::Strobe,
            Self::Sparkle { .. } => EffectId::Sparkle,
            Self::Breathe { .. } => EffectId::Breathe,
            Self::SetChsv { .. } => EffectId::SetChsv,
            Self::PulseWave { .. } => EffectId::PulseWave,
            Self::MeteorShower { .. } => EffectId::MeteorShower,
            Self::FirePlasma { .. } => EffectId::FirePlasma,
            Self::Kaleidoscope { .. } => EffectId::Kaleidoscope,
            Self::RainbowComet { .. } => EffectId::RainbowComet,
            Self::MatrixRain { .. } => EffectId::MatrixRain,
            Self::PlasmaClouds { .. } => EffectId::PlasmaClouds,
            Self::LavaLamp { .. } => EffectId::LavaLamp,
            Self::AuroraBorealis { .. } => EffectId::AuroraBorealis,
            Self::LightningStorm { .. } => EffectId::LightningStorm,
            Self::ColorExplosion { .. } => EffectId::ColorExplosion,
            Self::SpiralGalaxy { .. } => EffectId::SpiralGalaxy,
        }
    }

    /// Frame duration in milliseconds, when the effect has one
    pub const fn duration(&self) -> Option<u16> {
        match *self {
            Self::Off | Self::Solid { .. } | Self::Strobe { .. } | Self::SetChsv { .. } => None,
            Self::PaletteCycle { duration, .. }
            | Self::PaletteStream { duration, .. }
            | Self::SpectrumCycle { duration }
            | Self::SpectrumStream { duration }
            | Self::SpectrumSparkle { duration, .. }
            | Self::Sparkle { duration, .. }
            | Self::Breathe { duration, .. }
            | Self::PulseWave { duration, .. }
            | Self::MeteorShower { duration, .. }
            | Self::FirePlasma { duration, .. }
            | Self::Kaleidoscope { duration, .. }
            | Self::RainbowComet { duration, .. }
            | Self::MatrixRain { duration, .. }
            | Self::PlasmaClouds { duration, .. }
            | Self::LavaLamp { duration, .. }
            | Self::AuroraBorealis { duration, .. }
            | Self::LightningStorm { duration, .. }
            | Self::ColorExplosion { duration, .. }
            | Self::SpiralGalaxy { duration, .. } => Some(duration),
        }
    }

    /// Palette the effect samples from, when it uses one
    pub const fn palette(&self) -> Option<PaletteId> {
        match *self {
            Self::PaletteCycle { palette, .. }
            | Self::PaletteStream { palette, .. }
            | Self::PulseWave { palette, .. }
            | Self::MeteorShower { palette, .. }
            | Self::FirePlasma { palette, .. }
            | Self::Kaleidoscope { palette, .. }
            | Self::PlasmaClouds { palette, .. }
            | Self::LavaLamp { palette, .. }
            | Self::AuroraBorealis { palette, .. }
            | Self::ColorExplosion { palette, .. }
            | Self::SpiralGalaxy { palette, .. } => Some(palette),
            _ => None,
        }
    }

    /// Single color the effect paints with, when it has one
    pub const fn color(&self) -> Option<Rgb> {
        match *self {
            Self::Solid { color }
            | Self::Strobe { color, .. }
            | Self::Sparkle { color, .. }
            | Self::Breathe { color, .. }
            | Self::MatrixRain { color, .. } => Some(color),
            _ => None,
        }
    }

    /// Same effect running at another frame duration
    #[must_use]
    pub const fn with_duration(mut self, value: u16) -> Self {
        match &mut self {
            Self::PaletteCycle { duration, .. }
            | Self::PaletteStream { duration, .. }
            | Self::SpectrumCycle { duration }
            | Self::SpectrumStream { duration }
            | Self::SpectrumSparkle { duration, .. }
            | Self::Sparkle { duration, .. }
            | Self::Breathe { duration, .. }
            | Self::PulseWave { duration, .. }
            | Self::MeteorShower { duration, .. }
            | Self::FirePlasma { duration, .. }
            | Self::Kaleidoscope { duration, .. }
            | Self::RainbowComet { duration, .. }
            | Self::MatrixRain { duration, .. }
            | Self::PlasmaClouds { duration, .. }
            | Self::LavaLamp { duration, .. }
            | Self::AuroraBorealis { duration, .. }
            | Self::LightningStorm { duration, .. }
            | Self::ColorExplosion { duration, .. }
            | Self::SpiralGalaxy { duration, .. } => *duration = value,
            _ => {}
        }
        self
    }

    /// Same effect sampling another palette
    #[must_use]
    pub const fn with_palette(mut self, value: PaletteId) -> Self {
        match &mut self {
            Self::PaletteCycle { palette, .. }
            | Self::PaletteStream { palette, .. }
            | Self::PulseWave { palette, .. }
            | Self::MeteorShower { palette, .. }
            | Self::FirePlasma { palette, .. }
            | Self::Kaleidoscope { palette, .. }
            | Self::PlasmaClouds { palette, .. }
            | Self::LavaLamp { palette, .. }
            | Self::AuroraBorealis { palette, .. }
            | Self::ColorExplosion { palette, .. }
            | Self::SpiralGalaxy { palette, .. } => *palette = value,
            _ => {}
        }
        self
    }

    /// Same effect painting with another color
    #[must_use]
    pub const fn with_color(mut self, value: Rgb) -> Self {
        match &mut self {
            Self::Solid { color }
            | Self::Strobe { color, .. }
            | Self::Sparkle { color, .. }
            | Self::Breathe { color, .. }
            | Self::MatrixRain { color, .. } => *color = value,
            _ => {}
        }
        self
    }

    /// Same effect streaming in another direction
    #[must_use]
    pub const fn with_direction(mut self, value: bool) -> Self {
        if let Self::PaletteStream { direction, .. } = &mut self {
            *direction = value;
        }
        self
    }
}

/// Complete description of what the engine renders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Output brightness (0-255)
    pub brightness: u8,
    pub color: Rgb,
    pub primary_palette: PaletteId,
    /// Frame duration in milliseconds
    pub speed: u16,
    pub direction: bool,
    pub effect: Effect,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            brightness: 255,
            color: Rgb { r: 255, g: 0, b: 0 },
            primary_palette: PaletteId::Cool,
            speed: 175,
            direction: true,
            effect: Effect::Off,
        }
    }
}

impl Scene {
    /// Scene for `effect`, with the descriptor fields taken from the
    /// effect payload where it defines them.
    pub fn new(effect: Effect) -> Self {
        let defaults = Self::default();
        Self {
            brightness: defaults.brightness,
            color: effect.color().unwrap_or(defaults.color),
            primary_palette: effect.palette().unwrap_or(defaults.primary_palette),
            speed: effect.duration().unwrap_or(defaults.speed),
            direction: match effect {
                Effect::PaletteStream { direction, .. } => direction,
                _ => defaults.direction,
            },
            effect,
        }
    }

    pub const fn effect_id(&self) -> EffectId {
        self.effect.id()
    }

    /// Push the descriptor fields back into the effect payload
    #[must_use]
    pub const fn normalized(mut self) -> Self {
        self.effect = self
            .effect
            .with_color(self.color)
            .with_palette(self.primary_palette)
            .with_duration(self.speed)
            .with_direction(self.direction);
        self
    }

    /// Whether two scenes describe the same effect, ignoring brightness
    pub fn same_content(&self, other: &Scene) -> bool {
        self.effect == other.effect
            && self.color == other.color
            && self.primary_palette == other.primary_palette
            && self.speed == other.speed
            && self.direction == other.direction
    }
}
