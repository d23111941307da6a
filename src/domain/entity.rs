use playa_light_composer::{EffectId, PaletteId, Rgb};

use crate::config::{BRIGHTNESS_MIN, SPEED_MAX, SPEED_MIN};

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub latitude: f32,
    pub longitude: f32,
}

impl Position {
    /// Black Rock City, the default origin
    pub const BLACK_ROCK_CITY: Position = Position::new(40.7868, -119.2065);

    pub const fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Effect-specific numeric parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectParameter {
    WaveWidth,
    MeteorCount,
    TrailLength,
    HeatVariance,
    MirrorCount,
    CometCount,
    DropRate,
    CloudScale,
    BlobCount,
    WaveCount,
    FlashIntensity,
    FlashFrequency,
    ExplosionSize,
    SpiralArms,
}

impl EffectParameter {
    pub const ALL: [EffectParameter; 14] = [
        EffectParameter::WaveWidth,
        EffectParameter::MeteorCount,
        EffectParameter::TrailLength,
        EffectParameter::HeatVariance,
        EffectParameter::MirrorCount,
        EffectParameter::CometCount,
        EffectParameter::DropRate,
        EffectParameter::CloudScale,
        EffectParameter::BlobCount,
        EffectParameter::WaveCount,
        EffectParameter::FlashIntensity,
        EffectParameter::FlashFrequency,
        EffectParameter::ExplosionSize,
        EffectParameter::SpiralArms,
    ];

    /// Inclusive value range
    pub const fn bounds(self) -> (u16, u16) {
        match self {
            Self::WaveWidth | Self::CloudScale | Self::ExplosionSize => (1, 50),
            Self::MeteorCount | Self::BlobCount => (1, 20),
            Self::TrailLength => (1, 30),
            Self::HeatVariance | Self::DropRate | Self::FlashIntensity => (1, 100),
            Self::MirrorCount | Self::CometCount | Self::SpiralArms => (1, 10),
            Self::WaveCount => (1, 15),
            Self::FlashFrequency => (100, 5000),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaveWidth => "waveWidth",
            Self::MeteorCount => "meteorCount",
            Self::TrailLength => "trailLength",
            Self::HeatVariance => "heatVariance",
            Self::MirrorCount => "mirrorCount",
            Self::CometCount => "cometCount",
            Self::DropRate => "dropRate",
            Self::CloudScale => "cloudScale",
            Self::BlobCount => "blobCount",
            Self::WaveCount => "waveCount",
            Self::FlashIntensity => "flashIntensity",
            Self::FlashFrequency => "flashFrequency",
            Self::ExplosionSize => "explosionSize",
            Self::SpiralArms => "spiralArms",
        }
    }
}

/// Parameters of the procedural effects.
///
/// Every value stays inside [`EffectParameter::bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectParameters {
    pub wave_width: u8,
    pub meteor_count: u8,
    pub trail_length: u8,
    pub heat_variance: u8,
    pub mirror_count: u8,
    pub comet_count: u8,
    pub drop_rate: u8,
    pub cloud_scale: u8,
    pub blob_count: u8,
    pub wave_count: u8,
    pub flash_intensity: u8,
    pub flash_frequency: u16,
    pub explosion_size: u8,
    pub spiral_arms: u8,
}

impl EffectParameters {
    pub const fn new() -> Self {
        Self {
            wave_width: 10,
            meteor_count: 5,
            trail_length: 10,
            heat_variance: 50,
            mirror_count: 4,
            comet_count: 3,
            drop_rate: 25,
            cloud_scale: 20,
            blob_count: 8,
            wave_count: 6,
            flash_intensity: 80,
            flash_frequency: 1000,
            explosion_size: 20,
            spiral_arms: 4,
        }
    }

    pub const fn get(&self, parameter: EffectParameter) -> u16 {
        match parameter {
            EffectParameter::WaveWidth => self.wave_width as u16,
            EffectParameter::MeteorCount => self.meteor_count as u16,
            EffectParameter::TrailLength => self.trail_length as u16,
            EffectParameter::HeatVariance => self.heat_variance as u16,
            EffectParameter::MirrorCount => self.mirror_count as u16,
            EffectParameter::CometCount => self.comet_count as u16,
            EffectParameter::DropRate => self.drop_rate as u16,
            EffectParameter::CloudScale => self.cloud_scale as u16,
            EffectParameter::BlobCount => self.blob_count as u16,
            EffectParameter::WaveCount => self.wave_count as u16,
            EffectParameter::FlashIntensity => self.flash_intensity as u16,
            EffectParameter::FlashFrequency => self.flash_frequency,
            EffectParameter::ExplosionSize => self.explosion_size as u16,
            EffectParameter::SpiralArms => self.spiral_arms as u16,
        }
    }

    /// Store `value` clamped to the parameter bounds
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set(&mut self, parameter: EffectParameter, value: i32) {
        let (min, max) = parameter.bounds();
        let clamped = value.clamp(i32::from(min), i32::from(max)) as u16;
        // every bound except the flash frequency fits a byte
        let byte = clamped as u8;
        match parameter {
            EffectParameter::WaveWidth => self.wave_width = byte,
            EffectParameter::MeteorCount => self.meteor_count = byte,
            EffectParameter::TrailLength => self.trail_length = byte,
            EffectParameter::HeatVariance => self.heat_variance = byte,
            EffectParameter::MirrorCount => self.mirror_count = byte,
            EffectParameter::CometCount => self.comet_count = byte,
            EffectParameter::DropRate => self.drop_rate = byte,
            EffectParameter::CloudScale => self.cloud_scale = byte,
            EffectParameter::BlobCount => self.blob_count = byte,
            EffectParameter::WaveCount => self.wave_count = byte,
            EffectParameter::FlashIntensity => self.flash_intensity = byte,
            EffectParameter::FlashFrequency => self.flash_frequency = clamped,
            EffectParameter::ExplosionSize => self.explosion_size = byte,
            EffectParameter::SpiralArms => self.spiral_arms = byte,
        }
    }
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// Live device state.
///
/// Mutated by the command dispatcher, read by the scene builder and the
/// status reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub power: bool,
    /// Brightness in percent
    pub brightness: u8,
    /// Frame duration in milliseconds
    pub speed: u16,
    pub reverse: bool,
    pub palette: PaletteId,
    pub effect: EffectId,
    pub params: EffectParameters,
    pub effect_color: Rgb,
    pub origin: Position,
    /// Last known position, `None` until the first fix
    pub position: Option<Position>,
    /// Last known ground speed in km/h
    pub current_speed: f32,
}

impl DeviceState {
    pub const fn new() -> Self {
        Self {
            power: true,
            brightness: 10,
            speed: 100,
            reverse: true,
            palette: PaletteId::Cool,
            effect: EffectId::PaletteStream,
            params: EffectParameters::new(),
            effect_color: Rgb { r: 0, g: 255, b: 0 },
            origin: Position::BLACK_ROCK_CITY,
            position: None,
            current_speed: 0.0,
        }
    }

    pub const fn position_available(&self) -> bool {
        self.position.is_some()
    }

    /// Store `value` clamped to `1..=max_brightness`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_brightness(&mut self, value: i32, max_brightness: u8) {
        let max = max_brightness.max(BRIGHTNESS_MIN);
        self.brightness = value.clamp(i32::from(BRIGHTNESS_MIN), i32::from(max)) as u8;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_speed(&mut self, value: i32) {
        self.speed = value.clamp(i32::from(SPEED_MIN), i32::from(SPEED_MAX)) as u16;
    }

    /// Brightness on the 0-255 engine scale
    #[allow(clippy::cast_possible_truncation)]
    pub const fn output_brightness(&self) -> u8 {
        let percent = if self.brightness > 100 {
            100
        } else {
            self.brightness
        };
        (percent as u16 * 255 / 100) as u8
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
