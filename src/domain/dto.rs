use heapless::{String, Vec};
use playa_core::storage::truncated;
use playa_light_composer::{EffectId, PaletteId, Rgb};
use serde::{Deserialize, Serialize};

use crate::config::{
    BRIGHTNESS_MAX, BRIGHTNESS_MIN, DEFAULT_STATUS_INTERVAL, DEFAULTS_VERSION, GPS_LOW_SPEED_MAX,
    GPS_TOP_SPEED_MAX, MAX_LED_STRIPS, MAX_NAME_LEN, SPEED_MAX, SPEED_MIN, STATUS_INTERVAL_MAX,
    STATUS_INTERVAL_MIN,
};

pub type Name = String<MAX_NAME_LEN>;

/// Color channel order of an LED strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOrder {
    #[default]
    Grb,
    Rgb,
    Brg,
    Bgr,
    Rbg,
    Gbr,
}

impl ColorOrder {
    pub const fn as_u8(self) -> u8 {
        match self {
            ColorOrder::Grb => 0,
            ColorOrder::Rgb => 1,
            ColorOrder::Brg => 2,
            ColorOrder::Bgr => 3,
            ColorOrder::Rbg => 4,
            ColorOrder::Gbr => 5,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ColorOrder::Grb),
            1 => Some(ColorOrder::Rgb),
            2 => Some(ColorOrder::Brg),
            3 => Some(ColorOrder::Bgr),
            4 => Some(ColorOrder::Rbg),
            5 => Some(ColorOrder::Gbr),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ColorOrder::Grb => "GRB",
            ColorOrder::Rgb => "RGB",
            ColorOrder::Brg => "BRG",
            ColorOrder::Bgr => "BGR",
            ColorOrder::Rbg => "RBG",
            ColorOrder::Gbr => "GBR",
        }
    }
}

/// Wiring of one LED strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedStripConfig {
    pub pin: u8,
    pub num_leds: u16,
    pub color_order: ColorOrder,
    pub enabled: bool,
}

impl LedStripConfig {
    pub const fn new() -> Self {
        Self {
            pin: 2,
            num_leds: 30,
            color_order: ColorOrder::Grb,
            enabled: false,
        }
    }

    #[must_use]
    pub const fn with_pin(mut self, pin: u8) -> Self {
        self.pin = pin;
        self
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for LedStripConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted device configuration, loaded at boot
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDefaults {
    /// Boot brightness in percent
    pub brightness: u8,
    pub max_brightness: u8,
    pub speed: u16,
    pub palette: PaletteId,
    pub effect: EffectId,
    pub reverse_direction: bool,

    pub owner: Name,
    pub device_name: Name,
    pub device_type: Name,

    pub led_strips: [LedStripConfig; MAX_LED_STRIPS],
    pub active_led_strips: u8,

    pub auto_on: bool,
    /// Milliseconds between two status reports
    pub status_interval: u32,
    pub effect_color: Rgb,
    pub gps_enabled: bool,

    /// Ground speed (km/h) at which animations run at the configured speed
    pub gps_low_speed: f32,
    /// Ground speed (km/h) at which animations run at the fastest speed
    pub gps_top_speed: f32,
    pub gps_lightshow_speed_enabled: bool,

    pub sync_enabled: bool,
    pub version: u8,
}

impl DeviceDefaults {
    pub fn factory() -> Self {
        let mut led_strips = [LedStripConfig::new(); MAX_LED_STRIPS];
        for (pin, strip) in (2u8..).zip(led_strips.iter_mut()) {
            *strip = LedStripConfig::new().with_pin(pin).with_enabled(pin == 2);
        }

        Self {
            brightness: 50,
            max_brightness: 100,
            speed: 100,
            palette: PaletteId::Cool,
            effect: EffectId::PaletteStream,
            reverse_direction: true,
            owner: truncated("New"),
            device_name: truncated("BMDevice"),
            device_type: truncated("Generic"),
            led_strips,
            active_led_strips: 1,
            auto_on: true,
            status_interval: DEFAULT_STATUS_INTERVAL,
            effect_color: Rgb { r: 0, g: 255, b: 0 },
            gps_enabled: false,
            gps_low_speed: 5.0,
            gps_top_speed: 25.0,
            gps_lightshow_speed_enabled: false,
            sync_enabled: true,
            version: DEFAULTS_VERSION,
        }
    }

    /// Clamp every field into its valid range
    pub fn constrain(&mut self) {
        self.max_brightness = self.max_brightness.clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX);
        self.brightness = self
            .brightness
            .clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX)
            .min(self.max_brightness);
        self.speed = self.speed.clamp(SPEED_MIN, SPEED_MAX);
        self.status_interval = self
            .status_interval
            .clamp(STATUS_INTERVAL_MIN, STATUS_INTERVAL_MAX);
        self.gps_low_speed = clamp_speed(self.gps_low_speed, GPS_LOW_SPEED_MAX, 5.0);
        self.gps_top_speed = clamp_speed(self.gps_top_speed, GPS_TOP_SPEED_MAX, 25.0);
        if self.gps_top_speed <= self.gps_low_speed {
            self.gps_top_speed = self.gps_low_speed + 1.0;
        }
        #[allow(clippy::cast_possible_truncation)]
        let max_strips = MAX_LED_STRIPS as u8;
        self.active_led_strips = self.active_led_strips.min(max_strips);
    }

    #[must_use]
    pub fn constrained(mut self) -> Self {
        self.constrain();
        self
    }

    pub fn is_valid(&self) -> bool {
        (BRIGHTNESS_MIN..=BRIGHTNESS_MAX).contains(&self.brightness)
            && (BRIGHTNESS_MIN..=BRIGHTNESS_MAX).contains(&self.max_brightness)
            && self.brightness <= self.max_brightness
            && (SPEED_MIN..=SPEED_MAX).contains(&self.speed)
            && (STATUS_INTERVAL_MIN..=STATUS_INTERVAL_MAX).contains(&self.status_interval)
            && self.gps_top_speed > self.gps_low_speed
            && usize::from(self.active_led_strips) <= MAX_LED_STRIPS
            && self.version >= 1
    }

    /// Strips that are part of the active topology
    pub fn active_strips(&self) -> &[LedStripConfig] {
        let count = usize::from(self.active_led_strips).min(MAX_LED_STRIPS);
        &self.led_strips[..count]
    }
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self::factory()
    }
}

fn clamp_speed(value: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        return fallback;
    }
    value.clamp(0.0, max)
}

/// One persisted field of [`DeviceDefaults`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsField {
    Brightness,
    MaxBrightness,
    Speed,
    Palette,
    Effect,
    Direction,
    Owner,
    DeviceName,
    DeviceType,
    AutoOn,
    ActiveLedStrips,
    LedStrips,
    StatusInterval,
    EffectColor,
    GpsEnabled,
    GpsLowSpeed,
    GpsTopSpeed,
    GpsLightshowSpeedEnabled,
    SyncEnabled,
    Version,
}

impl DefaultsField {
    /// Every field, version last so a partially written snapshot is never
    /// mistaken for a complete one
    pub const ALL: [DefaultsField; 20] = [
        DefaultsField::Brightness,
        DefaultsField::MaxBrightness,
        DefaultsField::Speed,
        DefaultsField::Palette,
        DefaultsField::Effect,
        DefaultsField::Direction,
        DefaultsField::Owner,
        DefaultsField::DeviceName,
        DefaultsField::DeviceType,
        DefaultsField::AutoOn,
        DefaultsField::ActiveLedStrips,
        DefaultsField::LedStrips,
        DefaultsField::StatusInterval,
        DefaultsField::EffectColor,
        DefaultsField::GpsEnabled,
        DefaultsField::GpsLowSpeed,
        DefaultsField::GpsTopSpeed,
        DefaultsField::GpsLightshowSpeedEnabled,
        DefaultsField::SyncEnabled,
        DefaultsField::Version,
    ];
}

// -----------------------------------------------------------------------------
// JSON documents
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorDto {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Rgb> for ColorDto {
    fn from(color: Rgb) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

impl From<ColorDto> for Rgb {
    fn from(color: ColorDto) -> Self {
        Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedStripDto {
    pub pin: u8,
    pub num_leds: u16,
    pub color_order: u8,
    pub enabled: bool,
}

impl From<&LedStripConfig> for LedStripDto {
    fn from(strip: &LedStripConfig) -> Self {
        Self {
            pin: strip.pin,
            num_leds: strip.num_leds,
            color_order: strip.color_order.as_u8(),
            enabled: strip.enabled,
        }
    }
}

impl From<LedStripDto> for LedStripConfig {
    fn from(strip: LedStripDto) -> Self {
        Self {
            pin: strip.pin,
            num_leds: strip.num_leds,
            color_order: ColorOrder::from_u8(strip.color_order).unwrap_or_default(),
            enabled: strip.enabled,
        }
    }
}

pub type LedStripList = Vec<LedStripDto, MAX_LED_STRIPS>;

fn strip_list(strips: &[LedStripConfig]) -> LedStripList {
    strips.iter().map(LedStripDto::from).collect()
}

/// Full defaults export, every LED table slot included
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsDocument<'a> {
    pub brightness: u8,
    pub max_brightness: u8,
    pub speed: u16,
    pub palette: &'a str,
    pub palette_id: u8,
    pub effect: &'a str,
    pub effect_id: u8,
    pub reverse_direction: bool,
    pub owner: &'a str,
    pub device_name: &'a str,
    pub device_type: &'a str,
    pub auto_on: bool,
    pub status_interval: u32,
    pub gps_enabled: bool,
    pub gps_low_speed: f32,
    pub gps_top_speed: f32,
    pub gps_lightshow_speed_enabled: bool,
    pub sync_enabled: bool,
    pub version: u8,
    pub effect_color: ColorDto,
    #[serde(rename = "activeLEDStrips")]
    pub active_led_strips: u8,
    pub led_strips: LedStripList,
}

impl<'a> From<&'a DeviceDefaults> for DefaultsDocument<'a> {
    fn from(defaults: &'a DeviceDefaults) -> Self {
        Self {
            brightness: defaults.brightness,
            max_brightness: defaults.max_brightness,
            speed: defaults.speed,
            palette: defaults.palette.as_str(),
            palette_id: defaults.palette.as_u8(),
            effect: defaults.effect.as_str(),
            effect_id: defaults.effect.as_u8(),
            reverse_direction: defaults.reverse_direction,
            owner: &defaults.owner,
            device_name: &defaults.device_name,
            device_type: &defaults.device_type,
            auto_on: defaults.auto_on,
            status_interval: defaults.status_interval,
            gps_enabled: defaults.gps_enabled,
            gps_low_speed: defaults.gps_low_speed,
            gps_top_speed: defaults.gps_top_speed,
            gps_lightshow_speed_enabled: defaults.gps_lightshow_speed_enabled,
            sync_enabled: defaults.sync_enabled,
            version: defaults.version,
            effect_color: defaults.effect_color.into(),
            active_led_strips: defaults.active_led_strips,
            led_strips: strip_list(&defaults.led_strips),
        }
    }
}

/// Partial defaults import; absent keys keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsPatch<'a> {
    #[serde(default)]
    pub brightness: Option<i32>,
    #[serde(default)]
    pub max_brightness: Option<i32>,
    #[serde(default)]
    pub speed: Option<i32>,
    #[serde(default, borrow)]
    pub palette: Option<&'a str>,
    #[serde(default)]
    pub palette_id: Option<u8>,
    #[serde(default, borrow)]
    pub effect: Option<&'a str>,
    #[serde(default)]
    pub effect_id: Option<u8>,
    #[serde(default)]
    pub reverse_direction: Option<bool>,
    #[serde(default, borrow)]
    pub owner: Option<&'a str>,
    #[serde(default, borrow)]
    pub device_name: Option<&'a str>,
    #[serde(default, borrow)]
    pub device_type: Option<&'a str>,
    #[serde(default)]
    pub auto_on: Option<bool>,
    #[serde(default)]
    pub status_interval: Option<u32>,
    #[serde(default)]
    pub gps_enabled: Option<bool>,
    #[serde(default)]
    pub gps_low_speed: Option<f32>,
    #[serde(default)]
    pub gps_top_speed: Option<f32>,
    #[serde(default)]
    pub gps_lightshow_speed_enabled: Option<bool>,
    #[serde(default)]
    pub sync_enabled: Option<bool>,
    #[serde(default)]
    pub version: Option<u8>,
    #[serde(default)]
    pub effect_color: Option<ColorDto>,
    #[serde(default, rename = "activeLEDStrips")]
    pub active_led_strips: Option<u8>,
    #[serde(default)]
    pub led_strips: Option<LedStripList>,
}

impl DefaultsPatch<'_> {
    /// Merge the present keys into `defaults`. Ids win over names.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply_to(&self, defaults: &mut DeviceDefaults) {
        if let Some(value) = self.brightness {
            defaults.brightness = value.clamp(0, i32::from(u8::MAX)) as u8;
        }
        if let Some(value) = self.max_brightness {
            defaults.max_brightness = value.clamp(0, i32::from(u8::MAX)) as u8;
        }
        if let Some(value) = self.speed {
            defaults.speed = value.clamp(0, i32::from(u16::MAX)) as u16;
        }
        if let Some(palette) = self.palette_id.and_then(PaletteId::from_raw) {
            defaults.palette = palette;
        } else if let Some(name) = self.palette {
            defaults.palette = PaletteId::parse_from_str(name);
        }
        if let Some(effect) = self.effect_id.and_then(EffectId::from_raw) {
            defaults.effect = effect;
        } else if let Some(name) = self.effect {
            defaults.effect = EffectId::parse_from_str(name);
        }
        if let Some(value) = self.reverse_direction {
            defaults.reverse_direction = value;
        }
        if let Some(owner) = self.owner {
            defaults.owner = truncated(owner);
        }
        if let Some(name) = self.device_name {
            defaults.device_name = truncated(name);
        }
        if let Some(device_type) = self.device_type {
            defaults.device_type = truncated(device_type);
        }
        if let Some(value) = self.auto_on {
            defaults.auto_on = value;
        }
        if let Some(value) = self.status_interval {
            defaults.status_interval = value;
        }
        if let Some(value) = self.gps_enabled {
            defaults.gps_enabled = value;
        }
        if let Some(value) = self.gps_low_speed {
            defaults.gps_low_speed = value;
        }
        if let Some(value) = self.gps_top_speed {
            defaults.gps_top_speed = value;
        }
        if let Some(value) = self.gps_lightshow_speed_enabled {
            defaults.gps_lightshow_speed_enabled = value;
        }
        if let Some(value) = self.sync_enabled {
            defaults.sync_enabled = value;
        }
        if let Some(value) = self.version {
            defaults.version = value;
        }
        if let Some(color) = self.effect_color {
            defaults.effect_color = color.into();
        }
        if let Some(strips) = &self.led_strips {
            for (slot, strip) in defaults.led_strips.iter_mut().zip(strips.iter()) {
                *slot = (*strip).into();
            }
            #[allow(clippy::cast_possible_truncation)]
            let count = strips.len() as u8;
            defaults.active_led_strips = count;
        }
        if let Some(count) = self.active_led_strips {
            defaults.active_led_strips = count;
        }
    }
}

/// LED topology reply
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationDocument<'a> {
    pub owner: &'a str,
    #[serde(rename = "deviceType")]
    pub device_type: &'a str,
    #[serde(rename = "activeLEDStrips")]
    pub active_led_strips: u8,
    #[serde(rename = "ledStrips")]
    pub led_strips: LedStripList,
}

impl<'a> From<&'a DeviceDefaults> for ConfigurationDocument<'a> {
    fn from(defaults: &'a DeviceDefaults) -> Self {
        Self {
            owner: &defaults.owner,
            device_type: &defaults.device_type,
            active_led_strips: defaults.active_led_strips,
            led_strips: strip_list(defaults.active_strips()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReply {
    pub defaults_saved: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetReply {
    pub factory_reset: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PositionDto {
    pub lat: f32,
    pub lon: f32,
}
