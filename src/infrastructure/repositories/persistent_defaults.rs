use bytemuck::{Pod, Zeroable};
use embedded_storage::nor_flash::NorFlash;
use playa_core::{FlashPreferences, PreferencesStore};
use playa_light_composer::{EffectId, PaletteId, Rgb};

use crate::{
    config::{
        DEFAULTS_NAMESPACE, DEFAULTS_PARTITION_OFFSET, DEFAULTS_REGION_SIZE, MAX_LED_STRIPS,
        MAX_NAME_LEN,
    },
    domain::{
        dto::{ColorOrder, DefaultsField, DeviceDefaults, LedStripConfig},
        ports::{DefaultsError, DefaultsStorage},
    },
};

const KEY_BRIGHTNESS: &str = "brightness";
const KEY_MAX_BRIGHTNESS: &str = "maxBrightness";
const KEY_SPEED: &str = "speed";
const KEY_PALETTE: &str = "palette";
const KEY_EFFECT: &str = "effect";
const KEY_DIRECTION: &str = "direction";
const KEY_OWNER: &str = "owner";
const KEY_DEVICE_NAME: &str = "deviceName";
const KEY_DEVICE_TYPE: &str = "deviceType";
const KEY_AUTO_ON: &str = "autoOn";
const KEY_LED_COUNT: &str = "ledCount";
const KEY_LED_STRIPS: &str = "ledStrips";
const KEY_STATUS_INTERVAL: &str = "statusInterval";
const KEY_EFFECT_COLOR: &str = "effectColor";
const KEY_GPS_ENABLED: &str = "gpsEnabled";
const KEY_GPS_LOW_SPEED: &str = "gpsLowSpeed";
const KEY_GPS_TOP_SPEED: &str = "gpsTopSpeed";
const KEY_GPS_LIGHTSHOW_SPEED: &str = "gpsLightSpdEn";
const KEY_SYNC_ENABLED: &str = "syncEnabled";
const KEY_VERSION: &str = "version";

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
struct PersistentLedStrip {
    pub pin: u8,
    pub color_order: u8,
    pub enabled: u8,
    _padding: u8,
    pub num_leds: u16,
}

impl From<&LedStripConfig> for PersistentLedStrip {
    fn from(strip: &LedStripConfig) -> Self {
        Self {
            pin: strip.pin,
            color_order: strip.color_order.as_u8(),
            enabled: u8::from(strip.enabled),
            _padding: 0,
            num_leds: strip.num_leds,
        }
    }
}

impl From<PersistentLedStrip> for LedStripConfig {
    fn from(strip: PersistentLedStrip) -> Self {
        Self {
            pin: strip.pin,
            num_leds: strip.num_leds,
            color_order: ColorOrder::from_u8(strip.color_order).unwrap_or_default(),
            enabled: strip.enabled != 0,
        }
    }
}

type PersistentLedStrips = [PersistentLedStrip; MAX_LED_STRIPS];
const LED_STRIPS_SIZE: usize = size_of::<PersistentLedStrips>();

/// Defaults stored as preference entries under [`DEFAULTS_NAMESPACE`]
pub struct PersistentDefaults<S: PreferencesStore> {
    store: S,
}

impl<F: NorFlash> PersistentDefaults<FlashPreferences<F, DEFAULTS_REGION_SIZE>> {
    /// Open the defaults partition of the production flash layout
    pub fn open(flash: F) -> Result<Self, DefaultsError> {
        Self::open_at(flash, DEFAULTS_PARTITION_OFFSET)
    }

    pub fn open_at(flash: F, offset: u32) -> Result<Self, DefaultsError> {
        let store = FlashPreferences::open(flash, offset, DEFAULTS_NAMESPACE).map_err(|e| {
            #[cfg(feature = "log")]
            log::error!("defaults: failed to open storage: {:?}", e);

            DefaultsError::Storage(e)
        })?;
        Ok(Self::new(store))
    }
}

impl<S: PreferencesStore> PersistentDefaults<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn load_led_strips(&self, base: &[LedStripConfig; MAX_LED_STRIPS]) -> [LedStripConfig; MAX_LED_STRIPS] {
        let Some(bytes) = self.store.get_array::<LED_STRIPS_SIZE>(KEY_LED_STRIPS) else {
            return *base;
        };
        let table: PersistentLedStrips = bytemuck::pod_read_unaligned(&bytes);
        table.map(LedStripConfig::from)
    }
}

impl<S: PreferencesStore> DefaultsStorage for PersistentDefaults<S> {
    fn stored_version(&self) -> Option<u8> {
        if self.store.contains(KEY_VERSION) {
            Some(self.store.get_u8(KEY_VERSION, 0))
        } else {
            None
        }
    }

    fn load_defaults(&self, base: &DeviceDefaults) -> Result<Option<DeviceDefaults>, DefaultsError> {
        if !self.store.contains(KEY_VERSION) {
            return Ok(None);
        }

        let store = &self.store;
        let palette = PaletteId::from_raw(store.get_u8(KEY_PALETTE, base.palette.as_u8()))
            .unwrap_or_else(|| {
                #[cfg(feature = "log")]
                log::warn!("defaults: stored palette out of range, using {}", base.palette.as_str());

                base.palette
            });
        let effect = EffectId::from_raw(store.get_u8(KEY_EFFECT, base.effect.as_u8()))
            .unwrap_or_else(|| {
                #[cfg(feature = "log")]
                log::warn!("defaults: stored effect out of range, using {}", base.effect.as_str());

                base.effect
            });
        let effect_color = store
            .get_array::<3>(KEY_EFFECT_COLOR)
            .map_or(base.effect_color, |[r, g, b]| Rgb { r, g, b });

        Ok(Some(DeviceDefaults {
            brightness: store.get_u8(KEY_BRIGHTNESS, base.brightness),
            max_brightness: store.get_u8(KEY_MAX_BRIGHTNESS, base.max_brightness),
            speed: store.get_u16(KEY_SPEED, base.speed),
            palette,
            effect,
            reverse_direction: store.get_bool(KEY_DIRECTION, base.reverse_direction),
            owner: store.get_string::<MAX_NAME_LEN>(KEY_OWNER, &base.owner),
            device_name: store.get_string::<MAX_NAME_LEN>(KEY_DEVICE_NAME, &base.device_name),
            device_type: store.get_string::<MAX_NAME_LEN>(KEY_DEVICE_TYPE, &base.device_type),
            led_strips: self.load_led_strips(&base.led_strips),
            active_led_strips: store.get_u8(KEY_LED_COUNT, base.active_led_strips),
            auto_on: store.get_bool(KEY_AUTO_ON, base.auto_on),
            status_interval: store.get_u32(KEY_STATUS_INTERVAL, base.status_interval),
            effect_color,
            gps_enabled: store.get_bool(KEY_GPS_ENABLED, base.gps_enabled),
            gps_low_speed: store.get_f32(KEY_GPS_LOW_SPEED, base.gps_low_speed),
            gps_top_speed: store.get_f32(KEY_GPS_TOP_SPEED, base.gps_top_speed),
            gps_lightshow_speed_enabled: store
                .get_bool(KEY_GPS_LIGHTSHOW_SPEED, base.gps_lightshow_speed_enabled),
            sync_enabled: store.get_bool(KEY_SYNC_ENABLED, base.sync_enabled),
            version: store.get_u8(KEY_VERSION, base.version),
        }))
    }

    fn save_field(
        &mut self,
        field: DefaultsField,
        defaults: &DeviceDefaults,
    ) -> Result<(), DefaultsError> {
        let store = &mut self.store;
        let written = match field {
            DefaultsField::Brightness => store.put_u8(KEY_BRIGHTNESS, defaults.brightness),
            DefaultsField::MaxBrightness => {
                store.put_u8(KEY_MAX_BRIGHTNESS, defaults.max_brightness)
            }
            DefaultsField::Speed => store.put_u16(KEY_SPEED, defaults.speed),
            DefaultsField::Palette => store.put_u8(KEY_PALETTE, defaults.palette.as_u8()),
            DefaultsField::Effect => store.put_u8(KEY_EFFECT, defaults.effect.as_u8()),
            DefaultsField::Direction => store.put_bool(KEY_DIRECTION, defaults.reverse_direction),
            DefaultsField::Owner => store.put_str(KEY_OWNER, &defaults.owner),
            DefaultsField::DeviceName => store.put_str(KEY_DEVICE_NAME, &defaults.device_name),
            DefaultsField::DeviceType => store.put_str(KEY_DEVICE_TYPE, &defaults.device_type),
            DefaultsField::AutoOn => store.put_bool(KEY_AUTO_ON, defaults.auto_on),
            DefaultsField::ActiveLedStrips => {
                store.put_u8(KEY_LED_COUNT, defaults.active_led_strips)
            }
            DefaultsField::LedStrips => {
                let table: PersistentLedStrips =
                    defaults.led_strips.each_ref().map(PersistentLedStrip::from);
                store.write(KEY_LED_STRIPS, bytemuck::bytes_of(&table))
            }
            DefaultsField::StatusInterval => {
                store.put_u32(KEY_STATUS_INTERVAL, defaults.status_interval)
            }
            DefaultsField::EffectColor => {
                let color = defaults.effect_color;
                store.write(KEY_EFFECT_COLOR, &[color.r, color.g, color.b])
            }
            DefaultsField::GpsEnabled => store.put_bool(KEY_GPS_ENABLED, defaults.gps_enabled),
            DefaultsField::GpsLowSpeed => store.put_f32(KEY_GPS_LOW_SPEED, defaults.gps_low_speed),
            DefaultsField::GpsTopSpeed => store.put_f32(KEY_GPS_TOP_SPEED, defaults.gps_top_speed),
            DefaultsField::GpsLightshowSpeedEnabled => store.put_bool(
                KEY_GPS_LIGHTSHOW_SPEED,
                defaults.gps_lightshow_speed_enabled,
            ),
            DefaultsField::SyncEnabled => store.put_bool(KEY_SYNC_ENABLED, defaults.sync_enabled),
            DefaultsField::Version => store.put_u8(KEY_VERSION, defaults.version),
        };
        written.map_err(DefaultsError::Storage)
    }

    /// Every field in one flash commit
    fn save_defaults(&mut self, defaults: &DeviceDefaults) -> Result<(), DefaultsError> {
        self.store.begin_batch();
        let written = DefaultsField::ALL
            .into_iter()
            .try_for_each(|field| self.save_field(field, defaults));
        let committed = self.store.commit_batch().map_err(DefaultsError::Storage);
        written.and(committed)
    }

    fn clear(&mut self) -> Result<(), DefaultsError> {
        self.store.clear().map_err(DefaultsError::Storage)
    }
}
