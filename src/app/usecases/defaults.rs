use playa_core::storage::truncated;
use playa_light_composer::{EffectId, PaletteId, Rgb};

use crate::{
    config::{
        BRIGHTNESS_MAX, BRIGHTNESS_MIN, DEFAULTS_VERSION, GPS_LOW_SPEED_MAX, GPS_TOP_SPEED_MAX,
        MAX_LED_STRIPS, SPEED_MAX, SPEED_MIN, STATUS_INTERVAL_MAX, STATUS_INTERVAL_MIN,
    },
    domain::{
        dto::{DefaultsDocument, DefaultsField, DefaultsPatch, DeviceDefaults, LedStripConfig},
        ports::{DefaultsError, DefaultsHandler, DefaultsReader, DefaultsStorage, DefaultsWriter},
    },
};

/// Configuration store: the live defaults snapshot and its backing storage
pub struct DefaultsUsecases<R: DefaultsStorage> {
    repository: R,
    current: DeviceDefaults,
}

impl<R: DefaultsStorage> DefaultsUsecases<R> {
    /// Store holding the factory snapshot until [`Self::begin`] runs
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            current: DeviceDefaults::factory(),
        }
    }

    /// Migrate, then load the stored snapshot or persist the factory one.
    ///
    /// Storage failures leave the factory snapshot active for the session.
    pub fn begin(&mut self) -> &DeviceDefaults {
        if let Err(_e) = self.migrate_if_needed() {
            #[cfg(feature = "log")]
            log::warn!("defaults: migration failed: {:?}", _e);
        }

        match self.load() {
            Ok(true) => {
                #[cfg(feature = "log")]
                log::info!("defaults: loaded from storage");
            }
            Ok(false) | Err(_) => {
                #[cfg(feature = "log")]
                log::info!("defaults: no valid stored defaults, using factory values");

                self.current = DeviceDefaults::factory();
                if let Err(_e) = self.repository.save_defaults(&self.current) {
                    #[cfg(feature = "log")]
                    log::warn!("defaults: failed to persist factory values: {:?}", _e);
                }
            }
        }

        &self.current
    }

    /// Replace the live snapshot with the stored one.
    ///
    /// Returns `Ok(false)` when nothing has been stored yet.
    pub fn load(&mut self) -> Result<bool, DefaultsError> {
        let Some(stored) = self.repository.load_defaults(&DeviceDefaults::factory())? else {
            return Ok(false);
        };

        let stored = stored.constrained();
        if !stored.is_valid() {
            return Err(DefaultsError::Invalid);
        }
        self.current = stored;
        Ok(true)
    }

    /// Bring an older stored schema up to [`DEFAULTS_VERSION`]
    pub fn migrate_if_needed(&mut self) -> Result<(), DefaultsError> {
        match self.repository.stored_version() {
            None => Ok(()),
            Some(version) if version < DEFAULTS_VERSION => {
                #[cfg(feature = "log")]
                log::info!(
                    "defaults: migrating schema {} -> {}",
                    version,
                    DEFAULTS_VERSION
                );

                let mut migrated = self.current.clone();
                migrated.version = DEFAULTS_VERSION;
                self.repository.save_field(DefaultsField::Version, &migrated)
            }
            Some(_) => Ok(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    fn persist(&mut self, field: DefaultsField) -> Result<(), DefaultsError> {
        self.repository
            .save_field(field, &self.current)
            .map_err(|e| {
                #[cfg(feature = "log")]
                log::warn!("defaults: failed to persist {:?}: {:?}", field, e);

                e
            })
    }
}

impl<R: DefaultsStorage> DefaultsReader for DefaultsUsecases<R> {
    fn defaults(&self) -> &DeviceDefaults {
        &self.current
    }

    fn export_json(&self, buffer: &mut [u8]) -> Result<usize, DefaultsError> {
        serde_json_core::to_slice(&DefaultsDocument::from(&self.current), buffer)
            .map_err(|_e| DefaultsError::Json)
    }
}

impl<R: DefaultsStorage> DefaultsWriter for DefaultsUsecases<R> {
    fn save(&mut self, defaults: DeviceDefaults) -> Result<(), DefaultsError> {
        let defaults = defaults.constrained();
        if !defaults.is_valid() {
            #[cfg(feature = "log")]
            log::warn!("defaults: refusing to save invalid defaults");

            return Err(DefaultsError::Invalid);
        }

        self.repository.save_defaults(&defaults).map_err(|e| {
            #[cfg(feature = "log")]
            log::warn!("defaults: save failed: {:?}", e);

            e
        })?;
        self.current = defaults;

        #[cfg(feature = "log")]
        log::info!("defaults: saved");
        Ok(())
    }

    fn reset_to_factory(&mut self) -> Result<(), DefaultsError> {
        self.repository.clear()?;
        self.current = DeviceDefaults::factory();

        #[cfg(feature = "log")]
        log::info!("defaults: reset to factory values");

        self.save(DeviceDefaults::factory())
    }

    fn import_json(&mut self, json: &[u8]) -> Result<(), DefaultsError> {
        let json = trim_json(json);
        let (patch, _) =
            serde_json_core::from_slice::<DefaultsPatch<'_>>(json).map_err(|_e| {
                #[cfg(feature = "log")]
                log::warn!("defaults: JSON parse error: {:?}", _e);

                DefaultsError::Json
            })?;

        let mut next = self.current.clone();
        patch.apply_to(&mut next);
        self.save(next)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn set_brightness(&mut self, brightness: i32) -> Result<(), DefaultsError> {
        let max = i32::from(self.current.max_brightness);
        self.current.brightness = brightness.clamp(i32::from(BRIGHTNESS_MIN), max) as u8;
        self.persist(DefaultsField::Brightness)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn set_max_brightness(&mut self, max_brightness: i32) -> Result<(), DefaultsError> {
        self.current.max_brightness =
            max_brightness.clamp(i32::from(BRIGHTNESS_MIN), i32::from(BRIGHTNESS_MAX)) as u8;
        if self.current.brightness > self.current.max_brightness {
            self.current.brightness = self.current.max_brightness;
            self.persist(DefaultsField::Brightness)?;
        }
        self.persist(DefaultsField::MaxBrightness)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn set_speed(&mut self, speed: i32) -> Result<(), DefaultsError> {
        self.current.speed = speed.clamp(i32::from(SPEED_MIN), i32::from(SPEED_MAX)) as u16;
        self.persist(DefaultsField::Speed)
    }

    fn set_palette(&mut self, palette: PaletteId) -> Result<(), DefaultsError> {
        self.current.palette = palette;
        self.persist(DefaultsField::Palette)
    }

    fn set_effect(&mut self, effect: EffectId) -> Result<(), DefaultsError> {
        self.current.effect = effect;
        self.persist(DefaultsField::Effect)
    }

    fn set_direction(&mut self, reverse: bool) -> Result<(), DefaultsError> {
        self.current.reverse_direction = reverse;
        self.persist(DefaultsField::Direction)
    }

    fn set_owner(&mut self, owner: &str) -> Result<(), DefaultsError> {
        self.current.owner = truncated(owner);
        self.persist(DefaultsField::Owner)
    }

    fn set_device_name(&mut self, name: &str) -> Result<(), DefaultsError> {
        self.current.device_name = truncated(name);
        self.persist(DefaultsField::DeviceName)
    }

    fn set_device_type(&mut self, device_type: &str) -> Result<(), DefaultsError> {
        self.current.device_type = truncated(device_type);
        self.persist(DefaultsField::DeviceType)
    }

    fn set_auto_on(&mut self, auto_on: bool) -> Result<(), DefaultsError> {
        self.current.auto_on = auto_on;
        self.persist(DefaultsField::AutoOn)
    }

    fn set_status_interval(&mut self, interval_ms: u32) -> Result<(), DefaultsError> {
        self.current.status_interval = interval_ms.clamp(STATUS_INTERVAL_MIN, STATUS_INTERVAL_MAX);
        self.persist(DefaultsField::StatusInterval)
    }

    fn set_effect_color(&mut self, color: Rgb) -> Result<(), DefaultsError> {
        self.current.effect_color = color;
        self.persist(DefaultsField::EffectColor)
    }

    fn set_gps_enabled(&mut self, enabled: bool) -> Result<(), DefaultsError> {
        self.current.gps_enabled = enabled;
        self.persist(DefaultsField::GpsEnabled)
    }

    fn set_gps_low_speed(&mut self, speed: f32) -> Result<(), DefaultsError> {
        if speed.is_nan() {
            return Err(DefaultsError::Invalid);
        }
        self.current.gps_low_speed = speed.clamp(0.0, GPS_LOW_SPEED_MAX);
        if self.current.gps_top_speed <= self.current.gps_low_speed {
            self.current.gps_top_speed = self.current.gps_low_speed + 1.0;
            self.persist(DefaultsField::GpsTopSpeed)?;
        }
        self.persist(DefaultsField::GpsLowSpeed)
    }

    fn set_gps_top_speed(&mut self, speed: f32) -> Result<(), DefaultsError> {
        if speed.is_nan() {
            return Err(DefaultsError::Invalid);
        }
        self.current.gps_top_speed = speed.clamp(0.0, GPS_TOP_SPEED_MAX);
        if self.current.gps_top_speed <= self.current.gps_low_speed {
            self.current.gps_top_speed = self.current.gps_low_speed + 1.0;
        }
        self.persist(DefaultsField::GpsTopSpeed)
    }

    fn set_gps_lightshow_speed_enabled(&mut self, enabled: bool) -> Result<(), DefaultsError> {
        self.current.gps_lightshow_speed_enabled = enabled;
        self.persist(DefaultsField::GpsLightshowSpeedEnabled)
    }

    fn set_sync_enabled(&mut self, enabled: bool) -> Result<(), DefaultsError> {
        self.current.sync_enabled = enabled;
        self.persist(DefaultsField::SyncEnabled)
    }

    fn set_led_strip_config(
        &mut self,
        index: usize,
        config: LedStripConfig,
    ) -> Result<(), DefaultsError> {
        if index >= MAX_LED_STRIPS {
            return Err(DefaultsError::IndexOutOfRange);
        }

        let mut next = self.current.clone();
        next.led_strips[index] = config;
        // configuring a strip makes it part of the topology
        #[allow(clippy::cast_possible_truncation)]
        let needed = (index + 1) as u8;
        next.active_led_strips = next.active_led_strips.max(needed);
        self.save(next)
    }

    fn set_active_led_strips(&mut self, count: u8) -> Result<(), DefaultsError> {
        if usize::from(count) > MAX_LED_STRIPS {
            return Err(DefaultsError::IndexOutOfRange);
        }
        self.current.active_led_strips = count;
        self.persist(DefaultsField::ActiveLedStrips)
    }
}

impl<R: DefaultsStorage> DefaultsHandler for DefaultsUsecases<R> {}

/// Strip the NUL padding and whitespace some clients append
fn trim_json(json: &[u8]) -> &[u8] {
    let end = json
        .iter()
        .rposition(|b| !matches!(b, 0 | b' ' | b'\n' | b'\r' | b'\t'))
        .map_or(0, |last| last + 1);
    &json[..end]
}
