use playa_light_composer::{EffectId, PaletteId, Rgb};

use crate::domain::{
    dto::{DeviceDefaults, LedStripConfig},
    ports::DefaultsError,
};

/// Reader interface for the live defaults snapshot
pub trait DefaultsReader {
    fn defaults(&self) -> &DeviceDefaults;

    /// Serialize the snapshot as JSON into `buffer`
    fn export_json(&self, buffer: &mut [u8]) -> Result<usize, DefaultsError>;
}

/// Writer interface for the defaults.
///
/// Every setter clamps its input, persists the field and updates the live
/// snapshot. On a storage error the snapshot keeps the new value for the
/// rest of the session.
pub trait DefaultsWriter {
    /// Clamp, validate and persist a whole snapshot
    fn save(&mut self, defaults: DeviceDefaults) -> Result<(), DefaultsError>;

    /// Wipe the store and persist the factory snapshot
    fn reset_to_factory(&mut self) -> Result<(), DefaultsError>;

    /// Merge the keys present in `json`, then validate and save
    fn import_json(&mut self, json: &[u8]) -> Result<(), DefaultsError>;

    fn set_brightness(&mut self, brightness: i32) -> Result<(), DefaultsError>;
    /// Lowers the stored brightness when it exceeds the new maximum
    fn set_max_brightness(&mut self, max_brightness: i32) -> Result<(), DefaultsError>;
    fn set_speed(&mut self, speed: i32) -> Result<(), DefaultsError>;
    fn set_palette(&mut self, palette: PaletteId) -> Result<(), DefaultsError>;
    fn set_effect(&mut self, effect: EffectId) -> Result<(), DefaultsError>;
    fn set_direction(&mut self, reverse: bool) -> Result<(), DefaultsError>;
    fn set_owner(&mut self, owner: &str) -> Result<(), DefaultsError>;
    fn set_device_name(&mut self, name: &str) -> Result<(), DefaultsError>;
    fn set_device_type(&mut self, device_type: &str) -> Result<(), DefaultsError>;
    fn set_auto_on(&mut self, auto_on: bool) -> Result<(), DefaultsError>;
    fn set_status_interval(&mut self, interval_ms: u32) -> Result<(), DefaultsError>;
    fn set_effect_color(&mut self, color: Rgb) -> Result<(), DefaultsError>;
    fn set_gps_enabled(&mut self, enabled: bool) -> Result<(), DefaultsError>;
    fn set_gps_low_speed(&mut self, speed: f32) -> Result<(), DefaultsError>;
    fn set_gps_top_speed(&mut self, speed: f32) -> Result<(), DefaultsError>;
    fn set_gps_lightshow_speed_enabled(&mut self, enabled: bool) -> Result<(), DefaultsError>;
    fn set_sync_enabled(&mut self, enabled: bool) -> Result<(), DefaultsError>;
    fn set_led_strip_config(
        &mut self,
        index: usize,
        config: LedStripConfig,
    ) -> Result<(), DefaultsError>;
    fn set_active_led_strips(&mut self, count: u8) -> Result<(), DefaultsError>;
}

/// Trait for the defaults handler used by the command dispatcher
pub trait DefaultsHandler: DefaultsReader + DefaultsWriter {}
