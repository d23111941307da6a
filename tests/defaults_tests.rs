//! Integration tests for the persisted device defaults.

mod common;

use common::{TestFlash, reopen, repository};
use playa_core::{FlashPreferences, PreferencesStore, storage::truncated};
use playa_light::{
    app::usecases::DefaultsUsecases,
    config::DEFAULTS_VERSION,
    domain::{
        dto::{ColorOrder, DefaultsField, DeviceDefaults, LedStripConfig},
        ports::{DefaultsError, DefaultsReader, DefaultsStorage, DefaultsWriter},
    },
    infrastructure::repositories::PersistentDefaults,
};
use playa_light_composer::{EffectId, PaletteId, Rgb};

fn seeded(seed: impl FnOnce(&mut FlashPreferences<TestFlash, 4096>)) -> common::TestRepository {
    let mut store = FlashPreferences::open(TestFlash::new(), 0, "bmdefaults").unwrap();
    seed(&mut store);
    PersistentDefaults::new(store)
}

/// Storage whose every write fails
struct BrokenStorage;

impl DefaultsStorage for BrokenStorage {
    fn stored_version(&self) -> Option<u8> {
        None
    }

    fn load_defaults(&self, _base: &DeviceDefaults) -> Result<Option<DeviceDefaults>, DefaultsError> {
        Err(DefaultsError::Invalid)
    }

    fn save_field(
        &mut self,
        _field: DefaultsField,
        _defaults: &DeviceDefaults,
    ) -> Result<(), DefaultsError> {
        Err(DefaultsError::Invalid)
    }

    fn clear(&mut self) -> Result<(), DefaultsError> {
        Err(DefaultsError::Invalid)
    }
}

fn customized(base: &DeviceDefaults) -> DeviceDefaults {
    let mut defaults = base.clone();
    defaults.brightness = 33;
    defaults.max_brightness = 80;
    defaults.speed = 42;
    defaults.palette = PaletteId::Lava;
    defaults.effect = EffectId::MatrixRain;
    defaults.reverse_direction = false;
    defaults.owner = truncated("Ranger");
    defaults.device_name = truncated("Umbrella 1");
    defaults.device_type = truncated("Umbrella");
    defaults.auto_on = false;
    defaults.status_interval = 2000;
    defaults.effect_color = Rgb {
        r: 12,
        g: 34,
        b: 56,
    };
    defaults.gps_enabled = true;
    defaults.gps_low_speed = 10.5;
    defaults.gps_top_speed = 40.0;
    defaults.gps_lightshow_speed_enabled = true;
    defaults.sync_enabled = false;
    defaults.led_strips[1] = LedStripConfig {
        pin: 7,
        num_leds: 144,
        color_order: ColorOrder::Bgr,
        enabled: true,
    };
    defaults.active_led_strips = 2;
    defaults
}

// -----------------------------------------------------------------------------
// Snapshot model
// -----------------------------------------------------------------------------

#[test]
fn factory_snapshot_is_valid() {
    let factory = DeviceDefaults::factory();

    assert!(factory.is_valid());
    assert_eq!(factory.version, DEFAULTS_VERSION);
    assert_eq!(factory.active_strips().len(), 1);
    assert!(factory.led_strips[0].enabled);
    assert!(!factory.led_strips[1].enabled);
    assert_eq!(factory.led_strips[3].pin, 5);
}

#[test]
fn constrain_repairs_out_of_range_values() {
    let mut defaults = DeviceDefaults::factory();
    defaults.max_brightness = 0;
    defaults.brightness = 90;
    defaults.speed = 1000;
    defaults.status_interval = 10;
    defaults.gps_low_speed = f32::NAN;
    defaults.gps_top_speed = 2.0;
    defaults.active_led_strips = 20;

    let defaults = defaults.constrained();

    assert_eq!(defaults.max_brightness, 1);
    assert_eq!(defaults.brightness, 1);
    assert_eq!(defaults.speed, 200);
    assert_eq!(defaults.status_interval, 1000);
    assert!((defaults.gps_low_speed - 5.0).abs() < f32::EPSILON);
    assert!((defaults.gps_top_speed - 6.0).abs() < f32::EPSILON);
    assert_eq!(defaults.active_led_strips, 8);
    assert!(defaults.is_valid());
}

// -----------------------------------------------------------------------------
// Startup
// -----------------------------------------------------------------------------

#[test]
fn fresh_device_persists_factory_defaults() {
    let mut store = DefaultsUsecases::new(repository());
    assert_eq!(store.begin(), &DeviceDefaults::factory());

    let repository = store.into_repository();
    assert_eq!(repository.stored_version(), Some(DEFAULTS_VERSION));
    assert_eq!(repository.store().get_u8("brightness", 0), 50);
}

#[test]
fn saved_defaults_survive_a_restart() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();
    let wanted = customized(store.defaults());
    store.save(wanted.clone()).unwrap();

    let mut restarted = DefaultsUsecases::new(reopen(store.into_repository()));
    assert_eq!(restarted.begin(), &wanted);
}

#[test]
fn out_of_range_palette_and_effect_fall_back_per_field() {
    let repository = seeded(|store| {
        store.put_u8("version", 1).unwrap();
        store.put_u8("palette", 200).unwrap();
        store.put_u8("effect", 99).unwrap();
        store.put_u8("brightness", 20).unwrap();
        store.put_str("owner", "Ranger").unwrap();
    });
    let mut store = DefaultsUsecases::new(repository);

    assert_eq!(store.load(), Ok(true));
    let defaults = store.defaults();
    assert_eq!(defaults.palette, PaletteId::Cool);
    assert_eq!(defaults.effect, EffectId::PaletteStream);
    assert_eq!(defaults.brightness, 20);
    assert_eq!(defaults.owner.as_str(), "Ranger");
}

#[test]
fn full_save_is_one_flash_commit() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();
    let erases = store.repository().store().flash().erase_count();

    store.save(customized(store.defaults())).unwrap();

    assert_eq!(store.repository().store().flash().erase_count(), erases + 1);
}

#[test]
fn stored_values_are_constrained_on_load() {
    let repository = seeded(|store| {
        store.put_u8("version", 1).unwrap();
        store.put_u8("maxBrightness", 60).unwrap();
        store.put_u8("brightness", 90).unwrap();
        store.put_u16("speed", 1).unwrap();
    });
    let mut store = DefaultsUsecases::new(repository);

    assert_eq!(store.load(), Ok(true));
    assert_eq!(store.defaults().max_brightness, 60);
    assert_eq!(store.defaults().brightness, 60);
    assert_eq!(store.defaults().speed, 5);
}

#[test]
fn older_schema_is_migrated() {
    let repository = seeded(|store| {
        store.put_u8("version", 0).unwrap();
        store.put_u8("brightness", 30).unwrap();
    });
    let mut store = DefaultsUsecases::new(repository);

    let loaded = store.begin();
    assert_eq!(loaded.brightness, 30);
    assert_eq!(loaded.version, DEFAULTS_VERSION);
    assert_eq!(store.repository().stored_version(), Some(DEFAULTS_VERSION));
}

#[test]
fn broken_storage_keeps_factory_defaults_in_memory() {
    let mut store = DefaultsUsecases::new(BrokenStorage);
    assert_eq!(store.begin(), &DeviceDefaults::factory());

    let mut changed = DeviceDefaults::factory();
    changed.brightness = 10;
    assert!(store.save(changed).is_err());
    assert_eq!(store.defaults().brightness, 50);
}

// -----------------------------------------------------------------------------
// Setters
// -----------------------------------------------------------------------------

#[test]
fn setters_clamp_and_persist() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    store.set_brightness(500).unwrap();
    store.set_speed(-3).unwrap();
    store.set_status_interval(100_000).unwrap();
    store.set_owner("A very long owner name that will not fit").unwrap();

    let defaults = store.defaults().clone();
    assert_eq!(defaults.brightness, 100);
    assert_eq!(defaults.speed, 5);
    assert_eq!(defaults.status_interval, 60_000);
    assert_eq!(defaults.owner.len(), 32);

    let mut restarted = DefaultsUsecases::new(reopen(store.into_repository()));
    assert_eq!(restarted.begin(), &defaults);
}

#[test]
fn gps_speeds_stay_ordered() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    store.set_gps_low_speed(150.0).unwrap();
    assert!((store.defaults().gps_low_speed - 100.0).abs() < f32::EPSILON);
    assert!((store.defaults().gps_top_speed - 101.0).abs() < f32::EPSILON);

    store.set_gps_top_speed(3.0).unwrap();
    assert!((store.defaults().gps_top_speed - 101.0).abs() < f32::EPSILON);

    assert_eq!(store.set_gps_low_speed(f32::NAN), Err(DefaultsError::Invalid));
}

#[test]
fn led_strip_configuration_is_bounded() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    let strip = LedStripConfig::new().with_pin(13).with_enabled(true);
    store.set_led_strip_config(4, strip).unwrap();
    assert_eq!(store.defaults().led_strips[4], strip);
    assert_eq!(store.defaults().active_led_strips, 5);

    assert_eq!(
        store.set_led_strip_config(8, strip),
        Err(DefaultsError::IndexOutOfRange)
    );
    assert_eq!(
        store.set_active_led_strips(9),
        Err(DefaultsError::IndexOutOfRange)
    );
    store.set_active_led_strips(2).unwrap();
    assert_eq!(store.defaults().active_strips().len(), 2);
}

#[test]
fn reset_restores_factory_values() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();
    store.save(customized(store.defaults())).unwrap();

    store.reset_to_factory().unwrap();
    assert_eq!(store.defaults(), &DeviceDefaults::factory());

    let mut restarted = DefaultsUsecases::new(reopen(store.into_repository()));
    assert_eq!(restarted.begin(), &DeviceDefaults::factory());
}

// -----------------------------------------------------------------------------
// JSON documents
// -----------------------------------------------------------------------------

#[test]
fn export_contains_every_section() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    let mut buffer = [0u8; 1024];
    let len = store.export_json(&mut buffer).unwrap();
    let json = core::str::from_utf8(&buffer[..len]).unwrap();

    assert!(json.contains("\"palette\":\"cool\""));
    assert!(json.contains("\"effect\":\"pstream\""));
    assert!(json.contains("\"effectColor\":{\"r\":0,\"g\":255,\"b\":0}"));
    assert!(json.contains(
        "\"ledStrips\":[{\"pin\":2,\"numLeds\":30,\"colorOrder\":0,\"enabled\":true},{\"pin\":3,"
    ));
    assert!(json.contains("{\"pin\":9,\"numLeds\":30,\"colorOrder\":0,\"enabled\":false}]"));
}

#[test]
fn exported_document_imports_to_the_same_snapshot() {
    let mut source = DefaultsUsecases::new(repository());
    source.begin();
    let wanted = customized(source.defaults());
    source.save(wanted.clone()).unwrap();

    let mut buffer = [0u8; 1024];
    let len = source.export_json(&mut buffer).unwrap();

    let mut target = DefaultsUsecases::new(repository());
    target.begin();
    target.import_json(&buffer[..len]).unwrap();
    assert_eq!(target.defaults(), &wanted);

    let mut restarted = DefaultsUsecases::new(reopen(target.into_repository()));
    assert_eq!(restarted.begin(), &wanted);
}

#[test]
fn import_clamps_out_of_range_values() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    let json = br#"{"brightness":500,"maxBrightness":80,"speed":1,"statusInterval":100,"gpsLowSpeed":30.0,"gpsTopSpeed":10.0}"#;
    store.import_json(json).unwrap();

    let defaults = store.defaults();
    assert_eq!(defaults.max_brightness, 80);
    assert_eq!(defaults.brightness, 80);
    assert_eq!(defaults.speed, 5);
    assert_eq!(defaults.status_interval, 1000);
    assert!(defaults.gps_top_speed > defaults.gps_low_speed);
    assert!(defaults.is_valid());
}

#[test]
fn export_reports_small_buffers() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    let mut buffer = [0u8; 16];
    assert_eq!(store.export_json(&mut buffer), Err(DefaultsError::Json));
}

#[test]
fn import_prefers_ids_and_replaces_strips() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    let json = br#"{"paletteId":12,"palette":"cool","effect":"lava_lamp","ledStrips":[{"pin":4,"numLeds":60,"colorOrder":2,"enabled":true},{"pin":5,"numLeds":61,"colorOrder":0,"enabled":false}]}"#;
    store.import_json(json).unwrap();

    let defaults = store.defaults();
    assert_eq!(defaults.palette, PaletteId::Lava);
    assert_eq!(defaults.effect, EffectId::LavaLamp);
    assert_eq!(defaults.active_led_strips, 2);
    assert_eq!(defaults.led_strips[0].num_leds, 60);
    assert_eq!(defaults.led_strips[0].color_order, ColorOrder::Brg);
    assert!(!defaults.led_strips[1].enabled);
}

#[test]
fn import_rejects_invalid_documents() {
    let mut store = DefaultsUsecases::new(repository());
    store.begin();

    assert_eq!(store.import_json(b"{\"brightness\":"), Err(DefaultsError::Json));
    assert_eq!(
        store.import_json(br#"{"version":0}"#),
        Err(DefaultsError::Invalid)
    );
    assert_eq!(store.defaults(), &DeviceDefaults::factory());
}
