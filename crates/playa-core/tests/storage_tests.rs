//! Integration tests for flash-backed preferences.

use playa_core::{FlashPreferences, MemoryFlash, PreferencesStore, StorageError};

const REGION: usize = 4096;
type Store = FlashPreferences<MemoryFlash<8192>, REGION>;

fn open(flash: MemoryFlash<8192>) -> Store {
    FlashPreferences::open(flash, 0, "bmdefaults").unwrap()
}

// -----------------------------------------------------------------------------
// Basic access
// -----------------------------------------------------------------------------

#[test]
fn blank_flash_opens_empty() {
    let store = open(MemoryFlash::new());

    assert!(store.is_empty());
    assert!(!store.contains("version"));
    assert_eq!(store.get_u8("brightness", 50), 50);
}

#[test]
fn typed_values_round_trip() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("brightness", 42).unwrap();
    store.put_bool("autoOn", false).unwrap();
    store.put_u16("statusInterval", 5000).unwrap();
    store.put_f32("gpsLowSpeed", 7.5).unwrap();
    store.put_str("owner", "Ranger").unwrap();

    assert_eq!(store.get_u8("brightness", 0), 42);
    assert!(!store.get_bool("autoOn", true));
    assert_eq!(store.get_u16("statusInterval", 0), 5000);
    assert!((store.get_f32("gpsLowSpeed", 0.0) - 7.5).abs() < f32::EPSILON);
    assert_eq!(store.get_string::<32>("owner", "New").as_str(), "Ranger");
}

#[test]
fn wrong_sized_value_falls_back_to_default() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("speed", 9).unwrap();

    assert_eq!(store.get_u16("speed", 100), 100);
}

#[test]
fn strings_are_truncated_to_capacity() {
    let mut store = open(MemoryFlash::new());
    store.put_str("owner", "abcdefghij").unwrap();

    assert_eq!(store.get_string::<4>("owner", "").as_str(), "abcd");
}

#[test]
fn oversized_keys_and_values_are_rejected() {
    let mut store = open(MemoryFlash::new());

    assert_eq!(
        store.put_u8("aVeryLongPreferenceKey", 1),
        Err(StorageError::KeyTooLong)
    );
    assert_eq!(store.write("blob", &[0u8; 200]), Err(StorageError::ValueTooLong));
}

// -----------------------------------------------------------------------------
// Persistence
// -----------------------------------------------------------------------------

#[test]
fn values_survive_reopen() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("palette", 7).unwrap();
    store.put_str("deviceName", "Jacket").unwrap();
    store.remove("deviceName").unwrap();

    let store = open(store.into_inner());
    assert_eq!(store.get_u8("palette", 0), 7);
    assert!(!store.contains("deviceName"));
}

#[test]
fn clear_wipes_namespace() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("version", 1).unwrap();
    store.clear().unwrap();

    let store = open(store.into_inner());
    assert!(store.is_empty());
}

#[test]
fn other_namespace_is_not_visible() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("version", 1).unwrap();

    let other: Store = FlashPreferences::open(store.into_inner(), 0, "wifi").unwrap();
    assert!(!other.contains("version"));
}

#[test]
fn unchanged_value_does_not_touch_flash() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("speed", 100).unwrap();
    store.put_u8("speed", 100).unwrap();

    assert_eq!(store.into_inner().erase_count(), 1);
}

#[test]
fn failed_write_keeps_the_previous_value() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("brightness", 42).unwrap();

    store.flash_mut().set_failing(true);
    assert_eq!(store.put_u8("brightness", 7), Err(StorageError::DriverError));
    assert_eq!(store.put_u8("speed", 9), Err(StorageError::DriverError));
    assert_eq!(store.clear(), Err(StorageError::DriverError));

    assert_eq!(store.get_u8("brightness", 0), 42);
    assert!(!store.contains("speed"));
    assert_eq!(store.len(), 1);
}

#[test]
fn batch_commits_once() {
    let mut store = open(MemoryFlash::new());
    store.begin_batch();
    store.put_u8("brightness", 42).unwrap();
    store.put_u16("speed", 120).unwrap();
    store.put_bool("autoOn", true).unwrap();
    assert_eq!(store.flash().erase_count(), 0);

    store.commit_batch().unwrap();
    assert_eq!(store.flash().erase_count(), 1);

    let reopened = open(store.into_inner());
    assert_eq!(reopened.get_u16("speed", 0), 120);
    assert!(reopened.get_bool("autoOn", false));
}

#[test]
fn failed_batch_is_rolled_back() {
    let mut store = open(MemoryFlash::new());
    store.put_u8("brightness", 42).unwrap();

    store.begin_batch();
    store.put_u8("brightness", 7).unwrap();
    store.put_u8("speed", 9).unwrap();
    store.flash_mut().set_failing(true);
    assert_eq!(store.commit_batch(), Err(StorageError::DriverError));

    assert_eq!(store.get_u8("brightness", 0), 42);
    assert!(!store.contains("speed"));

    store.flash_mut().set_failing(false);
    let reopened = open(store.into_inner());
    assert_eq!(reopened.get_u8("brightness", 0), 42);
    assert!(!reopened.contains("speed"));
}

#[test]
fn flash_failure_is_reported() {
    let mut flash = MemoryFlash::<8192>::new();
    flash.set_failing(true);

    assert!(matches!(
        FlashPreferences::<_, REGION>::open(flash, 0, "bmdefaults"),
        Err(StorageError::DriverError)
    ));
}
