#![no_std]

//! Time and persistence primitives shared by every playa device.
//!
//! - `clock` - monotonic millisecond time with one-shot offset sync
//! - `storage` - namespaced key-value preferences persisted to NOR flash

pub mod clock;
pub mod storage;

pub use clock::{EmbassyMonotonic, ManualMonotonic, MonotonicSource, SyncedClock};
pub use storage::{FlashPreferences, MemoryFlash, PreferencesStore, StorageError};
