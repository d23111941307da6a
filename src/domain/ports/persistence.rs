use playa_core::StorageError;

use crate::domain::dto::{DefaultsField, DeviceDefaults};

/// Error type for the defaults operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsError {
    Storage(StorageError),
    /// Snapshot failed validation
    Invalid,
    /// LED strip index or count out of range
    IndexOutOfRange,
    /// Malformed JSON or output buffer too small
    Json,
}

impl From<StorageError> for DefaultsError {
    fn from(error: StorageError) -> Self {
        DefaultsError::Storage(error)
    }
}

/// Backing store of the persisted defaults
pub trait DefaultsStorage {
    /// Schema version of the stored snapshot, `None` on a fresh device
    fn stored_version(&self) -> Option<u8>;

    /// Stored snapshot, missing keys taken from `base`.
    /// `Ok(None)` when nothing has been stored yet.
    fn load_defaults(&self, base: &DeviceDefaults) -> Result<Option<DeviceDefaults>, DefaultsError>;

    /// Persist one field of `defaults`
    fn save_field(
        &mut self,
        field: DefaultsField,
        defaults: &DeviceDefaults,
    ) -> Result<(), DefaultsError>;

    /// Persist every field
    fn save_defaults(&mut self, defaults: &DeviceDefaults) -> Result<(), DefaultsError> {
        for field in DefaultsField::ALL {
            self.save_field(field, defaults)?;
        }
        Ok(())
    }

    /// Drop every stored key
    fn clear(&mut self) -> Result<(), DefaultsError>;
}
