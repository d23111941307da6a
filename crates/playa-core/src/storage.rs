//! Namespaced key-value preferences persisted to a NOR flash region.
//!
//! The whole table lives in RAM and is rewritten to flash after every
//! mutation, or once per batch. A failed commit leaves the RAM table as it
//! was before the mutation. Layout of the flash image (little-endian):
//!
//! ```text
//! [magic u16][namespace len u8][namespace][entry count u16]
//! ([key len u8][key][value len u8][value])*
//! ```

use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};
use heapless::{String, Vec};

pub const BLOCK_SIZE: u32 = 4096;
const MAGIC_HEADER: u16 = 0xBEEF;
pub const MAGIC_HEADER_SIZE: usize = MAGIC_HEADER.to_le_bytes().len();

pub const MAX_KEY_LEN: usize = 15;
pub const MAX_VALUE_LEN: usize = 128;
pub const MAX_ENTRIES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    DriverError,
    InvalidMagicHeader,
    InvalidData,
    /// No room left in the entry table or the flash image
    Full,
    KeyTooLong,
    ValueTooLong,
}

/// Key-value store with typed accessors. Getters fall back to the given
/// default when the key is missing or holds a value of the wrong size.
pub trait PreferencesStore {
    fn contains(&self, key: &str) -> bool;

    /// Copy the value into `buffer`, returning its length if the key exists
    fn read(&self, key: &str, buffer: &mut [u8]) -> Result<Option<usize>, StorageError>;

    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Drop every key in the namespace
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Defer persisting until [`commit_batch`](Self::commit_batch)
    fn begin_batch(&mut self) {}

    /// Persist everything written since [`begin_batch`](Self::begin_batch)
    fn commit_batch(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn get_u8(&self, key: &str, default: u8) -> u8 {
        self.get_array::<1>(key).map_or(default, |[value]| value)
    }

    fn put_u8(&mut self, key: &str, value: u8) -> Result<(), StorageError> {
        self.write(key, &[value])
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_array::<1>(key).map_or(default, |[value]| value != 0)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        self.write(key, &[u8::from(value)])
    }

    fn get_u16(&self, key: &str, default: u16) -> u16 {
        self.get_array(key).map_or(default, u16::from_le_bytes)
    }

    fn put_u16(&mut self, key: &str, value: u16) -> Result<(), StorageError> {
        self.write(key, &value.to_le_bytes())
    }

    fn get_u32(&self, key: &str, default: u32) -> u32 {
        self.get_array(key).map_or(default, u32::from_le_bytes)
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StorageError> {
        self.write(key, &value.to_le_bytes())
    }

    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.get_array(key).map_or(default, f32::from_le_bytes)
    }

    fn put_f32(&mut self, key: &str, value: f32) -> Result<(), StorageError> {
        self.write(key, &value.to_le_bytes())
    }

    /// UTF-8 value truncated to `N` bytes on a character boundary
    fn get_string<const N: usize>(&self, key: &str, default: &str) -> String<N> {
        let mut buffer = [0u8; MAX_VALUE_LEN];
        let text = match self.read(key, &mut buffer) {
            Ok(Some(len)) => core::str::from_utf8(&buffer[..len]).unwrap_or(default),
            _ => default,
        };
        truncated(text)
    }

    fn put_str(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(key, value.as_bytes())
    }

    /// Exact-size value as a fixed array
    fn get_array<const N: usize>(&self, key: &str) -> Option<[u8; N]> {
        let mut buffer = [0u8; MAX_VALUE_LEN];
        match self.read(key, &mut buffer) {
            Ok(Some(len)) if len == N => buffer[..N].try_into().ok(),
            _ => None,
        }
    }
}

/// Copy at most `N` bytes of `text` without splitting a character
pub fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

#[derive(Debug, Clone)]
struct Entry {
    key: String<MAX_KEY_LEN>,
    value: Vec<u8, MAX_VALUE_LEN>,
}

/// Preferences persisted to one flash region of `SIZE` bytes
pub struct FlashPreferences<F: NorFlash, const SIZE: usize> {
    flash: F,
    offset: u32,
    namespace: &'static str,
    entries: Vec<Entry, MAX_ENTRIES>,
    /// Table as of [`PreferencesStore::begin_batch`], restored if the batch
    /// fails to commit
    batch: Option<Vec<Entry, MAX_ENTRIES>>,
    dirty: bool,
}

impl<F: NorFlash, const SIZE: usize> FlashPreferences<F, SIZE> {
    /// Open the namespace stored at `offset`. Blank flash or an image that
    /// belongs to another namespace opens as an empty table.
    pub fn open(flash: F, offset: u32, namespace: &'static str) -> Result<Self, StorageError> {
        let mut store = Self {
            flash,
            offset,
            namespace,
            entries: Vec::new(),
            batch: None,
            dirty: false,
        };

        match store.load() {
            Ok(()) => {}
            Err(StorageError::InvalidMagicHeader) => {
                #[cfg(feature = "log")]
                log::info!("storage: no data for namespace {}, starting empty", namespace);
            }
            Err(StorageError::DriverError) => return Err(StorageError::DriverError),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("storage: corrupt image ({:?}), starting empty", _e);
                store.entries.clear();
            }
        }
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        self.namespace
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    /// Commit now, or mark the table dirty while batching
    fn persist(&mut self) -> Result<(), StorageError> {
        if self.batch.is_some() {
            self.dirty = true;
            return Ok(());
        }
        self.commit()
    }


    fn load(&mut self) -> Result<(), StorageError> {
        let mut buffer = [0u8; SIZE];
        self.flash
            .read(self.offset, &mut buffer)
            .map_err(|_| StorageError::DriverError)?;

        let mut reader = Reader::new(&buffer);
        let magic = u16::from_le_bytes(reader.array()?);
        if magic != MAGIC_HEADER {
            return Err(StorageError::InvalidMagicHeader);
        }
        let namespace_len = usize::from(reader.byte()?);
        if reader.take(namespace_len)? != self.namespace.as_bytes() {
            return Err(StorageError::InvalidMagicHeader);
        }

        let count = u16::from_le_bytes(reader.array()?);
        for _ in 0..count {
            let key_len = usize::from(reader.byte()?);
            let key = core::str::from_utf8(reader.take(key_len)?)
                .map_err(|_| StorageError::InvalidData)?;
            let value_len = usize::from(reader.byte()?);
            let value = reader.take(value_len)?;

            let entry = Entry {
                key: String::try_from(key).map_err(|()| StorageError::InvalidData)?,
                value: Vec::from_slice(value).map_err(|()| StorageError::InvalidData)?,
            };
            self.entries.push(entry).map_err(|_| StorageError::InvalidData)?;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        let mut buffer = [0xFFu8; SIZE];
        let mut writer = Writer::new(&mut buffer);
        writer.put(&MAGIC_HEADER.to_le_bytes())?;
        writer.put(&[u8_len(self.namespace.len())?])?;
        writer.put(self.namespace.as_bytes())?;
        writer.put(&u16_len(self.entries.len())?.to_le_bytes())?;
        for entry in &self.entries {
            writer.put(&[u8_len(entry.key.len())?])?;
            writer.put(entry.key.as_bytes())?;
            writer.put(&[u8_len(entry.value.len())?])?;
            writer.put(&entry.value)?;
        }

        let erase_size = u32::try_from(F::ERASE_SIZE.max(1)).map_err(|_| StorageError::DriverError)?;
        let size = u32::try_from(SIZE).map_err(|_| StorageError::DriverError)?;
        let erase_end = self.offset + size.div_ceil(erase_size) * erase_size;
        self.flash
            .erase(self.offset, erase_end)
            .map_err(|e| driver_error(&e))?;
        self.flash
            .write(self.offset, &buffer)
            .map_err(|e| driver_error(&e))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }
}

impl<F: NorFlash, const SIZE: usize> PreferencesStore for FlashPreferences<F, SIZE> {
    fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    fn read(&self, key: &str, buffer: &mut [u8]) -> Result<Option<usize>, StorageError> {
        let Some(index) = self.position(key) else {
            return Ok(None);
        };
        let value = &self.entries[index].value;
        let target = buffer
            .get_mut(..value.len())
            .ok_or(StorageError::ValueTooLong)?;
        target.copy_from_slice(value);
        Ok(Some(value.len()))
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let value = Vec::from_slice(value).map_err(|()| StorageError::ValueTooLong)?;
        let previous = if let Some(index) = self.position(key) {
            if self.entries[index].value == value {
                return Ok(());
            }
            Some((index, core::mem::replace(&mut self.entries[index].value, value)))
        } else {
            let key = String::try_from(key).map_err(|()| StorageError::KeyTooLong)?;
            self.entries
                .push(Entry { key, value })
                .map_err(|_| StorageError::Full)?;
            None
        };

        if let Err(e) = self.persist() {
            match previous {
                Some((index, value)) => self.entries[index].value = value,
                None => {
                    self.entries.pop();
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let Some(index) = self.position(key) else {
            return Ok(());
        };
        let entry = self.entries.remove(index);
        if let Err(e) = self.persist() {
            let _ = self.entries.insert(index, entry);
            return Err(e);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let previous = core::mem::take(&mut self.entries);
        if let Err(e) = self.persist() {
            self.entries = previous;
            return Err(e);
        }
        Ok(())
    }

    fn begin_batch(&mut self) {
        if self.batch.is_none() {
            self.batch = Some(self.entries.clone());
        }
    }

    fn commit_batch(&mut self) -> Result<(), StorageError> {
        let Some(previous) = self.batch.take() else {
            return Ok(());
        };
        if !core::mem::take(&mut self.dirty) {
            return Ok(());
        }
        if let Err(e) = self.commit() {
            #[cfg(feature = "log")]
            log::warn!("storage: batch commit failed, rolling back");

            self.entries = previous;
            return Err(e);
        }
        Ok(())
    }
}

fn driver_error<E: NorFlashError>(_error: &E) -> StorageError {
    #[cfg(feature = "log")]
    log::error!("storage: flash error {:?}", _error.kind());
    StorageError::DriverError
}

fn u8_len(len: usize) -> Result<u8, StorageError> {
    u8::try_from(len).map_err(|_| StorageError::InvalidData)
}

fn u16_len(len: usize) -> Result<u16, StorageError> {
    u16::try_from(len).map_err(|_| StorageError::InvalidData)
}

struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], StorageError> {
        let end = self.position.checked_add(len).ok_or(StorageError::InvalidData)?;
        let slice = self.data.get(self.position..end).ok_or(StorageError::InvalidData)?;
        self.position = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, StorageError> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], StorageError> {
        self.take(N)?.try_into().map_err(|_| StorageError::InvalidData)
    }
}

struct Writer<'a> {
    data: &'a mut [u8],
    position: usize,
}

impl<'a> Writer<'a> {
    fn new(data: &'a mut [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        let end = self.position + bytes.len();
        self.data
            .get_mut(self.position..end)
            .ok_or(StorageError::Full)?
            .copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }
}

/// RAM-backed NOR flash for hosts and tests
pub struct MemoryFlash<const SIZE: usize> {
    data: [u8; SIZE],
    erase_count: usize,
    failing: bool,
}

impl<const SIZE: usize> Default for MemoryFlash<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> MemoryFlash<SIZE> {
    /// Blank (erased) flash
    pub const fn new() -> Self {
        Self {
            data: [0xFF; SIZE],
            erase_count: 0,
            failing: false,
        }
    }

    /// Make every following operation fail with a driver error
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn erase_count(&self) -> usize {
        self.erase_count
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, NorFlashErrorKind> {
        if self.failing {
            return Err(NorFlashErrorKind::Other);
        }
        let start = usize::try_from(offset).map_err(|_| NorFlashErrorKind::OutOfBounds)?;
        let end = start.checked_add(len).ok_or(NorFlashErrorKind::OutOfBounds)?;
        if end > SIZE {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<const SIZE: usize> ErrorType for MemoryFlash<SIZE> {
    type Error = NorFlashErrorKind;
}

impl<const SIZE: usize> ReadNorFlash for MemoryFlash<SIZE> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        SIZE
    }
}

impl<const SIZE: usize> NorFlash for MemoryFlash<SIZE> {
    const WRITE_SIZE: usize = 1;
    const ERASE_SIZE: usize = BLOCK_SIZE as usize;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from % BLOCK_SIZE != 0 || to % BLOCK_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        let len = usize::try_from(to.saturating_sub(from)).map_err(|_| NorFlashErrorKind::OutOfBounds)?;
        let range = self.range(from, len)?;
        self.data[range].fill(0xFF);
        self.erase_count += 1;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        // NOR writes can only clear bits
        for (cell, byte) in self.data[range].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        Ok(())
    }
}
