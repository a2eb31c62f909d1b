//! Single-value slot stores
//!
//! A slot holds at most one value and is only ever replaced wholesale.

use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{CacheManager, PersistenceError};

/// A persisted single-value slot
pub trait SlotStore<T>: Send + Sync {
    /// Reads the slot. `Ok(None)` means it has never been written.
    fn load(&self) -> Result<Option<T>, PersistenceError>;

    /// Replaces the slot contents with `value`.
    fn save(&self, value: &T) -> Result<(), PersistenceError>;
}

/// A slot backed by one JSON file in a [`CacheManager`] directory
#[derive(Debug, Clone)]
pub struct FileSlot<T> {
    manager: CacheManager,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FileSlot<T> {
    pub fn new(manager: CacheManager, key: impl Into<String>) -> Self {
        Self {
            manager,
            key: key.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> SlotStore<T> for FileSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>, PersistenceError> {
        self.manager.read(&self.key)
    }

    fn save(&self, value: &T) -> Result<(), PersistenceError> {
        self.manager.write(&self.key, value)
    }
}

/// An in-process slot holding the serialized JSON form of its value
///
/// Going through JSON keeps it faithful to [`FileSlot`]: what comes back out
/// is what a file round-trip would produce. Writes can be made to fail, and
/// raw contents can be injected, to exercise the error paths.
#[derive(Debug)]
pub struct MemorySlot<T> {
    raw: Mutex<Option<String>>,
    fail_writes: AtomicBool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemorySlot<T> {
    pub fn new() -> Self {
        Self {
            raw: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
            _marker: PhantomData,
        }
    }

    /// Creates a slot whose stored text is `raw`, valid JSON or not
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let slot = Self::new();
        *slot.lock() = Some(raw.into());
        slot
    }

    /// Makes subsequent `save` calls fail with an I/O error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The raw stored text, if any
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock still holds a whole value; writes never leave it partial.
        self.raw.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for MemorySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotStore<T> for MemorySlot<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>, PersistenceError> {
        match self.lock().as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, value: &T) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "slot is read-only",
            )));
        }
        let json = serde_json::to_string(value)?;
        *self.lock() = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_slot_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let slot: FileSlot<Vec<u32>> =
            FileSlot::new(CacheManager::with_dir(temp_dir.path().to_path_buf()), "numbers");

        assert!(slot.load().unwrap().is_none());
        slot.save(&vec![1, 2, 3]).unwrap();
        assert_eq!(slot.load().unwrap(), Some(vec![1, 2, 3]));
        assert!(temp_dir.path().join("numbers.json").exists());
    }

    #[test]
    fn test_memory_slot_corrupt_contents() {
        let slot: MemorySlot<Vec<u32>> = MemorySlot::with_raw("[1, 2,");
        assert!(matches!(slot.load(), Err(PersistenceError::Corrupt(_))));
    }

    #[test]
    fn test_memory_slot_failing_writes_keep_previous_value() {
        let slot: MemorySlot<Vec<u32>> = MemorySlot::new();
        slot.save(&vec![7]).unwrap();

        slot.fail_writes(true);
        assert!(matches!(slot.save(&vec![8]), Err(PersistenceError::Io(_))));
        assert_eq!(slot.load().unwrap(), Some(vec![7]));
    }
}
