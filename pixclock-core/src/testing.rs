//! Simulated collaborators shared by the unit tests

extern crate std;

use std::collections::BTreeMap;
use std::vec::Vec;

use pixclock_hal::storage::{KeyValueStore, StorageError, StorageKey};

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<u8, Vec<u8>>,
    pub fail_writes: bool,
}

impl KeyValueStore for MemoryStore {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.records.get(&key.as_u8()).ok_or(StorageError::NotFound)?;
        if buffer.len() < data.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Flash);
        }
        self.records.insert(key.as_u8(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Flash);
        }
        self.records.remove(&key.as_u8());
        Ok(())
    }
}
