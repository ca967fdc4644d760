//! Persistent storage abstractions
//!
//! Provides a small key-value store trait for the records the clock keeps
//! across power cycles. Keys are grouped into namespaces so that clearing
//! one group (e.g. rejected network credentials) never disturbs another
//! (e.g. the last-sync timestamp).

/// Record groups that can be erased independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Namespace {
    /// Station credentials entered through the provisioning portal
    WifiConfig,
    /// Time synchronisation bookkeeping
    TimeSync,
}

/// Storage keys for persisted records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Network name and passphrase (postcard encoded)
    WifiCredentials = 0,
    /// Unix timestamp of the last successful sync (postcard encoded)
    LastSync = 1,
}

impl StorageKey {
    /// Every key, in storage order
    pub const ALL: [StorageKey; 2] = [StorageKey::WifiCredentials, StorageKey::LastSync];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::WifiCredentials),
            1 => Some(StorageKey::LastSync),
            _ => None,
        }
    }

    /// Namespace this key belongs to
    pub fn namespace(self) -> Namespace {
        match self {
            StorageKey::WifiCredentials => Namespace::WifiConfig,
            StorageKey::LastSync => Namespace::TimeSync,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash operation failed
    Flash,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Largest record any key stores
pub const MAX_RECORD_SIZE: usize = 128;

/// Key-value store trait
///
/// Calls are blocking: the clock loop is the only caller and it runs
/// between bus transactions. Implementations should handle wear leveling
/// and data integrity themselves.
pub trait KeyValueStore {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or [`StorageError::NotFound`] if the key
    /// was never written or has been removed.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        matches!(
            self.read(key, &mut buf),
            Ok(_) | Err(StorageError::BufferTooSmall)
        )
    }

    /// Remove every key of one namespace, leaving the others intact
    fn erase_namespace(&mut self, namespace: Namespace) -> Result<(), StorageError> {
        for key in StorageKey::ALL {
            if key.namespace() == namespace {
                self.remove(key)?;
            }
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        T::read(self, key, buffer)
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        T::write(self, key, data)
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        T::remove(self, key)
    }

    fn exists(&mut self, key: StorageKey) -> bool {
        T::exists(self, key)
    }

    fn erase_namespace(&mut self, namespace: Namespace) -> Result<(), StorageError> {
        T::erase_namespace(self, namespace)
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two fixed slots, enough to exercise the provided methods
    #[derive(Default)]
    struct Slots {
        data: [Option<([u8; 8], usize)>; 2],
    }

    impl KeyValueStore for Slots {
        fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
            let (bytes, len) = self.data[key.as_u8() as usize].ok_or(StorageError::NotFound)?;
            if buffer.len() < len {
                return Err(StorageError::BufferTooSmall);
            }
            buffer[..len].copy_from_slice(&bytes[..len]);
            Ok(len)
        }

        fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
            let mut bytes = [0u8; 8];
            bytes
                .get_mut(..data.len())
                .ok_or(StorageError::Full)?
                .copy_from_slice(data);
            self.data[key.as_u8() as usize] = Some((bytes, data.len()));
            Ok(())
        }

        fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
            self.data[key.as_u8() as usize] = None;
            Ok(())
        }
    }

    #[test]
    fn test_key_round_trip() {
        for key in StorageKey::ALL {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(StorageKey::from_u8(7), None);
    }

    #[test]
    fn test_key_namespaces() {
        assert_eq!(StorageKey::WifiCredentials.namespace(), Namespace::WifiConfig);
        assert_eq!(StorageKey::LastSync.namespace(), Namespace::TimeSync);
    }

    #[test]
    fn test_erase_namespace_keeps_other_records() {
        let mut store = Slots::default();
        store.write(StorageKey::WifiCredentials, b"net").unwrap();
        store.write(StorageKey::LastSync, b"time").unwrap();

        store.erase_namespace(Namespace::WifiConfig).unwrap();
        assert!(!store.exists(StorageKey::WifiCredentials));
        assert!(store.exists(StorageKey::LastSync));

        store.write(StorageKey::WifiCredentials, b"net").unwrap();
        store.erase_namespace(Namespace::TimeSync).unwrap();
        assert!(store.exists(StorageKey::WifiCredentials));
        assert!(!store.exists(StorageKey::LastSync));
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let mut store = Slots::default();
        assert_eq!(store.remove(StorageKey::LastSync), Ok(()));
        let mut buf = [0u8; 4];
        assert_eq!(
            store.read(StorageKey::LastSync, &mut buf),
            Err(StorageError::NotFound)
        );
    }
}
