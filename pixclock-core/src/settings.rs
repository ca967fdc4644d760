//! Settings persistence
//!
//! Loads and saves the clock's persisted records through a
//! [`KeyValueStore`]. Credentials and the sync timestamp live in separate
//! namespaces, so dropping rejected credentials keeps the sync history.

use pixclock_hal::storage::{KeyValueStore, Namespace, StorageError, StorageKey, MAX_RECORD_SIZE};
use pixclock_protocol::{NetworkCredentials, RecordError, SyncRecord};

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Storage operation failed
    Storage(StorageError),
    /// Stored bytes could not be encoded or decoded
    Record(RecordError),
}

impl From<StorageError> for SettingsError {
    fn from(e: StorageError) -> Self {
        SettingsError::Storage(e)
    }
}

impl From<RecordError> for SettingsError {
    fn from(e: RecordError) -> Self {
        SettingsError::Record(e)
    }
}

/// Typed access to the persisted records
pub struct Settings<S> {
    store: S,
}

impl<S: KeyValueStore> Settings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Give back the underlying store
    pub fn into_store(self) -> S {
        self.store
    }

    fn read_record<'b>(
        &mut self,
        key: StorageKey,
        buf: &'b mut [u8; MAX_RECORD_SIZE],
    ) -> Result<Option<&'b [u8]>, SettingsError> {
        match self.store.read(key, buf) {
            Ok(len) => Ok(Some(&buf[..len])),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored credentials, or `None` when unprovisioned
    pub fn load_credentials(&mut self) -> Result<Option<NetworkCredentials>, SettingsError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        match self.read_record(StorageKey::WifiCredentials, &mut buf)? {
            Some(bytes) => Ok(Some(NetworkCredentials::decode(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_credentials(&mut self, credentials: &NetworkCredentials) -> Result<(), SettingsError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let encoded = credentials.encode(&mut buf)?;
        self.store.write(StorageKey::WifiCredentials, encoded)?;
        Ok(())
    }

    /// Forget the credentials; the sync record is untouched
    pub fn clear_credentials(&mut self) -> Result<(), SettingsError> {
        self.store.erase_namespace(Namespace::WifiConfig)?;
        Ok(())
    }

    /// Unix time of the last successful sync, `None` if never synced
    pub fn load_last_sync(&mut self) -> Result<Option<i64>, SettingsError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        match self.read_record(StorageKey::LastSync, &mut buf)? {
            Some(bytes) => Ok(Some(SyncRecord::decode(bytes)?.last_sync)),
            None => Ok(None),
        }
    }

    pub fn save_last_sync(&mut self, unix: i64) -> Result<(), SettingsError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let encoded = SyncRecord { last_sync: unix }.encode(&mut buf)?;
        self.store.write(StorageKey::LastSync, encoded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn test_unprovisioned_is_none() {
        let mut settings = Settings::new(MemoryStore::default());
        assert_eq!(settings.load_credentials(), Ok(None));
        assert_eq!(settings.load_last_sync(), Ok(None));
    }

    #[test]
    fn test_credentials_round_trip() {
        let mut settings = Settings::new(MemoryStore::default());
        let creds = NetworkCredentials::new("HomeNet", "secret").unwrap();
        settings.save_credentials(&creds).unwrap();
        assert_eq!(settings.load_credentials(), Ok(Some(creds)));
    }

    #[test]
    fn test_clear_credentials_keeps_sync_record() {
        let mut settings = Settings::new(MemoryStore::default());
        let creds = NetworkCredentials::new("HomeNet", "secret").unwrap();
        settings.save_credentials(&creds).unwrap();
        settings.save_last_sync(1_750_000_000).unwrap();

        settings.clear_credentials().unwrap();
        assert_eq!(settings.load_credentials(), Ok(None));
        assert_eq!(settings.load_last_sync(), Ok(Some(1_750_000_000)));
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let mut store = MemoryStore::default();
        store.write(StorageKey::LastSync, &[0xFF; 12]).unwrap();
        let mut settings = Settings::new(store);
        assert_eq!(
            settings.load_last_sync(),
            Err(SettingsError::Record(RecordError::Decode))
        );
    }

    #[test]
    fn test_storage_failure_propagates() {
        let mut store = MemoryStore::default();
        store.fail_writes = true;
        let mut settings = Settings::new(store);
        assert_eq!(
            settings.save_last_sync(1),
            Err(SettingsError::Storage(StorageError::Flash))
        );
    }
}
