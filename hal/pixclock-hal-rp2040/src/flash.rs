//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last 64KB of flash.
//!
//! The clock loop is synchronous, so the async map operations run to
//! completion with `block_on` over a blocking flash driver. Removal stores
//! an empty item, which reads back as "not found".

use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_futures::block_on;
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from pixclock-hal
pub use pixclock_hal::storage::{StorageError, StorageKey, MAX_RECORD_SIZE};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico W
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024; // 64KB for records
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Flash range for the record partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Working buffer for sequential-storage: one key byte plus the largest
/// record, rounded up to the flash word size
const DATA_BUFFER_SIZE: usize = MAX_RECORD_SIZE + 32;

type RecordFlash<'d> = BlockingAsync<Flash<'d, FLASH, Blocking, FLASH_SIZE>>;

/// RP2040 Flash storage implementation
pub struct Rp2040FlashStorage<'d> {
    flash: RecordFlash<'d>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: BlockingAsync::new(Flash::new_blocking(flash)),
        }
    }
}

fn map_error<E>(err: sequential_storage::Error<E>) -> StorageError {
    match err {
        sequential_storage::Error::FullStorage => StorageError::Full,
        sequential_storage::Error::Corrupted { .. } => StorageError::Corrupted,
        sequential_storage::Error::BufferTooSmall(_) => StorageError::BufferTooSmall,
        _ => StorageError::Flash,
    }
}

impl<'d> pixclock_hal::KeyValueStore for Rp2040FlashStorage<'d> {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];

        let result = block_on(map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        ));

        match result {
            Ok(Some(data)) if data.is_empty() => Err(StorageError::NotFound),
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(StorageError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(StorageError::NotFound),
            Err(e) => Err(map_error(e)),
        }
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > MAX_RECORD_SIZE {
            return Err(StorageError::BufferTooSmall);
        }
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];

        block_on(map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        ))
        .map_err(map_error)
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        let empty: &[u8] = &[];
        self.write(key, empty)
    }
}

/// Type alias matching the board firmware's naming
pub type FlashStorage<'d> = Rp2040FlashStorage<'d>;
