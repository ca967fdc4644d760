//! I2C bus abstractions
//!
//! Provides traits for I2C master operations. The RTC and the display share
//! one bus, so every driver talks to it through this trait and owns its own
//! handle.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::read(self, address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        T::write_read(self, address, write_data, read_buf)
    }
}

/// Adapter from any blocking `embedded-hal` I2C implementation
///
/// Chip HALs and shared-bus wrappers implement `embedded_hal::i2c::I2c`;
/// wrapping them here lets the drivers stay independent of that trait.
pub struct EmbeddedHalI2c<T> {
    inner: T,
}

impl<T> EmbeddedHalI2c<T> {
    /// Wrap an `embedded-hal` I2C device
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Release the wrapped device
    pub fn release(self) -> T {
        self.inner
    }
}

impl<T: embedded_hal::i2c::I2c> I2cBus for EmbeddedHalI2c<T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.inner.read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.inner.write_read(address, write_data, read_buf)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::FAST
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz), used for the clock bus
    pub const FAST: Self = Self { frequency: 400_000 };
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Records every transaction and answers reads with a fixed byte
    struct Recorder {
        writes: [u8; 8],
        len: usize,
        fill: u8,
    }

    impl ErrorType for Recorder {
        type Error = ErrorKind;
    }

    impl embedded_hal::i2c::I2c for Recorder {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if address != 0x68 {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(data) => {
                        self.writes[..data.len()].copy_from_slice(data);
                        self.len = data.len();
                    }
                    Operation::Read(buf) => buf.fill(self.fill),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_adapter_forwards_write_read() {
        let mut bus = EmbeddedHalI2c::new(Recorder {
            writes: [0; 8],
            len: 0,
            fill: 0x42,
        });
        let mut buf = [0u8; 2];
        bus.write_read(0x68, &[0x11], &mut buf).unwrap();
        assert_eq!(buf, [0x42, 0x42]);

        let inner = bus.release();
        assert_eq!(&inner.writes[..inner.len], &[0x11]);
    }

    #[test]
    fn test_adapter_propagates_errors() {
        let mut bus = EmbeddedHalI2c::new(Recorder {
            writes: [0; 8],
            len: 0,
            fill: 0,
        });
        assert_eq!(bus.write(0x3C, &[0x00, 0xAF]), Err(ErrorKind::Other));
    }

    #[test]
    fn test_default_is_fast_mode() {
        assert_eq!(I2cConfig::default().frequency, 400_000);
        assert_eq!(I2cConfig::STANDARD.frequency, 100_000);
    }
}
