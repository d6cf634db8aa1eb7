//! Character-device front end.
//!
//! Each bound UART is exposed to user space through an object implementing
//! [`FileOperations`], registered in the misc device registry.

use crate::hal::mmio::RegisterWindow;
use crate::peripheral::omap_uart::{OmapUart, Register, UartError};
use alloc::sync::Arc;
use common::sync::SpinLock;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("uart: {0}")]
    Uart(#[from] UartError),

    #[error("device has been unbound")]
    NoDevice,
}

/// A bound UART as shared with its open files. The slot is emptied at
/// unbind, which releases the register window even while files stay open.
pub type SharedPort<W> = Arc<SpinLock<Option<OmapUart<W>>>>;

/// File operations trait
pub trait FileOperations: Send + Sync {
    /// Read from the file
    fn read(&self, buf: &mut [u8], offset: usize) -> Result<usize, FileError>;

    /// Write to the file
    fn write(&self, buf: &[u8], offset: usize) -> Result<usize, FileError>;
}

/// File interface of one OMAP UART.
///
/// The port lock is held for a whole `write`, so bytes from concurrent
/// writers never interleave with each other or with reconfiguration.
/// Once the device is unbound every write fails with
/// [`FileError::NoDevice`].
pub struct SerialFile<W> {
    port: SharedPort<W>,
}

impl<W> SerialFile<W> {
    pub fn new(port: SharedPort<W>) -> Self {
        Self { port }
    }
}

impl<W> FileOperations for SerialFile<W>
where
    W: RegisterWindow<Register> + Send,
{
    /// There is no receive path; reads always report end of data.
    fn read(&self, _buf: &mut [u8], _offset: usize) -> Result<usize, FileError> {
        Ok(0)
    }

    /// Transmits `buf` byte by byte. A timeout after some bytes went out
    /// returns the short count; a timeout on the first byte is an error.
    fn write(&self, buf: &[u8], _offset: usize) -> Result<usize, FileError> {
        let mut slot = self.port.lock();
        let port = slot.as_mut().ok_or(FileError::NoDevice)?;
        for (sent, &byte) in buf.iter().enumerate() {
            if let Err(err) = port.transmit_byte(byte) {
                if sent == 0 {
                    return Err(err.into());
                }
                return Ok(sent);
            }
        }
        Ok(buf.len())
    }
}
