//! Baud-rate divisor derivation.

use thiserror::Error;

/// Baud rate used when nothing else is configured.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// The UART samples each bit 16 times in `Uart16x` mode.
pub const OVERSAMPLING: u32 = 16;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DivisorError {
    #[error("baud rate must be non-zero")]
    ZeroBaudRate,

    #[error("clock {clock_hz} Hz is too slow for {baud_rate} baud (divisor would be 0)")]
    TooSmall { clock_hz: u32, baud_rate: u32 },

    #[error("clock {clock_hz} Hz is too fast for {baud_rate} baud (divisor exceeds 16 bits)")]
    TooLarge { clock_hz: u32, baud_rate: u32 },
}

/// A 16-bit divisor latch value, `clock_hz / 16 / baud_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudDivisor(u16);

impl BaudDivisor {
    /// Derives the divisor with truncating integer division.
    ///
    /// A zero divisor would stop the baud generator, so it is rejected.
    pub fn new(clock_hz: u32, baud_rate: u32) -> Result<Self, DivisorError> {
        if baud_rate == 0 {
            return Err(DivisorError::ZeroBaudRate);
        }

        let divisor = clock_hz / OVERSAMPLING / baud_rate;
        match u16::try_from(divisor) {
            Ok(0) => Err(DivisorError::TooSmall {
                clock_hz,
                baud_rate,
            }),
            Ok(value) => Ok(Self(value)),
            Err(_) => Err(DivisorError::TooLarge {
                clock_hz,
                baud_rate,
            }),
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Byte written to DLL.
    pub const fn low(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Byte written to DLM.
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }
}
