//! Register layout of the OMAP UART.
//!
//! The 16550 core aliases several registers onto one index; which one is
//! addressed depends on the access mode selected through LCR. The aliases
//! are exposed as associated constants so callers name the register they
//! mean while the enumeration stays closed.

use crate::hal::mmio::RegisterMap;
use bitflags::bitflags;

/// Register indices (multiplied by a 4-byte stride).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Register {
    /// RHR on read, THR on write, DLL in divisor-access mode.
    Data = 0x00,
    /// IER, or DLM in divisor-access mode.
    IerDlm = 0x01,
    /// IIR on read, FCR on write.
    IirFcr = 0x02,
    /// Line control.
    Lcr = 0x03,
    /// Modem control.
    Mcr = 0x04,
    /// Line status (read-only).
    Lsr = 0x05,
    /// Modem status (read-only).
    Msr = 0x06,
    /// Scratchpad.
    Spr = 0x07,
    /// Mode definition 1 (OMAP-specific).
    Mdr1 = 0x08,
}

impl Register {
    pub const RHR: Self = Self::Data;
    pub const THR: Self = Self::Data;
    pub const DLL: Self = Self::Data;
    pub const IER: Self = Self::IerDlm;
    pub const DLM: Self = Self::IerDlm;
    pub const IIR: Self = Self::IirFcr;
    pub const FCR: Self = Self::IirFcr;
}

impl RegisterMap for Register {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// MDR1 operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Mdr1Mode {
    /// UART with 16x oversampling; normal operation.
    Uart16x = 0x00,
    Sir = 0x01,
    Uart16xAutobaud = 0x02,
    Uart13x = 0x03,
    Mir = 0x04,
    Fir = 0x05,
    Cir = 0x06,
    /// Controller disabled; the line is not driven.
    Disable = 0x07,
}

impl Mdr1Mode {
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

bitflags! {
    /// Line Control Register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineControl: u32 {
        /// Word length select bit 0.
        const WLS0 = 1 << 0;
        /// Word length select bit 1.
        const WLS1 = 1 << 1;
        /// Two stop bits.
        const STOP = 1 << 2;
        /// Parity enable.
        const PARITY = 1 << 3;
        /// Even parity select.
        const EVEN_PARITY = 1 << 4;
        /// Stick parity.
        const STICK_PARITY = 1 << 5;
        /// Break control.
        const BREAK = 1 << 6;
        /// Divisor latch access; configuration mode A.
        const DIVISOR_LATCH = 1 << 7;

        const WORD_LEN_6 = Self::WLS0.bits();
        const WORD_LEN_7 = Self::WLS1.bits();
        const WORD_LEN_8 = Self::WLS0.bits() | Self::WLS1.bits();
    }
}

bitflags! {
    /// FIFO Control Register bits (write-only).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FifoControl: u32 {
        const ENABLE = 1 << 0;
        /// Clear the receive FIFO.
        const CLEAR_RCVR = 1 << 1;
        /// Clear the transmit FIFO.
        const CLEAR_XMIT = 1 << 2;
        const DMA_SELECT = 1 << 3;
    }
}

bitflags! {
    /// Line Status Register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineStatus: u32 {
        const DATA_READY = 1 << 0;
        const OVERRUN = 1 << 1;
        const PARITY_ERROR = 1 << 2;
        const FRAMING_ERROR = 1 << 3;
        const BREAK = 1 << 4;
        /// Transmit holding register empty.
        const THR_EMPTY = 1 << 5;
        /// Transmitter (holding and shift register) empty.
        const TX_EMPTY = 1 << 6;
        const FIFO_ERROR = 1 << 7;
    }
}
