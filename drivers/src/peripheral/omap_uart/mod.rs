//! TI OMAP UART Driver
//!
//! Driver for the 16550-compatible UART found in OMAP and AM335x SoCs. The
//! OMAP variant adds the MDR1 register, which selects the operating mode and
//! can hold the controller disabled while it is reconfigured.
//!
//! # Features
//!
//! - Baud rate derived from the module clock
//! - Word length, parity and stop bits from [`SerialConfig`]
//! - FIFO reset on initialisation
//! - Blocking transmit with a bounded, cancellable readiness poll
//!
//! # Example
//!
//! ```no_run
//! use core::ptr::NonNull;
//! use serial_drivers::hal::mmio::MmioWindow;
//! use serial_drivers::hal::serial::{SerialConfig, SerialPort};
//! use serial_drivers::peripheral::omap_uart::OmapUart;
//!
//! let base = NonNull::new(0x4802_4000 as *mut u8).unwrap();
//! let window = unsafe { MmioWindow::new(base, 0x1000) };
//! let mut uart = OmapUart::new(window, 48_000_000);
//! uart.configure(&SerialConfig::new_8n1(115200)).unwrap();
//! uart.write(b"Hello, world!\n").unwrap();
//! ```

pub mod divisor;
pub mod regs;

use crate::hal::mmio::RegisterWindow;
use crate::hal::serial::{DataBits, Parity, SerialConfig, SerialPort, StopBits};
use common::sync::CancelToken;
use log::trace;
use thiserror::Error;

pub use divisor::{BaudDivisor, DEFAULT_BAUD_RATE, DivisorError};
pub use regs::{FifoControl, LineControl, LineStatus, Mdr1Mode, Register};

/// Status polls allowed per byte unless configured otherwise.
pub const DEFAULT_TX_POLLS: u32 = 100_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UartError {
    #[error("transmitter not ready after {polls} status polls")]
    Timeout { polls: u32 },

    #[error("transmit cancelled")]
    Cancelled,

    #[error(transparent)]
    Divisor(#[from] DivisorError),
}

/// How long a busy-wait on the line status may last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollBudget {
    /// Spin until the hardware reports ready.
    Unbounded,
    /// Give up after this many status reads.
    Polls(u32),
}

impl PollBudget {
    fn allows(self, polls: u32) -> bool {
        match self {
            PollBudget::Unbounded => true,
            PollBudget::Polls(max) => polls < max,
        }
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        PollBudget::Polls(DEFAULT_TX_POLLS)
    }
}

/// LCR value for a frame format. Never includes the divisor-latch bit.
pub fn line_control(config: &SerialConfig) -> LineControl {
    let mut lcr = match config.data_bits {
        DataBits::Five => LineControl::empty(),
        DataBits::Six => LineControl::WORD_LEN_6,
        DataBits::Seven => LineControl::WORD_LEN_7,
        DataBits::Eight => LineControl::WORD_LEN_8,
    };
    if config.stop_bits == StopBits::Two {
        lcr |= LineControl::STOP;
    }
    match config.parity {
        Parity::None => {}
        Parity::Odd => lcr |= LineControl::PARITY,
        Parity::Even => lcr |= LineControl::PARITY | LineControl::EVEN_PARITY,
    }
    lcr
}

/// Divisor-access mode, open for as long as this value lives.
///
/// While open, index 0 and 1 address DLL and DLM instead of THR and IER.
/// The latch mutably borrows the window, so nothing else can touch the
/// registers until [`DivisorLatch::close`] writes the frame format.
#[must_use = "the divisor latch stays open until closed with a frame format"]
struct DivisorLatch<'a, W: RegisterWindow<Register>> {
    window: &'a mut W,
}

impl<'a, W: RegisterWindow<Register>> DivisorLatch<'a, W> {
    /// Selects configuration mode A. LCR must already be cleared.
    fn open(window: &'a mut W) -> Self {
        window.write(Register::Lcr, LineControl::DIVISOR_LATCH.bits());
        Self { window }
    }

    fn set(&mut self, divisor: BaudDivisor) {
        self.window.write(Register::DLL, u32::from(divisor.low()));
        self.window.write(Register::DLM, u32::from(divisor.high()));
    }

    /// Writes the frame format, which clears the divisor-latch bit in the
    /// same store.
    fn close(self, format: LineControl) {
        let format = format.difference(LineControl::DIVISOR_LATCH);
        self.window.write(Register::Lcr, format.bits());
    }
}

/// OMAP UART driver bound to one register window.
pub struct OmapUart<W> {
    window: W,
    clock_hz: u32,
    tx_budget: PollBudget,
}

impl<W: RegisterWindow<Register>> OmapUart<W> {
    /// Wraps a mapped register window. No register is touched.
    pub fn new(window: W, clock_hz: u32) -> Self {
        Self {
            window,
            clock_hz,
            tx_budget: PollBudget::default(),
        }
    }

    pub fn with_tx_budget(mut self, budget: PollBudget) -> Self {
        self.tx_budget = budget;
        self
    }

    /// Runs the full reconfiguration sequence.
    ///
    /// The controller is held disabled across the divisor and format
    /// writes, and the FIFOs are reset only once it is running again.
    pub fn init(&mut self, divisor: BaudDivisor, format: &SerialConfig) {
        trace!("omap-uart: disable controller");
        self.set_mode(Mdr1Mode::Disable);
        self.window.write(Register::Lcr, 0);

        trace!("omap-uart: divisor {:#06x}", divisor.value());
        let mut latch = DivisorLatch::open(&mut self.window);
        latch.set(divisor);
        latch.close(line_control(format));

        trace!("omap-uart: enable controller, reset FIFOs");
        self.set_mode(Mdr1Mode::Uart16x);
        self.window.write(
            Register::FCR,
            (FifoControl::CLEAR_RCVR | FifoControl::CLEAR_XMIT).bits(),
        );
    }

    fn set_mode(&mut self, mode: Mdr1Mode) {
        self.window.write(Register::Mdr1, mode.bits());
    }

    fn line_status(&self) -> LineStatus {
        LineStatus::from_bits_retain(self.window.read(Register::Lsr))
    }

    /// Spins until every bit in `ready` is set in LSR.
    fn poll_status(
        &self,
        ready: LineStatus,
        budget: PollBudget,
        cancel: Option<&CancelToken>,
    ) -> Result<(), UartError> {
        let mut polls = 0u32;
        loop {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(UartError::Cancelled);
            }
            if !budget.allows(polls) {
                return Err(UartError::Timeout { polls });
            }
            polls = polls.saturating_add(1);
            if self.line_status().contains(ready) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
    }

    /// Waits for THR empty, then writes one byte. Uses the configured budget.
    pub fn transmit_byte(&mut self, byte: u8) -> Result<(), UartError> {
        self.transmit_byte_with(byte, self.tx_budget, None)
    }

    /// Like [`OmapUart::transmit_byte`] with an explicit budget and an
    /// optional cancellation token checked before every status read.
    pub fn transmit_byte_with(
        &mut self,
        byte: u8,
        budget: PollBudget,
        cancel: Option<&CancelToken>,
    ) -> Result<(), UartError> {
        self.poll_status(LineStatus::THR_EMPTY, budget, cancel)?;
        self.window.write(Register::THR, u32::from(byte));
        Ok(())
    }
}

impl<W: RegisterWindow<Register>> SerialPort for OmapUart<W> {
    type Error = UartError;

    fn configure(&mut self, config: &SerialConfig) -> Result<(), UartError> {
        let divisor = BaudDivisor::new(self.clock_hz, config.baud_rate)?;
        self.init(divisor, config);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), UartError> {
        self.transmit_byte(byte)
    }

    fn flush(&mut self) -> Result<(), UartError> {
        self.poll_status(LineStatus::TX_EMPTY, self.tx_budget, None)
    }

    fn is_busy(&self) -> bool {
        !self.line_status().contains(LineStatus::TX_EMPTY)
    }
}
