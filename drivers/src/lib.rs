//! Serial Driver Subsystem
//!
//! A memory-mapped UART driver, layered the same way as the rest of the
//! driver tree:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait definitions (register windows,
//!   serial ports, runtime power)
//! - [`peripheral`]: Reusable peripheral drivers
//! - [`platform`]: The interface to device discovery and resource mapping
//! - [`chardev`] and [`misc`]: The character-device surface exposed upward
//! - [`serial`]: Binding and unbinding a UART instance
//!
//! # Design Principles
//!
//! 1. **Write-only protocol**: the UART's access mode is never read back, so
//!    the initialisation order is enforced by types rather than checked
//! 2. **Scoped resources**: register windows and power claims are owned
//!    values released on drop
//! 3. **Serialised access**: every bound UART sits behind a lock
//!
//! # Usage Example
//!
//! ```ignore
//! use serial_drivers::misc::misc_devices;
//! use serial_drivers::serial::SerialDriver;
//!
//! let driver = SerialDriver::default();
//! if driver.matches(&pdev) {
//!     let bound = driver.probe(&mut pdev, misc_devices())?;
//!     // ... later, on unbind
//!     bound.remove();
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

extern crate alloc;

pub mod chardev;
pub mod hal;
pub mod misc;
pub mod peripheral;
pub mod platform;
pub mod serial;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use hal::mmio::{MmioWindow, RegisterMap, RegisterWindow};
pub use hal::serial::{SerialConfig, SerialPort};
pub use peripheral::omap_uart::{OmapUart, PollBudget, UartError};
pub use serial::{BoundSerial, ProbeError, SerialDriver, SerialDriverConfig};
