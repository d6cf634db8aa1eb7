//! Peripheral Drivers
//!
//! This module contains drivers for reusable peripherals that
//! can be found across different platforms.
//!
//! # Available Peripherals
//!
//! - [`omap_uart`]: TI OMAP-style 16550-compatible UART

pub mod omap_uart;
