//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! This module defines the generic interfaces a peripheral driver is written
//! against. Peripheral drivers implement or consume these traits; the
//! platform glue supplies the concrete types.
//!
//! # Available Interfaces
//!
//! - [`mmio`]: Typed register windows over memory-mapped I/O
//! - [`serial`]: Serial port (UART) configuration and transmission
//! - [`power`]: Runtime power-domain management

pub mod mmio;
pub mod power;
pub mod serial;
