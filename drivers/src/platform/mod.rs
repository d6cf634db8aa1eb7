//! Platform Device Interface
//!
//! The boundary between peripheral drivers and whatever discovers hardware
//! (device tree, ACPI, a static board table). A driver never parses
//! configuration or maps memory itself; it asks its [`PlatformDevice`].
//!
//! # Resource lifetime
//!
//! [`PlatformDevice::ioremap`] returns an owned window. Dropping the window
//! releases the mapping, so a driver that holds the window cannot outlive
//! the mapping and every early return during probe unmaps automatically.

use crate::hal::power::RuntimePm;
use thiserror::Error;

/// A physical memory region described by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemResource {
    /// Physical base address.
    pub start: usize,
    /// Length in bytes.
    pub size: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("memory resource {index} not present")]
    Missing { index: usize },

    #[error("cannot map {size:#x} bytes at {start:#x}")]
    MapFailed { start: usize, size: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property not found")]
    Missing,

    #[error("property value is not a u32")]
    Malformed,
}

/// One entry of a driver's device-tree match table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfMatch {
    pub compatible: &'static str,
}

/// Finds the entry of `table` matching `compatible`, if any.
pub fn of_match<'t>(table: &'t [OfMatch], compatible: &str) -> Option<&'t OfMatch> {
    table.iter().find(|entry| entry.compatible == compatible)
}

/// A discovered hardware instance and the services the platform offers it.
pub trait PlatformDevice {
    /// Mapped register window; dropping it unmaps the region.
    type Window;

    /// Runtime power-management handle.
    type Pm: RuntimePm;

    /// Name the platform knows the device by, for log messages.
    fn name(&self) -> &str;

    /// Compatible string from the device description.
    fn compatible(&self) -> &str;

    /// Memory resource number `index`.
    fn mem_resource(&self, index: usize) -> Result<MemResource, ResourceError>;

    /// Maps `resource` for register access.
    fn ioremap(&mut self, resource: &MemResource) -> Result<Self::Window, ResourceError>;

    /// Reads a `u32` configuration property.
    fn read_u32_property(&self, name: &str) -> Result<u32, PropertyError>;

    /// Power-management handle for this device.
    fn runtime_pm(&self) -> Self::Pm;
}
