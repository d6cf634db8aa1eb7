//! Runtime power management.
//!
//! A device must have its power domain active before any register access.
//! [`PmClaim`] holds that activation for as long as it lives.

use thiserror::Error;

/// Power-domain activation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PowerError {
    #[error("power domain could not be activated")]
    Activation,
}

/// Runtime power-management handle for one device.
pub trait RuntimePm {
    /// Allow runtime power management for the device.
    fn enable(&self);

    /// Take a usage reference and resume the device synchronously.
    fn get_sync(&self) -> Result<(), PowerError>;

    /// Drop a usage reference taken by [`RuntimePm::get_sync`].
    fn put(&self);

    /// Stop runtime power management for the device.
    fn disable(&self);
}

/// An active power-domain claim, released on drop.
#[must_use = "the power domain is released as soon as the claim is dropped"]
pub struct PmClaim<P: RuntimePm> {
    pm: P,
}

impl<P: RuntimePm> PmClaim<P> {
    /// Enables runtime PM and resumes the device.
    ///
    /// On failure the domain is disabled again before the error is returned.
    pub fn acquire(pm: P) -> Result<Self, PowerError> {
        pm.enable();
        if let Err(err) = pm.get_sync() {
            pm.disable();
            return Err(err);
        }
        Ok(Self { pm })
    }
}

impl<P: RuntimePm> Drop for PmClaim<P> {
    fn drop(&mut self) {
        self.pm.put();
        self.pm.disable();
    }
}
