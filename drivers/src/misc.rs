//! Misc character-device registry.
//!
//! Drivers that need a single character device register it here under a
//! unique name and receive a dynamically allocated minor number.

use crate::chardev::FileOperations;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use common::sync::SpinLock;
use thiserror::Error;

/// Number of minors available for dynamic allocation.
pub const DYNAMIC_MINORS: u8 = 64;

pub type Minor = u8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MiscError {
    #[error("device name `{0}` already registered")]
    NameInUse(String),

    #[error("no dynamic minor available")]
    NoMinorAvailable,

    #[error("device `{0}` is not registered")]
    NotRegistered(String),
}

struct MiscEntry {
    minor: Minor,
    fops: Arc<dyn FileOperations>,
}

pub struct MiscRegistry {
    devices: BTreeMap<String, MiscEntry>,
    /// Bit `n` set means dynamic minor `n` is taken.
    used_minors: u64,
}

impl MiscRegistry {
    pub const fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
            used_minors: 0,
        }
    }

    /// Registers `fops` under `name`, handing out the highest free minor.
    pub fn register(
        &mut self,
        name: String,
        fops: Arc<dyn FileOperations>,
    ) -> Result<Minor, MiscError> {
        if self.devices.contains_key(&name) {
            return Err(MiscError::NameInUse(name));
        }
        let minor = self.allocate_minor()?;
        self.devices.insert(name, MiscEntry { minor, fops });
        Ok(minor)
    }

    /// Removes `name`, frees its minor and hands back its operations.
    pub fn deregister(&mut self, name: &str) -> Result<Arc<dyn FileOperations>, MiscError> {
        let entry = self
            .devices
            .remove(name)
            .ok_or_else(|| MiscError::NotRegistered(name.into()))?;
        self.used_minors &= !(1u64 << entry.minor);
        Ok(entry.fops)
    }

    pub fn open(&self, name: &str) -> Option<Arc<dyn FileOperations>> {
        self.devices.get(name).map(|entry| Arc::clone(&entry.fops))
    }

    pub fn minor(&self, name: &str) -> Option<Minor> {
        self.devices.get(name).map(|entry| entry.minor)
    }

    pub fn list(&self) -> impl Iterator<Item = &String> {
        self.devices.keys()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn allocate_minor(&mut self) -> Result<Minor, MiscError> {
        let minor = (0..DYNAMIC_MINORS)
            .rev()
            .find(|&minor| self.used_minors & (1u64 << minor) == 0)
            .ok_or(MiscError::NoMinorAvailable)?;
        self.used_minors |= 1u64 << minor;
        Ok(minor)
    }
}

impl Default for MiscRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static MISC_DEVICES: SpinLock<MiscRegistry> = SpinLock::new(MiscRegistry::new());

/// The system-wide misc device registry.
pub fn misc_devices() -> &'static SpinLock<MiscRegistry> {
    &MISC_DEVICES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chardev::FileError;
    use alloc::format;
    use alloc::vec::Vec;

    struct Null;

    impl FileOperations for Null {
        fn read(&self, _buf: &mut [u8], _offset: usize) -> Result<usize, FileError> {
            Ok(0)
        }

        fn write(&self, buf: &[u8], _offset: usize) -> Result<usize, FileError> {
            Ok(buf.len())
        }
    }

    fn null() -> Arc<dyn FileOperations> {
        Arc::new(Null)
    }

    #[test]
    fn allocates_minors_from_the_top() {
        let mut registry = MiscRegistry::new();
        assert_eq!(registry.register("a".into(), null()), Ok(63));
        assert_eq!(registry.register("b".into(), null()), Ok(62));
        assert_eq!(registry.minor("a"), Some(63));
        assert_eq!(registry.list().cloned().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = MiscRegistry::new();
        registry.register("serial-0".into(), null()).unwrap();
        assert_eq!(
            registry.register("serial-0".into(), null()),
            Err(MiscError::NameInUse("serial-0".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn deregister_frees_name_and_minor() {
        let mut registry = MiscRegistry::new();
        let minor = registry.register("x".into(), null()).unwrap();
        assert!(registry.open("x").is_some());

        registry.deregister("x").unwrap();
        assert!(registry.open("x").is_none());
        assert!(registry.is_empty());
        assert_eq!(registry.register("x".into(), null()), Ok(minor));
    }

    #[test]
    fn deregister_unknown_name_fails() {
        let mut registry = MiscRegistry::new();
        assert_eq!(
            registry.deregister("ghost").err(),
            Some(MiscError::NotRegistered("ghost".into()))
        );
    }

    #[test]
    fn runs_out_of_dynamic_minors() {
        let mut registry = MiscRegistry::new();
        for i in 0..DYNAMIC_MINORS {
            registry.register(format!("dev{i}"), null()).unwrap();
        }
        assert_eq!(
            registry.register("one-more".into(), null()),
            Err(MiscError::NoMinorAvailable)
        );
    }
}
