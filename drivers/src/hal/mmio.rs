//! Memory-mapped register access.
//!
//! A peripheral describes its registers as a closed enumeration implementing
//! [`RegisterMap`]; a [`RegisterWindow`] resolves those identifiers to
//! offsets and performs ordered, non-elidable 32-bit accesses.

use core::ptr::{NonNull, read_volatile, write_volatile};

/// A closed set of register identifiers with a fixed stride.
pub trait RegisterMap: Copy + core::fmt::Debug {
    /// Distance in bytes between consecutive register indices.
    const STRIDE: usize = 4;

    /// Logical register index as documented by the peripheral.
    fn index(self) -> usize;

    /// Byte offset from the start of the register window.
    #[inline]
    fn offset(self) -> usize {
        self.index() * Self::STRIDE
    }
}

/// Typed 32-bit access to one device's register window.
///
/// Implementations must never cache, merge or reorder accesses: register
/// contents reflect live hardware state.
pub trait RegisterWindow<R: RegisterMap> {
    /// Reads the register at `base + reg * STRIDE`.
    fn read(&self, reg: R) -> u32;

    /// Writes `value` to the register at `base + reg * STRIDE`.
    fn write(&mut self, reg: R, value: u32);
}

/// A mapped MMIO region accessed with volatile loads and stores.
#[derive(Debug)]
pub struct MmioWindow {
    base: NonNull<u8>,
    size: usize,
}

impl MmioWindow {
    /// Wraps an already-mapped register region.
    ///
    /// # Safety
    ///
    /// - `base` must point to `size` bytes of device memory that stay mapped
    ///   for the lifetime of the returned value
    /// - `base` must be 4-byte aligned
    /// - Only one `MmioWindow` should exist per hardware instance
    pub const unsafe fn new(base: NonNull<u8>, size: usize) -> Self {
        Self { base, size }
    }

    /// Virtual base address of the window.
    pub fn base(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// Size of the window in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn reg_ptr(&self, offset: usize) -> *mut u32 {
        debug_assert!(offset + 4 <= self.size);
        debug_assert!(offset % 4 == 0);
        // SAFETY: in bounds of the mapping per the constructor contract
        unsafe { self.base.as_ptr().add(offset).cast::<u32>() }
    }
}

impl<R: RegisterMap> RegisterWindow<R> for MmioWindow {
    #[inline]
    fn read(&self, reg: R) -> u32 {
        // SAFETY: the window is valid for its whole lifetime
        let value = unsafe { read_volatile(self.reg_ptr(reg.offset())) };
        io_barrier();
        value
    }

    #[inline]
    fn write(&mut self, reg: R, value: u32) {
        io_barrier();
        // SAFETY: the window is valid for its whole lifetime
        unsafe { write_volatile(self.reg_ptr(reg.offset()), value) }
    }
}

// SAFETY: the window is a plain pointer into device memory; callers serialise
// access through a lock owned by the driver instance.
unsafe impl Send for MmioWindow {}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "aarch64")] {
        /// Orders device accesses against each other and against normal memory.
        #[inline(always)]
        fn io_barrier() {
            // SAFETY: a barrier has no memory-safety preconditions
            unsafe { core::arch::asm!("dsb sy", options(nostack, preserves_flags)) }
        }
    } else {
        #[inline(always)]
        fn io_barrier() {
            core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Debug, Clone, Copy)]
    enum Regs {
        First = 0,
        Third = 2,
    }

    impl RegisterMap for Regs {
        fn index(self) -> usize {
            self as usize
        }
    }

    #[test]
    fn offsets_use_four_byte_stride() {
        assert_eq!(Regs::First.offset(), 0);
        assert_eq!(Regs::Third.offset(), 8);
    }

    #[test]
    fn reads_and_writes_land_at_stride_offsets() {
        let mut backing = vec![0u32; 4];
        let base = NonNull::new(backing.as_mut_ptr().cast::<u8>()).unwrap();
        let mut window = unsafe { MmioWindow::new(base, 16) };

        window.write(Regs::Third, 0xdead_beef);
        assert_eq!(window.read(Regs::Third), 0xdead_beef);
        assert_eq!(RegisterWindow::<Regs>::read(&window, Regs::First), 0);
        drop(window);
        assert_eq!(backing, [0, 0, 0xdead_beef, 0]);
    }
}
