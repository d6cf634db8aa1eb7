//! Mock collaborators for unit tests.

use crate::hal::mmio::RegisterWindow;
use crate::hal::power::{PowerError, RuntimePm};
use crate::peripheral::omap_uart::{LineControl, LineStatus, Register};
use crate::platform::{MemResource, PlatformDevice, PropertyError, ResourceError};
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use common::sync::SpinLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(Register, u32),
    Write(Register, u32),
}

struct WindowState {
    accesses: Vec<Access>,
    /// Writes to Data/IerDlm that landed in the divisor latch.
    latched: Vec<(Register, u32)>,
    lcr: u32,
    dll: u32,
    dlm: u32,
    lsr_script: VecDeque<u32>,
    lsr_idle: u32,
    mapped: bool,
}

impl WindowState {
    fn divisor_latch_open(&self) -> bool {
        self.lcr & LineControl::DIVISOR_LATCH.bits() != 0
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            accesses: Vec::new(),
            latched: Vec::new(),
            lcr: 0,
            dll: 0,
            dlm: 0,
            lsr_script: VecDeque::new(),
            lsr_idle: (LineStatus::THR_EMPTY | LineStatus::TX_EMPTY).bits(),
            mapped: false,
        }
    }
}

/// Register window that records every access. Like the hardware, Data and
/// IerDlm reach the divisor latch while LCR bit 7 is set. Dropping it marks
/// the window unmapped.
pub struct MockWindow {
    state: Arc<SpinLock<WindowState>>,
}

impl MockWindow {
    pub fn new() -> Self {
        Self::sharing(Arc::new(SpinLock::new(WindowState::default())))
    }

    fn sharing(state: Arc<SpinLock<WindowState>>) -> Self {
        state.lock().mapped = true;
        Self { state }
    }

    pub fn probe(&self) -> WindowProbe {
        WindowProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl RegisterWindow<Register> for MockWindow {
    fn read(&self, reg: Register) -> u32 {
        let mut state = self.state.lock();
        assert!(state.mapped, "read from unmapped window");
        let latch = state.divisor_latch_open();
        let value = match reg {
            Register::Lsr => {
                let idle = state.lsr_idle;
                state.lsr_script.pop_front().unwrap_or(idle)
            }
            Register::Lcr => state.lcr,
            Register::Data if latch => state.dll,
            Register::IerDlm if latch => state.dlm,
            _ => 0,
        };
        state.accesses.push(Access::Read(reg, value));
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        let mut state = self.state.lock();
        assert!(state.mapped, "write to unmapped window");
        let latch = state.divisor_latch_open();
        match reg {
            Register::Lcr => state.lcr = value,
            Register::Data if latch => state.dll = value,
            Register::IerDlm if latch => state.dlm = value,
            _ => {}
        }
        if latch && matches!(reg, Register::Data | Register::IerDlm) {
            state.latched.push((reg, value));
        }
        state.accesses.push(Access::Write(reg, value));
    }
}

impl Drop for MockWindow {
    fn drop(&mut self) {
        self.state.lock().mapped = false;
    }
}

/// Inspection handle onto a [`MockWindow`]'s state.
#[derive(Clone)]
pub struct WindowProbe {
    state: Arc<SpinLock<WindowState>>,
}

impl WindowProbe {
    pub fn accesses(&self) -> Vec<Access> {
        self.state.lock().accesses.clone()
    }

    pub fn writes(&self) -> Vec<(Register, u32)> {
        self.accesses()
            .into_iter()
            .filter_map(|access| match access {
                Access::Write(reg, value) => Some((reg, value)),
                Access::Read(..) => None,
            })
            .collect()
    }

    pub fn reads(&self) -> Vec<Register> {
        self.accesses()
            .into_iter()
            .filter_map(|access| match access {
                Access::Read(reg, _) => Some(reg),
                Access::Write(..) => None,
            })
            .collect()
    }

    /// Values returned by the next LSR reads, in order.
    pub fn script_lsr(&self, values: impl IntoIterator<Item = u32>) {
        self.state.lock().lsr_script.extend(values);
    }

    /// Value LSR reports once the script is exhausted.
    pub fn set_lsr_idle(&self, value: u32) {
        self.state.lock().lsr_idle = value;
    }

    /// Writes that went to DLL/DLM rather than THR/IER.
    pub fn latched_writes(&self) -> Vec<(Register, u32)> {
        self.state.lock().latched.clone()
    }

    /// Current divisor latch contents.
    pub fn divisor(&self) -> u16 {
        let state = self.state.lock();
        ((state.dlm as u16 & 0xff) << 8) | (state.dll as u16 & 0xff)
    }

    pub fn lcr(&self) -> u32 {
        self.state.lock().lcr
    }

    pub fn is_mapped(&self) -> bool {
        self.state.lock().mapped
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.accesses.clear();
        state.latched.clear();
    }
}

#[derive(Default)]
struct PmState {
    events: Vec<&'static str>,
    fail_resume: bool,
}

#[derive(Clone, Default)]
pub struct MockPm {
    state: Arc<SpinLock<PmState>>,
}

impl MockPm {
    pub fn events(&self) -> Vec<&'static str> {
        self.state.lock().events.clone()
    }

    pub fn fail_resume(&self) {
        self.state.lock().fail_resume = true;
    }
}

impl RuntimePm for MockPm {
    fn enable(&self) {
        self.state.lock().events.push("enable");
    }

    fn get_sync(&self) -> Result<(), PowerError> {
        let mut state = self.state.lock();
        state.events.push("get_sync");
        if state.fail_resume {
            Err(PowerError::Activation)
        } else {
            Ok(())
        }
    }

    fn put(&self) {
        self.state.lock().events.push("put");
    }

    fn disable(&self) {
        self.state.lock().events.push("disable");
    }
}

/// Platform device whose every acquisition step can be made to fail.
pub struct MockPlatform {
    pub base: usize,
    pub compatible: &'static str,
    pub clock_frequency: Result<u32, PropertyError>,
    pub resource_missing: bool,
    pub map_fails: bool,
    window: Arc<SpinLock<WindowState>>,
    pm: MockPm,
}

impl MockPlatform {
    pub fn new(base: usize, clock_hz: u32) -> Self {
        Self {
            base,
            compatible: "bootlin,serial",
            clock_frequency: Ok(clock_hz),
            resource_missing: false,
            map_fails: false,
            window: Arc::new(SpinLock::new(WindowState::default())),
            pm: MockPm::default(),
        }
    }

    pub fn window(&self) -> WindowProbe {
        WindowProbe {
            state: Arc::clone(&self.window),
        }
    }

    pub fn pm(&self) -> MockPm {
        self.pm.clone()
    }
}

impl PlatformDevice for MockPlatform {
    type Window = MockWindow;
    type Pm = MockPm;

    fn name(&self) -> &str {
        "mock.serial"
    }

    fn compatible(&self) -> &str {
        self.compatible
    }

    fn mem_resource(&self, index: usize) -> Result<MemResource, ResourceError> {
        if self.resource_missing || index != 0 {
            return Err(ResourceError::Missing { index });
        }
        Ok(MemResource {
            start: self.base,
            size: 0x1000,
        })
    }

    fn ioremap(&mut self, resource: &MemResource) -> Result<MockWindow, ResourceError> {
        if self.map_fails {
            return Err(ResourceError::MapFailed {
                start: resource.start,
                size: resource.size,
            });
        }
        Ok(MockWindow::sharing(Arc::clone(&self.window)))
    }

    fn read_u32_property(&self, name: &str) -> Result<u32, PropertyError> {
        match name {
            "clock-frequency" => self.clock_frequency.clone(),
            _ => Err(PropertyError::Missing),
        }
    }

    fn runtime_pm(&self) -> MockPm {
        self.pm.clone()
    }
}
