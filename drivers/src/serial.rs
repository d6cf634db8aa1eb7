//! Serial device lifecycle.
//!
//! [`SerialDriver::probe`] takes a matched platform device from unbound to
//! bound: it maps the registers, reads the clock, powers the device up,
//! programs the UART and publishes a misc character device named after the
//! physical base address. The returned [`BoundSerial`] is the bound state;
//! dropping it (or calling [`BoundSerial::remove`]) unbinds.

use crate::chardev::{FileOperations, SerialFile, SharedPort};
use crate::hal::mmio::RegisterWindow;
use crate::hal::power::{PmClaim, PowerError};
use crate::hal::serial::{SerialConfig, SerialWriter};
use crate::misc::{Minor, MiscError, MiscRegistry};
use crate::peripheral::omap_uart::{BaudDivisor, DivisorError, OmapUart, PollBudget, Register};
use crate::platform::{OfMatch, PlatformDevice, PropertyError, ResourceError, of_match};
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use common::sync::SpinLock;
use core::fmt::{self, Write as _};
use log::{debug, error, info, warn};
use thiserror::Error;

pub const DRIVER_NAME: &str = "serial";

/// Property holding the UART module clock in Hz.
pub const CLOCK_FREQUENCY: &str = "clock-frequency";

pub const OF_MATCH_TABLE: &[OfMatch] = &[OfMatch {
    compatible: "bootlin,serial",
}];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("register window unavailable")]
    Resource(#[from] ResourceError),

    #[error("property `{property}` unavailable")]
    Config {
        property: &'static str,
        #[source]
        source: PropertyError,
    },

    #[error("no usable baud divisor")]
    Divisor(#[from] DivisorError),

    #[error("runtime power activation failed")]
    Power(#[from] PowerError),

    #[error("cannot register misc device `{name}`")]
    Registration {
        name: String,
        #[source]
        source: MiscError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialDriverConfig {
    /// Line settings programmed at bind time.
    pub serial: SerialConfig,
    /// Status-poll budget for each transmitted byte.
    pub tx_budget: PollBudget,
    /// Byte sent once the UART is up, if any.
    pub banner: Option<u8>,
}

impl Default for SerialDriverConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            tx_budget: PollBudget::default(),
            banner: Some(b'M'),
        }
    }
}

/// Name of the misc device for a UART at physical address `base`.
pub fn device_name(base: usize) -> String {
    format!("serial-{base:x}")
}

#[derive(Debug, Default)]
pub struct SerialDriver {
    config: SerialDriverConfig,
}

impl SerialDriver {
    pub fn new(config: SerialDriverConfig) -> Self {
        Self { config }
    }

    /// Whether `pdev` is described as compatible with this driver.
    pub fn matches<P: PlatformDevice>(&self, pdev: &P) -> bool {
        of_match(OF_MATCH_TABLE, pdev.compatible()).is_some()
    }

    /// Binds to `pdev` and registers its character device in `misc`.
    ///
    /// Nothing is written to the hardware until the register window, the
    /// clock frequency, the divisor and the power domain are all in hand.
    /// Every failure releases what was acquired before returning.
    pub fn probe<'r, P>(
        &self,
        pdev: &mut P,
        misc: &'r SpinLock<MiscRegistry>,
    ) -> Result<BoundSerial<'r, P>, ProbeError>
    where
        P: PlatformDevice,
        P::Window: RegisterWindow<Register> + Send + 'static,
    {
        debug!("{}: binding", pdev.name());

        let resource = pdev.mem_resource(0).inspect_err(|err| {
            error!("{}: {err}", pdev.name());
        })?;
        let window = pdev.ioremap(&resource).inspect_err(|err| {
            error!("{}: {err}", pdev.name());
        })?;

        let clock_hz = match pdev.read_u32_property(CLOCK_FREQUENCY) {
            Ok(hz) => hz,
            Err(source) => {
                error!("{}: {CLOCK_FREQUENCY} property not found", pdev.name());
                return Err(ProbeError::Config {
                    property: CLOCK_FREQUENCY,
                    source,
                });
            }
        };

        let divisor = BaudDivisor::new(clock_hz, self.config.serial.baud_rate).inspect_err(|err| {
            error!("{}: {err}", pdev.name());
        })?;
        debug!(
            "{}: clock {clock_hz} Hz, divisor {}",
            pdev.name(),
            divisor.value()
        );

        let pm = PmClaim::acquire(pdev.runtime_pm()).inspect_err(|err| {
            error!("{}: {err}", pdev.name());
        })?;

        let mut uart = OmapUart::new(window, clock_hz).with_tx_budget(self.config.tx_budget);
        uart.init(divisor, &self.config.serial);

        if let Some(byte) = self.config.banner {
            if let Err(err) = uart.transmit_byte(byte) {
                warn!("{}: banner not sent: {err}", pdev.name());
            }
        }

        let name = device_name(resource.start);
        let port: SharedPort<P::Window> = Arc::new(SpinLock::new(Some(uart)));
        let fops: Arc<dyn FileOperations> = Arc::new(SerialFile::new(Arc::clone(&port)));

        let registered = misc.lock().register(name.clone(), fops);
        let minor = match registered {
            Ok(minor) => minor,
            Err(source) => {
                error!("{}: misc register failed: {source}", pdev.name());
                let uart = port.lock().take();
                drop(pm);
                drop(uart);
                return Err(ProbeError::Registration { name, source });
            }
        };

        info!("{name}: misc driver loaded (minor {minor})");
        Ok(BoundSerial {
            name,
            minor,
            misc,
            pm: Some(pm),
            port,
        })
    }
}

/// A bound UART.
///
/// Unbinding deregisters the misc device, takes the UART out of the slot
/// shared with open files, releases the power claim and finally drops the
/// UART, which unmaps its register window.
pub struct BoundSerial<'r, P: PlatformDevice> {
    name: String,
    minor: Minor,
    misc: &'r SpinLock<MiscRegistry>,
    pm: Option<PmClaim<P::Pm>>,
    port: SharedPort<P::Window>,
}

impl<P: PlatformDevice> BoundSerial<'_, P> {
    /// Misc device name, `serial-<hex base>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn minor(&self) -> Minor {
        self.minor
    }

    /// Unbinds the device.
    pub fn remove(self) {
        drop(self);
    }
}

impl<P> BoundSerial<'_, P>
where
    P: PlatformDevice,
    P::Window: RegisterWindow<Register>,
{
    /// Formatted console output with LF expanded to CRLF, so `write!` works
    /// on a bound device.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> fmt::Result {
        let mut slot = self.port.lock();
        let uart = slot.as_mut().ok_or(fmt::Error)?;
        SerialWriter(uart).write_fmt(args)
    }
}

impl<P: PlatformDevice> Drop for BoundSerial<'_, P> {
    fn drop(&mut self) {
        debug!("{}: unbinding", self.name);
        if let Err(err) = self.misc.lock().deregister(&self.name) {
            warn!("{}: {err}", self.name);
        }
        let uart = self.port.lock().take();
        drop(self.pm.take());
        drop(uart);
        info!("{}: removed", self.name);
    }
}
