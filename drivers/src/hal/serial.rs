//! Serial Console Hardware Abstraction Layer.
//!
//! This module defines the capability set a serial peripheral family must
//! provide to carry the system console, and the identity type used to reach
//! the peripheral's clock gate and interrupt line.

use core::fmt;

/// Numeric peripheral identity.
///
/// Indexes the clock gate in the power management controller and the source
/// line in the interrupt controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeripheralId(pub u32);

impl PeripheralId {
    pub const fn irq(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PeripheralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A known peripheral instance: base address and identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Instance {
    pub base: usize,
    pub id: PeripheralId,
}

impl Instance {
    pub const fn new(base: usize, id: u32) -> Self {
        Self {
            base,
            id: PeripheralId(id),
        }
    }
}

/// Find the identity of the instance at `base` in `table`.
pub fn lookup(table: &[Instance], base: usize) -> Option<PeripheralId> {
    table
        .iter()
        .find(|instance| instance.base == base)
        .map(|instance| instance.id)
}

/// Console backend trait.
///
/// One implementation exists per serial peripheral family. Exactly one of
/// them is compiled into a build (see [`crate::peripheral`]); the console is
/// generic over this trait only so tests can substitute a mock.
///
/// All register operations take `&self`: they are single volatile accesses
/// and the console calls them from both main-line and interrupt context.
pub trait ConsoleBackend: Sized {
    /// Family name for diagnostics.
    const FAMILY: &'static str;

    /// Mode register value: normal channel mode, no parity, 8 data bits.
    const MODE: u32;

    /// Interrupt mask selecting the receive-ready source.
    const RX_INT_MASK: u32;

    /// Resolve a base address to the identity of a known instance of this
    /// family.
    fn resolve(base: usize) -> Option<PeripheralId>;

    /// Bind a driver to the instance at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must be the base address of an instance of this family
    /// - The instance registers must be mapped as device memory
    unsafe fn attach(base: usize) -> Self;

    /// Program mode and baud rate, then enable receiver and transmitter.
    ///
    /// `clock_hz` is the peripheral clock used to derive the baud divisor.
    fn init(&self, mode: u32, baud_rate: u32, clock_hz: u32);

    /// Transmit one byte, waiting for room in the holding register.
    fn put_char(&self, c: u8);

    /// Whether the transmitter has nothing left to shift out.
    fn is_tx_empty(&self) -> bool;

    /// Read the receive holding register.
    ///
    /// Whether this waits for a byte when none is pending is up to the
    /// family driver.
    fn get_char(&self) -> u8;

    /// Whether a received byte is waiting.
    fn is_rx_ready(&self) -> bool;

    /// Unmask interrupt sources.
    fn enable_it(&self, mask: u32);

    /// Mask interrupt sources.
    fn disable_it(&self, mask: u32);
}
