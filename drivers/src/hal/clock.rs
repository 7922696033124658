//! Peripheral Clock Hardware Abstraction Layer.

use super::serial::PeripheralId;

/// Peripheral clock gate.
///
/// On Atmel parts every peripheral has a clock enable bit in the power
/// management controller, addressed by its [`PeripheralId`].
pub trait PeripheralClock {
    /// Ungate the clock of a peripheral.
    fn enable(&mut self, id: PeripheralId);

    /// Gate the clock of a peripheral.
    fn disable(&mut self, id: PeripheralId);

    /// Clock rate seen by the peripheral, in Hz.
    fn rate_hz(&self, id: PeripheralId) -> u32;
}
