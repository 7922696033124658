//! SAMA5D3 Power Management Controller: peripheral clock gating.

use core::ptr::{read_volatile, write_volatile};

use crate::hal::clock::PeripheralClock;
use crate::hal::serial::PeripheralId;

/// PMC base address.
pub const PMC_BASE: usize = 0xFFFF_FC00;

// Register offsets
const PCER0_OFFSET: usize = 0x10;
const PCDR0_OFFSET: usize = 0x14;
const PCSR0_OFFSET: usize = 0x18;
const PCER1_OFFSET: usize = 0x100;
const PCDR1_OFFSET: usize = 0x104;
const PCSR1_OFFSET: usize = 0x108;
const PCR_OFFSET: usize = 0x10C;

// PCR fields
const PCR_PID_MASK: u32 = 0x3F;
const PCR_DIV_SHIFT: u32 = 16;
const PCR_DIV_MASK: u32 = 0b11 << PCR_DIV_SHIFT;

/// Enable/disable/status register triple and bit for a peripheral.
///
/// IDs 0-31 live in bank 0, 32-63 in bank 1.
fn bank(id: PeripheralId) -> (usize, usize, usize, u32) {
    if id.0 < 32 {
        (PCER0_OFFSET, PCDR0_OFFSET, PCSR0_OFFSET, 1 << id.0)
    } else {
        (PCER1_OFFSET, PCDR1_OFFSET, PCSR1_OFFSET, 1 << (id.0 - 32))
    }
}

/// PMC driver.
#[derive(Debug)]
pub struct Pmc {
    master_clock_hz: u32,
}

impl Pmc {
    /// # Safety
    ///
    /// PMC registers must be mapped. The clock tree must already be running
    /// with the given master clock.
    pub const unsafe fn new(master_clock_hz: u32) -> Self {
        Self { master_clock_hz }
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { read_volatile((PMC_BASE + offset) as *const u32) }
    }

    #[inline]
    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { write_volatile((PMC_BASE + offset) as *mut u32, value) }
    }

    /// Whether the clock of a peripheral is running.
    pub fn is_enabled(&self, id: PeripheralId) -> bool {
        let (_, _, pcsr, bit) = bank(id);
        self.read_reg(pcsr) & bit != 0
    }

    /// Peripheral clock divider selected in PCR (MCK >> div).
    fn divider_shift(&self, id: PeripheralId) -> u32 {
        // A write with CMD clear only selects the peripheral for the read back
        unsafe {
            write_volatile((PMC_BASE + PCR_OFFSET) as *mut u32, id.0 & PCR_PID_MASK);
        }
        (self.read_reg(PCR_OFFSET) & PCR_DIV_MASK) >> PCR_DIV_SHIFT
    }
}

impl PeripheralClock for Pmc {
    fn enable(&mut self, id: PeripheralId) {
        if self.is_enabled(id) {
            return;
        }
        let (pcer, _, _, bit) = bank(id);
        self.write_reg(pcer, bit);
    }

    fn disable(&mut self, id: PeripheralId) {
        let (_, pcdr, _, bit) = bank(id);
        self.write_reg(pcdr, bit);
    }

    fn rate_hz(&self, id: PeripheralId) -> u32 {
        self.master_clock_hz >> self.divider_shift(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_ids_use_bank_zero() {
        assert_eq!(bank(PeripheralId(2)), (0x10, 0x14, 0x18, 1 << 2));
        assert_eq!(bank(PeripheralId(31)).3, 1 << 31);
    }

    #[test]
    fn high_ids_use_bank_one() {
        assert_eq!(bank(PeripheralId(32)), (0x100, 0x104, 0x108, 1));
        assert_eq!(bank(PeripheralId(45)).3, 1 << 13);
    }
}
