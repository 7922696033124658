//! Debug Unit (DBGU) Console Driver
//!
//! The chip has a single DBGU at a fixed address. Besides the serial port
//! the block holds the chip identification registers, which the console
//! leaves alone.

use bitflags::bitflags;

use super::{AtmelSerial, SerialFamily};
use crate::hal::serial::PeripheralId;
use crate::platform::{CurrentPlatform, Platform};

bitflags! {
    /// DBGU_MR fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mode: u32 {
        const PAR_NONE = 0b100 << 9;
        const CHMODE_NORM = 0;
    }
}

#[derive(Debug)]
pub struct DbguFamily;

impl SerialFamily for DbguFamily {
    const NAME: &'static str = "DBGU";
    const MODE: u32 = Mode::CHMODE_NORM.bits() | Mode::PAR_NONE.bits();

    fn resolve(base: usize) -> Option<PeripheralId> {
        let dbgu = CurrentPlatform::dbgu_instance();
        (base == dbgu.base).then_some(dbgu.id)
    }
}

/// DBGU driver.
pub type Dbgu = AtmelSerial<DbguFamily>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::serial::ConsoleBackend;

    #[test]
    fn resolves_the_single_fixed_address() {
        let dbgu = CurrentPlatform::dbgu_instance();
        assert_eq!(Dbgu::resolve(dbgu.base), Some(dbgu.id));
        assert_eq!(Dbgu::resolve(dbgu.base + 0x200), None);
        for instance in CurrentPlatform::uart_instances() {
            assert_eq!(Dbgu::resolve(instance.base), None);
        }
    }

    #[test]
    fn mode_has_no_parity_and_normal_channel() {
        assert_eq!(Dbgu::MODE, 0x0000_0800);
    }
}
