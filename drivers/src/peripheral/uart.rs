//! UART Console Driver
//!
//! The UART has no character-length field: frames are always 8 bits. The
//! console programs normal channel mode and no parity.

use bitflags::bitflags;

use super::{AtmelSerial, SerialFamily};
use crate::hal::serial::{PeripheralId, lookup};
use crate::platform::{CurrentPlatform, Platform};

bitflags! {
    /// UART_MR fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mode: u32 {
        const PAR_NO = 0b100 << 9;
        const CHMODE_NORMAL = 0;
    }
}

#[derive(Debug)]
pub struct UartFamily;

impl SerialFamily for UartFamily {
    const NAME: &'static str = "UART";
    const MODE: u32 = Mode::CHMODE_NORMAL.bits() | Mode::PAR_NO.bits();

    fn resolve(base: usize) -> Option<PeripheralId> {
        lookup(CurrentPlatform::uart_instances(), base)
    }
}

/// UART driver.
pub type Uart = AtmelSerial<UartFamily>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::serial::ConsoleBackend;

    #[test]
    fn mode_has_no_parity_and_normal_channel() {
        assert_eq!(Uart::MODE, 0x0000_0800);
    }

    #[test]
    fn resolves_only_uart_instances() {
        for instance in CurrentPlatform::uart_instances() {
            assert_eq!(Uart::resolve(instance.base), Some(instance.id));
        }
        for instance in CurrentPlatform::usart_instances() {
            assert_eq!(Uart::resolve(instance.base), None);
        }
    }
}
