//! USART Console Driver
//!
//! Drives a USART in asynchronous mode: 8 data bits, no parity, normal
//! channel mode, peripheral clock as baud source.

use bitflags::bitflags;

use super::{AtmelSerial, SerialFamily};
use crate::hal::serial::{PeripheralId, lookup};
use crate::platform::{CurrentPlatform, Platform};

bitflags! {
    /// US_MR fields used by the console.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mode: u32 {
        const CHRL_8_BIT = 0b11 << 6;
        const PAR_NO = 0b100 << 9;
        const CHMODE_NORMAL = 0;
    }
}

#[derive(Debug)]
pub struct UsartFamily;

impl SerialFamily for UsartFamily {
    const NAME: &'static str = "USART";
    const MODE: u32 = Mode::CHMODE_NORMAL.bits() | Mode::PAR_NO.bits() | Mode::CHRL_8_BIT.bits();

    fn resolve(base: usize) -> Option<PeripheralId> {
        lookup(CurrentPlatform::usart_instances(), base)
    }
}

/// USART driver.
pub type Usart = AtmelSerial<UsartFamily>;
