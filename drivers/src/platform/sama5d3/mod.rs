mod aic;
mod pmc;

pub use aic::{AIC_BASE, Aic, AicError, SOURCE_COUNT};
pub use pmc::{PMC_BASE, Pmc};

use super::Platform;
use crate::console::{ConsoleError, RxHandler, console};
use crate::hal::interrupt::InterruptController;
use crate::hal::serial::Instance;

/// Processor clock on the reference boards (PLLA / 2).
pub const PROCESSOR_CLOCK_HZ: u32 = 528_000_000;

/// Master clock on the reference boards (processor clock / 4).
pub const MASTER_CLOCK_HZ: u32 = 132_000_000;

// Peripheral identifiers
pub const ID_DBGU: u32 = 2;
pub const ID_USART0: u32 = 12;
pub const ID_USART1: u32 = 13;
pub const ID_USART2: u32 = 14;
pub const ID_USART3: u32 = 15;
pub const ID_UART0: u32 = 16;
pub const ID_UART1: u32 = 17;

// Instance base addresses
pub const USART0_BASE: usize = 0xF001_C000;
pub const USART1_BASE: usize = 0xF002_0000;
pub const UART0_BASE: usize = 0xF002_4000;
pub const USART2_BASE: usize = 0xF802_0000;
pub const USART3_BASE: usize = 0xF802_4000;
pub const UART1_BASE: usize = 0xF802_8000;
pub const DBGU_BASE: usize = 0xFFFF_EE00;

static USARTS: [Instance; 4] = [
    Instance::new(USART0_BASE, ID_USART0),
    Instance::new(USART1_BASE, ID_USART1),
    Instance::new(USART2_BASE, ID_USART2),
    Instance::new(USART3_BASE, ID_USART3),
];

static UARTS: [Instance; 2] = [
    Instance::new(UART0_BASE, ID_UART0),
    Instance::new(UART1_BASE, ID_UART1),
];

pub struct Sama5d3Platform;

impl Platform for Sama5d3Platform {
    fn name() -> &'static str {
        "SAMA5D3-XPLAINED"
    }

    fn chip_name() -> &'static str {
        "SAMA5D3"
    }

    fn processor_clock_hz() -> u32 {
        PROCESSOR_CLOCK_HZ
    }

    fn master_clock_hz() -> u32 {
        MASTER_CLOCK_HZ
    }

    fn usart_instances() -> &'static [Instance] {
        &USARTS
    }

    fn uart_instances() -> &'static [Instance] {
        &UARTS
    }

    fn dbgu_instance() -> Instance {
        Instance::new(DBGU_BASE, ID_DBGU)
    }

    fn console_base() -> usize {
        cfg_if::cfg_if! {
            if #[cfg(feature = "console-usart")] {
                USART1_BASE
            } else if #[cfg(feature = "console-uart")] {
                UART0_BASE
            } else {
                DBGU_BASE
            }
        }
    }

    unsafe fn init_interrupts() {
        let mut aic = unsafe { Aic::new() };
        aic.init();
    }

    unsafe fn init_console(baud_rate: u32) {
        let mut pmc = unsafe { Pmc::new(MASTER_CLOCK_HZ) };
        console().configure(&mut pmc, Self::console_base(), baud_rate);
    }

    fn enable_console_rx(handler: RxHandler) -> Result<(), ConsoleError> {
        // SAFETY: AIC registers are identity mapped on this board
        let mut aic = unsafe { Aic::new() };
        console().enable_rx_interrupt(&mut aic, handler)
    }

    fn disable_console_rx() -> Result<(), ConsoleError> {
        let mut aic = unsafe { Aic::new() };
        console().disable_rx_interrupt(&mut aic)
    }

    fn handle_irq() {
        let mut aic = unsafe { Aic::new() };
        aic.dispatch();
    }
}

const _: () = assert!(ID_UART1 < SOURCE_COUNT as u32);
