//! Platform Abstraction Layer
//!
//! This module provides a platform-agnostic interface to the board: the
//! instance tables the console resolves peripheral identities from, the
//! clock figures it reports, and the entry points that wire the global
//! console to the SoC's clock gate and interrupt controller.
//!
//! # Usage
//!
//! ```ignore
//! use drivers::platform::{CurrentPlatform as Board, Platform};
//!
//! unsafe {
//!     Board::init_interrupts();
//!     Board::init_console(115_200);
//! }
//! Board::enable_console_rx(on_key)?;
//!
//! // from the IRQ vector
//! Board::handle_irq();
//! ```

use crate::console::{ConsoleError, RxHandler};
use crate::hal::serial::Instance;

/// Platform trait - implemented by each supported platform
pub trait Platform {
    /// Board name for diagnostics
    fn name() -> &'static str;

    /// Chip name for diagnostics
    fn chip_name() -> &'static str;

    /// Processor clock in Hz
    fn processor_clock_hz() -> u32;

    /// Master (bus) clock in Hz
    fn master_clock_hz() -> u32;

    /// Known USART instances
    fn usart_instances() -> &'static [Instance];

    /// Known UART instances
    fn uart_instances() -> &'static [Instance];

    /// The debug unit
    fn dbgu_instance() -> Instance;

    /// Base address of the instance wired to the board's console connector
    /// for the selected console family.
    fn console_base() -> usize;

    /// Initialize the interrupt controller
    ///
    /// # Safety
    /// Must only be called once, before any interrupt is enabled.
    unsafe fn init_interrupts();

    /// Configure the global console on [`Platform::console_base`].
    ///
    /// # Safety
    /// Must only be called once, with the console pins already muxed.
    unsafe fn init_console(baud_rate: u32);

    /// Route console receive interrupts to `handler`.
    ///
    /// `handler` runs in interrupt context.
    fn enable_console_rx(handler: RxHandler) -> Result<(), ConsoleError>;

    /// Stop console receive interrupts and drop the handler.
    fn disable_console_rx() -> Result<(), ConsoleError>;

    /// Dispatch the interrupt currently signalled by the interrupt
    /// controller. Called from the IRQ exception vector.
    fn handle_irq();
}

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "sama5d3")] {
        pub mod sama5d3;
        pub use sama5d3::Sama5d3Platform as CurrentPlatform;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features sama5d3"
        );
    }
}
