//! Board Support Drivers
//!
//! This crate provides the serial console of Atmel SAMA5 boards in layers:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait definitions
//! - [`peripheral`]: Serial family drivers (USART, UART, DBGU)
//! - [`platform`]: SoC level drivers and board tables
//! - [`console`]: Console state, receive interrupts and terminal helpers
//!
//! # Build Configuration
//!
//! Exactly one board and one console family are selected with Cargo
//! features:
//!
//! - board: `sama5d3`
//! - console family: `console-dbgu`, `console-usart` or `console-uart`
//!
//! The defaults are `sama5d3` and `console-dbgu`. Selecting another family
//! needs `--no-default-features`.
//!
//! # Usage Example
//!
//! ```ignore
//! use drivers::console::console;
//! use drivers::platform::{CurrentPlatform as Board, Platform};
//!
//! unsafe { Board::init_console(115_200) };
//! console().example_info::<Board>("getting started");
//!
//! console().put_str("Frequency (Hz): ");
//! match console().get_integer_min_max(1, 1_000_000) {
//!     Ok(hz) => drivers::console_println!("using {hz} Hz"),
//!     Err(_) => {} // diagnostic already printed
//! }
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "mock"))]
extern crate alloc;

pub mod console;
pub mod hal;
pub mod peripheral;
pub mod platform;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use console::{Console, ConsoleError, InputError, RxHandler, console};
pub use hal::clock::PeripheralClock;
pub use hal::interrupt::{InterruptController, IrqHandler};
pub use hal::serial::{ConsoleBackend, PeripheralId};
