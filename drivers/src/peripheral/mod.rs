//! Serial Peripheral Drivers
//!
//! [`AtmelSerial`] drives all three Atmel serial families; each family module
//! only supplies its [`SerialFamily`] description. The console runs on
//! exactly one of them, selected with a Cargo feature; the selected driver is
//! exported as [`ConsoleDevice`].
//!
//! # Available Peripherals
//!
//! - `usart`: Universal Synchronous/Asynchronous Receiver Transmitter
//! - `uart`: Universal Asynchronous Receiver Transmitter
//! - `dbgu`: Debug Unit

use core::marker::PhantomData;
use core::ptr::{read_volatile, write_volatile};

use bitflags::bitflags;

use crate::hal::serial::{ConsoleBackend, PeripheralId};

// Register offsets shared by the three families
const CR_OFFSET: usize = 0x00;
const MR_OFFSET: usize = 0x04;
const IER_OFFSET: usize = 0x08;
const IDR_OFFSET: usize = 0x0C;
const SR_OFFSET: usize = 0x14;
const RHR_OFFSET: usize = 0x18;
const THR_OFFSET: usize = 0x1C;
const BRGR_OFFSET: usize = 0x20;

bitflags! {
    /// CR bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u32 {
        const RSTRX = 1 << 2;
        const RSTTX = 1 << 3;
        const RXEN = 1 << 4;
        const RXDIS = 1 << 5;
        const TXEN = 1 << 6;
        const TXDIS = 1 << 7;
        const RSTSTA = 1 << 8;
    }

    /// SR / IER / IDR bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u32 {
        const RXRDY = 1 << 0;
        const TXRDY = 1 << 1;
        const OVRE = 1 << 5;
        const FRAME = 1 << 6;
        const PARE = 1 << 7;
        const TXEMPTY = 1 << 9;
    }
}

/// What sets one serial family apart from the others.
pub trait SerialFamily {
    /// Family name for diagnostics.
    const NAME: &'static str;

    /// Mode register value for 8N1 in normal channel mode.
    const MODE: u32;

    /// Identity of the instance of this family at `base`.
    fn resolve(base: usize) -> Option<PeripheralId>;
}

/// Console driver for an Atmel serial family.
///
/// The USART, UART and DBGU share the register layout the console uses, so
/// one driver serves all three; `F` supplies the mode and the instance
/// tables.
#[derive(Debug)]
pub struct AtmelSerial<F> {
    base: usize,
    _family: PhantomData<F>,
}

impl<F> AtmelSerial<F> {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }

    fn status(&self) -> Status {
        Status::from_bits_retain(self.read(SR_OFFSET))
    }

    fn wait_for(&self, flag: Status) {
        while !self.status().contains(flag) {
            core::hint::spin_loop();
        }
    }
}

impl<F: SerialFamily> ConsoleBackend for AtmelSerial<F> {
    const FAMILY: &'static str = F::NAME;
    const MODE: u32 = F::MODE;
    const RX_INT_MASK: u32 = Status::RXRDY.bits();

    fn resolve(base: usize) -> Option<PeripheralId> {
        F::resolve(base)
    }

    unsafe fn attach(base: usize) -> Self {
        Self {
            base,
            _family: PhantomData,
        }
    }

    fn init(&self, mode: u32, baud_rate: u32, clock_hz: u32) {
        // Reset and disable receiver and transmitter, clear error flags
        self.write(
            CR_OFFSET,
            (Control::RSTRX | Control::RSTTX | Control::RXDIS | Control::TXDIS | Control::RSTSTA)
                .bits(),
        );
        self.write(IDR_OFFSET, u32::MAX);

        self.write(MR_OFFSET, mode);
        self.write(BRGR_OFFSET, baud_divisor(clock_hz, baud_rate));

        self.write(CR_OFFSET, (Control::RXEN | Control::TXEN).bits());
    }

    fn put_char(&self, c: u8) {
        self.wait_for(Status::TXRDY);
        self.write(THR_OFFSET, c as u32);
    }

    fn is_tx_empty(&self) -> bool {
        self.status().contains(Status::TXEMPTY)
    }

    fn get_char(&self) -> u8 {
        self.wait_for(Status::RXRDY);
        (self.read(RHR_OFFSET) & 0xFF) as u8
    }

    fn is_rx_ready(&self) -> bool {
        self.status().contains(Status::RXRDY)
    }

    fn enable_it(&self, mask: u32) {
        self.write(IER_OFFSET, mask);
    }

    fn disable_it(&self, mask: u32) {
        self.write(IDR_OFFSET, mask);
    }
}

/// Clock divisor for a 16x oversampled baud rate generator.
///
/// Rounds to the nearest divisor and clamps to the 16-bit CD field. A zero
/// divisor disables the generator, so it is never returned.
fn baud_divisor(clock_hz: u32, baud_rate: u32) -> u32 {
    if baud_rate == 0 {
        return 0xFFFF;
    }
    let sample_rate = 16 * baud_rate as u64;
    let cd = (clock_hz as u64 + sample_rate / 2) / sample_rate;
    cd.clamp(1, 0xFFFF) as u32
}

// Console family selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "console-usart")] {
        pub mod usart;
        pub use usart::Usart as ConsoleDevice;
    } else if #[cfg(feature = "console-uart")] {
        pub mod uart;
        pub use uart::Uart as ConsoleDevice;
    } else if #[cfg(feature = "console-dbgu")] {
        pub mod dbgu;
        pub use dbgu::Dbgu as ConsoleDevice;
    } else {
        compile_error!(
            "No console family selected!\n\
            Use: cargo build --features console-dbgu\n\
            Or:  cargo build --features console-usart\n\
            Or:  cargo build --features console-uart"
        );
    }
}

// Ensure only one console family is selected
#[cfg(any(
    all(feature = "console-usart", feature = "console-uart"),
    all(feature = "console-usart", feature = "console-dbgu"),
    all(feature = "console-uart", feature = "console-dbgu"),
))]
compile_error!(
    "Multiple console families selected! Choose only one: console-usart, console-uart OR console-dbgu"
);
