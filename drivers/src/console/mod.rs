//! System console.
//!
//! Character I/O over the serial family selected at build time, plus
//! interrupt-driven receive with a single registered callback.
//!
//! The board owns one [`Console`] (see [`console()`]); tests build their own
//! over a mock backend. A console starts unconfigured, and until
//! [`Console::configure`] has run every operation degrades without touching
//! hardware:
//!
//! | Operation     | Unconfigured      |
//! |---------------|-------------------|
//! | `put_char`    | no-op             |
//! | `is_tx_empty` | `true`            |
//! | `is_rx_ready` | `false`           |
//! | `get_char`    | panic             |
//!
//! # Concurrency
//!
//! The receive dispatch routine runs in interrupt context and may preempt
//! any main-line console call. Backend operations are single register
//! accesses and take no lock. The callback slot is an [`IrqMutex`], so
//! registering a callback from the main line cannot deadlock the dispatch
//! routine.
//!
//! Blocking operations (`get_char` and the helpers in [`terminal`]) spin with
//! no timeout. Never call them from interrupt context, and never while
//! receive interrupts deliver the same stream to a callback.

pub mod dump;
pub mod terminal;

use core::fmt;

use common::sync::IrqMutex;
use spin::Once;

use crate::hal::clock::PeripheralClock;
use crate::hal::interrupt::{InterruptController, IrqHandler, IrqNumber};
use crate::hal::serial::{ConsoleBackend, PeripheralId};
use crate::peripheral::ConsoleDevice;

pub use terminal::InputError;

/// Receive callback. Runs in interrupt context with the received byte.
pub type RxHandler = fn(u8);

/// Console errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// The console has not been configured.
    NotInitialized,
    /// The interrupt controller rejected the request.
    Interrupt,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::NotInitialized => f.write_str("console not configured"),
            ConsoleError::Interrupt => f.write_str("interrupt controller error"),
        }
    }
}

fn interrupt_error<E: fmt::Debug>(err: E) -> ConsoleError {
    log::error!("console: interrupt controller: {err:?}");
    ConsoleError::Interrupt
}

/// Configured peripheral.
struct Port<B> {
    id: PeripheralId,
    base: usize,
    backend: B,
}

/// Console state.
pub struct Console<B: ConsoleBackend> {
    port: Once<Port<B>>,
    rx_handler: IrqMutex<Option<RxHandler>>,
}

impl<B: ConsoleBackend> Console<B> {
    /// Create an unconfigured console.
    pub const fn new() -> Self {
        Self {
            port: Once::new(),
            rx_handler: IrqMutex::new(None),
        }
    }

    /// Bind the console to the peripheral at `base` and start it.
    ///
    /// Resolves the identity of `base`, ungates its clock, and initializes
    /// the peripheral with the family's 8N1 mode at `baud_rate`.
    ///
    /// Configuring an already configured console is a caller error; the
    /// call is ignored.
    ///
    /// # Panics
    ///
    /// If `base` is not a known instance of the selected family.
    pub fn configure<C>(&self, clock: &mut C, base: usize, baud_rate: u32)
    where
        C: PeripheralClock + ?Sized,
    {
        if let Some(port) = self.port.get() {
            log::warn!(
                "console: already configured on {} {:#010x}, ignoring {:#010x}",
                B::FAMILY,
                port.base,
                base
            );
            return;
        }

        let Some(id) = B::resolve(base) else {
            panic!("console: no {} instance at {:#010x}", B::FAMILY, base);
        };

        clock.enable(id);
        let clock_hz = clock.rate_hz(id);

        // SAFETY: `resolve` matched `base` against the family's instances
        let backend = unsafe { B::attach(base) };
        backend.init(B::MODE, baud_rate, clock_hz);

        self.port.call_once(|| Port { id, base, backend });
        log::info!(
            "console: {} {:#010x} (id {}) at {} baud",
            B::FAMILY,
            base,
            id,
            baud_rate
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.port.is_completed()
    }

    /// Identity of the configured peripheral.
    pub fn id(&self) -> Option<PeripheralId> {
        self.port.get().map(|port| port.id)
    }

    /// The configured backend.
    pub fn backend(&self) -> Option<&B> {
        self.port.get().map(|port| &port.backend)
    }

    /// Send one byte. Does nothing while unconfigured.
    pub fn put_char(&self, c: u8) {
        if let Some(port) = self.port.get() {
            port.backend.put_char(c);
        }
    }

    /// Whether the transmitter is idle. `true` while unconfigured.
    pub fn is_tx_empty(&self) -> bool {
        self.port.get().is_none_or(|port| port.backend.is_tx_empty())
    }

    /// Read one byte.
    ///
    /// There is no readiness check here: the caller must have seen
    /// [`is_rx_ready`](Self::is_rx_ready) return `true`, or be running the
    /// receive dispatch. What happens otherwise depends on the backend (the
    /// SAMA5 drivers wait for a byte).
    ///
    /// # Panics
    ///
    /// If the console is not configured.
    pub fn get_char(&self) -> u8 {
        match self.port.get() {
            Some(port) => port.backend.get_char(),
            None => panic!("console: get_char on a console that is not configured"),
        }
    }

    /// Whether a received byte is waiting. `false` while unconfigured.
    pub fn is_rx_ready(&self) -> bool {
        self.port.get().is_some_and(|port| port.backend.is_rx_ready())
    }

    pub fn put_bytes(&self, bytes: &[u8]) {
        for &b in bytes {
            self.put_char(b);
        }
    }

    pub fn put_str(&self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Formatted output, so `write!(console, ...)` works on a shared
    /// reference. Bytes are sent as is, without newline translation.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> fmt::Result {
        fmt::Write::write_fmt(&mut Writer(self), args)
    }

    /// Replace the receive callback. With no callback the dispatch routine
    /// still consumes the byte.
    pub fn set_rx_handler(&self, handler: Option<RxHandler>) {
        self.rx_handler.replace(handler);
    }

    /// The registered receive callback.
    pub fn rx_handler(&self) -> Option<RxHandler> {
        self.rx_handler.get()
    }

    /// Receive dispatch, called on the console's interrupt.
    ///
    /// Reads exactly one byte and hands it to the callback. Returns at once
    /// when no byte is waiting, which covers spurious invocations.
    pub fn dispatch_rx(&self) {
        if !self.is_rx_ready() {
            log::trace!("console: rx interrupt without data");
            return;
        }

        let c = self.get_char();
        // Copied out so the callback runs without the slot locked
        if let Some(handler) = self.rx_handler.get() {
            handler(c);
        }
    }
}

impl<B: ConsoleBackend + Send + Sync + 'static> Console<B> {
    /// Deliver received bytes to `handler` from the console's interrupt.
    ///
    /// Registers the console with `intc` on its peripheral line, stores the
    /// callback, enables the line, and finally unmasks the peripheral's
    /// receive-ready source. On failure the controller and the callback slot
    /// are left as they were.
    ///
    /// `handler` runs in interrupt context and must be short: there is no
    /// buffering, and a byte arriving before it returns may be overwritten.
    pub fn enable_rx_interrupt<I>(
        &'static self,
        intc: &mut I,
        handler: RxHandler,
    ) -> Result<(), ConsoleError>
    where
        I: InterruptController + ?Sized,
    {
        let port = self.port.get().ok_or(ConsoleError::NotInitialized)?;
        let irq = port.id.irq();

        intc.add_handler(irq, self).map_err(interrupt_error)?;
        let previous = self.rx_handler.replace(Some(handler));
        if let Err(err) = intc.enable(irq) {
            if let Err(undo) = intc.remove_handler(irq, self) {
                log::error!("console: cannot deregister from line {irq}: {undo:?}");
            }
            self.rx_handler.replace(previous);
            return Err(interrupt_error(err));
        }
        port.backend.enable_it(B::RX_INT_MASK);

        log::debug!("console: rx interrupt enabled on line {irq}");
        Ok(())
    }

    /// Undo [`enable_rx_interrupt`](Self::enable_rx_interrupt) in reverse
    /// order: mask the peripheral source, disable the line, deregister the
    /// console, then clear the callback.
    pub fn disable_rx_interrupt<I>(&'static self, intc: &mut I) -> Result<(), ConsoleError>
    where
        I: InterruptController + ?Sized,
    {
        let port = self.port.get().ok_or(ConsoleError::NotInitialized)?;
        let irq = port.id.irq();

        port.backend.disable_it(B::RX_INT_MASK);
        intc.disable(irq).map_err(interrupt_error)?;
        intc.remove_handler(irq, self).map_err(interrupt_error)?;
        self.set_rx_handler(None);

        log::debug!("console: rx interrupt disabled on line {irq}");
        Ok(())
    }
}

impl<B: ConsoleBackend> Default for Console<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ConsoleBackend + Send + Sync> IrqHandler for Console<B> {
    fn handle(&self, _irq: IrqNumber) {
        self.dispatch_rx();
    }
}

/// `core::fmt::Write` adapter over a shared console reference.
struct Writer<'a, B: ConsoleBackend>(&'a Console<B>);

impl<B: ConsoleBackend> fmt::Write for Writer<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put_str(s);
        Ok(())
    }
}

// ============================================================================
// Global Console
// ============================================================================

static CONSOLE: Console<ConsoleDevice> = Console::new();

/// The board console.
pub fn console() -> &'static Console<ConsoleDevice> {
    &CONSOLE
}

/// Print to the board console without newline
#[macro_export]
macro_rules! console_print {
    ($($arg:tt)*) => {{
        let _ = $crate::console::console().write_fmt(format_args!($($arg)*));
    }};
}

/// Print to the board console, terminated with CR LF
#[macro_export]
macro_rules! console_println {
    () => { $crate::console_print!("\r\n") };
    ($($arg:tt)*) => {{
        $crate::console_print!($($arg)*);
        $crate::console_print!("\r\n");
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        IntcEvent, MOCK_BASE, MOCK_ID, MockClock, MockIntc, MockSerial, configured_console,
        leak_console,
    };
    use core::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn unconfigured_console_degrades_without_backend() {
        let console: Console<MockSerial> = Console::new();

        console.put_char(b'x');
        assert!(console.is_tx_empty());
        assert!(!console.is_rx_ready());
        assert!(!console.is_initialized());
        assert!(console.backend().is_none());
        assert_eq!(console.id(), None);
    }

    #[test]
    #[should_panic(expected = "not configured")]
    fn get_char_on_unconfigured_console_panics() {
        let console: Console<MockSerial> = Console::new();
        console.get_char();
    }

    #[test]
    #[should_panic(expected = "no MOCK instance")]
    fn configure_with_unknown_base_panics() {
        let console: Console<MockSerial> = Console::new();
        console.configure(&mut MockClock::new(1_000_000), MOCK_BASE + 0x100, 115_200);
    }

    #[test]
    fn configure_gates_clock_then_inits_backend() {
        let console: Console<MockSerial> = Console::new();
        let mut clock = MockClock::new(66_000_000);

        console.configure(&mut clock, MOCK_BASE, 57_600);

        assert!(console.is_initialized());
        assert_eq!(console.id(), Some(MOCK_ID));
        assert_eq!(clock.enabled(), [MOCK_ID]);
        let init = console.backend().unwrap().init_args().unwrap();
        assert_eq!(init.mode, MockSerial::MODE);
        assert_eq!(init.baud_rate, 57_600);
        assert_eq!(init.clock_hz, 66_000_000);
    }

    #[test]
    fn second_configure_is_ignored() {
        let console = configured_console();
        let mut clock = MockClock::new(1);

        console.configure(&mut clock, MOCK_BASE, 9_600);

        assert!(clock.enabled().is_empty());
        assert_eq!(console.backend().unwrap().init_args().unwrap().baud_rate, 115_200);
    }

    #[test]
    fn configured_console_forwards_to_backend() {
        let console = configured_console();
        let serial = console.backend().unwrap();

        console.put_str("ok");
        assert_eq!(serial.tx(), b"ok");

        assert!(!console.is_rx_ready());
        serial.inject_rx(b"z");
        assert!(console.is_rx_ready());
        assert_eq!(console.get_char(), b'z');

        serial.set_tx_busy(true);
        assert!(!console.is_tx_empty());
    }

    #[test]
    fn write_sends_bytes_untranslated() {
        let console = configured_console();
        write!(console, "{}-{:02x}\n", 7, 0xAB).unwrap();
        assert_eq!(console.backend().unwrap().tx(), b"7-ab\n");
    }

    static LAST_BYTE: AtomicU32 = AtomicU32::new(0);
    static CALLS: AtomicU32 = AtomicU32::new(0);

    fn record(c: u8) {
        LAST_BYTE.store(c as u32, Ordering::SeqCst);
        CALLS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn rx_interrupt_cycle() {
        let console = configured_console();
        let serial = console.backend().unwrap();
        let mut intc = MockIntc::new();
        let irq = MOCK_ID.irq();

        console.enable_rx_interrupt(&mut intc, record).unwrap();
        assert_eq!(intc.events(), [IntcEvent::Added(irq), IntcEvent::Enabled(irq)]);
        assert_eq!(serial.interrupt_mask(), MockSerial::RX_INT_MASK);
        assert!(console.rx_handler().is_some());

        let before = CALLS.load(Ordering::SeqCst);
        serial.inject_rx(b"k");
        assert!(intc.fire(irq));
        assert_eq!(LAST_BYTE.load(Ordering::SeqCst), b'k' as u32);
        assert_eq!(CALLS.load(Ordering::SeqCst), before + 1);

        console.disable_rx_interrupt(&mut intc).unwrap();
        assert_eq!(
            intc.events()[2..],
            [IntcEvent::Disabled(irq), IntcEvent::Removed(irq)]
        );
        assert_eq!(serial.interrupt_mask(), 0);
        assert!(!intc.is_enabled(irq).unwrap());
        assert!(console.rx_handler().is_none());

        serial.inject_rx(b"q");
        assert!(!intc.fire(irq));
        assert_eq!(serial.rx_pending(), 1);
    }

    #[test]
    fn enable_rx_interrupt_requires_configuration() {
        let console = leak_console();
        let mut intc = MockIntc::new();

        assert_eq!(
            console.enable_rx_interrupt(&mut intc, record),
            Err(ConsoleError::NotInitialized)
        );
        assert!(intc.events().is_empty());
    }

    #[test]
    fn enable_rx_interrupt_reports_controller_errors() {
        let first = configured_console();
        let second = configured_console();
        let mut intc = MockIntc::new();

        first.enable_rx_interrupt(&mut intc, record).unwrap();
        assert_eq!(
            second.enable_rx_interrupt(&mut intc, record),
            Err(ConsoleError::Interrupt)
        );
        assert_eq!(
            second.disable_rx_interrupt(&mut intc),
            Err(ConsoleError::Interrupt)
        );
    }

    static KEPT: AtomicU32 = AtomicU32::new(0);
    static REFUSED: AtomicU32 = AtomicU32::new(0);

    #[test]
    fn refused_enable_keeps_the_live_callback() {
        fn kept(_: u8) {
            KEPT.fetch_add(1, Ordering::SeqCst);
        }
        fn refused(_: u8) {
            REFUSED.fetch_add(1, Ordering::SeqCst);
        }

        let console = configured_console();
        let serial = console.backend().unwrap();
        let mut intc = MockIntc::new();
        let irq = MOCK_ID.irq();

        console.enable_rx_interrupt(&mut intc, kept).unwrap();
        assert_eq!(
            console.enable_rx_interrupt(&mut intc, refused),
            Err(ConsoleError::Interrupt)
        );

        serial.inject_rx(b"k");
        assert!(intc.fire(irq));
        assert_eq!(KEPT.load(Ordering::SeqCst), 1);
        assert_eq!(REFUSED.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_line_enable_rolls_back_registration() {
        let console = configured_console();
        let serial = console.backend().unwrap();
        let mut intc = MockIntc::new();
        let irq = MOCK_ID.irq();

        intc.set_reject_enable(true);
        assert_eq!(
            console.enable_rx_interrupt(&mut intc, record),
            Err(ConsoleError::Interrupt)
        );
        assert_eq!(intc.events(), [IntcEvent::Added(irq), IntcEvent::Removed(irq)]);
        assert!(!intc.has_handler(irq));
        assert!(console.rx_handler().is_none());
        assert_eq!(serial.interrupt_mask(), 0);

        // Nothing left behind blocks a later attempt
        intc.set_reject_enable(false);
        console.enable_rx_interrupt(&mut intc, record).unwrap();
        assert!(intc.has_handler(irq));
        assert!(console.rx_handler().is_some());
    }

    #[test]
    fn dispatch_without_data_reads_nothing() {
        let console = configured_console();
        console.set_rx_handler(Some(record));

        console.dispatch_rx();

        assert_eq!(console.backend().unwrap().reads(), 0);
    }

    #[test]
    fn dispatch_without_handler_still_consumes_one_byte() {
        let console = configured_console();
        let serial = console.backend().unwrap();
        serial.inject_rx(b"ab");

        console.dispatch_rx();

        assert_eq!(serial.rx_pending(), 1);
    }

    static FIRST: AtomicU32 = AtomicU32::new(0);
    static SECOND: AtomicU32 = AtomicU32::new(0);

    #[test]
    fn handler_registration_replaces() {
        fn first(_: u8) {
            FIRST.fetch_add(1, Ordering::SeqCst);
        }
        fn second(_: u8) {
            SECOND.fetch_add(1, Ordering::SeqCst);
        }

        let console = configured_console();
        console.set_rx_handler(Some(first));
        console.set_rx_handler(Some(second));
        console.backend().unwrap().inject_rx(b"x");

        console.dispatch_rx();

        assert_eq!(FIRST.load(Ordering::SeqCst), 0);
        assert_eq!(SECOND.load(Ordering::SeqCst), 1);
    }
}
