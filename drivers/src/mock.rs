//! Mock hardware for testing
//!
//! In-memory stand-ins for the serial backend, the clock gate and the
//! interrupt controller, so console behavior can be checked without a board.
//! Receive data is scripted up front with [`MockSerial::inject_rx`]; reading
//! past the script panics instead of spinning, so a test that consumes more
//! input than it provided fails instead of hanging.
//!
//! # Example
//!
//! ```ignore
//! use drivers::mock::configured_console;
//!
//! let console = configured_console();
//! console.backend().unwrap().inject_rx(b"42\r");
//! assert_eq!(console.get_integer(), Ok(42));
//! ```

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;

use spin::Mutex;

use crate::console::Console;
use crate::hal::clock::PeripheralClock;
use crate::hal::interrupt::{InterruptController, IrqHandler, IrqNumber, same_handler};
use crate::hal::serial::{ConsoleBackend, PeripheralId};

/// The only base address [`MockSerial`] resolves.
pub const MOCK_BASE: usize = 0x4000_0000;

/// Identity of the instance at [`MOCK_BASE`].
pub const MOCK_ID: PeripheralId = PeripheralId(7);

/// Baud rate used by [`configured_console`].
pub const MOCK_BAUD: u32 = 115_200;

/// Arguments of the last `init` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InitArgs {
    pub mode: u32,
    pub baud_rate: u32,
    pub clock_hz: u32,
}

#[derive(Debug, Default)]
struct SerialState {
    init: Option<InitArgs>,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    tx_busy: bool,
    interrupt_mask: u32,
    reads: usize,
}

/// Mock serial backend.
#[derive(Debug, Default)]
pub struct MockSerial {
    state: Mutex<SerialState>,
}

impl MockSerial {
    /// Queue bytes for the receiver.
    pub fn inject_rx(&self, data: &[u8]) {
        self.state.lock().rx.extend(data.iter().copied());
    }

    /// Bytes not read yet.
    pub fn rx_pending(&self) -> usize {
        self.state.lock().rx.len()
    }

    /// Number of `get_char` calls so far.
    pub fn reads(&self) -> usize {
        self.state.lock().reads
    }

    /// Everything transmitted so far.
    pub fn tx(&self) -> Vec<u8> {
        self.state.lock().tx.clone()
    }

    /// Transmitted bytes as text (Latin-1).
    pub fn tx_string(&self) -> String {
        self.state.lock().tx.iter().map(|&b| char::from(b)).collect()
    }

    /// Drain the transmit log.
    pub fn take_tx(&self) -> Vec<u8> {
        core::mem::take(&mut self.state.lock().tx)
    }

    /// Make `is_tx_empty` report a transmission in progress.
    pub fn set_tx_busy(&self, busy: bool) {
        self.state.lock().tx_busy = busy;
    }

    /// Currently unmasked interrupt sources.
    pub fn interrupt_mask(&self) -> u32 {
        self.state.lock().interrupt_mask
    }

    pub fn init_args(&self) -> Option<InitArgs> {
        self.state.lock().init
    }
}

impl ConsoleBackend for MockSerial {
    const FAMILY: &'static str = "MOCK";
    const MODE: u32 = 0x0000_08C0;
    const RX_INT_MASK: u32 = 1 << 0;

    fn resolve(base: usize) -> Option<PeripheralId> {
        (base == MOCK_BASE).then_some(MOCK_ID)
    }

    unsafe fn attach(_base: usize) -> Self {
        Self::default()
    }

    fn init(&self, mode: u32, baud_rate: u32, clock_hz: u32) {
        self.state.lock().init = Some(InitArgs {
            mode,
            baud_rate,
            clock_hz,
        });
    }

    fn put_char(&self, c: u8) {
        self.state.lock().tx.push(c);
    }

    fn is_tx_empty(&self) -> bool {
        !self.state.lock().tx_busy
    }

    fn get_char(&self) -> u8 {
        let mut state = self.state.lock();
        state.reads += 1;
        match state.rx.pop_front() {
            Some(c) => c,
            None => {
                drop(state);
                panic!("mock serial: read past the scripted input");
            }
        }
    }

    fn is_rx_ready(&self) -> bool {
        !self.state.lock().rx.is_empty()
    }

    fn enable_it(&self, mask: u32) {
        self.state.lock().interrupt_mask |= mask;
    }

    fn disable_it(&self, mask: u32) {
        self.state.lock().interrupt_mask &= !mask;
    }
}

/// Mock clock gate.
#[derive(Debug)]
pub struct MockClock {
    rate_hz: u32,
    enabled: Vec<PeripheralId>,
}

impl MockClock {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz,
            enabled: Vec::new(),
        }
    }

    /// Peripherals currently ungated, in enable order.
    pub fn enabled(&self) -> Vec<PeripheralId> {
        self.enabled.clone()
    }
}

impl PeripheralClock for MockClock {
    fn enable(&mut self, id: PeripheralId) {
        if !self.enabled.contains(&id) {
            self.enabled.push(id);
        }
    }

    fn disable(&mut self, id: PeripheralId) {
        self.enabled.retain(|&enabled| enabled != id);
    }

    fn rate_hz(&self, _id: PeripheralId) -> u32 {
        self.rate_hz
    }
}

/// Interrupt controller call, as recorded by [`MockIntc`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntcEvent {
    Added(IrqNumber),
    Removed(IrqNumber),
    Enabled(IrqNumber),
    Disabled(IrqNumber),
}

/// Mock interrupt controller errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MockIntcError {
    HandlerBusy(IrqNumber),
    NotRegistered(IrqNumber),
    EnableRejected(IrqNumber),
}

/// Mock interrupt controller.
#[derive(Default)]
pub struct MockIntc {
    handlers: BTreeMap<IrqNumber, &'static dyn IrqHandler>,
    enabled: Vec<IrqNumber>,
    events: Vec<IntcEvent>,
    reject_enable: bool,
}

impl MockIntc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made so far, in order.
    pub fn events(&self) -> Vec<IntcEvent> {
        self.events.clone()
    }

    /// Make `enable` fail until cleared.
    pub fn set_reject_enable(&mut self, reject: bool) {
        self.reject_enable = reject;
    }

    /// Whether a handler is registered on `irq`.
    pub fn has_handler(&self, irq: IrqNumber) -> bool {
        self.handlers.contains_key(&irq)
    }

    /// Raise `irq`. Returns whether a handler ran: the line must be enabled
    /// and have a handler.
    pub fn fire(&self, irq: IrqNumber) -> bool {
        if !self.enabled.contains(&irq) {
            return false;
        }
        match self.handlers.get(&irq) {
            Some(handler) => {
                handler.handle(irq);
                true
            }
            None => false,
        }
    }
}

impl InterruptController for MockIntc {
    type Error = MockIntcError;

    fn add_handler(
        &mut self,
        irq: IrqNumber,
        handler: &'static dyn IrqHandler,
    ) -> Result<(), Self::Error> {
        if self.handlers.contains_key(&irq) {
            return Err(MockIntcError::HandlerBusy(irq));
        }
        self.handlers.insert(irq, handler);
        self.events.push(IntcEvent::Added(irq));
        Ok(())
    }

    fn remove_handler(
        &mut self,
        irq: IrqNumber,
        handler: &'static dyn IrqHandler,
    ) -> Result<(), Self::Error> {
        match self.handlers.get(&irq) {
            Some(&current) if same_handler(current, handler) => {
                self.handlers.remove(&irq);
                self.events.push(IntcEvent::Removed(irq));
                Ok(())
            }
            _ => Err(MockIntcError::NotRegistered(irq)),
        }
    }

    fn enable(&mut self, irq: IrqNumber) -> Result<(), Self::Error> {
        if self.reject_enable {
            return Err(MockIntcError::EnableRejected(irq));
        }
        if !self.enabled.contains(&irq) {
            self.enabled.push(irq);
        }
        self.events.push(IntcEvent::Enabled(irq));
        Ok(())
    }

    fn disable(&mut self, irq: IrqNumber) -> Result<(), Self::Error> {
        self.enabled.retain(|&enabled| enabled != irq);
        self.events.push(IntcEvent::Disabled(irq));
        Ok(())
    }

    fn is_enabled(&self, irq: IrqNumber) -> Result<bool, Self::Error> {
        Ok(self.enabled.contains(&irq))
    }
}

/// A fresh unconfigured console with a `'static` lifetime, as interrupt
/// registration requires. The allocation is leaked.
pub fn leak_console() -> &'static Console<MockSerial> {
    Box::leak(Box::new(Console::new()))
}

/// A leaked console configured on [`MOCK_BASE`] at [`MOCK_BAUD`].
pub fn configured_console() -> &'static Console<MockSerial> {
    let console = leak_console();
    console.configure(&mut MockClock::new(12_000_000), MOCK_BASE, MOCK_BAUD);
    console
}
