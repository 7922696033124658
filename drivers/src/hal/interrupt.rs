//! Interrupt Controller Hardware Abstraction Layer.
//!
//! This module defines platform-independent traits for interrupt management.

/// Interrupt number type.
pub type IrqNumber = u32;

/// A routine the interrupt controller invokes when its line fires.
///
/// `handle` runs in interrupt context: it preempts main-line code and must
/// be short and non-blocking.
pub trait IrqHandler: Sync {
    fn handle(&self, irq: IrqNumber);
}

/// Interrupt controller trait.
///
/// This trait represents the system's interrupt controller, including its
/// table of registered handlers.
pub trait InterruptController {
    /// Error type for interrupt controller operations.
    type Error: core::fmt::Debug;

    /// Register `handler` as the routine for `irq`.
    fn add_handler(
        &mut self,
        irq: IrqNumber,
        handler: &'static dyn IrqHandler,
    ) -> Result<(), Self::Error>;

    /// Remove `handler` from `irq`.
    ///
    /// Fails if `handler` is not the routine currently registered.
    fn remove_handler(
        &mut self,
        irq: IrqNumber,
        handler: &'static dyn IrqHandler,
    ) -> Result<(), Self::Error>;

    /// Enable (unmask) an interrupt line.
    fn enable(&mut self, irq: IrqNumber) -> Result<(), Self::Error>;

    /// Disable (mask) an interrupt line.
    fn disable(&mut self, irq: IrqNumber) -> Result<(), Self::Error>;

    /// Check if an interrupt line is enabled.
    fn is_enabled(&self, irq: IrqNumber) -> Result<bool, Self::Error>;
}

/// Whether two handler references name the same object.
///
/// Only the data address is compared; vtable pointers for one type may differ
/// between codegen units.
pub fn same_handler(a: &dyn IrqHandler, b: &dyn IrqHandler) -> bool {
    core::ptr::addr_eq(a, b)
}
