use core::fmt::Debug;

use crate::arch::CpuIrq;

/// Architecture-specific interrupt masking interface.
///
/// Implemented once per architecture in [`crate::arch`].
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore interrupts to a previous state.
    fn restore(state: Self::State);
}

/// Run `f` with CPU interrupts masked, restoring the previous state afterwards.
///
/// Nests correctly: an inner call leaves interrupts masked when it returns if
/// the outer call masked them.
#[inline]
pub fn without_interrupts<R>(f: impl FnOnce() -> R) -> R {
    let state = CpuIrq::disable();
    let result = f();
    CpuIrq::restore(state);
    result
}
