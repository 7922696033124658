//! Hosted builds.

use crate::sync::irq::IrqControl;

/// Interrupt control for hosted builds, where nothing can preempt the caller.
pub struct HostIrq;

impl IrqControl for HostIrq {
    type State = ();

    #[inline(always)]
    fn disable() {}

    #[inline(always)]
    fn restore(_state: ()) {}
}
