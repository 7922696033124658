use core::sync::atomic::{Ordering, compiler_fence};

use crate::sync::irq::IrqControl;

/// IRQ mask bit in the CPSR.
const CPSR_I_BIT: u32 = 1 << 7;

/// IRQ masking through the CPSR `I` bit.
///
/// `disable` returns whether IRQs were enabled before the call, so nested
/// critical sections only re-enable on the outermost `restore`. FIQs are
/// left untouched.
///
/// Both sides are compiler barriers: memory accesses inside the critical
/// section stay between `cpsid` and `cpsie`.
pub struct ArmIrq;

impl IrqControl for ArmIrq {
    type State = bool;

    #[inline(always)]
    fn disable() -> bool {
        let cpsr: u32;
        unsafe {
            core::arch::asm!(
                "mrs {0}, cpsr",
                "cpsid i",
                out(reg) cpsr,
                options(nostack)
            );
        }
        compiler_fence(Ordering::SeqCst);
        cpsr & CPSR_I_BIT == 0
    }

    #[inline(always)]
    fn restore(was_enabled: bool) {
        compiler_fence(Ordering::SeqCst);
        if was_enabled {
            unsafe {
                core::arch::asm!("cpsie i", options(nostack));
            }
        }
    }
}
