//! CPU architecture selection.
//!
//! [`CpuIrq`] is the [`IrqControl`](crate::sync::irq::IrqControl)
//! implementation for the architecture being compiled. Host builds (unit
//! tests, tooling) get a no-op implementation since there is no interrupt
//! to mask.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "arm")] {
        pub mod arm;
        pub use arm::irq::ArmIrq as CpuIrq;
    } else {
        pub mod host;
        pub use host::HostIrq as CpuIrq;
    }
}
