//! ARMv7-A (Cortex-A5) support.

pub mod irq;
