pub mod irq;
pub mod irq_mutex;
pub use irq::{IrqControl, without_interrupts};
pub use irq_mutex::IrqMutex;
