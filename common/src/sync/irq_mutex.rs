use core::marker::PhantomData;

use spin::Mutex;

use super::irq::IrqControl;
use crate::arch::CpuIrq;

/// Mutex that masks interrupts for as long as it is held.
///
/// Data shared between main-line code and an interrupt handler must not be
/// guarded by a plain spinlock: if the handler fires while the main line
/// holds the lock, the handler spins forever on a single core. Masking
/// interrupts first makes the handler wait until the critical section ends.
///
/// Access goes through [`IrqMutex::lock`], which takes a closure so the guard
/// is always released before interrupts are restored.
///
/// Not reentrant. Keep critical sections short: every interrupt on the core
/// is deferred while one runs.
pub struct IrqMutex<T, I: IrqControl = CpuIrq> {
    inner: Mutex<T>,
    _irq: PhantomData<I>,
}

// SAFETY: access to `T` is serialized by the inner mutex.
unsafe impl<T: Send, I: IrqControl> Sync for IrqMutex<T, I> {}
unsafe impl<T: Send, I: IrqControl> Send for IrqMutex<T, I> {}

impl<T, I: IrqControl> IrqMutex<T, I> {
    pub const fn new(data: T) -> Self {
        Self {
            inner: Mutex::new(data),
            _irq: PhantomData,
        }
    }

    /// Run `f` with exclusive access to the data and interrupts masked.
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let state = I::disable();
        let result = {
            let mut guard = self.inner.lock();
            f(&mut guard)
        };
        I::restore(state);
        result
    }

    /// Replace the protected value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.lock(|data| core::mem::replace(data, value))
    }
}

impl<T: Copy, I: IrqControl> IrqMutex<T, I> {
    /// Copy the protected value out.
    pub fn get(&self) -> T {
        self.lock(|data| *data)
    }
}
