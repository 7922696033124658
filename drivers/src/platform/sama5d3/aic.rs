//! SAMA5D3 Advanced Interrupt Controller Driver
//!
//! The AIC addresses one source at a time through the source select
//! register; mode, vector, enable and disable all act on the selected
//! source. Vectors are programmed with the source number itself and the
//! actual routines live in a software table indexed by it, so reading IVR
//! yields the table index.

use core::fmt;
use core::ptr::{read_volatile, write_volatile};

use common::sync::{IrqMutex, without_interrupts};

use crate::hal::interrupt::{InterruptController, IrqHandler, IrqNumber, same_handler};

/// AIC base address.
pub const AIC_BASE: usize = 0xFFFF_F000;

/// Number of interrupt sources.
pub const SOURCE_COUNT: usize = 50;

// Register offsets
const SSR_OFFSET: usize = 0x00;
const SMR_OFFSET: usize = 0x04;
const SVR_OFFSET: usize = 0x08;
const IVR_OFFSET: usize = 0x10;
const IMR_OFFSET: usize = 0x30;
const EOICR_OFFSET: usize = 0x38;
const SPU_OFFSET: usize = 0x3C;
const IECR_OFFSET: usize = 0x40;
const IDCR_OFFSET: usize = 0x44;
const ICCR_OFFSET: usize = 0x48;

// SMR fields
const SMR_SRCTYPE_INT_LEVEL_SENSITIVE: u32 = 0 << 5;
const SMR_PRIOR_DEFAULT: u32 = 3;

/// Value programmed in SPU, returned by IVR for spurious interrupts.
const SPURIOUS_VECTOR: u32 = 0xFFFF_FFFF;

type HandlerTable = [Option<&'static dyn IrqHandler>; SOURCE_COUNT];

/// Registered routines, indexed by source number.
static HANDLERS: IrqMutex<HandlerTable> = IrqMutex::new([None; SOURCE_COUNT]);

/// AIC errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AicError {
    /// Source number out of range.
    InvalidIrq(IrqNumber),
    /// Another routine is already registered for the source.
    HandlerBusy(IrqNumber),
    /// The routine being removed is not the one registered.
    NotRegistered(IrqNumber),
}

impl fmt::Display for AicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AicError::InvalidIrq(irq) => write!(f, "no interrupt source {irq}"),
            AicError::HandlerBusy(irq) => write!(f, "source {irq} already has a handler"),
            AicError::NotRegistered(irq) => write!(f, "handler not registered on source {irq}"),
        }
    }
}

fn check(irq: IrqNumber) -> Result<usize, AicError> {
    let index = irq as usize;
    if index < SOURCE_COUNT {
        Ok(index)
    } else {
        Err(AicError::InvalidIrq(irq))
    }
}

/// Advanced interrupt controller.
#[derive(Debug)]
pub struct Aic;

impl Aic {
    /// Create a new interrupt controller handle.
    ///
    /// # Safety
    ///
    /// AIC registers must be properly mapped.
    pub const unsafe fn new() -> Self {
        Self
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { read_volatile((AIC_BASE + offset) as *const u32) }
    }

    #[inline]
    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { write_volatile((AIC_BASE + offset) as *mut u32, value) }
    }

    /// Select `irq` and write `value` at `offset` without an interrupt
    /// handler reselecting in between.
    fn write_selected(&mut self, irq: IrqNumber, offset: usize, value: u32) {
        without_interrupts(|| {
            self.write_reg(SSR_OFFSET, irq);
            self.write_reg(offset, value);
        });
    }

    /// Program the spurious vector. Sources keep their reset state.
    pub fn init(&mut self) {
        self.write_reg(SPU_OFFSET, SPURIOUS_VECTOR);
    }

    /// Acknowledge and dispatch the highest priority pending interrupt.
    pub fn dispatch(&mut self) {
        let vector = self.read_reg(IVR_OFFSET);
        if vector == SPURIOUS_VECTOR {
            log::warn!("aic: spurious interrupt");
            self.write_reg(EOICR_OFFSET, 0);
            return;
        }

        let handler = HANDLERS.lock(|table| table.get(vector as usize).copied().flatten());
        match handler {
            Some(handler) => handler.handle(vector),
            None => log::warn!("aic: unhandled interrupt {vector}"),
        }

        self.write_reg(EOICR_OFFSET, 0);
    }
}

impl InterruptController for Aic {
    type Error = AicError;

    fn add_handler(
        &mut self,
        irq: IrqNumber,
        handler: &'static dyn IrqHandler,
    ) -> Result<(), Self::Error> {
        let index = check(irq)?;
        HANDLERS.lock(|table| match table[index] {
            Some(_) => Err(AicError::HandlerBusy(irq)),
            None => {
                table[index] = Some(handler);
                Ok(())
            }
        })?;

        without_interrupts(|| {
            self.write_reg(SSR_OFFSET, irq);
            self.write_reg(IDCR_OFFSET, 1);
            self.write_reg(SMR_OFFSET, SMR_SRCTYPE_INT_LEVEL_SENSITIVE | SMR_PRIOR_DEFAULT);
            self.write_reg(SVR_OFFSET, irq);
            self.write_reg(ICCR_OFFSET, 1);
        });

        log::debug!("aic: handler registered on source {irq}");
        Ok(())
    }

    fn remove_handler(
        &mut self,
        irq: IrqNumber,
        handler: &'static dyn IrqHandler,
    ) -> Result<(), Self::Error> {
        let index = check(irq)?;
        HANDLERS.lock(|table| match table[index] {
            Some(current) if same_handler(current, handler) => {
                table[index] = None;
                Ok(())
            }
            _ => Err(AicError::NotRegistered(irq)),
        })?;

        log::debug!("aic: handler removed from source {irq}");
        Ok(())
    }

    fn enable(&mut self, irq: IrqNumber) -> Result<(), Self::Error> {
        check(irq)?;
        self.write_selected(irq, IECR_OFFSET, 1);
        Ok(())
    }

    fn disable(&mut self, irq: IrqNumber) -> Result<(), Self::Error> {
        check(irq)?;
        self.write_selected(irq, IDCR_OFFSET, 1);
        Ok(())
    }

    fn is_enabled(&self, irq: IrqNumber) -> Result<bool, Self::Error> {
        check(irq)?;
        // IMR reports the mask of the selected source only
        let mask = without_interrupts(|| {
            unsafe { write_volatile((AIC_BASE + SSR_OFFSET) as *mut u32, irq) };
            self.read_reg(IMR_OFFSET)
        });
        Ok(mask & 1 != 0)
    }
}
