//! This is an internal module that contains utility functionality used by other modules.

use core::ops::{Deref, DerefMut};

use crate::{
    clocks::Osc,
    error::{Error, Result},
    traits::{ClockHw, ReadyWait},
};

/// Masks interrupts for as long as it's alive, and unmasks them when dropped; including on
/// early returns. Derefs to the hardware it guards, so the critical section is the only
/// path to it.
pub(crate) struct IrqGuard<'a, H: ClockHw> {
    hw: &'a mut H,
}

impl<'a, H: ClockHw> IrqGuard<'a, H> {
    pub fn new(hw: &'a mut H) -> Self {
        hw.mask_interrupts();
        Self { hw }
    }
}

impl<H: ClockHw> Deref for IrqGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.hw
    }
}

impl<H: ClockHw> DerefMut for IrqGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.hw
    }
}

impl<H: ClockHw> Drop for IrqGuard<'_, H> {
    fn drop(&mut self) {
        self.hw.unmask_interrupts();
    }
}

/// Run `f` with the PWR peripheral clock enabled, and gate it again afterwards.
pub(crate) fn with_pwr_clock<H: ClockHw + ?Sized, R>(hw: &mut H, f: impl FnOnce(&mut H) -> R) -> R {
    hw.pwr_clock(true);
    let result = f(hw);
    hw.pwr_clock(false);
    result
}

/// Poll an oscillator's ready flag, per the hardware's wait policy.
pub(crate) fn wait_ready<H: ClockHw + ?Sized>(hw: &mut H, osc: Osc) -> Result<()> {
    match hw.ready_wait() {
        ReadyWait::Unbounded => {
            while !hw.osc_ready(osc) {}
            Ok(())
        }
        ReadyWait::Bounded(max_polls) => {
            for _ in 0..max_polls {
                if hw.osc_ready(osc) {
                    return Ok(());
                }
            }
            Err(Error::RegisterUnchanged)
        }
    }
}

/// Enables a peripheral's clock on the IOPENR register, runs the block, then gates it again.
/// The first argument is the port letter, eg `a`, and the second a `pac::RCC`.
#[cfg(l0)]
macro_rules! with_iop_clock {
    ($port:ident, $rcc:expr, $body:block) => {
        paste::paste! {
            $rcc.iopenr.modify(|_, w| w.[<iop $port en>]().set_bit());
            $body
            $rcc.iopenr.modify(|_, w| w.[<iop $port en>]().clear_bit());
        }
    };
}

#[cfg(l0)]
pub(crate) use with_iop_clock;
