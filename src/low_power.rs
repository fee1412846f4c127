//! This module contains code used to place the MCU in low power modes, and the terminal
//! fault state. Reference section 6.3: `Low-power modes` of the L0 Reference Manual.

use cortex_m::asm::nop;
#[cfg(l0)]
use cortex_m::{Peripherals, asm::wfi};

#[cfg(l0)]
use crate::pac::{PWR, RCC};

/// Turn off the programmable voltage detector and all three wake-up pins. Needs the PWR
/// clock enabled.
#[cfg(l0)]
pub fn disable_wakeup_sources() {
    let pwr = unsafe { &(*PWR::ptr()) };

    pwr.cr.modify(|_, w| w.pvde().clear_bit());
    pwr.csr.modify(|_, w| {
        w.ewup1().clear_bit();
        w.ewup2().clear_bit();
        w.ewup3().clear_bit()
    });
}

/// Enter `Standby` mode: the deepest sleep available. The core, SRAM and most of the
/// regulator power down; wake-up is a reset. L0 RM, table 35.
///
/// The programmable voltage detector and the wake-up pins are disabled first, so only
/// reset, the RTC or the IWDG can bring the MCU back.
#[cfg(l0)]
pub fn standby() {
    let mut scb = unsafe { Peripherals::steal().SCB };
    let rcc = unsafe { &(*RCC::ptr()) };
    let pwr = unsafe { &(*PWR::ptr()) };

    rcc.apb1enr.modify(|_, w| w.pwren().set_bit());

    disable_wakeup_sources();

    // – SLEEPDEEP bit is set in Cortex®-M0+ System Control register
    scb.set_sleepdeep();

    // – PDDS bit is set in Power Control register (PWR_CR)
    // – WUF bit is cleared in Power Control/Status register (PWR_CSR) (Must do this by
    // setting CWUF bit in PWR_CR.)
    pwr.cr.modify(|_, w| {
        w.pdds().set_bit();
        w.cwuf().set_bit()
    });

    wfi();
}

/// Spin forever. Entered on faults nothing can recover from.
pub fn panic() -> ! {
    loop {
        nop();
    }
}

#[cfg(feature = "l0rt")]
mod vectors {
    use cortex_m_rt::{ExceptionFrame, exception};

    #[exception]
    unsafe fn NonMaskableInt() {
        super::panic()
    }

    #[exception]
    unsafe fn HardFault(_ef: &ExceptionFrame) -> ! {
        super::panic()
    }
}
