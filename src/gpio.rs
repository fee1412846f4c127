//! Low-power GPIO setup. Pins left floating as inputs leak current through their Schmitt
//! triggers, so everything unused goes to analog mode with no pull.

#[cfg(l0)]
use crate::{pac, traits::LowPowerPins, util::with_iop_clock};

/// PA13 (SWDIO) and PA14 (SWCLK).
pub const SWD_PINS: u16 = (1 << 13) | (1 << 14);

/// All 16 pins of a port.
pub const ALL_PINS: u16 = 0xffff;

/// MODER value with each pin in `pins` set to analog (0b11), others untouched.
pub fn moder_analog(moder: u32, pins: u16) -> u32 {
    (0..16)
        .filter(|i| pins & (1 << i) != 0)
        .fold(moder, |acc, i| acc | (0b11 << (i * 2)))
}

/// PUPDR value with pulls cleared on each pin in `pins`, others untouched.
pub fn pupdr_none(pupdr: u32, pins: u16) -> u32 {
    (0..16)
        .filter(|i| pins & (1 << i) != 0)
        .fold(pupdr, |acc, i| acc & !(0b11 << (i * 2)))
}

/// Puts ports A, B and C in analog mode. Each port's clock is only on while it's written.
#[cfg(l0)]
pub struct LowPowerGpio {
    /// Leave the debug pins alone, so a probe can still attach.
    pub keep_swd: bool,
}

#[cfg(l0)]
impl LowPowerGpio {
    pub fn new(keep_swd: bool) -> Self {
        Self { keep_swd }
    }

    /// Pins to put in analog mode on port A.
    pub fn port_a_pins(&self) -> u16 {
        if self.keep_swd {
            ALL_PINS & !SWD_PINS
        } else {
            ALL_PINS
        }
    }
}

#[cfg(l0)]
macro_rules! set_port_analog {
    ($port:ident, $PORT:ident, $pins:expr, $rcc:expr) => {
        with_iop_clock!($port, $rcc, {
            let regs = unsafe { &(*pac::$PORT::ptr()) };
            regs.moder
                .modify(|r, w| unsafe { w.bits(moder_analog(r.bits(), $pins)) });
            regs.pupdr
                .modify(|r, w| unsafe { w.bits(pupdr_none(r.bits(), $pins)) });
        })
    };
}

#[cfg(l0)]
impl LowPowerPins for LowPowerGpio {
    fn configure_low_power(&mut self) {
        let rcc = unsafe { &(*pac::RCC::ptr()) };

        set_port_analog!(a, GPIOA, self.port_a_pins(), rcc);
        set_port_analog!(b, GPIOB, ALL_PINS, rcc);
        set_port_analog!(c, GPIOC, ALL_PINS, rcc);
    }
}
