//! Register-level clock, flash and regulator control for STM32L0, over the PAC.

use cortex_m::{interrupt, register::primask};

use crate::{
    clocks::{MsiRange, Osc, WaitState},
    pac::{FLASH, PWR, RCC},
    power::VoltageScale,
    traits::{ClockHw, SystemHw},
};

/// Owns the RCC, FLASH and PWR register blocks, so the transitions are the only code
/// touching clock source, latency and voltage scale.
pub struct Rcc {
    regs: RCC,
    flash: FLASH,
    pwr: PWR,
    /// Were interrupts enabled when the current transition masked them?
    irq_was_active: bool,
}

impl Rcc {
    pub fn new(regs: RCC, flash: FLASH, pwr: PWR) -> Self {
        Self {
            regs,
            flash,
            pwr,
            irq_was_active: false,
        }
    }

    /// Release the register blocks.
    pub fn free(self) -> (RCC, FLASH, PWR) {
        (self.regs, self.flash, self.pwr)
    }
}

impl ClockHw for Rcc {
    fn mask_interrupts(&mut self) {
        self.irq_was_active = primask::read().is_active();
        interrupt::disable();
    }

    /// Only re-enables interrupts if they were on at `mask_interrupts`, so a transition run
    /// inside a caller's critical section leaves it intact.
    fn unmask_interrupts(&mut self) {
        if self.irq_was_active {
            unsafe { interrupt::enable() }
        }
    }

    fn osc_on(&mut self, osc: Osc) {
        match osc {
            Osc::Msi => self.regs.cr.modify(|_, w| w.msion().set_bit()),
            Osc::Hsi16 => self.regs.cr.modify(|_, w| w.hsi16on().set_bit()),
        }
    }

    fn osc_off(&mut self, osc: Osc) {
        match osc {
            Osc::Msi => self.regs.cr.modify(|_, w| w.msion().clear_bit()),
            Osc::Hsi16 => self.regs.cr.modify(|_, w| w.hsi16on().clear_bit()),
        }
    }

    fn osc_ready(&mut self, osc: Osc) -> bool {
        let cr = self.regs.cr.read();
        match osc {
            Osc::Msi => cr.msirdy().bit_is_set(),
            Osc::Hsi16 => cr.hsi16rdyf().bit_is_set(),
        }
    }

    fn set_msi_range(&mut self, range: MsiRange) {
        self.regs
            .icscr
            .modify(|_, w| w.msirange().bits(range as u8));
    }

    fn set_flash_latency(&mut self, ws: WaitState) {
        self.flash
            .acr
            .modify(|_, w| w.latency().bit(ws == WaitState::W1));
    }

    fn pwr_clock(&mut self, enabled: bool) {
        self.regs.apb1enr.modify(|_, w| w.pwren().bit(enabled));
    }

    fn set_voltage_scale(&mut self, scale: VoltageScale) {
        // RM: VOS may only be written while VOSF is clear, and the new level is in
        // effect once it clears again.
        while self.pwr.csr.read().vosf().bit_is_set() {}
        self.pwr.cr.modify(|_, w| unsafe { w.vos().bits(scale as u8) });
        while self.pwr.csr.read().vosf().bit_is_set() {}
    }

    fn select_sysclk(&mut self, osc: Osc) {
        self.regs
            .cfgr
            .modify(|_, w| w.sw().bits(osc.sw_bits()));
    }
}

impl SystemHw for Rcc {
    fn set_prefetch(&mut self, enabled: bool) {
        self.flash.acr.modify(|_, w| w.prften().bit(enabled));
    }

    fn set_low_power_deepsleep(&mut self, enabled: bool) {
        self.pwr.cr.modify(|_, w| w.lpsdsr().bit(enabled));
    }

    fn set_bus_prescalers_nodiv(&mut self) {
        // HPRE 0xxx and PPREx 0xx: not divided.
        self.regs.cfgr.modify(|_, w| unsafe {
            w.hpre().bits(0);
            w.ppre1().bits(0);
            w.ppre2().bits(0)
        });
    }
}
