//! Dynamic voltage and frequency scaling: moving SYSCLK between HSI16 and MSI.
//!
//! Flash latency and the regulator's voltage scale have to cover the clock that's actually
//! running at every point during a switch, so the two directions are mirror images:
//! going faster, flash latency and voltage go up *before* the mux moves to the fast clock;
//! going slower, they come down only *after* the mux is on the slow one.
//! L0 RM, section 6.1.4 and 3.7.1.
//!
//! Both transitions run with interrupts masked, so nothing can observe a half-switched
//! state, and notify the time base once they're done.

use super::{ClockState, HSI16_FREQ, InputSrc, MsiRange, MsiStep, Osc};
use crate::{
    error::Result,
    traits::{ClockHw, TimeBase},
    util::{IrqGuard, wait_ready, with_pwr_clock},
};

impl ClockState {
    /// Switch SYSCLK to HSI16 (16Mhz), at voltage range 2 with 1 flash wait state, and turn
    /// MSI off.
    ///
    /// With the default, unbounded ready-wait this can't fail. With a bounded one, an
    /// oscillator that doesn't come up aborts the switch before anything but the oscillator
    /// enable has been touched, and returns `Error::RegisterUnchanged`.
    pub fn to_hsi16<H: ClockHw, T: TimeBase>(&mut self, hw: &mut H, tick: &mut T) -> Result<()> {
        let target = InputSrc::Hsi16;

        {
            let mut hw = IrqGuard::new(hw);

            hw.osc_on(Osc::Hsi16);
            if let Err(e) = wait_ready(&mut *hw, Osc::Hsi16) {
                self.abort(&mut *hw, target);
                return Err(e);
            }

            // Flash timing first: it must already be safe when the faster clock arrives.
            hw.set_flash_latency(target.wait_state());
            with_pwr_clock(&mut *hw, |hw| hw.set_voltage_scale(target.voltage_scale()));

            hw.select_sysclk(Osc::Hsi16);
            hw.osc_off(Osc::Msi);

            self.set_source(target);
        }

        debug!("Clocks: HSI16 at {} Hz", HSI16_FREQ);
        tick.recompute_tick_period(self);
        Ok(())
    }

    /// Switch SYSCLK to MSI, at the range [`select_step`](super::select_step) picks for
    /// `requested_hz`. Drops to voltage range 3 with 0 wait states, and turns HSI16 off.
    /// Returns the step selected.
    ///
    /// Failure modes are as for [`to_hsi16`](Self::to_hsi16).
    pub fn to_msi<H: ClockHw, T: TimeBase>(
        &mut self,
        requested_hz: u32,
        hw: &mut H,
        tick: &mut T,
    ) -> Result<MsiStep> {
        let step = MsiStep::for_request(requested_hz);
        trace!("Clocks: {} Hz requested; MSI step {} Hz", requested_hz, step.freq);

        self.to_msi_range(step.range, hw, tick)?;
        Ok(step)
    }

    /// Switch SYSCLK to MSI at an explicit range. Same sequence as [`to_msi`](Self::to_msi).
    pub fn to_msi_range<H: ClockHw, T: TimeBase>(
        &mut self,
        range: MsiRange,
        hw: &mut H,
        tick: &mut T,
    ) -> Result<()> {
        let target = InputSrc::Msi(range);

        {
            let mut hw = IrqGuard::new(hw);

            hw.set_msi_range(range);
            hw.osc_on(Osc::Msi);
            if let Err(e) = wait_ready(&mut *hw, Osc::Msi) {
                self.abort(&mut *hw, target);
                return Err(e);
            }

            // The slow clock goes live first; HSI16 at range 2 / 1 WS was safe until now.
            hw.select_sysclk(Osc::Msi);
            hw.osc_off(Osc::Hsi16);

            with_pwr_clock(&mut *hw, |hw| hw.set_voltage_scale(target.voltage_scale()));
            hw.set_flash_latency(target.wait_state());

            self.set_source(target);
        }

        debug!("Clocks: MSI at {} Hz", range.value());
        tick.recompute_tick_period(self);
        Ok(())
    }

    /// Move to the operating point `target`, using whichever transition applies.
    pub fn switch_to<H: ClockHw, T: TimeBase>(
        &mut self,
        target: InputSrc,
        hw: &mut H,
        tick: &mut T,
    ) -> Result<()> {
        match target {
            InputSrc::Hsi16 => self.to_hsi16(hw, tick),
            InputSrc::Msi(range) => self.to_msi_range(range, hw, tick),
        }
    }

    /// Undo an oscillator enable that never became ready. Nothing else has been written yet.
    fn abort<H: ClockHw>(&self, hw: &mut H, target: InputSrc) {
        warn!("Clocks: {:?} not ready; switch abandoned", target.osc());

        match (self.source, target) {
            // Re-ranging the MSI we're running from; put the old range back.
            (InputSrc::Msi(prev), InputSrc::Msi(_)) => hw.set_msi_range(prev),
            (InputSrc::Hsi16, InputSrc::Hsi16) => (),
            _ => hw.osc_off(target.osc()),
        }
    }
}
