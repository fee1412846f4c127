//! Boot-time power and clock setup, and the entry points firmware calls to sleep or stop.

use crate::{
    clocks::ClockState,
    error::Result,
    traits::{ClockCfg, LowPowerPins, SystemHw, TimeBase},
    util::with_pwr_clock,
};

pub use crate::low_power::panic;

/// Operating point requested at boot, in Hz. 4Mhz is the best fit for configuring the
/// DW1000 radio; it resolves to the 4_194_304 Hz MSI step.
pub const DEFAULT_MSI_TARGET: u32 = 4_000_000;

/// Settings applied by [`init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Frequency passed to [`ClockState::to_msi`] at boot.
    pub msi_target_hz: u32,
    /// Flash prefetch buffer. Off is slightly slower, but uses less energy.
    pub flash_prefetch: bool,
    /// Keep the regulator in low-power mode while in deep sleep.
    pub low_power_deepsleep: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            msi_target_hz: DEFAULT_MSI_TARGET,
            flash_prefetch: false,
            low_power_deepsleep: true,
        }
    }
}

/// Set up the MCU for low-power operation, and move to the configured MSI operating point.
/// Call once, at boot. Returns the resulting clock state, which the caller owns from here on.
pub fn init<H, P, T>(config: &Config, hw: &mut H, pins: &mut P, tick: &mut T) -> Result<ClockState>
where
    H: SystemHw,
    P: LowPowerPins,
    T: TimeBase,
{
    hw.set_prefetch(config.flash_prefetch);

    pins.configure_low_power();

    with_pwr_clock(hw, |hw| hw.set_low_power_deepsleep(config.low_power_deepsleep));

    // The bus bridges are otherwise idle; any division would only slow the core.
    hw.set_bus_prescalers_nodiv();

    let mut clocks = ClockState::reset();
    let step = clocks.to_msi(config.msi_target_hz, hw, tick)?;
    clocks.validate_speeds()?;

    info!("Power init: MSI at {} Hz", step.freq);
    Ok(clocks)
}

/// Enter standby, the deepest sleep mode. Waking up is a reset; clock state isn't touched.
#[cfg(l0)]
pub fn halt() {
    info!("Entering standby");
    crate::low_power::standby();
}
