// Traits used across the library. The hardware-facing ones are the seams the transition
// routines are written against; `clocks::l0::Rcc` implements them over the PAC.

use crate::{
    clocks::{ClockState, MsiRange, Osc, RccError, WaitState},
    power::VoltageScale,
};

/// How long to poll an oscillator's ready flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadyWait {
    /// Spin until the flag sets. A dead oscillator hangs here; that's a hardware fault
    /// software can't recover from, and is left to a watchdog.
    Unbounded,
    /// Give up after this many polls.
    Bounded(u32),
}

/// Register-level capabilities needed to move between clock sources.
pub trait ClockHw {
    /// Mask all maskable interrupts (PRIMASK).
    fn mask_interrupts(&mut self);

    /// Unmask interrupts.
    fn unmask_interrupts(&mut self);

    fn osc_on(&mut self, osc: Osc);

    fn osc_off(&mut self, osc: Osc);

    /// Read the oscillator's ready flag.
    fn osc_ready(&mut self, osc: Osc) -> bool;

    /// Set RCC_ICSCR, MSIRANGE field.
    fn set_msi_range(&mut self, range: MsiRange);

    /// Set FLASH_ACR, LATENCY field.
    fn set_flash_latency(&mut self, ws: WaitState);

    /// Gate the PWR peripheral clock. Required around writes to PWR registers.
    fn pwr_clock(&mut self, enabled: bool);

    /// Set PWR_CR, VOS field. Implementations wait for the regulator to settle.
    fn set_voltage_scale(&mut self, scale: VoltageScale);

    /// Set RCC_CFGR, SW field.
    fn select_sysclk(&mut self, osc: Osc);

    /// Polling policy for `osc_ready`.
    fn ready_wait(&self) -> ReadyWait {
        ReadyWait::Unbounded
    }
}

/// Settings applied once, at boot.
pub trait SystemHw: ClockHw {
    /// Flash prefetch buffer. Off saves a little energy at the cost of speed.
    fn set_prefetch(&mut self, enabled: bool);

    /// Run the regulator in low-power mode during deep sleep (PWR_CR, LPSDSR).
    /// Call with the PWR clock enabled.
    fn set_low_power_deepsleep(&mut self, enabled: bool);

    /// AHB, APB1 and APB2 prescalers to divide-by-1.
    fn set_bus_prescalers_nodiv(&mut self);
}

/// A time base whose period is derived from the core clock, eg SysTick.
pub trait TimeBase {
    /// Called after every clock transition, with interrupts unmasked.
    fn recompute_tick_period(&mut self, clocks: &ClockState);
}

/// Puts unused pins in their lowest-power state.
pub trait LowPowerPins {
    fn configure_low_power(&mut self);
}

/// This trait allows you to return information about a clocks's speeds.
/// It's used for configuring peripherals.
pub trait ClockCfg {
    /// System clock speed, in Hz.
    fn sysclk(&self) -> u32;

    /// HCLK speed, in Hz. Ie AHB bus, core, memory, and DMA.
    fn hclk(&self) -> u32;

    /// Cortex System timer speed, in Hz.
    fn systick(&self) -> u32;

    /// APB1 peripheral clocks speed, in Hz.
    fn apb1(&self) -> u32;

    /// APB1 timer clocks speed, in Hz.
    fn apb1_timer(&self) -> u32;

    /// APB2 peripheral clocks speed, in Hz.
    fn apb2(&self) -> u32;

    /// APB2 timer clocks speed, in Hz.
    fn apb2_timer(&self) -> u32;

    /// Validate that the clocks speeds are all within the acceptable range
    /// for the voltage scale and flash latency in use.
    fn validate_speeds(&self) -> Result<(), RccError>;
}
