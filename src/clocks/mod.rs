//! Clock config for STM32L0 MCUs: which oscillator drives SYSCLK, and the bus speeds
//! that result. The cached [`ClockState`] is the single source of truth for the current
//! operating point; only the transitions in [`dvfs`] change it.

use crate::{power::VoltageScale, traits::ClockCfg};

pub mod dvfs;
#[cfg(l0)]
pub mod l0;
pub mod msi;

#[cfg(l0)]
pub use l0::Rcc;
pub use msi::{MSI_STEPS, MsiRange, MsiStep, select_step};

/// HSI16 output, in Hz.
pub const HSI16_FREQ: u32 = 16_000_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RccError {
    /// The bus clock is out of range for the voltage scale and flash latency in use.
    Speed,
    /// AHB, APB1 and APB2 disagree. They're always run undivided.
    Bus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// An oscillator that can drive SYSCLK.
pub enum Osc {
    Msi,
    Hsi16,
}

impl Osc {
    /// Value for the RCC_CFGR register, SW field. L0 RM, 7.3.3.
    pub fn sw_bits(&self) -> u8 {
        match self {
            Self::Msi => 0b00,
            Self::Hsi16 => 0b01,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// The input source for the system and peripheral clocks.
pub enum InputSrc {
    /// Fixed 16Mhz internal oscillator.
    Hsi16,
    /// Multi-speed internal oscillator, at one of its discrete ranges.
    Msi(MsiRange),
}

impl InputSrc {
    pub fn osc(&self) -> Osc {
        match self {
            Self::Hsi16 => Osc::Hsi16,
            Self::Msi(_) => Osc::Msi,
        }
    }

    /// Oscillator output, in Hz.
    pub fn freq(&self) -> u32 {
        match self {
            Self::Hsi16 => HSI16_FREQ,
            Self::Msi(range) => range.value(),
        }
    }

    /// The regulator scale this source runs at.
    pub fn voltage_scale(&self) -> VoltageScale {
        match self {
            // Range 2 is enough for 16Mhz with 1 WS; range 1 would only burn current.
            Self::Hsi16 => VoltageScale::Range2,
            Self::Msi(_) => VoltageScale::Range3,
        }
    }

    /// The flash latency this source runs with.
    pub fn wait_state(&self) -> WaitState {
        match self {
            Self::Hsi16 => WaitState::W1,
            Self::Msi(_) => WaitState::W0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
/// Represents Flash wait states in the FLASH_ACR register. L0 only has 0 or 1.
pub enum WaitState {
    W0 = 0,
    W1 = 1,
}

/// The current operating point. All three bus clocks run undivided from SYSCLK, so they're
/// always equal to the active oscillator's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    source: InputSrc,
    ahb: u32,
    apb1: u32,
    apb2: u32,
}

impl ClockState {
    /// The state out of reset: MSI at range 5, ~2.1Mhz.
    pub const fn reset() -> Self {
        let freq = MsiRange::R2M.value();
        Self {
            source: InputSrc::Msi(MsiRange::R2M),
            ahb: freq,
            apb1: freq,
            apb2: freq,
        }
    }

    pub fn source(&self) -> InputSrc {
        self.source
    }

    pub fn ahb(&self) -> u32 {
        self.ahb
    }

    pub fn voltage_scale(&self) -> VoltageScale {
        self.source.voltage_scale()
    }

    pub fn wait_state(&self) -> WaitState {
        self.source.wait_state()
    }

    /// Record a completed switch. Only the transition routines call this.
    pub(crate) fn set_source(&mut self, source: InputSrc) {
        let freq = source.freq();
        self.source = source;
        self.ahb = freq;
        self.apb1 = freq;
        self.apb2 = freq;
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::reset()
    }
}

impl ClockCfg for ClockState {
    fn sysclk(&self) -> u32 {
        self.source.freq()
    }

    fn hclk(&self) -> u32 {
        self.ahb
    }

    fn systick(&self) -> u32 {
        // SysTick runs from the core clock; no /8.
        self.ahb
    }

    fn apb1(&self) -> u32 {
        self.apb1
    }

    fn apb1_timer(&self) -> u32 {
        // Timer clocks are only doubled when the APB prescaler divides.
        self.apb1
    }

    fn apb2(&self) -> u32 {
        self.apb2
    }

    fn apb2_timer(&self) -> u32 {
        self.apb2
    }

    fn validate_speeds(&self) -> Result<(), RccError> {
        if self.ahb != self.apb1 || self.ahb != self.apb2 || self.ahb != self.sysclk() {
            return Err(RccError::Bus);
        }

        if !self.voltage_scale().supports(self.ahb, self.wait_state()) {
            return Err(RccError::Speed);
        }

        Ok(())
    }
}
