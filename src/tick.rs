//! SysTick as the system time base. Its reload is derived from HCLK, so it's recomputed
//! after every clock transition.

use cortex_m::peripheral::{SYST, syst::SystClkSource};

use crate::{
    clocks::ClockState,
    traits::{ClockCfg, TimeBase},
};

/// SysTick's reload register is 24 bits wide.
const MAX_RELOAD: u32 = 0x00ff_ffff;

/// Reload value giving `tick_hz` interrupts per second from a `systick_hz` clock. Clamps to
/// the 24-bit range; a tick slower than the counter can represent runs as slow as it can.
/// A `tick_hz` of 0 is treated as 1Hz.
pub fn reload_value(systick_hz: u32, tick_hz: u32) -> u32 {
    (systick_hz / tick_hz.max(1))
        .saturating_sub(1)
        .min(MAX_RELOAD)
}

pub struct SysTick {
    syst: SYST,
    tick_hz: u32,
}

impl SysTick {
    /// Take the SysTick peripheral. It's configured and started on the first
    /// `recompute_tick_period`, ie by the first clock transition.
    pub fn new(mut syst: SYST, tick_hz: u32) -> Self {
        syst.disable_counter();
        syst.set_clock_source(SystClkSource::Core);
        Self { syst, tick_hz }
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn free(self) -> SYST {
        self.syst
    }
}

impl TimeBase for SysTick {
    fn recompute_tick_period(&mut self, clocks: &ClockState) {
        let reload = reload_value(clocks.systick(), self.tick_hz);

        self.syst.disable_counter();
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
    }
}
