//! Voltage regulator scaling, and the frequency envelope each scale allows.
//! L0 RM, section 6.1.4: Dynamic voltage scaling management.

use crate::clocks::WaitState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
/// Regulator output level. Sets the PWR_CR register, VOS field.
pub enum VoltageScale {
    /// 1.8V. High performance.
    Range1 = 0b01,
    /// 1.5V. Medium performance; the reset value.
    Range2 = 0b10,
    /// 1.2V. Low power.
    Range3 = 0b11,
}

impl VoltageScale {
    /// Highest HCLK allowed at this scale, in Hz.
    pub const fn max_hclk(&self) -> u32 {
        match self {
            Self::Range1 => 32_000_000,
            Self::Range2 => 16_000_000,
            Self::Range3 => 4_200_000,
        }
    }

    /// Highest HCLK that can run from flash with zero wait states, in Hz.
    /// L0 RM, table 13.
    pub const fn max_hclk_0ws(&self) -> u32 {
        match self {
            Self::Range1 => 16_000_000,
            Self::Range2 => 8_000_000,
            Self::Range3 => 4_200_000,
        }
    }

    /// Flash latency needed to run at `hclk` with this scale, or `None` if the scale
    /// can't support that speed at all.
    pub const fn required_wait_state(&self, hclk: u32) -> Option<WaitState> {
        if hclk > self.max_hclk() {
            None
        } else if hclk > self.max_hclk_0ws() {
            Some(WaitState::W1)
        } else {
            Some(WaitState::W0)
        }
    }

    /// Is running at `hclk` with `ws` flash wait states safe at this scale? Extra wait
    /// states are always safe; too few, or a scale that can't reach `hclk`, are not.
    pub const fn supports(&self, hclk: u32, ws: WaitState) -> bool {
        match self.required_wait_state(hclk) {
            Some(required) => ws as u8 >= required as u8,
            None => false,
        }
    }
}
