//! Power and clock control for STM32L0 MCUs: dynamic voltage and frequency scaling between
//! HSI16 and MSI, low-power GPIO and regulator setup at boot, and standby entry.
//!
//! The clock transitions are written against the [`traits::ClockHw`] trait, and take the
//! [`clocks::ClockState`] they update by reference, so the same sequencing code runs on the
//! chip (with [`clocks::Rcc`], behind a chip feature) and against a fake in host tests.
//!
//! Typical use:
//!
//! ```ignore
//! let dp = pac::Peripherals::take().unwrap();
//! let cp = cortex_m::Peripherals::take().unwrap();
//!
//! let mut rcc = Rcc::new(dp.RCC, dp.FLASH, dp.PWR);
//! let mut pins = LowPowerGpio::new(true);
//! let mut tick = SysTick::new(cp.SYST, 1_000);
//!
//! let mut clocks = os::init(&Config::default(), &mut rcc, &mut pins, &mut tick).unwrap();
//!
//! // Full speed for a burst of work, then back down.
//! clocks.to_hsi16(&mut rcc, &mut tick).unwrap();
//! clocks.to_msi(4_000_000, &mut rcc, &mut tick).unwrap();
//!
//! os::halt();
//! ```

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

use cfg_if::cfg_if;

#[cfg(any(
    all(feature = "l0x1", feature = "l0x2"),
    all(feature = "l0x1", feature = "l0x3"),
    all(feature = "l0x2", feature = "l0x3"),
))]
compile_error!("Select only one of the `l0x1`, `l0x2` and `l0x3` features.");

cfg_if! {
    if #[cfg(feature = "l0x1")] {
        pub use stm32l0::stm32l0x1 as pac;
    } else if #[cfg(feature = "l0x2")] {
        pub use stm32l0::stm32l0x2 as pac;
    } else if #[cfg(feature = "l0x3")] {
        pub use stm32l0::stm32l0x3 as pac;
    }
}

pub mod clocks;
pub mod error;
pub mod gpio;
pub mod low_power;
pub mod os;
pub mod power;
pub mod tick;
pub mod traits;
mod util;

pub use error::{Error, Result};
