//! This minimal example brings the MCU up in its low-power operating point, bursts to
//! HSI16 and back a few times, then drops into standby. It demonstrates project
//! structure, printing text to the console, and the clock transitions.

#![deny(warnings)]
#![no_std]
#![no_main]

use cortex_m_rt::{entry, exception}; // The runtime

use hal::{
    clocks::Rcc,
    gpio::LowPowerGpio,
    os::{self, Config},
    pac,
    tick::SysTick,
    traits::ClockCfg,
};

// Import the panic handler
use panic_probe as _;

// This marks the entrypoint of our application.

#[entry]
fn main() -> ! {
    rtt_target::rtt_init_defmt!();
    // Set up microcontroller peripherals
    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = pac::Peripherals::take().unwrap();

    defmt::println!("Hello, world!");

    let mut rcc = Rcc::new(dp.RCC, dp.FLASH, dp.PWR);
    // Keep SWD alive so the probe stays attached.
    let mut pins = LowPowerGpio::new(true);
    let mut tick = SysTick::new(cp.SYST, 1_000);

    let mut clocks = os::init(&Config::default(), &mut rcc, &mut pins, &mut tick).unwrap();
    defmt::println!("Running at {} Hz", clocks.hclk());

    for _ in 0..3 {
        clocks.to_hsi16(&mut rcc, &mut tick).unwrap();
        busy_wait(clocks.hclk());

        clocks.to_msi(os::DEFAULT_MSI_TARGET, &mut rcc, &mut tick).unwrap();
        busy_wait(clocks.hclk());
    }

    defmt::println!("Entering standby.");
    os::halt();

    os::panic()
}

#[exception]
fn SysTick() {}

/// Spin for about 100ms at `hclk`. SysTick is owned by the time base, so use cycle counting.
fn busy_wait(hclk: u32) {
    cortex_m::asm::delay(hclk / 10);
}

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
