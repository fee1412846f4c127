//! Clock transitions, run against a fake register backend that records every write.

use std::{cell::RefCell, rc::Rc};

use stm32l0_dvfs::{
    Error,
    clocks::{ClockState, HSI16_FREQ, InputSrc, MsiRange, Osc, WaitState},
    os::{self, Config},
    power::VoltageScale,
    traits::{ClockCfg, ClockHw, LowPowerPins, ReadyWait, SystemHw, TimeBase},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Mask,
    Unmask,
    OscOn(Osc),
    OscOff(Osc),
    Ready(Osc),
    MsiRange(MsiRange),
    Latency(WaitState),
    PwrClock(bool),
    Vos(VoltageScale),
    Sysclk(Osc),
    Prefetch(bool),
    LpDeepsleep(bool),
    PrescalersNodiv,
    PinsLowPower,
    Tick(u32),
}

type Log = Rc<RefCell<Vec<Op>>>;

struct FakeRcc {
    log: Log,
    wait: ReadyWait,
    dead: Option<Osc>,
}

impl FakeRcc {
    fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            wait: ReadyWait::Unbounded,
            dead: None,
        }
    }

    /// An oscillator that never reports ready, polled at most `polls` times.
    fn with_dead_osc(log: &Log, osc: Osc, polls: u32) -> Self {
        Self {
            log: log.clone(),
            wait: ReadyWait::Bounded(polls),
            dead: Some(osc),
        }
    }

    fn push(&self, op: Op) {
        self.log.borrow_mut().push(op);
    }
}

impl ClockHw for FakeRcc {
    fn mask_interrupts(&mut self) {
        self.push(Op::Mask);
    }
    fn unmask_interrupts(&mut self) {
        self.push(Op::Unmask);
    }
    fn osc_on(&mut self, osc: Osc) {
        self.push(Op::OscOn(osc));
    }
    fn osc_off(&mut self, osc: Osc) {
        self.push(Op::OscOff(osc));
    }
    fn osc_ready(&mut self, osc: Osc) -> bool {
        if self.dead == Some(osc) {
            return false;
        }
        self.push(Op::Ready(osc));
        true
    }
    fn set_msi_range(&mut self, range: MsiRange) {
        self.push(Op::MsiRange(range));
    }
    fn set_flash_latency(&mut self, ws: WaitState) {
        self.push(Op::Latency(ws));
    }
    fn pwr_clock(&mut self, enabled: bool) {
        self.push(Op::PwrClock(enabled));
    }
    fn set_voltage_scale(&mut self, scale: VoltageScale) {
        self.push(Op::Vos(scale));
    }
    fn select_sysclk(&mut self, osc: Osc) {
        self.push(Op::Sysclk(osc));
    }
    fn ready_wait(&self) -> ReadyWait {
        self.wait
    }
}

impl SystemHw for FakeRcc {
    fn set_prefetch(&mut self, enabled: bool) {
        self.push(Op::Prefetch(enabled));
    }
    fn set_low_power_deepsleep(&mut self, enabled: bool) {
        self.push(Op::LpDeepsleep(enabled));
    }
    fn set_bus_prescalers_nodiv(&mut self) {
        self.push(Op::PrescalersNodiv);
    }
}

struct FakeTick(Log);

impl TimeBase for FakeTick {
    fn recompute_tick_period(&mut self, clocks: &ClockState) {
        self.0.borrow_mut().push(Op::Tick(clocks.systick()));
    }
}

struct FakePins(Log);

impl LowPowerPins for FakePins {
    fn configure_low_power(&mut self) {
        self.0.borrow_mut().push(Op::PinsLowPower);
    }
}

fn setup() -> (Log, FakeRcc, FakeTick) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let hw = FakeRcc::new(&log);
    let tick = FakeTick(log.clone());
    (log, hw, tick)
}

fn take(log: &Log) -> Vec<Op> {
    log.borrow_mut().drain(..).collect()
}

/// What the chip is actually running at, rebuilt from the register writes in the log.
#[derive(Clone, Copy)]
struct Replay {
    sysclk: Osc,
    msi_range: MsiRange,
    vos: VoltageScale,
    ws: WaitState,
}

impl Replay {
    /// Out of reset: MSI at range 5, voltage range 2, 0 WS.
    fn reset() -> Self {
        Self {
            sysclk: Osc::Msi,
            msi_range: MsiRange::R2M,
            vos: VoltageScale::Range2,
            ws: WaitState::W0,
        }
    }

    fn hclk(&self) -> u32 {
        match self.sysclk {
            Osc::Msi => self.msi_range.value(),
            Osc::Hsi16 => HSI16_FREQ,
        }
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::MsiRange(r) => self.msi_range = r,
            Op::Latency(ws) => self.ws = ws,
            Op::Vos(v) => self.vos = v,
            Op::Sysclk(osc) => self.sysclk = osc,
            _ => (),
        }
    }

    /// Assert the operating point is within the envelope after every write in `ops`.
    fn check_all(&mut self, ops: &[Op]) {
        for (i, op) in ops.iter().enumerate() {
            self.apply(*op);
            assert!(
                self.vos.supports(self.hclk(), self.ws),
                "unsafe after step {i} ({op:?}): {} Hz at {:?} with {:?}",
                self.hclk(),
                self.vos,
                self.ws,
            );
        }
    }
}

#[test]
fn hsi16_transition_sequence() {
    let (log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();

    clocks.to_hsi16(&mut hw, &mut tick).unwrap();

    assert_eq!(
        take(&log),
        vec![
            Op::Mask,
            Op::OscOn(Osc::Hsi16),
            Op::Ready(Osc::Hsi16),
            Op::Latency(WaitState::W1),
            Op::PwrClock(true),
            Op::Vos(VoltageScale::Range2),
            Op::PwrClock(false),
            Op::Sysclk(Osc::Hsi16),
            Op::OscOff(Osc::Msi),
            Op::Unmask,
            Op::Tick(16_000_000),
        ]
    );
}

#[test]
fn msi_transition_sequence() {
    let (log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();
    clocks.to_hsi16(&mut hw, &mut tick).unwrap();
    take(&log);

    let step = clocks.to_msi(4_000_000, &mut hw, &mut tick).unwrap();
    assert_eq!(step.range, MsiRange::R4M);

    assert_eq!(
        take(&log),
        vec![
            Op::Mask,
            Op::MsiRange(MsiRange::R4M),
            Op::OscOn(Osc::Msi),
            Op::Ready(Osc::Msi),
            Op::Sysclk(Osc::Msi),
            Op::OscOff(Osc::Hsi16),
            Op::PwrClock(true),
            Op::Vos(VoltageScale::Range3),
            Op::PwrClock(false),
            Op::Latency(WaitState::W0),
            Op::Unmask,
            Op::Tick(4_194_304),
        ]
    );
}

#[test]
fn state_after_hsi16() {
    let (_log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();

    clocks.to_hsi16(&mut hw, &mut tick).unwrap();

    assert_eq!(clocks.source(), InputSrc::Hsi16);
    assert_eq!(clocks.hclk(), 16_000_000);
    assert_eq!(clocks.apb1(), 16_000_000);
    assert_eq!(clocks.apb2(), 16_000_000);
    assert_eq!(clocks.voltage_scale(), VoltageScale::Range2);
    assert_eq!(clocks.wait_state(), WaitState::W1);
}

#[test]
fn state_after_msi() {
    let (_log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();
    clocks.to_hsi16(&mut hw, &mut tick).unwrap();

    clocks.to_msi(4_000_000, &mut hw, &mut tick).unwrap();

    assert_eq!(clocks.source(), InputSrc::Msi(MsiRange::R4M));
    assert_eq!(clocks.hclk(), 4_194_304);
    assert_eq!(clocks.apb1(), 4_194_304);
    assert_eq!(clocks.apb2(), 4_194_304);
    assert_eq!(clocks.voltage_scale(), VoltageScale::Range3);
    assert_eq!(clocks.wait_state(), WaitState::W0);
}

#[test]
fn exact_step_request_goes_one_step_up() {
    let (_log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();

    let step = clocks.to_msi(1_048_576, &mut hw, &mut tick).unwrap();
    assert_eq!(step.range, MsiRange::R2M);
    assert_eq!(clocks.hclk(), 2_097_152);

    // The explicit-range path isn't subject to the selector.
    clocks.to_msi_range(MsiRange::R1M, &mut hw, &mut tick).unwrap();
    assert_eq!(clocks.hclk(), 1_048_576);
}

#[test]
fn round_trip_matches_direct_transition() {
    let (_log, mut hw, mut tick) = setup();

    let mut direct = ClockState::reset();
    direct.to_msi(4_000_000, &mut hw, &mut tick).unwrap();

    let mut round_trip = ClockState::reset();
    round_trip.to_hsi16(&mut hw, &mut tick).unwrap();
    round_trip.to_msi(4_000_000, &mut hw, &mut tick).unwrap();

    assert_eq!(direct, round_trip);
}

#[test]
fn never_unsafe_mid_transition() {
    let (log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();
    let mut chip = Replay::reset();

    clocks.to_msi(4_000_000, &mut hw, &mut tick).unwrap();
    clocks.to_hsi16(&mut hw, &mut tick).unwrap();
    clocks.to_msi(100_000, &mut hw, &mut tick).unwrap();
    clocks.to_hsi16(&mut hw, &mut tick).unwrap();
    clocks.to_hsi16(&mut hw, &mut tick).unwrap();
    clocks.to_msi(u32::MAX, &mut hw, &mut tick).unwrap();

    chip.check_all(&take(&log));
    assert_eq!(chip.hclk(), clocks.hclk());
    assert_eq!(chip.vos, clocks.voltage_scale());
    assert_eq!(chip.ws, clocks.wait_state());
}

#[test]
fn reversed_ordering_would_be_caught() {
    // Sanity check on the replay: switching to HSI16 before raising latency is unsafe.
    let mut chip = Replay::reset();
    chip.apply(Op::Vos(VoltageScale::Range2));
    chip.apply(Op::Sysclk(Osc::Hsi16));
    assert!(!chip.vos.supports(chip.hclk(), chip.ws));
}

#[test]
fn register_writes_happen_with_interrupts_masked() {
    let (log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();

    clocks.to_hsi16(&mut hw, &mut tick).unwrap();
    clocks.to_msi(500_000, &mut hw, &mut tick).unwrap();

    let mut masked = false;
    for op in take(&log) {
        match op {
            Op::Mask => {
                assert!(!masked);
                masked = true;
            }
            Op::Unmask => {
                assert!(masked);
                masked = false;
            }
            // The time base runs after interrupts are back on.
            Op::Tick(_) => assert!(!masked),
            _ => assert!(masked, "{op:?} written with interrupts enabled"),
        }
    }
    assert!(!masked);
}

#[test]
fn switch_to_dispatches() {
    let (_log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();

    clocks.switch_to(InputSrc::Hsi16, &mut hw, &mut tick).unwrap();
    assert_eq!(clocks.source(), InputSrc::Hsi16);

    clocks
        .switch_to(InputSrc::Msi(MsiRange::R65k), &mut hw, &mut tick)
        .unwrap();
    assert_eq!(clocks.source(), InputSrc::Msi(MsiRange::R65k));
    assert_eq!(clocks.hclk(), 65_536);
}

#[test]
fn dead_hsi16_aborts_cleanly() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut hw = FakeRcc::with_dead_osc(&log, Osc::Hsi16, 10);
    let mut tick = FakeTick(log.clone());
    let mut clocks = ClockState::reset();

    assert_eq!(
        clocks.to_hsi16(&mut hw, &mut tick),
        Err(Error::RegisterUnchanged)
    );

    assert_eq!(clocks, ClockState::reset());
    assert_eq!(
        take(&log),
        vec![
            Op::Mask,
            Op::OscOn(Osc::Hsi16),
            Op::OscOff(Osc::Hsi16),
            Op::Unmask,
        ]
    );
}

#[test]
fn dead_msi_restores_previous_range() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut hw = FakeRcc::with_dead_osc(&log, Osc::Msi, 3);
    let mut tick = FakeTick(log.clone());
    let mut clocks = ClockState::reset();

    assert_eq!(
        clocks.to_msi(4_000_000, &mut hw, &mut tick),
        Err(Error::RegisterUnchanged)
    );

    assert_eq!(clocks, ClockState::reset());
    assert_eq!(
        take(&log),
        vec![
            Op::Mask,
            Op::MsiRange(MsiRange::R4M),
            Op::OscOn(Osc::Msi),
            Op::MsiRange(MsiRange::R2M),
            Op::Unmask,
        ]
    );
}

#[test]
fn dead_msi_from_hsi16_turns_it_back_off() {
    let (log, mut hw, mut tick) = setup();
    let mut clocks = ClockState::reset();
    clocks.to_hsi16(&mut hw, &mut tick).unwrap();
    take(&log);

    let mut hw = FakeRcc::with_dead_osc(&log, Osc::Msi, 3);
    assert_eq!(
        clocks.to_msi(65_536, &mut hw, &mut tick),
        Err(Error::RegisterUnchanged)
    );
    assert_eq!(clocks.source(), InputSrc::Hsi16);
    assert_eq!(
        take(&log),
        vec![
            Op::Mask,
            Op::MsiRange(MsiRange::R131k),
            Op::OscOn(Osc::Msi),
            Op::OscOff(Osc::Msi),
            Op::Unmask,
        ]
    );
}

#[test]
fn init_lands_on_radio_operating_point() {
    let (log, mut hw, mut tick) = setup();
    let mut pins = FakePins(log.clone());

    let clocks = os::init(&Config::default(), &mut hw, &mut pins, &mut tick).unwrap();

    assert_eq!(clocks.source(), InputSrc::Msi(MsiRange::R4M));
    assert_eq!(clocks.hclk(), 4_194_304);
    assert_eq!(clocks.validate_speeds(), Ok(()));

    let ops = take(&log);
    assert_eq!(
        ops[..6],
        [
            Op::Prefetch(false),
            Op::PinsLowPower,
            Op::PwrClock(true),
            Op::LpDeepsleep(true),
            Op::PwrClock(false),
            Op::PrescalersNodiv,
        ]
    );
    assert_eq!(ops[6], Op::Mask);
    assert_eq!(ops.last(), Some(&Op::Tick(4_194_304)));

    let mut chip = Replay::reset();
    chip.check_all(&ops);
}

#[test]
fn init_honours_config() {
    let (log, mut hw, mut tick) = setup();
    let mut pins = FakePins(log.clone());
    let config = Config {
        msi_target_hz: 300_000,
        flash_prefetch: true,
        low_power_deepsleep: false,
    };

    let clocks = os::init(&config, &mut hw, &mut pins, &mut tick).unwrap();

    assert_eq!(clocks.source(), InputSrc::Msi(MsiRange::R524k));
    let ops = take(&log);
    assert!(ops.contains(&Op::Prefetch(true)));
    assert!(ops.contains(&Op::LpDeepsleep(false)));
}
