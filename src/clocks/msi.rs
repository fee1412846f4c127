//! MSI ranges, and picking one for a requested frequency.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
/// Specify the range of MSI - this is effectively it's oscillation speed.
/// Sets the RCC_ICSCR register, MSIRANGE field.
pub enum MsiRange {
    R65k = 0b000,
    R131k = 0b001,
    R262k = 0b010,
    R524k = 0b011,
    R1M = 0b100,
    R2M = 0b101, // default
    R4M = 0b110,
}

impl MsiRange {
    /// Nominal output, in Hz. These are powers of two, not round numbers.
    pub const fn value(&self) -> u32 {
        match self {
            Self::R65k => 65_536,
            Self::R131k => 131_072,
            Self::R262k => 262_144,
            Self::R524k => 524_288,
            Self::R1M => 1_048_576,
            Self::R2M => 2_097_152,
            Self::R4M => 4_194_304,
        }
    }
}

/// One selectable MSI operating point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MsiStep {
    pub range: MsiRange,
    pub freq: u32,
}

impl MsiStep {
    const fn new(range: MsiRange) -> Self {
        Self {
            range,
            freq: range.value(),
        }
    }

    /// The table entry [`select_step`] picks for `requested_hz`.
    pub fn for_request(requested_hz: u32) -> Self {
        MSI_STEPS[select_step(requested_hz)]
    }
}

/// Available MSI steps, slowest first.
pub const MSI_STEPS: [MsiStep; 7] = [
    MsiStep::new(MsiRange::R65k),
    MsiStep::new(MsiRange::R131k),
    MsiStep::new(MsiRange::R262k),
    MsiStep::new(MsiRange::R524k),
    MsiStep::new(MsiRange::R1M),
    MsiStep::new(MsiRange::R2M),
    MsiStep::new(MsiRange::R4M),
];

const fn strictly_ascending(steps: &[MsiStep]) -> bool {
    if steps.is_empty() {
        return false;
    }
    let mut i = 1;
    while i < steps.len() {
        if steps[i].freq <= steps[i - 1].freq {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    strictly_ascending(&MSI_STEPS),
    "MSI_STEPS must be non-empty and sorted by frequency"
);

/// Index into [`MSI_STEPS`] of the first step strictly faster than `requested_hz`. Past the
/// top of the table, this clamps to the fastest step.
///
/// Note that a request for exactly a step's frequency lands on the *next* step up, eg
/// 1_048_576 selects the 2_097_152 step. Use [`ClockState::to_msi_range`] to pick a range
/// directly.
///
/// [`ClockState::to_msi_range`]: super::ClockState::to_msi_range
pub fn select_step(requested_hz: u32) -> usize {
    MSI_STEPS
        .iter()
        .position(|step| step.freq > requested_hz)
        .unwrap_or(MSI_STEPS.len() - 1)
}
