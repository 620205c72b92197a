//! SID Hardware Constants
//!
//! Compiled-in lookup tables shared by every chip instance: envelope rate
//! periods, sustain levels, per-model filter cutoff curves and resonance
//! factors, and the noise generator parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named system clock presets (Hz)
pub mod clock {
    /// PAL C64 system clock
    pub const PAL: f64 = 985_248.0;
    /// NTSC C64 system clock
    pub const NTSC: f64 = 1_022_730.0;
}

/// Chip revision, selecting the filter curve and resonance tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ChipModel {
    /// Original NMOS revision (1982)
    #[default]
    #[serde(alias = "mos6581", alias = "6581")]
    MOS6581,
    /// HMOS-II revision (1986)
    #[serde(alias = "mos8580", alias = "8580")]
    MOS8580,
}

impl ChipModel {
    /// Cutoff frequency (Hz) for every 11-bit cutoff register value
    pub fn cutoff_table(&self) -> &'static [u32; CUTOFF_STEPS] {
        match self {
            ChipModel::MOS6581 => &CUTOFF_6581,
            ChipModel::MOS8580 => &CUTOFF_8580,
        }
    }

    /// 1024/Q for every 4-bit resonance value
    pub fn resonance_table(&self) -> &'static [i32; 16] {
        match self {
            ChipModel::MOS6581 => &RESONANCE_6581,
            ChipModel::MOS8580 => &RESONANCE_8580,
        }
    }
}

impl fmt::Display for ChipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipModel::MOS6581 => write!(f, "MOS6581"),
            ChipModel::MOS8580 => write!(f, "MOS8580"),
        }
    }
}

/// Envelope rate counter periods (cycles per level step) for rate 0-15
///
/// Datasheet attack times divided by 256 steps at 1 MHz, plus the one-cycle
/// delay the counter needs to reset.
pub const RATE_COUNTER_PERIOD: [u16; 16] = [
    9, 32, 63, 95, 149, 220, 267, 313, 392, 977, 1954, 3126, 3907, 11720, 19532, 31251,
];

/// Sustain nibble expanded to an 8-bit envelope level
pub const SUSTAIN_LEVEL: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

/// Envelope levels at which the exponential divider period changes,
/// paired with the new period.
pub const EXPONENTIAL_PERIODS: [(u8, u8); 6] = [
    (0xff, 1),
    (0x5d, 2),
    (0x36, 4),
    (0x1a, 8),
    (0x0e, 16),
    (0x06, 30),
];

/// Noise LFSR value after reset
pub const NOISE_LFSR_SEED: u32 = 0x7f_fff8;

/// Noise LFSR width mask (23 bits)
pub const NOISE_LFSR_MASK: u32 = 0x7f_ffff;

/// Noise LFSR feedback taps (bit 22 XOR bit 17)
pub const NOISE_LFSR_TAPS: (u32, u32) = (22, 17);

/// Accumulator bit whose rising edge shifts the noise LFSR
pub const NOISE_CLOCK_BIT: u32 = 19;

/// Phase accumulator width mask (24 bits)
pub const ACCUMULATOR_MASK: u32 = 0xff_ffff;

/// Phase accumulator MSB
pub const ACCUMULATOR_MSB: u32 = 0x80_0000;

/// Cycles a written value stays readable on the data bus
pub const BUS_VALUE_TTL: u32 = 0x2000;

/// Number of distinct 11-bit cutoff register values
pub const CUTOFF_STEPS: usize = 2048;

/// 6581 measured cutoff curve: (register value, Hz)
///
/// Repeated points mark the ends of the curve and the discontinuity
/// between the two resistor ladders at 0x400.
const CUTOFF_POINTS_6581: [(i32, i32); 31] = [
    (0, 220),
    (0, 220),
    (128, 230),
    (256, 250),
    (384, 300),
    (512, 420),
    (640, 780),
    (768, 1600),
    (832, 2300),
    (896, 3200),
    (960, 4300),
    (992, 5000),
    (1008, 5400),
    (1016, 5700),
    (1023, 6000),
    (1023, 6000),
    (1024, 4600),
    (1024, 4600),
    (1032, 4800),
    (1056, 5300),
    (1088, 6000),
    (1120, 6600),
    (1152, 7200),
    (1280, 9500),
    (1408, 12000),
    (1536, 14500),
    (1664, 16000),
    (1792, 17100),
    (1920, 17700),
    (2047, 18000),
    (2047, 18000),
];

/// 8580 measured cutoff curve: (register value, Hz)
const CUTOFF_POINTS_8580: [(i32, i32); 19] = [
    (0, 0),
    (0, 0),
    (128, 800),
    (256, 1600),
    (384, 2500),
    (512, 3300),
    (640, 4100),
    (768, 4800),
    (896, 5600),
    (1024, 6500),
    (1152, 7500),
    (1280, 8400),
    (1408, 9200),
    (1536, 9800),
    (1664, 10500),
    (1792, 11000),
    (1920, 11700),
    (2047, 12500),
    (2047, 12500),
];

/// Expand measured points into a full table by linear interpolation.
const fn interpolate_cutoff<const N: usize>(points: &[(i32, i32); N]) -> [u32; CUTOFF_STEPS] {
    let mut table = [0u32; CUTOFF_STEPS];
    let mut i = 0;
    while i + 1 < N {
        let (x0, y0) = points[i];
        let (x1, y1) = points[i + 1];
        if x1 > x0 {
            let mut x = x0;
            while x <= x1 {
                let y = y0 + (y1 - y0) * (x - x0) / (x1 - x0);
                table[x as usize] = y as u32;
                x += 1;
            }
        }
        i += 1;
    }
    table
}

/// 6581 cutoff frequency (Hz) per register value
pub static CUTOFF_6581: [u32; CUTOFF_STEPS] = interpolate_cutoff(&CUTOFF_POINTS_6581);

/// 8580 cutoff frequency (Hz) per register value
pub static CUTOFF_8580: [u32; CUTOFF_STEPS] = interpolate_cutoff(&CUTOFF_POINTS_8580);

/// 6581 resonance: 1024/Q with Q from 0.707 to 1.707
pub const RESONANCE_6581: [i32; 16] = [
    1448, 1323, 1218, 1128, 1051, 984, 925, 872, 825, 783, 745, 710, 679, 650, 624, 599,
];

/// 8580 resonance: 1024/Q with Q from 0.707 to 2.2
pub const RESONANCE_8580: [i32; 16] = [
    1448, 1268, 1128, 1016, 925, 848, 783, 727, 679, 637, 599, 566, 536, 510, 485, 463,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_table_monotonic() {
        for i in 1..16 {
            assert!(RATE_COUNTER_PERIOD[i] > RATE_COUNTER_PERIOD[i - 1]);
        }
    }

    #[test]
    fn test_cutoff_curve_hits_measured_points() {
        for &(x, y) in CUTOFF_POINTS_8580.iter() {
            assert_eq!(CUTOFF_8580[x as usize], y as u32);
        }
        assert_eq!(CUTOFF_6581[0], 220);
        assert_eq!(CUTOFF_6581[1023], 6000);
        assert_eq!(CUTOFF_6581[1024], 4600);
        assert_eq!(CUTOFF_6581[2047], 18000);
    }

    #[test]
    fn test_cutoff_curve_interpolates_between_points() {
        // Halfway between (128, 800) and (256, 1600)
        assert_eq!(CUTOFF_8580[192], 1200);
        for x in 1..CUTOFF_STEPS {
            assert!(CUTOFF_8580[x] >= CUTOFF_8580[x - 1]);
        }
    }

    #[test]
    fn test_resonance_tables_decrease() {
        for model in [ChipModel::MOS6581, ChipModel::MOS8580] {
            let table = model.resonance_table();
            for i in 1..16 {
                assert!(table[i] < table[i - 1], "{model} resonance step {i}");
            }
        }
    }

    #[test]
    fn test_chip_model_serde_names() {
        assert_eq!(ChipModel::default(), ChipModel::MOS6581);
        assert_eq!(ChipModel::MOS8580.to_string(), "MOS8580");
    }
}
