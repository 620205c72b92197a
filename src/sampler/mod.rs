// Derived from resid-rs.
// Copyright (c) 2017-2019 Sebastian Jastrzebski <sebby2k@gmail.com>.
// Portions (c) 2004 Dag Lem <resid@nimrod.no>
// Licensed under the GPLv3.

//! Clock/Sampler
//!
//! Steps a chip backend one system clock cycle at a time and converts its
//! cycle-rate output to the host sampling rate. Sample positions are tracked
//! in 16.16 fixed point, carried across calls: clocking `a` cycles and then
//! `b` cycles yields exactly the samples of clocking `a + b` at once.
//!
//! Methods:
//! - `Decimate` - nearest cycle output
//! - `Interpolate` - linear interpolation between the two nearest cycles
//! - `Resample` - Kaiser-windowed sinc FIR over a ring buffer of cycle outputs

mod fir;

use std::fmt;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

pub use fir::{Fir, DEFAULT_PASS_FREQ};

use crate::backend::SidBackend;
use crate::{Result, SidError};
use fir::FIR_SHIFT;

const FIXP_SHIFT: u32 = 16;
const FIXP_MASK: i32 = 0xffff;
const FIXP_HALF: i32 = 1 << (FIXP_SHIFT - 1);

const RING_SIZE: usize = 16384;
const RING_MASK: usize = RING_SIZE - 1;

/// Largest accepted `125 × clock / sampling`; keeps the FIR shorter than
/// the ring buffer.
pub const MAX_RATIO_BOUND: f64 = 16384.0;

/// Output sampling method, chosen at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SamplingMethod {
    /// Nearest-neighbour pick of the cycle output
    Decimate,
    /// Linear interpolation between neighbouring cycles
    Interpolate,
    /// Band-limited sinc resampling
    #[default]
    Resample,
}

impl fmt::Display for SamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingMethod::Decimate => write!(f, "decimate"),
            SamplingMethod::Interpolate => write!(f, "interpolate"),
            SamplingMethod::Resample => write!(f, "resample"),
        }
    }
}

impl FromStr for SamplingMethod {
    type Err = SidError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "decimate" | "fast" => Ok(SamplingMethod::Decimate),
            "interpolate" => Ok(SamplingMethod::Interpolate),
            "resample" | "resample_interpolate" => Ok(SamplingMethod::Resample),
            other => Err(SidError::InvalidConfiguration(format!(
                "unknown sampling method '{other}'"
            ))),
        }
    }
}

/// Check a clock/sampling frequency pair against the resampler limits
pub fn validate_frequencies(clock_freq: f64, sample_freq: f64) -> Result<()> {
    if !clock_freq.is_finite() || clock_freq <= 0.0 {
        return Err(SidError::InvalidConfiguration(format!(
            "clock frequency must be positive, got {clock_freq}"
        )));
    }
    if !sample_freq.is_finite() || sample_freq <= 0.0 {
        return Err(SidError::InvalidConfiguration(format!(
            "sampling frequency must be positive, got {sample_freq}"
        )));
    }
    if sample_freq > clock_freq {
        return Err(SidError::InvalidConfiguration(format!(
            "sampling frequency {sample_freq} Hz exceeds clock frequency {clock_freq} Hz"
        )));
    }
    if 125.0 * clock_freq / sample_freq >= MAX_RATIO_BOUND {
        return Err(SidError::InvalidConfiguration(format!(
            "125 x clock / sampling must stay below {MAX_RATIO_BOUND} \
             (clock {clock_freq} Hz, sampling {sample_freq} Hz)"
        )));
    }
    Ok(())
}

/// Cycle-to-sample converter
#[derive(Debug, Clone)]
pub struct Sampler {
    method: SamplingMethod,
    clock_freq: f64,
    sample_freq: f64,
    /// 16.16 fixed-point cycles per output sample
    cycles_per_sample: i32,
    fir: Option<Fir>,

    // Runtime state
    offset: i32,
    /// Cycles already clocked toward the next sample
    pending: u32,
    prev_sample: i16,
    ring: Vec<i16>,
    ring_index: usize,
}

impl Sampler {
    /// Create a sampler, failing with `InvalidConfiguration` for frequency
    /// pairs outside the resampler limits
    pub fn new(method: SamplingMethod, clock_freq: f64, sample_freq: f64) -> Result<Self> {
        validate_frequencies(clock_freq, sample_freq)?;

        let cycles_per_sample =
            (clock_freq / sample_freq * (1u32 << FIXP_SHIFT) as f64 + 0.5) as i32;
        let fir = match method {
            SamplingMethod::Resample => Some(Fir::design(clock_freq, sample_freq)),
            _ => None,
        };
        if let Some(fir) = &fir {
            info!(
                "resampler FIR: {} taps x {} tables ({clock_freq} Hz -> {sample_freq} Hz)",
                fir.taps(),
                fir.resolution()
            );
        }
        let ring = match method {
            SamplingMethod::Resample => vec![0; RING_SIZE * 2],
            _ => Vec::new(),
        };

        Ok(Sampler {
            method,
            clock_freq,
            sample_freq,
            cycles_per_sample,
            fir,
            offset: 0,
            pending: 0,
            prev_sample: 0,
            ring,
            ring_index: 0,
        })
    }

    /// Sampling method
    pub fn method(&self) -> SamplingMethod {
        self.method
    }

    /// System clock frequency (Hz)
    pub fn clock_frequency(&self) -> f64 {
        self.clock_freq
    }

    /// Output sampling frequency (Hz)
    pub fn sampling_frequency(&self) -> f64 {
        self.sample_freq
    }

    /// Approximate number of samples produced by `cycles` cycles
    pub fn estimate_samples(&self, cycles: u32) -> usize {
        (cycles as f64 * self.sample_freq / self.clock_freq).round() as usize
    }

    /// Drop all sampling history
    pub fn reset(&mut self) {
        self.offset = 0;
        self.pending = 0;
        self.prev_sample = 0;
        self.ring.iter_mut().for_each(|sample| *sample = 0);
        self.ring_index = 0;
    }

    /// Clock `chip` for exactly `cycles` cycles and return the samples that
    /// fell due meanwhile
    pub fn clock<B: SidBackend + ?Sized>(&mut self, chip: &mut B, cycles: u32) -> Vec<i16> {
        let mut samples = Vec::with_capacity(self.estimate_samples(cycles) + 1);
        let mut remaining = cycles;

        loop {
            let next_offset = self.next_sample_offset();
            let due = (next_offset >> FIXP_SHIFT) as u32 - self.pending;
            if due > remaining {
                self.advance(chip, remaining);
                self.pending += remaining;
                break;
            }
            self.advance(chip, due);
            remaining -= due;
            self.pending = 0;

            let sample = match self.method {
                SamplingMethod::Decimate => {
                    self.offset = (next_offset & FIXP_MASK) - FIXP_HALF;
                    chip.output()
                }
                SamplingMethod::Interpolate => {
                    self.offset = next_offset & FIXP_MASK;
                    self.interpolate(chip.output())
                }
                SamplingMethod::Resample => {
                    self.offset = next_offset & FIXP_MASK;
                    self.convolve()
                }
            };
            samples.push(sample);
        }
        samples
    }

    /// Decimation centres sample positions on cycles; interpolation and
    /// the FIR resampler keep a plain fractional position.
    #[inline]
    fn next_sample_offset(&self) -> i32 {
        match self.method {
            SamplingMethod::Decimate => self.offset + self.cycles_per_sample + FIXP_HALF,
            _ => self.offset + self.cycles_per_sample,
        }
    }

    fn advance<B: SidBackend + ?Sized>(&mut self, chip: &mut B, cycles: u32) {
        match self.method {
            SamplingMethod::Decimate => {
                for _ in 0..cycles {
                    chip.clock();
                }
            }
            SamplingMethod::Interpolate => {
                for _ in 0..cycles {
                    self.prev_sample = chip.output();
                    chip.clock();
                }
            }
            SamplingMethod::Resample => {
                for _ in 0..cycles {
                    chip.clock();
                    let output = chip.output();
                    self.ring[self.ring_index] = output;
                    self.ring[self.ring_index + RING_SIZE] = output;
                    self.ring_index = (self.ring_index + 1) & RING_MASK;
                }
            }
        }
    }

    #[inline]
    fn interpolate(&self, now: i16) -> i16 {
        let prev = self.prev_sample as i64;
        let delta = now as i64 - prev;
        saturate(prev + ((self.offset as i64 * delta) >> FIXP_SHIFT))
    }

    fn convolve(&self) -> i16 {
        let Some(fir) = &self.fir else {
            return 0;
        };
        let n = fir.n;
        let res = fir.res as i64;
        let position = self.offset as i64 * res;
        let table_1 = (position >> FIXP_SHIFT) as usize;
        let remainder = position & FIXP_MASK as i64;

        let start_1 = self.ring_index + RING_SIZE - n;
        let v1 = dot(&self.ring[start_1..start_1 + n], fir.table(table_1));

        // Past the last table, wrap to the first one a sample earlier
        let (table_2, start_2) = if table_1 + 1 == fir.res {
            (0, start_1 - 1)
        } else {
            (table_1 + 1, start_1)
        };
        let v2 = dot(&self.ring[start_2..start_2 + n], fir.table(table_2));

        let v = v1 + ((remainder * (v2 - v1)) >> FIXP_SHIFT);
        saturate(v >> FIR_SHIFT)
    }
}

#[inline]
fn dot(samples: &[i16], coefficients: &[i16]) -> i64 {
    samples
        .iter()
        .zip(coefficients)
        .map(|(&s, &c)| s as i64 * c as i64)
        .sum()
}

#[inline]
fn saturate(value: i64) -> i16 {
    value.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}
