// Derived from resid-rs.
// Copyright (c) 2017-2019 Sebastian Jastrzebski <sebby2k@gmail.com>.
// Portions (c) 2004 Dag Lem <resid@nimrod.no>
// Licensed under the GPLv3.

//! Band-limiting FIR design
//!
//! Kaiser-windowed sinc tables for the resampler. `res` tables are stored
//! back to back, one per fractional sample position, each `n` taps long;
//! the resampler interpolates linearly between two neighbouring tables.

use std::f64::consts::PI;

/// Passband edge used when the output rate allows it (Hz)
pub const DEFAULT_PASS_FREQ: f64 = 20_000.0;

/// Overall gain applied to the filter to leave headroom
pub const DEFAULT_FILTER_SCALE: f64 = 0.97;

/// Table resolution needed for 16-bit accuracy with interpolated lookup
pub const FIR_RES_INTERPOLATE: f64 = 285.0;

/// Fixed-point shift of the table coefficients
pub const FIR_SHIFT: u32 = 15;

/// Kaiser-windowed sinc tables
#[derive(Debug, Clone, Default)]
pub struct Fir {
    pub(super) data: Vec<i16>,
    /// Taps per table (odd)
    pub(super) n: usize,
    /// Number of tables (power of two)
    pub(super) res: usize,
}

/// Zeroth-order modified Bessel function of the first kind
pub fn i0(x: f64) -> f64 {
    const I0E: f64 = 1e-6;
    let half_x = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut n = 1.0;
    loop {
        let step = half_x / n;
        n += 1.0;
        term *= step * step;
        sum += term;
        if term < I0E * sum {
            break;
        }
    }
    sum
}

impl Fir {
    /// Design the tables for a `clock_freq` to `sample_freq` conversion
    pub fn design(clock_freq: f64, sample_freq: f64) -> Self {
        let samples_per_cycle = sample_freq / clock_freq;
        let cycles_per_sample = clock_freq / sample_freq;

        // 20 kHz passband, narrowed to 90% of Nyquist for low output rates
        let mut pass_freq = DEFAULT_PASS_FREQ;
        if 2.0 * pass_freq / sample_freq >= 0.9 {
            pass_freq = 0.9 * sample_freq / 2.0;
        }

        // 16 bits: -96 dB stopband
        let atten = -20.0 * (1.0 / (1u32 << 16) as f64).log10();
        let dw = (1.0 - 2.0 * pass_freq / sample_freq) * PI;
        let wc = (2.0 * pass_freq / sample_freq + 1.0) * PI / 2.0;

        // Kaiser order estimate (kaiserord); the order is kept even
        let beta = 0.1102 * (atten - 8.7);
        let i0_beta = i0(beta);
        let mut order = ((atten - 7.95) / (2.285 * dw) + 0.5) as usize;
        order += order & 1;

        let n = ((order as f64 * cycles_per_sample) as usize + 1) | 1;

        // Power of two, so a 16.16 sample offset maps onto whole tables
        let res_log2 = (FIR_RES_INTERPOLATE / cycles_per_sample).log2().ceil().max(0.0);
        let res = 1usize << res_log2 as u32;

        let mut data = vec![0i16; n * res];
        let half = (n / 2) as i64;
        let gain = (1u32 << FIR_SHIFT) as f64 * DEFAULT_FILTER_SCALE * samples_per_cycle * wc / PI;

        for (table, taps) in data.chunks_exact_mut(n).enumerate() {
            let fraction = table as f64 / res as f64;
            for (tap, coefficient) in taps.iter_mut().enumerate() {
                let jx = (tap as i64 - half) as f64 - fraction;
                let wt = wc * jx / cycles_per_sample;
                let x = jx / half as f64;
                let kaiser = if x.abs() <= 1.0 {
                    i0(beta * (1.0 - x * x).sqrt()) / i0_beta
                } else {
                    0.0
                };
                let sinc = if wt.abs() >= 1e-6 { wt.sin() / wt } else { 1.0 };
                *coefficient = (gain * sinc * kaiser).round() as i16;
            }
        }

        Fir { data, n, res }
    }

    /// Taps per table
    pub fn taps(&self) -> usize {
        self.n
    }

    /// Number of fractional-position tables
    pub fn resolution(&self) -> usize {
        self.res
    }

    /// Coefficients of table `index`
    pub(super) fn table(&self, index: usize) -> &[i16] {
        &self.data[index * self.n..(index + 1) * self.n]
    }
}
