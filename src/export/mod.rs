//! Audio export of rendered SID output
//!
//! Samples come straight from [`SoundInterfaceDevice::clock`]: signed
//! 16-bit mono at the device sampling frequency.
//!
//! ```no_run
//! use std::time::Duration;
//! use sid6581::export::write_wav;
//! use sid6581::{SidConfig, SoundInterfaceDevice};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sid = SoundInterfaceDevice::new(SidConfig::default())?;
//! let samples = sid.clock(Duration::from_secs(1));
//! write_wav("silence.wav", &samples, 48_000)?;
//! # Ok(())
//! # }
//! ```
//!
//! [`SoundInterfaceDevice::clock`]: crate::SoundInterfaceDevice::clock

mod wav;
pub use wav::*;

/// Peak left after normalization (fraction of full scale)
const NORMALIZE_HEADROOM: f32 = 0.95;

/// Mono 16-bit PCM export options
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Sample rate written to the header
    pub sample_rate: u32,
    /// Scale the loudest peak down to 95% of full scale
    pub normalize: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            normalize: false,
        }
    }
}

impl ExportConfig {
    /// Mono export at `sample_rate`
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    /// Enable normalization
    pub fn normalize(mut self, enable: bool) -> Self {
        self.normalize = enable;
        self
    }
}

/// Scale samples so the peak sits at the normalization headroom; quieter
/// signals are left alone
fn normalize_samples(samples: &mut [i16]) {
    let peak = samples
        .iter()
        .map(|s| s.unsigned_abs())
        .max()
        .unwrap_or(0) as f32;
    let limit = NORMALIZE_HEADROOM * i16::MAX as f32;
    if peak > limit {
        let scale = limit / peak;
        for sample in samples.iter_mut() {
            *sample = (*sample as f32 * scale) as i16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_only_loud_signals() {
        let mut quiet = vec![100, -200, 300];
        normalize_samples(&mut quiet);
        assert_eq!(quiet, vec![100, -200, 300]);

        let mut loud = vec![i16::MIN, 0, i16::MAX];
        normalize_samples(&mut loud);
        let limit = (NORMALIZE_HEADROOM * i16::MAX as f32) as i16;
        assert!(loud.iter().all(|s| s.unsigned_abs() <= limit as u16 + 1));
    }
}
