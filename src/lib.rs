//! MOS 6581/8580 SID Emulator
//!
//! A discrete-time emulator of the Commodore "Sound Interface Device": three
//! oscillator/envelope voices feeding a resonant multi-mode filter and a
//! master-volume mixer, driven through the chip's 29-register programming
//! model and clocked at the system clock rate.
//!
//! # Features
//! - 24-bit phase accumulators with triangle, sawtooth, pulse and noise
//!   waveforms (combined waveforms are ANDed, as on the chip)
//! - ADSR envelope generators using the datasheet rate table
//! - Hard sync and ring modulation between neighbouring voices
//! - Two-integrator state-variable filter with per-model cutoff curves
//! - Decimating, interpolating and band-limited (Kaiser sinc) resampling
//! - Typed register accessors, musical scale and voice helpers
//!
//! # Crate feature flags
//! - `export-wav` (default): WAV export of rendered samples (`export`)
//! - `cli` (default): the `sid6581` renderer binary
//!
//! # Quick start
//! ```no_run
//! use std::time::Duration;
//! use sid6581::{ControlBits, SidConfig, SoundInterfaceDevice, Tone, Voice};
//!
//! let mut sid = SoundInterfaceDevice::new(SidConfig::default()).unwrap();
//! sid.set_filter_mode_vol(15).unwrap();
//! sid.attack_decay(Voice::One, 0xBE).unwrap();
//! sid.sustain_release(Voice::One, 0xF8).unwrap();
//! sid.tone(Voice::One, Tone::C4).unwrap();
//! sid.control(Voice::One, ControlBits::TRIANGLE | ControlBits::GATE).unwrap();
//! let samples = sid.clock(Duration::from_millis(320));
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod device;
#[cfg(feature = "export-wav")]
pub mod export;
pub mod musical_scale;
pub mod sampler;
pub mod sid; // SID chip emulation (core)

/// Error types for SID emulator operations
#[derive(thiserror::Error, Debug)]
pub enum SidError {
    /// A numeric argument exceeds its documented bit width
    #[error("{name} value {value} out of range (maximum {max})")]
    OutOfRange {
        /// Name of the offending parameter
        name: &'static str,
        /// Value supplied by the caller
        value: u32,
        /// Largest accepted value
        max: u32,
    },

    /// Clock/sampling parameters violate the resampler constraints
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),
}

impl SidError {
    /// Check `value` against an inclusive maximum.
    pub(crate) fn check_range(name: &'static str, value: u32, max: u32) -> Result<u32> {
        if value > max {
            Err(SidError::OutOfRange { name, value, max })
        } else {
            Ok(value)
        }
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, SidError>;

// Public API exports
pub use backend::SidBackend;
pub use device::{SidConfig, SoundInterfaceDevice, Voice, VoiceRegister};
pub use musical_scale::Tone;
pub use sampler::{Sampler, SamplingMethod};
pub use sid::constants::{clock, ChipModel};
pub use sid::registers::{
    AttackDecayBits, ControlBits, ModeVolBits, ReadableRegister, ResFiltBits, SustainReleaseBits,
    WritableRegister,
};
pub use sid::Sid;

#[cfg(feature = "export-wav")]
pub use export::write_wav;
