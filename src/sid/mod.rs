//! SID Emulation Domain
//!
//! Core MOS 6581/8580 emulation: register file, waveform and envelope
//! generators, cross-voice coupling, the multimode filter and the output
//! mixer.
//!
//! Implementation:
//! - `chip` - one-cycle stepping of the whole chip and register dispatch

// Internal modules
pub mod chip;
pub mod constants;
pub mod coupler;
pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod registers;
pub mod voice;
pub mod wave;

// Re-export public API
pub use chip::Sid;
pub use constants::ChipModel;
pub use registers::RegisterFile;
