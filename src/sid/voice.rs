//! SID Voice
//!
//! One oscillator plus one envelope generator, addressed through a block
//! of seven registers at `7 × index`.

use super::envelope::EnvelopeGenerator;
use super::wave::WaveformGenerator;

/// Offsets of the per-voice registers within a voice block
pub mod offset {
    /// Frequency low byte
    pub const FREQ_LO: u8 = 0;
    /// Frequency high byte
    pub const FREQ_HI: u8 = 1;
    /// Pulse width low byte
    pub const PW_LO: u8 = 2;
    /// Pulse width high nibble
    pub const PW_HI: u8 = 3;
    /// Control register
    pub const CONTROL: u8 = 4;
    /// Attack/decay
    pub const ATTACK_DECAY: u8 = 5;
    /// Sustain/release
    pub const SUSTAIN_RELEASE: u8 = 6;
}

/// Waveform value at which a voice contributes nothing
const WAVE_ZERO: i32 = 0x800;

/// One of the three SID voices
#[derive(Debug, Clone, Default)]
pub struct Voice {
    wave: WaveformGenerator,
    envelope: EnvelopeGenerator,
}

impl Voice {
    /// Create a voice in its power-up state
    pub fn new() -> Self {
        Voice {
            wave: WaveformGenerator::new(),
            envelope: EnvelopeGenerator::new(),
        }
    }

    /// Return both generators to their power-up state
    pub fn reset(&mut self) {
        self.wave.reset();
        self.envelope.reset();
    }

    /// Waveform generator
    pub fn wave(&self) -> &WaveformGenerator {
        &self.wave
    }

    /// Mutable waveform generator
    pub fn wave_mut(&mut self) -> &mut WaveformGenerator {
        &mut self.wave
    }

    /// Envelope generator
    pub fn envelope(&self) -> &EnvelopeGenerator {
        &self.envelope
    }

    /// Decode a write to this voice's register block
    ///
    /// `register` is the offset within the block (0-6); other offsets are
    /// ignored.
    pub fn write(&mut self, register: u8, value: u8) {
        match register {
            offset::FREQ_LO => self.wave.set_freq_lo(value),
            offset::FREQ_HI => self.wave.set_freq_hi(value),
            offset::PW_LO => self.wave.set_pw_lo(value),
            offset::PW_HI => self.wave.set_pw_hi(value),
            offset::CONTROL => {
                self.wave.set_control(value);
                self.envelope.set_control(value);
            }
            offset::ATTACK_DECAY => self.envelope.set_attack_decay(value),
            offset::SUSTAIN_RELEASE => self.envelope.set_sustain_release(value),
            _ => {}
        }
    }

    /// Advance both generators by one cycle
    #[inline]
    pub fn clock(&mut self) {
        self.wave.clock();
        self.envelope.clock();
    }

    /// Amplitude-modulated output, a signed 20-bit value
    ///
    /// The waveform is centred on 0x800 so a silent envelope or an idle
    /// oscillator contributes nothing to the mix.
    #[inline]
    pub fn output(&self, ring_msb: bool) -> i32 {
        (self.wave.output(ring_msb) as i32 - WAVE_ZERO) * self.envelope.output() as i32
    }
}
