//! Waveform Generator
//!
//! A 24-bit phase accumulator advanced by a 16-bit frequency word every
//! cycle. The top accumulator bits are shaped into triangle, sawtooth and
//! pulse waveforms; a 23-bit LFSR clocked from accumulator bit 19 provides
//! noise. Selecting several waveforms ANDs their outputs together.

use super::constants::{
    ACCUMULATOR_MASK, ACCUMULATOR_MSB, NOISE_CLOCK_BIT, NOISE_LFSR_MASK, NOISE_LFSR_SEED,
    NOISE_LFSR_TAPS,
};
use super::registers::ControlBits;

/// Waveform selection mask within the control register
const WAVEFORM_MASK: ControlBits = ControlBits::TRIANGLE
    .union(ControlBits::SAWTOOTH)
    .union(ControlBits::PULSE)
    .union(ControlBits::NOISE);

/// Per-voice oscillator state
#[derive(Debug, Clone)]
pub struct WaveformGenerator {
    accumulator: u32,
    shift_register: u32,
    frequency: u16,
    pulse_width: u16,
    control: ControlBits,
    /// Set when the last `clock` wrapped the accumulator (MSB 1 -> 0)
    msb_falling: bool,
}

impl WaveformGenerator {
    /// Create a generator in its power-up state
    pub fn new() -> Self {
        WaveformGenerator {
            accumulator: 0,
            shift_register: NOISE_LFSR_SEED,
            frequency: 0,
            pulse_width: 0,
            control: ControlBits::empty(),
            msb_falling: false,
        }
    }

    /// Return to the power-up state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write the low byte of the frequency word
    pub fn set_freq_lo(&mut self, value: u8) {
        self.frequency = (self.frequency & 0xff00) | value as u16;
    }

    /// Write the high byte of the frequency word
    pub fn set_freq_hi(&mut self, value: u8) {
        self.frequency = ((value as u16) << 8) | (self.frequency & 0x00ff);
    }

    /// Write the low byte of the pulse width
    pub fn set_pw_lo(&mut self, value: u8) {
        self.pulse_width = (self.pulse_width & 0x0f00) | value as u16;
    }

    /// Write the pulse width high nibble (upper bits ignored)
    pub fn set_pw_hi(&mut self, value: u8) {
        self.pulse_width = (((value & 0x0f) as u16) << 8) | (self.pulse_width & 0x00ff);
    }

    /// Write the control register
    ///
    /// Setting TEST zeroes the accumulator immediately and keeps it there
    /// until TEST is cleared.
    pub fn set_control(&mut self, value: u8) {
        self.control = ControlBits::from_bits_retain(value);
        if self.test() {
            self.accumulator = 0;
            self.msb_falling = false;
        }
    }

    /// 16-bit frequency word
    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    /// 12-bit pulse width
    pub fn pulse_width(&self) -> u16 {
        self.pulse_width
    }

    /// Current control bits
    pub fn control(&self) -> ControlBits {
        self.control
    }

    /// Current accumulator value (24 bits)
    pub fn accumulator(&self) -> u32 {
        self.accumulator
    }

    /// Current noise shift register value (23 bits)
    pub fn shift_register(&self) -> u32 {
        self.shift_register
    }

    /// Whether the TEST bit is set
    #[inline]
    pub fn test(&self) -> bool {
        self.control.contains(ControlBits::TEST)
    }

    /// Accumulator bit 23
    #[inline]
    pub fn msb(&self) -> bool {
        self.accumulator & ACCUMULATOR_MSB != 0
    }

    /// Whether the most recent cycle wrapped the accumulator
    #[inline]
    pub fn msb_falling(&self) -> bool {
        self.msb_falling
    }

    /// Advance by one cycle
    #[inline]
    pub fn clock(&mut self) {
        if self.test() {
            self.msb_falling = false;
            return;
        }

        let previous = self.accumulator;
        self.accumulator = previous.wrapping_add(self.frequency as u32) & ACCUMULATOR_MASK;
        self.msb_falling = previous & ACCUMULATOR_MSB != 0 && !self.msb();

        let noise_bit = 1 << NOISE_CLOCK_BIT;
        if previous & noise_bit == 0 && self.accumulator & noise_bit != 0 {
            self.shift_noise();
        }
    }

    /// Hard-sync reset triggered by the source voice
    #[inline]
    pub fn sync_reset(&mut self) {
        self.accumulator = 0;
    }

    fn shift_noise(&mut self) {
        let (tap_a, tap_b) = NOISE_LFSR_TAPS;
        let feedback = ((self.shift_register >> tap_a) ^ (self.shift_register >> tap_b)) & 1;
        self.shift_register = ((self.shift_register << 1) | feedback) & NOISE_LFSR_MASK;
    }

    /// Triangle: accumulator folded on its MSB, which ring modulation
    /// replaces by MSB XOR source MSB.
    #[inline]
    fn triangle(&self, ring_msb: bool) -> u16 {
        let mut msb = self.msb();
        if self.control.contains(ControlBits::RING_MOD) {
            msb ^= ring_msb;
        }
        let folded = if msb {
            !self.accumulator
        } else {
            self.accumulator
        };
        ((folded >> 11) & 0x0fff) as u16
    }

    #[inline]
    fn sawtooth(&self) -> u16 {
        (self.accumulator >> 12) as u16
    }

    #[inline]
    fn pulse(&self) -> u16 {
        if self.test() || (self.accumulator >> 12) as u16 >= self.pulse_width {
            0x0fff
        } else {
            0x0000
        }
    }

    /// Noise: eight LFSR taps mapped to output bits 11..4
    #[inline]
    fn noise(&self) -> u16 {
        let sr = self.shift_register;
        ((((sr >> 20) & 1) << 11)
            | (((sr >> 18) & 1) << 10)
            | (((sr >> 14) & 1) << 9)
            | (((sr >> 11) & 1) << 8)
            | (((sr >> 9) & 1) << 7)
            | (((sr >> 5) & 1) << 6)
            | (((sr >> 2) & 1) << 5)
            | ((sr & 1) << 4)) as u16
    }

    /// 12-bit waveform output
    ///
    /// `ring_msb` is the ring-modulation source's accumulator MSB. With no
    /// waveform selected the output is 0.
    pub fn output(&self, ring_msb: bool) -> u16 {
        let selected = self.control & WAVEFORM_MASK;
        if selected.is_empty() {
            return 0;
        }

        let mut value = 0x0fff;
        if selected.contains(ControlBits::TRIANGLE) {
            value &= self.triangle(ring_msb);
        }
        if selected.contains(ControlBits::SAWTOOTH) {
            value &= self.sawtooth();
        }
        if selected.contains(ControlBits::PULSE) {
            value &= self.pulse();
        }
        if selected.contains(ControlBits::NOISE) {
            value &= self.noise();
        }
        value
    }
}

impl Default for WaveformGenerator {
    fn default() -> Self {
        Self::new()
    }
}
