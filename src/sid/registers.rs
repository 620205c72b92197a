//! SID Register Definitions
//!
//! Defines the 25 write-only registers (0x00-0x18) and the 4 read-only
//! registers (0x19-0x1C) of the chip, the bit layouts of the packed
//! registers, and the raw 32-slot register file.

use std::fmt;

use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Number of addressable register slots (0x00-0x1F)
pub const REGISTER_COUNT: usize = 32;

/// Distance between the register blocks of consecutive voices
pub const VOICE_REGISTER_STRIDE: u8 = 7;

/// Write-only SID register address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum WritableRegister {
    /// Voice 1 frequency (low byte)
    Voice1FreqLo = 0x00,
    /// Voice 1 frequency (high byte)
    Voice1FreqHi = 0x01,
    /// Voice 1 pulse width (low byte)
    Voice1PwLo = 0x02,
    /// Voice 1 pulse width (high nibble)
    Voice1PwHi = 0x03,
    /// Voice 1 control register
    Voice1ControlReg = 0x04,
    /// Voice 1 attack/decay rates
    Voice1AttackDecay = 0x05,
    /// Voice 1 sustain level/release rate
    Voice1SustainRelease = 0x06,
    /// Voice 2 frequency (low byte)
    Voice2FreqLo = 0x07,
    /// Voice 2 frequency (high byte)
    Voice2FreqHi = 0x08,
    /// Voice 2 pulse width (low byte)
    Voice2PwLo = 0x09,
    /// Voice 2 pulse width (high nibble)
    Voice2PwHi = 0x0A,
    /// Voice 2 control register
    Voice2ControlReg = 0x0B,
    /// Voice 2 attack/decay rates
    Voice2AttackDecay = 0x0C,
    /// Voice 2 sustain level/release rate
    Voice2SustainRelease = 0x0D,
    /// Voice 3 frequency (low byte)
    Voice3FreqLo = 0x0E,
    /// Voice 3 frequency (high byte)
    Voice3FreqHi = 0x0F,
    /// Voice 3 pulse width (low byte)
    Voice3PwLo = 0x10,
    /// Voice 3 pulse width (high nibble)
    Voice3PwHi = 0x11,
    /// Voice 3 control register
    Voice3ControlReg = 0x12,
    /// Voice 3 attack/decay rates
    Voice3AttackDecay = 0x13,
    /// Voice 3 sustain level/release rate
    Voice3SustainRelease = 0x14,
    /// Filter cutoff (low 3 bits)
    FilterFcLo = 0x15,
    /// Filter cutoff (high 8 bits)
    FilterFcHi = 0x16,
    /// Filter resonance and voice routing
    FilterResFilt = 0x17,
    /// Filter mode and master volume
    FilterModeVol = 0x18,
}

impl WritableRegister {
    /// All writable registers in address order
    pub const ALL: [WritableRegister; 25] = [
        WritableRegister::Voice1FreqLo,
        WritableRegister::Voice1FreqHi,
        WritableRegister::Voice1PwLo,
        WritableRegister::Voice1PwHi,
        WritableRegister::Voice1ControlReg,
        WritableRegister::Voice1AttackDecay,
        WritableRegister::Voice1SustainRelease,
        WritableRegister::Voice2FreqLo,
        WritableRegister::Voice2FreqHi,
        WritableRegister::Voice2PwLo,
        WritableRegister::Voice2PwHi,
        WritableRegister::Voice2ControlReg,
        WritableRegister::Voice2AttackDecay,
        WritableRegister::Voice2SustainRelease,
        WritableRegister::Voice3FreqLo,
        WritableRegister::Voice3FreqHi,
        WritableRegister::Voice3PwLo,
        WritableRegister::Voice3PwHi,
        WritableRegister::Voice3ControlReg,
        WritableRegister::Voice3AttackDecay,
        WritableRegister::Voice3SustainRelease,
        WritableRegister::FilterFcLo,
        WritableRegister::FilterFcHi,
        WritableRegister::FilterResFilt,
        WritableRegister::FilterModeVol,
    ];

    /// Convert a raw address (0x00-0x18) to a writable register
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::from_u8(addr)
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }

    /// Voice index (0-2) owning this register, `None` for filter registers
    pub fn voice(&self) -> Option<usize> {
        let addr = self.addr();
        if addr < 3 * VOICE_REGISTER_STRIDE {
            Some((addr / VOICE_REGISTER_STRIDE) as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for WritableRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WritableRegister::FilterFcLo => return write!(f, "$15 (Filter Cutoff Low)"),
            WritableRegister::FilterFcHi => return write!(f, "$16 (Filter Cutoff High)"),
            WritableRegister::FilterResFilt => {
                return write!(f, "$17 (Filter Resonance/Routing)")
            }
            WritableRegister::FilterModeVol => return write!(f, "$18 (Filter Mode/Volume)"),
            _ => match self.addr() % VOICE_REGISTER_STRIDE {
                0 => "Frequency Low",
                1 => "Frequency High",
                2 => "Pulse Width Low",
                3 => "Pulse Width High",
                4 => "Control",
                5 => "Attack/Decay",
                _ => "Sustain/Release",
            },
        };
        let voice = self.voice().unwrap_or(0) + 1;
        write!(f, "${:02X} (Voice {voice} {name})", self.addr())
    }
}

/// Read-only SID register address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum ReadableRegister {
    /// Paddle X potentiometer
    MiscPotx = 0x19,
    /// Paddle Y potentiometer
    MiscPoty = 0x1A,
    /// Upper 8 bits of voice 3's waveform output
    MiscOsc3Random = 0x1B,
    /// Voice 3 envelope level
    MiscEnv3 = 0x1C,
}

impl ReadableRegister {
    /// All readable registers in address order
    pub const ALL: [ReadableRegister; 4] = [
        ReadableRegister::MiscPotx,
        ReadableRegister::MiscPoty,
        ReadableRegister::MiscOsc3Random,
        ReadableRegister::MiscEnv3,
    ];

    /// Convert a raw address (0x19-0x1C) to a readable register
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::from_u8(addr)
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ReadableRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadableRegister::MiscPotx => write!(f, "$19 (Potentiometer X)"),
            ReadableRegister::MiscPoty => write!(f, "$1A (Potentiometer Y)"),
            ReadableRegister::MiscOsc3Random => write!(f, "$1B (Oscillator 3)"),
            ReadableRegister::MiscEnv3 => write!(f, "$1C (Envelope 3)"),
        }
    }
}

bitflags! {
    /// Voice control register bits ($04/$0B/$12)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlBits: u8 {
        /// Gate: rising edge starts attack, falling edge starts release
        const GATE = 0x01;
        /// Hard sync with the preceding voice
        const SYNC = 0x02;
        /// Ring modulation with the preceding voice
        const RING_MOD = 0x04;
        /// Test: hold the oscillator at zero
        const TEST = 0x08;
        /// Triangle waveform
        const TRIANGLE = 0x10;
        /// Sawtooth waveform
        const SAWTOOTH = 0x20;
        /// Pulse waveform
        const PULSE = 0x40;
        /// Noise waveform
        const NOISE = 0x80;
    }
}

bitflags! {
    /// Attack/decay register bits ($05/$0C/$13)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttackDecayBits: u8 {
        /// Decay rate bit 0
        const DCY0 = 0x01;
        /// Decay rate bit 1
        const DCY1 = 0x02;
        /// Decay rate bit 2
        const DCY2 = 0x04;
        /// Decay rate bit 3
        const DCY3 = 0x08;
        /// Attack rate bit 0
        const ATK0 = 0x10;
        /// Attack rate bit 1
        const ATK1 = 0x20;
        /// Attack rate bit 2
        const ATK2 = 0x40;
        /// Attack rate bit 3
        const ATK3 = 0x80;
    }
}

bitflags! {
    /// Sustain/release register bits ($06/$0D/$14)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SustainReleaseBits: u8 {
        /// Release rate bit 0
        const RIS0 = 0x01;
        /// Release rate bit 1
        const RIS1 = 0x02;
        /// Release rate bit 2
        const RIS2 = 0x04;
        /// Release rate bit 3
        const RIS3 = 0x08;
        /// Sustain level bit 0
        const STN0 = 0x10;
        /// Sustain level bit 1
        const STN1 = 0x20;
        /// Sustain level bit 2
        const STN2 = 0x40;
        /// Sustain level bit 3
        const STN3 = 0x80;
    }
}

bitflags! {
    /// Resonance/filter routing register bits ($17)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResFiltBits: u8 {
        /// Route voice 1 through the filter
        const FILT1 = 0x01;
        /// Route voice 2 through the filter
        const FILT2 = 0x02;
        /// Route voice 3 through the filter
        const FILT3 = 0x04;
        /// Route external input through the filter
        const FILTEX = 0x08;
        /// Resonance bit 0
        const RES0 = 0x10;
        /// Resonance bit 1
        const RES1 = 0x20;
        /// Resonance bit 2
        const RES2 = 0x40;
        /// Resonance bit 3
        const RES3 = 0x80;
    }
}

bitflags! {
    /// Mode/volume register bits ($18)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModeVolBits: u8 {
        /// Volume bit 0
        const VOL0 = 0x01;
        /// Volume bit 1
        const VOL1 = 0x02;
        /// Volume bit 2
        const VOL2 = 0x04;
        /// Volume bit 3
        const VOL3 = 0x08;
        /// Low-pass output enabled
        const LP = 0x10;
        /// Band-pass output enabled
        const BP = 0x20;
        /// High-pass output enabled
        const HP = 0x40;
        /// Disconnect voice 3 from the unfiltered mix
        const THREE_OFF = 0x80;
    }
}

/// Raw register file (32 bytes)
///
/// Holds the last value written to every writable slot. The readable slots
/// are never stored here; they are computed from live chip state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
    registers: [u8; REGISTER_COUNT],
}

impl RegisterFile {
    /// Create a new register file with all values set to 0
    pub fn new() -> Self {
        RegisterFile {
            registers: [0; REGISTER_COUNT],
        }
    }

    /// Last value written to a writable register
    pub fn get(&self, reg: WritableRegister) -> u8 {
        self.registers[reg.addr() as usize]
    }

    /// Store a register value
    pub fn set(&mut self, reg: WritableRegister, value: u8) {
        self.registers[reg.addr() as usize] = value;
    }

    /// Zero every slot
    pub fn clear(&mut self) {
        self.registers = [0; REGISTER_COUNT];
    }

    /// Get all registers as an array
    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_conversion() {
        assert_eq!(
            WritableRegister::from_addr(0x00),
            Some(WritableRegister::Voice1FreqLo)
        );
        assert_eq!(
            WritableRegister::from_addr(0x12),
            Some(WritableRegister::Voice3ControlReg)
        );
        assert_eq!(
            WritableRegister::from_addr(0x18),
            Some(WritableRegister::FilterModeVol)
        );
        assert_eq!(WritableRegister::from_addr(0x19), None);
        assert_eq!(
            ReadableRegister::from_addr(0x1B),
            Some(ReadableRegister::MiscOsc3Random)
        );
        assert_eq!(ReadableRegister::from_addr(0x18), None);
        assert_eq!(ReadableRegister::from_addr(0x1D), None);
    }

    #[test]
    fn test_all_tables_match_addresses() {
        for (i, reg) in WritableRegister::ALL.iter().enumerate() {
            assert_eq!(reg.addr() as usize, i);
        }
        for (i, reg) in ReadableRegister::ALL.iter().enumerate() {
            assert_eq!(reg.addr() as usize, 0x19 + i);
        }
    }

    #[test]
    fn test_voice_ownership() {
        assert_eq!(WritableRegister::Voice1SustainRelease.voice(), Some(0));
        assert_eq!(WritableRegister::Voice2FreqLo.voice(), Some(1));
        assert_eq!(WritableRegister::Voice3SustainRelease.voice(), Some(2));
        assert_eq!(WritableRegister::FilterFcLo.voice(), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            WritableRegister::Voice2ControlReg.to_string(),
            "$0B (Voice 2 Control)"
        );
        assert_eq!(
            WritableRegister::FilterModeVol.to_string(),
            "$18 (Filter Mode/Volume)"
        );
        assert_eq!(ReadableRegister::MiscEnv3.to_string(), "$1C (Envelope 3)");
    }

    #[test]
    fn test_control_bits_layout() {
        let value = (ControlBits::TRIANGLE | ControlBits::GATE).bits();
        assert_eq!(value, 0x11);
        assert_eq!(ControlBits::NOISE.bits(), 0x80);
        assert_eq!(ModeVolBits::THREE_OFF.bits(), 0x80);
        assert_eq!(ResFiltBits::FILTEX.bits(), 0x08);
    }

    #[test]
    fn test_register_file() {
        let mut file = RegisterFile::new();
        assert_eq!(file.get(WritableRegister::Voice1FreqLo), 0);

        file.set(WritableRegister::Voice1FreqLo, 0x42);
        assert_eq!(file.get(WritableRegister::Voice1FreqLo), 0x42);
        assert_eq!(file.as_array()[0], 0x42);

        file.clear();
        assert_eq!(file.as_array(), &[0; REGISTER_COUNT]);
    }
}
