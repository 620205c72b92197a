//! SID chip
//!
//! Ties the three voices, the coupler, the filter and the mixer to the
//! register map and steps them together one system clock cycle at a time.

use log::debug;

use super::constants::{ChipModel, BUS_VALUE_TTL};
use super::coupler::Coupler;
use super::envelope::EnvelopeState;
use super::filter::Filter;
use super::mixer::Mixer;
use super::registers::{
    ReadableRegister, RegisterFile, WritableRegister, REGISTER_COUNT, VOICE_REGISTER_STRIDE,
};
use super::voice::Voice;
use crate::backend::SidBackend;
use crate::{Result, SidError};

/// Potentiometer value read when no paddle is connected
pub const POT_DEFAULT: u8 = 0xff;

/// Highest readable register address
const LAST_READABLE: u8 = 0x1c;

/// MOS 6581/8580 emulation core
#[derive(Debug, Clone)]
pub struct Sid {
    voices: [Voice; 3],
    coupler: Coupler,
    filter: Filter,
    mixer: Mixer,
    registers: RegisterFile,

    ext_in: i32,
    pot_x: u8,
    pot_y: u8,
    bus_value: u8,
    bus_value_ttl: u32,
}

impl Sid {
    /// Create a chip of the given model in its power-up state
    pub fn new(chip_model: ChipModel) -> Self {
        Sid {
            voices: [Voice::new(), Voice::new(), Voice::new()],
            coupler: Coupler::new(),
            filter: Filter::new(chip_model),
            mixer: Mixer::new(),
            registers: RegisterFile::new(),
            ext_in: 0,
            pot_x: POT_DEFAULT,
            pot_y: POT_DEFAULT,
            bus_value: 0,
            bus_value_ttl: 0,
        }
    }

    /// Zero every register and return all components to power-up state
    ///
    /// Envelopes go to Release at level 0, accumulators to 0. Host-side
    /// settings (mutes, filter bypass and curves, potentiometers) are kept.
    pub fn reset(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.reset();
        }
        self.coupler.reset();
        self.filter.reset();
        self.mixer.reset();
        self.registers.clear();
        self.ext_in = 0;
        self.bus_value = 0;
        self.bus_value_ttl = 0;
    }

    /// Active chip model
    pub fn chip_model(&self) -> ChipModel {
        self.filter.chip_model()
    }

    /// Switch the chip model and reset
    pub fn set_chip_model(&mut self, chip_model: ChipModel) {
        self.filter.set_chip_model(chip_model);
        self.reset();
    }

    /// Write a value to a writable register
    pub fn write(&mut self, register: WritableRegister, value: u8) {
        self.registers.set(register, value);
        self.bus_value = value;
        self.bus_value_ttl = BUS_VALUE_TTL;

        let addr = register.addr();
        match register.voice() {
            Some(index) => {
                let offset = addr - index as u8 * VOICE_REGISTER_STRIDE;
                self.voices[index].write(offset, value);
            }
            None => match register {
                WritableRegister::FilterFcLo => self.filter.set_fc_lo(value),
                WritableRegister::FilterFcHi => self.filter.set_fc_hi(value),
                WritableRegister::FilterResFilt => self.filter.set_res_filt(value),
                _ => {
                    self.filter.set_mode_vol(value);
                    self.mixer.set_mode_vol(value);
                }
            },
        }
    }

    /// Read a live value from a readable register
    pub fn read(&self, register: ReadableRegister) -> u8 {
        match register {
            ReadableRegister::MiscPotx => self.pot_x,
            ReadableRegister::MiscPoty => self.pot_y,
            ReadableRegister::MiscOsc3Random => {
                (self.voices[2].wave().output(self.coupler.ring_msb(2)) >> 4) as u8
            }
            ReadableRegister::MiscEnv3 => self.voices[2].envelope().output(),
        }
    }

    /// Write by raw address (0x00-0x18)
    pub fn write_port(&mut self, addr: u8, value: u8) -> Result<()> {
        let register = WritableRegister::from_addr(addr).ok_or(SidError::OutOfRange {
            name: "writable register address",
            value: addr as u32,
            max: WritableRegister::FilterModeVol.addr() as u32,
        })?;
        debug!("write {register} = ${value:02X}");
        self.write(register, value);
        Ok(())
    }

    /// Read by raw address (0x00-0x1C)
    ///
    /// Write-only addresses return the value last seen on the data bus,
    /// which fades to 0 some cycles after the last write.
    pub fn read_port(&self, addr: u8) -> Result<u8> {
        if let Some(register) = ReadableRegister::from_addr(addr) {
            return Ok(self.read(register));
        }
        if addr > LAST_READABLE {
            return Err(SidError::OutOfRange {
                name: "register address",
                value: addr as u32,
                max: LAST_READABLE as u32,
            });
        }
        Ok(self.bus_value)
    }

    /// Snapshot of the register file with live values at 0x19-0x1C
    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        let mut dump = *self.registers.as_array();
        for register in ReadableRegister::ALL {
            dump[register.addr() as usize] = self.read(register);
        }
        dump
    }

    /// Last-known paddle positions
    pub fn set_potentiometers(&mut self, pot_x: u8, pot_y: u8) {
        self.pot_x = pot_x;
        self.pot_y = pot_y;
    }

    /// External audio input, mixed in through the EXT IN routing bit
    pub fn input(&mut self, sample: i16) {
        self.ext_in = (sample as i32) << 4;
    }

    /// Mute or unmute voice 0-2 ahead of filter routing
    pub fn set_voice_mute(&mut self, voice: usize, muted: bool) {
        self.mixer.set_muted(voice, muted);
    }

    /// Whether voice 0-2 is muted
    pub fn is_voice_muted(&self, voice: usize) -> bool {
        self.mixer.is_muted(voice)
    }

    /// Enable the filter stage or bypass it
    pub fn enable_filter(&mut self, enabled: bool) {
        self.filter.set_enabled(enabled);
    }

    /// Tune the cutoff curve of one chip model (0.0 bright - 1.0 dark)
    pub fn set_filter_curve(&mut self, chip_model: ChipModel, curve: f64) {
        self.filter.set_curve(chip_model, curve);
    }

    /// Filter stage, for inspection
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Voice 0-2, for inspection
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// Envelope phase of voice 0-2
    pub fn envelope_state(&self, index: usize) -> Option<EnvelopeState> {
        self.voices.get(index).map(|voice| voice.envelope().state())
    }

    /// Advance the whole chip by one system clock cycle
    #[inline]
    pub fn clock(&mut self) {
        if self.bus_value_ttl > 0 {
            self.bus_value_ttl -= 1;
            if self.bus_value_ttl == 0 {
                self.bus_value = 0;
            }
        }

        self.coupler.capture(&self.voices);
        for voice in self.voices.iter_mut() {
            voice.clock();
        }
        self.coupler.synchronize(&mut self.voices);

        let [v1, v2, v3] = self.voice_outputs();
        self.filter.clock(v1, v2, v3, self.ext_in);
    }

    /// Per-voice outputs after muting, signed 20-bit
    pub fn voice_outputs(&self) -> [i32; 3] {
        [0, 1, 2].map(|index| {
            let sample = self.voices[index].output(self.coupler.ring_msb(index));
            self.mixer.gate(index, sample)
        })
    }

    /// Current output sample
    #[inline]
    pub fn output(&self) -> i16 {
        self.mixer.output(self.filter.output())
    }
}

impl Default for Sid {
    fn default() -> Self {
        Self::new(ChipModel::default())
    }
}

impl SidBackend for Sid {
    fn reset(&mut self) {
        Sid::reset(self);
    }

    fn write_register(&mut self, addr: u8, value: u8) {
        if let Some(register) = WritableRegister::from_addr(addr) {
            self.write(register, value);
        }
    }

    fn read_register(&self, addr: u8) -> u8 {
        self.read_port(addr).unwrap_or(0)
    }

    fn dump_registers(&self) -> [u8; REGISTER_COUNT] {
        self.registers()
    }

    fn clock(&mut self) {
        Sid::clock(self);
    }

    fn output(&self) -> i16 {
        Sid::output(self)
    }

    fn set_voice_mute(&mut self, voice: usize, mute: bool) {
        Sid::set_voice_mute(self, voice, mute);
    }

    fn is_voice_muted(&self, voice: usize) -> bool {
        Sid::is_voice_muted(self, voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sid::registers::{ControlBits, ModeVolBits, ResFiltBits};

    fn clock_n(sid: &mut Sid, cycles: u32) {
        for _ in 0..cycles {
            sid.clock();
        }
    }

    fn gated_voice1(sid: &mut Sid, control: ControlBits) {
        sid.write(WritableRegister::FilterModeVol, 0x0f);
        sid.write(WritableRegister::Voice1AttackDecay, 0x00);
        sid.write(WritableRegister::Voice1SustainRelease, 0xf0);
        sid.write(WritableRegister::Voice1FreqHi, 0x10);
        sid.write(WritableRegister::Voice1ControlReg, (control | ControlBits::GATE).bits());
    }

    #[test]
    fn test_silence_after_reset() {
        let mut sid = Sid::new(ChipModel::MOS6581);
        sid.write(WritableRegister::FilterModeVol, 0x0f);
        sid.write(WritableRegister::Voice1FreqHi, 0x20);
        sid.write(WritableRegister::Voice1ControlReg, ControlBits::SAWTOOTH.bits());
        for _ in 0..10_000 {
            sid.clock();
            assert_eq!(sid.output(), 0);
        }
    }

    #[test]
    fn test_gated_voice_is_audible() {
        let mut sid = Sid::new(ChipModel::MOS6581);
        gated_voice1(&mut sid, ControlBits::SAWTOOTH);
        let mut peak = 0i32;
        for _ in 0..20_000 {
            sid.clock();
            peak = peak.max((sid.output() as i32).abs());
        }
        assert!(peak > 1000, "peak = {peak}");
    }

    #[test]
    fn test_readback_osc3_and_env3() {
        let mut sid = Sid::new(ChipModel::MOS8580);
        sid.write(WritableRegister::Voice3FreqHi, 0x10);
        sid.write(WritableRegister::Voice3ControlReg, ControlBits::SAWTOOTH.bits());
        clock_n(&mut sid, 0x80);
        // Accumulator 0x080000: sawtooth 0x080, top 8 bits 0x08
        assert_eq!(sid.read(ReadableRegister::MiscOsc3Random), 0x08);
        assert_eq!(sid.read(ReadableRegister::MiscEnv3), 0);

        sid.write(
            WritableRegister::Voice3ControlReg,
            (ControlBits::SAWTOOTH | ControlBits::GATE).bits(),
        );
        clock_n(&mut sid, 9 * 5);
        assert_eq!(sid.read(ReadableRegister::MiscEnv3), 5);
    }

    #[test]
    fn test_port_errors() {
        let mut sid = Sid::default();
        assert!(matches!(
            sid.write_port(0x19, 0),
            Err(SidError::OutOfRange { value: 0x19, .. })
        ));
        assert!(matches!(
            sid.read_port(0x1d),
            Err(SidError::OutOfRange { value: 0x1d, .. })
        ));
        assert!(sid.write_port(0x18, 0x0f).is_ok());
        assert_eq!(sid.read_port(0x19).ok(), Some(POT_DEFAULT));
    }

    #[test]
    fn test_bus_value_decays() {
        let mut sid = Sid::default();
        sid.write(WritableRegister::Voice1PwLo, 0xa5);
        assert_eq!(sid.read_port(0x02).ok(), Some(0xa5));
        assert_eq!(sid.read_port(0x15).ok(), Some(0xa5));

        clock_n(&mut sid, BUS_VALUE_TTL - 1);
        assert_eq!(sid.read_port(0x02).ok(), Some(0xa5));
        sid.clock();
        assert_eq!(sid.read_port(0x02).ok(), Some(0));
    }

    #[test]
    fn test_register_dump_and_reset() {
        let mut sid = Sid::default();
        sid.set_potentiometers(0x12, 0x34);
        sid.write(WritableRegister::FilterResFilt, 0xf1);
        let dump = sid.registers();
        assert_eq!(dump[0x17], 0xf1);
        assert_eq!(dump[0x19], 0x12);
        assert_eq!(dump[0x1a], 0x34);

        sid.reset();
        let dump = sid.registers();
        assert!(dump[..0x19].iter().all(|&value| value == 0));
        assert_eq!(dump[0x19], 0x12);
        assert_eq!(sid.envelope_state(0), Some(EnvelopeState::Release));
    }

    #[test]
    fn test_mute_zeroes_voice_contribution() {
        let mut sid = Sid::new(ChipModel::MOS6581);
        sid.set_voice_mute(0, true);
        gated_voice1(&mut sid, ControlBits::SAWTOOTH);
        for _ in 0..20_000 {
            sid.clock();
            assert_eq!(sid.output(), 0);
        }

        sid.reset();
        assert!(sid.is_voice_muted(0));
    }

    #[test]
    fn test_external_input_through_filter_routing() {
        let mut sid = Sid::new(ChipModel::MOS8580);
        sid.write(WritableRegister::FilterModeVol, 0x0f);
        sid.input(0x4000);
        sid.clock();
        let bypassed = sid.output();
        assert_ne!(bypassed, 0);

        // Routed into the filter with every tap disabled: nothing reaches the mix
        sid.write(WritableRegister::FilterResFilt, ResFiltBits::FILTEX.bits());
        sid.clock();
        assert_eq!(sid.output(), 0);

        sid.write(WritableRegister::FilterModeVol, ModeVolBits::HP.bits() | 0x0f);
        sid.clock();
        assert_ne!(sid.output(), 0);
    }

    #[test]
    fn test_chip_model_switch_resets() {
        let mut sid = Sid::new(ChipModel::MOS6581);
        sid.write(WritableRegister::FilterModeVol, 0x0f);
        sid.set_chip_model(ChipModel::MOS8580);
        assert_eq!(sid.chip_model(), ChipModel::MOS8580);
        assert_eq!(sid.registers()[0x18], 0);
    }
}
