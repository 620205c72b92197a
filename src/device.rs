//! Sound Interface Device
//!
//! Host-facing wrapper pairing a [`Sid`] core with a [`Sampler`]. Values
//! enter as `u32` and are range-checked against their bit width before
//! they reach the chip, so nothing is silently truncated.

use std::fmt;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::musical_scale::Tone;
use crate::sampler::{validate_frequencies, Sampler, SamplingMethod};
use crate::sid::constants::{clock, ChipModel};
use crate::sid::registers::{
    ControlBits, ReadableRegister, WritableRegister, REGISTER_COUNT, VOICE_REGISTER_STRIDE,
};
use crate::sid::Sid;
use crate::{Result, SidError};

const BYTE_MAX: u32 = 0xff;
const WORD_MAX: u32 = 0xffff;
const PULSE_WIDTH_MAX: u32 = 0x0fff;
const CUTOFF_MAX: u32 = 0x07ff;

/// One of the three voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    /// Voice 1 (registers 0x00-0x06)
    One = 0,
    /// Voice 2 (registers 0x07-0x0D)
    Two = 1,
    /// Voice 3 (registers 0x0E-0x14)
    Three = 2,
}

impl Voice {
    /// All voices in register order
    pub const ALL: [Voice; 3] = [Voice::One, Voice::Two, Voice::Three];

    /// Zero-based voice index
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Voice {}", self.index() + 1)
    }
}

/// Voice-relative writable register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceRegister {
    /// Frequency low byte
    FreqLo = 0,
    /// Frequency high byte
    FreqHi = 1,
    /// Pulse width low byte
    PwLo = 2,
    /// Pulse width high nibble
    PwHi = 3,
    /// Control register
    ControlReg = 4,
    /// Attack/decay rates
    AttackDecay = 5,
    /// Sustain level/release rate
    SustainRelease = 6,
}

impl VoiceRegister {
    /// Absolute register of this slot for `voice`
    pub fn for_voice(&self, voice: Voice) -> WritableRegister {
        WritableRegister::ALL[*self as usize + VOICE_REGISTER_STRIDE as usize * voice.index()]
    }
}

/// Construction parameters of a [`SoundInterfaceDevice`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidConfig {
    /// Chip revision to emulate
    pub chip_model: ChipModel,
    /// Cycle-to-sample conversion
    pub sampling_method: SamplingMethod,
    /// System clock frequency (Hz)
    pub clock_frequency: f64,
    /// Output sampling frequency (Hz)
    pub sampling_frequency: f64,
}

impl Default for SidConfig {
    fn default() -> Self {
        SidConfig {
            chip_model: ChipModel::MOS6581,
            sampling_method: SamplingMethod::Resample,
            clock_frequency: clock::PAL,
            sampling_frequency: 48_000.0,
        }
    }
}

impl SidConfig {
    /// Check the frequencies against the resampler limits
    pub fn validate(&self) -> Result<()> {
        validate_frequencies(self.clock_frequency, self.sampling_frequency)
    }
}

/// Emulated SID with register-level access and PCM output
#[derive(Debug, Clone)]
pub struct SoundInterfaceDevice {
    config: SidConfig,
    sid: Sid,
    sampler: Sampler,
}

/// Generates one range-checked setter per writable register and one getter
/// per readable register.
macro_rules! register_accessors {
    (
        writable { $($setter:ident => $wreg:ident),* $(,)? }
        readable { $($getter:ident => $rreg:ident),* $(,)? }
    ) => {
        impl SoundInterfaceDevice {
            $(
                #[doc = concat!("Write `value` (0-255) to `", stringify!($wreg), "`")]
                pub fn $setter(&mut self, value: u32) -> Result<()> {
                    self.write(WritableRegister::$wreg, value)
                }
            )*
            $(
                #[doc = concat!("Read the live `", stringify!($rreg), "` value")]
                pub fn $getter(&self) -> u8 {
                    self.read(ReadableRegister::$rreg)
                }
            )*
        }
    };
}

register_accessors! {
    writable {
        set_voice1_freq_lo => Voice1FreqLo,
        set_voice1_freq_hi => Voice1FreqHi,
        set_voice1_pw_lo => Voice1PwLo,
        set_voice1_pw_hi => Voice1PwHi,
        set_voice1_control_reg => Voice1ControlReg,
        set_voice1_attack_decay => Voice1AttackDecay,
        set_voice1_sustain_release => Voice1SustainRelease,
        set_voice2_freq_lo => Voice2FreqLo,
        set_voice2_freq_hi => Voice2FreqHi,
        set_voice2_pw_lo => Voice2PwLo,
        set_voice2_pw_hi => Voice2PwHi,
        set_voice2_control_reg => Voice2ControlReg,
        set_voice2_attack_decay => Voice2AttackDecay,
        set_voice2_sustain_release => Voice2SustainRelease,
        set_voice3_freq_lo => Voice3FreqLo,
        set_voice3_freq_hi => Voice3FreqHi,
        set_voice3_pw_lo => Voice3PwLo,
        set_voice3_pw_hi => Voice3PwHi,
        set_voice3_control_reg => Voice3ControlReg,
        set_voice3_attack_decay => Voice3AttackDecay,
        set_voice3_sustain_release => Voice3SustainRelease,
        set_filter_fc_lo => FilterFcLo,
        set_filter_fc_hi => FilterFcHi,
        set_filter_res_filt => FilterResFilt,
        set_filter_mode_vol => FilterModeVol,
    }
    readable {
        misc_potx => MiscPotx,
        misc_poty => MiscPoty,
        misc_osc3_random => MiscOsc3Random,
        misc_env3 => MiscEnv3,
    }
}

impl SoundInterfaceDevice {
    /// Create a device, failing with `InvalidConfiguration` when the
    /// frequencies violate the resampler limits
    pub fn new(config: SidConfig) -> Result<Self> {
        config.validate()?;
        let sampler = Sampler::new(
            config.sampling_method,
            config.clock_frequency,
            config.sampling_frequency,
        )?;
        info!(
            "SID {} configured: {} at {} Hz -> {} Hz",
            config.chip_model,
            config.sampling_method,
            config.clock_frequency,
            config.sampling_frequency
        );
        Ok(SoundInterfaceDevice {
            config,
            sid: Sid::new(config.chip_model),
            sampler,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &SidConfig {
        &self.config
    }

    /// Emulated chip model
    pub fn chip_model(&self) -> ChipModel {
        self.config.chip_model
    }

    /// Sampling method
    pub fn sampling_method(&self) -> SamplingMethod {
        self.config.sampling_method
    }

    /// System clock frequency (Hz)
    pub fn clock_frequency(&self) -> f64 {
        self.config.clock_frequency
    }

    /// Output sampling frequency (Hz)
    pub fn sampling_frequency(&self) -> f64 {
        self.config.sampling_frequency
    }

    /// Switch the chip model; the device is reset
    pub fn set_chip_model(&mut self, chip_model: ChipModel) -> Result<()> {
        self.reconfigure(SidConfig {
            chip_model,
            ..self.config
        })
    }

    /// Switch the sampling method; the device is reset
    pub fn set_sampling_method(&mut self, sampling_method: SamplingMethod) -> Result<()> {
        self.reconfigure(SidConfig {
            sampling_method,
            ..self.config
        })
    }

    /// Change the system clock frequency; the device is reset
    pub fn set_clock_frequency(&mut self, clock_frequency: f64) -> Result<()> {
        self.reconfigure(SidConfig {
            clock_frequency,
            ..self.config
        })
    }

    /// Change the output sampling frequency; the device is reset
    pub fn set_sampling_frequency(&mut self, sampling_frequency: f64) -> Result<()> {
        self.reconfigure(SidConfig {
            sampling_frequency,
            ..self.config
        })
    }

    /// Apply a whole new configuration. On error nothing changes.
    pub fn reconfigure(&mut self, config: SidConfig) -> Result<()> {
        config.validate()?;
        let sampler = Sampler::new(
            config.sampling_method,
            config.clock_frequency,
            config.sampling_frequency,
        )?;
        info!(
            "SID reconfigured: {} {} at {} Hz -> {} Hz",
            config.chip_model,
            config.sampling_method,
            config.clock_frequency,
            config.sampling_frequency
        );
        if config.chip_model != self.sid.chip_model() {
            self.sid.set_chip_model(config.chip_model);
        }
        self.sampler = sampler;
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Return the chip and the sampler to power-up state
    pub fn reset(&mut self) {
        self.sid.reset();
        self.sampler.reset();
    }

    /// Write an 8-bit value to a writable register
    pub fn write(&mut self, register: WritableRegister, value: u32) -> Result<()> {
        let value = SidError::check_range("register value", value, BYTE_MAX)?;
        debug!("write {register} = ${value:02X}");
        self.sid.write(register, value as u8);
        Ok(())
    }

    /// Read a readable register
    pub fn read(&self, register: ReadableRegister) -> u8 {
        let value = self.sid.read(register);
        debug!("read {register} = ${value:02X}");
        value
    }

    /// Write by raw address (0x00-0x18)
    pub fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
        let addr = SidError::check_range(
            "writable register address",
            addr,
            WritableRegister::FilterModeVol.addr() as u32,
        )?;
        let value = SidError::check_range("register value", value, BYTE_MAX)?;
        self.sid.write_port(addr as u8, value as u8)
    }

    /// Read by raw address (0x00-0x1C); write-only addresses return the
    /// decaying bus value
    pub fn read_register(&self, addr: u32) -> Result<u8> {
        let addr = SidError::check_range(
            "readable register address",
            addr,
            ReadableRegister::MiscEnv3.addr() as u32,
        )?;
        self.sid.read_port(addr as u8)
    }

    /// Snapshot of all 32 register slots
    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.sid.registers()
    }

    fn write_voice(&mut self, voice: Voice, register: VoiceRegister, value: u32) -> Result<()> {
        self.write(register.for_voice(voice), value)
    }

    /// Set the 16-bit frequency word of a voice
    pub fn oscillator(&mut self, voice: Voice, value: u32) -> Result<()> {
        let word = SidError::check_range("oscillator frequency", value, WORD_MAX)?;
        self.write_voice(voice, VoiceRegister::FreqLo, word & 0xff)?;
        self.write_voice(voice, VoiceRegister::FreqHi, (word >> 8) & 0xff)
    }

    /// Tune a voice to a note of the musical scale
    pub fn tone(&mut self, voice: Voice, tone: Tone) -> Result<()> {
        self.oscillator(voice, tone.word() as u32)
    }

    /// Set the 12-bit pulse width of a voice
    pub fn pulse_width(&mut self, voice: Voice, value: u32) -> Result<()> {
        let width = SidError::check_range("pulse width", value, PULSE_WIDTH_MAX)?;
        self.write_voice(voice, VoiceRegister::PwLo, width & 0xff)?;
        self.write_voice(voice, VoiceRegister::PwHi, (width >> 8) & 0x0f)
    }

    /// Write the control register of a voice
    pub fn control(&mut self, voice: Voice, bits: ControlBits) -> Result<()> {
        self.write_voice(voice, VoiceRegister::ControlReg, bits.bits() as u32)
    }

    /// Write the attack/decay register of a voice
    pub fn attack_decay(&mut self, voice: Voice, value: u32) -> Result<()> {
        self.write_voice(voice, VoiceRegister::AttackDecay, value)
    }

    /// Write the sustain/release register of a voice
    pub fn sustain_release(&mut self, voice: Voice, value: u32) -> Result<()> {
        self.write_voice(voice, VoiceRegister::SustainRelease, value)
    }

    /// Set the 11-bit filter cutoff
    pub fn filter_cutoff(&mut self, value: u32) -> Result<()> {
        let cutoff = SidError::check_range("filter cutoff", value, CUTOFF_MAX)?;
        self.write(WritableRegister::FilterFcLo, cutoff & 0x07)?;
        self.write(WritableRegister::FilterFcHi, (cutoff >> 3) & 0xff)
    }

    /// Silence a voice in the mix
    pub fn mute(&mut self, voice: Voice) {
        self.sid.set_voice_mute(voice.index(), true);
    }

    /// Make a muted voice audible again
    pub fn unmute(&mut self, voice: Voice) {
        self.sid.set_voice_mute(voice.index(), false);
    }

    /// Whether a voice is muted
    pub fn is_muted(&self, voice: Voice) -> bool {
        self.sid.is_voice_muted(voice.index())
    }

    /// Feed a sample into the EXT IN pin
    pub fn input(&mut self, sample: i16) {
        self.sid.input(sample);
    }

    /// Set the values returned by POTX/POTY
    pub fn set_potentiometers(&mut self, pot_x: u32, pot_y: u32) -> Result<()> {
        let pot_x = SidError::check_range("potentiometer X", pot_x, BYTE_MAX)?;
        let pot_y = SidError::check_range("potentiometer Y", pot_y, BYTE_MAX)?;
        self.sid.set_potentiometers(pot_x as u8, pot_y as u8);
        Ok(())
    }

    /// Enable or bypass the filter
    pub fn enable_filter(&mut self, enabled: bool) {
        self.sid.enable_filter(enabled);
    }

    /// Tune the 6581 cutoff curve, 0.0 (bright) to 1.0 (dark)
    pub fn set_filter_6581_curve(&mut self, curve: f64) -> Result<()> {
        self.set_filter_curve(ChipModel::MOS6581, curve)
    }

    /// Tune the 8580 cutoff curve, 0.0 (bright) to 1.0 (dark)
    pub fn set_filter_8580_curve(&mut self, curve: f64) -> Result<()> {
        self.set_filter_curve(ChipModel::MOS8580, curve)
    }

    fn set_filter_curve(&mut self, chip_model: ChipModel, curve: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&curve) {
            return Err(SidError::InvalidConfiguration(format!(
                "{chip_model} filter curve must lie in 0.0..=1.0, got {curve}"
            )));
        }
        self.sid.set_filter_curve(chip_model, curve);
        Ok(())
    }

    /// Borrow the emulation core
    pub fn sid(&self) -> &Sid {
        &self.sid
    }

    /// Advance for `duration` and return the samples produced meanwhile
    pub fn clock(&mut self, duration: Duration) -> Vec<i16> {
        let cycles = (duration.as_secs_f64() * self.config.clock_frequency) as u32;
        self.clock_cycles(cycles)
    }

    /// Advance exactly `cycles` system clock cycles
    pub fn clock_cycles(&mut self, cycles: u32) -> Vec<i16> {
        debug!(
            "clock {cycles} cycles ({} samples estimated)",
            self.sampler.estimate_samples(cycles)
        );
        let samples = self.sampler.clock(&mut self.sid, cycles);
        debug!("retrieved {} samples", samples.len());
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> SoundInterfaceDevice {
        SoundInterfaceDevice::new(SidConfig::default()).unwrap()
    }

    #[test]
    fn test_voice_register_mapping() {
        assert_eq!(
            VoiceRegister::FreqLo.for_voice(Voice::One),
            WritableRegister::Voice1FreqLo
        );
        assert_eq!(
            VoiceRegister::ControlReg.for_voice(Voice::Two),
            WritableRegister::Voice2ControlReg
        );
        assert_eq!(
            VoiceRegister::SustainRelease.for_voice(Voice::Three),
            WritableRegister::Voice3SustainRelease
        );
    }

    #[test]
    fn test_default_config() {
        let config = SidConfig::default();
        assert_eq!(config.chip_model, ChipModel::MOS6581);
        assert_eq!(config.sampling_method, SamplingMethod::Resample);
        assert_eq!(config.clock_frequency, 985_248.0);
        assert_eq!(config.sampling_frequency, 48_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_helpers() {
        let mut sid = device();
        sid.oscillator(Voice::Two, 0x1125).unwrap();
        sid.pulse_width(Voice::Three, 0x0abc).unwrap();
        sid.filter_cutoff(0x07ff).unwrap();

        let regs = sid.registers();
        assert_eq!(regs[0x07], 0x25);
        assert_eq!(regs[0x08], 0x11);
        assert_eq!(regs[0x10], 0xbc);
        assert_eq!(regs[0x11], 0x0a);
        assert_eq!(regs[0x15], 0x07);
        assert_eq!(regs[0x16], 0xff);
    }

    #[test]
    fn test_range_checks() {
        let mut sid = device();
        assert!(matches!(
            sid.set_voice1_control_reg(256),
            Err(SidError::OutOfRange { max: 255, .. })
        ));
        assert!(sid.pulse_width(Voice::One, 4096).is_err());
        assert!(sid.filter_cutoff(2048).is_err());
        assert!(sid.oscillator(Voice::One, 0x1_0000).is_err());
        assert!(sid.write_register(0x19, 0).is_err());
        assert!(sid.read_register(0x1d).is_err());
        assert!(sid.set_potentiometers(0, 256).is_err());

        // Rejected values leave the registers untouched
        assert_eq!(sid.registers()[0x04], 0);
        assert_eq!(sid.registers()[0x02], 0);
    }

    #[test]
    fn test_accessors_and_potentiometers() {
        let mut sid = device();
        assert_eq!(sid.misc_potx(), 0xff);
        sid.set_potentiometers(0x12, 0x34).unwrap();
        assert_eq!(sid.misc_potx(), 0x12);
        assert_eq!(sid.misc_poty(), 0x34);
        assert_eq!(sid.read_register(0x1a).unwrap(), 0x34);

        sid.set_filter_res_filt(0xf1).unwrap();
        assert_eq!(sid.registers()[0x17], 0xf1);
        assert_eq!(sid.misc_env3(), 0);
    }

    #[test]
    fn test_duration_clocking() {
        let mut sid = device();
        let samples = sid.clock(Duration::from_millis(100));
        assert!((samples.len() as i64 - 4800).abs() <= 1);
    }

    #[test]
    fn test_failed_reconfiguration_keeps_state() {
        let mut sid = device();
        sid.set_filter_mode_vol(0x0f).unwrap();

        assert!(matches!(
            sid.set_sampling_frequency(2_000_000.0),
            Err(SidError::InvalidConfiguration(_))
        ));
        assert_eq!(sid.sampling_frequency(), 48_000.0);
        assert_eq!(sid.registers()[0x18], 0x0f);

        sid.set_sampling_frequency(44_100.0).unwrap();
        assert_eq!(sid.sampling_frequency(), 44_100.0);
        assert_eq!(sid.registers()[0x18], 0);
    }

    #[test]
    fn test_chip_model_switch() {
        let mut sid = device();
        sid.set_chip_model(ChipModel::MOS8580).unwrap();
        assert_eq!(sid.chip_model(), ChipModel::MOS8580);
        assert_eq!(sid.sid().chip_model(), ChipModel::MOS8580);
    }

    #[test]
    fn test_filter_curve_bounds() {
        let mut sid = device();
        assert!(sid.set_filter_6581_curve(0.0).is_ok());
        assert!(sid.set_filter_8580_curve(1.0).is_ok());
        assert!(sid.set_filter_6581_curve(1.5).is_err());
        assert!(sid.set_filter_8580_curve(f64::NAN).is_err());
    }

    #[test]
    fn test_mute_helpers() {
        let mut sid = device();
        sid.mute(Voice::Two);
        assert!(sid.is_muted(Voice::Two));
        sid.reset();
        assert!(sid.is_muted(Voice::Two));
        sid.unmute(Voice::Two);
        assert!(!sid.is_muted(Voice::Two));
    }
}
