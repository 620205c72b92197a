// Derived from resid-rs.
// Copyright (c) 2017-2019 Sebastian Jastrzebski <sebby2k@gmail.com>.
// Portions (c) 2004 Dag Lem <resid@nimrod.no>
// Licensed under the GPLv3.

//! Multimode Filter
//!
//! Two-integrator-loop state-variable filter producing simultaneous
//! high-pass, band-pass and low-pass outputs:
//!
//! ```text
//! Vhp = Vbp/Q - Vlp - Vi
//! dVbp = -w0 * Vhp * dt
//! dVlp = -w0 * Vbp * dt
//! ```
//!
//! With a 1 MHz clock `dt` is 1 µs, folded into `w0` by scaling it by
//! 2^20 / 10^6 and shifting the products right by 20.

use std::f64::consts::PI;

use super::constants::ChipModel;
use super::registers::{ModeVolBits, ResFiltBits};

/// Cutoff ceiling keeping the single-cycle integration stable (Hz)
const MAX_CUTOFF_HZ: f64 = 16_000.0;

/// 2^20 / 1_000_000
const FIXP_SCALE: f64 = 1.048_576;

/// Neutral filter curve setting
pub const DEFAULT_CURVE: f64 = 0.5;

/// Voice samples are scaled from 20 to 13 bits before filtering
const VOICE_SHIFT: u32 = 7;

/// Split voice and external input into (filter input, bypass) sums
/// according to the routing nibble of $17.
#[inline]
pub const fn route_voices(filt: u8, v1: i32, v2: i32, v3: i32, ext: i32) -> (i32, i32) {
    match filt & 0x0f {
        0x0 => (0, v1 + v2 + v3 + ext),
        0x1 => (v1, v2 + v3 + ext),
        0x2 => (v2, v1 + v3 + ext),
        0x3 => (v1 + v2, v3 + ext),
        0x4 => (v3, v1 + v2 + ext),
        0x5 => (v1 + v3, v2 + ext),
        0x6 => (v2 + v3, v1 + ext),
        0x7 => (v1 + v2 + v3, ext),
        0x8 => (ext, v1 + v2 + v3),
        0x9 => (v1 + ext, v2 + v3),
        0xa => (v2 + ext, v1 + v3),
        0xb => (v1 + v2 + ext, v3),
        0xc => (v3 + ext, v1 + v2),
        0xd => (v1 + v3 + ext, v2),
        0xe => (v2 + v3 + ext, v1),
        _ => (v1 + v2 + v3 + ext, 0),
    }
}

/// Sum the taps selected by the HP/BP/LP bits (bit 2/1/0)
#[inline]
pub const fn mix_filter_output(vhp: i32, vbp: i32, vlp: i32, hp_bp_lp: u8) -> i32 {
    match hp_bp_lp & 0x07 {
        0x0 => 0,
        0x1 => vlp,
        0x2 => vbp,
        0x3 => vlp + vbp,
        0x4 => vhp,
        0x5 => vlp + vhp,
        0x6 => vbp + vhp,
        _ => vlp + vbp + vhp,
    }
}

/// SID filter state
#[derive(Debug, Clone)]
pub struct Filter {
    chip_model: ChipModel,
    enabled: bool,
    curve_6581: f64,
    curve_8580: f64,

    // Registers
    fc: u16,
    res: u8,
    filt: u8,
    voice3_off: bool,
    hp_bp_lp: u8,

    // Integrator state
    vhp: i32,
    vbp: i32,
    vlp: i32,
    vnf: i32,

    // Coefficients derived from the registers
    w0: i64,
    q_1024_div: i64,
}

impl Filter {
    /// Create a filter for the given chip model
    pub fn new(chip_model: ChipModel) -> Self {
        let mut filter = Filter {
            chip_model,
            enabled: true,
            curve_6581: DEFAULT_CURVE,
            curve_8580: DEFAULT_CURVE,
            fc: 0,
            res: 0,
            filt: 0,
            voice3_off: false,
            hp_bp_lp: 0,
            vhp: 0,
            vbp: 0,
            vlp: 0,
            vnf: 0,
            w0: 0,
            q_1024_div: 0,
        };
        filter.set_w0();
        filter.set_q();
        filter
    }

    /// Zero registers and integrators; model, curves and bypass survive.
    pub fn reset(&mut self) {
        self.fc = 0;
        self.res = 0;
        self.filt = 0;
        self.voice3_off = false;
        self.hp_bp_lp = 0;
        self.vhp = 0;
        self.vbp = 0;
        self.vlp = 0;
        self.vnf = 0;
        self.set_w0();
        self.set_q();
    }

    /// Active chip model
    pub fn chip_model(&self) -> ChipModel {
        self.chip_model
    }

    /// Switch the cutoff and resonance tables
    pub fn set_chip_model(&mut self, chip_model: ChipModel) {
        self.chip_model = chip_model;
        self.set_w0();
        self.set_q();
    }

    /// Enable or bypass the filter; bypassed, every input goes to the mix
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the filter is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Tune the cutoff curve of one model: 0.0 bright, 1.0 dark
    pub fn set_curve(&mut self, chip_model: ChipModel, curve: f64) {
        let curve = curve.clamp(0.0, 1.0);
        match chip_model {
            ChipModel::MOS6581 => self.curve_6581 = curve,
            ChipModel::MOS8580 => self.curve_8580 = curve,
        }
        self.set_w0();
    }

    /// Curve setting of one model
    pub fn curve(&self, chip_model: ChipModel) -> f64 {
        match chip_model {
            ChipModel::MOS6581 => self.curve_6581,
            ChipModel::MOS8580 => self.curve_8580,
        }
    }

    /// Write the cutoff low bits (0-2)
    pub fn set_fc_lo(&mut self, value: u8) {
        self.fc = (self.fc & 0x7f8) | (value & 0x07) as u16;
        self.set_w0();
    }

    /// Write the cutoff high bits (3-10)
    pub fn set_fc_hi(&mut self, value: u8) {
        self.fc = ((value as u16) << 3) | (self.fc & 0x007);
        self.set_w0();
    }

    /// Write resonance and routing
    pub fn set_res_filt(&mut self, value: u8) {
        let bits = ResFiltBits::from_bits_retain(value);
        self.res = value >> 4;
        self.filt = (bits & (ResFiltBits::FILT1
            | ResFiltBits::FILT2
            | ResFiltBits::FILT3
            | ResFiltBits::FILTEX))
            .bits();
        self.set_q();
    }

    /// Write the mode bits; the volume nibble belongs to the mixer
    pub fn set_mode_vol(&mut self, value: u8) {
        let bits = ModeVolBits::from_bits_retain(value);
        self.voice3_off = bits.contains(ModeVolBits::THREE_OFF);
        self.hp_bp_lp = (value >> 4) & 0x07;
    }

    /// 11-bit cutoff register value
    pub fn cutoff(&self) -> u16 {
        self.fc
    }

    /// Cutoff frequency in Hz after curve adjustment
    pub fn cutoff_hz(&self) -> f64 {
        let base = self.chip_model.cutoff_table()[self.fc as usize] as f64;
        let scale = match self.chip_model {
            ChipModel::MOS6581 => 1.15 - 0.30 * self.curve_6581,
            ChipModel::MOS8580 => 1.2 - 0.4 * self.curve_8580,
        };
        base * scale
    }

    fn set_w0(&mut self) {
        let w0 = (2.0 * PI * self.cutoff_hz() * FIXP_SCALE) as i64;
        let w0_max = (2.0 * PI * MAX_CUTOFF_HZ * FIXP_SCALE) as i64;
        self.w0 = w0.min(w0_max);
    }

    fn set_q(&mut self) {
        self.q_1024_div = self.chip_model.resonance_table()[self.res as usize] as i64;
    }

    /// Advance by one cycle with the current voice outputs (20-bit signed)
    #[inline]
    pub fn clock(&mut self, voice1: i32, voice2: i32, voice3: i32, ext_in: i32) {
        let voice1 = voice1 >> VOICE_SHIFT;
        let voice2 = voice2 >> VOICE_SHIFT;
        // Voice 3 off only disconnects the unfiltered path
        let voice3 = if self.voice3_off && self.filt & ResFiltBits::FILT3.bits() == 0 {
            0
        } else {
            voice3 >> VOICE_SHIFT
        };
        let ext_in = ext_in >> VOICE_SHIFT;

        if !self.enabled {
            self.vnf = voice1 + voice2 + voice3 + ext_in;
            self.vhp = 0;
            self.vbp = 0;
            self.vlp = 0;
            return;
        }

        let (vi, vnf) = route_voices(self.filt, voice1, voice2, voice3, ext_in);
        self.vnf = vnf;

        let dvbp = (self.w0 * self.vhp as i64) >> 20;
        let dvlp = (self.w0 * self.vbp as i64) >> 20;
        self.vbp -= dvbp as i32;
        self.vlp -= dvlp as i32;
        self.vhp = ((self.vbp as i64 * self.q_1024_div) >> 10) as i32 - self.vlp - vi;
    }

    /// Unfiltered sum plus the selected filter taps, before master volume
    #[inline]
    pub fn output(&self) -> i32 {
        if !self.enabled {
            self.vnf
        } else {
            self.vnf + mix_filter_output(self.vhp, self.vbp, self.vlp, self.hp_bp_lp)
        }
    }

    /// Current (high-pass, band-pass, low-pass) integrator outputs
    pub fn taps(&self) -> (i32, i32, i32) {
        (self.vhp, self.vbp, self.vlp)
    }
}
