// Derived from resid-rs.
// Copyright (c) 2017-2019 Sebastian Jastrzebski <sebby2k@gmail.com>.
// Portions (c) 2004 Dag Lem <resid@nimrod.no>
// Licensed under the GPLv3.

//! ADSR Envelope Generator
//!
//! A 15-bit rate counter divides the system clock by the period selected
//! from the datasheet rate table. Each time it matches, the 8-bit envelope
//! level steps once: up during Attack, down during Decay and Release. In
//! Decay and Release a second divider stretches the steps at low levels,
//! approximating the chip's exponential curve.
//!
//! The level saturates at both ends. Once it reaches zero it stays there
//! until the gate rises again.

use std::fmt;

use super::constants::{EXPONENTIAL_PERIODS, RATE_COUNTER_PERIOD, SUSTAIN_LEVEL};
use super::registers::ControlBits;

const RATE_COUNTER_MASK: u16 = 0x7fff;
const RATE_COUNTER_MSB: u16 = 0x8000;

/// Envelope state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Rising toward 0xFF
    Attack,
    /// Falling toward the sustain level, then holding it
    DecaySustain,
    /// Falling toward zero after the gate was cleared
    Release,
}

impl fmt::Display for EnvelopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeState::Attack => write!(f, "Attack"),
            EnvelopeState::DecaySustain => write!(f, "Decay/Sustain"),
            EnvelopeState::Release => write!(f, "Release"),
        }
    }
}

/// Per-voice envelope generator
#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    attack: u8,
    decay: u8,
    sustain: u8,
    release: u8,
    gate: bool,

    state: EnvelopeState,
    level: u8,
    rate_counter: u16,
    rate_period: u16,
    exponential_counter: u8,
    exponential_period: u8,
    hold_zero: bool,
}

impl EnvelopeGenerator {
    /// Create a generator in its power-up state (Release, level 0)
    pub fn new() -> Self {
        EnvelopeGenerator {
            attack: 0,
            decay: 0,
            sustain: 0,
            release: 0,
            gate: false,
            state: EnvelopeState::Release,
            level: 0,
            rate_counter: 0,
            rate_period: RATE_COUNTER_PERIOD[0],
            exponential_counter: 0,
            exponential_period: 1,
            hold_zero: true,
        }
    }

    /// Return to the power-up state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current 8-bit envelope level
    #[inline]
    pub fn output(&self) -> u8 {
        self.level
    }

    /// Current state machine phase
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Handle a control register write; only the GATE bit matters here.
    pub fn set_control(&mut self, value: u8) {
        let gate = ControlBits::from_bits_retain(value).contains(ControlBits::GATE);
        if !self.gate && gate {
            self.state = EnvelopeState::Attack;
            self.rate_period = RATE_COUNTER_PERIOD[self.attack as usize];
            self.hold_zero = false;
        } else if self.gate && !gate {
            self.state = EnvelopeState::Release;
            self.rate_period = RATE_COUNTER_PERIOD[self.release as usize];
        }
        self.gate = gate;
    }

    /// Write the attack (high nibble) and decay (low nibble) rates
    pub fn set_attack_decay(&mut self, value: u8) {
        self.attack = value >> 4;
        self.decay = value & 0x0f;
        match self.state {
            EnvelopeState::Attack => self.rate_period = RATE_COUNTER_PERIOD[self.attack as usize],
            EnvelopeState::DecaySustain => {
                self.rate_period = RATE_COUNTER_PERIOD[self.decay as usize]
            }
            EnvelopeState::Release => {}
        }
    }

    /// Write the sustain level (high nibble) and release rate (low nibble)
    pub fn set_sustain_release(&mut self, value: u8) {
        self.sustain = value >> 4;
        self.release = value & 0x0f;
        if self.state == EnvelopeState::Release {
            self.rate_period = RATE_COUNTER_PERIOD[self.release as usize];
        }
    }

    /// Advance by one cycle
    #[inline]
    pub fn clock(&mut self) {
        // A period lowered below the running count is only matched after
        // the 15-bit counter wraps.
        self.rate_counter += 1;
        if self.rate_counter & RATE_COUNTER_MSB != 0 {
            self.rate_counter = (self.rate_counter + 1) & RATE_COUNTER_MASK;
        }
        if self.rate_counter != self.rate_period {
            return;
        }
        self.rate_counter = 0;

        self.exponential_counter = self.exponential_counter.wrapping_add(1);
        if self.state != EnvelopeState::Attack
            && self.exponential_counter < self.exponential_period
        {
            return;
        }
        self.exponential_counter = 0;

        if self.hold_zero {
            return;
        }
        self.step();
    }

    fn step(&mut self) {
        match self.state {
            EnvelopeState::Attack => {
                self.level = self.level.saturating_add(1);
                if self.level == 0xff {
                    self.state = EnvelopeState::DecaySustain;
                    self.rate_period = RATE_COUNTER_PERIOD[self.decay as usize];
                }
            }
            EnvelopeState::DecaySustain => {
                if self.level > SUSTAIN_LEVEL[self.sustain as usize] {
                    self.level -= 1;
                }
            }
            EnvelopeState::Release => {
                self.level = self.level.saturating_sub(1);
            }
        }

        if self.level == 0 {
            self.exponential_period = 1;
            self.hold_zero = true;
        } else if let Some(&(_, period)) = EXPONENTIAL_PERIODS
            .iter()
            .find(|(threshold, _)| *threshold == self.level)
        {
            self.exponential_period = period;
        }
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
