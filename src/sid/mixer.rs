//! Output Mixer
//!
//! Applies the per-voice mute switches before routing, then scales the
//! filter stage output by the 4-bit master volume and saturates it to a
//! signed 16-bit sample.

/// Divisor bringing `mix × volume` into the 16-bit range
const OUTPUT_DIVISOR: i32 = 11;

/// Master volume and mute state
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    volume: u8,
    muted: [bool; 3],
}

impl Mixer {
    /// Create a mixer at volume 0 with every voice audible
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the volume; mute switches are not part of the chip and survive
    pub fn reset(&mut self) {
        self.volume = 0;
    }

    /// Take the volume from the low nibble of $18
    pub fn set_mode_vol(&mut self, value: u8) {
        self.volume = value & 0x0f;
    }

    /// Current master volume (0-15)
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Mute or unmute one voice (0-2)
    pub fn set_muted(&mut self, voice: usize, muted: bool) {
        if let Some(slot) = self.muted.get_mut(voice) {
            *slot = muted;
        }
    }

    /// Whether a voice is muted
    pub fn is_muted(&self, voice: usize) -> bool {
        self.muted.get(voice).copied().unwrap_or(false)
    }

    /// Voice sample as seen by the filter routing
    #[inline]
    pub fn gate(&self, voice: usize, sample: i32) -> i32 {
        if self.is_muted(voice) {
            0
        } else {
            sample
        }
    }

    /// Final output sample from the filter stage sum
    #[inline]
    pub fn output(&self, mix: i32) -> i16 {
        let scaled = mix as i64 * self.volume as i64 / OUTPUT_DIVISOR as i64;
        scaled.clamp(i16::MIN as i64, i16::MAX as i64) as i16
    }
}
