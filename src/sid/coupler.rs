//! Hard Sync and Ring Modulation
//!
//! Voice n takes voice (n+2) mod 3 as its modulation source: voice 1 follows
//! voice 3, voice 2 follows voice 1, voice 3 follows voice 2.
//!
//! Every source MSB is captured before any oscillator advances, and all sync
//! decisions are taken from the flags of the cycle before any accumulator is
//! reset. The result therefore does not depend on the order the voices are
//! visited in.

use super::registers::ControlBits;
use super::voice::Voice;

/// Index of the voice that modulates `voice`
#[inline]
pub const fn source_of(voice: usize) -> usize {
    (voice + 2) % 3
}

/// Cross-voice coupling state
#[derive(Debug, Clone, Default)]
pub struct Coupler {
    source_msb: [bool; 3],
}

impl Coupler {
    /// Create a coupler with all captured MSBs cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the captured MSBs
    pub fn reset(&mut self) {
        self.source_msb = [false; 3];
    }

    /// Capture every voice's source MSB at the start of a cycle
    #[inline]
    pub fn capture(&mut self, voices: &[Voice; 3]) {
        for (voice, msb) in self.source_msb.iter_mut().enumerate() {
            *msb = voices[source_of(voice)].wave().msb();
        }
    }

    /// Source MSB captured at the start of the current cycle, used by the
    /// ring-modulated triangle of `voice`
    #[inline]
    pub fn ring_msb(&self, voice: usize) -> bool {
        self.source_msb[voice]
    }

    /// Apply hard sync after all oscillators have been clocked
    ///
    /// A voice with SYNC set is reset when its source wrapped this cycle,
    /// unless the source was itself reset by sync in the same cycle.
    #[inline]
    pub fn synchronize(&self, voices: &mut [Voice; 3]) {
        let wrapped = [
            voices[0].wave().msb_falling(),
            voices[1].wave().msb_falling(),
            voices[2].wave().msb_falling(),
        ];
        let syncing = |voice: usize| {
            voices[voice].wave().control().contains(ControlBits::SYNC)
                && wrapped[source_of(voice)]
        };
        let resets = [syncing(0), syncing(1), syncing(2)];

        for (voice, reset) in resets.iter().enumerate() {
            let source = source_of(voice);
            if *reset && !resets[source] {
                voices[voice].wave_mut().sync_reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sid::voice::offset;

    fn voices() -> [Voice; 3] {
        [Voice::new(), Voice::new(), Voice::new()]
    }

    fn set_frequency(voice: &mut Voice, frequency: u16) {
        voice.write(offset::FREQ_LO, (frequency & 0xff) as u8);
        voice.write(offset::FREQ_HI, (frequency >> 8) as u8);
    }

    fn cycle(coupler: &mut Coupler, voices: &mut [Voice; 3]) {
        coupler.capture(voices);
        for voice in voices.iter_mut() {
            voice.clock();
        }
        coupler.synchronize(voices);
    }

    #[test]
    fn test_source_mapping() {
        assert_eq!(source_of(0), 2);
        assert_eq!(source_of(1), 0);
        assert_eq!(source_of(2), 1);
    }

    #[test]
    fn test_sync_resets_destination_on_source_wrap() {
        let mut coupler = Coupler::new();
        let mut voices = voices();
        // Voice 1 first wraps on cycle 257, voice 2 is synced to it
        set_frequency(&mut voices[0], 0xffff);
        set_frequency(&mut voices[1], 0x0100);
        voices[1].write(offset::CONTROL, ControlBits::SYNC.bits());

        for _ in 0..256 {
            cycle(&mut coupler, &mut voices);
        }
        assert_eq!(voices[1].wave().accumulator(), 0x100 * 256);

        cycle(&mut coupler, &mut voices);
        assert!(voices[0].wave().msb_falling());
        assert_eq!(voices[1].wave().accumulator(), 0);

        cycle(&mut coupler, &mut voices);
        assert_eq!(voices[1].wave().accumulator(), 0x100);
    }

    #[test]
    fn test_no_sync_without_sync_bit() {
        let mut coupler = Coupler::new();
        let mut voices = voices();
        set_frequency(&mut voices[0], 0xffff);
        set_frequency(&mut voices[1], 0x0100);

        for _ in 0..256 {
            cycle(&mut coupler, &mut voices);
        }
        assert_eq!(voices[1].wave().accumulator(), 0x100 * 256);
    }

    #[test]
    fn test_ring_msb_is_start_of_cycle_snapshot() {
        let mut coupler = Coupler::new();
        let mut voices = voices();
        // Voice 3 reaches its MSB after 0x100 cycles
        set_frequency(&mut voices[2], 0x8000);
        for _ in 0..0x100 {
            cycle(&mut coupler, &mut voices);
        }
        assert!(voices[2].wave().msb());
        assert!(!coupler.ring_msb(0));

        cycle(&mut coupler, &mut voices);
        assert!(coupler.ring_msb(0));
    }
}
