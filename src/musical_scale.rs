//! Musical Scale
//!
//! Oscillator frequency words for equal-tempered notes C0 to A#7, as
//! printed in the 6581 datasheet for a 1 MHz clock. The datasheet's
//! values are kept verbatim, including its misprints for G3, G7 and G#7.

use std::fmt;
use std::str::FromStr;

use crate::SidError;

/// Note names within an octave, starting from C
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Datasheet musical scale; the discriminant is the 16-bit frequency word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Tone {
    /// C0 (16.35 Hz)
    C0 = 0x0112,
    /// C#0 (17.32 Hz)
    Cs0 = 0x0123,
    /// D0 (18.35 Hz)
    D0 = 0x0134,
    /// D#0 (19.44 Hz)
    Ds0 = 0x0146,
    /// E0 (20.60 Hz)
    E0 = 0x015A,
    /// F0 (21.83 Hz)
    F0 = 0x016E,
    /// F#0 (23.12 Hz)
    Fs0 = 0x0184,
    /// G0 (24.50 Hz)
    G0 = 0x018B,
    /// G#0 (25.96 Hz)
    Gs0 = 0x01B3,
    /// A0 (27.50 Hz)
    A0 = 0x01CD,
    /// A#0 (29.14 Hz)
    As0 = 0x01E9,
    /// B0 (30.87 Hz)
    B0 = 0x0206,
    /// C1 (32.70 Hz)
    C1 = 0x0225,
    /// C#1 (34.65 Hz)
    Cs1 = 0x0245,
    /// D1 (36.71 Hz)
    D1 = 0x0268,
    /// D#1 (38.89 Hz)
    Ds1 = 0x028C,
    /// E1 (41.20 Hz)
    E1 = 0x02B3,
    /// F1 (43.65 Hz)
    F1 = 0x02DC,
    /// F#1 (46.25 Hz)
    Fs1 = 0x0308,
    /// G1 (49.00 Hz)
    G1 = 0x0336,
    /// G#1 (51.91 Hz)
    Gs1 = 0x0367,
    /// A1 (55.00 Hz)
    A1 = 0x039B,
    /// A#1 (58.27 Hz)
    As1 = 0x03D2,
    /// B1 (61.74 Hz)
    B1 = 0x040C,
    /// C2 (65.41 Hz)
    C2 = 0x0449,
    /// C#2 (69.30 Hz)
    Cs2 = 0x048B,
    /// D2 (73.42 Hz)
    D2 = 0x04D0,
    /// D#2 (77.78 Hz)
    Ds2 = 0x0519,
    /// E2 (82.41 Hz)
    E2 = 0x0567,
    /// F2 (87.31 Hz)
    F2 = 0x05B9,
    /// F#2 (92.50 Hz)
    Fs2 = 0x0610,
    /// G2 (98.00 Hz)
    G2 = 0x066C,
    /// G#2 (103.83 Hz)
    Gs2 = 0x06CE,
    /// A2 (110.00 Hz)
    A2 = 0x0735,
    /// A#2 (116.54 Hz)
    As2 = 0x07A3,
    /// B2 (123.47 Hz)
    B2 = 0x0817,
    /// C3 (130.81 Hz)
    C3 = 0x0893,
    /// C#3 (138.59 Hz)
    Cs3 = 0x0915,
    /// D3 (146.83 Hz)
    D3 = 0x099F,
    /// D#3 (155.56 Hz)
    Ds3 = 0x0A32,
    /// E3 (164.81 Hz)
    E3 = 0x0ACD,
    /// F3 (174.61 Hz)
    F3 = 0x0B72,
    /// F#3 (185.00 Hz)
    Fs3 = 0x0C20,
    /// G3 (196.00 Hz)
    G3 = 0x0C08,
    /// G#3 (207.65 Hz)
    Gs3 = 0x0D9C,
    /// A3 (220.00 Hz)
    A3 = 0x0E6B,
    /// A#3 (233.08 Hz)
    As3 = 0x0F46,
    /// B3 (246.94 Hz)
    B3 = 0x102F,
    /// C4 (261.63 Hz)
    C4 = 0x1125,
    /// C#4 (277.18 Hz)
    Cs4 = 0x122A,
    /// D4 (293.66 Hz)
    D4 = 0x133F,
    /// D#4 (311.13 Hz)
    Ds4 = 0x1464,
    /// E4 (329.63 Hz)
    E4 = 0x159A,
    /// F4 (349.23 Hz)
    F4 = 0x16E3,
    /// F#4 (370.00 Hz)
    Fs4 = 0x183F,
    /// G4 (392.00 Hz)
    G4 = 0x1981,
    /// G#4 (415.30 Hz)
    Gs4 = 0x1B38,
    /// A4 (440.00 Hz)
    A4 = 0x1CD6,
    /// A#4 (466.16 Hz)
    As4 = 0x1E80,
    /// B4 (493.88 Hz)
    B4 = 0x205E,
    /// C5 (523.25 Hz)
    C5 = 0x224B,
    /// C#5 (554.37 Hz)
    Cs5 = 0x2455,
    /// D5 (587.33 Hz)
    D5 = 0x267E,
    /// D#5 (622.25 Hz)
    Ds5 = 0x28C8,
    /// E5 (659.25 Hz)
    E5 = 0x2B34,
    /// F5 (698.46 Hz)
    F5 = 0x2DC6,
    /// F#5 (740.00 Hz)
    Fs5 = 0x307F,
    /// G5 (783.99 Hz)
    G5 = 0x3361,
    /// G#5 (830.61 Hz)
    Gs5 = 0x366F,
    /// A5 (880.00 Hz)
    A5 = 0x39AC,
    /// A#5 (932.33 Hz)
    As5 = 0x3D1A,
    /// B5 (987.77 Hz)
    B5 = 0x40BC,
    /// C6 (1046.50 Hz)
    C6 = 0x4495,
    /// C#6 (1108.73 Hz)
    Cs6 = 0x48A9,
    /// D6 (1174.66 Hz)
    D6 = 0x4CFC,
    /// D#6 (1244.51 Hz)
    Ds6 = 0x518F,
    /// E6 (1318.51 Hz)
    E6 = 0x5669,
    /// F6 (1396.91 Hz)
    F6 = 0x5B8C,
    /// F#6 (1479.98 Hz)
    Fs6 = 0x60FE,
    /// G6 (1567.98 Hz)
    G6 = 0x6602,
    /// G#6 (1661.22 Hz)
    Gs6 = 0x6CDF,
    /// A6 (1760.00 Hz)
    A6 = 0x7358,
    /// A#6 (1864.65 Hz)
    As6 = 0x7A34,
    /// B6 (1975.53 Hz)
    B6 = 0x8178,
    /// C7 (2093.00 Hz)
    C7 = 0x892B,
    /// C#7 (2217.46 Hz)
    Cs7 = 0x9153,
    /// D7 (2349.32 Hz)
    D7 = 0x99F7,
    /// D#7 (2489.01 Hz)
    Ds7 = 0xA31F,
    /// E7 (2637.02 Hz)
    E7 = 0xACD2,
    /// F7 (2793.83 Hz)
    F7 = 0xB719,
    /// F#7 (2959.95 Hz)
    Fs7 = 0xC1FC,
    /// G7 (3135.96 Hz)
    G7 = 0xC085,
    /// G#7 (3322.44 Hz)
    Gs7 = 0x0980,
    /// A7 (3520.00 Hz)
    A7 = 0xE6B0,
    /// A#7 (3729.31 Hz)
    As7 = 0xF467,
}

impl Tone {
    /// All tones in ascending order
    pub const ALL: [Tone; 95] = [
        Tone::C0,
        Tone::Cs0,
        Tone::D0,
        Tone::Ds0,
        Tone::E0,
        Tone::F0,
        Tone::Fs0,
        Tone::G0,
        Tone::Gs0,
        Tone::A0,
        Tone::As0,
        Tone::B0,
        Tone::C1,
        Tone::Cs1,
        Tone::D1,
        Tone::Ds1,
        Tone::E1,
        Tone::F1,
        Tone::Fs1,
        Tone::G1,
        Tone::Gs1,
        Tone::A1,
        Tone::As1,
        Tone::B1,
        Tone::C2,
        Tone::Cs2,
        Tone::D2,
        Tone::Ds2,
        Tone::E2,
        Tone::F2,
        Tone::Fs2,
        Tone::G2,
        Tone::Gs2,
        Tone::A2,
        Tone::As2,
        Tone::B2,
        Tone::C3,
        Tone::Cs3,
        Tone::D3,
        Tone::Ds3,
        Tone::E3,
        Tone::F3,
        Tone::Fs3,
        Tone::G3,
        Tone::Gs3,
        Tone::A3,
        Tone::As3,
        Tone::B3,
        Tone::C4,
        Tone::Cs4,
        Tone::D4,
        Tone::Ds4,
        Tone::E4,
        Tone::F4,
        Tone::Fs4,
        Tone::G4,
        Tone::Gs4,
        Tone::A4,
        Tone::As4,
        Tone::B4,
        Tone::C5,
        Tone::Cs5,
        Tone::D5,
        Tone::Ds5,
        Tone::E5,
        Tone::F5,
        Tone::Fs5,
        Tone::G5,
        Tone::Gs5,
        Tone::A5,
        Tone::As5,
        Tone::B5,
        Tone::C6,
        Tone::Cs6,
        Tone::D6,
        Tone::Ds6,
        Tone::E6,
        Tone::F6,
        Tone::Fs6,
        Tone::G6,
        Tone::Gs6,
        Tone::A6,
        Tone::As6,
        Tone::B6,
        Tone::C7,
        Tone::Cs7,
        Tone::D7,
        Tone::Ds7,
        Tone::E7,
        Tone::F7,
        Tone::Fs7,
        Tone::G7,
        Tone::Gs7,
        Tone::A7,
        Tone::As7,
    ];

    /// 16-bit oscillator frequency word
    pub fn word(&self) -> u16 {
        *self as u16
    }

    /// Position in the scale, C0 = 0
    pub fn index(&self) -> usize {
        Tone::ALL
            .iter()
            .position(|tone| tone == self)
            .unwrap_or_default()
    }

    /// Octave number (0-7)
    pub fn octave(&self) -> u8 {
        (self.index() / 12) as u8
    }

    /// Note name, e.g. `C#4`
    pub fn name(&self) -> String {
        let index = self.index();
        format!("{}{}", NOTE_NAMES[index % 12], index / 12)
    }

    /// Output frequency in Hz of this word at the given system clock
    pub fn frequency(&self, clock_freq: f64) -> f64 {
        self.word() as f64 * clock_freq / (1u32 << 24) as f64
    }

    /// Look up a tone by its frequency word
    pub fn from_word(word: u16) -> Option<Self> {
        Tone::ALL.iter().copied().find(|tone| tone.word() == word)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Tone {
    type Err = SidError;

    /// Accepts `C#4`, `Cs4` and `C4s` spellings, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let mut chars = upper.chars();
        let invalid = || SidError::InvalidConfiguration(format!("unknown tone '{s}'"));

        let letter = chars.next().ok_or_else(invalid)?;
        let rest: String = chars.collect();
        let (sharp, octave) = match rest.as_str() {
            r if r.starts_with('#') || r.starts_with('S') => (true, &r[1..]),
            r if r.ends_with('S') => (true, &r[..r.len() - 1]),
            r => (false, r),
        };
        let octave: usize = octave.parse().map_err(|_| invalid())?;
        let note = format!("{letter}{}", if sharp { "#" } else { "" });
        let semitone = NOTE_NAMES
            .iter()
            .position(|name| *name == note)
            .ok_or_else(invalid)?;

        Tone::ALL
            .get(octave * 12 + semitone)
            .copied()
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sid::constants::clock;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_is_complete() {
        assert_eq!(Tone::ALL.len(), 95);
        assert_eq!(Tone::ALL[0], Tone::C0);
        assert_eq!(Tone::ALL[94], Tone::As7);
        assert_eq!(Tone::C4.word(), 0x1125);
        assert_eq!(Tone::A4.word(), 0x1CD6);
    }

    #[test]
    fn test_names_round_trip() {
        for tone in Tone::ALL {
            assert_eq!(tone.name().parse::<Tone>().ok(), Some(tone));
        }
        assert_eq!("c#4".parse::<Tone>().ok(), Some(Tone::Cs4));
        assert_eq!("Cs4".parse::<Tone>().ok(), Some(Tone::Cs4));
        assert_eq!("C4s".parse::<Tone>().ok(), Some(Tone::Cs4));
        assert!("B7".parse::<Tone>().is_err());
        assert!("H2".parse::<Tone>().is_err());
        assert!("".parse::<Tone>().is_err());
    }

    #[test]
    fn test_frequency_matches_datasheet_clock() {
        assert_relative_eq!(Tone::A4.frequency(1_000_000.0), 440.0, max_relative = 0.001);
        assert!(Tone::A4.frequency(clock::PAL) < Tone::A4.frequency(clock::NTSC));
        assert_eq!(Tone::A4.octave(), 4);
    }

    #[test]
    fn test_from_word() {
        assert_eq!(Tone::from_word(0x1125), Some(Tone::C4));
        assert_eq!(Tone::from_word(0x1126), None);
    }
}
