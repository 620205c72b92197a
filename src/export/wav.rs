//! WAV file export

use std::path::Path;

use log::info;

use super::{normalize_samples, ExportConfig};
use crate::{Result, SidError};

/// Write mono 16-bit PCM samples to a WAV file
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[i16], sample_rate: u32) -> Result<()> {
    write_wav_with_config(path, samples, ExportConfig::with_sample_rate(sample_rate))
}

/// Write mono samples to a WAV file, normalizing first if `config` asks
pub fn write_wav_with_config<P: AsRef<Path>>(
    path: P,
    samples: &[i16],
    config: ExportConfig,
) -> Result<()> {
    let mut samples = samples.to_vec();
    if config.normalize {
        normalize_samples(&mut samples);
    }

    info!(
        "writing {} samples ({} Hz) to {}",
        samples.len(),
        config.sample_rate,
        path.as_ref().display()
    );
    write_wav_file(path.as_ref(), &samples, config.sample_rate)
}

fn write_wav_file(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| SidError::AudioFileError(format!("Failed to create WAV file: {e}")))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| SidError::AudioFileError(format!("Failed to write sample: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| SidError::AudioFileError(format!("Failed to finalize WAV file: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn read_back(path: &Path) -> (hound::WavSpec, Vec<i16>) {
        let mut reader = hound::WavReader::open(path).unwrap();
        let spec = reader.spec();
        let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        (spec, samples)
    }

    #[test]
    fn test_write_and_read_back() {
        let file = NamedTempFile::new().unwrap();
        let samples = [0i16, 1000, -1000, i16::MAX, i16::MIN];
        write_wav(file.path(), &samples, 44_100).unwrap();

        let (spec, read) = read_back(file.path());
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(read, samples);
    }

    #[test]
    fn test_normalized_export_keeps_headroom() {
        let file = NamedTempFile::new().unwrap();
        let samples = [i16::MAX, -20_000, 0];
        let config = ExportConfig::with_sample_rate(48_000).normalize(true);
        write_wav_with_config(file.path(), &samples, config).unwrap();

        let (_, read) = read_back(file.path());
        assert_eq!(read.len(), 3);
        assert!(read[0] < i16::MAX && read[0] > 30_000);
        assert_eq!(read[2], 0);
    }

    #[test]
    fn test_unwritable_path_reports_audio_error() {
        let result = write_wav("/nonexistent-dir/out.wav", &[0], 48_000);
        assert!(matches!(result, Err(SidError::AudioFileError(_))));
    }
}
