//! Audio output, offline rendering and WAV export.

pub mod output;

pub use output::{render_offline, AudioOutput, EngineCommand, SharedControls};

use std::path::Path;

use crate::error::{Result, StringError};

/// Hard output limiter: clamps a sample into `[-1, 1]`.
///
/// Sits at the audio boundary, independent of the core, so no invalid
/// sample ever reaches a device even when the simulation misbehaves.
/// NaN maps to silence.
pub fn limit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}

/// Save mono samples to a 32-bit float WAV file.
pub fn save_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)
        .map_err(|e| StringError::device(format!("failed to create WAV: {}", e)))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| StringError::device(format!("failed to write WAV: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| StringError::device(format!("failed to finalize WAV: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_bounds_everything() {
        assert_eq!(limit(0.5), 0.5);
        assert_eq!(limit(3.0), 1.0);
        assert_eq!(limit(-3.0), -1.0);
        assert_eq!(limit(f64::NAN), 0.0);
        assert_eq!(limit(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_save_wav_round_trip() {
        let path = std::env::temp_dir().join("dynastring-wav-test.wav");
        let samples: Vec<f32> = (0..64).map(|i| (i as f32 / 64.0).sin()).collect();
        save_wav(&path, &samples, 44_100).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 44_100);
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read.len(), samples.len());
        assert!((read[10] - samples[10]).abs() < 1e-7);

        let _ = std::fs::remove_file(&path);
    }
}
