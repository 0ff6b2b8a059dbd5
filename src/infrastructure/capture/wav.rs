//! WAV packaging of captured PCM
//!
//! The captured samples are wrapped in a WAV container as-is; no resampling
//! or transcoding happens on the upload path.

use std::io::Cursor;

use crate::application::ports::CaptureError;

/// Package mono 16-bit PCM samples as an in-memory WAV file
pub fn package_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, CaptureError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| CaptureError::Failed(format!("WAV init failed: {}", e)))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| CaptureError::Failed(format!("WAV write failed: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| CaptureError::Failed(format!("WAV finalize failed: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaged_wav_reads_back() {
        let samples: Vec<i16> = vec![0, 100, -100, 32000, -32000];
        let bytes = package_wav(&samples, 16000).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);

        let read: Vec<i16> = reader.into_samples().map(Result::unwrap).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn empty_sample_set_still_packages() {
        let bytes = package_wav(&[], 44100).unwrap();
        assert!(bytes.starts_with(b"RIFF"));
    }
}
