use std::path::Path;

use crate::audio::domain::audio_clip::AudioClip;
use crate::wav::domain::clip_reader::ClipReader;
use crate::wav::domain::encoding::{SampleEncoding, WavEncoding, WavError};

/// Decodes waveform files using hound.
///
/// Integer PCM is scaled into `[-1.0, 1.0)` floats; 32-bit float files are
/// taken as-is.
pub struct HoundClipReader;

impl ClipReader for HoundClipReader {
    fn read_clip(&self, path: &Path) -> Result<(AudioClip, WavEncoding), WavError> {
        let mut reader = hound::WavReader::open(path).map_err(|e| WavError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| WavError::Decode {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(WavError::UnsupportedEncoding {
                        path: path.to_path_buf(),
                        reason: format!("{} bits per sample", spec.bits_per_sample),
                    });
                }
                let max_val = (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<_, _>>()
                    .map_err(|e| WavError::Decode {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })?
            }
        };

        let encoding = WavEncoding {
            bits_per_sample: spec.bits_per_sample,
            sample_encoding: match spec.sample_format {
                hound::SampleFormat::Int => SampleEncoding::Int,
                hound::SampleFormat::Float => SampleEncoding::Float,
            },
        };

        Ok((
            AudioClip::new(samples, spec.sample_rate, spec.channels),
            encoding,
        ))
    }
}
