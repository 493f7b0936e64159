use std::path::Path;

use crate::audio::domain::audio_clip::AudioClip;
use crate::wav::domain::clip_writer::ClipWriter;
use crate::wav::domain::encoding::{SampleEncoding, WavEncoding, WavError};

/// Encodes clips to waveform files using hound.
///
/// Integer PCM writes clamp to `[-1.0, 1.0]` before scaling, so out-of-range
/// samples saturate instead of wrapping.
pub struct HoundClipWriter;

impl ClipWriter for HoundClipWriter {
    fn write_clip(
        &self,
        path: &Path,
        clip: &AudioClip,
        encoding: WavEncoding,
    ) -> Result<(), WavError> {
        let write_err = |e: hound::Error| WavError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let spec = hound::WavSpec {
            channels: clip.channels(),
            sample_rate: clip.sample_rate(),
            bits_per_sample: encoding.bits_per_sample,
            sample_format: match encoding.sample_encoding {
                SampleEncoding::Int => hound::SampleFormat::Int,
                SampleEncoding::Float => hound::SampleFormat::Float,
            },
        };

        let mut writer = hound::WavWriter::create(path, spec).map_err(write_err)?;

        match encoding.sample_encoding {
            SampleEncoding::Float => {
                for &sample in clip.samples() {
                    writer.write_sample(sample).map_err(write_err)?;
                }
            }
            SampleEncoding::Int => {
                if encoding.bits_per_sample == 0 || encoding.bits_per_sample > 32 {
                    return Err(WavError::UnsupportedEncoding {
                        path: path.to_path_buf(),
                        reason: format!("{} bits per sample", encoding.bits_per_sample),
                    });
                }
                let max_val = ((1u64 << (encoding.bits_per_sample - 1)) - 1) as f32;
                for &sample in clip.samples() {
                    let value = (sample.clamp(-1.0, 1.0) * max_val).round() as i32;
                    writer.write_sample(value).map_err(write_err)?;
                }
            }
        }

        writer.finalize().map_err(write_err)?;
        Ok(())
    }
}
