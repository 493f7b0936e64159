use std::path::Path;

use crate::audio::domain::audio_clip::AudioClip;

use super::encoding::{WavEncoding, WavError};

/// Domain interface for encoding a clip to a waveform file.
pub trait ClipWriter: Send + Sync {
    fn write_clip(&self, path: &Path, clip: &AudioClip, encoding: WavEncoding)
        -> Result<(), WavError>;
}
