use std::path::Path;

use crate::audio::domain::audio_clip::AudioClip;

use super::encoding::{WavEncoding, WavError};

/// Domain interface for decoding a waveform file into a clip.
pub trait ClipReader: Send + Sync {
    /// Decode the file, reporting the clip together with its on-disk
    /// encoding so a processed copy can be written back in the same format.
    fn read_clip(&self, path: &Path) -> Result<(AudioClip, WavEncoding), WavError>;
}
