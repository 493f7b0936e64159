use thiserror::Error;

use super::audio_clip::AudioClip;
use super::transcription::Transcription;

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("failed to load speech model: {0}")]
    ModelLoad(String),
    #[error("failed to prepare audio for recognition: {0}")]
    Preprocess(String),
    #[error("speech recognition failed: {0}")]
    Inference(String),
    #[error("no speech detected in audio")]
    NoSpeech,
}

/// Domain interface for speech-to-text transcription.
///
/// Implementations run inference on a clip and report either word-level
/// timings or a plain transcript, depending on what the backend supports.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, audio: &AudioClip) -> Result<Transcription, RecognitionError>;
}
