pub mod audio_clip;
pub mod censor;
pub mod speech_recognizer;
pub mod tone;
pub mod toxicity;
pub mod transcription;
