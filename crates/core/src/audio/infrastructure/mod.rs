pub mod http_toxicity_classifier;
pub mod keyword_classifier;
mod rubato_resampler;
pub mod whisper_recognizer;
