use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_clip::AudioClip;
use crate::audio::domain::speech_recognizer::{RecognitionError, SpeechRecognizer};
use crate::audio::domain::transcription::{Transcription, WordTiming};
use crate::audio::infrastructure::rubato_resampler;
use crate::shared::constants::WHISPER_SAMPLE_RATE;

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded once at construction; each transcription creates a
/// fresh inference state, so one recognizer can be shared across threads.
/// Input clips are downmixed to mono and resampled to the model's 16 kHz
/// before inference. With `word_timestamps` the result carries per-word
/// millisecond timings, otherwise only the plain transcript.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
    model_path: PathBuf,
    word_timestamps: bool,
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path, word_timestamps: bool) -> Result<Self, RecognitionError> {
        if !model_path.exists() {
            return Err(RecognitionError::ModelLoad(format!(
                "whisper model not found at: {}",
                model_path.display()
            )));
        }
        let path_str = model_path
            .to_str()
            .ok_or_else(|| RecognitionError::ModelLoad("invalid model path".to_string()))?;
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| RecognitionError::ModelLoad(e.to_string()))?;
        Ok(Self {
            ctx,
            model_path: model_path.to_path_buf(),
            word_timestamps,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn model_input(&self, audio: &AudioClip) -> Result<Vec<f32>, RecognitionError> {
        let mono = audio.downmixed_mono();
        rubato_resampler::resample_mono(mono.samples(), mono.sample_rate(), WHISPER_SAMPLE_RATE)
            .map_err(|e| RecognitionError::Preprocess(e.to_string()))
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, audio: &AudioClip) -> Result<Transcription, RecognitionError> {
        let samples = self.model_input(audio)?;

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| RecognitionError::Inference(e.to_string()))?;

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().min(4))
            .unwrap_or(1);

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        params.set_language(Some("en"));
        params.set_translate(false);
        params.set_token_timestamps(self.word_timestamps);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(threads as i32);

        state
            .full(params, &samples)
            .map_err(|e| RecognitionError::Inference(e.to_string()))?;

        let mut tokens = Vec::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            for tok_idx in 0..segment.n_tokens() {
                let Some(token) = segment.get_token(tok_idx) else {
                    continue;
                };
                let Ok(text) = token.to_str() else {
                    continue;
                };

                // Bracketed specials like [_BEG_] or <|endoftext|> carry no speech.
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('<') {
                    continue;
                }

                let data = token.token_data();
                tokens.push(RawToken {
                    text: text.to_string(),
                    t0: data.t0,
                    t1: data.t1,
                });
            }
        }

        if self.word_timestamps {
            let words = group_into_words(&tokens);
            if words.is_empty() {
                return Err(RecognitionError::NoSpeech);
            }
            Ok(Transcription::Words(words))
        } else {
            let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(RecognitionError::NoSpeech);
            }
            Ok(Transcription::Text(text))
        }
    }
}

struct RawToken {
    text: String,
    /// Centisecond timestamps as reported by whisper.cpp.
    t0: i64,
    t1: i64,
}

/// Merges subword tokens into whole words with millisecond timings.
///
/// A token whose raw text begins with whitespace opens a new word; anything
/// else, punctuation included, is glued onto the current word. Timings are
/// clamped so the resulting spans are non-negative, non-overlapping and
/// non-decreasing even when the model reports slightly out-of-order
/// token timestamps.
fn group_into_words(tokens: &[RawToken]) -> Vec<WordTiming> {
    let mut words: Vec<WordTiming> = Vec::new();
    let mut last_end_ms: u64 = 0;

    for token in tokens {
        let start_cs = token.t0.max(0);
        let end_cs = token.t1.max(start_cs);
        let start_ms = start_cs as u64 * 10;
        let end_ms = end_cs as u64 * 10;

        let opens_word = token.text.starts_with(char::is_whitespace) || words.is_empty();
        if opens_word {
            let start_ms = start_ms.max(last_end_ms);
            let end_ms = end_ms.max(start_ms);
            words.push(WordTiming {
                word: token.text.trim().to_string(),
                start_ms,
                end_ms,
            });
            last_end_ms = end_ms;
        } else if let Some(current) = words.last_mut() {
            current.word.push_str(token.text.trim());
            current.end_ms = current.end_ms.max(end_ms);
            last_end_ms = current.end_ms;
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, t0: i64, t1: i64) -> RawToken {
        RawToken {
            text: text.to_string(),
            t0,
            t1,
        }
    }

    #[test]
    fn test_new_nonexistent_path_returns_error() {
        let result = WhisperRecognizer::new(std::path::Path::new("/nonexistent/model.bin"), true);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_nonexistent_path_error_message() {
        let result = WhisperRecognizer::new(std::path::Path::new("/nonexistent/model.bin"), true);
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("not found"),
            "Expected 'not found' in error, got: {err}"
        );
    }

    #[test]
    fn test_group_merges_subword_tokens() {
        let tokens = vec![raw(" bad", 0, 50), raw("ly", 50, 80), raw(" cat", 80, 120)];
        let words = group_into_words(&tokens);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "badly");
        assert_eq!(words[0].start_ms, 0);
        assert_eq!(words[0].end_ms, 800);
        assert_eq!(words[1].word, "cat");
        assert_eq!(words[1].start_ms, 800);
        assert_eq!(words[1].end_ms, 1200);
    }

    #[test]
    fn test_group_attaches_punctuation_to_previous_word() {
        let tokens = vec![raw(" bad", 0, 50), raw(",", 50, 55), raw(" cat", 60, 100)];
        let words = group_into_words(&tokens);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "bad,");
        assert_eq!(words[0].end_ms, 550);
        assert_eq!(words[1].word, "cat");
    }

    #[test]
    fn test_group_first_token_without_leading_space_opens_word() {
        let words = group_into_words(&[raw("Hello", 0, 30)]);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "Hello");
        assert_eq!(words[0].end_ms, 300);
    }

    #[test]
    fn test_group_clamps_overlapping_words_monotonic() {
        let tokens = vec![raw(" a", 0, 100), raw(" b", 50, 150)];
        let words = group_into_words(&tokens);
        assert_eq!(words[0].end_ms, 1000);
        assert_eq!(words[1].start_ms, 1000);
        assert_eq!(words[1].end_ms, 1500);
    }

    #[test]
    fn test_group_clamps_negative_timestamps_to_zero() {
        let words = group_into_words(&[raw(" a", -5, 20)]);
        assert_eq!(words[0].start_ms, 0);
        assert_eq!(words[0].end_ms, 200);
    }

    #[test]
    fn test_group_empty_tokens_yield_no_words() {
        assert!(group_into_words(&[]).is_empty());
    }

    #[test]
    #[ignore] // Requires the whisper model file
    fn test_transcribe_handles_speechless_audio() {
        let model_path = crate::shared::model_resolver::resolve(
            crate::shared::constants::WHISPER_MODEL_FILENAME,
            crate::shared::constants::WHISPER_MODEL_URL,
            None,
        )
        .expect("model should resolve");
        let recognizer = WhisperRecognizer::new(&model_path, true).expect("model should load");

        // Two seconds of a pure tone contain no words.
        let sample_rate = 16000u32;
        let samples: Vec<f32> = (0..2 * sample_rate as usize)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * 330.0 * t).sin() as f32 * 0.4
            })
            .collect();
        let audio = AudioClip::new(samples, sample_rate, 1);

        let result = recognizer.transcribe(&audio);
        assert!(
            matches!(result, Ok(_) | Err(RecognitionError::NoSpeech)),
            "inference should complete: {:?}",
            result.err()
        );
    }
}
