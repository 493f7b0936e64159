use std::path::Path;

use thiserror::Error;

use crate::audio::domain::censor::CensorAligner;
use crate::audio::domain::speech_recognizer::{RecognitionError, SpeechRecognizer};
use crate::audio::domain::tone::ToneSegment;
use crate::audio::domain::toxicity::{ToxicityJudge, ToxicityVerdict};
use crate::wav::domain::clip_reader::ClipReader;
use crate::wav::domain::clip_writer::ClipWriter;
use crate::wav::domain::encoding::WavError;

#[derive(Error, Debug)]
pub enum CensorError {
    #[error("censorship is disabled: no beep tone available")]
    ToneUnavailable,
    #[error("audio file error: {0}")]
    Wav(#[from] WavError),
    #[error("transcription error: {0}")]
    Recognition(#[from] RecognitionError),
}

/// What one censorship run did, for logging and user-facing summaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CensorReport {
    pub words_total: usize,
    pub words_censored: usize,
    pub classifier_failures: usize,
    pub input_duration_ms: u64,
    pub output_duration_ms: u64,
}

pub struct CensorAudioUseCase {
    reader: Box<dyn ClipReader>,
    writer: Box<dyn ClipWriter>,
    recognizer: Box<dyn SpeechRecognizer>,
    judge: ToxicityJudge,
    aligner: Option<CensorAligner>,
}

impl CensorAudioUseCase {
    /// Without a tone the use case refuses every run instead of silently
    /// writing uncensored output.
    pub fn new(
        reader: Box<dyn ClipReader>,
        writer: Box<dyn ClipWriter>,
        recognizer: Box<dyn SpeechRecognizer>,
        judge: ToxicityJudge,
        tone: Option<ToneSegment>,
    ) -> Self {
        Self {
            reader,
            writer,
            recognizer,
            judge,
            aligner: tone.map(CensorAligner::new),
        }
    }

    pub fn can_censor(&self) -> bool {
        self.aligner.is_some()
    }

    pub fn run(&self, source_path: &Path, output_path: &Path) -> Result<CensorReport, CensorError> {
        let Some(aligner) = &self.aligner else {
            return Err(CensorError::ToneUnavailable);
        };

        // 1. Decode the source clip, keeping its on-disk encoding
        let (audio, encoding) = self.reader.read_clip(source_path)?;

        // 2. Transcribe
        let transcription = self.recognizer.transcribe(&audio)?;

        // 3. Splice, counting verdicts as words are judged
        let mut words_total = 0usize;
        let mut words_censored = 0usize;
        let mut classifier_failures = 0usize;
        let censored = aligner.censor(&audio, &transcription, |word| {
            words_total += 1;
            match self.judge.assess(word) {
                ToxicityVerdict::Toxic => {
                    words_censored += 1;
                    true
                }
                ToxicityVerdict::Clean => false,
                ToxicityVerdict::Unavailable => {
                    classifier_failures += 1;
                    false
                }
            }
        });

        // 4. Write the censored clip back in the source encoding
        self.writer.write_clip(output_path, &censored, encoding)?;

        Ok(CensorReport {
            words_total,
            words_censored,
            classifier_failures,
            input_duration_ms: audio.len_ms(),
            output_duration_ms: censored.len_ms(),
        })
    }
}
