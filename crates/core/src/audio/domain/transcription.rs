/// A spoken word located within a clip, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordTiming {
    pub word: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl WordTiming {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Output of speech recognition.
///
/// Recognizers that can place words in time return `Words`; those that only
/// produce a transcript string return `Text`. Both shapes are handled
/// exhaustively downstream, so a censor run never has to inspect which kind
/// it was given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transcription {
    /// Ordered, non-overlapping word spans with non-decreasing start times.
    Words(Vec<WordTiming>),
    /// Space-separated words with no timing information.
    Text(String),
}

impl Transcription {
    pub fn word_count(&self) -> usize {
        match self {
            Transcription::Words(words) => words.len(),
            Transcription::Text(text) => text.split_whitespace().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }
}
