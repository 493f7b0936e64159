use super::audio_clip::AudioClip;
use super::tone::ToneSegment;
use super::transcription::{Transcription, WordTiming};

/// Splices a censored copy of a clip from its transcription.
///
/// With word timings the output is rebuilt span by span: gaps and clean
/// words are copied verbatim, toxic words are replaced by the tone. The
/// tone keeps its own duration, so censored output is generally shorter
/// or longer than the span it replaces. Without timings the clip is
/// apportioned evenly across the transcript's words.
pub struct CensorAligner {
    tone: ToneSegment,
}

impl CensorAligner {
    pub fn new(tone: ToneSegment) -> Self {
        Self { tone }
    }

    pub fn tone(&self) -> &ToneSegment {
        &self.tone
    }

    pub fn censor<F>(&self, audio: &AudioClip, transcription: &Transcription, is_toxic: F) -> AudioClip
    where
        F: FnMut(&str) -> bool,
    {
        match transcription {
            Transcription::Words(words) => self.censor_timed(audio, words, is_toxic),
            Transcription::Text(text) => self.censor_apportioned(audio, text, is_toxic),
        }
    }

    fn censor_timed<F>(&self, audio: &AudioClip, words: &[WordTiming], mut is_toxic: F) -> AudioClip
    where
        F: FnMut(&str) -> bool,
    {
        let tone = self.tone.matched_to(audio.sample_rate(), audio.channels());
        let mut output = AudioClip::empty(audio.sample_rate(), audio.channels());
        let mut last_end_ms: u64 = 0;

        for word in words {
            if word.start_ms > last_end_ms {
                output.append(&audio.slice_ms(last_end_ms, word.start_ms));
            }
            if is_toxic(&word.word) {
                output.append(&tone);
            } else {
                output.append(&audio.slice_ms(word.start_ms, word.end_ms));
            }
            last_end_ms = word.end_ms;
        }

        // Trailing slice runs to the final frame, not just the final whole
        // millisecond, so an empty word list reproduces the input exactly.
        output.append(&audio.slice_from_ms(last_end_ms));
        output
    }

    fn censor_apportioned<F>(&self, audio: &AudioClip, text: &str, mut is_toxic: F) -> AudioClip
    where
        F: FnMut(&str) -> bool,
    {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return audio.clone();
        }

        let tone = self.tone.matched_to(audio.sample_rate(), audio.channels());
        let duration = audio.len_ms() as f64 / words.len() as f64;
        let mut output = AudioClip::empty(audio.sample_rate(), audio.channels());

        // Boundaries truncate toward zero, so rounding drift accumulates and
        // the final boundary can land short of the clip end. That tail is
        // dropped, matching the even-apportionment contract.
        for (i, word) in words.iter().enumerate() {
            let start_ms = (i as f64 * duration) as u64;
            let end_ms = ((i + 1) as f64 * duration) as u64;
            if is_toxic(word) {
                output.append(&tone);
            } else {
                output.append(&audio.slice_ms(start_ms, end_ms));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 kHz mono keeps one frame per millisecond, so slice offsets can be
    // checked against sample indices directly.
    fn ramp_clip(len_ms: u64) -> AudioClip {
        let samples: Vec<f32> = (0..len_ms).map(|i| i as f32).collect();
        AudioClip::new(samples, 1000, 1)
    }

    fn test_tone() -> ToneSegment {
        ToneSegment::generate(100.0, 100, 0.3, 1000, 1).unwrap()
    }

    fn timed(word: &str, start_ms: u64, end_ms: u64) -> WordTiming {
        WordTiming {
            word: word.to_string(),
            start_ms,
            end_ms,
        }
    }

    #[test]
    fn test_timed_replaces_toxic_word_with_tone() {
        let audio = ramp_clip(3000);
        let words = Transcription::Words(vec![
            timed("bad", 0, 1000),
            timed("cat", 1000, 2000),
            timed("run", 2000, 3000),
        ]);
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &words, |w| w == "bad");

        let tone = aligner.tone().matched_to(1000, 1);
        assert_eq!(output.frames(), tone.frames() + 2000);
        assert_eq!(&output.samples()[..tone.frames()], tone.samples());
        assert_eq!(&output.samples()[tone.frames()..], &audio.samples()[1000..3000]);
    }

    #[test]
    fn test_timed_preserves_gaps_verbatim() {
        let audio = ramp_clip(2500);
        let words = Transcription::Words(vec![
            timed("quiet", 500, 1000),
            timed("voice", 1500, 2000),
        ]);
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &words, |_| false);

        assert_eq!(output.samples(), audio.samples());
    }

    #[test]
    fn test_timed_all_toxic_keeps_gaps_between_tones() {
        let audio = ramp_clip(2500);
        let words = Transcription::Words(vec![
            timed("one", 500, 1000),
            timed("two", 1500, 2000),
        ]);
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &words, |_| true);

        let tone = aligner.tone().matched_to(1000, 1);
        let t = tone.frames();
        assert_eq!(output.frames(), 500 + t + 500 + t + 500);
        assert_eq!(&output.samples()[..500], &audio.samples()[..500]);
        assert_eq!(&output.samples()[500..500 + t], tone.samples());
        assert_eq!(
            &output.samples()[500 + t..1000 + t],
            &audio.samples()[1000..1500]
        );
        assert_eq!(&output.samples()[1000 + t + t..], &audio.samples()[2000..2500]);
    }

    #[test]
    fn test_timed_empty_word_list_returns_input_unchanged() {
        let audio = ramp_clip(1200);
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &Transcription::Words(vec![]), |_| true);

        assert_eq!(output.samples(), audio.samples());
    }

    #[test]
    fn test_timed_keeps_partial_trailing_millisecond() {
        // 44150 frames at 44.1 kHz is 1001.13 ms; the tail past the last
        // whole millisecond must not be dropped.
        let samples: Vec<f32> = (0..44_150).map(|i| (i % 97) as f32).collect();
        let audio = AudioClip::new(samples, 44_100, 1);
        let words = Transcription::Words(vec![timed("word", 0, 1001)]);
        let aligner = CensorAligner::new(ToneSegment::default_beep().unwrap());

        let output = aligner.censor(&audio, &words, |_| false);

        assert_eq!(output.samples(), audio.samples());
    }

    #[test]
    fn test_timed_is_not_duration_preserving_for_toxic_spans() {
        let audio = ramp_clip(3000);
        let words = Transcription::Words(vec![timed("long", 0, 3000)]);
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &words, |_| true);

        assert_eq!(output.len_ms(), 100);
    }

    #[test]
    fn test_timed_is_deterministic() {
        let audio = ramp_clip(3000);
        let words = Transcription::Words(vec![
            timed("bad", 0, 1000),
            timed("cat", 1000, 2000),
        ]);
        let aligner = CensorAligner::new(test_tone());

        let first = aligner.censor(&audio, &words, |w| w == "bad");
        let second = aligner.censor(&audio, &words, |w| w == "bad");

        assert_eq!(first.samples(), second.samples());
    }

    #[test]
    fn test_apportioned_splits_clip_evenly_across_words() {
        let audio = ramp_clip(2000);
        let text = Transcription::Text("bad cat".to_string());
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &text, |w| w == "bad");

        let tone = aligner.tone().matched_to(1000, 1);
        assert_eq!(output.frames(), tone.frames() + 1000);
        assert_eq!(&output.samples()[..tone.frames()], tone.samples());
        assert_eq!(&output.samples()[tone.frames()..], &audio.samples()[1000..2000]);
    }

    #[test]
    fn test_apportioned_passes_punctuation_through_to_predicate() {
        let audio = ramp_clip(900);
        let text = Transcription::Text("bad, cat!".to_string());
        let aligner = CensorAligner::new(test_tone());
        let mut seen = Vec::new();

        aligner.censor(&audio, &text, |w| {
            seen.push(w.to_string());
            false
        });

        assert_eq!(seen, vec!["bad,".to_string(), "cat!".to_string()]);
    }

    #[test]
    fn test_apportioned_preserves_truncation_drift() {
        let audio = ramp_clip(1000);
        let text = Transcription::Text("one two three".to_string());
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &text, |_| false);

        // 1000 / 3 truncates to boundaries 0, 333, 666, 999.
        assert_eq!(output.frames(), 999);
        assert_eq!(output.samples(), &audio.samples()[..999]);
    }

    #[test]
    fn test_apportioned_blank_text_returns_input_unchanged() {
        let audio = ramp_clip(800);
        let aligner = CensorAligner::new(test_tone());

        let empty = aligner.censor(&audio, &Transcription::Text(String::new()), |_| true);
        let blank = aligner.censor(&audio, &Transcription::Text("   ".to_string()), |_| true);

        assert_eq!(empty.samples(), audio.samples());
        assert_eq!(blank.samples(), audio.samples());
    }

    #[test]
    fn test_never_toxic_predicate_leaves_clip_unchanged() {
        let audio = ramp_clip(3000);
        let words = Transcription::Words(vec![
            timed("a", 0, 1000),
            timed("b", 1000, 2000),
            timed("c", 2000, 3000),
        ]);
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &words, |_| false);

        assert_eq!(output.samples(), audio.samples());
    }

    #[test]
    fn test_stereo_clip_gets_stereo_tone() {
        let samples: Vec<f32> = (0..4000).map(|i| i as f32).collect();
        let audio = AudioClip::new(samples, 1000, 2);
        let words = Transcription::Words(vec![timed("bad", 0, 1000), timed("ok", 1000, 2000)]);
        let aligner = CensorAligner::new(test_tone());

        let output = aligner.censor(&audio, &words, |w| w == "bad");

        assert_eq!(output.channels(), 2);
        let tone_frames = 100;
        assert_eq!(output.frames(), tone_frames + 1000);
        assert_eq!(&output.samples()[tone_frames * 2..], &audio.samples()[2000..]);
    }
}
