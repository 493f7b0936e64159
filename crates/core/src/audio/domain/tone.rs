use thiserror::Error;

use super::audio_clip::AudioClip;

pub const DEFAULT_TONE_FREQUENCY_HZ: f64 = 1000.0;
pub const DEFAULT_TONE_DURATION_MS: u64 = 100;
pub const DEFAULT_TONE_AMPLITUDE: f32 = 0.3;
pub const DEFAULT_TONE_SAMPLE_RATE: u32 = 44_100;

#[derive(Error, Debug)]
pub enum ToneError {
    #[error("tone frequency must be positive, got {0} Hz")]
    InvalidFrequency(f64),
    #[error("tone frequency {frequency_hz} Hz is at or above the Nyquist limit for {sample_rate} Hz")]
    AboveNyquist { frequency_hz: f64, sample_rate: u32 },
    #[error("tone duration must be at least 1 ms")]
    ZeroDuration,
    #[error("tone amplitude must be within (0.0, 1.0], got {0}")]
    InvalidAmplitude(f32),
    #[error("tone format must have a positive sample rate and at least one channel")]
    InvalidFormat,
}

/// The beep spliced over toxic words: a short sine tone.
///
/// Generated and validated once at startup, then shared read-only across
/// censor calls. The startup render covers the default clip format; when a
/// clip arrives with a different sample rate or channel layout the tone
/// re-renders itself to match, since raw sample buffers cannot be spliced
/// across formats.
#[derive(Clone, Debug)]
pub struct ToneSegment {
    frequency_hz: f64,
    duration_ms: u64,
    amplitude: f32,
    rendered: AudioClip,
}

impl ToneSegment {
    pub fn generate(
        frequency_hz: f64,
        duration_ms: u64,
        amplitude: f32,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self, ToneError> {
        if sample_rate == 0 || channels == 0 {
            return Err(ToneError::InvalidFormat);
        }
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(ToneError::InvalidFrequency(frequency_hz));
        }
        if frequency_hz >= sample_rate as f64 / 2.0 {
            return Err(ToneError::AboveNyquist {
                frequency_hz,
                sample_rate,
            });
        }
        if duration_ms == 0 {
            return Err(ToneError::ZeroDuration);
        }
        if !(0.0..=1.0).contains(&amplitude) || amplitude == 0.0 {
            return Err(ToneError::InvalidAmplitude(amplitude));
        }
        Ok(Self {
            frequency_hz,
            duration_ms,
            amplitude,
            rendered: render(frequency_hz, duration_ms, amplitude, sample_rate, channels),
        })
    }

    /// The default 1000 Hz, 100 ms beep.
    pub fn default_beep() -> Result<Self, ToneError> {
        Self::generate(
            DEFAULT_TONE_FREQUENCY_HZ,
            DEFAULT_TONE_DURATION_MS,
            DEFAULT_TONE_AMPLITUDE,
            DEFAULT_TONE_SAMPLE_RATE,
            1,
        )
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// The tone as a clip in the given format, reusing the startup render
    /// when the format already matches.
    pub fn matched_to(&self, sample_rate: u32, channels: u16) -> AudioClip {
        if self.rendered.sample_rate() == sample_rate && self.rendered.channels() == channels {
            return self.rendered.clone();
        }
        render(
            self.frequency_hz,
            self.duration_ms,
            self.amplitude,
            sample_rate,
            channels,
        )
    }
}

fn render(
    frequency_hz: f64,
    duration_ms: u64,
    amplitude: f32,
    sample_rate: u32,
    channels: u16,
) -> AudioClip {
    let frames = (duration_ms * sample_rate as u64 / 1000) as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for frame in 0..frames {
        let t = frame as f64 / sample_rate as f64;
        let value = (2.0 * std::f64::consts::PI * frequency_hz * t).sin() as f32 * amplitude;
        for _ in 0..channels {
            samples.push(value);
        }
    }
    AudioClip::new(samples, sample_rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_beep_renders_expected_length() {
        let tone = ToneSegment::default_beep().unwrap();
        let clip = tone.matched_to(DEFAULT_TONE_SAMPLE_RATE, 1);
        assert_eq!(clip.frames(), 4410);
        assert_eq!(clip.len_ms(), 100);
    }

    #[test]
    fn test_generated_tone_has_energy() {
        let tone = ToneSegment::generate(440.0, 50, 0.3, 16000, 1).unwrap();
        let clip = tone.matched_to(16000, 1);
        let energy: f64 = clip
            .samples()
            .iter()
            .map(|s| (*s as f64) * (*s as f64))
            .sum();
        assert!(energy > 0.0);
    }

    #[test]
    fn test_amplitude_bounds_rendered_samples() {
        let tone = ToneSegment::generate(1000.0, 100, 0.3, 44100, 1).unwrap();
        let clip = tone.matched_to(44100, 1);
        assert!(clip.samples().iter().all(|s| s.abs() <= 0.3 + 1e-6));
    }

    #[test]
    fn test_matched_to_reuses_startup_render() {
        let tone = ToneSegment::default_beep().unwrap();
        let a = tone.matched_to(DEFAULT_TONE_SAMPLE_RATE, 1);
        let b = tone.matched_to(DEFAULT_TONE_SAMPLE_RATE, 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_matched_to_rerenders_for_other_formats() {
        let tone = ToneSegment::default_beep().unwrap();
        let clip = tone.matched_to(16000, 2);
        assert_eq!(clip.sample_rate(), 16000);
        assert_eq!(clip.channels(), 2);
        assert_eq!(clip.frames(), 1600);
        // Each frame carries the same value on both channels.
        let samples = clip.samples();
        assert_eq!(samples[100], samples[101]);
    }

    #[rstest]
    #[case(0.0, 100, 0.3)]
    #[case(-500.0, 100, 0.3)]
    #[case(1000.0, 0, 0.3)]
    #[case(1000.0, 100, 0.0)]
    #[case(1000.0, 100, 1.5)]
    fn test_generate_rejects_invalid_parameters(
        #[case] frequency_hz: f64,
        #[case] duration_ms: u64,
        #[case] amplitude: f32,
    ) {
        assert!(ToneSegment::generate(frequency_hz, duration_ms, amplitude, 44100, 1).is_err());
    }

    #[test]
    fn test_generate_rejects_frequency_at_nyquist() {
        let result = ToneSegment::generate(8000.0, 100, 0.3, 16000, 1);
        assert!(matches!(result, Err(ToneError::AboveNyquist { .. })));
    }
}
