/// A decoded audio clip: interleaved PCM samples normalized to [-1.0, 1.0].
///
/// Clips are sliced by millisecond offset and concatenated; both operations
/// stay aligned to frame boundaries so channel interleaving is never split.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        debug_assert!(sample_rate > 0 && channels > 0);
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// A zero-length clip with the given format, to be grown with `append`.
    pub fn empty(sample_rate: u32, channels: u16) -> Self {
        Self::new(Vec::new(), sample_rate, channels)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (one frame spans all channels).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total duration in whole milliseconds, truncated.
    pub fn len_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Frame index of the given millisecond offset, clamped to the clip end.
    pub fn frame_at_ms(&self, ms: u64) -> usize {
        let frame = ms * self.sample_rate as u64 / 1000;
        (frame as usize).min(self.frames())
    }

    /// The sub-clip covering `[start_ms, end_ms)`, clamped to the clip bounds.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioClip {
        let start = self.frame_at_ms(start_ms) * self.channels as usize;
        let end = self.frame_at_ms(end_ms.max(start_ms)) * self.channels as usize;
        AudioClip::new(
            self.samples[start..end].to_vec(),
            self.sample_rate,
            self.channels,
        )
    }

    /// The sub-clip from `start_ms` to the physical end of the clip,
    /// including any final fraction of a millisecond that `len_ms` truncates.
    pub fn slice_from_ms(&self, start_ms: u64) -> AudioClip {
        let start = self.frame_at_ms(start_ms) * self.channels as usize;
        AudioClip::new(
            self.samples[start..].to_vec(),
            self.sample_rate,
            self.channels,
        )
    }

    /// Append another clip of the same sample rate and channel layout.
    pub fn append(&mut self, other: &AudioClip) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        debug_assert_eq!(self.channels, other.channels);
        self.samples.extend_from_slice(&other.samples);
    }

    /// A mono rendition of the clip, averaging across channels per frame.
    pub fn downmixed_mono(&self) -> AudioClip {
        if self.channels == 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let mono: Vec<f32> = self
            .samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        AudioClip::new(mono, self.sample_rate, 1)
    }
}
