use rubato::{FftFixedIn, Resampler};
use thiserror::Error;

const CHUNK_SIZE: usize = 1024;

#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("failed to initialize resampler: {0}")]
    Init(String),
    #[error("resampling failed: {0}")]
    Process(String),
}

/// One-shot resampling of a mono buffer.
///
/// The input is fed through a fixed-size FFT resampler chunk by chunk, with
/// the final chunk zero-padded. One extra silent chunk flushes the filter
/// delay, then the output is trimmed back to the exact converted length.
pub fn resample_mono(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, ResampleError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        1,
        1,
    )
    .map_err(|e| ResampleError::Init(e.to_string()))?;

    let expected = (samples.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + CHUNK_SIZE);
    let mut position = 0;

    while position < samples.len() {
        let needed = resampler.input_frames_next();
        let mut chunk = vec![0.0f32; needed];
        let available = (samples.len() - position).min(needed);
        chunk[..available].copy_from_slice(&samples[position..position + available]);
        position += available;

        let resampled = resampler
            .process(&[chunk], None)
            .map_err(|e| ResampleError::Process(e.to_string()))?;
        if let Some(channel) = resampled.into_iter().next() {
            output.extend(channel);
        }
    }

    let flush = vec![0.0f32; resampler.input_frames_next()];
    let resampled = resampler
        .process(&[flush], None)
        .map_err(|e| ResampleError::Process(e.to_string()))?;
    if let Some(channel) = resampled.into_iter().next() {
        output.extend(channel);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}
