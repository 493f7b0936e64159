use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("failed to open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("unsupported encoding in {path}: {reason}")]
    UnsupportedEncoding { path: PathBuf, reason: String },
    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleEncoding {
    Int,
    Float,
}

/// On-disk sample layout of a waveform file.
///
/// Carried alongside decoded clips so output files can be written back in
/// the same container format they arrived in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavEncoding {
    pub bits_per_sample: u16,
    pub sample_encoding: SampleEncoding,
}

impl WavEncoding {
    pub fn pcm16() -> Self {
        Self {
            bits_per_sample: 16,
            sample_encoding: SampleEncoding::Int,
        }
    }
}
