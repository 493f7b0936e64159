pub const WHISPER_MODEL_FILENAME: &str = "ggml-tiny.en.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin";

/// Sample rate whisper.cpp expects for inference input.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

pub const AUDIO_EXTENSIONS: &[&str] = &["wav"];
