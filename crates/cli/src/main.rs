use std::path::PathBuf;
use std::process;

use clap::Parser;

use speechguard_core::audio::domain::tone::{
    ToneSegment, DEFAULT_TONE_AMPLITUDE, DEFAULT_TONE_SAMPLE_RATE,
};
use speechguard_core::audio::domain::toxicity::{ToxicityClassifier, ToxicityJudge};
use speechguard_core::audio::infrastructure::http_toxicity_classifier::HttpToxicityClassifier;
use speechguard_core::audio::infrastructure::keyword_classifier::KeywordClassifier;
use speechguard_core::audio::infrastructure::whisper_recognizer::WhisperRecognizer;
use speechguard_core::pipeline::censor_audio_use_case::CensorAudioUseCase;
use speechguard_core::shared::constants::{WHISPER_MODEL_FILENAME, WHISPER_MODEL_URL};
use speechguard_core::shared::model_resolver;
use speechguard_core::wav::infrastructure::hound_reader::HoundClipReader;
use speechguard_core::wav::infrastructure::hound_writer::HoundClipWriter;

/// Word-level audio censorship for WAV files.
#[derive(Parser)]
#[command(name = "speechguard")]
struct Cli {
    /// Input WAV file.
    input: PathBuf,

    /// Output WAV file.
    output: PathBuf,

    /// Path to a whisper ggml model (downloads tiny.en when omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Toxicity classification endpoint URL.
    #[arg(long)]
    toxicity_url: Option<String>,

    /// Bearer token for the toxicity endpoint.
    #[arg(long)]
    api_token: Option<String>,

    /// Comma-separated words to censor without consulting an endpoint.
    #[arg(long, value_delimiter = ',')]
    keywords: Option<Vec<String>>,

    /// Label the classifier reports for toxic words.
    #[arg(long, default_value = "Toxic")]
    toxic_label: String,

    /// Confidence a word must exceed before it is censored (0.0-1.0).
    #[arg(long, default_value = "0.7")]
    threshold: f64,

    /// Beep frequency in Hz.
    #[arg(long, default_value = "1000")]
    tone_frequency: f64,

    /// Beep duration in milliseconds.
    #[arg(long, default_value = "100")]
    tone_duration: u64,

    /// Censor from the plain transcript instead of word timestamps.
    #[arg(long)]
    no_word_timestamps: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let tone = ToneSegment::generate(
        cli.tone_frequency,
        cli.tone_duration,
        DEFAULT_TONE_AMPLITUDE,
        DEFAULT_TONE_SAMPLE_RATE,
        1,
    )?;

    let model_path = match &cli.model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {WHISPER_MODEL_FILENAME}");
            let path = model_resolver::resolve(
                WHISPER_MODEL_FILENAME,
                WHISPER_MODEL_URL,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };

    let recognizer = WhisperRecognizer::new(&model_path, !cli.no_word_timestamps)?;
    let judge = ToxicityJudge::with_policy(build_classifier(&cli), &cli.toxic_label, cli.threshold);

    let use_case = CensorAudioUseCase::new(
        Box::new(HoundClipReader),
        Box::new(HoundClipWriter),
        Box::new(recognizer),
        judge,
        Some(tone),
    );

    let report = use_case.run(&cli.input, &cli.output)?;

    if report.classifier_failures > 0 {
        log::warn!(
            "Toxicity check failed for {} of {} words; those words were left uncensored",
            report.classifier_failures,
            report.words_total
        );
    }
    log::info!(
        "Censored {} of {} words ({}ms -> {}ms), output written to {}",
        report.words_censored,
        report.words_total,
        report.input_duration_ms,
        report.output_duration_ms,
        cli.output.display()
    );

    Ok(())
}

fn build_classifier(cli: &Cli) -> Option<Box<dyn ToxicityClassifier>> {
    if let Some(url) = &cli.toxicity_url {
        return Some(Box::new(HttpToxicityClassifier::new(
            url.clone(),
            cli.api_token.clone(),
        )));
    }
    cli.keywords
        .as_ref()
        .map(|keywords| Box::new(KeywordClassifier::new(keywords)) as Box<dyn ToxicityClassifier>)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.toxicity_url.is_some() && cli.keywords.is_some() {
        return Err("--toxicity-url and --keywords are mutually exclusive".into());
    }
    if cli.toxicity_url.is_none() && cli.keywords.is_none() {
        return Err("Either --toxicity-url or --keywords is required".into());
    }
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            cli.threshold
        )
        .into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech model... {pct}%");
    } else {
        eprint!("\rDownloading speech model... {downloaded} bytes");
    }
}
