mod routes;
mod storage;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tracing::{error, info, warn};

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

use crate::storage::UploadStore;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Web service for word-level audio censorship of uploaded WAV clips.
#[derive(Parser)]
#[command(name = "speechguard-server")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Directory for uploaded and processed clips.
    #[arg(long, default_value = "audio_uploads")]
    upload_dir: PathBuf,

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

/// Shared handler state: the censorship pipeline plus the clip store.
pub struct AppState {
    pub use_case: CensorAudioUseCase,
    pub store: UploadStore,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "server failed to start");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(&cli)?;

    let listen = cli.listen;
    // Model download and whisper load both block; keep them off the runtime.
    let state = tokio::task::spawn_blocking(move || build_state(cli)).await??;
    let state = Arc::new(state);

    let app = Router::new()
        .route("/", get(routes::index).post(routes::upload))
        .route("/download/:filename", get(routes::download))
        .route("/cleanup", post(routes::cleanup))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(address = %listen, "listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn build_state(cli: Cli) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store = UploadStore::create(&cli.upload_dir)?;

    // A bad tone configuration disables censorship instead of killing the
    // server; uploads are refused until it is fixed.
    let tone = match ToneSegment::generate(
        cli.tone_frequency,
        cli.tone_duration,
        DEFAULT_TONE_AMPLITUDE,
        DEFAULT_TONE_SAMPLE_RATE,
        1,
    ) {
        Ok(tone) => Some(tone),
        Err(e) => {
            error!(error = %e, "beep tone failed to initialize; censorship is disabled");
            None
        }
    };

    let model_path = match cli.model.clone() {
        Some(path) => path,
        None => {
            info!(model = WHISPER_MODEL_FILENAME, "resolving speech model");
            model_resolver::resolve(WHISPER_MODEL_FILENAME, WHISPER_MODEL_URL, None)?
        }
    };
    let recognizer = WhisperRecognizer::new(&model_path, !cli.no_word_timestamps)?;

    let classifier = build_classifier(&cli);
    if classifier.is_none() {
        warn!("no toxicity classifier configured; every word will pass through unchanged");
    }
    let judge = ToxicityJudge::with_policy(classifier, &cli.toxic_label, cli.threshold);

    let use_case = CensorAudioUseCase::new(
        Box::new(HoundClipReader),
        Box::new(HoundClipWriter),
        Box::new(recognizer),
        judge,
        tone,
    );

    Ok(AppState { use_case, store })
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
    if cli.toxicity_url.is_some() && cli.keywords.is_some() {
        return Err("--toxicity-url and --keywords are mutually exclusive".into());
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

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
