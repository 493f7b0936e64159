use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use tracing::{error, info, warn};

use speechguard_core::pipeline::censor_audio_use_case::CensorReport;
use speechguard_core::shared::constants::AUDIO_EXTENSIONS;

use crate::storage::{ClipPair, UploadStore};
use crate::AppState;

pub async fn index() -> Html<String> {
    page(
        "SpeechGuard",
        r#"<h1>SpeechGuard</h1>
<p>Upload a WAV clip. Toxic words are beeped out and the result is offered for download.</p>
<form method="post" enctype="multipart/form-data">
  <input type="file" name="file" accept=".wav" required>
  <button type="submit">Censor</button>
</form>"#,
    )
}

pub async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    if !state.use_case.can_censor() {
        return error_page(
            StatusCode::SERVICE_UNAVAILABLE,
            "Censorship is disabled because the beep tone failed to initialize.",
        );
    }

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return error_page(StatusCode::BAD_REQUEST, "No file part in the request.")
            }
            Err(e) => {
                return error_page(StatusCode::BAD_REQUEST, &format!("Upload failed: {e}"))
            }
        }
    };

    let client_name = field.file_name().unwrap_or_default().to_string();
    if client_name.is_empty() {
        return error_page(StatusCode::BAD_REQUEST, "No file selected.");
    }
    if !has_clip_extension(&client_name) {
        return error_page(StatusCode::BAD_REQUEST, "Only .wav uploads are supported.");
    }

    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_page(StatusCode::PAYLOAD_TOO_LARGE, &format!("Upload failed: {e}"))
        }
    };

    let pair = state.store.allocate_pair();
    let original_path = state.store.path_of(&pair.original_name);
    if let Err(e) = tokio::fs::write(&original_path, &bytes).await {
        error!(error = %e, "failed to save upload");
        return error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save the uploaded file.",
        );
    }

    info!(clip = %pair.original_name, size = bytes.len(), "processing upload");

    let task_state = state.clone();
    let task_pair = pair.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let source = task_state.store.path_of(&task_pair.original_name);
        let output = task_state.store.path_of(&task_pair.processed_name);
        task_state.use_case.run(&source, &output)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => {
            info!(
                censored = report.words_censored,
                total = report.words_total,
                "upload processed"
            );
            results_page(&pair, &report).into_response()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "processing failed");
            discard_pair(&state, &pair).await;
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Processing failed: {e}"),
            )
        }
        Err(e) => {
            error!(error = %e, "processing task panicked");
            discard_pair(&state, &pair).await;
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Processing failed unexpectedly.",
            )
        }
    }
}

pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    if !UploadStore::is_download_name(&filename) {
        return error_page(StatusCode::NOT_FOUND, "No such clip.");
    }

    let path = state.store.path_of(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return error_page(
                StatusCode::NOT_FOUND,
                "That clip has already been downloaded or never existed.",
            )
        }
    };

    // Downloads are one-shot: serving a clip removes it and its counterpart.
    let _ = tokio::fs::remove_file(&path).await;
    if let Some(counterpart) = UploadStore::counterpart_name(&filename) {
        let _ = tokio::fs::remove_file(state.store.path_of(&counterpart)).await;
    }
    info!(clip = %filename, "served clip and removed the pair");

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

pub async fn cleanup(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.clone();
    let outcome = tokio::task::spawn_blocking(move || store.purge()).await;
    match outcome {
        Ok(Ok(removed)) => {
            info!(removed, "purged upload directory");
            (StatusCode::OK, format!("Cleanup complete: removed {removed} clips")).into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "cleanup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Cleanup failed: {e}"),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "cleanup task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Cleanup failed unexpectedly".to_string(),
            )
                .into_response()
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn discard_pair(state: &AppState, pair: &ClipPair) {
    let _ = tokio::fs::remove_file(state.store.path_of(&pair.original_name)).await;
    let _ = tokio::fs::remove_file(state.store.path_of(&pair.processed_name)).await;
}

fn has_clip_extension(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn results_page(pair: &ClipPair, report: &CensorReport) -> Html<String> {
    let mut body = format!(
        "<h1>Clip processed</h1>\n<p>Censored {} of {} words.</p>\n",
        report.words_censored, report.words_total
    );
    if report.classifier_failures > 0 {
        body.push_str(&format!(
            "<p>{} words could not be classified and were left unchanged.</p>\n",
            report.classifier_failures
        ));
    }
    body.push_str(&format!(
        r#"<ul>
  <li><a href="/download/{}">Download censored clip</a></li>
  <li><a href="/download/{}">Download original clip</a></li>
</ul>
<p>Each link works once; downloading removes the clip pair from the server.</p>
<p><a href="/">Censor another clip</a></p>"#,
        pair.processed_name, pair.original_name
    ));
    page("Clip processed", &body)
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<h1>Something went wrong</h1>\n<p>{}</p>\n<p><a href=\"/\">Back</a></p>",
        escape(message)
    );
    (status, page("Error", &body)).into_response()
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_extension_is_case_insensitive() {
        assert!(has_clip_extension("clip.wav"));
        assert!(has_clip_extension("CLIP.WAV"));
        assert!(has_clip_extension("nested.name.Wav"));
    }

    #[test]
    fn other_extensions_are_rejected() {
        assert!(!has_clip_extension("clip.mp3"));
        assert!(!has_clip_extension("wav"));
        assert!(!has_clip_extension(""));
        assert!(!has_clip_extension("clip.wav.exe"));
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<b>\"x\" & y</b>"),
            "&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;"
        );
    }
}
