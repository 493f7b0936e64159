use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("could not determine a cache directory for this platform")]
    NoCacheDir,
    #[error("failed to prepare cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to store model at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`. `total_bytes` is 0
/// when the server sent no Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Locates a model by name in the user cache, downloading it on a miss.
pub fn resolve(
    name: &str,
    url: &str,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let dir = model_cache_dir()?;
    let target = dir.join(name);
    if target.exists() {
        return Ok(target);
    }

    fs::create_dir_all(&dir).map_err(|e| ModelResolveError::CacheDir {
        path: dir.clone(),
        source: e,
    })?;
    download(url, &target, progress)?;
    Ok(target)
}

/// `~/.cache/speechguard/models` on Linux, the platform equivalent elsewhere.
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    dirs::cache_dir()
        .map(|base| base.join("speechguard").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(
    url: &str,
    target: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let request_err = |e: reqwest::Error| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    };
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(request_err)?;

    // Stream into a sibling .part file and rename once complete, so an
    // interrupted download never leaves a truncated model in the cache.
    let part = target.with_extension("part");
    let store_err = |e: io::Error| ModelResolveError::Store {
        path: part.clone(),
        source: e,
    };
    let file = fs::File::create(&part).map_err(store_err)?;
    let mut sink = ProgressWriter {
        inner: file,
        written: 0,
        total: response.content_length().unwrap_or(0),
        progress,
    };
    response.copy_to(&mut sink).map_err(request_err)?;
    sink.inner.flush().map_err(store_err)?;
    drop(sink);

    fs::rename(&part, target).map_err(|e| ModelResolveError::Store {
        path: target.to_path_buf(),
        source: e,
    })
}

const REPORT_STEP_BYTES: u64 = 1024 * 1024;

/// Forwards writes to the cache file, reporting progress roughly once per
/// megabyte plus once at completion.
struct ProgressWriter {
    inner: fs::File,
    written: u64,
    total: u64,
    progress: Option<ProgressFn>,
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        let before = self.written;
        self.written += n as u64;
        if let Some(report) = &self.progress {
            let crossed_step = self.written / REPORT_STEP_BYTES != before / REPORT_STEP_BYTES;
            if crossed_step || self.written == self.total {
                report(self.written, self.total);
            }
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_cache_dir_is_namespaced_to_this_tool() {
        let dir = model_cache_dir().unwrap();
        let rendered = dir.to_string_lossy();
        assert!(rendered.contains("speechguard"));
        assert!(rendered.ends_with("models"));
    }

    #[test]
    fn test_progress_writer_reports_final_byte_count() {
        let tmp = TempDir::new().unwrap();
        let file = fs::File::create(tmp.path().join("out")).unwrap();
        let reported = Arc::new(AtomicU64::new(0));
        let seen = reported.clone();

        let mut sink = ProgressWriter {
            inner: file,
            written: 0,
            total: 3 * REPORT_STEP_BYTES,
            progress: Some(Box::new(move |written, _| {
                seen.store(written, Ordering::Relaxed);
            })),
        };
        let chunk = vec![0u8; REPORT_STEP_BYTES as usize];
        for _ in 0..3 {
            sink.write_all(&chunk).unwrap();
        }

        assert_eq!(reported.load(Ordering::Relaxed), 3 * REPORT_STEP_BYTES);
    }

    #[test]
    fn test_download_fetches_small_file() {
        // Skipped in CI, needs network access.
        if std::env::var("CI").is_ok() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("robots.txt");

        let result = download("https://www.google.com/robots.txt", &target, None);

        assert!(result.is_ok(), "download failed: {:?}", result.err());
        assert!(!fs::read(&target).unwrap().is_empty());
    }

    #[test]
    fn test_download_unreachable_host_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("model.bin");
        let result = download("http://invalid.nonexistent.example.com/model", &target, None);
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
    }

    #[test]
    fn test_failed_download_leaves_no_file_behind() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("model.bin");

        let _ = download("http://invalid.nonexistent.example.com/model", &target, None);

        assert!(!target.exists());
        assert!(!target.with_extension("part").exists());
    }
}
