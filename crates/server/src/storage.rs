use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

const ORIGINAL_PREFIX: &str = "original_";
const PROCESSED_PREFIX: &str = "processed_";
const CLIP_EXTENSION: &str = ".wav";

/// Names for the two clips of one upload. Both share a single random stem
/// so either one can be mapped back to its counterpart.
#[derive(Debug, Clone)]
pub struct ClipPair {
    pub original_name: String,
    pub processed_name: String,
}

/// Flat directory of uploaded and processed clips under server-generated
/// names. Client-supplied filenames never touch the filesystem.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Opens the store, creating the directory if needed.
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Reserves names for an upload and its processed counterpart.
    pub fn allocate_pair(&self) -> ClipPair {
        let id = Uuid::new_v4();
        ClipPair {
            original_name: format!("{ORIGINAL_PREFIX}{id}{CLIP_EXTENSION}"),
            processed_name: format!("{PROCESSED_PREFIX}{id}{CLIP_EXTENSION}"),
        }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// True only for names this store hands out: a known prefix, a valid
    /// UUID stem, and the clip extension. Everything else, including path
    /// traversal attempts, is rejected.
    pub fn is_download_name(name: &str) -> bool {
        let Some(stem) = name.strip_suffix(CLIP_EXTENSION) else {
            return false;
        };
        let id = stem
            .strip_prefix(ORIGINAL_PREFIX)
            .or_else(|| stem.strip_prefix(PROCESSED_PREFIX));
        match id {
            Some(id) => Uuid::parse_str(id).is_ok(),
            None => false,
        }
    }

    /// The other half of a clip pair: original for processed and vice versa.
    pub fn counterpart_name(name: &str) -> Option<String> {
        if let Some(rest) = name.strip_prefix(ORIGINAL_PREFIX) {
            return Some(format!("{PROCESSED_PREFIX}{rest}"));
        }
        if let Some(rest) = name.strip_prefix(PROCESSED_PREFIX) {
            return Some(format!("{ORIGINAL_PREFIX}{rest}"));
        }
        None
    }

    /// Deletes every file in the store, returning how many were removed.
    pub fn purge(&self) -> io::Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to remove clip")
                }
            }
        }
        Ok(removed)
    }
}
