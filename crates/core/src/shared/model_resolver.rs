use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::HF_RESOLVE_BASE_URL;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("invalid model repository id: {0:?}")]
    InvalidRepoId(String),
    #[error("model directory {} has no {file}", dir.display())]
    MissingLocalFile { dir: PathBuf, file: String },
    #[error("failed to create cache directory")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve one file of a model repository to a local path.
///
/// Resolution order:
/// 1. `repo_id` names an existing local directory: the file must be in it
/// 2. User cache directory (platform-specific), keyed by repository
/// 3. Download from the Hugging Face hub into the cache
pub fn resolve(
    repo_id: &str,
    file_name: &str,
    progress: Option<&ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let local_dir = Path::new(repo_id);
    if local_dir.is_dir() {
        let local_path = local_dir.join(file_name);
        if local_path.is_file() {
            return Ok(local_path);
        }
        return Err(ModelResolveError::MissingLocalFile {
            dir: local_dir.to_path_buf(),
            file: file_name.to_string(),
        });
    }

    let cache_dir = model_cache_dir()?.join(repo_cache_name(repo_id)?);
    let cached_path = cache_dir.join(file_name);
    if cached_path.exists() {
        log::debug!("Using cached {}", cached_path.display());
        return Ok(cached_path);
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    let url = hub_file_url(repo_id, file_name);
    log::info!("Downloading {url}");
    download(&url, &cached_path, progress)?;
    Ok(cached_path)
}

/// `https://huggingface.co/<repo>/resolve/main/<file>`
pub fn hub_file_url(repo_id: &str, file_name: &str) -> String {
    format!("{HF_RESOLVE_BASE_URL}/{repo_id}/resolve/main/{file_name}")
}

/// Flattens `owner/name` into a single directory name.
fn repo_cache_name(repo_id: &str) -> Result<String, ModelResolveError> {
    let valid = !repo_id.is_empty()
        && repo_id
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if !valid {
        return Err(ModelResolveError::InvalidRepoId(repo_id.to_string()));
    }
    Ok(repo_id.replace('/', "--"))
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/bodyviz/models/`
/// - Linux: `$XDG_CACHE_HOME/bodyviz/models/` or `~/.cache/bodyviz/models/`
/// - Windows: `%LOCALAPPDATA%/bodyviz/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("bodyviz").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("bodyviz").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<&ProgressFn>) -> Result<(), ModelResolveError> {
    let download_err = |source| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };

    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let bytes = response.bytes().map_err(download_err)?;

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    let write_err = |source| ModelResolveError::Write {
        path: temp_path.clone(),
        source,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;

    let chunk_size = 1024 * 1024; // 1MB
    for chunk in bytes.chunks(chunk_size) {
        file.write_all(chunk).map_err(write_err)?;
        downloaded += chunk.len() as u64;
        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
