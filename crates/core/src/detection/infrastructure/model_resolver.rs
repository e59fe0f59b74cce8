use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

const APP_DIR: &str = "SpeakerFrames";

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
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

/// Where to look for a detector model before downloading it.
pub struct ModelLocation<'a> {
    pub name: &'a str,
    pub url: &'a str,
    /// Explicit file chosen by the caller; must exist when set.
    pub override_path: Option<&'a Path>,
    /// Directory shipped alongside the binary.
    pub bundled_dir: Option<&'a Path>,
}

/// Resolve a model file using the platform cache directory.
///
/// Resolution order:
/// 1. Explicit override (error if it does not exist)
/// 2. User cache directory
/// 3. Bundled directory
/// 4. Download from URL into the cache
pub fn resolve(
    location: &ModelLocation<'_>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = location.override_path {
        return existing(path);
    }
    resolve_in(&model_cache_dir()?, location, progress)
}

/// Same as [`resolve`] with an explicit cache directory.
pub fn resolve_in(
    cache_dir: &Path,
    location: &ModelLocation<'_>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = location.override_path {
        return existing(path);
    }

    let cached_path = cache_dir.join(location.name);
    if cached_path.exists() {
        log::debug!("Using cached model {}", cached_path.display());
        return Ok(cached_path);
    }

    if let Some(dir) = location.bundled_dir {
        let bundled_path = dir.join(location.name);
        if bundled_path.exists() {
            log::debug!("Using bundled model {}", bundled_path.display());
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {} from {}", location.name, location.url);
    download(location.url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/SpeakerFrames/models/`
/// - Linux: `$XDG_CACHE_HOME/SpeakerFrames/models/` or `~/.cache/SpeakerFrames/models/`
/// - Windows: `%LOCALAPPDATA%/SpeakerFrames/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join(APP_DIR).join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn existing(path: &Path) -> Result<PathBuf, ModelResolveError> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(ModelResolveError::Missing(path.to_path_buf()))
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let write_err = |e: std::io::Error| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    };

    let mut file = fs::File::create(temp_path).map_err(write_err)?;
    let mut downloaded: u64 = 0;
    let mut buf = vec![0u8; 256 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}
