use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetResolveError {
    #[error("could not determine asset cache directory")]
    NoCacheDir,
    #[error("failed to create asset cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write asset to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Download progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 when the server sent no Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve a named asset (model weights, label font), checking local
/// locations before downloading.
///
/// Resolution order:
/// 1. user cache directory (platform-specific)
/// 2. bundled directory, if given (pre-packaged installs)
/// 3. download from `url` into the cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, AssetResolveError> {
    let cache_dir = asset_cache_dir()?;
    let cached = cache_dir.join(name);
    if cached.exists() {
        return Ok(cached);
    }

    if let Some(dir) = bundled_dir {
        let bundled = dir.join(name);
        if bundled.exists() {
            return Ok(bundled);
        }
    }

    fs::create_dir_all(&cache_dir).map_err(AssetResolveError::CacheDir)?;
    download(url, &cached, progress)?;
    Ok(cached)
}

/// Platform-specific asset cache directory.
///
/// - macOS: `~/Library/Application Support/MoodFrame/assets/`
/// - Linux: `$XDG_CACHE_HOME/MoodFrame/assets/` or `~/.cache/MoodFrame/assets/`
/// - Windows: `%LOCALAPPDATA%/MoodFrame/assets/`
pub fn asset_cache_dir() -> Result<PathBuf, AssetResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join("MoodFrame").join("assets"))
        .ok_or(AssetResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), AssetResolveError> {
    let wrap_download = |source| AssetResolveError::Download {
        url: url.to_string(),
        source,
    };
    let response = reqwest::blocking::get(url).map_err(wrap_download)?;
    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(wrap_download)?;

    // Land in a temp file first, then rename, so an interrupted download
    // never leaves a truncated asset at the final path.
    let temp = dest.with_extension("download");
    let wrap_write = |path: &Path| {
        let path = path.to_path_buf();
        move |source| AssetResolveError::Write { path, source }
    };

    let mut file = fs::File::create(&temp).map_err(wrap_write(&temp))?;
    let mut written: u64 = 0;
    for chunk in bytes.chunks(1024 * 1024) {
        file.write_all(chunk).map_err(wrap_write(&temp))?;
        written += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(written, total);
        }
    }
    file.flush().map_err(wrap_write(&temp))?;
    drop(file);

    fs::rename(&temp, dest).map_err(wrap_write(dest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_asset_cache_dir_is_app_scoped() {
        let dir = asset_cache_dir().unwrap();
        let text = dir.to_string_lossy();
        assert!(text.contains("MoodFrame"));
        assert!(text.contains("assets"));
    }

    #[test]
    fn test_resolve_prefers_bundled_over_download() {
        let tmp = TempDir::new().unwrap();
        let bundled_dir = tmp.path().join("bundled");
        fs::create_dir_all(&bundled_dir).unwrap();
        fs::write(bundled_dir.join("weights.onnx"), b"bundled weights").unwrap();

        // The URL is unreachable; resolution must still succeed via the
        // bundled directory (assuming nothing cached under this name).
        if asset_cache_dir().unwrap().join("weights.onnx").exists() {
            return;
        }
        let path = resolve(
            "weights.onnx",
            "http://invalid.nonexistent.example.com/weights.onnx",
            Some(&bundled_dir),
            None,
        )
        .unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"bundled weights");
    }

    #[test]
    fn test_download_invalid_url_returns_error() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("weights.onnx");
        let result = download("http://invalid.nonexistent.example.com/w", &dest, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_failure_leaves_no_partial_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("weights.onnx");
        let _ = download("http://invalid.nonexistent.example.com/w", &dest, None);
        assert!(!dest.exists());
        assert!(!dest.with_extension("download").exists());
    }

    #[test]
    fn test_download_reports_progress() {
        // Requires network access; skipped in CI.
        if std::env::var("CI").is_ok() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("robots.txt");

        let called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = called.clone();
        let result = download(
            "https://www.google.com/robots.txt",
            &dest,
            Some(Box::new(move |_done, _total| {
                flag.store(true, std::sync::atomic::Ordering::Relaxed);
            })),
        );
        if result.is_ok() {
            assert!(dest.exists());
            assert!(called.load(std::sync::atomic::Ordering::Relaxed));
        }
    }
}
